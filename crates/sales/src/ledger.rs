use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tally_catalog::Catalog;
use tally_core::{
    Aggregate, AggregateId, AggregateRoot, DomainError, DomainResult, Money, TaxRate, parse_quantity,
};
use tally_events::Event;

/// Sales ledger identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SalesLedgerId(pub AggregateId);

impl SalesLedgerId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for SalesLedgerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Units sold of one catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCount {
    pub name: String,
    pub count: u64,
}

/// Owned, read-only copy of the ledger for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// One entry per catalog item, in catalog order.
    pub counts: Vec<ItemCount>,
    pub total_profit: Money,
    pub last_sale_at: Option<DateTime<Utc>>,
}

impl LedgerSnapshot {
    pub fn count_of(&self, name: &str) -> Option<u64> {
        self.counts.iter().find(|c| c.name == name).map(|c| c.count)
    }
}

/// Aggregate root: SalesLedger.
///
/// `counts` is parallel to `catalog.items()`, so the ledger always tracks
/// exactly the catalog's item names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesLedger {
    id: SalesLedgerId,
    catalog: Catalog,
    tax: TaxRate,
    counts: Vec<u64>,
    total_profit: Money,
    last_sale_at: Option<DateTime<Utc>>,
    version: u64,
}

impl SalesLedger {
    /// Create a ledger with every count at zero.
    pub fn new(id: SalesLedgerId, catalog: Catalog, tax: TaxRate) -> Self {
        let counts = vec![0; catalog.len()];
        Self {
            id,
            catalog,
            tax,
            counts,
            total_profit: Money::ZERO,
            last_sale_at: None,
            version: 0,
        }
    }

    pub fn id_typed(&self) -> SalesLedgerId {
        self.id
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax
    }

    pub fn total_profit(&self) -> Money {
        self.total_profit
    }

    pub fn count_of(&self, name: &str) -> DomainResult<u64> {
        self.position_of(name).map(|i| self.counts[i])
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            counts: self
                .catalog
                .item_names()
                .zip(&self.counts)
                .map(|(name, count)| ItemCount {
                    name: name.to_string(),
                    count: *count,
                })
                .collect(),
            total_profit: self.total_profit,
            last_sale_at: self.last_sale_at,
        }
    }

    /// Zero every count and the profit.
    pub fn reset(&mut self) {
        let cmd = SalesLedgerCommand::ResetLedger(ResetLedger {
            ledger_id: self.id,
            occurred_at: Utc::now(),
        });
        if let Err(err) = self.execute(&cmd) {
            tracing::error!(ledger_id = %self.id, "ledger reset rejected: {err}");
        }
    }

    /// Validate, price and commit a sale; returns the taxed price.
    ///
    /// Either every field is valid and the whole sale is committed, or the
    /// ledger is left untouched.
    /// Naming the same item twice is rejected as invalid input.
    pub fn record_sale<I, K, V>(&mut self, counts: I) -> DomainResult<Money>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let cmd = SalesLedgerCommand::RecordSale(RecordSale::new(self.id, counts, Utc::now()));
        let events = self.execute(&cmd)?;
        Ok(final_price_of(&events))
    }

    /// Price a sale without recording it.
    pub fn quote<I, K, V>(&self, counts: I) -> DomainResult<Money>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let cmd = SalesLedgerCommand::RecordSale(RecordSale::new(self.id, counts, Utc::now()));
        let events = self.handle(&cmd)?;
        Ok(final_price_of(&events))
    }

    fn position_of(&self, name: &str) -> DomainResult<usize> {
        self.catalog
            .item_names()
            .position(|n| n == name)
            .ok_or_else(|| DomainError::unknown_item(name))
    }
}

fn final_price_of(events: &[SalesLedgerEvent]) -> Money {
    events
        .iter()
        .find_map(|e| match e {
            SalesLedgerEvent::SaleRecorded(sale) => Some(sale.final_price),
            SalesLedgerEvent::LedgerReset(_) => None,
        })
        .unwrap_or(Money::ZERO)
}

impl AggregateRoot for SalesLedger {
    type Id = SalesLedgerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: ResetLedger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetLedger {
    pub ledger_id: SalesLedgerId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordSale.
///
/// `counts` pairs each item name with the raw text typed into that item's
/// field, in the order given. A name may appear at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSale {
    pub ledger_id: SalesLedgerId,
    pub counts: Vec<(String, String)>,
    pub occurred_at: DateTime<Utc>,
}

impl RecordSale {
    pub fn new<I, K, V>(ledger_id: SalesLedgerId, counts: I, occurred_at: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            ledger_id,
            counts: counts
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            occurred_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SalesLedgerCommand {
    ResetLedger(ResetLedger),
    RecordSale(RecordSale),
}

/// One priced line of a recorded sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub item: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Event: LedgerReset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReset {
    pub ledger_id: SalesLedgerId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SaleRecorded.
///
/// Carries one line per catalog item (zero quantities included).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleRecorded {
    pub ledger_id: SalesLedgerId,
    pub lines: Vec<SaleLine>,
    pub subtotal: Money,
    pub tax: TaxRate,
    pub final_price: Money,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SalesLedgerEvent {
    LedgerReset(LedgerReset),
    SaleRecorded(SaleRecorded),
}

impl Event for SalesLedgerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SalesLedgerEvent::LedgerReset(_) => "sales.ledger.reset",
            SalesLedgerEvent::SaleRecorded(_) => "sales.ledger.sale_recorded",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SalesLedgerEvent::LedgerReset(e) => e.occurred_at,
            SalesLedgerEvent::SaleRecorded(e) => e.occurred_at,
        }
    }
}

impl Aggregate for SalesLedger {
    type Command = SalesLedgerCommand;
    type Event = SalesLedgerEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            SalesLedgerEvent::LedgerReset(_) => {
                self.counts.iter_mut().for_each(|c| *c = 0);
                self.total_profit = Money::ZERO;
                self.last_sale_at = None;
            }
            SalesLedgerEvent::SaleRecorded(e) => {
                for line in &e.lines {
                    if let Ok(i) = self.position_of(&line.item) {
                        self.counts[i] = self.counts[i].saturating_add(u64::from(line.quantity));
                    }
                }
                self.total_profit = Money::from_cents(
                    self.total_profit.cents().saturating_add(e.final_price.cents()),
                );
                self.last_sale_at = Some(e.occurred_at);
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            SalesLedgerCommand::ResetLedger(cmd) => self.handle_reset(cmd),
            SalesLedgerCommand::RecordSale(cmd) => self.handle_record_sale(cmd),
        }
    }
}

impl SalesLedger {
    fn ensure_ledger_id(&self, ledger_id: SalesLedgerId) -> Result<(), DomainError> {
        if self.id != ledger_id {
            return Err(DomainError::invalid_input("ledger_id", ledger_id.to_string()));
        }
        Ok(())
    }

    fn handle_reset(&self, cmd: &ResetLedger) -> Result<Vec<SalesLedgerEvent>, DomainError> {
        self.ensure_ledger_id(cmd.ledger_id)?;

        Ok(vec![SalesLedgerEvent::LedgerReset(LedgerReset {
            ledger_id: cmd.ledger_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record_sale(&self, cmd: &RecordSale) -> Result<Vec<SalesLedgerEvent>, DomainError> {
        self.ensure_ledger_id(cmd.ledger_id)?;

        if let Some((unknown, _)) = cmd
            .counts
            .iter()
            .find(|(name, _)| !self.catalog.contains(name.as_str()))
        {
            return Err(DomainError::unknown_item(unknown.as_str()));
        }
        for (i, (name, raw)) in cmd.counts.iter().enumerate() {
            if cmd.counts[..i].iter().any(|(seen, _)| seen == name) {
                return Err(DomainError::invalid_input(name.as_str(), raw.as_str()));
            }
        }

        // Validate every field (catalog order) before pricing anything.
        let mut lines = Vec::with_capacity(self.catalog.len());
        for item in self.catalog.items() {
            let raw = cmd
                .counts
                .iter()
                .find(|(name, _)| name == item.name())
                .map_or("", |(_, raw)| raw.as_str());
            let quantity = parse_quantity(item.name(), raw)?;
            let line_total = item.unit_price().checked_times(u64::from(quantity))?;
            lines.push(SaleLine {
                item: item.name().to_string(),
                quantity,
                unit_price: item.unit_price(),
                line_total,
            });
        }

        let subtotal = lines
            .iter()
            .try_fold(Money::ZERO, |acc, line| acc.checked_add(line.line_total))?;
        let final_price = self.tax.apply(subtotal)?;

        // Reject now anything that would not fit once committed.
        self.total_profit.checked_add(final_price)?;
        for (count, line) in self.counts.iter().zip(&lines) {
            count
                .checked_add(u64::from(line.quantity))
                .ok_or(DomainError::Overflow)?;
        }

        Ok(vec![SalesLedgerEvent::SaleRecorded(SaleRecorded {
            ledger_id: cmd.ledger_id,
            lines,
            subtotal,
            tax: self.tax,
            final_price,
            occurred_at: cmd.occurred_at,
        })])
    }
}
