use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use tally_core::{DomainError, DomainResult, Money, ValueObject};

/// One sellable item: display name + unit price.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogItem {
    name: String,
    unit_price: Money,
}

impl CatalogItem {
    pub fn new(name: impl Into<String>, unit_price: Money) -> Self {
        Self {
            name: name.into(),
            unit_price,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }
}

impl ValueObject for CatalogItem {}

/// Ordered, immutable list of catalog items.
///
/// Item order is the display order and the order in which a sale is
/// validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    /// Build a catalog from a custom item list.
    ///
    /// The list must be non-empty and names must be non-blank and unique.
    pub fn new(items: Vec<CatalogItem>) -> DomainResult<Self> {
        if items.is_empty() {
            return Err(DomainError::invalid_catalog("catalog must have at least one item"));
        }

        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.name.trim().is_empty() {
                return Err(DomainError::invalid_catalog("item name cannot be empty"));
            }
            if !seen.insert(item.name.as_str()) {
                return Err(DomainError::invalid_catalog(format!(
                    "duplicate item name: {}",
                    item.name
                )));
            }
        }

        Ok(Self { items })
    }

    /// The food stand menu.
    pub fn standard() -> Self {
        Self {
            items: vec![
                CatalogItem::new("Hot Dog", Money::from_cents(250)),
                CatalogItem::new("Brat", Money::from_cents(350)),
                CatalogItem::new("Hamburger", Money::from_cents(500)),
                CatalogItem::new("Fries", Money::from_cents(200)),
                CatalogItem::new("Soda", Money::from_cents(200)),
                CatalogItem::new("Water", Money::ZERO),
            ],
        }
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn item_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.iter().map(|item| item.name.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.iter().any(|item| item.name == name)
    }

    pub fn price_of(&self, name: &str) -> DomainResult<Money> {
        self.items
            .iter()
            .find(|item| item.name == name)
            .map(|item| item.unit_price)
            .ok_or_else(|| DomainError::unknown_item(name))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}
