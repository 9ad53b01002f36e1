//! Sales ledger domain module.
//!
//! This crate contains the food stand's running tally: how many units of each
//! catalog item were sold and the profit taken, implemented purely as
//! deterministic domain logic (no IO, no GUI, no storage).

pub mod ledger;

pub use ledger::{
    ItemCount, LedgerReset, LedgerSnapshot, RecordSale, ResetLedger, SaleLine, SaleRecorded,
    SalesLedger, SalesLedgerCommand, SalesLedgerEvent, SalesLedgerId,
};
