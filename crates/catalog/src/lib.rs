//! Catalog of sellable items (immutable reference data).
//!
//! The catalog is fixed at process start and is the source of truth for which
//! item names a sales ledger tracks and what each unit costs.

pub mod catalog;

pub use catalog::{Catalog, CatalogItem};
