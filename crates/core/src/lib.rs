//! `tally-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives shared by the register and
//! the grade book (no GUI, no IO).

pub mod aggregate;
pub mod error;
pub mod id;
pub mod input;
pub mod money;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use error::{DomainError, DomainResult};
pub use id::AggregateId;
pub use input::{DEFAULT_FIELD_MAX_LEN, parse_int, parse_quantity, screen_edit};
pub use money::{Money, TaxRate};
pub use value_object::ValueObject;
