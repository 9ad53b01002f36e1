//! Domain events.
//!
//! Every aggregate in the workspace describes its state changes as events;
//! this crate holds the trait they share.

pub mod event;

pub use event::Event;
