//! `tally-desktop`
//!
//! **Responsibility:** presentation adapter for the register and grade
//! tracker screens.
//!
//! This crate provides:
//! - `Session`: the explicitly owned state behind both screens
//! - configuration from the environment
//! - views (snapshot → widget strings) and user-facing error messages
//! - a console front end driving the session line by line
//!
//! All business rules live in the domain crates; this is a **thin shell**.

pub mod config;
pub mod console;
pub mod messages;
pub mod session;
pub mod views;

pub use config::{ConfigError, SessionConfig};
pub use console::{Console, Reply};
pub use messages::{Screen, user_message};
pub use session::{ClassSnapshot, Session, SessionSnapshot};
