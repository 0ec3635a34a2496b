//! Core logic for the homework status relay.
//!
//! This crate is intentionally framework-agnostic. Telegram lives behind the
//! messaging port implemented in `hwb-telegram`; the Practicum API lives behind
//! the `HomeworkSource` port so the poll loop can be driven by fakes in tests.

pub mod config;
pub mod domain;
pub mod errors;
pub mod homework;
pub mod logging;
pub mod messaging;
pub mod notifier;
pub mod poller;
pub mod practicum;
pub mod verdicts;

pub use errors::{Error, Result};
