//! A local, single-user expense tracker.
//!
//! Expenses are grouped into projects. The library holds the pure parts (the data model, the
//! project store transitions, the monthly views and the CSV/JSON codec) and the adapters around
//! them (the key-value persistence, the session with its import guard and the command handlers
//! used by the `expenses` binary).

pub mod args;
pub mod codec;
pub mod commands;
mod config;
pub mod confirm;
mod error;
pub mod model;
pub mod persist;
pub mod session;
pub mod store;
mod utils;
pub mod view;

pub use config::Config;
pub use error::{error_type, Error, ErrorType, IntoResult, Result};
