//! Infrastructure layer: lending engine, persistence, notifications, config.

pub mod config;
pub mod engine;
pub mod notify;
pub mod store;

pub use config::Config;
pub use engine::{DecisionOutcome, LendingEngine, LendingError, NewItem, NewRequest};
