//! Domain events shared by the inventory and lending aggregates.

pub mod event;

pub use event::Event;
