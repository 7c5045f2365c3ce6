//! Inventory domain module.
//!
//! This crate contains business rules for lendable lab equipment, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod item;

pub use item::{
    AddItem, CheckOutUnit, InventoryCommand, InventoryEvent, Item, ItemAdded, ItemId, ItemRecord,
    UnitCheckedOut, parse_quantity,
};
