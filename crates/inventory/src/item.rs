use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lablink_core::{Aggregate, AggregateId, AggregateRoot, DomainError};
use lablink_events::Event;

/// Inventory item identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub AggregateId);

impl ItemId {
    /// Mint a fresh, unique item id.
    pub fn generate() -> Self {
        Self(AggregateId::new())
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::str::FromStr for ItemId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<AggregateId>()
            .map(Self)
            .map_err(|_| DomainError::invalid_id(format!("item id `{s}`")))
    }
}

/// Parse a user-supplied quantity into a non-negative count.
///
/// Surrounding whitespace is ignored; anything else that is not a plain
/// non-negative integer is rejected.
pub fn parse_quantity(raw: &str) -> Result<u32, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation("qty is required"));
    }
    trimmed
        .parse::<u32>()
        .map_err(|_| DomainError::validation(format!("qty must be a non-negative integer, got `{trimmed}`")))
}

/// Serializable state of an item (`{id, name, category, qty}`).
///
/// This is what the store persists and what the HTTP layer returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub qty: u32,
}

/// Aggregate root: Item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    id: ItemId,
    name: String,
    category: String,
    qty: u32,
    version: u64,
    created: bool,
}

impl Item {
    /// Create an empty, not-yet-added aggregate instance.
    pub fn empty(id: ItemId) -> Self {
        Self {
            id,
            name: String::new(),
            category: String::new(),
            qty: 0,
            version: 0,
            created: false,
        }
    }

    /// Rehydrate an item from its persisted record.
    pub fn from_record(record: ItemRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            category: record.category,
            qty: record.qty,
            version: 0,
            created: true,
        }
    }

    pub fn record(&self) -> ItemRecord {
        ItemRecord {
            id: self.id,
            name: self.name.clone(),
            category: self.category.clone(),
            qty: self.qty,
        }
    }

    pub fn id_typed(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qty(&self) -> u32 {
        self.qty
    }

    pub fn in_stock(&self) -> bool {
        self.qty > 0
    }
}

impl AggregateRoot for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: AddItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub item_id: ItemId,
    pub name: String,
    pub category: String,
    pub qty: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CheckOutUnit (one unit leaves the shelf for an approved request).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckOutUnit {
    pub item_id: ItemId,
    pub for_request: AggregateId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryCommand {
    AddItem(AddItem),
    CheckOutUnit(CheckOutUnit),
}

/// Event: ItemAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub item_id: ItemId,
    pub name: String,
    pub category: String,
    pub qty: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: UnitCheckedOut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitCheckedOut {
    pub item_id: ItemId,
    pub for_request: AggregateId,
    pub remaining: u32,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryEvent {
    ItemAdded(ItemAdded),
    UnitCheckedOut(UnitCheckedOut),
}

impl Event for InventoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::ItemAdded(_) => "inventory.item.added",
            InventoryEvent::UnitCheckedOut(_) => "inventory.item.unit_checked_out",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InventoryEvent::ItemAdded(e) => e.occurred_at,
            InventoryEvent::UnitCheckedOut(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Item {
    type Command = InventoryCommand;
    type Event = InventoryEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InventoryEvent::ItemAdded(e) => {
                self.id = e.item_id;
                self.name = e.name.clone();
                self.category = e.category.clone();
                self.qty = e.qty;
                self.created = true;
            }
            InventoryEvent::UnitCheckedOut(e) => {
                self.qty = e.remaining;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InventoryCommand::AddItem(cmd) => self.handle_add(cmd),
            InventoryCommand::CheckOutUnit(cmd) => self.handle_check_out(cmd),
        }
    }
}

impl Item {
    fn ensure_item_id(&self, item_id: ItemId) -> Result<(), DomainError> {
        if self.id != item_id {
            return Err(DomainError::invariant("item_id mismatch"));
        }
        Ok(())
    }

    fn handle_add(&self, cmd: &AddItem) -> Result<Vec<InventoryEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("item already exists"));
        }
        let name = cmd.name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        Ok(vec![InventoryEvent::ItemAdded(ItemAdded {
            item_id: cmd.item_id,
            name: name.to_string(),
            category: cmd.category.trim().to_string(),
            qty: cmd.qty,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_check_out(&self, cmd: &CheckOutUnit) -> Result<Vec<InventoryEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found("item"));
        }
        self.ensure_item_id(cmd.item_id)?;

        let Some(remaining) = self.qty.checked_sub(1) else {
            return Err(DomainError::out_of_stock(self.name.clone()));
        };

        Ok(vec![InventoryEvent::UnitCheckedOut(UnitCheckedOut {
            item_id: cmd.item_id,
            for_request: cmd.for_request,
            remaining,
            occurred_at: cmd.occurred_at,
        })])
    }
}
