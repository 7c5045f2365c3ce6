//! Lending lifecycle engine.
//!
//! `LendingEngine` owns the lab state and is the only writer. Every mutation
//! follows the same path:
//!
//! ```text
//! lock state
//!   ↓
//! clone state
//!   ↓
//! run aggregate commands against the clone (Item / LoanRequest)
//!   ↓
//! persist the clone as a snapshot
//!   ↓
//! swap the clone in, unlock
//! ```
//!
//! A failing command or a failing save drops the clone, so the live state is
//! never half-updated: a request is in exactly one ledger, and a stock
//! decrement never exists without its loan. Reads clone out from under the
//! same lock.
//!
//! New-request notifications are handed to a [`NotificationQueue`] after the
//! submit has committed; delivery happens elsewhere and cannot fail a submit.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, info};

use lablink_core::{Aggregate, DomainError};
use lablink_events::Event;
use lablink_inventory::{AddItem, CheckOutUnit, InventoryCommand, Item, ItemId, ItemRecord};
use lablink_lending::{
    ApproveRequest, Decision, History, LoanId, LoanRecord, LoanRequest, LoanRequestCommand,
    RejectRequest, RejectionRecord, RequestId, RequestRecord, SubmitRequest,
};

use crate::notify::{NewRequestNotice, NotificationQueue};
use crate::store::{InMemorySnapshotStore, SnapshotStore, StoreError};

mod state;

pub use state::LabState;


/// Engine operation error.
#[derive(Debug, Error)]
pub enum LendingError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("persisting lab state failed: {0}")]
    Store(#[from] StoreError),

    #[error("lab state lock poisoned")]
    Poisoned,
}

/// Input for [`LendingEngine::add_item`]. `qty` is already parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub category: String,
    pub qty: u32,
}

/// Input for [`LendingEngine::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRequest {
    pub item_id: ItemId,
    pub student_name: String,
    pub reg_no: String,
    pub return_date: NaiveDate,
}

/// Result of a successful [`LendingEngine::decide`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecisionOutcome {
    Approved(LoanRecord),
    Rejected(RejectionRecord),
}

impl DecisionOutcome {
    pub fn decision(&self) -> Decision {
        match self {
            DecisionOutcome::Approved(_) => Decision::Approve,
            DecisionOutcome::Rejected(_) => Decision::Reject,
        }
    }
}

pub struct LendingEngine {
    state: Mutex<LabState>,
    store: Arc<dyn SnapshotStore>,
    notifications: NotificationQueue,
}

impl core::fmt::Debug for LendingEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LendingEngine")
            .field("notifications", &self.notifications)
            .finish_non_exhaustive()
    }
}

impl LendingEngine {
    /// Load the last snapshot from `store` (or start empty) and build an engine.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be read or holds a corrupt snapshot.
    pub fn open(
        store: Arc<dyn SnapshotStore>,
        notifications: NotificationQueue,
    ) -> Result<Self, LendingError> {
        let state = match store.load()? {
            Some(snapshot) => LabState::from_snapshot(snapshot),
            None => LabState::default(),
        };
        info!(
            items = state.items.len(),
            pending = state.pending.len(),
            loans = state.loans.len(),
            rejected = state.rejected.len(),
            "lab state loaded"
        );

        Ok(Self {
            state: Mutex::new(state),
            store,
            notifications,
        })
    }

    /// Empty engine backed by an in-memory store with notifications off.
    pub fn in_memory() -> Self {
        Self {
            state: Mutex::new(LabState::default()),
            store: Arc::new(InMemorySnapshotStore::new()),
            notifications: NotificationQueue::disabled(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, LabState>, LendingError> {
        self.state.lock().map_err(|_| LendingError::Poisoned)
    }

    /// Copy, modify, persist, swap.
    fn commit<T>(
        &self,
        change: impl FnOnce(&mut LabState) -> Result<T, LendingError>,
    ) -> Result<T, LendingError> {
        let mut live = self.lock()?;
        let mut next = live.clone();
        let out = change(&mut next)?;
        self.store.save(&next.to_snapshot())?;
        *live = next;
        Ok(out)
    }

    /// Copy of the whole state (tests, diagnostics).
    pub fn state(&self) -> Result<LabState, LendingError> {
        Ok(self.lock()?.clone())
    }

    pub fn list_items(&self) -> Result<Vec<ItemRecord>, LendingError> {
        Ok(self.lock()?.items.iter().map(Item::record).collect())
    }

    pub fn add_item(&self, new: NewItem) -> Result<ItemRecord, LendingError> {
        let record = self.commit(|state| {
            let item_id = ItemId::generate();
            let mut item = Item::empty(item_id);
            let events = item.execute(&InventoryCommand::AddItem(AddItem {
                item_id,
                name: new.name,
                category: new.category,
                qty: new.qty,
                occurred_at: Utc::now(),
            }))?;
            trace_events(&events);
            let record = item.record();
            state.items.push(item);
            Ok(record)
        })?;

        info!(item_id = %record.id, name = %record.name, qty = record.qty, "item added");
        Ok(record)
    }

    /// Remove an item. Requests that reference it keep their `item_name`.
    pub fn delete_item(&self, id: ItemId) -> Result<ItemRecord, LendingError> {
        let record = self.commit(|state| {
            let idx = state
                .items
                .iter()
                .position(|item| item.id_typed() == id)
                .ok_or_else(|| DomainError::not_found(format!("item {id}")))?;
            Ok(state.items.remove(idx).record())
        })?;

        info!(item_id = %record.id, name = %record.name, "item deleted");
        Ok(record)
    }

    pub fn list_pending(&self) -> Result<Vec<RequestRecord>, LendingError> {
        Ok(self
            .lock()?
            .pending
            .iter()
            .filter_map(LoanRequest::record)
            .collect())
    }

    pub fn list_active_loans(&self) -> Result<Vec<LoanRecord>, LendingError> {
        Ok(self.lock()?.loans.clone())
    }

    pub fn list_rejected(&self) -> Result<Vec<RejectionRecord>, LendingError> {
        Ok(self.lock()?.rejected.clone())
    }

    /// Open a pending request for an existing item and queue the admin notice.
    ///
    /// Stock is not touched until approval.
    pub fn submit(&self, new: NewRequest) -> Result<RequestRecord, LendingError> {
        let record = self.commit(|state| {
            let item_name = state
                .item(new.item_id)
                .map(|item| item.name().to_string())
                .ok_or_else(|| DomainError::not_found(format!("item {}", new.item_id)))?;

            let request_id = RequestId::generate();
            let mut request = LoanRequest::empty(request_id);
            let events = request.execute(&LoanRequestCommand::Submit(SubmitRequest {
                request_id,
                item_id: new.item_id,
                item_name,
                student_name: new.student_name,
                reg_no: new.reg_no,
                return_date: new.return_date,
                occurred_at: Utc::now(),
            }))?;
            trace_events(&events);

            let record = request
                .record()
                .ok_or_else(|| DomainError::invariant("submitted request has no record"))?;
            state.pending.push(request);
            Ok(record)
        })?;

        info!(
            request_id = %record.request_id,
            item_id = %record.item_id,
            reg_no = %record.reg_no,
            "request submitted"
        );
        self.notifications
            .enqueue(NewRequestNotice::from_request(&record));
        Ok(record)
    }

    /// Approve or reject a pending request.
    ///
    /// Approval takes one unit of the item; with no stock left (or the item
    /// gone) it fails with `OutOfStock` and the request stays pending.
    pub fn decide(
        &self,
        request_id: RequestId,
        decision: Decision,
    ) -> Result<DecisionOutcome, LendingError> {
        let outcome = self.commit(|state| {
            let idx = state
                .pending_position(request_id)
                .ok_or_else(|| DomainError::not_found(format!("request {request_id}")))?;
            let mut request = state.pending[idx].clone();
            let now = Utc::now();

            let outcome = match decision {
                Decision::Approve => {
                    // A deleted item counts as having no stock.
                    let Some(item) = request.item_id().and_then(|id| state.item_mut(id)) else {
                        return Err(DomainError::out_of_stock(request.item_name()).into());
                    };
                    let item_id = item.id_typed();
                    let events = item.execute(&InventoryCommand::CheckOutUnit(CheckOutUnit {
                        item_id,
                        for_request: request_id.0,
                        occurred_at: now,
                    }))?;
                    trace_events(&events);

                    let events = request.execute(&LoanRequestCommand::Approve(ApproveRequest {
                        request_id,
                        loan_id: LoanId::generate(),
                        occurred_at: now,
                    }))?;
                    trace_events(&events);
                    let loan = request
                        .loan_record()
                        .ok_or_else(|| DomainError::invariant("approved request has no loan"))?;
                    state.loans.push(loan.clone());
                    DecisionOutcome::Approved(loan)
                }
                Decision::Reject => {
                    let events = request.execute(&LoanRequestCommand::Reject(RejectRequest {
                        request_id,
                        occurred_at: now,
                    }))?;
                    trace_events(&events);
                    let rejection = request
                        .rejection_record()
                        .ok_or_else(|| DomainError::invariant("rejected request has no record"))?;
                    state.rejected.push(rejection.clone());
                    DecisionOutcome::Rejected(rejection)
                }
            };

            state.pending.remove(idx);
            Ok(outcome)
        })?;

        match &outcome {
            DecisionOutcome::Approved(loan) => {
                info!(request_id = %request_id, loan_id = %loan.loan_id, "request approved")
            }
            DecisionOutcome::Rejected(_) => info!(request_id = %request_id, "request rejected"),
        }
        Ok(outcome)
    }

    /// Every record for `reg_no`, partitioned by ledger.
    pub fn history(&self, reg_no: &str) -> Result<History, LendingError> {
        let reg_no = reg_no.trim();
        if reg_no.is_empty() {
            return Err(DomainError::validation("Reg No required").into());
        }

        let state = self.lock()?;
        Ok(History {
            pending: state
                .pending
                .iter()
                .filter(|request| request.reg_no() == reg_no)
                .filter_map(LoanRequest::record)
                .collect(),
            approved: state
                .loans
                .iter()
                .filter(|loan| loan.request.reg_no == reg_no)
                .cloned()
                .collect(),
            rejected: state
                .rejected
                .iter()
                .filter(|rejection| rejection.request.reg_no == reg_no)
                .cloned()
                .collect(),
        })
    }
}

fn trace_events<E: Event>(events: &[E]) {
    for event in events {
        debug!(
            event_type = event.event_type(),
            version = event.version(),
            occurred_at = %event.occurred_at(),
            "event applied"
        );
    }
}
