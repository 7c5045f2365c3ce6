//! In-memory lending state: the four ledgers.

use tracing::warn;

use lablink_inventory::{Item, ItemId};
use lablink_lending::{LoanRecord, LoanRequest, RejectionRecord, RequestId, RequestStatus};

use crate::store::LabSnapshot;

/// Items plus the three request ledgers, in insertion order.
///
/// Cloned wholesale for every mutation; the clone is persisted before it
/// replaces the live copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabState {
    pub(crate) items: Vec<Item>,
    pub(crate) pending: Vec<LoanRequest>,
    pub(crate) loans: Vec<LoanRecord>,
    pub(crate) rejected: Vec<RejectionRecord>,
}

impl LabState {
    pub fn from_snapshot(snapshot: LabSnapshot) -> Self {
        let items = snapshot.inventory.into_iter().map(Item::from_record).collect();

        let pending = snapshot
            .requests
            .into_iter()
            .filter(|record| {
                if record.status == RequestStatus::Pending {
                    return true;
                }
                warn!(
                    request_id = %record.request_id,
                    status = ?record.status,
                    "decided request found in pending ledger; skipping"
                );
                false
            })
            .map(LoanRequest::from_record)
            .collect();

        Self {
            items,
            pending,
            loans: snapshot.active_loans,
            rejected: snapshot.rejected,
        }
    }

    pub fn to_snapshot(&self) -> LabSnapshot {
        LabSnapshot {
            inventory: self.items.iter().map(Item::record).collect(),
            requests: self.pending.iter().filter_map(LoanRequest::record).collect(),
            active_loans: self.loans.clone(),
            rejected: self.rejected.clone(),
        }
    }

    pub(crate) fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| item.id_typed() == id)
    }

    pub(crate) fn item_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.iter_mut().find(|item| item.id_typed() == id)
    }

    pub(crate) fn pending_position(&self, id: RequestId) -> Option<usize> {
        self.pending.iter().position(|request| request.id_typed() == id)
    }

    /// Total number of request records across all three ledgers.
    pub fn request_count(&self) -> usize {
        self.pending.len() + self.loans.len() + self.rejected.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use lablink_inventory::ItemRecord;
    use lablink_lending::RequestRecord;

    fn request(status: RequestStatus) -> RequestRecord {
        RequestRecord {
            request_id: RequestId::generate(),
            item_id: ItemId::generate(),
            item_name: "Function Generator".to_string(),
            student_name: "Nila".to_string(),
            reg_no: "24BEE0311".to_string(),
            return_date: NaiveDate::from_ymd_opt(2026, 11, 15).unwrap(),
            status,
            request_date: Utc::now(),
        }
    }

    #[test]
    fn snapshot_round_trip_preserves_order() {
        let snapshot = LabSnapshot {
            inventory: vec![
                ItemRecord {
                    id: ItemId::generate(),
                    name: "A".to_string(),
                    category: String::new(),
                    qty: 1,
                },
                ItemRecord {
                    id: ItemId::generate(),
                    name: "B".to_string(),
                    category: "Kits".to_string(),
                    qty: 0,
                },
            ],
            requests: vec![request(RequestStatus::Pending), request(RequestStatus::Pending)],
            active_loans: vec![],
            rejected: vec![],
        };

        let state = LabState::from_snapshot(snapshot.clone());
        assert_eq!(state.to_snapshot(), snapshot);
        assert_eq!(state.request_count(), 2);
    }

    #[test]
    fn decided_records_in_pending_ledger_are_dropped_on_load() {
        let snapshot = LabSnapshot {
            requests: vec![request(RequestStatus::Approved), request(RequestStatus::Pending)],
            ..LabSnapshot::default()
        };

        let state = LabState::from_snapshot(snapshot);
        assert_eq!(state.pending.len(), 1);
        assert!(state.pending[0].is_pending());
    }
}
