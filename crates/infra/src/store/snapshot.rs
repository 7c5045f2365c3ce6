use serde::{Deserialize, Serialize};

use lablink_inventory::ItemRecord;
use lablink_lending::{LoanRecord, RejectionRecord, RequestRecord};

/// Persisted lab state: `{inventory, requests, activeLoans, rejected}`.
///
/// Every collection defaults to empty so older files that predate a
/// collection still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabSnapshot {
    #[serde(default)]
    pub inventory: Vec<ItemRecord>,
    /// Pending Requests ledger.
    #[serde(default)]
    pub requests: Vec<RequestRecord>,
    #[serde(default)]
    pub active_loans: Vec<LoanRecord>,
    #[serde(default)]
    pub rejected: Vec<RejectionRecord>,
}
