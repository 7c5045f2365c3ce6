//! Ledger record shapes: pending requests, loans and rejections.
//!
//! Loans and rejections are immutable snapshots of the originating request
//! plus the decision timestamp. `item_name` is captured when the request is
//! submitted and never follows later changes to (or deletion of) the item.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use lablink_core::{AggregateId, DomainError};
use lablink_inventory::ItemId;

use crate::request::RequestId;

/// Identifier of an active loan, minted when its request is approved.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LoanId(pub AggregateId);

impl LoanId {
    pub fn generate() -> Self {
        Self(AggregateId::new())
    }
}

impl core::fmt::Display for LoanId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Request lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// A student's request as it sits in the Pending Requests ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub request_id: RequestId,
    pub item_id: ItemId,
    /// Item name at submission time.
    pub item_name: String,
    pub student_name: String,
    pub reg_no: String,
    pub return_date: NaiveDate,
    pub status: RequestStatus,
    pub request_date: DateTime<Utc>,
}

/// An approved request (Active Loans ledger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRecord {
    /// Snapshots saved before loans carried an id get a fresh one on load.
    #[serde(default)]
    pub loan_id: LoanId,
    #[serde(flatten)]
    pub request: RequestRecord,
    pub approved_date: DateTime<Utc>,
}

/// A rejected request (Rejected Records ledger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectionRecord {
    #[serde(flatten)]
    pub request: RequestRecord,
    pub rejected_date: DateTime<Utc>,
}

/// One student's records, partitioned by ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    pub pending: Vec<RequestRecord>,
    pub approved: Vec<LoanRecord>,
    pub rejected: Vec<RejectionRecord>,
}

impl History {
    pub fn len(&self) -> usize {
        self.pending.len() + self.approved.len() + self.rejected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Admin decision on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Reject => "reject",
        }
    }

    /// Past-tense verb for user-facing messages ("Request approved").
    pub fn past_tense(self) -> &'static str {
        match self {
            Decision::Approve => "approved",
            Decision::Reject => "rejected",
        }
    }
}

impl core::fmt::Display for Decision {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for Decision {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "approve" => Ok(Decision::Approve),
            "reject" => Ok(Decision::Reject),
            other => Err(DomainError::validation(format!(
                "action must be one of: approve, reject (got `{other}`)"
            ))),
        }
    }
}
