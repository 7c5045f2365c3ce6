use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use lablink_core::{Aggregate, AggregateId, AggregateRoot, DomainError};
use lablink_events::Event;
use lablink_inventory::ItemId;

use crate::ledger::{LoanId, LoanRecord, RejectionRecord, RequestRecord, RequestStatus};

/// Loan request identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub AggregateId);

impl RequestId {
    /// Mint a fresh, unique request id.
    pub fn generate() -> Self {
        Self(AggregateId::new())
    }
}

impl core::fmt::Display for RequestId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::str::FromStr for RequestId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<AggregateId>()
            .map(Self)
            .map_err(|_| DomainError::invalid_id(format!("request id `{s}`")))
    }
}

/// Aggregate root: LoanRequest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanRequest {
    id: RequestId,
    item_id: Option<ItemId>,
    item_name: String,
    student_name: String,
    reg_no: String,
    return_date: Option<NaiveDate>,
    status: RequestStatus,
    requested_at: Option<DateTime<Utc>>,
    decided_at: Option<DateTime<Utc>>,
    loan_id: Option<LoanId>,
    version: u64,
    created: bool,
}

impl LoanRequest {
    /// Create an empty, not-yet-submitted aggregate instance.
    pub fn empty(id: RequestId) -> Self {
        Self {
            id,
            item_id: None,
            item_name: String::new(),
            student_name: String::new(),
            reg_no: String::new(),
            return_date: None,
            status: RequestStatus::Pending,
            requested_at: None,
            decided_at: None,
            loan_id: None,
            version: 0,
            created: false,
        }
    }

    /// Rehydrate a pending request from its ledger record.
    pub fn from_record(record: RequestRecord) -> Self {
        Self {
            id: record.request_id,
            item_id: Some(record.item_id),
            item_name: record.item_name,
            student_name: record.student_name,
            reg_no: record.reg_no,
            return_date: Some(record.return_date),
            status: record.status,
            requested_at: Some(record.request_date),
            decided_at: None,
            loan_id: None,
            version: 0,
            created: true,
        }
    }

    pub fn id_typed(&self) -> RequestId {
        self.id
    }

    pub fn item_id(&self) -> Option<ItemId> {
        self.item_id
    }

    pub fn item_name(&self) -> &str {
        &self.item_name
    }

    pub fn reg_no(&self) -> &str {
        &self.reg_no
    }

    pub fn status(&self) -> RequestStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.created && self.status == RequestStatus::Pending
    }

    /// Snapshot of the request; `None` until it has been submitted.
    pub fn record(&self) -> Option<RequestRecord> {
        if !self.created {
            return None;
        }
        Some(RequestRecord {
            request_id: self.id,
            item_id: self.item_id?,
            item_name: self.item_name.clone(),
            student_name: self.student_name.clone(),
            reg_no: self.reg_no.clone(),
            return_date: self.return_date?,
            status: self.status,
            request_date: self.requested_at?,
        })
    }

    /// The loan this request became; `None` unless it was approved.
    pub fn loan_record(&self) -> Option<LoanRecord> {
        if self.status != RequestStatus::Approved {
            return None;
        }
        Some(LoanRecord {
            loan_id: self.loan_id?,
            request: self.record()?,
            approved_date: self.decided_at?,
        })
    }

    /// The rejection this request became; `None` unless it was rejected.
    pub fn rejection_record(&self) -> Option<RejectionRecord> {
        if self.status != RequestStatus::Rejected {
            return None;
        }
        Some(RejectionRecord {
            request: self.record()?,
            rejected_date: self.decided_at?,
        })
    }
}

impl AggregateRoot for LoanRequest {
    type Id = RequestId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: SubmitRequest.
///
/// `item_name` is the caller's snapshot of the item at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub request_id: RequestId,
    pub item_id: ItemId,
    pub item_name: String,
    pub student_name: String,
    pub reg_no: String,
    pub return_date: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ApproveRequest.
///
/// `loan_id` names the loan the request becomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveRequest {
    pub request_id: RequestId,
    pub loan_id: LoanId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RejectRequest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectRequest {
    pub request_id: RequestId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanRequestCommand {
    Submit(SubmitRequest),
    Approve(ApproveRequest),
    Reject(RejectRequest),
}

/// Event: RequestSubmitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSubmitted {
    pub request_id: RequestId,
    pub item_id: ItemId,
    pub item_name: String,
    pub student_name: String,
    pub reg_no: String,
    pub return_date: NaiveDate,
    pub occurred_at: DateTime<Utc>,
}

/// Event: RequestApproved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestApproved {
    pub request_id: RequestId,
    pub loan_id: LoanId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: RequestRejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestRejected {
    pub request_id: RequestId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanRequestEvent {
    Submitted(RequestSubmitted),
    Approved(RequestApproved),
    Rejected(RequestRejected),
}

impl Event for LoanRequestEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LoanRequestEvent::Submitted(_) => "lending.request.submitted",
            LoanRequestEvent::Approved(_) => "lending.request.approved",
            LoanRequestEvent::Rejected(_) => "lending.request.rejected",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LoanRequestEvent::Submitted(e) => e.occurred_at,
            LoanRequestEvent::Approved(e) => e.occurred_at,
            LoanRequestEvent::Rejected(e) => e.occurred_at,
        }
    }
}

impl Aggregate for LoanRequest {
    type Command = LoanRequestCommand;
    type Event = LoanRequestEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            LoanRequestEvent::Submitted(e) => {
                self.id = e.request_id;
                self.item_id = Some(e.item_id);
                self.item_name = e.item_name.clone();
                self.student_name = e.student_name.clone();
                self.reg_no = e.reg_no.clone();
                self.return_date = Some(e.return_date);
                self.status = RequestStatus::Pending;
                self.requested_at = Some(e.occurred_at);
                self.created = true;
            }
            LoanRequestEvent::Approved(e) => {
                self.status = RequestStatus::Approved;
                self.loan_id = Some(e.loan_id);
                self.decided_at = Some(e.occurred_at);
            }
            LoanRequestEvent::Rejected(e) => {
                self.status = RequestStatus::Rejected;
                self.decided_at = Some(e.occurred_at);
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            LoanRequestCommand::Submit(cmd) => self.handle_submit(cmd),
            LoanRequestCommand::Approve(cmd) => self.handle_approve(cmd),
            LoanRequestCommand::Reject(cmd) => self.handle_reject(cmd),
        }
    }
}

impl LoanRequest {
    fn ensure_request_id(&self, request_id: RequestId) -> Result<(), DomainError> {
        if self.id != request_id {
            return Err(DomainError::invariant("request_id mismatch"));
        }
        Ok(())
    }

    fn ensure_pending(&self) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found("request"));
        }
        if self.status.is_terminal() {
            return Err(DomainError::invariant(format!(
                "request already decided ({:?})",
                self.status
            )));
        }
        Ok(())
    }

    fn handle_submit(&self, cmd: &SubmitRequest) -> Result<Vec<LoanRequestEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("request already exists"));
        }
        let student_name = cmd.student_name.trim();
        if student_name.is_empty() {
            return Err(DomainError::validation("studentName is required"));
        }
        let reg_no = cmd.reg_no.trim();
        if reg_no.is_empty() {
            return Err(DomainError::validation("regNo is required"));
        }

        Ok(vec![LoanRequestEvent::Submitted(RequestSubmitted {
            request_id: cmd.request_id,
            item_id: cmd.item_id,
            item_name: cmd.item_name.clone(),
            student_name: student_name.to_string(),
            reg_no: reg_no.to_string(),
            return_date: cmd.return_date,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_approve(&self, cmd: &ApproveRequest) -> Result<Vec<LoanRequestEvent>, DomainError> {
        self.ensure_pending()?;
        self.ensure_request_id(cmd.request_id)?;
        Ok(vec![LoanRequestEvent::Approved(RequestApproved {
            request_id: cmd.request_id,
            loan_id: cmd.loan_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_reject(&self, cmd: &RejectRequest) -> Result<Vec<LoanRequestEvent>, DomainError> {
        self.ensure_pending()?;
        self.ensure_request_id(cmd.request_id)?;
        Ok(vec![LoanRequestEvent::Rejected(RequestRejected {
            request_id: cmd.request_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}
