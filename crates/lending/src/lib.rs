//! Lending domain module: the loan request lifecycle.
//!
//! A request is submitted as `Pending` and is decided exactly once, either
//! `Approved` (becoming a loan) or `Rejected`. Both outcomes are terminal.
//! Like the inventory crate this is pure domain logic; coordinating the stock
//! decrement with the ledger move is the engine's job in `lablink-infra`.

pub mod ledger;
pub mod request;

pub use ledger::{
    Decision, History, LoanId, LoanRecord, RejectionRecord, RequestRecord, RequestStatus,
};
pub use request::{
    ApproveRequest, LoanRequest, LoanRequestCommand, LoanRequestEvent, RejectRequest,
    RequestApproved, RequestId, RequestRejected, RequestSubmitted, SubmitRequest,
};
