use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use lablink_core::DomainError;
use lablink_inventory::{ItemId, ItemRecord, parse_quantity};
use lablink_lending::{Decision, RequestId, RequestRecord};

// -------------------------
// Request DTOs
// -------------------------
//
// Fields default to empty so a missing field reaches domain validation and
// comes back as a 400 with a readable message.

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    /// Number or numeric string.
    #[serde(default)]
    pub qty: JsonValue,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequestBody {
    #[serde(default)]
    pub item_id: String,
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub reg_no: String,
    #[serde(default)]
    pub return_date: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleRequestBody {
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub action: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    #[serde(default)]
    pub reg_no: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ItemCreatedResponse {
    pub success: bool,
    pub message: String,
    pub item: ItemRecord,
}

#[derive(Debug, Serialize)]
pub struct RequestCreatedResponse {
    pub success: bool,
    pub message: String,
    pub request: RequestRecord,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
}

// -------------------------
// Parsing helpers
// -------------------------

/// Accept `qty` as a JSON non-negative integer or a numeric string.
pub fn parse_qty(raw: &JsonValue) -> Result<u32, DomainError> {
    match raw {
        JsonValue::Null => Err(DomainError::validation("qty is required")),
        JsonValue::String(s) => parse_quantity(s),
        JsonValue::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| DomainError::validation(format!("qty must be a non-negative integer, got `{n}`"))),
        other => Err(DomainError::validation(format!(
            "qty must be a non-negative integer, got `{other}`"
        ))),
    }
}

/// Blank ids are invalid input. An id that does not parse names no item, so it
/// is not found.
pub fn parse_item_id(raw: &str) -> Result<ItemId, DomainError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DomainError::validation("itemId is required"));
    }
    raw.parse().map_err(|_| DomainError::not_found(format!("item {raw}")))
}

pub fn parse_request_id(raw: &str) -> Result<RequestId, DomainError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DomainError::validation("requestId is required"));
    }
    raw.parse().map_err(|_| DomainError::not_found(format!("request {raw}")))
}

/// `returnDate` as `YYYY-MM-DD`.
pub fn parse_return_date(raw: &str) -> Result<NaiveDate, DomainError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DomainError::validation("returnDate is required"));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| DomainError::validation(format!("returnDate must be YYYY-MM-DD, got `{raw}`")))
}

pub fn parse_decision(raw: &str) -> Result<Decision, DomainError> {
    raw.parse()
}
