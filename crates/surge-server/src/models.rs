//! API models
//!
//! JSON bodies for the sale endpoints. Field names are camelCase on the
//! wire; timestamps serialize as RFC 3339 UTC.

use crate::sale::SaleState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Sale Status
// =============================================================================

/// Response for GET /api/sale/status
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleStatusResponse {
    pub status: SaleState,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub remaining_stock: u64,
    pub total_stock: u64,
    pub product_name: String,
    pub product_price: f64,
    pub server_time: DateTime<Utc>,
}

// =============================================================================
// Purchase
// =============================================================================

/// Request body for POST /api/sale/purchase
///
/// A missing `userId` deserializes as empty and is rejected the same way an
/// empty one is.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    #[serde(default)]
    pub user_id: String,
}

/// Success body for POST /api/sale/purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseAccepted {
    /// Always true
    pub success: bool,
    pub message: String,
    pub purchased_at: DateTime<Utc>,
}

/// Failure body for POST /api/sale/purchase
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRejected {
    /// Always false
    pub success: bool,
    pub reason: RejectReason,
    pub message: String,
    /// Present for `already_purchased`: the instant the original purchase
    /// committed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchased_at: Option<DateTime<Utc>>,
}

/// Machine-readable rejection reason
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    InvalidUserId,
    SaleNotActive,
    AlreadyPurchased,
    OutOfStock,
}

// =============================================================================
// User Status
// =============================================================================

/// Response for GET /api/sale/purchase/:user_id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusResponse {
    pub has_purchased: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchased_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Plumbing
// =============================================================================

/// Generic acknowledgement body (reset)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Error response body for non-purchase failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("bad_request", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new("store_unavailable", message)
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_request_defaults_missing_user_id() {
        let req: PurchaseRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.user_id, "");

        let req: PurchaseRequest = serde_json::from_str(r#"{"userId":"u1"}"#).unwrap();
        assert_eq!(req.user_id, "u1");
    }

    #[test]
    fn test_reject_reason_wire_names() {
        assert_eq!(
            serde_json::to_string(&RejectReason::AlreadyPurchased).unwrap(),
            "\"already_purchased\""
        );
        assert_eq!(
            serde_json::to_string(&RejectReason::OutOfStock).unwrap(),
            "\"out_of_stock\""
        );
        assert_eq!(
            serde_json::to_string(&RejectReason::SaleNotActive).unwrap(),
            "\"sale_not_active\""
        );
        assert_eq!(
            serde_json::to_string(&RejectReason::InvalidUserId).unwrap(),
            "\"invalid_user_id\""
        );
    }

    #[test]
    fn test_rejection_omits_absent_purchased_at() {
        let body = PurchaseRejected {
            success: false,
            reason: RejectReason::OutOfStock,
            message: "sold out".into(),
            purchased_at: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("purchasedAt"));
    }
}
