//! Sale API endpoints
//!
//! HTTP mapping is a pure function of the purchase outcome: 200 success,
//! 400 invalid id, 403 outside the window, 409 for the two logical
//! rejections. Store outages surface as 503 via [`ApiError`].

use crate::api::ApiError;
use crate::models::{
    MessageResponse, PurchaseAccepted, PurchaseRejected, PurchaseRequest, RejectReason,
    SaleStatusResponse, UserStatusResponse,
};
use crate::sale::{PurchaseOutcome, SaleState};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use surge_core::UserId;

/// Create sale routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(sale_status))
        .route("/purchase", post(attempt_purchase))
        .route("/purchase/:user_id", get(user_status))
        .route("/reset", post(reset))
}

/// Current sale status
///
/// GET /api/sale/status
async fn sale_status(State(state): State<AppState>) -> Result<Json<SaleStatusResponse>, ApiError> {
    Ok(Json(state.sale().status().await?))
}

/// Attempt a purchase
///
/// POST /api/sale/purchase
async fn attempt_purchase(
    State(state): State<AppState>,
    Json(request): Json<PurchaseRequest>,
) -> Result<Response, ApiError> {
    let outcome = state.sale().attempt_purchase(&request.user_id).await?;
    Ok(purchase_response(outcome))
}

/// Map a purchase outcome onto status code and body
fn purchase_response(outcome: PurchaseOutcome) -> Response {
    match outcome {
        PurchaseOutcome::Success { purchased_at, .. } => (
            StatusCode::OK,
            Json(PurchaseAccepted {
                success: true,
                message: "Purchase successful".into(),
                purchased_at,
            }),
        )
            .into_response(),

        PurchaseOutcome::AlreadyPurchased { purchased_at } => rejection(
            StatusCode::CONFLICT,
            RejectReason::AlreadyPurchased,
            "You have already purchased this item",
            Some(purchased_at),
        ),

        PurchaseOutcome::OutOfStock => rejection(
            StatusCode::CONFLICT,
            RejectReason::OutOfStock,
            "Sold out",
            None,
        ),

        PurchaseOutcome::SaleNotActive { state } => {
            let message = match state {
                SaleState::Upcoming => "Sale has not started yet",
                _ => "Sale has ended",
            };
            rejection(
                StatusCode::FORBIDDEN,
                RejectReason::SaleNotActive,
                message,
                None,
            )
        }

        PurchaseOutcome::InvalidUserId { reason } => rejection(
            StatusCode::BAD_REQUEST,
            RejectReason::InvalidUserId,
            &format!("Invalid user id: {}", reason),
            None,
        ),
    }
}

fn rejection(
    status: StatusCode,
    reason: RejectReason,
    message: &str,
    purchased_at: Option<chrono::DateTime<chrono::Utc>>,
) -> Response {
    (
        status,
        Json(PurchaseRejected {
            success: false,
            reason,
            message: message.into(),
            purchased_at,
        }),
    )
        .into_response()
}

/// Whether a user has purchased
///
/// GET /api/sale/purchase/:user_id
async fn user_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserStatusResponse>, ApiError> {
    let user = UserId::parse(&user_id)?;
    Ok(Json(state.sale().user_status(&user).await?))
}

/// Reset the sale (test-facing)
///
/// POST /api/sale/reset
async fn reset(State(state): State<AppState>) -> Result<Json<MessageResponse>, ApiError> {
    state.sale().reset().await?;
    Ok(Json(MessageResponse {
        success: true,
        message: "Sale reset".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;
    use crate::sale::SaleService;
    use axum::body::Body;
    use axum::http::Request;
    use chrono::{Duration, Utc};
    use std::sync::Arc;
    use surge_core::{SaleConfig, WallClockTime};
    use surge_store::SimStore;
    use tower::ServiceExt;

    /// App over a sim store with an active one-hour window around now
    async fn test_app(total_stock: u64) -> (Router, Arc<SimStore>) {
        let now = Utc::now();
        let mut config = SaleConfig::defaults_at(now);
        config.starts_at = now - Duration::minutes(30);
        config.ends_at = now + Duration::minutes(30);
        config.total_stock = total_stock;

        let store = Arc::new(SimStore::new());
        let service = SaleService::new(store.clone(), &config, Arc::new(WallClockTime::new()));
        service.initialize().await.unwrap();

        (api::router(AppState::new(service)), store)
    }

    fn purchase_request(user_id: &str) -> Request<Body> {
        let body = serde_json::json!({ "userId": user_id });
        Request::builder()
            .method("POST")
            .uri("/api/sale/purchase")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_status_endpoint() {
        let (app, _store) = test_app(10).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/sale/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "active");
        assert_eq!(json["remainingStock"], 10);
        assert_eq!(json["totalStock"], 10);
    }

    #[tokio::test]
    async fn test_purchase_success_and_conflict() {
        let (app, _store) = test_app(10).await;

        let response = app.clone().oneshot(purchase_request("u1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert!(json["purchasedAt"].is_string());

        let response = app.oneshot(purchase_request("u1")).await.unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["reason"], "already_purchased");
    }

    #[tokio::test]
    async fn test_purchase_empty_user_id() {
        let (app, _store) = test_app(10).await;

        let response = app.clone().oneshot(purchase_request("")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["reason"], "invalid_user_id");

        // Absent userId field behaves like an empty one
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/sale/purchase")
                    .header("content-type", "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_user_status_endpoint() {
        let (app, _store) = test_app(10).await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/sale/purchase/u1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["hasPurchased"], false);

        app.clone().oneshot(purchase_request("U1")).await.unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/sale/purchase/u1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["hasPurchased"], true);
        assert!(json["purchasedAt"].is_string());
    }

    #[tokio::test]
    async fn test_reset_endpoint() {
        let (app, _store) = test_app(5).await;

        app.clone().oneshot(purchase_request("u1")).await.unwrap();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/sale/reset")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/sale/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["remainingStock"], 5);
    }

    #[tokio::test]
    async fn test_store_outage_maps_to_503() {
        let (app, store) = test_app(5).await;

        store.set_failing(true);

        let response = app
            .clone()
            .oneshot(purchase_request("u1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/sale/status")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (app, _store) = test_app(1).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }
}
