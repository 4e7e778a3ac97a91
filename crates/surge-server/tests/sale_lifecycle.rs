//! Sale lifecycle through the HTTP surface
//!
//! Drives the router across the whole window with a simulated clock:
//! upcoming -> active -> ended, with the boundary instants inclusive at
//! both ends.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use surge_core::{SaleConfig, TimeProvider};
use surge_server::sale::SaleService;
use surge_server::state::AppState;
use surge_store::SimStore;
use tower::ServiceExt;

/// Manually advanced clock
#[derive(Debug)]
struct SimulatedTime {
    current_ms: AtomicU64,
}

impl SimulatedTime {
    fn at(instant: DateTime<Utc>) -> Self {
        Self {
            current_ms: AtomicU64::new(instant.timestamp_millis() as u64),
        }
    }

    fn set(&self, instant: DateTime<Utc>) {
        self.current_ms
            .store(instant.timestamp_millis() as u64, Ordering::SeqCst);
    }
}

#[async_trait]
impl TimeProvider for SimulatedTime {
    fn now_ms(&self) -> u64 {
        self.current_ms.load(Ordering::SeqCst)
    }

    async fn sleep_ms(&self, ms: u64) {
        self.current_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

fn instant(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
}

struct Fixture {
    app: Router,
    clock: Arc<SimulatedTime>,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
}

/// App whose clock starts one minute before the window opens
async fn fixture(total_stock: u64) -> Fixture {
    let starts_at = instant("2026-08-01T12:00:00Z");
    let ends_at = starts_at + Duration::hours(1);

    let mut config = SaleConfig::defaults_at(starts_at);
    config.starts_at = starts_at;
    config.ends_at = ends_at;
    config.total_stock = total_stock;

    let clock = Arc::new(SimulatedTime::at(starts_at - Duration::minutes(1)));
    let service = SaleService::new(Arc::new(SimStore::new()), &config, clock.clone());
    service.initialize().await.unwrap();

    Fixture {
        app: surge_server::api::router(AppState::new(service)),
        clock,
        starts_at,
        ends_at,
    }
}

fn purchase(user_id: &str) -> Request<Body> {
    let body = serde_json::json!({ "userId": user_id });
    Request::builder()
        .method("POST")
        .uri("/api/sale/purchase")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

fn status_request() -> Request<Body> {
    Request::builder()
        .uri("/api/sale/status")
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_window_gates_purchases() {
    let fx = fixture(10).await;

    // Upcoming: gated with 403, stock untouched
    let response = fx.app.clone().oneshot(purchase("early-bird")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["reason"], "sale_not_active");

    let json = body_json(fx.app.clone().oneshot(status_request()).await.unwrap()).await;
    assert_eq!(json["status"], "upcoming");
    assert_eq!(json["remainingStock"], 10);

    // The open instant itself is inside the window
    fx.clock.set(fx.starts_at);
    let response = fx.app.clone().oneshot(purchase("early-bird")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(fx.app.clone().oneshot(status_request()).await.unwrap()).await;
    assert_eq!(json["status"], "active");
    assert_eq!(json["remainingStock"], 9);

    // The close instant is still inside the window
    fx.clock.set(fx.ends_at);
    let response = fx.app.clone().oneshot(purchase("last-second")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // One millisecond later the sale is over, stock notwithstanding
    fx.clock.set(fx.ends_at + Duration::milliseconds(1));
    let response = fx.app.clone().oneshot(purchase("too-late")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let json = body_json(fx.app.clone().oneshot(status_request()).await.unwrap()).await;
    assert_eq!(json["status"], "ended");
    assert_eq!(json["remainingStock"], 8);
}

#[tokio::test]
async fn test_zero_stock_sale() {
    let fx = fixture(0).await;
    fx.clock.set(fx.starts_at);

    let response = fx.app.clone().oneshot(purchase("hopeful")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["reason"], "out_of_stock");
}

#[tokio::test]
async fn test_server_time_tracks_the_injected_clock() {
    let fx = fixture(1).await;
    fx.clock.set(fx.starts_at + Duration::minutes(7));

    let json = body_json(fx.app.clone().oneshot(status_request()).await.unwrap()).await;
    let server_time = instant(json["serverTime"].as_str().unwrap());
    assert_eq!(server_time, fx.starts_at + Duration::minutes(7));
    assert_eq!(instant(json["startsAt"].as_str().unwrap()), fx.starts_at);
    assert_eq!(instant(json["endsAt"].as_str().unwrap()), fx.ends_at);
}

#[tokio::test]
async fn test_duplicate_after_window_close_is_still_gated() {
    // The gate runs before the ledger lookup: a past buyer asking again
    // after close gets sale_not_active, not already_purchased.
    let fx = fixture(5).await;
    fx.clock.set(fx.starts_at);

    let response = fx.app.clone().oneshot(purchase("buyer")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    fx.clock.set(fx.ends_at + Duration::seconds(1));
    let response = fx.app.clone().oneshot(purchase("buyer")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["reason"], "sale_not_active");

    // The ledger still answers user-status queries after close
    let response = fx
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/sale/purchase/buyer")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert_eq!(json["hasPurchased"], true);
}
