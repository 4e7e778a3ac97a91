//! Server state
//!
//! Thread-safe shared state for the HTTP handlers: a clone-cheap handle
//! over the sale service and process start time. All sale state lives in
//! the store; nothing here is mutable.

use crate::sale::SaleService;
use std::sync::Arc;
use std::time::Instant;

/// Server-wide shared state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    sale: SaleService,
    cors_origin: Option<String>,
    start_time: Instant,
}

impl AppState {
    /// Create server state with a permissive CORS policy
    pub fn new(sale: SaleService) -> Self {
        Self::with_cors_origin(sale, None)
    }

    /// Create server state with an explicit allowed CORS origin
    pub fn with_cors_origin(sale: SaleService, cors_origin: Option<String>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                sale,
                cors_origin,
                start_time: Instant::now(),
            }),
        }
    }

    /// The sale coordinator
    pub fn sale(&self) -> &SaleService {
        &self.inner.sale
    }

    /// Configured CORS origin, if any
    pub fn cors_origin(&self) -> Option<&str> {
        self.inner.cors_origin.as_deref()
    }

    /// Seconds since the server started
    pub fn uptime_seconds(&self) -> u64 {
        self.inner.start_time.elapsed().as_secs()
    }
}
