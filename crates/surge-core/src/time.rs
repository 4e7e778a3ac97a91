//! Time abstraction
//!
//! All sale logic that needs the current time MUST go through
//! [`TimeProvider`]. Never call `Utc::now()` or `SystemTime::now()` from the
//! coordinator: the sale window gate is derived from the clock on every
//! request, and tests drive the window across its boundaries with a
//! simulated clock.
//!
//! # Implementations
//!
//! - [`WallClockTime`]: production, backed by the system clock
//! - test clocks: defined inline in test files, manually advanced

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

/// Time provider abstraction
#[async_trait]
pub trait TimeProvider: Send + Sync + std::fmt::Debug {
    /// Get current time in milliseconds since epoch
    fn now_ms(&self) -> u64;

    /// Sleep for the specified duration
    async fn sleep_ms(&self, ms: u64);

    /// Get the current instant as a UTC datetime
    fn now_utc(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp_millis(self.now_ms() as i64)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

/// Production time provider using the wall clock
#[derive(Debug, Clone, Default)]
pub struct WallClockTime;

impl WallClockTime {
    /// Create a new wall clock time provider
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TimeProvider for WallClockTime {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    async fn sleep_ms(&self, ms: u64) {
        tokio::time::sleep(tokio::time::Duration::from_millis(ms)).await;
    }
}
