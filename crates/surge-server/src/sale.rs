//! Sale coordinator
//!
//! Derives the sale state from the clock, orchestrates the purchase
//! transaction, and exposes the read endpoints.
//!
//! The window gate runs *before* the atomic commit: once the window closes,
//! further commits are forbidden even if stock remains. The gate is not part
//! of the atomic script, so a purchase interleaving with window expiry may
//! still commit; the window is a soft gate measured in seconds, not a strict
//! global deadline.

use crate::inventory::Inventory;
use crate::ledger::{self, Ledger};
use crate::models::{SaleStatusResponse, UserStatusResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use surge_core::{Error, Result, SaleConfig, TimeProvider, UserId, LEDGER_KEY, STOCK_KEY};
use surge_store::script::{
    PURCHASE_CODE_ALREADY, PURCHASE_CODE_COMMITTED, PURCHASE_CODE_OUT_OF_STOCK,
};
use surge_store::{SaleStore, Script};

// =============================================================================
// Sale Window
// =============================================================================

/// Derived sale state
///
/// Always recomputed from the clock, never cached or stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleState {
    Upcoming,
    Active,
    Ended,
}

impl fmt::Display for SaleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaleState::Upcoming => f.write_str("upcoming"),
            SaleState::Active => f.write_str("active"),
            SaleState::Ended => f.write_str("ended"),
        }
    }
}

/// The configured sale window, a closed interval
#[derive(Debug, Clone, Copy)]
pub struct SaleWindow {
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl SaleWindow {
    /// Derive the sale state at an instant; both bounds are inclusive
    pub fn state_at(&self, now: DateTime<Utc>) -> SaleState {
        if now < self.starts_at {
            SaleState::Upcoming
        } else if now > self.ends_at {
            SaleState::Ended
        } else {
            SaleState::Active
        }
    }
}

// =============================================================================
// Purchase Outcome
// =============================================================================

/// Tagged outcome of one purchase attempt
///
/// Logical rejections are first-class outcomes, not errors; `Err(_)` from
/// [`SaleService::attempt_purchase`] means a store outage or a protocol bug.
#[derive(Debug, Clone, PartialEq)]
pub enum PurchaseOutcome {
    Success {
        purchased_at: DateTime<Utc>,
        remaining: u64,
    },
    AlreadyPurchased {
        purchased_at: DateTime<Utc>,
    },
    OutOfStock,
    SaleNotActive {
        state: SaleState,
    },
    InvalidUserId {
        reason: String,
    },
}

// =============================================================================
// Sale Service
// =============================================================================

/// The sale coordinator
///
/// Constructed once at startup and shared by reference across request
/// handlers. Holds no mutable state of its own; every mutation goes through
/// the store's execution slot.
#[derive(Clone)]
pub struct SaleService {
    store: Arc<dyn SaleStore>,
    inventory: Inventory,
    ledger: Ledger,
    window: SaleWindow,
    product_name: String,
    product_price: f64,
    clock: Arc<dyn TimeProvider>,
}

impl SaleService {
    pub fn new(
        store: Arc<dyn SaleStore>,
        config: &SaleConfig,
        clock: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            inventory: Inventory::new(store.clone(), config.total_stock),
            ledger: Ledger::new(store.clone()),
            store,
            window: SaleWindow {
                starts_at: config.starts_at,
                ends_at: config.ends_at,
            },
            product_name: config.product_name.clone(),
            product_price: config.product_price,
            clock,
        }
    }

    /// The inventory module (admin/test surface)
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// The purchase ledger (admin/test surface)
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Startup step: create the stock counter iff absent
    pub async fn initialize(&self) -> Result<()> {
        self.inventory.initialize().await
    }

    /// Current sale status
    ///
    /// One store read. The state and stock fields are microseconds-apart
    /// observations, not a joint snapshot: a caller may see stale stock
    /// while commits are in flight.
    pub async fn status(&self) -> Result<SaleStatusResponse> {
        let now = self.clock.now_utc();
        let remaining_stock = self.inventory.stock().await?;

        Ok(SaleStatusResponse {
            status: self.window.state_at(now),
            starts_at: self.window.starts_at,
            ends_at: self.window.ends_at,
            remaining_stock,
            total_stock: self.inventory.total_stock(),
            product_name: self.product_name.clone(),
            product_price: self.product_price,
            server_time: now,
        })
    }

    /// One purchase attempt: validate, gate on the window, commit
    ///
    /// At-most-once: the atomic script is never retried. An indeterminate
    /// store failure leaves the outcome unknown; callers re-query
    /// [`Self::user_status`] to learn whether the commit happened.
    pub async fn attempt_purchase(&self, raw_user_id: &str) -> Result<PurchaseOutcome> {
        let user = match UserId::parse(raw_user_id) {
            Ok(user) => user,
            Err(Error::InvalidUserId { reason }) => {
                return Ok(PurchaseOutcome::InvalidUserId { reason })
            }
            Err(other) => return Err(other),
        };

        let now = self.clock.now_utc();
        let state = self.window.state_at(now);
        if state != SaleState::Active {
            return Ok(PurchaseOutcome::SaleNotActive { state });
        }

        let reply = self
            .store
            .eval(Script::Purchase {
                stock_key: STOCK_KEY.into(),
                ledger_key: LEDGER_KEY.into(),
                user_id: user.as_str().into(),
                now_iso: ledger::format_purchased_at(now),
            })
            .await?;

        match reply.code {
            PURCHASE_CODE_ALREADY => Ok(PurchaseOutcome::AlreadyPurchased {
                purchased_at: ledger::parse_purchased_at(&reply.value)?,
            }),
            PURCHASE_CODE_COMMITTED => {
                let remaining: i64 = reply.value.parse().map_err(|_| {
                    Error::internal(format!("non-integer purchase reply '{}'", reply.value))
                })?;
                tracing::info!(user = %user, remaining, "purchase committed");
                Ok(PurchaseOutcome::Success {
                    purchased_at: now,
                    remaining: remaining.max(0) as u64,
                })
            }
            PURCHASE_CODE_OUT_OF_STOCK => Ok(PurchaseOutcome::OutOfStock),
            code => Err(Error::ScriptProtocol { code }),
        }
    }

    /// Whether a user has purchased, and when
    pub async fn user_status(&self, user: &UserId) -> Result<UserStatusResponse> {
        let purchased_at = self.ledger.purchase_of(user).await?;
        Ok(UserStatusResponse {
            has_purchased: purchased_at.is_some(),
            purchased_at,
        })
    }

    /// Rewrite the counter to the configured total and empty the ledger
    ///
    /// Test-facing: every user becomes eligible again. Does not reread
    /// configuration.
    pub async fn reset(&self) -> Result<()> {
        self.inventory.reset_stock().await?;
        self.ledger.clear().await?;
        tracing::info!(total = self.inventory.total_stock(), "sale reset");
        Ok(())
    }
}
