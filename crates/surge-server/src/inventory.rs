//! Inventory module
//!
//! Owns the stock counter key. The counter is created by `initialize`,
//! decremented only inside atomic scripts, and rewritten by reset. The
//! module holds no locks of its own; all coordination lives in the store's
//! execution slot.

use std::sync::Arc;
use surge_core::{Error, Result, STOCK_KEY};
use surge_store::{SaleStore, Script};

/// Result of a standalone stock decrement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decrement {
    pub success: bool,
    /// New counter value on success; 0 when the counter was empty, -1 when
    /// it was absent
    pub remaining: i64,
}

/// Stock counter operations
#[derive(Clone)]
pub struct Inventory {
    store: Arc<dyn SaleStore>,
    total_stock: u64,
}

impl Inventory {
    pub fn new(store: Arc<dyn SaleStore>, total_stock: u64) -> Self {
        Self { store, total_stock }
    }

    /// Configured total stock for the sale
    pub fn total_stock(&self) -> u64 {
        self.total_stock
    }

    /// Create the counter iff absent (idempotent across restarts)
    pub async fn initialize(&self) -> Result<()> {
        let reply = self
            .store
            .eval(Script::InitStock {
                stock_key: STOCK_KEY.into(),
                total: self.total_stock,
            })
            .await?;

        if reply.code == 1 {
            tracing::info!(total = self.total_stock, "stock counter created");
        } else {
            tracing::info!(remaining = %reply.value, "stock counter already present, not overwriting");
        }
        Ok(())
    }

    /// Current stock; an absent counter reads as 0
    pub async fn stock(&self) -> Result<u64> {
        let value = self.store.get_int(STOCK_KEY).await?.unwrap_or(0);
        Ok(value.max(0) as u64)
    }

    /// Standalone conditional decrement (admin/test path, not the hot path)
    pub async fn decrement(&self) -> Result<Decrement> {
        let reply = self
            .store
            .eval(Script::DecrementStock {
                stock_key: STOCK_KEY.into(),
            })
            .await?;

        let remaining = reply
            .value
            .parse()
            .map_err(|_| Error::internal(format!("non-integer decrement reply '{}'", reply.value)))?;

        Ok(Decrement {
            success: reply.code == 1,
            remaining,
        })
    }

    /// Unconditionally rewrite the counter to the configured total
    pub async fn reset_stock(&self) -> Result<()> {
        self.store.set_int(STOCK_KEY, self.total_stock as i64).await
    }

    /// Unconditionally set the counter
    pub async fn set_stock(&self, count: u64) -> Result<()> {
        self.store.set_int(STOCK_KEY, count as i64).await
    }
}
