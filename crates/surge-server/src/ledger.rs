//! Purchase ledger
//!
//! Owns the user -> purchase-timestamp hash. Entries are inserted by the
//! combined purchase script on the hot path (or by [`Ledger::record`] as a
//! standalone fallback), never overwritten, and cleared only by reset.

use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;
use surge_core::{Error, Result, UserId, LEDGER_KEY};
use surge_store::SaleStore;

/// Format a purchase instant the way the ledger stores it
pub(crate) fn format_purchased_at(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored ledger value back into an instant
pub(crate) fn parse_purchased_at(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::internal(format!("ledger holds unparseable timestamp '{}': {}", raw, e)))
}

/// Result of a standalone purchase record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recorded {
    /// True if this call inserted the entry
    pub recorded: bool,
    /// This purchase's instant, or the earlier one that blocked it
    pub purchased_at: DateTime<Utc>,
}

/// Ledger operations
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn SaleStore>,
}

impl Ledger {
    pub fn new(store: Arc<dyn SaleStore>) -> Self {
        Self { store }
    }

    /// When this user purchased, if ever
    pub async fn purchase_of(&self, user: &UserId) -> Result<Option<DateTime<Utc>>> {
        self.store
            .hash_get(LEDGER_KEY, user.as_str())
            .await?
            .map(|raw| parse_purchased_at(&raw))
            .transpose()
    }

    /// Insert-if-absent fallback path (superseded by the combined purchase
    /// script on the hot path; retained for tests and admin use)
    pub async fn record(&self, user: &UserId, now: DateTime<Utc>) -> Result<Recorded> {
        let value = format_purchased_at(now);
        let inserted = self
            .store
            .hash_set_nx(LEDGER_KEY, user.as_str(), &value)
            .await?;

        if inserted {
            return Ok(Recorded {
                recorded: true,
                purchased_at: now,
            });
        }

        let existing = self
            .purchase_of(user)
            .await?
            .ok_or_else(|| Error::internal("ledger entry vanished between check and read"))?;
        Ok(Recorded {
            recorded: false,
            purchased_at: existing,
        })
    }

    /// Full scan; admin/debug use only
    pub async fn all(&self) -> Result<Vec<(String, DateTime<Utc>)>> {
        self.store
            .hash_all(LEDGER_KEY)
            .await?
            .into_iter()
            .map(|(user, raw)| Ok((user, parse_purchased_at(&raw)?)))
            .collect()
    }

    /// Number of committed purchases
    pub async fn count(&self) -> Result<u64> {
        self.store.hash_len(LEDGER_KEY).await
    }

    /// Drop every entry
    pub async fn clear(&self) -> Result<()> {
        self.store.delete(LEDGER_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surge_store::SimStore;

    fn ledger() -> Ledger {
        Ledger::new(Arc::new(SimStore::new()))
    }

    fn at(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    #[tokio::test]
    async fn test_record_then_lookup() {
        let ledger = ledger();
        let user = UserId::parse("alice").unwrap();
        let now = at("2026-08-01T12:00:00Z");

        assert_eq!(ledger.purchase_of(&user).await.unwrap(), None);

        let first = ledger.record(&user, now).await.unwrap();
        assert!(first.recorded);
        assert_eq!(first.purchased_at, now);

        assert_eq!(ledger.purchase_of(&user).await.unwrap(), Some(now));
        assert_eq!(ledger.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_record_never_overwrites() {
        let ledger = ledger();
        let user = UserId::parse("alice").unwrap();
        let first_at = at("2026-08-01T12:00:00Z");
        let later = at("2026-08-01T12:30:00Z");

        ledger.record(&user, first_at).await.unwrap();
        let second = ledger.record(&user, later).await.unwrap();

        assert!(!second.recorded);
        assert_eq!(second.purchased_at, first_at);
        assert_eq!(ledger.purchase_of(&user).await.unwrap(), Some(first_at));
    }

    #[tokio::test]
    async fn test_clear_empties_the_ledger() {
        let ledger = ledger();
        let now = at("2026-08-01T12:00:00Z");
        for name in ["a", "b", "c"] {
            let user = UserId::parse(name).unwrap();
            ledger.record(&user, now).await.unwrap();
        }
        assert_eq!(ledger.count().await.unwrap(), 3);

        ledger.clear().await.unwrap();
        assert_eq!(ledger.count().await.unwrap(), 0);
        assert!(ledger.all().await.unwrap().is_empty());
    }

    #[test]
    fn test_timestamp_round_trip() {
        let now = at("2026-08-01T12:00:00.123Z");
        let raw = format_purchased_at(now);
        assert_eq!(parse_purchased_at(&raw).unwrap(), now);
    }
}
