//! Store trait
//!
//! The boundary contract of the Atomic Store: integer operations on the
//! counter key, hash operations on the ledger key, and script evaluation.
//! The stock counter and purchase ledger are shared across all request
//! handlers; mutation on the hot path is permitted only via [`Script`]s.

use crate::script::{Script, ScriptReply};
use async_trait::async_trait;
use surge_core::Result;

/// Atomic store contract
///
/// Implementations guarantee a single execution slot: two operations never
/// interleave, and a script's steps commit as one indivisible unit. Handles
/// are shared across concurrent requests.
#[async_trait]
pub trait SaleStore: Send + Sync {
    /// Read an integer key; absent keys read as `None`
    async fn get_int(&self, key: &str) -> Result<Option<i64>>;

    /// Write an integer key, creating or overwriting it
    async fn set_int(&self, key: &str, value: i64) -> Result<()>;

    /// Read a hash field
    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>>;

    /// Insert a hash field iff absent; returns whether it was inserted
    async fn hash_set_nx(&self, key: &str, field: &str, value: &str) -> Result<bool>;

    /// Number of fields in a hash; absent key reads as 0
    async fn hash_len(&self, key: &str) -> Result<u64>;

    /// All field/value pairs of a hash; admin/debug use only
    async fn hash_all(&self, key: &str) -> Result<Vec<(String, String)>>;

    /// Delete a key
    async fn delete(&self, key: &str) -> Result<()>;

    /// Execute a script indivisibly and return its raw reply
    async fn eval(&self, script: Script) -> Result<ScriptReply>;
}
