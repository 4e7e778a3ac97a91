//! Atomic scripts
//!
//! Each script is a multi-step read-check-write sequence that must execute
//! indivisibly. The functions here are pure over [`StoreState`]; atomicity
//! comes from the backend running them inside its execution slot.
//!
//! Replies are raw `(code, value)` pairs rather than typed enums: the
//! coordinator interprets codes, so a version mismatch between script and
//! consumer surfaces as an explicit protocol error instead of a silently
//! wrong branch.

use crate::state::StoreState;
use surge_core::Result;

/// Reply code: ledger already held an entry for this user
pub const PURCHASE_CODE_ALREADY: i64 = 0;

/// Reply code: entry inserted and counter decremented
pub const PURCHASE_CODE_COMMITTED: i64 = 1;

/// Reply code: counter was zero or absent
pub const PURCHASE_CODE_OUT_OF_STOCK: i64 = 2;

/// A script invocation with its arguments
#[derive(Debug, Clone)]
pub enum Script {
    /// Set the stock counter iff the key is absent. Idempotent across
    /// process restarts.
    ///
    /// Reply: `(1, total)` if the counter was created, `(0, existing)` if it
    /// already existed.
    InitStock { stock_key: String, total: u64 },

    /// Standalone conditional decrement. Not on the hot path; retained for
    /// administrative use and tests.
    ///
    /// Reply: `(1, new_value)` on success, `(0, 0)` when the counter is
    /// zero or negative, `(0, -1)` when the key is absent.
    DecrementStock { stock_key: String },

    /// The combined purchase commit: ledger lookup, stock check, decrement,
    /// ledger insert, as one indivisible unit.
    ///
    /// Reply: `(0, existing_timestamp)`, `(1, remaining)`, or `(2, "0")`.
    Purchase {
        stock_key: String,
        ledger_key: String,
        user_id: String,
        now_iso: String,
    },
}

/// Raw script reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptReply {
    pub code: i64,
    pub value: String,
}

impl ScriptReply {
    fn new(code: i64, value: impl Into<String>) -> Self {
        Self {
            code,
            value: value.into(),
        }
    }
}

/// Evaluate a script against the state
///
/// The caller must hold the execution slot for the whole call; no other
/// command may observe the state between the steps below.
pub fn eval(state: &mut StoreState, script: &Script) -> Result<ScriptReply> {
    match script {
        Script::InitStock { stock_key, total } => {
            match state.get_int(stock_key)? {
                Some(existing) => Ok(ScriptReply::new(0, existing.to_string())),
                None => {
                    state.set_int(stock_key, *total as i64)?;
                    Ok(ScriptReply::new(1, total.to_string()))
                }
            }
        }

        Script::DecrementStock { stock_key } => match state.get_int(stock_key)? {
            None => Ok(ScriptReply::new(0, "-1")),
            Some(n) if n <= 0 => Ok(ScriptReply::new(0, "0")),
            Some(_) => {
                // Present and positive, so the decrement cannot miss.
                let remaining = state.decr_int(stock_key)?.unwrap_or(0);
                Ok(ScriptReply::new(1, remaining.to_string()))
            }
        },

        Script::Purchase {
            stock_key,
            ledger_key,
            user_id,
            now_iso,
        } => {
            if let Some(existing) = state.hash_get(ledger_key, user_id)? {
                return Ok(ScriptReply::new(PURCHASE_CODE_ALREADY, existing));
            }

            match state.get_int(stock_key)? {
                None => Ok(ScriptReply::new(PURCHASE_CODE_OUT_OF_STOCK, "0")),
                Some(n) if n <= 0 => Ok(ScriptReply::new(PURCHASE_CODE_OUT_OF_STOCK, "0")),
                Some(_) => {
                    // The decrement precedes the insert: on a crash between
                    // the two the counter is the authoritative low-water
                    // mark and the next reset corrects the ledger.
                    let remaining = state.decr_int(stock_key)?.unwrap_or(0);
                    state.hash_set_nx(ledger_key, user_id, now_iso)?;
                    Ok(ScriptReply::new(
                        PURCHASE_CODE_COMMITTED,
                        remaining.to_string(),
                    ))
                }
            }
        }
    }
}
