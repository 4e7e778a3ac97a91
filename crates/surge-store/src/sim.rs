//! Simulated store
//!
//! In-memory backend with the same semantics as [`ActorStore`] but without
//! a spawned task: a mutex is the execution slot. Adds switchable fault
//! injection so tests can exercise the outage path without killing an
//! actor.
//!
//! Use cases: unit tests, HTTP-level tests, local development.

use crate::script::{self, Script, ScriptReply};
use crate::state::StoreState;
use crate::store::SaleStore;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use surge_core::{Error, Result};

/// In-memory store with fault injection
#[derive(Debug, Clone, Default)]
pub struct SimStore {
    inner: Arc<SimStoreInner>,
}

#[derive(Debug, Default)]
struct SimStoreInner {
    state: Mutex<StoreState>,
    failing: AtomicBool,
}

impl SimStore {
    /// Create an empty simulated store
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch fault injection on or off
    ///
    /// While failing, every operation returns `StoreUnavailable` and leaves
    /// the state untouched.
    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut StoreState) -> Result<T>) -> Result<T> {
        if self.inner.failing.load(Ordering::SeqCst) {
            return Err(Error::store_unavailable("injected fault"));
        }

        let mut state = self
            .inner
            .state
            .lock()
            .map_err(|_| Error::internal("store lock poisoned"))?;
        f(&mut state)
    }
}

#[async_trait]
impl SaleStore for SimStore {
    async fn get_int(&self, key: &str) -> Result<Option<i64>> {
        self.with_state(|state| state.get_int(key))
    }

    async fn set_int(&self, key: &str, value: i64) -> Result<()> {
        self.with_state(|state| state.set_int(key, value))
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>> {
        self.with_state(|state| Ok(state.hash_get(key, field)?.map(str::to_string)))
    }

    async fn hash_set_nx(&self, key: &str, field: &str, value: &str) -> Result<bool> {
        self.with_state(|state| state.hash_set_nx(key, field, value))
    }

    async fn hash_len(&self, key: &str) -> Result<u64> {
        self.with_state(|state| state.hash_len(key))
    }

    async fn hash_all(&self, key: &str) -> Result<Vec<(String, String)>> {
        self.with_state(|state| state.hash_all(key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.with_state(|state| {
            state.delete(key);
            Ok(())
        })
    }

    async fn eval(&self, script: Script) -> Result<ScriptReply> {
        self.with_state(|state| script::eval(state, &script))
    }
}
