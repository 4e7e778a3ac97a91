//! Typed key-value state
//!
//! The store holds exactly two kinds of values: string-encoded integers
//! (the stock counter) and string-to-string hashes (the purchase ledger).
//! Type confusion at a key is an error, never a coercion.

use std::collections::HashMap;
use surge_core::{Error, Result};

/// A stored value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer value (the stock counter)
    Integer(i64),
    /// Field -> value hash (the purchase ledger)
    Hash(HashMap<String, String>),
}

/// In-memory key-value state
///
/// Not internally synchronized: whoever owns a `StoreState` owns the
/// execution slot. Backends wrap it in an actor mailbox or a mutex.
#[derive(Debug, Default)]
pub struct StoreState {
    entries: HashMap<String, Value>,
}

impl StoreState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an integer key; absent keys read as `None`
    pub fn get_int(&self, key: &str) -> Result<Option<i64>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(Value::Integer(n)) => Ok(Some(*n)),
            Some(Value::Hash(_)) => Err(Error::WrongType { key: key.into() }),
        }
    }

    /// Write an integer key, creating or overwriting it
    pub fn set_int(&mut self, key: &str, value: i64) -> Result<()> {
        if let Some(Value::Hash(_)) = self.entries.get(key) {
            return Err(Error::WrongType { key: key.into() });
        }
        self.entries.insert(key.into(), Value::Integer(value));
        Ok(())
    }

    /// Decrement an existing integer key by one, returning the new value
    ///
    /// Returns `None` if the key is absent; callers check presence first.
    pub fn decr_int(&mut self, key: &str) -> Result<Option<i64>> {
        match self.entries.get_mut(key) {
            None => Ok(None),
            Some(Value::Integer(n)) => {
                *n -= 1;
                Ok(Some(*n))
            }
            Some(Value::Hash(_)) => Err(Error::WrongType { key: key.into() }),
        }
    }

    /// Read a hash field; absent key or field reads as `None`
    pub fn hash_get(&self, key: &str, field: &str) -> Result<Option<&str>> {
        match self.entries.get(key) {
            None => Ok(None),
            Some(Value::Hash(map)) => Ok(map.get(field).map(String::as_str)),
            Some(Value::Integer(_)) => Err(Error::WrongType { key: key.into() }),
        }
    }

    /// Insert a hash field iff absent, creating the hash if needed
    ///
    /// Returns true if the field was inserted, false if it already existed.
    /// An existing field is never overwritten.
    pub fn hash_set_nx(&mut self, key: &str, field: &str, value: &str) -> Result<bool> {
        let entry = self
            .entries
            .entry(key.into())
            .or_insert_with(|| Value::Hash(HashMap::new()));

        match entry {
            Value::Hash(map) => {
                if map.contains_key(field) {
                    Ok(false)
                } else {
                    map.insert(field.into(), value.into());
                    Ok(true)
                }
            }
            Value::Integer(_) => Err(Error::WrongType { key: key.into() }),
        }
    }

    /// Number of fields in a hash; absent key reads as 0
    pub fn hash_len(&self, key: &str) -> Result<u64> {
        match self.entries.get(key) {
            None => Ok(0),
            Some(Value::Hash(map)) => Ok(map.len() as u64),
            Some(Value::Integer(_)) => Err(Error::WrongType { key: key.into() }),
        }
    }

    /// All field/value pairs of a hash; absent key reads as empty
    pub fn hash_all(&self, key: &str) -> Result<Vec<(String, String)>> {
        match self.entries.get(key) {
            None => Ok(Vec::new()),
            Some(Value::Hash(map)) => Ok(map
                .iter()
                .map(|(f, v)| (f.clone(), v.clone()))
                .collect()),
            Some(Value::Integer(_)) => Err(Error::WrongType { key: key.into() }),
        }
    }

    /// Delete a key; deleting an absent key is a no-op
    pub fn delete(&mut self, key: &str) {
        self.entries.remove(key);
    }
}
