//! The per-run shared context.

use crate::errors::DataConflictError;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// Reserved key under which the initial input is stored.
pub const INITIAL_INPUT_KEY: &str = "idea";

/// An insertion-ordered mapping from variable name to produced text.
///
/// The context only grows: writing to an existing key raises a
/// `DataConflictError` and keys are never removed. A context belongs to a
/// single run and is mutated only by the runner executing that run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedContext {
    order: Vec<String>,
    values: HashMap<String, String>,
}

impl SharedContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context holding only the initial input.
    #[must_use]
    pub fn seeded(initial_input: impl Into<String>) -> Self {
        let mut context = Self::new();
        context.order.push(INITIAL_INPUT_KEY.to_string());
        context
            .values
            .insert(INITIAL_INPUT_KEY.to_string(), initial_input.into());
        context
    }

    /// Gets a value from the context.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns the initial input, if seeded.
    #[must_use]
    pub fn initial_input(&self) -> Option<&str> {
        self.get(INITIAL_INPUT_KEY)
    }

    /// Checks if a key exists.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Inserts a new value.
    ///
    /// # Errors
    ///
    /// Returns `DataConflictError` if the key already exists.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), DataConflictError> {
        let key = key.into();
        if self.values.contains_key(&key) {
            return Err(DataConflictError::new(key));
        }

        self.order.push(key.clone());
        self.values.insert(key, value.into());
        Ok(())
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if the context is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Returns entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .map(|key| (key.as_str(), self.values[key].as_str()))
    }

    /// Returns the produced artifacts, i.e. every entry except the initial input.
    pub fn artifacts(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(key, _)| *key != INITIAL_INPUT_KEY)
    }

    /// Returns a copy of all data.
    #[must_use]
    pub fn to_map(&self) -> HashMap<String, String> {
        self.values.clone()
    }
}

impl Serialize for SharedContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
