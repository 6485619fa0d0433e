//! Immutable lookup tables backing the search registries.
//!
//! Entries can only be added through a [`RegistryBuilder`] before the table
//! is built. A built [`Registry`] has no mutation path; `try_insert` exists
//! so that callers holding a name at runtime get an error instead of a
//! silently ignored write.

use std::fmt;

use crate::error::{Result, WebhdfsError};

/// A read-only key to value table with insertion order preserved.
pub struct Registry<K, V> {
    name: &'static str,
    entries: Vec<(K, V)>,
}

impl<K, V> Registry<K, V>
where
    K: PartialEq + fmt::Debug,
{
    pub fn builder(name: &'static str) -> RegistryBuilder<K, V> {
        RegistryBuilder {
            name,
            entries: Vec::new(),
        }
    }

    /// Builds a table from a fixed entry list known to have unique keys.
    pub(crate) fn from_entries(name: &'static str, entries: Vec<(K, V)>) -> Self {
        debug_assert!(
            entries
                .iter()
                .enumerate()
                .all(|(index, (key, _))| entries[..index].iter().all(|(other, _)| other != key)),
            "duplicate key in {name}"
        );
        Self { name, entries }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Looks up a key, failing with `UnknownKey` when it is absent.
    pub fn get(&self, key: &K) -> Result<&V> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == key)
            .map(|(_, value)| value)
            .ok_or_else(|| WebhdfsError::UnknownKey(format!("{}: {key:?}", self.name)))
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.iter().any(|(candidate, _)| candidate == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Always fails: built registries are frozen.
    pub fn try_insert(&self, key: K, _value: V) -> Result<()> {
        Err(WebhdfsError::ImmutableRegistry(format!(
            "{}: {key:?}",
            self.name
        )))
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Registry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("name", &self.name)
            .field(
                "keys",
                &self.entries.iter().map(|(key, _)| key).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Initialization-only registration path for a [`Registry`].
pub struct RegistryBuilder<K, V> {
    name: &'static str,
    entries: Vec<(K, V)>,
}

impl<K, V> RegistryBuilder<K, V>
where
    K: PartialEq + fmt::Debug,
{
    /// Registers an entry. Registering the same key twice is an error.
    pub fn register(mut self, key: K, value: V) -> Result<Self> {
        if self.entries.iter().any(|(candidate, _)| candidate == &key) {
            return Err(WebhdfsError::InvalidInput(format!(
                "{}: duplicate registration for {key:?}",
                self.name
            )));
        }
        self.entries.push((key, value));
        Ok(self)
    }

    pub fn build(self) -> Registry<K, V> {
        Registry {
            name: self.name,
            entries: self.entries,
        }
    }
}
