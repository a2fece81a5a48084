//! Ordered collection of adapters.
//!
//! Names are matched case-insensitively. Registration order is kept and is
//! the order the runner visits adapters in.

use indexmap::IndexMap;

use crate::contract::Framework;
use crate::error::{HarnessError, Result};

/// Adapters known to the harness, in registration order.
#[derive(Debug)]
pub struct Registry<F> {
    adapters: IndexMap<String, F>,
}

impl<F> Default for Registry<F> {
    fn default() -> Self {
        Self {
            adapters: IndexMap::new(),
        }
    }
}

fn key(name: &str) -> String {
    name.to_lowercase()
}

impl<F: Framework> Registry<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an adapter. Fails if the name is already taken.
    pub fn register(&mut self, adapter: F) -> Result<()> {
        let key = key(adapter.name());
        if self.adapters.contains_key(&key) {
            return Err(HarnessError::DuplicateAdapter(adapter.name().to_string()));
        }
        self.adapters.insert(key, adapter);
        Ok(())
    }

    /// Display names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.adapters.values().map(|adapter| adapter.name()).collect()
    }

    /// Look up an adapter by name, ignoring case.
    pub fn find(&self, name: &str) -> Result<&F> {
        self.get(name)
            .ok_or_else(|| HarnessError::AdapterNotFound(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&F> {
        self.adapters.get(&key(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &F> {
        self.adapters.values()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// A new registry holding only the named adapters, in registration order.
    ///
    /// An empty `names` selects everything. Entries are moved, never removed
    /// from a live registry, so each registry stays append-only.
    pub fn select<S: AsRef<str>>(self, names: &[S]) -> Result<Self> {
        if names.is_empty() {
            return Ok(self);
        }
        let mut wanted = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            self.find(name)?;
            wanted.push(key(name));
        }
        let adapters = self
            .adapters
            .into_iter()
            .filter(|(key, _)| wanted.contains(key))
            .collect();
        Ok(Self { adapters })
    }
}

impl<'a, F> IntoIterator for &'a Registry<F> {
    type Item = &'a F;
    type IntoIter = indexmap::map::Values<'a, String, F>;

    fn into_iter(self) -> Self::IntoIter {
        self.adapters.values()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
