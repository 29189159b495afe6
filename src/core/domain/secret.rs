//! Decrypted variables.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use zeroize::Zeroizing;

use crate::core::types::VariableKey;

/// One decrypted variable with its server-side metadata.
#[derive(Clone)]
pub struct Secret {
    value: Zeroizing<String>,
    created_at: String,
}

impl Secret {
    pub fn new(value: Zeroizing<String>, created_at: impl Into<String>) -> Self {
        Self {
            value,
            created_at: created_at.into(),
        }
    }

    /// Plaintext value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Server timestamp, empty when the server sent none.
    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// Parsed server timestamp, if it is RFC 3339.
    pub fn created(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("value", &"[redacted]")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// The decrypted contents of a scope, keyed by variable name.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    entries: BTreeMap<VariableKey, Secret>,
}

impl Secrets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<VariableKey>, secret: Secret) {
        self.entries.insert(key.into(), secret);
    }

    /// Plaintext value of one variable.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(Secret::value)
    }

    /// Variable with metadata.
    pub fn secret(&self, key: &str) -> Option<&Secret> {
        self.entries.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Secret)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Plaintext values without metadata.
    pub fn values(&self) -> BTreeMap<VariableKey, Zeroizing<String>> {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.value.clone()))
            .collect()
    }
}

impl FromIterator<(VariableKey, Secret)> for Secrets {
    fn from_iter<I: IntoIterator<Item = (VariableKey, Secret)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
