//! Identity table loading.

use crate::error::{Error, Result};
use std::path::Path;

/// Ordered identity IDs, index-aligned with a classifier's output vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityTable {
    ids: Vec<String>,
}

impl IdentityTable {
    /// Wrap a list of IDs. Returns `None` for an empty list.
    pub fn new(ids: Vec<String>) -> Option<Self> {
        (!ids.is_empty()).then_some(Self { ids })
    }

    /// Load a JSON array of identity IDs.
    ///
    /// # File Format
    /// - A single JSON array, e.g. `["tom", "felix", "garfield"]`
    /// - Position `i` names classifier output `i`
    /// - Numeric entries are accepted and stored in their decimal form
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::IdentityTableNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| Error::IdentityTableRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let entries: Vec<serde_json::Value> =
            serde_json::from_str(&content).map_err(|e| Error::IdentityTableParse {
                path: path.to_path_buf(),
                source: e,
            })?;

        let ids = entries
            .into_iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect();

        Self::new(ids).ok_or_else(|| Error::IdentityTableEmpty {
            path: path.to_path_buf(),
        })
    }

    /// Number of identities.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Always `false`; empty tables are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// IDs in classifier output order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}
