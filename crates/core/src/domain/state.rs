use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Key/value state shared by every step in a workflow run.
///
/// Each step owns exactly one output key; writes overwrite
/// (last-writer-wins) and readers must tolerate absent keys. There is
/// no rollback: a run that stops midway leaves whatever was already
/// written visible to later readers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    entries: HashMap<String, String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
