//! Description store implementations

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use lexai_core::DescriptionStore;

/// In-memory store
///
/// Default backing for both the durable and the per-session description
/// stores. No persistence across restarts; deployments that need it plug
/// in their own [`DescriptionStore`].
#[derive(Default)]
pub struct InMemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a stored value (inspection/integrations only; core never reads)
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    /// All stored keys
    pub fn keys(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl DescriptionStore for InMemoryStore {
    async fn set(&self, key: &str, value: &str) -> lexai_core::Result<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
