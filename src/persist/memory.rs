use crate::persist::KeyValueStore;
use crate::Result;
use std::collections::BTreeMap;

/// An implementation of `KeyValueStore` that holds everything in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: BTreeMap<String, String>,
    fail_writes: bool,
    fail_key: Option<String>,
}

impl MemoryStore {
    /// While set, every `set` fails and nothing is stored.
    pub fn set_fail_writes(&mut self, fail_writes: bool) {
        self.fail_writes = fail_writes;
    }

    /// From now on, writes to `key` fail while writes to other keys succeed.
    pub fn set_fail_writes_to(&mut self, key: &str) {
        self.fail_key = Some(key.to_string());
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.data.get(key).cloned())
    }

    async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        anyhow::ensure!(
            !self.fail_writes && self.fail_key.as_deref() != Some(key),
            "Writes to '{key}' are disabled"
        );
        self.data.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
