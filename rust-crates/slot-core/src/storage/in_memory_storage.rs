use crate::storage::{
    KeyValueStore,
    StorageKey,
};
use anyhow::anyhow;
use std::{
    collections::HashMap,
    sync::{
        Arc,
        Mutex,
        MutexGuard,
    },
};

/// Process-local store. Clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStorage {
    entries: Arc<Mutex<HashMap<StorageKey, Vec<u8>>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Arc<Mutex<HashMap<StorageKey, Vec<u8>>>> {
        self.entries.clone()
    }

    fn lock(&self) -> crate::Result<MutexGuard<'_, HashMap<StorageKey, Vec<u8>>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow!("in-memory storage lock poisoned"))
    }
}

impl KeyValueStore for InMemoryStorage {
    fn get(&self, key: StorageKey) -> crate::Result<Option<Vec<u8>>> {
        let guard = self.lock()?;
        Ok(guard.get(&key).cloned())
    }

    fn put(&mut self, key: StorageKey, value: Vec<u8>) -> crate::Result<()> {
        let mut guard = self.lock()?;
        guard.insert(key, value);
        Ok(())
    }

    fn remove(&mut self, key: StorageKey) -> crate::Result<()> {
        let mut guard = self.lock()?;
        guard.remove(&key);
        Ok(())
    }
}
