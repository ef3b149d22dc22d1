// Sled-backed storage for game state and balances.
use crate::{
    balance::sled_balance_backend::SledBalanceBackend,
    storage::{
        KeyValueStore,
        StorageKey,
    },
};
use anyhow::Context;
use sled::{
    Config,
    Db,
    Tree,
};
use std::path::Path;

#[derive(Clone)]
pub struct SledStorage {
    tree: Tree,
}

impl SledStorage {
    pub fn new(db: &Db) -> crate::Result<Self> {
        let tree = db.open_tree("game_state").context("open game_state tree")?;
        Ok(Self { tree })
    }

    /// Opens the database at `path` and returns both the game-state store and
    /// the balance backend sharing it.
    pub fn open<P: AsRef<Path>>(path: P) -> crate::Result<(Self, SledBalanceBackend)> {
        let config = Config::default().path(path);
        let db = config.open().context("open sled database")?;
        let storage = Self::new(&db)?;
        let balances = SledBalanceBackend::new(&db)?;
        Ok((storage, balances))
    }
}

impl KeyValueStore for SledStorage {
    fn get(&self, key: StorageKey) -> crate::Result<Option<Vec<u8>>> {
        let value = self
            .tree
            .get(key.as_str())
            .with_context(|| format!("read {}", key.as_str()))?;
        Ok(value.map(|bytes| bytes.to_vec()))
    }

    fn put(&mut self, key: StorageKey, value: Vec<u8>) -> crate::Result<()> {
        self.tree
            .insert(key.as_str(), value)
            .with_context(|| format!("persist {}", key.as_str()))?;
        self.tree.flush().context("flush game_state tree")?;
        Ok(())
    }

    fn remove(&mut self, key: StorageKey) -> crate::Result<()> {
        self.tree
            .remove(key.as_str())
            .with_context(|| format!("remove {}", key.as_str()))?;
        self.tree.flush().context("flush game_state tree")?;
        Ok(())
    }
}
