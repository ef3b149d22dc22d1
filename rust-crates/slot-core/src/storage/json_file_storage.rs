// One JSON file per storage key inside a data directory.
use crate::storage::{
    KeyValueStore,
    StorageKey,
};
use anyhow::Context;
use std::{
    fs,
    io::ErrorKind,
    path::{
        Path,
        PathBuf,
    },
};

#[derive(Clone, Debug)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn open(dir: impl AsRef<Path>) -> crate::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        if !dir.exists() {
            fs::create_dir_all(&dir).with_context(|| {
                format!("Failed to create storage directory {}", dir.display())
            })?;
        }
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: StorageKey) -> PathBuf {
        self.dir.join(format!("{}.json", key.as_str()))
    }
}

impl KeyValueStore for JsonFileStorage {
    fn get(&self, key: StorageKey) -> crate::Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(data) if data.iter().all(u8::is_ascii_whitespace) => Ok(None),
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    fn put(&mut self, key: StorageKey, value: Vec<u8>) -> crate::Result<()> {
        let path = self.path_for(key);
        fs::write(&path, value)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    fn remove(&mut self, key: StorageKey) -> crate::Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove {}", path.display())),
        }
    }
}
