use clap::ValueEnum;
use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use slot_core::{
    UserId,
    admin::AdminAllowlist,
};
use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

pub const DEFAULT_DATA_DIR: &str = "~/.slot-machine";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum StorageBackend {
    /// Game state and balances in one sled database
    #[default]
    Sled,
    /// Game state as one JSON file per key, balances in sled
    Json,
    /// Nothing survives the process
    Memory,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub storage: StorageBackend,
    pub tracing: bool,
    pub log_dir: Option<PathBuf>,
    pub admins: AdminAllowlist,
    pub user: Option<UserId>,
    pub seed: Option<u64>,
}

pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

impl AppConfig {
    pub fn sled_dir(&self) -> PathBuf {
        self.data_dir.join("sled")
    }

    pub fn json_dir(&self) -> PathBuf {
        self.data_dir.join("state")
    }

    /// Creates the data directory for the backends that persist anything.
    pub fn prepare(&self) -> Result<()> {
        if self.storage == StorageBackend::Memory {
            return Ok(());
        }
        ensure_dir(&self.data_dir)
    }

    pub fn player(&self) -> Result<&UserId> {
        self.user
            .as_ref()
            .ok_or_else(|| eyre!("pass --user <id> (or set SLOT_MACHINE_USER) to play"))
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .wrap_err_with(|| format!("Failed to create data directory {}", dir.display()))
}
