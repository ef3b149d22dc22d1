use clap::Parser;
use color_eyre::eyre::{
    Result,
    eyre,
};
use config::{
    AppConfig,
    DEFAULT_DATA_DIR,
    StorageBackend,
    expand_path,
};
use rand::{
    SeedableRng,
    rngs::StdRng,
};
use slot_core::{
    UserId,
    admin::AdminAllowlist,
    balance::{
        BalanceBackend,
        in_memory_balance_backend::InMemoryBalanceBackend,
    },
    clock::SystemClock,
    machine::SlotMachine,
    storage::{
        GameStorage,
        in_memory_storage::InMemoryStorage,
        json_file_storage::JsonFileStorage,
        sled_storage::SledStorage,
    },
};
use std::{
    path::Path,
    sync::OnceLock,
};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling,
};
use tracing_subscriber::{
    EnvFilter,
    fmt,
};

mod commands;
mod config;
mod report;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(version, about = "Slot machine with spending limits, achievements and an operator console")]
struct Args {
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    data_dir: String,

    #[arg(long, value_enum, default_value_t = StorageBackend::Sled)]
    storage: StorageBackend,

    /// Player the command acts for
    #[arg(short, long, env = "SLOT_MACHINE_USER")]
    user: Option<String>,

    /// Seed the reels for a reproducible session
    #[arg(long)]
    seed: Option<u64>,

    #[arg(short, long, default_value = "false")]
    tracing: bool,

    /// Write logs to a daily-rolling file in this directory instead of stderr
    #[arg(long)]
    log_dir: Option<String>,

    /// Additional operator emails
    #[arg(
        long = "admin-email",
        env = "SLOT_MACHINE_ADMIN_EMAILS",
        value_delimiter = ','
    )]
    admin_emails: Vec<String>,

    #[command(subcommand)]
    command: commands::Command,
}

impl Args {
    fn config(&self) -> AppConfig {
        let mut admins = AdminAllowlist::default();
        admins.extend(&self.admin_emails);
        AppConfig {
            data_dir: expand_path(&self.data_dir),
            storage: self.storage,
            tracing: self.tracing,
            log_dir: self.log_dir.as_deref().map(expand_path),
            admins,
            user: self.user.as_deref().map(UserId::new),
            seed: self.seed,
        }
    }
}

fn init_tracing(log_dir: Option<&Path>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let installed = match log_dir {
        Some(dir) => {
            let (writer, guard) =
                tracing_appender::non_blocking(rolling::daily(dir, "slot-machine.log"));
            if LOG_GUARD.set(guard).is_err() {
                eprintln!("log file writer already installed, keeping the first one");
            }
            fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(writer)
                .try_init()
        }
        None => fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    if let Err(e) = installed {
        eprintln!("tracing disabled: {e}");
    }
}

fn play<S, B>(command: commands::Command, config: &AppConfig, storage: S, backend: B) -> Result<()>
where
    S: GameStorage,
    B: BalanceBackend,
{
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut machine = SlotMachine::new(storage, backend, SystemClock, rng);
    let output = commands::run(command, config, &mut machine)?;
    println!("{output}");
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    let config = args.config();
    if config.tracing {
        init_tracing(config.log_dir.as_deref());
    }
    config.prepare()?;
    tracing::info!(
        "using {:?} storage in {}",
        config.storage,
        config.data_dir.display()
    );

    match config.storage {
        StorageBackend::Sled => {
            let (storage, backend) =
                SledStorage::open(config.sled_dir()).map_err(|e| eyre!("{e:#}"))?;
            play(args.command, &config, storage, backend)
        }
        StorageBackend::Json => {
            let (_, backend) =
                SledStorage::open(config.sled_dir()).map_err(|e| eyre!("{e:#}"))?;
            let storage = JsonFileStorage::open(config.json_dir()).map_err(|e| eyre!("{e:#}"))?;
            play(args.command, &config, storage, backend)
        }
        StorageBackend::Memory => play(
            args.command,
            &config,
            InMemoryStorage::new(),
            InMemoryBalanceBackend::new(),
        ),
    }
}
