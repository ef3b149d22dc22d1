pub mod admin;

pub mod achievements;

pub mod analytics;

pub mod balance;

pub mod clock;

pub mod evaluator;

pub mod leaderboard;

pub mod machine;

pub mod settings;

pub mod spending;

pub mod spin;

pub mod storage;

pub mod symbols;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

pub type Result<T, E = anyhow::Error> = std::result::Result<T, E>;

pub use spin::{
    SpinRecord,
    UserId,
};
