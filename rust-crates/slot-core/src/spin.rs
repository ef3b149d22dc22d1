use crate::symbols::{
    Reels,
    is_jackpot,
};
use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::fmt;

#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Placeholder name used when no email is known for the user.
    pub fn short_label(&self) -> String {
        let prefix: String = self.0.chars().take(8).collect();
        format!("User {prefix}")
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// One entry of the append-only spin log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinRecord {
    pub user_id: UserId,
    pub spin_cost: f64,
    pub win_amount: f64,
    pub result: Reels,
    pub created_at: DateTime<Utc>,
}

impl SpinRecord {
    pub fn is_win(&self) -> bool {
        self.win_amount > 0.0
    }

    pub fn is_jackpot(&self) -> bool {
        is_jackpot(&self.result)
    }

    pub fn net(&self) -> f64 {
        self.win_amount - self.spin_cost
    }
}

/// Spins of one user, in log order.
pub fn spins_for<'a>(
    spins: &'a [SpinRecord],
    user: &'a UserId,
) -> impl Iterator<Item = &'a SpinRecord> + 'a {
    spins.iter().filter(move |spin| &spin.user_id == user)
}
