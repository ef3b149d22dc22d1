//! Port to the hosted backend: one numeric balance per user, plus the user
//! listing consumed by the admin views.
//!
//! Writes are blind upserts without any version check, so a stale read
//! followed by a write can overwrite a concurrent update.
use crate::{
    Result,
    UserId,
};
use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};

pub mod in_memory_balance_backend;
pub mod sled_balance_backend;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub email: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

pub trait BalanceBackend {
    /// Point lookup in `user_balances`; `None` when the user has no row yet.
    fn balance(&self, user: &UserId) -> Result<Option<f64>>;

    fn upsert_balance(&mut self, user: &UserId, balance: f64) -> Result<()>;

    fn list_users(&self) -> Result<Vec<UserAccount>>;

    fn upsert_user(&mut self, account: &UserAccount) -> Result<()>;
}
