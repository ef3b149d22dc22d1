//! Operator-only operations. Callers are expected to check the allowlist
//! before invoking anything else in this module.
use crate::{
    Result,
    UserId,
    balance::BalanceBackend,
    settings::{
        GameSettings,
        SettingsPatch,
    },
    spin::spins_for,
    storage::GameStorage,
};
use anyhow::bail;
use chrono::{
    DateTime,
    Utc,
};
use serde::Serialize;

pub const ADMIN_EMAILS: [&str; 1] = ["admin@example.com"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAllowlist {
    emails: Vec<String>,
}

impl Default for AdminAllowlist {
    fn default() -> Self {
        Self::new(ADMIN_EMAILS)
    }
}

impl AdminAllowlist {
    pub fn new<I, E>(emails: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: AsRef<str>,
    {
        let mut allowlist = AdminAllowlist { emails: Vec::new() };
        allowlist.extend(emails);
        allowlist
    }

    pub fn extend<I, E>(&mut self, emails: I)
    where
        I: IntoIterator<Item = E>,
        E: AsRef<str>,
    {
        for email in emails {
            let email = email.as_ref().trim().to_lowercase();
            if !email.is_empty() && !self.emails.contains(&email) {
                self.emails.push(email);
            }
        }
    }

    pub fn is_admin(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.emails.iter().any(|admin| *admin == email)
    }

    pub fn emails(&self) -> &[String] {
        &self.emails
    }
}

pub fn is_blocked<S: GameStorage + ?Sized>(storage: &S, user: &UserId) -> Result<bool> {
    Ok(storage.blocked_users()?.contains(user))
}

pub fn block_user<S: GameStorage + ?Sized>(storage: &mut S, user: &UserId) -> Result<()> {
    let mut blocked = storage.blocked_users()?;
    if blocked.insert(user.clone()) {
        storage.save_blocked_users(&blocked)?;
        tracing::info!("blocked {user}");
    }
    Ok(())
}

pub fn unblock_user<S: GameStorage + ?Sized>(storage: &mut S, user: &UserId) -> Result<()> {
    let mut blocked = storage.blocked_users()?;
    if blocked.remove(user) {
        storage.save_blocked_users(&blocked)?;
        tracing::info!("unblocked {user}");
    }
    Ok(())
}

pub fn store_user_email<S: GameStorage + ?Sized>(
    storage: &mut S,
    user: &UserId,
    email: &str,
) -> Result<()> {
    let mut emails = storage.user_emails()?;
    if emails.get(user).map(String::as_str) != Some(email) {
        emails.insert(user.clone(), email.to_string());
        storage.save_user_emails(&emails)?;
    }
    Ok(())
}

pub fn update_settings<S: GameStorage + ?Sized>(
    storage: &mut S,
    patch: &SettingsPatch,
) -> Result<GameSettings> {
    if let Some(field) = patch.non_finite_field() {
        bail!("{field} must be a finite number");
    }
    let mut settings = storage.game_settings()?;
    patch.apply(&mut settings);
    storage.save_game_settings(&settings)?;
    tracing::info!("game settings updated: {settings:?}");
    Ok(settings)
}

pub fn reset_settings<S: GameStorage + ?Sized>(storage: &mut S) -> Result<GameSettings> {
    let settings = GameSettings::default();
    storage.save_game_settings(&settings)?;
    tracing::info!("game settings reset to defaults");
    Ok(settings)
}

/// Puts the user's balance back to the configured starting amount.
pub fn reset_balance<S, B>(storage: &S, backend: &mut B, user: &UserId) -> Result<f64>
where
    S: GameStorage + ?Sized,
    B: BalanceBackend + ?Sized,
{
    let initial = storage.game_settings()?.initial_balance;
    backend.upsert_balance(user, initial)?;
    tracing::info!("balance of {user} reset to {initial}");
    Ok(initial)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserOverview {
    pub id: UserId,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub last_sign_in_at: Option<DateTime<Utc>>,
    pub spins: usize,
    pub winnings: f64,
    pub blocked: bool,
    pub balance: Option<f64>,
}

pub fn user_overview<S, B>(storage: &S, backend: &B) -> Result<Vec<UserOverview>>
where
    S: GameStorage + ?Sized,
    B: BalanceBackend + ?Sized,
{
    let spins = storage.game_spins()?;
    let blocked = storage.blocked_users()?;
    backend
        .list_users()?
        .into_iter()
        .map(|account| -> Result<UserOverview> {
            let (count, winnings) = spins_for(&spins, &account.id)
                .fold((0, 0.0), |(count, winnings), spin| {
                    (count + 1, winnings + spin.win_amount)
                });
            Ok(UserOverview {
                balance: backend.balance(&account.id)?,
                blocked: blocked.contains(&account.id),
                spins: count,
                winnings,
                id: account.id,
                email: account.email,
                created_at: account.created_at,
                last_sign_in_at: account.last_sign_in_at,
            })
        })
        .collect()
}
