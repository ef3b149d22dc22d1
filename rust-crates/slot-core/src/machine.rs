//! The spin flow, independent of any front end.
use crate::{
    Result,
    UserId,
    achievements::{
        self,
        Achievement,
    },
    admin,
    balance::{
        BalanceBackend,
        UserAccount,
    },
    clock::Clock,
    evaluator::{
        SpinOutcome,
        evaluate,
    },
    spending,
    spin::SpinRecord,
    storage::GameStorage,
    symbols::{
        Reels,
        draw_reels,
    },
};
use anyhow::bail;
use rand::Rng;

/// Reasons a spin is refused before any money moves.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum SpinDenied {
    #[error("your account has been blocked")]
    Blocked,
    #[error("insufficient balance: {balance} available, spin costs {cost}")]
    InsufficientFunds { balance: f64, cost: f64 },
    #[error("{}", daily_limit_message(.remaining))]
    DailyLimitReached { remaining: Option<f64> },
}

fn daily_limit_message(remaining: &Option<f64>) -> String {
    match remaining {
        Some(remaining) => format!("daily spending limit reached, {remaining} left today"),
        None => "daily spending limit reached".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpinReport {
    pub reels: Reels,
    pub outcome: SpinOutcome,
    pub balance: f64,
    pub newly_unlocked: Vec<&'static Achievement>,
}

pub struct SlotMachine<S, B, C, R> {
    storage: S,
    backend: B,
    clock: C,
    rng: R,
}

impl<S, B, C, R> SlotMachine<S, B, C, R>
where
    S: GameStorage,
    B: BalanceBackend,
    C: Clock,
    R: Rng,
{
    pub fn new(storage: S, backend: B, clock: C, rng: R) -> Self {
        Self {
            storage,
            backend,
            clock,
            rng,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Records the account with the backend and its email in the directory
    /// used for display names.
    pub fn register(&mut self, account: &UserAccount) -> Result<()> {
        self.backend.upsert_user(account)?;
        admin::store_user_email(&mut self.storage, &account.id, &account.email)?;
        tracing::info!("registered {} as {}", account.id, account.email);
        Ok(())
    }

    /// Current balance, creating the row with the configured starting
    /// amount when the user has none yet.
    pub fn balance(&mut self, user: &UserId) -> Result<f64> {
        if let Some(balance) = self.backend.balance(user)? {
            tracing::debug!("balance of {user} is {balance}");
            return Ok(balance);
        }
        let initial = self.storage.game_settings()?.initial_balance;
        self.backend.upsert_balance(user, initial)?;
        tracing::info!("created balance row for {user} with {initial}");
        Ok(initial)
    }

    pub fn reset_balance(&mut self, user: &UserId) -> Result<f64> {
        admin::reset_balance(&self.storage, &mut self.backend, user)
    }

    pub fn top_up(&mut self, user: &UserId, amount: f64) -> Result<f64> {
        if !amount.is_finite() || amount <= 0.0 {
            bail!("top-up amount must be a positive number, got {amount}");
        }
        let balance = self.balance(user)? + amount;
        self.backend.upsert_balance(user, balance)?;
        tracing::info!("{user} topped up {amount}, balance now {balance}");
        Ok(balance)
    }

    pub fn spin(&mut self, user: &UserId) -> Result<SpinReport> {
        if admin::is_blocked(&self.storage, user)? {
            tracing::warn!("spin refused for blocked user {user}");
            return Err(SpinDenied::Blocked.into());
        }

        let settings = self.storage.game_settings()?;
        let cost = settings.spin_cost;
        let balance = self.balance(user)?;
        if balance < cost {
            tracing::warn!("spin refused for {user}: balance {balance} below cost {cost}");
            return Err(SpinDenied::InsufficientFunds { balance, cost }.into());
        }

        let today = self.clock.today();
        if !spending::can_spend(&self.storage, user, cost, today)? {
            let remaining = spending::remaining_allowance(&self.storage, user, today)?;
            tracing::warn!("spin refused for {user}: daily limit reached");
            return Err(SpinDenied::DailyLimitReached { remaining }.into());
        }

        let debited = balance - cost;
        self.backend.upsert_balance(user, debited)?;
        spending::add_today_spending(&mut self.storage, user, cost, today)?;

        let reels = draw_reels(&mut self.rng);
        let outcome = evaluate(&reels, &settings);
        let balance = debited + outcome.prize;
        self.backend.upsert_balance(user, balance)?;

        let now = self.clock.now();
        self.storage.append_game_spin(SpinRecord {
            user_id: user.clone(),
            spin_cost: cost,
            win_amount: outcome.prize,
            result: reels,
            created_at: now,
        })?;
        tracing::info!(
            "{user} spun {reels:?}: {} for {}, balance {balance}",
            outcome.tier,
            outcome.prize
        );

        let newly_unlocked = achievements::check_achievements(&mut self.storage, user, now)?;
        Ok(SpinReport {
            reels,
            outcome,
            balance,
            newly_unlocked,
        })
    }
}
