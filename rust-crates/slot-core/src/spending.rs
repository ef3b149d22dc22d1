//! Per-user daily spending cap.
//!
//! A cap of 0 means unlimited. Spending is kept as a single `{date, amount}`
//! pair per user; a pair whose date is not today reads as nothing spent, so
//! the total rolls over lazily on the first read of a new day.
use crate::{
    Result,
    UserId,
    storage::GameStorage,
};
use anyhow::bail;
use chrono::NaiveDate;
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailySpending {
    pub date: NaiveDate,
    pub amount: f64,
}

pub fn daily_limit<S: GameStorage + ?Sized>(storage: &S, user: &UserId) -> Result<f64> {
    let limits = storage.daily_limits()?;
    Ok(limits
        .get(user)
        .copied()
        .filter(|limit| !limit.is_nan())
        .unwrap_or(0.0))
}

pub fn set_daily_limit<S: GameStorage + ?Sized>(
    storage: &mut S,
    user: &UserId,
    limit: f64,
) -> Result<()> {
    if !limit.is_finite() || limit < 0.0 {
        bail!("daily limit must be 0 or a positive number, got {limit}");
    }
    let mut limits = storage.daily_limits()?;
    limits.insert(user.clone(), limit);
    storage.save_daily_limits(&limits)?;
    tracing::info!("daily limit for {user} set to {limit}");
    Ok(())
}

pub fn today_spending<S: GameStorage + ?Sized>(
    storage: &S,
    user: &UserId,
    today: NaiveDate,
) -> Result<f64> {
    let spending = storage.daily_spending()?;
    Ok(match spending.get(user) {
        Some(record) if record.date == today => record.amount,
        _ => 0.0,
    })
}

pub fn add_today_spending<S: GameStorage + ?Sized>(
    storage: &mut S,
    user: &UserId,
    amount: f64,
    today: NaiveDate,
) -> Result<()> {
    let mut spending = storage.daily_spending()?;
    let fresh = DailySpending {
        date: today,
        amount,
    };
    let record = spending.entry(user.clone()).or_insert(DailySpending {
        amount: 0.0,
        ..fresh
    });
    if record.date == today {
        record.amount += amount;
    } else {
        *record = fresh;
    }
    storage.save_daily_spending(&spending)
}

pub fn can_spend<S: GameStorage + ?Sized>(
    storage: &S,
    user: &UserId,
    amount: f64,
    today: NaiveDate,
) -> Result<bool> {
    let limit = daily_limit(storage, user)?;
    if limit == 0.0 {
        return Ok(true);
    }
    let spent = today_spending(storage, user, today)?;
    Ok(spent + amount <= limit)
}

/// What is left of today's cap; `None` when the user has no cap.
pub fn remaining_allowance<S: GameStorage + ?Sized>(
    storage: &S,
    user: &UserId,
    today: NaiveDate,
) -> Result<Option<f64>> {
    let limit = daily_limit(storage, user)?;
    if limit == 0.0 {
        return Ok(None);
    }
    let spent = today_spending(storage, user, today)?;
    Ok(Some((limit - spent).max(0.0)))
}
