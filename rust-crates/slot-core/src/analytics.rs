//! Operator reports over the whole spin log.
use crate::{
    UserId,
    evaluator::{
        MatchTier,
        classify,
    },
    spin::SpinRecord,
    storage::EmailDirectory,
};
use chrono::{
    DateTime,
    Duration,
    NaiveDate,
    Utc,
};
use itertools::Itertools;
use serde::Serialize;
use std::collections::{
    BTreeMap,
    HashSet,
};

pub const DEFAULT_WINDOW_DAYS: i64 = 30;
pub const ACTIVE_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub spins: usize,
    pub revenue: f64,
    pub winnings: f64,
    pub net_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerActivity {
    pub user_id: UserId,
    pub email: String,
    pub spins: usize,
    pub winnings: f64,
    pub net_spend: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct OutcomeDistribution {
    pub jackpot: usize,
    pub three_match: usize,
    pub two_match: usize,
    pub loss: usize,
}

impl OutcomeDistribution {
    pub fn total(&self) -> usize {
        self.jackpot + self.three_match + self.two_match + self.loss
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_users: usize,
    pub total_spins: usize,
    pub total_revenue: f64,
    pub total_winnings: f64,
    pub net_revenue: f64,
    pub active_users: usize,
}

/// Per-day totals for spins made within `days` of `now`, bucketed by UTC
/// date and ordered oldest first. Days without spins are omitted. A window
/// reaching past the representable calendar covers the whole log.
pub fn daily_series(spins: &[SpinRecord], now: DateTime<Utc>, days: i64) -> Vec<DailyStats> {
    let since = Duration::try_days(days).and_then(|window| now.checked_sub_signed(window));
    let mut by_date: BTreeMap<NaiveDate, DailyStats> = BTreeMap::new();
    let in_window = |spin: &&SpinRecord| since.is_none_or(|since| spin.created_at >= since);
    for spin in spins.iter().filter(in_window) {
        let date = spin.created_at.date_naive();
        let stats = by_date.entry(date).or_insert(DailyStats {
            date,
            spins: 0,
            revenue: 0.0,
            winnings: 0.0,
            net_revenue: 0.0,
        });
        stats.spins += 1;
        stats.revenue += spin.spin_cost;
        stats.winnings += spin.win_amount;
        stats.net_revenue = stats.revenue - stats.winnings;
    }
    by_date.into_values().collect()
}

/// Most active players by spin count.
pub fn top_players(
    spins: &[SpinRecord],
    directory: &EmailDirectory,
    n: usize,
) -> Vec<PlayerActivity> {
    spins
        .iter()
        .map(|spin| (&spin.user_id, spin))
        .into_group_map()
        .into_iter()
        .map(|(user, user_spins)| {
            let winnings: f64 = user_spins.iter().map(|spin| spin.win_amount).sum();
            let spent: f64 = user_spins.iter().map(|spin| spin.spin_cost).sum();
            PlayerActivity {
                user_id: user.clone(),
                email: directory
                    .get(user)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_string()),
                spins: user_spins.len(),
                winnings,
                net_spend: spent - winnings,
            }
        })
        .sorted_by(|a, b| b.spins.cmp(&a.spins).then_with(|| a.user_id.cmp(&b.user_id)))
        .take(n)
        .collect()
}

pub fn outcome_distribution(spins: &[SpinRecord]) -> OutcomeDistribution {
    spins
        .iter()
        .fold(OutcomeDistribution::default(), |mut dist, spin| {
            if !spin.is_win() {
                dist.loss += 1;
                return dist;
            }
            match classify(&spin.result) {
                MatchTier::Jackpot => dist.jackpot += 1,
                MatchTier::ThreeMatch => dist.three_match += 1,
                MatchTier::TwoMatch | MatchTier::NoMatch => dist.two_match += 1,
            }
            dist
        })
}

pub fn dashboard_summary(
    spins: &[SpinRecord],
    user_count: usize,
    now: DateTime<Utc>,
) -> DashboardSummary {
    let total_revenue: f64 = spins.iter().map(|spin| spin.spin_cost).sum();
    let total_winnings: f64 = spins.iter().map(|spin| spin.win_amount).sum();
    let active_since = now - Duration::days(ACTIVE_WINDOW_DAYS);
    let active_users = spins
        .iter()
        .filter(|spin| spin.created_at > active_since)
        .map(|spin| &spin.user_id)
        .collect::<HashSet<_>>()
        .len();
    DashboardSummary {
        total_users: user_count,
        total_spins: spins.len(),
        total_revenue,
        total_winnings,
        net_revenue: total_revenue - total_winnings,
        active_users,
    }
}
