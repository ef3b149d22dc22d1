use crate::{
    Result,
    UserId,
    achievements,
    spin::{
        SpinRecord,
        spins_for,
    },
    storage::{
        EmailDirectory,
        GameStorage,
    },
};
use itertools::Itertools;
use serde::Serialize;
use std::{
    fmt,
    str::FromStr,
};

pub const DEFAULT_TOP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    TotalWinnings,
    GamesPlayed,
    Achievements,
    ProfitLoss,
}

impl SortBy {
    fn key(self, standing: &PlayerStanding) -> f64 {
        match self {
            SortBy::TotalWinnings => standing.total_winnings,
            SortBy::GamesPlayed => standing.games_played as f64,
            SortBy::Achievements => standing.achievements_unlocked as f64,
            SortBy::ProfitLoss => standing.profit_loss,
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortBy::TotalWinnings => "winnings",
            SortBy::GamesPlayed => "games",
            SortBy::Achievements => "achievements",
            SortBy::ProfitLoss => "profit",
        };
        write!(f, "{name}")
    }
}

impl FromStr for SortBy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "winnings" => Ok(SortBy::TotalWinnings),
            "games" => Ok(SortBy::GamesPlayed),
            "achievements" => Ok(SortBy::Achievements),
            "profit" => Ok(SortBy::ProfitLoss),
            other => Err(anyhow::anyhow!(
                "unknown sort key '{other}'; expected winnings, games, achievements or profit"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStanding {
    pub user_id: UserId,
    pub display_name: String,
    pub total_winnings: f64,
    pub total_spent: f64,
    pub games_played: usize,
    pub biggest_win: f64,
    pub profit_loss: f64,
    pub achievements_unlocked: usize,
}

impl PlayerStanding {
    fn from_spins(user: &UserId, spins: &[&SpinRecord], emails: &EmailDirectory) -> Self {
        let total_winnings: f64 = spins.iter().map(|spin| spin.win_amount).sum();
        let total_spent: f64 = spins.iter().map(|spin| spin.spin_cost).sum();
        let biggest_win = spins
            .iter()
            .map(|spin| spin.win_amount)
            .fold(0.0, f64::max);
        let display_name = emails
            .get(user)
            .cloned()
            .unwrap_or_else(|| user.short_label());
        PlayerStanding {
            user_id: user.clone(),
            display_name,
            total_winnings,
            total_spent,
            games_played: spins.len(),
            biggest_win,
            profit_loss: total_winnings - total_spent,
            achievements_unlocked: achievements::satisfied_by(spins).count(),
        }
    }
}

/// One standing per user that appears in the log, in order of first spin.
pub fn standings(spins: &[SpinRecord], emails: &EmailDirectory) -> Vec<PlayerStanding> {
    spins
        .iter()
        .map(|spin| &spin.user_id)
        .unique()
        .map(|user| {
            let user_spins: Vec<&SpinRecord> = spins_for(spins, user).collect();
            PlayerStanding::from_spins(user, &user_spins, emails)
        })
        .collect()
}

/// Sorts descending on `sort_by` and keeps the first `top`. Ties keep their
/// incoming order.
pub fn rank(
    mut standings: Vec<PlayerStanding>,
    sort_by: SortBy,
    top: usize,
) -> Vec<PlayerStanding> {
    standings.sort_by(|a, b| sort_by.key(b).total_cmp(&sort_by.key(a)));
    standings.truncate(top);
    standings
}

pub fn leaderboard<S: GameStorage + ?Sized>(
    storage: &S,
    sort_by: SortBy,
    top: usize,
) -> Result<Vec<PlayerStanding>> {
    let spins = storage.game_spins()?;
    let emails = storage.user_emails()?;
    Ok(rank(standings(&spins, &emails), sort_by, top))
}
