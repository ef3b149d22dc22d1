//! Plain-text rendering of core results for the terminal.
use slot_core::{
    achievements::{
        self,
        AchievementProgress,
        UserAchievements,
    },
    admin::UserOverview,
    analytics::{
        DailyStats,
        DashboardSummary,
        OutcomeDistribution,
        PlayerActivity,
    },
    evaluator::TierOdds,
    leaderboard::PlayerStanding,
    machine::SpinReport,
    settings::GameSettings,
    symbols::format_reels,
};
use std::fmt::Write;
use unicode_width::UnicodeWidthStr;

fn pad(cell: &str, width: usize) -> String {
    let fill = width.saturating_sub(cell.width());
    format!("{cell}{}", " ".repeat(fill))
}

/// Left-aligned columns sized by display width, so emoji cells line up.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.width()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.width());
            }
        }
    }
    let render = |cells: Vec<String>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| pad(cell, *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };
    let mut out = render(headers.iter().map(|h| h.to_string()).collect());
    out.push('\n');
    let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
    out.push_str(&render(rule));
    for row in rows {
        out.push('\n');
        out.push_str(&render(row.clone()));
    }
    out
}

fn money(amount: f64) -> String {
    format!("${amount:.2}")
}

pub fn spin(report: &SpinReport) -> String {
    let mut out = format!(
        "[ {} ]  {}  balance {}",
        format_reels(&report.reels),
        report.outcome.message,
        money(report.balance)
    );
    for achievement in &report.newly_unlocked {
        let _ = write!(
            out,
            "\n  {} Achievement unlocked: {} ({})",
            achievement.icon, achievement.name, achievement.description
        );
    }
    out
}

pub fn settings(settings: &GameSettings) -> String {
    let odds = TierOdds::for_uniform_reels();
    let percent = |fraction: f64| format!("{:.2}%", fraction * 100.0);
    let rows = vec![
        vec![
            "Jackpot".to_string(),
            format!("x{}", settings.payouts.jackpot),
            money(settings.jackpot_prize()),
            format!("{}%", settings.probabilities.jackpot),
            percent(odds.jackpot),
        ],
        vec![
            "Three Match".to_string(),
            format!("x{}", settings.payouts.three_match),
            money(settings.three_match_prize()),
            format!("{}%", settings.probabilities.three_match),
            percent(odds.three_match),
        ],
        vec![
            "Two Match".to_string(),
            format!("x{}", settings.payouts.two_match),
            money(settings.two_match_prize()),
            format!("{}%", settings.probabilities.two_match),
            percent(odds.two_match),
        ],
    ];
    format!(
        "Spin cost: {}\nInitial balance: {}\n\n{}\n\nReturn to player at actual odds: {}",
        money(settings.spin_cost),
        money(settings.initial_balance),
        table(&["Tier", "Payout", "Prize", "Configured", "Actual"], &rows),
        percent(odds.return_to_player(settings)),
    )
}

pub fn achievements(states: &UserAchievements, progress: &AchievementProgress) -> String {
    let rows: Vec<Vec<String>> = achievements::CATALOG
        .iter()
        .map(|achievement| {
            let state = states.get(achievement.id);
            let status = match state {
                Some(state) if state.unlocked => match state.unlocked_at {
                    Some(at) => format!("unlocked {}", at.format("%Y-%m-%d %H:%M")),
                    None => "unlocked".to_string(),
                },
                _ => "locked".to_string(),
            };
            vec![
                achievement.icon.to_string(),
                achievement.name.to_string(),
                achievement.description.to_string(),
                status,
            ]
        })
        .collect();
    format!(
        "{}/{} unlocked ({:.0}%)\n\n{}",
        progress.unlocked,
        progress.total,
        progress.percentage,
        table(&["", "Achievement", "Goal", "Status"], &rows)
    )
}

pub fn leaderboard(standings: &[PlayerStanding]) -> String {
    if standings.is_empty() {
        return "No spins recorded yet.".to_string();
    }
    let rows: Vec<Vec<String>> = standings
        .iter()
        .enumerate()
        .map(|(rank, standing)| {
            vec![
                format!("#{}", rank + 1),
                standing.display_name.clone(),
                money(standing.total_winnings),
                money(standing.total_spent),
                standing.games_played.to_string(),
                money(standing.biggest_win),
                money(standing.profit_loss),
                standing.achievements_unlocked.to_string(),
            ]
        })
        .collect();
    table(
        &[
            "Rank",
            "Player",
            "Winnings",
            "Spent",
            "Games",
            "Biggest win",
            "Profit/loss",
            "Achievements",
        ],
        &rows,
    )
}

pub fn users(overview: &[UserOverview]) -> String {
    let rows: Vec<Vec<String>> = overview
        .iter()
        .map(|user| {
            vec![
                user.id.to_string(),
                user.email.clone(),
                user.created_at.format("%Y-%m-%d").to_string(),
                user.spins.to_string(),
                money(user.winnings),
                user.balance.map(money).unwrap_or_else(|| "-".to_string()),
                if user.blocked { "blocked" } else { "active" }.to_string(),
            ]
        })
        .collect();
    table(
        &[
            "User", "Email", "Joined", "Spins", "Winnings", "Balance", "Status",
        ],
        &rows,
    )
}

pub fn analytics(
    series: &[DailyStats],
    top: &[PlayerActivity],
    distribution: &OutcomeDistribution,
) -> String {
    let daily: Vec<Vec<String>> = series
        .iter()
        .map(|day| {
            vec![
                day.date.format("%b %d").to_string(),
                day.spins.to_string(),
                money(day.revenue),
                money(day.winnings),
                money(day.net_revenue),
            ]
        })
        .collect();
    let players: Vec<Vec<String>> = top
        .iter()
        .map(|player| {
            vec![
                player.email.clone(),
                player.spins.to_string(),
                money(player.winnings),
                money(player.net_spend),
            ]
        })
        .collect();
    let total = distribution.total().max(1) as f64;
    let share = |count: usize| format!("{count} ({:.1}%)", count as f64 / total * 100.0);
    let outcomes = vec![
        vec!["Jackpot".to_string(), share(distribution.jackpot)],
        vec!["Three Match".to_string(), share(distribution.three_match)],
        vec!["Two Match".to_string(), share(distribution.two_match)],
        vec!["Loss".to_string(), share(distribution.loss)],
    ];
    format!(
        "Daily\n{}\n\nTop players\n{}\n\nOutcomes\n{}",
        table(&["Date", "Spins", "Revenue", "Winnings", "Net"], &daily),
        table(&["Player", "Spins", "Winnings", "Net spend"], &players),
        table(&["Outcome", "Spins"], &outcomes),
    )
}

pub fn dashboard(summary: &DashboardSummary) -> String {
    let rows = vec![
        vec!["Users".to_string(), summary.total_users.to_string()],
        vec![
            "Active in last 7 days".to_string(),
            summary.active_users.to_string(),
        ],
        vec!["Spins".to_string(), summary.total_spins.to_string()],
        vec!["Revenue".to_string(), money(summary.total_revenue)],
        vec!["Winnings paid".to_string(), money(summary.total_winnings)],
        vec!["Net revenue".to_string(), money(summary.net_revenue)],
    ];
    table(&["Metric", "Value"], &rows)
}
