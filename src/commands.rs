use crate::{
    config::AppConfig,
    report,
};
use clap::{
    Args,
    Subcommand,
};
use color_eyre::eyre::{
    Result,
    eyre,
};
use slot_core::{
    UserId,
    achievements,
    admin,
    analytics,
    balance::{
        BalanceBackend,
        UserAccount,
    },
    clock::Clock,
    leaderboard::{
        self,
        DEFAULT_TOP,
        SortBy,
    },
    machine::{
        SlotMachine,
        SpinDenied,
    },
    settings::SettingsPatch,
    spending,
    storage::GameStorage,
};
use rand::Rng;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Record the player's account and email
    Register {
        email: String,
    },
    /// Spin the reels
    Spin {
        #[arg(short, long, default_value_t = 1)]
        count: u32,
    },
    /// Show the player's balance
    Balance,
    /// Add credits to the player's balance
    TopUp {
        amount: f64,
    },
    /// Show or change the player's daily spending limit
    Limit {
        #[command(subcommand)]
        action: LimitCommand,
    },
    /// List the player's achievements
    Achievements,
    /// Rank players
    Leaderboard {
        /// winnings, games, achievements or profit
        #[arg(long, default_value_t = SortBy::TotalWinnings)]
        sort_by: SortBy,
        #[arg(long, default_value_t = DEFAULT_TOP)]
        top: usize,
    },
    /// Operator commands, for allowlisted emails only
    Admin {
        #[arg(long = "as", value_name = "EMAIL")]
        as_email: String,
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum LimitCommand {
    Show,
    /// 0 removes the limit
    Set { amount: f64 },
}

#[derive(Subcommand, Debug)]
pub enum AdminCommand {
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
    Block {
        user: String,
    },
    Unblock {
        user: String,
    },
    ResetBalance {
        user: String,
    },
    Users,
    Analytics {
        #[arg(long, default_value_t = analytics::DEFAULT_WINDOW_DAYS)]
        days: i64,
        #[arg(long, default_value_t = DEFAULT_TOP)]
        top: usize,
    },
    Dashboard,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    Show,
    Set(SettingsArgs),
    Reset,
}

#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    #[arg(long)]
    spin_cost: Option<f64>,
    #[arg(long)]
    jackpot_payout: Option<f64>,
    #[arg(long)]
    three_match_payout: Option<f64>,
    #[arg(long)]
    two_match_payout: Option<f64>,
    #[arg(long)]
    jackpot_probability: Option<f64>,
    #[arg(long)]
    three_match_probability: Option<f64>,
    #[arg(long)]
    two_match_probability: Option<f64>,
    #[arg(long)]
    initial_balance: Option<f64>,
}

impl From<SettingsArgs> for SettingsPatch {
    fn from(args: SettingsArgs) -> Self {
        SettingsPatch {
            spin_cost: args.spin_cost,
            jackpot_payout: args.jackpot_payout,
            three_match_payout: args.three_match_payout,
            two_match_payout: args.two_match_payout,
            jackpot_probability: args.jackpot_probability,
            three_match_probability: args.three_match_probability,
            two_match_probability: args.two_match_probability,
            initial_balance: args.initial_balance,
        }
    }
}

/// Lifts a core error into the binary's report type.
fn lift<T>(result: slot_core::Result<T>) -> Result<T> {
    result.map_err(|e| eyre!("{e:#}"))
}

pub fn run<S, B, C, R>(
    command: Command,
    config: &AppConfig,
    machine: &mut SlotMachine<S, B, C, R>,
) -> Result<String>
where
    S: GameStorage,
    B: BalanceBackend,
    C: Clock,
    R: Rng,
{
    match command {
        Command::Register { email } => {
            let user = config.player()?;
            let now = machine.clock().now();
            let account = UserAccount {
                id: user.clone(),
                email: email.clone(),
                created_at: now,
                last_sign_in_at: Some(now),
            };
            lift(machine.register(&account))?;
            let balance = lift(machine.balance(user))?;
            Ok(format!("Registered {user} as {email}. Balance ${balance:.2}"))
        }
        Command::Spin { count } => spin(machine, config.player()?, count),
        Command::Balance => {
            let balance = lift(machine.balance(config.player()?))?;
            Ok(format!("Balance ${balance:.2}"))
        }
        Command::TopUp { amount } => {
            let balance = lift(machine.top_up(config.player()?, amount))?;
            Ok(format!("Added ${amount:.2}. Balance ${balance:.2}"))
        }
        Command::Limit { action } => limit(machine, config.player()?, action),
        Command::Achievements => {
            let user = config.player()?;
            let states = lift(achievements::user_achievements(machine.storage(), user))?;
            let progress = lift(achievements::progress(machine.storage(), user))?;
            Ok(report::achievements(&states, &progress))
        }
        Command::Leaderboard { sort_by, top } => {
            let standings = lift(leaderboard::leaderboard(machine.storage(), sort_by, top))?;
            Ok(report::leaderboard(&standings))
        }
        Command::Admin { as_email, command } => {
            if !config.admins.is_admin(&as_email) {
                tracing::warn!("admin command refused for {as_email}");
                return Err(eyre!("{as_email} is not an administrator"));
            }
            run_admin(command, machine)
        }
    }
}

fn spin<S, B, C, R>(
    machine: &mut SlotMachine<S, B, C, R>,
    user: &UserId,
    count: u32,
) -> Result<String>
where
    S: GameStorage,
    B: BalanceBackend,
    C: Clock,
    R: Rng,
{
    let mut lines = Vec::new();
    for _ in 0..count {
        match machine.spin(user) {
            Ok(spin_report) => lines.push(report::spin(&spin_report)),
            Err(err) => match err.downcast_ref::<SpinDenied>() {
                Some(denied) => {
                    lines.push(format!("Spin refused: {denied}"));
                    break;
                }
                None => return lift(Err(err)),
            },
        }
    }
    Ok(lines.join("\n"))
}

fn limit<S, B, C, R>(
    machine: &mut SlotMachine<S, B, C, R>,
    user: &UserId,
    action: LimitCommand,
) -> Result<String>
where
    S: GameStorage,
    B: BalanceBackend,
    C: Clock,
    R: Rng,
{
    let today = machine.clock().today();
    if let LimitCommand::Set { amount } = action {
        lift(spending::set_daily_limit(machine.storage_mut(), user, amount))?;
    }
    let storage = machine.storage();
    let limit = lift(spending::daily_limit(storage, user))?;
    let spent = lift(spending::today_spending(storage, user, today))?;
    Ok(match lift(spending::remaining_allowance(storage, user, today))? {
        Some(remaining) => format!(
            "Daily limit ${limit:.2}: spent ${spent:.2} today, ${remaining:.2} left"
        ),
        None => format!("No daily limit. Spent ${spent:.2} today"),
    })
}

fn run_admin<S, B, C, R>(
    command: AdminCommand,
    machine: &mut SlotMachine<S, B, C, R>,
) -> Result<String>
where
    S: GameStorage,
    B: BalanceBackend,
    C: Clock,
    R: Rng,
{
    match command {
        AdminCommand::Settings { action } => {
            let settings = match action {
                SettingsCommand::Show => lift(machine.storage().game_settings())?,
                SettingsCommand::Set(args) => {
                    let patch = SettingsPatch::from(args);
                    if patch.is_empty() {
                        return Err(eyre!("pass at least one setting to change"));
                    }
                    lift(admin::update_settings(machine.storage_mut(), &patch))?
                }
                SettingsCommand::Reset => lift(admin::reset_settings(machine.storage_mut()))?,
            };
            Ok(report::settings(&settings))
        }
        AdminCommand::Block { user } => {
            lift(admin::block_user(machine.storage_mut(), &UserId::new(&user)))?;
            Ok(format!("Blocked {user}"))
        }
        AdminCommand::Unblock { user } => {
            lift(admin::unblock_user(machine.storage_mut(), &UserId::new(&user)))?;
            Ok(format!("Unblocked {user}"))
        }
        AdminCommand::ResetBalance { user } => {
            let initial = lift(machine.reset_balance(&UserId::new(&user)))?;
            Ok(format!("Balance of {user} reset to ${initial:.2}"))
        }
        AdminCommand::Users => {
            let overview = lift(admin::user_overview(machine.storage(), machine.backend()))?;
            Ok(report::users(&overview))
        }
        AdminCommand::Analytics { days, top } => {
            let spins = lift(machine.storage().game_spins())?;
            let emails = lift(machine.storage().user_emails())?;
            let now = machine.clock().now();
            Ok(report::analytics(
                &analytics::daily_series(&spins, now, days),
                &analytics::top_players(&spins, &emails, top),
                &analytics::outcome_distribution(&spins),
            ))
        }
        AdminCommand::Dashboard => {
            let spins = lift(machine.storage().game_spins())?;
            let users = lift(machine.backend().list_users())?;
            let now = machine.clock().now();
            Ok(report::dashboard(&analytics::dashboard_summary(
                &spins,
                users.len(),
                now,
            )))
        }
    }
}
