//! Achievement catalog and the rule interpreter behind it.
//!
//! Rules are plain data evaluated against one user's spins in log order.
//! Unlocks are persisted per user and only ever go from locked to unlocked.
use crate::{
    Result,
    UserId,
    spin::{
        SpinRecord,
        spins_for,
    },
    storage::GameStorage,
};
use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rule {
    /// At least `min` spins.
    SpinCount { min: usize },
    /// At least `min` spins that paid out.
    WinCount { min: usize },
    /// Some spin paid at least `multiplier` times its own cost.
    BigWin { multiplier: f64 },
    /// Some spin showed the jackpot symbol on every reel.
    JackpotHit,
    /// The last `length` spins, in log order, all paid out.
    WinStreak { length: usize },
    /// Lifetime winnings minus lifetime cost is at least `min`.
    Profit { min: f64 },
}

impl Rule {
    pub fn is_satisfied(&self, spins: &[&SpinRecord]) -> bool {
        match *self {
            Rule::SpinCount { min } => spins.len() >= min,
            Rule::WinCount { min } => spins.iter().filter(|spin| spin.is_win()).count() >= min,
            Rule::BigWin { multiplier } => spins
                .iter()
                .any(|spin| spin.win_amount >= spin.spin_cost * multiplier),
            Rule::JackpotHit => spins.iter().any(|spin| spin.is_jackpot()),
            Rule::WinStreak { length } => {
                spins.len() >= length
                    && spins[spins.len() - length..].iter().all(|spin| spin.is_win())
            }
            Rule::Profit { min } => spins.iter().map(|spin| spin.net()).sum::<f64>() >= min,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub rule: Rule,
}

pub static CATALOG: [Achievement; 9] = [
    Achievement {
        id: "first_spin",
        name: "First Spin",
        description: "Complete your first spin",
        icon: "🎰",
        rule: Rule::SpinCount { min: 1 },
    },
    Achievement {
        id: "ten_spins",
        name: "Getting Started",
        description: "Complete 10 spins",
        icon: "🔟",
        rule: Rule::SpinCount { min: 10 },
    },
    Achievement {
        id: "fifty_spins",
        name: "Slot Enthusiast",
        description: "Complete 50 spins",
        icon: "🎯",
        rule: Rule::SpinCount { min: 50 },
    },
    Achievement {
        id: "hundred_spins",
        name: "Spin Master",
        description: "Complete 100 spins",
        icon: "💯",
        rule: Rule::SpinCount { min: 100 },
    },
    Achievement {
        id: "first_win",
        name: "First Win",
        description: "Win your first prize",
        icon: "🏆",
        rule: Rule::WinCount { min: 1 },
    },
    Achievement {
        id: "big_win",
        name: "Big Winner",
        description: "Win 10x your bet in a single spin",
        icon: "💰",
        rule: Rule::BigWin { multiplier: 10.0 },
    },
    Achievement {
        id: "first_jackpot",
        name: "Jackpot!",
        description: "Hit your first jackpot (three 7s)",
        icon: "🎰",
        rule: Rule::JackpotHit,
    },
    Achievement {
        id: "lucky_streak",
        name: "Lucky Streak",
        description: "Win 5 times in a row",
        icon: "🍀",
        rule: Rule::WinStreak { length: 5 },
    },
    Achievement {
        id: "profit_maker",
        name: "Profit Maker",
        description: "Have a net profit of $100 or more",
        icon: "📈",
        rule: Rule::Profit { min: 100.0 },
    },
];

pub fn find(id: &str) -> Option<&'static Achievement> {
    CATALOG.iter().find(|achievement| achievement.id == id)
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockState {
    pub unlocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Achievement id → unlock state, for one user.
pub type UserAchievements = BTreeMap<String, UnlockState>;

/// All users' unlock states, as persisted.
pub type AchievementLedger = BTreeMap<UserId, UserAchievements>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AchievementProgress {
    pub total: usize,
    pub unlocked: usize,
    pub percentage: f64,
}

/// Catalog entries whose rule holds for `spins`, without touching storage.
pub fn satisfied_by<'a>(
    spins: &'a [&'a SpinRecord],
) -> impl Iterator<Item = &'static Achievement> + 'a {
    CATALOG
        .iter()
        .filter(move |achievement| achievement.rule.is_satisfied(spins))
}

/// Re-evaluates every rule against the user's full history and records new
/// unlocks. Returns only the achievements unlocked by this call, in catalog
/// order.
pub fn check_achievements<S: GameStorage + ?Sized>(
    storage: &mut S,
    user: &UserId,
    now: DateTime<Utc>,
) -> Result<Vec<&'static Achievement>> {
    let spins = storage.game_spins()?;
    let user_spins: Vec<&SpinRecord> = spins_for(&spins, user).collect();
    let mut ledger = storage.achievements()?;
    let states = ledger.entry(user.clone()).or_default();

    let mut newly_unlocked = Vec::new();
    for achievement in satisfied_by(&user_spins) {
        let already = states
            .get(achievement.id)
            .is_some_and(|state| state.unlocked);
        if already {
            continue;
        }
        states.insert(
            achievement.id.to_string(),
            UnlockState {
                unlocked: true,
                unlocked_at: Some(now),
            },
        );
        tracing::info!("{user} unlocked achievement {}", achievement.id);
        newly_unlocked.push(achievement);
    }

    if !newly_unlocked.is_empty() {
        storage.save_achievements(&ledger)?;
    }
    Ok(newly_unlocked)
}

pub fn user_achievements<S: GameStorage + ?Sized>(
    storage: &S,
    user: &UserId,
) -> Result<UserAchievements> {
    let mut ledger = storage.achievements()?;
    Ok(ledger.remove(user).unwrap_or_default())
}

pub fn progress<S: GameStorage + ?Sized>(
    storage: &S,
    user: &UserId,
) -> Result<AchievementProgress> {
    let states = user_achievements(storage, user)?;
    let total = CATALOG.len();
    let unlocked = states.values().filter(|state| state.unlocked).count();
    Ok(AchievementProgress {
        total,
        unlocked,
        percentage: unlocked as f64 / total as f64 * 100.0,
    })
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use crate::{
        storage::{
            KeyValueStore,
            StorageKey,
            in_memory_storage::InMemoryStorage,
        },
        symbols::Symbol,
    };
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap()
    }

    fn spin(user: &str, cost: f64, win: f64) -> SpinRecord {
        SpinRecord {
            user_id: UserId::new(user),
            spin_cost: cost,
            win_amount: win,
            result: [Symbol::Apple, Symbol::Orange, Symbol::Bell],
            created_at: at(),
        }
    }

    fn ids(achievements: &[&Achievement]) -> Vec<&'static str> {
        achievements.iter().map(|achievement| achievement.id).collect()
    }

    #[test]
    fn catalog__ids_are_unique_and_rules_serialize_tagged() {
        // given
        let mut seen: Vec<_> = CATALOG.iter().map(|a| a.id).collect();
        seen.sort();
        seen.dedup();

        // when
        let json = serde_json::to_string(&Rule::WinStreak { length: 5 }).unwrap();

        // then
        assert_eq!(seen.len(), CATALOG.len());
        assert_eq!(json, r#"{"kind":"win_streak","length":5}"#);
    }

    #[test]
    fn is_satisfied__win_streak_looks_at_most_recent_spins() {
        // given
        let mut spins = vec![spin("a", 10.0, 0.0)];
        spins.extend((0..5).map(|_| spin("a", 10.0, 20.0)));
        let refs: Vec<&SpinRecord> = spins.iter().collect();
        let rule = Rule::WinStreak { length: 5 };

        // when
        let satisfied = rule.is_satisfied(&refs);
        let broken = rule.is_satisfied(&refs[..5]);

        // then
        assert!(satisfied);
        assert!(!broken);
    }

    #[test]
    fn is_satisfied__big_win_uses_each_spins_own_cost() {
        let cheap = spin("a", 1.0, 10.0);
        let pricey = spin("a", 50.0, 100.0);
        let rule = Rule::BigWin { multiplier: 10.0 };
        assert!(rule.is_satisfied(&[&cheap]));
        assert!(!rule.is_satisfied(&[&pricey]));
    }

    #[test]
    fn is_satisfied__profit_counts_net_over_all_spins() {
        let spins = [spin("a", 10.0, 0.0), spin("a", 10.0, 120.0)];
        let refs: Vec<&SpinRecord> = spins.iter().collect();
        assert!(Rule::Profit { min: 100.0 }.is_satisfied(&refs));
        assert!(!Rule::Profit { min: 101.0 }.is_satisfied(&refs));
    }

    #[test]
    fn is_satisfied__jackpot_hit_requires_three_sevens() {
        let mut jackpot = spin("a", 10.0, 1000.0);
        jackpot.result = [Symbol::Seven; 3];
        let mut near_miss = spin("a", 10.0, 20.0);
        near_miss.result = [Symbol::Seven, Symbol::Seven, Symbol::Star];
        assert!(Rule::JackpotHit.is_satisfied(&[&near_miss, &jackpot]));
        assert!(!Rule::JackpotHit.is_satisfied(&[&near_miss]));
    }

    #[test]
    fn check_achievements__when_first_spin_logged_then_first_spin_unlocks() {
        // given
        let mut storage = InMemoryStorage::new();
        let user = UserId::new("alice");
        storage.append_game_spin(spin("alice", 10.0, 0.0)).unwrap();

        // when
        let unlocked = check_achievements(&mut storage, &user, at()).unwrap();

        // then
        assert_eq!(ids(&unlocked), vec!["first_spin"]);
        let states = user_achievements(&storage, &user).unwrap();
        assert_eq!(
            states.get("first_spin"),
            Some(&UnlockState {
                unlocked: true,
                unlocked_at: Some(at()),
            })
        );
    }

    #[test]
    fn check_achievements__ignores_other_users_spins() {
        // given
        let mut storage = InMemoryStorage::new();
        storage.append_game_spin(spin("bob", 10.0, 500.0)).unwrap();

        // when
        let unlocked =
            check_achievements(&mut storage, &UserId::new("alice"), at()).unwrap();

        // then
        assert!(unlocked.is_empty());
    }

    #[test]
    fn check_achievements__never_relocks_after_log_is_emptied() {
        // given
        let mut storage = InMemoryStorage::new();
        let user = UserId::new("alice");
        storage.append_game_spin(spin("alice", 10.0, 150.0)).unwrap();
        let first = check_achievements(&mut storage, &user, at()).unwrap();
        storage.remove(StorageKey::GameSpins).unwrap();

        // when
        let second = check_achievements(&mut storage, &user, at()).unwrap();

        // then
        assert_eq!(
            ids(&first),
            vec!["first_spin", "first_win", "big_win", "profit_maker"]
        );
        assert!(second.is_empty());
        let states = user_achievements(&storage, &user).unwrap();
        assert!(states["first_spin"].unlocked);
    }

    #[test]
    fn check_achievements__reports_each_unlock_once() {
        // given
        let mut storage = InMemoryStorage::new();
        let user = UserId::new("alice");
        storage.append_game_spin(spin("alice", 10.0, 0.0)).unwrap();
        check_achievements(&mut storage, &user, at()).unwrap();
        storage.append_game_spin(spin("alice", 10.0, 0.0)).unwrap();

        // when
        let unlocked = check_achievements(&mut storage, &user, at()).unwrap();

        // then
        assert!(unlocked.is_empty());
    }

    #[test]
    fn progress__reports_fraction_of_catalog() {
        // given
        let mut storage = InMemoryStorage::new();
        let user = UserId::new("alice");
        storage.append_game_spin(spin("alice", 10.0, 20.0)).unwrap();
        check_achievements(&mut storage, &user, at()).unwrap();

        // when
        let progress = progress(&storage, &user).unwrap();

        // then
        assert_eq!(progress.total, 9);
        assert_eq!(progress.unlocked, 2);
        assert!((progress.percentage - 200.0 / 9.0).abs() < 1e-9);
    }
}
