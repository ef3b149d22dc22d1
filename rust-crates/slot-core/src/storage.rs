//! Persistence port for everything that is not the balance.
//!
//! Values live as JSON blobs under a fixed set of keys. A key that was never
//! written reads as the hardcoded default, and so does a blob that no longer
//! parses. The spin log is read entry by entry instead: entries this build
//! cannot parse are skipped on read and carried along untouched on append.
//! Writes replace the whole blob; there is no locking across read-modify-write
//! cycles.
use crate::{
    Result,
    UserId,
    achievements::AchievementLedger,
    settings::GameSettings,
    spending::DailySpending,
    spin::SpinRecord,
};
use anyhow::Context;
use serde::{
    Serialize,
    de::DeserializeOwned,
};
use serde_json::Value;
use std::collections::{
    BTreeMap,
    BTreeSet,
};

pub mod in_memory_storage;
pub mod json_file_storage;
pub mod sled_storage;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageKey {
    GameSettings,
    GameSpins,
    BlockedUsers,
    DailyLimits,
    DailySpending,
    Achievements,
    UserEmails,
}

impl StorageKey {
    pub const ALL: [StorageKey; 7] = [
        StorageKey::GameSettings,
        StorageKey::GameSpins,
        StorageKey::BlockedUsers,
        StorageKey::DailyLimits,
        StorageKey::DailySpending,
        StorageKey::Achievements,
        StorageKey::UserEmails,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::GameSettings => "slot_machine_game_settings",
            StorageKey::GameSpins => "slot_machine_game_spins",
            StorageKey::BlockedUsers => "slot_machine_blocked_users",
            StorageKey::DailyLimits => "slot_machine_daily_limits",
            StorageKey::DailySpending => "slot_machine_daily_spending",
            StorageKey::Achievements => "slot_machine_achievements",
            StorageKey::UserEmails => "user_emails",
        }
    }
}

/// Raw blob access. One implementation per environment.
pub trait KeyValueStore {
    fn get(&self, key: StorageKey) -> Result<Option<Vec<u8>>>;

    fn put(&mut self, key: StorageKey, value: Vec<u8>) -> Result<()>;

    fn remove(&mut self, key: StorageKey) -> Result<()>;
}

pub type DailyLimits = BTreeMap<UserId, f64>;
pub type DailySpendingTable = BTreeMap<UserId, DailySpending>;
pub type EmailDirectory = BTreeMap<UserId, String>;

/// Typed view of the store used by the game logic.
pub trait GameStorage {
    fn game_settings(&self) -> Result<GameSettings>;

    fn save_game_settings(&mut self, settings: &GameSettings) -> Result<()>;

    fn game_spins(&self) -> Result<Vec<SpinRecord>>;

    /// Appends to the end of the log.
    fn append_game_spin(&mut self, spin: SpinRecord) -> Result<()>;

    fn blocked_users(&self) -> Result<BTreeSet<UserId>>;

    fn save_blocked_users(&mut self, blocked: &BTreeSet<UserId>) -> Result<()>;

    fn daily_limits(&self) -> Result<DailyLimits>;

    fn save_daily_limits(&mut self, limits: &DailyLimits) -> Result<()>;

    fn daily_spending(&self) -> Result<DailySpendingTable>;

    fn save_daily_spending(&mut self, spending: &DailySpendingTable) -> Result<()>;

    fn achievements(&self) -> Result<AchievementLedger>;

    fn save_achievements(&mut self, ledger: &AchievementLedger) -> Result<()>;

    fn user_emails(&self) -> Result<EmailDirectory>;

    fn save_user_emails(&mut self, emails: &EmailDirectory) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> GameStorage for S {
    fn game_settings(&self) -> Result<GameSettings> {
        load_or_default(self, StorageKey::GameSettings)
    }

    fn save_game_settings(&mut self, settings: &GameSettings) -> Result<()> {
        store_json(self, StorageKey::GameSettings, settings)
    }

    fn game_spins(&self) -> Result<Vec<SpinRecord>> {
        let entries: Vec<Value> = load_or_default(self, StorageKey::GameSpins)?;
        Ok(entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value(entry) {
                Ok(spin) => Some(spin),
                Err(e) => {
                    tracing::warn!("skipping unreadable spin log entry {index}: {e}");
                    None
                }
            })
            .collect())
    }

    fn append_game_spin(&mut self, spin: SpinRecord) -> Result<()> {
        let mut entries: Vec<Value> = load_or_default(self, StorageKey::GameSpins)?;
        entries.push(serde_json::to_value(&spin).context("serialize spin record")?);
        store_json(self, StorageKey::GameSpins, &entries)
    }

    fn blocked_users(&self) -> Result<BTreeSet<UserId>> {
        load_or_default(self, StorageKey::BlockedUsers)
    }

    fn save_blocked_users(&mut self, blocked: &BTreeSet<UserId>) -> Result<()> {
        store_json(self, StorageKey::BlockedUsers, blocked)
    }

    fn daily_limits(&self) -> Result<DailyLimits> {
        load_or_default(self, StorageKey::DailyLimits)
    }

    fn save_daily_limits(&mut self, limits: &DailyLimits) -> Result<()> {
        store_json(self, StorageKey::DailyLimits, limits)
    }

    fn daily_spending(&self) -> Result<DailySpendingTable> {
        load_or_default(self, StorageKey::DailySpending)
    }

    fn save_daily_spending(&mut self, spending: &DailySpendingTable) -> Result<()> {
        store_json(self, StorageKey::DailySpending, spending)
    }

    fn achievements(&self) -> Result<AchievementLedger> {
        load_or_default(self, StorageKey::Achievements)
    }

    fn save_achievements(&mut self, ledger: &AchievementLedger) -> Result<()> {
        store_json(self, StorageKey::Achievements, ledger)
    }

    fn user_emails(&self) -> Result<EmailDirectory> {
        load_or_default(self, StorageKey::UserEmails)
    }

    fn save_user_emails(&mut self, emails: &EmailDirectory) -> Result<()> {
        store_json(self, StorageKey::UserEmails, emails)
    }
}

fn load_or_default<T, S>(store: &S, key: StorageKey) -> Result<T>
where
    T: DeserializeOwned + Default,
    S: KeyValueStore + ?Sized,
{
    let Some(bytes) = store.get(key)? else {
        tracing::debug!("no value stored under {}, using default", key.as_str());
        return Ok(T::default());
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::warn!(
                "discarding malformed value under {}: {e}; using default",
                key.as_str()
            );
            Ok(T::default())
        }
    }
}

fn store_json<T, S>(store: &mut S, key: StorageKey, value: &T) -> Result<()>
where
    T: Serialize + ?Sized,
    S: KeyValueStore + ?Sized,
{
    let bytes = serde_json::to_vec(value)
        .with_context(|| format!("serialize value for {}", key.as_str()))?;
    store.put(key, bytes)
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::{
        GameStorage,
        KeyValueStore,
        StorageKey,
        in_memory_storage::InMemoryStorage,
    };
    use crate::{
        UserId,
        settings::GameSettings,
        spin::SpinRecord,
        symbols::Symbol,
    };
    use chrono::{
        TimeZone,
        Utc,
    };

    #[test]
    fn game_settings__when_key_missing_then_default_is_returned() {
        // given
        let storage = InMemoryStorage::new();

        // when
        let settings = storage.game_settings().unwrap();

        // then
        assert_eq!(settings, GameSettings::default());
    }

    #[test]
    fn game_settings__when_blob_is_malformed_then_default_is_returned() {
        // given
        let mut storage = InMemoryStorage::new();
        storage
            .put(StorageKey::GameSettings, b"{not json".to_vec())
            .unwrap();

        // when
        let settings = storage.game_settings().unwrap();

        // then
        assert_eq!(settings, GameSettings::default());
    }

    #[test]
    fn append_game_spin__keeps_log_order() {
        // given
        let mut storage = InMemoryStorage::new();
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
        let first = SpinRecord {
            user_id: UserId::new("alice"),
            spin_cost: 10.0,
            win_amount: 0.0,
            result: [Symbol::Apple, Symbol::Bell, Symbol::Star],
            created_at: at,
        };
        let second = SpinRecord {
            win_amount: 20.0,
            result: [Symbol::Apple, Symbol::Apple, Symbol::Star],
            ..first.clone()
        };

        // when
        storage.append_game_spin(first.clone()).unwrap();
        storage.append_game_spin(second.clone()).unwrap();

        // then
        assert_eq!(storage.game_spins().unwrap(), vec![first, second]);
    }

    #[test]
    fn append_game_spin__when_log_holds_unknown_symbol_then_entry_is_kept() {
        // given
        let mut storage = InMemoryStorage::new();
        let log = r#"[
            {"user_id":"alice","spin_cost":10,"win_amount":0,
             "result":["x.png","7","7"],"created_at":"2026-10-15T08:00:00Z"},
            {"user_id":"bob","spin_cost":10,"win_amount":20,
             "result":["🍎","🍎","⭐"],"created_at":"2026-10-15T09:00:00Z"}
        ]"#;
        storage.put(StorageKey::GameSpins, log.as_bytes().to_vec()).unwrap();
        let spin = SpinRecord {
            user_id: UserId::new("carol"),
            spin_cost: 10.0,
            win_amount: 0.0,
            result: [Symbol::Bell, Symbol::Lemon, Symbol::Star],
            created_at: Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap(),
        };

        // when
        storage.append_game_spin(spin.clone()).unwrap();

        // then
        let raw = storage.get(StorageKey::GameSpins).unwrap().unwrap();
        let entries: Vec<serde_json::Value> = serde_json::from_slice(&raw).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["result"][0], "x.png");
        let spins = storage.game_spins().unwrap();
        assert_eq!(spins.len(), 2);
        assert_eq!(spins[0].user_id, UserId::new("bob"));
        assert_eq!(spins[1], spin);
    }

    #[test]
    fn blocked_users__are_stored_as_plain_id_array() {
        // given
        let mut storage = InMemoryStorage::new();
        let blocked = [UserId::new("b"), UserId::new("a")].into_iter().collect();

        // when
        storage.save_blocked_users(&blocked).unwrap();

        // then
        let raw = storage.get(StorageKey::BlockedUsers).unwrap().unwrap();
        assert_eq!(raw, br#"["a","b"]"#.to_vec());
        assert_eq!(storage.blocked_users().unwrap(), blocked);
    }
}
