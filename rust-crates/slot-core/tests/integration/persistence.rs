use slot_core::{
    UserId,
    achievements,
    balance::BalanceBackend,
    clock::FixedClock,
    machine::SlotMachine,
    settings::GameSettings,
    storage::{
        GameStorage,
        KeyValueStore,
        StorageKey,
        json_file_storage::JsonFileStorage,
        sled_storage::SledStorage,
    },
    test_helpers::{
        account,
        start_of_test_day,
    },
};
use rand::{
    SeedableRng,
    rngs::StdRng,
};
use tempdir::TempDir;

#[test]
fn sled__when_reopened_then_spins_balances_and_unlocks_survive() {
    // given
    let temp_dir = TempDir::new("slot_machine_sled").unwrap();
    let alice = UserId::new("alice");
    let clock = FixedClock::new(start_of_test_day());
    let balance_after = {
        let (storage, backend) = SledStorage::open(temp_dir.path()).unwrap();
        let mut machine =
            SlotMachine::new(storage, backend, clock.clone(), StdRng::seed_from_u64(11));
        machine.register(&account("alice", start_of_test_day())).unwrap();
        let mut balance = 0.0;
        for _ in 0..5 {
            balance = machine.spin(&alice).unwrap().balance;
        }
        balance
    };

    // when
    let (storage, backend) = SledStorage::open(temp_dir.path()).unwrap();

    // then
    assert_eq!(storage.game_spins().unwrap().len(), 5);
    assert_eq!(backend.balance(&alice).unwrap(), Some(balance_after));
    assert_eq!(backend.list_users().unwrap().len(), 1);
    assert_eq!(
        storage.user_emails().unwrap().get(&alice).map(String::as_str),
        Some("alice@example.com")
    );
    let unlocked = achievements::user_achievements(&storage, &alice).unwrap();
    assert!(unlocked["first_spin"].unlocked);
    assert_eq!(unlocked["first_spin"].unlocked_at, Some(start_of_test_day()));
}

#[test]
fn json_files__hold_game_state_next_to_sled_balances() {
    // given
    let temp_dir = TempDir::new("slot_machine_json").unwrap();
    let (_, backend) = SledStorage::open(temp_dir.path().join("sled")).unwrap();
    let storage = JsonFileStorage::open(temp_dir.path().join("state")).unwrap();
    let mut machine = SlotMachine::new(
        storage,
        backend,
        FixedClock::new(start_of_test_day()),
        StdRng::seed_from_u64(5),
    );
    let bob = UserId::new("bob");

    // when
    machine.spin(&bob).unwrap();

    // then
    let spins_file = machine.storage().path_for(StorageKey::GameSpins);
    let raw = std::fs::read_to_string(spins_file).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed[0]["user_id"], "bob");
    assert_eq!(parsed[0]["result"].as_array().map(Vec::len), Some(3));
    assert!(
        machine
            .storage()
            .path_for(StorageKey::DailySpending)
            .exists()
    );
}

#[test]
fn malformed_blob__reads_as_default_and_spin_still_works() {
    // given
    let temp_dir = TempDir::new("slot_machine_malformed").unwrap();
    let (mut storage, backend) = SledStorage::open(temp_dir.path()).unwrap();
    storage
        .put(StorageKey::GameSettings, b"{not json".to_vec())
        .unwrap();
    storage
        .put(StorageKey::BlockedUsers, b"42".to_vec())
        .unwrap();
    let mut machine = SlotMachine::new(
        storage,
        backend,
        FixedClock::new(start_of_test_day()),
        StdRng::seed_from_u64(9),
    );

    // when
    let report = machine.spin(&UserId::new("carol")).unwrap();

    // then
    assert_eq!(machine.storage().game_settings().unwrap(), GameSettings::default());
    assert_eq!(report.balance, 90.0 + report.outcome.prize);
}
