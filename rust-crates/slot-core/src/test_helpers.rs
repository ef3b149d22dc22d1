use crate::{
    UserId,
    balance::{
        UserAccount,
        in_memory_balance_backend::InMemoryBalanceBackend,
    },
    clock::{
        Clock,
        FixedClock,
    },
    machine::SlotMachine,
    storage::in_memory_storage::InMemoryStorage,
};
use chrono::{
    DateTime,
    Duration,
    TimeZone,
    Utc,
};
use rand::{
    SeedableRng,
    rngs::StdRng,
};

pub type InMemoryMachine =
    SlotMachine<InMemoryStorage, InMemoryBalanceBackend, FixedClock, StdRng>;

pub fn start_of_test_day() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0)
        .single()
        .unwrap_or_default()
}

pub fn account(id: &str, created_at: DateTime<Utc>) -> UserAccount {
    UserAccount {
        id: UserId::new(id),
        email: format!("{id}@example.com"),
        created_at,
        last_sign_in_at: None,
    }
}

/// In-memory machine with two registered players and a settable clock.
pub struct TestContext {
    machine: InMemoryMachine,
    clock: FixedClock,
    alice: UserId,
    bob: UserId,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_seed(42)
    }

    pub fn with_seed(seed: u64) -> Self {
        let clock = FixedClock::new(start_of_test_day());
        let mut machine = SlotMachine::new(
            InMemoryStorage::new(),
            InMemoryBalanceBackend::new(),
            clock.clone(),
            StdRng::seed_from_u64(seed),
        );
        let alice = account("alice", clock.now());
        let bob = account("bob", clock.now());
        for player in [&alice, &bob] {
            if let Err(err) = machine.register(player) {
                tracing::error!("failed to register {}: {err:#}", player.id);
            }
        }
        Self {
            machine,
            clock,
            alice: alice.id,
            bob: bob.id,
        }
    }

    pub fn machine(&mut self) -> &mut InMemoryMachine {
        &mut self.machine
    }

    pub fn storage(&self) -> &InMemoryStorage {
        self.machine.storage()
    }

    pub fn backend(&self) -> &InMemoryBalanceBackend {
        self.machine.backend()
    }

    pub fn clock(&self) -> &FixedClock {
        &self.clock
    }

    pub fn alice(&self) -> UserId {
        self.alice.clone()
    }

    pub fn bob(&self) -> UserId {
        self.bob.clone()
    }

    pub fn advance_days(&self, days: i64) {
        self.clock.advance(Duration::days(days));
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
