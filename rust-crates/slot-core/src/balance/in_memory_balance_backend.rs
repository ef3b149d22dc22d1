use crate::{
    UserId,
    balance::{
        BalanceBackend,
        UserAccount,
    },
};
use anyhow::anyhow;
use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        Mutex,
    },
};

#[derive(Clone, Debug, Default)]
pub struct InMemoryBalanceBackend {
    balances: Arc<Mutex<BTreeMap<UserId, f64>>>,
    users: Arc<Mutex<BTreeMap<UserId, UserAccount>>>,
}

impl InMemoryBalanceBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balances(&self) -> Arc<Mutex<BTreeMap<UserId, f64>>> {
        self.balances.clone()
    }
}

impl BalanceBackend for InMemoryBalanceBackend {
    fn balance(&self, user: &UserId) -> crate::Result<Option<f64>> {
        let guard = self
            .balances
            .lock()
            .map_err(|_| anyhow!("balance table lock poisoned"))?;
        Ok(guard.get(user).copied())
    }

    fn upsert_balance(&mut self, user: &UserId, balance: f64) -> crate::Result<()> {
        let mut guard = self
            .balances
            .lock()
            .map_err(|_| anyhow!("balance table lock poisoned"))?;
        guard.insert(user.clone(), balance);
        Ok(())
    }

    fn list_users(&self) -> crate::Result<Vec<UserAccount>> {
        let guard = self
            .users
            .lock()
            .map_err(|_| anyhow!("user table lock poisoned"))?;
        Ok(guard.values().cloned().collect())
    }

    fn upsert_user(&mut self, account: &UserAccount) -> crate::Result<()> {
        let mut guard = self
            .users
            .lock()
            .map_err(|_| anyhow!("user table lock poisoned"))?;
        guard.insert(account.id.clone(), account.clone());
        Ok(())
    }
}
