use crate::{
    UserId,
    balance::{
        BalanceBackend,
        UserAccount,
    },
};
use anyhow::Context;
use serde::{
    Deserialize,
    Serialize,
};
use sled::{
    Db,
    Tree,
};

#[derive(Clone)]
pub struct SledBalanceBackend {
    balance_tree: Tree,
    user_tree: Tree,
}

#[derive(Debug, Serialize, Deserialize)]
struct BalanceRow {
    user_id: UserId,
    balance: f64,
}

impl SledBalanceBackend {
    pub fn new(db: &Db) -> crate::Result<Self> {
        let balance_tree = db
            .open_tree("user_balances")
            .context("open user_balances tree")?;
        let user_tree = db.open_tree("users").context("open users tree")?;
        Ok(Self {
            balance_tree,
            user_tree,
        })
    }
}

impl BalanceBackend for SledBalanceBackend {
    fn balance(&self, user: &UserId) -> crate::Result<Option<f64>> {
        let Some(value) = self
            .balance_tree
            .get(user.as_str())
            .context("read user balance")?
        else {
            return Ok(None);
        };
        let row: BalanceRow =
            serde_json::from_slice(value.as_ref()).context("deserialize balance row")?;
        Ok(Some(row.balance))
    }

    fn upsert_balance(&mut self, user: &UserId, balance: f64) -> crate::Result<()> {
        let row = BalanceRow {
            user_id: user.clone(),
            balance,
        };
        let bytes = serde_json::to_vec(&row).context("serialize balance row")?;
        self.balance_tree
            .insert(user.as_str(), bytes)
            .context("persist user balance")?;
        self.balance_tree
            .flush()
            .context("flush user_balances tree")?;
        Ok(())
    }

    fn list_users(&self) -> crate::Result<Vec<UserAccount>> {
        let mut users = Vec::new();
        for entry in self.user_tree.iter() {
            let (_, value) = entry.context("iterate users")?;
            let account = serde_json::from_slice::<UserAccount>(value.as_ref())
                .context("deserialize user account")?;
            users.push(account);
        }
        Ok(users)
    }

    fn upsert_user(&mut self, account: &UserAccount) -> crate::Result<()> {
        let bytes = serde_json::to_vec(account).context("serialize user account")?;
        self.user_tree
            .insert(account.id.as_str(), bytes)
            .context("persist user account")?;
        self.user_tree.flush().context("flush users tree")?;
        Ok(())
    }
}
