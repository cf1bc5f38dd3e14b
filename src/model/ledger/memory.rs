use std::collections::{HashMap, HashSet};

use crate::model::common::{AccountId, Amount};

use super::{LedgerError, StakeLedger};

/// A process-local ledger, used by the server and in tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLedger {
    balances: HashMap<AccountId, Amount>,
    blocked: HashSet<AccountId>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `account` with `amount` extra tokens. Only used for genesis
    /// balances and test fixtures.
    pub fn credit(&mut self, account: AccountId, amount: Amount) -> Result<(), LedgerError> {
        let balance = self.balances.entry(account.clone()).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(account))?;
        Ok(())
    }

    /// Refuse all future transfers into `account`.
    pub fn block(&mut self, account: AccountId) {
        self.blocked.insert(account);
    }
}

impl StakeLedger for InMemoryLedger {
    fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    fn check_transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if self.blocked.contains(to) {
            return Err(LedgerError::RecipientBlocked(to.clone()));
        }
        let balance = self.balance_of(from);
        if balance < amount {
            return Err(LedgerError::InsufficientFunds {
                account: from.clone(),
                balance,
                amount,
            });
        }
        if from != to && self.balance_of(to).checked_add(amount).is_none() {
            return Err(LedgerError::Overflow(to.clone()));
        }
        Ok(())
    }

    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.check_transfer(from, to, amount)?;
        if from == to {
            return Ok(());
        }
        // Both updates are checked above.
        *self.balances.entry(from.clone()).or_default() -= amount;
        *self.balances.entry(to.clone()).or_default() += amount;
        Ok(())
    }
}
