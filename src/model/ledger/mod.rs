//! The stake ledger the engine consumes.
//!
//! Token accounting proper (minting, fines, supply pools, permission lists)
//! lives outside the engine. The engine only reads balances and moves tokens
//! out of its own instance accounts.

use thiserror::Error;

use crate::model::common::{AccountId, Amount};

mod memory;

pub use memory::InMemoryLedger;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Account {account} holds {balance} tokens, cannot transfer {amount}")]
    InsufficientFunds {
        account: AccountId,
        balance: Amount,
        amount: Amount,
    },
    #[error("Account {0} is not permitted to receive tokens")]
    RecipientBlocked(AccountId),
    #[error("Balance of account {0} would overflow")]
    Overflow(AccountId),
}

/// Read and transfer capability over token balances.
pub trait StakeLedger {
    /// Current balance of `account`; unknown accounts hold nothing.
    fn balance_of(&self, account: &AccountId) -> Amount;

    /// Check whether `transfer` with the same arguments would succeed,
    /// without moving anything.
    fn check_transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Move `amount` tokens from `from` to `to`. Either fully applied or not
    /// at all.
    fn transfer(&mut self, from: &AccountId, to: &AccountId, amount: Amount)
        -> Result<(), LedgerError>;
}
