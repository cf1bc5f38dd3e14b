use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    common::{AccountId, Amount},
    ledger::StakeLedger,
};

use super::{Election, ElectionStatus};

/// What a reward issue actually paid out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardReport {
    pub reward_per_voter: Amount,
    /// Voters paid, in vote order.
    pub paid: Vec<AccountId>,
    /// Voters left unpaid because the pot ran out, in vote order.
    pub unpaid: Vec<AccountId>,
    pub total_paid: Amount,
}

impl Election {
    /// Pay the fixed reward to voters in the order they voted, stopping at
    /// the first voter the pot can no longer cover.
    ///
    /// This can only happen once: whatever was paid, the reward counts as
    /// issued afterwards and unpaid voters stay unpaid.
    pub fn issue_voting_reward<L>(&mut self, caller: &AccountId, ledger: &mut L) -> Result<RewardReport>
    where
        L: StakeLedger + ?Sized,
    {
        self.ensure_owner(caller)?;
        if self.status != ElectionStatus::Tallied {
            return Err(Error::NotEnded);
        }
        if self.reward_issued {
            return Err(Error::AlreadyIssued);
        }
        let available = ledger.balance_of(&self.account);
        let reward = self.reward_per_voter;
        if available < reward {
            return Err(Error::InsufficientBalance {
                required: reward,
                available,
            });
        }

        // Plan the whole payout first.
        let mut remaining = available;
        let mut paid = Vec::new();
        for voter in &self.voter_order {
            if remaining < reward {
                break;
            }
            remaining -= reward;
            paid.push(voter.clone());
        }
        let unpaid = self.voter_order[paid.len()..].to_vec();
        for voter in &paid {
            ledger.check_transfer(&self.account, voter, reward)?;
        }

        for voter in &paid {
            ledger.transfer(&self.account, voter, reward)?;
            self.rewarded.insert(voter.clone());
        }
        self.reward_issued = true;

        let report = RewardReport {
            reward_per_voter: reward,
            total_paid: available - remaining,
            paid,
            unpaid,
        };
        info!(
            "Election {} paid {} tokens to {} voters",
            self.account,
            report.total_paid,
            report.paid.len()
        );
        if !report.unpaid.is_empty() {
            warn!(
                "Election {} ran out of reward funds, {} voters unpaid",
                self.account,
                report.unpaid.len()
            );
        }
        Ok(report)
    }

    /// Return the whole reward pot to the owner. Returns the amount moved.
    pub fn withdraw<L>(&mut self, caller: &AccountId, ledger: &mut L) -> Result<Amount>
    where
        L: StakeLedger + ?Sized,
    {
        self.ensure_owner(caller)?;
        let available = ledger.balance_of(&self.account);
        if available == 0 {
            return Err(Error::InsufficientBalance {
                required: 1,
                available,
            });
        }
        ledger.transfer(&self.account, &self.owner, available)?;
        info!(
            "Election {} returned {available} tokens to {}",
            self.account, self.owner
        );
        Ok(available)
    }
}
