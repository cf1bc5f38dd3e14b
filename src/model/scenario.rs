//! Offline replay of a recorded sequence of engine operations.
//!
//! A scenario describes starting balances, the modules one registry offers,
//! the bids placed on them and, optionally, one election with its votes.
//! Replaying it runs the same engine the server runs, in the recorded order.

use std::collections::BTreeMap;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{
    campus::Campus,
    common::{AccountId, Amount, ModuleCode},
    election::{ElectionSpec, RewardReport, VotingOutcome},
    ledger::{InMemoryLedger, StakeLedger},
    registry::{Module, ModuleAllocation},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bid {
    pub student: AccountId,
    pub module: ModuleCode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastVote {
    pub voter: AccountId,
    pub option_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionScenario {
    pub spec: ElectionSpec,
    /// Tokens placed in the reward pot before voting starts.
    #[serde(default)]
    pub pot: Amount,
    /// Votes, in the order they were cast.
    #[serde(default)]
    pub votes: Vec<CastVote>,
    #[serde(default)]
    pub issue_reward: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Owner of every deployed instance.
    pub owner: AccountId,
    #[serde(default)]
    pub balances: BTreeMap<AccountId, Amount>,
    #[serde(default)]
    pub modules: Vec<Module>,
    /// Bids, in the order they were placed.
    #[serde(default)]
    pub bids: Vec<Bid>,
    #[serde(default)]
    pub election: Option<ElectionScenario>,
}

/// What replaying an election produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionReplay {
    pub results: Vec<Amount>,
    pub outcome: VotingOutcome,
    pub reward: Option<RewardReport>,
}

/// What replaying a scenario produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replay {
    pub allocation: Vec<ModuleAllocation>,
    pub election: Option<ElectionReplay>,
    /// Final balance of every account the scenario mentions.
    pub balances: BTreeMap<AccountId, Amount>,
}

impl Scenario {
    /// Replay the scenario on a fresh campus.
    pub fn replay(&self) -> Result<Replay> {
        let mut ledger = InMemoryLedger::new();
        for (account, amount) in &self.balances {
            ledger.credit(account.clone(), *amount)?;
        }
        if let Some(election) = &self.election {
            // The first election deployed on a fresh campus owns this account.
            ledger.credit(AccountId::for_election(0), election.pot)?;
        }
        let mut campus = Campus::new(ledger);

        let registry_id = campus.deploy_registry(self.owner.clone());
        let registry = campus.registry_mut(registry_id)?;
        registry.register_modules(&self.owner, &self.modules)?;
        for bid in &self.bids {
            registry.bid(&bid.student, &bid.module)?;
        }
        let allocation = campus.allocate(registry_id, &self.owner)?;

        let election = match &self.election {
            Some(scenario) => Some(self.replay_election(&mut campus, scenario)?),
            None => None,
        };

        let balances = self
            .mentioned_accounts()
            .map(|account| {
                let balance = campus.ledger().balance_of(&account);
                (account, balance)
            })
            .collect();
        info!("Replayed scenario with {} modules", self.modules.len());

        Ok(Replay {
            allocation,
            election,
            balances,
        })
    }

    fn replay_election(
        &self,
        campus: &mut Campus,
        scenario: &ElectionScenario,
    ) -> Result<ElectionReplay> {
        let id = campus.deploy_election(self.owner.clone(), scenario.spec.clone())?;
        for vote in &scenario.votes {
            campus.vote(id, &vote.voter, vote.option_index)?;
        }
        let election = campus.election_mut(id)?;
        let results = election.tally_vote(&self.owner)?.to_vec();
        let outcome = election.voting_result(&self.owner)?;
        let reward = if scenario.issue_reward {
            Some(campus.issue_voting_reward(id, &self.owner)?)
        } else {
            None
        };
        Ok(ElectionReplay {
            results,
            outcome,
            reward,
        })
    }

    /// The owner, every account given a balance, every bidder and every
    /// voter.
    fn mentioned_accounts(&self) -> impl Iterator<Item = AccountId> + '_ {
        let mut accounts = std::collections::BTreeSet::new();
        accounts.insert(self.owner.clone());
        accounts.extend(self.balances.keys().cloned());
        accounts.extend(self.bids.iter().map(|bid| bid.student.clone()));
        if let Some(election) = &self.election {
            accounts.insert(AccountId::for_election(0));
            accounts.extend(election.votes.iter().map(|vote| vote.voter.clone()));
        }
        accounts.into_iter()
    }
}
