use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{
    common::{AccountId, Amount, OptionId},
    ledger::StakeLedger,
};

use super::ElectionStatus;

/// Deployment parameters of an election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSpec {
    /// Options on the ballot, in display order.
    pub options: Vec<OptionId>,
    /// Votes needed before the election can be tallied.
    pub min_voters: usize,
    /// Tokens paid to each rewarded voter.
    pub reward_per_voter: Amount,
}

/// A recorded vote. The weight is the voter's stake when the vote was cast.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub option_index: usize,
    pub weight: Amount,
}

/// Result of a tallied election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome")]
pub enum VotingOutcome {
    /// A single option holds the highest weight.
    WinningVote {
        option_index: usize,
        option: OptionId,
        weight: Amount,
    },
    /// Two or more options share the highest weight.
    Draw {
        option_indices: Vec<usize>,
        weight: Amount,
    },
}

/// A single stake-weighted election with its voter reward pot.
#[derive(Debug, Clone)]
pub struct Election {
    pub(super) owner: AccountId,
    pub(super) account: AccountId,
    options: Vec<OptionId>,
    min_voters: usize,
    pub(super) reward_per_voter: Amount,
    pub(super) status: ElectionStatus,
    pub(super) reward_issued: bool,
    votes: HashMap<AccountId, Vote>,
    pub(super) voter_order: Vec<AccountId>,
    tally: Vec<Amount>,
    total: Amount,
    pub(super) rewarded: HashSet<AccountId>,
    tallied_at: Option<DateTime<Utc>>,
}

impl Election {
    /// Deploy an election owned by `owner`, whose reward pot is held by
    /// ledger account `account`.
    pub fn new(owner: AccountId, account: AccountId, spec: ElectionSpec) -> Result<Self> {
        if spec.options.is_empty() {
            return Err(Error::InvalidElection(
                "at least one option is required".to_string(),
            ));
        }
        let distinct: HashSet<_> = spec.options.iter().collect();
        if distinct.len() != spec.options.len() {
            return Err(Error::InvalidElection(
                "options must be distinct".to_string(),
            ));
        }

        Ok(Self {
            owner,
            account,
            tally: vec![0; spec.options.len()],
            total: 0,
            options: spec.options,
            min_voters: spec.min_voters,
            reward_per_voter: spec.reward_per_voter,
            status: ElectionStatus::Open,
            reward_issued: false,
            votes: HashMap::new(),
            voter_order: Vec::new(),
            rewarded: HashSet::new(),
            tallied_at: None,
        })
    }

    /// Cast a vote for the option at `option_index`, weighted by the voter's
    /// current stake.
    pub fn vote<L>(&mut self, voter: &AccountId, option_index: usize, ledger: &L) -> Result<Vote>
    where
        L: StakeLedger + ?Sized,
    {
        if self.status.has_ended() {
            return Err(Error::AlreadyEnded);
        }
        if option_index >= self.options.len() {
            return Err(Error::invalid_option(option_index, &self.options));
        }
        if *voter == self.account {
            return Err(Error::PotVoter(voter.clone()));
        }
        if self.votes.contains_key(voter) {
            return Err(Error::AlreadyVoted(voter.clone()));
        }

        let vote = Vote {
            option_index,
            weight: ledger.balance_of(voter),
        };
        // Every option total is bounded by the overall total.
        let total = self
            .total
            .checked_add(vote.weight)
            .ok_or(Error::TallyOverflow)?;
        self.votes.insert(voter.clone(), vote);
        self.voter_order.push(voter.clone());
        self.tally[option_index] += vote.weight;
        self.total = total;
        debug!(
            "{voter} voted for option {} with weight {}",
            self.options[option_index], vote.weight
        );
        Ok(vote)
    }

    /// Close voting and freeze the tally.
    pub fn tally_vote(&mut self, caller: &AccountId) -> Result<&[Amount]> {
        self.ensure_owner(caller)?;
        if self.status.has_ended() {
            return Err(Error::AlreadyEnded);
        }
        if self.voter_order.len() < self.min_voters {
            return Err(Error::InsufficientVoters {
                current: self.voter_order.len(),
                minimum: self.min_voters,
            });
        }

        self.status = ElectionStatus::Tallied;
        self.tallied_at = Some(Utc::now());
        info!(
            "Election {} tallied with {} voters: {:?}",
            self.account,
            self.voter_order.len(),
            self.tally
        );
        Ok(&self.tally)
    }

    /// Determine the winner from the frozen tally.
    pub fn voting_result(&self, caller: &AccountId) -> Result<VotingOutcome> {
        if !self.status.has_ended() {
            return Err(Error::NotEnded);
        }
        self.ensure_owner(caller)?;

        // Options are never empty, so there is always a maximum.
        let weight = self.tally.iter().copied().max().unwrap_or_default();
        let leaders = self
            .tally
            .iter()
            .enumerate()
            .filter(|(_, total)| **total == weight)
            .map(|(index, _)| index)
            .collect::<Vec<_>>();

        let outcome = match leaders.as_slice() {
            [option_index] => VotingOutcome::WinningVote {
                option_index: *option_index,
                option: self.options[*option_index],
                weight,
            },
            _ => VotingOutcome::Draw {
                option_indices: leaders,
                weight,
            },
        };
        info!("Election {} result: {outcome:?}", self.account);
        Ok(outcome)
    }

    /// The option index `voter` chose.
    pub fn voting_choice(&self, voter: &AccountId) -> Result<usize> {
        self.votes
            .get(voter)
            .map(|vote| vote.option_index)
            .ok_or_else(|| Error::NotVoted(voter.clone()))
    }

    pub fn status(&self) -> ElectionStatus {
        self.status
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// The ledger account holding the reward pot.
    pub fn account(&self) -> &AccountId {
        &self.account
    }

    pub fn options(&self) -> &[OptionId] {
        &self.options
    }

    /// Accumulated weight per option, in option order.
    pub fn results(&self) -> &[Amount] {
        &self.tally
    }

    pub fn total_votes(&self) -> Amount {
        self.total
    }

    pub fn current_voters(&self) -> usize {
        self.voter_order.len()
    }

    pub fn min_voters(&self) -> usize {
        self.min_voters
    }

    pub fn reward_per_voter(&self) -> Amount {
        self.reward_per_voter
    }

    pub fn reward_issued(&self) -> bool {
        self.reward_issued
    }

    pub fn is_rewarded(&self, voter: &AccountId) -> bool {
        self.rewarded.contains(voter)
    }

    pub fn tallied_at(&self) -> Option<DateTime<Utc>> {
        self.tallied_at
    }

    pub(super) fn ensure_owner(&self, caller: &AccountId) -> Result<()> {
        if *caller != self.owner {
            return Err(Error::OwnerOnly);
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use crate::model::ledger::InMemoryLedger;

    use super::*;

    fn admin() -> AccountId {
        AccountId::from("admin")
    }

    fn staked(balances: &[(&str, Amount)]) -> InMemoryLedger {
        let mut ledger = InMemoryLedger::new();
        for (account, amount) in balances {
            ledger.credit(AccountId::from(*account), *amount).unwrap();
        }
        ledger
    }

    #[test]
    fn rejects_bad_specs() {
        let mut spec = ElectionSpec::example();
        spec.options.clear();
        assert!(matches!(
            Election::new(admin(), AccountId::for_election(0), spec),
            Err(Error::InvalidElection(_))
        ));

        let mut spec = ElectionSpec::example();
        spec.options = vec![3, 3];
        assert!(matches!(
            Election::new(admin(), AccountId::for_election(0), spec),
            Err(Error::InvalidElection(_))
        ));
    }

    #[test]
    fn stake_weighted_winner() {
        let ledger = staked(&[("s1", 100), ("s2", 200)]);
        let mut election = Election::example();
        let s1 = AccountId::from("s1");
        let s2 = AccountId::from("s2");

        election.vote(&s1, 0, &ledger).unwrap();
        assert_eq!(
            election.tally_vote(&admin()),
            Err(Error::InsufficientVoters {
                current: 1,
                minimum: 2
            })
        );
        election.vote(&s2, 1, &ledger).unwrap();
        assert_eq!(election.voting_choice(&s1), Ok(0));
        assert_eq!(election.voting_choice(&s2), Ok(1));

        assert_eq!(election.tally_vote(&s1), Err(Error::OwnerOnly));
        assert_eq!(election.voting_result(&s1), Err(Error::NotEnded));

        assert_eq!(election.tally_vote(&admin()).unwrap(), &[100, 200]);
        assert_eq!(election.status(), ElectionStatus::Tallied);
        assert!(election.tallied_at().is_some());
        assert_eq!(election.voting_result(&s1), Err(Error::OwnerOnly));
        assert_eq!(
            election.voting_result(&admin()),
            Ok(VotingOutcome::WinningVote {
                option_index: 1,
                option: 1,
                weight: 200
            })
        );
        assert_eq!(election.total_votes(), 300);
        assert_eq!(election.results(), &[100, 200]);
    }

    #[test]
    fn equal_weights_draw() {
        let ledger = staked(&[("s3", 200), ("s4", 200)]);
        let mut election = Election::example();
        election.vote(&AccountId::from("s3"), 0, &ledger).unwrap();
        election.vote(&AccountId::from("s4"), 1, &ledger).unwrap();
        election.tally_vote(&admin()).unwrap();

        let outcome = election.voting_result(&admin()).unwrap();
        assert_eq!(
            outcome,
            VotingOutcome::Draw {
                option_indices: vec![0, 1],
                weight: 200
            }
        );
        // Repeatable and side-effect free.
        assert_eq!(election.voting_result(&admin()).unwrap(), outcome);
        assert_eq!(election.results(), &[200, 200]);
    }

    #[test]
    fn vote_validation() {
        let ledger = staked(&[("s1", 10)]);
        let mut election = Election::example();
        let s1 = AccountId::from("s1");

        assert_eq!(
            election.vote(&s1, 2, &ledger),
            Err(Error::InvalidOption { index: 2, count: 2 })
        );
        assert_eq!(election.voting_choice(&s1), Err(Error::NotVoted(s1.clone())));

        election.vote(&s1, 0, &ledger).unwrap();
        assert_eq!(
            election.vote(&s1, 1, &ledger),
            Err(Error::AlreadyVoted(s1.clone()))
        );
        assert_eq!(election.results(), &[10, 0]);
        assert_eq!(election.current_voters(), 1);
    }

    #[test]
    fn pot_account_cannot_vote() {
        let ledger = staked(&[("election-0", 2), ("s1", 5)]);
        let mut election = Election::example();
        let pot = AccountId::for_election(0);
        assert_eq!(
            election.vote(&pot, 0, &ledger),
            Err(Error::PotVoter(pot.clone()))
        );
        assert_eq!(election.current_voters(), 0);
        assert_eq!(election.results(), &[0, 0]);

        // Another election's pot is an ordinary account here.
        let mut other =
            Election::new(admin(), AccountId::for_election(1), ElectionSpec::example()).unwrap();
        assert_eq!(other.vote(&pot, 1, &ledger).unwrap().weight, 2);
    }

    #[test]
    fn overflowing_weight_is_rejected() {
        let ledger = staked(&[("a", Amount::MAX), ("b", Amount::MAX), ("c", 1)]);
        let mut election = Election::example();
        election.vote(&AccountId::from("a"), 0, &ledger).unwrap();
        assert_eq!(
            election.vote(&AccountId::from("b"), 1, &ledger),
            Err(Error::TallyOverflow)
        );
        assert_eq!(
            election.voting_choice(&AccountId::from("b")),
            Err(Error::NotVoted(AccountId::from("b")))
        );
        assert_eq!(
            election.vote(&AccountId::from("c"), 1, &ledger),
            Err(Error::TallyOverflow)
        );
        assert_eq!(election.results(), &[Amount::MAX, 0]);
        assert_eq!(election.total_votes(), Amount::MAX);
        assert_eq!(election.current_voters(), 1);
    }

    #[test]
    fn weight_is_fixed_at_vote_time() {
        let mut ledger = staked(&[("s1", 10), ("s2", 5)]);
        let mut election = Election::example();
        let s1 = AccountId::from("s1");
        election.vote(&s1, 0, &ledger).unwrap();
        ledger.credit(s1, 1000).unwrap();
        election.vote(&AccountId::from("s2"), 1, &ledger).unwrap();
        election.tally_vote(&admin()).unwrap();
        assert_eq!(election.results(), &[10, 5]);
    }

    #[test]
    fn tallied_election_is_terminal() {
        let ledger = staked(&[("s1", 1), ("s2", 1)]);
        let mut election = Election::example();
        election.vote(&AccountId::from("s1"), 0, &ledger).unwrap();
        election.vote(&AccountId::from("s2"), 0, &ledger).unwrap();
        election.tally_vote(&admin()).unwrap();

        assert_eq!(election.tally_vote(&admin()), Err(Error::AlreadyEnded));
        assert_eq!(
            election.vote(&AccountId::from("s3"), 1, &ledger),
            Err(Error::AlreadyEnded)
        );
        assert_eq!(election.current_voters(), 2);
    }

    #[test]
    fn zero_minimum_allows_empty_tally() {
        let mut election = Election::new(
            admin(),
            AccountId::for_election(1),
            ElectionSpec {
                options: vec![7, 8, 9],
                min_voters: 0,
                reward_per_voter: 0,
            },
        )
        .unwrap();
        election.tally_vote(&admin()).unwrap();
        assert_eq!(
            election.voting_result(&admin()),
            Ok(VotingOutcome::Draw {
                option_indices: vec![0, 1, 2],
                weight: 0
            })
        );
    }
}
