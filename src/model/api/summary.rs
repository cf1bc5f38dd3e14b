use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    common::{AccountId, Amount, OptionId},
    election::{Election, ElectionStatus},
};

/// Everything publicly readable about an election.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectionSummary {
    pub owner: AccountId,
    pub account: AccountId,
    pub status: ElectionStatus,
    pub options: Vec<OptionId>,
    /// Accumulated weight per option.
    pub results: Vec<Amount>,
    pub total_votes: Amount,
    pub current_voters: usize,
    pub min_voters: usize,
    pub reward_per_voter: Amount,
    /// Tokens left in the reward pot.
    pub balance: Amount,
    pub reward_issued: bool,
    pub tallied_at: Option<DateTime<Utc>>,
}

impl ElectionSummary {
    pub fn new(election: &Election, balance: Amount) -> Self {
        Self {
            owner: election.owner().clone(),
            account: election.account().clone(),
            status: election.status(),
            options: election.options().to_vec(),
            results: election.results().to_vec(),
            total_votes: election.total_votes(),
            current_voters: election.current_voters(),
            min_voters: election.min_voters(),
            reward_per_voter: election.reward_per_voter(),
            balance,
            reward_issued: election.reward_issued(),
            tallied_at: election.tallied_at(),
        }
    }
}

/// How many votes an election has against how many it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterCounts {
    pub current: usize,
    pub minimum: usize,
}

impl From<&Election> for VoterCounts {
    fn from(election: &Election) -> Self {
        Self {
            current: election.current_voters(),
            minimum: election.min_voters(),
        }
    }
}
