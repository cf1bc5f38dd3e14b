use serde::{Deserialize, Serialize};

use crate::model::common::{Amount, OptionId};

/// Body of a vote submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    /// Position of the chosen option on the ballot.
    pub option_index: usize,
}

/// Confirmation of a recorded vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    pub option_index: usize,
    pub option: OptionId,
    /// Stake counted for this vote.
    pub weight: Amount,
}
