//! Stake-weighted elections and first-come voter rewards.

mod election_core;
mod reward;
mod state;

pub use election_core::{Election, ElectionSpec, Vote, VotingOutcome};
pub use reward::RewardReport;
pub use state::ElectionStatus;
