//! API-compatible (e.g. de/serialisable) request and response types.

mod caller;
mod summary;
mod vote;

pub use caller::{Caller, CALLER_HEADER};
pub use summary::{ElectionSummary, VoterCounts};
pub use vote::{VoteReceipt, VoteRequest};
