use serde::{Deserialize, Serialize};

/// States in the election lifecycle. The only transition is `Open` to
/// `Tallied`, and it happens exactly once.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectionStatus {
    /// Accepting votes.
    Open,
    /// Votes counted and frozen; results and rewards available.
    Tallied,
}

impl ElectionStatus {
    pub fn has_ended(self) -> bool {
        self == Self::Tallied
    }
}
