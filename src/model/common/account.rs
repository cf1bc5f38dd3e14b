use std::fmt::{Display, Formatter};

use rocket::request::FromParam;
use serde::{Deserialize, Serialize};

/// Token amounts are whole, non-negative units.
pub type Amount = u64;

/// An opaque ledger account identifier: a student, an administrator, or one
/// of the engine's own instance accounts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The ledger account holding an election's reward pot.
    pub fn for_election(id: u32) -> Self {
        Self(format!("election-{id}"))
    }
}

impl Display for AccountId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl<'a> FromParam<'a> for AccountId {
    type Error = &'a str;

    fn from_param(param: &'a str) -> Result<Self, Self::Error> {
        if param.is_empty() {
            return Err(param);
        }
        Ok(Self::new(param))
    }
}
