use log::debug;
use rocket::{
    http::Status,
    response::{self, Responder},
    serde::json::Json,
    Request,
};
use serde::Serialize;
use thiserror::Error;

use crate::model::{
    common::{AccountId, Amount, ModuleCode, OptionId},
    ledger::LedgerError,
};

pub type Result<T> = std::result::Result<T, Error>;

/// Broad families of failure. Every error aborts its operation in full.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    Validation,
    Authorization,
    State,
    Resource,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Module code has already been set: {0}")]
    DuplicateModule(ModuleCode),
    #[error("Module quota must be positive: {0}")]
    InvalidQuota(ModuleCode),
    #[error("Module not found: {0}")]
    ModuleNotFound(ModuleCode),
    #[error("Invalid option {index}: election has {count} options")]
    InvalidOption { index: usize, count: usize },
    #[error("Invalid election: {0}")]
    InvalidElection(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Only the owner can perform this action.")]
    OwnerOnly,
    #[error("Caller identity missing")]
    Unauthenticated,
    #[error("Account {0} holds the election pot and cannot vote.")]
    PotVoter(AccountId),
    #[error("Account {0} has already voted.")]
    AlreadyVoted(AccountId),
    #[error("Account {0} has not voted.")]
    NotVoted(AccountId),
    #[error("Election has not met minimum required number of voters: {current} of {minimum}.")]
    InsufficientVoters { current: usize, minimum: usize },
    #[error("Election not ended yet.")]
    NotEnded,
    #[error("Election has already ended.")]
    AlreadyEnded,
    #[error("Voting reward has already been issued.")]
    AlreadyIssued,
    #[error("Vote weight would overflow the election tally.")]
    TallyOverflow,
    #[error("Insufficient balance: need {required}, have {available}.")]
    InsufficientBalance { required: Amount, available: Amount },
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn invalid_option(index: usize, options: &[OptionId]) -> Self {
        Self::InvalidOption {
            index,
            count: options.len(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateModule(_)
            | Self::InvalidQuota(_)
            | Self::ModuleNotFound(_)
            | Self::InvalidOption { .. }
            | Self::InvalidElection(_)
            | Self::PotVoter(_)
            | Self::NotFound(_) => ErrorKind::Validation,
            Self::OwnerOnly | Self::Unauthenticated => ErrorKind::Authorization,
            Self::AlreadyVoted(_)
            | Self::NotVoted(_)
            | Self::InsufficientVoters { .. }
            | Self::NotEnded
            | Self::AlreadyEnded
            | Self::AlreadyIssued => ErrorKind::State,
            Self::TallyOverflow | Self::InsufficientBalance { .. } | Self::Ledger(_) => {
                ErrorKind::Resource
            }
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Self::ModuleNotFound(_) | Self::NotFound(_) | Self::NotVoted(_) => Status::NotFound,
            Self::Unauthenticated => Status::Unauthorized,
            _ => match self.kind() {
                ErrorKind::Validation => Status::BadRequest,
                ErrorKind::Authorization => Status::Forbidden,
                ErrorKind::State | ErrorKind::Resource => Status::UnprocessableEntity,
            },
        }
    }
}

/// The JSON body sent alongside an error status.
#[derive(Debug, Serialize)]
struct ErrorBody {
    kind: ErrorKind,
    message: String,
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        debug!("{status}: {self}");
        let body = ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).respond_to(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        let code = ModuleCode::example1();
        assert_eq!(Error::DuplicateModule(code).kind(), ErrorKind::Validation);
        assert_eq!(Error::OwnerOnly.kind(), ErrorKind::Authorization);
        assert_eq!(Error::NotEnded.kind(), ErrorKind::State);
        assert_eq!(
            Error::InsufficientBalance {
                required: 1,
                available: 0
            }
            .kind(),
            ErrorKind::Resource
        );
    }

    #[test]
    fn statuses() {
        assert_eq!(
            Error::ModuleNotFound(ModuleCode::example2()).status(),
            Status::NotFound
        );
        assert_eq!(Error::OwnerOnly.status(), Status::Forbidden);
        assert_eq!(Error::Unauthenticated.status(), Status::Unauthorized);
        assert_eq!(Error::AlreadyIssued.status(), Status::UnprocessableEntity);
        assert_eq!(Error::TallyOverflow.status(), Status::UnprocessableEntity);
        assert_eq!(
            Error::PotVoter(AccountId::for_election(0)).status(),
            Status::BadRequest
        );
        assert_eq!(
            Error::invalid_option(5, &[0, 1]).status(),
            Status::BadRequest
        );
    }
}
