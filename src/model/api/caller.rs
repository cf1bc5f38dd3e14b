use std::ops::Deref;

use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    Request,
};

use crate::error::Error;
use crate::model::common::AccountId;

/// Header carrying the account the request acts as.
pub const CALLER_HEADER: &str = "X-Account";

/// The account on whose behalf a request is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller(AccountId);

impl Deref for Caller {
    type Target = AccountId;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Caller {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match req
            .headers()
            .get_one(CALLER_HEADER)
            .map(str::trim)
            .filter(|account| !account.is_empty())
        {
            Some(account) => Outcome::Success(Caller(AccountId::new(account))),
            None => Outcome::Failure((Status::Unauthorized, Error::Unauthenticated)),
        }
    }
}
