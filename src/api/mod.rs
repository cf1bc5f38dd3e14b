use rocket::{Catcher, Route};

use crate::error::Error;

mod election;
mod ledger;
mod registry;

pub fn routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(registry::routes());
    routes.extend(election::routes());
    routes.extend(ledger::routes());
    routes
}

pub fn catchers() -> Vec<Catcher> {
    catchers![unauthenticated]
}

/// Requests without a caller identity get the same JSON error body as every
/// other failure.
#[catch(401)]
fn unauthenticated() -> Error {
    Error::Unauthenticated
}
