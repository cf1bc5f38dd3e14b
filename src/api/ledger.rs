use rocket::{serde::json::Json, Route, State};

use crate::model::{
    campus::SharedCampus,
    common::{AccountId, Amount},
    ledger::StakeLedger,
};

pub fn routes() -> Vec<Route> {
    routes![balance]
}

/// Stake held by any account, including election reward pots.
#[get("/ledger/<account>")]
async fn balance(account: AccountId, campus: &State<SharedCampus>) -> Json<Amount> {
    let campus = campus.lock().await;
    Json(campus.ledger().balance_of(&account))
}
