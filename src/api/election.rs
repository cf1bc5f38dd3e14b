use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    api::{Caller, ElectionSummary, VoteReceipt, VoteRequest, VoterCounts},
    campus::SharedCampus,
    common::{AccountId, Amount, ElectionId},
    election::{ElectionStatus, RewardReport, VotingOutcome},
    ledger::StakeLedger,
};

pub fn routes() -> Vec<Route> {
    routes![
        summary,
        vote,
        my_choice,
        status,
        results,
        total_votes,
        voter_counts,
        reward_per_voter,
        balance,
        rewarded_voter,
        reward_status,
        tally,
        voting_result,
        issue_reward,
        withdraw,
        return_to_admin,
    ]
}

#[get("/elections/<id>")]
async fn summary(id: ElectionId, campus: &State<SharedCampus>) -> Result<Json<ElectionSummary>> {
    let campus = campus.lock().await;
    let election = campus.election(id)?;
    let balance = campus.ledger().balance_of(election.account());
    Ok(Json(ElectionSummary::new(election, balance)))
}

#[post("/elections/<id>/vote", data = "<request>", format = "json")]
async fn vote(
    caller: Caller,
    id: ElectionId,
    request: Json<VoteRequest>,
    campus: &State<SharedCampus>,
) -> Result<Json<VoteReceipt>> {
    let mut campus = campus.lock().await;
    let vote = campus.vote(id, &caller, request.option_index)?;
    let option = campus.election(id)?.options()[vote.option_index];
    Ok(Json(VoteReceipt {
        option_index: vote.option_index,
        option,
        weight: vote.weight,
    }))
}

#[get("/elections/<id>/votes/mine")]
async fn my_choice(
    caller: Caller,
    id: ElectionId,
    campus: &State<SharedCampus>,
) -> Result<Json<usize>> {
    let campus = campus.lock().await;
    Ok(Json(campus.election(id)?.voting_choice(&caller)?))
}

#[get("/elections/<id>/status")]
async fn status(id: ElectionId, campus: &State<SharedCampus>) -> Result<Json<ElectionStatus>> {
    let campus = campus.lock().await;
    Ok(Json(campus.election(id)?.status()))
}

#[get("/elections/<id>/results")]
async fn results(id: ElectionId, campus: &State<SharedCampus>) -> Result<Json<Vec<Amount>>> {
    let campus = campus.lock().await;
    Ok(Json(campus.election(id)?.results().to_vec()))
}

#[get("/elections/<id>/total")]
async fn total_votes(id: ElectionId, campus: &State<SharedCampus>) -> Result<Json<Amount>> {
    let campus = campus.lock().await;
    Ok(Json(campus.election(id)?.total_votes()))
}

#[get("/elections/<id>/voters")]
async fn voter_counts(id: ElectionId, campus: &State<SharedCampus>) -> Result<Json<VoterCounts>> {
    let campus = campus.lock().await;
    Ok(Json(campus.election(id)?.into()))
}

#[get("/elections/<id>/reward")]
async fn reward_per_voter(id: ElectionId, campus: &State<SharedCampus>) -> Result<Json<Amount>> {
    let campus = campus.lock().await;
    Ok(Json(campus.election(id)?.reward_per_voter()))
}

#[get("/elections/<id>/balance")]
async fn balance(id: ElectionId, campus: &State<SharedCampus>) -> Result<Json<Amount>> {
    let campus = campus.lock().await;
    let account = campus.election(id)?.account();
    Ok(Json(campus.ledger().balance_of(account)))
}

#[get("/elections/<id>/rewarded/<voter>")]
async fn rewarded_voter(
    id: ElectionId,
    voter: AccountId,
    campus: &State<SharedCampus>,
) -> Result<Json<bool>> {
    let campus = campus.lock().await;
    Ok(Json(campus.election(id)?.is_rewarded(&voter)))
}

#[get("/elections/<id>/reward/status")]
async fn reward_status(id: ElectionId, campus: &State<SharedCampus>) -> Result<Json<bool>> {
    let campus = campus.lock().await;
    Ok(Json(campus.election(id)?.reward_issued()))
}

#[post("/elections/<id>/tally")]
async fn tally(
    caller: Caller,
    id: ElectionId,
    campus: &State<SharedCampus>,
) -> Result<Json<Vec<Amount>>> {
    let mut campus = campus.lock().await;
    let tally = campus.election_mut(id)?.tally_vote(&caller)?;
    Ok(Json(tally.to_vec()))
}

#[get("/elections/<id>/result")]
async fn voting_result(
    caller: Caller,
    id: ElectionId,
    campus: &State<SharedCampus>,
) -> Result<Json<VotingOutcome>> {
    let campus = campus.lock().await;
    Ok(Json(campus.election(id)?.voting_result(&caller)?))
}

#[post("/elections/<id>/reward")]
async fn issue_reward(
    caller: Caller,
    id: ElectionId,
    campus: &State<SharedCampus>,
) -> Result<Json<RewardReport>> {
    let mut campus = campus.lock().await;
    Ok(Json(campus.issue_voting_reward(id, &caller)?))
}

#[post("/elections/<id>/withdraw")]
async fn withdraw(
    caller: Caller,
    id: ElectionId,
    campus: &State<SharedCampus>,
) -> Result<Json<Amount>> {
    let mut campus = campus.lock().await;
    Ok(Json(campus.withdraw(id, &caller)?))
}

/// Alias of withdraw.
#[post("/elections/<id>/return-to-admin")]
async fn return_to_admin(
    caller: Caller,
    id: ElectionId,
    campus: &State<SharedCampus>,
) -> Result<Json<Amount>> {
    let mut campus = campus.lock().await;
    Ok(Json(campus.withdraw(id, &caller)?))
}
