use rocket::{serde::json::Json, Route, State};

use crate::error::Result;
use crate::model::{
    api::Caller,
    campus::SharedCampus,
    common::{ModuleCode, RegistryId},
    registry::{Module, ModuleAllocation},
};

pub fn routes() -> Vec<Route> {
    routes![
        register_modules,
        modules,
        module_quota,
        bid,
        my_bids,
        allocate,
        my_allocation,
        allocation_table,
    ]
}

#[post("/registries/<id>/modules", data = "<batch>", format = "json")]
async fn register_modules(
    caller: Caller,
    id: RegistryId,
    batch: Json<Vec<Module>>,
    campus: &State<SharedCampus>,
) -> Result<Json<Vec<Module>>> {
    let mut campus = campus.lock().await;
    let registry = campus.registry_mut(id)?;
    registry.register_modules(&caller, &batch)?;
    Ok(Json(registry.modules().to_vec()))
}

#[get("/registries/<id>/modules")]
async fn modules(id: RegistryId, campus: &State<SharedCampus>) -> Result<Json<Vec<Module>>> {
    let campus = campus.lock().await;
    Ok(Json(campus.registry(id)?.modules().to_vec()))
}

#[get("/registries/<id>/modules/<code>/quota")]
async fn module_quota(
    id: RegistryId,
    code: ModuleCode,
    campus: &State<SharedCampus>,
) -> Result<Json<u32>> {
    let campus = campus.lock().await;
    Ok(Json(campus.registry(id)?.module_quota(&code)?))
}

#[post("/registries/<id>/modules/<code>/bid")]
async fn bid(
    caller: Caller,
    id: RegistryId,
    code: ModuleCode,
    campus: &State<SharedCampus>,
) -> Result<()> {
    let mut campus = campus.lock().await;
    campus.registry_mut(id)?.bid(&caller, &code)
}

#[get("/registries/<id>/bids/mine")]
async fn my_bids(
    caller: Caller,
    id: RegistryId,
    campus: &State<SharedCampus>,
) -> Result<Json<Vec<ModuleCode>>> {
    let campus = campus.lock().await;
    Ok(Json(campus.registry(id)?.bid_modules(&caller)))
}

#[post("/registries/<id>/allocate")]
async fn allocate(
    caller: Caller,
    id: RegistryId,
    campus: &State<SharedCampus>,
) -> Result<Json<Vec<ModuleAllocation>>> {
    let mut campus = campus.lock().await;
    Ok(Json(campus.allocate(id, &caller)?))
}

#[get("/registries/<id>/allocation/mine")]
async fn my_allocation(
    caller: Caller,
    id: RegistryId,
    campus: &State<SharedCampus>,
) -> Result<Json<Vec<ModuleCode>>> {
    let campus = campus.lock().await;
    Ok(Json(campus.registry(id)?.allocated_modules(&caller)))
}

#[get("/registries/<id>/allocation")]
async fn allocation_table(
    id: RegistryId,
    campus: &State<SharedCampus>,
) -> Result<Json<Vec<ModuleAllocation>>> {
    let campus = campus.lock().await;
    Ok(Json(campus.registry(id)?.allocation_table()))
}

#[cfg(test)]
mod tests {
    use rocket::{http::Status, local::asynchronous::Client};

    use crate::api::test_util::{assert_error, caller};
    use crate::model::common::AccountId;

    use super::*;

    async fn bid_as(client: &Client, account: &'static str, code: &str) -> Status {
        client
            .post(format!("/registries/0/modules/{code}/bid"))
            .header(caller(account))
            .dispatch()
            .await
            .status()
    }

    #[backend_test]
    async fn register_and_list(client: Client) {
        let response = client
            .post(uri!(register_modules(0)))
            .header(caller("admin"))
            .json(&[Module::example1(), Module::example2()])
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());

        let response = client.get(uri!(modules(0))).dispatch().await;
        assert_eq!(Status::Ok, response.status());
        let listed = response.into_json::<Vec<Module>>().await.unwrap();
        assert_eq!(listed, vec![Module::example1(), Module::example2()]);

        // The other registry is untouched.
        let response = client.get(uri!(modules(1))).dispatch().await;
        let listed = response.into_json::<Vec<Module>>().await.unwrap();
        assert!(listed.is_empty());

        let response = client
            .get("/registries/0/modules/MA1101S/quota")
            .dispatch()
            .await;
        assert_eq!(Some(2), response.into_json::<u32>().await);
    }

    #[backend_test(modules)]
    async fn register_is_owner_only_and_atomic(client: Client) {
        let response = client
            .post(uri!(register_modules(0)))
            .header(caller("s1"))
            .json(&[Module {
                code: "GEA1000".parse().unwrap(),
                quota: 1,
            }])
            .dispatch()
            .await;
        assert_error(response, Status::Forbidden, "Authorization").await;

        let response = client
            .post(uri!(register_modules(0)))
            .header(caller("admin"))
            .json(&[
                Module {
                    code: "GEA1000".parse().unwrap(),
                    quota: 1,
                },
                Module::example1(),
            ])
            .dispatch()
            .await;
        assert_error(response, Status::BadRequest, "Validation").await;

        let response = client.get(uri!(modules(0))).dispatch().await;
        let listed = response.into_json::<Vec<Module>>().await.unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[backend_test(modules)]
    async fn bids_need_identity_and_known_module(client: Client) {
        let response = client
            .post("/registries/0/modules/CS1010/bid")
            .dispatch()
            .await;
        assert_error(response, Status::Unauthorized, "Authorization").await;

        let response = client
            .post("/registries/0/modules/GEA1000/bid")
            .header(caller("s1"))
            .dispatch()
            .await;
        assert_error(response, Status::NotFound, "Validation").await;

        let response = client
            .post("/registries/7/modules/CS1010/bid")
            .header(caller("s1"))
            .dispatch()
            .await;
        assert_error(response, Status::NotFound, "Validation").await;
    }

    #[backend_test(modules)]
    async fn allocation_by_stake(client: Client) {
        for account in ["s1", "s2"] {
            for code in ["CS1010", "MA1101S"] {
                assert_eq!(Status::Ok, bid_as(&client, account, code).await);
            }
        }
        // Bidding again changes nothing.
        assert_eq!(Status::Ok, bid_as(&client, "s1", "CS1010").await);

        let response = client
            .get(uri!(my_bids(0)))
            .header(caller("s1"))
            .dispatch()
            .await;
        let bids = response.into_json::<Vec<ModuleCode>>().await.unwrap();
        assert_eq!(bids, vec![ModuleCode::example1(), ModuleCode::example2()]);

        let response = client
            .post(uri!(allocate(0)))
            .header(caller("s1"))
            .dispatch()
            .await;
        assert_error(response, Status::Forbidden, "Authorization").await;

        let response = client
            .post(uri!(allocate(0)))
            .header(caller("admin"))
            .dispatch()
            .await;
        assert_eq!(Status::Ok, response.status());
        let table = response
            .into_json::<Vec<ModuleAllocation>>()
            .await
            .unwrap();
        let s1 = AccountId::from("s1");
        let s2 = AccountId::from("s2");
        assert_eq!(table[0].bidders, vec![s1.clone(), s2.clone()]);
        assert_eq!(table[0].allocated, vec![s2.clone()]);
        assert_eq!(table[1].allocated, vec![s2, s1]);

        let response = client
            .get(uri!(my_allocation(0)))
            .header(caller("s1"))
            .dispatch()
            .await;
        let won = response.into_json::<Vec<ModuleCode>>().await.unwrap();
        assert_eq!(won, vec![ModuleCode::example2()]);

        let response = client.get(uri!(allocation_table(0))).dispatch().await;
        let stored = response
            .into_json::<Vec<ModuleAllocation>>()
            .await
            .unwrap();
        assert_eq!(stored, table);
    }

    #[backend_test(modules)]
    async fn equal_stake_goes_to_first_bidder(client: Client) {
        for account in ["s3", "s4"] {
            for code in ["CS1010", "MA1101S"] {
                bid_as(&client, account, code).await;
            }
        }
        client
            .post(uri!(allocate(0)))
            .header(caller("admin"))
            .dispatch()
            .await;

        for (account, expected) in [
            ("s3", vec![ModuleCode::example1(), ModuleCode::example2()]),
            ("s4", vec![ModuleCode::example2()]),
        ] {
            let response = client
                .get(uri!(my_allocation(0)))
                .header(caller(account))
                .dispatch()
                .await;
            let won = response.into_json::<Vec<ModuleCode>>().await.unwrap();
            assert_eq!(won, expected);
        }
    }
}
