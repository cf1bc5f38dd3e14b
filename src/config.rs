use std::collections::{BTreeMap, BTreeSet};

use log::{error, info};
use rocket::{
    fairing::{Fairing, Info, Kind},
    tokio::sync::Mutex,
    Build, Rocket,
};
use serde::Deserialize;

use crate::error::Result;
use crate::model::{
    campus::{Campus, SharedCampus},
    common::{AccountId, Amount},
    election::ElectionSpec,
    ledger::InMemoryLedger,
};

/// Application configuration, derived from `Rocket.toml` and `ROCKET_*`
/// environment variables. This struct becomes managed state and can be
/// inspected by any endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    owner: AccountId,
    #[serde(default)]
    registries: u32,
    #[serde(default)]
    elections: Vec<ElectionSpec>,
    #[serde(default)]
    genesis: BTreeMap<AccountId, Amount>,
    #[serde(default)]
    blocked: BTreeSet<AccountId>,
}

impl Config {
    /// Owner of every instance deployed at launch.
    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Number of module registries deployed at launch.
    pub fn registries(&self) -> u32 {
        self.registries
    }

    /// Elections deployed at launch, in id order.
    pub fn elections(&self) -> &[ElectionSpec] {
        &self.elections
    }

    /// Opening ledger balances. Election pots are funded here too, through
    /// their `election-<id>` accounts.
    pub fn genesis(&self) -> &BTreeMap<AccountId, Amount> {
        &self.genesis
    }

    /// Accounts that may not receive tokens.
    pub fn blocked(&self) -> &BTreeSet<AccountId> {
        &self.blocked
    }

    /// Build the campus this config describes.
    pub fn deploy(&self) -> Result<Campus> {
        let mut ledger = InMemoryLedger::new();
        for (account, amount) in &self.genesis {
            ledger.credit(account.clone(), *amount)?;
        }
        for account in &self.blocked {
            ledger.block(account.clone());
        }
        let mut campus = Campus::new(ledger);
        for _ in 0..self.registries {
            campus.deploy_registry(self.owner.clone());
        }
        for spec in &self.elections {
            campus.deploy_election(self.owner.clone(), spec.clone())?;
        }
        info!(
            "Deployed {} registries and {} elections owned by {}",
            self.registries,
            self.elections.len(),
            self.owner
        );
        Ok(campus)
    }
}

/// A fairing that loads the application config and puts it in managed state.
/// This could easily be achieved using `AdHoc::config`, but is written out
/// explicitly for symmetry with the campus fairing and control over error
/// messages.
pub struct ConfigFairing;

#[rocket::async_trait]
impl Fairing for ConfigFairing {
    fn info(&self) -> Info {
        Info {
            name: "Config",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        // Load the config.
        let config = match rocket.figment().extract::<Config>() {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load application config");
                rocket::config::pretty_print_error(e);
                return Err(rocket);
            }
        };

        // Manage the state.
        rocket = rocket.manage(config);
        Ok(rocket)
    }
}

/// A fairing that deploys the campus described by the managed [`Config`] and
/// places it behind a lock into managed state. Must be attached after
/// [`ConfigFairing`].
pub struct CampusFairing;

#[rocket::async_trait]
impl Fairing for CampusFairing {
    fn info(&self) -> Info {
        Info {
            name: "Campus",
            kind: Kind::Ignite,
        }
    }

    async fn on_ignite(&self, mut rocket: Rocket<Build>) -> rocket::fairing::Result {
        let campus = match rocket.state::<Config>().map(Config::deploy) {
            Some(Ok(campus)) => campus,
            Some(Err(e)) => {
                error!("Failed to deploy campus: {e}");
                return Err(rocket);
            }
            None => {
                error!("Campus deployed before the application config was loaded");
                return Err(rocket);
            }
        };
        info!("Campus online");

        // Manage the state.
        let shared: SharedCampus = Mutex::new(campus);
        rocket = rocket.manage(shared);
        Ok(rocket)
    }
}
