#[macro_use]
extern crate rocket;

#[cfg(test)]
#[macro_use]
extern crate backend_test;

use rocket::{Build, Rocket};

use config::{CampusFairing, ConfigFairing};
use logging::LoggerFairing;

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;

/// The server as configured by `Rocket.toml`.
pub fn build() -> Rocket<Build> {
    rocket::build()
        .attach(LoggerFairing)
        .attach(ConfigFairing)
        .attach(CampusFairing)
        .mount("/", api::routes())
        .register("/", api::catchers())
}

/// A server over an already deployed campus.
#[cfg(test)]
pub(crate) fn rocket_for_campus(campus: model::campus::Campus) -> Rocket<Build> {
    let shared: model::campus::SharedCampus = rocket::tokio::sync::Mutex::new(campus);
    rocket::build()
        .attach(LoggerFairing)
        .manage(shared)
        .mount("/", api::routes())
        .register("/", api::catchers())
}
