//! Engine state and the types exchanged with the outside world.
//!
//! - [`registry`]: module registration, bidding and allocation.
//! - [`election`]: stake-weighted voting and voter rewards.
//! - [`ledger`]: the stake ledger the engine reads and pays from.
//! - [`campus`]: the arena owning every deployed instance.

pub mod api;
pub mod campus;
pub mod common;
pub mod election;
pub mod ledger;
pub mod registry;
pub mod scenario;
