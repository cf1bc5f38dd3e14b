//! Module registration, bidding and seat allocation.

mod allocation;
mod bid_book;
mod registry_core;

pub use allocation::{select_winners, ModuleAllocation};
pub use registry_core::{Module, ModuleRegistry};
