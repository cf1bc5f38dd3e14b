mod account;
pub mod module_code;

pub use account::{AccountId, Amount};
pub use module_code::ModuleCode;

/// Module registry instances are addressed by index.
pub type RegistryId = u32;
/// Election instances are addressed by index.
pub type ElectionId = u32;
/// Election options are identified by integers.
pub type OptionId = u32;
