// === PUBLIC CONTRACT ===
// Only the contract module should be consumed by other crates
pub mod contract;

pub use contract::{client, error, model};

// === MODULE DEFINITION ===
// The server binary wires the module through this type
pub mod module;
pub use module::IdentitySync;

// === INTERNAL MODULES ===
// Exposed for integration tests; not a stable API.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod gateways;
#[doc(hidden)]
pub mod infra;
