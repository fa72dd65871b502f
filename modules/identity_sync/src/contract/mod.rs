pub mod client;
pub mod error;
pub mod model;

pub use model::{EventKind, InboundEvent, SyncOutcome, UserFields, UserRecord};
