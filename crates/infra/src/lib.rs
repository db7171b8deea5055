//! Infrastructure layer: club directory persistence and the club lifecycle.

pub mod lifecycle;
pub mod store;

pub use lifecycle::{ClubLifecycle, LifecycleError, Teardown};
