//! Admin session storage and guarding.

pub mod guard;
pub mod store;

pub use guard::{GuardOutcome, SessionDenied, SessionGuard};
pub use store::SessionStore;
