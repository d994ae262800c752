//! Attempt throttling, admin authentication, and session guarding.
//!
//! The sliding-window throttle is the shared defense for extraction-code
//! guessing, download flooding, and admin password guessing; the admin
//! variant is backed by the durable attempt log so a restart cannot
//! clear a lockout.

pub mod admin;
pub mod secret;
pub mod session;
pub mod throttle;

pub use admin::{AdminAuthService, LoginOutcome};
pub use secret::SecretVerifier;
pub use session::{GuardOutcome, SessionDenied, SessionGuard, SessionStore};
pub use throttle::{AttemptThrottle, Decision, DurableThrottle, MemoryThrottle};
