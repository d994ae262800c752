//! Administrator login attempts and sessions.

pub mod attempt;
pub mod session;

pub use attempt::AdminLoginAttempt;
pub use session::AdminSession;
