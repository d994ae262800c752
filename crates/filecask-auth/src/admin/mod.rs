//! Admin login orchestration.

pub mod service;

pub use service::{AdminAuthService, LoginOutcome};
