//! Core building blocks shared by every Filecask crate.
//!
//! Contains the unified error type, configuration schemas, the clock
//! abstraction, and the common domain types (IDs, outcomes, pagination).

pub mod clock;
pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use clock::{Clock, SystemClock};
pub use error::{AppError, ErrorKind};
pub use result::AppResult;
