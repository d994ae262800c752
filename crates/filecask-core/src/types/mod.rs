//! Core type definitions used across the Filecask workspace.

pub mod id;
pub mod outcome;
pub mod pagination;

pub use id::*;
pub use outcome::DenyReason;
pub use pagination::{PageRequest, PageResponse};
