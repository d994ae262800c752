//! In-memory store implementations using Tokio mutexes.
//!
//! Suitable for single-node deployments and tests. Shares and their
//! download events live under one mutex so the redemption commit is a
//! genuine transaction.

pub mod admin;
pub mod share;

pub use admin::MemoryAttemptStore;
pub use share::MemoryShareStore;
