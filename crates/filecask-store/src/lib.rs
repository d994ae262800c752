//! Record store traits and reference implementations.
//!
//! The access-control engine talks to persistence only through the
//! traits defined here. The in-memory implementations are the reference
//! backing for a single-process deployment and for tests; the JSONL
//! attempt log provides the durability the admin lockout requires.

pub mod admin;
pub mod jsonl;
pub mod memory;
pub mod share;

pub use admin::AdminAttemptStore;
pub use jsonl::JsonlAttemptStore;
pub use memory::{MemoryAttemptStore, MemoryShareStore};
pub use share::{DownloadLogStore, RedeemCommit, ShareStore};
