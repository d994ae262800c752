//! Background maintenance for Filecask.
//!
//! One periodic task: sweep expired share records and trim the download
//! and admin-login logs down to their retention window.

pub mod sweep;

pub use sweep::{SweepReport, SweepTask};
