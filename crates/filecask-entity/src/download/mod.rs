//! Download audit events.

pub mod event;

pub use event::DownloadEvent;
