//! Domain entity models for Filecask.
//!
//! Plain serde-serializable structs with no store or transport concerns.
//! The validity policy lives on [`share::ShareRecord`] so every caller
//! evaluates the same rules against the same clock.

pub mod admin;
pub mod download;
pub mod share;
