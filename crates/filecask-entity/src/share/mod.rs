//! Share record entity.

pub mod model;

pub use model::{NewShareRecord, ShareRecord, Validity};
