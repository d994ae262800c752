//! Redemption orchestration and share lifecycle services.

pub mod code;
pub mod redeem;
pub mod share;

pub use code::CodeGenerator;
pub use redeem::{RedeemOutcome, RedemptionService};
pub use share::{CreateShareRequest, ShareService};
