//! # Claimdrop Payout
//!
//! The two payout rails claims and batches move value over, and the
//! collaborator traits behind them.
//!
//! ## Key Types
//!
//! - [`TokenLedger`] - Fungible-token balances and allowances ([`MemoryToken`] in memory)
//! - [`NativeBank`] - Native-currency balances with refusable transfers ([`MemoryBank`] in memory)
//! - [`PayoutRail`] - What a claim engine pays through
//! - [`TokenRail`] - `transfer_from` a distributor wallet that approved the engine
//! - [`NativeRail`] - Transfer from the engine's own funded balance

pub mod error;
pub mod native;
pub mod rail;
pub mod token;

pub use error::{PayoutError, Result};
pub use native::{MemoryBank, NativeBank, Transfer};
pub use rail::{NativeRail, PayoutRail, RailKind, TokenRail};
pub use token::{MemoryToken, TokenLedger};
