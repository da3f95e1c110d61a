//! # Claimdrop Ledger
//!
//! Replay protection for claimdrop. Records which authorizations have been
//! redeemed behind the [`ClaimLedger`] trait, with SQLite and in-memory
//! implementations.
//!
//! ## Key Types
//!
//! - [`ClaimLedger`] - The trait the claim engine records redemptions through
//! - [`SqliteLedger`] - SQLite-based persistent ledger
//! - [`MemoryLedger`] - In-memory ledger for tests
//! - [`LedgerEntry`] / [`ClaimState`] - A `Pending` or `Redeemed` record
//! - [`BeginOutcome`] - Result of the atomic check-and-mark
//!
//! ## Usage
//!
//! ```rust,no_run
//! use claimdrop_core::ClaimKey;
//! use claimdrop_ledger::{BeginOutcome, ClaimLedger, SqliteLedger};
//!
//! let ledger = SqliteLedger::open("claims.db").unwrap();
//! let key = ClaimKey::from_bytes([0u8; 32]);
//! if let BeginOutcome::Started { .. } = ledger.begin(&key, 124).unwrap() {
//!     // pay out, then:
//!     ledger.commit(&key).unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Pending before payout**: an entry is marked before any external call,
//!   so a reentrant claim for the same key is refused
//! - **Monotonic**: redeemed amounts only grow; rollback restores exactly

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{LedgerError, Result};
pub use memory::MemoryLedger;
pub use sqlite::SqliteLedger;
pub use traits::{BeginOutcome, ClaimLedger, ClaimState, LedgerEntry};
