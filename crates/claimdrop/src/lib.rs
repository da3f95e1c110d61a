//! # Claimdrop
//!
//! Off-chain-authorized value distribution. A trusted signer pre-signs claim
//! authorizations; anyone can later redeem one, exactly once, to pay its
//! recipient in tokens or native currency. A batch distributor pushes
//! payments to many recipients in one call under a bounded budget.
//!
//! ## Key Concepts
//!
//! - **Authorization**: `(recipient, amount, nonce)`, signed as a Keccak-256
//!   digest of its packed encoding. Never stored; only its ledger key is.
//! - **Pending before payout**: the ledger marks a claim before any transfer,
//!   so a payout callback cannot redeem the same authorization twice.
//! - **Sequential halt**: a native batch pays a prefix of its recipients and
//!   refunds what is left.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use claimdrop::{ClaimConfig, ClaimEngine};
//! use claimdrop::core::{Address, ClaimAuthorization, DigestScheme, TrustedSigner};
//! use claimdrop::ledger::SqliteLedger;
//! use claimdrop::payout::{MemoryToken, TokenRail};
//!
//! let signer = TrustedSigner::generate();
//! let engine_address = Address::from_bytes([1; 20]);
//! let wallet = Address::from_bytes([2; 20]);
//! let token = Arc::new(MemoryToken::new(Address::from_bytes([3; 20])));
//!
//! let engine = ClaimEngine::new(
//!     ClaimConfig::new(signer.address(), engine_address),
//!     Arc::new(SqliteLedger::open("claims.db").unwrap()),
//!     TokenRail::new(token, wallet, engine_address),
//! );
//!
//! let recipient = Address::from_bytes([4; 20]);
//! let voucher = signer
//!     .authorize(ClaimAuthorization::new(recipient, 124, 1), DigestScheme::Raw)
//!     .unwrap();
//! let _ = engine.claim_voucher(&recipient, &voucher);
//! ```
//!
//! ## Re-exports
//!
//! - `claimdrop::core` - Addresses, authorizations, digests, signatures
//! - `claimdrop::ledger` - Redemption ledger and its backends
//! - `claimdrop::payout` - Token and native payout rails

pub mod batch;
pub mod claim;
pub mod config;
pub mod error;
pub mod events;

pub use claimdrop_core as core;
pub use claimdrop_ledger as ledger;
pub use claimdrop_payout as payout;

pub use batch::{plan_native_batch, BatchDistributor, NativePlan, TokenBatchOutcome};
pub use claim::{ClaimEngine, ClaimOutcome};
pub use config::{ClaimConfig, DistributorConfig, MAX_BATCH_SIZE};
pub use error::{ClaimError, ClaimResult, ConfigError, DistributionError, DistributionResult};
pub use events::{EventSink, MemoryEventLog, TracingSink};

pub use claimdrop_core::{
    Address, Amount, CampaignId, ClaimAuthorization, DigestScheme, Event, MessageSchema, Nonce,
    RecoverableSignature, SignedAuthorization, TrustedSigner,
};
