//! # Claimdrop Core
//!
//! Pure primitives for claimdrop: addresses, authorizations, canonical
//! digests and recoverable signatures.
//!
//! This crate contains no I/O, no storage, no payout logic. It is pure
//! computation over the data a trusted signer commits to.
//!
//! ## Key Types
//!
//! - [`ClaimAuthorization`] - The `(recipient, amount[, nonce])` tuple a signer commits to
//! - [`SignedAuthorization`] - An authorization plus its signature, as handed to a claimant
//! - [`RecoverableSignature`] - 65-byte `r || s || v` secp256k1 signature
//! - [`ClaimKey`] - Campaign-scoped ledger key (Blake3)
//! - [`Event`] - Outcomes emitted by the engines
//!
//! ## Canonicalization
//!
//! Digests follow Solidity's `abi.encodePacked` followed by Keccak-256. See
//! the [`canonical`] module.

pub mod authorization;
pub mod canonical;
pub mod crypto;
pub mod error;
pub mod event;
pub mod types;

pub use authorization::{ClaimAuthorization, MessageSchema, SignedAuthorization};
pub use canonical::{digest_packed, encode_packed_legacy, encode_packed_nonced, DigestScheme};
pub use crypto::{address_of, keccak256, Keccak256Hash, RecoverableSignature, TrustedSigner};
pub use error::CoreError;
pub use event::Event;
pub use types::{Address, Amount, CampaignId, ClaimKey, Nonce};
