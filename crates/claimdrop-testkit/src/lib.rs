//! # Claimdrop Testkit
//!
//! Testing utilities for claimdrop.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known digests and signatures, matching Ethereum tooling
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: A signer plus funded ledgers and engines wired to them
//!
//! ## Golden Vectors
//!
//! ```rust
//! use claimdrop_testkit::vectors::verify_all_vectors;
//!
//! for (name, result) in verify_all_vectors() {
//!     assert!(result.is_ok(), "{}: {:?}", name, result);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use claimdrop_testkit::generators::{authorization, signer, digest_scheme};
//!
//! proptest! {
//!     #[test]
//!     fn vouchers_recover(s in signer(), a in authorization(), d in digest_scheme()) {
//!         let voucher = s.authorize(a, d).unwrap();
//!         prop_assert_eq!(voucher.signer(d).unwrap(), s.address());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use claimdrop_testkit::fixtures::{account, TestFixture};
//! use claimdrop_core::MessageSchema;
//!
//! let fixture = TestFixture::new();
//! let engine = fixture.token_engine(MessageSchema::Nonced);
//! let voucher = fixture.voucher(account(1), 124, 1);
//! engine.claim_voucher(&account(2), &voucher).unwrap();
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{account, accounts, TestFixture};
pub use generators::{batch, BatchParams};
pub use vectors::{
    all_vectors, authorization_from_vector, verify_all_vectors, verify_vector, GoldenVector,
};
