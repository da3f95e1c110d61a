//! Canonical packed encoding of authorization tuples.
//!
//! This module reproduces Solidity's `abi.encodePacked` for the field types
//! that appear in an authorization:
//! - `address` is its 20 raw bytes
//! - `uint256` is a 32-byte big-endian word
//! - fields are concatenated with no padding between them and no length prefix
//!
//! The digest an issuer signs is `keccak256` of these bytes, optionally
//! wrapped in the EIP-191 personal-message envelope.

use serde::{Deserialize, Serialize};

use crate::crypto::{keccak256, Keccak256Hash};
use crate::types::{Address, Amount, Nonce};

/// Length of a packed `(address, uint256)` tuple.
pub const LEGACY_PACKED_LEN: usize = 20 + 32;

/// Length of a packed `(address, uint256, uint256)` tuple.
pub const NONCED_PACKED_LEN: usize = 20 + 32 + 32;

/// Prefix of the EIP-191 personal-message envelope for a 32-byte message.
pub const ETH_SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// How the packed tuple is turned into the digest that gets signed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DigestScheme {
    /// `keccak256(packed)`, signed directly.
    #[default]
    Raw,
    /// `keccak256("\x19Ethereum Signed Message:\n32" || keccak256(packed))`.
    EthSignedMessage,
}

/// Encode a `uint256` word.
pub fn encode_word(value: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Packed encoding of `(recipient, amount)`.
pub fn encode_packed_legacy(recipient: &Address, amount: Amount) -> Vec<u8> {
    let mut buf = Vec::with_capacity(LEGACY_PACKED_LEN);
    buf.extend_from_slice(&recipient.0);
    buf.extend_from_slice(&encode_word(amount));
    buf
}

/// Packed encoding of `(recipient, amount, nonce)`.
pub fn encode_packed_nonced(recipient: &Address, amount: Amount, nonce: Nonce) -> Vec<u8> {
    let mut buf = Vec::with_capacity(NONCED_PACKED_LEN);
    buf.extend_from_slice(&recipient.0);
    buf.extend_from_slice(&encode_word(amount));
    buf.extend_from_slice(&encode_word(nonce));
    buf
}

/// Wrap a 32-byte hash in the EIP-191 envelope and hash again.
pub fn eth_signed_message_hash(hash: &Keccak256Hash) -> Keccak256Hash {
    let mut buf = Vec::with_capacity(ETH_SIGNED_MESSAGE_PREFIX.len() + 32);
    buf.extend_from_slice(ETH_SIGNED_MESSAGE_PREFIX);
    buf.extend_from_slice(&hash.0);
    Keccak256Hash(keccak256(&buf))
}

/// Digest packed bytes under the given scheme.
pub fn digest_packed(packed: &[u8], scheme: DigestScheme) -> Keccak256Hash {
    let inner = Keccak256Hash::hash(packed);
    match scheme {
        DigestScheme::Raw => inner,
        DigestScheme::EthSignedMessage => eth_signed_message_hash(&inner),
    }
}
