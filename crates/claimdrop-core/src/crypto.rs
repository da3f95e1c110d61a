//! Cryptographic primitives for claimdrop.
//!
//! Wraps Keccak-256 hashing and recoverable secp256k1 ECDSA with strong types.
//! Signer recovery is the only verification primitive: the caller compares
//! the recovered [`Address`] with whatever identity it trusts.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;

use crate::error::CoreError;
use crate::types::{decode_fixed, Address};

/// Keccak-256 of the given data.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Keccak256::digest(data));
    out
}

/// A 32-byte Keccak-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Keccak256Hash(pub [u8; 32]);

impl Keccak256Hash {
    /// Compute the Keccak-256 hash of the given data.
    pub fn hash(data: &[u8]) -> Self {
        Self(keccak256(data))
    }

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        decode_fixed::<32>(s, "digest").map(Self)
    }
}

impl fmt::Debug for Keccak256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keccak256({})", &self.to_hex()[..18])
    }
}

impl AsRef<[u8]> for Keccak256Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Keccak256Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Derive the account address controlled by a secp256k1 public key.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash[12..]);
    Address(addr)
}

/// A 65-byte recoverable ECDSA signature laid out as `r || s || v`.
///
/// `v` is accepted as `0`/`1` or the RPC form `27`/`28`; signatures
/// produced here always use the RPC form.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature(pub [u8; 65]);

impl RecoverableSignature {
    pub const fn from_bytes(bytes: [u8; 65]) -> Self {
        Self(bytes)
    }

    /// Assemble from the `(v, r, s)` triple.
    pub fn from_vrs(v: u8, r: [u8; 32], s: [u8; 32]) -> Self {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(&r);
        bytes[32..64].copy_from_slice(&s);
        bytes[64] = v;
        Self(bytes)
    }

    /// Parse from a byte slice, rejecting anything but 65 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CoreError> {
        let arr: [u8; 65] = bytes.try_into().map_err(|_| {
            CoreError::MalformedSignature(format!("expected 65 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(arr))
    }

    pub const fn as_bytes(&self) -> &[u8; 65] {
        &self.0
    }

    pub fn v(&self) -> u8 {
        self.0[64]
    }

    /// `0x`-prefixed hex, the form wallets hand out.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> Result<Self, CoreError> {
        decode_fixed::<65>(s, "signature").map(Self)
    }

    /// Recover the address that produced this signature over `digest`.
    ///
    /// Fails only when the signature is structurally unusable. A valid
    /// signature from an unexpected key recovers that key's address.
    pub fn recover(&self, digest: &Keccak256Hash) -> Result<Address, CoreError> {
        let recovery_byte = match self.v() {
            v @ (0 | 1) => v,
            v @ (27 | 28) => v - 27,
            other => {
                return Err(CoreError::MalformedSignature(format!(
                    "invalid recovery byte {other}"
                )))
            }
        };
        let recovery_id = RecoveryId::from_byte(recovery_byte).ok_or_else(|| {
            CoreError::MalformedSignature(format!("invalid recovery byte {recovery_byte}"))
        })?;

        let signature = Signature::from_slice(&self.0[..64])
            .map_err(|_| CoreError::MalformedSignature("r or s out of range".into()))?;

        // Only the low-s form is accepted, so each authorization has exactly
        // one valid encoding.
        if signature.normalize_s().is_some() {
            return Err(CoreError::MalformedSignature("non-canonical high s".into()));
        }

        let key = VerifyingKey::recover_from_prehash(digest.as_bytes(), &signature, recovery_id)
            .map_err(|_| CoreError::MalformedSignature("no key recoverable".into()))?;

        Ok(address_of(&key))
    }

    /// The zero signature (invalid, used as placeholder).
    pub const ZERO: Self = Self([0u8; 65]);
}

impl fmt::Debug for RecoverableSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecoverableSig({}...)", &self.to_hex()[..18])
    }
}

impl AsRef<[u8]> for RecoverableSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 65]> for RecoverableSignature {
    fn from(bytes: [u8; 65]) -> Self {
        Self(bytes)
    }
}

impl Serialize for RecoverableSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for RecoverableSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// A secp256k1 signing key held by the party that issues authorizations.
///
/// This wraps k256's `SigningKey`.
#[derive(Clone)]
pub struct TrustedSigner {
    signing_key: SigningKey,
}

impl TrustedSigner {
    /// Generate a new random signer.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            signing_key: SigningKey::random(&mut rng),
        }
    }

    /// Create from a 32-byte secret scalar.
    pub fn from_secret(secret: &[u8; 32]) -> Result<Self, CoreError> {
        let signing_key =
            SigningKey::from_slice(secret).map_err(|_| CoreError::InvalidSecretKey)?;
        Ok(Self { signing_key })
    }

    /// Create from a hex-encoded secret (as exported by common wallets).
    pub fn from_secret_hex(s: &str) -> Result<Self, CoreError> {
        Self::from_secret(&decode_fixed::<32>(s, "secret key")?)
    }

    /// The address other parties should trust.
    pub fn address(&self) -> Address {
        address_of(self.signing_key.verifying_key())
    }

    /// Sign a 32-byte digest, producing an RPC-form recoverable signature.
    pub fn sign_digest(&self, digest: &Keccak256Hash) -> Result<RecoverableSignature, CoreError> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(digest.as_bytes())
            .map_err(|e| CoreError::EncodingError(e.to_string()))?;

        let mut bytes = [0u8; 65];
        bytes[..64].copy_from_slice(&signature.to_bytes());
        bytes[64] = 27 + recovery_id.to_byte();
        Ok(RecoverableSignature(bytes))
    }
}

impl fmt::Debug for TrustedSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrustedSigner({})", self.address().to_hex())
    }
}
