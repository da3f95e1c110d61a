//! Claim authorizations and the signed vouchers that carry them.
//!
//! An authorization is never stored on its own. The issuer signs its digest,
//! hands the resulting [`SignedAuthorization`] to the claimant out of band,
//! and the claim engine records only the derived [`ClaimKey`].

use serde::{Deserialize, Serialize};

use crate::canonical::{digest_packed, encode_packed_legacy, encode_packed_nonced, DigestScheme};
use crate::crypto::{Keccak256Hash, RecoverableSignature, TrustedSigner};
use crate::error::CoreError;
use crate::types::{Address, Amount, CampaignId, ClaimKey, Nonce};

/// Which fields an authorization commits to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSchema {
    /// `(recipient, amount, nonce)`, one redemption per tuple.
    #[default]
    Nonced,
    /// `(recipient, amount)`, tracked as a cumulative amount per recipient.
    Legacy,
}

impl MessageSchema {
    fn tag(self) -> &'static [u8] {
        match self {
            MessageSchema::Nonced => b"nonced",
            MessageSchema::Legacy => b"legacy",
        }
    }
}

/// The `(recipient, amount[, nonce])` tuple a trusted signer commits to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClaimAuthorization {
    pub recipient: Address,
    pub amount: Amount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<Nonce>,
}

impl ClaimAuthorization {
    /// A nonced authorization.
    pub fn new(recipient: Address, amount: Amount, nonce: Nonce) -> Self {
        Self {
            recipient,
            amount,
            nonce: Some(nonce),
        }
    }

    /// A legacy `(recipient, amount)` authorization.
    pub fn legacy(recipient: Address, amount: Amount) -> Self {
        Self {
            recipient,
            amount,
            nonce: None,
        }
    }

    /// The schema implied by the fields present.
    pub fn schema(&self) -> MessageSchema {
        match self.nonce {
            Some(_) => MessageSchema::Nonced,
            None => MessageSchema::Legacy,
        }
    }

    /// Canonical packed bytes.
    pub fn packed(&self) -> Vec<u8> {
        match self.nonce {
            Some(nonce) => encode_packed_nonced(&self.recipient, self.amount, nonce),
            None => encode_packed_legacy(&self.recipient, self.amount),
        }
    }

    /// The digest the issuer signs.
    pub fn digest(&self, scheme: DigestScheme) -> Keccak256Hash {
        digest_packed(&self.packed(), scheme)
    }

    /// The ledger key this authorization is recorded under.
    ///
    /// Nonced keys cover the whole tuple. Legacy keys cover only the
    /// recipient, because the legacy ledger tracks a cumulative amount.
    pub fn ledger_key(&self, campaign: &CampaignId) -> ClaimKey {
        ClaimKey::derive(campaign, self)
    }
}

impl ClaimKey {
    /// Derive the ledger key for `authorization` within `campaign`.
    pub fn derive(campaign: &CampaignId, authorization: &ClaimAuthorization) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"claimdrop-claim-v1:");
        hasher.update(&campaign.0);
        hasher.update(b":");
        hasher.update(authorization.schema().tag());
        hasher.update(b":");
        hasher.update(&authorization.recipient.0);
        if let Some(nonce) = authorization.nonce {
            hasher.update(&authorization.amount.to_be_bytes());
            hasher.update(&nonce.to_be_bytes());
        }
        Self(*hasher.finalize().as_bytes())
    }
}

/// An authorization together with the issuer's signature over it.
///
/// This is the voucher a claimant submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAuthorization {
    pub authorization: ClaimAuthorization,
    pub signature: RecoverableSignature,
}

impl SignedAuthorization {
    /// Recover the issuer's address.
    pub fn signer(&self, scheme: DigestScheme) -> Result<Address, CoreError> {
        self.signature.recover(&self.authorization.digest(scheme))
    }

    /// Encode as CBOR.
    pub fn to_cbor(&self) -> Result<Vec<u8>, CoreError> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf).map_err(|e| CoreError::EncodingError(e.to_string()))?;
        Ok(buf)
    }

    /// Decode from CBOR.
    pub fn from_cbor(bytes: &[u8]) -> Result<Self, CoreError> {
        ciborium::from_reader(bytes).map_err(|e| CoreError::DecodingError(e.to_string()))
    }

    /// Encode as JSON.
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string(self).map_err(|e| CoreError::EncodingError(e.to_string()))
    }

    /// Decode from JSON.
    pub fn from_json(s: &str) -> Result<Self, CoreError> {
        serde_json::from_str(s).map_err(|e| CoreError::DecodingError(e.to_string()))
    }
}

impl TrustedSigner {
    /// Issue a voucher for `authorization`.
    pub fn authorize(
        &self,
        authorization: ClaimAuthorization,
        scheme: DigestScheme,
    ) -> Result<SignedAuthorization, CoreError> {
        let signature = self.sign_digest(&authorization.digest(scheme))?;
        Ok(SignedAuthorization {
            authorization,
            signature,
        })
    }
}
