//! Proptest generators for property-based testing.

use proptest::prelude::*;

use claimdrop_core::{
    Address, Amount, CampaignId, ClaimAuthorization, DigestScheme, Nonce, TrustedSigner,
};

/// Generate a signer from a random, valid secret.
pub fn signer() -> impl Strategy<Value = TrustedSigner> {
    any::<[u8; 32]>().prop_filter_map("secret outside curve order", |secret| {
        TrustedSigner::from_secret(&secret).ok()
    })
}

/// Generate a random address.
pub fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from_bytes)
}

/// Generate a random campaign ID.
pub fn campaign() -> impl Strategy<Value = CampaignId> {
    any::<[u8; 32]>().prop_map(CampaignId::from_bytes)
}

/// Generate a positive amount.
pub fn amount() -> impl Strategy<Value = Amount> {
    1u128..=u128::MAX
}

/// Generate a nonce.
pub fn nonce() -> impl Strategy<Value = Nonce> {
    any::<u128>()
}

pub fn digest_scheme() -> impl Strategy<Value = DigestScheme> {
    prop_oneof![Just(DigestScheme::Raw), Just(DigestScheme::EthSignedMessage)]
}

/// Generate a nonced authorization.
pub fn authorization() -> impl Strategy<Value = ClaimAuthorization> {
    (address(), amount(), nonce())
        .prop_map(|(recipient, amount, nonce)| ClaimAuthorization::new(recipient, amount, nonce))
}

/// Generate a legacy authorization.
pub fn legacy_authorization() -> impl Strategy<Value = ClaimAuthorization> {
    (address(), amount()).prop_map(|(recipient, amount)| ClaimAuthorization::legacy(recipient, amount))
}

/// Parameters for a batch distribution.
#[derive(Debug, Clone)]
pub struct BatchParams {
    pub recipients: Vec<Address>,
    pub amounts: Vec<Amount>,
}

impl BatchParams {
    pub fn total(&self) -> Amount {
        self.amounts.iter().sum()
    }
}

/// Generate a well-shaped batch of up to `max_len` pairs with small amounts.
pub fn batch(max_len: usize) -> impl Strategy<Value = BatchParams> {
    prop::collection::vec((address(), 0u128..10_000), 0..=max_len).prop_map(|pairs| {
        let (recipients, amounts) = pairs.into_iter().unzip();
        BatchParams {
            recipients,
            amounts,
        }
    })
}

impl Arbitrary for BatchParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        batch(64).boxed()
    }
}
