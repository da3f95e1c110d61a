//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a trusted signer, funded token
//! and native ledgers, and engines wired to them.

use std::sync::Arc;

use claimdrop::{BatchDistributor, ClaimConfig, ClaimEngine, DistributorConfig, MemoryEventLog};
use claimdrop_core::{
    Address, Amount, CampaignId, ClaimAuthorization, DigestScheme, MessageSchema, Nonce,
    SignedAuthorization, TrustedSigner,
};
use claimdrop_ledger::MemoryLedger;
use claimdrop_payout::{MemoryBank, MemoryToken, NativeRail, TokenLedger, TokenRail};

/// Balance minted to the distributor wallet and approved to the engine.
pub const WALLET_FUNDS: Amount = 1_000_000;

/// Native balance the engine's treasury starts with.
pub const TREASURY_FUNDS: Amount = 1_000_000;

pub type TokenEngine = ClaimEngine<MemoryLedger, TokenRail<MemoryToken>>;
pub type NativeEngine = ClaimEngine<MemoryLedger, NativeRail<MemoryBank>>;

/// Deterministic account address `n`.
pub fn account(n: u16) -> Address {
    let mut bytes = [0xac; 20];
    bytes[18..].copy_from_slice(&n.to_be_bytes());
    Address::from_bytes(bytes)
}

/// `n` distinct deterministic accounts.
pub fn accounts(n: usize) -> Vec<Address> {
    (0..n).map(|i| account(i as u16)).collect()
}

/// A test fixture with a signer, collaborators and shared event log.
pub struct TestFixture {
    pub signer: TrustedSigner,
    pub scheme: DigestScheme,
    pub campaign: CampaignId,
    pub engine_address: Address,
    pub wallet: Address,
    pub distributor_address: Address,
    pub token: Arc<MemoryToken>,
    pub bank: Arc<MemoryBank>,
    pub ledger: Arc<MemoryLedger>,
    pub events: Arc<MemoryEventLog>,
}

impl TestFixture {
    /// Create a fixture with a random signer.
    pub fn new() -> Self {
        Self::with_signer(TrustedSigner::generate())
    }

    /// Create with a deterministic signer.
    pub fn with_secret(secret: [u8; 32]) -> Self {
        match TrustedSigner::from_secret(&secret) {
            Ok(signer) => Self::with_signer(signer),
            Err(e) => panic!("fixture secret rejected: {}", e),
        }
    }

    pub fn with_signer(signer: TrustedSigner) -> Self {
        let campaign = CampaignId::derive(&signer.address(), "fixture");
        Self {
            signer,
            scheme: DigestScheme::Raw,
            campaign,
            engine_address: Address::from_bytes([0xe0; 20]),
            wallet: Address::from_bytes([0xd1; 20]),
            distributor_address: Address::from_bytes([0xd0; 20]),
            token: Arc::new(MemoryToken::new(Address::from_bytes([0x70; 20]))),
            bank: Arc::new(MemoryBank::new()),
            ledger: Arc::new(MemoryLedger::new()),
            events: Arc::new(MemoryEventLog::new()),
        }
    }

    pub fn claim_config(&self, schema: MessageSchema) -> ClaimConfig {
        ClaimConfig::new(self.signer.address(), self.engine_address)
            .with_campaign(self.campaign)
            .with_schema(schema)
            .with_digest_scheme(self.scheme)
    }

    /// A token-rail engine whose wallet holds and approved [`WALLET_FUNDS`].
    pub fn token_engine(&self, schema: MessageSchema) -> TokenEngine {
        self.fund_wallet(WALLET_FUNDS);
        ClaimEngine::new(
            self.claim_config(schema),
            self.ledger.clone(),
            TokenRail::new(self.token.clone(), self.wallet, self.engine_address),
        )
        .with_event_sink(self.events.clone())
    }

    /// A native-rail engine whose treasury holds [`TREASURY_FUNDS`].
    pub fn native_engine(&self) -> NativeEngine {
        self.bank
            .deposit(&self.engine_address, TREASURY_FUNDS)
            .unwrap_or_else(|e| panic!("treasury deposit failed: {}", e));
        ClaimEngine::new(
            self.claim_config(MessageSchema::Nonced),
            self.ledger.clone(),
            NativeRail::new(self.bank.clone(), self.engine_address),
        )
        .with_event_sink(self.events.clone())
    }

    pub fn distributor(&self) -> BatchDistributor {
        BatchDistributor::new(DistributorConfig::new(self.distributor_address))
            .unwrap_or_else(|e| panic!("distributor config rejected: {}", e))
            .with_event_sink(self.events.clone())
    }

    /// Mint `amount` to the wallet and approve the engine for all of it.
    pub fn fund_wallet(&self, amount: Amount) {
        let result = self.token.mint(&self.wallet, amount).and_then(|()| {
            let approved = self.token.allowance(&self.wallet, &self.engine_address)?;
            self.token
                .approve(&self.wallet, &self.engine_address, approved + amount)
        });
        if let Err(e) = result {
            panic!("wallet funding failed: {}", e);
        }
    }

    /// Give `caller` tokens and approve the distributor to move them.
    pub fn fund_batch_caller(&self, caller: &Address, balance: Amount, allowance: Amount) {
        let result = self
            .token
            .mint(caller, balance)
            .and_then(|()| self.token.approve(caller, &self.distributor_address, allowance));
        if let Err(e) = result {
            panic!("caller funding failed: {}", e);
        }
    }

    /// Issue a nonced voucher.
    pub fn voucher(&self, recipient: Address, amount: Amount, nonce: Nonce) -> SignedAuthorization {
        self.sign(ClaimAuthorization::new(recipient, amount, nonce))
    }

    /// Issue a legacy voucher.
    pub fn legacy_voucher(&self, recipient: Address, amount: Amount) -> SignedAuthorization {
        self.sign(ClaimAuthorization::legacy(recipient, amount))
    }

    pub fn sign(&self, authorization: ClaimAuthorization) -> SignedAuthorization {
        self.signer
            .authorize(authorization, self.scheme)
            .unwrap_or_else(|e| panic!("signing failed: {}", e))
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
