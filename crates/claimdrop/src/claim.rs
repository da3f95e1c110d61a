//! The claim engine: redeem signed authorizations exactly once.

use std::sync::Arc;

use claimdrop_core::{
    Address, Amount, ClaimAuthorization, ClaimKey, Event, Nonce, RecoverableSignature,
    SignedAuthorization,
};
use claimdrop_ledger::{BeginOutcome, ClaimLedger};
use claimdrop_payout::PayoutRail;

use crate::config::ClaimConfig;
use crate::error::{ClaimError, ClaimResult};
use crate::events::{EventSink, TracingSink};

/// What a successful claim did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimOutcome {
    pub key: ClaimKey,
    pub recipient: Address,
    /// Amount transferred by this call.
    pub paid: Amount,
    /// Amount recorded for the key after this call.
    pub recorded: Amount,
}

/// Verifies authorizations from one trusted signer and pays them out once.
///
/// The engine owns no funds bookkeeping of its own: redemption state lives in
/// the ledger and balances live behind the payout rail. Every method takes
/// `&self`, so an engine can be shared through an `Arc` and re-entered from a
/// payout callback.
pub struct ClaimEngine<L: ClaimLedger, R: PayoutRail> {
    config: ClaimConfig,
    ledger: Arc<L>,
    rail: R,
    events: Arc<dyn EventSink>,
}

impl<L: ClaimLedger, R: PayoutRail> ClaimEngine<L, R> {
    pub fn new(config: ClaimConfig, ledger: Arc<L>, rail: R) -> Self {
        Self {
            config,
            ledger,
            rail,
            events: Arc::new(TracingSink),
        }
    }

    /// Publish events to `sink` instead of the log.
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    pub fn config(&self) -> &ClaimConfig {
        &self.config
    }

    pub fn trusted_signer(&self) -> Address {
        self.config.trusted_signer
    }

    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    pub fn rail(&self) -> &R {
        &self.rail
    }

    /// Redeem `authorization`, paying its recipient.
    ///
    /// Anyone may submit. `caller` is only logged and never receives funds
    /// unless it is the recipient.
    pub fn claim(
        &self,
        caller: &Address,
        authorization: &ClaimAuthorization,
        signature: &RecoverableSignature,
    ) -> ClaimResult<ClaimOutcome> {
        let recipient = authorization.recipient;
        let amount = authorization.amount;

        if amount == 0 {
            tracing::warn!(%caller, %recipient, "claim rejected: zero amount");
            return Err(ClaimError::ZeroAmount);
        }
        let found = authorization.schema();
        if found != self.config.schema {
            tracing::warn!(%caller, %recipient, ?found, "claim rejected: schema mismatch");
            return Err(ClaimError::SchemaMismatch {
                expected: self.config.schema,
                found,
            });
        }

        let digest = authorization.digest(self.config.digest_scheme);
        let recovered = signature.recover(&digest)?;
        tracing::debug!(?digest, %recovered, "signer recovered");
        if recovered != self.config.trusted_signer {
            tracing::warn!(%caller, %recipient, %recovered, "claim rejected: untrusted signer");
            return Err(ClaimError::InvalidSignature { recovered });
        }

        let key = authorization.ledger_key(&self.config.campaign);
        let previous = match self.ledger.begin(&key, amount)? {
            BeginOutcome::Started { previous } => previous.unwrap_or(0),
            BeginOutcome::InFlight | BeginOutcome::Redeemed { .. } => {
                tracing::warn!(%caller, %recipient, amount, key = %key, "claim rejected: already claimed");
                return Err(ClaimError::AlreadyClaimed { recipient, amount });
            }
        };

        // `begin` only starts when the request exceeds what was redeemed.
        let paid = amount - previous;
        if let Err(err) = self.rail.pay(&recipient, paid) {
            tracing::warn!(%recipient, paid, rail = %self.rail.kind(), error = %err, "payout failed, rolling back");
            self.ledger.rollback(&key)?;
            return Err(err.into());
        }
        if let Err(source) = self.ledger.commit(&key) {
            tracing::error!(%recipient, paid, key = %key, error = %source, "claim paid but commit failed");
            return Err(ClaimError::CommitFailed {
                recipient,
                paid,
                source,
            });
        }

        tracing::info!(%caller, %recipient, paid, nonce = ?authorization.nonce, "claim completed");
        self.events.emit(Event::ClaimCompleted {
            campaign: self.config.campaign,
            recipient,
            amount: paid,
            nonce: authorization.nonce,
        });

        Ok(ClaimOutcome {
            key,
            recipient,
            paid,
            recorded: amount,
        })
    }

    /// Redeem a voucher as issued by [`TrustedSigner::authorize`](claimdrop_core::TrustedSigner::authorize).
    pub fn claim_voucher(
        &self,
        caller: &Address,
        voucher: &SignedAuthorization,
    ) -> ClaimResult<ClaimOutcome> {
        self.claim(caller, &voucher.authorization, &voucher.signature)
    }

    /// Amount recorded for a tuple.
    ///
    /// With a nonce: the tuple's amount if recorded, else 0. Without: the
    /// cumulative amount recorded for the recipient. In-flight claims count
    /// as recorded.
    pub fn claimed_amount(
        &self,
        recipient: &Address,
        amount: Amount,
        nonce: Option<Nonce>,
    ) -> ClaimResult<Amount> {
        let authorization = ClaimAuthorization {
            recipient: *recipient,
            amount,
            nonce,
        };
        let key = authorization.ledger_key(&self.config.campaign);
        Ok(self
            .ledger
            .get(&key)?
            .map(|entry| entry.recorded_amount())
            .unwrap_or(0))
    }

    /// Whether `authorization` can no longer be redeemed.
    pub fn is_redeemed(&self, authorization: &ClaimAuthorization) -> ClaimResult<bool> {
        let recorded = self.claimed_amount(
            &authorization.recipient,
            authorization.amount,
            authorization.nonce,
        )?;
        Ok(recorded > 0 && recorded >= authorization.amount)
    }
}
