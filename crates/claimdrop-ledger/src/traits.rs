//! ClaimLedger trait: the abstract interface for redemption records.
//!
//! This trait keeps the claim engine storage-agnostic. Implementations
//! include SQLite (persistent) and in-memory (for tests and embedding).

use claimdrop_core::{Amount, ClaimKey};

use crate::error::Result;

/// Lifecycle state of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimState {
    /// A payout is in flight. Written before any payout call.
    Pending,
    /// The payout completed.
    Redeemed,
}

impl ClaimState {
    pub fn as_u8(self) -> u8 {
        match self {
            ClaimState::Pending => 0,
            ClaimState::Redeemed => 1,
        }
    }

    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(ClaimState::Pending),
            1 => Some(ClaimState::Redeemed),
            _ => None,
        }
    }
}

/// One ledger record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerEntry {
    pub state: ClaimState,
    /// Redeemed amount, or the amount being redeemed while pending.
    pub amount: Amount,
    /// While pending, the amount that was redeemed before this claim began.
    /// Restored on rollback.
    pub previous: Option<Amount>,
}

impl LedgerEntry {
    /// The amount that counts as recorded.
    ///
    /// Pending entries count in full, so a nested claim observes them.
    pub fn recorded_amount(&self) -> Amount {
        self.amount
    }

    /// The amount durably redeemed, ignoring any in-flight claim.
    pub fn redeemed_amount(&self) -> Amount {
        match self.state {
            ClaimState::Redeemed => self.amount,
            ClaimState::Pending => self.previous.unwrap_or(0),
        }
    }
}

/// Result of beginning a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeginOutcome {
    /// The entry is now pending. `previous` is the amount redeemed before,
    /// if the key had been redeemed at a lower amount.
    Started { previous: Option<Amount> },
    /// Another claim on this key is in flight.
    InFlight,
    /// Already redeemed at `amount`, which covers the request.
    Redeemed { amount: Amount },
}

/// The ClaimLedger trait: replay protection for authorizations.
///
/// # Design Notes
///
/// - **Check and mark are one step**: `begin` succeeds only if the key is
///   absent, or redeemed at an amount strictly below the requested one.
/// - **Monotonic**: a redeemed amount never decreases and a redeemed key is
///   never removed. `rollback` restores the state `begin` replaced.
/// - **Shareable**: implementations are `Send + Sync` with `&self` methods,
///   and no method calls out to the caller.
pub trait ClaimLedger: Send + Sync {
    /// Look up an entry.
    fn get(&self, key: &ClaimKey) -> Result<Option<LedgerEntry>>;

    /// Atomically check and move `key` to `Pending` at `amount`.
    fn begin(&self, key: &ClaimKey, amount: Amount) -> Result<BeginOutcome>;

    /// `Pending -> Redeemed`.
    fn commit(&self, key: &ClaimKey) -> Result<()>;

    /// Undo a `begin`: restore the prior redeemed amount, or remove the entry.
    fn rollback(&self, key: &ClaimKey) -> Result<()>;

    /// Number of entries, pending or redeemed.
    fn count(&self) -> Result<usize>;
}

impl<L: ClaimLedger + ?Sized> ClaimLedger for std::sync::Arc<L> {
    fn get(&self, key: &ClaimKey) -> Result<Option<LedgerEntry>> {
        (**self).get(key)
    }

    fn begin(&self, key: &ClaimKey, amount: Amount) -> Result<BeginOutcome> {
        (**self).begin(key, amount)
    }

    fn commit(&self, key: &ClaimKey) -> Result<()> {
        (**self).commit(key)
    }

    fn rollback(&self, key: &ClaimKey) -> Result<()> {
        (**self).rollback(key)
    }

    fn count(&self) -> Result<usize> {
        (**self).count()
    }
}

/// Decide the outcome of `begin` given the current entry.
///
/// Shared by every backend so they agree exactly.
pub(crate) fn begin_outcome(current: Option<&LedgerEntry>, amount: Amount) -> BeginOutcome {
    match current {
        None => BeginOutcome::Started { previous: None },
        Some(entry) if entry.state == ClaimState::Pending => BeginOutcome::InFlight,
        Some(entry) if entry.amount >= amount => BeginOutcome::Redeemed {
            amount: entry.amount,
        },
        Some(entry) => BeginOutcome::Started {
            previous: Some(entry.amount),
        },
    }
}
