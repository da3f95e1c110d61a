//! Observable outcomes of claims and distributions.

use serde::{Deserialize, Serialize};

use crate::types::{Address, Amount, CampaignId, Nonce};

/// An event emitted after an operation succeeds.
///
/// Failed operations emit nothing.
///
/// Serialized externally tagged, e.g. `{"batch_refunded":{"to":..,"amount":66}}`.
/// Amounts are full 128-bit integers, which an internally tagged layout
/// cannot carry through deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    /// A claim paid out and was recorded as redeemed.
    ClaimCompleted {
        campaign: CampaignId,
        recipient: Address,
        /// The amount actually paid. For a legacy top-up this is the
        /// difference, not the authorized total.
        amount: Amount,
        nonce: Option<Nonce>,
    },

    /// Every transfer of a token batch succeeded.
    TokenBatchCompleted { token: Address, total: Amount },

    /// A native batch finished, possibly after paying only a prefix.
    NativeBatchCompleted {
        total_sent: Amount,
        /// Number of recipients paid.
        last_paid_index: usize,
    },

    /// Unconsumed native budget returned to the caller.
    BatchRefunded { to: Address, amount: Amount },
}

impl Event {
    /// Short name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Event::ClaimCompleted { .. } => "ClaimCompleted",
            Event::TokenBatchCompleted { .. } => "TokenBatchCompleted",
            Event::NativeBatchCompleted { .. } => "NativeBatchCompleted",
            Event::BatchRefunded { .. } => "BatchRefunded",
        }
    }
}
