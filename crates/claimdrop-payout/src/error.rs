//! Error types for payout rails.

use claimdrop_core::{Address, Amount};
use thiserror::Error;

/// Errors a token ledger or native bank reports for a failed transfer.
///
/// A failed transfer changes no balance and no allowance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayoutError {
    #[error("insufficient allowance: {spender} may move {available} of {owner}'s tokens, needs {needed}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        needed: Amount,
        available: Amount,
    },

    #[error("insufficient balance: {account} holds {available}, needs {needed}")]
    InsufficientBalance {
        account: Address,
        needed: Amount,
        available: Amount,
    },

    /// The recipient refused a native-currency transfer.
    #[error("recipient {recipient} rejected the transfer")]
    Rejected { recipient: Address },

    /// A credit would exceed the representable amount.
    #[error("amount overflow")]
    Overflow,

    /// A lock guarding balances was poisoned.
    #[error("payout state lock poisoned: {0}")]
    Poisoned(String),
}

impl PayoutError {
    pub(crate) fn poisoned(err: impl std::fmt::Display) -> Self {
        PayoutError::Poisoned(err.to_string())
    }
}

/// Result type for payout operations.
pub type Result<T> = std::result::Result<T, PayoutError>;
