//! Error types for the claim engine and batch distributor.

use claimdrop_core::{Address, Amount, CoreError, MessageSchema};
use claimdrop_ledger::LedgerError;
use claimdrop_payout::PayoutError;
use thiserror::Error;

/// Errors that can occur while redeeming a claim.
///
/// Every error except [`ClaimError::CommitFailed`] leaves the ledger and all
/// balances as they were.
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("claim amount must be positive")]
    ZeroAmount,

    #[error("authorization uses the {found:?} schema, engine expects {expected:?}")]
    SchemaMismatch {
        expected: MessageSchema,
        found: MessageSchema,
    },

    /// No signer could be recovered from the signature.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// The signature is well formed but was not produced by the trusted signer.
    #[error("invalid signature: recovered {recovered}, not the trusted signer")]
    InvalidSignature { recovered: Address },

    /// Already redeemed, or a redemption is in flight.
    #[error("already claimed: {amount} for {recipient}")]
    AlreadyClaimed { recipient: Address, amount: Amount },

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

    /// The recipient refused the native-currency payout.
    #[error("payout to {recipient} failed")]
    PayoutTransfer { recipient: Address },

    /// Any other payout failure.
    #[error("payout error: {0}")]
    Payout(PayoutError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The payout went through but the ledger could not record it. The entry
    /// stays pending, so the tuple cannot be paid a second time.
    #[error("paid {paid} to {recipient} but recording the claim failed: {source}")]
    CommitFailed {
        recipient: Address,
        paid: Amount,
        #[source]
        source: LedgerError,
    },

    #[error("core error: {0}")]
    Core(CoreError),
}

impl From<CoreError> for ClaimError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MalformedSignature(reason) => ClaimError::MalformedSignature(reason),
            other => ClaimError::Core(other),
        }
    }
}

impl From<PayoutError> for ClaimError {
    fn from(err: PayoutError) -> Self {
        match err {
            PayoutError::InsufficientAllowance {
                owner,
                spender,
                needed,
                available,
            } => ClaimError::InsufficientAllowance {
                owner,
                spender,
                needed,
                available,
            },
            PayoutError::InsufficientBalance {
                account,
                needed,
                available,
            } => ClaimError::InsufficientBalance {
                account,
                needed,
                available,
            },
            PayoutError::Rejected { recipient } => ClaimError::PayoutTransfer { recipient },
            other => ClaimError::Payout(other),
        }
    }
}

/// Errors that can occur during a batch distribution.
///
/// A failed batch moves nothing: validation errors are raised before any
/// transfer, and the transfers themselves settle all at once.
#[derive(Debug, Error)]
pub enum DistributionError {
    #[error("{recipients} recipients but {amounts} amounts")]
    ArityMismatch { recipients: usize, amounts: usize },

    #[error("batch of {len} exceeds the limit of {max}")]
    BatchTooLarge { len: usize, max: usize },

    /// The attached budget does not cover even the first recipient.
    #[error("budget {budget} does not cover the first amount {first}")]
    InsufficientBudget { budget: Amount, first: Amount },

    #[error("batch total overflows")]
    AmountOverflow,

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

    /// A recipient, or the caller awaiting a refund, refuses native transfers.
    #[error("payout to {recipient} failed")]
    PayoutTransfer { recipient: Address },

    #[error("payout error: {0}")]
    Payout(PayoutError),
}

impl From<PayoutError> for DistributionError {
    fn from(err: PayoutError) -> Self {
        match err {
            PayoutError::InsufficientAllowance {
                owner,
                spender,
                needed,
                available,
            } => DistributionError::InsufficientAllowance {
                owner,
                spender,
                needed,
                available,
            },
            PayoutError::InsufficientBalance {
                account,
                needed,
                available,
            } => DistributionError::InsufficientBalance {
                account,
                needed,
                available,
            },
            PayoutError::Rejected { recipient } => DistributionError::PayoutTransfer { recipient },
            PayoutError::Overflow => DistributionError::AmountOverflow,
            other => DistributionError::Payout(other),
        }
    }
}

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("max_batch_size {requested} exceeds the hard limit of {max}")]
    BatchSizeTooLarge { requested: usize, max: usize },
}

/// Result type for claim operations.
pub type ClaimResult<T> = std::result::Result<T, ClaimError>;

/// Result type for distribution operations.
pub type DistributionResult<T> = std::result::Result<T, DistributionError>;
