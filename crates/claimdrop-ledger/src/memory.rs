//! In-memory implementation of the ClaimLedger trait.
//!
//! Same semantics as SQLite, but everything is lost when the ledger is
//! dropped.

use std::collections::HashMap;
use std::sync::RwLock;

use claimdrop_core::{Amount, ClaimKey};

use crate::error::{LedgerError, Result};
use crate::traits::{begin_outcome, BeginOutcome, ClaimLedger, ClaimState, LedgerEntry};

/// In-memory ledger. Thread-safe via RwLock.
pub struct MemoryLedger {
    entries: RwLock<HashMap<ClaimKey, LedgerEntry>>,
}

impl MemoryLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimLedger for MemoryLedger {
    fn get(&self, key: &ClaimKey) -> Result<Option<LedgerEntry>> {
        let entries = self.entries.read().map_err(LedgerError::poisoned)?;
        Ok(entries.get(key).copied())
    }

    fn begin(&self, key: &ClaimKey, amount: Amount) -> Result<BeginOutcome> {
        let mut entries = self.entries.write().map_err(LedgerError::poisoned)?;
        let outcome = begin_outcome(entries.get(key), amount);
        if let BeginOutcome::Started { previous } = outcome {
            entries.insert(
                *key,
                LedgerEntry {
                    state: ClaimState::Pending,
                    amount,
                    previous,
                },
            );
            tracing::debug!(key = %key, amount, ?previous, "ledger entry pending");
        }
        Ok(outcome)
    }

    fn commit(&self, key: &ClaimKey) -> Result<()> {
        let mut entries = self.entries.write().map_err(LedgerError::poisoned)?;
        match entries.get_mut(key) {
            Some(entry) if entry.state == ClaimState::Pending => {
                entry.state = ClaimState::Redeemed;
                entry.previous = None;
                tracing::debug!(key = %key, amount = entry.amount, "ledger entry redeemed");
                Ok(())
            }
            _ => Err(LedgerError::NotPending(*key)),
        }
    }

    fn rollback(&self, key: &ClaimKey) -> Result<()> {
        let mut entries = self.entries.write().map_err(LedgerError::poisoned)?;
        let entry = match entries.get(key) {
            Some(entry) if entry.state == ClaimState::Pending => *entry,
            _ => return Err(LedgerError::NotPending(*key)),
        };
        match entry.previous {
            Some(previous) => {
                entries.insert(
                    *key,
                    LedgerEntry {
                        state: ClaimState::Redeemed,
                        amount: previous,
                        previous: None,
                    },
                );
            }
            None => {
                entries.remove(key);
            }
        }
        tracing::debug!(key = %key, restored = ?entry.previous, "ledger entry rolled back");
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        let entries = self.entries.read().map_err(LedgerError::poisoned)?;
        Ok(entries.len())
    }
}
