//! Native-currency balances consumed by the native rail and native batches.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use claimdrop_core::{Address, Amount};

use crate::error::{PayoutError, Result};

/// Native-currency transfers between accounts.
///
/// Unlike a token ledger, a recipient may refuse a transfer. Implementations
/// that run recipient code on receipt must not hold internal locks while
/// doing so.
pub trait NativeBank: Send + Sync {
    fn balance_of(&self, account: &Address) -> Result<Amount>;

    /// Whether `account` currently accepts incoming transfers.
    fn accepts(&self, account: &Address) -> Result<bool>;

    /// Move `amount` from `from` to `to`. Fails with `Rejected` if `to`
    /// refuses it.
    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<()>;

    /// Apply every leg in order, or none of them.
    ///
    /// Each leg sees the balances left by the legs before it. On error no
    /// balance has changed.
    fn transfer_batch(&self, legs: &[Transfer]) -> Result<()>;
}

/// One leg of a [`NativeBank::transfer_batch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
}

impl Transfer {
    pub fn new(from: Address, to: Address, amount: Amount) -> Self {
        Self { from, to, amount }
    }
}

impl<B: NativeBank + ?Sized> NativeBank for Arc<B> {
    fn balance_of(&self, account: &Address) -> Result<Amount> {
        (**self).balance_of(account)
    }

    fn accepts(&self, account: &Address) -> Result<bool> {
        (**self).accepts(account)
    }

    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        (**self).transfer(from, to, amount)
    }

    fn transfer_batch(&self, legs: &[Transfer]) -> Result<()> {
        (**self).transfer_batch(legs)
    }
}

/// In-memory native bank with per-account rejection.
pub struct MemoryBank {
    inner: RwLock<BankState>,
}

#[derive(Default)]
struct BankState {
    balances: HashMap<Address, Amount>,
    rejecting: HashSet<Address>,
}

impl MemoryBank {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BankState::default()),
        }
    }

    /// Credit `account` from outside the system.
    pub fn deposit(&self, account: &Address, amount: Amount) -> Result<()> {
        let mut inner = self.inner.write().map_err(PayoutError::poisoned)?;
        let balance = inner
            .balances
            .get(account)
            .copied()
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or(PayoutError::Overflow)?;
        inner.balances.insert(*account, balance);
        Ok(())
    }

    /// Make every later transfer to `account` fail with `Rejected`.
    pub fn reject_transfers_to(&self, account: &Address) -> Result<()> {
        let mut inner = self.inner.write().map_err(PayoutError::poisoned)?;
        inner.rejecting.insert(*account);
        Ok(())
    }

    pub fn accept_transfers_to(&self, account: &Address) -> Result<()> {
        let mut inner = self.inner.write().map_err(PayoutError::poisoned)?;
        inner.rejecting.remove(account);
        Ok(())
    }
}

impl Default for MemoryBank {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeBank for MemoryBank {
    fn balance_of(&self, account: &Address) -> Result<Amount> {
        let inner = self.inner.read().map_err(PayoutError::poisoned)?;
        Ok(inner.balances.get(account).copied().unwrap_or(0))
    }

    fn accepts(&self, account: &Address) -> Result<bool> {
        let inner = self.inner.read().map_err(PayoutError::poisoned)?;
        Ok(!inner.rejecting.contains(account))
    }

    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        let mut inner = self.inner.write().map_err(PayoutError::poisoned)?;
        if inner.rejecting.contains(to) {
            return Err(PayoutError::Rejected { recipient: *to });
        }
        let available = inner.balances.get(from).copied().unwrap_or(0);
        if available < amount {
            return Err(PayoutError::InsufficientBalance {
                account: *from,
                needed: amount,
                available,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = inner
            .balances
            .get(to)
            .copied()
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or(PayoutError::Overflow)?;
        inner.balances.insert(*from, available - amount);
        inner.balances.insert(*to, credited);
        tracing::trace!(%from, %to, amount, "native transfer");
        Ok(())
    }

    fn transfer_batch(&self, legs: &[Transfer]) -> Result<()> {
        let mut inner = self.inner.write().map_err(PayoutError::poisoned)?;

        // Stage every leg against an overlay, commit only if all of them fit.
        let mut staged: HashMap<Address, Amount> = HashMap::new();
        for leg in legs {
            if inner.rejecting.contains(&leg.to) {
                return Err(PayoutError::Rejected { recipient: leg.to });
            }
            let balance = |account: &Address, staged: &HashMap<Address, Amount>| {
                staged
                    .get(account)
                    .or_else(|| inner.balances.get(account))
                    .copied()
                    .unwrap_or(0)
            };
            let available = balance(&leg.from, &staged);
            if available < leg.amount {
                return Err(PayoutError::InsufficientBalance {
                    account: leg.from,
                    needed: leg.amount,
                    available,
                });
            }
            if leg.from == leg.to {
                continue;
            }
            let credited = balance(&leg.to, &staged)
                .checked_add(leg.amount)
                .ok_or(PayoutError::Overflow)?;
            staged.insert(leg.from, available - leg.amount);
            staged.insert(leg.to, credited);
        }

        inner.balances.extend(staged);
        tracing::trace!(legs = legs.len(), "native batch transfer");
        Ok(())
    }
}
