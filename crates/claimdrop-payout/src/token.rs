//! Fungible-token ledger consumed by the token rail and token batches.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use claimdrop_core::{Address, Amount};

use crate::error::{PayoutError, Result};

/// The narrow slice of a fungible-token ledger claimdrop needs.
///
/// Semantics follow the usual allowance model: `transfer_from` by a spender
/// consumes the owner's allowance to that spender. Every mutating call is
/// all-or-nothing.
pub trait TokenLedger: Send + Sync {
    /// The token's own address, reported in batch events.
    fn address(&self) -> Address;

    fn balance_of(&self, account: &Address) -> Result<Amount>;

    fn allowance(&self, owner: &Address, spender: &Address) -> Result<Amount>;

    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<()>;

    /// Move `amount` from `from` to `to` on behalf of `spender`.
    fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()>;

    /// `transfer_from` each `(to, amount)` leg in order, or none of them.
    ///
    /// The allowance must cover the sum of the legs. On error no balance or
    /// allowance has changed.
    fn transfer_from_batch(
        &self,
        spender: &Address,
        from: &Address,
        legs: &[(Address, Amount)],
    ) -> Result<()>;

    /// Set `spender`'s allowance over `owner`'s tokens.
    fn approve(&self, owner: &Address, spender: &Address, amount: Amount) -> Result<()>;
}

impl<T: TokenLedger + ?Sized> TokenLedger for Arc<T> {
    fn address(&self) -> Address {
        (**self).address()
    }

    fn balance_of(&self, account: &Address) -> Result<Amount> {
        (**self).balance_of(account)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Result<Amount> {
        (**self).allowance(owner, spender)
    }

    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        (**self).transfer(from, to, amount)
    }

    fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()> {
        (**self).transfer_from(spender, from, to, amount)
    }

    fn transfer_from_batch(
        &self,
        spender: &Address,
        from: &Address,
        legs: &[(Address, Amount)],
    ) -> Result<()> {
        (**self).transfer_from_batch(spender, from, legs)
    }

    fn approve(&self, owner: &Address, spender: &Address, amount: Amount) -> Result<()> {
        (**self).approve(owner, spender, amount)
    }
}

/// In-memory token ledger.
///
/// Thread-safe via RwLock.
pub struct MemoryToken {
    address: Address,
    inner: RwLock<TokenState>,
}

#[derive(Clone, Default)]
struct TokenState {
    balances: HashMap<Address, Amount>,
    allowances: HashMap<(Address, Address), Amount>,
    total_supply: Amount,
}

impl TokenState {
    fn balance(&self, account: &Address) -> Amount {
        self.balances.get(account).copied().unwrap_or(0)
    }

    /// Debit then credit, checking both sides before mutating either.
    fn move_balance(&mut self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        let available = self.balance(from);
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
        let credited = self
            .balance(to)
            .checked_add(amount)
            .ok_or(PayoutError::Overflow)?;
        self.balances.insert(*from, available - amount);
        self.balances.insert(*to, credited);
        Ok(())
    }
}

impl MemoryToken {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            inner: RwLock::new(TokenState::default()),
        }
    }

    /// Create tokens out of thin air. Test and bootstrap helper.
    pub fn mint(&self, to: &Address, amount: Amount) -> Result<()> {
        let mut inner = self.inner.write().map_err(PayoutError::poisoned)?;
        let supply = inner
            .total_supply
            .checked_add(amount)
            .ok_or(PayoutError::Overflow)?;
        let balance = inner.balance(to).checked_add(amount).ok_or(PayoutError::Overflow)?;
        inner.total_supply = supply;
        inner.balances.insert(*to, balance);
        Ok(())
    }

    pub fn total_supply(&self) -> Result<Amount> {
        let inner = self.inner.read().map_err(PayoutError::poisoned)?;
        Ok(inner.total_supply)
    }
}

impl TokenLedger for MemoryToken {
    fn address(&self) -> Address {
        self.address
    }

    fn balance_of(&self, account: &Address) -> Result<Amount> {
        let inner = self.inner.read().map_err(PayoutError::poisoned)?;
        Ok(inner.balance(account))
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> Result<Amount> {
        let inner = self.inner.read().map_err(PayoutError::poisoned)?;
        Ok(inner.allowances.get(&(*owner, *spender)).copied().unwrap_or(0))
    }

    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        let mut inner = self.inner.write().map_err(PayoutError::poisoned)?;
        inner.move_balance(from, to, amount)
    }

    fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<()> {
        let mut inner = self.inner.write().map_err(PayoutError::poisoned)?;
        let available = inner
            .allowances
            .get(&(*from, *spender))
            .copied()
            .unwrap_or(0);
        if available < amount {
            return Err(PayoutError::InsufficientAllowance {
                owner: *from,
                spender: *spender,
                needed: amount,
                available,
            });
        }
        inner.move_balance(from, to, amount)?;
        inner.allowances.insert((*from, *spender), available - amount);
        tracing::trace!(%spender, %from, %to, amount, "token transfer_from");
        Ok(())
    }

    fn transfer_from_batch(
        &self,
        spender: &Address,
        from: &Address,
        legs: &[(Address, Amount)],
    ) -> Result<()> {
        let mut inner = self.inner.write().map_err(PayoutError::poisoned)?;
        let needed = legs
            .iter()
            .try_fold(0u128, |acc, (_, amount)| acc.checked_add(*amount))
            .ok_or(PayoutError::Overflow)?;
        let available = inner
            .allowances
            .get(&(*from, *spender))
            .copied()
            .unwrap_or(0);
        if available < needed {
            return Err(PayoutError::InsufficientAllowance {
                owner: *from,
                spender: *spender,
                needed,
                available,
            });
        }

        // Apply to a copy and swap it in once every leg has succeeded.
        let mut staged = (*inner).clone();
        for (to, amount) in legs {
            staged.move_balance(from, to, *amount)?;
        }
        staged.allowances.insert((*from, *spender), available - needed);
        *inner = staged;
        tracing::trace!(%spender, %from, legs = legs.len(), needed, "token transfer_from batch");
        Ok(())
    }

    fn approve(&self, owner: &Address, spender: &Address, amount: Amount) -> Result<()> {
        let mut inner = self.inner.write().map_err(PayoutError::poisoned)?;
        inner.allowances.insert((*owner, *spender), amount);
        Ok(())
    }
}
