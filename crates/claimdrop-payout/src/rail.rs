//! Payout rails: how a claim engine turns a verified claim into a transfer.

use std::fmt;
use std::sync::Arc;

use claimdrop_core::{Address, Amount};

use crate::error::Result;
use crate::native::NativeBank;
use crate::token::TokenLedger;

/// Which asset a rail pays in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RailKind {
    Token,
    Native,
}

impl fmt::Display for RailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RailKind::Token => f.write_str("token"),
            RailKind::Native => f.write_str("native"),
        }
    }
}

/// A source of funds for claims.
pub trait PayoutRail: Send + Sync {
    fn kind(&self) -> RailKind;

    /// Pay `amount` to `recipient`. All-or-nothing.
    fn pay(&self, recipient: &Address, amount: Amount) -> Result<()>;
}

/// Pays from a distributor wallet that pre-approved the engine as spender.
pub struct TokenRail<T: TokenLedger> {
    token: Arc<T>,
    wallet: Address,
    spender: Address,
}

impl<T: TokenLedger> TokenRail<T> {
    /// `spender` is the engine's own address; `wallet` must have approved it.
    pub fn new(token: Arc<T>, wallet: Address, spender: Address) -> Self {
        Self {
            token,
            wallet,
            spender,
        }
    }

    pub fn token(&self) -> &Arc<T> {
        &self.token
    }

    pub fn wallet(&self) -> Address {
        self.wallet
    }

    /// How much the engine may still pay out.
    pub fn remaining_allowance(&self) -> Result<Amount> {
        self.token.allowance(&self.wallet, &self.spender)
    }
}

impl<T: TokenLedger> PayoutRail for TokenRail<T> {
    fn kind(&self) -> RailKind {
        RailKind::Token
    }

    fn pay(&self, recipient: &Address, amount: Amount) -> Result<()> {
        self.token
            .transfer_from(&self.spender, &self.wallet, recipient, amount)
    }
}

/// Pays from the engine's own pre-funded native balance.
pub struct NativeRail<B: NativeBank> {
    bank: Arc<B>,
    treasury: Address,
}

impl<B: NativeBank> NativeRail<B> {
    /// `treasury` is the account holding the engine's funds.
    pub fn new(bank: Arc<B>, treasury: Address) -> Self {
        Self { bank, treasury }
    }

    pub fn bank(&self) -> &Arc<B> {
        &self.bank
    }

    pub fn treasury(&self) -> Address {
        self.treasury
    }
}

impl<B: NativeBank> PayoutRail for NativeRail<B> {
    fn kind(&self) -> RailKind {
        RailKind::Native
    }

    fn pay(&self, recipient: &Address, amount: Amount) -> Result<()> {
        self.bank.transfer(&self.treasury, recipient, amount)
    }
}
