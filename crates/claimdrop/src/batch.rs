//! Batch distribution: pay many recipients in one call.
//!
//! Both rails validate first and plan the whole batch before moving any
//! value, then settle it through one batched collaborator call. A failure
//! inside that call leaves every balance where it was:
//!
//! - **Token** batches are all-or-nothing. The caller's allowance to the
//!   distributor and balance must cover the total.
//! - **Native** batches consume an attached budget strictly in recipient
//!   order and halt at the first recipient the remainder cannot cover. The
//!   unconsumed budget is refunded. A partial fill is a success. A zero
//!   budget is rejected for any non-empty request.

use std::sync::Arc;

use claimdrop_core::{Address, Amount, Event};
use claimdrop_payout::{NativeBank, TokenLedger, Transfer};

use crate::config::DistributorConfig;
use crate::error::{ConfigError, DistributionError, DistributionResult};
use crate::events::{EventSink, TracingSink};

/// Outcome of a token batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBatchOutcome {
    pub recipients: usize,
    pub total: Amount,
}

/// How a native budget is spent, computed before any transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativePlan {
    /// Length of the paid prefix.
    pub paid: usize,
    pub total_sent: Amount,
    pub refund: Amount,
}

/// Walk `amounts` in order, paying while the remaining budget covers the
/// next amount. Stops at the first one it cannot cover, even if a later,
/// smaller amount would fit.
pub fn plan_native_batch(budget: Amount, amounts: &[Amount]) -> NativePlan {
    let mut remaining = budget;
    let mut paid = 0;
    for &amount in amounts {
        if remaining < amount {
            break;
        }
        remaining -= amount;
        paid += 1;
    }
    NativePlan {
        paid,
        total_sent: budget - remaining,
        refund: remaining,
    }
}

/// Pushes payments to many recipients.
pub struct BatchDistributor {
    config: DistributorConfig,
    events: Arc<dyn EventSink>,
}

impl BatchDistributor {
    pub fn new(config: DistributorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            events: Arc::new(TracingSink),
        })
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.events = sink;
        self
    }

    /// The distributor's own address.
    pub fn address(&self) -> Address {
        self.config.address
    }

    pub fn max_batch_size(&self) -> usize {
        self.config.max_batch_size
    }

    fn check_shape(&self, recipients: &[Address], amounts: &[Amount]) -> DistributionResult<()> {
        if recipients.len() != amounts.len() {
            return Err(DistributionError::ArityMismatch {
                recipients: recipients.len(),
                amounts: amounts.len(),
            });
        }
        if recipients.len() > self.config.max_batch_size {
            return Err(DistributionError::BatchTooLarge {
                len: recipients.len(),
                max: self.config.max_batch_size,
            });
        }
        Ok(())
    }

    /// Pay every recipient from `caller`'s tokens, which the caller approved
    /// the distributor to move. All or nothing.
    pub fn distribute_token<T: TokenLedger + ?Sized>(
        &self,
        token: &T,
        caller: &Address,
        recipients: &[Address],
        amounts: &[Amount],
    ) -> DistributionResult<TokenBatchOutcome> {
        self.check_shape(recipients, amounts)?;

        let total = amounts
            .iter()
            .try_fold(0u128, |acc, &a| acc.checked_add(a))
            .ok_or(DistributionError::AmountOverflow)?;

        let spender = self.config.address;
        let available = token.allowance(caller, &spender)?;
        if available < total {
            tracing::warn!(%caller, total, available, "token batch rejected: allowance");
            return Err(DistributionError::InsufficientAllowance {
                owner: *caller,
                spender,
                needed: total,
                available,
            });
        }
        let balance = token.balance_of(caller)?;
        if balance < total {
            tracing::warn!(%caller, total, balance, "token batch rejected: balance");
            return Err(DistributionError::InsufficientBalance {
                account: *caller,
                needed: total,
                available: balance,
            });
        }

        let legs: Vec<(Address, Amount)> = recipients
            .iter()
            .copied()
            .zip(amounts.iter().copied())
            .collect();
        token.transfer_from_batch(&spender, caller, &legs)?;

        let token_address = token.address();
        tracing::info!(token = %token_address, %caller, recipients = recipients.len(), total, "token batch completed");
        self.events.emit(Event::TokenBatchCompleted {
            token: token_address,
            total,
        });
        Ok(TokenBatchOutcome {
            recipients: recipients.len(),
            total,
        })
    }

    /// Spend `budget`, attached by `caller`, on the recipients in order.
    ///
    /// Returns the executed plan. `plan.paid < recipients.len()` means the
    /// budget ran out; the remainder was refunded.
    pub fn distribute_native<B: NativeBank + ?Sized>(
        &self,
        bank: &B,
        caller: &Address,
        budget: Amount,
        recipients: &[Address],
        amounts: &[Amount],
    ) -> DistributionResult<NativePlan> {
        self.check_shape(recipients, amounts)?;

        if let Some(&first) = amounts.first() {
            if budget == 0 || budget < first {
                tracing::warn!(%caller, budget, first, "native batch rejected: budget");
                return Err(DistributionError::InsufficientBudget { budget, first });
            }
        }

        let plan = plan_native_batch(budget, amounts);
        tracing::debug!(?plan, requested = recipients.len(), "native batch planned");

        let balance = bank.balance_of(caller)?;
        if balance < budget {
            return Err(DistributionError::InsufficientBalance {
                account: *caller,
                needed: budget,
                available: balance,
            });
        }
        for recipient in &recipients[..plan.paid] {
            if !bank.accepts(recipient)? {
                tracing::warn!(%recipient, "native batch rejected: recipient refuses transfers");
                return Err(DistributionError::PayoutTransfer {
                    recipient: *recipient,
                });
            }
        }
        if plan.refund > 0 && !bank.accepts(caller)? {
            return Err(DistributionError::PayoutTransfer { recipient: *caller });
        }

        // Escrow, payouts and refund settle as one batch: either every leg
        // lands or the caller keeps the whole budget.
        let escrow = self.config.address;
        let mut legs = Vec::with_capacity(plan.paid + 2);
        if budget > 0 {
            legs.push(Transfer::new(*caller, escrow, budget));
        }
        for (recipient, &amount) in recipients[..plan.paid].iter().zip(amounts) {
            legs.push(Transfer::new(escrow, *recipient, amount));
        }
        if plan.refund > 0 {
            legs.push(Transfer::new(escrow, *caller, plan.refund));
        }
        bank.transfer_batch(&legs)?;

        tracing::info!(%caller, paid = plan.paid, requested = recipients.len(), total_sent = plan.total_sent, "native batch completed");
        self.events.emit(Event::NativeBatchCompleted {
            total_sent: plan.total_sent,
            last_paid_index: plan.paid,
        });

        if plan.refund > 0 {
            tracing::info!(%caller, refund = plan.refund, "native batch refunded");
            self.events.emit(Event::BatchRefunded {
                to: *caller,
                amount: plan.refund,
            });
        }

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemoryEventLog;
    use claimdrop_payout::{MemoryBank, MemoryToken};
    use proptest::prelude::*;

    const DISTRIBUTOR: Address = Address::from_bytes([0xd0; 20]);
    const CALLER: Address = Address::from_bytes([0xca; 20]);

    fn recipients(n: usize) -> Vec<Address> {
        (0..n)
            .map(|i| {
                let mut bytes = [0x10; 20];
                bytes[18] = (i >> 8) as u8;
                bytes[19] = i as u8;
                Address::from_bytes(bytes)
            })
            .collect()
    }

    fn distributor() -> (BatchDistributor, Arc<MemoryEventLog>) {
        let log = Arc::new(MemoryEventLog::new());
        let distributor = BatchDistributor::new(DistributorConfig::new(DISTRIBUTOR))
            .unwrap()
            .with_event_sink(log.clone());
        (distributor, log)
    }

    #[test]
    fn test_plan_halts_at_first_unaffordable() {
        let plan = plan_native_batch(10, &[4, 7, 1]);
        assert_eq!(
            plan,
            NativePlan {
                paid: 1,
                total_sent: 4,
                refund: 6
            }
        );
    }

    #[test]
    fn test_plan_empty() {
        assert_eq!(
            plan_native_batch(42, &[]),
            NativePlan {
                paid: 0,
                total_sent: 0,
                refund: 42
            }
        );
    }

    #[test]
    fn test_lowered_batch_limit() {
        let distributor = BatchDistributor::new(DistributorConfig {
            address: DISTRIBUTOR,
            max_batch_size: 3,
        })
        .unwrap();
        let token = MemoryToken::new(Address::from_bytes([0xee; 20]));
        assert!(matches!(
            distributor.distribute_token(&token, &CALLER, &recipients(4), &[0; 4]),
            Err(DistributionError::BatchTooLarge { len: 4, max: 3 })
        ));
    }

    #[test]
    fn test_raised_batch_limit_rejected() {
        assert!(BatchDistributor::new(DistributorConfig {
            address: DISTRIBUTOR,
            max_batch_size: 500,
        })
        .is_err());
    }

    #[test]
    fn test_token_batch_total_overflow() {
        let (distributor, _) = distributor();
        let token = MemoryToken::new(Address::from_bytes([0xee; 20]));
        assert!(matches!(
            distributor.distribute_token(&token, &CALLER, &recipients(2), &[u128::MAX, 1]),
            Err(DistributionError::AmountOverflow)
        ));
    }

    #[test]
    fn test_native_refund_refused_fails_before_transfers() {
        let (distributor, log) = distributor();
        let bank = MemoryBank::new();
        bank.deposit(&CALLER, 100).unwrap();
        bank.reject_transfers_to(&CALLER).unwrap();

        let rs = recipients(2);
        assert!(matches!(
            distributor.distribute_native(&bank, &CALLER, 100, &rs, &[10, 20]),
            Err(DistributionError::PayoutTransfer { recipient }) if recipient == CALLER
        ));
        assert_eq!(bank.balance_of(&CALLER).unwrap(), 100);
        assert!(log.is_empty());

        // An exact budget needs no refund, so the refusal does not matter.
        let plan = distributor
            .distribute_native(&bank, &CALLER, 30, &rs, &[10, 20])
            .unwrap();
        assert_eq!(plan.refund, 0);
    }

    #[test]
    fn test_native_caller_must_hold_budget() {
        let (distributor, _) = distributor();
        let bank = MemoryBank::new();
        bank.deposit(&CALLER, 5).unwrap();
        assert!(matches!(
            distributor.distribute_native(&bank, &CALLER, 10, &recipients(1), &[10]),
            Err(DistributionError::InsufficientBalance { needed: 10, available: 5, .. })
        ));
    }

    #[test]
    fn test_native_zero_budget_rejected_even_for_zero_amounts() {
        let (distributor, log) = distributor();
        let bank = MemoryBank::new();
        assert!(matches!(
            distributor.distribute_native(&bank, &CALLER, 0, &recipients(2), &[0, 5]),
            Err(DistributionError::InsufficientBudget { budget: 0, first: 0 })
        ));
        assert!(log.is_empty());

        // An empty request with no budget is a no-op, not an error.
        let plan = distributor
            .distribute_native(&bank, &CALLER, 0, &[], &[])
            .unwrap();
        assert_eq!(plan, plan_native_batch(0, &[]));
    }

    #[test]
    fn test_native_overflow_mid_batch_restores_caller() {
        let (distributor, log) = distributor();
        let bank = MemoryBank::new();
        let rs = recipients(2);
        bank.deposit(&CALLER, 100).unwrap();
        bank.deposit(&rs[1], u128::MAX).unwrap();

        assert!(matches!(
            distributor.distribute_native(&bank, &CALLER, 30, &rs, &[10, 20]),
            Err(DistributionError::AmountOverflow)
        ));
        assert_eq!(bank.balance_of(&CALLER).unwrap(), 100);
        assert_eq!(bank.balance_of(&rs[0]).unwrap(), 0);
        assert_eq!(bank.balance_of(&DISTRIBUTOR).unwrap(), 0);
        assert!(log.is_empty());
    }

    proptest! {
        #[test]
        fn test_plan_invariants(
            budget in 0u128..5_000,
            amounts in prop::collection::vec(0u128..500, 0..40),
        ) {
            let plan = plan_native_batch(budget, &amounts);

            prop_assert!(plan.paid <= amounts.len());
            prop_assert_eq!(plan.total_sent + plan.refund, budget);
            prop_assert_eq!(plan.total_sent, amounts[..plan.paid].iter().sum::<u128>());
            if plan.paid < amounts.len() {
                prop_assert!(plan.refund < amounts[plan.paid]);
            }
        }
    }
}
