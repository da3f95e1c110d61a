//! Integration tests for batch distribution.

use std::sync::Arc;

use claimdrop::payout::{
    MemoryBank, MemoryToken, NativeBank, Result as PayoutResult, TokenLedger,
};
use claimdrop::{
    Address, Amount, BatchDistributor, DistributionError, DistributorConfig, Event,
    MemoryEventLog, NativePlan, MAX_BATCH_SIZE,
};
use claimdrop_testkit::fixtures::{account, TestFixture};
use claimdrop_testkit::generators::{batch, BatchParams};
use proptest::prelude::*;

const DISTRIBUTOR: Address = Address::from_bytes([0xd0; 20]);
const CALLER: Address = Address::from_bytes([0xca; 20]);

fn recipient(i: usize) -> Address {
    let mut bytes = [0x5a; 20];
    bytes[18..].copy_from_slice(&(i as u16).to_be_bytes());
    Address::from_bytes(bytes)
}

fn recipients(n: usize) -> Vec<Address> {
    (0..n).map(recipient).collect()
}

fn distributor() -> (BatchDistributor, Arc<MemoryEventLog>) {
    let events = Arc::new(MemoryEventLog::new());
    let distributor = BatchDistributor::new(DistributorConfig::new(DISTRIBUTOR))
        .unwrap()
        .with_event_sink(events.clone());
    (distributor, events)
}

fn funded_token(balance: Amount, allowance: Amount) -> MemoryToken {
    let token = MemoryToken::new(Address::from_bytes([0x70; 20]));
    token.mint(&CALLER, balance).unwrap();
    token.approve(&CALLER, &DISTRIBUTOR, allowance).unwrap();
    token
}

fn funded_bank(balance: Amount) -> MemoryBank {
    let bank = MemoryBank::new();
    bank.deposit(&CALLER, balance).unwrap();
    bank
}

// =============================================================================
// SHAPE
// =============================================================================

#[test]
fn test_arity_mismatch_rejected_on_both_rails() {
    let (distributor, events) = distributor();
    let to = recipients(9);
    let amounts = vec![1; 10];

    let token = funded_token(100, 100);
    assert!(matches!(
        distributor.distribute_token(&token, &CALLER, &to, &amounts),
        Err(DistributionError::ArityMismatch { recipients: 9, amounts: 10 })
    ));

    let bank = funded_bank(100);
    assert!(matches!(
        distributor.distribute_native(&bank, &CALLER, 100, &to, &amounts),
        Err(DistributionError::ArityMismatch { recipients: 9, amounts: 10 })
    ));

    assert_eq!(token.balance_of(&CALLER).unwrap(), 100);
    assert_eq!(bank.balance_of(&CALLER).unwrap(), 100);
    assert!(events.is_empty());
}

#[test]
fn test_batch_size_limit() {
    let (distributor, _) = distributor();
    assert_eq!(distributor.max_batch_size(), MAX_BATCH_SIZE);

    let token = funded_token(1_000, 1_000);
    let outcome = distributor
        .distribute_token(&token, &CALLER, &recipients(200), &vec![1; 200])
        .unwrap();
    assert_eq!((outcome.recipients, outcome.total), (200, 200));

    assert!(matches!(
        distributor.distribute_token(&token, &CALLER, &recipients(210), &vec![1; 210]),
        Err(DistributionError::BatchTooLarge { len: 210, max: 200 })
    ));
    assert_eq!(token.balance_of(&CALLER).unwrap(), 800);

    let bank = funded_bank(1_000);
    assert!(matches!(
        distributor.distribute_native(&bank, &CALLER, 210, &recipients(210), &vec![1; 210]),
        Err(DistributionError::BatchTooLarge { .. })
    ));
}

#[test]
fn test_lowered_batch_limit_is_enforced() {
    let config = DistributorConfig {
        max_batch_size: 3,
        ..DistributorConfig::new(DISTRIBUTOR)
    };
    let distributor = BatchDistributor::new(config).unwrap();
    let token = funded_token(100, 100);
    assert!(matches!(
        distributor.distribute_token(&token, &CALLER, &recipients(4), &[1; 4]),
        Err(DistributionError::BatchTooLarge { len: 4, max: 3 })
    ));
}

// =============================================================================
// TOKEN RAIL
// =============================================================================

#[test]
fn test_token_batch_pays_everyone() {
    let (distributor, events) = distributor();
    let token = funded_token(1_000, 1_000);
    let to = recipients(3);

    distributor
        .distribute_token(&token, &CALLER, &to, &[10, 20, 30])
        .unwrap();

    assert_eq!(token.balance_of(&to[0]).unwrap(), 10);
    assert_eq!(token.balance_of(&to[1]).unwrap(), 20);
    assert_eq!(token.balance_of(&to[2]).unwrap(), 30);
    assert_eq!(token.balance_of(&CALLER).unwrap(), 940);
    assert_eq!(token.allowance(&CALLER, &DISTRIBUTOR).unwrap(), 940);
    assert_eq!(
        events.events(),
        vec![Event::TokenBatchCompleted {
            token: token.address(),
            total: 60,
        }]
    );
}

#[test]
fn test_token_batch_is_all_or_nothing() {
    let (distributor, events) = distributor();
    let to = recipients(10);
    let amounts = vec![10; 10];

    // Allowance covers the first nine transfers only.
    let token = funded_token(1_000, 90);
    assert!(matches!(
        distributor.distribute_token(&token, &CALLER, &to, &amounts),
        Err(DistributionError::InsufficientAllowance { needed: 100, available: 90, .. })
    ));
    for r in &to {
        assert_eq!(token.balance_of(r).unwrap(), 0);
    }
    assert_eq!(token.balance_of(&CALLER).unwrap(), 1_000);
    assert_eq!(token.allowance(&CALLER, &DISTRIBUTOR).unwrap(), 90);

    // Same with a short balance.
    let token = funded_token(90, 1_000);
    assert!(matches!(
        distributor.distribute_token(&token, &CALLER, &to, &amounts),
        Err(DistributionError::InsufficientBalance { needed: 100, available: 90, .. })
    ));
    assert_eq!(token.balance_of(&CALLER).unwrap(), 90);
    assert!(events.is_empty());
}

/// Reports a stale balance for the caller, so the distributor's preflight
/// passes and the shortfall only surfaces partway through the batch.
struct StaleBalanceToken {
    inner: MemoryToken,
    reported: Amount,
}

impl TokenLedger for StaleBalanceToken {
    fn address(&self) -> Address {
        self.inner.address()
    }

    fn balance_of(&self, account: &Address) -> PayoutResult<Amount> {
        if *account == CALLER {
            return Ok(self.reported);
        }
        self.inner.balance_of(account)
    }

    fn allowance(&self, owner: &Address, spender: &Address) -> PayoutResult<Amount> {
        self.inner.allowance(owner, spender)
    }

    fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> PayoutResult<()> {
        self.inner.transfer(from, to, amount)
    }

    fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> PayoutResult<()> {
        self.inner.transfer_from(spender, from, to, amount)
    }

    fn transfer_from_batch(
        &self,
        spender: &Address,
        from: &Address,
        legs: &[(Address, Amount)],
    ) -> PayoutResult<()> {
        self.inner.transfer_from_batch(spender, from, legs)
    }

    fn approve(&self, owner: &Address, spender: &Address, amount: Amount) -> PayoutResult<()> {
        self.inner.approve(owner, spender, amount)
    }
}

#[test]
fn test_token_batch_failing_late_leg_moves_nothing() {
    let (distributor, events) = distributor();
    let token = StaleBalanceToken {
        inner: funded_token(15, 1_000),
        reported: 1_000,
    };
    let to = recipients(3);

    assert!(matches!(
        distributor.distribute_token(&token, &CALLER, &to, &[10, 20, 30]),
        Err(DistributionError::InsufficientBalance { needed: 20, available: 5, .. })
    ));
    for r in &to {
        assert_eq!(token.balance_of(r).unwrap(), 0);
    }
    assert_eq!(token.inner.balance_of(&CALLER).unwrap(), 15);
    assert_eq!(token.allowance(&CALLER, &DISTRIBUTOR).unwrap(), 1_000);
    assert!(events.is_empty());
}

#[test]
fn test_token_batch_overflow_rejected() {
    let (distributor, _) = distributor();
    let token = funded_token(1_000, 1_000);
    assert!(matches!(
        distributor.distribute_token(&token, &CALLER, &recipients(2), &[u128::MAX, 1]),
        Err(DistributionError::AmountOverflow)
    ));
}

// =============================================================================
// NATIVE RAIL
// =============================================================================

#[test]
fn test_native_partial_fill_refunds_remainder() {
    let (distributor, events) = distributor();
    let bank = funded_bank(10_000);
    let to = recipients(10);
    let amounts: Vec<Amount> = (123..=132).collect();
    let sum: Amount = amounts.iter().sum();
    let budget = sum - 132 + 66;

    let plan = distributor
        .distribute_native(&bank, &CALLER, budget, &to, &amounts)
        .unwrap();

    assert_eq!(
        plan,
        NativePlan {
            paid: 9,
            total_sent: sum - 132,
            refund: 66,
        }
    );
    for (r, &amount) in to.iter().zip(&amounts).take(9) {
        assert_eq!(bank.balance_of(r).unwrap(), amount);
    }
    assert_eq!(bank.balance_of(&to[9]).unwrap(), 0);
    assert_eq!(bank.balance_of(&CALLER).unwrap(), 10_000 - (sum - 132));
    assert_eq!(bank.balance_of(&DISTRIBUTOR).unwrap(), 0);
    assert_eq!(
        events.events(),
        vec![
            Event::NativeBatchCompleted {
                total_sent: sum - 132,
                last_paid_index: 9,
            },
            Event::BatchRefunded {
                to: CALLER,
                amount: 66,
            },
        ]
    );
}

#[test]
fn test_native_halts_at_first_uncovered_amount() {
    // The third amount would fit the remainder but the second does not.
    let (distributor, _) = distributor();
    let bank = funded_bank(1_000);
    let to = recipients(3);

    let plan = distributor
        .distribute_native(&bank, &CALLER, 60, &to, &[50, 20, 5])
        .unwrap();
    assert_eq!(plan.paid, 1);
    assert_eq!(plan.refund, 10);
    assert_eq!(bank.balance_of(&to[2]).unwrap(), 0);
}

#[test]
fn test_native_exact_budget_emits_no_refund() {
    let (distributor, events) = distributor();
    let bank = funded_bank(1_000);

    let plan = distributor
        .distribute_native(&bank, &CALLER, 60, &recipients(3), &[10, 20, 30])
        .unwrap();
    assert_eq!(plan.refund, 0);
    assert_eq!(events.len(), 1);
    assert_eq!(bank.balance_of(&CALLER).unwrap(), 940);
}

#[test]
fn test_native_zero_budget_rejected() {
    let (distributor, events) = distributor();
    let bank = funded_bank(1_000);
    assert!(matches!(
        distributor.distribute_native(&bank, &CALLER, 0, &recipients(2), &[5, 5]),
        Err(DistributionError::InsufficientBudget { budget: 0, first: 5 })
    ));
    assert_eq!(bank.balance_of(&CALLER).unwrap(), 1_000);
    assert!(events.is_empty());
}

#[test]
fn test_native_zero_budget_with_zero_first_amount_rejected() {
    let (distributor, events) = distributor();
    let bank = funded_bank(1_000);
    let to = recipients(3);
    assert!(matches!(
        distributor.distribute_native(&bank, &CALLER, 0, &to, &[0, 0, 7]),
        Err(DistributionError::InsufficientBudget { budget: 0, first: 0 })
    ));
    assert_eq!(bank.balance_of(&CALLER).unwrap(), 1_000);
    assert!(events.is_empty());
}

#[test]
fn test_native_recipient_overflow_keeps_budget_with_caller() {
    let (distributor, events) = distributor();
    let bank = funded_bank(100);
    let to = recipients(2);
    bank.deposit(&to[1], u128::MAX).unwrap();

    assert!(matches!(
        distributor.distribute_native(&bank, &CALLER, 30, &to, &[10, 20]),
        Err(DistributionError::AmountOverflow)
    ));
    assert_eq!(bank.balance_of(&CALLER).unwrap(), 100);
    assert_eq!(bank.balance_of(&to[0]).unwrap(), 0);
    assert_eq!(bank.balance_of(&to[1]).unwrap(), u128::MAX);
    assert_eq!(bank.balance_of(&DISTRIBUTOR).unwrap(), 0);
    assert!(events.is_empty());
}

#[test]
fn test_native_empty_batch_refunds_budget() {
    let (distributor, events) = distributor();
    let bank = funded_bank(1_000);

    let plan = distributor
        .distribute_native(&bank, &CALLER, 40, &[], &[])
        .unwrap();
    assert_eq!(plan, NativePlan { paid: 0, total_sent: 0, refund: 40 });
    assert_eq!(bank.balance_of(&CALLER).unwrap(), 1_000);
    assert_eq!(
        events.drain(),
        vec![
            Event::NativeBatchCompleted { total_sent: 0, last_paid_index: 0 },
            Event::BatchRefunded { to: CALLER, amount: 40 },
        ]
    );
}

#[test]
fn test_native_rejecting_recipient_moves_nothing() {
    let (distributor, events) = distributor();
    let bank = funded_bank(1_000);
    let to = recipients(3);
    bank.reject_transfers_to(&to[1]).unwrap();

    assert!(matches!(
        distributor.distribute_native(&bank, &CALLER, 60, &to, &[10, 20, 30]),
        Err(DistributionError::PayoutTransfer { recipient }) if recipient == to[1]
    ));
    assert_eq!(bank.balance_of(&CALLER).unwrap(), 1_000);
    assert_eq!(bank.balance_of(&to[0]).unwrap(), 0);
    assert!(events.is_empty());
}

#[test]
fn test_native_budget_beyond_balance_rejected() {
    let (distributor, _) = distributor();
    let bank = funded_bank(50);
    assert!(matches!(
        distributor.distribute_native(&bank, &CALLER, 60, &recipients(1), &[10]),
        Err(DistributionError::InsufficientBalance { needed: 60, available: 50, .. })
    ));
}

proptest! {
    #[test]
    fn test_native_batch_conserves_value(
        amounts in prop::collection::vec(0u128..1_000, 0..=40),
        extra in 1u128..5_000,
    ) {
        let first = amounts.first().copied().unwrap_or(0);
        let budget = first + extra;
        let (distributor, _) = distributor();
        let bank = funded_bank(1_000_000);
        let to = recipients(amounts.len());

        let plan = distributor
            .distribute_native(&bank, &CALLER, budget, &to, &amounts)
            .unwrap();

        let received: Amount = to.iter().map(|r| bank.balance_of(r).unwrap()).sum();
        prop_assert_eq!(received, plan.total_sent);
        prop_assert_eq!(plan.total_sent + plan.refund, budget);
        prop_assert_eq!(bank.balance_of(&CALLER).unwrap(), 1_000_000 - plan.total_sent);
        prop_assert_eq!(bank.balance_of(&DISTRIBUTOR).unwrap(), 0);
        if plan.paid < amounts.len() {
            prop_assert!(plan.refund < amounts[plan.paid]);
        }
    }
}

proptest! {
    #[test]
    fn test_token_batch_moves_exactly_the_total(params in batch(60)) {
        let fixture = TestFixture::with_secret([0x11; 32]);
        let caller = account(0xca11);
        prop_assume!(!params.recipients.contains(&caller));
        let total = params.total();
        fixture.fund_batch_caller(&caller, total + 7, total);

        let outcome = fixture
            .distributor()
            .distribute_token(&*fixture.token, &caller, &params.recipients, &params.amounts)
            .unwrap();

        prop_assert_eq!(outcome.total, total);
        let received: Amount = unique(&params)
            .iter()
            .map(|r| fixture.token.balance_of(r).unwrap())
            .sum();
        prop_assert_eq!(received, total);
        prop_assert_eq!(fixture.token.balance_of(&caller).unwrap(), 7);
        prop_assert_eq!(fixture.token.allowance(&caller, &fixture.distributor_address).unwrap(), 0);
        prop_assert_eq!(fixture.events.len(), 1);
    }
}

fn unique(params: &BatchParams) -> Vec<Address> {
    let mut seen = params.recipients.clone();
    seen.sort();
    seen.dedup();
    seen
}
