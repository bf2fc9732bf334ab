//! In-memory chain for planner tests.
//!
//! [`MemoryLedger`] keeps balances, allowances, operator approvals and order
//! fill status, and implements [`ChainReader`] over them. Signers obtained
//! from [`MemoryLedger::signer`] implement [`TransactionSubmitter`]:
//! approvals update the ledger, and fulfillments run the settlement
//! contract's checks. Fill fractions must map every item to an exact
//! integer, transfers need an allowance or operator approval for the right
//! operator, and fill accounting is updated atomically. A rejected
//! fulfillment leaves the ledger untouched.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use alloy_primitives::{keccak256, Address, B256, U256};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;

use crate::domain::{ConsiderationItem, ExchangeCall, ItemType, OfferItem, Order, OrderStatus};
use crate::error::{ChainError, Result};
use crate::port::outbound::chain::ChainReader;
use crate::port::outbound::submit::{TransactionSubmitter, TxReceipt};

/// A transaction the ledger accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Approve {
        token: Address,
        owner: Address,
        operator: Address,
        amount: U256,
    },
    ApprovalForAll {
        token: Address,
        owner: Address,
        operator: Address,
    },
    Fulfill {
        order_hash: B256,
        fulfiller: Address,
        numerator: U256,
        denominator: U256,
    },
}

/// Where an injected failure fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePoint {
    /// Any approval of this token.
    Approval(Address),
    /// Any fulfillment.
    Exchange,
}

#[derive(Debug, Clone, Default)]
struct LedgerState {
    native: HashMap<Address, U256>,
    erc20: HashMap<(Address, Address), U256>,
    erc1155: HashMap<(Address, U256, Address), U256>,
    erc721: HashMap<(Address, U256), Address>,
    allowances: HashMap<(Address, Address, Address), U256>,
    operators: HashSet<(Address, Address, Address)>,
    statuses: HashMap<B256, OrderStatus>,
    conduits: HashMap<B256, Address>,
    failures: Vec<FailurePoint>,
    submissions: Vec<Submission>,
    timestamp: u64,
    nonce: u64,
}

/// Shared in-memory chain state.
#[derive(Debug)]
pub struct MemoryLedger {
    settlement: Address,
    state: Mutex<LedgerState>,
}

impl MemoryLedger {
    /// Empty ledger whose settlement contract lives at `settlement`.
    pub fn new(settlement: Address) -> Arc<Self> {
        let state = LedgerState {
            timestamp: u64::try_from(Utc::now().timestamp()).unwrap_or_default(),
            ..LedgerState::default()
        };
        Arc::new(Self {
            settlement,
            state: Mutex::new(state),
        })
    }

    pub fn settlement(&self) -> Address {
        self.settlement
    }

    /// A submitter signing as `account`.
    pub fn signer(self: &Arc<Self>, account: Address) -> Arc<LedgerSigner> {
        Arc::new(LedgerSigner {
            ledger: Arc::clone(self),
            account,
        })
    }

    pub fn register_conduit(&self, key: B256, conduit: Address) {
        self.state.lock().conduits.insert(key, conduit);
    }

    pub fn set_timestamp(&self, timestamp: u64) {
        self.state.lock().timestamp = timestamp;
    }

    pub fn mint_native(&self, owner: Address, amount: U256) {
        *self.state.lock().native.entry(owner).or_default() += amount;
    }

    pub fn mint_erc20(&self, token: Address, owner: Address, amount: U256) {
        *self.state.lock().erc20.entry((token, owner)).or_default() += amount;
    }

    pub fn mint_erc1155(&self, token: Address, id: U256, owner: Address, amount: U256) {
        *self
            .state
            .lock()
            .erc1155
            .entry((token, id, owner))
            .or_default() += amount;
    }

    pub fn mint_erc721(&self, token: Address, id: U256, owner: Address) {
        self.state.lock().erc721.insert((token, id), owner);
    }

    pub fn set_allowance(&self, token: Address, owner: Address, operator: Address, amount: U256) {
        self.state
            .lock()
            .allowances
            .insert((token, owner, operator), amount);
    }

    pub fn set_approval_for_all(&self, token: Address, owner: Address, operator: Address) {
        self.state.lock().operators.insert((token, owner, operator));
    }

    pub fn set_status(&self, order_hash: B256, status: OrderStatus) {
        self.state.lock().statuses.insert(order_hash, status);
    }

    pub fn cancel(&self, order_hash: B256) {
        self.state
            .lock()
            .statuses
            .entry(order_hash)
            .or_default()
            .is_cancelled = true;
    }

    /// Make every later submission matching `point` fail.
    pub fn fail_on(&self, point: FailurePoint) {
        self.state.lock().failures.push(point);
    }

    pub fn native_balance(&self, owner: Address) -> U256 {
        self.state
            .lock()
            .native
            .get(&owner)
            .copied()
            .unwrap_or_default()
    }

    pub fn erc20_balance(&self, token: Address, owner: Address) -> U256 {
        self.state
            .lock()
            .erc20
            .get(&(token, owner))
            .copied()
            .unwrap_or_default()
    }

    pub fn erc1155_balance(&self, token: Address, id: U256, owner: Address) -> U256 {
        self.state
            .lock()
            .erc1155
            .get(&(token, id, owner))
            .copied()
            .unwrap_or_default()
    }

    pub fn erc721_owner(&self, token: Address, id: U256) -> Option<Address> {
        self.state.lock().erc721.get(&(token, id)).copied()
    }

    pub fn allowance_of(&self, token: Address, owner: Address, operator: Address) -> U256 {
        self.state
            .lock()
            .allowances
            .get(&(token, owner, operator))
            .copied()
            .unwrap_or_default()
    }

    pub fn status_of(&self, order_hash: B256) -> OrderStatus {
        self.state
            .lock()
            .statuses
            .get(&order_hash)
            .copied()
            .unwrap_or_default()
    }

    /// Accepted transactions, oldest first.
    pub fn submissions(&self) -> Vec<Submission> {
        self.state.lock().submissions.clone()
    }

    fn approve(
        &self,
        owner: Address,
        token: Address,
        operator: Address,
        amount: U256,
    ) -> Result<TxReceipt> {
        let mut state = self.state.lock();
        if state.failures.contains(&FailurePoint::Approval(token)) {
            return Err(revert("approval rejected"));
        }
        state.allowances.insert((token, owner, operator), amount);
        Ok(state.confirm(Submission::Approve {
            token,
            owner,
            operator,
            amount,
        }))
    }

    fn approve_all(&self, owner: Address, token: Address, operator: Address) -> Result<TxReceipt> {
        let mut state = self.state.lock();
        if state.failures.contains(&FailurePoint::Approval(token)) {
            return Err(revert("approval rejected"));
        }
        state.operators.insert((token, owner, operator));
        Ok(state.confirm(Submission::ApprovalForAll {
            token,
            owner,
            operator,
        }))
    }

    fn fulfill(&self, signer: Address, call: &ExchangeCall) -> Result<TxReceipt> {
        let mut state = self.state.lock();
        if state.failures.contains(&FailurePoint::Exchange) {
            return Err(revert("exchange rejected"));
        }
        if call.fulfiller != signer {
            return Err(revert("fulfiller is not the signer"));
        }
        if call.settlement != self.settlement {
            return Err(revert("wrong settlement contract"));
        }

        let mut next = state.clone();
        next.settle(self.settlement, call)?;
        let receipt = next.confirm(Submission::Fulfill {
            order_hash: call.order.hash,
            fulfiller: call.fulfiller,
            numerator: call.fraction.numerator(),
            denominator: call.fraction.denominator(),
        });
        *state = next;
        Ok(receipt)
    }
}

impl LedgerState {
    fn confirm(&mut self, submission: Submission) -> TxReceipt {
        self.nonce += 1;
        self.submissions.push(submission);
        TxReceipt {
            tx_hash: keccak256(self.nonce.to_be_bytes()),
        }
    }

    fn operator_for(&self, settlement: Address, conduit_key: B256) -> Result<Address> {
        if conduit_key.is_zero() {
            return Ok(settlement);
        }
        self.conduits
            .get(&conduit_key)
            .copied()
            .ok_or_else(|| revert("unknown conduit"))
    }

    /// Validate and apply a fulfillment against this state.
    fn settle(&mut self, settlement: Address, call: &ExchangeCall) -> Result<()> {
        let order = &call.order;
        let status = self.statuses.get(&order.hash).copied().unwrap_or_default();
        if status.is_cancelled {
            return Err(revert("order cancelled"));
        }
        if status.is_fully_filled() {
            return Err(revert("order already filled"));
        }
        if !order.is_active_at(self.timestamp) {
            return Err(revert("order not active"));
        }

        let mut numerator = call.fraction.numerator();
        let mut denominator = call.fraction.denominator();
        if numerator < denominator && !order.order_type.allows_partial_fill() {
            return Err(revert("partial fills not enabled for order"));
        }

        let mut filled = status.total_filled;
        if !status.total_size.is_zero() {
            if denominator == U256::from(1) {
                numerator = status.total_size;
                denominator = status.total_size;
            } else if status.total_size != denominator {
                filled = checked(filled.checked_mul(denominator))?;
                numerator = checked(numerator.checked_mul(status.total_size))?;
                denominator = checked(denominator.checked_mul(status.total_size))?;
            }
            if checked(filled.checked_add(numerator))? > denominator {
                numerator = denominator - filled;
            }
        }
        let filled = checked(filled.checked_add(numerator))?;

        let offerer_operator = self.operator_for(settlement, order.conduit_key)?;
        let fulfiller_operator = self.operator_for(settlement, call.fulfiller_conduit_key)?;
        let window = Window::of(order, self.timestamp);

        for item in &order.offer {
            let amount = window.apply(item_amounts(item), numerator, denominator, false)?;
            self.transfer(
                item.item_type,
                item.token,
                item.identifier_or_criteria,
                amount,
                order.offerer,
                call.recipient,
                offerer_operator,
            )?;
        }

        let fulfiller_native = self.native.get(&call.fulfiller).copied().unwrap_or_default();
        if fulfiller_native < call.value {
            return Err(revert("insufficient native balance"));
        }
        let mut value_left = call.value;
        for item in call.order_consideration()? {
            let amount = window.apply(
                (item.start_amount, item.end_amount),
                numerator,
                denominator,
                true,
            )?;
            if item.item_type.is_native() {
                value_left = value_left
                    .checked_sub(amount)
                    .ok_or_else(|| revert("insufficient native value"))?;
                self.move_native(call.fulfiller, item.recipient, amount)?;
                continue;
            }
            self.transfer_consideration(&item, amount, call.fulfiller, fulfiller_operator)?;
        }

        let gcd = gcd(filled, denominator);
        self.statuses.insert(
            order.hash,
            OrderStatus {
                is_validated: true,
                is_cancelled: false,
                total_filled: filled / gcd,
                total_size: denominator / gcd,
            },
        );
        Ok(())
    }

    fn transfer_consideration(
        &mut self,
        item: &ConsiderationItem,
        amount: U256,
        from: Address,
        operator: Address,
    ) -> Result<()> {
        self.transfer(
            item.item_type,
            item.token,
            item.identifier_or_criteria,
            amount,
            from,
            item.recipient,
            operator,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn transfer(
        &mut self,
        item_type: ItemType,
        token: Address,
        id: U256,
        amount: U256,
        from: Address,
        to: Address,
        operator: Address,
    ) -> Result<()> {
        match item_type {
            ItemType::Native => self.move_native(from, to, amount),
            ItemType::Erc20 => {
                let key = (token, from, operator);
                let allowance = self.allowances.get(&key).copied().unwrap_or_default();
                if allowance < amount {
                    return Err(revert("insufficient allowance"));
                }
                if allowance != U256::MAX {
                    self.allowances.insert(key, allowance - amount);
                }
                let balance = self.erc20.entry((token, from)).or_default();
                *balance = balance
                    .checked_sub(amount)
                    .ok_or_else(|| revert("insufficient token balance"))?;
                *self.erc20.entry((token, to)).or_default() += amount;
                Ok(())
            }
            ItemType::Erc1155 => {
                self.require_operator(token, from, operator)?;
                let balance = self.erc1155.entry((token, id, from)).or_default();
                *balance = balance
                    .checked_sub(amount)
                    .ok_or_else(|| revert("insufficient token balance"))?;
                *self.erc1155.entry((token, id, to)).or_default() += amount;
                Ok(())
            }
            ItemType::Erc721 => {
                self.require_operator(token, from, operator)?;
                if amount != U256::from(1) {
                    return Err(revert("invalid ERC721 transfer amount"));
                }
                if self.erc721.get(&(token, id)) != Some(&from) {
                    return Err(revert("token not owned by sender"));
                }
                self.erc721.insert((token, id), to);
                Ok(())
            }
            ItemType::Erc721WithCriteria | ItemType::Erc1155WithCriteria => {
                Err(revert("criteria items need resolvers"))
            }
        }
    }

    fn require_operator(&self, token: Address, owner: Address, operator: Address) -> Result<()> {
        if self.operators.contains(&(token, owner, operator)) {
            Ok(())
        } else {
            Err(revert("operator not approved"))
        }
    }

    fn move_native(&mut self, from: Address, to: Address, amount: U256) -> Result<()> {
        let balance = self.native.entry(from).or_default();
        *balance = balance
            .checked_sub(amount)
            .ok_or_else(|| revert("insufficient native balance"))?;
        *self.native.entry(to).or_default() += amount;
        Ok(())
    }
}

/// Order timing at the ledger's current block.
struct Window {
    elapsed: U256,
    remaining: U256,
    duration: U256,
}

impl Window {
    fn of(order: &Order, now: u64) -> Self {
        let duration = order.end_time.saturating_sub(order.start_time);
        let elapsed = now.saturating_sub(order.start_time).min(duration);
        Self {
            elapsed: U256::from(elapsed),
            remaining: U256::from(duration - elapsed),
            duration: U256::from(duration),
        }
    }

    /// Scale both ends by the fraction, requiring exact results, then
    /// interpolate at the current time.
    fn apply(
        &self,
        (start, end): (U256, U256),
        numerator: U256,
        denominator: U256,
        round_up: bool,
    ) -> Result<U256> {
        let start = exact_fraction(start, numerator, denominator)?;
        let end = exact_fraction(end, numerator, denominator)?;
        if start == end || self.duration.is_zero() {
            return Ok(end);
        }
        let total = checked(start.checked_mul(self.remaining))?;
        let total = checked(total.checked_add(checked(end.checked_mul(self.elapsed))?))?;
        if round_up && !total.is_zero() {
            Ok((total - U256::from(1)) / self.duration + U256::from(1))
        } else {
            Ok(total / self.duration)
        }
    }
}

fn item_amounts(item: &OfferItem) -> (U256, U256) {
    (item.start_amount, item.end_amount)
}

fn exact_fraction(value: U256, numerator: U256, denominator: U256) -> Result<U256> {
    if numerator == denominator {
        return Ok(value);
    }
    let product = checked(value.checked_mul(numerator))?;
    if !(product % denominator).is_zero() {
        return Err(revert("inexact fraction"));
    }
    Ok(product / denominator)
}

fn gcd(mut a: U256, mut b: U256) -> U256 {
    while !b.is_zero() {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

fn checked(value: Option<U256>) -> Result<U256> {
    value.ok_or_else(|| revert("arithmetic overflow"))
}

fn revert(reason: &str) -> crate::error::Error {
    ChainError::Transaction(format!("execution reverted: {reason}")).into()
}

#[async_trait]
impl ChainReader for MemoryLedger {
    async fn order_status(&self, order_hash: B256) -> Result<OrderStatus> {
        Ok(self.status_of(order_hash))
    }

    async fn allowance(&self, token: Address, owner: Address, operator: Address) -> Result<U256> {
        Ok(self.allowance_of(token, owner, operator))
    }

    async fn is_approved_for_all(
        &self,
        token: Address,
        owner: Address,
        operator: Address,
    ) -> Result<bool> {
        Ok(self
            .state
            .lock()
            .operators
            .contains(&(token, owner, operator)))
    }
}

/// A ledger account that signs transactions.
#[derive(Debug, Clone)]
pub struct LedgerSigner {
    ledger: Arc<MemoryLedger>,
    account: Address,
}

#[async_trait]
impl TransactionSubmitter for LedgerSigner {
    fn account(&self) -> Address {
        self.account
    }

    async fn approve(&self, token: Address, operator: Address, amount: U256) -> Result<TxReceipt> {
        self.ledger.approve(self.account, token, operator, amount)
    }

    async fn set_approval_for_all(&self, token: Address, operator: Address) -> Result<TxReceipt> {
        self.ledger.approve_all(self.account, token, operator)
    }

    async fn fulfill(&self, call: &ExchangeCall) -> Result<TxReceipt> {
        self.ledger.fulfill(self.account, call)
    }
}
