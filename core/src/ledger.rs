//! Append-only transaction ledger and per-customer account balances.
//!
//! RULE: Only the ledger mutates balances.
//! Generators submit TxnRequests; the ledger decides whether they post.

use crate::{
    customer::Customer,
    error::{SimError, SimResult},
    rng::SimRng,
    types::{round_cents, CustomerId, Money, Timestamp},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::{Builder, Uuid};

pub const CURRENCY: &str = "USD";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxnType {
    CashDeposit,
    AchIn,
    AchOut,
    WireIn,
    WireOut,
    Debit,
}

impl TxnType {
    /// Debit-class types draw down the balance and may be rejected.
    pub fn is_debit(&self) -> bool {
        matches!(self, Self::AchOut | Self::WireOut | Self::Debit)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CashDeposit => "CASH_DEPOSIT",
            Self::AchIn => "ACH_IN",
            Self::AchOut => "ACH_OUT",
            Self::WireIn => "WIRE_IN",
            Self::WireOut => "WIRE_OUT",
            Self::Debit => "DEBIT",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Salary,
    Rent,
    Living,
    Structuring,
    #[serde(rename = "Layering_In")]
    LayeringIn,
    #[serde(rename = "Layering_Out")]
    LayeringOut,
    BigPurchase,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Salary => "Salary",
            Self::Rent => "Rent",
            Self::Living => "Living",
            Self::Structuring => "Structuring",
            Self::LayeringIn => "Layering_In",
            Self::LayeringOut => "Layering_Out",
            Self::BigPurchase => "BigPurchase",
        }
    }
}

/// A posted ledger entry. Never mutated after it is appended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub txn_id: Uuid,
    pub customer_id: CustomerId,
    pub timestamp: Timestamp,
    pub amount: Money,
    pub currency: String,
    pub txn_type: TxnType,
    pub counterparty: String,
    pub counterparty_country: String,
    pub category: Category,
}

/// A transfer a generator wants to post, possibly on a later day.
#[derive(Debug, Clone, PartialEq)]
pub struct TxnRequest {
    pub customer_id: CustomerId,
    pub timestamp: Timestamp,
    pub amount: Money,
    pub txn_type: TxnType,
    pub counterparty: String,
    pub country: String,
    pub category: Category,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub opening_balance: Money,
    pub balance: Money,
    pub credited: Money,
    pub debited: Money,
    pub rejected_debits: u64,
}

pub struct Ledger {
    transactions: Vec<Transaction>,
    accounts: BTreeMap<CustomerId, Account>,
    id_rng: SimRng,
    rejected: u64,
}

impl Ledger {
    /// Open one account per customer at `initial_fraction` of yearly income.
    pub fn open(customers: &[Customer], initial_fraction: f64, id_rng: SimRng) -> Self {
        let accounts = customers
            .iter()
            .map(|c| {
                let opening = c.yearly_income * initial_fraction;
                (
                    c.customer_id.clone(),
                    Account {
                        opening_balance: opening,
                        balance: opening,
                        credited: 0.0,
                        debited: 0.0,
                        rejected_debits: 0,
                    },
                )
            })
            .collect();
        Self {
            transactions: Vec::new(),
            accounts,
            id_rng,
            rejected: 0,
        }
    }

    /// Post a transfer. Returns `Ok(false)` without recording anything when a
    /// debit-class transfer exceeds the current balance.
    pub fn record(&mut self, req: TxnRequest) -> SimResult<bool> {
        let amount = round_cents(req.amount);
        if !amount.is_finite() || amount <= 0.0 {
            return Err(SimError::InvalidAmount {
                customer_id: req.customer_id,
                amount: req.amount,
            });
        }
        let account = self
            .accounts
            .get_mut(&req.customer_id)
            .ok_or_else(|| SimError::UnknownCustomer {
                customer_id: req.customer_id.clone(),
            })?;

        if req.txn_type.is_debit() {
            if amount > account.balance {
                account.rejected_debits += 1;
                self.rejected += 1;
                return Ok(false);
            }
            account.balance -= amount;
            account.debited += amount;
        } else {
            account.balance += amount;
            account.credited += amount;
        }

        let txn_id = Builder::from_random_bytes(self.id_rng.next_bytes_16()).into_uuid();
        self.transactions.push(Transaction {
            txn_id,
            customer_id: req.customer_id,
            timestamp: req.timestamp,
            amount,
            currency: CURRENCY.to_string(),
            txn_type: req.txn_type,
            counterparty: req.counterparty,
            counterparty_country: req.country,
            category: req.category,
        });
        Ok(true)
    }

    pub fn balance(&self, customer_id: &str) -> Option<Money> {
        self.accounts.get(customer_id).map(|a| a.balance)
    }

    pub fn account(&self, customer_id: &str) -> Option<&Account> {
        self.accounts.get(customer_id)
    }

    pub fn accounts(&self) -> &BTreeMap<CustomerId, Account> {
        &self.accounts
    }

    /// Entries in generation order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Debit-class requests turned away for insufficient balance.
    pub fn rejected_count(&self) -> u64 {
        self.rejected
    }

    /// Consume the ledger, returning entries sorted by timestamp (stable, so
    /// same-instant entries keep generation order) and the final accounts.
    pub fn finish(self) -> (Vec<Transaction>, BTreeMap<CustomerId, Account>) {
        let mut transactions = self.transactions;
        transactions.sort_by_key(|t| t.timestamp);
        (transactions, self.accounts)
    }
}
