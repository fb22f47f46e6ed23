//! Behavioral features per customer, derived from the finished ledger.

use crate::{
    customer::Customer,
    ledger::Transaction,
    types::{CustomerId, Money},
};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerFeatures {
    pub customer_id: CustomerId,
    pub yearly_income: Money,
    pub behavior: String,
    pub txn_count: usize,
    /// Calendar months with at least one transaction.
    pub active_months: usize,
    /// Mean of per-month summed amounts, over active months only.
    pub avg_monthly_volume: Money,
    /// (avg_monthly_volume × 12 − income) / income; 0 without activity.
    pub volume_deviation_pct: f64,
}

#[derive(Default)]
struct Activity {
    txn_count: usize,
    monthly: BTreeMap<(i32, u32), Money>,
}

/// One feature row per customer, in roster order. Pure read of the ledger.
pub fn aggregate_features(customers: &[Customer], ledger: &[Transaction]) -> Vec<CustomerFeatures> {
    let mut activity: HashMap<&str, Activity> = HashMap::new();
    for txn in ledger {
        let entry = activity.entry(txn.customer_id.as_str()).or_default();
        entry.txn_count += 1;
        let month = (txn.timestamp.year(), txn.timestamp.month());
        *entry.monthly.entry(month).or_insert(0.0) += txn.amount;
    }

    customers
        .iter()
        .map(|c| {
            let (txn_count, active_months, avg_monthly_volume) =
                match activity.get(c.customer_id.as_str()) {
                    Some(a) if !a.monthly.is_empty() => {
                        let total: Money = a.monthly.values().sum();
                        (a.txn_count, a.monthly.len(), total / a.monthly.len() as f64)
                    }
                    _ => (0, 0, 0.0),
                };
            let volume_deviation_pct = if active_months == 0 || c.yearly_income <= 0.0 {
                0.0
            } else {
                (avg_monthly_volume * 12.0 - c.yearly_income) / c.yearly_income
            };
            CustomerFeatures {
                customer_id: c.customer_id.clone(),
                yearly_income: c.yearly_income,
                behavior: c.behavior.label().to_string(),
                txn_count,
                active_months,
                avg_monthly_volume,
                volume_deviation_pct,
            }
        })
        .collect()
}
