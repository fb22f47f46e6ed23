//! Transaction monitoring: the post-hoc rule engine.
//!
//! Runs once over the finished, time-sorted ledger:
//! - Structuring (cash deposits just under the $10k reporting threshold,
//!   several inside a trailing week)
//! - Rapid movement / layering (large wire in, most of it wired out
//!   within a few days)
//! - High-risk geography (repeated contact with high-risk jurisdictions)
//!
//! Customers are scanned in parallel; output order is rule order, then
//! customer id, so a rerun yields the same alert list.

use crate::{
    config::RuleConfig,
    ledger::{Transaction, TxnType},
    types::{CustomerId, Money, SimDate},
};
use chrono::Duration;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AlertType {
    #[serde(rename = "Potential Structuring")]
    Structuring,
    #[serde(rename = "Layering / Rapid Movement")]
    RapidMovement,
    #[serde(rename = "High Risk Geography")]
    HighRiskGeography,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Structuring => "Potential Structuring",
            Self::RapidMovement => "Layering / Rapid Movement",
            Self::HighRiskGeography => "High Risk Geography",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Medium,
    High,
    Critical,
}

/// A rule hit. Never mutated after the rule engine returns it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub alert_id: String,
    pub customer_id: CustomerId,
    pub alert_date: SimDate,
    pub alert_type: AlertType,
    pub severity: Severity,
    pub description: String,
    /// Ledger entries that make up the evidence for the hit.
    pub transaction_ids: Vec<Uuid>,
}

/// A hit before it has been given an id.
struct Hit {
    customer_id: CustomerId,
    alert_date: SimDate,
    alert_type: AlertType,
    severity: Severity,
    description: String,
    transaction_ids: Vec<Uuid>,
}

pub struct RuleEngine<'a> {
    rules: &'a RuleConfig,
    high_risk_countries: HashSet<&'a str>,
}

impl<'a> RuleEngine<'a> {
    pub fn new(rules: &'a RuleConfig, high_risk_countries: &'a [String]) -> Self {
        Self {
            rules,
            high_risk_countries: high_risk_countries.iter().map(String::as_str).collect(),
        }
    }

    /// Evaluate every rule for every customer on the ledger.
    pub fn evaluate(&self, ledger: &[Transaction]) -> Vec<Alert> {
        let mut by_customer: BTreeMap<&str, Vec<&Transaction>> = BTreeMap::new();
        for txn in ledger {
            by_customer.entry(txn.customer_id.as_str()).or_default().push(txn);
        }
        let mut groups: Vec<(&str, Vec<&Transaction>)> = by_customer.into_iter().collect();
        for (_, txns) in &mut groups {
            txns.sort_by_key(|t| t.timestamp);
        }

        let structuring: Vec<Hit> = groups
            .par_iter()
            .filter_map(|(cid, txns)| self.detect_structuring(cid, txns))
            .collect();
        let rapid_movement: Vec<Vec<Hit>> = groups
            .par_iter()
            .map(|(cid, txns)| self.detect_rapid_movement(cid, txns))
            .collect();
        let geography: Vec<Hit> = groups
            .par_iter()
            .filter_map(|(cid, txns)| self.detect_geography(cid, txns))
            .collect();

        let hits: Vec<Hit> = structuring
            .into_iter()
            .chain(rapid_movement.into_iter().flatten())
            .chain(geography)
            .collect();

        log::info!(
            "Rule engine: {} alerts over {} customers with activity",
            hits.len(),
            groups.len()
        );

        hits.into_iter()
            .enumerate()
            .map(|(i, hit)| Alert {
                alert_id: format!("ALT-{:06}", i + 1),
                customer_id: hit.customer_id,
                alert_date: hit.alert_date,
                alert_type: hit.alert_type,
                severity: hit.severity,
                description: hit.description,
                transaction_ids: hit.transaction_ids,
            })
            .collect()
    }

    /// First trailing window holding enough near-threshold cash deposits.
    /// The window for deposit i spans [t_i - window, t_i], both ends included.
    fn detect_structuring(&self, customer_id: &str, txns: &[&Transaction]) -> Option<Hit> {
        let deposits: Vec<&Transaction> = txns
            .iter()
            .copied()
            .filter(|t| {
                t.txn_type == TxnType::CashDeposit
                    && t.amount >= self.rules.structuring_min_amount
                    && t.amount < self.rules.reporting_threshold
            })
            .collect();

        let window = Duration::days(self.rules.structuring_window_days);
        let mut left = 0;
        for right in 0..deposits.len() {
            while deposits[right].timestamp - deposits[left].timestamp > window {
                left += 1;
            }
            let count = right - left + 1;
            if count >= self.rules.structuring_min_count {
                let in_window = &deposits[left..=right];
                let total: Money = in_window.iter().map(|t| t.amount).sum();
                return Some(Hit {
                    customer_id: customer_id.to_string(),
                    alert_date: deposits[right].timestamp.date(),
                    alert_type: AlertType::Structuring,
                    severity: Severity::High,
                    description: format!(
                        "Detected {count} cash deposits just under reporting threshold in {} days (total ${total:.2}).",
                        self.rules.structuring_window_days
                    ),
                    transaction_ids: in_window.iter().map(|t| t.txn_id).collect(),
                });
            }
        }
        None
    }

    /// Every large wire-in whose following wire-outs drain most of it.
    fn detect_rapid_movement(&self, customer_id: &str, txns: &[&Transaction]) -> Vec<Hit> {
        let wires: Vec<&Transaction> = txns
            .iter()
            .copied()
            .filter(|t| matches!(t.txn_type, TxnType::WireIn | TxnType::WireOut))
            .collect();
        let window = Duration::days(self.rules.layering_window_days);

        let mut hits = Vec::new();
        for inflow in wires.iter().filter(|t| {
            t.txn_type == TxnType::WireIn && t.amount > self.rules.layering_min_inflow
        }) {
            let window_end = inflow.timestamp + window;
            let start = wires.partition_point(|t| t.timestamp <= inflow.timestamp);
            let outflows: Vec<&Transaction> = wires[start..]
                .iter()
                .copied()
                .take_while(|t| t.timestamp <= window_end)
                .filter(|t| t.txn_type == TxnType::WireOut)
                .collect();
            let out_total: Money = outflows.iter().map(|t| t.amount).sum();

            if out_total > inflow.amount * self.rules.layering_outflow_ratio {
                let mut transaction_ids = vec![inflow.txn_id];
                transaction_ids.extend(outflows.iter().map(|t| t.txn_id));
                hits.push(Hit {
                    customer_id: customer_id.to_string(),
                    alert_date: inflow.timestamp.date(),
                    alert_type: AlertType::RapidMovement,
                    severity: Severity::Critical,
                    description: format!(
                        "Large inflow ${:.2} followed by outflow of ${out_total:.2} within {} days.",
                        inflow.amount, self.rules.layering_window_days
                    ),
                    transaction_ids,
                });
            }
        }
        hits
    }

    /// Cumulative contact with high-risk jurisdictions over the whole run.
    fn detect_geography(&self, customer_id: &str, txns: &[&Transaction]) -> Option<Hit> {
        let risky: Vec<&Transaction> = txns
            .iter()
            .copied()
            .filter(|t| self.high_risk_countries.contains(t.counterparty_country.as_str()))
            .collect();
        if risky.len() < self.rules.geography_min_count || risky.is_empty() {
            return None;
        }

        let latest = risky.iter().map(|t| t.timestamp).max()?;
        let mut countries: Vec<&str> = Vec::new();
        for t in &risky {
            if !countries.contains(&t.counterparty_country.as_str()) {
                countries.push(t.counterparty_country.as_str());
            }
        }

        Some(Hit {
            customer_id: customer_id.to_string(),
            alert_date: latest.date(),
            alert_type: AlertType::HighRiskGeography,
            severity: Severity::Medium,
            description: format!(
                "{} transactions involving high-risk jurisdictions ({}).",
                risky.len(),
                countries.join(", ")
            ),
            transaction_ids: risky.iter().map(|t| t.txn_id).collect(),
        })
    }
}
