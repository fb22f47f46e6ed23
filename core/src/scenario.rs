//! Scenario trait and the per-day context generators run against.
//!
//! RULE: Every transaction-producing generator implements Scenario.
//! The engine calls run_day() on each registered scenario
//! in registration order, every simulated day.
//! Execution order is fixed and documented in engine.rs.

use crate::{
    counterparty::CounterpartyRegistry,
    error::SimResult,
    ledger::{Ledger, TxnRequest},
    rng::SimRng,
    types::{round_cents, SimDate},
};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeMap;

/// Everything a scenario may touch while simulating one day.
pub struct DayContext<'a> {
    pub date: SimDate,
    pub ledger: &'a mut Ledger,
    pub registry: &'a CounterpartyRegistry,
}

/// Counters one scenario reports for one day.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayReport {
    /// Sequences (structuring runs, layering cycles, purchases) begun today.
    pub started: u64,
    pub posted: u64,
    pub rejected: u64,
}

impl DayReport {
    pub fn absorb(&mut self, other: DayReport) {
        self.started += other.started;
        self.posted += other.posted;
        self.rejected += other.rejected;
    }
}

/// The contract every generator must fulfill.
pub trait Scenario: Send {
    /// Unique stable name for this scenario.
    fn name(&self) -> &'static str;

    /// Called once per simulated day by the engine.
    ///
    /// - `ctx`: today's date, the ledger as left by earlier scenarios, the
    ///   counterparty pool
    /// - `rng`: this scenario's deterministic stream
    fn run_day(&mut self, ctx: &mut DayContext<'_>, rng: &mut SimRng) -> SimResult<DayReport>;

    /// Transfers queued for days not yet simulated.
    fn pending(&self) -> usize {
        0
    }

    /// For downcasting in tests and tooling only.
    fn as_any(&self) -> &dyn Any;
}

/// Post one request, folding the outcome into `report`.
/// Insufficient balance is a silent skip, never an error. So is an amount
/// that rounds to zero cents (a zero rent share, a tiny income).
pub fn post(
    ledger: &mut Ledger,
    req: TxnRequest,
    report: &mut DayReport,
    scenario: &'static str,
) -> SimResult<bool> {
    let customer_id = req.customer_id.clone();
    let amount = req.amount;
    if round_cents(amount) == 0.0 {
        log::debug!("{scenario}: skipped zero-cent {:?} for {customer_id}", req.txn_type);
        return Ok(false);
    }
    let posted = ledger.record(req)?;
    if posted {
        report.posted += 1;
    } else {
        report.rejected += 1;
        log::debug!("{scenario}: skipped ${amount:.2} debit for {customer_id} (insufficient balance)");
    }
    Ok(posted)
}

/// Future-dated transfers, keyed by the day they post.
#[derive(Debug, Default)]
pub struct TransferSchedule {
    queue: BTreeMap<SimDate, Vec<TxnRequest>>,
}

impl TransferSchedule {
    pub fn push(&mut self, req: TxnRequest) {
        self.queue.entry(req.timestamp.date()).or_default().push(req);
    }

    /// Remove and return everything dated on or before `date`, oldest day
    /// first, queue order within a day.
    pub fn drain_due(&mut self, date: SimDate) -> Vec<TxnRequest> {
        let later = match date.succ_opt() {
            Some(next) => self.queue.split_off(&next),
            None => BTreeMap::new(),
        };
        let due = std::mem::replace(&mut self.queue, later);
        due.into_values().flatten().collect()
    }

    pub fn len(&self) -> usize {
        self.queue.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ledger::{Category, TxnType}, types::start_of_day};
    use chrono::NaiveDate;

    fn req_on(day: u32, amount: f64) -> TxnRequest {
        TxnRequest {
            customer_id: "c".into(),
            timestamp: start_of_day(NaiveDate::from_ymd_opt(2025, 3, day).unwrap()),
            amount,
            txn_type: TxnType::CashDeposit,
            counterparty: "ATM Deposit".into(),
            country: "US".into(),
            category: Category::Structuring,
        }
    }

    #[test]
    fn zero_cent_requests_are_skipped_not_recorded() {
        let customers = vec![crate::customer::Customer {
            customer_id: "c".into(),
            yearly_income: 12_000.0,
            behavior: crate::behavior::Behavior::Normal,
        }];
        let bank = crate::rng::RngBank::new(1);
        let mut ledger = Ledger::open(&customers, 0.05, bank.for_slot(crate::rng::RngSlot::Ledger));
        let mut report = DayReport::default();

        for amount in [0.0, 0.004] {
            let posted = post(&mut ledger, req_on(2, amount), &mut report, "test").unwrap();
            assert!(!posted);
        }
        assert!(ledger.is_empty());
        assert_eq!(report, DayReport::default());
        assert_eq!(ledger.balance("c"), Some(600.0));
    }

    #[test]
    fn drains_only_due_transfers_in_date_order() {
        let mut schedule = TransferSchedule::default();
        schedule.push(req_on(5, 3.0));
        schedule.push(req_on(2, 1.0));
        schedule.push(req_on(3, 2.0));

        let due = schedule.drain_due(NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        let amounts: Vec<f64> = due.iter().map(|r| r.amount).collect();
        assert_eq!(amounts, vec![1.0, 2.0]);
        assert_eq!(schedule.len(), 1);
    }
}
