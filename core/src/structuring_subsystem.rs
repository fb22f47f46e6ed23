//! Structuring: cash deposits split to stay under the reporting threshold.
//!
//! A started sequence schedules several deposits over the following week.
//! Clumsy actors deposit just under the threshold and trip the structuring
//! rule; pros deposit far below it and slip through.

use crate::{
    behavior::{Behavior, SkillLevel},
    clock::add_days,
    config::StructuringConfig,
    customer::Customer,
    error::SimResult,
    ledger::{Category, TxnRequest, TxnType},
    rng::SimRng,
    scenario::{post, DayContext, DayReport, Scenario, TransferSchedule},
    types::{start_of_day, CustomerId},
};

pub struct StructuringSubsystem {
    config: StructuringConfig,
    home_country: String,
    actors: Vec<(CustomerId, SkillLevel)>,
    schedule: TransferSchedule,
}

impl StructuringSubsystem {
    pub fn new(config: StructuringConfig, home_country: String, customers: &[Customer]) -> Self {
        let actors = customers
            .iter()
            .filter_map(|c| match c.behavior {
                Behavior::Structuring { skill } => Some((c.customer_id.clone(), skill)),
                _ => None,
            })
            .collect();
        Self {
            config,
            home_country,
            actors,
            schedule: TransferSchedule::default(),
        }
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }
}

impl Scenario for StructuringSubsystem {
    fn name(&self) -> &'static str {
        "structuring"
    }

    fn run_day(&mut self, ctx: &mut DayContext<'_>, rng: &mut SimRng) -> SimResult<DayReport> {
        let mut report = DayReport::default();

        for (customer_id, skill) in &self.actors {
            if !rng.chance(self.config.start_probability) {
                continue;
            }
            report.started += 1;

            let deposits = rng.range_inclusive(self.config.min_deposits, self.config.max_deposits);
            for _ in 0..deposits {
                let offset = rng.range_inclusive(0, self.config.max_day_offset);
                let amount = match skill {
                    SkillLevel::Clumsy => self.config.clumsy_amount.sample(rng),
                    SkillLevel::Pro => self.config.pro_amount.sample(rng),
                };
                self.schedule.push(TxnRequest {
                    customer_id: customer_id.clone(),
                    timestamp: start_of_day(add_days(ctx.date, offset)?),
                    amount,
                    txn_type: TxnType::CashDeposit,
                    counterparty: self.config.counterparty.clone(),
                    country: self.home_country.clone(),
                    category: Category::Structuring,
                });
            }
            log::debug!("{} structuring: {customer_id} ({skill:?}) starts {deposits} deposits", ctx.date);
        }

        for req in self.schedule.drain_due(ctx.date) {
            post(ctx.ledger, req, &mut report, "structuring")?;
        }
        Ok(report)
    }

    fn pending(&self) -> usize {
        self.schedule.len()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
