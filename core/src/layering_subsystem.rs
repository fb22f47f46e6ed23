//! Layering: a large wire in from a shell, then most of it wired back out
//! to two more high-risk jurisdictions. Clumsy actors move the money the
//! next day; pros wait long enough to fall outside the rapid-movement window.

use crate::{
    behavior::{Behavior, SkillLevel},
    clock::{add_days, add_hours},
    config::LayeringConfig,
    counterparty::RiskTier,
    customer::Customer,
    error::SimResult,
    ledger::{Category, TxnRequest, TxnType},
    rng::SimRng,
    scenario::{post, DayContext, DayReport, Scenario, TransferSchedule},
    types::{round_cents, start_of_day, CustomerId},
};

pub struct LayeringSubsystem {
    config: LayeringConfig,
    actors: Vec<(CustomerId, SkillLevel)>,
    schedule: TransferSchedule,
}

impl LayeringSubsystem {
    pub fn new(config: LayeringConfig, customers: &[Customer]) -> Self {
        let actors = customers
            .iter()
            .filter_map(|c| match c.behavior {
                Behavior::Layering { skill } => Some((c.customer_id.clone(), skill)),
                _ => None,
            })
            .collect();
        Self {
            config,
            actors,
            schedule: TransferSchedule::default(),
        }
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    fn delay_days(&self, skill: SkillLevel, rng: &mut SimRng) -> u64 {
        match skill {
            SkillLevel::Clumsy => self.config.clumsy_delay_days,
            SkillLevel::Pro => {
                rng.range_inclusive(self.config.pro_delay_min_days, self.config.pro_delay_max_days)
            }
        }
    }
}

impl Scenario for LayeringSubsystem {
    fn name(&self) -> &'static str {
        "layering"
    }

    fn run_day(&mut self, ctx: &mut DayContext<'_>, rng: &mut SimRng) -> SimResult<DayReport> {
        let mut report = DayReport::default();

        for i in 0..self.actors.len() {
            if !rng.chance(self.config.start_probability) {
                continue;
            }
            let (customer_id, skill) = self.actors[i].clone();
            report.started += 1;

            // Step 1: the inflow.
            let inflow = round_cents(self.config.inflow_amount.sample(rng));
            let source = ctx.registry.sample(RiskTier::High, rng)?;
            post(
                ctx.ledger,
                TxnRequest {
                    customer_id: customer_id.clone(),
                    timestamp: start_of_day(ctx.date),
                    amount: inflow,
                    txn_type: TxnType::WireIn,
                    counterparty: source.name.clone(),
                    country: source.country.clone(),
                    category: Category::LayeringIn,
                },
                &mut report,
                "layering",
            )?;

            // Step 2: the split, delayed outflow.
            let outflow = inflow * self.config.outflow_fraction;
            let first_at = start_of_day(add_days(ctx.date, self.delay_days(skill, rng))?);
            let second_at = add_hours(first_at, self.config.split_offset_hours)?;
            for (share, at) in self.config.split_fractions.into_iter().zip([first_at, second_at]) {
                let sink = ctx.registry.sample(RiskTier::High, rng)?;
                self.schedule.push(TxnRequest {
                    customer_id: customer_id.clone(),
                    timestamp: at,
                    amount: outflow * share,
                    txn_type: TxnType::WireOut,
                    counterparty: sink.name.clone(),
                    country: sink.country.clone(),
                    category: Category::LayeringOut,
                });
            }
            log::debug!(
                "{} layering: {customer_id} ({skill:?}) takes ${inflow:.2}, out on {}",
                ctx.date,
                first_at.date()
            );
        }

        for req in self.schedule.drain_due(ctx.date) {
            post(ctx.ledger, req, &mut report, "layering")?;
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
