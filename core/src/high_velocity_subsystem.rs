use crate::{
    behavior::Behavior,
    config::HighVelocityConfig,
    customer::Customer,
    error::SimResult,
    ledger::{Category, TxnRequest, TxnType},
    rng::SimRng,
    scenario::{post, DayContext, DayReport, Scenario},
    types::{start_of_day, CustomerId},
};

/// Innocent customers who now and then wire out a large sum to a reputable
/// business (a car, a tuition bill). Looks anomalous by volume only.
pub struct HighVelocitySubsystem {
    config: HighVelocityConfig,
    home_country: String,
    spenders: Vec<CustomerId>,
}

impl HighVelocitySubsystem {
    pub fn new(config: HighVelocityConfig, home_country: String, customers: &[Customer]) -> Self {
        let spenders = customers
            .iter()
            .filter(|c| matches!(c.behavior, Behavior::HighVelocity { .. }))
            .map(|c| c.customer_id.clone())
            .collect();
        Self {
            config,
            home_country,
            spenders,
        }
    }

    pub fn spender_count(&self) -> usize {
        self.spenders.len()
    }
}

impl Scenario for HighVelocitySubsystem {
    fn name(&self) -> &'static str {
        "high_velocity"
    }

    fn run_day(&mut self, ctx: &mut DayContext<'_>, rng: &mut SimRng) -> SimResult<DayReport> {
        let mut report = DayReport::default();

        for customer_id in &self.spenders {
            if !rng.chance(self.config.start_probability) {
                continue;
            }
            report.started += 1;
            let req = TxnRequest {
                customer_id: customer_id.clone(),
                timestamp: start_of_day(ctx.date),
                amount: self.config.amount.sample(rng),
                txn_type: TxnType::WireOut,
                counterparty: self.config.counterparty.clone(),
                country: self.home_country.clone(),
                category: Category::BigPurchase,
            };
            post(ctx.ledger, req, &mut report, self.name())?;
        }
        Ok(report)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
