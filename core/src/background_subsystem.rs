use crate::{
    config::BackgroundConfig,
    counterparty::RiskTier,
    customer::Customer,
    error::SimResult,
    ledger::{Category, TxnRequest, TxnType},
    rng::SimRng,
    scenario::{post, DayContext, DayReport, Scenario},
    types::{start_of_day, CustomerId, Money},
};
use chrono::Datelike;

/// Legitimate noise every customer produces: payroll, rent and daily living.
pub struct BackgroundSubsystem {
    config: BackgroundConfig,
    home_country: String,
    customers: Vec<(CustomerId, Money)>,
}

impl BackgroundSubsystem {
    pub fn new(config: BackgroundConfig, home_country: String, customers: &[Customer]) -> Self {
        Self {
            config,
            home_country,
            customers: customers
                .iter()
                .map(|c| (c.customer_id.clone(), c.yearly_income))
                .collect(),
        }
    }

    fn fixed_transfer(
        &self,
        customer_id: &str,
        ctx: &DayContext<'_>,
        amount: Money,
        txn_type: TxnType,
        counterparty: &str,
        category: Category,
    ) -> TxnRequest {
        TxnRequest {
            customer_id: customer_id.to_string(),
            timestamp: start_of_day(ctx.date),
            amount,
            txn_type,
            counterparty: counterparty.to_string(),
            country: self.home_country.clone(),
            category,
        }
    }
}

impl Scenario for BackgroundSubsystem {
    fn name(&self) -> &'static str {
        "background"
    }

    fn run_day(&mut self, ctx: &mut DayContext<'_>, rng: &mut SimRng) -> SimResult<DayReport> {
        let mut report = DayReport::default();
        let day = ctx.date.day();

        // Payroll: half-monthly salary on the configured days.
        if self.config.payroll_days.contains(&day) {
            for (customer_id, income) in &self.customers {
                let req = self.fixed_transfer(
                    customer_id,
                    ctx,
                    income / 24.0,
                    TxnType::AchIn,
                    &self.config.payroll_counterparty,
                    Category::Salary,
                );
                post(ctx.ledger, req, &mut report, self.name())?;
            }
        }

        // Rent / mortgage.
        if day == self.config.rent_day {
            for (customer_id, income) in &self.customers {
                let rent = (income / 12.0) * self.config.rent_fraction;
                let req = self.fixed_transfer(
                    customer_id,
                    ctx,
                    rent,
                    TxnType::AchOut,
                    &self.config.rent_counterparty,
                    Category::Rent,
                );
                post(ctx.ledger, req, &mut report, self.name())?;
            }
        }

        // Daily living: a random slice of customers buys something small.
        let n = self.customers.len();
        let active = ((n as f64) * self.config.daily_active_fraction).round() as usize;
        for idx in rng.sample_indices(n, active.min(n)) {
            let amount = self.config.living_amount.sample(rng);
            let merchant = ctx.registry.sample(RiskTier::Low, rng)?;
            let req = TxnRequest {
                customer_id: self.customers[idx].0.clone(),
                timestamp: start_of_day(ctx.date),
                amount,
                txn_type: TxnType::Debit,
                counterparty: merchant.name.clone(),
                country: merchant.country.clone(),
                category: Category::Living,
            };
            post(ctx.ledger, req, &mut report, self.name())?;
        }

        log::debug!(
            "{} background: {} posted, {} rejected",
            ctx.date,
            report.posted,
            report.rejected
        );
        Ok(report)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
