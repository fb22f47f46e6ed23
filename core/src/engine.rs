//! The simulation engine: builds the population, steps the calendar, and
//! hands the finished ledger to the rule engine and feature aggregator.

use crate::{
    background_subsystem::BackgroundSubsystem,
    behavior::assign_behaviors,
    clock::SimClock,
    config::SimConfig,
    counterparty::CounterpartyRegistry,
    customer::{synthetic_roster, validate_roster, Customer, RosterEntry},
    error::SimResult,
    features::{aggregate_features, CustomerFeatures},
    high_velocity_subsystem::HighVelocitySubsystem,
    layering_subsystem::LayeringSubsystem,
    ledger::{Ledger, Transaction},
    rng::{RngBank, RngSlot, SimRng},
    scenario::{DayContext, DayReport, Scenario},
    structuring_subsystem::StructuringSubsystem,
    transaction_monitoring::{Alert, RuleEngine},
    types::{CustomerId, Money, SimDate},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Run-level counters, per scenario and in total.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RunStats {
    pub days_simulated: u64,
    pub posted: u64,
    pub rejected: u64,
    pub per_scenario: BTreeMap<String, DayReport>,
    /// Transfers still scheduled past the last simulated day. They never
    /// reach the ledger or move a balance.
    pub dropped_after_horizon: u64,
}

/// The three artifacts of a run, plus final balances and counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimOutput {
    pub customers: Vec<Customer>,
    /// Sorted by timestamp; same-instant entries keep generation order.
    pub transactions: Vec<Transaction>,
    pub alerts: Vec<Alert>,
    pub features: Vec<CustomerFeatures>,
    pub final_balances: BTreeMap<CustomerId, Money>,
    pub stats: RunStats,
}

pub struct SimEngine {
    pub config: SimConfig,
    pub clock: SimClock,
    pub customers: Vec<Customer>,
    registry: CounterpartyRegistry,
    ledger: Ledger,
    scenarios: Vec<(SimRng, Box<dyn Scenario>)>,
    stats: RunStats,
}

impl SimEngine {
    /// Validate inputs, build the counterparty pool and assign behaviors.
    ///
    /// EXECUTION ORDER (fixed, never reordered):
    ///   1. background noise
    ///   2. structuring
    ///   3. layering
    ///   4. high-velocity (false positives)
    pub fn build(config: SimConfig, roster: &[RosterEntry]) -> SimResult<Self> {
        config.validate()?;
        validate_roster(roster)?;

        let bank = RngBank::new(config.seed);
        let registry = CounterpartyRegistry::generate(
            &config.counterparties,
            &config.high_risk_countries,
            &config.low_risk_countries,
            &mut bank.for_slot(RngSlot::Counterparty),
        )?;
        let customers =
            assign_behaviors(roster, &config.population, &mut bank.for_slot(RngSlot::Behavior))?;
        let ledger = Ledger::open(
            &customers,
            config.initial_balance_fraction,
            bank.for_slot(RngSlot::Ledger),
        );

        let home = config.home_country.clone();
        let mut engine = Self {
            clock: SimClock::new(config.start_date, config.duration_days),
            scenarios: Vec::new(),
            registry,
            ledger,
            stats: RunStats::default(),
            customers: Vec::new(),
            config: config.clone(),
        };
        engine.register(
            bank.for_slot(RngSlot::Background),
            Box::new(BackgroundSubsystem::new(config.background, home.clone(), &customers)),
        );
        engine.register(
            bank.for_slot(RngSlot::Structuring),
            Box::new(StructuringSubsystem::new(config.structuring, home.clone(), &customers)),
        );
        engine.register(
            bank.for_slot(RngSlot::Layering),
            Box::new(LayeringSubsystem::new(config.layering, &customers)),
        );
        engine.register(
            bank.for_slot(RngSlot::HighVelocity),
            Box::new(HighVelocitySubsystem::new(config.high_velocity, home, &customers)),
        );
        engine.customers = customers;
        Ok(engine)
    }

    /// Engine over a synthetic roster with the test config.
    pub fn build_test(roster_size: usize, seed: u64) -> SimResult<Self> {
        let config = SimConfig {
            seed,
            ..SimConfig::default_test()
        };
        let roster = synthetic_roster(roster_size, &mut RngBank::new(seed).for_slot(RngSlot::Roster));
        Self::build(config, &roster)
    }

    /// Register a scenario. Call in the documented execution order.
    pub fn register(&mut self, rng: SimRng, scenario: Box<dyn Scenario>) {
        self.scenarios.push((rng, scenario));
    }

    /// Simulate one day. Returns its date, or None once the horizon is reached.
    pub fn step_day(&mut self) -> SimResult<Option<SimDate>> {
        let Some(date) = self.clock.advance()? else {
            return Ok(None);
        };

        // Each scenario sees the ledger as left by the ones before it.
        for (rng, scenario) in &mut self.scenarios {
            let mut ctx = DayContext {
                date,
                ledger: &mut self.ledger,
                registry: &self.registry,
            };
            let report = scenario.run_day(&mut ctx, rng)?;
            self.stats.posted += report.posted;
            self.stats.rejected += report.rejected;
            self.stats
                .per_scenario
                .entry(scenario.name().to_string())
                .or_default()
                .absorb(report);
        }
        self.stats.days_simulated += 1;
        Ok(Some(date))
    }

    /// Simulate every remaining day, then evaluate rules and features.
    pub fn run(mut self) -> SimResult<SimOutput> {
        log::info!(
            "Simulating {} days from {} for {} customers",
            self.config.duration_days,
            self.config.start_date,
            self.customers.len()
        );
        while self.step_day()?.is_some() {}
        self.finish()
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn registry(&self) -> &CounterpartyRegistry {
        &self.registry
    }

    /// Downcast a registered scenario, for tests and tooling.
    pub fn scenario<T: 'static>(&self) -> Option<&T> {
        self.scenarios
            .iter()
            .find_map(|(_, s)| s.as_any().downcast_ref::<T>())
    }

    fn finish(mut self) -> SimResult<SimOutput> {
        let dropped: usize = self.scenarios.iter().map(|(_, s)| s.pending()).sum();
        if dropped > 0 {
            log::warn!("{dropped} scheduled transfers fall after the last simulated day and were dropped");
        }
        self.stats.dropped_after_horizon = dropped as u64;

        let (transactions, accounts) = self.ledger.finish();
        log::info!(
            "Simulation complete: {} transactions posted, {} debits rejected",
            transactions.len(),
            self.stats.rejected
        );

        let alerts = RuleEngine::new(&self.config.rules, &self.config.high_risk_countries)
            .evaluate(&transactions);
        let features = aggregate_features(&self.customers, &transactions);
        let final_balances = accounts
            .into_iter()
            .map(|(id, account)| (id, account.balance))
            .collect();

        Ok(SimOutput {
            customers: self.customers,
            transactions,
            alerts,
            features,
            final_balances,
            stats: self.stats,
        })
    }
}

/// Build and run a whole pipeline in one call.
pub fn run_pipeline(config: SimConfig, roster: &[RosterEntry]) -> SimResult<SimOutput> {
    SimEngine::build(config, roster)?.run()
}
