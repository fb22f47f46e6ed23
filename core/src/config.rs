use crate::{
    error::{SimError, SimResult},
    rng::SimRng,
    types::{Money, SimDate},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Shared value types ─────────────────────────────────────────────

/// Half-open amount range [min, max) used by every amount draw.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AmountRange {
    pub min: Money,
    pub max: Money,
}

impl AmountRange {
    pub const fn new(min: Money, max: Money) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut SimRng) -> Money {
        rng.uniform(self.min, self.max)
    }

    fn check(&self, label: &str) -> SimResult<()> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.min <= 0.0 || self.min > self.max {
            return Err(SimError::InvalidConfig(format!(
                "{label}: amount range [{}, {}) must be positive and ordered",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

// ── Population / behavior ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StrategyWeights {
    pub structuring: f64,
    pub layering: f64,
    pub mule: f64,
}

impl Default for StrategyWeights {
    fn default() -> Self {
        Self { structuring: 0.4, layering: 0.4, mule: 0.2 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SkillWeights {
    pub clumsy: f64,
    pub pro: f64,
}

impl Default for SkillWeights {
    fn default() -> Self {
        Self { clumsy: 0.7, pro: 0.3 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PopulationConfig {
    /// Share of the roster assigned a criminal strategy.
    pub criminal_fraction: f64,
    /// Share of the roster assigned benign high-velocity behavior.
    pub false_positive_fraction: f64,
    pub strategy_weights: StrategyWeights,
    pub skill_weights: SkillWeights,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            criminal_fraction: 0.05,
            false_positive_fraction: 0.10,
            strategy_weights: StrategyWeights::default(),
            skill_weights: SkillWeights::default(),
        }
    }
}

// ── Counterparty pool ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CounterpartyConfig {
    pub low_risk_count: usize,
    pub high_risk_count: usize,
}

impl Default for CounterpartyConfig {
    fn default() -> Self {
        Self { low_risk_count: 450, high_risk_count: 50 }
    }
}

// ── Background noise ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Days of the month on which income / 24 is credited.
    pub payroll_days: Vec<u32>,
    pub rent_day: u32,
    /// Share of monthly income debited as rent.
    pub rent_fraction: f64,
    /// Share of customers with one living expense per day.
    pub daily_active_fraction: f64,
    pub living_amount: AmountRange,
    pub payroll_counterparty: String,
    pub rent_counterparty: String,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            payroll_days: vec![15, 30],
            rent_day: 1,
            rent_fraction: 0.30,
            daily_active_fraction: 0.15,
            living_amount: AmountRange::new(10.0, 150.0),
            payroll_counterparty: "Employer Payroll".into(),
            rent_counterparty: "Landlord/Bank".into(),
        }
    }
}

// ── Scenarios ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StructuringConfig {
    pub start_probability: f64,
    pub min_deposits: u64,
    pub max_deposits: u64,
    /// Deposits land at day offsets in [0, max_day_offset].
    pub max_day_offset: u64,
    pub clumsy_amount: AmountRange,
    pub pro_amount: AmountRange,
    pub counterparty: String,
}

impl Default for StructuringConfig {
    fn default() -> Self {
        Self {
            start_probability: 0.02,
            min_deposits: 3,
            max_deposits: 5,
            max_day_offset: 6,
            clumsy_amount: AmountRange::new(9_000.0, 9_900.0),
            pro_amount: AmountRange::new(2_000.0, 4_000.0),
            counterparty: "ATM Deposit".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayeringConfig {
    pub start_probability: f64,
    /// Drawn half-open like every AmountRange; `max` itself is never hit.
    pub inflow_amount: AmountRange,
    /// Share of the inflow moved back out.
    pub outflow_fraction: f64,
    /// Split of the outflow across the two wire-outs.
    pub split_fractions: [f64; 2],
    pub clumsy_delay_days: u64,
    pub pro_delay_min_days: u64,
    pub pro_delay_max_days: u64,
    /// Hours between the first and second wire-out.
    pub split_offset_hours: i64,
}

impl Default for LayeringConfig {
    fn default() -> Self {
        Self {
            start_probability: 0.01,
            inflow_amount: AmountRange::new(40_000.0, 80_000.0),
            outflow_fraction: 0.95,
            split_fractions: [0.60, 0.35],
            clumsy_delay_days: 1,
            pro_delay_min_days: 3,
            pro_delay_max_days: 8,
            split_offset_hours: 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HighVelocityConfig {
    pub start_probability: f64,
    pub amount: AmountRange,
    pub counterparty: String,
}

impl Default for HighVelocityConfig {
    fn default() -> Self {
        Self {
            start_probability: 0.02,
            amount: AmountRange::new(15_000.0, 40_000.0),
            counterparty: "Tesla Motors".into(),
        }
    }
}

// ── Detection rules ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RuleConfig {
    pub structuring_min_amount: Money,
    /// Cash amounts at or above this are reportable; structuring sits below it.
    pub reporting_threshold: Money,
    pub structuring_window_days: i64,
    pub structuring_min_count: usize,
    /// Wire-ins strictly above this are checked for rapid movement.
    pub layering_min_inflow: Money,
    pub layering_window_days: i64,
    /// Outflow must strictly exceed this share of the inflow.
    pub layering_outflow_ratio: f64,
    pub geography_min_count: usize,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            structuring_min_amount: 9_000.0,
            reporting_threshold: 10_000.0,
            structuring_window_days: 7,
            structuring_min_count: 3,
            layering_min_inflow: 30_000.0,
            layering_window_days: 3,
            layering_outflow_ratio: 0.80,
            geography_min_count: 2,
        }
    }
}

// ── Top level ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u64,
    pub start_date: SimDate,
    pub duration_days: u64,
    pub home_country: String,
    pub high_risk_countries: Vec<String>,
    pub low_risk_countries: Vec<String>,
    /// Opening balance as a share of declared yearly income.
    pub initial_balance_fraction: f64,
    pub population: PopulationConfig,
    pub counterparties: CounterpartyConfig,
    pub background: BackgroundConfig,
    pub structuring: StructuringConfig,
    pub layering: LayeringConfig,
    pub high_velocity: HighVelocityConfig,
    pub rules: RuleConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).expect("2025-01-01 is a valid date"),
            duration_days: 180,
            home_country: "US".into(),
            high_risk_countries: ["Cayman Islands", "Panama", "UAE", "Cyprus", "Russia"]
                .map(String::from)
                .to_vec(),
            low_risk_countries: ["US", "UK", "Germany", "Canada", "Japan"]
                .map(String::from)
                .to_vec(),
            initial_balance_fraction: 0.05,
            population: PopulationConfig::default(),
            counterparties: CounterpartyConfig::default(),
            background: BackgroundConfig::default(),
            structuring: StructuringConfig::default(),
            layering: LayeringConfig::default(),
            high_velocity: HighVelocityConfig::default(),
            rules: RuleConfig::default(),
        }
    }
}

impl SimConfig {
    /// Load from a JSON file. Missing sections fall back to defaults.
    /// In tests, use SimConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SimConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Config with a short horizon and busy scenarios for use in tests.
    pub fn default_test() -> Self {
        Self {
            seed: 7,
            duration_days: 60,
            population: PopulationConfig {
                criminal_fraction: 0.20,
                false_positive_fraction: 0.20,
                ..PopulationConfig::default()
            },
            counterparties: CounterpartyConfig {
                low_risk_count: 40,
                high_risk_count: 8,
            },
            structuring: StructuringConfig {
                start_probability: 0.10,
                ..StructuringConfig::default()
            },
            layering: LayeringConfig {
                start_probability: 0.05,
                ..LayeringConfig::default()
            },
            high_velocity: HighVelocityConfig {
                start_probability: 0.05,
                ..HighVelocityConfig::default()
            },
            ..Self::default()
        }
    }

    /// Reject configurations the simulation cannot run. Never clamps.
    pub fn validate(&self) -> SimResult<()> {
        let invalid = |msg: String| -> SimResult<()> { Err(SimError::InvalidConfig(msg)) };

        if self.duration_days == 0 {
            return invalid("duration_days must be at least 1".into());
        }
        let probabilities = [
            ("population.criminal_fraction", self.population.criminal_fraction),
            ("population.false_positive_fraction", self.population.false_positive_fraction),
            ("background.rent_fraction", self.background.rent_fraction),
            ("background.daily_active_fraction", self.background.daily_active_fraction),
            ("structuring.start_probability", self.structuring.start_probability),
            ("layering.start_probability", self.layering.start_probability),
            ("layering.outflow_fraction", self.layering.outflow_fraction),
            ("high_velocity.start_probability", self.high_velocity.start_probability),
            ("initial_balance_fraction", self.initial_balance_fraction),
        ];
        for (label, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return invalid(format!("{label} = {p} is outside [0, 1]"));
            }
        }

        let strategy = &self.population.strategy_weights;
        let skill = &self.population.skill_weights;
        let weights = [strategy.structuring, strategy.layering, strategy.mule, skill.clumsy, skill.pro];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0)
            || strategy.structuring + strategy.layering + strategy.mule <= 0.0
            || skill.clumsy + skill.pro <= 0.0
        {
            return invalid("strategy and skill weights must be non-negative with a positive sum".into());
        }

        self.background.living_amount.check("background.living_amount")?;
        self.structuring.clumsy_amount.check("structuring.clumsy_amount")?;
        self.structuring.pro_amount.check("structuring.pro_amount")?;
        self.layering.inflow_amount.check("layering.inflow_amount")?;
        self.high_velocity.amount.check("high_velocity.amount")?;

        if self.structuring.min_deposits == 0
            || self.structuring.min_deposits > self.structuring.max_deposits
        {
            return invalid("structuring deposit count range must be 1..=max".into());
        }
        if self.layering.pro_delay_min_days > self.layering.pro_delay_max_days {
            return invalid("layering pro delay range is empty".into());
        }
        if self.layering.split_fractions.iter().any(|f| !(0.0..=1.0).contains(f)) {
            return invalid("layering split fractions must lie in [0, 1]".into());
        }
        if self.background.payroll_days.iter().chain([&self.background.rent_day])
            .any(|d| !(1..=31).contains(d))
        {
            return invalid("background calendar days must lie in 1..=31".into());
        }
        if self.counterparties.high_risk_count > 0 && self.high_risk_countries.is_empty() {
            return invalid("high-risk counterparties need at least one high-risk country".into());
        }
        if self.counterparties.low_risk_count > 0 && self.low_risk_countries.is_empty() {
            return invalid("low-risk counterparties need at least one low-risk country".into());
        }
        if self.rules.structuring_window_days < 0 || self.rules.layering_window_days < 0 {
            return invalid("rule windows must not be negative".into());
        }
        if self.rules.structuring_min_count == 0 {
            return invalid("rules.structuring_min_count must be at least 1".into());
        }
        Ok(())
    }
}
