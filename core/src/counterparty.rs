//! Counterparty registry: the shared "phonebook" of businesses customers
//! transact with. Many customers hit the same merchant or the same shell,
//! so counterparties are owned here and only borrowed by generators.

use crate::{
    config::CounterpartyConfig,
    error::{SimError, SimResult},
    name_generator::NameGenerator,
    rng::SimRng,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RiskTier {
    Low,
    High,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CounterpartyCategory {
    Merchant,
    Shell,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Counterparty {
    pub name: String,
    pub category: CounterpartyCategory,
    pub risk: RiskTier,
    pub country: String,
}

/// Immutable pool of counterparties, indexed by risk tier.
#[derive(Debug, Clone)]
pub struct CounterpartyRegistry {
    entries: Vec<Counterparty>,
    low: Vec<usize>,
    high: Vec<usize>,
}

impl CounterpartyRegistry {
    /// Build the pool: low-risk merchants first, then high-risk shells.
    pub fn generate(
        config: &CounterpartyConfig,
        high_risk_countries: &[String],
        low_risk_countries: &[String],
        rng: &mut SimRng,
    ) -> SimResult<Self> {
        if config.low_risk_count > 0 && low_risk_countries.is_empty() {
            return Err(SimError::InvalidConfig(
                "low-risk counterparties need a low-risk country".into(),
            ));
        }
        if config.high_risk_count > 0 && high_risk_countries.is_empty() {
            return Err(SimError::InvalidConfig(
                "high-risk counterparties need a high-risk country".into(),
            ));
        }

        let mut entries = Vec::with_capacity(config.low_risk_count + config.high_risk_count);
        for _ in 0..config.low_risk_count {
            let country = pick_country(low_risk_countries, rng);
            entries.push(Counterparty {
                name: NameGenerator::generate_merchant_name(rng),
                category: CounterpartyCategory::Merchant,
                risk: RiskTier::Low,
                country,
            });
        }
        for _ in 0..config.high_risk_count {
            let name = NameGenerator::generate_shell_name(rng);
            entries.push(Counterparty {
                name,
                category: CounterpartyCategory::Shell,
                risk: RiskTier::High,
                country: pick_country(high_risk_countries, rng),
            });
        }

        let registry = Self::from_counterparties(entries);
        log::info!(
            "Counterparty pool: {} low-risk, {} high-risk",
            registry.low.len(),
            registry.high.len()
        );
        Ok(registry)
    }

    /// Build a registry from an explicit list (tests and fixtures).
    pub fn from_counterparties(entries: Vec<Counterparty>) -> Self {
        let mut low = Vec::new();
        let mut high = Vec::new();
        for (i, cp) in entries.iter().enumerate() {
            match cp.risk {
                RiskTier::Low => low.push(i),
                RiskTier::High => high.push(i),
            }
        }
        Self { entries, low, high }
    }

    /// Draw one counterparty of the given tier uniformly at random.
    pub fn sample(&self, tier: RiskTier, rng: &mut SimRng) -> SimResult<&Counterparty> {
        let pool = self.tier_indices(tier);
        if pool.is_empty() {
            return Err(SimError::EmptyPool { tier });
        }
        let idx = pool[rng.next_u64_below(pool.len() as u64) as usize];
        Ok(&self.entries[idx])
    }

    pub fn count(&self, tier: RiskTier) -> usize {
        self.tier_indices(tier).len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Counterparty> {
        self.entries.iter()
    }

    fn tier_indices(&self, tier: RiskTier) -> &[usize] {
        match tier {
            RiskTier::Low => &self.low,
            RiskTier::High => &self.high,
        }
    }
}

fn pick_country(countries: &[String], rng: &mut SimRng) -> String {
    countries[rng.next_u64_below(countries.len() as u64) as usize].clone()
}
