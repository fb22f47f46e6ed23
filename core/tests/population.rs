//! Behavior assignment and counterparty pool tests.

use aml_sim_core::{
    behavior::{assign_behaviors, Behavior, SkillLevel},
    config::{CounterpartyConfig, PopulationConfig, SimConfig},
    counterparty::{Counterparty, CounterpartyCategory, CounterpartyRegistry, RiskTier},
    customer::RosterEntry,
    error::SimError,
    rng::{RngBank, RngSlot},
};

fn roster(n: usize) -> Vec<RosterEntry> {
    (0..n).map(|i| RosterEntry::new(format!("c-{i:04}"), 50_000.0)).collect()
}

#[test]
fn population_fractions_produce_floor_counts() {
    let customers = assign_behaviors(
        &roster(1000),
        &PopulationConfig::default(),
        &mut RngBank::new(42).for_slot(RngSlot::Behavior),
    )
    .unwrap();

    let criminals = customers.iter().filter(|c| c.behavior.is_criminal()).count();
    let high_velocity = customers
        .iter()
        .filter(|c| matches!(c.behavior, Behavior::HighVelocity { .. }))
        .count();
    assert_eq!(criminals, 50);
    assert_eq!(high_velocity, 100);
    assert_eq!(customers.len(), 1000);
}

#[test]
fn assignment_preserves_roster_order() {
    let input = roster(50);
    let customers = assign_behaviors(
        &input,
        &PopulationConfig::default(),
        &mut RngBank::new(1).for_slot(RngSlot::Behavior),
    )
    .unwrap();
    for (entry, customer) in input.iter().zip(&customers) {
        assert_eq!(entry.customer_id, customer.customer_id);
    }
}

#[test]
fn only_criminals_carry_a_skill_level() {
    let customers = assign_behaviors(
        &roster(500),
        &PopulationConfig {
            criminal_fraction: 0.4,
            false_positive_fraction: 0.4,
            ..PopulationConfig::default()
        },
        &mut RngBank::new(9).for_slot(RngSlot::Behavior),
    )
    .unwrap();

    for c in &customers {
        match c.behavior {
            Behavior::Structuring { .. } | Behavior::Layering { .. } | Behavior::Mule { .. } => {
                assert!(c.behavior.skill().is_some())
            }
            Behavior::Normal | Behavior::HighVelocity { .. } => assert!(c.behavior.skill().is_none()),
        }
    }
    let normals = customers.iter().filter(|c| c.behavior == Behavior::Normal).count();
    assert_eq!(normals, 100);
}

#[test]
fn zero_weights_are_never_drawn() {
    let mut config = PopulationConfig {
        criminal_fraction: 0.5,
        false_positive_fraction: 0.0,
        ..PopulationConfig::default()
    };
    config.strategy_weights.layering = 0.0;
    config.strategy_weights.mule = 0.0;
    config.skill_weights.clumsy = 0.0;

    let customers =
        assign_behaviors(&roster(200), &config, &mut RngBank::new(3).for_slot(RngSlot::Behavior)).unwrap();
    for c in customers.iter().filter(|c| c.behavior.is_criminal()) {
        assert_eq!(c.behavior, Behavior::Structuring { skill: SkillLevel::Pro });
    }
}

#[test]
fn overlapping_fractions_fail_fast() {
    let config = PopulationConfig {
        criminal_fraction: 0.7,
        false_positive_fraction: 0.4,
        ..PopulationConfig::default()
    };
    let result = assign_behaviors(&roster(10), &config, &mut RngBank::new(1).for_slot(RngSlot::Behavior));
    assert!(matches!(
        result,
        Err(SimError::PopulationOverflow { criminals: 7, false_positives: 4, customers: 10 })
    ));
}

#[test]
fn fraction_above_one_is_rejected() {
    let config = PopulationConfig {
        criminal_fraction: 1.5,
        ..PopulationConfig::default()
    };
    let result = assign_behaviors(&roster(10), &config, &mut RngBank::new(1).for_slot(RngSlot::Behavior));
    assert!(matches!(result, Err(SimError::InvalidConfig(_))));
}

#[test]
fn empty_roster_is_all_normal_and_fine() {
    let customers = assign_behaviors(
        &[],
        &PopulationConfig::default(),
        &mut RngBank::new(1).for_slot(RngSlot::Behavior),
    )
    .unwrap();
    assert!(customers.is_empty());
}

// ── Counterparty pool ──────────────────────────────────────────

#[test]
fn generated_pool_matches_configured_mix() {
    let config = SimConfig::default();
    let registry = CounterpartyRegistry::generate(
        &config.counterparties,
        &config.high_risk_countries,
        &config.low_risk_countries,
        &mut RngBank::new(42).for_slot(RngSlot::Counterparty),
    )
    .unwrap();

    assert_eq!(registry.count(RiskTier::Low), 450);
    assert_eq!(registry.count(RiskTier::High), 50);
    for cp in registry.iter() {
        match cp.risk {
            RiskTier::High => {
                assert_eq!(cp.category, CounterpartyCategory::Shell);
                assert!(config.high_risk_countries.contains(&cp.country));
            }
            RiskTier::Low => {
                assert_eq!(cp.category, CounterpartyCategory::Merchant);
                assert!(config.low_risk_countries.contains(&cp.country));
            }
        }
    }
}

#[test]
fn sample_returns_requested_tier() {
    let config = SimConfig::default_test();
    let registry = CounterpartyRegistry::generate(
        &config.counterparties,
        &config.high_risk_countries,
        &config.low_risk_countries,
        &mut RngBank::new(5).for_slot(RngSlot::Counterparty),
    )
    .unwrap();
    let mut rng = RngBank::new(5).for_slot(RngSlot::Layering);
    for _ in 0..100 {
        assert_eq!(registry.sample(RiskTier::High, &mut rng).unwrap().risk, RiskTier::High);
        assert_eq!(registry.sample(RiskTier::Low, &mut rng).unwrap().risk, RiskTier::Low);
    }
}

#[test]
fn empty_tier_fails_with_empty_pool() {
    let registry = CounterpartyRegistry::from_counterparties(vec![Counterparty {
        name: "Corner Grocery LLC".into(),
        category: CounterpartyCategory::Merchant,
        risk: RiskTier::Low,
        country: "US".into(),
    }]);
    let mut rng = RngBank::new(1).for_slot(RngSlot::Layering);
    assert!(matches!(
        registry.sample(RiskTier::High, &mut rng),
        Err(SimError::EmptyPool { tier: RiskTier::High })
    ));
}

#[test]
fn shells_without_high_risk_countries_are_a_config_error() {
    let result = CounterpartyRegistry::generate(
        &CounterpartyConfig { low_risk_count: 1, high_risk_count: 1 },
        &[],
        &["US".to_string()],
        &mut RngBank::new(1).for_slot(RngSlot::Counterparty),
    );
    assert!(matches!(result, Err(SimError::InvalidConfig(_))));
}
