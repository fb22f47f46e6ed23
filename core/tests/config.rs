use aml_sim_core::{
    config::{AmountRange, SimConfig},
    error::SimError,
};
use chrono::NaiveDate;
use std::path::PathBuf;

fn write_temp(name: &str, body: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("aml-sim-{}-{name}.json", std::process::id()));
    std::fs::write(&path, body).unwrap();
    path
}

fn assert_invalid(config: SimConfig) {
    assert!(
        matches!(config.validate(), Err(SimError::InvalidConfig(_))),
        "expected InvalidConfig"
    );
}

#[test]
fn defaults_and_test_config_validate() {
    SimConfig::default().validate().unwrap();
    SimConfig::default_test().validate().unwrap();
}

#[test]
fn shipped_config_file_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../data/sim_config.json");
    let config = SimConfig::load(path).unwrap();
    assert!(config.duration_days > 0);
    assert!(!config.high_risk_countries.is_empty());
}

#[test]
fn partial_file_falls_back_to_defaults() {
    let path = write_temp(
        "partial",
        r#"{ "seed": 99, "start_date": "2024-06-01", "layering": { "start_probability": 0.5 } }"#,
    );
    let config = SimConfig::load(path.to_str().unwrap()).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.seed, 99);
    assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    assert_eq!(config.layering.start_probability, 0.5);
    assert_eq!(config.layering.outflow_fraction, 0.95);
    assert_eq!(config.duration_days, SimConfig::default().duration_days);
    assert_eq!(config.rules, SimConfig::default().rules);
}

#[test]
fn load_rejects_missing_file_and_bad_values() {
    assert!(SimConfig::load("/definitely/not/here.json").is_err());

    let path = write_temp("bad", r#"{ "duration_days": 0 }"#);
    let result = SimConfig::load(path.to_str().unwrap());
    std::fs::remove_file(&path).ok();
    assert!(result.is_err());
}

#[test]
fn validate_rejects_out_of_range_values() {
    let mut c = SimConfig::default();
    c.structuring.start_probability = 1.5;
    assert_invalid(c);

    let mut c = SimConfig::default();
    c.population.criminal_fraction = -0.1;
    assert_invalid(c);

    let mut c = SimConfig::default();
    c.population.strategy_weights.structuring = 0.0;
    c.population.strategy_weights.layering = 0.0;
    c.population.strategy_weights.mule = 0.0;
    assert_invalid(c);

    let mut c = SimConfig::default();
    c.high_velocity.amount = AmountRange::new(500.0, 100.0);
    assert_invalid(c);

    let mut c = SimConfig::default();
    c.structuring.min_deposits = 6;
    assert_invalid(c);

    let mut c = SimConfig::default();
    c.layering.pro_delay_min_days = 9;
    assert_invalid(c);

    let mut c = SimConfig::default();
    c.background.payroll_days = vec![15, 32];
    assert_invalid(c);

    let mut c = SimConfig::default();
    c.high_risk_countries.clear();
    assert_invalid(c);

    let mut c = SimConfig::default();
    c.rules.structuring_min_count = 0;
    assert_invalid(c);
}

#[test]
fn zero_population_fractions_are_allowed() {
    let mut c = SimConfig::default();
    c.population.criminal_fraction = 0.0;
    c.population.false_positive_fraction = 0.0;
    c.validate().unwrap();
}
