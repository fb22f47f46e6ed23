//! sim-runner: headless runner for the AML transaction simulator.
//!
//! Usage:
//!   sim-runner --seed 42 --days 180 --customers 2000 --db run.db
//!   sim-runner --config data/sim_config.json --roster data/roster_sample.json --json-out run.json

use aml_sim_core::{
    behavior::Behavior,
    config::SimConfig,
    customer::{synthetic_roster, RosterEntry},
    engine::{run_pipeline, SimOutput},
    rng::{RngBank, RngSlot},
    store::SimStore,
};
use anyhow::{Context, Result};
use chrono::Utc;
use std::collections::BTreeMap;
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut config = match flag_value(&args, "--config") {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    config.seed = parse_arg(&args, "--seed", config.seed);
    config.duration_days = parse_arg(&args, "--days", config.duration_days);
    let customers = parse_arg(&args, "--customers", 2000usize);
    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let json_out = flag_value(&args, "--json-out");

    let roster = match flag_value(&args, "--roster") {
        Some(path) => load_roster(path)?,
        None => synthetic_roster(customers, &mut RngBank::new(config.seed).for_slot(RngSlot::Roster)),
    };

    println!("AML transaction simulator: sim-runner");
    println!("  seed:      {}", config.seed);
    println!("  start:     {}", config.start_date);
    println!("  days:      {}", config.duration_days);
    println!("  customers: {}", roster.len());
    println!("  db:        {db}");
    println!();

    let output = run_pipeline(config.clone(), &roster)?;

    let store = SimStore::open(db)?;
    store.migrate()?;
    let run_id = format!("run-{}-{}", config.seed, Utc::now().format("%Y%m%dT%H%M%S"));
    store.insert_run(&run_id, &config, env!("CARGO_PKG_VERSION"))?;
    store.save_output(&run_id, &output)?;

    if let Some(path) = json_out {
        let json = serde_json::to_string_pretty(&output)?;
        std::fs::write(path, json).with_context(|| format!("Cannot write {path}"))?;
        log::info!("Wrote run output to {path}");
    }

    print_summary(&run_id, &output, &store)?;
    Ok(())
}

fn load_roster(path: &str) -> Result<Vec<RosterEntry>> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Cannot read {path}"))?;
    let roster = serde_json::from_str(&content).with_context(|| format!("Cannot parse {path}"))?;
    Ok(roster)
}

fn print_summary(run_id: &str, output: &SimOutput, store: &SimStore) -> Result<()> {
    let mut behaviors: BTreeMap<&str, usize> = BTreeMap::new();
    let mut clumsy = 0;
    for c in &output.customers {
        *behaviors.entry(c.behavior.label()).or_default() += 1;
        if matches!(c.behavior.skill(), Some(aml_sim_core::behavior::SkillLevel::Clumsy)) {
            clumsy += 1;
        }
    }
    let criminals = output.customers.iter().filter(|c| c.behavior.is_criminal()).count();
    let flagged_normals = output
        .alerts
        .iter()
        .filter(|a| {
            output
                .customers
                .iter()
                .any(|c| c.customer_id == a.customer_id && !c.behavior.is_criminal())
        })
        .count();

    println!("=== RUN SUMMARY ===");
    println!("  run_id:          {run_id}");
    println!("  days simulated:  {}", output.stats.days_simulated);
    println!("  transactions:    {}", store.txn_count_total(run_id)?);
    println!("  rejected debits: {}", output.stats.rejected);
    println!("  dropped (after horizon): {}", output.stats.dropped_after_horizon);
    println!("  criminals:       {criminals} ({clumsy} clumsy)");
    for (label, count) in &behaviors {
        if *label != Behavior::Normal.label() {
            println!("    {label:<14} {count}");
        }
    }

    println!();
    println!("=== ALERTS ===");
    println!("  total:           {}", store.alert_count(run_id)?);
    for (alert_type, count) in store.alert_counts_by_type(run_id)? {
        println!("    {alert_type:<26} {count}");
    }
    println!("  on non-criminals: {flagged_normals}");
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    flag_value(args, flag)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
