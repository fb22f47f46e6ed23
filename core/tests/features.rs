use aml_sim_core::{
    behavior::Behavior,
    config::{BackgroundConfig, PopulationConfig, SimConfig},
    customer::{Customer, RosterEntry},
    engine::run_pipeline,
    features::aggregate_features,
    ledger::{Category, Transaction, TxnType},
};
use chrono::NaiveDate;
use uuid::Uuid;

fn customer(id: &str, income: f64) -> Customer {
    Customer {
        customer_id: id.into(),
        yearly_income: income,
        behavior: Behavior::Normal,
    }
}

fn txn(customer_id: &str, (y, m, d): (i32, u32, u32), amount: f64) -> Transaction {
    Transaction {
        txn_id: Uuid::new_v4(),
        customer_id: customer_id.into(),
        timestamp: NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap(),
        amount,
        currency: "USD".into(),
        txn_type: TxnType::Debit,
        counterparty: "Corner Deli".into(),
        counterparty_country: "US".into(),
        category: Category::Living,
    }
}

#[test]
fn averages_over_active_months_only() {
    let customers = vec![customer("a", 12_000.0)];
    let ledger = vec![
        txn("a", (2025, 1, 3), 1_000.0),
        txn("a", (2025, 1, 20), 500.0),
        // February is silent and does not dilute the average.
        txn("a", (2025, 3, 9), 3_000.0),
    ];

    let features = aggregate_features(&customers, &ledger);
    let f = &features[0];
    assert_eq!(f.txn_count, 3);
    assert_eq!(f.active_months, 2);
    assert_eq!(f.avg_monthly_volume, 2_250.0);
    // (2250 × 12 − 12000) / 12000
    assert!((f.volume_deviation_pct - 1.25).abs() < 1e-12);
}

#[test]
fn same_month_in_different_years_is_two_months() {
    let customers = vec![customer("a", 24_000.0)];
    let ledger = vec![txn("a", (2024, 12, 31), 2_000.0), txn("a", (2025, 12, 1), 2_000.0)];

    let f = &aggregate_features(&customers, &ledger)[0];
    assert_eq!(f.active_months, 2);
    assert_eq!(f.avg_monthly_volume, 2_000.0);
    assert_eq!(f.volume_deviation_pct, 0.0);
}

#[test]
fn silent_customer_has_zero_deviation() {
    let customers = vec![customer("a", 50_000.0), customer("quiet", 80_000.0)];
    let ledger = vec![txn("a", (2025, 1, 3), 100.0)];

    let features = aggregate_features(&customers, &ledger);
    assert_eq!(features.len(), 2);
    let quiet = &features[1];
    assert_eq!(quiet.customer_id, "quiet");
    assert_eq!(quiet.txn_count, 0);
    assert_eq!(quiet.active_months, 0);
    assert_eq!(quiet.avg_monthly_volume, 0.0);
    assert_eq!(quiet.volume_deviation_pct, 0.0);
    assert!(quiet.volume_deviation_pct.is_finite());
}

#[test]
fn rows_follow_roster_order_and_carry_behavior_labels() {
    let config = SimConfig {
        seed: 3,
        ..SimConfig::default_test()
    };
    let roster: Vec<RosterEntry> = (0..30)
        .rev()
        .map(|i| RosterEntry::new(format!("r-{i:02}"), 40_000.0 + i as f64 * 1_000.0))
        .collect();
    let out = run_pipeline(config, &roster).unwrap();

    let ids: Vec<_> = out.features.iter().map(|f| f.customer_id.clone()).collect();
    let roster_ids: Vec<_> = roster.iter().map(|r| r.customer_id.clone()).collect();
    assert_eq!(ids, roster_ids);
    for (f, c) in out.features.iter().zip(&out.customers) {
        assert_eq!(f.behavior, c.behavior.label());
        assert_eq!(f.yearly_income, c.yearly_income);
    }
    let total: usize = out.features.iter().map(|f| f.txn_count).sum();
    assert_eq!(total, out.transactions.len());
}

#[test]
fn a_run_with_no_activity_produces_all_zero_features() {
    // 2025-01-03 ..= 2025-01-07: no payroll or rent day, no living spend.
    let config = SimConfig {
        start_date: NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
        duration_days: 5,
        population: PopulationConfig {
            criminal_fraction: 0.0,
            false_positive_fraction: 0.0,
            ..PopulationConfig::default()
        },
        background: BackgroundConfig {
            daily_active_fraction: 0.0,
            ..BackgroundConfig::default()
        },
        ..SimConfig::default_test()
    };
    let roster: Vec<RosterEntry> = (0..5).map(|i| RosterEntry::new(format!("c{i}"), 30_000.0)).collect();
    let out = run_pipeline(config, &roster).unwrap();

    assert!(out.transactions.is_empty());
    assert!(out.alerts.is_empty());
    assert!(out.features.iter().all(|f| f.volume_deviation_pct == 0.0 && f.active_months == 0));
}
