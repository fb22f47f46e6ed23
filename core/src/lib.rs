//! Synthetic AML transaction simulator and rule-based detection engine.
//!
//! Pipeline: roster → behavior assignment → day-stepped simulation →
//! ledger → rule engine (alerts) + feature aggregator.

pub mod background_subsystem;
pub mod behavior;
pub mod clock;
pub mod config;
pub mod counterparty;
pub mod customer;
pub mod engine;
pub mod error;
pub mod features;
pub mod high_velocity_subsystem;
pub mod layering_subsystem;
pub mod ledger;
pub mod name_generator;
pub mod rng;
pub mod scenario;
pub mod store;
pub mod structuring_subsystem;
pub mod transaction_monitoring;
pub mod types;
