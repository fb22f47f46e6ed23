//! Shared primitive types used across the entire simulation.

use chrono::{NaiveDate, NaiveDateTime};

/// Calendar day of the simulation. One step of the clock = one day.
pub type SimDate = NaiveDate;

/// Point in time attached to every ledger entry.
pub type Timestamp = NaiveDateTime;

/// A stable, unique identifier for a customer on the roster.
pub type CustomerId = String;

/// Monetary amount in USD. Ledger amounts are rounded to cents.
pub type Money = f64;

/// Round a monetary amount to cents.
pub fn round_cents(amount: Money) -> Money {
    (amount * 100.0).round() / 100.0
}

/// Midnight of a simulation day.
pub fn start_of_day(date: SimDate) -> Timestamp {
    date.and_time(chrono::NaiveTime::MIN)
}
