//! Customer roster input and the simulated customer record.

use crate::{
    behavior::Behavior,
    error::{SimError, SimResult},
    rng::SimRng,
    types::{CustomerId, Money},
};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;

/// One row of the roster handed to the simulator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RosterEntry {
    pub customer_id: CustomerId,
    /// Accepts either a number or a dollar string such as "$59,696".
    #[serde(deserialize_with = "deserialize_income")]
    pub yearly_income: Money,
}

impl RosterEntry {
    pub fn new(customer_id: impl Into<CustomerId>, yearly_income: Money) -> Self {
        Self {
            customer_id: customer_id.into(),
            yearly_income,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub yearly_income: Money,
    pub behavior: Behavior,
}

/// Fail fast on rosters the simulation cannot use.
pub fn validate_roster(roster: &[RosterEntry]) -> SimResult<()> {
    let mut seen = HashSet::with_capacity(roster.len());
    for entry in roster {
        if !seen.insert(entry.customer_id.as_str()) {
            return Err(SimError::InvalidRoster(format!(
                "duplicate customer id '{}'",
                entry.customer_id
            )));
        }
        if !entry.yearly_income.is_finite() || entry.yearly_income <= 0.0 {
            return Err(SimError::InvalidRoster(format!(
                "customer '{}' has non-positive yearly income {}",
                entry.customer_id, entry.yearly_income
            )));
        }
    }
    Ok(())
}

/// Generate a roster with Pareto-shaped incomes, for runs without an
/// external roster file.
pub fn synthetic_roster(count: usize, rng: &mut SimRng) -> Vec<RosterEntry> {
    (0..count)
        .map(|i| {
            let income = rng.pareto(28_000.0, 2.2).min(750_000.0).round();
            RosterEntry::new(format!("C-{i:05}"), income)
        })
        .collect()
}

fn deserialize_income<'de, D>(deserializer: D) -> Result<Money, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Income {
        Number(f64),
        Text(String),
    }

    match Income::deserialize(deserializer)? {
        Income::Number(n) => Ok(n),
        Income::Text(s) => parse_currency(&s).map_err(serde::de::Error::custom),
    }
}

/// Parse "$1,234.50" style strings into a number.
pub fn parse_currency(raw: &str) -> Result<Money, String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Ok(0.0);
    }
    cleaned
        .parse::<f64>()
        .map_err(|e| format!("cannot parse income '{raw}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, RngSlot};

    #[test]
    fn parses_dollar_formatted_income() {
        assert_eq!(parse_currency("$59,696").unwrap(), 59_696.0);
        assert_eq!(parse_currency(" 1,234.50 ").unwrap(), 1_234.5);
        assert!(parse_currency("n/a").is_err());
    }

    #[test]
    fn roster_json_accepts_numbers_and_strings() {
        let json = r#"[
            {"customer_id": "a", "yearly_income": 48000},
            {"customer_id": "b", "yearly_income": "$120,500"}
        ]"#;
        let roster: Vec<RosterEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(roster[0].yearly_income, 48_000.0);
        assert_eq!(roster[1].yearly_income, 120_500.0);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let roster = vec![RosterEntry::new("x", 1.0), RosterEntry::new("x", 2.0)];
        assert!(matches!(validate_roster(&roster), Err(SimError::InvalidRoster(_))));
    }

    #[test]
    fn zero_income_is_rejected() {
        let roster = vec![RosterEntry::new("x", 0.0)];
        assert!(validate_roster(&roster).is_err());
    }

    #[test]
    fn synthetic_roster_is_valid() {
        let mut rng = RngBank::new(1).for_slot(RngSlot::Roster);
        let roster = synthetic_roster(200, &mut rng);
        assert_eq!(roster.len(), 200);
        validate_roster(&roster).unwrap();
        assert!(roster.iter().all(|r| r.yearly_income >= 28_000.0));
    }
}
