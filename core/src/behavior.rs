//! Behavior assignment. Decides once per run which customers launder money
//! and which are innocent high-velocity spenders; the rest stay ordinary.

use crate::{
    config::PopulationConfig,
    customer::{Customer, RosterEntry},
    error::{SimError, SimResult},
    rng::SimRng,
};
use serde::{Deserialize, Serialize};

/// How sophisticated a bad actor is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SkillLevel {
    /// Executes the textbook pattern and gets caught.
    Clumsy,
    /// Bends the pattern to stay under the rules.
    Pro,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HighVelocityKind {
    BigSpender,
    CryptoTrader,
    CashBusiness,
}

impl HighVelocityKind {
    const ALL: [HighVelocityKind; 3] = [Self::BigSpender, Self::CryptoTrader, Self::CashBusiness];
}

/// Behavioral archetype, fixed for the whole run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(tag = "archetype", rename_all = "snake_case")]
pub enum Behavior {
    #[default]
    Normal,
    Structuring { skill: SkillLevel },
    Layering { skill: SkillLevel },
    Mule { skill: SkillLevel },
    HighVelocity { kind: HighVelocityKind },
}

impl Behavior {
    pub fn skill(&self) -> Option<SkillLevel> {
        match self {
            Self::Structuring { skill } | Self::Layering { skill } | Self::Mule { skill } => {
                Some(*skill)
            }
            Self::Normal | Self::HighVelocity { .. } => None,
        }
    }

    pub fn is_criminal(&self) -> bool {
        self.skill().is_some()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Structuring { .. } => "structuring",
            Self::Layering { .. } => "layering",
            Self::Mule { .. } => "mule",
            Self::HighVelocity { .. } => "high_velocity",
        }
    }
}

/// Assign a behavior to every roster entry, preserving roster order.
///
/// Criminals are drawn first, without replacement; the false-positive
/// group is drawn without replacement from whoever is left. Everyone
/// else stays `Behavior::Normal`.
pub fn assign_behaviors(
    roster: &[RosterEntry],
    config: &PopulationConfig,
    rng: &mut SimRng,
) -> SimResult<Vec<Customer>> {
    let n = roster.len();
    for (label, fraction) in [
        ("criminal_fraction", config.criminal_fraction),
        ("false_positive_fraction", config.false_positive_fraction),
    ] {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(SimError::InvalidConfig(format!(
                "{label} = {fraction} is outside [0, 1]"
            )));
        }
    }

    let criminal_count = (n as f64 * config.criminal_fraction).floor() as usize;
    let fp_count = (n as f64 * config.false_positive_fraction).floor() as usize;
    if criminal_count + fp_count > n {
        return Err(SimError::PopulationOverflow {
            criminals: criminal_count,
            false_positives: fp_count,
            customers: n,
        });
    }

    let strategy_weights = [
        config.strategy_weights.structuring,
        config.strategy_weights.layering,
        config.strategy_weights.mule,
    ];
    let skill_weights = [config.skill_weights.clumsy, config.skill_weights.pro];

    let mut behaviors = vec![Behavior::Normal; n];

    for idx in rng.sample_indices(n, criminal_count) {
        let strategy = rng.pick_weighted(&strategy_weights);
        let skill = match rng.pick_weighted(&skill_weights) {
            0 => SkillLevel::Clumsy,
            _ => SkillLevel::Pro,
        };
        behaviors[idx] = match strategy {
            0 => Behavior::Structuring { skill },
            1 => Behavior::Layering { skill },
            _ => Behavior::Mule { skill },
        };
    }

    let remaining: Vec<usize> = (0..n)
        .filter(|&i| behaviors[i] == Behavior::Normal)
        .collect();
    for pick in rng.sample_indices(remaining.len(), fp_count) {
        let kind = HighVelocityKind::ALL[rng.next_u64_below(3) as usize];
        behaviors[remaining[pick]] = Behavior::HighVelocity { kind };
    }

    log::info!(
        "Behavior assignment: {} customers, {} criminals, {} high-velocity",
        n,
        criminal_count,
        fp_count
    );

    Ok(roster
        .iter()
        .zip(behaviors)
        .map(|(entry, behavior)| Customer {
            customer_id: entry.customer_id.clone(),
            yearly_income: entry.yearly_income,
            behavior,
        })
        .collect())
}
