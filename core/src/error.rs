use crate::counterparty::RiskTier;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Counterparty pool has no {tier:?}-risk entries")]
    EmptyPool { tier: RiskTier },

    #[error("Population overflow: {criminals} criminals + {false_positives} false positives exceed {customers} customers")]
    PopulationOverflow {
        criminals: usize,
        false_positives: usize,
        customers: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid roster: {0}")]
    InvalidRoster(String),

    #[error("Customer '{customer_id}' has no account on the ledger")]
    UnknownCustomer { customer_id: String },

    #[error("Invalid transaction amount {amount} for customer '{customer_id}'")]
    InvalidAmount { customer_id: String, amount: f64 },

    #[error("Date arithmetic overflowed: {0}")]
    DateOverflow(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
