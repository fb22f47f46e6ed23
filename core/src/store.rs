//! SQLite export sink for a finished run.
//!
//! RULE: Only store.rs talks to the database.
//! The simulation never reads back from it; tooling and tests do.

use crate::{
    config::SimConfig,
    engine::SimOutput,
    error::SimResult,
};
use rusqlite::{params, Connection, OptionalExtension};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SimStore {
    conn: Connection,
}

impl SimStore {
    /// Open (or create) the export database at `path`.
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> SimResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SimResult<()> {
        self.conn.execute_batch(include_str!("../migrations/001_foundation.sql"))?;
        Ok(())
    }

    // ── Run ────────────────────────────────────────────────────

    pub fn insert_run(&self, run_id: &str, config: &SimConfig, version: &str) -> SimResult<()> {
        self.conn.execute(
            "INSERT INTO run (run_id, seed, version, start_date, duration_days, config_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                run_id,
                config.seed as i64,
                version,
                config.start_date.format(DATE_FORMAT).to_string(),
                config.duration_days as i64,
                serde_json::to_string(config)?,
            ],
        )?;
        Ok(())
    }

    // ── Output ─────────────────────────────────────────────────

    /// Write customers, ledger, alerts and features in one SQL transaction.
    pub fn save_output(&self, run_id: &str, output: &SimOutput) -> SimResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO customer (run_id, customer_id, yearly_income, behavior, skill_level, final_balance)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for c in &output.customers {
                let balance = output.final_balances.get(&c.customer_id).copied().unwrap_or(0.0);
                stmt.execute(params![
                    run_id,
                    c.customer_id,
                    c.yearly_income,
                    c.behavior.label(),
                    c.behavior.skill().map(|s| format!("{s:?}")),
                    balance,
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO txn (run_id, txn_id, customer_id, timestamp, amount, currency,
                                  txn_type, counterparty, counterparty_country, category)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;
            for t in &output.transactions {
                stmt.execute(params![
                    run_id,
                    t.txn_id.to_string(),
                    t.customer_id,
                    t.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                    t.amount,
                    t.currency,
                    t.txn_type.as_str(),
                    t.counterparty,
                    t.counterparty_country,
                    t.category.as_str(),
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO alert (run_id, alert_id, customer_id, alert_date, alert_type,
                                    severity, description, transaction_ids)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for a in &output.alerts {
                stmt.execute(params![
                    run_id,
                    a.alert_id,
                    a.customer_id,
                    a.alert_date.format(DATE_FORMAT).to_string(),
                    a.alert_type.as_str(),
                    format!("{:?}", a.severity),
                    a.description,
                    serde_json::to_string(&a.transaction_ids)?,
                ])?;
            }

            let mut stmt = tx.prepare(
                "INSERT INTO customer_features (run_id, customer_id, txn_count, active_months,
                                                avg_monthly_volume, volume_deviation_pct)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for f in &output.features {
                stmt.execute(params![
                    run_id,
                    f.customer_id,
                    f.txn_count as i64,
                    f.active_months as i64,
                    f.avg_monthly_volume,
                    f.volume_deviation_pct,
                ])?;
            }
        }
        tx.commit()?;
        log::info!(
            "Exported run {run_id}: {} customers, {} transactions, {} alerts",
            output.customers.len(),
            output.transactions.len(),
            output.alerts.len()
        );
        Ok(())
    }

    // ── Queries ────────────────────────────────────────────────

    pub fn customer_count(&self, run_id: &str) -> SimResult<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM customer WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?)
    }

    pub fn txn_count_total(&self, run_id: &str) -> SimResult<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM txn WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?)
    }

    pub fn alert_count(&self, run_id: &str) -> SimResult<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM alert WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?)
    }

    /// Alert counts keyed by alert type, alphabetical.
    pub fn alert_counts_by_type(&self, run_id: &str) -> SimResult<Vec<(String, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT alert_type, COUNT(*) FROM alert WHERE run_id = ?1
             GROUP BY alert_type ORDER BY alert_type",
        )?;
        let rows = stmt.query_map(params![run_id], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// (avg_monthly_volume, volume_deviation_pct) for one customer.
    pub fn customer_features(&self, run_id: &str, customer_id: &str) -> SimResult<Option<(f64, f64)>> {
        Ok(self
            .conn
            .query_row(
                "SELECT avg_monthly_volume, volume_deviation_pct FROM customer_features
                 WHERE run_id = ?1 AND customer_id = ?2",
                params![run_id, customer_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?)
    }
}
