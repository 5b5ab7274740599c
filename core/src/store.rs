//! SQLite persistence for finished campaigns.
//!
//! RULE: Only store.rs talks to the database.
//! The engine never touches it; callers hand finished results over.

use crate::{
    aggregate::AggregateAnalysis,
    error::{SimError, SimResult},
    outputs::SimulationOutputs,
};
use rusqlite::{params, Connection, OptionalExtension};

/// Everything a finished campaign writes, stored as one unit.
pub struct CampaignRecord<'a> {
    pub campaign_id: &'a str,
    pub master_seed: u64,
    pub config_json: &'a str,
    pub created_at:  &'a str,
    pub results:     &'a [SimulationOutputs],
    pub analysis:    &'a AggregateAnalysis,
    /// Also write every recorded month of every trial.
    pub month_rows:  bool,
}

pub struct ResultsStore {
    conn: Connection,
}

impl ResultsStore {
    /// Open (or create) the results database at `path`.
    pub fn open(path: &str) -> SimResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode: better concurrent read performance.
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

    // ── Campaign ───────────────────────────────────────────────

    pub fn insert_campaign(
        &self,
        campaign_id: &str,
        master_seed: u64,
        trials: usize,
        config_json: &str,
        created_at: &str,
    ) -> SimResult<()> {
        insert_campaign_row(&self.conn, campaign_id, master_seed, trials, config_json, created_at)
    }

    pub fn save_analysis(&self, campaign_id: &str, analysis: &AggregateAnalysis) -> SimResult<()> {
        update_analysis(&self.conn, campaign_id, analysis)
    }

    /// Write the campaign row, its trials and its analysis in one
    /// transaction. On any error nothing of the campaign is kept.
    pub fn insert_campaign_results(&mut self, record: &CampaignRecord<'_>) -> SimResult<()> {
        let tx = self.conn.transaction()?;
        insert_campaign_row(
            &tx,
            record.campaign_id,
            record.master_seed,
            record.results.len(),
            record.config_json,
            record.created_at,
        )?;
        for trial in record.results {
            insert_trial_row(&tx, record.campaign_id, trial)?;
            if record.month_rows {
                insert_month_rows_on(&tx, record.campaign_id, trial)?;
            }
        }
        update_analysis(&tx, record.campaign_id, record.analysis)?;
        tx.commit()?;
        Ok(())
    }

    pub fn load_analysis(&self, campaign_id: &str) -> SimResult<Option<AggregateAnalysis>> {
        let json: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT analysis_json FROM campaign WHERE campaign_id = ?1",
                params![campaign_id],
                |row| row.get(0),
            )
            .optional()?;
        match json {
            None => Err(SimError::CampaignNotFound { campaign_id: campaign_id.into() }),
            Some(None) => Ok(None),
            Some(Some(s)) => Ok(Some(serde_json::from_str(&s)?)),
        }
    }

    // ── Trials ─────────────────────────────────────────────────

    /// Persist a trial's terminal flags and final values.
    pub fn insert_trial(&self, campaign_id: &str, trial: &SimulationOutputs) -> SimResult<()> {
        insert_trial_row(&self.conn, campaign_id, trial)
    }

    /// Persist every recorded month of a trial.
    pub fn insert_month_rows(&mut self, campaign_id: &str, trial: &SimulationOutputs) -> SimResult<()> {
        let tx = self.conn.transaction()?;
        insert_month_rows_on(&tx, campaign_id, trial)?;
        tx.commit()?;
        Ok(())
    }

    pub fn trial_count(&self, campaign_id: &str) -> SimResult<i64> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM trial WHERE campaign_id = ?1",
            params![campaign_id],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    pub fn failure_count(&self, campaign_id: &str) -> SimResult<i64> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM trial WHERE campaign_id = ?1 AND ran_out_of_cash = 1",
            params![campaign_id],
            |row| row.get(0),
        )?;
        Ok(n)
    }

    pub fn month_row_count(&self, campaign_id: &str, trial_index: u64) -> SimResult<i64> {
        let n = self.conn.query_row(
            "SELECT COUNT(*) FROM trial_month WHERE campaign_id = ?1 AND trial_index = ?2",
            params![campaign_id, trial_index as i64],
            |row| row.get(0),
        )?;
        Ok(n)
    }
}

fn insert_campaign_row(
    conn: &Connection,
    campaign_id: &str,
    master_seed: u64,
    trials: usize,
    config_json: &str,
    created_at: &str,
) -> SimResult<()> {
    conn.execute(
        "INSERT INTO campaign (campaign_id, master_seed, trials, config_json, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![campaign_id, master_seed as i64, trials as i64, config_json, created_at],
    )?;
    Ok(())
}

fn update_analysis(conn: &Connection, campaign_id: &str, analysis: &AggregateAnalysis) -> SimResult<()> {
    let json = serde_json::to_string(analysis)?;
    let updated = conn.execute(
        "UPDATE campaign SET analysis_json = ?2 WHERE campaign_id = ?1",
        params![campaign_id, json],
    )?;
    if updated == 0 {
        return Err(SimError::CampaignNotFound { campaign_id: campaign_id.into() });
    }
    Ok(())
}

fn insert_trial_row(conn: &Connection, campaign_id: &str, trial: &SimulationOutputs) -> SimResult<()> {
    let last = trial.final_snapshot();
    conn.execute(
        "INSERT INTO trial (campaign_id, trial_index, seed, months_simulated,
             profitability_achieved, profitability_month, series_b_qualified,
             ran_out_of_cash, failure_month, final_cables, final_customers,
             final_arr, final_cash, final_team)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        params![
            campaign_id,
            trial.trial_index as i64,
            trial.seed as i64,
            trial.months_simulated() as i64,
            trial.profitability_achieved,
            trial.profitability_month,
            trial.series_b_qualified,
            trial.ran_out_of_cash,
            trial.failure_month,
            last.map(|s| s.cables_deployed as i64),
            last.map(|s| s.total_customers as i64),
            last.map(|s| s.arr),
            last.map(|s| s.cash_remaining),
            last.map(|s| s.team_size as i64),
        ],
    )?;
    Ok(())
}

fn insert_month_rows_on(conn: &Connection, campaign_id: &str, trial: &SimulationOutputs) -> SimResult<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO trial_month (campaign_id, trial_index, month, cables_deployed,
             total_customers, team_size, revenue, costs, gross_margin,
             cash_remaining, arr)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
    )?;
    for s in &trial.snapshots {
        stmt.execute(params![
            campaign_id,
            trial.trial_index as i64,
            s.month,
            s.cables_deployed as i64,
            s.total_customers as i64,
            s.team_size as i64,
            s.revenue,
            s.costs,
            s.gross_margin,
            s.cash_remaining,
            s.arr,
        ])?;
    }
    Ok(())
}
