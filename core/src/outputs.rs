//! Trial trajectories — the per-month history of one trial.
//!
//! RULE: Only the trial engine that owns a SimulationOutputs appends to it.
//! Once the trial terminates the value is never mutated again.

use crate::{
    cost_model::TeamBreakdown,
    segment::CustomerLedger,
    types::{Month, TrialIndex},
};
use serde::{Deserialize, Serialize};

pub const PROFITABILITY_MARGIN: f64 = 0.7;
pub const SERIES_B_MIN_ARR: f64 = 30_000_000.0;
pub const SERIES_B_MIN_MARGIN: f64 = 0.6;
pub const SERIES_B_MIN_CABLES: u64 = 15;

/// Margin recorded while there is no revenue yet.
pub const NO_REVENUE_MARGIN: f64 = -1.0;

/// (revenue - cost) / revenue, or NO_REVENUE_MARGIN when revenue is zero.
pub fn gross_margin(revenue: f64, cost: f64) -> f64 {
    if revenue > 0.0 {
        (revenue - cost) / revenue
    } else {
        NO_REVENUE_MARGIN
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct CostBreakdown {
    pub infrastructure:  f64,
    pub personnel:       f64,
    pub sales_marketing: f64,
    pub support:         f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.infrastructure + self.personnel + self.sales_marketing + self.support
    }
}

/// Everything recorded for one simulated month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthSnapshot {
    pub month:                Month,
    pub cables_deployed:      u64,
    pub cables_pending:       u64,
    pub customers_by_segment: CustomerLedger,
    pub total_customers:      u64,
    pub detection_accuracy:   f64,
    pub detections_per_day:   u64,
    pub system_uptime:        f64,
    pub regional_datacenters: u32,
    pub team_size:            u64,
    pub team_by_role:         TeamBreakdown,
    pub churn_rate:           f64,
    pub capex_committed:      f64,
    pub revenue:              f64,
    pub costs:                f64,
    pub costs_breakdown:      CostBreakdown,
    pub gross_margin:         f64,
    pub cash_remaining:       f64,
    pub arr:                  f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SimulationOutputs {
    pub trial_index: TrialIndex,
    pub seed:        u64,
    pub snapshots:   Vec<MonthSnapshot>,

    pub profitability_achieved: bool,
    pub profitability_month:    Option<Month>,
    pub series_b_qualified:     bool,
    pub ran_out_of_cash:        bool,
    pub failure_month:          Option<Month>,
}

impl SimulationOutputs {
    pub fn new(trial_index: TrialIndex, seed: u64) -> Self {
        Self {
            trial_index,
            seed,
            ..Self::default()
        }
    }

    /// Append a month and evaluate the terminal conditions.
    /// Returns true when the trial must stop (cash exhausted).
    pub fn record(&mut self, snapshot: MonthSnapshot) -> bool {
        let month = snapshot.month;
        let margin = snapshot.gross_margin;

        if !self.profitability_achieved
            && margin > PROFITABILITY_MARGIN
            && snapshot.revenue > snapshot.costs
        {
            self.profitability_achieved = true;
            self.profitability_month = Some(month);
        }

        if snapshot.arr > SERIES_B_MIN_ARR
            && margin > SERIES_B_MIN_MARGIN
            && snapshot.cables_deployed >= SERIES_B_MIN_CABLES
        {
            self.series_b_qualified = true;
        }

        let exhausted = snapshot.cash_remaining < 0.0;
        self.snapshots.push(snapshot);

        if exhausted {
            self.ran_out_of_cash = true;
            self.failure_month = Some(month);
        }
        exhausted
    }

    pub fn months_simulated(&self) -> usize {
        self.snapshots.len()
    }

    /// The last recorded month: the horizon, or the failure month.
    pub fn final_snapshot(&self) -> Option<&MonthSnapshot> {
        self.snapshots.last()
    }

    pub fn final_arr(&self) -> Option<f64> {
        self.final_snapshot().map(|s| s.arr)
    }

    pub fn cash_series(&self) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.cash_remaining).collect()
    }
}
