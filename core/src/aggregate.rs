//! Aggregation — reduce a batch of finished trajectories to summary statistics.
//!
//! Pure reduction. Terminal metrics are read from each trial's last
//! recorded month, so trials that failed early contribute their value
//! at the failure month.

use crate::{
    error::{SimError, SimResult},
    outputs::{MonthSnapshot, SimulationOutputs},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MetricSummary {
    pub mean:   f64,
    pub median: f64,
    pub p10:    f64,
    pub p90:    f64,
}

impl MetricSummary {
    /// Summarize `values`. Returns None for an empty slice.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;
        Some(Self {
            mean,
            median: percentile(&sorted, 50.0),
            p10:    percentile(&sorted, 10.0),
            p90:    percentile(&sorted, 90.0),
        })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SuccessMetrics {
    pub profitability_rate:          f64,
    pub series_b_qualified_rate:     f64,
    pub failure_rate:                f64,
    pub avg_months_to_profitability: Option<f64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FinalMetrics {
    pub cables_deployed: MetricSummary,
    pub total_customers: MetricSummary,
    pub arr:             MetricSummary,
    pub cash_remaining:  MetricSummary,
    pub team_size:       MetricSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AggregateAnalysis {
    pub num_simulations: usize,
    pub success_metrics: SuccessMetrics,
    /// None only if no trial recorded a single month.
    pub final_metrics:   Option<FinalMetrics>,
}

/// Linear-interpolated percentile of an ascending slice. NaN if empty.
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let last = sorted.len() - 1;
    let rank = (pct / 100.0).clamp(0.0, 1.0) * last as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

pub fn analyze(results: &[SimulationOutputs]) -> SimResult<AggregateAnalysis> {
    if results.is_empty() {
        return Err(SimError::EmptyBatch);
    }
    let n = results.len() as f64;
    let rate = |pred: fn(&SimulationOutputs) -> bool| {
        results.iter().filter(|r| pred(r)).count() as f64 / n
    };

    let profit_months: Vec<f64> = results
        .iter()
        .filter_map(|r| r.profitability_month.map(f64::from))
        .collect();
    let avg_months_to_profitability = if profit_months.is_empty() {
        None
    } else {
        Some(profit_months.iter().sum::<f64>() / profit_months.len() as f64)
    };

    let finals: Vec<&MonthSnapshot> = results.iter().filter_map(|r| r.final_snapshot()).collect();
    let summarize = |metric: fn(&MonthSnapshot) -> f64| {
        let values: Vec<f64> = finals.iter().map(|s| metric(s)).collect();
        MetricSummary::from_values(&values)
    };
    let final_metrics = match (
        summarize(|s| s.cables_deployed as f64),
        summarize(|s| s.total_customers as f64),
        summarize(|s| s.arr),
        summarize(|s| s.cash_remaining),
        summarize(|s| s.team_size as f64),
    ) {
        (Some(cables_deployed), Some(total_customers), Some(arr), Some(cash_remaining), Some(team_size)) => {
            Some(FinalMetrics {
                cables_deployed,
                total_customers,
                arr,
                cash_remaining,
                team_size,
            })
        }
        _ => None,
    };

    Ok(AggregateAnalysis {
        num_simulations: results.len(),
        success_metrics: SuccessMetrics {
            profitability_rate:      rate(|r| r.profitability_achieved),
            series_b_qualified_rate: rate(|r| r.series_b_qualified),
            failure_rate:            rate(|r| r.ran_out_of_cash),
            avg_months_to_profitability,
        },
        final_metrics,
    })
}

/// Indices of the trials at the 10th, 50th and 90th positions when the
/// batch is ranked by terminal ARR. A trial with no months ranks at 0.
pub fn representative_trials(results: &[SimulationOutputs]) -> Vec<usize> {
    let mut ranked: Vec<(usize, f64)> = results
        .iter()
        .enumerate()
        .map(|(i, r)| (i, r.final_arr().unwrap_or(0.0)))
        .collect();
    // Stable sort: ties keep trial order.
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

    let n = ranked.len();
    [0.1, 0.5, 0.9]
        .iter()
        .map(|q| (n as f64 * q) as usize)
        .filter(|&pos| pos < n)
        .map(|pos| ranked[pos].0)
        .collect()
}
