//! Demand model — customer acquisition, churn and revenue.
//!
//! Every call draws fresh from the trial's RNG. Nothing is memoized.

use crate::{
    config::{SegmentPricing, StochasticParameters},
    rng::TrialRng,
    segment::{CustomerLedger, CustomerSegment},
    types::Month,
};

/// Months until the sales function reaches full effectiveness.
pub const SALES_RAMP_MONTHS: f64 = 12.0;
pub const MAX_MONTHLY_CHURN: f64 = 0.1;

/// Sales effectiveness in [0, 1]: linear from 0 at month 0 to 1 at month 12.
pub fn sales_ramp(month: Month) -> f64 {
    (month as f64 / SALES_RAMP_MONTHS).min(1.0)
}

/// Price multiplier after `month` months of competitive pressure.
pub fn price_erosion(month: Month, annual_pressure: f64) -> f64 {
    (1.0 - annual_pressure).powf(month as f64 / 12.0)
}

/// New customers won this month, per segment.
///
/// Draw order per segment: conversion rate, then the binomial.
pub fn acquire_customers(
    month: Month,
    cables_deployed: u64,
    params: &StochasticParameters,
    rng: &mut TrialRng,
) -> CustomerLedger {
    let ramp = sales_ramp(month);
    CustomerSegment::ALL
        .iter()
        .fold(CustomerLedger::default(), |ledger, &segment| {
            let conversion = params.conversion_rates.for_segment(segment);
            let rate = rng.normal(conversion.mean, conversion.std).max(0.0);
            let leads = (segment.leads_per_cable() * cables_deployed as f64 * ramp) as u64;
            ledger.with(segment, rng.binomial(leads, rate))
        })
}

/// Draw this month's churn rate, clamped to [0, MAX_MONTHLY_CHURN].
pub fn draw_churn_rate(params: &StochasticParameters, rng: &mut TrialRng) -> f64 {
    let churn = params.churn_rate_monthly;
    rng.normal_clamped(churn.mean, churn.std, 0.0, MAX_MONTHLY_CHURN)
}

/// Apply one month of churn. Returns the survivors and the rate used.
pub fn apply_churn(
    customers: CustomerLedger,
    params: &StochasticParameters,
    rng: &mut TrialRng,
) -> (CustomerLedger, f64) {
    let rate = draw_churn_rate(params, rng);
    let survivors = CustomerSegment::ALL
        .iter()
        .fold(customers, |ledger, &segment| {
            let count = ledger.get(segment);
            let churned = rng.binomial(count, rate);
            ledger.with(segment, count.saturating_sub(churned))
        });
    (survivors, rate)
}

/// Monthly revenue from the ledger at the given price erosion factor.
pub fn monthly_revenue(customers: &CustomerLedger, pricing: &SegmentPricing, erosion: f64) -> f64 {
    customers
        .iter()
        .map(|(segment, count)| pricing.price(segment) * count as f64 * erosion)
        .sum()
}
