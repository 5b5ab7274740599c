//! Cost and demand model tests — Phase 1 economics.

use das_mc_core::{
    config::{Architecture, ConversionRates, NormalParam, SegmentPricing, StochasticParameters},
    cost_model::{architecture_costs, team_costs, TeamBreakdown, TeamRole, DATACENTER_CAPEX},
    demand_model::{acquire_customers, apply_churn, monthly_revenue, price_erosion, sales_ramp},
    rng::TrialRng,
    segment::{CustomerLedger, CustomerSegment},
};

fn flat_params() -> StochasticParameters {
    StochasticParameters {
        edge_capex_variation: 0.0,
        salary_variation: 0.0,
        ..StochasticParameters::default()
    }
}

#[test]
fn architecture_coefficients() {
    let params = flat_params();
    let mut rng = TrialRng::new(0, 0);

    let a = architecture_costs(Architecture::GpuEdge, 2, &params, &mut rng);
    assert_eq!(a.capex_per_cable, 500_000.0);
    assert_eq!(a.monthly_opex, 2.0 * 10_800.0 + 2.0 * 4_000.0);
    assert_eq!(a.datacenter_capex, 0.0);

    let c = architecture_costs(Architecture::CloudOnly, 10, &params, &mut rng);
    assert_eq!(c.capex_per_cable, 250_000.0);
    assert_eq!(c.monthly_opex, 10.0 * 2_500.0 + 10.0 * 15_000.0);
}

#[test]
fn regional_datacenter_costs_start_at_eight_cables() {
    let params = flat_params();
    let mut rng = TrialRng::new(0, 0);

    let below = architecture_costs(Architecture::RegionalDatacenter, 7, &params, &mut rng);
    assert_eq!(below.monthly_opex, 7.0 * 2_500.0 + 7.0 * 4_000.0);
    assert_eq!(below.datacenter_capex, 0.0);

    let at = architecture_costs(Architecture::RegionalDatacenter, 8, &params, &mut rng);
    assert_eq!(at.capex_per_cable, 350_000.0);
    assert_eq!(at.monthly_opex, 8.0 * 2_500.0 + 16_700.0 + 8.0 * 4_000.0);
    assert_eq!(at.datacenter_capex, DATACENTER_CAPEX);
}

#[test]
fn capex_variation_is_centred_on_nominal() {
    let params = StochasticParameters::default();
    let mut rng = TrialRng::new(5, 5);
    let n = 4_000;
    let mean = (0..n)
        .map(|_| architecture_costs(Architecture::CloudOnly, 1, &params, &mut rng).capex_per_cable)
        .sum::<f64>()
        / n as f64;
    assert!(
        (mean - 250_000.0).abs() < 5_000.0,
        "mean capex {mean:.0} drifted from nominal"
    );
}

#[test]
fn team_partition_truncates_and_drops_remainder() {
    let ten = TeamBreakdown::for_team(10);
    assert_eq!(ten.get(TeamRole::SignalProcessingMl), 2);
    assert_eq!(ten.get(TeamRole::DataEngineering), 2);
    assert_eq!(ten.get(TeamRole::CloudDevops), 2);
    assert_eq!(ten.get(TeamRole::EdgeHardware), 1);
    assert_eq!(ten.get(TeamRole::ProductEngineering), 2);
    assert_eq!(ten.total(), 9, "the truncated remainder is not reassigned");

    assert_eq!(TeamBreakdown::for_team(3).total(), 0);
    assert_eq!(TeamBreakdown::for_team(0).total(), 0);
}

#[test]
fn payroll_without_variation() {
    let params = flat_params();
    let mut rng = TrialRng::new(0, 0);
    let costs = team_costs(10, &params, &mut rng);
    let annual = 2.0 * 200_000.0 + 2.0 * 170_000.0 + 2.0 * 160_000.0 + 150_000.0 + 2.0 * 165_000.0;
    assert!((costs.monthly_cost - annual / 12.0).abs() < 1e-6);
    assert_eq!(costs.breakdown, TeamBreakdown::for_team(10));
}

#[test]
fn ramp_and_erosion_curves() {
    assert_eq!(sales_ramp(0), 0.0);
    assert_eq!(sales_ramp(6), 0.5);
    assert_eq!(sales_ramp(12), 1.0);
    assert_eq!(sales_ramp(30), 1.0);

    assert_eq!(price_erosion(0, 0.1), 1.0);
    assert!((price_erosion(12, 0.1) - 0.9).abs() < 1e-12);
    assert!((price_erosion(24, 0.1) - 0.81).abs() < 1e-12);
    assert_eq!(price_erosion(24, 0.0), 1.0);
}

#[test]
fn no_acquisition_before_sales_ramp_or_without_cables() {
    let params = StochasticParameters::default();
    let mut rng = TrialRng::new(0, 1);
    assert_eq!(acquire_customers(0, 30, &params, &mut rng).total(), 0);
    assert_eq!(acquire_customers(12, 0, &params, &mut rng).total(), 0);
}

#[test]
fn certain_conversion_wins_every_lead() {
    let params = StochasticParameters {
        conversion_rates: ConversionRates {
            port:          NormalParam::fixed(1.0),
            naval:         NormalParam::fixed(1.0),
            environmental: NormalParam::fixed(1.0),
            shipping:      NormalParam::fixed(1.0),
            insurance:     NormalParam::fixed(1.0),
        },
        ..StochasticParameters::default()
    };
    let mut rng = TrialRng::new(0, 2);
    // Half ramp at month 6: leads = per-cable × 4 cables × 0.5
    let won = acquire_customers(6, 4, &params, &mut rng);
    assert_eq!(won.get(CustomerSegment::PortAuthority), 8);
    assert_eq!(won.get(CustomerSegment::NavalMilitary), 2);
    assert_eq!(won.get(CustomerSegment::Environmental), 6);
    assert_eq!(won.get(CustomerSegment::ShippingCompany), 4);
    assert_eq!(won.get(CustomerSegment::Insurance), 4);
}

#[test]
fn churn_never_grows_a_segment() {
    let params = StochasticParameters {
        churn_rate_monthly: NormalParam::new(0.5, 0.5),
        ..StochasticParameters::default()
    };
    let start = CustomerLedger::default()
        .with(CustomerSegment::PortAuthority, 40)
        .with(CustomerSegment::NavalMilitary, 3);
    let mut rng = TrialRng::new(0, 3);
    for _ in 0..100 {
        let (after, rate) = apply_churn(start, &params, &mut rng);
        assert!((0.0..=0.1).contains(&rate));
        for (segment, count) in after.iter() {
            assert!(count <= start.get(segment));
        }
    }
}

#[test]
fn revenue_sums_segment_prices() {
    let ledger = CustomerLedger::default()
        .with(CustomerSegment::NavalMilitary, 1)
        .with(CustomerSegment::ShippingCompany, 3);
    let pricing = SegmentPricing::default();
    assert_eq!(monthly_revenue(&ledger, &pricing, 1.0), 500_000.0 + 30_000.0);
    assert_eq!(monthly_revenue(&ledger, &pricing, 0.5), 265_000.0);
}
