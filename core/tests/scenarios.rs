//! Hand-built campaigns whose outcome is known in advance.

use das_mc_core::{
    config::{Architecture, NormalParam, OverheadCosts, SimulationInputs, StochasticParameters},
    cost_model::DATACENTER_CAPEX,
    monte_carlo::MonteCarloDriver,
    segment::{CustomerLedger, CustomerSegment},
};

fn run(inputs: SimulationInputs, params: StochasticParameters, trials: usize) -> Vec<das_mc_core::outputs::SimulationOutputs> {
    MonteCarloDriver::new(inputs, params)
        .expect("valid configuration")
        .run(trials)
        .expect("campaign runs")
}

/// Targets pinned to the starting fleet and a flat team multiplier.
#[test]
fn zero_growth_keeps_fleet_and_team_constant() {
    let inputs = SimulationInputs {
        series_a_funding: 50_000_000.0,
        target_cables_month_6: 3,
        target_cables_month_12: 3,
        target_cables_month_18: 3,
        team_growth_rate: 1.0,
        ..SimulationInputs::default()
    };
    for r in run(inputs, StochasticParameters::default(), 25) {
        for s in &r.snapshots {
            assert_eq!(s.cables_deployed, 3, "month {}", s.month);
            assert_eq!(s.cables_pending, 0, "month {}", s.month);
            assert_eq!(s.capex_committed, 0.0, "month {}", s.month);
            assert_eq!(s.team_size, 5, "month {}", s.month);
        }
    }
}

/// Funding below the initial fleet's capex and no customers: dead at month 0.
#[test]
fn underfunded_campaign_fails_in_the_first_month() {
    let inputs = SimulationInputs {
        series_a_funding: 100_000.0,
        cloud_credits_secured: 0.0,
        ..SimulationInputs::default()
    };
    let params = StochasticParameters {
        edge_capex_variation: 0.0,
        ..StochasticParameters::default()
    };
    for r in run(inputs, params, 25) {
        assert!(r.ran_out_of_cash);
        assert_eq!(r.failure_month, Some(0));
        assert_eq!(r.snapshots.len(), 1);
        assert!(!r.profitability_achieved);
        assert_eq!(r.snapshots[0].total_customers, 0);
    }
}

/// No cost of any kind and a paying customer base from day one.
#[test]
fn costless_campaign_is_profitable_at_month_zero() {
    let inputs = SimulationInputs {
        series_a_funding: 1_000.0,
        cloud_credits_secured: 0.0,
        initial_cables: 0,
        target_cables_month_6: 0,
        target_cables_month_12: 0,
        target_cables_month_18: 0,
        initial_customers: CustomerLedger::default()
            .with(CustomerSegment::PortAuthority, 2)
            .with(CustomerSegment::Insurance, 1),
        overhead: OverheadCosts {
            sales_marketing_base: 0.0,
            sales_marketing_per_head: 0.0,
            support_per_cable: 0.0,
        },
        initial_team_size: 0,
        ..SimulationInputs::default()
    };
    let params = StochasticParameters {
        churn_rate_monthly: NormalParam::fixed(0.0),
        ..StochasticParameters::default()
    };
    for r in run(inputs, params, 25) {
        assert!(r.profitability_achieved);
        assert_eq!(r.profitability_month, Some(0));
        assert!(!r.ran_out_of_cash);
        let first = &r.snapshots[0];
        assert_eq!(first.costs, 0.0);
        assert_eq!(first.revenue, 2.0 * 35_000.0 + 25_000.0);
        assert_eq!(first.gross_margin, 1.0);
    }
}

#[test]
fn regional_datacenter_opens_once_at_threshold() {
    let inputs = SimulationInputs {
        architecture: Architecture::RegionalDatacenter,
        series_a_funding: 100_000_000.0,
        cloud_credits_secured: 0.0,
        initial_cables: 8,
        target_cables_month_6: 8,
        target_cables_month_12: 8,
        target_cables_month_18: 8,
        ..SimulationInputs::default()
    };
    let params = StochasticParameters {
        edge_capex_variation: 0.0,
        ..StochasticParameters::default()
    };
    let results = run(inputs, params, 5);
    for r in &results {
        assert!(r.snapshots.iter().all(|s| s.regional_datacenters == 1));
        // 8 × (edge 2,500 + cloud 4,000) + datacenter 16,700
        assert_eq!(r.snapshots[0].costs_breakdown.infrastructure, 68_700.0);

        let first = &r.snapshots[0];
        let expected_cash = 100_000_000.0 - 8.0 * 350_000.0 - DATACENTER_CAPEX
            + first.revenue
            - first.costs;
        assert!((first.cash_remaining - expected_cash).abs() < 1e-6);
    }
}

#[test]
fn other_architectures_never_build_a_datacenter() {
    for architecture in [Architecture::GpuEdge, Architecture::CloudOnly] {
        let inputs = SimulationInputs {
            architecture,
            series_a_funding: 200_000_000.0,
            ..SimulationInputs::default()
        };
        for r in run(inputs, StochasticParameters::default(), 5) {
            assert!(r.snapshots.iter().all(|s| s.regional_datacenters == 0));
        }
    }
}

#[test]
fn checkpoint_targets_are_reached_after_lead_time() {
    let inputs = SimulationInputs {
        series_a_funding: 200_000_000.0,
        ..SimulationInputs::default()
    };
    let params = StochasticParameters {
        cable_deployment_months: NormalParam::fixed(2.0),
        ..StochasticParameters::default()
    };
    for r in run(inputs, params, 5) {
        let cables: Vec<u64> = r.snapshots.iter().map(|s| s.cables_deployed).collect();
        assert_eq!(cables[5], 3);
        assert_eq!(cables[7], 3, "ordered at month 6, operational at month 8");
        assert_eq!(cables[8], 5);
        assert_eq!(cables[14], 15);
        assert_eq!(cables[20], 30);
    }
}

#[test]
fn team_grows_every_sixth_month() {
    let inputs = SimulationInputs {
        series_a_funding: 200_000_000.0,
        ..SimulationInputs::default()
    };
    let r = &run(inputs, StochasticParameters::default(), 1)[0];
    let team: Vec<u64> = r.snapshots.iter().map(|s| s.team_size).collect();
    // 5 → 7 → 10 → 15, truncating each time
    assert_eq!(team[0], 5);
    assert_eq!(team[5], 5);
    assert_eq!(team[6], 7);
    assert_eq!(team[12], 10);
    assert_eq!(team[18], 15);
    assert_eq!(team[23], 15);
}

/// The growth rate is a multiplier: below 1.0 the team shrinks.
#[test]
fn growth_rate_below_one_shrinks_the_team() {
    for (rate, expected) in [(0.5, [5u64, 2, 1, 0]), (0.0, [5, 0, 0, 0])] {
        let inputs = SimulationInputs {
            series_a_funding: 200_000_000.0,
            team_growth_rate: rate,
            ..SimulationInputs::default()
        };
        let r = &run(inputs, StochasticParameters::default(), 1)[0];
        let team: Vec<u64> = r.snapshots.iter().map(|s| s.team_size).collect();
        assert_eq!([team[5], team[6], team[12], team[18]], expected, "rate {rate}");
    }
}
