//! The trial engine — one realization of the business, month by month.
//!
//! EXECUTION ORDER within a month (fixed, never reordered; later steps
//! read the deployment count and team size produced by earlier ones):
//!   1. Deployment settlement
//!   2. Deployment planning       (capex paid at commitment)
//!   3. Regional datacenter trigger
//!   4. Customer acquisition
//!   5. Churn
//!   6. Revenue
//!   7. Costs
//!   8. Cash update
//!   9. Technical metrics
//!  10. Team growth
//!  11. Snapshot and terminal checks (SimulationOutputs::record)
//!
//! RULES:
//!   - Each step takes the MonthlyState by value and returns the next one.
//!   - All randomness flows through the trial's own TrialRng.
//!   - Running out of cash ends the trial; it is an outcome, not an error.

use crate::{
    config::{Architecture, SimulationInputs, StochasticParameters},
    cost_model::{self, TeamBreakdown, DATACENTER_CABLE_THRESHOLD, DATACENTER_CAPEX},
    demand_model,
    outputs::{gross_margin, CostBreakdown, MonthSnapshot, SimulationOutputs},
    rng::TrialRng,
    segment::CustomerLedger,
    state::MonthlyState,
    deployment::DeploymentQueue,
};

/// Vessel passages per cable per day.
pub const PASSAGES_PER_CABLE_PER_DAY: f64 = 50.0;
pub const MIN_DETECTION_ACCURACY: f64 = 0.8;
pub const MIN_SYSTEM_UPTIME: f64 = 0.9;
pub const TEAM_GROWTH_INTERVAL_MONTHS: u32 = 6;

/// Revenue and cost accrued in one month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Accrual {
    pub revenue:      f64,
    pub costs:        CostBreakdown,
    pub team_by_role: TeamBreakdown,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TechnicalMetrics {
    pub detection_accuracy: f64,
    pub system_uptime:      f64,
    pub detections_per_day: u64,
}

/// Result of one month: the state entering the next month and the record.
#[derive(Debug, Clone)]
pub struct MonthTransition {
    pub state:    MonthlyState,
    pub snapshot: MonthSnapshot,
}

pub struct TrialEngine<'a> {
    inputs: &'a SimulationInputs,
    params: &'a StochasticParameters,
}

impl<'a> TrialEngine<'a> {
    pub fn new(inputs: &'a SimulationInputs, params: &'a StochasticParameters) -> Self {
        Self { inputs, params }
    }

    fn architecture(&self) -> Architecture {
        self.inputs.architecture
    }

    /// Month-0 state: funding less reserved credits and the initial cables' capex.
    pub fn initial_state(&self, rng: &mut TrialRng) -> MonthlyState {
        let per_cable = cost_model::architecture_costs(self.architecture(), 1, self.params, rng)
            .capex_per_cable;
        let initial_capex = per_cable * self.inputs.initial_cables as f64;

        MonthlyState {
            month:                0,
            cash:                 self.inputs.series_a_funding
                                      - self.inputs.cloud_credits_secured
                                      - initial_capex,
            cables_deployed:      self.inputs.initial_cables,
            customers:            self.inputs.initial_customers,
            team_size:            self.inputs.initial_team_size,
            regional_datacenters: 0,
            deployment_queue:     DeploymentQueue::default(),
        }
    }

    /// Run the trial to the horizon or until cash runs out.
    pub fn run(&self, mut rng: TrialRng) -> SimulationOutputs {
        let mut outputs = SimulationOutputs::new(rng.trial_index, rng.seed);
        let mut state = self.initial_state(&mut rng);

        for _ in 0..self.inputs.simulation_months {
            let MonthTransition { state: next, snapshot } = self.step(state, &mut rng);
            let month = snapshot.month;
            let already_profitable = outputs.profitability_achieved;

            if outputs.record(snapshot) {
                log::debug!(
                    "trial={} month={month} trial: cash exhausted ({:.0})",
                    outputs.trial_index,
                    next.cash
                );
                break;
            }
            if !already_profitable && outputs.profitability_achieved {
                log::debug!("trial={} month={month} trial: profitability reached", outputs.trial_index);
            }
            state = next;
        }
        outputs
    }

    /// Advance one month through steps 1-10 and build its snapshot.
    pub fn step(&self, state: MonthlyState, rng: &mut TrialRng) -> MonthTransition {
        let month = state.month;

        let state = settle_deployments(state);
        let (state, capex_committed) = self.plan_deployments(state, rng);
        let state = self.open_regional_datacenter(state);
        let state = self.acquire_customers(state, rng);
        let (state, churn_rate) = self.apply_churn(state, rng);
        let accrual = self.accrue(&state, rng);
        let state = apply_cash_flow(state, &accrual);
        let technical = self.measure(&state, rng);
        let state = self.grow_team(state);

        let revenue = accrual.revenue;
        let costs = accrual.costs.total();
        let snapshot = MonthSnapshot {
            month,
            cables_deployed:      state.cables_deployed,
            cables_pending:       state.deployment_queue.len() as u64,
            customers_by_segment: state.customers,
            total_customers:      state.customers.total(),
            detection_accuracy:   technical.detection_accuracy,
            detections_per_day:   technical.detections_per_day,
            system_uptime:        technical.system_uptime,
            regional_datacenters: state.regional_datacenters,
            team_size:            state.team_size,
            team_by_role:         accrual.team_by_role,
            churn_rate,
            capex_committed,
            revenue,
            costs,
            costs_breakdown:      accrual.costs,
            gross_margin:         gross_margin(revenue, costs),
            cash_remaining:       state.cash,
            arr:                  revenue * 12.0,
        };

        log::trace!(
            "month={month} trial: cables={} customers={} revenue={revenue:.0} cost={costs:.0} cash={:.0}",
            snapshot.cables_deployed,
            snapshot.total_customers,
            snapshot.cash_remaining
        );

        MonthTransition {
            state: MonthlyState { month: month + 1, ..state },
            snapshot,
        }
    }

    /// Step 2: enqueue the shortfall against the current target.
    /// Returns the capex committed this month.
    pub fn plan_deployments(&self, state: MonthlyState, rng: &mut TrialRng) -> (MonthlyState, f64) {
        let target = self.inputs.target_cables(state.month);
        let shortfall = target.saturating_sub(state.committed_cables());
        let lead = self.params.cable_deployment_months;

        let mut queue = state.deployment_queue;
        let mut committed = 0.0;
        for _ in 0..shortfall {
            // Truncate toward zero; a cable is never scheduled before it is ordered.
            let lead_months = rng.normal(lead.mean, lead.std).max(0.0) as u32;
            let capex = cost_model::architecture_costs(self.architecture(), 1, self.params, rng)
                .capex_per_cable;
            queue = queue.enqueue(state.month, lead_months, capex);
            committed += capex;
        }

        let next = MonthlyState {
            cash: state.cash - committed,
            deployment_queue: queue,
            ..state
        };
        (next, committed)
    }

    /// Step 3: build the regional datacenter the first time the threshold is met.
    pub fn open_regional_datacenter(&self, state: MonthlyState) -> MonthlyState {
        let due = self.architecture() == Architecture::RegionalDatacenter
            && state.cables_deployed >= DATACENTER_CABLE_THRESHOLD
            && state.regional_datacenters == 0;
        if !due {
            return state;
        }
        log::debug!(
            "month={} trial: regional datacenter opened at {} cables",
            state.month,
            state.cables_deployed
        );
        MonthlyState {
            cash: state.cash - DATACENTER_CAPEX,
            regional_datacenters: 1,
            ..state
        }
    }

    /// Step 4.
    pub fn acquire_customers(&self, state: MonthlyState, rng: &mut TrialRng) -> MonthlyState {
        let won: CustomerLedger =
            demand_model::acquire_customers(state.month, state.cables_deployed, self.params, rng);
        MonthlyState {
            customers: state.customers.merged(won),
            ..state
        }
    }

    /// Step 5. Returns the churn rate drawn.
    pub fn apply_churn(&self, state: MonthlyState, rng: &mut TrialRng) -> (MonthlyState, f64) {
        let (customers, rate) = demand_model::apply_churn(state.customers, self.params, rng);
        (MonthlyState { customers, ..state }, rate)
    }

    /// Steps 6 and 7: revenue and cost for the month.
    pub fn accrue(&self, state: &MonthlyState, rng: &mut TrialRng) -> Accrual {
        let erosion =
            demand_model::price_erosion(state.month, self.params.competitive_pressure_annual);
        let revenue = demand_model::monthly_revenue(&state.customers, &self.inputs.pricing, erosion);

        let infra = cost_model::architecture_costs(
            self.architecture(),
            state.cables_deployed,
            self.params,
            rng,
        );
        let team = cost_model::team_costs(state.team_size, self.params, rng);
        let overhead = &self.inputs.overhead;

        Accrual {
            revenue,
            costs: CostBreakdown {
                infrastructure:  infra.monthly_opex,
                personnel:       team.monthly_cost,
                sales_marketing: overhead.sales_marketing_base
                    + overhead.sales_marketing_per_head * state.team_size as f64,
                support:         overhead.support_per_cable * state.cables_deployed as f64,
            },
            team_by_role: team.breakdown,
        }
    }

    /// Step 9.
    pub fn measure(&self, state: &MonthlyState, rng: &mut TrialRng) -> TechnicalMetrics {
        let acc = self.params.detection_accuracy;
        let detection_accuracy = rng.normal_clamped(acc.mean, acc.std, MIN_DETECTION_ACCURACY, 1.0);
        let up = self.params.system_uptime;
        let system_uptime = rng.normal_clamped(up.mean, up.std, MIN_SYSTEM_UPTIME, 1.0);

        let expected = (PASSAGES_PER_CABLE_PER_DAY
            * state.cables_deployed as f64
            * detection_accuracy) as u64 as f64;
        let detections_per_day = rng.normal(expected, expected * 0.1).max(0.0) as u64;

        TechnicalMetrics {
            detection_accuracy,
            system_uptime,
            detections_per_day,
        }
    }

    /// Step 10: every sixth month the team is multiplied and truncated.
    pub fn grow_team(&self, state: MonthlyState) -> MonthlyState {
        if state.month == 0 || state.month % TEAM_GROWTH_INTERVAL_MONTHS != 0 {
            return state;
        }
        let team_size = (state.team_size as f64 * self.inputs.team_growth_rate) as u64;
        MonthlyState { team_size, ..state }
    }
}

/// Step 1: every queue entry due this month becomes a deployed cable.
pub fn settle_deployments(state: MonthlyState) -> MonthlyState {
    let (deployment_queue, settled) = state.deployment_queue.settle(state.month);
    MonthlyState {
        cables_deployed: state.cables_deployed + settled,
        deployment_queue,
        ..state
    }
}

/// Step 8.
pub fn apply_cash_flow(state: MonthlyState, accrual: &Accrual) -> MonthlyState {
    MonthlyState {
        cash: state.cash + accrual.revenue - accrual.costs.total(),
        ..state
    }
}
