//! Monte Carlo driver — N independent trials of one configuration.
//!
//! RULES:
//!   - Configuration is validated before any trial starts.
//!   - Trial i always draws from RngBank::for_trial(i), whatever thread runs it.
//!   - Trials share nothing but the read-only configuration.
//!   - Results come back in trial-index order, parallel or not.

use crate::{
    aggregate::{self, AggregateAnalysis},
    config::{CampaignConfig, SimulationInputs, StochasticParameters},
    error::{SimError, SimResult},
    outputs::SimulationOutputs,
    rng::RngBank,
    trial::TrialEngine,
    types::TrialIndex,
};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::{Deserialize, Serialize};

/// A finished campaign: every trajectory plus their aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignResult {
    pub trials:   Vec<SimulationOutputs>,
    pub analysis: AggregateAnalysis,
}

pub struct MonteCarloDriver {
    inputs:   SimulationInputs,
    params:   StochasticParameters,
    rng_bank: RngBank,
}

impl MonteCarloDriver {
    /// Validate the configuration and build a driver with master seed 0,
    /// so trial i's stream depends on i alone.
    pub fn new(inputs: SimulationInputs, params: StochasticParameters) -> SimResult<Self> {
        inputs.validate()?;
        params.validate()?;
        Ok(Self {
            inputs,
            params,
            rng_bank: RngBank::new(0),
        })
    }

    pub fn from_campaign(config: &CampaignConfig) -> SimResult<Self> {
        config.validate()?;
        Ok(Self::new(config.inputs.clone(), config.params.clone())?
            .with_master_seed(config.master_seed))
    }

    pub fn with_master_seed(mut self, master_seed: u64) -> Self {
        self.rng_bank = RngBank::new(master_seed);
        self
    }

    pub fn inputs(&self) -> &SimulationInputs {
        &self.inputs
    }

    pub fn params(&self) -> &StochasticParameters {
        &self.params
    }

    /// Run a single trial by index.
    pub fn run_trial(&self, trial_index: TrialIndex) -> SimulationOutputs {
        TrialEngine::new(&self.inputs, &self.params).run(self.rng_bank.for_trial(trial_index))
    }

    /// Run `trials` trials across the rayon thread pool.
    pub fn run(&self, trials: usize) -> SimResult<Vec<SimulationOutputs>> {
        check_trial_count(trials)?;
        log::info!(
            "monte_carlo: running {trials} trials (architecture {}, {} months, master seed {})",
            self.inputs.architecture.code(),
            self.inputs.simulation_months,
            self.rng_bank.master_seed()
        );
        let results: Vec<SimulationOutputs> = (0..trials as TrialIndex)
            .into_par_iter()
            .map(|i| self.run_trial(i))
            .collect();
        log_finished(&results);
        Ok(results)
    }

    /// Run `trials` trials one after another on the calling thread.
    pub fn run_sequential(&self, trials: usize) -> SimResult<Vec<SimulationOutputs>> {
        check_trial_count(trials)?;
        log::info!("monte_carlo: running {trials} trials sequentially");
        let results: Vec<SimulationOutputs> =
            (0..trials as TrialIndex).map(|i| self.run_trial(i)).collect();
        log_finished(&results);
        Ok(results)
    }

    /// Run in parallel and aggregate.
    pub fn run_and_analyze(&self, trials: usize) -> SimResult<CampaignResult> {
        let trials = self.run(trials)?;
        let analysis = aggregate::analyze(&trials)?;
        Ok(CampaignResult { trials, analysis })
    }
}

fn check_trial_count(trials: usize) -> SimResult<()> {
    if trials == 0 {
        return Err(SimError::InvalidTrialCount { requested: trials });
    }
    Ok(())
}

fn log_finished(results: &[SimulationOutputs]) {
    let failed = results.iter().filter(|r| r.ran_out_of_cash).count();
    log::info!(
        "monte_carlo: {} trials finished, {failed} ran out of cash",
        results.len()
    );
}
