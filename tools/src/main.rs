//! sim-runner: headless Monte Carlo campaign runner.
//!
//! Usage:
//!   sim-runner --trials 1000 --seed 0
//!   sim-runner --config campaign.json --json report.json --db results.db
//!   sim-runner --trials 200 --sequential --db results.db --month-rows

use anyhow::Result;
use das_mc_core::{
    aggregate::{self, AggregateAnalysis, MetricSummary},
    config::CampaignConfig,
    monte_carlo::MonteCarloDriver,
    outputs::SimulationOutputs,
    store::{CampaignRecord, ResultsStore},
};
use std::env;

#[derive(serde::Serialize)]
struct RunReport<'a> {
    campaign_id:         &'a str,
    created_at:          &'a str,
    config:              &'a CampaignConfig,
    analysis:            &'a AggregateAnalysis,
    sample_trajectories: Vec<&'a SimulationOutputs>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut config = match flag_value(&args, "--config") {
        Some(path) => CampaignConfig::load(path)?,
        None => CampaignConfig::default(),
    };
    config.trials = parse_arg(&args, "--trials", config.trials);
    config.master_seed = parse_arg(&args, "--seed", config.master_seed);
    let sequential = args.iter().any(|a| a == "--sequential");
    let month_rows = args.iter().any(|a| a == "--month-rows");
    let json_out = flag_value(&args, "--json");
    let db = flag_value(&args, "--db");

    let campaign_id = uuid::Uuid::new_v4().to_string();
    let created_at = chrono::Utc::now().to_rfc3339();

    println!("DAS Monte Carlo — sim-runner");
    println!("  campaign:     {campaign_id}");
    println!("  architecture: {}", config.inputs.architecture.code());
    println!("  trials:       {}", config.trials);
    println!("  months:       {}", config.inputs.simulation_months);
    println!("  seed:         {}", config.master_seed);
    println!();

    let driver = MonteCarloDriver::from_campaign(&config)?;
    let results = if sequential {
        driver.run_sequential(config.trials)?
    } else {
        driver.run(config.trials)?
    };
    let analysis = aggregate::analyze(&results)?;

    print_summary(&analysis);

    if let Some(path) = json_out {
        let report = RunReport {
            campaign_id: &campaign_id,
            created_at:  &created_at,
            config:      &config,
            analysis:    &analysis,
            sample_trajectories: aggregate::representative_trials(&results)
                .into_iter()
                .map(|i| &results[i])
                .collect(),
        };
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        println!("  report written to {path}");
    }

    if let Some(path) = db {
        persist(path, &campaign_id, &created_at, &config, &results, &analysis, month_rows)?;
        println!("  results stored in {path}");
    }

    Ok(())
}

fn persist(
    path: &str,
    campaign_id: &str,
    created_at: &str,
    config: &CampaignConfig,
    results: &[SimulationOutputs],
    analysis: &AggregateAnalysis,
    month_rows: bool,
) -> Result<()> {
    let mut store = ResultsStore::open(path)?;
    store.migrate()?;
    let config_json = serde_json::to_string(config)?;
    store.insert_campaign_results(&CampaignRecord {
        campaign_id,
        master_seed: config.master_seed,
        config_json: &config_json,
        created_at,
        results,
        analysis,
        month_rows,
    })?;
    log::info!(
        "sim-runner: stored {} trials ({} failed) for campaign {campaign_id}",
        store.trial_count(campaign_id)?,
        store.failure_count(campaign_id)?
    );
    Ok(())
}

fn print_summary(analysis: &AggregateAnalysis) {
    let s = &analysis.success_metrics;
    println!("=== CAMPAIGN SUMMARY ===");
    println!("  trials:              {}", analysis.num_simulations);
    println!("  profitability rate:  {:.1}%", s.profitability_rate * 100.0);
    println!("  series B rate:       {:.1}%", s.series_b_qualified_rate * 100.0);
    println!("  failure rate:        {:.1}%", s.failure_rate * 100.0);
    match s.avg_months_to_profitability {
        Some(m) => println!("  months to profit:    {m:.1}"),
        None => println!("  months to profit:    (never)"),
    }

    println!();
    println!("=== FINAL METRICS (p10 / median / p90, mean) ===");
    let Some(f) = &analysis.final_metrics else {
        println!("  (No months recorded)");
        return;
    };
    print_metric("cables", &f.cables_deployed);
    print_metric("customers", &f.total_customers);
    print_metric("ARR $", &f.arr);
    print_metric("cash $", &f.cash_remaining);
    print_metric("team", &f.team_size);
}

fn print_metric(label: &str, m: &MetricSummary) {
    println!(
        "  {label:<10} {:>14.0} / {:>14.0} / {:>14.0}   mean {:.0}",
        m.p10, m.median, m.p90, m.mean
    );
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
