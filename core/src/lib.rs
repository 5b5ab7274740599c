//! Monte Carlo engine for a distributed-acoustic-sensing cable business.
//!
//! One trial simulates the business month by month (deployments,
//! customers, costs, cash). The driver runs many independent trials
//! and the aggregator turns their trajectories into risk statistics.

pub mod aggregate;
pub mod config;
pub mod cost_model;
pub mod demand_model;
pub mod deployment;
pub mod error;
pub mod monte_carlo;
pub mod outputs;
pub mod rng;
pub mod segment;
pub mod state;
pub mod store;
pub mod trial;
pub mod types;
