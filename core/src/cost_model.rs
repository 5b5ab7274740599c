//! Cost model — capital, infrastructure and payroll costs.
//!
//! Pure functions. No state survives between calls; every random
//! variation is drawn from the caller's TrialRng.

use crate::{
    config::{Architecture, StochasticParameters},
    rng::TrialRng,
};
use serde::{Deserialize, Serialize};

/// Deployed cables at which a regional datacenter becomes worthwhile.
pub const DATACENTER_CABLE_THRESHOLD: u64 = 8;
pub const DATACENTER_CAPEX: f64 = 2_000_000.0;

/// Constant coefficients for one architecture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchitectureProfile {
    pub edge_capex_per_cable:    f64,
    pub edge_opex_monthly:       f64,
    pub cloud_opex_per_cable:    f64,
    pub datacenter_opex_monthly: f64,
    pub uses_datacenter:         bool,
}

impl Architecture {
    pub fn profile(&self) -> ArchitectureProfile {
        match self {
            Self::GpuEdge => ArchitectureProfile {
                edge_capex_per_cable:    500_000.0,
                edge_opex_monthly:       10_800.0,
                cloud_opex_per_cable:    4_000.0,
                datacenter_opex_monthly: 0.0,
                uses_datacenter:         false,
            },
            Self::RegionalDatacenter => ArchitectureProfile {
                edge_capex_per_cable:    350_000.0,
                edge_opex_monthly:       2_500.0,
                cloud_opex_per_cable:    4_000.0,
                datacenter_opex_monthly: 16_700.0,
                uses_datacenter:         true,
            },
            Self::CloudOnly => ArchitectureProfile {
                edge_capex_per_cable:    250_000.0,
                edge_opex_monthly:       2_500.0,
                cloud_opex_per_cable:    15_000.0,
                datacenter_opex_monthly: 0.0,
                uses_datacenter:         false,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ArchitectureCosts {
    /// Capital cost of one more cable, after variation.
    pub capex_per_cable:  f64,
    /// One-time datacenter capex applicable at this scale (0 if none).
    pub datacenter_capex: f64,
    pub monthly_opex:     f64,
}

/// Capex per cable and total monthly infrastructure opex at `cables` scale.
pub fn architecture_costs(
    architecture: Architecture,
    cables: u64,
    params: &StochasticParameters,
    rng: &mut TrialRng,
) -> ArchitectureCosts {
    let profile = architecture.profile();
    let datacenter_active = profile.uses_datacenter && cables >= DATACENTER_CABLE_THRESHOLD;

    let variation = rng.normal(1.0, params.edge_capex_variation);
    let capex_per_cable = profile.edge_capex_per_cable * variation;

    let n = cables as f64;
    let datacenter_opex = if datacenter_active { profile.datacenter_opex_monthly } else { 0.0 };
    let monthly_opex =
        profile.edge_opex_monthly * n + datacenter_opex + profile.cloud_opex_per_cable * n;

    ArchitectureCosts {
        capex_per_cable,
        datacenter_capex: if datacenter_active { DATACENTER_CAPEX } else { 0.0 },
        monthly_opex,
    }
}

// ── Team ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    SignalProcessingMl,
    DataEngineering,
    CloudDevops,
    EdgeHardware,
    ProductEngineering,
}

impl TeamRole {
    pub const ALL: [TeamRole; 5] = [
        Self::SignalProcessingMl,
        Self::DataEngineering,
        Self::CloudDevops,
        Self::EdgeHardware,
        Self::ProductEngineering,
    ];

    pub fn share(&self) -> f64 {
        match self {
            Self::SignalProcessingMl => 0.25,
            Self::DataEngineering    => 0.20,
            Self::CloudDevops        => 0.20,
            Self::EdgeHardware       => 0.15,
            Self::ProductEngineering => 0.20,
        }
    }

    pub fn annual_salary(&self) -> f64 {
        match self {
            Self::SignalProcessingMl => 200_000.0,
            Self::DataEngineering    => 170_000.0,
            Self::CloudDevops        => 160_000.0,
            Self::EdgeHardware       => 150_000.0,
            Self::ProductEngineering => 165_000.0,
        }
    }

    /// Headcount for this role out of `team_size`, truncated.
    pub fn headcount(&self, team_size: u64) -> u64 {
        (team_size as f64 * self.share()) as u64
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamBreakdown {
    pub signal_processing_ml: u64,
    pub data_engineering:     u64,
    pub cloud_devops:         u64,
    pub edge_hardware:        u64,
    pub product_engineering:  u64,
}

impl TeamBreakdown {
    pub fn for_team(team_size: u64) -> Self {
        Self {
            signal_processing_ml: TeamRole::SignalProcessingMl.headcount(team_size),
            data_engineering:     TeamRole::DataEngineering.headcount(team_size),
            cloud_devops:         TeamRole::CloudDevops.headcount(team_size),
            edge_hardware:        TeamRole::EdgeHardware.headcount(team_size),
            product_engineering:  TeamRole::ProductEngineering.headcount(team_size),
        }
    }

    pub fn get(&self, role: TeamRole) -> u64 {
        match role {
            TeamRole::SignalProcessingMl => self.signal_processing_ml,
            TeamRole::DataEngineering    => self.data_engineering,
            TeamRole::CloudDevops        => self.cloud_devops,
            TeamRole::EdgeHardware       => self.edge_hardware,
            TeamRole::ProductEngineering => self.product_engineering,
        }
    }

    /// Headcount actually on payroll. May be below the team size:
    /// the truncated remainder is not reassigned.
    pub fn total(&self) -> u64 {
        TeamRole::ALL.iter().map(|r| self.get(*r)).sum()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TeamCosts {
    pub monthly_cost: f64,
    pub breakdown:    TeamBreakdown,
}

/// Monthly payroll for `team_size`, one salary variation draw per role.
pub fn team_costs(team_size: u64, params: &StochasticParameters, rng: &mut TrialRng) -> TeamCosts {
    let breakdown = TeamBreakdown::for_team(team_size);
    let monthly_cost = TeamRole::ALL
        .iter()
        .map(|role| {
            let salary = role.annual_salary() * rng.normal(1.0, params.salary_variation);
            (salary / 12.0) * breakdown.get(*role) as f64
        })
        .sum::<f64>();
    TeamCosts { monthly_cost, breakdown }
}
