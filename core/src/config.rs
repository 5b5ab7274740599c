//! Campaign configuration: strategic inputs and uncertain parameters.
//!
//! RULE: Configuration is immutable once a campaign starts.
//! Every trial reads the same SimulationInputs and StochasticParameters
//! by shared reference; nothing writes to them after validate().

use crate::{
    error::{SimError, SimResult},
    segment::{CustomerLedger, CustomerSegment},
    types::Month,
};
use serde::{Deserialize, Serialize};

// ── Architecture ───────────────────────────────────────────────────

/// Deployment strategy for processing cable data.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Architecture {
    /// GPU processing at every cable landing.
    #[serde(rename = "A")]
    GpuEdge,
    /// CPU at the edge plus one regional datacenter once scale justifies it.
    #[serde(rename = "B")]
    RegionalDatacenter,
    /// CPU at the edge, everything else in the cloud.
    #[serde(rename = "C")]
    CloudOnly,
}

impl Architecture {
    pub fn code(&self) -> &'static str {
        match self {
            Self::GpuEdge            => "A",
            Self::RegionalDatacenter => "B",
            Self::CloudOnly          => "C",
        }
    }
}

// ── Strategic inputs ───────────────────────────────────────────────

/// Monthly price per customer, by segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SegmentPricing {
    pub port:          f64,
    pub naval:         f64,
    pub environmental: f64,
    pub shipping:      f64,
    pub insurance:     f64,
}

impl SegmentPricing {
    pub fn price(&self, segment: CustomerSegment) -> f64 {
        match segment {
            CustomerSegment::PortAuthority   => self.port,
            CustomerSegment::NavalMilitary   => self.naval,
            CustomerSegment::Environmental   => self.environmental,
            CustomerSegment::ShippingCompany => self.shipping,
            CustomerSegment::Insurance       => self.insurance,
        }
    }
}

impl Default for SegmentPricing {
    fn default() -> Self {
        Self {
            port:          35_000.0,
            naval:         500_000.0,
            environmental: 10_000.0,
            shipping:      10_000.0,
            insurance:     25_000.0,
        }
    }
}

/// Overheads outside infrastructure and payroll.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OverheadCosts {
    pub sales_marketing_base:     f64,
    pub sales_marketing_per_head: f64,
    /// Monthly support cost per deployed cable.
    pub support_per_cable:        f64,
}

impl Default for OverheadCosts {
    fn default() -> Self {
        Self {
            sales_marketing_base:     50_000.0,
            sales_marketing_per_head: 5_000.0,
            // 5% of a nominal $10k cable value
            support_per_cable:        500.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationInputs {
    pub architecture:          Architecture,
    pub series_a_funding:      f64,
    /// Credits reserved at month 0; they never count as operating cash.
    pub cloud_credits_secured: f64,

    pub initial_cables:         u64,
    pub target_cables_month_6:  u64,
    pub target_cables_month_12: u64,
    pub target_cables_month_18: u64,

    pub pricing:           SegmentPricing,
    pub initial_customers: CustomerLedger,
    pub overhead:          OverheadCosts,

    pub initial_team_size: u64,
    /// Team multiplier applied every sixth month. A flat team is 1.0;
    /// anything below 1.0 shrinks it, and 0.0 empties it at month 6.
    pub team_growth_rate:  f64,

    pub simulation_months: Month,
}

impl Default for SimulationInputs {
    fn default() -> Self {
        Self {
            architecture:           Architecture::CloudOnly,
            series_a_funding:       10_000_000.0,
            cloud_credits_secured:  250_000.0,
            initial_cables:         3,
            target_cables_month_6:  5,
            target_cables_month_12: 15,
            target_cables_month_18: 30,
            pricing:                SegmentPricing::default(),
            initial_customers:      CustomerLedger::default(),
            overhead:               OverheadCosts::default(),
            initial_team_size:      5,
            team_growth_rate:       1.5,
            simulation_months:      24,
        }
    }
}

impl SimulationInputs {
    /// Target cable count for `month`: a step function over months 0/6/12/18.
    pub fn target_cables(&self, month: Month) -> u64 {
        match month {
            0..=5   => self.initial_cables,
            6..=11  => self.target_cables_month_6,
            12..=17 => self.target_cables_month_12,
            _       => self.target_cables_month_18,
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.simulation_months < 1 {
            return Err(SimError::invalid("simulation_months", "must be at least 1"));
        }
        non_negative("series_a_funding", self.series_a_funding)?;
        non_negative("cloud_credits_secured", self.cloud_credits_secured)?;
        non_negative("team_growth_rate", self.team_growth_rate)?;
        for segment in CustomerSegment::ALL {
            non_negative(
                &format!("pricing.{}", segment.name()),
                self.pricing.price(segment),
            )?;
        }
        non_negative("overhead.sales_marketing_base", self.overhead.sales_marketing_base)?;
        non_negative("overhead.sales_marketing_per_head", self.overhead.sales_marketing_per_head)?;
        non_negative("overhead.support_per_cable", self.overhead.support_per_cable)?;
        Ok(())
    }
}

// ── Stochastic parameters ──────────────────────────────────────────

/// Mean and standard deviation of a normally distributed quantity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct NormalParam {
    pub mean: f64,
    pub std:  f64,
}

impl NormalParam {
    pub const fn new(mean: f64, std: f64) -> Self {
        Self { mean, std }
    }

    /// Degenerate distribution: always `value`.
    pub const fn fixed(value: f64) -> Self {
        Self { mean: value, std: 0.0 }
    }

    fn validate(&self, field: &str) -> SimResult<()> {
        if !self.mean.is_finite() {
            return Err(SimError::invalid(field, "mean must be finite"));
        }
        if !self.std.is_finite() || self.std < 0.0 {
            return Err(SimError::invalid(field, "std must be finite and non-negative"));
        }
        Ok(())
    }
}

/// Lead-to-customer conversion rate distribution for each segment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConversionRates {
    pub port:          NormalParam,
    pub naval:         NormalParam,
    pub environmental: NormalParam,
    pub shipping:      NormalParam,
    pub insurance:     NormalParam,
}

impl ConversionRates {
    pub fn for_segment(&self, segment: CustomerSegment) -> NormalParam {
        match segment {
            CustomerSegment::PortAuthority   => self.port,
            CustomerSegment::NavalMilitary   => self.naval,
            CustomerSegment::Environmental   => self.environmental,
            CustomerSegment::ShippingCompany => self.shipping,
            CustomerSegment::Insurance       => self.insurance,
        }
    }
}

impl Default for ConversionRates {
    fn default() -> Self {
        Self {
            port:          NormalParam::new(0.25, 0.10),
            naval:         NormalParam::new(0.15, 0.05),
            environmental: NormalParam::new(0.30, 0.10),
            shipping:      NormalParam::new(0.20, 0.08),
            insurance:     NormalParam::new(0.15, 0.08),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StochasticParameters {
    pub detection_accuracy: NormalParam,

    /// Customer acquisition cost. Reported alongside results; acquisition
    /// spend is modelled through the sales and marketing overhead.
    pub cac_port:  NormalParam,
    pub cac_naval: NormalParam,

    pub conversion_rates: ConversionRates,
    pub churn_rate_monthly: NormalParam,

    /// Cloud storage cost per TB after compression. Informational.
    pub cloud_cost_per_tb: NormalParam,

    /// Std of the multiplicative capex variation centred at 1.0.
    pub edge_capex_variation: f64,
    /// Std of the multiplicative salary variation centred at 1.0.
    pub salary_variation:     f64,

    pub cable_deployment_months: NormalParam,
    pub system_uptime:           NormalParam,

    /// Annual price reduction from competitive pressure, in [0, 1).
    pub competitive_pressure_annual: f64,
}

impl Default for StochasticParameters {
    fn default() -> Self {
        Self {
            detection_accuracy:          NormalParam::new(0.97, 0.02),
            cac_port:                    NormalParam::new(50_000.0, 15_000.0),
            cac_naval:                   NormalParam::new(200_000.0, 50_000.0),
            conversion_rates:            ConversionRates::default(),
            churn_rate_monthly:          NormalParam::new(0.02, 0.01),
            cloud_cost_per_tb:           NormalParam::new(50.0, 10.0),
            edge_capex_variation:        0.15,
            salary_variation:            0.20,
            cable_deployment_months:     NormalParam::new(2.0, 0.5),
            system_uptime:               NormalParam::new(0.995, 0.005),
            competitive_pressure_annual: 0.10,
        }
    }
}

impl StochasticParameters {
    pub fn validate(&self) -> SimResult<()> {
        self.detection_accuracy.validate("detection_accuracy")?;
        self.cac_port.validate("cac_port")?;
        self.cac_naval.validate("cac_naval")?;
        for segment in CustomerSegment::ALL {
            self.conversion_rates
                .for_segment(segment)
                .validate(&format!("conversion_rates.{}", segment.name()))?;
        }
        self.churn_rate_monthly.validate("churn_rate_monthly")?;
        self.cloud_cost_per_tb.validate("cloud_cost_per_tb")?;
        non_negative("edge_capex_variation", self.edge_capex_variation)?;
        non_negative("salary_variation", self.salary_variation)?;
        self.cable_deployment_months.validate("cable_deployment_months")?;
        self.system_uptime.validate("system_uptime")?;
        let pressure = self.competitive_pressure_annual;
        if !(0.0..1.0).contains(&pressure) {
            return Err(SimError::invalid(
                "competitive_pressure_annual",
                format!("must be in [0, 1), got {pressure}"),
            ));
        }
        Ok(())
    }
}

// ── Campaign ───────────────────────────────────────────────────────

/// Everything needed to run one Monte Carlo campaign.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CampaignConfig {
    pub inputs:      SimulationInputs,
    pub params:      StochasticParameters,
    pub trials:      usize,
    pub master_seed: u64,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            inputs:      SimulationInputs::default(),
            params:      StochasticParameters::default(),
            trials:      1000,
            master_seed: 0,
        }
    }
}

impl CampaignConfig {
    /// Load a campaign from a JSON file. Missing fields take defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: CampaignConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(config)
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.trials == 0 {
            return Err(SimError::InvalidTrialCount { requested: 0 });
        }
        self.inputs.validate()?;
        self.params.validate()
    }
}

fn non_negative(field: &str, value: f64) -> SimResult<()> {
    if !value.is_finite() {
        return Err(SimError::invalid(field, "must be finite"));
    }
    if value < 0.0 {
        return Err(SimError::invalid(field, format!("must be non-negative, got {value}")));
    }
    Ok(())
}
