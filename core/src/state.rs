//! Running state of one trial.

use crate::{deployment::DeploymentQueue, segment::CustomerLedger, types::Month};
use serde::{Deserialize, Serialize};

/// The state threaded through one month's transition.
/// Owned by exactly one trial and dropped when the trial ends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyState {
    pub month:                Month,
    pub cash:                 f64,
    pub cables_deployed:      u64,
    pub customers:            CustomerLedger,
    pub team_size:            u64,
    pub regional_datacenters: u32,
    pub deployment_queue:     DeploymentQueue,
}

impl MonthlyState {
    /// Cables either operational or paid for and pending.
    pub fn committed_cables(&self) -> u64 {
        self.cables_deployed + self.deployment_queue.len() as u64
    }
}
