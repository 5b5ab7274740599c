//! Pending cable deployments.

use crate::types::Month;
use serde::{Deserialize, Serialize};

/// A cable paid for but not yet operational.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PendingDeployment {
    pub enqueued_month:  Month,
    pub scheduled_month: Month,
    pub capex_paid:      f64,
}

/// Ordered multiset of pending deployments, in enqueue order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeploymentQueue {
    entries: Vec<PendingDeployment>,
}

impl DeploymentQueue {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PendingDeployment] {
        &self.entries
    }

    /// Schedule a cable `lead_months` after `month`.
    pub fn enqueue(mut self, month: Month, lead_months: Month, capex_paid: f64) -> Self {
        self.entries.push(PendingDeployment {
            enqueued_month:  month,
            scheduled_month: month.saturating_add(lead_months),
            capex_paid,
        });
        self
    }

    /// Remove every entry due at or before `month`.
    /// Returns the remaining queue and the number of cables settled.
    pub fn settle(self, month: Month) -> (Self, u64) {
        let (due, pending): (Vec<_>, Vec<_>) = self
            .entries
            .into_iter()
            .partition(|entry| entry.scheduled_month <= month);
        (Self { entries: pending }, due.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settle_removes_all_due_entries() {
        let queue = DeploymentQueue::default()
            .enqueue(0, 1, 10.0)
            .enqueue(0, 3, 10.0)
            .enqueue(1, 0, 10.0);
        let (queue, settled) = queue.settle(1);
        assert_eq!(settled, 2);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.entries()[0].scheduled_month, 3);
    }

    #[test]
    fn nothing_due_settles_nothing() {
        let queue = DeploymentQueue::default().enqueue(4, 2, 1.0);
        let (queue, settled) = queue.settle(5);
        assert_eq!(settled, 0);
        assert_eq!(queue.len(), 1);
    }
}
