//! Customer segments and the per-trial customer ledger.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CustomerSegment {
    PortAuthority,
    NavalMilitary,
    Environmental,
    ShippingCompany,
    Insurance,
}

impl CustomerSegment {
    pub const COUNT: usize = 5;

    /// Stable iteration order. NEVER reorder: draws are taken in this order.
    pub const ALL: [CustomerSegment; Self::COUNT] = [
        Self::PortAuthority,
        Self::NavalMilitary,
        Self::Environmental,
        Self::ShippingCompany,
        Self::Insurance,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::PortAuthority   => "port",
            Self::NavalMilitary   => "naval",
            Self::Environmental   => "environmental",
            Self::ShippingCompany => "shipping",
            Self::Insurance       => "insurance",
        }
    }

    /// Qualified leads generated per deployed cable at full sales effectiveness.
    pub fn leads_per_cable(&self) -> f64 {
        match self {
            Self::PortAuthority   => 4.0,
            Self::NavalMilitary   => 1.0,
            Self::Environmental   => 3.0,
            Self::ShippingCompany => 2.0,
            Self::Insurance       => 2.0,
        }
    }

    fn slot(&self) -> usize {
        *self as usize
    }
}

/// Customer count per segment. Owned by a single trial.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CustomerLedger {
    pub port:          u64,
    pub naval:         u64,
    pub environmental: u64,
    pub shipping:      u64,
    pub insurance:     u64,
}

impl CustomerLedger {
    pub fn get(&self, segment: CustomerSegment) -> u64 {
        self.as_array()[segment.slot()]
    }

    pub fn with(mut self, segment: CustomerSegment, count: u64) -> Self {
        match segment {
            CustomerSegment::PortAuthority   => self.port = count,
            CustomerSegment::NavalMilitary   => self.naval = count,
            CustomerSegment::Environmental   => self.environmental = count,
            CustomerSegment::ShippingCompany => self.shipping = count,
            CustomerSegment::Insurance       => self.insurance = count,
        }
        self
    }

    pub fn total(&self) -> u64 {
        self.as_array().iter().sum()
    }

    /// Segment-wise sum, saturating.
    pub fn merged(self, other: CustomerLedger) -> Self {
        CustomerSegment::ALL.iter().fold(self, |acc, &seg| {
            let count = acc.get(seg).saturating_add(other.get(seg));
            acc.with(seg, count)
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (CustomerSegment, u64)> + '_ {
        CustomerSegment::ALL.iter().map(move |&seg| (seg, self.get(seg)))
    }

    fn as_array(&self) -> [u64; CustomerSegment::COUNT] {
        [self.port, self.naval, self.environmental, self.shipping, self.insurance]
    }
}
