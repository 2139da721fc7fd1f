//! Conversion rate snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FeyError, Result};

/// One sample of the xFEY → FEY conversion.
///
/// Snapshots are write-once; consumers read them ordered by `timestamp`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    /// xFEY amount redeemed (base units)
    pub xfey_amount: u64,
    /// FEY amount received (base units)
    pub fey_amount: u64,
    /// `fey_amount / xfey_amount`
    pub conversion_rate: f64,
    /// Percentage gain of `fey_amount` over `xfey_amount`
    pub gains_percent: f64,
    /// Time the sample was taken
    pub timestamp: DateTime<Utc>,
}

impl RateSnapshot {
    /// Builds a snapshot and derives the rate and gain from the two amounts.
    pub fn from_amounts(xfey_amount: u64, fey_amount: u64, timestamp: DateTime<Utc>) -> Result<Self> {
        if xfey_amount == 0 {
            return Err(FeyError::ValidationError("xFEY amount must be non-zero".into()));
        }

        let xfey = xfey_amount as f64;
        let fey = fey_amount as f64;

        Ok(Self {
            xfey_amount,
            fey_amount,
            conversion_rate: fey / xfey,
            gains_percent: (fey - xfey) / xfey * 100.0,
            timestamp,
        })
    }

    /// Absolute gain, negative if the vault lost value.
    pub fn total_gain(&self) -> i128 {
        self.fey_amount as i128 - self.xfey_amount as i128
    }
}
