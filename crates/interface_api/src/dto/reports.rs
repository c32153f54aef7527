//! Report query DTOs

use chrono::NaiveDate;
use serde::Deserialize;

use core_kernel::{DateRange, TemporalError};

/// Optional inclusive period bounds; missing ends are open
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl PeriodQuery {
    pub fn range(&self) -> Result<DateRange, TemporalError> {
        DateRange::from_bounds(self.start, self.end)
    }
}

#[derive(Debug, Deserialize)]
pub struct GeneralLedgerQuery {
    #[serde(default)]
    pub account: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    #[serde(default)]
    pub carry_forward: bool,
}

impl GeneralLedgerQuery {
    pub fn range(&self) -> Result<DateRange, TemporalError> {
        DateRange::from_bounds(self.start, self.end)
    }
}
