use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Historical range selector shown as the period buttons.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "daily")]
    Daily,
    #[serde(rename = "weekly")]
    Weekly,
    #[serde(rename = "monthly")]
    Monthly,
    #[serde(rename = "3months")]
    ThreeMonths,
    #[serde(rename = "6months")]
    SixMonths,
    #[serde(rename = "yearly")]
    Yearly,
    #[serde(rename = "max")]
    Max,
}

/// Fetch parameters for a period. No interval is sent upstream: the provider
/// picks the granularity from the range alone.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RangeParams {
    pub days: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown period: {0}")]
pub struct UnknownPeriod(pub String);

impl Period {
    pub const ALL: [Period; 7] = [
        Period::Daily,
        Period::Weekly,
        Period::Monthly,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::Yearly,
        Period::Max,
    ];

    pub fn resolve(self) -> RangeParams {
        let days = match self {
            Period::Daily => 1,
            Period::Weekly => 7,
            Period::Monthly => 30,
            Period::ThreeMonths => 90,
            Period::SixMonths => 180,
            Period::Yearly => 365,
            // demo API отдаёт максимум 365 дней
            Period::Max => 365,
        };
        RangeParams { days }
    }

    /// Clock time on the time axis only makes sense up to a month of data.
    pub fn shows_clock_time(self) -> bool {
        matches!(self, Period::Daily | Period::Weekly | Period::Monthly)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::ThreeMonths => "3months",
            Period::SixMonths => "6months",
            Period::Yearly => "yearly",
            Period::Max => "max",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::Daily => "1D",
            Period::Weekly => "1W",
            Period::Monthly => "1M",
            Period::ThreeMonths => "3M",
            Period::SixMonths => "6M",
            Period::Yearly => "1Y",
            Period::Max => "Max",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == s || p.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownPeriod(s.to_string()))
    }
}
