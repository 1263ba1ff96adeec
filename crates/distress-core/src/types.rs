use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{DistressError, DistressResult};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Ratios and rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Offset between the "current" and "prior" windows of year-over-year signals.
pub const DAYS_PER_YEAR: u32 = 365;

/// Reporting basis of the statement figures a provider returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportingPeriod {
    /// Trailing twelve months
    #[default]
    Ttm,
    Annual,
    Quarterly,
}

impl std::fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ttm => write!(f, "TTM"),
            Self::Annual => write!(f, "Annual"),
            Self::Quarterly => write!(f, "Quarterly"),
        }
    }
}

fn default_diluted_shares() -> bool {
    true
}

/// Identifies one point-in-time scoring computation.
///
/// The window end is `as_of_date - lookback_days`; providers return the
/// figures as reported at that date. Year-over-year signals compare the
/// request against [`ScoringRequest::prior_year`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringRequest {
    pub identifier: String,
    pub as_of_date: NaiveDate,
    #[serde(default)]
    pub lookback_days: u32,
    #[serde(default)]
    pub period: ReportingPeriod,
    /// Count shares including the dilutive effect of convertibles.
    #[serde(default = "default_diluted_shares")]
    pub diluted_shares: bool,
}

impl ScoringRequest {
    pub fn new(identifier: impl Into<String>, as_of_date: NaiveDate) -> Self {
        Self {
            identifier: identifier.into(),
            as_of_date,
            lookback_days: 0,
            period: ReportingPeriod::Ttm,
            diluted_shares: true,
        }
    }

    pub fn with_lookback_days(mut self, lookback_days: u32) -> Self {
        self.lookback_days = lookback_days;
        self
    }

    pub fn with_period(mut self, period: ReportingPeriod) -> Self {
        self.period = period;
        self
    }

    pub fn with_diluted_shares(mut self, diluted_shares: bool) -> Self {
        self.diluted_shares = diluted_shares;
        self
    }

    /// Date at which the figures of this request are read.
    pub fn window_end(&self) -> DistressResult<NaiveDate> {
        self.as_of_date
            .checked_sub_days(Days::new(u64::from(self.lookback_days)))
            .ok_or_else(|| {
                DistressError::DateError(format!(
                    "{} minus {} days is out of range",
                    self.as_of_date, self.lookback_days
                ))
            })
    }

    /// The same request moved back by `days`.
    pub fn shifted(&self, days: u32) -> Self {
        Self {
            lookback_days: self.lookback_days.saturating_add(days),
            ..self.clone()
        }
    }

    /// The same request one year earlier.
    pub fn prior_year(&self) -> Self {
        self.shifted(DAYS_PER_YEAR)
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub identifier: String,
    pub window_end: NaiveDate,
    pub period: ReportingPeriod,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    request: &ScoringRequest,
    window_end: NaiveDate,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            identifier: request.identifier.clone(),
            window_end,
            period: request.period,
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
