//! Collaborator contracts consumed by the scoring models.
//!
//! Scorers never reach for a global data source: every figure arrives through
//! one of the traits below, passed in by the caller.

pub mod listing;
pub mod snapshot;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Rate, ScoringRequest};
use crate::DistressResult;

/// Sector label marking a manufacturing firm.
pub const MANUFACTURING_SECTOR: &str = "Manufacturing";

/// Location label of firms outside the US and Canada.
pub const FOREIGN_LOCATION: &str = "Other Countries";

/// Point-in-time statement figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItem {
    TotalAssets,
    TotalLiabilities,
    CurrentAssets,
    CurrentLiabilities,
    /// Current assets minus current liabilities
    NetWorkingCapital,
    RetainedEarnings,
    Ebit,
    NetSales,
    NetIncome,
    OperatingCashFlow,
    ShareholdersEquity,
    CashAndShortTermInvestments,
    MarketCapitalization,
    SharesOutstanding { diluted: bool },
}

impl std::fmt::Display for LineItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TotalAssets => write!(f, "total assets"),
            Self::TotalLiabilities => write!(f, "total liabilities"),
            Self::CurrentAssets => write!(f, "current assets"),
            Self::CurrentLiabilities => write!(f, "current liabilities"),
            Self::NetWorkingCapital => write!(f, "net working capital"),
            Self::RetainedEarnings => write!(f, "retained earnings"),
            Self::Ebit => write!(f, "EBIT"),
            Self::NetSales => write!(f, "net sales"),
            Self::NetIncome => write!(f, "net income"),
            Self::OperatingCashFlow => write!(f, "operating cash flow"),
            Self::ShareholdersEquity => write!(f, "shareholders' equity"),
            Self::CashAndShortTermInvestments => write!(f, "cash and short-term investments"),
            Self::MarketCapitalization => write!(f, "market capitalization"),
            Self::SharesOutstanding { diluted: true } => write!(f, "diluted shares outstanding"),
            Self::SharesOutstanding { diluted: false } => write!(f, "basic shares outstanding"),
        }
    }
}

/// Derived accounting ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ratio {
    /// Net income / total assets
    ReturnOnAssets,
    /// Total liabilities / total assets
    DebtRatio,
    /// Current assets / current liabilities
    CurrentRatio,
    /// Gross profit / net sales
    GrossMargin,
    /// Net sales / total assets
    AssetTurnover,
}

impl std::fmt::Display for Ratio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReturnOnAssets => write!(f, "return on assets"),
            Self::DebtRatio => write!(f, "debt ratio"),
            Self::CurrentRatio => write!(f, "current ratio"),
            Self::GrossMargin => write!(f, "gross margin"),
            Self::AssetTurnover => write!(f, "asset turnover"),
        }
    }
}

/// Accounting figures and ratios as reported at `request.window_end()`.
pub trait FinancialDataProvider: Send + Sync {
    fn line_item(&self, request: &ScoringRequest, item: LineItem) -> DistressResult<Money>;

    fn ratio(&self, request: &ScoringRequest, ratio: Ratio) -> DistressResult<Rate>;
}

/// Sector, geography and exchange-listing membership of an identifier.
pub trait ClassificationProvider: Send + Sync {
    fn sector(&self, identifier: &str) -> DistressResult<String>;

    fn location(&self, identifier: &str) -> DistressResult<String>;

    /// Whether the identifier belongs to the reference exchange listing.
    fn is_listed(&self, identifier: &str) -> DistressResult<bool>;
}

pub trait MacroeconomicProvider: Send + Sync {
    /// GNP price index level in effect at `date`.
    fn gnp_price_index(&self, date: NaiveDate) -> DistressResult<Decimal>;
}

/// Market observations used by the Campbell-Hilscher-Szilagyi model.
pub trait MarketDataProvider: Send + Sync {
    /// Market value of equity at `date`.
    fn market_equity(&self, identifier: &str, date: NaiveDate) -> DistressResult<Money>;

    fn share_price(&self, identifier: &str, date: NaiveDate) -> DistressResult<Money>;

    /// Monthly log returns in excess of the S&P 500, most recent first.
    /// May return fewer than `months` values when history is short.
    fn monthly_excess_returns(
        &self,
        identifier: &str,
        date: NaiveDate,
        months: usize,
    ) -> DistressResult<Vec<Rate>>;

    /// Annualised standard deviation of daily returns over the past three months.
    fn return_volatility(&self, identifier: &str, date: NaiveDate) -> DistressResult<Rate>;

    /// Total market value of the S&P 500 constituents at `date`.
    fn index_market_equity(&self, date: NaiveDate) -> DistressResult<Money>;
}

/// Classification facts that drive Altman variant selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmProfile {
    pub listed: bool,
    pub manufacturing: bool,
    pub foreign: bool,
}

impl FirmProfile {
    pub fn resolve<C: ClassificationProvider + ?Sized>(
        classification: &C,
        identifier: &str,
    ) -> DistressResult<Self> {
        let sector = classification.sector(identifier)?;
        let location = classification.location(identifier)?;
        Ok(Self {
            listed: classification.is_listed(identifier)?,
            manufacturing: sector.contains(MANUFACTURING_SECTOR),
            foreign: location.contains(FOREIGN_LOCATION),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeProvider;

    #[test]
    fn test_profile_from_labels() {
        let fake = FakeProvider::new()
            .with_classification("Durable Goods Manufacturing", "Other Countries", false);
        let profile = FirmProfile::resolve(&fake, "ACME").unwrap();
        assert_eq!(
            profile,
            FirmProfile {
                listed: false,
                manufacturing: true,
                foreign: true,
            }
        );
    }

    #[test]
    fn test_profile_domestic_services() {
        let fake = FakeProvider::new().with_classification("Software", "United States", true);
        let profile = FirmProfile::resolve(&fake, "ACME").unwrap();
        assert!(profile.listed);
        assert!(!profile.manufacturing);
        assert!(!profile.foreign);
    }

    #[test]
    fn test_line_item_display() {
        assert_eq!(
            LineItem::SharesOutstanding { diluted: true }.to_string(),
            "diluted shares outstanding"
        );
        assert_eq!(Ratio::DebtRatio.to_string(), "debt ratio");
    }
}
