//! In-memory provider backed by a JSON snapshot of reported figures.
//!
//! A snapshot holds, per identifier, dated statement records, classification
//! labels and market observations, plus the index and GNP price-index series.
//! Every lookup is point-in-time: the latest record dated on or before the
//! requested date wins. Figures are never interpolated.
//!
//! ```json
//! {
//!   "companies": {
//!     "ACME": {
//!       "sector": "Manufacturing",
//!       "location": "United States",
//!       "statements": [
//!         { "period_end": "2024-03-31", "period": "ttm",
//!           "total_assets": "1000", "net_income": "80" }
//!       ],
//!       "market": [
//!         { "date": "2024-03-31", "market_equity": "1500", "share_price": "12.5" }
//!       ]
//!     }
//!   },
//!   "index_market_equity": [ { "date": "2024-03-31", "value": "45000000" } ],
//!   "gnp_price_index": [ { "date": "2024-01-01", "value": "123.4" } ]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::listing::ExchangeListing;
use super::{
    ClassificationProvider, FinancialDataProvider, LineItem, MacroeconomicProvider,
    MarketDataProvider, Ratio,
};
use crate::math::{checked_difference, safe_divide};
use crate::types::{Money, Rate, ReportingPeriod, ScoringRequest};
use crate::{DistressError, DistressResult};

// ---------------------------------------------------------------------------
// Snapshot document
// ---------------------------------------------------------------------------

/// One reported set of statement figures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatementRecord {
    pub period_end: NaiveDate,
    #[serde(default)]
    pub period: ReportingPeriod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_assets: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_liabilities: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_assets: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_liabilities: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retained_earnings: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ebit: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_sales: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross_profit: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_income: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operating_cash_flow: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shareholders_equity: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_and_short_term_investments: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_capitalization: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares_outstanding_basic: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shares_outstanding_diluted: Option<Money>,
}

/// One dated market observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketObservation {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_equity: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_price: Option<Money>,
    /// Monthly log excess return over the S&P 500 for the month ending at `date`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excess_return: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_volatility: Option<Rate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanySnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Listing membership used when no reference listing is attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listed: Option<bool>,
    #[serde(default)]
    pub statements: Vec<StatementRecord>,
    #[serde(default)]
    pub market: Vec<MarketObservation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: Money,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotProvider {
    #[serde(default)]
    pub companies: BTreeMap<String, CompanySnapshot>,
    #[serde(default)]
    pub index_market_equity: Vec<SeriesPoint>,
    #[serde(default)]
    pub gnp_price_index: Vec<SeriesPoint>,
    #[serde(skip)]
    listing: Option<Arc<ExchangeListing>>,
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl SnapshotProvider {
    pub fn from_json_str(contents: &str) -> DistressResult<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn load(path: impl AsRef<Path>) -> DistressResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let snapshot = Self::from_json_str(&contents)?;
        tracing::debug!(
            path = %path.as_ref().display(),
            companies = snapshot.companies.len(),
            "loaded provider snapshot"
        );
        Ok(snapshot)
    }

    /// Answer listing membership from `listing` instead of the per-company flag.
    pub fn with_listing(mut self, listing: Arc<ExchangeListing>) -> Self {
        self.listing = Some(listing);
        self
    }

    pub fn insert_company(&mut self, identifier: impl Into<String>, company: CompanySnapshot) {
        self.companies.insert(identifier.into(), company);
    }

    fn company(&self, identifier: &str) -> DistressResult<&CompanySnapshot> {
        self.companies
            .get(identifier)
            .ok_or_else(|| DistressError::missing(identifier, "company not in snapshot"))
    }

    fn statement(&self, request: &ScoringRequest) -> DistressResult<&StatementRecord> {
        let window_end = request.window_end()?;
        self.company(&request.identifier)?
            .statements
            .iter()
            .filter(|s| s.period == request.period && s.period_end <= window_end)
            .max_by_key(|s| s.period_end)
            .ok_or_else(|| {
                DistressError::missing(
                    &request.identifier,
                    format!("{} statement on or before {window_end}", request.period),
                )
            })
    }

    fn observation<T>(
        &self,
        identifier: &str,
        date: NaiveDate,
        what: &str,
        field: impl Fn(&MarketObservation) -> Option<T>,
    ) -> DistressResult<T> {
        self.company(identifier)?
            .market
            .iter()
            .filter(|o| o.date <= date)
            .filter_map(|o| field(o).map(|v| (o.date, v)))
            .max_by_key(|(d, _)| *d)
            .map(|(_, v)| v)
            .ok_or_else(|| DistressError::missing(identifier, format!("{what} on or before {date}")))
    }
}

fn point_in_time(series: &[SeriesPoint], date: NaiveDate) -> Option<Money> {
    series
        .iter()
        .filter(|p| p.date <= date)
        .max_by_key(|p| p.date)
        .map(|p| p.value)
}

fn require(value: Option<Money>, identifier: &str, item: impl std::fmt::Display) -> DistressResult<Money> {
    value.ok_or_else(|| DistressError::missing(identifier, item))
}

// ---------------------------------------------------------------------------
// Provider implementations
// ---------------------------------------------------------------------------

impl FinancialDataProvider for SnapshotProvider {
    fn line_item(&self, request: &ScoringRequest, item: LineItem) -> DistressResult<Money> {
        let s = self.statement(request)?;
        let id = request.identifier.as_str();
        match item {
            LineItem::TotalAssets => require(s.total_assets, id, item),
            LineItem::TotalLiabilities => require(s.total_liabilities, id, item),
            LineItem::CurrentAssets => require(s.current_assets, id, item),
            LineItem::CurrentLiabilities => require(s.current_liabilities, id, item),
            LineItem::NetWorkingCapital => checked_difference(
                require(s.current_assets, id, LineItem::CurrentAssets)?,
                require(s.current_liabilities, id, LineItem::CurrentLiabilities)?,
                "CA - CL",
            ),
            LineItem::RetainedEarnings => require(s.retained_earnings, id, item),
            LineItem::Ebit => require(s.ebit, id, item),
            LineItem::NetSales => require(s.net_sales, id, item),
            LineItem::NetIncome => require(s.net_income, id, item),
            LineItem::OperatingCashFlow => require(s.operating_cash_flow, id, item),
            LineItem::ShareholdersEquity => require(s.shareholders_equity, id, item),
            LineItem::CashAndShortTermInvestments => {
                require(s.cash_and_short_term_investments, id, item)
            }
            LineItem::MarketCapitalization => match s.market_capitalization {
                Some(mc) => Ok(mc),
                None => self.market_equity(id, request.window_end()?),
            },
            LineItem::SharesOutstanding { diluted: true } => {
                require(s.shares_outstanding_diluted, id, item)
            }
            LineItem::SharesOutstanding { diluted: false } => {
                require(s.shares_outstanding_basic, id, item)
            }
        }
    }

    fn ratio(&self, request: &ScoringRequest, ratio: Ratio) -> DistressResult<Rate> {
        let s = self.statement(request)?;
        let id = request.identifier.as_str();
        let (num, den, context) = match ratio {
            Ratio::ReturnOnAssets => (
                require(s.net_income, id, LineItem::NetIncome)?,
                require(s.total_assets, id, LineItem::TotalAssets)?,
                "ROA: Net Income / Total Assets",
            ),
            Ratio::DebtRatio => (
                require(s.total_liabilities, id, LineItem::TotalLiabilities)?,
                require(s.total_assets, id, LineItem::TotalAssets)?,
                "Debt Ratio: Total Liabilities / Total Assets",
            ),
            Ratio::CurrentRatio => (
                require(s.current_assets, id, LineItem::CurrentAssets)?,
                require(s.current_liabilities, id, LineItem::CurrentLiabilities)?,
                "Current Ratio: Current Assets / Current Liabilities",
            ),
            Ratio::GrossMargin => (
                require(s.gross_profit, id, "gross profit")?,
                require(s.net_sales, id, LineItem::NetSales)?,
                "Gross Margin: Gross Profit / Net Sales",
            ),
            Ratio::AssetTurnover => (
                require(s.net_sales, id, LineItem::NetSales)?,
                require(s.total_assets, id, LineItem::TotalAssets)?,
                "Asset Turnover: Net Sales / Total Assets",
            ),
        };
        safe_divide(num, den, context)
    }
}

impl ClassificationProvider for SnapshotProvider {
    fn sector(&self, identifier: &str) -> DistressResult<String> {
        self.company(identifier)?
            .sector
            .clone()
            .ok_or_else(|| DistressError::missing(identifier, "sector"))
    }

    fn location(&self, identifier: &str) -> DistressResult<String> {
        self.company(identifier)?
            .location
            .clone()
            .ok_or_else(|| DistressError::missing(identifier, "location"))
    }

    fn is_listed(&self, identifier: &str) -> DistressResult<bool> {
        if let Some(listing) = &self.listing {
            return Ok(listing.contains(identifier));
        }
        self.company(identifier)?
            .listed
            .ok_or_else(|| DistressError::missing(identifier, "exchange listing membership"))
    }
}

impl MacroeconomicProvider for SnapshotProvider {
    fn gnp_price_index(&self, date: NaiveDate) -> DistressResult<Money> {
        point_in_time(&self.gnp_price_index, date)
            .ok_or_else(|| DistressError::missing("GNP", format!("price index on or before {date}")))
    }
}

impl MarketDataProvider for SnapshotProvider {
    fn market_equity(&self, identifier: &str, date: NaiveDate) -> DistressResult<Money> {
        self.observation(identifier, date, "market equity", |o| o.market_equity)
    }

    fn share_price(&self, identifier: &str, date: NaiveDate) -> DistressResult<Money> {
        self.observation(identifier, date, "share price", |o| o.share_price)
    }

    fn monthly_excess_returns(
        &self,
        identifier: &str,
        date: NaiveDate,
        months: usize,
    ) -> DistressResult<Vec<Rate>> {
        let mut returns: Vec<(NaiveDate, Rate)> = self
            .company(identifier)?
            .market
            .iter()
            .filter(|o| o.date <= date)
            .filter_map(|o| o.excess_return.map(|r| (o.date, r)))
            .collect();
        returns.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(returns.into_iter().take(months).map(|(_, r)| r).collect())
    }

    fn return_volatility(&self, identifier: &str, date: NaiveDate) -> DistressResult<Rate> {
        self.observation(identifier, date, "return volatility", |o| o.return_volatility)
    }

    fn index_market_equity(&self, date: NaiveDate) -> DistressResult<Money> {
        point_in_time(&self.index_market_equity, date).ok_or_else(|| {
            DistressError::missing("S&P 500", format!("market equity on or before {date}"))
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
