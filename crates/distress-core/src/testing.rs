//! Test double implementing every provider trait from fixed tables.
//!
//! Financial figures are keyed by the request's lookback so that "current"
//! (lookback 0) and "prior" (lookback 365) can be set independently.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::providers::{
    ClassificationProvider, FinancialDataProvider, LineItem, MacroeconomicProvider,
    MarketDataProvider, Ratio,
};
use crate::types::{Money, Rate, ScoringRequest};
use crate::{DistressError, DistressResult};

#[derive(Debug, Default, Clone)]
pub(crate) struct FakeProvider {
    line_items: HashMap<(u32, LineItem), Money>,
    ratios: HashMap<(u32, Ratio), Rate>,
    sector: Option<String>,
    location: Option<String>,
    listed: Option<bool>,
    gnp: Option<Decimal>,
    market_equity: Option<Money>,
    share_price: Option<Money>,
    excess_returns: Vec<Rate>,
    volatility: Option<Rate>,
    index_equity: Option<Money>,
}

impl FakeProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_item(mut self, lookback: u32, item: LineItem, value: Money) -> Self {
        self.line_items.insert((lookback, item), value);
        self
    }

    pub(crate) fn with_ratio(mut self, lookback: u32, ratio: Ratio, value: Rate) -> Self {
        self.ratios.insert((lookback, ratio), value);
        self
    }

    pub(crate) fn with_classification(mut self, sector: &str, location: &str, listed: bool) -> Self {
        self.sector = Some(sector.to_string());
        self.location = Some(location.to_string());
        self.listed = Some(listed);
        self
    }

    pub(crate) fn with_gnp(mut self, gnp: Decimal) -> Self {
        self.gnp = Some(gnp);
        self
    }

    pub(crate) fn with_market(
        mut self,
        market_equity: Money,
        share_price: Money,
        volatility: Rate,
        index_equity: Money,
    ) -> Self {
        self.market_equity = Some(market_equity);
        self.share_price = Some(share_price);
        self.volatility = Some(volatility);
        self.index_equity = Some(index_equity);
        self
    }

    pub(crate) fn with_excess_returns(mut self, returns: Vec<Rate>) -> Self {
        self.excess_returns = returns;
        self
    }
}

fn missing<T>(value: Option<T>, identifier: &str, what: impl std::fmt::Display) -> DistressResult<T> {
    value.ok_or_else(|| DistressError::missing(identifier, what))
}

impl FinancialDataProvider for FakeProvider {
    fn line_item(&self, request: &ScoringRequest, item: LineItem) -> DistressResult<Money> {
        missing(
            self.line_items.get(&(request.lookback_days, item)).copied(),
            &request.identifier,
            item,
        )
    }

    fn ratio(&self, request: &ScoringRequest, ratio: Ratio) -> DistressResult<Rate> {
        missing(
            self.ratios.get(&(request.lookback_days, ratio)).copied(),
            &request.identifier,
            ratio,
        )
    }
}

impl ClassificationProvider for FakeProvider {
    fn sector(&self, identifier: &str) -> DistressResult<String> {
        missing(self.sector.clone(), identifier, "sector")
    }

    fn location(&self, identifier: &str) -> DistressResult<String> {
        missing(self.location.clone(), identifier, "location")
    }

    fn is_listed(&self, identifier: &str) -> DistressResult<bool> {
        missing(self.listed, identifier, "listing")
    }
}

impl MacroeconomicProvider for FakeProvider {
    fn gnp_price_index(&self, _date: NaiveDate) -> DistressResult<Decimal> {
        missing(self.gnp, "GNP", "price index")
    }
}

impl MarketDataProvider for FakeProvider {
    fn market_equity(&self, identifier: &str, _date: NaiveDate) -> DistressResult<Money> {
        missing(self.market_equity, identifier, "market equity")
    }

    fn share_price(&self, identifier: &str, _date: NaiveDate) -> DistressResult<Money> {
        missing(self.share_price, identifier, "share price")
    }

    fn monthly_excess_returns(
        &self,
        _identifier: &str,
        _date: NaiveDate,
        months: usize,
    ) -> DistressResult<Vec<Rate>> {
        Ok(self.excess_returns.iter().take(months).copied().collect())
    }

    fn return_volatility(&self, identifier: &str, _date: NaiveDate) -> DistressResult<Rate> {
        missing(self.volatility, identifier, "return volatility")
    }

    fn index_market_equity(&self, _date: NaiveDate) -> DistressResult<Money> {
        missing(self.index_equity, "S&P 500", "market equity")
    }
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) fn request() -> ScoringRequest {
    ScoringRequest::new("ACME", date(2024, 6, 30))
}
