//! Campbell, Hilscher and Szilagyi (2008) failure probability.
//!
//! LPFD = -20.12 NIMTAAVG + 1.60 TLMTA - 7.88 EXRETAVG + 1.55 SIGMA
//!        - 0.005 RSIZE - 2.27 CASHMTA + 0.070 MB - 0.09 PRICE - 8.87
//!
//! MTA is the market value of total assets: market equity plus book
//! liabilities. The averaged terms weight older observations geometrically
//! with φ = 2^(-1/3), so a quarter counts half as much as the one after it.

use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::math::{
    checked_difference, checked_product, checked_sum, checked_total, ln, safe_divide,
};
use crate::providers::{FinancialDataProvider, LineItem, MarketDataProvider};
use crate::scores::probability::probability_of_bankruptcy;
use crate::types::{with_metadata, ComputationOutput, Money, Rate, ReportingPeriod, ScoringRequest};
use crate::{DistressError, DistressResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Model regressors. The all-zero default scores the intercept alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChsInput {
    /// Geometric average of the last four quarterly NI / MTA
    pub nimta_avg: Rate,
    /// Total liabilities / MTA
    pub tlmta: Rate,
    /// Geometric average of the last twelve monthly log excess returns
    pub exret_avg: Rate,
    /// Annualised volatility of daily returns over three months
    pub sigma: Rate,
    /// ln(market equity / S&P 500 market value)
    pub rsize: Decimal,
    /// Cash and short-term investments / MTA
    pub cashmta: Rate,
    /// Market equity / adjusted book equity
    pub mb: Decimal,
    /// ln of the share price, capped at $15
    pub price: Decimal,
    /// Adjusted book equity was non-positive and MB used a book equity of 1
    #[serde(default)]
    pub book_equity_floored: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChsComponent {
    pub name: String,
    pub value: Decimal,
    pub coefficient: Decimal,
    pub weighted_value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChsOutput {
    /// LPFD, the log-odds of failure
    pub linear_score: Decimal,
    pub probability: Rate,
    pub components: Vec<ChsComponent>,
}

// ---------------------------------------------------------------------------
// Coefficients
// ---------------------------------------------------------------------------

const INTERCEPT: Decimal = dec!(-8.87);
const COEFF_NIMTAAVG: Decimal = dec!(-20.12);
const COEFF_TLMTA: Decimal = dec!(1.60);
const COEFF_EXRETAVG: Decimal = dec!(-7.88);
const COEFF_SIGMA: Decimal = dec!(1.55);
const COEFF_RSIZE: Decimal = dec!(-0.005);
const COEFF_CASHMTA: Decimal = dec!(-2.27);
const COEFF_MB: Decimal = dec!(0.070);
const COEFF_PRICE: Decimal = dec!(-0.09);

/// 2^(-1/3)
const PHI: Decimal = dec!(0.7937005259840998);
/// φ³, the weight step between consecutive quarters
const QUARTER_DECAY: Decimal = dec!(0.5);
const QUARTERS: u32 = 4;
const QUARTER_DAYS: u32 = 91;
const RETURN_MONTHS: usize = 12;
const PRICE_CAP: Money = dec!(15);
/// Share of the market/book gap added to book equity
const BOOK_EQUITY_ADJUSTMENT: Decimal = dec!(0.1);

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Linear score and probability from already computed regressors.
pub fn calculate_chs(input: &ChsInput) -> DistressResult<ChsOutput> {
    let components = vec![
        component("NIMTAAVG", input.nimta_avg, COEFF_NIMTAAVG)?,
        component("TLMTA", input.tlmta, COEFF_TLMTA)?,
        component("EXRETAVG", input.exret_avg, COEFF_EXRETAVG)?,
        component("SIGMA", input.sigma, COEFF_SIGMA)?,
        component("RSIZE", input.rsize, COEFF_RSIZE)?,
        component("CASHMTA", input.cashmta, COEFF_CASHMTA)?,
        component("MB", input.mb, COEFF_MB)?,
        component("PRICE", input.price, COEFF_PRICE)?,
    ];
    let linear_score = checked_total(
        INTERCEPT,
        components.iter().map(|c| c.weighted_value),
        "LPFD",
    )?;

    Ok(ChsOutput {
        linear_score,
        probability: probability_of_bankruptcy(linear_score),
        components,
    })
}

/// Source the regressors from statement and market data.
///
/// Quarterly net income is read with quarterly requests stepped back 91 days
/// at a time; every other figure is read at the request's window end.
pub fn gather_chs_input<F, M>(
    financials: &F,
    market: &M,
    request: &ScoringRequest,
) -> DistressResult<ChsInput>
where
    F: FinancialDataProvider + ?Sized,
    M: MarketDataProvider + ?Sized,
{
    let id = request.identifier.as_str();
    let date = request.window_end()?;

    let market_equity = market.market_equity(id, date)?;
    let exret_avg = average_excess_return(
        &market.monthly_excess_returns(id, date, RETURN_MONTHS)?,
        id,
    )?;
    let total_liabilities = financials.line_item(request, LineItem::TotalLiabilities)?;
    let mta = checked_sum(market_equity, total_liabilities, "MTA")?;

    let tlmta = safe_divide(total_liabilities, mta, "TLMTA")?;
    let cashmta = safe_divide(
        financials.line_item(request, LineItem::CashAndShortTermInvestments)?,
        mta,
        "CASHMTA",
    )?;
    let nimta_avg = average_quarterly_nimta(financials, market, request)?;
    let sigma = market.return_volatility(id, date)?;
    let rsize = ln(
        safe_divide(market_equity, market.index_market_equity(date)?, "RSIZE")?,
        "RSIZE",
    )?;

    let book_equity = financials.line_item(request, LineItem::ShareholdersEquity)?;
    let gap = checked_difference(market_equity, book_equity, "adjusted book equity")?;
    let mut adjusted_book_equity = checked_sum(
        book_equity,
        checked_product(BOOK_EQUITY_ADJUSTMENT, gap, "adjusted book equity")?,
        "adjusted book equity",
    )?;
    let book_equity_floored = adjusted_book_equity <= Decimal::ZERO;
    if book_equity_floored {
        tracing::warn!(
            identifier = id,
            adjusted_book_equity = %adjusted_book_equity,
            "non-positive adjusted book equity, using 1"
        );
        adjusted_book_equity = Decimal::ONE;
    }
    let mb = safe_divide(market_equity, adjusted_book_equity, "MB")?;

    let price = ln(market.share_price(id, date)?.min(PRICE_CAP), "PRICE")?;

    Ok(ChsInput {
        nimta_avg,
        tlmta,
        exret_avg,
        sigma,
        rsize,
        cashmta,
        mb,
        price,
        book_equity_floored,
    })
}

/// Compute the CHS failure probability.
pub fn calculate_chs_probability<F, M>(
    financials: &F,
    market: &M,
    request: &ScoringRequest,
) -> DistressResult<ComputationOutput<ChsOutput>>
where
    F: FinancialDataProvider + ?Sized,
    M: MarketDataProvider + ?Sized,
{
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let window_end = request.window_end()?;

    let input = gather_chs_input(financials, market, request)?;
    if input.nimta_avg < Decimal::ZERO {
        warnings.push("Average quarterly net income is negative.".to_string());
    }
    if input.book_equity_floored {
        warnings.push(
            "Adjusted book equity is non-positive; MB uses a book equity of 1.".to_string(),
        );
    }

    let output = calculate_chs(&input)?;

    tracing::debug!(
        identifier = %request.identifier,
        linear_score = %output.linear_score,
        probability = %output.probability,
        "computed CHS failure probability"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "formula": "LPFD = -20.12*NIMTAAVG + 1.60*TLMTA - 7.88*EXRETAVG + 1.55*SIGMA - 0.005*RSIZE - 2.27*CASHMTA + 0.070*MB - 0.09*PRICE - 8.87",
        "phi": PHI.to_string(),
        "quarters": QUARTERS,
        "return_months": RETURN_MONTHS,
        "price_cap": PRICE_CAP.to_string(),
        "inputs": input,
    });

    Ok(with_metadata(
        "Campbell-Hilscher-Szilagyi (2008) failure probability",
        &assumptions,
        warnings,
        request,
        window_end,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Weights 1, ½, ¼, ⅛ from the latest quarter back, normalised to sum to one.
fn average_quarterly_nimta<F, M>(
    financials: &F,
    market: &M,
    request: &ScoringRequest,
) -> DistressResult<Rate>
where
    F: FinancialDataProvider + ?Sized,
    M: MarketDataProvider + ?Sized,
{
    let quarterly = request.clone().with_period(ReportingPeriod::Quarterly);
    let mut weight = Decimal::ONE;
    let mut weighted = Decimal::ZERO;
    let mut total_weight = Decimal::ZERO;

    for k in 0..QUARTERS {
        let quarter = quarterly.shifted(QUARTER_DAYS * k);
        let net_income = financials.line_item(&quarter, LineItem::NetIncome)?;
        let mta = checked_sum(
            market.market_equity(&quarter.identifier, quarter.window_end()?)?,
            financials.line_item(&quarter, LineItem::TotalLiabilities)?,
            "MTA",
        )?;
        let nimta = safe_divide(net_income, mta, "NIMTA")?;
        weighted = checked_sum(weighted, checked_product(weight, nimta, "NIMTA")?, "NIMTA")?;
        total_weight += weight;
        weight *= QUARTER_DECAY;
    }

    safe_divide(weighted, total_weight, "NIMTAAVG")
}

/// Weights φ^(j-1) over the twelve most recent months, normalised to sum to one.
fn average_excess_return(returns: &[Rate], identifier: &str) -> DistressResult<Rate> {
    if returns.len() < RETURN_MONTHS {
        return Err(DistressError::InsufficientData(format!(
            "{identifier}: {RETURN_MONTHS} monthly excess returns required, {} available",
            returns.len()
        )));
    }
    let mut weight = Decimal::ONE;
    let mut weighted = Decimal::ZERO;
    let mut total_weight = Decimal::ZERO;
    for r in returns.iter().take(RETURN_MONTHS) {
        weighted = checked_sum(weighted, checked_product(weight, *r, "EXRETAVG")?, "EXRETAVG")?;
        total_weight += weight;
        weight *= PHI;
    }
    safe_divide(weighted, total_weight, "EXRETAVG")
}

fn component(name: &str, value: Decimal, coefficient: Decimal) -> DistressResult<ChsComponent> {
    Ok(ChsComponent {
        name: name.to_string(),
        value,
        coefficient,
        weighted_value: checked_product(coefficient, value, name)?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
