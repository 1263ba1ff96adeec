//! Ohlson (1980) O-Score.
//!
//! A single fixed linear model; higher scores indicate a higher likelihood
//! of bankruptcy within two years. The model defines no zones, so the output
//! carries the logistic probability of the score instead.

use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::math::{checked_difference, checked_product, checked_sum, checked_total, ln, safe_divide};
use crate::providers::{FinancialDataProvider, LineItem, MacroeconomicProvider};
use crate::scores::probability::probability_of_bankruptcy;
use crate::types::{with_metadata, ComputationOutput, Money, Rate, ScoringRequest};
use crate::DistressResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OhlsonInput {
    pub total_assets: Money,
    pub total_liabilities: Money,
    pub working_capital: Money,
    pub current_assets: Money,
    pub current_liabilities: Money,
    pub net_income: Money,
    /// Net income of the window one year earlier
    pub prior_net_income: Money,
    /// Funds from operations, taken as operating cash flow
    pub funds_from_operations: Money,
    pub gnp_price_index: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OScoreComponent {
    pub name: String,
    pub value: Decimal,
    pub coefficient: Decimal,
    pub weighted_value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OhlsonOutput {
    pub o_score: Decimal,
    /// Logistic transform of the O-Score
    pub probability: Rate,
    /// X: total liabilities exceed total assets
    pub liabilities_exceed_assets: bool,
    /// Y: net loss in both the current and the prior year
    pub consecutive_losses: bool,
    /// CHIN: scaled year-over-year change in net income, in [-1, 1]
    pub net_income_change: Decimal,
    pub components: Vec<OScoreComponent>,
}

// ---------------------------------------------------------------------------
// Coefficients
// ---------------------------------------------------------------------------

const INTERCEPT: Decimal = dec!(-1.32);
const COEFF_SIZE: Decimal = dec!(-0.407);
const COEFF_TLTA: Decimal = dec!(6.03);
const COEFF_WCTA: Decimal = dec!(-1.43);
const COEFF_CLCA: Decimal = dec!(0.0757);
const COEFF_OENEG: Decimal = dec!(-1.72);
const COEFF_NITA: Decimal = dec!(-2.37);
const COEFF_FUTL: Decimal = dec!(-1.83);
const COEFF_INTWO: Decimal = dec!(0.285);
const COEFF_CHIN: Decimal = dec!(-0.521);

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Score already gathered figures.
pub fn score_ohlson(input: &OhlsonInput) -> DistressResult<OhlsonOutput> {
    let tlta = safe_divide(input.total_liabilities, input.total_assets, "TL / TA")?;
    let wcta = safe_divide(input.working_capital, input.total_assets, "WC / TA")?;
    let nita = safe_divide(input.net_income, input.total_assets, "NI / TA")?;
    let clca = safe_divide(input.current_liabilities, input.current_assets, "CL / CA")?;
    let futl = safe_divide(
        input.funds_from_operations,
        input.total_liabilities,
        "FFO / TL",
    )?;
    let size = ln(
        safe_divide(input.total_assets, input.gnp_price_index, "TA / GNP")?,
        "ln(TA / GNP)",
    )?;

    let liabilities_exceed_assets = input.total_liabilities > input.total_assets;
    let consecutive_losses =
        input.net_income < Decimal::ZERO && input.prior_net_income < Decimal::ZERO;
    let net_income_change = chin(input.net_income, input.prior_net_income)?;

    let components = vec![
        component("Size: ln(TA / GNP)", size, COEFF_SIZE)?,
        component("TLTA: TL / TA", tlta, COEFF_TLTA)?,
        component("WCTA: WC / TA", wcta, COEFF_WCTA)?,
        component("CLCA: CL / CA", clca, COEFF_CLCA)?,
        component("OENEG: TL > TA", indicator(liabilities_exceed_assets), COEFF_OENEG)?,
        component("NITA: NI / TA", nita, COEFF_NITA)?,
        component("FUTL: FFO / TL", futl, COEFF_FUTL)?,
        component("INTWO: two years of losses", indicator(consecutive_losses), COEFF_INTWO)?,
        component("CHIN: change in NI", net_income_change, COEFF_CHIN)?,
    ];

    let o_score = checked_total(
        INTERCEPT,
        components.iter().map(|c| c.weighted_value),
        "O-Score",
    )?;

    Ok(OhlsonOutput {
        o_score,
        probability: probability_of_bankruptcy(o_score),
        liabilities_exceed_assets,
        consecutive_losses,
        net_income_change,
        components,
    })
}

/// Read the current-window figures, the prior-year net income and the GNP
/// price index at the window end.
pub fn gather_ohlson_input<F, M>(
    financials: &F,
    macro_data: &M,
    request: &ScoringRequest,
) -> DistressResult<OhlsonInput>
where
    F: FinancialDataProvider + ?Sized,
    M: MacroeconomicProvider + ?Sized,
{
    let window_end = request.window_end()?;
    Ok(OhlsonInput {
        total_assets: financials.line_item(request, LineItem::TotalAssets)?,
        total_liabilities: financials.line_item(request, LineItem::TotalLiabilities)?,
        working_capital: financials.line_item(request, LineItem::NetWorkingCapital)?,
        current_assets: financials.line_item(request, LineItem::CurrentAssets)?,
        current_liabilities: financials.line_item(request, LineItem::CurrentLiabilities)?,
        net_income: financials.line_item(request, LineItem::NetIncome)?,
        prior_net_income: financials.line_item(&request.prior_year(), LineItem::NetIncome)?,
        funds_from_operations: financials.line_item(request, LineItem::OperatingCashFlow)?,
        gnp_price_index: macro_data.gnp_price_index(window_end)?,
    })
}

/// Compute the Ohlson O-Score and its logistic probability.
pub fn calculate_ohlson_o_score<F, M>(
    financials: &F,
    macro_data: &M,
    request: &ScoringRequest,
) -> DistressResult<ComputationOutput<OhlsonOutput>>
where
    F: FinancialDataProvider + ?Sized,
    M: MacroeconomicProvider + ?Sized,
{
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let window_end = request.window_end()?;

    let input = gather_ohlson_input(financials, macro_data, request)?;
    let output = score_ohlson(&input)?;

    if output.liabilities_exceed_assets {
        warnings.push("Total liabilities exceed total assets.".to_string());
    }
    if output.consecutive_losses {
        warnings.push("Net loss in both the current and the prior year.".to_string());
    }

    tracing::debug!(
        identifier = %request.identifier,
        o_score = %output.o_score,
        probability = %output.probability,
        "computed Ohlson O-Score"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "formula": "O = -1.32 - 0.407*ln(TA/GNP) + 6.03*TLTA - 1.43*WCTA + 0.0757*CLCA - 1.72*OENEG - 2.37*NITA - 1.83*FUTL + 0.285*INTWO - 0.521*CHIN",
        "funds_from_operations": "operating cash flow",
        "gnp_price_index_date": window_end.to_string(),
        "prior_year_lookback_days": request.prior_year().lookback_days,
    });

    Ok(with_metadata(
        "Ohlson O-Score (1980)",
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

/// (NI - NI_prior) / (|NI| + |NI_prior|), zero when both are zero.
fn chin(current: Money, prior: Money) -> DistressResult<Decimal> {
    let scale = checked_sum(current.abs(), prior.abs(), "CHIN")?;
    if scale.is_zero() {
        return Ok(Decimal::ZERO);
    }
    safe_divide(checked_difference(current, prior, "CHIN")?, scale, "CHIN")
}

fn indicator(flag: bool) -> Decimal {
    if flag {
        Decimal::ONE
    } else {
        Decimal::ZERO
    }
}

fn component(
    name: &str,
    value: Decimal,
    coefficient: Decimal,
) -> DistressResult<OScoreComponent> {
    Ok(OScoreComponent {
        name: name.to_string(),
        value,
        coefficient,
        weighted_value: checked_product(coefficient, value, name)?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
