//! Piotroski F-Score model for financial strength assessment.
//!
//! Nine binary signals, one point each:
//!
//! **Profitability**:
//! 1. ROA > 0
//! 2. Operating cash flow > 0
//! 3. ROA higher than the prior year
//! 4. Accruals: OCF / total assets > ROA
//!
//! **Leverage, Liquidity and Source of Funds**:
//! 5. Debt ratio lower than the prior year
//! 6. Current ratio higher than the prior year
//! 7. No new shares issued
//!
//! **Operating Efficiency**:
//! 8. Gross margin higher than the prior year
//! 9. Asset turnover higher than the prior year
//!
//! Score 7-9 = Strong, 4-6 = Moderate, 0-3 = Weak.
//!
//! Every signal keeps the figures it was decided on, rendered as fixed-point
//! strings, so a breakdown can be audited without re-querying the provider.

use std::time::Instant;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::math::{fmt_dp, safe_divide};
use crate::providers::{FinancialDataProvider, LineItem, Ratio};
use crate::types::{with_metadata, ComputationOutput, Money, Rate, ScoringRequest};
use crate::DistressResult;

// ---------------------------------------------------------------------------
// Input / Output
// ---------------------------------------------------------------------------

/// Figures compared year over year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearFigures {
    pub return_on_assets: Rate,
    pub debt_ratio: Rate,
    pub current_ratio: Rate,
    pub shares_outstanding: Decimal,
    pub gross_margin: Rate,
    pub asset_turnover: Rate,
}

/// Financial data required for the Piotroski F-Score calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiotroskiInput {
    pub current: YearFigures,
    pub prior: YearFigures,
    pub operating_cash_flow: Money,
    pub total_assets: Money,
}

/// A signal decided on a single current-year figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSignal {
    pub current: String,
    pub passed: bool,
}

/// A signal decided by comparing the current year with the prior one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearOverYearSignal {
    pub current: String,
    pub prior: String,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccrualsSignal {
    pub operating_cash_flow: String,
    pub total_assets: String,
    pub accruals: String,
    pub return_on_assets: String,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitabilitySignals {
    pub return_on_assets: LevelSignal,
    pub operating_cash_flow: LevelSignal,
    pub change_in_return_on_assets: YearOverYearSignal,
    pub accruals: AccrualsSignal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeverageLiquiditySignals {
    pub change_in_leverage: YearOverYearSignal,
    pub change_in_current_ratio: YearOverYearSignal,
    pub change_in_shares_outstanding: YearOverYearSignal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingEfficiencySignals {
    pub change_in_gross_margin: YearOverYearSignal,
    pub change_in_asset_turnover: YearOverYearSignal,
}

/// Individual signal results and the composite F-Score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PiotroskiOutput {
    pub profitability: ProfitabilitySignals,
    pub leverage_liquidity: LeverageLiquiditySignals,
    pub operating_efficiency: OperatingEfficiencySignals,
    /// Total score (0-9).
    pub f_score: u8,
    /// Classification: "Strong" (7-9), "Moderate" (4-6), "Weak" (0-3).
    pub strength: String,
}

impl PiotroskiOutput {
    /// The nine signal outcomes in table order.
    pub fn signals(&self) -> [bool; 9] {
        [
            self.profitability.return_on_assets.passed,
            self.profitability.operating_cash_flow.passed,
            self.profitability.change_in_return_on_assets.passed,
            self.profitability.accruals.passed,
            self.leverage_liquidity.change_in_leverage.passed,
            self.leverage_liquidity.change_in_current_ratio.passed,
            self.leverage_liquidity.change_in_shares_outstanding.passed,
            self.operating_efficiency.change_in_gross_margin.passed,
            self.operating_efficiency.change_in_asset_turnover.passed,
        ]
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn classify(score: u8) -> String {
    match score {
        7..=9 => "Strong".to_string(),
        4..=6 => "Moderate".to_string(),
        _ => "Weak".to_string(),
    }
}

fn ratio_change(current: Rate, prior: Rate, passed: bool) -> YearOverYearSignal {
    YearOverYearSignal {
        current: fmt_dp(current, 4),
        prior: fmt_dp(prior, 4),
        passed,
    }
}

fn gather_year<F: FinancialDataProvider + ?Sized>(
    financials: &F,
    request: &ScoringRequest,
) -> DistressResult<YearFigures> {
    Ok(YearFigures {
        return_on_assets: financials.ratio(request, Ratio::ReturnOnAssets)?,
        debt_ratio: financials.ratio(request, Ratio::DebtRatio)?,
        current_ratio: financials.ratio(request, Ratio::CurrentRatio)?,
        shares_outstanding: financials.line_item(
            request,
            LineItem::SharesOutstanding {
                diluted: request.diluted_shares,
            },
        )?,
        gross_margin: financials.ratio(request, Ratio::GrossMargin)?,
        asset_turnover: financials.ratio(request, Ratio::AssetTurnover)?,
    })
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Read the current- and prior-year figures the nine signals need.
pub fn gather_piotroski_input<F: FinancialDataProvider + ?Sized>(
    financials: &F,
    request: &ScoringRequest,
) -> DistressResult<PiotroskiInput> {
    Ok(PiotroskiInput {
        current: gather_year(financials, request)?,
        prior: gather_year(financials, &request.prior_year())?,
        operating_cash_flow: financials.line_item(request, LineItem::OperatingCashFlow)?,
        total_assets: financials.line_item(request, LineItem::TotalAssets)?,
    })
}

/// Decide the nine signals (score 0-9) from already gathered figures.
pub fn evaluate_piotroski(input: &PiotroskiInput) -> DistressResult<PiotroskiOutput> {
    let cur = &input.current;
    let prior = &input.prior;

    // ---- Profitability ----
    let accruals = safe_divide(
        input.operating_cash_flow,
        input.total_assets,
        "Accruals: Operating Cash Flow / Total Assets",
    )?;

    let profitability = ProfitabilitySignals {
        return_on_assets: LevelSignal {
            current: fmt_dp(cur.return_on_assets, 4),
            passed: cur.return_on_assets > Decimal::ZERO,
        },
        operating_cash_flow: LevelSignal {
            current: fmt_dp(input.operating_cash_flow, 2),
            passed: input.operating_cash_flow > Decimal::ZERO,
        },
        change_in_return_on_assets: ratio_change(
            cur.return_on_assets,
            prior.return_on_assets,
            cur.return_on_assets > prior.return_on_assets,
        ),
        accruals: AccrualsSignal {
            operating_cash_flow: input.operating_cash_flow.normalize().to_string(),
            total_assets: input.total_assets.normalize().to_string(),
            accruals: fmt_dp(accruals, 4),
            return_on_assets: fmt_dp(cur.return_on_assets, 4),
            passed: accruals > cur.return_on_assets,
        },
    };

    // ---- Leverage, liquidity and source of funds ----
    let leverage_liquidity = LeverageLiquiditySignals {
        change_in_leverage: ratio_change(
            cur.debt_ratio,
            prior.debt_ratio,
            cur.debt_ratio < prior.debt_ratio,
        ),
        change_in_current_ratio: ratio_change(
            cur.current_ratio,
            prior.current_ratio,
            cur.current_ratio > prior.current_ratio,
        ),
        change_in_shares_outstanding: YearOverYearSignal {
            current: cur.shares_outstanding.normalize().to_string(),
            prior: prior.shares_outstanding.normalize().to_string(),
            passed: cur.shares_outstanding <= prior.shares_outstanding,
        },
    };

    // ---- Operating efficiency ----
    let operating_efficiency = OperatingEfficiencySignals {
        change_in_gross_margin: ratio_change(
            cur.gross_margin,
            prior.gross_margin,
            cur.gross_margin > prior.gross_margin,
        ),
        change_in_asset_turnover: ratio_change(
            cur.asset_turnover,
            prior.asset_turnover,
            cur.asset_turnover > prior.asset_turnover,
        ),
    };

    let mut output = PiotroskiOutput {
        profitability,
        leverage_liquidity,
        operating_efficiency,
        f_score: 0,
        strength: String::new(),
    };

    // ---- Tally ----
    output.f_score = output.signals().iter().filter(|&&s| s).count() as u8;
    output.strength = classify(output.f_score);
    Ok(output)
}

/// Compute the Piotroski F-Score for `request` from provider figures.
///
/// Provider failures and a zero total-assets figure surface unchanged.
pub fn calculate_piotroski_f_score<F: FinancialDataProvider + ?Sized>(
    financials: &F,
    request: &ScoringRequest,
) -> DistressResult<ComputationOutput<PiotroskiOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let window_end = request.window_end()?;

    let input = gather_piotroski_input(financials, request)?;
    if input.total_assets < Decimal::ZERO {
        warnings.push("Total assets are negative; the accruals signal is unreliable.".into());
    }
    let output = evaluate_piotroski(&input)?;

    tracing::debug!(
        identifier = %request.identifier,
        %window_end,
        f_score = output.f_score,
        "computed Piotroski F-Score"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "prior_year_lookback_days": request.prior_year().lookback_days,
        "diluted_shares": request.diluted_shares,
        "scoring": "one point per passing signal, 0-9",
        "strength": "Strong 7-9, Moderate 4-6, Weak 0-3"
    });

    Ok(with_metadata(
        "Piotroski F-Score (2000)",
        &assumptions,
        warnings,
        request,
        window_end,
        elapsed,
        output,
    ))
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{request, FakeProvider};
    use crate::DistressError;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    /// Helper: a strong company (all 9 signals positive).
    fn strong_input() -> PiotroskiInput {
        PiotroskiInput {
            current: YearFigures {
                return_on_assets: dec!(0.10),
                debt_ratio: dec!(0.40),
                current_ratio: dec!(2.0),
                shares_outstanding: dec!(100),
                gross_margin: dec!(0.45),
                asset_turnover: dec!(1.2),
            },
            prior: YearFigures {
                return_on_assets: dec!(0.08),
                debt_ratio: dec!(0.45), // deleveraging
                current_ratio: dec!(1.75),
                shares_outstanding: dec!(100), // no dilution
                gross_margin: dec!(0.40),
                asset_turnover: dec!(1.1),
            },
            operating_cash_flow: dec!(150), // 0.15 of assets > ROA
            total_assets: dec!(1000),
        }
    }

    /// Helper: a weak company (all 9 signals negative).
    fn weak_input() -> PiotroskiInput {
        PiotroskiInput {
            current: YearFigures {
                return_on_assets: dec!(-0.05),
                debt_ratio: dec!(0.60),
                current_ratio: dec!(0.67),
                shares_outstanding: dec!(120),
                gross_margin: dec!(0.30),
                asset_turnover: dec!(0.8),
            },
            prior: YearFigures {
                return_on_assets: dec!(-0.02),
                debt_ratio: dec!(0.50),
                current_ratio: dec!(0.83),
                shares_outstanding: dec!(100),
                gross_margin: dec!(0.35),
                asset_turnover: dec!(0.9),
            },
            operating_cash_flow: dec!(-60), // -0.06 < ROA of -0.05
            total_assets: dec!(1000),
        }
    }

    #[test]
    fn test_perfect_score() {
        let out = evaluate_piotroski(&strong_input()).unwrap();
        assert_eq!(out.f_score, 9);
        assert_eq!(out.strength, "Strong");
    }

    #[test]
    fn test_zero_score() {
        let out = evaluate_piotroski(&weak_input()).unwrap();
        assert_eq!(out.f_score, 0);
        assert_eq!(out.strength, "Weak");
    }

    #[test]
    fn test_only_roa_positive_scores_one() {
        let mut input = weak_input();
        input.current.return_on_assets = dec!(0.01);
        input.prior.return_on_assets = dec!(0.05); // no improvement
        let out = evaluate_piotroski(&input).unwrap();
        assert!(out.profitability.return_on_assets.passed);
        assert_eq!(out.f_score, 1);
        assert_eq!(
            out.signals(),
            [true, false, false, false, false, false, false, false, false]
        );
    }

    #[test]
    fn test_score_equals_count_of_signals() {
        let mut input = weak_input();
        input.operating_cash_flow = dec!(10);
        input.current.gross_margin = dec!(0.50);
        input.current.shares_outstanding = dec!(90);
        let out = evaluate_piotroski(&input).unwrap();
        let count = out.signals().iter().filter(|s| **s).count();
        assert_eq!(out.f_score as usize, count);
        assert!(out.f_score <= 9);
    }

    #[test]
    fn test_cfo_signal() {
        let mut input = weak_input();
        input.operating_cash_flow = dec!(50);
        let out = evaluate_piotroski(&input).unwrap();
        assert!(out.profitability.operating_cash_flow.passed);
        assert_eq!(out.profitability.operating_cash_flow.current, "50.00");
    }

    #[test]
    fn test_delta_roa_signal() {
        let mut input = weak_input();
        input.current.return_on_assets = dec!(0.10);
        input.prior.return_on_assets = dec!(0.05);
        let out = evaluate_piotroski(&input).unwrap();
        let signal = &out.profitability.change_in_return_on_assets;
        assert!(signal.passed);
        assert_eq!(signal.current, "0.1000");
        assert_eq!(signal.prior, "0.0500");
    }

    #[test]
    fn test_accruals_compares_cash_return_with_roa() {
        let mut input = strong_input();
        // OCF / TA = 0.10 equals ROA: not strictly greater
        input.operating_cash_flow = dec!(100);
        let out = evaluate_piotroski(&input).unwrap();
        assert!(!out.profitability.accruals.passed);
        assert_eq!(out.profitability.accruals.accruals, "0.1000");
        assert_eq!(out.profitability.accruals.total_assets, "1000");
        assert_eq!(out.f_score, 8);
    }

    #[test]
    fn test_leverage_signal_is_strict() {
        let mut input = strong_input();
        input.prior.debt_ratio = input.current.debt_ratio;
        let out = evaluate_piotroski(&input).unwrap();
        assert!(!out.leverage_liquidity.change_in_leverage.passed);
    }

    #[test]
    fn test_leverage_breakdown_reports_prior_value() {
        let out = evaluate_piotroski(&strong_input()).unwrap();
        let signal = &out.leverage_liquidity.change_in_leverage;
        assert_eq!(signal.current, "0.4000");
        assert_eq!(signal.prior, "0.4500");
    }

    #[test]
    fn test_current_ratio_signal() {
        let mut input = weak_input();
        input.current.current_ratio = dec!(2.0);
        input.prior.current_ratio = dec!(1.5);
        let out = evaluate_piotroski(&input).unwrap();
        assert!(out.leverage_liquidity.change_in_current_ratio.passed);
    }

    #[test]
    fn test_no_dilution_signal_allows_equal_counts() {
        let mut input = weak_input();
        input.current.shares_outstanding = dec!(100);
        input.prior.shares_outstanding = dec!(100);
        let out = evaluate_piotroski(&input).unwrap();
        assert!(out.leverage_liquidity.change_in_shares_outstanding.passed);
    }

    #[test]
    fn test_gross_margin_signal() {
        let mut input = weak_input();
        input.current.gross_margin = dec!(0.40);
        let out = evaluate_piotroski(&input).unwrap();
        assert!(out.operating_efficiency.change_in_gross_margin.passed);
    }

    #[test]
    fn test_asset_turnover_signal() {
        let mut input = weak_input();
        input.current.asset_turnover = dec!(1.2);
        input.prior.asset_turnover = dec!(1.0);
        let out = evaluate_piotroski(&input).unwrap();
        assert!(out.operating_efficiency.change_in_asset_turnover.passed);
    }

    #[test]
    fn test_moderate_score() {
        let mut input = weak_input();
        input.current.return_on_assets = dec!(0.05); // ROA+, DROA+
        input.operating_cash_flow = dec!(150); // OCF+, accruals+
        input.current.debt_ratio = dec!(0.40); // leverage-
        let out = evaluate_piotroski(&input).unwrap();
        assert_eq!(out.f_score, 5);
        assert_eq!(out.strength, "Moderate");
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(7), "Strong");
        assert_eq!(classify(6), "Moderate");
        assert_eq!(classify(4), "Moderate");
        assert_eq!(classify(3), "Weak");
    }

    #[test]
    fn test_zero_total_assets_is_division_error() {
        let mut input = strong_input();
        input.total_assets = Decimal::ZERO;
        match evaluate_piotroski(&input).unwrap_err() {
            DistressError::DivisionByZero { context } => assert!(context.contains("Accruals")),
            other => panic!("Expected DivisionByZero, got {other:?}"),
        }
    }

    fn provider_for(input: &PiotroskiInput, diluted: bool) -> FakeProvider {
        let mut fake = FakeProvider::new()
            .with_item(0, LineItem::OperatingCashFlow, input.operating_cash_flow)
            .with_item(0, LineItem::TotalAssets, input.total_assets);
        for (lookback, year) in [(0, &input.current), (365, &input.prior)] {
            fake = fake
                .with_ratio(lookback, Ratio::ReturnOnAssets, year.return_on_assets)
                .with_ratio(lookback, Ratio::DebtRatio, year.debt_ratio)
                .with_ratio(lookback, Ratio::CurrentRatio, year.current_ratio)
                .with_ratio(lookback, Ratio::GrossMargin, year.gross_margin)
                .with_ratio(lookback, Ratio::AssetTurnover, year.asset_turnover)
                .with_item(
                    lookback,
                    LineItem::SharesOutstanding { diluted },
                    year.shares_outstanding,
                );
        }
        fake
    }

    #[test]
    fn test_gather_reads_current_and_prior_windows() {
        let fake = provider_for(&strong_input(), true);
        let input = gather_piotroski_input(&fake, &request()).unwrap();
        assert_eq!(input.current, strong_input().current);
        assert_eq!(input.prior, strong_input().prior);
    }

    #[test]
    fn test_gather_honours_basic_share_count() {
        let fake = provider_for(&strong_input(), false);
        let req = request().with_diluted_shares(false);
        assert!(gather_piotroski_input(&fake, &req).is_ok());
        // Diluted counts were never supplied
        assert!(matches!(
            gather_piotroski_input(&fake, &request()),
            Err(DistressError::MissingData { .. })
        ));
    }

    #[test]
    fn test_calculate_end_to_end() {
        let fake = provider_for(&strong_input(), true);
        let result = calculate_piotroski_f_score(&fake, &request()).unwrap();
        assert_eq!(result.result.f_score, 9);
        assert!(result.methodology.contains("Piotroski"));
        assert_eq!(result.metadata.identifier, "ACME");
        assert_eq!(result.assumptions["prior_year_lookback_days"], 365);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_missing_prior_year_propagates() {
        let input = strong_input();
        let fake = FakeProvider::new()
            .with_item(0, LineItem::OperatingCashFlow, input.operating_cash_flow)
            .with_item(0, LineItem::TotalAssets, input.total_assets)
            .with_ratio(0, Ratio::ReturnOnAssets, dec!(0.1))
            .with_ratio(0, Ratio::DebtRatio, dec!(0.4))
            .with_ratio(0, Ratio::CurrentRatio, dec!(2))
            .with_ratio(0, Ratio::GrossMargin, dec!(0.4))
            .with_ratio(0, Ratio::AssetTurnover, dec!(1))
            .with_item(0, LineItem::SharesOutstanding { diluted: true }, dec!(100));
        assert!(matches!(
            calculate_piotroski_f_score(&fake, &request()),
            Err(DistressError::MissingData { .. })
        ));
    }
}
