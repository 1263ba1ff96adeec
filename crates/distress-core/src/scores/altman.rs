//! Altman Z-Score family for bankruptcy prediction.
//!
//! Exactly one variant is scored per firm, chosen from its classification:
//!
//! 1. **Z'** for private non-manufacturing firms
//! 2. **Z''** for foreign firms (outside the US and Canada) and for
//!    non-manufacturing firms; foreign firms add a 3.25 intercept
//! 3. **Z** (original, market-value based) for everything else
//!
//! The checks run in that order and the first match wins.

use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::math::{checked_product, checked_total, safe_divide};
use crate::providers::{ClassificationProvider, FinancialDataProvider, FirmProfile, LineItem};
use crate::types::{with_metadata, ComputationOutput, Rate, ScoringRequest};
use crate::DistressResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AltmanModel {
    /// Z' (private firms, book equity)
    ZPrime,
    /// Z'' (non-manufacturing and foreign firms, four ratios)
    ZDoublePrime,
    /// Original Z (public manufacturing firms, market equity)
    Original,
}

impl std::fmt::Display for AltmanModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZPrime => write!(f, "Z'-Score (Private)"),
            Self::ZDoublePrime => write!(f, "Z''-Score (Non-Manufacturing / Foreign)"),
            Self::Original => write!(f, "Original Z-Score"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZScoreZone {
    Safe,
    Grey,
    Distress,
}

impl std::fmt::Display for ZScoreZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Safe => write!(f, "safe zone"),
            Self::Grey => write!(f, "grey zone"),
            Self::Distress => write!(f, "distress zone"),
        }
    }
}

/// Fixed zone cut-offs of a variant. Both bounds are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneThresholds {
    pub distress_below: Decimal,
    pub safe_above: Decimal,
}

/// The five Altman ratios; `x4` is already the variant's equity measure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AltmanInput {
    /// Net working capital / total assets
    pub x1: Rate,
    /// Retained earnings / total assets
    pub x2: Rate,
    /// EBIT / total assets
    pub x3: Rate,
    /// Book equity / total liabilities (Z', Z'') or market cap / total liabilities (Z)
    pub x4: Rate,
    /// Net sales / total assets (unused by Z'')
    pub x5: Rate,
    pub profile: FirmProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZScoreComponent {
    pub name: String,
    pub ratio: Decimal,
    pub coefficient: Decimal,
    pub weighted_value: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AltmanOutput {
    pub model: AltmanModel,
    pub score: Decimal,
    pub zone: ZScoreZone,
    pub profile: FirmProfile,
    pub components: Vec<ZScoreComponent>,
    pub intercept: Decimal,
    pub zone_thresholds: ZoneThresholds,
}

// ---------------------------------------------------------------------------
// Coefficients
// ---------------------------------------------------------------------------

// Original Z-Score (public manufacturing)
const Z_COEFF_X1: Decimal = dec!(1.2);
const Z_COEFF_X2: Decimal = dec!(1.4);
const Z_COEFF_X3: Decimal = dec!(3.3);
const Z_COEFF_X4: Decimal = dec!(0.6);
const Z_COEFF_X5: Decimal = dec!(1.0);

// Z'-Score (private)
const ZP_COEFF_X1: Decimal = dec!(0.717);
const ZP_COEFF_X2: Decimal = dec!(0.847);
const ZP_COEFF_X3: Decimal = dec!(3.107);
const ZP_COEFF_X4: Decimal = dec!(0.420);
const ZP_COEFF_X5: Decimal = dec!(0.998);

// Z''-Score (non-manufacturing / foreign)
const ZPP_COEFF_X1: Decimal = dec!(6.56);
const ZPP_COEFF_X2: Decimal = dec!(3.26);
const ZPP_COEFF_X3: Decimal = dec!(6.72);
const ZPP_COEFF_X4: Decimal = dec!(1.05);
const ZPP_FOREIGN_INTERCEPT: Decimal = dec!(3.25);

// Zone thresholds
const Z_SAFE: Decimal = dec!(2.99);
const Z_DISTRESS: Decimal = dec!(1.81);

const ZP_SAFE: Decimal = dec!(2.90);
const ZP_DISTRESS: Decimal = dec!(1.23);

const ZPP_SAFE: Decimal = dec!(2.60);
const ZPP_DISTRESS: Decimal = dec!(1.10);

impl AltmanModel {
    pub fn thresholds(self) -> ZoneThresholds {
        let (distress_below, safe_above) = match self {
            Self::ZPrime => (ZP_DISTRESS, ZP_SAFE),
            Self::ZDoublePrime => (ZPP_DISTRESS, ZPP_SAFE),
            Self::Original => (Z_DISTRESS, Z_SAFE),
        };
        ZoneThresholds {
            distress_below,
            safe_above,
        }
    }

    /// Whether X4 is market capitalisation rather than book equity.
    pub fn uses_market_equity(self) -> bool {
        matches!(self, Self::Original)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Pick the variant for a firm. First match wins.
pub fn select_model(profile: &FirmProfile) -> AltmanModel {
    if !profile.listed && !profile.manufacturing {
        AltmanModel::ZPrime
    } else if profile.foreign || !profile.manufacturing {
        AltmanModel::ZDoublePrime
    } else {
        AltmanModel::Original
    }
}

/// Strict bounds: a score equal to either threshold is grey.
pub fn classify_zone(score: Decimal, thresholds: ZoneThresholds) -> ZScoreZone {
    if score > thresholds.safe_above {
        ZScoreZone::Safe
    } else if score < thresholds.distress_below {
        ZScoreZone::Distress
    } else {
        ZScoreZone::Grey
    }
}

/// Score already computed ratios with the variant the profile selects.
pub fn score_altman(input: &AltmanInput) -> DistressResult<AltmanOutput> {
    let model = select_model(&input.profile);

    let (components, intercept) = match model {
        AltmanModel::ZPrime => (
            vec![
                build_component("X1: Working Capital / Total Assets", input.x1, ZP_COEFF_X1)?,
                build_component("X2: Retained Earnings / Total Assets", input.x2, ZP_COEFF_X2)?,
                build_component("X3: EBIT / Total Assets", input.x3, ZP_COEFF_X3)?,
                build_component("X4: Book Equity / Total Liabilities", input.x4, ZP_COEFF_X4)?,
                build_component("X5: Net Sales / Total Assets", input.x5, ZP_COEFF_X5)?,
            ],
            Decimal::ZERO,
        ),
        AltmanModel::ZDoublePrime => (
            vec![
                build_component("X1: Working Capital / Total Assets", input.x1, ZPP_COEFF_X1)?,
                build_component("X2: Retained Earnings / Total Assets", input.x2, ZPP_COEFF_X2)?,
                build_component("X3: EBIT / Total Assets", input.x3, ZPP_COEFF_X3)?,
                build_component("X4: Book Equity / Total Liabilities", input.x4, ZPP_COEFF_X4)?,
            ],
            if input.profile.foreign {
                ZPP_FOREIGN_INTERCEPT
            } else {
                Decimal::ZERO
            },
        ),
        AltmanModel::Original => (
            vec![
                build_component("X1: Working Capital / Total Assets", input.x1, Z_COEFF_X1)?,
                build_component("X2: Retained Earnings / Total Assets", input.x2, Z_COEFF_X2)?,
                build_component("X3: EBIT / Total Assets", input.x3, Z_COEFF_X3)?,
                build_component("X4: Market Cap / Total Liabilities", input.x4, Z_COEFF_X4)?,
                build_component("X5: Net Sales / Total Assets", input.x5, Z_COEFF_X5)?,
            ],
            Decimal::ZERO,
        ),
    };

    let score = checked_total(
        intercept,
        components.iter().map(|c| c.weighted_value),
        "Altman Z-Score",
    )?;
    let zone_thresholds = model.thresholds();

    Ok(AltmanOutput {
        model,
        score,
        zone: classify_zone(score, zone_thresholds),
        profile: input.profile,
        components,
        intercept,
        zone_thresholds,
    })
}

/// Read the statement figures and classification, then derive the ratios.
///
/// Market capitalisation is only requested when the original variant applies.
pub fn gather_altman_input<F, C>(
    financials: &F,
    classification: &C,
    request: &ScoringRequest,
) -> DistressResult<AltmanInput>
where
    F: FinancialDataProvider + ?Sized,
    C: ClassificationProvider + ?Sized,
{
    let total_assets = financials.line_item(request, LineItem::TotalAssets)?;
    let total_liabilities = financials.line_item(request, LineItem::TotalLiabilities)?;

    let x1 = safe_divide(
        financials.line_item(request, LineItem::NetWorkingCapital)?,
        total_assets,
        "X1: Working Capital / Total Assets",
    )?;
    let x2 = safe_divide(
        financials.line_item(request, LineItem::RetainedEarnings)?,
        total_assets,
        "X2: Retained Earnings / Total Assets",
    )?;
    let x3 = safe_divide(
        financials.line_item(request, LineItem::Ebit)?,
        total_assets,
        "X3: EBIT / Total Assets",
    )?;
    let x5 = safe_divide(
        financials.line_item(request, LineItem::NetSales)?,
        total_assets,
        "X5: Net Sales / Total Assets",
    )?;

    let profile = FirmProfile::resolve(classification, &request.identifier)?;
    let x4 = if select_model(&profile).uses_market_equity() {
        safe_divide(
            financials.line_item(request, LineItem::MarketCapitalization)?,
            total_liabilities,
            "X4: Market Cap / Total Liabilities",
        )?
    } else {
        safe_divide(
            financials.line_item(request, LineItem::ShareholdersEquity)?,
            total_liabilities,
            "X4: Book Equity / Total Liabilities",
        )?
    };

    Ok(AltmanInput {
        x1,
        x2,
        x3,
        x4,
        x5,
        profile,
    })
}

/// Compute the Altman Z-Score of the variant that fits the firm.
pub fn calculate_altman_z_score<F, C>(
    financials: &F,
    classification: &C,
    request: &ScoringRequest,
) -> DistressResult<ComputationOutput<AltmanOutput>>
where
    F: FinancialDataProvider + ?Sized,
    C: ClassificationProvider + ?Sized,
{
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let window_end = request.window_end()?;

    let input = gather_altman_input(financials, classification, request)?;
    if input.x4 < Decimal::ZERO {
        warnings.push("X4 is negative: the firm reports negative equity.".to_string());
    }
    if input.profile.listed && !input.profile.manufacturing {
        warnings.push(format!(
            "{} is listed but not a manufacturer; scored with Z''.",
            request.identifier
        ));
    }

    let output = score_altman(&input)?;

    tracing::debug!(
        identifier = %request.identifier,
        model = %output.model,
        score = %output.score,
        zone = %output.zone,
        "computed Altman Z-Score"
    );

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "methodology": "Altman Z-Score bankruptcy prediction",
        "original_z": "Z = 1.2*X1 + 1.4*X2 + 3.3*X3 + 0.6*X4 + 1.0*X5",
        "z_prime": "Z' = 0.717*X1 + 0.847*X2 + 3.107*X3 + 0.420*X4 + 0.998*X5",
        "z_double_prime": "Z'' = [3.25 if foreign] + 6.56*X1 + 3.26*X2 + 6.72*X3 + 1.05*X4",
        "selection": "private non-manufacturing -> Z'; foreign or non-manufacturing -> Z''; else Z"
    });

    Ok(with_metadata(
        "Altman Z-Score (variant selected by listing, sector and geography)",
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

fn build_component(
    name: &str,
    ratio: Decimal,
    coefficient: Decimal,
) -> DistressResult<ZScoreComponent> {
    Ok(ZScoreComponent {
        name: name.to_string(),
        ratio,
        coefficient,
        weighted_value: checked_product(coefficient, ratio, name)?,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
