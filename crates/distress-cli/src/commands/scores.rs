use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use distress_core::providers::listing;
use distress_core::providers::snapshot::SnapshotProvider;
use distress_core::scores::{altman, chs, ohlson, piotroski};
use distress_core::{ReportingPeriod, ScoringRequest};

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PeriodArg {
    Ttm,
    Annual,
    Quarterly,
}

impl From<PeriodArg> for ReportingPeriod {
    fn from(period: PeriodArg) -> Self {
        match period {
            PeriodArg::Ttm => ReportingPeriod::Ttm,
            PeriodArg::Annual => ReportingPeriod::Annual,
            PeriodArg::Quarterly => ReportingPeriod::Quarterly,
        }
    }
}

#[derive(Args)]
pub struct ScoreArgs {
    /// Provider snapshot (JSON); read from stdin when omitted
    #[arg(long)]
    pub input: Option<String>,
    /// Identifier of the company in the snapshot
    #[arg(long)]
    pub ticker: String,
    /// Reference date, YYYY-MM-DD
    #[arg(long)]
    pub as_of: NaiveDate,
    /// Days subtracted from the reference date before reading figures
    #[arg(long, default_value_t = 0)]
    pub lookback_days: u32,
    #[arg(long, value_enum, default_value = "ttm")]
    pub period: PeriodArg,
    /// Count basic instead of diluted shares
    #[arg(long)]
    pub basic_shares: bool,
    /// Reference exchange listing (JSON) deciding public vs private
    #[arg(long)]
    pub listing: Option<String>,
}

impl ScoreArgs {
    fn request(&self) -> ScoringRequest {
        ScoringRequest::new(self.ticker.trim(), self.as_of)
            .with_lookback_days(self.lookback_days)
            .with_period(self.period.into())
            .with_diluted_shares(!self.basic_shares)
    }

    fn provider(&self) -> Result<SnapshotProvider, Box<dyn std::error::Error>> {
        let contents = if let Some(ref path) = self.input {
            input::file::read_text(path)?
        } else if let Some(data) = input::stdin::read_stdin()? {
            data
        } else {
            return Err("--input <snapshot.json> or stdin required".into());
        };
        let snapshot = SnapshotProvider::from_json_str(&contents)?;
        match self.listing {
            Some(ref path) => Ok(snapshot.with_listing(listing::init_reference_listing(path)?)),
            None => Ok(snapshot),
        }
    }
}

pub fn run_piotroski(args: ScoreArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let provider = args.provider()?;
    let result = piotroski::calculate_piotroski_f_score(&provider, &args.request())?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_altman(args: ScoreArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let provider = args.provider()?;
    let result = altman::calculate_altman_z_score(&provider, &provider, &args.request())?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_ohlson(args: ScoreArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let provider = args.provider()?;
    let result = ohlson::calculate_ohlson_o_score(&provider, &provider, &args.request())?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_chs(args: ScoreArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let provider = args.provider()?;
    let result = chs::calculate_chs_probability(&provider, &provider, &args.request())?;
    Ok(serde_json::to_value(result)?)
}

/// Headline figures of every model. A model that cannot be scored is left
/// empty and its error reported as a warning.
#[derive(Debug, Default, Serialize)]
struct DistressReport {
    identifier: String,
    f_score: Option<u8>,
    piotroski_strength: Option<String>,
    altman_model: Option<String>,
    altman_score: Option<Decimal>,
    altman_zone: Option<String>,
    o_score: Option<Decimal>,
    ohlson_probability: Option<Decimal>,
    chs_probability: Option<Decimal>,
}

pub fn run_report(args: ScoreArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let provider = args.provider()?;
    let request = args.request();
    let mut report = DistressReport {
        identifier: request.identifier.clone(),
        ..Default::default()
    };
    let mut warnings: Vec<String> = Vec::new();

    match piotroski::calculate_piotroski_f_score(&provider, &request) {
        Ok(out) => {
            report.f_score = Some(out.result.f_score);
            report.piotroski_strength = Some(out.result.strength);
        }
        Err(e) => warnings.push(format!("Piotroski: {e}")),
    }
    match altman::calculate_altman_z_score(&provider, &provider, &request) {
        Ok(out) => {
            report.altman_model = Some(out.result.model.to_string());
            report.altman_score = Some(out.result.score);
            report.altman_zone = Some(out.result.zone.to_string());
        }
        Err(e) => warnings.push(format!("Altman: {e}")),
    }
    match ohlson::calculate_ohlson_o_score(&provider, &provider, &request) {
        Ok(out) => {
            report.o_score = Some(out.result.o_score);
            report.ohlson_probability = Some(out.result.probability);
        }
        Err(e) => warnings.push(format!("Ohlson: {e}")),
    }
    match chs::calculate_chs_probability(&provider, &provider, &request) {
        Ok(out) => report.chs_probability = Some(out.result.probability),
        Err(e) => warnings.push(format!("CHS: {e}")),
    }

    for warning in &warnings {
        tracing::warn!(identifier = %request.identifier, "{warning}");
    }

    Ok(serde_json::json!({
        "result": report,
        "methodology": "Piotroski F-Score, Altman Z-Score, Ohlson O-Score and CHS probability",
        "warnings": warnings,
    }))
}
