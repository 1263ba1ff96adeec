use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use distress_core::scores::probability::probability_of_bankruptcy;

#[derive(Args)]
pub struct ProbabilityArgs {
    /// Linear log-odds score, e.g. an Ohlson O-Score
    #[arg(long, allow_hyphen_values = true)]
    pub score: Decimal,
}

pub fn run_probability(args: ProbabilityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let probability = probability_of_bankruptcy(args.score);
    Ok(serde_json::json!({
        "result": {
            "linear_score": args.score,
            "probability": probability,
        },
        "methodology": "Logistic transform e^x / (1 + e^x)",
        "warnings": [],
    }))
}
