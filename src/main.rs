//! One-shot delivery estimate
//!
//! Usage:
//!   delivery_estimate "<restaurant address>" "<delivery address>" [preparation count] [--lang <code>]
//!
//! Prints the estimate as JSON. Geocoder and pricing settings come from the
//! same environment variables as the API server.

use delivery_estimator::{
    AppConfig, DeliveryEstimateRequest, DeliveryEstimator, NominatimGeocoder,
};
use eyre::{eyre, Result};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const USAGE: &str =
    "usage: delivery_estimate <restaurant address> <delivery address> [preparation count] [--lang <code>]";

fn parse_args(args: &[String]) -> Result<DeliveryEstimateRequest> {
    let mut positional = Vec::new();
    let mut language = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--lang" {
            let value = iter.next().ok_or_else(|| eyre!("--lang needs a value\n{}", USAGE))?;
            language = Some(value.clone());
        } else {
            positional.push(arg.clone());
        }
    }

    if positional.len() < 2 || positional.len() > 3 {
        return Err(eyre!(USAGE));
    }

    // Negative counts are treated as an empty queue
    let preparation_count = match positional.get(2) {
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| eyre!("preparation count must be an integer, got '{}'", raw))?
            .clamp(0, u32::MAX as i64) as u32,
        None => 0,
    };

    let mut request = DeliveryEstimateRequest::new(
        positional[0].clone(),
        positional[1].clone(),
        preparation_count,
    );
    request.language = language;
    Ok(request)
}

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let request = parse_args(&args)?;

    let config = AppConfig::from_env()?;
    let geocoder = Arc::new(NominatimGeocoder::new(&config.geocoder)?);
    let estimator = DeliveryEstimator::new(geocoder, config.pricing)
        .with_lookup_timeout(config.geocoder.timeout);

    let result = estimator.estimate(&request).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
