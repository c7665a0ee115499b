//! Backtest a moving-average model on a synthetic daily sales series.
//!
//! Run with `RUST_LOG=debug` to see per-fold progress.

use chrono::{Duration, NaiveDate};
use forecast_backtest::{
    BacktestConfig, BacktestLimits, BacktestOrchestrator, InMemorySeriesLoader, ModelConfig,
    SeriesKey, SplitConfig, SplitStrategy,
};
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Weekly seasonality, slow trend and gaussian noise
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("invalid start date")?;
    let days = 180;
    let mut rng = rand::rngs::StdRng::seed_from_u64(42);
    let noise = Normal::new(0.0, 4.0)?;
    let weekly = [0.0, 6.0, 12.0, 9.0, 4.0, -8.0, -10.0];

    let dates: Vec<NaiveDate> = (0..days).map(|i| start + Duration::days(i)).collect();
    let values: Vec<f64> = (0..days as usize)
        .map(|i| 120.0 + 0.2 * i as f64 + weekly[i % 7] + noise.sample(&mut rng))
        .collect();

    let mut loader = InMemorySeriesLoader::new();
    loader.insert("store-1", "sku-42", &dates, &values)?;
    let key = SeriesKey::new("store-1", "sku-42", dates[0], dates[dates.len() - 1]);

    let split = SplitConfig::new(SplitStrategy::Expanding, 6, 14, 56, 1)?;
    let config = BacktestConfig::new(ModelConfig::MovingAverage { window: 7 }, split);

    let orchestrator = BacktestOrchestrator::new(BacktestLimits::default());
    let response = orchestrator.run_from_loader(&loader, &key, &config)?;

    println!("{}", response.to_json()?);
    for baseline in ["naive", "seasonal_naive"] {
        if let Some(pct) = response.improvement_over(baseline, "mae") {
            println!("MAE improvement over {}: {:.2}%", baseline, pct);
        }
    }

    Ok(())
}
