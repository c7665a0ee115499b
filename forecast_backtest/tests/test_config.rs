use forecast_backtest::{BacktestConfig, BacktestLimits, ModelConfig, SplitConfig, SplitStrategy};
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::NamedTempFile;

fn config() -> BacktestConfig {
    BacktestConfig::new(
        ModelConfig::ExponentialSmoothing { alpha: 0.4 },
        SplitConfig::new(SplitStrategy::Sliding, 4, 7, 28, 2).unwrap(),
    )
}

#[test]
fn test_config_hash_is_stable() {
    let a = config();
    let b = config();
    assert_eq!(a.config_hash(), a.config_hash());
    assert_eq!(a.config_hash(), b.config_hash());
    assert_eq!(a.config_hash().len(), 16);
    assert!(a.config_hash().chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_config_hash_changes_with_every_field() {
    let base = config();
    let variants = vec![
        base.clone().with_baselines(false),
        base.clone().with_fold_details(true),
        BacktestConfig {
            model: ModelConfig::ExponentialSmoothing { alpha: 0.5 },
            ..base.clone()
        },
        BacktestConfig {
            model: ModelConfig::Naive,
            ..base.clone()
        },
        BacktestConfig {
            split_config: base.split_config.clone().with_strategy(SplitStrategy::Expanding),
            ..base.clone()
        },
        BacktestConfig {
            split_config: base.split_config.clone().with_gap(3),
            ..base.clone()
        },
        BacktestConfig {
            split_config: SplitConfig {
                n_splits: 5,
                ..base.split_config.clone()
            },
            ..base.clone()
        },
        BacktestConfig {
            split_config: SplitConfig {
                horizon: 8,
                ..base.split_config.clone()
            },
            ..base.clone()
        },
        BacktestConfig {
            split_config: SplitConfig {
                min_train_size: 29,
                ..base.split_config.clone()
            },
            ..base.clone()
        },
    ];

    for variant in &variants {
        assert_ne!(variant.config_hash(), base.config_hash(), "{:?}", variant);
    }
}

#[test]
fn test_config_json_round_trip_keeps_hash() {
    let original = config();
    let json = serde_json::to_string(&original).unwrap();
    let restored: BacktestConfig = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, original);
    assert_eq!(restored.config_hash(), original.config_hash());
}

#[test]
fn test_config_defaults_from_json() {
    let json = r#"{
        "model": {"model_type": "moving_average", "window": 14},
        "split_config": {"strategy": "sliding", "n_splits": 3, "horizon": 7, "min_train_size": 30, "gap": 0}
    }"#;
    let config: BacktestConfig = serde_json::from_str(json).unwrap();

    assert!(config.include_baselines);
    assert!(!config.store_fold_details);
    assert_eq!(config.model, ModelConfig::MovingAverage { window: 14 });
}

#[test]
fn test_limits_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "max_splits = 10").unwrap();
    writeln!(file, "max_gap = 5").unwrap();
    writeln!(file, "recommended_min_train_size = 60").unwrap();

    let limits = BacktestLimits::from_toml_file(file.path()).unwrap();
    assert_eq!(
        limits,
        BacktestLimits {
            max_splits: 10,
            max_gap: 5,
            recommended_min_train_size: 60,
        }
    );
}

#[test]
fn test_limits_bad_toml() {
    assert!(BacktestLimits::from_toml_str("max_splits = \"many\"").is_err());
}

#[test]
fn test_deserialized_split_config_is_checked_by_validate() {
    let json = r#"{"strategy": "expanding", "n_splits": 1, "horizon": 7, "min_train_size": 30, "gap": 0}"#;
    let split: SplitConfig = serde_json::from_str(json).unwrap();

    assert!(matches!(
        split.validate(),
        Err(forecast_backtest::BacktestError::ConfigError(_))
    ));
    assert!(forecast_backtest::TimeSeriesSplitter::new(split).is_err());
}
