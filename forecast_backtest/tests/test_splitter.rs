use chrono::{Duration, NaiveDate};
use forecast_backtest::{
    split, validate_no_leakage, BacktestConfig, BacktestError, BacktestOrchestrator, Fold,
    ModelConfig, SeriesData, SeriesKey, SplitConfig, SplitStrategy, TimeSeriesSplitter,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn create_series(n: usize) -> (Vec<NaiveDate>, Vec<f64>) {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let dates = (0..n).map(|i| start + Duration::days(i as i64)).collect();
    let values = (0..n).map(|i| 50.0 + (i % 7) as f64 * 3.0).collect();
    (dates, values)
}

fn config(strategy: SplitStrategy) -> SplitConfig {
    SplitConfig::new(strategy, 5, 14, 30, 0).unwrap()
}

#[test]
fn test_expanding_120_observations() {
    let (dates, values) = create_series(120);
    let config = config(SplitStrategy::Expanding);
    let folds: Vec<Fold> = split(&dates, &values, &config).unwrap().collect();

    assert_eq!(folds.len(), 5);
    assert!(folds[0].train_size() >= 30);
    for fold in &folds {
        assert_eq!(fold.test_size(), 14);
    }
    for pair in folds.windows(2) {
        assert!(pair[1].train_size() > pair[0].train_size());
    }
    assert!(validate_no_leakage(&dates, &values, &config));
}

#[test]
fn test_sliding_120_observations() {
    let (dates, values) = create_series(120);
    let config = config(SplitStrategy::Sliding);
    let folds: Vec<Fold> = split(&dates, &values, &config).unwrap().collect();

    assert_eq!(folds.len(), 5);
    for fold in &folds {
        assert_eq!(fold.train_size(), 30);
        assert_eq!(fold.test_size(), 14);
    }
    for pair in folds.windows(2) {
        assert!(pair[1].train_indices.start > pair[0].train_indices.start);
    }
    assert!(validate_no_leakage(&dates, &values, &config));
}

#[rstest]
#[case(SplitStrategy::Expanding)]
#[case(SplitStrategy::Sliding)]
fn test_fold_indices_are_sequential(#[case] strategy: SplitStrategy) {
    let (dates, values) = create_series(200);
    let config = SplitConfig::new(strategy, 6, 10, 40, 2).unwrap();
    let indices: Vec<usize> = split(&dates, &values, &config)
        .unwrap()
        .map(|fold| fold.fold_index)
        .collect();

    assert_eq!(indices, (0..6).collect::<Vec<_>>());
}

#[rstest]
#[case(SplitStrategy::Expanding)]
#[case(SplitStrategy::Sliding)]
fn test_split_is_deterministic(#[case] strategy: SplitStrategy) {
    let (dates, values) = create_series(150);
    let splitter = TimeSeriesSplitter::new(SplitConfig::new(strategy, 4, 7, 20, 3).unwrap()).unwrap();

    let first: Vec<_> = splitter
        .split(&dates, &values)
        .unwrap()
        .map(|f| (f.train_indices, f.test_indices))
        .collect();
    let second: Vec<_> = splitter
        .split(&dates, &values)
        .unwrap()
        .map(|f| (f.train_indices, f.test_indices))
        .collect();

    assert_eq!(first, second);
}

#[test]
fn test_dates_follow_indices() {
    let (dates, values) = create_series(120);
    let config = SplitConfig::new(SplitStrategy::Expanding, 3, 10, 30, 5).unwrap();

    for fold in split(&dates, &values, &config).unwrap() {
        assert_eq!(fold.train_dates.first(), Some(&dates[fold.train_indices.start]));
        assert_eq!(fold.train_dates.last(), Some(&dates[fold.train_indices.end - 1]));
        assert_eq!(fold.test_dates.first(), Some(&dates[fold.test_indices.start]));
        assert!(fold.train_dates.last().unwrap() < fold.test_dates.first().unwrap());
        assert_eq!(fold.realized_gap(), 5);
    }
}

#[test]
fn test_reduced_splits_still_leak_free() {
    let (dates, values) = create_series(70);
    let config = SplitConfig::new(SplitStrategy::Expanding, 10, 14, 30, 0).unwrap();
    let folds = split(&dates, &values, &config).unwrap();

    assert!(folds.plan().is_reduced());
    assert_eq!(folds.plan().n_splits, 2);
    assert_eq!(folds.count(), 2);
    assert!(validate_no_leakage(&dates, &values, &config));
}

#[test]
fn test_insufficient_data_reports_shortfall() {
    let (dates, values) = create_series(40);
    let config = SplitConfig::new(SplitStrategy::Sliding, 3, 7, 30, 5).unwrap();
    let err = split(&dates, &values, &config).unwrap_err();

    let message = err.to_string();
    assert!(matches!(
        err,
        BacktestError::InsufficientData {
            n_samples: 40,
            min_required: 42,
            min_train_size: 30,
            gap: 5,
            horizon: 7,
        }
    ));
    assert!(message.contains("short by 2"));
}

#[test]
fn test_mismatched_inputs_rejected() {
    let (dates, mut values) = create_series(100);
    values.pop();
    let err = split(&dates, &values, &config(SplitStrategy::Expanding)).unwrap_err();
    assert!(matches!(err, BacktestError::DataError(_)));
}

#[rstest]
#[case(SplitConfig { horizon: usize::MAX, min_train_size: 1, ..SplitConfig::default() })]
#[case(SplitConfig { min_train_size: usize::MAX, ..SplitConfig::default() })]
#[case(SplitConfig { min_train_size: usize::MAX - 10, gap: 5, horizon: 10, ..SplitConfig::default() })]
fn test_overflowing_window_sizes_are_rejected(#[case] config: SplitConfig) {
    let (dates, values) = create_series(10);

    assert!(matches!(
        split(&dates, &values, &config),
        Err(BacktestError::ConfigError(_))
    ));
    assert!(!validate_no_leakage(&dates, &values, &config));

    let key = SeriesKey::new("S1", "P1", dates[0], dates[9]);
    let series = SeriesData::new(key, dates, values).unwrap();
    let err = BacktestOrchestrator::default()
        .run_backtest(&series, &BacktestConfig::new(ModelConfig::Naive, config))
        .unwrap_err();
    assert!(matches!(err, BacktestError::ConfigError(_)));
}
