use assert_approx_eq::assert_approx_eq;
use forecast_backtest::models::{
    ExponentialSmoothingModel, MovingAverageModel, NaiveModel, SeasonalNaiveModel,
};
use forecast_backtest::{create_model, BacktestError, ForecastModel, ModelConfig};
use rstest::rstest;

fn create_test_data() -> Vec<f64> {
    vec![100.0, 102.0, 104.0, 103.0, 105.0, 101.0, 99.0, 104.0]
}

#[test]
fn test_naive() {
    let mut model = NaiveModel::new();
    model.fit(&create_test_data()).unwrap();

    let forecast = model.predict(3).unwrap();
    assert_eq!(forecast, vec![104.0; 3]);
}

#[test]
fn test_seasonal_naive() {
    let mut model = SeasonalNaiveModel::new(4).unwrap();
    model.fit(&create_test_data()).unwrap();

    let forecast = model.predict(6).unwrap();
    assert_eq!(forecast, vec![105.0, 101.0, 99.0, 104.0, 105.0, 101.0]);
    assert_eq!(model.params()["season_length"], 4);
}

#[test]
fn test_moving_average() {
    let mut model = MovingAverageModel::new(4).unwrap();
    model.fit(&create_test_data()).unwrap();

    let forecast = model.predict(2).unwrap();
    assert_approx_eq!(forecast[0], 102.25);
    assert_approx_eq!(forecast[1], 102.25);
}

#[test]
fn test_exponential_smoothing() {
    let mut model = ExponentialSmoothingModel::new(0.7).unwrap();
    model.fit(&create_test_data()).unwrap();

    let forecast = model.predict(3).unwrap();
    assert_eq!(forecast.len(), 3);
    for value in &forecast {
        assert!(*value > 95.0 && *value < 110.0);
    }
}

#[rstest]
#[case(ModelConfig::Naive, 1)]
#[case(ModelConfig::SeasonalNaive { season_length: 7 }, 7)]
#[case(ModelConfig::MovingAverage { window: 3 }, 3)]
#[case(ModelConfig::ExponentialSmoothing { alpha: 0.2 }, 1)]
fn test_minimum_observations(#[case] config: ModelConfig, #[case] floor: usize) {
    let mut model = create_model(&config).unwrap();
    assert_eq!(model.min_observations(), floor);
    assert_eq!(model.name(), config.model_type());

    let too_short = vec![1.0; floor - 1];
    assert!(matches!(
        model.fit(&too_short),
        Err(BacktestError::InsufficientModelData { .. })
    ));

    model.fit(&vec![1.0; floor]).unwrap();
    assert!(model.is_fitted());
    assert_eq!(model.predict(5).unwrap().len(), 5);
}

#[rstest]
#[case(ModelConfig::Naive)]
#[case(ModelConfig::SeasonalNaive { season_length: 2 })]
#[case(ModelConfig::MovingAverage { window: 2 })]
#[case(ModelConfig::ExponentialSmoothing { alpha: 0.5 })]
fn test_predict_before_fit(#[case] config: ModelConfig) {
    let model = create_model(&config).unwrap();
    assert!(matches!(model.predict(1), Err(BacktestError::ModelError(_))));
}

#[test]
fn test_model_parameter_validation() {
    assert!(ExponentialSmoothingModel::new(1.5).is_err());
    assert!(MovingAverageModel::new(0).is_err());
    assert!(SeasonalNaiveModel::new(0).is_err());
}
