//! Time series data handling for backtests
//!
//! A [`SeriesData`] is loaded once per backtest and never mutated. Loaders
//! implement [`SeriesLoader`]; the engine itself does not care where the
//! observations came from.

use crate::error::{BacktestError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Identifies the series a backtest was requested for.
///
/// The identifiers are opaque to the engine; they are carried along so that
/// errors and results can name what was requested.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesKey {
    pub store_id: String,
    pub product_id: String,
    /// First date of the requested range (inclusive)
    pub start_date: NaiveDate,
    /// Last date of the requested range (inclusive)
    pub end_date: NaiveDate,
}

impl SeriesKey {
    pub fn new(
        store_id: impl Into<String>,
        product_id: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            store_id: store_id.into(),
            product_id: product_id.into(),
            start_date,
            end_date,
        }
    }

    /// Whether `date` falls inside the requested range
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "store {} / product {} from {} to {}",
            self.store_id, self.product_id, self.start_date, self.end_date
        )
    }
}

/// Chronologically ordered observations of one series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesData {
    key: SeriesKey,
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl SeriesData {
    /// Create a series from parallel date and value vectors.
    ///
    /// Dates must be strictly increasing and both vectors must have the same
    /// length. An empty series is accepted here; the orchestrator rejects it.
    pub fn new(key: SeriesKey, dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(BacktestError::DataError(format!(
                "Dates length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }

        if let Some(pos) = dates.windows(2).position(|w| w[0] >= w[1]) {
            return Err(BacktestError::DataError(format!(
                "Dates must be strictly increasing: {} at index {} is followed by {}",
                dates[pos],
                pos,
                dates[pos + 1]
            )));
        }

        Ok(Self { key, dates, values })
    }

    /// Create a series from `(date, value)` pairs in any order
    pub fn from_points(key: SeriesKey, mut points: Vec<(NaiveDate, f64)>) -> Result<Self> {
        points.sort_by_key(|(date, _)| *date);
        let (dates, values): (Vec<NaiveDate>, Vec<f64>) = points.into_iter().unzip();
        Self::new(key, dates, values)
    }

    pub fn key(&self) -> &SeriesKey {
        &self.key
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First and last observed dates, if any
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((*self.dates.first()?, *self.dates.last()?))
    }
}

/// Capability that produces a [`SeriesData`] for a key
pub trait SeriesLoader {
    fn load(&self, key: &SeriesKey) -> Result<SeriesData>;
}

/// One row of a long-format sales CSV
#[derive(Debug, Deserialize)]
struct SeriesRecord {
    date: String,
    store_id: String,
    product_id: String,
    value: f64,
}

/// Loads series from a long-format CSV with `date,store_id,product_id,value`
/// columns. Rows sharing a date are summed.
#[derive(Debug, Clone)]
pub struct CsvSeriesLoader {
    path: PathBuf,
    date_format: String,
}

impl CsvSeriesLoader {
    /// Create a loader for the given file using ISO dates (`%Y-%m-%d`)
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            date_format: "%Y-%m-%d".to_string(),
        }
    }

    pub fn with_date_format(mut self, format: &str) -> Self {
        self.date_format = format.to_string();
        self
    }
}

impl SeriesLoader for CsvSeriesLoader {
    fn load(&self, key: &SeriesKey) -> Result<SeriesData> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)?;

        let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for row in reader.deserialize() {
            let record: SeriesRecord = row?;
            if record.store_id != key.store_id || record.product_id != key.product_id {
                continue;
            }

            let date = NaiveDate::parse_from_str(&record.date, &self.date_format)?;
            if key.contains(date) {
                *daily.entry(date).or_insert(0.0) += record.value;
            }
        }

        debug!(
            "Loaded {} observations for {} from {}",
            daily.len(),
            key,
            self.path.display()
        );

        let (dates, values): (Vec<NaiveDate>, Vec<f64>) = daily.into_iter().unzip();
        SeriesData::new(key.clone(), dates, values)
    }
}

/// Loader over series held in memory, keyed by store and product
#[derive(Debug, Clone, Default)]
pub struct InMemorySeriesLoader {
    series: HashMap<(String, String), Vec<(NaiveDate, f64)>>,
}

impl InMemorySeriesLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register observations for a store/product pair, replacing any existing ones
    pub fn insert(
        &mut self,
        store_id: &str,
        product_id: &str,
        dates: &[NaiveDate],
        values: &[f64],
    ) -> Result<()> {
        if dates.len() != values.len() {
            return Err(BacktestError::DataError(format!(
                "Dates length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }

        let points = dates.iter().copied().zip(values.iter().copied()).collect();
        self.series
            .insert((store_id.to_string(), product_id.to_string()), points);
        Ok(())
    }
}

impl SeriesLoader for InMemorySeriesLoader {
    fn load(&self, key: &SeriesKey) -> Result<SeriesData> {
        let points: Vec<(NaiveDate, f64)> = self
            .series
            .get(&(key.store_id.clone(), key.product_id.clone()))
            .map(|points| {
                points
                    .iter()
                    .filter(|(date, _)| key.contains(*date))
                    .copied()
                    .collect()
            })
            .unwrap_or_default();

        SeriesData::from_points(key.clone(), points)
    }
}
