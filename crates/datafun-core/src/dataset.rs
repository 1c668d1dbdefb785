//! Synthetic sales dataset generation.
//! One record per day from 2023-01-01, drawn from a fixed-seed ChaCha stream.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{Days, NaiveDate};
use datafun_common::{DatafunError, Record, Region, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

/// First day of the generated series.
pub const EPOCH: NaiveDate = match NaiveDate::from_ymd_opt(2023, 1, 1) {
    Some(date) => date,
    None => panic!("invalid epoch date"),
};

/// Seed shared by every generation so demos are reproducible.
pub const SEED: u64 = 42;

pub const DEFAULT_ROWS: usize = 100;

const SALES_MEAN: f64 = 1000.0;
const SALES_SD: f64 = 200.0;
const VISITS_RANGE: std::ops::Range<u32> = 100..1000;
const RATE_RANGE: std::ops::Range<f64> = 0.01..0.10;

/// An immutable, cheaply clonable sequence of records.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Arc<[Record]>,
}

impl Dataset {
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First `n` records (fewer if the dataset is shorter).
    pub fn head(&self, n: usize) -> &[Record] {
        &self.records[..n.min(self.records.len())]
    }

    pub fn mean_sales(&self) -> Option<f64> {
        mean(self.records.iter().map(|r| r.sales))
    }

    pub fn max_visits(&self) -> Option<u32> {
        self.records.iter().map(|r| r.visits).max()
    }

    pub fn mean_conversion_rate(&self) -> Option<f64> {
        mean(self.records.iter().map(|r| r.conversion_rate))
    }
}

impl From<Vec<Record>> for Dataset {
    fn from(records: Vec<Record>) -> Self {
        Self { records: records.into() }
    }
}

fn mean(values: impl ExactSizeIterator<Item = f64>) -> Option<f64> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    Some(values.sum::<f64>() / n as f64)
}

/// Generate `n` records with the fixed seed.
pub fn generate(n: usize) -> Result<Dataset> {
    generate_with(n, &mut ChaCha20Rng::seed_from_u64(SEED))
}

/// Generate `n` records from an arbitrary random source.
///
/// Columns are drawn one after another (all sales, then visits, then
/// conversion rates, then regions) so a given stream always lays out
/// the same way.
pub fn generate_with<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Result<Dataset> {
    if n == 0 {
        return Err(DatafunError::InvalidArgument(
            "dataset size must be positive".to_string(),
        ));
    }

    let normal = Normal::new(SALES_MEAN, SALES_SD)
        .map_err(|e| DatafunError::InvalidArgument(format!("sales distribution: {}", e)))?;
    let sales: Vec<f64> = (0..n).map(|_| normal.sample(rng)).collect();
    let visits: Vec<u32> = (0..n).map(|_| rng.gen_range(VISITS_RANGE)).collect();
    let rates: Vec<f64> = (0..n).map(|_| rng.gen_range(RATE_RANGE)).collect();
    let regions: Vec<Region> = (0..n)
        .map(|_| Region::ALL[rng.gen_range(0..Region::ALL.len())])
        .collect();

    let records: Vec<Record> = (0..n)
        .map(|i| Record {
            date: EPOCH + Days::new(i as u64),
            sales: sales[i],
            visits: visits[i],
            conversion_rate: rates[i],
            region: regions[i],
        })
        .collect();

    debug!("Generated dataset with {} records", records.len());
    Ok(Dataset::from(records))
}

/// Most recently used datasets kept by [`DatasetCache::new`].
pub const CACHE_CAPACITY: usize = 4;

/// Memoizes [`generate`] per row count, keeping at most `capacity` entries.
/// The least recently used entry goes first.
#[derive(Debug)]
pub struct DatasetCache {
    capacity: usize,
    entries: Mutex<VecDeque<(usize, Dataset)>>,
}

impl Default for DatasetCache {
    fn default() -> Self {
        Self::with_capacity(CACHE_CAPACITY)
    }
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }

    pub fn get_or_generate(&self, n: usize) -> Result<Dataset> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pos) = entries.iter().position(|(rows, _)| *rows == n) {
            if let Some(hit) = entries.remove(pos) {
                let dataset = hit.1.clone();
                entries.push_back(hit);
                return Ok(dataset);
            }
        }
        let dataset = generate(n)?;
        if entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back((n, dataset.clone()));
        Ok(dataset)
    }

    pub fn contains(&self, n: usize) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|(rows, _)| *rows == n)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
