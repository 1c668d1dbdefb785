//! Descriptive statistics for uploaded CSV tables.
//!
//! Summaries follow the conventions of the common dataframe `describe`:
//! sample standard deviation, linearly interpolated quartiles, and
//! `count / unique / top / freq` for text columns.

use std::collections::HashMap;

use datafun_common::{DatafunError, Result};
use tracing::debug;

/// Bin count used by the tools view.
pub const HISTOGRAM_BINS: usize = 20;

/// Spellings treated as a missing value.
const MISSING_MARKERS: [&str; 7] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

/// One parsed cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell<'a> {
    Number(f64),
    Text(&'a str),
    Missing,
}

impl<'a> Cell<'a> {
    pub fn parse(raw: &'a str) -> Self {
        let trimmed = raw.trim();
        if MISSING_MARKERS.contains(&trimmed) {
            return Cell::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(v) if v.is_nan() => Cell::Missing,
            Ok(v) => Cell::Number(v),
            Err(_) => Cell::Text(trimmed),
        }
    }
}

/// A CSV file held as raw strings; cells are typed on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Parse CSV bytes with a header row. Ragged rows, invalid UTF-8 or a
    /// missing header are reported as [`DatafunError::FileParse`].
    pub fn from_csv(bytes: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes);

        let columns: Vec<String> = reader.headers()?.iter().map(|s| s.trim().to_string()).collect();
        if columns.is_empty() || columns.iter().all(String::is_empty) {
            return Err(DatafunError::FileParse("no columns found".to_string()));
        }

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        debug!("Parsed table with {} columns and {} rows", columns.len(), rows.len());
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> &[Vec<String>] {
        &self.rows[..n.min(self.rows.len())]
    }

    fn cells(&self, idx: usize) -> impl Iterator<Item = Cell<'_>> {
        self.rows
            .iter()
            .map(move |row| row.get(idx).map_or(Cell::Missing, |s| Cell::parse(s)))
    }

    /// Whether every non-missing value in the column is a number.
    pub fn is_numeric(&self, idx: usize) -> bool {
        self.cells(idx).all(|c| !matches!(c, Cell::Text(_)))
    }

    /// Non-missing values of a numeric column; `None` for text columns.
    pub fn numeric_values(&self, idx: usize) -> Option<Vec<f64>> {
        if !self.is_numeric(idx) {
            return None;
        }
        Some(
            self.cells(idx)
                .filter_map(|c| match c {
                    Cell::Number(v) => Some(v),
                    _ => None,
                })
                .collect(),
        )
    }

    pub fn describe_column(&self, idx: usize) -> ColumnSummary {
        match self.numeric_values(idx) {
            Some(values) => ColumnSummary::Numeric(NumericSummary::from_values(&values)),
            None => ColumnSummary::Text(TextSummary::from_cells(self.cells(idx))),
        }
    }

    /// Summaries for the numeric columns, or for every column when none is
    /// numeric. Returned as `(column, summary)` in column order.
    pub fn describe(&self) -> Vec<(&str, ColumnSummary)> {
        let numeric: Vec<usize> = (0..self.n_cols()).filter(|&i| self.is_numeric(i)).collect();
        let picked: Vec<usize> = if numeric.is_empty() {
            (0..self.n_cols()).collect()
        } else {
            numeric
        };
        picked
            .into_iter()
            .map(|i| (self.columns[i].as_str(), self.describe_column(i)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnSummary {
    Numeric(NumericSummary),
    Text(TextSummary),
}

impl ColumnSummary {
    /// `(statistic, formatted value)` pairs in display order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        match self {
            ColumnSummary::Numeric(s) => s.rows(),
            ColumnSummary::Text(s) => s.rows(),
        }
    }
}

/// count / mean / std / min / quartiles / max. Statistics that are
/// undefined for the sample size are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub q25: Option<f64>,
    pub q50: Option<f64>,
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl NumericSummary {
    pub fn from_values(values: &[f64]) -> Self {
        let count = values.len();
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mean = (count > 0).then(|| values.iter().sum::<f64>() / count as f64);
        let std = mean.filter(|_| count > 1).map(|m| {
            let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
            (ss / (count - 1) as f64).sqrt()
        });

        Self {
            count,
            mean,
            std,
            min: sorted.first().copied(),
            q25: percentile(&sorted, 0.25),
            q50: percentile(&sorted, 0.50),
            q75: percentile(&sorted, 0.75),
            max: sorted.last().copied(),
        }
    }

    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("count", self.count.to_string()),
            ("mean",  format_stat(self.mean)),
            ("std",   format_stat(self.std)),
            ("min",   format_stat(self.min)),
            ("25%",   format_stat(self.q25)),
            ("50%",   format_stat(self.q50)),
            ("75%",   format_stat(self.q75)),
            ("max",   format_stat(self.max)),
        ]
    }
}

/// count / unique / top / freq for non-numeric columns.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSummary {
    pub count: usize,
    pub unique: usize,
    pub top: Option<String>,
    pub freq: usize,
}

impl TextSummary {
    fn from_cells<'a>(cells: impl Iterator<Item = Cell<'a>>) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        let mut count = 0;

        for cell in cells {
            let value = match cell {
                Cell::Missing => continue,
                Cell::Text(s) => s.to_string(),
                Cell::Number(v) => v.to_string(),
            };
            count += 1;
            let entry = counts.entry(value.clone()).or_insert(0);
            if *entry == 0 {
                order.push(value);
            }
            *entry += 1;
        }

        // First value seen wins ties.
        let mut top: Option<(&String, usize)> = None;
        for value in &order {
            let n = counts[value];
            if top.map_or(true, |(_, best)| n > best) {
                top = Some((value, n));
            }
        }

        Self {
            count,
            unique: order.len(),
            top: top.map(|(v, _)| v.clone()),
            freq: top.map_or(0, |(_, n)| n),
        }
    }

    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("count",  self.count.to_string()),
            ("unique", self.unique.to_string()),
            ("top",    self.top.clone().unwrap_or_else(|| "NaN".to_string())),
            ("freq",   self.freq.to_string()),
        ]
    }
}

fn format_stat(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.6}", v),
        None => "NaN".to_string(),
    }
}

/// Linear-interpolated percentile of already sorted values, `p` in [0, 1].
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// One histogram bar covering `[lo, hi)`; the last bin also includes `hi`.
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub lo: f64,
    pub hi: f64,
    pub count: usize,
}

/// Equal-width histogram over the finite values. A constant column is
/// widened to `value ± 0.5`. No values means no bins.
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in &finite {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| Bin {
            lo: lo + width * i as f64,
            hi: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count,
        })
        .collect()
}
