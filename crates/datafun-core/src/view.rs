//! Display instructions produced by the page handlers.
//! The web layer decides how each block looks; handlers only decide what is shown.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

impl Metric {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self { label: label.into(), value: value.into() }
    }
}

/// A rectangular table of preformatted cells.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DataTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Line,
    Bar,
    Histogram,
}

/// One data series; `labels[i]` is the x position of `values[i]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Subheader(String),
    Text(String),
    Metrics(Vec<Metric>),
    Table(DataTable),
    Chart(Chart),
    Notice(Level, String),
    /// Titled bullet list.
    List { title: String, items: Vec<String> },
    /// Confetti for a won round.
    Celebrate,
}

impl Block {
    pub fn subheader(text: impl Into<String>) -> Self {
        Block::Subheader(text.into())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Block::Text(text.into())
    }

    pub fn notice(level: Level, text: impl Into<String>) -> Self {
        Block::Notice(level, text.into())
    }
}
