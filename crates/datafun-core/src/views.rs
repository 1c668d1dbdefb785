//! Page handlers: each turns data and session state into display blocks.

use datafun_common::Record;

use crate::contact::{contact_details, ContactOutcome};
use crate::dataset::Dataset;
use crate::filter::{filter, region_counts, FilterCriteria};
use crate::game::{GuessGame, GuessOutcome, SECRET_RANGE};
use crate::session::Upload;
use crate::stats::{histogram, ColumnSummary, HISTOGRAM_BINS};
use crate::view::{Block, Chart, ChartKind, DataTable, Level, Metric};

/// Rows shown in the overview table.
pub const OVERVIEW_ROWS: usize = 20;

/// Rows shown in the uploaded-file preview.
pub const PREVIEW_ROWS: usize = 5;

const RECORD_COLUMNS: [&str; 5] = ["Date", "Sales", "Visits", "Conversion Rate", "Region"];

fn records_table(records: &[Record]) -> DataTable {
    DataTable {
        columns: RECORD_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows: records
            .iter()
            .map(|r| {
                vec![
                    r.date.to_string(),
                    format!("{:.2}", r.sales),
                    r.visits.to_string(),
                    format!("{:.4}", r.conversion_rate),
                    r.region.to_string(),
                ]
            })
            .collect(),
    }
}

fn sales_chart(title: &str, records: &[Record]) -> Chart {
    Chart {
        kind: ChartKind::Line,
        title: title.to_string(),
        x_label: "Date".to_string(),
        y_label: "Sales".to_string(),
        labels: records.iter().map(|r| r.date.to_string()).collect(),
        values: records.iter().map(|r| r.sales).collect(),
    }
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

pub fn overview(dataset: &Dataset) -> Vec<Block> {
    let avg_sales = dataset.mean_sales().map_or_else(|| "-".to_string(), |v| format!("{:.2}", v));
    let max_visits = dataset.max_visits().map_or_else(|| "-".to_string(), |v| v.to_string());
    let avg_rate = dataset
        .mean_conversion_rate()
        .map_or_else(|| "-".to_string(), |v| format!("{:.2}%", v * 100.0));

    vec![
        Block::subheader("Data Overview"),
        Block::Table(records_table(dataset.head(OVERVIEW_ROWS))),
        Block::Metrics(vec![
            Metric::new("Avg Sales", avg_sales),
            Metric::new("Max Visits", max_visits),
            Metric::new("Avg Rate", avg_rate),
        ]),
        Block::subheader("Data Trend"),
        Block::Chart(sales_chart("Sales", dataset.records())),
    ]
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

pub fn analysis(dataset: &Dataset, criteria: &FilterCriteria) -> Vec<Block> {
    let filtered = filter(dataset, criteria);
    let regions: Vec<&str> = criteria.regions.iter().map(|r| r.as_str()).collect();

    let mut blocks = vec![
        Block::subheader("Sales Analysis"),
        Block::text(format!(
            "Filters: regions=[{}], date range={} to {}",
            regions.join(", "),
            criteria.date_lo,
            criteria.date_hi
        )),
    ];
    if filtered.is_empty() {
        blocks.push(Block::notice(Level::Info, "No records match the current filters."));
    }

    let counts = region_counts(&filtered);
    blocks.push(Block::Chart(sales_chart("Sales Trend", &filtered)));
    blocks.push(Block::Chart(Chart {
        kind: ChartKind::Bar,
        title: "Region Distribution".to_string(),
        x_label: "Region".to_string(),
        y_label: "Count".to_string(),
        labels: counts.iter().map(|(r, _)| r.to_string()).collect(),
        values: counts.iter().map(|&(_, n)| n as f64).collect(),
    }));
    blocks.push(Block::text("Details"));
    blocks.push(Block::Table(records_table(&filtered)));
    blocks
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

pub fn game(state: &GuessGame, outcome: Option<GuessOutcome>) -> Vec<Block> {
    let mut blocks = vec![
        Block::subheader("Guess the Number"),
        Block::text(format!(
            "I'm thinking of a number between {} and {}. Can you guess it?",
            SECRET_RANGE.start(),
            SECRET_RANGE.end()
        )),
    ];

    match outcome {
        Some(GuessOutcome::TooLow) => {
            blocks.push(Block::notice(Level::Warning, "Too low! Try a bigger number..."));
        }
        Some(GuessOutcome::TooHigh) => {
            blocks.push(Block::notice(Level::Warning, "Too high! Try a smaller number..."));
        }
        Some(GuessOutcome::Won { secret, attempts }) => {
            blocks.push(Block::notice(
                Level::Success,
                format!("Congratulations, you got it! The answer was {}", secret),
            ));
            blocks.push(Block::Celebrate);
            blocks.push(Block::text(format!("You used {} attempts", attempts)));
        }
        None => {}
    }

    if !state.guesses().is_empty() {
        blocks.push(Block::List {
            title: "Previous guesses".to_string(),
            items: state.guesses().iter().map(|g| g.to_string()).collect(),
        });
    }
    blocks
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

pub fn tools(upload: Option<&Upload>, error: Option<&str>) -> Vec<Block> {
    let mut blocks = vec![Block::subheader("File Upload & Analysis")];

    if let Some(reason) = error {
        blocks.push(Block::notice(Level::Error, reason));
        return blocks;
    }
    let Some(upload) = upload else {
        blocks.push(Block::notice(Level::Info, "Please upload a CSV file to analyse"));
        return blocks;
    };
    let table = &upload.table;

    blocks.push(Block::text(format!("Summary statistics for {}:", upload.file_name)));
    blocks.push(Block::Table(upload.summary.clone()));

    if table.n_rows() == 0 || table.n_cols() == 0 {
        blocks.push(Block::notice(Level::Info, "The file has no data rows."));
        return blocks;
    }

    blocks.push(Block::text("First rows:"));
    blocks.push(Block::Table(DataTable {
        columns: table.columns().to_vec(),
        rows: table.head(PREVIEW_ROWS).to_vec(),
    }));

    let Some((idx, column)) = upload.selected_column() else {
        return blocks;
    };

    blocks.push(Block::text(format!("Statistics for column '{}':", column)));
    blocks.push(Block::Table(DataTable {
        columns: vec!["statistic".to_string(), column.to_string()],
        rows: table
            .describe_column(idx)
            .rows()
            .into_iter()
            .map(|(stat, value)| vec![stat.to_string(), value])
            .collect(),
    }));

    match table.numeric_values(idx) {
        Some(values) if !values.is_empty() => {
            let bins = histogram(&values, HISTOGRAM_BINS);
            blocks.push(Block::text(format!("Histogram of column '{}':", column)));
            blocks.push(Block::Chart(Chart {
                kind: ChartKind::Histogram,
                title: column.to_string(),
                x_label: column.to_string(),
                y_label: "Frequency".to_string(),
                labels: bins.iter().map(|b| format!("{:.2}–{:.2}", b.lo, b.hi)).collect(),
                values: bins.iter().map(|b| b.count as f64).collect(),
            }));
        }
        Some(_) => {
            blocks.push(Block::notice(
                Level::Info,
                format!("Column '{}' has no values to plot.", column),
            ));
        }
        None => {
            blocks.push(Block::notice(
                Level::Info,
                format!("Column '{}' is not numeric; no histogram drawn.", column),
            ));
        }
    }
    blocks
}

/// Lay out per-column summaries side by side: one row per statistic.
pub(crate) fn describe_table(described: Vec<(&str, ColumnSummary)>) -> DataTable {
    let per_column: Vec<Vec<(&'static str, String)>> =
        described.iter().map(|(_, s)| s.rows()).collect();

    let mut columns = vec![String::new()];
    columns.extend(described.iter().map(|(name, _)| name.to_string()));

    let stat_names: Vec<&'static str> = per_column
        .first()
        .map(|rows| rows.iter().map(|(stat, _)| *stat).collect())
        .unwrap_or_default();

    let rows = stat_names
        .iter()
        .enumerate()
        .map(|(i, stat)| {
            let mut row = vec![stat.to_string()];
            row.extend(per_column.iter().map(|col| col.get(i).map(|(_, v)| v.clone()).unwrap_or_default()));
            row
        })
        .collect();

    DataTable { columns, rows }
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

pub fn contact(outcome: Option<ContactOutcome>) -> Vec<Block> {
    let mut blocks = vec![
        Block::subheader("Contact Us"),
        Block::text(
            "Thanks for using the app! If you have any questions or suggestions, reach us with the form below.",
        ),
    ];
    match outcome {
        Some(ContactOutcome::Sent) => blocks.push(Block::notice(
            Level::Success,
            "Submitted successfully! We'll get back to you soon.",
        )),
        Some(ContactOutcome::Incomplete) => blocks.push(Block::notice(
            Level::Warning,
            "Please fill in your name, email and message.",
        )),
        None => {}
    }
    blocks.push(Block::List {
        title: "You can also reach us at:".to_string(),
        items: contact_details(),
    });
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::generate;
    use crate::stats::Table;
    use datafun_common::Region;

    fn charts(blocks: &[Block]) -> Vec<&Chart> {
        blocks
            .iter()
            .filter_map(|b| match b {
                Block::Chart(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    fn notices(blocks: &[Block]) -> Vec<(Level, &str)> {
        blocks
            .iter()
            .filter_map(|b| match b {
                Block::Notice(level, text) => Some((*level, text.as_str())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_overview_shows_head_metrics_and_full_chart() {
        let ds = generate(100).unwrap();
        let blocks = overview(&ds);

        let table = blocks.iter().find_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        });
        assert_eq!(table.unwrap().rows.len(), OVERVIEW_ROWS);

        let metrics = blocks.iter().find_map(|b| match b {
            Block::Metrics(m) => Some(m),
            _ => None,
        });
        let metrics = metrics.unwrap();
        assert_eq!(metrics.len(), 3);
        assert_eq!(metrics[1].value, ds.max_visits().unwrap().to_string());
        assert!(metrics[2].value.ends_with('%'));

        let charts = charts(&blocks);
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].values.len(), 100);
    }

    #[test]
    fn test_analysis_charts_follow_filter() {
        let ds = generate(100).unwrap();
        let criteria = FilterCriteria::default();
        let blocks = analysis(&ds, &criteria);
        let expected = filter(&ds, &criteria).len();

        let charts = charts(&blocks);
        assert_eq!(charts.len(), 2);
        assert_eq!(charts[0].values.len(), expected);
        assert_eq!(charts[1].values.iter().sum::<f64>() as usize, expected);
        for label in &charts[1].labels {
            assert!(label == "East" || label == "South");
        }
    }

    #[test]
    fn test_analysis_empty_result_is_announced() {
        let ds = generate(10).unwrap();
        let criteria = FilterCriteria::new(Vec::<Region>::new(), ds.records()[0].date, ds.records()[9].date);
        let blocks = analysis(&ds, &criteria);
        assert_eq!(notices(&blocks), vec![(Level::Info, "No records match the current filters.")]);
    }

    #[test]
    fn test_game_win_celebrates() {
        let state = GuessGame::with_secret(12);
        let blocks = game(&state, Some(GuessOutcome::Won { secret: 12, attempts: 4 }));
        assert!(blocks.contains(&Block::Celebrate));
        assert!(blocks.contains(&Block::text("You used 4 attempts")));
        assert!(!blocks.iter().any(|b| matches!(b, Block::List { .. })));
    }

    #[test]
    fn test_tools_without_upload_prompts() {
        let blocks = tools(None, None);
        assert_eq!(notices(&blocks), vec![(Level::Info, "Please upload a CSV file to analyse")]);
    }

    #[test]
    fn test_tools_parse_error_stops_rendering() {
        let blocks = tools(None, Some("Could not parse file: bad"));
        assert_eq!(blocks.len(), 2);
        assert_eq!(notices(&blocks)[0].0, Level::Error);
    }

    #[test]
    fn test_tools_histogram_for_selected_column() {
        let table = Table::from_csv(b"a,b\n1,x\n2,y\n,z\n4,x\n").unwrap();
        let upload = Upload::new("data.csv", table);
        let blocks = tools(Some(&upload), None);

        let charts = charts(&blocks);
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0].kind, ChartKind::Histogram);
        assert_eq!(charts[0].values.len(), HISTOGRAM_BINS);
        assert_eq!(charts[0].values.iter().sum::<f64>(), 3.0);
    }

    #[test]
    fn test_tools_text_column_has_no_histogram() {
        let table = Table::from_csv(b"a,b\n1,x\n2,y\n").unwrap();
        let mut upload = Upload::new("data.csv", table);
        upload.select("b").unwrap();
        let blocks = tools(Some(&upload), None);
        assert!(charts(&blocks).is_empty());
        assert_eq!(notices(&blocks).len(), 1);
    }

    #[test]
    fn test_describe_table_layout() {
        let table = Table::from_csv(b"a,b\n1,2\n3,4\n").unwrap();
        let dt = describe_table(table.describe());
        assert_eq!(dt.columns, vec!["", "a", "b"]);
        assert_eq!(dt.rows.len(), 8);
        assert_eq!(dt.rows[0], vec!["count", "2", "2"]);
    }

    #[test]
    fn test_contact_acknowledgement() {
        assert_eq!(notices(&contact(None)).len(), 0);
        assert_eq!(notices(&contact(Some(ContactOutcome::Sent)))[0].0, Level::Success);
        assert_eq!(notices(&contact(Some(ContactOutcome::Incomplete)))[0].0, Level::Warning);
    }
}
