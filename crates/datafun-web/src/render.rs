//! HTML rendering for pages and display blocks.
//! Pages are assembled with format! into the shared layout; charts are drawn
//! client-side by Chart.js from JSON embedded next to each canvas.

use datafun_common::Region;
use datafun_core::filter::{FilterCriteria, WINDOW_END, WINDOW_START};
use datafun_core::game::SECRET_RANGE;
use datafun_core::view::{Block, Chart, ChartKind, DataTable, Level, Metric};
use datafun_core::Page;
use serde_json::json;

use crate::state::SessionSnapshot;

pub const APP_TITLE: &str = "Fun Data App";
const APP_DESCRIPTION: &str = "A small dashboard for exploring synthetic sales data.";

/// Escape text for use in HTML bodies and quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&'  => out.push_str("&amp;"),
            '<'  => out.push_str("&lt;"),
            '>'  => out.push_str("&gt;"),
            '"'  => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _    => out.push(c),
        }
    }
    out
}

/// Sidebar navigation with `active` highlighted.
pub fn nav_html(active: Page) -> String {
    let links: String = Page::ALL
        .iter()
        .map(|page| {
            let class = if *page == active { "nav-link active" } else { "nav-link" };
            format!(
                r#"<a href="{}" class="{}">{}</a>"#,
                page.path(),
                class,
                escape(page.label())
            )
        })
        .collect();

    format!(
        r#"<nav class="sidebar">
        <div class="brand">{title}</div>
        <div class="nav-section">Navigation</div>
        {links}
    </nav>"#,
        title = APP_TITLE,
        links = links,
    )
}

/// Full document: sidebar, the page's settings card and its content.
pub fn page_shell(active: Page, settings_html: &str, body_html: &str) -> String {
    let settings = if settings_html.is_empty() {
        String::new()
    } else {
        format!(
            r#"<div class="card settings">
            <div class="card-header">Settings</div>
            <div class="card-body">{}</div>
        </div>"#,
            settings_html
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <title>{page} — {title}</title>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <link rel="stylesheet" href="/static/css/main.css">
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
</head>
<body>
<div class="app-container">
    {nav}
    <main class="main-content">
        <div class="page-header">
            <h1 class="page-title">{title}</h1>
            <p class="text-muted">{description}</p>
        </div>
        {settings}
        <div class="page-body">
{body}
        </div>
    </main>
</div>
</body>
</html>"#,
        page = escape(active.label()),
        title = APP_TITLE,
        description = APP_DESCRIPTION,
        nav = nav_html(active),
        settings = settings,
        body = body_html,
    )
}

// ---------------------------------------------------------------------------
// Settings forms
// ---------------------------------------------------------------------------

/// Input widgets for `page`, prefilled from the current filter and session.
pub fn settings_html(page: Page, criteria: &FilterCriteria, snapshot: &SessionSnapshot) -> String {
    match page {
        Page::Overview => String::new(),
        Page::Analysis => analysis_form(criteria),
        Page::Game     => game_form(),
        Page::Tools    => tools_form(snapshot),
        Page::Contact  => contact_form(snapshot),
    }
}

fn analysis_form(criteria: &FilterCriteria) -> String {
    let boxes: String = Region::ALL
        .iter()
        .map(|region| {
            let checked = if criteria.regions.contains(region) { " checked" } else { "" };
            format!(
                r#"<label class="checkbox"><input type="checkbox" name="region" value="{0}"{1}> {0}</label>"#,
                region.as_str(),
                checked
            )
        })
        .collect();

    format!(
        r#"<form method="get" action="{action}" class="form-stack">
            <fieldset><legend>Region</legend>{boxes}</fieldset>
            <label>From <input type="date" name="date_lo" value="{lo}" min="{min}" max="{max}"></label>
            <label>To <input type="date" name="date_hi" value="{hi}" min="{min}" max="{max}"></label>
            <input type="hidden" name="apply" value="1">
            <button class="btn btn-primary" type="submit">Apply</button>
        </form>"#,
        action = Page::Analysis.path(),
        boxes = boxes,
        lo = criteria.date_lo,
        hi = criteria.date_hi,
        min = WINDOW_START,
        max = WINDOW_END,
    )
}

fn game_form() -> String {
    format!(
        r#"<form method="post" action="{action}" class="form-stack">
            <label>Your guess <input type="number" name="guess" min="{lo}" max="{hi}" step="1" value="{lo}" required></label>
            <button class="btn btn-primary" type="submit">Guess</button>
        </form>"#,
        action = Page::Game.path(),
        lo = SECRET_RANGE.start(),
        hi = SECRET_RANGE.end(),
    )
}

fn tools_form(snapshot: &SessionSnapshot) -> String {
    let mut html = format!(
        r#"<form method="post" action="{}" enctype="multipart/form-data" class="form-stack">
            <label>Upload a CSV file <input type="file" name="file" accept=".csv,text/csv" required></label>
            <button class="btn btn-primary" type="submit">Upload</button>
        </form>"#,
        Page::Tools.path()
    );

    if !snapshot.columns.is_empty() {
        let options: String = snapshot
            .columns
            .iter()
            .map(|col| {
                let selected = if snapshot.selected_column.as_deref() == Some(col.as_str()) {
                    " selected"
                } else {
                    ""
                };
                format!(r#"<option value="{0}"{1}>{0}</option>"#, escape(col), selected)
            })
            .collect();
        html.push_str(&format!(
            r#"<form method="get" action="{}" class="form-stack">
            <label>Select a column to analyse <select name="column">{}</select></label>
            <button class="btn btn-outline" type="submit">Analyse</button>
        </form>"#,
            Page::Tools.path(),
            options
        ));
    }
    html
}

fn contact_form(snapshot: &SessionSnapshot) -> String {
    let form = &snapshot.contact;
    format!(
        r#"<form method="post" action="{action}" class="form-stack">
            <label>Your name <input type="text" name="name" value="{name}"></label>
            <label>Email address <input type="email" name="email" value="{email}"></label>
            <label>Message <textarea name="message" rows="5">{message}</textarea></label>
            <button class="btn btn-primary" type="submit">Submit</button>
        </form>"#,
        action = Page::Contact.path(),
        name = escape(&form.name),
        email = escape(&form.email),
        message = escape(&form.message),
    )
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// Render blocks in order. Chart canvases are numbered so ids stay unique.
pub fn render_blocks(blocks: &[Block]) -> String {
    let mut html = String::new();
    let mut charts = 0usize;

    for block in blocks {
        match block {
            Block::Subheader(text) => {
                html.push_str(&format!("<h2 class=\"subheader\">{}</h2>\n", escape(text)));
            }
            Block::Text(text) => {
                html.push_str(&format!("<p>{}</p>\n", escape(text)));
            }
            Block::Metrics(metrics) => html.push_str(&metrics_html(metrics)),
            Block::Table(table) => html.push_str(&table_html(table)),
            Block::Chart(chart) => {
                charts += 1;
                html.push_str(&chart_html(&format!("chart-{}", charts), chart));
            }
            Block::Notice(level, text) => {
                html.push_str(&format!(
                    "<div class=\"alert alert-{}\">{}</div>\n",
                    level_class(*level),
                    escape(text)
                ));
            }
            Block::List { title, items } => {
                let items: String = items
                    .iter()
                    .map(|item| format!("<li>{}</li>", escape(item)))
                    .collect();
                html.push_str(&format!(
                    "<div class=\"list\"><strong>{}</strong><ul>{}</ul></div>\n",
                    escape(title),
                    items
                ));
            }
            Block::Celebrate => {
                html.push_str("<div class=\"celebrate\" aria-hidden=\"true\">🎈🎉🎈🎉🎈</div>\n");
            }
        }
    }
    html
}

fn level_class(level: Level) -> &'static str {
    match level {
        Level::Info    => "info",
        Level::Success => "success",
        Level::Warning => "warning",
        Level::Error   => "error",
    }
}

fn metrics_html(metrics: &[Metric]) -> String {
    let cells: String = metrics
        .iter()
        .map(|m| {
            format!(
                r#"<div class="metric"><div class="metric-value">{}</div><div class="metric-label">{}</div></div>"#,
                escape(&m.value),
                escape(&m.label)
            )
        })
        .collect();
    format!("<div class=\"metrics-grid\">{}</div>\n", cells)
}

fn table_html(table: &DataTable) -> String {
    let head: String = table
        .columns
        .iter()
        .map(|c| format!("<th>{}</th>", escape(c)))
        .collect();
    let body: String = if table.rows.is_empty() {
        format!(
            r#"<tr><td colspan="{}" class="text-center text-muted">No rows</td></tr>"#,
            table.columns.len().max(1)
        )
    } else {
        table
            .rows
            .iter()
            .map(|row| {
                let cells: String = row.iter().map(|v| format!("<td>{}</td>", escape(v))).collect();
                format!("<tr>{}</tr>", cells)
            })
            .collect()
    };
    format!(
        "<div class=\"table-container\"><table class=\"table\"><thead><tr>{}</tr></thead><tbody>{}</tbody></table></div>\n",
        head, body
    )
}

/// Chart.js configuration for one chart.
pub fn chart_config(chart: &Chart) -> serde_json::Value {
    let (kind, spacing) = match chart.kind {
        ChartKind::Line      => ("line", None),
        ChartKind::Bar       => ("bar", None),
        ChartKind::Histogram => ("bar", Some(1.0)),
    };
    let mut dataset = json!({
        "label": chart.y_label,
        "data": chart.values,
        "borderColor": "#4f8cff",
        "backgroundColor": "rgba(79, 140, 255, 0.5)",
    });
    if let Some(pct) = spacing {
        dataset["barPercentage"] = json!(pct);
        dataset["categoryPercentage"] = json!(pct);
    }

    let begin_at_zero = chart.kind != ChartKind::Line;

    json!({
        "type": kind,
        "data": { "labels": chart.labels, "datasets": [dataset] },
        "options": {
            "responsive": true,
            "plugins": {
                "legend": { "display": false },
                "title": { "display": true, "text": chart.title },
            },
            "scales": {
                "x": { "title": { "display": true, "text": chart.x_label } },
                "y": { "title": { "display": true, "text": chart.y_label }, "beginAtZero": begin_at_zero },
            },
        },
    })
}

/// JSON safe to inline in a `<script>` element. `<`, `>` and `&` only occur
/// inside JSON strings, where the `\u` escapes decode to the same text, so
/// neither `</script>` nor `<!--` can survive.
pub fn script_json(value: &serde_json::Value) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            _   => out.push(c),
        }
    }
    out
}

fn chart_html(id: &str, chart: &Chart) -> String {
    let config = script_json(&chart_config(chart));
    format!(
        r#"<div class="card chart-card"><canvas id="{id}" height="120"></canvas></div>
<script>new Chart(document.getElementById('{id}'), {config});</script>
"#,
        id = id,
        config = config,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use datafun_core::contact::ContactForm;

    fn line_chart() -> Chart {
        Chart {
            kind: ChartKind::Line,
            title: "Sales".to_string(),
            x_label: "Date".to_string(),
            y_label: "Sales".to_string(),
            labels: vec!["2023-01-01".to_string(), "2023-01-02".to_string()],
            values: vec![1000.0, 1100.5],
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_nav_marks_active_page() {
        let nav = nav_html(Page::Game);
        assert!(nav.contains(r#"<a href="/game" class="nav-link active">Mini Game</a>"#));
        assert!(nav.contains(r#"<a href="/overview" class="nav-link">Data Overview</a>"#));
    }

    #[test]
    fn test_blocks_are_escaped() {
        let html = render_blocks(&[
            Block::text("<script>alert(1)</script>"),
            Block::notice(Level::Warning, "Too low!"),
        ]);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>alert"));
        assert!(html.contains(r#"<div class="alert alert-warning">Too low!</div>"#));
    }

    #[test]
    fn test_charts_get_unique_ids() {
        let html = render_blocks(&[Block::Chart(line_chart()), Block::Chart(line_chart())]);
        assert!(html.contains("id=\"chart-1\""));
        assert!(html.contains("id=\"chart-2\""));
    }

    #[test]
    fn test_chart_config_shapes() {
        let config = chart_config(&line_chart());
        assert_eq!(config["type"], "line");
        assert_eq!(config["data"]["datasets"][0]["data"][1], 1100.5);

        let mut hist = line_chart();
        hist.kind = ChartKind::Histogram;
        let config = chart_config(&hist);
        assert_eq!(config["type"], "bar");
        assert_eq!(config["data"]["datasets"][0]["barPercentage"], 1.0);
    }

    #[test]
    fn test_chart_script_cannot_close_early() {
        let mut chart = line_chart();
        chart.title = "</script><b>".to_string();
        let html = render_blocks(&[Block::Chart(chart)]);
        assert_eq!(html.matches("</script>").count(), 1);
    }

    #[test]
    fn test_chart_script_has_no_comment_openers() {
        let mut chart = line_chart();
        chart.labels = vec!["<!--".to_string(), "a&b>c".to_string()];
        let html = render_blocks(&[Block::Chart(chart)]);
        assert!(!html.contains("<!--"));

        let json = script_json(&serde_json::json!({ "label": "<!-- </script> & >" }));
        assert!(!json.contains('<') && !json.contains('>') && !json.contains('&'));
        let back: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back["label"], "<!-- </script> & >");
    }

    #[test]
    fn test_contact_form_prefilled() {
        let snapshot = SessionSnapshot {
            contact: ContactForm::new("Ann", "a@b.c", "hi <there>"),
            ..Default::default()
        };
        let html = settings_html(Page::Contact, &FilterCriteria::default(), &snapshot);
        assert!(html.contains(r#"value="Ann""#));
        assert!(html.contains("hi &lt;there&gt;</textarea>"));
    }

    #[test]
    fn test_analysis_form_reflects_criteria() {
        let html = settings_html(Page::Analysis, &FilterCriteria::default(), &SessionSnapshot::default());
        assert!(html.contains(r#"value="East" checked"#));
        assert!(html.contains(r#"value="North">"#));
        assert!(html.contains(r#"max="2023-04-10""#));
    }
}
