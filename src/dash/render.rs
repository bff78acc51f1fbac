// Text rendering of the charts, and the JSON summary.

use std::fmt::Write;

use serde_json::json;

use crate::dash::io_csv::{format_value, RawTable};
use crate::dash::*;

const BAR_WIDTH: usize = 40;

fn bar(x: f64, max: f64) -> String {
    if max <= 0.0 || x <= 0.0 {
        return String::new();
    }
    let n = ((x / max) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(n.clamp(1, BAR_WIDTH))
}

/// Lays out the raw store content as aligned columns.
pub fn render_raw_table(raw: &RawTable) -> String {
    let mut widths: Vec<usize> = raw.headers.iter().map(|h| h.chars().count()).collect();
    for row in raw.rows.iter() {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }
    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<String>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut s = String::new();
    let _ = writeln!(s, "{}", line(&raw.headers));
    for row in raw.rows.iter() {
        let _ = writeln!(s, "{}", line(row));
    }
    let _ = writeln!(s, "({} rows)", raw.rows.len());
    s
}

/// Draws a target/actual comparison as horizontal bars.
pub fn render_comparison(rows: &[ComparisonRow]) -> String {
    let max = rows
        .iter()
        .flat_map(|r| [r.target, r.actual])
        .fold(0.0_f64, f64::max);
    let label_w = rows
        .iter()
        .map(|r| r.label.chars().count())
        .max()
        .unwrap_or(0);

    let mut s = String::new();
    for r in rows.iter() {
        let _ = writeln!(
            s,
            "{:<lw$}  Target {:>10.2} {}",
            r.label,
            r.target,
            bar(r.target, max),
            lw = label_w
        );
        let _ = writeln!(
            s,
            "{:<lw$}  Actual {:>10.2} {}",
            "",
            r.actual,
            bar(r.actual, max),
            lw = label_w
        );
    }
    s
}

/// Draws the smoothed series, one line per point.
pub fn render_series(points: &[RollingPoint]) -> String {
    let max = points
        .iter()
        .flat_map(|p| [p.value, p.rolling_mean])
        .fold(0.0_f64, f64::max);
    let mut s = String::new();
    let _ = writeln!(
        s,
        "{:<19}  {:>10}  {:>12}",
        "timestamp", "value", "rolling_mean"
    );
    for p in points.iter() {
        let _ = writeln!(
            s,
            "{:<19}  {:>10.2}  {:>12.2}  {}",
            p.timestamp.format(TIMESTAMP_FORMAT),
            p.value,
            p.rolling_mean,
            bar(p.rolling_mean, max)
        );
    }
    s
}

/// Renders the three charts of the dashboard.
pub fn render_dashboard(d: &Dashboard) -> String {
    let mut s = String::new();

    let _ = writeln!(s, "\n== Graph 1 (static): Targets vs Actuals (JSON snapshot)");
    match &d.comparison {
        Some(rows) if !rows.is_empty() => {
            s.push_str(&render_comparison(rows));
            let _ = writeln!(
                s,
                "Static snapshot comparing Target vs Actual values from the snapshot."
            );
        }
        Some(_) => {
            let _ = writeln!(s, "[info] The snapshot has no targets and no actuals.");
        }
        None => {
            let _ = writeln!(
                s,
                "[info] Cannot build Graph 1 yet because the snapshot did not load."
            );
        }
    }

    let _ = writeln!(s, "\n== Graph 2 (dynamic): CSV time series with rolling average");
    match &d.series {
        SeriesView::NoData => {
            let _ = writeln!(
                s,
                "[info] Need CSV data with 'timestamp', 'category', and 'value' columns to plot this graph."
            );
        }
        SeriesView::NoRows { category } => {
            let _ = writeln!(
                s,
                "[info] No rows for category '{}' yet: add entries with 'surveydash submit'.",
                category
            );
        }
        SeriesView::Points {
            category,
            window,
            points,
        } => {
            s.push_str(&render_series(points));
            let _ = writeln!(
                s,
                "Dynamic time series for '{}' with a {}-point rolling average. Use --category and --window to update the chart.",
                category,
                window.size()
            );
        }
    }

    let _ = writeln!(s, "\n== Graph 3 (dynamic): pick items to compare");
    match &d.selection {
        Some(rows) if !rows.is_empty() => {
            s.push_str(&render_comparison(rows));
            let _ = writeln!(
                s,
                "Compare other labels by passing them with --labels."
            );
        }
        Some(_) => {
            let _ = writeln!(s, "[info] Select at least one label to visualize.");
        }
        None => {
            let _ = writeln!(
                s,
                "[info] Cannot build Graph 3 yet because the snapshot did not load."
            );
        }
    }
    s
}

fn comparison_to_json(rows: &[ComparisonRow]) -> Vec<JSValue> {
    rows.iter()
        .map(|r| json!({"label": r.label, "target": r.target, "actual": r.actual}))
        .collect()
}

/// The summary of a dashboard, in JSON format.
pub fn build_summary_js(d: &Dashboard) -> JSValue {
    let rows = match d.store_status {
        LoadStatus::Loaded { rows } => rows,
        _ => 0,
    };
    let series = match &d.series {
        SeriesView::NoData => json!({"status": "noData"}),
        SeriesView::NoRows { category } => json!({"status": "noRows", "category": category}),
        SeriesView::Points {
            category,
            window,
            points,
        } => {
            let pts: Vec<JSValue> = points
                .iter()
                .map(|p| {
                    json!({
                        "timestamp": p.timestamp.format(TIMESTAMP_FORMAT).to_string(),
                        "value": format_value(p.value),
                        "rollingMean": format_value(p.rolling_mean),
                    })
                })
                .collect();
            json!({
                "status": "points",
                "category": category,
                "window": window.size(),
                "points": pts
            })
        }
    };
    json!({
        "store": {"status": d.store_status.label(), "rows": rows},
        "document": {"status": d.document_status.label()},
        "comparison": d.comparison.as_deref().map(comparison_to_json),
        "series": series,
        "selection": d.selection.as_deref().map(comparison_to_json),
    })
}
