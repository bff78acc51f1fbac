mod config;
use log::{debug, info, warn};

use std::collections::{BTreeMap, BTreeSet, HashSet};

pub use crate::config::*;

pub mod builder;
pub mod manual;

// **** Private structures ****

// Both sides of a label before zero-filling.
#[derive(PartialEq, Debug, Clone, Copy, Default)]
struct JoinedSides {
    target: Option<f64>,
    actual: Option<f64>,
}

/// Merges the targets and the actuals into a comparison table.
///
/// This is a full outer join on the label: every label found on either side
/// appears exactly once in the output, sorted by label. A side that has no
/// entry for a label (or an entry without a number) reads as zero, never as
/// missing.
///
/// If a label is repeated on one side, the last occurrence is kept.
///
/// ```
/// use survey_metrics::*;
///
/// let targets = vec![TargetPoint { label: "A".to_string(), target: Some(10.0) }];
/// let actuals = vec![
///     ActualPoint { label: "A".to_string(), value: Some(7.0) },
///     ActualPoint { label: "B".to_string(), value: Some(2.0) },
/// ];
/// let merged = merge_targets_actuals(&targets, &actuals);
/// assert_eq!(merged[1], ComparisonRow { label: "B".to_string(), target: 0.0, actual: 2.0 });
/// ```
pub fn merge_targets_actuals(
    targets: &[TargetPoint],
    actuals: &[ActualPoint],
) -> Vec<ComparisonRow> {
    let mut joined: BTreeMap<String, JoinedSides> = BTreeMap::new();

    for t in targets.iter() {
        let sides = joined.entry(t.label.clone()).or_default();
        if sides.target.is_some() {
            warn!(
                "merge_targets_actuals: duplicate target for label {:?}, keeping the last one",
                t.label
            );
        }
        sides.target = Some(t.target.unwrap_or(0.0));
    }

    for a in actuals.iter() {
        let sides = joined.entry(a.label.clone()).or_default();
        if sides.actual.is_some() {
            warn!(
                "merge_targets_actuals: duplicate actual for label {:?}, keeping the last one",
                a.label
            );
        }
        sides.actual = Some(a.value.unwrap_or(0.0));
    }

    debug!(
        "merge_targets_actuals: {} targets, {} actuals -> {} labels",
        targets.len(),
        actuals.len(),
        joined.len()
    );

    joined
        .into_iter()
        .map(|(label, sides)| ComparisonRow {
            label,
            target: zero_if_missing(sides.target),
            actual: zero_if_missing(sides.actual),
        })
        .collect()
}

fn zero_if_missing(x: Option<f64>) -> f64 {
    match x {
        Some(v) if !v.is_nan() => v,
        _ => 0.0,
    }
}

/// The labels of a comparison table, in table order.
pub fn comparison_labels(rows: &[ComparisonRow]) -> Vec<String> {
    rows.iter().map(|r| r.label.clone()).collect()
}

/// Keeps the comparison rows whose label has been selected.
///
/// The table order is preserved, not the selection order. Selected labels
/// that do not exist are ignored.
pub fn select_labels(rows: &[ComparisonRow], selected: &[String]) -> Vec<ComparisonRow> {
    let wanted: HashSet<&str> = selected.iter().map(|s| s.as_str()).collect();
    rows.iter()
        .filter(|r| wanted.contains(r.label.as_str()))
        .cloned()
        .collect()
}

/// The distinct categories of the store, sorted.
pub fn categories(table: &Table) -> Vec<String> {
    let cats: BTreeSet<&str> = table
        .rows
        .iter()
        .filter_map(|r| r.category.as_deref())
        .collect();
    cats.into_iter().map(|s| s.to_string()).collect()
}

/// Computes the trailing rolling mean of the values of one category.
///
/// Arguments:
/// * `table` the loaded store
/// * `category` the category to keep. The comparison is exact and case-sensitive.
/// * `window` the number of points to average
///
/// Rows without a timestamp or a value are dropped, and the remaining rows are
/// ordered by time (ties keep their store order). The first points of the
/// series average over the points available so far, so the mean is always
/// defined and equals the value itself for the first point.
///
/// An empty vector is returned if nothing matches.
pub fn rolling_mean(table: &Table, category: &str, window: RollingWindow) -> Vec<RollingPoint> {
    let mut points: Vec<(chrono::NaiveDateTime, f64)> = table
        .rows
        .iter()
        .filter(|r| r.category.as_deref() == Some(category))
        .filter_map(|r| match (r.timestamp, r.value) {
            (Some(ts), Some(v)) if !v.is_nan() => Some((ts, v)),
            _ => None,
        })
        .collect();
    points.sort_by_key(|p| p.0);

    info!(
        "rolling_mean: category {:?}: {} points, window {}",
        category,
        points.len(),
        window.size()
    );

    let w = window.size();
    points
        .iter()
        .enumerate()
        .map(|(idx, (ts, v))| {
            let start = (idx + 1).saturating_sub(w);
            let span = &points[start..=idx];
            let total: f64 = span.iter().map(|p| p.1).sum();
            RollingPoint {
                timestamp: *ts,
                value: *v,
                rolling_mean: total / (span.len() as f64),
            }
        })
        .collect()
}
