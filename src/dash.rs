use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use survey_metrics::builder::Submission;
use survey_metrics::*;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::dash::config_reader::*;
use crate::dash::io_json::*;
use crate::dash::render::*;
use crate::dash::store::*;

pub mod config_reader;
pub mod io_csv;
pub mod io_json;
pub mod render;
pub mod store;

#[derive(Debug, Snafu)]
pub enum DashError {
    #[snafu(display("Error reading the store {path}"))]
    ReadingStore {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing the store {path}"))]
    WritingStore {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Could not parse the CSV content"))]
    CsvParse { source: csv::Error },
    #[snafu(display("Line {lineno}: expected at most {expected} fields, found {found}"))]
    CsvLineTooLong {
        lineno: u64,
        expected: usize,
        found: usize,
    },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("{source}"))]
    InvalidSubmission { source: MetricErrors },
    #[snafu(display("Invalid setting: {source}"))]
    InvalidWindow { source: MetricErrors },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashResult<T> = Result<T, DashError>;

pub const DEFAULT_STORE_PATH: &str = "data.csv";
pub const DEFAULT_DOCUMENT_PATH: &str = "data.json";

/// The resolved locations and selections for one run.
#[derive(PartialEq, Debug, Clone)]
pub struct Settings {
    pub store_path: PathBuf,
    pub document_path: PathBuf,
    pub window: RollingWindow,
    pub labels: Option<Vec<String>>,
}

impl Settings {
    /// Combines the command line options with the (optional) configuration file.
    /// The command line wins.
    pub fn resolve(
        config_path: Option<&str>,
        store: Option<&str>,
        document: Option<&str>,
        window: Option<u32>,
        labels: Option<Vec<String>>,
    ) -> DashResult<Settings> {
        let (config, root) = match config_path {
            Some(p) => {
                let config = read_config(p)?;
                info!("config: {:?}", config);
                let root = Path::new(p)
                    .parent()
                    .map(|x| x.to_path_buf())
                    .unwrap_or_default();
                (config, root)
            }
            None => (DashConfig::default(), PathBuf::new()),
        };

        let store_path = match (store, config.store_path.as_deref()) {
            (Some(s), _) => PathBuf::from(s),
            (None, Some(s)) => root.join(s),
            (None, None) => PathBuf::from(DEFAULT_STORE_PATH),
        };
        let document_path = match (document, config.document_path.as_deref()) {
            (Some(s), _) => PathBuf::from(s),
            (None, Some(s)) => root.join(s),
            (None, None) => PathBuf::from(DEFAULT_DOCUMENT_PATH),
        };
        let window = match window.or(config.rolling_window) {
            Some(w) => RollingWindow::new(w).context(InvalidWindowSnafu {})?,
            None => RollingWindow::DEFAULT,
        };

        Ok(Settings {
            store_path,
            document_path,
            window,
            labels: labels.or(config.labels),
        })
    }
}

/// Records one entry in the store.
pub fn run_submit(
    settings: &Settings,
    category: &str,
    name: Option<&str>,
    value: f64,
) -> DashResult<()> {
    let mut store = EntryStore::new(FileBackend::new(&settings.store_path));
    let mut submission = Submission::new(category).value(value);
    if let Some(n) = name {
        submission = submission.name(n);
    }
    let entry = store.submit(&submission, Local::now().naive_local())?;
    println!(
        "Your entry has been saved to {}!",
        settings.store_path.display()
    );
    println!(
        "You entered: Category: {}, Value: {:.2}",
        entry.category, entry.value
    );
    Ok(())
}

/// Prints the current content of the store.
pub fn run_show(settings: &Settings) -> DashResult<()> {
    let store = EntryStore::new(FileBackend::new(&settings.store_path));
    match store.read_raw()? {
        Some(raw) => {
            println!("Current data in {}", settings.store_path.display());
            print!("{}", render_raw_table(&raw));
        }
        None => {
            warn!("run_show: nothing to show in {:?}", settings.store_path);
            println!(
                "[warning] The '{}' file is empty or does not exist yet.",
                settings.store_path.display()
            );
        }
    }
    Ok(())
}

/// Everything needed to draw the three charts.
#[derive(PartialEq, Debug, Clone)]
pub struct Dashboard {
    pub store_status: LoadStatus,
    pub document_status: JsonStatus,
    /// None when the snapshot could not be loaded.
    pub comparison: Option<Vec<ComparisonRow>>,
    pub series: SeriesView,
    /// None when the snapshot could not be loaded.
    pub selection: Option<Vec<ComparisonRow>>,
}

/// The state of the rolling average chart.
#[derive(PartialEq, Debug, Clone)]
pub enum SeriesView {
    /// The store has no usable rows at all.
    NoData,
    /// The chosen category has no plottable rows.
    NoRows { category: String },
    Points {
        category: String,
        window: RollingWindow,
        points: Vec<RollingPoint>,
    },
}

/// Runs the load, merge and smoothing steps.
///
/// The selections (category, window, labels) are passed explicitly. When no
/// category is given, the first category in sorted order is used. When no
/// labels are given, all the labels are kept.
pub fn assemble_dashboard(
    table: &Table,
    store_status: LoadStatus,
    snapshot: Option<&Snapshot>,
    document_status: JsonStatus,
    category: Option<&str>,
    window: RollingWindow,
    labels: Option<&[String]>,
) -> Dashboard {
    let comparison =
        snapshot.map(|s| merge_targets_actuals(&s.weekly_targets, &s.sample_actuals));

    let selection = comparison.as_ref().map(|rows| match labels {
        Some(ls) => select_labels(rows, ls),
        None => rows.clone(),
    });

    let cats = categories(table);
    debug!("assemble_dashboard: categories: {:?}", cats);
    let chosen = category.map(|c| c.to_string()).or_else(|| cats.first().cloned());
    let series = match chosen {
        Some(c) if !cats.is_empty() => {
            let points = rolling_mean(table, &c, window);
            if points.is_empty() {
                SeriesView::NoRows { category: c }
            } else {
                SeriesView::Points {
                    category: c,
                    window,
                    points,
                }
            }
        }
        _ => SeriesView::NoData,
    };

    Dashboard {
        store_status,
        document_status,
        comparison,
        series,
        selection,
    }
}

/// Loads both files, prints the charts and optionally writes or checks the summary.
pub fn run_visuals(
    settings: &Settings,
    category: Option<&str>,
    out: Option<&str>,
    reference: Option<&str>,
) -> DashResult<()> {
    let store = EntryStore::new(FileBackend::new(&settings.store_path));
    let (table, store_status) = store.load();
    store_status.report(&settings.store_path.display().to_string());
    println!(
        "{}",
        store_status.message(&settings.store_path.display().to_string())
    );

    let (snapshot, document_status) = load_json(&settings.document_path);
    document_status.report(&settings.document_path.display().to_string());
    println!(
        "{}",
        document_status.message(&settings.document_path.display().to_string())
    );

    let dashboard = assemble_dashboard(
        &table,
        store_status,
        snapshot.as_ref(),
        document_status,
        category,
        settings.window,
        settings.labels.as_deref(),
    );

    print!("{}", render_dashboard(&dashboard));

    let summary_js = build_summary_js(&dashboard);
    let pretty_js_stats = serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;

    match out {
        None | Some("") => {}
        Some("stdout") => println!("summary:{}", pretty_js_stats),
        Some(p) => {
            info!("Writing summary to {:?}", p);
            fs::write(p, &pretty_js_stats).context(WritingSummarySnafu { path: p })?;
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = reference {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between computed summary and reference summary")
        }
        info!("Summary matches the reference {:?}", summary_p);
    }

    Ok(())
}

fn read_summary(path: &str) -> DashResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}
