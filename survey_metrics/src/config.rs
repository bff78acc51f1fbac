// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

use chrono::NaiveDateTime;

/// The name recorded when a submission leaves the name blank.
pub const ANONYMOUS: &str = "anonymous";

/// Format of the timestamps written to the store (ISO-8601, second precision).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// The columns of the store, in the order they are written.
pub const STORE_COLUMNS: [&str; 4] = ["timestamp", "name", "category", "value"];

/// A validated survey entry, ready to be appended to the store.
///
/// Entries are produced by the [`crate::builder::Submission`] builder, which
/// guarantees a non-empty category and a non-negative value.
#[derive(PartialEq, Debug, Clone)]
pub struct Entry {
    pub timestamp: NaiveDateTime,
    pub name: String,
    pub category: String,
    pub value: f64,
}

impl Entry {
    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// One row of the store, as read back.
///
/// All the fields are coerced: a cell that cannot be understood is missing
/// rather than an error.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Record {
    pub timestamp: Option<NaiveDateTime>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub value: Option<f64>,
}

/// The loaded content of the store.
///
/// A table always has the columns of [`STORE_COLUMNS`], even when it was built
/// from a missing or broken file.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Table {
    pub rows: Vec<Record>,
}

impl Table {
    pub fn empty() -> Table {
        Table { rows: Vec::new() }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &STORE_COLUMNS
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A weekly target for a label.
///
/// A missing number is treated as zero when merging.
#[derive(PartialEq, Debug, Clone)]
pub struct TargetPoint {
    pub label: String,
    pub target: Option<f64>,
}

/// An observed value for a label.
#[derive(PartialEq, Debug, Clone)]
pub struct ActualPoint {
    pub label: String,
    pub value: Option<f64>,
}

// ******** Output data structures *********

/// One row of the target/actual comparison.
#[derive(PartialEq, Debug, Clone)]
pub struct ComparisonRow {
    pub label: String,
    pub target: f64,
    pub actual: f64,
}

/// One point of a smoothed series.
#[derive(PartialEq, Debug, Clone)]
pub struct RollingPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
    pub rolling_mean: f64,
}

/// Errors raised by the metric primitives.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum MetricErrors {
    /// The category was empty after trimming. Nothing gets recorded.
    EmptyCategory,
    /// The rolling window is outside of `RollingWindow::MIN..=RollingWindow::MAX`.
    WindowOutOfRange(u32),
}

impl Error for MetricErrors {}

impl Display for MetricErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricErrors::EmptyCategory => write!(f, "Please enter a category."),
            MetricErrors::WindowOutOfRange(w) => write!(
                f,
                "rolling window must be between {} and {}, got {}",
                RollingWindow::MIN,
                RollingWindow::MAX,
                w
            ),
        }
    }
}

// ********* Configuration **********

/// The number of points averaged by the series smoother.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct RollingWindow(u32);

impl RollingWindow {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 7;
    pub const DEFAULT: RollingWindow = RollingWindow(3);

    pub fn new(size: u32) -> Result<RollingWindow, MetricErrors> {
        if (RollingWindow::MIN..=RollingWindow::MAX).contains(&size) {
            Ok(RollingWindow(size))
        } else {
            Err(MetricErrors::WindowOutOfRange(size))
        }
    }

    pub fn size(&self) -> usize {
        self.0 as usize
    }
}

impl Default for RollingWindow {
    fn default() -> Self {
        RollingWindow::DEFAULT
    }
}
