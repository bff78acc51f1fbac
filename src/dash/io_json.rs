// Reading the static JSON snapshot (weekly targets and sample actuals).

use std::io::ErrorKind;
use std::path::Path;

use log::Level;
use serde::{Deserialize, Serialize};

use crate::dash::*;

/// The content of the snapshot, ready to be merged.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Snapshot {
    pub weekly_targets: Vec<TargetPoint>,
    pub sample_actuals: Vec<ActualPoint>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
struct TargetJs {
    label: String,
    #[serde(default)]
    target: Option<f64>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
struct ActualJs {
    label: String,
    #[serde(default)]
    value: Option<f64>,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
struct SnapshotJs {
    #[serde(default)]
    weekly_targets: Option<Vec<TargetJs>>,
    #[serde(default)]
    sample_actuals: Option<Vec<ActualJs>>,
}

/// The outcome of loading the snapshot.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum JsonStatus {
    Loaded,
    /// The file does not exist.
    Missing,
    /// The file is not valid JSON.
    Malformed(String),
    /// Anything else: the file could not be read, or the document does not
    /// have the expected shape.
    Unexpected(String),
}

impl JsonStatus {
    pub fn level(&self) -> Level {
        match self {
            JsonStatus::Loaded => Level::Info,
            JsonStatus::Missing => Level::Warn,
            JsonStatus::Malformed(_) | JsonStatus::Unexpected(_) => Level::Error,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JsonStatus::Loaded => "loaded",
            JsonStatus::Missing => "missing",
            JsonStatus::Malformed(_) => "malformed",
            JsonStatus::Unexpected(_) => "unexpected",
        }
    }

    pub fn message(&self, name: &str) -> String {
        match self {
            JsonStatus::Loaded => format!("[ok] Loaded JSON: {}", name),
            JsonStatus::Missing => format!("[warning] {} not found: create it first.", name),
            JsonStatus::Malformed(msg) => {
                format!("[error] {} has invalid JSON (syntax error): {}", name, msg)
            }
            JsonStatus::Unexpected(msg) => format!("[error] Could not read {}: {}", name, msg),
        }
    }

    pub fn report(&self, name: &str) {
        log::log!(self.level(), "load_json: {:?} {:?}", name, self);
    }
}

/// Loads the snapshot. All the failures give None, with a status telling them apart.
pub fn load_json(path: &Path) -> (Option<Snapshot>, JsonStatus) {
    let contents = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) if e.kind() == ErrorKind::NotFound => return (None, JsonStatus::Missing),
        Err(e) => return (None, JsonStatus::Unexpected(e.to_string())),
    };
    parse_snapshot(&contents)
}

/// Parses the content of a snapshot.
pub fn parse_snapshot(contents: &str) -> (Option<Snapshot>, JsonStatus) {
    let js: JSValue = match serde_json::from_str(contents) {
        Ok(js) => js,
        Err(e) => return (None, JsonStatus::Malformed(e.to_string())),
    };
    let snap_js: SnapshotJs = match serde_json::from_value(js) {
        Ok(x) => x,
        Err(e) => {
            return (
                None,
                JsonStatus::Unexpected(format!("unexpected document layout: {}", e)),
            )
        }
    };

    let weekly_targets: Vec<TargetPoint> = snap_js
        .weekly_targets
        .unwrap_or_default()
        .into_iter()
        .map(|t| TargetPoint {
            label: t.label,
            target: t.target,
        })
        .collect();
    let sample_actuals: Vec<ActualPoint> = snap_js
        .sample_actuals
        .unwrap_or_default()
        .into_iter()
        .map(|a| ActualPoint {
            label: a.label,
            value: a.value,
        })
        .collect();
    debug!(
        "parse_snapshot: {} targets, {} actuals",
        weekly_targets.len(),
        sample_actuals.len()
    );

    (
        Some(Snapshot {
            weekly_targets,
            sample_actuals,
        }),
        JsonStatus::Loaded,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_lists() {
        let (snap, status) = parse_snapshot(
            r#"{"weekly_targets":[{"label":"A","target":10}],
                "sample_actuals":[{"label":"A","value":7},{"label":"B","value":2.5}],
                "notes": "ignored"}"#,
        );
        assert_eq!(status, JsonStatus::Loaded);
        let snap = snap.unwrap();
        assert_eq!(
            snap.weekly_targets,
            vec![TargetPoint {
                label: "A".to_string(),
                target: Some(10.0)
            }]
        );
        assert_eq!(snap.sample_actuals.len(), 2);
        assert_eq!(snap.sample_actuals[1].value, Some(2.5));
    }

    #[test]
    fn keys_are_optional() {
        let (snap, status) = parse_snapshot(r#"{"weekly_targets": null}"#);
        assert_eq!(status, JsonStatus::Loaded);
        assert_eq!(snap, Some(Snapshot::default()));

        let (snap, _) = parse_snapshot(r#"{"weekly_targets":[{"label":"A"}]}"#);
        assert_eq!(snap.unwrap().weekly_targets[0].target, None);
    }

    #[test]
    fn syntax_error_is_malformed() {
        let (snap, status) = parse_snapshot(r#"{"weekly_targets": [}"#);
        assert_eq!(snap, None);
        assert!(matches!(status, JsonStatus::Malformed(_)));
        assert_eq!(status.level(), Level::Error);
    }

    #[test]
    fn wrong_shape_is_unexpected() {
        let (snap, status) = parse_snapshot(r#"[1, 2, 3]"#);
        assert_eq!(snap, None);
        assert!(matches!(status, JsonStatus::Unexpected(_)));
        let (snap, status) = parse_snapshot(r#"{"sample_actuals":[{"value": 3}]}"#);
        assert_eq!(snap, None);
        assert_eq!(status.label(), "unexpected");
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let (snap, status) = load_json(&dir.path().join("data.json"));
        assert_eq!(snap, None);
        assert_eq!(status, JsonStatus::Missing);
        assert!(status.message("data.json").contains("not found"));
    }

    #[test]
    fn directory_is_unexpected() {
        let dir = tempfile::tempdir().unwrap();
        let (snap, status) = load_json(dir.path());
        assert_eq!(snap, None);
        assert!(matches!(status, JsonStatus::Unexpected(_)));
    }
}
