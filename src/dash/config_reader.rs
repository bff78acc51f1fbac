use crate::dash::*;

use serde::{Deserialize, Serialize};

/// The optional configuration file.
///
/// Every field can be overridden from the command line.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashConfig {
    #[serde(rename = "storePath")]
    pub store_path: Option<String>,
    #[serde(rename = "documentPath")]
    pub document_path: Option<String>,
    #[serde(rename = "rollingWindow")]
    pub rolling_window: Option<u32>,
    pub labels: Option<Vec<String>>,
}

pub fn read_config(path: &str) -> DashResult<DashConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: DashConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_partial_config() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("dash.json");
        fs::write(&p, r#"{"rollingWindow": 4}"#).unwrap();
        let c = read_config(p.to_str().unwrap()).unwrap();
        assert_eq!(
            c,
            DashConfig {
                rolling_window: Some(4),
                ..DashConfig::default()
            }
        );
    }

    #[test]
    fn missing_or_broken_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("dash.json");
        assert!(matches!(
            read_config(p.to_str().unwrap()),
            Err(DashError::OpeningJson { .. })
        ));
        fs::write(&p, "{").unwrap();
        assert!(matches!(
            read_config(p.to_str().unwrap()),
            Err(DashError::ParsingJson { .. })
        ));
    }
}
