use clap::{Parser, Subcommand};

/// This is a survey recorder and dashboard working over a flat CSV file.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file. See the manual for the
    /// available options.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, default data.csv) The CSV file holding the survey entries. Setting this option
    /// overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub store: Option<String>,

    /// (file path, default data.json) The JSON snapshot with the weekly targets and the sample
    /// actuals. Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub document: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Adds a new entry to the store.
    Submit {
        /// The category of the entry (required, cannot be blank).
        #[clap(long, value_parser)]
        category: String,
        /// (optional) The name of the person submitting. Recorded as 'anonymous' if blank.
        #[clap(long, value_parser)]
        name: Option<String>,
        /// (default 0) The value of the entry. Must be zero or more.
        #[clap(long, value_parser = parse_value, default_value = "0")]
        value: f64,
    },
    /// Prints the current content of the store.
    Show,
    /// Loads the store and the snapshot and prints the three charts.
    Visuals {
        /// (optional) The category to plot in the rolling average chart. Defaults to the first
        /// category in alphabetical order.
        #[clap(long, value_parser)]
        category: Option<String>,
        /// (1 to 7, default 3) The number of points averaged by the rolling average.
        #[clap(short, long, value_parser = clap::value_parser!(u32).range(1..=7))]
        window: Option<u32>,
        /// (repeatable, optional) The labels to compare in the last chart. All the labels
        /// are compared if not specified.
        #[clap(long, value_parser)]
        labels: Option<Vec<String>>,
        /// (file path, 'stdout' or empty) If specified, a summary of the charts will be written in
        /// JSON format to the given location.
        #[clap(short, long, value_parser)]
        out: Option<String>,
        /// (file path) A reference summary in JSON format. If provided, surveydash will
        /// check that the computed summary matches the reference.
        #[clap(short, long, value_parser)]
        reference: Option<String>,
    },
}

fn parse_value(s: &str) -> Result<f64, String> {
    let x: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if !x.is_finite() {
        return Err(format!("'{}' is not a finite number", s));
    }
    if x < 0.0 {
        return Err(format!("the value must be 0 or more, got {}", x));
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_parser() {
        assert_eq!(parse_value("2.5"), Ok(2.5));
        assert_eq!(parse_value(" 0 "), Ok(0.0));
        assert!(parse_value("-1").is_err());
        assert!(parse_value("abc").is_err());
        assert!(parse_value("inf").is_err());
    }

    #[test]
    fn parses_visuals() {
        let args = Args::try_parse_from([
            "surveydash",
            "--store",
            "x.csv",
            "visuals",
            "--category",
            "water",
            "-w",
            "5",
            "--labels",
            "Mon",
            "--labels",
            "Tue",
        ])
        .unwrap();
        assert_eq!(args.store.as_deref(), Some("x.csv"));
        match args.command {
            Command::Visuals {
                category,
                window,
                labels,
                ..
            } => {
                assert_eq!(category.as_deref(), Some("water"));
                assert_eq!(window, Some(5));
                assert_eq!(labels, Some(vec!["Mon".to_string(), "Tue".to_string()]));
            }
            c => panic!("unexpected command {:?}", c),
        }
    }

    #[test]
    fn rejects_window_out_of_range() {
        assert!(Args::try_parse_from(["surveydash", "visuals", "-w", "8"]).is_err());
        assert!(Args::try_parse_from(["surveydash", "visuals", "-w", "0"]).is_err());
    }

    #[test]
    fn rejects_negative_value() {
        assert!(
            Args::try_parse_from(["surveydash", "submit", "--category", "a", "--value", "-2"])
                .is_err()
        );
    }
}
