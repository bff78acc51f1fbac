// Primitives for reading and writing the CSV store.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use crate::dash::*;

/// The store content as text, without any coercion.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Parses the store content into a table.
///
/// Returns None when there is nothing to parse (no header at all). Cells are
/// coerced: a value that is not a number or a timestamp that is not a date is
/// missing. A row with more fields than the header is an error.
pub fn parse_table(contents: &str) -> DashResult<Option<Table>> {
    if contents.trim().is_empty() {
        return Ok(None);
    }
    let raw = parse_raw(contents)?;
    if raw.headers.is_empty() {
        return Ok(None);
    }

    let column = |name: &str| raw.headers.iter().position(|h| h == name);
    let ts_idx = column("timestamp");
    let name_idx = column("name");
    let cat_idx = column("category");
    let value_idx = column("value");
    debug!(
        "parse_table: headers: {:?} rows: {}",
        raw.headers,
        raw.rows.len()
    );

    let cell = |row: &Vec<String>, idx: Option<usize>| -> Option<String> {
        idx.and_then(|i| row.get(i))
            .filter(|s| !s.is_empty())
            .cloned()
    };

    let rows = raw
        .rows
        .iter()
        .map(|row| Record {
            timestamp: cell(row, ts_idx).and_then(|s| parse_timestamp(&s)),
            name: cell(row, name_idx),
            category: cell(row, cat_idx),
            value: cell(row, value_idx).and_then(|s| parse_value(&s)),
        })
        .collect();
    Ok(Some(Table { rows }))
}

/// Reads the store content as text cells.
///
/// Short rows are padded with empty cells, long rows are rejected.
pub fn parse_raw(contents: &str) -> DashResult<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(contents.as_bytes());
    let headers: Vec<String> = rdr
        .headers()
        .context(CsvParseSnafu {})?
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is on the first line.
        let lineno = (idx + 2) as u64;
        let line: StringRecord = line_r.context(CsvParseSnafu {})?;
        if line.len() > headers.len() {
            return CsvLineTooLongSnafu {
                lineno,
                expected: headers.len(),
                found: line.len(),
            }
            .fail();
        }
        let mut row: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }
    Ok(RawTable { headers, rows })
}

/// Appends one entry to the store content and returns the new content.
///
/// The existing rows are kept as they are. Columns of the existing header that
/// are not part of an entry get an empty cell in the new row, and the entry
/// columns missing from the header are added at the end.
pub fn append_entry(existing: Option<&str>, entry: &Entry) -> DashResult<String> {
    let mut raw = match existing {
        Some(s) if !s.trim().is_empty() => parse_raw(s)?,
        _ => RawTable {
            headers: vec![],
            rows: vec![],
        },
    };

    for col in STORE_COLUMNS.iter() {
        if !raw.headers.iter().any(|h| h == col) {
            raw.headers.push(col.to_string());
        }
    }
    let width = raw.headers.len();
    for row in raw.rows.iter_mut() {
        row.resize(width, String::new());
    }

    let new_row: Vec<String> = raw
        .headers
        .iter()
        .map(|h| match h.as_str() {
            "timestamp" => entry.timestamp_string(),
            "name" => entry.name.clone(),
            "category" => entry.category.clone(),
            "value" => format_value(entry.value),
            _ => String::new(),
        })
        .collect();
    raw.rows.push(new_row);

    write_raw(&raw)
}

fn write_raw(raw: &RawTable) -> DashResult<String> {
    let mut wtr = WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(vec![]);
    wtr.write_record(&raw.headers).context(CsvParseSnafu {})?;
    for row in raw.rows.iter() {
        wtr.write_record(row).context(CsvParseSnafu {})?;
    }
    let bytes = match wtr.into_inner() {
        Ok(b) => b,
        Err(e) => whatever!("could not flush the CSV writer: {}", e),
    };
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => whatever!("the CSV writer produced invalid UTF-8: {}", e),
    }
}

/// Values are always written with a decimal part, as floats.
pub fn format_value(x: f64) -> String {
    format!("{:?}", x)
}

/// Reads a number, or nothing if the cell is not a number.
pub fn parse_value(s: &str) -> Option<f64> {
    match s.trim().parse::<f64>() {
        Ok(x) if !x.is_nan() => Some(x),
        _ => None,
    }
}

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Reads a timestamp, or nothing if the cell is not a date.
///
/// ISO-8601 date-times (with or without an offset) and plain dates are
/// understood. Timestamps with an offset keep their local time.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS.iter() {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn entry(category: &str, value: f64) -> Entry {
        Entry {
            timestamp: ymd_hms(2024, 3, 1, 9, 30, 0),
            name: "Ada".to_string(),
            category: category.to_string(),
            value,
        }
    }

    #[test]
    fn coerces_cells() {
        let t = parse_table(
            "timestamp,name,category,value\n\
             2024-03-01T09:30:00,Ada,water,2.5\n\
             not a date,,water,abc\n\
             2024-03-02,Bob,,\n",
        )
        .unwrap()
        .unwrap();
        assert_eq!(t.len(), 3);
        assert_eq!(
            t.rows[0],
            Record {
                timestamp: Some(ymd_hms(2024, 3, 1, 9, 30, 0)),
                name: Some("Ada".to_string()),
                category: Some("water".to_string()),
                value: Some(2.5),
            }
        );
        assert_eq!(t.rows[1].timestamp, None);
        assert_eq!(t.rows[1].name, None);
        assert_eq!(t.rows[1].value, None);
        assert_eq!(t.rows[2].timestamp, Some(ymd_hms(2024, 3, 2, 0, 0, 0)));
        assert_eq!(t.rows[2].category, None);
    }

    #[test]
    fn header_only_is_loaded_with_no_rows() {
        let t = parse_table("timestamp,name,category,value\n").unwrap().unwrap();
        assert!(t.is_empty());
    }

    #[test]
    fn nothing_to_parse() {
        assert_eq!(parse_table("").unwrap(), None);
        assert_eq!(parse_table("\n\n").unwrap(), None);
    }

    #[test]
    fn columns_by_name() {
        let t = parse_table("value,category,extra\n3,a,zzz\n4\n")
            .unwrap()
            .unwrap();
        assert_eq!(t.rows[0].value, Some(3.0));
        assert_eq!(t.rows[0].category.as_deref(), Some("a"));
        assert_eq!(t.rows[0].timestamp, None);
        assert_eq!(t.rows[1].value, Some(4.0));
        assert_eq!(t.rows[1].category, None);
    }

    #[test]
    fn long_row_is_rejected() {
        let res = parse_table("a,b\n1,2,3\n");
        assert!(matches!(
            res,
            Err(DashError::CsvLineTooLong {
                lineno: 2,
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn append_to_nothing() {
        let s = append_entry(None, &entry("water", 2.0)).unwrap();
        assert_eq!(
            s,
            "timestamp,name,category,value\n2024-03-01T09:30:00,Ada,water,2.0\n"
        );
        assert_eq!(append_entry(Some("  \n"), &entry("water", 2.0)).unwrap(), s);
    }

    #[test]
    fn append_keeps_existing_rows_and_columns() {
        let existing = "timestamp,name,category,value,note\nbad,x,\"a, b\",nope,hi\n";
        let s = append_entry(Some(existing), &entry("steps", 0.25)).unwrap();
        assert_eq!(
            s,
            "timestamp,name,category,value,note\n\
             bad,x,\"a, b\",nope,hi\n\
             2024-03-01T09:30:00,Ada,steps,0.25,\n"
        );
    }

    #[test]
    fn append_adds_missing_columns() {
        let s = append_entry(Some("name,category\nx,a\n"), &entry("b", 1.0)).unwrap();
        assert_eq!(
            s,
            "name,category,timestamp,value\nx,a,,\nAda,b,2024-03-01T09:30:00,1.0\n"
        );
    }

    #[test]
    fn timestamps() {
        assert_eq!(
            parse_timestamp("2024-03-01 09:30:00"),
            Some(ymd_hms(2024, 3, 1, 9, 30, 0))
        );
        assert_eq!(
            parse_timestamp("2024-03-01T09:30:00.250").map(|t| t.format("%S").to_string()),
            Some("00".to_string())
        );
        assert_eq!(
            parse_timestamp("2024-03-01T09:30:00+02:00"),
            Some(ymd_hms(2024, 3, 1, 9, 30, 0))
        );
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn values() {
        assert_eq!(parse_value(" 4 "), Some(4.0));
        assert_eq!(parse_value("NaN"), None);
        assert_eq!(parse_value("1e3"), Some(1000.0));
        assert_eq!(format_value(3.0), "3.0");
        assert_eq!(format_value(0.1), "0.1");
    }
}
