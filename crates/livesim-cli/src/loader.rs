//! Dataset loading
//!
//! Reads a headed CSV file into [`Record`]s. Header names are normalized to
//! the store's column naming and each column gets a single inferred scalar
//! type, so a column of `"7"`s uploads as integers rather than strings.

use crate::error::{CliError, Result};
use csv::StringRecord;
use livesim_common::types::{Record, REQUIRED_FIELDS};
use serde_json::{Number, Value};
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// How many column names the load summary shows
const SUMMARY_COLUMNS: usize = 10;

/// Inferred scalar type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Boolean,
    Text,
    /// Every cell was empty
    Empty,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Integer => "integer",
            ColumnKind::Float => "float",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Text => "text",
            ColumnKind::Empty => "empty",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Header as written in the file
    pub original: String,
    /// Header after normalization; the record field name
    pub name: String,
    pub kind: ColumnKind,
}

/// A loaded, validated dataset
#[derive(Debug, Clone)]
pub struct Dataset {
    pub source: PathBuf,
    pub columns: Vec<Column>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Normalize a header to a store column name.
///
/// Lowercase, turn spaces and periods into underscores, then drop anything
/// that is not alphanumeric or an underscore.
///
/// ```
/// use livesim_cli::loader::normalize_column_name;
///
/// assert_eq!(normalize_column_name("Date.Time"), "date_time");
/// assert_eq!(normalize_column_name("Trip ID"), "trip_id");
/// assert_eq!(normalize_column_name("Speed (km/h)"), "speed_kmh");
/// ```
pub fn normalize_column_name(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '.' { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

/// Load and validate the dataset at `path`.
///
/// Fails if the file is missing or unparseable, if a header collides with
/// another after normalization, or if an identity column is absent. A file
/// with a header and no rows loads successfully as an empty dataset.
pub fn load(path: &Path) -> Result<Dataset> {
    if !path.is_file() {
        return Err(CliError::FileNotFound(path.display().to_string()));
    }

    let file = std::fs::File::open(path)?;
    let dataset = load_from_reader(file, path)?;

    info!(
        records = dataset.len(),
        path = %path.display(),
        "Successfully loaded {} records",
        dataset.len()
    );
    let sample: Vec<&str> = dataset
        .column_names()
        .into_iter()
        .take(SUMMARY_COLUMNS)
        .collect();
    info!(columns = ?sample, total = dataset.columns.len(), "Column names after cleaning");

    Ok(dataset)
}

/// Parse CSV text from any reader; `source` is only used for reporting
pub fn load_from_reader<R: Read>(reader: R, source: impl Into<PathBuf>) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let names = normalize_headers(&headers)?;

    for required in REQUIRED_FIELDS {
        if !names.iter().any(|n| n == required) {
            return Err(CliError::MissingColumn {
                column: required.to_string(),
                available: names.clone(),
            });
        }
    }

    let rows = csv_reader
        .records()
        .collect::<std::result::Result<Vec<StringRecord>, csv::Error>>()?;

    let kinds: Vec<ColumnKind> = (0..names.len())
        .map(|i| infer_kind(rows.iter().map(|row| row.get(i).unwrap_or(""))))
        .collect();

    let records = rows
        .iter()
        .map(|row| {
            names
                .iter()
                .zip(&kinds)
                .enumerate()
                .map(|(i, (name, kind))| (name.clone(), convert(row.get(i).unwrap_or(""), *kind)))
                .collect::<Record>()
        })
        .collect();

    let columns = headers
        .iter()
        .zip(names)
        .zip(kinds)
        .map(|((original, name), kind)| Column {
            original: original.to_string(),
            name,
            kind,
        })
        .collect::<Vec<_>>();

    debug!(columns = ?columns, "Inferred column types");

    Ok(Dataset {
        source: source.into(),
        columns,
        records,
    })
}

fn normalize_headers(headers: &StringRecord) -> Result<Vec<String>> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    let mut names = Vec::with_capacity(headers.len());

    for original in headers.iter() {
        let name = normalize_column_name(original);
        if let Some(first) = seen.insert(name.clone(), original) {
            return Err(CliError::DuplicateColumn {
                first: first.to_string(),
                second: original.to_string(),
                normalized: name,
            });
        }
        names.push(name);
    }

    Ok(names)
}

/// Pick the narrowest kind that every non-empty cell fits
fn infer_kind<'a>(cells: impl Iterator<Item = &'a str>) -> ColumnKind {
    let mut integer = true;
    let mut float = true;
    let mut boolean = true;
    let mut any = false;

    for cell in cells.filter(|c| !c.is_empty()) {
        any = true;
        integer &= cell.parse::<i64>().is_ok();
        float &= parse_decimal(cell).is_some();
        boolean &= parse_bool(cell).is_some();
        if !(integer || float || boolean) {
            return ColumnKind::Text;
        }
    }

    match (any, integer, float, boolean) {
        (false, ..) => ColumnKind::Empty,
        (_, true, ..) => ColumnKind::Integer,
        (_, _, true, _) => ColumnKind::Float,
        (_, _, _, true) => ColumnKind::Boolean,
        _ => ColumnKind::Text,
    }
}

fn convert(cell: &str, kind: ColumnKind) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }

    let typed = match kind {
        ColumnKind::Integer => cell.parse::<i64>().ok().map(Value::from),
        ColumnKind::Float => parse_decimal(cell).map(Value::Number),
        ColumnKind::Boolean => parse_bool(cell).map(Value::Bool),
        ColumnKind::Text | ColumnKind::Empty => None,
    };

    typed.unwrap_or_else(|| Value::String(cell.to_string()))
}

/// Finite float, excluding whole numbers outside `i64` that `f64` would round
fn parse_decimal(cell: &str) -> Option<Number> {
    if is_integer_literal(cell) && cell.parse::<i64>().is_err() {
        return None;
    }
    cell.parse::<f64>().ok().and_then(Number::from_f64)
}

fn is_integer_literal(cell: &str) -> bool {
    let digits = cell.strip_prefix(['-', '+']).unwrap_or(cell);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell.to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use livesim_common::types::IdentityKey;
    use proptest::prelude::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn load_str(text: &str) -> Result<Dataset> {
        load_from_reader(text.as_bytes(), "inline.csv")
    }

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name("Date.Time"), "date_time");
        assert_eq!(normalize_column_name("Trip ID"), "trip_id");
        assert_eq!(normalize_column_name("DateTime"), "datetime");
        assert_eq!(normalize_column_name("Occupancy-%"), "occupancy");
        assert_eq!(normalize_column_name("  Lat.  "), "__lat___");
    }

    #[test]
    fn test_load_normalizes_and_types_columns() {
        let dataset = load_str(
            "DateTime,Trip ID,Stop Seq,Speed.Kmh,Delayed,Route\n\
             2024-01-01T00:00:00,T1,1,42.5,true,R10\n\
             2024-01-01T00:00:05,T2,2,,FALSE,R11\n",
        )
        .unwrap();

        assert_eq!(
            dataset.column_names(),
            vec!["datetime", "trip_id", "stop_seq", "speed_kmh", "delayed", "route"]
        );
        let kinds: Vec<ColumnKind> = dataset.columns.iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ColumnKind::Text,
                ColumnKind::Text,
                ColumnKind::Integer,
                ColumnKind::Float,
                ColumnKind::Boolean,
                ColumnKind::Text
            ]
        );

        let first = &dataset.records[0];
        assert_eq!(first.get("stop_seq"), Some(&json!(1)));
        assert_eq!(first.get("speed_kmh"), Some(&json!(42.5)));
        assert_eq!(first.get("delayed"), Some(&json!(true)));
        assert_eq!(dataset.records[1].get("speed_kmh"), Some(&Value::Null));
        assert_eq!(
            IdentityKey::from_record(first).unwrap(),
            IdentityKey::new("2024-01-01T00:00:00", "T1")
        );
    }

    #[test]
    fn test_mixed_column_stays_text() {
        let dataset = load_str("datetime,trip_id,code\na,T1,7\nb,T2,x7\n").unwrap();
        assert_eq!(dataset.columns[2].kind, ColumnKind::Text);
        assert_eq!(dataset.records[0].get("code"), Some(&json!("7")));
    }

    #[test]
    fn test_nan_is_not_a_float() {
        let dataset = load_str("datetime,trip_id,v\na,T1,1.5\nb,T2,NaN\n").unwrap();
        assert_eq!(dataset.columns[2].kind, ColumnKind::Text);
    }

    #[test]
    fn test_oversized_integers_stay_text() {
        let dataset = load_str(
            "datetime,trip_id,v\n2024-01-01T00:00:00,123456789012345678901,2.5\nb,T2,-99999999999999999999\n",
        )
        .unwrap();

        assert_eq!(dataset.columns[1].kind, ColumnKind::Text);
        assert_eq!(dataset.columns[2].kind, ColumnKind::Text);
        assert_eq!(
            dataset.records[0].get("trip_id"),
            Some(&json!("123456789012345678901"))
        );
        assert_eq!(
            IdentityKey::from_record(&dataset.records[0]).unwrap(),
            IdentityKey::new("2024-01-01T00:00:00", "123456789012345678901")
        );
        assert_eq!(dataset.records[1].get("v"), Some(&json!("-99999999999999999999")));
    }

    #[test]
    fn test_missing_required_column() {
        let err = load_str("Date.Time,Trip ID\n2024-01-01,T1\n").unwrap_err();
        match err {
            CliError::MissingColumn { column, available } => {
                assert_eq!(column, "datetime");
                assert_eq!(available, vec!["date_time", "trip_id"]);
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }

        let err = load_str("datetime,route\n2024-01-01,R1\n").unwrap_err();
        assert!(matches!(err, CliError::MissingColumn { ref column, .. } if column == "trip_id"));
    }

    #[test]
    fn test_duplicate_normalized_columns() {
        let err = load_str("datetime,trip_id,Trip.ID\na,T1,T1\n").unwrap_err();
        assert!(matches!(
            err,
            CliError::DuplicateColumn { ref normalized, .. } if normalized == "trip_id"
        ));
    }

    #[test]
    fn test_header_only_file_is_empty_dataset() {
        let dataset = load_str("datetime,trip_id\n").unwrap();
        assert!(dataset.is_empty());
        assert_eq!(dataset.columns[0].kind, ColumnKind::Empty);
    }

    #[test]
    fn test_ragged_row_is_a_parse_error() {
        let err = load_str("datetime,trip_id\na,T1,extra\n").unwrap_err();
        assert!(matches!(err, CliError::Csv(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "datetime,trip_id").unwrap();
        writeln!(file, "2024-01-01T00:00:00,T1").unwrap();

        let dataset = load(file.path()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.source, file.path());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load(Path::new("/nonexistent/live_data.csv")).unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    proptest! {
        #[test]
        fn normalized_names_use_only_word_chars(raw in ".{0,40}") {
            let name = normalize_column_name(&raw);
            prop_assert!(name.chars().all(|c| c.is_alphanumeric() || c == '_'));
            prop_assert!(!name.contains(' ') && !name.contains('.'));
        }

        #[test]
        fn normalization_is_idempotent(raw in "[A-Za-z0-9 ._()-]{0,40}") {
            let once = normalize_column_name(&raw);
            prop_assert_eq!(normalize_column_name(&once), once.clone());
        }
    }
}
