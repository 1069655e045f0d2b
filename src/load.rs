//! Reading observations from CSV and JSON files.
//!
//! JSON comes in the two layouts pandas writes: an array of row objects, or
//! an object of columns keyed by row index.

use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};
use time::{macros::format_description, Date, OffsetDateTime};
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    record::{Observations, Record},
};

const REQUIRED: [&str; 4] = ["date", "t_min", "t_max", "t_avg"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
}

impl Format {
    /// `.csv` files are CSV, everything else is tried as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Format::Csv,
            _ => Format::Json,
        }
    }

    pub fn parse(self, content: &str) -> Result<Observations> {
        let records = match self {
            Format::Csv => parse_csv(content)?,
            Format::Json => parse_json(content)?,
        };
        Observations::new(records)
    }
}

pub fn load(path: impl AsRef<Path>) -> Result<Observations> {
    let path = path.as_ref();
    let format = Format::from_path(path);
    debug!(path = %path.display(), ?format, "reading observations");

    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let observations = format.parse(&content)?;

    info!(
        path = %path.display(),
        records = observations.len(),
        from = %observations.first_date(),
        to = %observations.last_date(),
        "loaded observations"
    );
    Ok(observations)
}

/// A row as it appears in the file, before validation.
#[derive(Debug, Deserialize)]
struct RawRecord {
    date: Cell,
    #[serde(default)]
    city: Option<Cell>,
    t_min: Cell,
    t_max: Cell,
    t_avg: Cell,
    #[serde(default)]
    description: Option<Cell>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Cell {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Cell {
    /// The cell as it would be displayed, `None` when it holds nothing.
    fn into_text(self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Bool(value) => Some(value.to_string()),
            Cell::Integer(value) => Some(value.to_string()),
            Cell::Float(value) => Some(value.to_string()),
            Cell::Text(text) => Some(text),
        }
    }

    fn describe(self) -> String {
        self.into_text().unwrap_or_else(|| String::from("null"))
    }
}

impl RawRecord {
    fn validate(self, format: Format, row: usize) -> Result<Record> {
        Ok(Record {
            date: parse_date(self.date, format)?,
            city: self.city.and_then(Cell::into_text).unwrap_or_default(),
            t_min: temperature(self.t_min, "t_min", row)?,
            t_max: temperature(self.t_max, "t_max", row)?,
            t_avg: temperature(self.t_avg, "t_avg", row)?,
            description: self.description.and_then(Cell::into_text).unwrap_or_default(),
        })
    }
}

fn parse_date(cell: Cell, format: Format) -> Result<Date> {
    match cell {
        Cell::Text(text) => {
            let text = text.trim();
            // drop a time of day if there is one
            let day = text.split(|c: char| c == 'T' || c == ' ').next().unwrap_or(text);
            Date::parse(day, format_description!("[year]-[month]-[day]"))
                .map_err(|_| Error::InvalidDate(text.to_string()))
        }
        // pandas writes datetimes as epoch milliseconds
        Cell::Integer(millis) if format == Format::Json => {
            OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
                .map(|datetime| datetime.date())
                .map_err(|_| Error::InvalidDate(millis.to_string()))
        }
        other => Err(Error::InvalidDate(other.describe())),
    }
}

fn temperature(cell: Cell, column: &'static str, row: usize) -> Result<f64> {
    let value = match &cell {
        Cell::Integer(value) => *value as f64,
        Cell::Float(value) => *value,
        Cell::Text(text) => text.trim().parse().unwrap_or(f64::NAN),
        Cell::Null | Cell::Bool(_) => f64::NAN,
    };

    if !value.is_finite() {
        let value = cell.describe();
        return Err(Error::InvalidValue { column, row, value });
    }
    Ok(value)
}

fn check_columns(mut present: impl FnMut(&str) -> bool) -> Result<()> {
    match REQUIRED.into_iter().find(|column| !present(column)) {
        Some(missing) => Err(Error::MissingColumn(missing)),
        None => Ok(()),
    }
}

pub fn parse_csv(content: &str) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    check_columns(|column| headers.iter().any(|header| header == column))?;

    reader
        .deserialize::<RawRecord>()
        .enumerate()
        .map(|(index, raw)| raw?.validate(Format::Csv, index + 1))
        .collect()
}

pub fn parse_json(content: &str) -> Result<Vec<Record>> {
    let rows = match serde_json::from_str::<Value>(content)? {
        Value::Array(rows) => {
            check_columns(|column| {
                rows.iter()
                    .any(|row| row.as_object().is_some_and(|row| row.contains_key(column)))
            })?;
            rows
        }
        Value::Object(columns) => {
            check_columns(|column| columns.contains_key(column))?;
            transpose(columns)?
        }
        _ => return Err(Error::UnsupportedLayout("top level must be an array or an object")),
    };

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            serde_json::from_value::<RawRecord>(row)?.validate(Format::Json, index + 1)
        })
        .collect()
}

/// Turns `{"column": {"0": a, "1": b}}` or `{"column": [a, b]}` into rows.
fn transpose(columns: Map<String, Value>) -> Result<Vec<Value>> {
    let keys: Vec<String> = match &columns["date"] {
        Value::Object(cells) => {
            let mut keys: Vec<&String> = cells.keys().collect();
            // row labels are usually integers, keep them in numeric order
            keys.sort_by_key(|key| (key.parse::<u64>().unwrap_or(u64::MAX), key.as_str()));
            keys.into_iter().cloned().collect()
        }
        Value::Array(cells) => (0..cells.len()).map(|index| index.to_string()).collect(),
        _ => return Err(Error::UnsupportedLayout("columns must be objects or arrays")),
    };

    let rows = keys
        .iter()
        .enumerate()
        .map(|(position, key)| {
            let row: Map<String, Value> = columns
                .iter()
                .map(|(name, cells)| {
                    let cell = match cells {
                        Value::Object(cells) => cells.get(key),
                        Value::Array(cells) => cells.get(position),
                        _ => None,
                    };
                    (name.clone(), cell.cloned().unwrap_or(Value::Null))
                })
                .collect();
            Value::Object(row)
        })
        .collect();

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn format_follows_extension() {
        assert_eq!(Format::from_path(Path::new("week.csv")), Format::Csv);
        assert_eq!(Format::from_path(Path::new("WEEK.CSV")), Format::Csv);
        assert_eq!(Format::from_path(Path::new("week.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("week")), Format::Json);
    }

    #[test]
    fn dates_with_time_or_epoch() {
        let parse = |text: &str| parse_date(Cell::Text(text.to_string()), Format::Csv).unwrap();
        assert_eq!(parse("2024-01-05"), date!(2024 - 01 - 05));
        assert_eq!(parse("2024-01-05T13:45:00"), date!(2024 - 01 - 05));
        assert_eq!(parse(" 2024-01-05 00:00:00"), date!(2024 - 01 - 05));
        assert_eq!(
            parse_date(Cell::Integer(1_704_412_800_000), Format::Json).unwrap(),
            date!(2024 - 01 - 05)
        );
        assert!(matches!(
            parse_date(Cell::Text(String::from("05/01/2024")), Format::Json),
            Err(Error::InvalidDate(_))
        ));
    }

    #[test]
    fn csv_rows() {
        let records = parse_csv(
            "date,city,t_min,t_max,t_avg,description\n\
             2024-01-05, Paris ,-1.5,4,1.2,\"cold, dry\"\n\
             2024-01-06,,0,6.5,3,\n",
        )
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].city, "Paris");
        assert_eq!(records[0].t_min, -1.5);
        assert_eq!(records[0].t_max, 4.0);
        assert_eq!(records[0].description, "cold, dry");
        assert_eq!(records[1].city, "");
        assert_eq!(records[1].swing(), 6.5);
    }

    #[test]
    fn csv_missing_column() {
        let error = parse_csv("date,t_min,t_avg\n2024-01-05,1,2\n").unwrap_err();
        assert!(matches!(error, Error::MissingColumn("t_max")));

        let error = parse_csv("day,t_min,t_max,t_avg\n").unwrap_err();
        assert!(matches!(error, Error::MissingColumn("date")));
    }

    #[test]
    fn csv_bad_temperature() {
        let error = parse_csv("date,t_min,t_max,t_avg\n2024-01-05,1,warm,2\n").unwrap_err();
        match error {
            Error::InvalidValue { column, row, value } => {
                assert_eq!(column, "t_max");
                assert_eq!(row, 1);
                assert_eq!(value, "warm");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn boolean_and_null_temperatures_name_the_cell() {
        let error = parse_csv("date,t_min,t_max,t_avg\n2024-01-05,1,3,2\n2024-01-06,1,true,2\n")
            .unwrap_err();
        assert!(matches!(
            error,
            Error::InvalidValue { column: "t_max", row: 2, ref value } if value == "true"
        ));

        let error =
            parse_json(r#"[{"date": "2024-01-05", "t_min": 1, "t_max": null, "t_avg": 2}]"#)
                .unwrap_err();
        assert!(matches!(
            error,
            Error::InvalidValue { column: "t_max", row: 1, ref value } if value == "null"
        ));

        let error =
            parse_json(r#"[{"date": null, "t_min": 1, "t_max": 3, "t_avg": 2}]"#).unwrap_err();
        assert!(matches!(error, Error::InvalidDate(ref text) if text == "null"));
    }

    #[test]
    fn epoch_dates_only_in_json() {
        let error = parse_csv("date,t_min,t_max,t_avg\n1704412800000,1,3,2\n").unwrap_err();
        assert!(matches!(error, Error::InvalidDate(ref text) if text == "1704412800000"));
    }

    #[test]
    fn non_text_city_and_description_are_displayed_as_text() {
        let records = parse_json(
            r#"[{"date": "2024-01-05", "city": 7, "t_min": 1, "t_max": 3, "t_avg": 2,
                 "description": 1.5}]"#,
        )
        .unwrap();
        assert_eq!(records[0].city, "7");
        assert_eq!(records[0].description, "1.5");

        let records = parse_csv("date,city,t_min,t_max,t_avg\n2024-01-05,75,1,3,2\n").unwrap();
        assert_eq!(records[0].city, "75");
    }

    #[test]
    fn json_records_and_columns_agree() {
        let records = parse_json(
            r#"[
                {"date": "2024-01-05", "city": "Oslo", "t_min": -8, "t_max": -2.5, "t_avg": -5, "description": "snow"},
                {"date": "2024-01-06", "city": null, "t_min": "-9", "t_max": -3, "t_avg": -6}
            ]"#,
        )
        .unwrap();
        let columns = parse_json(
            r#"{
                "date": {"0": 1704412800000, "1": 1704499200000},
                "city": {"0": "Oslo", "1": null},
                "t_min": {"0": -8, "1": -9},
                "t_max": {"0": -2.5, "1": -3},
                "t_avg": {"0": -5, "1": -6},
                "description": {"0": "snow"}
            }"#,
        )
        .unwrap();

        assert_eq!(records, columns);
        assert_eq!(records[0].date, date!(2024 - 01 - 05));
        assert_eq!(records[1].city, "");
        assert_eq!(records[1].t_min, -9.0);
        assert_eq!(records[1].description, "");
    }

    #[test]
    fn json_columns_as_arrays_in_numeric_order() {
        let records = parse_json(
            r#"{
                "date": ["2024-01-01", "2024-01-02", "2024-01-03"],
                "t_min": [1, 2, 3], "t_max": [4, 5, 6], "t_avg": [2, 3, 4]
            }"#,
        )
        .unwrap();
        assert_eq!(records.iter().map(|r| r.t_avg).collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);

        let cells = |value: &dyn Fn(usize) -> String| {
            (0..12)
                .map(|i| format!("\"{i}\": {}", value(i)))
                .collect::<Vec<_>>()
                .join(",")
        };
        let keyed = format!(
            r#"{{"date": {{{}}}, "t_min": {{{}}}, "t_max": {{{}}}, "t_avg": {{{}}}}}"#,
            cells(&|i| format!("\"2024-01-{:02}\"", i + 1)),
            cells(&|i| i.to_string()),
            cells(&|i| i.to_string()),
            cells(&|i| i.to_string()),
        );
        let records = parse_json(&keyed).unwrap();
        assert_eq!(
            records.iter().map(|r| r.t_avg).collect::<Vec<_>>(),
            (0..12).map(|i| i as f64).collect::<Vec<_>>()
        );
    }

    #[test]
    fn json_layout_errors() {
        assert!(matches!(parse_json("42"), Err(Error::UnsupportedLayout(_))));
        assert!(matches!(
            parse_json(r#"[{"date": "2024-01-01", "t_min": 1, "t_avg": 2}]"#),
            Err(Error::MissingColumn("t_max"))
        ));
        assert!(matches!(parse_json("[1, 2"), Err(Error::Json(_))));
    }

    #[test]
    fn empty_input() {
        assert!(matches!(
            Format::Csv.parse("date,t_min,t_max,t_avg\n"),
            Err(Error::Empty)
        ));
        assert!(matches!(Format::Json.parse("[]"), Err(Error::MissingColumn("date"))));
    }
}
