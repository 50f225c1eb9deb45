//! Raw provider payload -> `QuoteTable`.
//!
//! The provider returns a JSON object keyed by a series label whose value maps
//! `YYYY-MM-DD` dates to records of text-typed OHLCV fields, newest first:
//!
//! ```text
//! { "Time Series (Daily)": { "2024-01-02": { "1. open": "101.0", ... }, ... } }
//! ```
//!
//! Normalization is all-or-nothing: any unparseable date or value fails the
//! whole load and no partial table is returned.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::{QuoteRow, QuoteTable};
use crate::error::PipelineError;

/// Top-level key of the daily series in provider responses.
pub const DAILY_SERIES_KEY: &str = "Time Series (Daily)";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Convert a raw payload into a validated, ascending `QuoteTable`.
pub fn normalize(payload: Value, series_key: &str) -> Result<QuoteTable, PipelineError> {
    let series = match payload.get(series_key) {
        Some(Value::Object(series)) => series,
        _ => {
            let err = PipelineError::DataUnavailable {
                series_key: series_key.to_string(),
                payload,
            };
            warn!(series_key, note = err.provider_note().unwrap_or("-"), "series missing from provider response");
            return Err(err);
        }
    };

    let mut rows = Vec::with_capacity(series.len());
    for (raw_date, record) in series {
        rows.push(parse_row(raw_date, record)?);
    }

    // Never trust provider order (it is newest-first in practice).
    rows.sort_by_key(|r| r.date);

    if let Some(pair) = rows.windows(2).find(|pair| pair[0].date == pair[1].date) {
        let date = pair[1].date.to_string();
        return Err(PipelineError::malformed(date.clone(), "date", format!("duplicate {date}")));
    }

    debug!(rows = rows.len(), "normalized daily series");
    Ok(QuoteTable::new(rows))
}

fn parse_row(raw_date: &str, record: &Value) -> Result<QuoteRow, PipelineError> {
    let date = NaiveDate::parse_from_str(raw_date.trim(), DATE_FORMAT)
        .map_err(|_| PipelineError::malformed(raw_date, "date", raw_date))?;

    let Value::Object(fields) = record else {
        return Err(PipelineError::malformed(raw_date, "record", record.to_string()));
    };

    Ok(QuoteRow::new(
        date,
        numeric_field(raw_date, fields, "open")?,
        numeric_field(raw_date, fields, "high")?,
        numeric_field(raw_date, fields, "low")?,
        numeric_field(raw_date, fields, "close")?,
        numeric_field(raw_date, fields, "volume")?,
    ))
}

/// Look up `name` among the record's fields and coerce it to a finite number.
///
/// Provider field names carry an ordinal prefix (`"4. close"`); bare names are
/// accepted as well.
fn numeric_field(raw_date: &str, fields: &Map<String, Value>, name: &str) -> Result<f64, PipelineError> {
    let value = fields
        .iter()
        .find(|(key, _)| strip_ordinal(key) == name)
        .map(|(_, v)| v)
        .ok_or_else(|| PipelineError::malformed(raw_date, name, "<missing>"))?;

    let parsed = match value {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(PipelineError::malformed(raw_date, name, display_value(value))),
    }
}

fn strip_ordinal(key: &str) -> &str {
    match key.split_once(". ") {
        Some((ordinal, rest)) if !ordinal.is_empty() && ordinal.chars().all(|c| c.is_ascii_digit()) => rest,
        _ => key,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(close: &str) -> Value {
        json!({
            "1. open": "100.0",
            "2. high": "105.5",
            "3. low": "99.25",
            "4. close": close,
            "5. volume": "12345"
        })
    }

    #[test]
    fn rows_are_sorted_ascending_by_date() {
        let payload = json!({
            "Meta Data": { "2. Symbol": "IBM" },
            "Time Series (Daily)": {
                "2024-01-02": record("102.0"),
                "2024-01-01": record("101.0"),
            }
        });

        let table = normalize(payload, DAILY_SERIES_KEY).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(table.rows[1].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(table.rows[0].close, 101.0);
        assert_eq!(table.rows[1].close, 102.0);
        assert_eq!(table.rows[0].high, 105.5);
        assert_eq!(table.rows[0].volume, 12345.0);
        assert!(table.rows.iter().all(|r| r.ma_short.is_none() && r.ma_long.is_none()));
    }

    #[test]
    fn many_rows_come_out_strictly_ascending() {
        let mut series = Map::new();
        for day in (1..=28).rev() {
            series.insert(format!("2024-02-{day:02}"), record(&format!("{day}.5")));
        }
        let payload = json!({ "Time Series (Daily)": Value::Object(series) });

        let table = normalize(payload, DAILY_SERIES_KEY).unwrap();
        assert_eq!(table.len(), 28);
        assert!(table.rows.windows(2).all(|w| w[0].date < w[1].date));
        assert!(table.rows.iter().all(|r| r.close.is_finite() && r.volume.is_finite()));
    }

    #[test]
    fn missing_series_key_is_data_unavailable() {
        let payload = json!({ "Note": "rate limit" });
        let err = normalize(payload.clone(), DAILY_SERIES_KEY).unwrap_err();
        match err {
            PipelineError::DataUnavailable { series_key, payload: carried } => {
                assert_eq!(series_key, DAILY_SERIES_KEY);
                assert_eq!(carried, payload);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_object_series_is_data_unavailable() {
        let payload = json!({ "Time Series (Daily)": "nope" });
        let err = normalize(payload, DAILY_SERIES_KEY).unwrap_err();
        assert!(matches!(err, PipelineError::DataUnavailable { .. }));
    }

    #[test]
    fn unparseable_value_names_date_and_field() {
        let payload = json!({
            "Time Series (Daily)": {
                "2024-01-01": record("101.0"),
                "2024-01-02": record("n/a"),
            }
        });
        let err = normalize(payload, DAILY_SERIES_KEY).unwrap_err();
        match err {
            PipelineError::MalformedRecord { date, field, value } => {
                assert_eq!(date, "2024-01-02");
                assert_eq!(field, "close");
                assert_eq!(value, "n/a");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let payload = json!({ "Time Series (Daily)": { "2024-01-01": record("NaN") } });
        let err = normalize(payload, DAILY_SERIES_KEY).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedRecord { ref field, .. } if field == "close"));
    }

    #[test]
    fn bad_date_and_missing_field_are_malformed() {
        let payload = json!({ "Time Series (Daily)": { "01/02/2024": record("1.0") } });
        let err = normalize(payload, DAILY_SERIES_KEY).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedRecord { ref field, .. } if field == "date"));

        let payload = json!({
            "Time Series (Daily)": { "2024-01-01": { "1. open": "1", "2. high": "1", "3. low": "1", "4. close": "1" } }
        });
        let err = normalize(payload, DAILY_SERIES_KEY).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedRecord { ref field, .. } if field == "volume"));
    }

    #[test]
    fn bare_field_names_and_numbers_are_accepted() {
        let payload = json!({
            "Time Series (Daily)": {
                "2024-03-01": { "open": 1, "high": 2.5, "low": 0.5, "close": "2", "volume": 10 }
            }
        });
        let table = normalize(payload, DAILY_SERIES_KEY).unwrap();
        assert_eq!(table.rows[0].high, 2.5);
        assert_eq!(table.rows[0].volume, 10.0);
    }

    #[test]
    fn empty_series_yields_empty_table() {
        let payload = json!({ "Time Series (Daily)": {} });
        let table = normalize(payload, DAILY_SERIES_KEY).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn strip_ordinal_only_removes_numeric_prefix() {
        assert_eq!(strip_ordinal("4. close"), "close");
        assert_eq!(strip_ordinal("close"), "close");
        assert_eq!(strip_ordinal("a. close"), "a. close");
    }
}
