//! CSV loading, header normalisation and CSV export

use super::schema::IGNORED_COLUMNS;
use crate::error::{Result, SalaryError};
use polars::prelude::*;
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

/// Cell values read as missing, matching the usual spreadsheet and dataframe
/// spellings
pub const NA_VALUES: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn csv_options() -> CsvReadOptions {
    let null_values = NullValues::AllColumns(NA_VALUES.iter().map(|v| (*v).into()).collect());
    CsvReadOptions::default()
        .with_infer_schema_length(Some(1000))
        .with_has_header(true)
        .map_parse_options(|opts| opts.with_null_values(Some(null_values.clone())))
}

/// Read a CSV file and normalise its headers
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(SalaryError::DataError(format!(
            "file not found: {}",
            path.display()
        )));
    }

    let df = csv_options()
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    debug!(path = %path.display(), rows = df.height(), cols = df.width(), "Loaded CSV");
    normalize_headers(&df)
}

/// Parse CSV bytes (an uploaded file) and normalise its headers
pub fn read_csv_bytes(bytes: &[u8]) -> Result<DataFrame> {
    if bytes.is_empty() {
        return Err(SalaryError::DataError("uploaded file is empty".to_string()));
    }

    let df = csv_options()
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()?;

    normalize_headers(&df)
}

/// Trim and lower-case every column name. Two headers that collapse to the
/// same name are rejected.
pub fn normalize_headers(df: &DataFrame) -> Result<DataFrame> {
    let mut seen = HashSet::new();
    let mut columns = Vec::with_capacity(df.width());

    for col in df.get_columns() {
        let name = col.name().as_str().trim().to_lowercase();
        if !seen.insert(name.clone()) {
            return Err(SalaryError::DataError(format!(
                "duplicate column after header normalisation: '{}'",
                name
            )));
        }
        let mut series = col.as_materialized_series().clone();
        series.rename(name.into());
        columns.push(Column::from(series));
    }

    Ok(DataFrame::new(columns)?)
}

/// Remove identifier columns (`id`, `crucial_code`) when present
pub fn drop_ignored_columns(df: &DataFrame) -> Result<DataFrame> {
    let mut result = df.clone();
    for name in IGNORED_COLUMNS {
        if result.column(name).is_ok() {
            result = result.drop(name)?;
        }
    }
    Ok(result)
}

/// Serialise a frame to CSV bytes with a header row
pub fn to_csv_bytes(df: &DataFrame) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut out = df.clone();
    CsvWriter::new(&mut buf)
        .include_header(true)
        .finish(&mut out)?;
    Ok(buf)
}

/// Write a frame to a CSV file
pub fn write_csv(df: &DataFrame, path: &Path) -> Result<()> {
    let bytes = to_csv_bytes(df)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

/// First `n` rows as a list of JSON objects keyed by column name, keys in
/// column order
pub fn preview_rows(df: &DataFrame, n: usize) -> Vec<serde_json::Map<String, serde_json::Value>> {
    let preview = df.head(Some(n));
    (0..preview.height())
        .map(|row| {
            preview
                .get_columns()
                .iter()
                .map(|col| (col.name().to_string(), any_to_json(col.get(row))))
                .collect()
        })
        .collect()
}

fn any_to_json(value: PolarsResult<AnyValue<'_>>) -> serde_json::Value {
    match value {
        Ok(AnyValue::Float64(v)) => serde_json::json!(v),
        Ok(AnyValue::Float32(v)) => serde_json::json!(v),
        Ok(AnyValue::Int64(v)) => serde_json::json!(v),
        Ok(AnyValue::Int32(v)) => serde_json::json!(v),
        Ok(AnyValue::UInt32(v)) => serde_json::json!(v),
        Ok(AnyValue::String(v)) => serde_json::json!(v),
        Ok(AnyValue::StringOwned(v)) => serde_json::json!(v.as_str()),
        Ok(AnyValue::Boolean(v)) => serde_json::json!(v),
        Ok(AnyValue::Null) => serde_json::Value::Null,
        Ok(other) => serde_json::json!(other.to_string()),
        Err(_) => serde_json::Value::Null,
    }
}
