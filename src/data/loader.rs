use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use arrow::util::display::array_value_to_string;
use chrono::{Datelike, NaiveDateTime};
use log::{debug, info};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{self, CellValue, City, Dataset, TripRecord};
use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a city's trip data from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one trip per line (the published layout)
/// * `.json`    – `[{ "Start Time": "...", "Start Station": "...", ... }, ...]`
/// * `.parquet` – flat columns; timestamps may be text or Arrow timestamps
pub fn load_file(path: &Path, city: City) -> Result<Dataset> {
    if !path.is_file() {
        bail!(LoadError::MissingFile(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!(LoadError::UnsupportedFormat(other.to_string())),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    debug!(
        "read {} rows x {} columns from {}",
        table.rows.len(),
        table.column_names.len(),
        path.display()
    );

    let dataset = build_dataset(city, table)
        .with_context(|| format!("loading {}", path.display()))?;
    info!("loaded {} trips for {city} from {}", dataset.len(), path.display());
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Raw table → Dataset
// ---------------------------------------------------------------------------

/// Cells as read from a source, before any typing or derivation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub column_names: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

static NULL_CELL: CellValue = CellValue::Null;

/// Type the trip columns and derive month and weekday from Start Time.
pub fn build_dataset(city: City, table: RawTable) -> Result<Dataset, LoadError> {
    let position = |name: &str| table.column_names.iter().position(|c| c == name);
    let required = |name: &'static str| position(name).ok_or(LoadError::MissingColumn(name));

    let start_time_idx = required(model::START_TIME)?;
    let start_station_idx = required(model::START_STATION)?;
    let end_station_idx = required(model::END_STATION)?;
    let user_type_idx = required(model::USER_TYPE)?;
    let end_time_idx = position(model::END_TIME);
    let gender_idx = position(model::GENDER);
    let birth_year_idx = position(model::BIRTH_YEAR);

    let mut records = Vec::with_capacity(table.rows.len());

    for (row_index, cells) in table.rows.into_iter().enumerate() {
        let cell = |idx: usize| cells.get(idx).unwrap_or(&NULL_CELL);
        let text = |idx: Option<usize>| idx.and_then(|i| cell(i).as_text());

        let start_time = timestamp_cell(cell(start_time_idx), row_index, model::START_TIME)?
            .ok_or_else(|| LoadError::BadTimestamp {
                row: row_index,
                column: model::START_TIME,
                value: String::new(),
            })?;
        let end_time = match end_time_idx {
            Some(idx) => timestamp_cell(cell(idx), row_index, model::END_TIME)?,
            None => None,
        };
        let birth_year = match birth_year_idx.map(cell) {
            Some(CellValue::Null) | None => None,
            Some(value) => Some(value.as_f64().ok_or_else(|| LoadError::BadRow {
                row: row_index,
                message: format!("'{value}' is not a valid birth year"),
            })?),
        };

        records.push(TripRecord {
            row_index,
            start_time,
            end_time,
            start_station: text(Some(start_station_idx)),
            end_station: text(Some(end_station_idx)),
            user_type: text(Some(user_type_idx)),
            gender: text(gender_idx),
            birth_year,
            month: start_time.month(),
            weekday: start_time.weekday(),
            hour: None,
            cells,
        });
    }

    Ok(Dataset {
        city,
        column_names: table.column_names,
        records,
    })
}

fn timestamp_cell(
    value: &CellValue,
    row: usize,
    column: &'static str,
) -> Result<Option<NaiveDateTime>, LoadError> {
    let Some(text) = value.as_text() else {
        return Ok(None);
    };
    parse_timestamp(&text)
        .map(Some)
        .ok_or(LoadError::BadTimestamp { row, column, value: text })
}

/// Parse the timestamp layouts found in the published trip files.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%m/%d/%Y %H:%M",
    ];
    let s = s.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Start Time": "2017-01-01 00:07:57", "Start Station": "...", "User Type": "Subscriber" },
///   ...
/// ]
/// ```
///
/// Columns are ordered by first appearance; keys missing from a row are null.
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut table = RawTable::default();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !table.column_names.contains(key) {
                table.column_names.push(key.clone());
            }
        }
    }

    for rec in records {
        // Checked to be objects above.
        let Some(obj) = rec.as_object() else { continue };
        let row = table
            .column_names
            .iter()
            .map(|col| obj.get(col).map_or(CellValue::Null, json_to_cell))
            .collect();
        table.rows.push(row);
    }

    Ok(table)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) if s.is_empty() => CellValue::Null,
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, every other row is one trip.
fn load_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let column_names: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(csv_cell).collect());
    }

    Ok(RawTable { column_names, rows })
}

/// Tokens read as missing values, the same set dataframe CSV readers use.
const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// CSV cells stay as written; numbers are parsed where a field needs one.
fn csv_cell(s: &str) -> CellValue {
    if NA_TOKENS.contains(&s) {
        CellValue::Null
    } else {
        CellValue::String(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per source field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Timestamp columns are rendered to ISO
/// text and parsed like any other timestamp cell.
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let column_names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell_value(col, row))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Row {row}: failed to read cells"))?;
            rows.push(cells);
        }
    }

    Ok(RawTable { column_names, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell_value(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => {
            let s = col
                .as_any()
                .downcast_ref::<StringArray>()
                .context("expected StringArray")?;
            CellValue::String(s.value(row).to_string())
        }
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int32Array>()
                .context("expected Int32Array")?;
            CellValue::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Int64Array>()
                .context("expected Int64Array")?;
            CellValue::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float32Array>()
                .context("expected Float32Array")?;
            CellValue::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col
                .as_any()
                .downcast_ref::<Float64Array>()
                .context("expected Float64Array")?;
            CellValue::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col
                .as_any()
                .downcast_ref::<BooleanArray>()
                .context("expected BooleanArray")?;
            CellValue::Bool(arr.value(row))
        }
        other => {
            let text = array_value_to_string(col.as_ref(), row)
                .with_context(|| format!("formatting {other:?} cell"))?;
            CellValue::String(text)
        }
    };
    Ok(value)
}
