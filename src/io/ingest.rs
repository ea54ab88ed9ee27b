//! CSV ingest for raw sweep results.
//!
//! This module turns the simulation output table into `Observation`s.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Fail fast** on malformed rows: a bad row aborts the run with its line number
//! - **Separation of concerns**: no grouping or fitting logic here
//!
//! Extra columns are allowed and ignored.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::debug;

use crate::domain::{GroupKey, Observation, OrdF64};
use crate::error::AppError;

/// Columns every results table must provide.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "nucleipref",
    "model",
    "nvertices",
    "avgdegree",
    "seed",
    "c",
    "r",
    "s",
];

/// The loaded results table.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub rows: Vec<Observation>,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Load a results CSV from disk.
pub fn load_results(path: &Path) -> Result<RawTable, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to open results table '{}': {e}", path.display()),
        )
    })?;
    let table = read_results(file)
        .map_err(|e| AppError::new(e.exit_code(), format!("{}: {e}", path.display())))?;
    debug!(rows = table.len(), path = %path.display(), "loaded results table");
    Ok(table)
}

/// Parse a results CSV from any reader.
pub fn read_results<R: Read>(reader: R) -> Result<RawTable, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // +2: records() starts after the header line and lines are 1-based.
        let line = idx + 2;
        let record =
            result.map_err(|e| AppError::new(2, format!("line {line}: CSV parse error: {e}")))?;
        let row = parse_row(&record, &header_map)
            .map_err(|e| AppError::new(2, format!("line {line}: {e}")))?;
        rows.push(row);
    }

    Ok(RawTable { rows })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| !header_map.contains_key(*name))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(AppError::new(
        2,
        format!("Missing required column(s): {}", missing.join(", ")),
    ))
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<Observation, String> {
    let key = GroupKey {
        nucleipref: get_required(record, header_map, "nucleipref")?.to_string(),
        model: get_required(record, header_map, "model")?.to_string(),
        nvertices: parse_int(get_required(record, header_map, "nvertices")?, "nvertices")?,
        avgdegree: OrdF64::new(parse_f64(get_required(record, header_map, "avgdegree")?, "avgdegree")?),
        seed: parse_int(get_required(record, header_map, "seed")?, "seed")?,
    };

    Ok(Observation {
        key,
        c: parse_f64(get_required(record, header_map, "c")?, "c")?,
        r: parse_f64(get_required(record, header_map, "r")?, "r")?,
        s: parse_f64(get_required(record, header_map, "s")?, "s")?,
    })
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn parse_f64(s: &str, name: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .map_err(|_| format!("Invalid number for `{name}`: '{s}'"))
}

/// Integers may arrive as `100` or, from float-typed exports, as `100.0`.
fn parse_int(s: &str, name: &str) -> Result<i64, String> {
    if let Ok(v) = s.parse::<i64>() {
        return Ok(v);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(v as i64),
        _ => Err(format!("Invalid integer for `{name}`: '{s}'")),
    }
}
