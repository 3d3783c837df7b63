use crate::error::{Error, Result};
use crate::types::RawMovieRecord;
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
}

/// Load the whole dataset into memory. `.json` files must hold an array of
/// movie objects; `.csv` files must use the same column names.
pub fn load_movies(path: &Path) -> Result<(Vec<RawMovieRecord>, LoadReport)> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let file = std::fs::File::open(path)?;
    let (records, report) = match ext.as_str() {
        "json" => parse_json(file)?,
        "csv" => parse_csv(file)?,
        other => return Err(Error::UnsupportedFormat(format!("'{}' ({})", other, path.display()))),
    };
    info!(
        "Loaded {} of {} rows from {}",
        report.loaded_rows,
        report.total_rows,
        path.display()
    );
    Ok((records, report))
}

pub fn parse_json<R: Read>(reader: R) -> Result<(Vec<RawMovieRecord>, LoadReport)> {
    let values: Vec<serde_json::Value> = serde_json::from_reader(reader)?;
    let total_rows = values.len();
    let mut parse_errors = 0usize;
    let mut records = Vec::with_capacity(total_rows);
    for (idx, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<RawMovieRecord>(value) {
            Ok(r) => records.push(r),
            Err(e) => {
                debug!("Row {} skipped: {}", idx, e);
                parse_errors += 1;
            }
        }
    }
    if parse_errors > 0 {
        warn!("{} rows could not be read as movie records", parse_errors);
    }
    let loaded_rows = records.len();
    Ok((records, LoadReport { total_rows, loaded_rows, parse_errors }))
}

pub fn parse_csv<R: Read>(reader: R) -> Result<(Vec<RawMovieRecord>, LoadReport)> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut total_rows = 0usize;
    let mut parse_errors = 0usize;
    let mut records = Vec::new();

    for result in rdr.deserialize::<RawMovieRecord>() {
        total_rows += 1;
        match result {
            Ok(r) => records.push(r),
            Err(e) => {
                debug!("Row {} skipped: {}", total_rows, e);
                parse_errors += 1;
            }
        }
    }
    if parse_errors > 0 {
        warn!("{} rows could not be read as movie records", parse_errors);
    }
    let loaded_rows = records.len();
    Ok((records, LoadReport { total_rows, loaded_rows, parse_errors }))
}
