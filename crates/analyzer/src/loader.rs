use crate::error::AnalyzerError;
use core_types::TransferRecord;
use csv::{ReaderBuilder, StringRecord};
use std::path::Path;

/// Columns the export must provide. Any other column is ignored.
pub const REQUIRED_COLUMNS: [&str; 4] = ["Time", "Flow", "Value", "TokenAddress"];

/// The rows of an export that could be parsed, plus how many could not.
#[derive(Debug, Default)]
pub struct LoadedTransfers {
    pub records: Vec<TransferRecord>,
    pub skipped_rows: usize,
}

/// Positions of the required columns within the header.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    time: usize,
    flow: usize,
    value: usize,
    token_address: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self, AnalyzerError> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        match (
            position("Time"),
            position("Flow"),
            position("Value"),
            position("TokenAddress"),
        ) {
            (Some(time), Some(flow), Some(value), Some(token_address)) => Ok(Self {
                time,
                flow,
                value,
                token_address,
            }),
            _ => Err(AnalyzerError::MissingColumns(
                REQUIRED_COLUMNS
                    .iter()
                    .filter(|column| position(column).is_none())
                    .map(|column| column.to_string())
                    .collect(),
            )),
        }
    }

    fn parse(&self, row: &StringRecord) -> Option<Result<TransferRecord, core_types::CoreError>> {
        Some(TransferRecord::from_fields(
            row.get(self.time)?,
            row.get(self.flow)?,
            row.get(self.value)?,
            row.get(self.token_address)?,
        ))
    }
}

/// Reads a transfer export.
///
/// The header is validated up front. Data rows that cannot be parsed are counted
/// and skipped so a single malformed line does not sink the whole report.
pub fn load_transfers(path: &Path) -> Result<LoadedTransfers, AnalyzerError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = rdr.headers()?.clone();
    let columns = ColumnIndex::resolve(&headers)?;

    let mut loaded = LoadedTransfers::default();
    for (i, result) in rdr.records().enumerate() {
        // Header is line 1.
        let line = i + 2;
        let row = match result {
            Ok(row) => row,
            Err(e) if matches!(e.kind(), csv::ErrorKind::Utf8 { .. }) => {
                tracing::debug!(line, error = %e, "Skipping row with invalid UTF-8.");
                loaded.skipped_rows += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        match columns.parse(&row) {
            Some(Ok(record)) => loaded.records.push(record),
            Some(Err(e)) => {
                tracing::debug!(line, error = %e, "Skipping malformed row.");
                loaded.skipped_rows += 1;
            }
            None => {
                tracing::debug!(line, "Skipping short row.");
                loaded.skipped_rows += 1;
            }
        }
    }

    Ok(loaded)
}
