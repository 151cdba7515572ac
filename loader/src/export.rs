use crate::{record::Scalar, schema::Cell, table::Table};
use serde_json::{Map, Value};
use std::io::Write;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write CSV")]
    Csv(#[from] csv::Error),
    #[error("Failed to serialize row")]
    Json(#[from] serde_json::Error),
    #[error("Failed to write output")]
    Io(#[from] std::io::Error),
}

/// Write the table as CSV with a header row.
/// Strings are written raw, other scalars as JSON text, `Missing` as `missing_marker`.
///
/// The output is lossy: `"5"` and `5` both become `5`, and a string equal to
/// `missing_marker` reads back as missing. Use [`write_json_lines`] to keep types.
pub fn write_csv<W: Write>(
    table: &Table,
    writer: W,
    missing_marker: &str,
) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(writer);
    let mut marker_collisions = 0usize;

    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|(_, cell)| match cell {
            Cell::Missing => missing_marker.to_owned(),
            Cell::Value(Scalar::String(value)) => {
                if value == missing_marker {
                    marker_collisions += 1;
                }
                value.clone()
            }
            Cell::Value(scalar) => scalar.to_string(),
        }))?;
    }
    writer.flush()?;

    if marker_collisions > 0 {
        warn!(
            cells = marker_collisions,
            marker = missing_marker,
            "String cells equal the missing marker and cannot be told apart from missing cells"
        );
    }
    debug!(rows = table.len(), "Wrote CSV");

    Ok(())
}

/// Write one JSON object per row, absent fields are left out of the object
pub fn write_json_lines<W: Write>(table: &Table, mut writer: W) -> Result<(), ExportError> {
    for row in table.rows() {
        let object: Map<String, Value> = row
            .iter()
            .filter_map(|(name, cell)| {
                cell.as_scalar()
                    .map(|scalar| (name.to_owned(), scalar.to_json()))
            })
            .collect();

        serde_json::to_writer(&mut writer, &object)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    debug!(rows = table.len(), "Wrote JSON lines");

    Ok(())
}

