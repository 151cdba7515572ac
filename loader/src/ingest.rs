use crate::record::{Field, Record, RecordError, Scalar};
use serde::Deserialize;
use serde_json::Value;
use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{debug, error};

pub const ID_KEY: &str = "id";

#[derive(Debug, Error)]
pub enum IngestorError {
    #[error("Failed to open result file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse result file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Result {index} in {path:?} is not a record")]
    InvalidRecord {
        path: PathBuf,
        index: usize,
        #[source]
        source: RecordError,
    },
}

/// on-disk shape of a result batch, other top level keys are ignored
#[derive(Debug, Deserialize)]
struct ResultFile {
    results: Vec<Value>,
}

/// Read every record of one result file, tagging each with `id`.
/// The file is read completely and closed before returning.
#[tracing::instrument(level = "debug")]
pub fn load_file(path: &Path, id: &str) -> Result<Vec<Record>, IngestorError> {
    let file = File::open(path).map_err(|source| IngestorError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let batch: ResultFile = match serde_json::from_reader(BufReader::new(file)) {
        Ok(batch) => batch,
        Err(source) => {
            error!(error = %source, "Failed to deserialize result file");

            return Err(IngestorError::Parse {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    debug!(records = batch.results.len(), "Read result file");

    batch
        .results
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let mut record =
                Record::try_from(value).map_err(|source| IngestorError::InvalidRecord {
                    path: path.to_path_buf(),
                    index,
                    source,
                })?;

            if record
                .prepend(ID_KEY, Field::Leaf(Scalar::String(id.to_owned())))
                .is_some()
            {
                debug!(index, "Replaced existing id field");
            }

            Ok(record)
        })
        .collect()
}
