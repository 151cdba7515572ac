use crate::{
    collector::{Collector, CollectorError, Layout},
    config::LoaderConfig,
    ingest::{self, IngestorError},
    record::Record,
    schema::{Schema, SchemaError},
    table::Table,
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to collect result files")]
    Collect(#[from] CollectorError),
    #[error("Failed to ingest result file")]
    Ingest(#[from] IngestorError),
    #[error("No result records found below {0:?}")]
    NoRecords(PathBuf),
    #[error("No records to tabulate")]
    Empty,
    #[error("Record {record} does not match the seed schema")]
    SchemaMismatch {
        record: usize,
        #[source]
        source: SchemaError,
    },
}

/// How divergent key sets across records are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// every record must have the seed record's exact key set
    Flat,
    /// the key sets of all records are unioned, absent fields become `Cell::Missing`
    Reconciling,
}

/// Build a table from already loaded records.
pub fn tabulate(records: &[Record], strategy: Strategy) -> Result<Table, LoadError> {
    let seed = records.first().ok_or(LoadError::Empty)?;
    let mut schema = Schema::seed(seed);

    match strategy {
        Strategy::Flat => {
            for (index, record) in records.iter().enumerate() {
                schema
                    .fill(record)
                    .map_err(|source| LoadError::SchemaMismatch {
                        record: index,
                        source,
                    })?;
            }
        }
        Strategy::Reconciling => {
            let added: usize = records.iter().map(|record| schema.union(record)).sum();
            debug!(
                seed = schema.keys().len() - added,
                added, "Reconciled schema"
            );

            for record in records {
                schema.fill_missing_values(record);
            }
        }
    }

    Ok(schema.into_table())
}

/// Collect, read and tabulate every result file below `root`.
#[tracing::instrument(level = "info", skip(config))]
pub fn load(
    root: &Path,
    layout: Layout,
    strategy: Strategy,
    config: &LoaderConfig,
) -> Result<Table, LoadError> {
    let mut records = Vec::new();
    // (file, number of records) in processing order, used for error reporting
    let mut batches = Vec::new();

    for source in Collector::load(layout, root, config)? {
        let batch = ingest::load_file(&source.path, &source.id)?;

        debug!(id = %source.id, path = ?source.path, records = batch.len(), "Loaded batch");
        batches.push((source.path, batch.len()));
        records.extend(batch);
    }

    if records.is_empty() {
        error!(root = ?root, "No result records found, unable to derive a schema");

        return Err(LoadError::NoRecords(root.to_path_buf()));
    }

    let table = tabulate(&records, strategy).map_err(|e| {
        if let LoadError::SchemaMismatch { record, source } = &e {
            error!(
                path = ?origin(&batches, *record),
                record,
                "Batch is not homogeneous: {source}"
            );
        }

        e
    })?;

    info!(
        files = batches.len(),
        rows = table.len(),
        columns = table.columns().len(),
        "Loaded results"
    );

    Ok(table)
}

/// Flat layout with the homogeneous fast path, for directories of `<id>.json` files
pub fn load_flat_benchmark_directory(
    root: &Path,
    config: &LoaderConfig,
) -> Result<Table, LoadError> {
    load(root, Layout::Flat, Strategy::Flat, config)
}

/// Per-node layout with schema reconciliation, for `<node>/<batch>.json` directories
pub fn load_results_benchmark_directory(
    root: &Path,
    config: &LoaderConfig,
) -> Result<Table, LoadError> {
    load(root, Layout::Results, Strategy::Reconciling, config)
}

fn origin(batches: &[(PathBuf, usize)], record: usize) -> Option<&Path> {
    let mut end = 0;

    batches.iter().find_map(|(path, count)| {
        end += count;
        (record < end).then_some(path.as_path())
    })
}
