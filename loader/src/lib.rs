//! Loads nested JSON benchmark results into one uniform table.
//!
//! Result files have the shape `{"results": [record, ...]}`. Every record is tagged with an
//! `id`, flattened into `::`-joined column names (e.g. `config::access_range`) and aligned to
//! the superset of all columns, absent fields become [`Cell::Missing`].

pub mod collector;
pub mod config;
pub mod export;
pub mod flatten;
pub mod ingest;
pub mod loader;
pub mod record;
pub mod schema;
pub mod table;

pub use collector::{Collector, Layout, ResultSource};
pub use config::{ConfigErrors, LoaderConfig};
pub use flatten::{flat_keys, flatten, FlatKey, KEY_SEPARATOR};
pub use ingest::load_file;
pub use loader::{
    load, load_flat_benchmark_directory, load_results_benchmark_directory, tabulate, LoadError,
    Strategy,
};
pub use record::{Field, Record, Scalar};
pub use schema::{Cell, Schema};
pub use table::{Row, Table, TableError};
