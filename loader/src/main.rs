use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use membench_loader::{
    export::{self, ExportError},
    load, ConfigErrors, Layout, LoadError, LoaderConfig, Scalar, Strategy, Table, TableError,
};
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::PathBuf,
    process::ExitCode,
};
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigErrors),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Table(#[from] TableError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("Failed to create output file")]
    Output(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Flatten JSON benchmark results into one table")]
struct Cli {
    /// YAML loader config
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Raise the log level, RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load `<DIR>/<node>/*.json`, tagging rows with the node directory name
    Results(LoadArgs),
    /// Load `<DIR>/*.json`, tagging rows with the file name
    Flat {
        #[command(flatten)]
        args: LoadArgs,

        /// Reconcile differing key sets instead of requiring homogeneous files
        #[arg(long)]
        reconcile: bool,
    },
}

#[derive(Args, Debug)]
struct LoadArgs {
    directory: PathBuf,

    #[arg(short, long, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Comma separated columns to keep, in output order
    #[arg(long, value_delimiter = ',')]
    columns: Vec<String>,

    /// Keep rows where COLUMN equals VALUE, VALUE is parsed as JSON and falls back to a string
    #[arg(long = "filter", value_name = "COLUMN=VALUE", value_parser = parse_filter)]
    filters: Vec<(String, Scalar)>,

    /// Sort directory entries by name
    #[arg(long)]
    sort: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Csv,
    Jsonl,
}

fn parse_filter(input: &str) -> Result<(String, Scalar), String> {
    match input.split_once('=') {
        Some((column, value)) if !column.is_empty() => {
            Ok((column.to_owned(), Scalar::parse(value)))
        }
        _ => Err(format!("expected COLUMN=VALUE, found '{input}'")),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = LoaderConfig::load(cli.config.as_deref())?;

    let (args, layout, strategy) = match cli.command {
        Command::Results(args) => (args, Layout::Results, Strategy::Reconciling),
        Command::Flat { args, reconcile } => (
            args,
            Layout::Flat,
            if reconcile {
                Strategy::Reconciling
            } else {
                Strategy::Flat
            },
        ),
    };
    config.sort |= args.sort;

    let mut table: Table = load(&args.directory, layout, strategy, &config)?;

    for (column, value) in &args.filters {
        if !table.has_column(column) {
            warn!("Filter column '{column}' does not exist, no rows will match");
        }
        table = table.filter_eq(column, value);
    }
    if !args.columns.is_empty() {
        table = table.select(args.columns.as_slice())?;
    }

    info!(rows = table.len(), "Writing table");

    let writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    match args.format {
        Format::Csv => export::write_csv(&table, writer, &config.missing_marker)?,
        Format::Jsonl => export::write_json_lines(&table, writer)?,
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let mut source = std::error::Error::source(&e);
            error!("{e}");
            while let Some(cause) = source {
                error!("caused by: {cause}");
                source = cause.source();
            }

            ExitCode::FAILURE
        }
    }
}
