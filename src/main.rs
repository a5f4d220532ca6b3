use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use harga_tools::config::{Config, ConfigFile};
use harga_tools::io::excel_read;
use harga_tools::model::load_model;
use harga_tools::pipeline::Pipeline;
use harga_tools::present::Preview;
use harga_tools::session::Session;
use harga_tools::{Result, ToolError};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging().and_then(|()| run(cli)) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| ToolError::Logging(err.to_string()))
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Preview(args) => execute_preview(args),
        Command::Predict(args) => execute_predict(args),
        Command::InspectModel(args) => execute_inspect(args),
    }
}

fn execute_preview(args: PreviewArgs) -> Result<()> {
    ensure_exists(&args.input)?;
    let table = excel_read::read_table_from_path(&args.input)?;
    println!("{}", Preview::new(&table, args.rows));
    Ok(())
}

fn execute_predict(args: PredictArgs) -> Result<()> {
    let pipeline = Pipeline::new(args.model.resolve()?);
    let preview_rows = pipeline.config().preview_rows;
    let bytes = read_input(&args.input)?;
    let file_name = args
        .input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut session = Session::new();
    session.upload(&pipeline, &file_name, &bytes);
    if let Some(preview) = session.input_preview(preview_rows) {
        println!("1. Input data\n{preview}\n");
    }

    if session.table().is_some() {
        session.trigger(&pipeline)?;
    }

    if let Some(failure) = session.failure() {
        return Err(ToolError::StageFailed(failure.to_string()));
    }

    if let Some(outcome) = session.outcome() {
        println!("2. Prediction result (preview)\n{}\n", outcome.preview);
        let target = args.output_dir.join(&outcome.download.file_name);
        std::fs::write(&target, &outcome.download.bytes)?;
        println!(
            "Saved {} ({}, {} bytes)",
            target.display(),
            outcome.download.mime_type,
            outcome.download.bytes.len()
        );
    }
    Ok(())
}

fn execute_inspect(args: InspectArgs) -> Result<()> {
    let config = args.model.resolve()?;
    let model = load_model(&config.model_path)?;
    println!("name:      {}", model.name);
    println!("target:    {}", model.target.as_deref().unwrap_or("-"));
    println!("estimator: {}", model.estimator.kind());
    println!("features:");
    for feature in &model.features {
        match feature.fill {
            Some(fill) => println!("  {} (fill {fill})", feature.column),
            None => println!("  {}", feature.column),
        }
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    ensure_exists(path)?;
    Ok(std::fs::read(path)?)
}

fn ensure_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(ToolError::MissingInput(path.to_path_buf()));
    }
    Ok(())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Predict land prices for a spreadsheet of property records."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show the first rows of a spreadsheet.
    Preview(PreviewArgs),
    /// Score a spreadsheet and save the result as a download file.
    Predict(PredictArgs),
    /// Print a summary of the configured model artifact.
    InspectModel(InspectArgs),
}

#[derive(clap::Args)]
struct PreviewArgs {
    /// Spreadsheet to read (.xlsx).
    #[arg(long)]
    input: PathBuf,

    /// Number of leading rows to show.
    #[arg(long, default_value_t = harga_tools::present::DEFAULT_PREVIEW_ROWS)]
    rows: usize,
}

#[derive(clap::Args)]
struct ModelArgs {
    /// Model artifact path, with or without the .json extension.
    #[arg(long, env = "HARGA_MODEL_PATH")]
    model: Option<PathBuf>,

    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

impl ModelArgs {
    fn resolve(&self) -> Result<Config> {
        let file = match &self.config {
            Some(path) => Some(ConfigFile::load(path)?),
            None => None,
        };
        Config::resolve(file, self.model.clone())
    }
}

#[derive(clap::Args)]
struct PredictArgs {
    /// Spreadsheet to score (.xlsx).
    #[arg(long)]
    input: PathBuf,

    /// Directory receiving the scored spreadsheet.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    #[command(flatten)]
    model: ModelArgs,
}

#[derive(clap::Args)]
struct InspectArgs {
    #[command(flatten)]
    model: ModelArgs,
}
