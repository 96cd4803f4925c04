use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use scour::config::ServerConfig;
use scour::frame::io::{self, ExportFormat};
use scour::frame::transforms::{self, DedupeMode, DedupeOutcome};
use scour::frame::{Dataset, stats};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "scour", about = "Upload, inspect and clean tabular data over HTTP")]
pub struct Cli {
    /// Path to a JSON config file
    #[arg(long, global = true, env = "SCOUR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable rolling log files (stdout only)
    #[arg(long, global = true)]
    pub no_log_file: bool,

    /// Directory for log files
    #[arg(long, global = true, env = "SCOUR_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP service (the default)
    Serve(ServeArgs),
    /// Print row, column, missing and duplicate counts for a file
    Stats {
        /// CSV or XLSX file to inspect
        file: PathBuf,
    },
    /// Clean a file and save the result
    Clean {
        /// CSV or XLSX file to clean
        file: PathBuf,

        /// Output path; `.xlsx` writes a workbook, anything else CSV.
        /// Defaults to `cleaned_data.csv` next to the input.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Drop duplicate rows
        #[arg(long)]
        dedupe: bool,

        /// Columns that define a duplicate (comma separated, default all)
        #[arg(long, value_delimiter = ',', requires = "dedupe")]
        subset: Vec<String>,

        /// Value written into missing cells
        #[arg(long)]
        fill: Option<String>,

        /// Restrict filling to one column
        #[arg(long, requires = "fill")]
        column: Option<String>,
    },
}

#[derive(Args, Default)]
pub struct ServeArgs {
    /// Interface to bind
    #[arg(long, env = "SCOUR_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SCOUR_PORT")]
    pub port: Option<u16>,

    /// Directory where uploads are kept
    #[arg(long, env = "SCOUR_UPLOAD_DIR")]
    pub upload_dir: Option<PathBuf>,

    /// Directory holding `index.html` and static assets
    #[arg(long, env = "SCOUR_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied.
    pub fn resolve_config(&self) -> Result<ServerConfig> {
        let mut config = ServerConfig::load_or_default(self.config.as_deref())?;

        if self.no_log_file {
            config.log_to_file = false;
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = Some(dir.clone());
        }
        if let Some(Commands::Serve(args)) = &self.command {
            apply_serve_args(&mut config, args);
        }
        Ok(config)
    }
}

fn apply_serve_args(config: &mut ServerConfig, args: &ServeArgs) {
    if let Some(host) = &args.host {
        config.host.clone_from(host);
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(dir) = &args.upload_dir {
        config.upload_dir.clone_from(dir);
    }
    if let Some(dir) = &args.static_dir {
        config.static_dir.clone_from(dir);
    }
}

pub async fn run_command(command: Option<Commands>, config: ServerConfig) -> Result<()> {
    match command {
        None | Some(Commands::Serve(_)) => scour::server::serve(config).await,
        Some(Commands::Stats { file }) => handle_stats(&file),
        Some(Commands::Clean {
            file,
            output,
            dedupe,
            subset,
            fill,
            column,
        }) => handle_clean(&file, output, dedupe, &subset, fill.as_deref(), column.as_deref()),
    }
}

fn load_file(path: &Path) -> Result<Dataset> {
    let filename = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", path.display()))?
        .to_string_lossy()
        .to_string();
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(io::parse_upload(&filename, bytes)?)
}

fn handle_stats(file: &Path) -> Result<()> {
    let dataset = load_file(file)?;
    let stats = stats::compute(&dataset)?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn handle_clean(
    file: &Path,
    output: Option<PathBuf>,
    dedupe: bool,
    subset: &[String],
    fill: Option<&str>,
    column: Option<&str>,
) -> Result<()> {
    let mut dataset = load_file(file)?;
    let before = stats::compute(&dataset)?;

    if dedupe {
        let subset = (!subset.is_empty()).then_some(subset);
        if let DedupeOutcome::Deduplicated(deduped) =
            transforms::dedupe(&dataset, subset, DedupeMode::Apply)?
        {
            dataset = deduped;
        }
    }
    if let Some(value) = fill {
        dataset = transforms::fill_missing(&dataset, value, column)?;
    }

    let output = output.unwrap_or_else(|| {
        file.with_file_name(ExportFormat::Csv.file_name())
    });
    let is_xlsx = output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));
    let bytes = if is_xlsx {
        io::to_xlsx_bytes(&dataset)?
    } else {
        io::to_csv_bytes(&dataset)?
    };
    std::fs::write(&output, bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    let after = stats::compute(&dataset)?;
    tracing::info!(
        "Cleaned {}: {} -> {} rows, {} -> {} missing",
        file.display(),
        before.rows,
        after.rows,
        before.missing_values,
        after.missing_values
    );
    println!("Saved cleaned data to {}", output.display());
    Ok(())
}
