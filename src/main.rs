use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tenable_io::helpers::ScanRef;
use tenable_io::models::{
    AssetsExportRequest, ExportFormat, VulnsExportRequest, WorkbenchExportOptions,
};
use tenable_io::runtime::RealRuntime;
use tenable_io::{Config, TenableIoClient, logging};

/// tio - Tenable.io command line client
///
/// Credentials and defaults come from TENABLEIO_* environment variables and
/// the [tenable_io] table of the config file
/// (TENABLEIO_CONFIG_FILE, or <config dir>/tenable_io/config.toml).
///
/// Examples:
///   tio scans                     # List all scans
///   tio scan launch 42            # Launch scan 42 and wait until it runs
///   tio scan download 42 r.pdf --format pdf
#[derive(Parser, Debug)]
#[command(author, version = env!("TIO_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// API endpoint (overrides TENABLEIO_ENDPOINT and the config file)
    #[arg(long, value_name = "URL", global = true)]
    pub endpoint: Option<String>,

    /// Log level (overrides TENABLEIO_LOGGING_LEVEL)
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// List scans
    Scans(ScansArgs),

    /// Act on one scan
    Scan {
        #[command(subcommand)]
        action: ScanAction,
    },

    /// Bulk export vulnerabilities or assets
    Export {
        #[command(subcommand)]
        kind: ExportCommand,
    },

    /// Download a workbench vulnerabilities report
    Workbench(WorkbenchArgs),
}

#[derive(clap::Args, Debug)]
pub struct ScansArgs {
    /// Only list scans of this folder
    #[arg(long, value_name = "FOLDER_ID")]
    pub folder: Option<u64>,
}

#[derive(clap::Args, Debug)]
pub struct WaitArgs {
    /// Return right after sending the request
    #[arg(long)]
    pub no_wait: bool,
}

#[derive(clap::Subcommand, Debug)]
enum ScanAction {
    /// Print the scan status
    Status {
        id: u64,
        #[arg(long, value_name = "HISTORY_ID")]
        history: Option<u64>,
    },

    /// Launch the scan
    Launch {
        id: u64,
        #[command(flatten)]
        wait: WaitArgs,
        /// Scan these targets instead of the configured ones
        #[arg(long = "alt-target", value_name = "TARGET")]
        alt_targets: Vec<String>,
    },

    /// Pause a running scan
    Pause {
        id: u64,
        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Resume a paused scan
    Resume {
        id: u64,
        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Stop the scan
    Stop {
        id: u64,
        #[command(flatten)]
        wait: WaitArgs,
    },

    /// Wait until the scan stops
    Wait {
        id: u64,
        /// Stop the scan if it is still active after this many seconds
        #[arg(long, value_name = "SECONDS")]
        timeout: Option<u64>,
    },

    /// Export a report and download it
    Download {
        id: u64,
        path: PathBuf,
        #[arg(long, default_value = "nessus")]
        format: ExportFormat,
        #[arg(long, value_name = "HISTORY_ID")]
        history: Option<u64>,
    },

    /// Delete the scan
    Delete {
        id: u64,
        /// Stop the scan first if it is still active
        #[arg(long)]
        force: bool,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ExportCommand {
    /// Export vulnerabilities, one file per chunk
    Vulns {
        /// Destination; `{chunk_id}` is replaced by the chunk id
        path: String,
    },

    /// Export assets, one file per chunk
    Assets {
        /// Destination; `{chunk_id}` is replaced by the chunk id
        path: String,
    },
}

#[derive(clap::Args, Debug)]
pub struct WorkbenchArgs {
    pub path: PathBuf,
    #[arg(long, default_value = "nessus")]
    pub format: ExportFormat,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(&RealRuntime).context("failed to load configuration")?;
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(level) = &cli.log_level {
        config.logging_level = level.clone();
    }
    logging::init(&config.log_settings()?)?;

    let client = TenableIoClient::from_config(&config)?;
    run(&client, cli.command)
}

fn run(client: &TenableIoClient, command: Commands) -> Result<()> {
    match command {
        Commands::Scans(args) => {
            for scan in client.scans_api().list(args.folder)?.into_scans() {
                let status = scan.status.map(|s| s.to_string()).unwrap_or_default();
                println!("{}\t{}\t{}", scan.id, status, scan.name);
            }
        }
        Commands::Scan { action } => run_scan(client, action)?,
        Commands::Export { kind } => {
            let helper = client.exports_helper();
            let chunks = match kind {
                ExportCommand::Vulns { path } => {
                    helper.download_vulns_to(&VulnsExportRequest::default(), &path)?
                }
                ExportCommand::Assets { path } => {
                    helper.download_assets_to(&AssetsExportRequest::default(), &path)?
                }
            };
            println!("{} chunk(s) written", chunks.len());
        }
        Commands::Workbench(args) => {
            let options = WorkbenchExportOptions::default().with_format(args.format);
            let bytes = client.workbench_helper().download(&args.path, &options)?;
            println!("{} bytes written to {}", bytes, args.path.display());
        }
    }
    Ok(())
}

fn run_scan(client: &TenableIoClient, action: ScanAction) -> Result<()> {
    let scan = |id: u64| -> ScanRef { client.scan_helper().id(id) };

    match action {
        ScanAction::Status { id, history } => {
            println!("{}", scan(id).status(history)?);
        }
        ScanAction::Launch {
            id,
            wait,
            alt_targets,
        } => {
            let alt_targets = (!alt_targets.is_empty()).then_some(alt_targets);
            let run_uuid = scan(id).launch(!wait.no_wait, alt_targets)?;
            println!("{}", run_uuid);
        }
        ScanAction::Pause { id, wait } => scan(id).pause(!wait.no_wait)?,
        ScanAction::Resume { id, wait } => scan(id).resume(!wait.no_wait)?,
        ScanAction::Stop { id, wait } => scan(id).stop(!wait.no_wait)?,
        ScanAction::Wait { id, timeout } => {
            let scan = scan(id);
            match timeout {
                Some(seconds) => println!("{}", scan.wait_or_cancel_after(seconds)?),
                None => {
                    scan.wait_until_stopped(None)?;
                    println!("{}", scan.status(None)?);
                }
            }
        }
        ScanAction::Download {
            id,
            path,
            format,
            history,
        } => {
            let bytes = scan(id).download(&path, history, format)?;
            println!("{} bytes written to {}", bytes, path.display());
        }
        ScanAction::Delete { id, force } => scan(id).delete(force)?,
    }
    Ok(())
}
