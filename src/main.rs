use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use actions_deps::config::Config;
use actions_deps::file_types::collect_manifests;
use actions_deps::parsers::ManifestFile;
use actions_deps::parsers::github_actions::WorkflowParser;
use actions_deps::registries::github::GitHubClient;
use actions_deps::registries::http_client::create_client_with_timeout;
use actions_deps::registries::{OfflineClient, RepositoryClient};
use actions_deps::reports::{
    ScanReport, generate_json_report, generate_markdown_report, generate_summary,
};

#[derive(Parser)]
#[command(name = "actions-deps")]
#[command(about = "Extract GitHub Actions dependencies from workflow manifests", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Summary,
    Json,
    Markdown,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan workflow files and composite actions for action dependencies
    Scan {
        /// Files or directories to scan (directories are searched for manifests)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Hostname of the source-control instance the files came from
        #[arg(long)]
        hostname: Option<String>,

        /// Path to a TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "summary")]
        output: OutputFormat,

        /// Do not contact the source-control host
        #[arg(long)]
        offline: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Scan {
            paths,
            hostname,
            config,
            output,
            offline,
        } => run_scan(paths, hostname, config, output, offline).await,
    }
}

async fn run_scan(
    paths: Vec<PathBuf>,
    hostname: Option<String>,
    config_path: Option<PathBuf>,
    output: OutputFormat,
    offline: bool,
) -> ExitCode {
    let mut config = match config_path {
        Some(path) => match Config::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading configuration: {e:#}");
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };
    if let Some(hostname) = hostname {
        config.source.hostname = hostname;
    }

    let files = match collect_manifests(&paths) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error reading manifests: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    if offline {
        return scan(files, OfflineClient, &config, output).await;
    }

    let http_client = match create_client_with_timeout(config.http.timeout()) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error creating HTTP client: {e}");
            return ExitCode::FAILURE;
        }
    };
    let client = GitHubClient::with_client(http_client, config.source.clone());
    scan(files, client, &config, output).await
}

async fn scan<C: RepositoryClient>(
    files: Vec<ManifestFile>,
    client: C,
    config: &Config,
    output: OutputFormat,
) -> ExitCode {
    let parser = match WorkflowParser::new(files, client, config.source.clone()) {
        Ok(parser) => parser,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    eprintln!("Scanning {} manifests...", parser.files().len());

    let dependencies = match parser.parse().await {
        Ok(dependencies) => dependencies,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let report = ScanReport::new(parser.ecosystem(), &dependencies);
    match output {
        OutputFormat::Json => match generate_json_report(&report) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Failed to serialize report: {e}");
                return ExitCode::FAILURE;
            }
        },
        OutputFormat::Markdown => println!("{}", generate_markdown_report(&report)),
        OutputFormat::Summary => {
            if dependencies.is_empty() {
                println!("No action dependencies found");
            } else {
                println!("{}", generate_summary(&report));
            }
        }
    }

    ExitCode::SUCCESS
}
