//! fbmeta CLI - Firebird schema export and script application.

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use fbmeta::error::{EXIT_CONFIG_ERROR, EXIT_SCRIPTS_FAILED};
use fbmeta::{Config, ExecutionReport, FirebirdFactory, MetaError, Orchestrator};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "fbmeta")]
#[command(about = "Export a Firebird schema to SQL scripts and apply scripts to databases")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output JSON result to stdout
    #[arg(long, global = true)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, global = true, default_value = "text", value_parser = ["text", "json"])]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, global = true, default_value = "info", value_parser = ["debug", "info", "warn", "error"])]
    verbosity: String,

    /// Exit non-zero when any script failed
    #[arg(long, global = true)]
    fail_on_error: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new database and apply a scripts tree to it
    BuildDb {
        /// Directory in which the database file is created
        #[arg(long)]
        db_dir: PathBuf,

        /// Scripts root containing domains/, tables/ and procedures/
        #[arg(long)]
        scripts_dir: PathBuf,
    },

    /// Export domains, tables and procedures to one script per object
    ExportScripts {
        /// Connection string, e.g. "Database=/data/app.fdb;User=SYSDBA;Password=masterkey"
        #[arg(long)]
        connection_string: String,

        /// Output directory (replaced on every export)
        #[arg(long)]
        output_dir: PathBuf,
    },

    /// Apply a scripts tree to an existing database
    UpdateDb {
        /// Connection string of the target database
        #[arg(long)]
        connection_string: String,

        /// Scripts root containing domains/, tables/ and procedures/
        #[arg(long)]
        scripts_dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(EXIT_CONFIG_ERROR),
            };
        }
    };

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, MetaError> {
    setup_logging(&cli.verbosity, &cli.log_format);

    let config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => Config::default(),
    };

    let orchestrator = Orchestrator::new(config, FirebirdFactory::new());

    match cli.command {
        Commands::BuildDb {
            db_dir,
            scripts_dir,
        } => {
            let report = orchestrator.build_database(&db_dir, &scripts_dir)?;
            print_report(&report, cli.output_json)?;
            Ok(report_exit_code(&report, cli.fail_on_error))
        }

        Commands::ExportScripts {
            connection_string,
            output_dir,
        } => {
            let summary = orchestrator.export_scripts(&connection_string, &output_dir)?;
            if cli.output_json {
                println!("{}", summary.to_json()?);
            } else {
                for line in summary.lines() {
                    println!("{}", line);
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Commands::UpdateDb {
            connection_string,
            scripts_dir,
        } => {
            let report = orchestrator.update_database(&connection_string, &scripts_dir)?;
            print_report(&report, cli.output_json)?;
            Ok(report_exit_code(&report, cli.fail_on_error))
        }
    }
}

fn print_report(report: &ExecutionReport, output_json: bool) -> Result<(), MetaError> {
    if output_json {
        println!("{}", report.to_json()?);
    } else {
        for line in report.lines() {
            println!("{}", line);
        }
    }
    Ok(())
}

fn report_exit_code(report: &ExecutionReport, fail_on_error: bool) -> ExitCode {
    if fail_on_error && report.has_failures() {
        warn!("{} scripts failed", report.failed());
        ExitCode::from(EXIT_SCRIPTS_FAILED)
    } else {
        ExitCode::SUCCESS
    }
}

/// Logs go to stderr so `--output-json` output on stdout stays parseable.
fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
