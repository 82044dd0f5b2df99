use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use rust_sqlgraph::{parser, report, scan, OutputFormat, ScanOptions};

#[derive(Parser)]
#[command(name = "rust-sqlgraph")]
#[command(author, version, about = "Extract object dependencies from T-SQL scripts")]
struct Cli {
    /// Enable verbose output (debug logging unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a .sql file or a directory of scripts
    Scan {
        /// Path to a .sql file or a directory to walk
        #[arg(short, long)]
        input: PathBuf,

        /// Output file for the report (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Glob pattern for files to skip (repeatable)
        #[arg(short, long)]
        exclude: Vec<String>,
    },

    /// Parse a single script and print its edges
    Parse {
        /// Path to the .sql file
        file: PathBuf,

        /// Report format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scan {
            input,
            output,
            format,
            exclude,
        } => {
            let options = ScanOptions {
                input_path: input,
                output_path: output,
                format,
                exclude,
            };

            scan(&options)?;
        }
        Commands::Parse { file, format } => {
            let script = parser::parse_sql_file(&file)?;
            print!("{}", report::render(&[script], format)?);
        }
    }

    Ok(())
}
