//! markgrade CLI — grade multiple-choice answer sheets against a key.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use markgrade_extract::DetectorKind;

mod commands;

#[derive(Parser)]
#[command(name = "markgrade", version, about = "Multiple-choice answer sheet grader")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade submissions against an answer key
    Grade {
        /// Answer key document (.pdf, .docx or .txt)
        #[arg(long)]
        key: PathBuf,

        /// Submission files (images or documents)
        #[arg(long, num_args = 1.., required = true)]
        submissions: Vec<PathBuf>,

        /// Output directory (default: from config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Export formats: csv, json, html, all (comma-separated)
        #[arg(long, default_value = "csv")]
        format: String,

        /// Answer detector: placeholder or document
        #[arg(long)]
        detector: Option<DetectorKind>,

        /// Seed for the placeholder detector
        #[arg(long)]
        seed: Option<u64>,

        /// Max submissions graded at once
        #[arg(long)]
        parallelism: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Parse an answer key and report problems
    ParseKey {
        /// Answer key document
        #[arg(long)]
        key: PathBuf,

        /// Expected number of questions
        #[arg(long)]
        expected: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the student identity resolved for each file
    Identify {
        /// Submission file names
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// OCR text to try before the filename heuristics
        #[arg(long)]
        ocr_text: Option<String>,
    },

    /// Create a starter markgrade.toml
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("markgrade=info".parse().expect("valid directive")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Grade {
            key,
            submissions,
            output,
            format,
            detector,
            seed,
            parallelism,
            config,
        } => {
            commands::grade::execute(
                key,
                submissions,
                output,
                format,
                detector,
                seed,
                parallelism,
                config,
            )
            .await
        }
        Commands::ParseKey {
            key,
            expected,
            config,
        } => commands::parse_key::execute(key, expected, config).await,
        Commands::Identify { paths, ocr_text } => commands::identify::execute(paths, ocr_text),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
