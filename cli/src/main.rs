//! anamnesis: clinical-note generation and validation runner.
//!
//! Usage:
//!   anamnesis run [--config anamnesis.toml] [--prompt-version v2] [--offline]
//!   anamnesis check response.json

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use anamnesis_config::RunConfig;
use anamnesis_contracts::error::{PipelineError, PipelineResult};
use anamnesis_core::{
    traits::{InputSource, ModelClient, OutputValidator},
    BatchRunner, ModelInvoker, Pipeline,
};
use anamnesis_model::{OfflineModelClient, OpenAiChatClient};
use anamnesis_store::{DirectoryInputSource, FilePromptSource, JsonReportSink};
use anamnesis_verify::ClinicalValidator;

const EXIT_OK: i32 = 0;
/// Runtime failure: bad config, unreadable input, unwritable report.
const EXIT_ERROR: i32 = 1;
/// `check` found issues in the response.
const EXIT_INVALID: i32 = 2;

// ── CLI definition ────────────────────────────────────────────────────────────

/// Generate and validate structured analyses of clinical notes.
#[derive(Parser)]
#[command(name = "anamnesis", version, about = "Clinical-note generation and validation pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process every note of the input directory and write the run report.
    Run(RunArgs),
    /// Validate one stored model response against the clinical schema.
    Check {
        /// File holding the raw model response.
        file: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Prompt version (selects prompt_<version>.txt).
    #[arg(long)]
    prompt_version: Option<String>,
    /// Directory of *.txt notes.
    #[arg(long)]
    input_dir: Option<PathBuf>,
    /// Where to write the JSON report.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Skip the external model; every item uses the fallback payload.
    #[arg(long)]
    offline: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    dotenvy::dotenv().ok();

    // RUST_LOG=debug for per-stage output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Run(args) => run(args).map(|()| EXIT_OK),
        Command::Check { file } => check(&file),
    };

    let code = exit_code(result);
    if code != EXIT_OK {
        std::process::exit(code);
    }
}

/// Process exit code for a command outcome; errors are reported on stderr.
fn exit_code(result: PipelineResult<i32>) -> i32 {
    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn run(args: RunArgs) -> PipelineResult<()> {
    let config = load_config(&args)?;

    let inputs = DirectoryInputSource::new(&config.paths.input_dir)
        .with_sample_seeding(config.paths.seed_sample_input);
    let items = inputs.list_inputs()?;
    info!(count = items.len(), dir = %config.paths.input_dir.display(), "inputs discovered");

    let client: Box<dyn ModelClient> = if args.offline {
        Box::new(OfflineModelClient)
    } else {
        Box::new(OpenAiChatClient::new(&config.model)?)
    };

    let pipeline = Pipeline::new(
        Box::new(FilePromptSource::new(&config.paths.prompts_dir)),
        ModelInvoker::new(client, config.invoker_config()),
        Box::new(ClinicalValidator::new()),
    );
    let sink = JsonReportSink::new(&config.paths.output_path);
    let runner = BatchRunner::new(pipeline, Box::new(sink));
    let report = runner.process(items, &config.prompt_version);
    let saved = runner.persist(&report);

    match &saved {
        Ok(()) => println!(
            "Processing complete. Report saved to: {}",
            config.paths.output_path.display()
        ),
        Err(_) => println!(
            "Processing complete. Report NOT saved to: {}",
            config.paths.output_path.display()
        ),
    }
    println!("{}", report.summary_line());
    saved
}

/// Validate one stored response, printing `OK` or every issue.
///
/// Returns `EXIT_OK` or `EXIT_INVALID`; an unreadable file is an error.
fn check(file: &Path) -> PipelineResult<i32> {
    let raw = std::fs::read_to_string(file).map_err(|e| PipelineError::InputUnavailable {
        reason: format!("'{}': {}", file.display(), e),
    })?;

    match ClinicalValidator::new().validate(&raw) {
        Ok(_) => {
            println!("OK");
            Ok(EXIT_OK)
        }
        Err(issues) => {
            for issue in &issues {
                println!("{}", issue);
            }
            Ok(EXIT_INVALID)
        }
    }
}

/// File (or default) configuration with command-line overrides applied.
fn load_config(args: &RunArgs) -> PipelineResult<RunConfig> {
    let mut config = match &args.config {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::default(),
    };

    if let Some(version) = &args.prompt_version {
        config.prompt_version = version.clone();
    }
    if let Some(dir) = &args.input_dir {
        config.paths.input_dir = dir.clone();
    }
    if let Some(output) = &args.output {
        config.paths.output_path = output.clone();
    }

    config.validate()?;
    Ok(config)
}
