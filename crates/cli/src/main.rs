//! CLI tool for converting PowerPoint files to PDF.

mod select;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ppt2pdf_core::{
    presentation_file, presentation_files, BatchConverter, BatchReport, ConversionJob,
    EngineConfig, EnginePreference,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Convert PowerPoint presentations (.ppt, .pptx) to PDF.
#[derive(Parser, Debug)]
#[command(name = "ppt2pdf")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Conversion engine to use
    #[arg(long, value_enum, default_value_t = EngineArg::Auto, env = "PPT2PDF_ENGINE", global = true)]
    engine: EngineArg,

    /// Path to the LibreOffice `soffice` executable
    #[arg(long, env = "PPT2PDF_SOFFICE", global = true)]
    soffice: Option<PathBuf>,

    /// Print the batch report as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert one presentation; the PDF is written next to it
    Convert {
        /// Input PowerPoint file (.ppt or .pptx)
        input: PathBuf,
    },

    /// Convert every presentation in a folder
    ConvertAll {
        /// Folder containing the PowerPoint files
        input_dir: PathBuf,

        /// Output folder (default: same as input folder), created if missing
        output_dir: Option<PathBuf>,
    },

    /// Convert every presentation next to this executable with PowerPoint
    ConvertHere,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum EngineArg {
    /// PowerPoint on Windows when installed, LibreOffice otherwise
    Auto,
    /// Microsoft PowerPoint automation (Windows)
    Powerpoint,
    /// Headless LibreOffice
    Libreoffice,
}

impl From<EngineArg> for EnginePreference {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Auto => EnginePreference::Auto,
            EngineArg::Powerpoint => EnginePreference::NativeAutomation,
            EngineArg::Libreoffice => EnginePreference::HeadlessSuite,
        }
    }
}

/// What a command resolved to before any engine is started.
struct Plan {
    jobs: Vec<ConversionJob>,
    input_dir: PathBuf,
    config: EngineConfig,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run the requested command. Returns whether every file converted.
fn run(args: &Args) -> Result<bool> {
    let plan = plan(args)?;

    if plan.jobs.is_empty() {
        println!("No PPT/PPTX files found in {}", plan.input_dir.display());
        return Ok(true);
    }

    let engine = select::select_engine(&plan.config)?;
    log::info!("Using {}", engine.describe());

    let report = BatchConverter::new(engine.as_ref()).run(&plan.jobs)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&report, &engine.kind().to_string());
    }

    Ok(report.is_success())
}

/// Resolve the command into jobs and engine settings.
fn plan(args: &Args) -> Result<Plan> {
    let config = EngineConfig::new()
        .with_preference(args.engine.into())
        .with_soffice(args.soffice.clone());

    match &args.command {
        Commands::Convert { input } => {
            presentation_file(input)?;
            let input_dir = input
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default();
            Ok(Plan {
                jobs: vec![ConversionJob::alongside(input)],
                input_dir,
                config,
            })
        }
        Commands::ConvertAll {
            input_dir,
            output_dir,
        } => {
            let output_dir = output_dir.as_deref().unwrap_or(input_dir);
            Ok(Plan {
                jobs: folder_jobs(input_dir, output_dir)?,
                input_dir: input_dir.clone(),
                config,
            })
        }
        Commands::ConvertHere => {
            if args.engine == EngineArg::Libreoffice {
                bail!("convert-here only supports PowerPoint automation");
            }
            let dir = executable_dir()?;
            Ok(Plan {
                jobs: folder_jobs(&dir, &dir)?,
                input_dir: dir,
                config: config.with_preference(EnginePreference::NativeAutomation),
            })
        }
    }
}

/// Jobs for every presentation in `input_dir`, writing into `output_dir`.
///
/// The output folder is created even when there is nothing to convert.
fn folder_jobs(input_dir: &Path, output_dir: &Path) -> Result<Vec<ConversionJob>> {
    let files = presentation_files(input_dir)?;
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output folder {}", output_dir.display()))?;
    Ok(files
        .into_iter()
        .map(|source| ConversionJob::into_dir(source, output_dir))
        .collect())
}

fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    exe.parent()
        .map(Path::to_path_buf)
        .with_context(|| format!("{} has no parent folder", exe.display()))
}

fn print_summary(report: &BatchReport, engine: &str) {
    if report.is_success() {
        println!("Converted {} file(s) with {}.", report.converted.len(), engine);
        return;
    }

    eprintln!(
        "{} of {} file(s) failed to convert:",
        report.failed.len(),
        report.attempted()
    );
    for failed in &report.failed {
        eprintln!("  {}: {}", failed.job.source.display(), failed.reason);
    }
}
