use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thumbfit::animate::{self, AnimateError};
use thumbfit::config::{self, Config};
use thumbfit::process::{self, ProcessError};
use thumbfit::{logging, output, scan};

/// Flags for the thumbnail batch.
#[derive(clap::Args, Clone, Default)]
struct ThumbsArgs {
    /// Also write the batch report as JSON to this file
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "thumbfit")]
#[command(about = "Batch-convert JPEG folders into letterboxed thumbnails under a byte budget")]
#[command(long_about = "\
Batch-convert JPEG folders into letterboxed thumbnails under a byte budget

Every *.jpg in the source directory is scaled to fit the canvas (112x112 by
default), centered on a white background, and written to the output directory
at the highest quality that keeps the file within the budget (20 KiB):

  WebP  quality 95, 90, ... 60   first one that fits wins
  JPEG  quality 50, 45, ... 10   fallback when no WebP level fits

If nothing fits, the smallest attempt is kept and listed in the summary.
Files that cannot be decoded are reported and skipped.

Settings are read from ./thumbfit.toml when present (or --config <FILE>).
Run 'thumbfit gen-config' to print a documented config file.")]
#[command(version)]
struct Cli {
    /// Source image directory [default: 1012B767/images/lv1]
    #[arg(long, global = true, value_name = "DIR")]
    source: Option<PathBuf>,

    /// Output directory [default: optimized-webp]
    #[arg(long, global = true, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Config file [default: ./thumbfit.toml if present]
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More diagnostics on stderr (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate thumbnails for every source image (the default)
    Thumbs(ThumbsArgs),
    /// Build a looping GIF preview from the source images
    Gif {
        /// Output file [default: gif.output_file from config]
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
    /// List the inputs and effective settings without encoding anything
    Check,
    /// Print a stock thumbfit.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut cli = Cli::parse();
    logging::init(cli.verbose);

    let command = cli
        .command
        .take()
        .unwrap_or(Command::Thumbs(ThumbsArgs::default()));

    match command {
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            Ok(ExitCode::SUCCESS)
        }
        Command::Thumbs(args) => run_thumbs(&load_config(&cli)?, args.report.as_deref()),
        Command::Gif { file } => {
            let config = load_config(&cli)?;
            let file = file.unwrap_or_else(|| config.gif.output_file.clone());
            run_gif(&config, &file)
        }
        Command::Check => {
            let config = load_config(&cli)?;
            let inputs = scan::scan_inputs(&config.input_dir, &config.extensions)?;
            output::print_check_output(&config, &inputs);
            if inputs.is_empty() {
                println!("No images found in {}", config.input_dir.display());
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Config file merged over stock defaults, then the directory flags on top.
fn load_config(cli: &Cli) -> Result<Config, config::ConfigError> {
    let mut config = config::load_config(cli.config.as_deref())?;
    if let Some(source) = &cli.source {
        config.input_dir = source.clone();
    }
    if let Some(output) = &cli.output {
        config.output_dir = output.clone();
    }
    Ok(config)
}

fn run_thumbs(
    config: &Config,
    report_path: Option<&Path>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    init_thread_pool(&config.processing);
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_process_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = process::process(config, Some(tx));
    printer.join().map_err(|_| "progress printer panicked")?;

    let report = match result {
        Ok(report) => report,
        Err(ProcessError::NoInputs(dir)) => {
            println!("No images found in {}", dir.display());
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    output::print_summary(&report, &config.output_dir);
    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)?;
        println!("Report: {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}

fn run_gif(config: &Config, file: &Path) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_gif_event(&event) {
                println!("{}", line);
            }
        }
    });
    let result = animate::build_gif(config, file, Some(tx));
    printer.join().map_err(|_| "progress printer panicked")?;

    match result {
        Ok(outcome) => {
            output::print_gif_summary(&outcome);
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ (AnimateError::NoInputs(_) | AnimateError::NoFrames(_))) => {
            println!("{}", e);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
