use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use imgconvert::{convert_batch, resolve_output_path, ConversionRequest, TargetFormat};
use shared_utils::{
    check_dangerous_directory, collect_files, create_progress_bar, print_failure_list,
    print_summary_report, RunTotals, IMAGE_EXTENSIONS,
};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "imgconvert")]
#[command(version, about = "Batch image converter with quality control", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a batch of images to a target format
    Run {
        /// Image files or directories to convert
        #[arg(value_name = "INPUT", required = true)]
        inputs: Vec<PathBuf>,

        /// Target format
        #[arg(short, long, value_enum)]
        format: TargetFormat,

        /// Quality for JPEG/WebP, 1-100
        #[arg(short, long, default_value_t = 85, value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: u8,

        /// Output directory (default: alongside each source file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Recurse into directories
        #[arg(short, long)]
        recursive: bool,

        /// Skip files whose output already exists instead of overwriting
        #[arg(long)]
        no_overwrite: bool,

        /// Print the summary and per-file results as JSON
        #[arg(long)]
        json: bool,

        #[arg(short, long)]
        verbose: bool,

        /// Directory for the rotating log file (default: system temp)
        #[arg(long, value_name = "PATH")]
        log_dir: Option<PathBuf>,
    },

    /// List supported target formats
    Formats,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            inputs,
            format,
            quality,
            output,
            recursive,
            no_overwrite,
            json,
            verbose,
            log_dir,
        } => {
            let mut log_config = shared_utils::logging::LogConfig::default();
            if let Some(ref dir) = log_dir {
                log_config = log_config.with_log_dir(dir);
            }
            if verbose {
                log_config = log_config.with_level(tracing::Level::DEBUG);
            }
            let _ = shared_utils::logging::init_logging("imgconvert", log_config);

            let options = RunOptions {
                recursive,
                no_overwrite,
                json,
                verbose,
            };
            run_batch(inputs, format, quality, output, options)?;
        }

        Commands::Formats => {
            println!("Supported target formats:");
            for format in TargetFormat::all() {
                let quality_note = if format.is_lossy() {
                    "quality 1-100"
                } else {
                    "quality ignored"
                };
                println!(
                    "  {:<5} → .{:<5} ({})",
                    format.as_str(),
                    format.extension(),
                    quality_note
                );
            }
        }
    }

    Ok(())
}

struct RunOptions {
    recursive: bool,
    no_overwrite: bool,
    json: bool,
    verbose: bool,
}

fn run_batch(
    inputs: Vec<PathBuf>,
    format: TargetFormat,
    quality: u8,
    output: Option<PathBuf>,
    options: RunOptions,
) -> Result<()> {
    if let Some(ref out_dir) = output {
        if let Err(msg) = check_dangerous_directory(out_dir) {
            eprintln!("{}", msg);
            std::process::exit(1);
        }
        std::fs::create_dir_all(out_dir)?;
    }

    let files = gather_inputs(&inputs, options.recursive)?;
    if files.is_empty() {
        anyhow::bail!(
            "❌ No image files found in the given inputs\n\
             💡 Supported input formats: {}",
            IMAGE_EXTENSIONS.join(", ")
        );
    }

    let (files, skipped_existing) = if options.no_overwrite {
        filter_existing(files, format, output.as_deref())
    } else {
        (files, 0)
    };

    if skipped_existing > 0 {
        println!(
            "⏭️  Skipped {} file(s) whose output already exists",
            skipped_existing
        );
    }
    if files.is_empty() {
        println!("Nothing to do.");
        return Ok(());
    }

    tracing::info!(
        total = files.len(),
        format = format.as_str(),
        quality,
        "Starting batch conversion"
    );

    let requests: Vec<ConversionRequest> = files
        .into_iter()
        .map(|source_path| ConversionRequest {
            source_path,
            target_format: format,
            quality,
            destination_dir: output.clone(),
        })
        .collect();

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        ctrlc::set_handler(move || {
            eprintln!("\n⚠️  Cancellation requested, finishing current file...");
            cancel.store(true, Ordering::Relaxed);
        })?;
    }

    let total = requests.len();
    let pb = create_progress_bar(total as u64, "Convert");
    let start_time = Instant::now();

    let (tx, rx) = mpsc::channel();
    let worker = {
        let cancel = Arc::clone(&cancel);
        thread::spawn(move || {
            convert_batch(&requests, &cancel, |event| {
                let _ = tx.send(event);
            })
        })
    };

    for event in rx {
        pb.set_position((event.index + 1) as u64);
        if options.verbose {
            pb.println(&event.status);
        }
        tracing::debug!(
            index = event.index,
            total = event.total,
            fraction = event.fraction,
            "{}",
            event.status
        );
    }

    let (summary, results) = worker
        .join()
        .map_err(|_| anyhow::anyhow!("conversion worker panicked"))?;
    pb.finish_and_clear();

    if options.json {
        let payload = serde_json::json!({
            "summary": summary,
            "results": results,
            "cancelled": cancel.load(Ordering::Relaxed) && summary.total() < total,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let totals = RunTotals {
        converted: summary.converted,
        failed: summary.failed,
        bytes_saved: summary.total_bytes_saved,
    };
    print_summary_report(&totals, start_time.elapsed(), "Image Convert");

    let errors: Vec<(PathBuf, String)> = results
        .iter()
        .filter(|r| !r.success)
        .map(|r| {
            (
                PathBuf::from(&r.source_path),
                r.error.clone().unwrap_or_else(|| "unknown error".to_string()),
            )
        })
        .collect();
    print_failure_list(&errors);

    if cancel.load(Ordering::Relaxed) && summary.total() < total {
        println!(
            "\n{}",
            style(format!(
                "⚠️  Cancelled: {} of {} files processed",
                summary.total(),
                total
            ))
            .yellow()
        );
    } else if summary.failed > 0 {
        println!(
            "\n{}",
            style(format!(
                "⚠️  Completed with {} failure(s); see the list above",
                summary.failed
            ))
            .yellow()
        );
    } else {
        println!(
            "\n{}",
            style(format!(
                "🚀 All {} images converted successfully!",
                summary.converted
            ))
            .green()
        );
    }

    Ok(())
}

/// Expand directories, keep explicit files as given, and de-duplicate
/// while preserving order.
fn gather_inputs(inputs: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            files.extend(collect_files(input, IMAGE_EXTENSIONS, recursive));
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            anyhow::bail!("❌ Input path does not exist: {}", input.display());
        }
    }

    let mut seen = HashSet::new();
    files.retain(|path| seen.insert(path.clone()));

    Ok(files)
}

/// `--no-overwrite` pre-filter: drop sources whose resolved output is
/// already present, keeping the core's one-result-per-request invariant
/// intact.
fn filter_existing(
    files: Vec<PathBuf>,
    format: TargetFormat,
    output: Option<&std::path::Path>,
) -> (Vec<PathBuf>, usize) {
    let before = files.len();
    let kept: Vec<PathBuf> = files
        .into_iter()
        .filter(|source| !resolve_output_path(source, format, output).exists())
        .collect();
    let skipped = before - kept.len();
    (kept, skipped)
}
