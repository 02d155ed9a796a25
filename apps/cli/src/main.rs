use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::{sync::watch, task::JoinHandle};
use tracing_subscriber::EnvFilter;

use reelcut_core::{
    AnalysisReport, EditPlan, EngineConfig, JobPhase, MediaAsset, MediaEngine, ProcessingJob,
    format_highlights_readable, format_plan_readable, format_suggestions_readable, highlights,
    load_report, selected_ranges, suggestions, timestamp,
};

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", secs / 60.0, secs % 60.0)
    }
}

#[derive(Parser)]
#[command(name = "reelcut")]
#[command(about = "Turn AI video critiques into edit suggestions, highlight reels and trimmed videos")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// ffmpeg binary (defaults to $REELCUT_FFMPEG, then `ffmpeg` on PATH)
    #[arg(long, global = true)]
    ffmpeg: Option<PathBuf>,

    /// Directory for scratch files (defaults to $REELCUT_SCRATCH_DIR, then the user cache dir)
    #[arg(long, global = true)]
    scratch_dir: Option<PathBuf>,

    /// Verbose logging (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List ranked edit suggestions for a critique
    Suggest {
        /// Analysis report (JSON)
        report: PathBuf,

        /// Video duration in seconds
        #[arg(short, long)]
        duration: f64,

        /// Print JSON instead of a readable list
        #[arg(long)]
        json: bool,
    },

    /// List highlight clips for a critique
    Highlights {
        /// Analysis report (JSON)
        report: PathBuf,

        /// Video duration in seconds
        #[arg(short, long)]
        duration: f64,

        /// Print JSON instead of a readable list
        #[arg(long)]
        json: bool,
    },

    /// Cut a range out of a video without re-encoding
    Trim {
        input: PathBuf,

        /// Start, e.g. "0:05" or "1:02:03"
        #[arg(short, long)]
        start: String,

        /// End, e.g. "0:20"
        #[arg(short, long)]
        end: String,

        /// Video duration in seconds
        #[arg(short, long)]
        duration: f64,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Join the selected highlight clips into a reel
    Reel {
        input: PathBuf,

        /// Analysis report (JSON)
        report: PathBuf,

        /// Video duration in seconds
        #[arg(short, long)]
        duration: f64,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Apply suggestions to the video and render the result
    Apply {
        input: PathBuf,

        /// Analysis report (JSON)
        report: PathBuf,

        /// Video duration in seconds
        #[arg(short, long)]
        duration: f64,

        /// Skip suggestions below this confidence
        #[arg(long, default_value_t = 0.0)]
        min_confidence: f64,

        #[arg(short, long)]
        output: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn engine_config(cli: &Cli) -> EngineConfig {
    let mut config = EngineConfig::from_env();
    if let Some(ffmpeg) = &cli.ffmpeg {
        config.ffmpeg_path = ffmpeg.clone();
    }
    if let Some(dir) = &cli.scratch_dir {
        config.scratch_dir = dir.clone();
    }
    config
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .expect("valid spinner template"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn create_progress_bar(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} {msg} [{bar:30.cyan/blue}] {pos:>3}%")
            .expect("valid progress template")
            .progress_chars("█▓░"),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Mirror engine progress onto a progress bar until the job settles.
fn track_progress(pb: ProgressBar, mut rx: watch::Receiver<ProcessingJob>) -> JoinHandle<ProgressBar> {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let job = *rx.borrow_and_update();
            pb.set_position(job.progress_percent.round() as u64);
            if matches!(job.phase, JobPhase::Done | JobPhase::Failed) {
                break;
            }
        }
        pb
    })
}

async fn load_engine(cli: &Cli) -> Result<MediaEngine> {
    let engine = MediaEngine::new(engine_config(cli));
    let spinner = create_spinner("Loading ffmpeg...");
    engine.load().await?;
    spinner.finish_with_message(format!(
        "{} Toolchain ready {}",
        style("✓").green().bold(),
        style(engine.version().unwrap_or_default()).dim()
    ));
    Ok(engine)
}

async fn read_input(path: &Path, duration: f64) -> Result<MediaAsset> {
    MediaAsset::from_file(path, duration)
        .await
        .with_context(|| format!("reading {}", path.display()))
}

async fn write_output(asset: &MediaAsset, path: &Path) -> Result<()> {
    asset
        .write_to(path)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    println!(
        "\n{} {} {}\n",
        style("Saved:").dim(),
        style(path.display()).cyan(),
        style(format!("({:.1}s)", asset.duration)).dim()
    );
    Ok(())
}

fn print_banner() {
    println!(
        "\n{}  {}\n",
        style("reelcut").cyan().bold(),
        style("Critique Editor").dim()
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli).await {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Suggest {
            report,
            duration,
            json,
        } => {
            let report = load_report(report).await?;
            let suggestions = suggestions::generate(&report, *duration);
            if *json {
                println!("{}", serde_json::to_string_pretty(&suggestions)?);
            } else {
                println!("{}", format_suggestions_readable(&suggestions));
            }
        }
        Command::Highlights {
            report,
            duration,
            json,
        } => {
            let report = load_report(report).await?;
            let clips = highlights::select(&report, *duration);
            if *json {
                println!("{}", serde_json::to_string_pretty(&clips)?);
            } else {
                println!("{}", format_highlights_readable(&clips));
            }
        }
        Command::Trim {
            input,
            start,
            end,
            duration,
            output,
        } => {
            let start = parse_time_arg(start)?;
            let end = parse_time_arg(end)?;
            print_banner();
            let engine = load_engine(cli).await?;
            let asset = read_input(input, *duration).await?;

            let step_start = Instant::now();
            let pb = create_progress_bar("Trimming...");
            let tracker = track_progress(pb, engine.subscribe());
            let result = engine.trim(&asset, start, end).await;
            let pb = finish_tracker(tracker, &result).await?;
            let trimmed = result?;
            pb.finish_with_message(format!(
                "{} Trimmed [{}–{}] {}",
                style("✓").green().bold(),
                timestamp::format(start),
                timestamp::format(end),
                style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
            ));

            write_output(&trimmed, output).await?;
        }
        Command::Reel {
            input,
            report,
            duration,
            output,
        } => {
            let report = load_report(report).await?;
            let clips = highlights::select(&report, *duration);
            print_banner();
            println!("{}", format_highlights_readable(&clips));

            let ranges = selected_ranges(&clips);
            let engine = load_engine(cli).await?;
            let asset = read_input(input, *duration).await?;

            let step_start = Instant::now();
            let pb = create_progress_bar(&format!("Joining {} clips...", ranges.len()));
            let tracker = track_progress(pb, engine.subscribe());
            let result = engine.concatenate(&asset, &ranges).await;
            let pb = finish_tracker(tracker, &result).await?;
            let reel = result?;
            pb.finish_with_message(format!(
                "{} Reel assembled {}",
                style("✓").green().bold(),
                style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
            ));

            write_output(&reel, output).await?;
        }
        Command::Apply {
            input,
            report,
            duration,
            min_confidence,
            output,
        } => {
            let report = load_report(report).await?;
            let plan = plan_from_report(&report, *duration, *min_confidence);
            print_banner();
            println!("{}", format_plan_readable(&plan));

            let engine = load_engine(cli).await?;
            let asset = read_input(input, *duration).await?;

            let step_start = Instant::now();
            let label = if plan.has_effective_cuts() {
                "Rendering cuts..."
            } else {
                "Trimming..."
            };
            let pb = create_progress_bar(label);
            let tracker = track_progress(pb, engine.subscribe());
            let result = engine.render(&asset, &plan).await;
            let pb = finish_tracker(tracker, &result).await?;
            let edited = result?;
            pb.finish_with_message(format!(
                "{} Edit rendered {}",
                style("✓").green().bold(),
                style(format!("[{}]", format_duration(step_start.elapsed()))).dim()
            ));

            write_output(&edited, output).await?;
        }
    }

    Ok(())
}

/// Join the progress task. Validation errors never start a job, so the task
/// is aborted instead of awaited for those.
async fn finish_tracker<T>(
    tracker: JoinHandle<ProgressBar>,
    result: &reelcut_core::Result<T>,
) -> Result<ProgressBar> {
    if let Err(reelcut_core::ReelcutError::Validation { .. }) = result {
        tracker.abort();
        return Ok(ProgressBar::hidden());
    }
    Ok(tracker.await?)
}

fn parse_time_arg(text: &str) -> Result<f64> {
    if let Ok(secs) = text.parse::<f64>() {
        return Ok(secs);
    }
    let value = timestamp::parse_time(text);
    anyhow::ensure!(!value.is_fallback(), "cannot read {:?} as a timestamp", text);
    Ok(value.seconds())
}

fn plan_from_report(report: &AnalysisReport, duration: f64, min_confidence: f64) -> EditPlan {
    let mut plan = EditPlan::new(duration);
    for suggestion in suggestions::generate(report, duration)
        .iter()
        .filter(|s| s.confidence >= min_confidence)
    {
        tracing::debug!(id = suggestion.id.as_str(), "applying suggestion");
        plan.apply(suggestion);
    }
    plan
}
