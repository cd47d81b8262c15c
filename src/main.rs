use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use ta_grader::config::{GradingConfig, MIN_TAS};
use ta_grader::session::{GradingSession, RunSummary};
use ta_grader::shutdown::install_shutdown_handler;

#[derive(Parser, Debug)]
#[command(name = "ta-grader")]
#[command(version)]
#[command(about = "Simulate TAs concurrently grading a pile of exams against a shared rubric")]
#[command(override_usage = "ta-grader [OPTIONS] [NUM_TAS] <EXAM_DIR>")]
struct Args {
    /// Optional TA count (minimum 2) followed by the exam directory
    #[arg(value_name = "ARGS", num_args = 1..=2, required = true)]
    positional: Vec<String>,

    /// Rubric document, rewritten whenever a TA corrects it
    #[arg(long, default_value = "rubric.txt")]
    rubric: PathBuf,

    /// Seed for reproducible delays and revision decisions
    #[arg(long)]
    seed: Option<u64>,

    /// Milliseconds between a TA's checks for the end of the run
    #[arg(long, default_value = "100")]
    poll_interval_ms: u64,

    /// Output format for the final summary
    #[arg(long, short = 'o', default_value = "table")]
    output: OutputFormat,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

/// Turn `[NUM_TAS] EXAM_DIR` into a TA count and directory. Counts below the
/// minimum, or that are not numbers, fall back to [`MIN_TAS`].
fn resolve_positionals(positional: &[String]) -> (usize, PathBuf) {
    match positional {
        [exam_dir] => {
            tracing::info!("No TA count provided, defaulting to {} TAs", MIN_TAS);
            (MIN_TAS, PathBuf::from(exam_dir))
        }
        [count, exam_dir, ..] => {
            let requested = count.parse::<usize>().unwrap_or(0);
            if requested < MIN_TAS {
                tracing::warn!(
                    requested = %count,
                    "TA count must be at least {}, using {}",
                    MIN_TAS,
                    MIN_TAS
                );
                (MIN_TAS, PathBuf::from(exam_dir))
            } else {
                (requested, PathBuf::from(exam_dir))
            }
        }
        [] => (MIN_TAS, PathBuf::new()),
    }
}

fn print_summary(
    summary: &RunSummary,
    output: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
        OutputFormat::Table => {
            println!("All exams finished.");
            println!(
                "Exams graded: {} of {}{}",
                summary.cursor,
                summary.exams_in_queue,
                if summary.sentinel_reached {
                    " (stopped at sentinel)"
                } else {
                    ""
                }
            );
            println!("Questions graded: {}", summary.questions_graded);
            println!("Rubric corrections: {}", summary.revisions);
            println!();
            println!(
                "{:<6} {:<10} {:<12} {:<10} {:<8}",
                "TA", "GRADED", "CORRECTIONS", "MALFORMED", "ADVANCES"
            );
            println!("{}", "-".repeat(50));
            for w in &summary.workers {
                println!(
                    "{:<6} {:<10} {:<12} {:<10} {:<8}",
                    w.ta_id, w.questions_graded, w.revisions, w.malformed_lines, w.advances
                );
            }
        }
    }
    Ok(())
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let (num_tas, exam_dir) = resolve_positionals(&args.positional);

    let mut config = GradingConfig::new(num_tas, exam_dir)
        .with_rubric_path(args.rubric)
        .with_poll_interval_ms(args.poll_interval_ms);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    tracing::info!(
        tas = config.num_tas,
        exam_dir = %config.exam_dir.display(),
        rubric = %config.rubric_path.display(),
        "Starting ta-grader"
    );

    let session = GradingSession::open(config).await?;
    install_shutdown_handler(session.state().termination().clone())?;

    let summary = session.run().await?;
    print_summary(&summary, &args.output)?;
    Ok(())
}

#[tokio::main]
async fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                e.exit();
            }
            // Usage errors exit with 1 rather than clap's default of 2.
            let _ = e.print();
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(args).await {
        tracing::error!(error = %e, "Grading run failed");
        eprintln!("ta-grader: {}", e);
        std::process::exit(1);
    }
}
