//! CLI entry point for the screening report tool.
//!
//! Provides subcommands for the per-job screening time breakdown, the
//! overall breakdown, and per-question answer rates.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use screening_report::analyzers::aggregate::Under5Basis;
use screening_report::analyzers::analyzer::{
    DataQuality, answer_analysis, average_time_analysis, time_analysis,
};
use screening_report::analyzers::answers::SchemeChoice;
use screening_report::config::ReportConfig;
use screening_report::model::ScreeningRecord;
use screening_report::output::{
    print_json, write_answer_report, write_global_report, write_time_report,
};
use screening_report::{logging, source::open_source};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "screening_report")]
#[command(about = "Screening time and answer-rate reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every report.
#[derive(Args)]
struct InputArgs {
    /// Document export (.json, .jsonl, .ndjson) or sheet export (.csv), optionally .gz
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output CSV file (defaults to a fixed name under REPORT_OUTPUT_DIR)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep documents lacking a timestamp or job id instead of filtering them out
    #[arg(long, default_value_t = false)]
    include_incomplete: bool,

    /// Also log the report rows as JSON
    #[arg(long, default_value_t = false)]
    print: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Percentage of screenings per time bucket, per job
    TimeAnalysis {
        #[command(flatten)]
        args: InputArgs,

        /// Denominator for the under-5-minutes share: "classified" or "all"
        #[arg(long)]
        under5_basis: Option<Under5Basis>,
    },
    /// Percentage of screenings per time bucket over all jobs
    AverageTimeAnalysis {
        #[command(flatten)]
        args: InputArgs,

        /// Denominator for the under-5-minutes share: "classified" or "all"
        #[arg(long)]
        under5_basis: Option<Under5Basis>,
    },
    /// Correct / wrong / not-applicable rates per job and question
    AnswerAnalysis {
        #[command(flatten)]
        args: InputArgs,

        /// Answer label scheme: "auto", "long" or "short"
        #[arg(long)]
        scheme: Option<SchemeChoice>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = ReportConfig::from_env()?;
    let _log_guard = logging::init(&config.log_file_path);

    let cli = Cli::parse();

    match cli.command {
        Commands::TimeAnalysis { args, under5_basis } => {
            let basis = under5_basis.unwrap_or(config.under_five_basis);
            let records = load_records(&args)?;
            let report = time_analysis(&records, basis);
            log_quality(&report.quality);

            if args.print {
                print_json(&report.rows)?;
            }
            let output = output_path(&config, &args, "Screening_Time_Analysis.csv");
            write_time_report(&output, &report.rows)?;
            info!(jobs = report.rows.len(), ?basis, "Time analysis complete");
        }
        Commands::AverageTimeAnalysis { args, under5_basis } => {
            let basis = under5_basis.unwrap_or(config.under_five_basis);
            let records = load_records(&args)?;
            let (rows, quality) = average_time_analysis(&records, basis);
            log_quality(&quality);

            if args.print {
                print_json(&rows)?;
            }
            let output = output_path(&config, &args, "Avg_Screening_Time_Analysis.csv");
            write_global_report(&output, &rows)?;
        }
        Commands::AnswerAnalysis { args, scheme } => {
            let scheme = scheme.unwrap_or(config.answer_scheme);
            let records = load_records(&args)?;
            let rows = answer_analysis(&records, scheme);
            if rows.is_empty() {
                warn!("No recognized answer labels found");
            }

            if args.print {
                print_json(&rows)?;
            }
            let output = output_path(&config, &args, "Answer_Analysis.csv");
            write_answer_report(&output, &rows)?;
        }
    }

    Ok(())
}

#[tracing::instrument(skip(args), fields(input = %args.input.display()))]
fn load_records(args: &InputArgs) -> Result<Vec<ScreeningRecord>> {
    let source = open_source(&args.input, !args.include_incomplete)?;
    let records = source.load()?;
    info!(records = records.len(), "Records loaded");
    Ok(records)
}

fn output_path(config: &ReportConfig, args: &InputArgs, default_name: &str) -> PathBuf {
    args.output
        .clone()
        .unwrap_or_else(|| config.output_path(default_name))
}

fn log_quality(quality: &DataQuality) {
    if quality.excluded() == 0 {
        return;
    }
    warn!(
        dropped_missing_key = quality.dropped_missing_key,
        missing_input = quality.missing_input,
        negative_elapsed = quality.negative_elapsed,
        unparseable = quality.unparseable,
        "Records excluded from percentages"
    );
}
