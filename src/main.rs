use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use groupscholar_academic_performance::{
    batch, cohort, input, report, EngineConfig, StudentPeriodInput,
};

mod logging;

#[derive(Parser)]
#[command(name = "academic-performance")]
#[command(about = "Academic performance and risk reports for a class period", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PeriodArgs {
    /// Grade entries CSV
    #[arg(long)]
    grades: PathBuf,
    /// Daily attendance marks CSV
    #[arg(long)]
    attendance: PathBuf,
    /// Student records CSV (conduct, prior GPAs)
    #[arg(long)]
    students: PathBuf,
    /// Label of the period being compiled, e.g. "HK1 2025-2026"
    #[arg(long)]
    period: String,
    /// Engine config TOML
    #[arg(long, env = "PERFORMANCE_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank students by risk level
    Score {
        #[command(flatten)]
        period: PeriodArgs,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        period: PeriodArgs,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Write every compiled report as JSON
    Export {
        #[command(flatten)]
        period: PeriodArgs,
        #[arg(long, default_value = "reports.json")]
        out: PathBuf,
    },
}

fn compile_period(args: &PeriodArgs) -> anyhow::Result<Vec<batch::BatchEntry>> {
    let config = EngineConfig::load(args.config.as_deref())?;
    let mut inputs: Vec<StudentPeriodInput> =
        input::load_period(&args.grades, &args.attendance, &args.students, &args.period)
            .context("failed to load period inputs")?;

    let compiler = config.compiler();
    cohort::attach_weaknesses(
        compiler.aggregator(),
        &mut inputs,
        config.cohort.weakness_margin,
    );
    Ok(batch::compile_batch(&compiler, &inputs))
}

fn main() -> anyhow::Result<()> {
    logging::init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Score { period: args, limit } => {
            let entries = compile_period(&args)?;
            let ranked =
                report::rank_by_risk(entries.iter().filter_map(|entry| entry.report.as_ref()));

            if ranked.is_empty() {
                println!("No students found for this period.");
                return Ok(());
            }

            println!("Students by risk level:");
            for report in ranked.iter().take(limit) {
                println!(
                    "- {} ({}) risk {}, GPA {:.2} ({}), attendance {:.1}%, trend {}",
                    report.student_name,
                    report.student_id,
                    report.risk.level.as_str(),
                    report.semester.gpa,
                    report.semester.standing.label(),
                    report.attendance.rate,
                    report.trend.direction.as_str()
                );
            }

            let skipped: usize = entries.iter().map(|entry| entry.skipped_subjects.len()).sum();
            let failed = entries.iter().filter(|entry| entry.report.is_none()).count();
            if skipped > 0 || failed > 0 {
                println!("{skipped} subjects skipped, {failed} students without a report.");
            }
        }
        Commands::Report { period: args, out } => {
            let entries = compile_period(&args)?;
            let markdown = report::render_markdown(&args.period, &entries);
            std::fs::write(&out, markdown)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { period: args, out } => {
            let entries = compile_period(&args)?;
            let json = serde_json::to_string_pretty(&entries)
                .context("failed to serialize reports to JSON")?;
            std::fs::write(&out, json)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Exported {} reports to {}.", entries.len(), out.display());
        }
    }

    Ok(())
}
