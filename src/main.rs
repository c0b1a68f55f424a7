mod config;
mod db;
mod month;
mod report;
mod sheets;
mod workbook;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use config::ReportConfig;
use report::grid::Grid;

const DEFAULT_PRODUCT: &str = "Акрихин - Фортедетрим";

#[derive(Parser)]
#[command(name = "orm_report", about = "Marketing report processor for ORM spreadsheets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a shared Google Sheets document as xlsx
    Import {
        /// Google Sheets link (edit, view or share form)
        url: String,
        /// Where to save the downloaded file
        #[arg(short, long, default_value = "import.xlsx")]
        output: PathBuf,
    },
    /// Process a local xlsx report into a styled output workbook
    Process {
        /// Source xlsx file
        input: PathBuf,
        /// Output path (default: <input>_<Месяц>_<год>_result.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Product name for the title block
        #[arg(short, long, default_value = DEFAULT_PRODUCT)]
        product: String,
        /// Report period (default: detected from the file name)
        #[arg(long)]
        period: Option<String>,
    },
    /// Import + process in one pipeline
    Run {
        /// Google Sheets link
        url: String,
        /// Output path
        #[arg(short, long, default_value = "report_result.xlsx")]
        output: PathBuf,
        /// Product name for the title block
        #[arg(short, long, default_value = DEFAULT_PRODUCT)]
        product: String,
        /// Report period
        #[arg(long)]
        period: Option<String>,
    },
    /// Show processing statistics across all jobs
    Stats,
    /// Recent processing jobs
    Jobs {
        /// Max rows to display
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Import { url, output } => {
            let sheet = sheets::SheetRef::parse(&url)?;
            println!("Downloading document {}...", sheet.doc_id);
            let bytes = sheets::download_export(&sheet).await?;
            std::fs::write(&output, &bytes)?;
            println!("Saved {} bytes to {}", bytes.len(), output.display());
            Ok(())
        }
        Commands::Process {
            input,
            output,
            product,
            period,
        } => {
            let grid = workbook::read_grid(&input)?;
            let output = output.unwrap_or_else(|| month::output_path(&input));
            let period = resolve_period(period, &input);
            run_job(&input.display().to_string(), grid, &output, &product, &period)
        }
        Commands::Run {
            url,
            output,
            product,
            period,
        } => {
            let sheet = sheets::SheetRef::parse(&url)?;
            println!("Downloading document {}...", sheet.doc_id);
            let bytes = sheets::download_export(&sheet).await?;
            let grid = workbook::read_grid_from_bytes(&bytes)?;
            let period = period.unwrap_or_else(|| month::current_period().display());
            run_job(&url, grid, &output, &product, &period)
        }
        Commands::Stats => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let s = db::get_stats(&conn)?;
            println!("Jobs:       {}", s.total);
            println!("Completed:  {}", s.completed);
            println!("Errors:     {}", s.errors);
            println!("Processing: {}", s.processing);
            println!("Records:    {}", s.records_total);
            println!("Views:      {}", s.views_total);
            Ok(())
        }
        Commands::Jobs { limit } => {
            let conn = db::connect()?;
            db::init_schema(&conn)?;
            let jobs = db::fetch_recent(&conn, limit)?;
            if jobs.is_empty() {
                println!("No jobs yet. Run 'process' or 'run' first.");
                return Ok(());
            }

            println!(
                "{:>4} | {:<10} | {:<28} | {:<12} | {:>7} | {:>9} | {}",
                "#", "Status", "Source", "Period", "Records", "Views", "Created"
            );
            println!("{}", "-".repeat(100));
            for j in &jobs {
                let (records, views) = j
                    .statistics
                    .as_ref()
                    .map(|s| (s.total_rows.to_string(), s.total_views.to_string()))
                    .unwrap_or_else(|| ("-".into(), "-".into()));
                println!(
                    "{:>4} | {:<10} | {:<28} | {:<12} | {:>7} | {:>9} | {}",
                    j.id,
                    j.status,
                    truncate(&j.source, 28),
                    j.period.as_deref().unwrap_or("-"),
                    records,
                    views,
                    j.created_at
                );
                if let Some(err) = &j.error {
                    println!("       {}", truncate(err, 90));
                }
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn resolve_period(explicit: Option<String>, input: &Path) -> String {
    explicit.unwrap_or_else(|| {
        input
            .file_stem()
            .and_then(|s| month::detect_period(&s.to_string_lossy()))
            .unwrap_or_else(month::current_period)
            .display()
    })
}

/// Process one loaded grid end to end, recording the job in the store.
fn run_job(
    source: &str,
    grid: Grid,
    output: &Path,
    product: &str,
    period: &str,
) -> anyhow::Result<()> {
    let conn = db::connect()?;
    db::init_schema(&conn)?;
    let job_id = db::insert_job(&conn, source, product, Some(period).filter(|p| !p.is_empty()))?;
    let t = Instant::now();

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("processing {} rows", grid.len()));

    let cfg = ReportConfig::default();
    let processed = match report::process(&grid, &cfg) {
        Ok(p) => p,
        Err(e) => {
            pb.finish_and_clear();
            db::mark_error(&conn, job_id, &e.to_string())?;
            return Err(e.into());
        }
    };

    let rows = report::assemble::assemble(product, period, &processed.records, &processed.statistics);
    if let Err(e) = workbook::write_report(output, &rows) {
        pb.finish_and_clear();
        db::mark_error(&conn, job_id, &e.to_string())?;
        return Err(e.into());
    }
    pb.finish_and_clear();

    db::mark_completed(
        &conn,
        job_id,
        &output.display().to_string(),
        &processed.statistics,
        &processed.skipped,
        t.elapsed().as_millis() as u64,
    )?;

    let s = &processed.statistics;
    println!(
        "Processed {} records ({} reviews, {} comments, {} active) into {}",
        s.total_rows,
        s.reviews_count,
        s.comments_count,
        s.active_discussions_count,
        output.display()
    );
    println!(
        "Views: {} ({}% of platforms with data), engagement {}%. Skipped {} rows.",
        s.total_views, s.platforms_with_data, s.engagement_rate, processed.skipped.total()
    );
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
