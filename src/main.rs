use alexandria::analyze;
use alexandria::extract::{self, ScanConfig};
use alexandria::report;
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "alexandria")]
#[command(about = "Extract and checksum-validate ISBNs from Wikipedia dumps")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan Wikipedia dumps and write a report plus a failures CSV
    Scan(ScanArgs),
    /// Analyze a failures CSV produced by a previous scan
    Analyze(AnalyzeArgs),
}

#[derive(Args)]
struct ScanArgs {
    /// Directory containing Wikipedia dump files (*.bz2)
    #[arg(short, long)]
    dumps_dir: PathBuf,

    /// Output directory for the report and failures CSV
    #[arg(short, long)]
    output: PathBuf,

    /// Characters of context captured around a failed ISBN
    #[arg(long, default_value_t = alexandria::config::DEFAULT_CONTEXT_CHARS)]
    context: usize,

    /// Maximum characters between "ISBN" and the number
    #[arg(long, default_value_t = alexandria::config::DEFAULT_PROXIMITY)]
    proximity: usize,

    /// Number of parallel workers (0 = all available cores)
    #[arg(long, default_value_t = 1)]
    workers: usize,

    /// Base name for the report and CSV files
    #[arg(long, default_value = "isbn_report")]
    output_prefix: String,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// Path to a failures CSV from a previous scan
    #[arg(short, long)]
    csv: PathBuf,

    /// Number of top offending articles to list
    #[arg(long, default_value_t = 10)]
    top: usize,
}

fn run_scan(args: ScanArgs) -> Result<()> {
    let files = extract::discover_dumps(&args.dumps_dir)?;
    info!(files = files.len(), "Found dump files");

    fs::create_dir_all(&args.output).with_context(|| {
        format!("Failed to create output directory: {}", args.output.display())
    })?;

    let config = ScanConfig {
        context_chars: args.context,
        proximity: args.proximity,
        workers: args.workers,
    };

    let start = Instant::now();
    let aggregate = extract::scan_dumps(&files, &config)?;
    let elapsed_secs = start.elapsed().as_secs_f64();

    println!();
    println!("=== Summary ===");
    println!("Dumps processed:    {}", aggregate.processed_files.len());
    println!("Dumps failed:       {}", aggregate.failed_files.len());
    println!("Articles processed: {}", aggregate.articles_seen);
    println!("With ISBNs:         {}", aggregate.articles_with_isbns);
    println!("Total ISBNs found:  {}", aggregate.total_count);
    println!("Valid ISBNs:        {}", aggregate.valid_count);
    println!("Invalid ISBNs:      {}", aggregate.invalid_count);
    println!("Unique ISBNs:       {}", aggregate.unique_count());
    println!("Pass rate:          {:.2}%", aggregate.pass_rate() * 100.0);
    println!("Total time:         {:.2}s", elapsed_secs);

    let report_path = args.output.join(format!("{}.txt", args.output_prefix));
    report::save_report(&aggregate, elapsed_secs, &report_path)?;
    println!();
    println!("Detailed report saved to: {}", report_path.display());

    if aggregate.invalid_count > 0 {
        let csv_path = args.output.join(format!("{}.csv", args.output_prefix));
        report::save_failures_csv(&aggregate, &csv_path)?;
        println!("Failed ISBNs saved to: {}", csv_path.display());
    } else {
        println!("No failed ISBNs found - CSV not created");
    }

    Ok(())
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let analysis = analyze::analyze_failures_csv(&args.csv, args.top)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    analyze::write_analysis(&mut out, &analysis)?;
    out.flush().context("Failed to flush analysis output")?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let result = match cli.command {
        Commands::Scan(args) => run_scan(args),
        Commands::Analyze(args) => run_analyze(args),
    };

    match result {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
