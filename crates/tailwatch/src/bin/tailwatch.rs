//! Tailwatch CLI binary.
//!
//! Runs the event study described by a JSON configuration over vendor export
//! files and writes the result workbooks as CSV directories.
//!
//! Usage: `tailwatch --config study.json --dates 2017-05-25..2017-06-09 --esg-years 2010..2024 [--plot]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tailwatch::{
    data::{CsvStore, CsvWorkbookSink, FileProvider, RetryingProvider},
    study::{Study, StudyConfig, StudyResults},
    utils::{DateSelection, YearSelection},
};
use tracing::info;

#[derive(Parser)]
#[command(name = "tailwatch")]
#[command(about = "Abnormal-return event study across countries and broad industries", long_about = None)]
#[command(version)]
struct Cli {
    /// Study configuration (JSON); defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dates to test: a date, a comma-separated list or `start..end`
    #[arg(short, long)]
    dates: DateSelection,

    /// ESG years to test: a year, a comma-separated list or `start..end`
    #[arg(short, long)]
    esg_years: YearSelection,

    /// Also write the ESG series of every group
    #[arg(long)]
    plot: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => StudyConfig::from_path(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => StudyConfig::default(),
    };

    let results = run(&cli, &config)?;
    print_summary(&results);
    println!("\nResults written to {}", config.output_dir.display());
    Ok(())
}

fn run(cli: &Cli, config: &StudyConfig) -> Result<StudyResults> {
    let provider = FileProvider::open(&config.data_dir)
        .with_context(|| format!("opening data directory {}", config.data_dir.display()))?;
    let store = CsvStore::open(&config.cache_dir)
        .with_context(|| format!("opening cache directory {}", config.cache_dir.display()))?;
    let mut sink = CsvWorkbookSink::open(&config.output_dir)
        .with_context(|| format!("opening output directory {}", config.output_dir.display()))?;

    let mut loader = config.loader(RetryingProvider::new(provider, config.retry_policy()), store);
    let study = Study::build(config, &mut loader)?;
    info!(
        countries = study.countries().len(),
        broad_industries = study.broad_industries().len(),
        cache_hits = loader.cache().hits(),
        cache_misses = loader.cache().misses(),
        "study ready"
    );

    Ok(study.execute(&cli.dates, &cli.esg_years, &mut sink, cli.plot)?)
}

fn print_summary(results: &StudyResults) {
    println!("\n{:<40} {:>12}", "Group", "Comparisons");
    println!("{}", "-".repeat(53));
    for group in results.countries.iter().chain(&results.broad_industries) {
        println!("{:<40} {:>12}", group.name, group.report.master().len());
    }
    if let Some(distribution) = &results.distribution {
        println!(
            "\nReturn distribution: {} returns, area under the density {:.4}",
            distribution.n_obs, distribution.area
        );
    }
}
