use std::path::PathBuf;

use clap::Parser;
use roster_reconcile::config::ReconcileConfig;
use roster_reconcile::report::DEFAULT_SAMPLE_SIZE;
use roster_reconcile::sync::{self, Outcome};
use roster_reconcile::{ReconcileError, Result};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging() {
        eprintln!("error: {error}");
    }

    let json = cli.json;
    let outcome = sync::run(&cli.into_config());

    if !outcome.success {
        eprintln!("error: {}", outcome.message);
        eprintln!("\nProcess failed. Please check the messages above.");
        std::process::exit(1);
    }

    if let Err(error) = print_outcome(&outcome, json) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn print_outcome(outcome: &Outcome, json: bool) -> Result<()> {
    if json {
        if let Some(report) = &outcome.report {
            println!("{}", report.to_json()?);
        }
        return Ok(());
    }

    if let Some(report) = &outcome.report {
        print!("{}", report.render());
    }
    println!("\n{}", outcome.message);
    println!("\nProcess completed successfully!");
    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| ReconcileError::Logging(error.to_string()))
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Copy user names from an HC report into a laptop hostname inventory by login ID."
)]
struct Cli {
    /// Directory holding `HC Report.xlsx` and `Laptop Hostname.xlsx`.
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Reference workbook, overriding the one in --dir.
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Target workbook, overriding the one in --dir. Updated in place.
    #[arg(long)]
    target: Option<PathBuf>,

    /// Backup location. Defaults to the target name with a `_backup` suffix.
    #[arg(long)]
    backup: Option<PathBuf>,

    /// Number of updated records to show in the summary.
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
    sample_size: usize,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn into_config(self) -> ReconcileConfig {
        let defaults = ReconcileConfig::in_directory(&self.dir);
        let reference = self.reference.unwrap_or(defaults.reference);
        let target = self.target.unwrap_or(defaults.target);
        let mut config = ReconcileConfig::new(reference, target);
        if let Some(backup) = self.backup {
            config = config.with_backup(backup);
        }
        config.with_sample_size(self.sample_size)
    }
}
