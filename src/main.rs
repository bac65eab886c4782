use bankswarm::application::runner::LoadRunner;
use bankswarm::config::{DEFAULT_REQUEST_TIMEOUT, LoadConfig, SeedConfig, parse_duration, parse_seconds};
use bankswarm::domain::operation::Operation;
use bankswarm::domain::ports::BankClientRef;
use bankswarm::domain::task::TaskSet;
use bankswarm::domain::wait::WaitTime;
use bankswarm::infrastructure::http::HttpBankClient;
use bankswarm::infrastructure::recording::CountingBankClient;
use bankswarm::interfaces::csv::seed_writer::SeedWriter;
use bankswarm::interfaces::csv::stats_writer::StatsWriter;
use bankswarm::interfaces::summary::SummaryTable;
use bankswarm::telemetry;
use clap::{Args, Parser, Subcommand};
use miette::{IntoDiagnostic, Result, miette};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fire randomized deposits and withdrawals at a bank API
    Run(RunArgs),
    /// Write seed accounts and transactions as CSV files
    Seed(SeedArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Base URL of the bank API, e.g. http://localhost:8080
    #[arg(long, required_unless_present = "dry_run")]
    host: Option<String>,

    /// Number of concurrent virtual users
    #[arg(short, long, default_value_t = 1)]
    users: usize,

    /// Users started per second
    #[arg(short = 'r', long, default_value_t = 1.0)]
    spawn_rate: f64,

    /// Stop after this long (e.g. 90s, 5m, 1h30m). Runs until Ctrl-C when omitted.
    #[arg(short = 't', long, value_parser = parse_duration)]
    run_time: Option<Duration>,

    /// Stop each user after this many tasks
    #[arg(long)]
    iterations: Option<u64>,

    /// Minimum wait between tasks, in seconds
    #[arg(long, default_value = "1", value_parser = parse_seconds)]
    min_wait: Duration,

    /// Maximum wait between tasks, in seconds
    #[arg(long, default_value = "3", value_parser = parse_seconds)]
    max_wait: Duration,

    /// Relative weight of the deposit task
    #[arg(long, default_value_t = 1)]
    deposit_weight: u32,

    /// Relative weight of the withdraw task
    #[arg(long, default_value_t = 1)]
    withdraw_weight: u32,

    /// Seed for reproducible request streams
    #[arg(long)]
    seed: Option<u64>,

    /// Per-request timeout in seconds, 30 when omitted
    #[arg(long, value_parser = parse_seconds)]
    timeout: Option<Duration>,

    /// Record requests in memory instead of sending them
    #[arg(long)]
    dry_run: bool,

    /// Write endpoint statistics as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Write the full report as JSON
    #[arg(long)]
    json: Option<PathBuf>,
}

impl RunArgs {
    fn load_config(&self) -> bankswarm::error::Result<LoadConfig> {
        Ok(LoadConfig {
            users: self.users,
            spawn_rate: self.spawn_rate,
            run_time: self.run_time,
            iterations: self.iterations,
            wait: WaitTime::between(self.min_wait, self.max_wait)?,
            tasks: TaskSet::new(vec![
                (Operation::Deposit, self.deposit_weight),
                (Operation::Withdraw, self.withdraw_weight),
            ])?,
            seed: self.seed,
            ..Default::default()
        })
    }

    fn client(&self) -> Result<BankClientRef> {
        if self.dry_run {
            info!("Dry run: requests are counted in memory, nothing is sent");
            return Ok(Arc::new(CountingBankClient::new()));
        }
        let host = self
            .host
            .as_deref()
            .ok_or_else(|| miette!("--host is required unless --dry-run is set"))?;
        let timeout = self.timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);
        let client = HttpBankClient::new(host, timeout).into_diagnostic()?;
        Ok(Arc::new(client))
    }
}

#[derive(Args)]
struct SeedArgs {
    /// Number of accounts to generate
    #[arg(long, default_value_t = 100)]
    accounts: u32,

    /// Transactions generated per account
    #[arg(long, default_value_t = 500)]
    transactions_per_account: u32,

    /// Directory receiving accounts.csv and transactions.csv
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing();

    match cli.command {
        Command::Run(args) => run(args).await,
        Command::Seed(args) => seed(args),
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let config = args.load_config().into_diagnostic()?;
    let client = args.client()?;
    let runner = LoadRunner::new(config, client).into_diagnostic()?;

    let handle = runner.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping users");
            handle.shutdown();
        }
    });

    let report = runner.run().await.into_diagnostic()?;

    let stdout = io::stdout();
    SummaryTable::render(&report, &mut stdout.lock()).into_diagnostic()?;

    if let Some(path) = &args.csv {
        let file = File::create(path).into_diagnostic()?;
        StatsWriter::new(file).write_report(&report).into_diagnostic()?;
        info!(path = %path.display(), "Stats CSV written");
    }
    if let Some(path) = &args.json {
        let mut file = BufWriter::new(File::create(path).into_diagnostic()?);
        serde_json::to_writer_pretty(&mut file, &report).into_diagnostic()?;
        file.flush().into_diagnostic()?;
        info!(path = %path.display(), "JSON report written");
    }

    Ok(())
}

fn seed(args: SeedArgs) -> Result<()> {
    let config = SeedConfig {
        accounts: args.accounts,
        transactions_per_account: args.transactions_per_account,
    };
    config.validate().into_diagnostic()?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    fs::create_dir_all(&args.out_dir).into_diagnostic()?;
    let accounts = BufWriter::new(File::create(args.out_dir.join("accounts.csv")).into_diagnostic()?);
    let transactions =
        BufWriter::new(File::create(args.out_dir.join("transactions.csv")).into_diagnostic()?);

    SeedWriter::new(accounts, transactions)
        .write(&config, &mut rng)
        .into_diagnostic()?;
    Ok(())
}
