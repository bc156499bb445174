mod context;
mod csv_input;
mod logging;
mod offers;
mod prices;
mod report;
mod stocks;

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use mktprice_core::{CampaignChoice, ConfigOverrides, DispatchOptions};
use tokio_util::sync::CancellationToken;

use crate::context::{RunContext, RunOutcome};
use crate::logging::LogSettings;
use crate::offers::OffersCommands;
use crate::prices::PricesCommands;
use crate::stocks::StocksCommands;

#[derive(Debug, Parser)]
#[command(name = "mktprice")]
#[command(about = "Bulk price and stock updates for a marketplace seller campaign")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args)]
struct GlobalArgs {
    /// Env file to load instead of config.env / .env
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Which configured campaign to operate on
    #[arg(long, global = true, value_enum, default_value_t = CampaignArg::Main)]
    campaign: CampaignArg,

    /// Campaign id, overriding YANDEX_CAMPAIGN_ID
    #[arg(long, global = true)]
    campaign_id: Option<u64>,

    /// API key, overriding YANDEX_API_KEY
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Log at debug level on the console
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only warnings and errors on the console; one-line summary
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CampaignArg {
    Main,
    Express,
}

impl From<CampaignArg> for CampaignChoice {
    fn from(arg: CampaignArg) -> Self {
        match arg {
            CampaignArg::Main => CampaignChoice::Main,
            CampaignArg::Express => CampaignChoice::Express,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Compute and submit price changes
    Prices {
        #[command(subcommand)]
        command: PricesCommands,
    },
    /// Adjust warehouse stock counts
    Stocks {
        #[command(subcommand)]
        command: StocksCommands,
    },
    /// Read-only catalog operations
    Offers {
        #[command(subcommand)]
        command: OffersCommands,
    },
}

impl Commands {
    /// Short name used for the run-log file.
    fn log_name(&self) -> &'static str {
        match self {
            Commands::Prices {
                command: PricesCommands::Update(_),
            } => "prices_update",
            Commands::Prices {
                command: PricesCommands::FromCsv(_),
            } => "prices_from_csv",
            Commands::Stocks { .. } => "stocks_increase",
            Commands::Offers { .. } => "offers_export",
        }
    }
}

/// Batch flags shared by every mutating command.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct BatchArgs {
    /// Items per API call (default: DEFAULT_BATCH_SIZE)
    #[arg(long, value_parser = parse_batch_size)]
    pub batch_size: Option<usize>,

    /// Seconds to pause between batches (default: DEFAULT_DELAY)
    #[arg(long, value_parser = parse_delay)]
    pub delay: Option<Duration>,

    /// Compute and report changes without submitting them
    #[arg(long)]
    pub dry_run: bool,
}

impl BatchArgs {
    pub(crate) fn dispatch_options(&self, config: &mktprice_core::AppConfig) -> DispatchOptions {
        DispatchOptions {
            batch_size: self.batch_size.unwrap_or(config.default_batch_size),
            delay: self
                .delay
                .unwrap_or(Duration::from_secs(config.default_delay_secs)),
            dry_run: self.dry_run,
        }
    }
}

fn parse_batch_size(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err("batch size must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("invalid batch size '{raw}': {e}")),
    }
}

fn parse_delay(raw: &str) -> Result<Duration, String> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("invalid delay '{raw}': {e}"))?;
    Duration::try_from_secs_f64(secs)
        .map_err(|_| format!("delay must be a non-negative number of seconds, got '{raw}'"))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        api_key: cli.global.api_key.clone(),
        campaign_id: cli.global.campaign_id,
    };
    let config = match mktprice_core::load_app_config(cli.global.env_file.as_deref(), &overrides)
    {
        Ok(config) => config,
        Err(e) => {
            // Env files are already loaded, so the log variables still apply.
            let settings = LogSettings::from_lookup(|var| std::env::var(var).ok());
            if logging::init(&settings, cli.command.log_name(), &cli.global).is_ok() {
                tracing::error!(error = %e, "configuration error");
            }
            eprintln!("error: configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let log_settings = LogSettings::from(&config);
    let log_path = match logging::init(&log_settings, cli.command.log_name(), &cli.global) {
        Ok(path) => path,
        Err(e) => {
            eprintln!("error: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(log = %log_path.display(), ?config, "starting run");

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone());

    match run(cli, config, cancel).await {
        Ok(outcome) => {
            let code = outcome.exit_code();
            tracing::info!(code, "run finished");
            ExitCode::from(code)
        }
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "run failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(
    cli: Cli,
    config: mktprice_core::AppConfig,
    cancel: CancellationToken,
) -> anyhow::Result<RunOutcome> {
    let quiet = cli.global.quiet;
    let ctx = RunContext::new(config, cli.global.campaign.into(), cancel)?;

    match cli.command {
        Commands::Prices {
            command: PricesCommands::Update(args),
        } => prices::update::run_update(&ctx, &args, quiet).await,
        Commands::Prices {
            command: PricesCommands::FromCsv(args),
        } => prices::from_csv::run_from_csv(&ctx, &args, quiet).await,
        Commands::Stocks {
            command: StocksCommands::Increase(args),
        } => stocks::run_increase(&ctx, &args, quiet).await,
        Commands::Offers {
            command: OffersCommands::Export(args),
        } => offers::run_export(&ctx, &args).await,
    }
}

/// Cancels `cancel` on the first Ctrl-C; in-flight requests finish and the
/// remaining batches are reported as cancelled.
fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("interrupt received; stopping after the current request");
                cancel.cancel();
            }
            Err(e) => tracing::error!(error = %e, "failed to install Ctrl-C handler"),
        }
    });
}
