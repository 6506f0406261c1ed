use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{CustomType, Password, Text};
use weather_core::{
    BatchOrchestrator, BatchSummary, Config, FetchMode, FetchOutcome,
    config::{DEFAULT_CONCURRENCY, DEFAULT_ENDPOINT},
    timed,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather report for one or more locations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively store the provider API key and fetch settings.
    Configure,

    /// Fetch and print current weather for each location.
    Report {
        /// Location identifiers (postal codes), e.g. 96801 06447 02115.
        #[arg(required = true)]
        locations: Vec<String>,

        /// Fetch strategy; `compare` runs both and reports each timing.
        #[arg(long, value_enum, default_value_t = ModeArg::Concurrent)]
        mode: ModeArg,

        /// Maximum simultaneous requests in concurrent mode.
        #[arg(long)]
        concurrency: Option<usize>,

        /// Per-request timeout in seconds.
        #[arg(long)]
        timeout: Option<u64>,

        /// Deadline for the whole batch in seconds.
        #[arg(long)]
        batch_timeout: Option<u64>,

        /// Print every measurement instead of a one-line summary.
        #[arg(long)]
        detail: bool,

        /// Provider API key; overrides the stored one.
        #[arg(long, env = "WEATHER_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Sequential,
    Concurrent,
    Compare,
}

impl ModeArg {
    fn modes(self) -> &'static [FetchMode] {
        match self {
            ModeArg::Sequential => &[FetchMode::Sequential],
            ModeArg::Concurrent => &[FetchMode::Concurrent],
            ModeArg::Compare => FetchMode::all(),
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Report {
                locations,
                mode,
                concurrency,
                timeout,
                batch_timeout,
                detail,
                api_key,
            } => {
                let mut config = Config::load()?;
                config.api_key = api_key.or(config.api_key);
                config.concurrency = concurrency.or(config.concurrency);
                config.timeout_secs = timeout.or(config.timeout_secs);
                config.batch_timeout_secs = batch_timeout.or(config.batch_timeout_secs);

                report(&config, &locations, mode, detail).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("Provider API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let endpoint = Text::new("Provider endpoint:")
        .with_default(config.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT))
        .prompt()
        .context("Failed to read endpoint")?;

    let concurrency = CustomType::<usize>::new("Maximum concurrent requests:")
        .with_default(config.concurrency.unwrap_or(DEFAULT_CONCURRENCY))
        .prompt()
        .context("Failed to read concurrency")?;

    config.api_key = Some(api_key);
    config.endpoint = Some(endpoint);
    config.concurrency = Some(concurrency);

    // Refuse to store something that cannot drive a batch.
    config.fetch_settings()?;
    config.save()?;

    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn report(
    config: &Config,
    locations: &[String],
    mode: ModeArg,
    detail: bool,
) -> anyhow::Result<()> {
    let settings = config.fetch_settings()?;
    let orchestrator = BatchOrchestrator::from_settings(&settings)?;

    println!("Weather report, {}", Local::now().format("%Y-%m-%d %H:%M"));

    let mut timings = Vec::new();
    for &fetch_mode in mode.modes() {
        let (elapsed, outcomes) = timed(orchestrator.fetch_all(locations, fetch_mode)).await;
        log::debug!("{fetch_mode} batch finished in {elapsed:?}");

        println!();
        print_outcomes(&outcomes, detail);
        timings.push((fetch_mode, elapsed, BatchSummary::of(&outcomes)));
    }

    println!();
    for (fetch_mode, elapsed, summary) in timings {
        println!(
            "{fetch_mode}: {} ok, {} failed in {} ms",
            summary.successes,
            summary.failures,
            elapsed.as_millis()
        );
    }

    Ok(())
}

fn print_outcomes(outcomes: &[FetchOutcome], detail: bool) {
    for outcome in outcomes {
        match &outcome.result {
            Ok(record) if detail => println!("{}\n", record.detail()),
            Ok(record) => println!("{}", record.summary()),
            Err(e) => eprintln!("{}: {}", outcome.location, error_chain(e)),
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}
