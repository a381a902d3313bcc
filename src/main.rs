mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use vibits::config::VibitsConfig;
use vibits::habits::{ActivityMode, RangeKind};
use vibits::logging::{BufferLayer, LogBuffer, LogEntry};
use vibits::prefs::{self, RECENT_LOGS_KEY};

#[derive(Parser)]
#[command(name = "vibits", version, about = "Memos journal and habit tracker")]
struct Cli {
    /// Config file (defaults to ~/.vibits/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a memo
    Add { content: String },
    /// List memos, newest first
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Import memos from an export file
    Import { file: PathBuf },
    /// Export all memos as JSON
    Export {
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Mirror the server's memos into the local cache
    Sync {
        /// Show the last sync instead of syncing
        #[arg(long)]
        status: bool,
    },
    /// Show or change the habit configuration
    Habits {
        #[command(subcommand)]
        action: HabitsAction,
    },
    /// Show or set the habits done on a day
    Check {
        /// `today`, `yesterday`, or YYYY-MM-DD
        date: String,
        /// Habits done that day (tags or labels); others are marked not done
        tags: Vec<String>,
        /// Mark every habit as not done
        #[arg(long, conflicts_with = "tags")]
        clear: bool,
    },
    /// Render the activity grid
    Activity {
        /// week, month, quarter, or year
        #[arg(long)]
        range: Option<RangeKind>,
        /// Any date inside the range to show
        #[arg(long)]
        date: Option<String>,
        /// habits or posts
        #[arg(long)]
        mode: Option<ActivityMode>,
        /// Restrict the grid to one habit
        #[arg(long)]
        habit: Option<String>,
    },
    /// Print recent log entries
    Logs {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Delete all local memos
    Reset {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum HabitsAction {
    /// Show configured habits
    Show,
    /// Save a new configuration from `label | tag | #color` lines
    Set { lines: Vec<String> },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => VibitsConfig::load_from(path)?,
        None => VibitsConfig::load()?,
    };

    // Reload the log tail from the previous runs before anything logs.
    let history: Vec<LogEntry> =
        cli::with_prefs(&config, |store| Ok(prefs::load_json(store, RECENT_LOGS_KEY)?))
            .ok()
            .flatten()
            .unwrap_or_default();
    let logs = LogBuffer::with_entries(config.logging.buffer_capacity, history);

    // Terminal output goes to stderr so stdout stays clean for `export`.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(filter),
        )
        .with(BufferLayer::new(logs.clone()).with_filter(LevelFilter::INFO))
        .init();

    let result = run(cli.command, &config, &logs).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "command failed");
    }

    if let Err(e) = cli::with_prefs(&config, |store| {
        Ok(prefs::save_json(store, RECENT_LOGS_KEY, &logs.snapshot())?)
    }) {
        tracing::debug!(error = %e, "could not persist log history");
    }

    result
}

async fn run(command: Command, config: &VibitsConfig, logs: &LogBuffer) -> Result<()> {
    match command {
        Command::Add { content } => cli::add::add(config, &content).await,
        Command::List { limit } => cli::list::list(config, limit),
        Command::Import { file } => cli::import::import(config, &file).await,
        Command::Export { output } => cli::export::export(config, output.as_deref()),
        Command::Sync { status: true } => cli::sync::status(config),
        Command::Sync { status: false } => cli::sync::sync(config).await,
        Command::Habits { action } => match action {
            HabitsAction::Show => cli::habits::show(config),
            HabitsAction::Set { lines } => cli::habits::set(config, &lines).await,
        },
        Command::Check { date, tags, clear } => cli::check::check(config, &date, &tags, clear).await,
        Command::Activity {
            range,
            date,
            mode,
            habit,
        } => {
            let args = cli::activity::ActivityArgs {
                range,
                date,
                mode,
                habit,
            };
            cli::activity::activity(config, args).await
        }
        Command::Logs { limit } => cli::logs::logs(logs, limit),
        Command::Reset { yes } => cli::reset::reset(config, yes),
    }
}
