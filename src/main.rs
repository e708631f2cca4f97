mod commands;
mod render;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use moafinder_core::date::parse_date;
use moafinder_core::date_range::{today, DateRange};
use moafinder_core::document::load_events;
use moafinder_core::event::Event;
use moafinder_core::label::Language;
use moafinder_core::moafinder_config::MoafinderConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "moafinder")]
#[command(about = "Resolve and inspect schedules of MoaFinder events")]
struct Cli {
    /// Treat this date (YYYY-MM-DD) as today
    #[arg(long, global = true)]
    today: Option<String>,

    /// Label language (de or en); defaults to the configured language
    #[arg(long, global = true)]
    lang: Option<Language>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List the dates an event takes place on
    Occurrences {
        /// Event file (.json from the events API, or .toml)
        file: PathBuf,

        /// First date to list (YYYY-MM-DD), defaults to today
        #[arg(long)]
        from: Option<String>,

        /// Last date to list (YYYY-MM-DD)
        #[arg(long, conflicts_with = "days")]
        to: Option<String>,

        /// Number of days ahead to list, instead of --to
        #[arg(long)]
        days: Option<i64>,

        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },
    /// Show the expiry date an event gets when it is saved
    Expiry { file: PathBuf },
    /// Print a human-readable schedule label
    Describe { file: PathBuf },
    /// Export occurrences as an iCalendar file
    Ics {
        file: PathBuf,

        #[arg(long)]
        from: Option<String>,

        #[arg(long, conflicts_with = "days")]
        to: Option<String>,

        #[arg(long)]
        days: Option<i64>,

        /// Write one recurring VEVENT with an RRULE instead of one per date
        #[arg(long, conflicts_with_all = ["from", "to", "days"])]
        rrule: bool,
    },
    /// Validate the recurrence fields of an event file
    Check { file: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "moafinder=warn,moafinder_core=warn".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = MoafinderConfig::load()?;

    let today = match cli.today.as_deref() {
        Some(s) => parse_date(s)?,
        None => today(),
    };
    let lang = cli.lang.unwrap_or(config.language);
    tracing::debug!(%today, %lang, horizon_days = config.horizon_days, "settings");

    match cli.command {
        Commands::Occurrences {
            file,
            from,
            to,
            days,
            format,
        } => {
            let events = read_events(&file)?;
            let range = resolve_range(&config, today, from, to, days)?;
            match format {
                Format::Text => commands::occurrences::run(&events, range, today, lang),
                Format::Json => commands::occurrences::run_json(&events, range),
            }
        }
        Commands::Expiry { file } => commands::expiry::run(&read_events(&file)?, today),
        Commands::Describe { file } => commands::describe::run(&read_events(&file)?, lang),
        Commands::Ics {
            file,
            from,
            to,
            days,
            rrule,
        } => {
            let events = read_events(&file)?;
            if rrule {
                commands::ics::run_rrule(&events)
            } else {
                let range = resolve_range(&config, today, from, to, days)?;
                commands::ics::run(&events, range)
            }
        }
        Commands::Check { file } => commands::check::run(&file),
    }
}

fn read_events(file: &Path) -> Result<Vec<Event>> {
    let events =
        load_events(file).with_context(|| format!("Could not read events from {}", file.display()))?;

    if events.is_empty() {
        anyhow::bail!("No events found in {}", file.display());
    }

    Ok(events)
}

fn resolve_range(
    config: &MoafinderConfig,
    today: NaiveDate,
    from: Option<String>,
    to: Option<String>,
    days: Option<i64>,
) -> Result<DateRange> {
    let horizon_days = days.unwrap_or(config.horizon_days);
    if horizon_days < 0 {
        anyhow::bail!("--days must not be negative");
    }

    Ok(DateRange::from_args(
        from.as_deref(),
        to.as_deref(),
        horizon_days,
        today,
    )?)
}
