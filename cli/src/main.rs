use anyhow::{bail, Context, Result};
use astrotime_core::config::Config;
use astrotime_core::solar::solar_elevation;
use astrotime_core::{Location, SolarEvent, SolarEventCalculator};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(author, version, about = "Next sunrise, sunset and twilight times", long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/astrotime/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug, Clone, Copy)]
struct LocationArgs {
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Next occurrence of each event after a reference time
    Next {
        #[command(flatten)]
        location: LocationArgs,
        /// RFC 3339 reference time, e.g. 2014-11-01T00:00:00+11:00 (default: now)
        #[arg(long)]
        at: Option<String>,
        /// Twilight depression in degrees for dawn and dusk
        #[arg(long)]
        depression: Option<f64>,
        #[arg(long)]
        json: bool,
        #[arg(value_enum)]
        events: Vec<EventKind>,
    },
    /// Dawn, sunrise, solar noon, sunset and dusk for one local solar day
    ///
    /// The date names the local mean solar day at the location, not a UTC day, so
    /// far east or west of Greenwich some times fall on the neighbouring UTC date.
    Day {
        #[command(flatten)]
        location: LocationArgs,
        /// YYYY-MM-DD local solar day (default: today, UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        depression: Option<f64>,
        #[arg(long)]
        json: bool,
    },
    /// Solar elevation in degrees
    Elevation {
        #[command(flatten)]
        location: LocationArgs,
        #[arg(long)]
        at: Option<String>,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum EventKind {
    Dawn,
    Sunrise,
    Sunset,
    Dusk,
}

impl EventKind {
    fn event(self, depression: f64) -> SolarEvent {
        match self {
            EventKind::Dawn => SolarEvent::Dawn(depression),
            EventKind::Sunrise => SolarEvent::Sunrise,
            EventKind::Sunset => SolarEvent::Sunset,
            EventKind::Dusk => SolarEvent::Dusk(depression),
        }
    }
}

#[derive(Serialize)]
struct NextEntry {
    #[serde(flatten)]
    event: SolarEvent,
    at: DateTime<FixedOffset>,
}

#[derive(Serialize)]
struct DayReport {
    date: NaiveDate,
    location: Location,
    dawn: Option<DateTime<Utc>>,
    sunrise: Option<DateTime<Utc>>,
    solar_noon: Option<DateTime<Utc>>,
    sunset: Option<DateTime<Utc>>,
    dusk: Option<DateTime<Utc>>,
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("astrotime").join("config.toml"))
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => match default_config_path() {
            Some(path) if path.exists() => Config::load_from_file(&path)
                .with_context(|| format!("Failed to load config {}", path.display())),
            _ => Ok(Config::default()),
        },
    }
}

fn log_level(verbose: u8, configured: &str) -> Level {
    match verbose {
        0 => configured.parse().unwrap_or(Level::WARN),
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn resolve_location(args: LocationArgs, config: &Config) -> Result<Location> {
    match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => Ok(Location::new(lat, lon)?),
        (None, None) => match config.location() {
            Some(location) => Ok(location?),
            None => bail!("No location given: pass --lat and --lon or set [location] in the config"),
        },
        _ => bail!("--lat and --lon must be given together"),
    }
}

fn resolve_reference(at: Option<&str>) -> Result<DateTime<FixedOffset>> {
    match at {
        Some(s) => DateTime::parse_from_rfc3339(s).with_context(|| format!("Invalid --at time '{}'", s)),
        None => Ok(Local::now().fixed_offset()),
    }
}

fn format_time(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S %:z").to_string(),
        None => "none".to_string(),
    }
}

fn run_next(
    calc: &SolarEventCalculator,
    location: &Location,
    reference: DateTime<FixedOffset>,
    depression: f64,
    events: &[EventKind],
    json: bool,
) -> Result<()> {
    let kinds: Vec<EventKind> = if events.is_empty() {
        vec![EventKind::Dawn, EventKind::Sunrise, EventKind::Sunset, EventKind::Dusk]
    } else {
        events.to_vec()
    };

    let mut entries = Vec::with_capacity(kinds.len());
    for kind in kinds {
        let event = kind.event(depression);
        let at = calc
            .next(&reference, location, event)
            .with_context(|| format!("Could not find next {}", event))?;
        entries.push(NextEntry { event, at });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        println!("Location:   {}", location);
        println!("Reference:  {}", reference.format("%Y-%m-%d %H:%M:%S %:z"));
        for entry in &entries {
            println!("{:<18} {}", entry.event.to_string(), entry.at.format("%Y-%m-%d %H:%M:%S %:z"));
        }
    }

    Ok(())
}

fn run_day(
    calc: &SolarEventCalculator,
    location: Location,
    date: NaiveDate,
    depression: f64,
    json: bool,
) -> Result<()> {
    let report = DayReport {
        date,
        location,
        dawn: calc.dawn_on(date, &location, depression),
        sunrise: calc.sunrise_on(date, &location),
        solar_noon: calc.solar_noon_on(date, &location),
        sunset: calc.sunset_on(date, &location),
        dusk: calc.dusk_on(date, &location, depression),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("--- {} at {} ---", report.date, report.location);
        println!("Dawn ({}°):  {}", depression, format_time(report.dawn));
        println!("Sunrise:      {}", format_time(report.sunrise));
        println!("Solar noon:   {}", format_time(report.solar_noon));
        println!("Sunset:       {}", format_time(report.sunset));
        println!("Dusk ({}°):  {}", depression, format_time(report.dusk));
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(cli.verbose, &config.general.log_level))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Setting default subscriber failed")?;

    let calc = config.calculator();
    debug!("Using {:?}", calc);

    let twilight = |depression: Option<f64>| -> Result<f64> {
        let depression = depression.unwrap_or(config.calculator.twilight_depression);
        if !(0.0..90.0).contains(&depression) {
            bail!("Depression {} is outside [0, 90)", depression);
        }
        Ok(depression)
    };

    match cli.command {
        Commands::Next { location, at, depression, json, events } => {
            let location = resolve_location(location, &config)?;
            let reference = resolve_reference(at.as_deref())?;
            run_next(&calc, &location, reference, twilight(depression)?, &events, json)
        }
        Commands::Day { location, date, depression, json } => {
            let location = resolve_location(location, &config)?;
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            run_day(&calc, location, date, twilight(depression)?, json)
        }
        Commands::Elevation { location, at } => {
            let location = resolve_location(location, &config)?;
            let reference = resolve_reference(at.as_deref())?;
            let elevation = solar_elevation(reference.with_timezone(&Utc), &location, calc.model());
            if elevation < -18.0 {
                warn!("Sun is below astronomical twilight");
            }
            println!("{:.2}°", elevation);
            Ok(())
        }
    }
}
