use anyhow::Context;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;

use urania::{
    compute_chart, render_summary, BirthData, ChartResult, GeoLocation, LocationResolver,
    PositionCalculator, PositionProvider, SwetestProvider, TimeZoneInfo,
};
use urania_config::{ProviderKind, Settings};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Planets, houses and aspects in the chart text layout.
    Text,
    /// Location, zone and chart as one JSON object.
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Compute a natal chart")]
struct Args {
    /// Birth date as DD.MM.YYYY.
    #[arg(long)]
    date: String,

    /// Local birth time as HH:MM or HH:MM:SS.
    #[arg(long)]
    time: String,

    /// Birth place, optionally followed by ", country".
    #[arg(long)]
    location: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Settings file (default: configs/urania.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// House system override, e.g. `placidus`.
    #[arg(long)]
    house_system: Option<String>,

    /// Log at debug level (RUST_LOG still wins when set).
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct ChartReport<'a> {
    location: &'a GeoLocation,
    timezone: &'a TimeZoneInfo,
    chart: &'a ChartResult,
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn build_provider(settings: &Settings) -> anyhow::Result<Box<dyn PositionProvider>> {
    match settings.ephemeris.provider {
        ProviderKind::Swetest => Ok(Box::new(SwetestProvider::new(
            settings.ephemeris.swetest_path.clone(),
            settings.ephemeris.ephemeris_path.clone(),
        ))),
        #[cfg(feature = "swisseph")]
        ProviderKind::Swisseph => {
            let provider = urania::ephemeris::SwissEphemerisProvider::new(
                settings.ephemeris.ephemeris_path.clone(),
            )?;
            Ok(Box::new(provider))
        }
        #[cfg(not(feature = "swisseph"))]
        ProviderKind::Swisseph => {
            anyhow::bail!("provider \"swisseph\" requires building with --features swisseph")
        }
    }
}

fn render(args: &Args, report: &ChartReport<'_>) -> anyhow::Result<String> {
    match args.format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(report).context("Failed to serialize chart")
        }
        OutputFormat::Text => {
            let mut out = format!(
                "Location: {} ({:.4}, {:.4})\nTime zone: {} ({})\n",
                report.location.display_name,
                report.location.lat,
                report.location.lon,
                report.timezone.name,
                report.timezone.label,
            );
            out.push_str(&render_summary(report.chart));
            Ok(out)
        }
    }
}

fn run(args: &Args) -> anyhow::Result<String> {
    let settings = urania_config::load_settings(args.config.as_deref())?;

    let birth = BirthData::parse(&args.date, &args.time, &args.location)?;

    let resolver = LocationResolver::new(
        settings.location_database()?,
        settings.location.closest_match_radius,
    );
    let mut ephemeris = settings.ephemeris_settings();
    if let Some(system) = &args.house_system {
        ephemeris.house_system = system.to_lowercase();
    }
    let calculator = PositionCalculator::new(build_provider(&settings)?, ephemeris);

    let (chart, location, timezone) =
        compute_chart(&birth, &resolver, &calculator, &settings.aspect_settings()?)?;
    if chart.is_placeholder() {
        log::warn!("Chart positions are unavailable; showing a placeholder chart");
    }
    render(
        args,
        &ChartReport {
            location: &location,
            timezone: &timezone,
            chart: &chart,
        },
    )
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    let output = run(&args)?;
    println!("{}", output);
    Ok(())
}
