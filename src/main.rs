//! quakemap CLI - Interactive Earthquake Map
//!
//! Serves (or exports) a Leaflet map of recent earthquakes colored by
//! magnitude, over tectonic plate boundaries.
//!
//! Usage:
//!   quakemap [OPTIONS]

use std::fs::File;
use std::io::{BufWriter, stdout};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use quakemap::{
    EarthquakeLayer, FeedLoader, MapData, MapSettings, MapView, QuakemapConfig, generate_summary,
    load_config, load_config_file,
    web::{ServerConfig, start_server},
    write_standalone_html,
};

/// quakemap - Recent earthquakes on an interactive map
#[derive(Parser, Debug)]
#[command(name = "quakemap")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path (default: search for .quakemap.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Earthquake feed URL or GeoJSON file
    #[arg(long, value_name = "SRC")]
    earthquakes: Option<String>,

    /// Plate boundary feed URL or GeoJSON file
    #[arg(long, value_name = "SRC", conflicts_with = "no_plates")]
    plates: Option<String>,

    /// Single street map without the plate overlay
    #[arg(long)]
    no_plates: bool,

    /// Circle radius per unit of magnitude
    #[arg(long, value_name = "F")]
    radius_scale: Option<f64>,

    /// Mapbox access token for the base layer tiles
    #[arg(long, env = "MAPBOX_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Write a self-contained HTML map to this file instead of serving
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print event counts per magnitude band and exit
    #[arg(short, long, conflicts_with = "output")]
    summary: bool,

    /// Port for web server (default: 3000)
    #[arg(long, default_value = "3000")]
    port: u16,

    /// Don't open browser automatically when starting web server
    #[arg(long)]
    no_open: bool,

    /// API endpoint URL for frontend (useful for separate deployments)
    #[arg(long)]
    api_endpoint: Option<String>,

    /// Number of threads for styling features (default: all CPU cores)
    #[arg(long, short = 'j', value_name = "N")]
    jobs: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "quakemap=debug"
    } else {
        "quakemap=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Command-line flags win over the config file
fn apply_overrides(config: &mut QuakemapConfig, args: &Args) {
    if let Some(source) = &args.earthquakes {
        config.feeds.earthquakes = source.clone();
    }
    if let Some(source) = &args.plates {
        config.feeds.plates = source.clone();
        config.feeds.overlay = true;
    }
    if args.no_plates {
        config.feeds.overlay = false;
    }
    if let Some(scale) = args.radius_scale {
        config.style.radius_scale = Some(scale);
    }
    if let Some(token) = &args.access_token {
        config.tiles.access_token = Some(token.clone());
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .unwrap_or_else(|e| warn!(error = %e, "could not set thread count"));
    }

    // Load configuration file
    let mut config = match &args.config {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            load_config_file(path)?
        }
        None => match load_config(&std::env::current_dir()?) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "no config file loaded, using defaults");
                QuakemapConfig::default()
            }
        },
    };
    apply_overrides(&mut config, &args);
    let settings = MapSettings::from_config(config)?;

    if args.summary {
        let rt = tokio::runtime::Runtime::new()?;
        let loader = FeedLoader::new();
        let layer = rt
            .block_on(loader.fetch_or_log("earthquakes", &settings.earthquakes))
            .map(|collection| EarthquakeLayer::build(&collection, &settings.style));

        let mut out = stdout().lock();
        generate_summary(layer.as_ref(), &mut out)?;
        return Ok(());
    }

    if settings.access_token().is_none() {
        warn!("no Mapbox access token (--access-token or MAPBOX_ACCESS_TOKEN); base layer tiles will not load");
    }

    // Standalone export
    if let Some(path) = &args.output {
        let rt = tokio::runtime::Runtime::new()?;
        let data = rt.block_on(MapData::load(&FeedLoader::new(), &settings));
        let view = MapView::from_settings(&settings, args.api_endpoint.clone());

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        write_standalone_html(&view, &data, &mut writer)?;

        eprintln!("Map written to: {}", path.display());
        return Ok(());
    }

    let server_config = ServerConfig {
        port: args.port,
        open_browser: !args.no_open,
        api_endpoint: args.api_endpoint.clone(),
    };

    // Run the web server using tokio runtime
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(start_server(settings, server_config))
        .map_err(|e| -> Box<dyn std::error::Error> { e })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(flags: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("quakemap").chain(flags.iter().copied())).unwrap()
    }

    #[test]
    fn test_plates_flag_enables_overlay() {
        let mut config = QuakemapConfig::default();
        config.feeds.overlay = false;

        apply_overrides(&mut config, &args(&["--plates", "plates.json"]));
        assert!(config.feeds.overlay);
        assert_eq!(config.feeds.plates, "plates.json");
    }

    #[test]
    fn test_no_plates_flag_disables_overlay() {
        let mut config = QuakemapConfig::default();
        apply_overrides(&mut config, &args(&["--no-plates"]));
        assert!(!config.feeds.overlay);

        let settings = MapSettings::from_config(config).unwrap();
        assert!(settings.plates.is_none());
    }

    #[test]
    fn test_feed_and_style_flags() {
        let mut config = QuakemapConfig::default();
        apply_overrides(
            &mut config,
            &args(&[
                "--earthquakes",
                "quakes.geojson",
                "--radius-scale",
                "7",
                "--access-token",
                "pk.test",
            ]),
        );

        assert_eq!(config.feeds.earthquakes, "quakes.geojson");
        assert_eq!(config.style.radius_scale, Some(7.0));
        assert_eq!(config.tiles.access_token.as_deref(), Some("pk.test"));
    }

    #[test]
    fn test_no_flags_keep_config() {
        let mut config = QuakemapConfig::default();
        config.feeds.overlay = false;
        config.style.radius_scale = Some(3.0);

        apply_overrides(&mut config, &args(&[]));
        assert!(!config.feeds.overlay);
        assert_eq!(config.style.radius_scale, Some(3.0));
        assert_eq!(config.feeds.earthquakes, QuakemapConfig::default().feeds.earthquakes);
    }

    #[test]
    fn test_plates_conflicts_with_no_plates() {
        let result = Args::try_parse_from(["quakemap", "--plates", "p.json", "--no-plates"]);
        assert!(result.is_err());
    }
}
