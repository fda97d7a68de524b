//! Configuration file support for quakemap
//!
//! This module handles parsing `.quakemap.toml` configuration files and
//! resolving them, together with command-line overrides, into the
//! [`MapSettings`] that drive the map.
//!
//! ## Configuration File Format
//!
//! ```toml
//! # .quakemap.toml
//!
//! [feeds]
//! earthquakes = "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_month.geojson"
//! plates = "data/PB2002_plates.json"   # URL or local file
//! # false = single street map, no plate overlay
//! overlay = true
//!
//! [style]
//! radius_scale = 5.0
//! fill_opacity = 0.65
//! # Where magnitudes <= 0 go: "highest" (5+) or "lowest" (0-1)
//! non_positive = "highest"
//!
//! [plates_style]
//! color = "#ff7800"
//!
//! [tiles]
//! access_token = "pk.your-token"
//! max_zoom = 18
//!
//! [[base_layers]]
//! name = "Dark"
//! id = "mapbox/dark-v10"
//!
//! [view]
//! center = [17.99, -10.78]
//! zoom = 3
//! legend_position = "bottomright"
//! ```
//!
//! Sections that are left out fall back to a preset chosen by
//! `feeds.overlay`: the world map with plates, or the single street map.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::feed::FeedSource;
use crate::map::BaseLayer;
use crate::style::{NonPositivePolicy, StyleMapper};

/// USGS feed of all earthquakes in the past month
pub const DEFAULT_EARTHQUAKE_FEED: &str =
    "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/all_month.geojson";

/// PB2002 plate boundaries
pub const DEFAULT_PLATE_FEED: &str =
    "https://raw.githubusercontent.com/fraxen/tectonicplates/master/GeoJSON/PB2002_plates.json";

/// Mapbox styles tile endpoint
pub const DEFAULT_TILE_URL: &str =
    "https://api.mapbox.com/styles/v1/{id}/tiles/{z}/{x}/{y}?access_token={accessToken}";

pub const DEFAULT_ATTRIBUTION: &str = "Map data &copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors, Imagery © <a href=\"https://www.mapbox.com/\">Mapbox</a>";

const CONFIG_NAMES: [&str; 2] = [".quakemap.toml", "quakemap.toml"];

/// Corners Leaflet accepts for controls
pub const LEGEND_POSITIONS: [&str; 4] = ["topleft", "topright", "bottomleft", "bottomright"];

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Feed section
#[derive(Debug, Clone, Deserialize)]
pub struct FeedsConfig {
    #[serde(default = "default_earthquake_feed")]
    pub earthquakes: String,

    #[serde(default = "default_plate_feed")]
    pub plates: String,

    /// Draw the plate overlay (and use the world-map preset)
    #[serde(default = "default_overlay")]
    pub overlay: bool,
}

fn default_earthquake_feed() -> String {
    DEFAULT_EARTHQUAKE_FEED.to_string()
}

fn default_plate_feed() -> String {
    DEFAULT_PLATE_FEED.to_string()
}

fn default_overlay() -> bool {
    true
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            earthquakes: default_earthquake_feed(),
            plates: default_plate_feed(),
            overlay: default_overlay(),
        }
    }
}

/// Earthquake point style section. Unset fields come from the preset.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StyleOverrides {
    pub radius_scale: Option<f64>,
    pub fill_opacity: Option<f64>,
    pub stroke_color: Option<String>,
    pub stroke_weight: Option<f64>,
    pub stroke_opacity: Option<f64>,
    pub non_positive: Option<NonPositivePolicy>,
}

/// Plate boundary line style
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlateStyle {
    #[serde(default = "default_plate_color")]
    pub color: String,

    #[serde(default = "default_plate_weight")]
    pub weight: f64,

    #[serde(default = "default_plate_opacity")]
    pub opacity: f64,
}

fn default_plate_color() -> String {
    "#ff7800".to_string()
}

fn default_plate_weight() -> f64 {
    1.0
}

fn default_plate_opacity() -> f64 {
    1.0
}

impl Default for PlateStyle {
    fn default() -> Self {
        Self {
            color: default_plate_color(),
            weight: default_plate_weight(),
            opacity: default_plate_opacity(),
        }
    }
}

/// Tile server section
#[derive(Debug, Clone, Deserialize)]
pub struct TilesConfig {
    #[serde(default = "default_tile_url")]
    pub url_template: String,

    /// Substituted for `{accessToken}` in the URL template
    #[serde(default)]
    pub access_token: Option<String>,

    #[serde(default = "default_max_zoom")]
    pub max_zoom: u8,

    #[serde(default = "default_tile_size")]
    pub tile_size: u32,

    #[serde(default = "default_zoom_offset")]
    pub zoom_offset: i32,

    #[serde(default = "default_attribution")]
    pub attribution: String,
}

fn default_tile_url() -> String {
    DEFAULT_TILE_URL.to_string()
}

fn default_max_zoom() -> u8 {
    18
}

fn default_tile_size() -> u32 {
    512
}

fn default_zoom_offset() -> i32 {
    -1
}

fn default_attribution() -> String {
    DEFAULT_ATTRIBUTION.to_string()
}

impl Default for TilesConfig {
    fn default() -> Self {
        Self {
            url_template: default_tile_url(),
            access_token: None,
            max_zoom: default_max_zoom(),
            tile_size: default_tile_size(),
            zoom_offset: default_zoom_offset(),
            attribution: default_attribution(),
        }
    }
}

/// Initial view section. Unset fields come from the preset.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ViewOverrides {
    /// `[lat, lon]`
    pub center: Option<[f64; 2]>,
    pub zoom: Option<u8>,
    pub legend_position: Option<String>,
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct QuakemapConfig {
    #[serde(default)]
    pub feeds: FeedsConfig,

    #[serde(default)]
    pub style: StyleOverrides,

    #[serde(default)]
    pub plates_style: PlateStyle,

    #[serde(default)]
    pub tiles: TilesConfig,

    /// Selectable base layers; empty means the preset's layers
    #[serde(default)]
    pub base_layers: Vec<BaseLayer>,

    #[serde(default)]
    pub view: ViewOverrides,
}

/// Fully resolved map configuration.
///
/// One renderer covers both map variants; the presets differ only in these
/// values.
#[derive(Debug, Clone)]
pub struct MapSettings {
    pub earthquakes: FeedSource,
    /// Plate feed, `None` when the overlay is off
    pub plates: Option<FeedSource>,
    pub style: StyleMapper,
    pub plate_style: PlateStyle,
    pub tiles: TilesConfig,
    pub base_layers: Vec<BaseLayer>,
    /// `[lat, lon]`
    pub center: [f64; 2],
    pub zoom: u8,
    pub legend_position: String,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self::with_plates()
    }
}

impl MapSettings {
    /// Street map of the western US, large circles, no overlay
    pub fn single_layer() -> Self {
        Self {
            plates: None,
            style: StyleMapper::single_layer(),
            base_layers: vec![BaseLayer::new("Light", "mapbox/streets-v11")],
            center: [35.93373001708858, -112.41594924041489],
            zoom: 6,
            ..Self::with_plates()
        }
    }

    /// World map with three base layers and the plate boundary overlay
    pub fn with_plates() -> Self {
        Self {
            earthquakes: FeedSource::parse(DEFAULT_EARTHQUAKE_FEED),
            plates: Some(FeedSource::parse(DEFAULT_PLATE_FEED)),
            style: StyleMapper::with_plates(),
            plate_style: PlateStyle::default(),
            tiles: TilesConfig::default(),
            base_layers: vec![
                BaseLayer::new("Satellite", "mapbox/satellite-v9"),
                BaseLayer::new("Dark", "mapbox/dark-v10"),
                BaseLayer::new("Light", "mapbox/streets-v11"),
            ],
            center: [17.999936471282737, -10.783409692796146],
            zoom: 3,
            legend_position: "bottomright".to_string(),
        }
    }

    /// Resolve a raw config against the preset selected by `feeds.overlay`
    pub fn from_config(config: QuakemapConfig) -> Result<Self, ConfigError> {
        let mut settings = if config.feeds.overlay {
            Self::with_plates()
        } else {
            Self::single_layer()
        };

        settings.earthquakes = FeedSource::parse(&config.feeds.earthquakes);
        settings.plates = config
            .feeds
            .overlay
            .then(|| FeedSource::parse(&config.feeds.plates));

        let style = config.style;
        if let Some(scale) = style.radius_scale {
            settings.style.radius_scale = scale;
        }
        if let Some(opacity) = style.fill_opacity {
            settings.style.fill_opacity = opacity;
        }
        if let Some(color) = style.stroke_color {
            settings.style.stroke_color = color;
        }
        if let Some(weight) = style.stroke_weight {
            settings.style.stroke_weight = weight;
        }
        if let Some(opacity) = style.stroke_opacity {
            settings.style.stroke_opacity = opacity;
        }
        if let Some(policy) = style.non_positive {
            settings.style.non_positive = policy;
        }

        settings.plate_style = config.plates_style;
        settings.tiles = config.tiles;

        if !config.base_layers.is_empty() {
            settings.base_layers = config.base_layers;
        }

        if let Some(center) = config.view.center {
            settings.center = center;
        }
        if let Some(zoom) = config.view.zoom {
            settings.zoom = zoom;
        }
        if let Some(position) = config.view.legend_position {
            settings.legend_position = position;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scale = self.style.radius_scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "radius_scale must be a positive number, got {}",
                scale
            )));
        }

        let opacities = [
            ("style.fill_opacity", self.style.fill_opacity),
            ("style.stroke_opacity", self.style.stroke_opacity),
            ("plates_style.opacity", self.plate_style.opacity),
        ];
        for (name, value) in opacities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be between 0 and 1, got {}",
                    name, value
                )));
            }
        }

        if self.base_layers.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one base layer is required".to_string(),
            ));
        }

        if !LEGEND_POSITIONS.contains(&self.legend_position.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "view.legend_position must be one of {}, got {:?}",
                LEGEND_POSITIONS.join(", "),
                self.legend_position
            )));
        }

        let [lat, lon] = self.center;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(ConfigError::Invalid(format!(
                "view.center [{}, {}] is not a valid [lat, lon]",
                lat, lon
            )));
        }

        Ok(())
    }

    /// The access token, if one is set and non-empty
    pub fn access_token(&self) -> Option<&str> {
        self.tiles
            .access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }
}

/// Load configuration from a directory, searching it and its parents
/// for `.quakemap.toml` or `quakemap.toml`.
pub fn load_config(start_path: &Path) -> Result<QuakemapConfig, ConfigError> {
    match find_config_file(start_path) {
        Some(path) => load_config_file(&path),
        None => Ok(QuakemapConfig::default()),
    }
}

/// Load a specific configuration file
pub fn load_config_file(path: &Path) -> Result<QuakemapConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: QuakemapConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Find the config file by searching up the directory tree
pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
    let mut current = if start_path.is_file() {
        start_path.parent()?.to_path_buf()
    } else {
        start_path.to_path_buf()
    };

    loop {
        for name in &CONFIG_NAMES {
            let config_path = current.join(name);
            if config_path.exists() {
                return Some(config_path);
            }
        }

        // Move to parent directory
        if let Some(parent) = current.parent() {
            current = parent.to_path_buf();
        } else {
            break;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_plate_preset() {
        let settings = MapSettings::from_config(QuakemapConfig::default()).unwrap();
        assert_eq!(settings.style.radius_scale, 5.0);
        assert_eq!(settings.style.fill_opacity, 0.65);
        assert_eq!(settings.base_layers.len(), 3);
        assert_eq!(settings.base_layers[0].name, "Satellite");
        assert_eq!(settings.zoom, 3);
        assert_eq!(
            settings.plates,
            Some(FeedSource::Url(DEFAULT_PLATE_FEED.to_string()))
        );
        assert_eq!(settings.legend_position, "bottomright");
    }

    #[test]
    fn test_overlay_off_selects_single_layer_preset() {
        let toml = r#"
            [feeds]
            overlay = false
        "#;

        let config: QuakemapConfig = toml::from_str(toml).unwrap();
        let settings = MapSettings::from_config(config).unwrap();
        assert!(settings.plates.is_none());
        assert_eq!(settings.style.radius_scale, 10.0);
        assert_eq!(settings.style.fill_opacity, 0.75);
        assert_eq!(settings.base_layers.len(), 1);
        assert_eq!(settings.zoom, 6);
    }

    #[test]
    fn test_parse_config() {
        let toml = r##"
            [feeds]
            earthquakes = "data/quakes.geojson"

            [style]
            radius_scale = 7.5
            non_positive = "lowest"

            [plates_style]
            color = "#00ffff"

            [tiles]
            access_token = "pk.test"
            tile_size = 256
            zoom_offset = 0

            [[base_layers]]
            name = "Outdoors"
            id = "mapbox/outdoors-v11"

            [view]
            center = [0.0, 0.0]
            zoom = 2
        "##;

        let config: QuakemapConfig = toml::from_str(toml).unwrap();
        let settings = MapSettings::from_config(config).unwrap();

        assert_eq!(
            settings.earthquakes,
            FeedSource::File(PathBuf::from("data/quakes.geojson"))
        );
        assert_eq!(settings.style.radius_scale, 7.5);
        // Unset style fields keep the preset
        assert_eq!(settings.style.fill_opacity, 0.65);
        assert_eq!(settings.style.non_positive, NonPositivePolicy::Lowest);
        assert_eq!(settings.plate_style.color, "#00ffff");
        assert_eq!(settings.plate_style.weight, 1.0);
        assert_eq!(settings.access_token(), Some("pk.test"));
        assert_eq!(settings.tiles.tile_size, 256);
        assert_eq!(settings.tiles.max_zoom, 18);
        assert_eq!(settings.base_layers, vec![BaseLayer::new("Outdoors", "mapbox/outdoors-v11")]);
        assert_eq!(settings.center, [0.0, 0.0]);
        assert_eq!(settings.zoom, 2);
    }

    #[test]
    fn test_invalid_radius_scale() {
        let toml = r#"
            [style]
            radius_scale = 0.0
        "#;

        let config: QuakemapConfig = toml::from_str(toml).unwrap();
        let err = MapSettings::from_config(config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_invalid_opacity() {
        let toml = r#"
            [plates_style]
            opacity = 1.5
        "#;

        let config: QuakemapConfig = toml::from_str(toml).unwrap();
        assert!(MapSettings::from_config(config).is_err());
    }

    #[test]
    fn test_invalid_empty_base_layers() {
        let mut settings = MapSettings::default();
        settings.base_layers.clear();
        assert!(matches!(settings.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_invalid_legend_position() {
        let toml = r#"
            [view]
            legend_position = "middle"
        "#;

        let config: QuakemapConfig = toml::from_str(toml).unwrap();
        let err = MapSettings::from_config(config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        for position in LEGEND_POSITIONS {
            let mut settings = MapSettings::default();
            settings.legend_position = position.to_string();
            assert!(settings.validate().is_ok(), "{}", position);
        }
    }

    #[test]
    fn test_blank_access_token_is_none() {
        let mut settings = MapSettings::default();
        settings.tiles.access_token = Some("  ".to_string());
        assert_eq!(settings.access_token(), None);
    }

    #[test]
    fn test_find_config_in_parent() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            dir.path().join(".quakemap.toml"),
            "[view]\nzoom = 4\n",
        )
        .unwrap();

        let found = find_config_file(&nested).unwrap();
        assert_eq!(found, dir.path().join(".quakemap.toml"));

        let config = load_config(&nested).unwrap();
        assert_eq!(config.view.zoom, Some(4));
    }

    #[test]
    fn test_load_config_file_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quakemap.toml");
        fs::write(&path, "[style\nradius_scale = ").unwrap();

        let err = load_config_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
