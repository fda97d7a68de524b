//! # quakemap - Interactive Earthquake Map
//!
//! Draws the USGS earthquake feed on a Leaflet map, one circle per event
//! colored and sized by magnitude, with a magnitude legend, switchable base
//! layers and an optional tectonic plate boundary overlay.
//!
//! ## Usage
//!
//! ```bash
//! # Serve the map on http://localhost:3000
//! MAPBOX_ACCESS_TOKEN=pk.... quakemap
//!
//! # Single street map without the plate overlay
//! quakemap --no-plates
//!
//! # Write a self-contained HTML file instead of serving
//! quakemap -o earthquakes.html
//!
//! # Count events per magnitude band
//! quakemap --summary
//! ```
//!
//! ## Magnitude Scale
//!
//! ```text
//! 0-1  #7FFF00    3-4  #FFD700
//! 1-2  #ADFF2F    4-5  #FFA500
//! 2-3  #FFFF00    5+   #FF4500
//! ```
//!
//! Circle radius is the magnitude times a configurable scale.

pub mod config;
pub mod export;
pub mod feed;
pub mod layers;
pub mod legend;
pub mod map;
pub mod style;
pub mod summary;
pub mod web;

pub use config::{
    ConfigError, FeedsConfig, MapSettings, PlateStyle, QuakemapConfig, StyleOverrides,
    TilesConfig, ViewOverrides, find_config_file, load_config, load_config_file,
};
pub use export::{ExportError, render_standalone_html, write_standalone_html};
pub use feed::{FeedError, FeedLoader, FeedSource, parse_feature_collection};
pub use layers::{EarthquakeLayer, MapData, PlateLayer, StyledPoint};
pub use legend::{Legend, LegendEntry, LegendView};
pub use map::{BaseLayer, MapView, TileLayerView};
pub use style::{
    BUCKETS, ColorBucket, NonPositivePolicy, Style, StyleMapper, classify, classify_with,
    popup_text, radius,
};
pub use summary::{BucketCounts, generate_summary};
