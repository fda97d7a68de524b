//! Styled map layers
//!
//! Converts fetched feature collections into JSON-serializable layers: one
//! styled circle per earthquake, and the plate boundaries passed through
//! with a single line style.

use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Value};
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::config::{MapSettings, PlateStyle};
use crate::feed::FeedLoader;
use crate::style::{self, Style, StyleMapper};

/// One earthquake, ready to draw as a circle marker
#[derive(Debug, Clone, Serialize)]
pub struct StyledPoint {
    pub id: Option<String>,
    /// `[lon, lat]` as in GeoJSON
    pub coordinates: [f64; 2],
    /// Coerced magnitude, `None` when it isn't a number
    pub magnitude: Option<f64>,
    pub place: Option<String>,
    /// Index into the color buckets
    pub bucket: usize,
    pub style: Style,
    /// Popup HTML, only when the feature names a place
    pub popup: Option<String>,
}

impl StyledPoint {
    /// Style a point feature; other geometries yield `None`
    pub fn from_feature(feature: &Feature, mapper: &StyleMapper) -> Option<Self> {
        let coordinates = match feature.geometry.as_ref().map(|g| &g.value) {
            Some(Value::Point(position)) if position.len() >= 2 => [position[0], position[1]],
            _ => return None,
        };

        let magnitude = style::feature_magnitude(feature);

        Some(Self {
            id: feature.id.as_ref().map(|id| match id {
                Id::String(s) => s.clone(),
                Id::Number(n) => n.to_string(),
            }),
            coordinates,
            magnitude: magnitude.is_finite().then_some(magnitude),
            place: style::feature_place(feature).map(str::to_string),
            bucket: mapper.classify(magnitude),
            style: mapper.style_for_magnitude(magnitude),
            popup: style::popup_text(feature),
        })
    }
}

/// All earthquakes of one feed
#[derive(Debug, Clone, Serialize)]
pub struct EarthquakeLayer {
    pub points: Vec<StyledPoint>,
    /// Features that weren't points and so aren't drawn
    pub skipped: usize,
}

impl EarthquakeLayer {
    pub fn build(collection: &FeatureCollection, mapper: &StyleMapper) -> Self {
        let styled: Vec<Option<StyledPoint>> = collection
            .features
            .par_iter()
            .map(|f| StyledPoint::from_feature(f, mapper))
            .collect();

        let total = styled.len();
        let points: Vec<StyledPoint> = styled.into_iter().flatten().collect();
        let skipped = total - points.len();

        debug!(points = points.len(), skipped, "earthquake layer built");

        Self { points, skipped }
    }
}

/// Plate boundaries, drawn as-is with one style and no popups
#[derive(Debug, Clone, Serialize)]
pub struct PlateLayer {
    pub style: PlateStyle,
    pub geojson: FeatureCollection,
}

impl PlateLayer {
    pub fn new(geojson: FeatureCollection, style: PlateStyle) -> Self {
        Self { style, geojson }
    }
}

/// The layers that loaded successfully
#[derive(Debug, Clone, Default, Serialize)]
pub struct MapData {
    pub earthquakes: Option<EarthquakeLayer>,
    pub plates: Option<PlateLayer>,
}

impl MapData {
    /// Fetch both feeds concurrently and style whatever arrives
    pub async fn load(loader: &FeedLoader, settings: &MapSettings) -> Self {
        let (earthquakes, plates) = loader
            .fetch_both(&settings.earthquakes, settings.plates.as_ref())
            .await;

        Self {
            earthquakes: earthquakes.map(|c| EarthquakeLayer::build(&c, &settings.style)),
            plates: plates.map(|c| PlateLayer::new(c, settings.plate_style.clone())),
        }
    }
}
