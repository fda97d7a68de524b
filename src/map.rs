//! Map view configuration for the browser page
//!
//! Turns [`MapSettings`] into the JSON the page hands to Leaflet: base tile
//! layers with their URLs resolved, the initial view, the legend position
//! and whether the plate overlay is drawn.

use serde::{Deserialize, Serialize};

use crate::config::{MapSettings, PlateStyle};

/// A selectable base tile layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseLayer {
    /// Name shown in the layer switcher
    pub name: String,
    /// Style id substituted for `{id}` (e.g. "mapbox/dark-v10")
    pub id: String,
}

impl BaseLayer {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

/// A base layer ready for `L.tileLayer`
#[derive(Debug, Clone, Serialize)]
pub struct TileLayerView {
    pub name: String,
    /// URL template with `{id}` and `{accessToken}` filled in; `{z}/{x}/{y}` remain
    pub url: String,
    pub attribution: String,
    pub max_zoom: u8,
    pub tile_size: u32,
    pub zoom_offset: i32,
}

/// Everything the page needs to set up the map
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    /// `[lat, lon]`
    pub center: [f64; 2],
    pub zoom: u8,
    pub legend_position: String,
    /// The first layer is shown initially
    pub base_layers: Vec<TileLayerView>,
    /// Plate line style when the overlay is on
    pub overlay: Option<PlateStyle>,
    /// Base URL of a separately deployed API, if any
    pub api_endpoint: Option<String>,
}

/// Fill `{id}` and `{accessToken}` in a tile URL template
pub fn resolve_tile_url(template: &str, id: &str, access_token: &str) -> String {
    template
        .replace("{id}", id)
        .replace("{accessToken}", access_token)
}

impl MapView {
    pub fn from_settings(settings: &MapSettings, api_endpoint: Option<String>) -> Self {
        let token = settings.access_token().unwrap_or_default();
        let tiles = &settings.tiles;

        let base_layers = settings
            .base_layers
            .iter()
            .map(|layer| TileLayerView {
                name: layer.name.clone(),
                url: resolve_tile_url(&tiles.url_template, &layer.id, token),
                attribution: tiles.attribution.clone(),
                max_zoom: tiles.max_zoom,
                tile_size: tiles.tile_size,
                zoom_offset: tiles.zoom_offset,
            })
            .collect();

        Self {
            center: settings.center,
            zoom: settings.zoom,
            legend_position: settings.legend_position.clone(),
            base_layers,
            overlay: settings
                .plates
                .as_ref()
                .map(|_| settings.plate_style.clone()),
            api_endpoint,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_tile_url() {
        let url = resolve_tile_url(
            "https://api.mapbox.com/styles/v1/{id}/tiles/{z}/{x}/{y}?access_token={accessToken}",
            "mapbox/dark-v10",
            "pk.abc",
        );
        assert_eq!(
            url,
            "https://api.mapbox.com/styles/v1/mapbox/dark-v10/tiles/{z}/{x}/{y}?access_token=pk.abc"
        );
    }

    #[test]
    fn test_view_with_plates() {
        let mut settings = MapSettings::with_plates();
        settings.tiles.access_token = Some("pk.abc".to_string());

        let view = MapView::from_settings(&settings, None);
        let names: Vec<&str> = view.base_layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Satellite", "Dark", "Light"]);
        assert!(view.base_layers[1].url.contains("mapbox/dark-v10"));
        assert!(view.base_layers[1].url.ends_with("access_token=pk.abc"));
        assert_eq!(view.base_layers[0].tile_size, 512);
        assert_eq!(view.base_layers[0].zoom_offset, -1);
        assert_eq!(view.overlay, Some(PlateStyle::default()));
        assert_eq!(view.legend_position, "bottomright");
    }

    #[test]
    fn test_view_single_layer() {
        let view = MapView::from_settings(&MapSettings::single_layer(), Some("http://api".into()));
        assert_eq!(view.base_layers.len(), 1);
        assert!(view.overlay.is_none());
        assert_eq!(view.zoom, 6);
        assert_eq!(view.api_endpoint.as_deref(), Some("http://api"));
        // No token configured
        assert!(view.base_layers[0].url.ends_with("access_token="));
    }
}
