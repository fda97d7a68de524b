//! Standalone HTML export
//!
//! Writes the map page as one self-contained file: the embedded page shell
//! with its script and stylesheet inlined and the loaded layers attached as
//! `window.QUAKEMAP_DATA`, so the page needs no server.

use std::io::Write;

use serde::Serialize;
use thiserror::Error;

use crate::layers::{EarthquakeLayer, MapData, PlateLayer};
use crate::legend::{Legend, LegendView};
use crate::map::MapView;
use crate::web::asset_text;

const STYLE_TAG: &str = r#"<link rel="stylesheet" href="style.css">"#;
const SCRIPT_TAG: &str = r#"<script src="app.js"></script>"#;

/// Errors that can occur while writing an export
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write map: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize map data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Page shell is missing {0}")]
    MissingAsset(&'static str),
}

/// Everything the page would otherwise request from the API
#[derive(Debug, Serialize)]
pub struct PageData<'a> {
    pub config: &'a MapView,
    pub legend: LegendView,
    pub earthquakes: Option<&'a EarthquakeLayer>,
    pub plates: Option<&'a PlateLayer>,
}

/// Render a self-contained HTML page
pub fn render_standalone_html(view: &MapView, data: &MapData) -> Result<String, ExportError> {
    let index = asset_text("index.html").ok_or(ExportError::MissingAsset("index.html"))?;
    let script = asset_text("app.js").ok_or(ExportError::MissingAsset("app.js"))?;
    let style = asset_text("style.css").ok_or(ExportError::MissingAsset("style.css"))?;

    if !index.contains(STYLE_TAG) {
        return Err(ExportError::MissingAsset("the stylesheet link"));
    }
    if !index.contains(SCRIPT_TAG) {
        return Err(ExportError::MissingAsset("the script tag"));
    }

    let page = PageData {
        config: view,
        legend: Legend::build().into_view(),
        earthquakes: data.earthquakes.as_ref(),
        plates: data.plates.as_ref(),
    };
    // No raw "<" inside the inline script: "</script>" and "<!--" both derail the HTML parser
    let json = serde_json::to_string(&page)?.replace('<', "\\u003c");

    let inline_style = format!("<style>\n{}\n</style>", style);
    let inline_script = format!(
        "<script>window.QUAKEMAP_DATA = {};</script>\n<script>\n{}\n</script>",
        json, script
    );

    Ok(index
        .replace(STYLE_TAG, &inline_style)
        .replace(SCRIPT_TAG, &inline_script))
}

/// Write a self-contained HTML page to the given writer
pub fn write_standalone_html<W: Write>(
    view: &MapView,
    data: &MapData,
    writer: &mut W,
) -> Result<(), ExportError> {
    let html = render_standalone_html(view, data)?;
    writer.write_all(html.as_bytes())?;
    writer.flush()?;
    Ok(())
}
