//! Web front end for quakemap
//!
//! Serves the Leaflet page and the JSON it draws from:
//! - map configuration (base layers, view, legend position)
//! - styled earthquake points, fetched per request
//! - plate boundaries, fetched per request
//! - the static magnitude legend

pub mod routes;
pub mod server;

use rust_embed::RustEmbed;

pub use server::{ServerConfig, start_server};

/// Embedded page shell (index.html, app.js, style.css)
#[derive(RustEmbed)]
#[folder = "web-assets/"]
pub struct Assets;

/// An embedded asset as UTF-8 text
pub fn asset_text(path: &str) -> Option<String> {
    Assets::get(path).map(|file| String::from_utf8_lossy(&file.data).into_owned())
}
