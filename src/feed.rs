//! GeoJSON feed loading
//!
//! Fetches the earthquake and plate-boundary feeds. A feed is either an
//! `http(s)://` URL or a local file. Fetches are one-shot: no retry, no
//! timeout, no caching. A failed feed is logged and dropped without
//! affecting the other one.

use std::fmt;
use std::path::PathBuf;

use geojson::{FeatureCollection, GeoJson};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, error};

static USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Fetch-or-parse failure for a single feed
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to read feed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed GeoJSON: {0}")]
    Parse(#[from] geojson::Error),

    #[error("Expected a FeatureCollection, found a bare {0}")]
    UnexpectedDocument(&'static str),
}

/// Where a feed comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSource {
    Url(String),
    File(PathBuf),
}

impl FeedSource {
    /// `http://` and `https://` values are URLs, anything else is a file path
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.starts_with("http://") || value.starts_with("https://") {
            FeedSource::Url(value.to_string())
        } else {
            FeedSource::File(PathBuf::from(value))
        }
    }
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedSource::Url(url) => write!(f, "{}", url),
            FeedSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Parse a GeoJSON document into a feature collection.
///
/// A single `Feature` is wrapped into a one-element collection.
pub fn parse_feature_collection(text: &str) -> Result<FeatureCollection, FeedError> {
    match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        GeoJson::Feature(feature) => Ok(FeatureCollection {
            bbox: None,
            features: vec![feature],
            foreign_members: None,
        }),
        GeoJson::Geometry(_) => Err(FeedError::UnexpectedDocument("Geometry")),
    }
}

/// Shared HTTP client for feed requests
#[derive(Debug, Clone)]
pub struct FeedLoader {
    client: Client,
}

impl Default for FeedLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedLoader {
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client }
    }

    /// Fetch and parse one feed
    pub async fn fetch(&self, source: &FeedSource) -> Result<FeatureCollection, FeedError> {
        let body = match source {
            FeedSource::Url(url) => {
                self.client
                    .get(url)
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await?
            }
            FeedSource::File(path) => tokio::fs::read_to_string(path).await?,
        };

        parse_feature_collection(&body)
    }

    /// Fetch one feed, logging and swallowing any failure
    pub async fn fetch_or_log(&self, feed: &str, source: &FeedSource) -> Option<FeatureCollection> {
        match self.fetch(source).await {
            Ok(collection) => {
                debug!(
                    feed,
                    source = %source,
                    features = collection.features.len(),
                    "feed loaded"
                );
                Some(collection)
            }
            Err(e) => {
                error!(feed, source = %source, error = %e, "failed to load feed");
                None
            }
        }
    }

    /// Fetch the earthquake feed and the optional plate feed concurrently.
    ///
    /// The two fetches are independent: either may fail without the other
    /// being affected.
    pub async fn fetch_both(
        &self,
        earthquakes: &FeedSource,
        plates: Option<&FeedSource>,
    ) -> (Option<FeatureCollection>, Option<FeatureCollection>) {
        let plates = async {
            match plates {
                Some(source) => self.fetch_or_log("plates", source).await,
                None => None,
            }
        };

        tokio::join!(self.fetch_or_log("earthquakes", earthquakes), plates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ONE_QUAKE: &str = r#"{
        "type": "FeatureCollection",
        "metadata": {"title": "USGS All Earthquakes, Past Month"},
        "features": [{
            "type": "Feature",
            "id": "us7000abcd",
            "properties": {"mag": 2.5, "place": "Test"},
            "geometry": {"type": "Point", "coordinates": [-117.5, 35.7, 8.1]}
        }]
    }"#;

    fn feed_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_feed_source_parse() {
        assert_eq!(
            FeedSource::parse("https://example.com/all_month.geojson"),
            FeedSource::Url("https://example.com/all_month.geojson".to_string())
        );
        assert_eq!(
            FeedSource::parse("http://localhost/feed"),
            FeedSource::Url("http://localhost/feed".to_string())
        );
        assert_eq!(
            FeedSource::parse("data/plates.json"),
            FeedSource::File(PathBuf::from("data/plates.json"))
        );
    }

    #[test]
    fn test_parse_feature_collection() {
        let collection = parse_feature_collection(ONE_QUAKE).unwrap();
        assert_eq!(collection.features.len(), 1);
    }

    #[test]
    fn test_parse_single_feature_is_wrapped() {
        let text = r#"{"type": "Feature", "properties": {"mag": 1.0},
            "geometry": {"type": "Point", "coordinates": [0.0, 0.0]}}"#;
        let collection = parse_feature_collection(text).unwrap();
        assert_eq!(collection.features.len(), 1);
    }

    #[test]
    fn test_parse_rejects_bare_geometry() {
        let text = r#"{"type": "Point", "coordinates": [0.0, 0.0]}"#;
        let err = parse_feature_collection(text).unwrap_err();
        assert!(matches!(err, FeedError::UnexpectedDocument("Geometry")));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let err = parse_feature_collection("{\"type\": \"FeatureCollection\"").unwrap_err();
        assert!(matches!(err, FeedError::Parse(_)));
    }

    #[tokio::test]
    async fn test_fetch_from_file() {
        let file = feed_file(ONE_QUAKE);
        let source = FeedSource::File(file.path().to_path_buf());
        let collection = FeedLoader::new().fetch(&source).await.unwrap();
        assert_eq!(collection.features.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_missing_file() {
        let source = FeedSource::File(PathBuf::from("/nonexistent/quakemap/feed.geojson"));
        let err = FeedLoader::new().fetch(&source).await.unwrap_err();
        assert!(matches!(err, FeedError::Io(_)));
    }

    /// Serve a feed over a loopback listener and return its base URL
    async fn serve_feeds() -> String {
        use axum::{Router, http::StatusCode, routing::get};

        let app = Router::new()
            .route("/quakes", get(|| async { ONE_QUAKE }))
            .route("/missing", get(|| async { StatusCode::NOT_FOUND }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_fetch_from_url() {
        let base = serve_feeds().await;
        let source = FeedSource::parse(&format!("{}/quakes", base));
        assert!(matches!(source, FeedSource::Url(_)));

        let collection = FeedLoader::new().fetch(&source).await.unwrap();
        assert_eq!(collection.features.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_url_error_status() {
        let base = serve_feeds().await;
        let source = FeedSource::Url(format!("{}/missing", base));

        let err = FeedLoader::new().fetch(&source).await.unwrap_err();
        match err {
            FeedError::Request(e) => {
                assert_eq!(e.status(), Some(reqwest::StatusCode::NOT_FOUND));
            }
            other => panic!("expected a request error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_both_failures_are_independent() {
        let quakes = feed_file(ONE_QUAKE);
        let broken = feed_file("not geojson");
        let loader = FeedLoader::new();

        let (eq, plates) = loader
            .fetch_both(
                &FeedSource::File(quakes.path().to_path_buf()),
                Some(&FeedSource::File(broken.path().to_path_buf())),
            )
            .await;
        assert!(eq.is_some());
        assert!(plates.is_none());

        let (eq, plates) = loader
            .fetch_both(
                &FeedSource::File(broken.path().to_path_buf()),
                Some(&FeedSource::File(quakes.path().to_path_buf())),
            )
            .await;
        assert!(eq.is_none());
        assert!(plates.is_some());
    }

    #[tokio::test]
    async fn test_fetch_both_without_overlay() {
        let quakes = feed_file(ONE_QUAKE);
        let (eq, plates) = FeedLoader::new()
            .fetch_both(&FeedSource::File(quakes.path().to_path_buf()), None)
            .await;
        assert!(eq.is_some());
        assert!(plates.is_none());
    }
}
