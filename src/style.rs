//! Magnitude styling for earthquake points
//!
//! Maps a feature's `mag` property onto one of six fixed color buckets and
//! derives the circle style and popup text drawn for it.
//!
//! ## Buckets
//!
//! | Index | Magnitude | Color     |
//! |-------|-----------|-----------|
//! | 0     | (0, 1)    | `#7FFF00` |
//! | 1     | [1, 2)    | `#ADFF2F` |
//! | 2     | [2, 3)    | `#FFFF00` |
//! | 3     | [3, 4)    | `#FFD700` |
//! | 4     | [4, 5)    | `#FFA500` |
//! | 5     | [5, ∞)    | `#FF4500` |
//!
//! Magnitudes that are not strictly positive (including values that fail to
//! coerce to a number) are placed according to [`NonPositivePolicy`].

use geojson::Feature;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One magnitude band of the color scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorBucket {
    /// Exclusive upper bound of the band
    pub upper_bound: f64,
    /// Fill color as a hex string
    pub color: &'static str,
    /// Legend label (e.g. "3-4")
    pub label: &'static str,
}

/// The fixed color scale, in ascending magnitude order
pub const BUCKETS: [ColorBucket; 6] = [
    ColorBucket {
        upper_bound: 1.0,
        color: "#7FFF00",
        label: "0-1",
    },
    ColorBucket {
        upper_bound: 2.0,
        color: "#ADFF2F",
        label: "1-2",
    },
    ColorBucket {
        upper_bound: 3.0,
        color: "#FFFF00",
        label: "2-3",
    },
    ColorBucket {
        upper_bound: 4.0,
        color: "#FFD700",
        label: "3-4",
    },
    ColorBucket {
        upper_bound: 5.0,
        color: "#FFA500",
        label: "4-5",
    },
    ColorBucket {
        upper_bound: f64::INFINITY,
        color: "#FF4500",
        label: "5+",
    },
];

/// Where magnitudes `<= 0` (and non-numeric magnitudes) are placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NonPositivePolicy {
    /// Highest bucket ("5+"), matching the historical map output
    #[default]
    Highest,
    /// Lowest bucket ("0-1")
    Lowest,
}

impl NonPositivePolicy {
    fn bucket(self) -> usize {
        match self {
            NonPositivePolicy::Highest => BUCKETS.len() - 1,
            NonPositivePolicy::Lowest => 0,
        }
    }
}

/// Classify a magnitude into a bucket index using the default policy
pub fn classify(magnitude: f64) -> usize {
    classify_with(magnitude, NonPositivePolicy::default())
}

/// Classify a magnitude into a bucket index
pub fn classify_with(magnitude: f64, policy: NonPositivePolicy) -> usize {
    if magnitude.is_nan() || magnitude <= 0.0 {
        return policy.bucket();
    }
    BUCKETS
        .iter()
        .position(|b| magnitude < b.upper_bound)
        .unwrap_or(BUCKETS.len() - 1)
}

/// Circle radius for a magnitude: linear in the magnitude, zero when it isn't positive
pub fn radius(magnitude: f64, scale: f64) -> f64 {
    if magnitude.is_finite() && magnitude > 0.0 {
        magnitude * scale
    } else {
        0.0
    }
}

/// Coerce a raw `mag` property to a number.
///
/// Numbers pass through; strings are trimmed and parsed (an empty string is
/// zero, and "inf" or "NaN" count as unparseable); `null` and `false` are
/// zero, `true` is one. Anything else, a missing property included, is NaN.
pub fn coerce_magnitude(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>()
                    .ok()
                    .filter(|m| m.is_finite())
                    .unwrap_or(f64::NAN)
            }
        }
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(_) | None => f64::NAN,
    }
}

/// Magnitude of a feature, coerced from its `mag` property
pub fn feature_magnitude(feature: &Feature) -> f64 {
    coerce_magnitude(feature.property("mag"))
}

/// Leaflet path options for one earthquake circle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    #[serde(rename = "fillColor")]
    pub fill_color: String,
    pub radius: f64,
    #[serde(rename = "color")]
    pub stroke_color: String,
    #[serde(rename = "weight")]
    pub stroke_weight: f64,
    #[serde(rename = "opacity")]
    pub stroke_opacity: f64,
    #[serde(rename = "fillOpacity")]
    pub fill_opacity: f64,
}

/// Style parameters shared by every earthquake point on a map
#[derive(Debug, Clone, PartialEq)]
pub struct StyleMapper {
    pub radius_scale: f64,
    pub fill_opacity: f64,
    pub stroke_color: String,
    pub stroke_weight: f64,
    pub stroke_opacity: f64,
    pub non_positive: NonPositivePolicy,
}

impl Default for StyleMapper {
    fn default() -> Self {
        Self::with_plates()
    }
}

impl StyleMapper {
    /// Large circles for the single-layer street map
    pub fn single_layer() -> Self {
        Self {
            radius_scale: 10.0,
            fill_opacity: 0.75,
            ..Self::with_plates()
        }
    }

    /// Smaller circles for the world map with the plate overlay
    pub fn with_plates() -> Self {
        Self {
            radius_scale: 5.0,
            fill_opacity: 0.65,
            stroke_color: "black".to_string(),
            stroke_weight: 1.0,
            stroke_opacity: 0.5,
            non_positive: NonPositivePolicy::default(),
        }
    }

    pub fn classify(&self, magnitude: f64) -> usize {
        classify_with(magnitude, self.non_positive)
    }

    /// A fresh style for the given magnitude
    pub fn style_for_magnitude(&self, magnitude: f64) -> Style {
        Style {
            fill_color: BUCKETS[self.classify(magnitude)].color.to_string(),
            radius: radius(magnitude, self.radius_scale),
            stroke_color: self.stroke_color.clone(),
            stroke_weight: self.stroke_weight,
            stroke_opacity: self.stroke_opacity,
            fill_opacity: self.fill_opacity,
        }
    }

    pub fn style_for(&self, feature: &Feature) -> Style {
        self.style_for_magnitude(feature_magnitude(feature))
    }
}

/// Non-empty `place` property of a feature
pub fn feature_place(feature: &Feature) -> Option<&str> {
    feature
        .property("place")
        .and_then(Value::as_str)
        .filter(|p| !p.is_empty())
}

/// Popup HTML for a feature, present only when the feature names a place
pub fn popup_text(feature: &Feature) -> Option<String> {
    let place = feature_place(feature)?;
    let magnitude = display_magnitude(feature.property("mag"));
    Some(format!(
        "Magnitude: {} <br> Place: {}",
        escape_html(&magnitude),
        escape_html(place)
    ))
}

/// Render a raw `mag` value the way it arrived: strings verbatim, numbers in shortest form
fn display_magnitude(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) => f.to_string(),
            None => n.to_string(),
        },
        Some(Value::Null) | None => "unknown".to_string(),
        Some(other) => other.to_string(),
    }
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
