//! Magnitude legend
//!
//! The legend is built from the fixed bucket table in [`crate::style`], never
//! from the fetched data, so it always lists the same six swatches.

use serde::Serialize;

use crate::style::{BUCKETS, escape_html};

/// Legend heading
pub const LEGEND_TITLE: &str = "Magnitudes";

/// One color swatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: String,
}

/// Title, range labels and swatches in ascending magnitude order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Legend {
    pub title: String,
    pub min_label: String,
    pub max_label: String,
    pub entries: Vec<LegendEntry>,
}

/// Legend plus its rendered markup, as sent to the page
#[derive(Debug, Clone, Serialize)]
pub struct LegendView {
    #[serde(flatten)]
    pub legend: Legend,
    pub html: String,
}

impl Legend {
    pub fn build() -> Self {
        let entries: Vec<LegendEntry> = BUCKETS
            .iter()
            .map(|b| LegendEntry {
                label: b.label.to_string(),
                color: b.color.to_string(),
            })
            .collect();

        Self {
            title: LEGEND_TITLE.to_string(),
            min_label: BUCKETS[0].label.to_string(),
            max_label: BUCKETS[BUCKETS.len() - 1].label.to_string(),
            entries,
        }
    }

    /// Inner HTML of the legend control
    pub fn to_html(&self) -> String {
        let mut html = format!(
            "<h1>{}</h1><div class=\"labels\"><div class=\"min\">{}</div><div class=\"max\">{}</div></div>",
            escape_html(&self.title),
            escape_html(&self.min_label),
            escape_html(&self.max_label)
        );

        html.push_str("<ul>");
        for entry in &self.entries {
            html.push_str(&format!(
                "<li style=\"background-color: {}\">{}</li>",
                escape_html(&entry.color),
                escape_html(&entry.label)
            ));
        }
        html.push_str("</ul>");
        html
    }

    pub fn into_view(self) -> LegendView {
        let html = self.to_html();
        LegendView { legend: self, html }
    }
}
