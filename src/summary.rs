//! Terminal summary of an earthquake feed
//!
//! Counts events per legend bucket so the feed can be inspected without
//! opening the map.

use std::io::{self, Write};

use crate::layers::{EarthquakeLayer, StyledPoint};
use crate::style::BUCKETS;

/// Event counts per color bucket
#[derive(Debug, Clone, PartialEq)]
pub struct BucketCounts {
    pub counts: [usize; BUCKETS.len()],
    pub total: usize,
    pub skipped: usize,
}

impl BucketCounts {
    pub fn from_layer(layer: &EarthquakeLayer) -> Self {
        let mut counts = [0; BUCKETS.len()];
        for point in &layer.points {
            counts[point.bucket] += 1;
        }
        Self {
            counts,
            total: layer.points.len(),
            skipped: layer.skipped,
        }
    }
}

/// The strongest event with a numeric magnitude
pub fn strongest(layer: &EarthquakeLayer) -> Option<&StyledPoint> {
    layer
        .points
        .iter()
        .filter(|p| p.magnitude.is_some())
        .max_by(|a, b| a.magnitude.partial_cmp(&b.magnitude).unwrap_or(std::cmp::Ordering::Equal))
}

/// Write the summary. `None` means the feed failed to load.
pub fn generate_summary<W: Write>(layer: Option<&EarthquakeLayer>, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "Earthquake Summary")?;
    writeln!(writer, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━")?;

    let Some(layer) = layer else {
        writeln!(writer, "No data: the earthquake feed could not be loaded.")?;
        return Ok(());
    };

    let counts = BucketCounts::from_layer(layer);
    writeln!(writer, "Events: {}", counts.total)?;
    if counts.skipped > 0 {
        writeln!(writer, "Skipped (not points): {}", counts.skipped)?;
    }
    writeln!(writer)?;

    writeln!(writer, "{:<10} {:<9} {:>8} {:>7}", "Magnitude", "Color", "Events", "Share")?;
    for (bucket, count) in BUCKETS.iter().zip(counts.counts) {
        let share = if counts.total > 0 {
            count as f64 / counts.total as f64 * 100.0
        } else {
            0.0
        };
        writeln!(
            writer,
            "{:<10} {:<9} {:>8} {:>6.1}%",
            bucket.label, bucket.color, count, share
        )?;
    }

    if let Some(point) = strongest(layer) {
        writeln!(writer)?;
        let magnitude = point.magnitude.unwrap_or_default();
        match &point.place {
            Some(place) => writeln!(writer, "Strongest: M{} - {}", magnitude, place)?,
            None => writeln!(writer, "Strongest: M{}", magnitude)?,
        }
    }

    Ok(())
}
