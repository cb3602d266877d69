//! One-shot checks that the player has seen each visual encoding at work.
//!
//! Unlike the rule pass, every satisfied encoding is recorded at once.

use std::collections::HashSet;

use crate::achieved::AchievedSet;
use crate::pipeline::BeamSegment;
use crate::visual::SegmentShape;

use super::DiscoveryEvent;

/// At least two distinct beam colors.
pub const ENCODING_COLOR: &str = "encoding-color";
/// A segment dimmed below `DIM_OPACITY`.
pub const ENCODING_OPACITY: &str = "encoding-opacity";
/// A helix-shaped segment.
pub const ENCODING_SHAPE: &str = "encoding-shape";
/// Opacity varies by more than `CONTRAST_SPREAD`.
pub const ENCODING_CONTRAST: &str = "encoding-contrast";

/// Opacity under which a segment reads as dimmed.
pub const DIM_OPACITY: f64 = 0.5;
/// Opacity range across the beam that reads as contrast.
pub const CONTRAST_SPREAD: f64 = 0.15;

/// All encoding ids, in reporting order.
pub const ENCODING_DISCOVERIES: [&str; 4] =
    [ENCODING_COLOR, ENCODING_OPACITY, ENCODING_SHAPE, ENCODING_CONTRAST];

/// Encoding ids whose condition holds for `segments`.
#[must_use]
pub fn satisfied_encodings(segments: &[BeamSegment]) -> Vec<&'static str> {
    let mut hits = Vec::new();

    let colors: HashSet<String> = segments.iter().map(|s| s.visual.color.css()).collect();
    if colors.len() >= 2 {
        hits.push(ENCODING_COLOR);
    }

    if segments.iter().any(|s| s.visual.opacity < DIM_OPACITY) {
        hits.push(ENCODING_OPACITY);
    }

    if segments.iter().any(|s| s.visual.shape == SegmentShape::Helix) {
        hits.push(ENCODING_SHAPE);
    }

    let (min, max) = segments.iter().map(|s| s.visual.opacity).fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), o| (lo.min(o), hi.max(o)),
    );
    if max - min > CONTRAST_SPREAD {
        hits.push(ENCODING_CONTRAST);
    }

    hits
}

/// Record every satisfied, not-yet-achieved encoding discovery.
pub fn evaluate_encoding(segments: &[BeamSegment], achieved: &mut AchievedSet) -> Vec<DiscoveryEvent> {
    satisfied_encodings(segments)
        .into_iter()
        .filter(|id| achieved.achieve(id))
        .map(|id| {
            tracing::info!(discovery_id = id, "encoding discovered");
            DiscoveryEvent::new(id)
        })
        .collect()
}
