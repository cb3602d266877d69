//! The built-in `light-lab` discoveries and the predicate helpers they share.
//!
//! Order in `builtin_discoveries` is evaluation order.

use serde_json::json;

use crate::error::PredicateError;
use crate::pipeline::{find_light_source, propagation_order, BeamSegment};
use crate::scene::{ElementKind, SceneElement};
use crate::visual::SegmentShape;

use super::{DiscoveryConfig, DiscoveryContext};

/// Region of the optics bench.
pub const LIGHT_LAB: &str = "light-lab";

/// Source plus polarizer.
pub const POLARIZER_PLACED: &str = "polarizer-placed";
/// Crossed pair extinguishes the beam.
pub const CROSSED_POLARIZERS: &str = "crossed-polarizers";
/// Swept polarizer shows graded intensities.
pub const MALUS_LAW_BASIC: &str = "malus-law-basic";
/// Middle polarizer reopens a crossed pair.
pub const THREE_POLARIZER_PARADOX: &str = "three-polarizer-paradox";
/// Quarter-wave plate makes circular light.
pub const CIRCULAR_POLARIZATION: &str = "circular-polarization";
/// Half-wave plate turns the plane without loss.
pub const HALF_WAVE_ROTATION: &str = "half-wave-rotation";
/// Waveplate swept through 45 degrees.
pub const WAVEPLATE_TUNING: &str = "waveplate-tuning";

/// Final intensity below this counts as extinguished.
pub const EXTINCTION_THRESHOLD: f64 = 0.01;
/// Segment intensities closer than this are the same reading.
pub const INTENSITY_TOLERANCE: f64 = 0.1;
/// Allowed deviation when matching a nominal angle.
pub const ANGLE_TOLERANCE_DEG: f64 = 5.0;

const MALUS_ROTATION_SPREAD_DEG: f64 = 90.0;
const MALUS_DISTINCT_INTENSITIES: usize = 3;
const WAVEPLATE_ROTATION_SPREAD_DEG: f64 = 45.0;
const HALF_WAVE_MIN_TURN_DEG: f64 = 10.0;
const HALF_WAVE_INTENSITY_TOLERANCE: f64 = 0.05;

/// The built-in catalogue, in evaluation order.
#[must_use]
pub fn builtin_discoveries() -> Vec<DiscoveryConfig> {
    vec![
        DiscoveryConfig::new(POLARIZER_PLACED, "First Filter", polarizer_placed)
            .with_response(json!({"environment": "lab-lights", "effect": "brighten"})),
        DiscoveryConfig::new(CROSSED_POLARIZERS, "Crossed Polarizers", crossed_polarizers)
            .with_response(json!({"environment": "lab-lights", "effect": "dim", "level": 0.2})),
        DiscoveryConfig::new(MALUS_LAW_BASIC, "Malus's Law", malus_law_basic)
            .with_response(json!({"environment": "crystal-glow", "effect": "pulse"})),
        DiscoveryConfig::new(
            THREE_POLARIZER_PARADOX,
            "Three-Polarizer Paradox",
            three_polarizer_paradox,
        )
        .with_response(json!({"environment": "aurora", "effect": "reveal"})),
        DiscoveryConfig::new(CIRCULAR_POLARIZATION, "Circular Light", circular_polarization)
            .with_response(json!({"environment": "spiral-dust", "effect": "spin"})),
        DiscoveryConfig::new(HALF_WAVE_ROTATION, "Half-Wave Rotation", half_wave_rotation)
            .with_response(json!({"environment": "mirror-hall", "effect": "rotate"})),
        DiscoveryConfig::new(WAVEPLATE_TUNING, "Tuning the Retarder", waveplate_tuning)
            .with_response(json!({"environment": "crystal-glow", "effect": "shimmer"})),
    ]
}

/// A source and at least one polarizer are in the scene.
pub fn polarizer_placed(ctx: &DiscoveryContext<'_>) -> Result<bool, PredicateError> {
    let has_polarizer = of_kind(ctx.elements, ElementKind::Polarizer).next().is_some();
    Ok(has_polarizer && find_light_source(ctx.elements).is_some())
}

/// Two polarizers adjacent on the path are crossed and the beam dies.
pub fn crossed_polarizers(ctx: &DiscoveryContext<'_>) -> Result<bool, PredicateError> {
    let axes = path_polarizer_axes(ctx.elements);
    let extinguished = final_intensity(ctx.segments).is_some_and(|i| i < EXTINCTION_THRESHOLD);
    if axes.len() < 2 || !extinguished {
        return Ok(false);
    }
    Ok(axes
        .windows(2)
        .any(|pair| near(axial_difference(pair[0], pair[1]), 90.0, ANGLE_TOLERANCE_DEG)))
}

/// Two or more polarizers, one swept through at least 90 degrees, and at
/// least three distinguishable intensities along the beam.
pub fn malus_law_basic(ctx: &DiscoveryContext<'_>) -> Result<bool, PredicateError> {
    let polarizers: Vec<&SceneElement> = of_kind(ctx.elements, ElementKind::Polarizer).collect();
    if polarizers.len() < 2 {
        return Ok(false);
    }
    let swept = polarizers.iter().any(|p| {
        ctx.history
            .spread(&p.id)
            .is_some_and(|s| s >= MALUS_ROTATION_SPREAD_DEG)
    });
    if !swept {
        return Ok(false);
    }
    Ok(distinct_intensities(ctx.segments, INTENSITY_TOLERANCE) >= MALUS_DISTINCT_INTENSITIES)
}

/// A polarizer between two crossed ones, at an intermediate angle, lets
/// light through again.
///
/// "Between" is the open interval of the two outer axes taken in `[0, 180)`;
/// outer axes of 0 and 90 accept a middle axis of 45 but not 135.
pub fn three_polarizer_paradox(ctx: &DiscoveryContext<'_>) -> Result<bool, PredicateError> {
    let axes = path_polarizer_axes(ctx.elements);
    let (Some(&first), Some(&last)) = (axes.first(), axes.last()) else {
        return Ok(false);
    };
    if axes.len() < 3 || !near(axial_difference(first, last), 90.0, ANGLE_TOLERANCE_DEG) {
        return Ok(false);
    }
    let (lo, hi) = if first < last { (first, last) } else { (last, first) };
    let between = axes[1..axes.len() - 1].iter().any(|&a| lo < a && a < hi);
    Ok(between && final_intensity(ctx.segments).is_some_and(|i| i >= EXTINCTION_THRESHOLD))
}

/// A quarter-wave plate turns the beam (nearly) circular somewhere.
pub fn circular_polarization(ctx: &DiscoveryContext<'_>) -> Result<bool, PredicateError> {
    if !has_waveplate_with_retardation(ctx.elements, 90.0) {
        return Ok(false);
    }
    Ok(ctx.segments.iter().any(|s| s.visual.shape == SegmentShape::Helix))
}

/// A half-wave plate turns the polarization plane without losing light.
pub fn half_wave_rotation(ctx: &DiscoveryContext<'_>) -> Result<bool, PredicateError> {
    if !has_waveplate_with_retardation(ctx.elements, 180.0) {
        return Ok(false);
    }
    let (Some(source), Some(last)) = (find_light_source(ctx.elements), ctx.segments.last()) else {
        return Ok(false);
    };
    // The beam leaves the source linearly polarized at 0 degrees.
    let turned = axial_difference(last.state.orientation_deg(), 0.0) >= HALF_WAVE_MIN_TURN_DEG;
    let lossless =
        (last.intensity() - source.source_intensity()).abs() <= HALF_WAVE_INTENSITY_TOLERANCE;
    Ok(turned && lossless)
}

/// A waveplate was swept through at least 45 degrees.
pub fn waveplate_tuning(ctx: &DiscoveryContext<'_>) -> Result<bool, PredicateError> {
    Ok(of_kind(ctx.elements, ElementKind::Waveplate).any(|w| {
        ctx.history
            .spread(&w.id)
            .is_some_and(|s| s >= WAVEPLATE_ROTATION_SPREAD_DEG)
    }))
}

fn of_kind(elements: &[SceneElement], kind: ElementKind) -> impl Iterator<Item = &SceneElement> {
    elements.iter().filter(move |e| e.kind == kind)
}

/// Transmission axes of polarizers in propagation order, normalized to `[0, 180)`.
///
/// Axes are read with the same defaults the pipeline propagates with.
fn path_polarizer_axes(elements: &[SceneElement]) -> Vec<f64> {
    let Some(source) = find_light_source(elements) else {
        return Vec::new();
    };
    propagation_order(source, elements)
        .into_iter()
        .filter(|e| e.kind == ElementKind::Polarizer)
        .map(|p| p.transmission_axis_deg().rem_euclid(180.0))
        .collect()
}

fn has_waveplate_with_retardation(elements: &[SceneElement], nominal_deg: f64) -> bool {
    of_kind(elements, ElementKind::Waveplate)
        .any(|plate| near(plate.retardation_deg(), nominal_deg, ANGLE_TOLERANCE_DEG))
}

fn final_intensity(segments: &[BeamSegment]) -> Option<f64> {
    segments.last().map(BeamSegment::intensity)
}

/// Number of segment intensities that differ by more than `tolerance` from
/// every intensity already counted.
#[must_use]
pub fn distinct_intensities(segments: &[BeamSegment], tolerance: f64) -> usize {
    let mut accepted: Vec<f64> = Vec::new();
    for value in segments.iter().map(BeamSegment::intensity) {
        if accepted.iter().all(|a| (value - a).abs() > tolerance) {
            accepted.push(value);
        }
    }
    accepted.len()
}

/// Angle between two axes, in `[0, 90]`.
#[must_use]
pub fn axial_difference(a_deg: f64, b_deg: f64) -> f64 {
    let d = (a_deg - b_deg).rem_euclid(180.0);
    d.min(180.0 - d)
}

fn near(value: f64, target: f64, tolerance: f64) -> bool {
    (value - target).abs() <= tolerance
}
