//! Beam propagation.
//!
//! Orders the optical elements of a scene by their distance from the light
//! source and pushes the source's polarization state through them one matrix
//! at a time. The output is rebuilt from scratch on every call.

use serde::{Deserialize, Serialize};

use crate::mueller::MuellerMatrix;
use crate::scene::{ElementKind, Position, SceneElement};
use crate::stokes::PolarizationState;
use crate::visual::{polarization_to_visual, VisualAttributes};

/// Length of the trailing segment past the last element.
pub const TAIL_LENGTH: f64 = 1.5;
/// Length of the only segment when the scene has no optical elements.
pub const FREE_BEAM_LENGTH: f64 = 3.0;

/// A straight piece of the beam carrying one polarization state.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamSegment {
    /// `beam-seg-<index>`.
    pub id: String,
    pub from: Position,
    pub to: Position,
    pub state: PolarizationState,
    pub visual: VisualAttributes,
}

impl BeamSegment {
    fn new(index: usize, from: Position, to: Position, state: PolarizationState) -> Self {
        Self {
            id: format!("beam-seg-{index}"),
            from,
            to,
            visual: polarization_to_visual(&state),
            state,
        }
    }

    /// Intensity carried by this segment.
    #[must_use]
    pub const fn intensity(&self) -> f64 {
        self.state.intensity()
    }
}

/// The light source of a scene: the first `light-source` element.
#[must_use]
pub fn find_light_source(elements: &[SceneElement]) -> Option<&SceneElement> {
    elements.iter().find(|e| e.kind == ElementKind::LightSource)
}

/// Optical elements in propagation order: ascending distance from `source`,
/// ties kept in input order.
#[must_use]
pub fn propagation_order<'a>(
    source: &SceneElement,
    elements: &'a [SceneElement],
) -> Vec<&'a SceneElement> {
    let mut ordered: Vec<(f64, &SceneElement)> = elements
        .iter()
        .filter(|e| e.kind.is_optical())
        .map(|e| (source.position.distance_to(&e.position), e))
        .collect();
    // sort_by is stable.
    ordered.sort_by(|a, b| a.0.total_cmp(&b.0));
    ordered.into_iter().map(|(_, e)| e).collect()
}

/// Compute the beam path for a scene.
///
/// Returns one segment per optical element (each carrying the state that
/// arrives at that element) plus a trailing segment with the final state.
/// A scene without a light source has no beam.
#[must_use]
pub fn calculate_beam_path(elements: &[SceneElement]) -> Vec<BeamSegment> {
    let Some(source) = find_light_source(elements) else {
        tracing::debug!("no light source in scene; beam path is empty");
        return Vec::new();
    };

    let ordered = propagation_order(source, elements);
    let mut segments = Vec::with_capacity(ordered.len() + 1);

    let mut state = PolarizationState::create_linear(source.source_intensity(), 0.0);
    let mut position = source.position;

    for element in &ordered {
        segments.push(BeamSegment::new(segments.len(), position, element.position, state));
        if let Some(matrix) = MuellerMatrix::for_element(element) {
            state = matrix.transform(&state);
        }
        position = element.position;
    }

    let end = match ordered.last() {
        Some(last) => {
            let [dx, dy, dz] = direction(&source.position, &last.position);
            Position::new(
                position.x + dx * TAIL_LENGTH,
                position.y + dy * TAIL_LENGTH,
                position.z + dz * TAIL_LENGTH,
            )
        }
        None => Position::new(position.x + FREE_BEAM_LENGTH, position.y, position.z),
    };
    segments.push(BeamSegment::new(segments.len(), position, end, state));

    tracing::debug!(
        elements = ordered.len(),
        segments = segments.len(),
        final_intensity = state.intensity(),
        "beam path computed"
    );
    segments
}

/// Unit vector from `from` to `to`; +X when the points coincide.
fn direction(from: &Position, to: &Position) -> [f64; 3] {
    let len = from.distance_to(to);
    if !len.is_finite() || len <= f64::EPSILON {
        return [1.0, 0.0, 0.0];
    }
    [(to.x - from.x) / len, (to.y - from.y) / len, (to.z - from.z) / len]
}
