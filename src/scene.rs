//! Scene elements as seen by the kernel.
//!
//! The scene is owned by the host; the kernel only reads it. Each element has
//! a world position, a kind, and a small typed property bag whose fields are
//! meaningful only for some kinds.

use serde::{Deserialize, Serialize};

use crate::error::PredicateError;

/// Transmission axis assumed for a polarizer without one.
pub const DEFAULT_TRANSMISSION_AXIS_DEG: f64 = 0.0;
/// Retardation assumed for a waveplate without one (quarter-wave).
pub const DEFAULT_RETARDATION_DEG: f64 = 90.0;
/// Fast axis assumed for a waveplate without one.
pub const DEFAULT_FAST_AXIS_DEG: f64 = 0.0;
/// Source intensity assumed when the light source has none.
pub const DEFAULT_SOURCE_INTENSITY: f64 = 1.0;

/// Kind of scene element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    /// Emits the beam.
    LightSource,
    /// Ideal linear polarizer.
    Polarizer,
    /// Linear retarder.
    Waveplate,
    /// Visual only.
    Mirror,
    /// Visual only.
    Splitter,
    /// Visual only.
    Sensor,
    /// Visual only.
    Decoration,
}

impl ElementKind {
    /// True for kinds that transform the beam in the propagation pass.
    #[must_use]
    pub const fn is_optical(self) -> bool {
        matches!(self, Self::Polarizer | Self::Waveplate)
    }
}

/// World-space position.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    /// Position from coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Per-kind properties. Absent fields fall back to documented defaults, both
/// in the propagation pass and in the built-in discovery rules.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transmission_axis: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retardation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fast_axis: Option<f64>,
}

/// One element of the host's scene.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneElement {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub position: Position,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub properties: ElementProperties,
}

impl SceneElement {
    /// Element with empty properties.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: ElementKind, position: Position) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            rotation: 0.0,
            properties: ElementProperties::default(),
        }
    }

    /// Light source with the given intensity.
    #[must_use]
    pub fn light_source(id: impl Into<String>, position: Position, intensity: f64) -> Self {
        let mut el = Self::new(id, ElementKind::LightSource, position);
        el.properties.intensity = Some(intensity);
        el
    }

    /// Polarizer with its transmission axis in degrees.
    #[must_use]
    pub fn polarizer(id: impl Into<String>, position: Position, transmission_axis: f64) -> Self {
        let mut el = Self::new(id, ElementKind::Polarizer, position);
        el.properties.transmission_axis = Some(transmission_axis);
        el
    }

    /// Waveplate with retardation and fast axis in degrees.
    #[must_use]
    pub fn waveplate(
        id: impl Into<String>,
        position: Position,
        retardation: f64,
        fast_axis: f64,
    ) -> Self {
        let mut el = Self::new(id, ElementKind::Waveplate, position);
        el.properties.retardation = Some(retardation);
        el.properties.fast_axis = Some(fast_axis);
        el
    }

    /// Set the host-side rotation.
    #[must_use]
    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// Source intensity, defaulting when absent or non-finite.
    #[must_use]
    pub fn source_intensity(&self) -> f64 {
        finite_or(self.properties.intensity, DEFAULT_SOURCE_INTENSITY)
    }

    /// Transmission axis, defaulting when absent or non-finite.
    #[must_use]
    pub fn transmission_axis_deg(&self) -> f64 {
        finite_or(self.properties.transmission_axis, DEFAULT_TRANSMISSION_AXIS_DEG)
    }

    /// Retardation, defaulting when absent or non-finite.
    #[must_use]
    pub fn retardation_deg(&self) -> f64 {
        finite_or(self.properties.retardation, DEFAULT_RETARDATION_DEG)
    }

    /// Fast axis, defaulting when absent or non-finite.
    #[must_use]
    pub fn fast_axis_deg(&self) -> f64 {
        finite_or(self.properties.fast_axis, DEFAULT_FAST_AXIS_DEG)
    }

    /// Transmission axis, failing when the property is absent.
    ///
    /// For host-defined predicates that insist on an explicit value; the
    /// built-in rules read the defaulted axis the pipeline propagates with.
    pub fn require_transmission_axis(&self) -> Result<f64, PredicateError> {
        self.require(self.properties.transmission_axis, "transmissionAxis")
    }

    /// Retardation, failing when the property is absent.
    pub fn require_retardation(&self) -> Result<f64, PredicateError> {
        self.require(self.properties.retardation, "retardation")
    }

    fn require(&self, value: Option<f64>, property: &str) -> Result<f64, PredicateError> {
        match value {
            Some(v) if v.is_finite() => Ok(v),
            Some(_) => Err(PredicateError::NonFinite {
                element_id: self.id.clone(),
                property: property.to_string(),
            }),
            None => Err(PredicateError::MissingProperty {
                element_id: self.id.clone(),
                property: property.to_string(),
            }),
        }
    }
}

fn finite_or(value: Option<f64>, fallback: f64) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 0.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_optical_kinds() {
        assert!(ElementKind::Polarizer.is_optical());
        assert!(ElementKind::Waveplate.is_optical());
        assert!(!ElementKind::LightSource.is_optical());
        assert!(!ElementKind::Mirror.is_optical());
    }

    #[test]
    fn test_property_defaults() {
        let el = SceneElement::new("wp", ElementKind::Waveplate, Position::default());
        assert_eq!(el.retardation_deg(), DEFAULT_RETARDATION_DEG);
        assert_eq!(el.fast_axis_deg(), DEFAULT_FAST_AXIS_DEG);

        let mut src = SceneElement::light_source("src", Position::default(), f64::NAN);
        assert_eq!(src.source_intensity(), DEFAULT_SOURCE_INTENSITY);
        src.properties.intensity = Some(0.4);
        assert_eq!(src.source_intensity(), 0.4);
    }

    #[test]
    fn test_require_reports_missing_and_non_finite() {
        let mut el = SceneElement::new("pol-1", ElementKind::Polarizer, Position::default());
        assert_eq!(
            el.require_transmission_axis().unwrap_err(),
            PredicateError::MissingProperty {
                element_id: "pol-1".to_string(),
                property: "transmissionAxis".to_string(),
            }
        );

        el.properties.transmission_axis = Some(f64::INFINITY);
        assert!(matches!(
            el.require_transmission_axis(),
            Err(PredicateError::NonFinite { .. })
        ));

        el.properties.transmission_axis = Some(30.0);
        assert_eq!(el.require_transmission_axis().unwrap(), 30.0);
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{
            "id": "pol-a",
            "type": "polarizer",
            "position": {"x": 1.0, "y": 0.0, "z": 0.0},
            "properties": {"transmissionAxis": 45.0}
        }"#;
        let el: SceneElement = serde_json::from_str(json).unwrap();
        assert_eq!(el.kind, ElementKind::Polarizer);
        assert_eq!(el.rotation, 0.0);
        assert_eq!(el.properties.transmission_axis, Some(45.0));
        assert_eq!(el.properties.retardation, None);
    }
}
