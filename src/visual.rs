//! Continuous visual encoding of polarization states.
//!
//! Every state maps to render attributes through closed-form expressions;
//! there is no lookup table, so intermediate states need no special cases.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::stokes::PolarizationState;

/// Fixed lightness of beam colors, in percent.
pub const BEAM_LIGHTNESS: f64 = 55.0;
/// Lowest intensity factor used for opacity.
pub const MIN_OPACITY_INTENSITY: f64 = 0.05;

/// Below this absolute ellipticity a beam is drawn as a plain line.
pub const LINE_ELLIPTICITY_DEG: f64 = 5.0;
/// Above this absolute ellipticity a beam is drawn as a helix.
pub const HELIX_ELLIPTICITY_DEG: f64 = 40.0;
/// Ellipticity beyond which handedness is reported.
pub const HANDEDNESS_ELLIPTICITY_DEG: f64 = 2.0;

/// HSL color; hue in degrees, saturation and lightness in percent.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HslColor {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

impl HslColor {
    /// CSS `hsl()` notation, rounded to one decimal.
    #[must_use]
    pub fn css(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HslColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({:.1}, {:.1}%, {:.1}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

/// Marker shape along a beam segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentShape {
    /// Linear polarization.
    Line,
    /// Elliptical polarization.
    EllipseMarkers,
    /// Near-circular polarization.
    Helix,
}

/// Rotation sense of elliptical light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    /// Clockwise.
    Cw,
    /// Counter-clockwise.
    Ccw,
    /// Linear or unpolarized.
    None,
}

/// Render attributes derived from one state.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualAttributes {
    pub color: HslColor,
    pub opacity: f64,
    pub stroke_width: f64,
    pub shape: SegmentShape,
    pub handedness: Handedness,
    pub glow_intensity: f64,
}

/// Map a polarization state to render attributes.
#[must_use]
pub fn polarization_to_visual(state: &PolarizationState) -> VisualAttributes {
    let s0 = state.intensity();
    let dop = state.dop();
    let ellipticity = state.ellipticity_deg();

    let color = HslColor {
        hue: state.orientation_deg() / 180.0 * 360.0,
        saturation: 75.0 + 25.0 * dop,
        lightness: BEAM_LIGHTNESS,
    };

    let shape = if ellipticity.abs() < LINE_ELLIPTICITY_DEG {
        SegmentShape::Line
    } else if ellipticity.abs() > HELIX_ELLIPTICITY_DEG {
        SegmentShape::Helix
    } else {
        SegmentShape::EllipseMarkers
    };

    let handedness = if ellipticity > HANDEDNESS_ELLIPTICITY_DEG {
        Handedness::Cw
    } else if ellipticity < -HANDEDNESS_ELLIPTICITY_DEG {
        Handedness::Ccw
    } else {
        Handedness::None
    };

    VisualAttributes {
        color,
        opacity: s0.max(MIN_OPACITY_INTENSITY) * dop,
        stroke_width: (s0 * 5.0).max(1.0),
        shape,
        handedness,
        glow_intensity: s0 * dop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizontal_linear() {
        let v = polarization_to_visual(&PolarizationState::create_linear(1.0, 0.0));
        assert_eq!(v.color.hue, 0.0);
        assert_eq!(v.color.saturation, 100.0);
        assert_eq!(v.color.lightness, BEAM_LIGHTNESS);
        assert!((v.opacity - 1.0).abs() < 1e-12);
        assert!((v.stroke_width - 5.0).abs() < 1e-12);
        assert_eq!(v.shape, SegmentShape::Line);
        assert_eq!(v.handedness, Handedness::None);
        assert!((v.glow_intensity - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_hue_is_continuous_in_orientation() {
        let v45 = polarization_to_visual(&PolarizationState::create_linear(1.0, 45.0));
        let v46 = polarization_to_visual(&PolarizationState::create_linear(1.0, 46.0));
        assert!((v45.color.hue - 90.0).abs() < 1e-6);
        assert!((v46.color.hue - 92.0).abs() < 1e-6);
    }

    #[test]
    fn test_dim_beam_keeps_floor_width_and_opacity() {
        let v = polarization_to_visual(&PolarizationState::create_linear(0.01, 0.0));
        assert_eq!(v.stroke_width, 1.0);
        assert!((v.opacity - MIN_OPACITY_INTENSITY).abs() < 1e-9);
    }

    #[test]
    fn test_unpolarized_is_transparent_and_desaturated() {
        let v = polarization_to_visual(&PolarizationState::unpolarized(1.0));
        assert_eq!(v.opacity, 0.0);
        assert_eq!(v.color.saturation, 75.0);
        assert_eq!(v.glow_intensity, 0.0);
    }

    #[test]
    fn test_circular_is_helix_with_handedness() {
        let cw = polarization_to_visual(&PolarizationState::circular(1.0, true));
        assert_eq!(cw.shape, SegmentShape::Helix);
        assert_eq!(cw.handedness, Handedness::Cw);

        let ccw = polarization_to_visual(&PolarizationState::circular(1.0, false));
        assert_eq!(ccw.handedness, Handedness::Ccw);
    }

    #[test]
    fn test_elliptical_uses_markers() {
        // s3/s0 = sin(40deg) gives an ellipticity of 20 degrees.
        let s3 = 40.0_f64.to_radians().sin();
        let s1 = 40.0_f64.to_radians().cos();
        let v = polarization_to_visual(&PolarizationState::from_stokes(1.0, s1, 0.0, -s3));
        assert_eq!(v.shape, SegmentShape::EllipseMarkers);
        assert_eq!(v.handedness, Handedness::Ccw);
    }

    #[test]
    fn test_slight_ellipticity_has_no_handedness() {
        // Ellipticity of 1 degree.
        let s3 = 2.0_f64.to_radians().sin();
        let s1 = 2.0_f64.to_radians().cos();
        let v = polarization_to_visual(&PolarizationState::from_stokes(1.0, s1, 0.0, s3));
        assert_eq!(v.shape, SegmentShape::Line);
        assert_eq!(v.handedness, Handedness::None);
    }

    #[test]
    fn test_dark_state_is_finite() {
        let v = polarization_to_visual(&PolarizationState::from_stokes(0.0, 0.0, 0.0, 0.0));
        assert_eq!(v.opacity, 0.0);
        assert_eq!(v.stroke_width, 1.0);
        assert!(v.color.hue.is_finite());
    }

    #[test]
    fn test_css() {
        let v = polarization_to_visual(&PolarizationState::create_linear(1.0, 45.0));
        assert_eq!(v.color.css(), "hsl(90.0, 100.0%, 55.0%)");
    }
}
