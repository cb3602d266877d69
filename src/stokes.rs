//! Polarization state as an immutable Stokes vector.
//!
//! A `PolarizationState` is never mutated; every optical element produces a
//! new instance. All derived quantities are total: degenerate or unphysical
//! inputs resolve to defined fallbacks instead of NaN or infinity.

use serde::{Deserialize, Serialize};

/// Intensities at or below this are treated as extinguished.
pub const INTENSITY_EPSILON: f64 = 1e-10;

/// Stokes vector `(s0, s1, s2, s3)` of a light beam.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PolarizationState {
    stokes: [f64; 4],
}

impl PolarizationState {
    /// Fully polarized linear light at `angle_deg`.
    #[must_use]
    pub fn create_linear(intensity: f64, angle_deg: f64) -> Self {
        let two_theta = 2.0 * angle_deg.to_radians();
        Self::from_stokes(
            intensity,
            intensity * two_theta.cos(),
            intensity * two_theta.sin(),
            0.0,
        )
    }

    /// Direct construction.
    ///
    /// Non-finite components are replaced by zero and a negative `s0` is
    /// raised to zero; any other vector, physical or not, is accepted as-is.
    #[must_use]
    pub fn from_stokes(s0: f64, s1: f64, s2: f64, s3: f64) -> Self {
        let clean = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            stokes: [clean(s0).max(0.0), clean(s1), clean(s2), clean(s3)],
        }
    }

    /// Natural (unpolarized) light.
    #[must_use]
    pub fn unpolarized(intensity: f64) -> Self {
        Self::from_stokes(intensity, 0.0, 0.0, 0.0)
    }

    /// Fully circular light. Clockwise has positive `s3`.
    #[must_use]
    pub fn circular(intensity: f64, clockwise: bool) -> Self {
        let s3 = if clockwise { intensity } else { -intensity };
        Self::from_stokes(intensity, 0.0, 0.0, s3)
    }

    /// The raw Stokes components.
    #[must_use]
    pub const fn stokes(&self) -> [f64; 4] {
        self.stokes
    }

    /// Total intensity `s0`.
    #[must_use]
    pub const fn intensity(&self) -> f64 {
        self.stokes[0]
    }

    /// Horizontal/vertical component.
    #[must_use]
    pub const fn s1(&self) -> f64 {
        self.stokes[1]
    }

    /// Diagonal component.
    #[must_use]
    pub const fn s2(&self) -> f64 {
        self.stokes[2]
    }

    /// Circular component.
    #[must_use]
    pub const fn s3(&self) -> f64 {
        self.stokes[3]
    }

    /// True when `s0` is effectively zero.
    #[must_use]
    pub fn is_extinguished(&self) -> bool {
        self.stokes[0] <= INTENSITY_EPSILON
    }

    /// Orientation of the polarization ellipse's major axis in `[0, 180)`.
    ///
    /// Returns 0 when the linear components vanish (circular or dark light).
    #[must_use]
    pub fn orientation_deg(&self) -> f64 {
        let [_, s1, s2, _] = self.stokes;
        if s1.abs() < INTENSITY_EPSILON && s2.abs() < INTENSITY_EPSILON {
            return 0.0;
        }
        let deg = (0.5 * s2.atan2(s1)).to_degrees().rem_euclid(180.0);
        // rem_euclid can round a tiny negative up to exactly 180.
        if deg >= 180.0 {
            0.0
        } else {
            deg
        }
    }

    /// Ellipticity angle in `[-45, 45]`; positive is clockwise.
    #[must_use]
    pub fn ellipticity_deg(&self) -> f64 {
        let [s0, _, _, s3] = self.stokes;
        if s0 <= INTENSITY_EPSILON {
            return 0.0;
        }
        let ratio = (s3 / s0).clamp(-1.0, 1.0);
        (0.5 * ratio.asin()).to_degrees()
    }

    /// Degree of polarization clamped to `[0, 1]`.
    #[must_use]
    pub fn dop(&self) -> f64 {
        let [s0, s1, s2, s3] = self.stokes;
        if s0 <= INTENSITY_EPSILON {
            return 0.0;
        }
        let polarized = (s1 * s1 + s2 * s2 + s3 * s3).sqrt();
        (polarized / s0).clamp(0.0, 1.0)
    }

    /// Poincaré-sphere coordinates `(s1, s2, s3) / s0`; zero when dark.
    #[must_use]
    pub fn normalized(&self) -> [f64; 3] {
        let [s0, s1, s2, s3] = self.stokes;
        if s0 <= INTENSITY_EPSILON {
            return [0.0; 3];
        }
        [s1 / s0, s2 / s0, s3 / s0]
    }

    /// Split into fully polarized and unpolarized parts that sum to `self`
    /// (up to the DOP clamp for unphysical input).
    #[must_use]
    pub fn decompose(&self) -> (Self, Self) {
        if self.is_extinguished() {
            return (Self::unpolarized(0.0), Self::unpolarized(0.0));
        }
        let dop = self.dop();
        let s0 = self.stokes[0];
        let [n1, n2, n3] = self.normalized();
        let norm = (n1 * n1 + n2 * n2 + n3 * n3).sqrt();
        let scale = if norm > INTENSITY_EPSILON { dop * s0 / norm } else { 0.0 };
        let polarized = Self::from_stokes(dop * s0, n1 * scale, n2 * scale, n3 * scale);
        let unpolarized = Self::unpolarized((1.0 - dop) * s0);
        (polarized, unpolarized)
    }
}

impl Default for PolarizationState {
    fn default() -> Self {
        Self::create_linear(1.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_create_linear_components() {
        let s = PolarizationState::create_linear(2.0, 45.0);
        assert!((s.intensity() - 2.0).abs() < TOL);
        assert!(s.s1().abs() < TOL);
        assert!((s.s2() - 2.0).abs() < TOL);
        assert_eq!(s.s3(), 0.0);
    }

    #[test]
    fn test_orientation_round_trips_angle() {
        for angle in [0.0, 30.0, 45.0, 90.0, 135.0, 179.0] {
            let s = PolarizationState::create_linear(1.0, angle);
            assert!((s.orientation_deg() - angle).abs() < 1e-6, "angle {angle}");
        }
    }

    #[test]
    fn test_orientation_wraps_into_half_open_range() {
        let s = PolarizationState::create_linear(1.0, 180.0);
        let o = s.orientation_deg();
        assert!((0.0..180.0).contains(&o));
        assert!(o < 1e-6 || (180.0 - o) < 1e-6);

        let neg = PolarizationState::create_linear(1.0, -30.0);
        assert!((neg.orientation_deg() - 150.0).abs() < 1e-6);
    }

    #[test]
    fn test_circular_ellipticity() {
        let cw = PolarizationState::circular(1.0, true);
        assert!((cw.ellipticity_deg() - 45.0).abs() < TOL);
        assert_eq!(cw.orientation_deg(), 0.0);

        let ccw = PolarizationState::circular(1.0, false);
        assert!((ccw.ellipticity_deg() + 45.0).abs() < TOL);
    }

    #[test]
    fn test_dark_state_fallbacks() {
        let dark = PolarizationState::from_stokes(0.0, 0.0, 0.0, 0.0);
        assert_eq!(dark.orientation_deg(), 0.0);
        assert_eq!(dark.ellipticity_deg(), 0.0);
        assert_eq!(dark.dop(), 0.0);
        assert_eq!(dark.normalized(), [0.0; 3]);
    }

    #[test]
    fn test_unphysical_dop_is_clamped() {
        let s = PolarizationState::from_stokes(1.0, 2.0, 0.0, 3.0);
        assert_eq!(s.dop(), 1.0);
        assert!(s.ellipticity_deg().is_finite());
        assert!((s.ellipticity_deg() - 45.0).abs() < TOL);
    }

    #[test]
    fn test_non_finite_input_sanitized() {
        let s = PolarizationState::from_stokes(f64::NAN, f64::INFINITY, 1.0, -0.5);
        assert_eq!(s.stokes(), [0.0, 0.0, 1.0, -0.5]);
        assert_eq!(s.dop(), 0.0);
        assert!(s.orientation_deg().is_finite());
    }

    #[test]
    fn test_negative_intensity_raised_to_zero() {
        let s = PolarizationState::from_stokes(-1.0, 0.0, 0.0, 0.0);
        assert_eq!(s.intensity(), 0.0);
        assert!(s.is_extinguished());
    }

    #[test]
    fn test_unpolarized_has_zero_dop() {
        let s = PolarizationState::unpolarized(0.8);
        assert_eq!(s.dop(), 0.0);
        assert!((s.intensity() - 0.8).abs() < TOL);
    }

    #[test]
    fn test_decompose_partial_polarization() {
        let s = PolarizationState::from_stokes(1.0, 0.5, 0.0, 0.0);
        let (pol, unpol) = s.decompose();
        assert!((pol.intensity() - 0.5).abs() < TOL);
        assert!((pol.dop() - 1.0).abs() < TOL);
        assert!((unpol.intensity() - 0.5).abs() < TOL);
        assert_eq!(unpol.dop(), 0.0);
        for i in 0..4 {
            assert!((pol.stokes()[i] + unpol.stokes()[i] - s.stokes()[i]).abs() < TOL);
        }
    }
}
