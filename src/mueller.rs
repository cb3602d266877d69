//! Mueller matrices for ideal optical elements.
//!
//! Matrices are cheap to build and are recreated on every propagation pass.
//! Elements compose by applying their matrices one after another along the
//! beam path; the product is not commutative.

use serde::{Deserialize, Serialize};

use crate::scene::{ElementKind, SceneElement};
use crate::stokes::PolarizationState;

/// A 4x4 real matrix acting on Stokes vectors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MuellerMatrix {
    rows: [[f64; 4]; 4],
}

impl MuellerMatrix {
    /// Matrix from row-major entries.
    #[must_use]
    pub const fn from_rows(rows: [[f64; 4]; 4]) -> Self {
        Self { rows }
    }

    /// The identity (free propagation).
    #[must_use]
    pub const fn identity() -> Self {
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Ideal linear polarizer with its transmission axis at `axis_deg`.
    ///
    /// Passes aligned light unattenuated, extinguishes crossed light, and
    /// follows Malus's law in between.
    #[must_use]
    pub fn linear_polarizer(axis_deg: f64) -> Self {
        let two_theta = 2.0 * axis_deg.to_radians();
        let c = two_theta.cos();
        let s = two_theta.sin();
        Self::from_rows([
            [0.5, 0.5 * c, 0.5 * s, 0.0],
            [0.5 * c, 0.5 * c * c, 0.5 * c * s, 0.0],
            [0.5 * s, 0.5 * c * s, 0.5 * s * s, 0.0],
            [0.0, 0.0, 0.0, 0.0],
        ])
    }

    /// Linear retarder with phase delay `retardation_deg` and fast axis at
    /// `fast_axis_deg`.
    #[must_use]
    pub fn waveplate(retardation_deg: f64, fast_axis_deg: f64) -> Self {
        let delta = retardation_deg.to_radians();
        let two_theta = 2.0 * fast_axis_deg.to_radians();
        let (sd, cd) = delta.sin_cos();
        let c = two_theta.cos();
        let s = two_theta.sin();
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c * c + s * s * cd, c * s * (1.0 - cd), -s * sd],
            [0.0, c * s * (1.0 - cd), s * s + c * c * cd, c * sd],
            [0.0, s * sd, -c * sd, cd],
        ])
    }

    /// Quarter-wave plate: retardation of 90 degrees.
    #[must_use]
    pub fn quarter_wave(fast_axis_deg: f64) -> Self {
        Self::waveplate(90.0, fast_axis_deg)
    }

    /// Half-wave plate: retardation of 180 degrees.
    #[must_use]
    pub fn half_wave(fast_axis_deg: f64) -> Self {
        Self::waveplate(180.0, fast_axis_deg)
    }

    /// Optical rotator turning the polarization plane by `angle_deg` without loss.
    #[must_use]
    pub fn rotator(angle_deg: f64) -> Self {
        let two_theta = 2.0 * angle_deg.to_radians();
        let c = two_theta.cos();
        let s = two_theta.sin();
        Self::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, -s, 0.0],
            [0.0, s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Matrix for a scene element, or `None` when the element does not act
    /// on the beam.
    #[must_use]
    pub fn for_element(element: &SceneElement) -> Option<Self> {
        match element.kind {
            ElementKind::Polarizer => Some(Self::linear_polarizer(element.transmission_axis_deg())),
            ElementKind::Waveplate => Some(Self::waveplate(
                element.retardation_deg(),
                element.fast_axis_deg(),
            )),
            _ => None,
        }
    }

    /// Row-major entries.
    #[must_use]
    pub const fn rows(&self) -> [[f64; 4]; 4] {
        self.rows
    }

    /// Matrix-vector product.
    #[must_use]
    pub fn apply(&self, v: [f64; 4]) -> [f64; 4] {
        let mut out = [0.0; 4];
        for (o, row) in out.iter_mut().zip(self.rows.iter()) {
            *o = row.iter().zip(v.iter()).map(|(m, x)| m * x).sum();
        }
        out
    }

    /// Apply to a polarization state, producing a new one.
    #[must_use]
    pub fn transform(&self, state: &PolarizationState) -> PolarizationState {
        let [s0, s1, s2, s3] = self.apply(state.stokes());
        PolarizationState::from_stokes(s0, s1, s2, s3)
    }

    /// The element `self` followed by `next`, i.e. `next * self`.
    #[must_use]
    pub fn then(&self, next: &Self) -> Self {
        let mut rows = [[0.0; 4]; 4];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| next.rows[i][k] * self.rows[k][j]).sum();
            }
        }
        Self::from_rows(rows)
    }
}

impl Default for MuellerMatrix {
    fn default() -> Self {
        Self::identity()
    }
}
