//! Cross-region discovery connections and meta-discoveries.
//!
//! Both are static tables; whether a connection is active or a
//! meta-discovery is earned is a pure function of the achieved set.

use serde::Serialize;

use crate::achieved::AchievedSet;
use crate::discovery::encoding::{
    ENCODING_COLOR, ENCODING_CONTRAST, ENCODING_OPACITY, ENCODING_SHAPE,
};
use crate::discovery::rules::{
    CIRCULAR_POLARIZATION, CROSSED_POLARIZERS, HALF_WAVE_ROTATION, LIGHT_LAB, MALUS_LAW_BASIC,
    POLARIZER_PLACED, WAVEPLATE_TUNING,
};

/// Region of birefringent crystals.
pub const CRYSTAL_CAVERN: &str = "crystal-cavern";
/// Region of atmospheric scattering.
pub const SKY_DOME: &str = "sky-dome";

/// A link from a discovery in one region to a related one in another.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub from_region_id: &'static str,
    pub from_discovery_id: &'static str,
    pub to_region_id: &'static str,
    pub to_discovery_id: &'static str,
    pub tag: &'static str,
}

/// A discovery earned by holding a fixed set of other discoveries.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetaDiscovery {
    pub id: &'static str,
    pub name: &'static str,
    /// `(region_id, discovery_id)` pairs.
    pub requires: &'static [(&'static str, &'static str)],
}

impl MetaDiscovery {
    /// True when every required discovery is achieved.
    #[must_use]
    pub fn is_satisfied(&self, achieved: &AchievedSet) -> bool {
        self.requires.iter().all(|(_, id)| achieved.contains(id))
    }
}

const fn link(
    from: (&'static str, &'static str),
    to: (&'static str, &'static str),
    tag: &'static str,
) -> Connection {
    Connection {
        from_region_id: from.0,
        from_discovery_id: from.1,
        to_region_id: to.0,
        to_discovery_id: to.1,
        tag,
    }
}

/// Every known connection.
pub const CONNECTIONS: &[Connection] = &[
    link(
        (LIGHT_LAB, MALUS_LAW_BASIC),
        (CRYSTAL_CAVERN, "birefringence-split"),
        "intensity",
    ),
    link(
        (LIGHT_LAB, CROSSED_POLARIZERS),
        (CRYSTAL_CAVERN, "stress-birefringence"),
        "extinction",
    ),
    link(
        (LIGHT_LAB, CIRCULAR_POLARIZATION),
        (SKY_DOME, "chiral-scattering"),
        "handedness",
    ),
    link(
        (LIGHT_LAB, HALF_WAVE_ROTATION),
        (CRYSTAL_CAVERN, "optical-rotation"),
        "rotation",
    ),
    link(
        (SKY_DOME, "sky-polarization"),
        (LIGHT_LAB, POLARIZER_PLACED),
        "orientation",
    ),
    link(
        (CRYSTAL_CAVERN, "brewster-angle"),
        (SKY_DOME, "sky-polarization"),
        "reflection",
    ),
];

/// Every known meta-discovery.
pub const META_DISCOVERIES: &[MetaDiscovery] = &[
    MetaDiscovery {
        id: "polarization-fundamentals",
        name: "Polarization Fundamentals",
        requires: &[
            (LIGHT_LAB, POLARIZER_PLACED),
            (LIGHT_LAB, CROSSED_POLARIZERS),
            (LIGHT_LAB, MALUS_LAW_BASIC),
        ],
    },
    MetaDiscovery {
        id: "waveplate-mastery",
        name: "Waveplate Mastery",
        requires: &[
            (LIGHT_LAB, CIRCULAR_POLARIZATION),
            (LIGHT_LAB, HALF_WAVE_ROTATION),
            (LIGHT_LAB, WAVEPLATE_TUNING),
        ],
    },
    MetaDiscovery {
        id: "visual-literacy",
        name: "Reading the Beam",
        requires: &[
            (LIGHT_LAB, ENCODING_COLOR),
            (LIGHT_LAB, ENCODING_OPACITY),
            (LIGHT_LAB, ENCODING_SHAPE),
            (LIGHT_LAB, ENCODING_CONTRAST),
        ],
    },
    MetaDiscovery {
        id: "grand-unification",
        name: "One Light, Many Worlds",
        requires: &[
            (LIGHT_LAB, MALUS_LAW_BASIC),
            (CRYSTAL_CAVERN, "birefringence-split"),
            (SKY_DOME, "sky-polarization"),
        ],
    },
];

/// Connections whose source discovery has been achieved.
#[must_use]
pub fn compute_active_connections(achieved: &AchievedSet) -> Vec<Connection> {
    CONNECTIONS
        .iter()
        .filter(|c| achieved.contains(c.from_discovery_id))
        .copied()
        .collect()
}

/// Meta-discovery ids that are already achieved or newly satisfied.
///
/// The caller merges the result into the achieved set.
#[must_use]
pub fn compute_meta_discoveries(achieved: &AchievedSet) -> Vec<&'static str> {
    META_DISCOVERIES
        .iter()
        .filter(|m| achieved.contains(m.id) || m.is_satisfied(achieved))
        .map(|m| m.id)
        .collect()
}
