//! # PolarCraft - a polarized-light kernel with a discovery engine
//!
//! PolarCraft simulates a beam of polarized light travelling through a
//! user-arranged sequence of polarizers and wave plates. It produces a
//! per-segment physical state for rendering and recognizes "discoveries",
//! named physics milestones, from that state and from interaction history.
//!
//! ## Core Concepts
//!
//! - **PolarizationState**: an immutable Stokes vector with derived orientation,
//!   ellipticity and degree of polarization
//! - **MuellerMatrix**: the 4x4 transform of an optical element
//! - **BeamSegment**: one straight piece of the beam, with its state and visual encoding
//! - **Discovery**: a predicate over scene, beam and rotation history whose
//!   achievement is permanent
//! - **Meta-discovery**: earned by holding a fixed set of other discoveries
//!
//! ## Usage
//!
//! ```rust
//! use polarcraft::{calculate_beam_path, Position, SceneElement};
//!
//! let scene = vec![
//!     SceneElement::light_source("lamp", Position::new(0.0, 0.0, 0.0), 1.0),
//!     SceneElement::polarizer("filter", Position::new(1.0, 0.0, 0.0), 60.0),
//! ];
//! let beam = calculate_beam_path(&scene);
//! assert_eq!(beam.len(), 2);
//! assert!((beam[1].intensity() - 0.25).abs() < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Physics
pub mod mueller;
pub mod stokes;

// Scene and propagation
pub mod pipeline;
pub mod scene;
pub mod visual;

// Discovery and progression
pub mod achieved;
pub mod connections;
pub mod discovery;
pub mod history;

// Session
pub mod config;
pub mod engine;
pub mod error;
pub mod schedule;

// Re-export primary types at crate root for convenience
pub use achieved::AchievedSet;
pub use config::{EngineConfig, RotationHistoryConfig};
pub use connections::{
    compute_active_connections, compute_meta_discoveries, Connection, MetaDiscovery,
};
pub use discovery::{
    DiscoveryConfig, DiscoveryContext, DiscoveryEvaluator, DiscoveryEvent, ResponseDescriptor,
};
pub use engine::{EngineRuntime, EngineSnapshot, PolarizationEngine, TickReport};
pub use error::{PolarError, PolarResult, PredicateError, RuntimeError, ValidationError};
pub use history::{RotationHistory, RotationSample};
pub use mueller::MuellerMatrix;
pub use pipeline::{calculate_beam_path, propagation_order, BeamSegment};
pub use scene::{ElementKind, ElementProperties, Position, SceneElement};
pub use schedule::Debouncer;
pub use stokes::PolarizationState;
pub use visual::{polarization_to_visual, Handedness, HslColor, SegmentShape, VisualAttributes};
