//! Discovery rule engine.
//!
//! A discovery is a named physics milestone recognized from the current scene,
//! the beam it produces, and the rotation history. Achievements go into the
//! add-only `AchievedSet`; nothing here ever removes one.

/// Encoding ("how the beam is drawn") discoveries.
pub mod encoding;
/// Ordered evaluation with per-predicate isolation.
pub mod evaluator;
/// Built-in discovery catalogue.
pub mod rules;

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PredicateError;
use crate::history::RotationHistory;
use crate::pipeline::BeamSegment;
use crate::scene::SceneElement;

pub use encoding::{evaluate_encoding, satisfied_encodings};
pub use evaluator::DiscoveryEvaluator;
pub use rules::builtin_discoveries;

/// Opaque description of how the environment reacts to a discovery.
/// The kernel never interprets it.
pub type ResponseDescriptor = serde_json::Value;

/// Predicate over the live simulation state.
pub type Predicate =
    Arc<dyn Fn(&DiscoveryContext<'_>) -> Result<bool, PredicateError> + Send + Sync>;

/// Everything a predicate may look at.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryContext<'a> {
    pub elements: &'a [SceneElement],
    pub segments: &'a [BeamSegment],
    pub history: &'a RotationHistory,
}

/// Static definition of one discovery.
#[derive(Clone)]
pub struct DiscoveryConfig {
    /// Stable id stored in the achieved set.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Region the discovery belongs to.
    pub region_id: String,
    /// Environment response, passed through to the renderer.
    pub response: ResponseDescriptor,
    predicate: Predicate,
}

impl DiscoveryConfig {
    /// Definition in the `light-lab` region with a null response.
    pub fn new<F>(id: impl Into<String>, name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&DiscoveryContext<'_>) -> Result<bool, PredicateError> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            name: name.into(),
            region_id: rules::LIGHT_LAB.to_string(),
            response: ResponseDescriptor::Null,
            predicate: Arc::new(predicate),
        }
    }

    /// Move the discovery to another region.
    #[must_use]
    pub fn with_region(mut self, region_id: impl Into<String>) -> Self {
        self.region_id = region_id.into();
        self
    }

    /// Attach an environment response.
    #[must_use]
    pub fn with_response(mut self, response: ResponseDescriptor) -> Self {
        self.response = response;
        self
    }

    /// Run the predicate. A panic inside it is reported as
    /// `PredicateError::Panicked`.
    pub fn check(&self, ctx: &DiscoveryContext<'_>) -> Result<bool, PredicateError> {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.predicate)(ctx))) {
            Ok(result) => result,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_string());
                Err(PredicateError::Panicked {
                    discovery_id: self.id.clone(),
                    message,
                })
            }
        }
    }
}

impl fmt::Debug for DiscoveryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiscoveryConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("region_id", &self.region_id)
            .field("response", &self.response)
            .finish_non_exhaustive()
    }
}

/// A discovery that was newly added to the achieved set.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryEvent {
    pub event_id: Uuid,
    pub discovery_id: String,
    pub achieved_at: DateTime<Utc>,
}

impl DiscoveryEvent {
    /// Event for `discovery_id`, stamped now.
    #[must_use]
    pub fn new(discovery_id: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            discovery_id: discovery_id.into(),
            achieved_at: Utc::now(),
        }
    }
}
