//! Ordered discovery evaluation.
//!
//! One pass walks the not-yet-achieved discoveries in catalogue order and
//! stops at the first satisfied one, so a pass achieves at most one
//! discovery. A failing predicate is logged and skipped.

use crate::achieved::AchievedSet;
use crate::error::PredicateError;

use super::rules::builtin_discoveries;
use super::{DiscoveryConfig, DiscoveryContext, DiscoveryEvent};

/// Evaluates a fixed, ordered list of discoveries.
#[derive(Debug, Clone)]
pub struct DiscoveryEvaluator {
    discoveries: Vec<DiscoveryConfig>,
}

impl Default for DiscoveryEvaluator {
    fn default() -> Self {
        Self::new(builtin_discoveries())
    }
}

impl DiscoveryEvaluator {
    /// Evaluator over `discoveries`, in the given order.
    #[must_use]
    pub fn new(discoveries: Vec<DiscoveryConfig>) -> Self {
        Self { discoveries }
    }

    /// Definitions in evaluation order.
    #[must_use]
    pub fn discoveries(&self) -> &[DiscoveryConfig] {
        &self.discoveries
    }

    /// Look up a definition by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&DiscoveryConfig> {
        self.discoveries.iter().find(|d| d.id == id)
    }

    /// Run one pass and record at most one new achievement.
    pub fn evaluate(
        &self,
        ctx: &DiscoveryContext<'_>,
        achieved: &mut AchievedSet,
    ) -> Option<DiscoveryEvent> {
        for discovery in &self.discoveries {
            if achieved.contains(&discovery.id) {
                continue;
            }
            if !met(discovery, ctx) {
                continue;
            }
            if achieved.achieve(&discovery.id) {
                tracing::info!(
                    discovery_id = %discovery.id,
                    region_id = %discovery.region_id,
                    "discovery achieved"
                );
                return Some(DiscoveryEvent::new(discovery.id.clone()));
            }
        }
        None
    }

    /// Ids whose predicates currently hold, without touching any state.
    #[must_use]
    pub fn satisfied(&self, ctx: &DiscoveryContext<'_>) -> Vec<&str> {
        self.discoveries
            .iter()
            .filter(|d| met(d, ctx))
            .map(|d| d.id.as_str())
            .collect()
    }

    /// Check a single discovery by id; `Ok(false)` for unknown ids.
    pub fn check(&self, id: &str, ctx: &DiscoveryContext<'_>) -> Result<bool, PredicateError> {
        self.get(id).map_or(Ok(false), |d| d.check(ctx))
    }
}

fn met(discovery: &DiscoveryConfig, ctx: &DiscoveryContext<'_>) -> bool {
    match discovery.check(ctx) {
        Ok(hit) => hit,
        Err(err) => {
            tracing::warn!(discovery_id = %discovery.id, error = %err, "discovery predicate failed");
            false
        }
    }
}
