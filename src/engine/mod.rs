//! The engine session.
//!
//! `PolarizationEngine` owns everything that changes over a session: the
//! current scene, the committed beam, the achieved set and the rotation
//! history. Scene edits are recomputed in full immediately, but the result is
//! only committed on the next `tick`, after which any due debounced passes run.
//! The engine is single-threaded; see `runtime` for a thread-owning wrapper.

/// Worker thread owning an engine for multi-threaded hosts.
pub mod runtime;

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::achieved::AchievedSet;
use crate::config::EngineConfig;
use crate::connections::{compute_active_connections, compute_meta_discoveries, Connection};
use crate::discovery::{evaluate_encoding, DiscoveryContext, DiscoveryEvaluator, DiscoveryEvent};
use crate::error::PolarResult;
use crate::history::RotationHistory;
use crate::pipeline::{calculate_beam_path, BeamSegment};
use crate::scene::SceneElement;
use crate::schedule::Debouncer;

pub use runtime::{EngineRuntime, EngineSnapshot};

/// What happened during one `tick`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    /// A recomputed beam was committed.
    pub segments_committed: bool,
    /// The discovery pass ran.
    pub discovery_pass_ran: bool,
    /// The encoding pass ran.
    pub encoding_pass_ran: bool,
    /// Ids added to the achieved set, in the order they were added.
    pub newly_achieved: Vec<DiscoveryEvent>,
}

impl TickReport {
    /// True when nothing was committed, evaluated or achieved.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.segments_committed
            && !self.discovery_pass_ran
            && !self.encoding_pass_ran
            && self.newly_achieved.is_empty()
    }
}

/// Session state plus the scheduling around it.
#[derive(Debug)]
pub struct PolarizationEngine {
    config: EngineConfig,
    evaluator: DiscoveryEvaluator,
    elements: Vec<SceneElement>,
    segments: Vec<BeamSegment>,
    pending: Option<(Vec<SceneElement>, Vec<BeamSegment>)>,
    achieved: AchievedSet,
    history: RotationHistory,
    discovery_timer: Debouncer,
    encoding_timer: Debouncer,
}

impl PolarizationEngine {
    /// Engine with the built-in discovery catalogue.
    pub fn new(config: EngineConfig) -> PolarResult<Self> {
        Self::with_evaluator(config, DiscoveryEvaluator::default())
    }

    /// Engine with a custom discovery catalogue.
    pub fn with_evaluator(config: EngineConfig, evaluator: DiscoveryEvaluator) -> PolarResult<Self> {
        config.validate()?;
        Ok(Self {
            history: RotationHistory::new(config.history.clone()),
            discovery_timer: Debouncer::new(config.discovery_debounce()),
            encoding_timer: Debouncer::new(config.encoding_debounce()),
            config,
            evaluator,
            elements: Vec::new(),
            segments: Vec::new(),
            pending: None,
            achieved: AchievedSet::new(),
        })
    }

    /// Seed the achieved set, e.g. from a persisted session.
    #[must_use]
    pub fn with_achieved(mut self, achieved: AchievedSet) -> Self {
        self.achieved = achieved;
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Replace the scene. The beam is recomputed now; scene and beam are
    /// committed together on the next tick. Both debounced passes are
    /// rescheduled.
    pub fn update_scene(&mut self, elements: Vec<SceneElement>, now: Instant) {
        let segments = calculate_beam_path(&elements);
        self.pending = Some((elements, segments));
        self.discovery_timer.arm(now);
        self.encoding_timer.arm(now);
    }

    /// Record a rotation sample stamped with the current wall-clock time and
    /// reschedule the discovery pass.
    pub fn record_rotation(&mut self, element_id: &str, angle_deg: f64, now: Instant) {
        self.record_rotation_at(element_id, angle_deg, Utc::now(), now);
    }

    /// Record a rotation sample taken at `recorded_at`. Age pruning is
    /// measured from `recorded_at`.
    pub fn record_rotation_at(
        &mut self,
        element_id: &str,
        angle_deg: f64,
        recorded_at: DateTime<Utc>,
        now: Instant,
    ) {
        if self.history.record(element_id, angle_deg, recorded_at) {
            self.history.prune_older_than(recorded_at);
            self.discovery_timer.arm(now);
        }
    }

    /// Add `id` to the achieved set. The only way anything becomes achieved.
    ///
    /// Returns an event only when the id is new.
    pub fn achieve(&mut self, id: &str) -> Option<DiscoveryEvent> {
        if self.achieved.achieve(id) {
            tracing::info!(discovery_id = id, "discovery achieved externally");
            Some(DiscoveryEvent::new(id))
        } else {
            None
        }
    }

    /// Advance to `now`: commit the pending beam, run due passes, and merge
    /// newly satisfied meta-discoveries.
    pub fn tick(&mut self, now: Instant) -> TickReport {
        let mut report = TickReport {
            segments_committed: self.commit_pending(),
            ..TickReport::default()
        };

        if self.discovery_timer.poll(now) {
            report.discovery_pass_ran = true;
            report.newly_achieved.extend(self.run_discovery_pass());
        }

        if self.encoding_timer.poll(now) {
            report.encoding_pass_ran = true;
            report.newly_achieved.extend(self.run_encoding_pass());
        }

        report.newly_achieved.extend(self.merge_meta_discoveries());
        report
    }

    /// Run one discovery pass, bypassing the timer. A pending scene is
    /// committed first.
    pub fn run_discovery_pass(&mut self) -> Option<DiscoveryEvent> {
        self.commit_pending();
        let ctx = DiscoveryContext {
            elements: &self.elements,
            segments: &self.segments,
            history: &self.history,
        };
        self.evaluator.evaluate(&ctx, &mut self.achieved)
    }

    /// Run the encoding pass, bypassing the timer. A pending scene is
    /// committed first.
    pub fn run_encoding_pass(&mut self) -> Vec<DiscoveryEvent> {
        self.commit_pending();
        evaluate_encoding(&self.segments, &mut self.achieved)
    }

    /// Swap in the pending scene and its beam as one unit.
    fn commit_pending(&mut self) -> bool {
        match self.pending.take() {
            Some((elements, segments)) => {
                self.elements = elements;
                self.segments = segments;
                true
            }
            None => false,
        }
    }

    fn merge_meta_discoveries(&mut self) -> Vec<DiscoveryEvent> {
        compute_meta_discoveries(&self.achieved)
            .into_iter()
            .filter_map(|id| {
                self.achieved.achieve(id).then(|| {
                    tracing::info!(meta_id = id, "meta-discovery achieved");
                    DiscoveryEvent::new(id)
                })
            })
            .collect()
    }

    /// Earliest pending timer deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.discovery_timer.deadline(), self.encoding_timer.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// True when a recomputed beam awaits the next tick.
    #[must_use]
    pub const fn has_pending_commit(&self) -> bool {
        self.pending.is_some()
    }

    /// Committed beam segments.
    #[must_use]
    pub fn segments(&self) -> &[BeamSegment] {
        &self.segments
    }

    /// Committed scene; always the one `segments` was computed from.
    #[must_use]
    pub fn elements(&self) -> &[SceneElement] {
        &self.elements
    }

    /// Achieved discovery ids.
    #[must_use]
    pub const fn achieved(&self) -> &AchievedSet {
        &self.achieved
    }

    /// Recorded rotation samples.
    #[must_use]
    pub const fn history(&self) -> &RotationHistory {
        &self.history
    }

    /// The discovery catalogue in use.
    #[must_use]
    pub const fn evaluator(&self) -> &DiscoveryEvaluator {
        &self.evaluator
    }

    /// Connections whose source discovery is achieved.
    #[must_use]
    pub fn active_connections(&self) -> Vec<Connection> {
        compute_active_connections(&self.achieved)
    }

    /// Achieved or currently earned meta-discovery ids.
    #[must_use]
    pub fn meta_discoveries(&self) -> Vec<&'static str> {
        compute_meta_discoveries(&self.achieved)
    }
}
