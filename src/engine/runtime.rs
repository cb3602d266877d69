//! Single-owner runtime for `PolarizationEngine`.
//!
//! The engine is not shareable: the achieved set and rotation history need a
//! single writer. `EngineRuntime` moves the engine onto a dedicated thread and
//! serializes every mutation through a bounded command queue. The worker
//! sleeps until the next command or the next debounce deadline, whichever
//! comes first, and ticks the engine after each wake-up.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use serde::Serialize;

use crate::achieved::AchievedSet;
use crate::connections::Connection;
use crate::discovery::DiscoveryEvent;
use crate::error::{PolarError, PolarResult, RuntimeError};
use crate::pipeline::BeamSegment;
use crate::scene::SceneElement;

use super::PolarizationEngine;

/// Idle wait when no debounce timer is armed.
const IDLE_WAIT: Duration = Duration::from_millis(500);

/// Point-in-time copy of the engine's outputs.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSnapshot {
    pub segments: Vec<BeamSegment>,
    pub achieved: AchievedSet,
    pub active_connections: Vec<Connection>,
    pub meta_discoveries: Vec<&'static str>,
}

enum Command {
    UpdateScene {
        elements: Vec<SceneElement>,
    },
    RecordRotation {
        element_id: String,
        angle_deg: f64,
    },
    Achieve {
        id: String,
        reply: Sender<Option<DiscoveryEvent>>,
    },
    Snapshot {
        reply: Sender<EngineSnapshot>,
    },
}

/// Handle to an engine running on its own thread.
#[derive(Debug)]
pub struct EngineRuntime {
    tx: Option<Sender<Command>>,
    events: Receiver<DiscoveryEvent>,
    dropped_events: Arc<AtomicU64>,
    queue_capacity: usize,
    join: Option<JoinHandle<()>>,
}

impl EngineRuntime {
    /// Move `engine` onto a worker thread.
    pub fn start(engine: PolarizationEngine) -> PolarResult<Self> {
        let queue_capacity = engine.config().runtime_queue_capacity.max(1);
        let (tx, rx) = bounded::<Command>(queue_capacity);
        let (events_tx, events) = bounded::<DiscoveryEvent>(queue_capacity);
        let dropped_events = Arc::new(AtomicU64::new(0));

        let thread_dropped = Arc::clone(&dropped_events);
        let join = thread::Builder::new()
            .name("polarcraft-engine".to_string())
            .spawn(move || worker_loop(engine, rx, events_tx, thread_dropped))
            .map_err(|e| PolarError::internal(format!("failed to spawn engine worker: {e}")))?;

        Ok(Self {
            tx: Some(tx),
            events,
            dropped_events,
            queue_capacity,
            join: Some(join),
        })
    }

    /// Queue a scene replacement. Never blocks.
    pub fn update_scene(&self, elements: Vec<SceneElement>) -> PolarResult<()> {
        self.submit(Command::UpdateScene { elements })
    }

    /// Queue a rotation sample. Never blocks.
    pub fn record_rotation(&self, element_id: impl Into<String>, angle_deg: f64) -> PolarResult<()> {
        self.submit(Command::RecordRotation {
            element_id: element_id.into(),
            angle_deg,
        })
    }

    /// Achieve `id` and wait for the result.
    pub fn achieve(&self, id: impl Into<String>) -> PolarResult<Option<DiscoveryEvent>> {
        let (reply, rx) = bounded(1);
        self.submit(Command::Achieve { id: id.into(), reply })?;
        rx.recv().map_err(|_| PolarError::from(RuntimeError::Disconnected))
    }

    /// Copy of the committed outputs. Queued commands ahead of this one are
    /// applied and committed first.
    pub fn snapshot(&self) -> PolarResult<EngineSnapshot> {
        let (reply, rx) = bounded(1);
        self.submit(Command::Snapshot { reply })?;
        rx.recv().map_err(|_| PolarError::from(RuntimeError::Disconnected))
    }

    /// Stream of achievements. Events beyond the buffer are dropped.
    #[must_use]
    pub fn events(&self) -> &Receiver<DiscoveryEvent> {
        &self.events
    }

    /// Achievement events dropped because the stream was full.
    #[must_use]
    pub fn dropped_events(&self) -> u64 {
        self.dropped_events.load(Ordering::Relaxed)
    }

    fn submit(&self, cmd: Command) -> PolarResult<()> {
        let tx = self.tx.as_ref().ok_or(RuntimeError::Disconnected)?;
        tx.try_send(cmd).map_err(|e| {
            let err = match e {
                TrySendError::Full(_) => RuntimeError::QueueFull {
                    capacity: self.queue_capacity,
                },
                TrySendError::Disconnected(_) => RuntimeError::Disconnected,
            };
            PolarError::from(err)
        })
    }
}

impl Drop for EngineRuntime {
    fn drop(&mut self) {
        // Closing the queue ends the worker after it drains.
        self.tx.take();
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

fn worker_loop(
    mut engine: PolarizationEngine,
    rx: Receiver<Command>,
    events: Sender<DiscoveryEvent>,
    dropped: Arc<AtomicU64>,
) {
    loop {
        let wait = engine
            .next_deadline()
            .map_or(IDLE_WAIT, |d| d.saturating_duration_since(Instant::now()));

        match rx.recv_timeout(wait) {
            Ok(cmd) => apply(&mut engine, cmd, &events, &dropped),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        publish(engine.tick(Instant::now()).newly_achieved, &events, &dropped);
    }
    tracing::debug!("engine worker stopped");
}

fn apply(
    engine: &mut PolarizationEngine,
    cmd: Command,
    events: &Sender<DiscoveryEvent>,
    dropped: &AtomicU64,
) {
    let now = Instant::now();
    match cmd {
        Command::UpdateScene { elements } => engine.update_scene(elements, now),
        Command::RecordRotation {
            element_id,
            angle_deg,
        } => engine.record_rotation(&element_id, angle_deg, now),
        Command::Achieve { id, reply } => {
            let event = engine.achieve(&id);
            if let Some(ev) = &event {
                publish(vec![ev.clone()], events, dropped);
            }
            let _ = reply.send(event);
        }
        Command::Snapshot { reply } => {
            // Deferred writes land before anyone reads.
            publish(engine.tick(now).newly_achieved, events, dropped);
            let _ = reply.send(EngineSnapshot {
                segments: engine.segments().to_vec(),
                achieved: engine.achieved().clone(),
                active_connections: engine.active_connections(),
                meta_discoveries: engine.meta_discoveries(),
            });
        }
    }
}

fn publish(batch: Vec<DiscoveryEvent>, events: &Sender<DiscoveryEvent>, dropped: &AtomicU64) {
    for ev in batch {
        if events.try_send(ev).is_err() {
            dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::scene::Position;

    fn runtime(cfg: EngineConfig) -> EngineRuntime {
        EngineRuntime::start(PolarizationEngine::new(cfg).unwrap()).unwrap()
    }

    #[test]
    fn test_snapshot_sees_committed_scene() {
        let rt = runtime(EngineConfig::default());
        rt.update_scene(vec![
            SceneElement::light_source("src", Position::new(0.0, 0.0, 0.0), 1.0),
            SceneElement::polarizer("p", Position::new(1.0, 0.0, 0.0), 90.0),
        ])
        .unwrap();

        let snap = rt.snapshot().unwrap();
        assert_eq!(snap.segments.len(), 2);
        assert!(snap.segments[1].intensity() < 1e-9);
    }

    #[test]
    fn test_achieve_round_trip_and_event_stream() {
        let rt = runtime(EngineConfig::default());
        let ev = rt.achieve("sky-polarization").unwrap().unwrap();
        assert_eq!(ev.discovery_id, "sky-polarization");
        assert!(rt.achieve("sky-polarization").unwrap().is_none());

        let streamed = rt.events().recv_timeout(Duration::from_secs(1)).unwrap();
        assert_eq!(streamed.discovery_id, "sky-polarization");

        let snap = rt.snapshot().unwrap();
        assert!(snap.achieved.contains("sky-polarization"));
        assert_eq!(snap.active_connections.len(), 1);
    }

    #[test]
    fn test_debounced_discovery_is_streamed() {
        let rt = runtime(EngineConfig {
            discovery_debounce_ms: 20,
            encoding_debounce_ms: 5_000,
            ..EngineConfig::default()
        });
        rt.update_scene(vec![
            SceneElement::light_source("src", Position::new(0.0, 0.0, 0.0), 1.0),
            SceneElement::polarizer("p", Position::new(1.0, 0.0, 0.0), 0.0),
        ])
        .unwrap();

        let ev = rt.events().recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(ev.discovery_id, "polarizer-placed");
    }

    #[test]
    fn test_drop_joins_worker() {
        let rt = runtime(EngineConfig::default());
        rt.record_rotation("p", 15.0).unwrap();
        drop(rt);
    }
}
