//! Movement simulator: advances a vehicle between two coordinates in 100
//! equal steps, then fires a one-shot completion email.
//!
//! Each run is a detached thread that owns its own [`SimulationRun`]; runs
//! share nothing but the notifier and the run registry. The caller gets a
//! handle it may join or drop — dropping detaches, and there is no
//! cancellation or progress API beyond the registry's status snapshot.
//! Failures inside a run (bad coordinates, rejected email) are logged and
//! recorded, never surfaced: the run has no caller left to report to.
//!
//! Simulated positions are never written back to the business service; they
//! exist only in run state, logs, and the final email. The upstream
//! `actualizar-posicion` endpoint stays untouched by design.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::coords::Coordinate;
use crate::upstream::{EmailMessage, Notifier};

/// Steps per run. Per-step deltas are computed once at creation and never
/// recomputed, so the end position is exactly 100 equal increments.
pub const TOTAL_STEPS: u32 = 100;

/// Real-time pause after each step. Models travel time; process-level, not
/// per-call configurable.
pub const STEP_INTERVAL: Duration = Duration::from_millis(100);

pub type RunId = u64;

/// Registry snapshot of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running { step: u32 },
    /// Terminal. `notified` records whether the completion email was
    /// accepted; a failed send is never retried.
    Completed { notified: bool },
}

/// One in-flight interpolation between two coordinates. Mutated only by the
/// owning run thread.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    vehicle_id: String,
    customer_email: String,
    current_latitude: f64,
    current_longitude: f64,
    delta_latitude: f64,
    delta_longitude: f64,
    step_index: u32,
}

impl SimulationRun {
    pub fn new(
        start: Coordinate,
        end: Coordinate,
        customer_email: &str,
        vehicle_id: &str,
    ) -> Self {
        let steps = f64::from(TOTAL_STEPS);
        Self {
            vehicle_id: vehicle_id.to_string(),
            customer_email: customer_email.to_string(),
            current_latitude: start.latitude,
            current_longitude: start.longitude,
            delta_latitude: (end.latitude - start.latitude) / steps,
            delta_longitude: (end.longitude - start.longitude) / steps,
            step_index: 0,
        }
    }

    /// Add the fixed deltas and bump the step index. Returns the new
    /// position.
    pub fn advance(&mut self) -> Coordinate {
        self.current_latitude += self.delta_latitude;
        self.current_longitude += self.delta_longitude;
        self.step_index += 1;
        self.position()
    }

    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.current_latitude, self.current_longitude)
    }

    pub fn delta(&self) -> (f64, f64) {
        (self.delta_latitude, self.delta_longitude)
    }

    pub fn step_index(&self) -> u32 {
        self.step_index
    }

    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    pub fn is_complete(&self) -> bool {
        self.step_index >= TOTAL_STEPS
    }
}

/// Shared map of run id → status. Cheap to clone; all clones observe the
/// same runs.
#[derive(Debug, Clone, Default)]
pub struct RunRegistry {
    runs: Arc<Mutex<HashMap<RunId, RunStatus>>>,
    next_id: Arc<AtomicU64>,
}

impl RunRegistry {
    fn register(&self) -> RunId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.update(id, RunStatus::Running { step: 0 });
        id
    }

    fn update(&self, id: RunId, status: RunStatus) {
        if let Ok(mut runs) = self.runs.lock() {
            runs.insert(id, status);
        }
    }

    pub fn status(&self, id: RunId) -> Option<RunStatus> {
        self.runs.lock().ok().and_then(|runs| runs.get(&id).copied())
    }
}

/// Handle to a detached run. Dropping it detaches; joining waits until the
/// completion email has been dispatched (or recorded as failed).
#[derive(Debug)]
pub struct RunHandle {
    pub id: RunId,
    join: JoinHandle<()>,
}

impl RunHandle {
    pub fn join(self) {
        let _ = self.join.join();
    }
}

/// Starts and tracks detached simulation runs.
pub struct Simulator {
    notifier: Arc<dyn Notifier>,
    registry: RunRegistry,
    step_interval: Duration,
}

impl Simulator {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self::with_step_interval(notifier, STEP_INTERVAL)
    }

    /// Override the step interval for the whole simulator (tests pass
    /// `Duration::ZERO`). There is no per-call override.
    pub fn with_step_interval(notifier: Arc<dyn Notifier>, step_interval: Duration) -> Self {
        Self {
            notifier,
            registry: RunRegistry::default(),
            step_interval,
        }
    }

    pub fn registry(&self) -> &RunRegistry {
        &self.registry
    }

    /// Start a run. Either coordinate absent is a deliberate silent skip:
    /// a warning is logged and `None` returned — no steps, no email, no
    /// error. Otherwise the run executes on its own thread and the caller
    /// is free to drop the handle.
    pub fn start(
        &self,
        start: Option<Coordinate>,
        end: Option<Coordinate>,
        customer_email: &str,
        vehicle_id: &str,
    ) -> Option<RunHandle> {
        let (Some(start), Some(end)) = (start, end) else {
            log::warn!("skipping simulation for vehicle {vehicle_id}: start or end coordinate missing");
            return None;
        };

        let id = self.registry.register();
        let mut run = SimulationRun::new(start, end, customer_email, vehicle_id);
        let notifier = Arc::clone(&self.notifier);
        let registry = self.registry.clone();
        let step_interval = self.step_interval;

        log::info!(
            "run {id}: vehicle {vehicle_id} from ({:.6}, {:.6}) to ({:.6}, {:.6})",
            start.latitude,
            start.longitude,
            end.latitude,
            end.longitude
        );

        let join = thread::spawn(move || {
            while !run.is_complete() {
                let position = run.advance();
                registry.update(id, RunStatus::Running { step: run.step_index() });
                log::trace!(
                    "run {id}: vehicle {} step {} at ({:.6}, {:.6})",
                    run.vehicle_id(),
                    run.step_index(),
                    position.latitude,
                    position.longitude
                );
                thread::sleep(step_interval);
            }
            let notified = dispatch_completion(notifier.as_ref(), &run);
            registry.update(id, RunStatus::Completed { notified });
        });

        Some(RunHandle { id, join })
    }
}

/// Exactly-once completion email per finished run. A rejected send is
/// logged and recorded via the returned flag, never retried.
fn dispatch_completion(notifier: &dyn Notifier, run: &SimulationRun) -> bool {
    let position = run.position();
    let message = EmailMessage {
        subject: format!("Trayecto del vehículo {} completado", run.vehicle_id),
        recipient: run.customer_email.clone(),
        body_html: format!(
            "<p>El vehículo {} llegó a su destino.</p>\
             <p>Latitud final: {:.6}</p>\
             <p>Longitud final: {:.6}</p>",
            run.vehicle_id, position.latitude, position.longitude
        ),
    };
    match notifier.send_email(&message) {
        Ok(()) => {
            log::info!(
                "run completed: vehicle {} notified {}",
                run.vehicle_id,
                run.customer_email
            );
            true
        }
        Err(err) => {
            log::error!(
                "completion email for vehicle {} failed: {err}",
                run.vehicle_id
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::RecordingNotifier;

    fn instant_simulator(notifier: Arc<RecordingNotifier>) -> Simulator {
        Simulator::with_step_interval(notifier, Duration::ZERO)
    }

    #[test]
    fn deltas_are_fixed_at_creation() {
        let run = SimulationRun::new(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(100.0, 50.0),
            "ana@example.com",
            "V1",
        );
        assert_eq!(run.delta(), (1.0, 0.5));
    }

    #[test]
    fn halfway_position_matches_linear_interpolation() {
        let mut run = SimulationRun::new(
            Coordinate::new(0.0, 0.0),
            Coordinate::new(100.0, 50.0),
            "ana@example.com",
            "V1",
        );
        for _ in 0..50 {
            run.advance();
        }
        let position = run.position();
        assert!((position.latitude - 50.0).abs() < 1e-9);
        assert!((position.longitude - 25.0).abs() < 1e-9);
        assert_eq!(run.step_index(), 50);
        assert!(!run.is_complete());
    }

    #[test]
    fn full_run_reaches_target_and_notifies_once() {
        let notifier = Arc::new(RecordingNotifier::default());
        let simulator = instant_simulator(Arc::clone(&notifier));

        let handle = simulator
            .start(
                Some(Coordinate::new(0.0, 0.0)),
                Some(Coordinate::new(10.0, 0.0)),
                "ana@example.com",
                "V1",
            )
            .expect("run started");
        let id = handle.id;
        handle.join();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1, "exactly one completion email");
        assert_eq!(sent[0].recipient, "ana@example.com");
        assert!(sent[0].subject.contains("V1"));
        assert!(
            sent[0].body_html.contains("10.000000"),
            "body: {}",
            sent[0].body_html
        );
        assert_eq!(
            simulator.registry().status(id),
            Some(RunStatus::Completed { notified: true })
        );
    }

    #[test]
    fn missing_coordinate_skips_silently() {
        let notifier = Arc::new(RecordingNotifier::default());
        let simulator = instant_simulator(Arc::clone(&notifier));

        let handle = simulator.start(
            Some(Coordinate::new(0.0, 0.0)),
            None,
            "ana@example.com",
            "V1",
        );
        assert!(handle.is_none(), "no run, no error");
        assert!(notifier.sent().is_empty(), "no email");
    }

    #[test]
    fn failed_notification_is_recorded_not_retried() {
        let notifier = Arc::new(RecordingNotifier::failing());
        let simulator = instant_simulator(Arc::clone(&notifier));

        let handle = simulator
            .start(
                Some(Coordinate::new(0.0, 0.0)),
                Some(Coordinate::new(1.0, 1.0)),
                "ana@example.com",
                "V1",
            )
            .expect("run started");
        let id = handle.id;
        handle.join();

        assert!(notifier.sent().is_empty());
        assert_eq!(
            simulator.registry().status(id),
            Some(RunStatus::Completed { notified: false })
        );
    }

    #[test]
    fn concurrent_runs_do_not_share_state() {
        let notifier = Arc::new(RecordingNotifier::default());
        let simulator = instant_simulator(Arc::clone(&notifier));

        let first = simulator
            .start(
                Some(Coordinate::new(0.0, 0.0)),
                Some(Coordinate::new(10.0, 0.0)),
                "ana@example.com",
                "V1",
            )
            .expect("first run");
        let second = simulator
            .start(
                Some(Coordinate::new(5.0, 5.0)),
                Some(Coordinate::new(-5.0, 15.0)),
                "ben@example.com",
                "V2",
            )
            .expect("second run");
        assert_ne!(first.id, second.id);
        first.join();
        second.join();

        let mut recipients: Vec<String> = notifier
            .sent()
            .into_iter()
            .map(|message| message.recipient)
            .collect();
        recipients.sort();
        assert_eq!(recipients, ["ana@example.com", "ben@example.com"]);
    }
}
