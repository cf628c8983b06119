//! Event system for run monitoring.
//!
//! The orchestrator reports progress through a [`SolverEventSupport`]
//! broadcaster. Listeners receive:
//!
//! - **Status updates** after every phase (epoch, phase, solution count)
//! - **Best route updates** whenever the global best tour improves
//! - Run started/ended notifications
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use tourforge_solver::event::{
//!     BestRouteUpdate, CountingEventListener, SolverEventSupport, StatusUpdate,
//! };
//!
//! let listener = Arc::new(CountingEventListener::new());
//! let mut support = SolverEventSupport::new();
//! support.add_listener(listener.clone());
//!
//! support.fire_status(&StatusUpdate { epoch: 1, phase: 1, solutions_counter: 4 });
//! assert_eq!(listener.status_count(), 1);
//!
//! support.close();
//! support.fire_best_route(&BestRouteUpdate { points: Vec::new() });
//! assert_eq!(listener.best_route_count(), 0);
//! ```

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tourforge_core::{total_distance, Point};
use tracing::debug;

/// Progress report emitted after every phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub epoch: u64,
    /// 1 for recombination, 2 for local search.
    pub phase: u8,
    pub solutions_counter: u64,
}

/// New global best tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestRouteUpdate {
    pub points: Vec<Point>,
}

impl BestRouteUpdate {
    pub fn distance(&self) -> f64 {
        total_distance(&self.points)
    }
}

/// Outbound event as carried over a channel or the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SolverEvent {
    Status(StatusUpdate),
    BestRoute(BestRouteUpdate),
}

/// Listener for run events.
pub trait SolverEventListener: Send + Sync + Debug {
    /// Called after every phase, whether it completed or timed out.
    fn on_status(&self, status: &StatusUpdate);

    /// Called when the global best tour improves.
    fn on_best_route(&self, update: &BestRouteUpdate);

    /// Called when a run starts.
    fn on_run_started(&self, _point_count: usize) {}

    /// Called when a run ends without being cancelled.
    fn on_run_ended(&self, _best_distance: f64) {}
}

/// Central event broadcaster.
///
/// Listeners are called synchronously in registration order. Once
/// [`close`](Self::close)d, every further event is dropped.
pub struct SolverEventSupport {
    listeners: Vec<Arc<dyn SolverEventListener>>,
    closed: AtomicBool,
}

impl SolverEventSupport {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn add_listener(&mut self, listener: Arc<dyn SolverEventListener>) {
        self.listeners.push(listener);
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }

    /// Stops delivery of all further events.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn fire_status(&self, status: &StatusUpdate) {
        if self.is_closed() {
            return;
        }
        for listener in &self.listeners {
            listener.on_status(status);
        }
    }

    pub fn fire_best_route(&self, update: &BestRouteUpdate) {
        if self.is_closed() {
            return;
        }
        for listener in &self.listeners {
            listener.on_best_route(update);
        }
    }

    pub fn fire_run_started(&self, point_count: usize) {
        if self.is_closed() {
            return;
        }
        for listener in &self.listeners {
            listener.on_run_started(point_count);
        }
    }

    pub fn fire_run_ended(&self, best_distance: f64) {
        if self.is_closed() {
            return;
        }
        for listener in &self.listeners {
            listener.on_run_ended(best_distance);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn has_listeners(&self) -> bool {
        !self.listeners.is_empty()
    }
}

impl Default for SolverEventSupport {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for SolverEventSupport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolverEventSupport")
            .field("listeners", &self.listeners.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Forwards events into a tokio unbounded channel.
///
/// The receiving side sees the channel close once the run has dropped its
/// broadcaster.
#[derive(Debug, Clone)]
pub struct ChannelEventListener {
    sender: mpsc::UnboundedSender<SolverEvent>,
}

impl ChannelEventListener {
    pub fn new(sender: mpsc::UnboundedSender<SolverEvent>) -> Self {
        Self { sender }
    }

    /// Creates a listener together with the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SolverEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl SolverEventListener for ChannelEventListener {
    fn on_status(&self, status: &StatusUpdate) {
        // A dropped receiver just means nobody is listening any more.
        let _ = self.sender.send(SolverEvent::Status(*status));
    }

    fn on_best_route(&self, update: &BestRouteUpdate) {
        let _ = self.sender.send(SolverEvent::BestRoute(update.clone()));
    }
}

/// Logs every event at DEBUG level.
#[derive(Debug, Clone, Default)]
pub struct LoggingEventListener {
    prefix: String,
}

impl LoggingEventListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl SolverEventListener for LoggingEventListener {
    fn on_status(&self, status: &StatusUpdate) {
        debug!(
            prefix = %self.prefix,
            epoch = status.epoch,
            phase = status.phase,
            solutions = status.solutions_counter,
            "status update"
        );
    }

    fn on_best_route(&self, update: &BestRouteUpdate) {
        debug!(
            prefix = %self.prefix,
            points = update.points.len(),
            distance = update.distance(),
            "best route update"
        );
    }

    fn on_run_started(&self, point_count: usize) {
        debug!(prefix = %self.prefix, points = point_count, "run started");
    }

    fn on_run_ended(&self, best_distance: f64) {
        debug!(prefix = %self.prefix, distance = best_distance, "run ended");
    }
}

/// Counts and keeps every event it receives.
///
/// Useful for testing.
#[derive(Debug, Default)]
pub struct CountingEventListener {
    status_count: AtomicUsize,
    best_route_count: AtomicUsize,
    run_started_count: AtomicUsize,
    run_ended_count: AtomicUsize,
    statuses: Mutex<Vec<StatusUpdate>>,
    best_distances: Mutex<Vec<f64>>,
}

impl CountingEventListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status_count(&self) -> usize {
        self.status_count.load(Ordering::SeqCst)
    }

    pub fn best_route_count(&self) -> usize {
        self.best_route_count.load(Ordering::SeqCst)
    }

    pub fn run_started_count(&self) -> usize {
        self.run_started_count.load(Ordering::SeqCst)
    }

    pub fn run_ended_count(&self) -> usize {
        self.run_ended_count.load(Ordering::SeqCst)
    }

    /// Every status update received, in order.
    pub fn statuses(&self) -> Vec<StatusUpdate> {
        self.statuses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Distance of every best route received, in order.
    pub fn best_distances(&self) -> Vec<f64> {
        self.best_distances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Total number of status and best route events.
    pub fn event_count(&self) -> usize {
        self.status_count() + self.best_route_count()
    }
}

impl SolverEventListener for CountingEventListener {
    fn on_status(&self, status: &StatusUpdate) {
        self.status_count.fetch_add(1, Ordering::SeqCst);
        self.statuses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(*status);
    }

    fn on_best_route(&self, update: &BestRouteUpdate) {
        self.best_route_count.fetch_add(1, Ordering::SeqCst);
        self.best_distances
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(update.distance());
    }

    fn on_run_started(&self, _point_count: usize) {
        self.run_started_count.fetch_add(1, Ordering::SeqCst);
    }

    fn on_run_ended(&self, _best_distance: f64) {
        self.run_ended_count.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
