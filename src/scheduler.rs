//! Fixed-rate cadences driven by frame time
//!
//! The frontend hands in wall-clock frame deltas; the scheduler turns them
//! into discrete firings of named cadences (physics, AI, scroll). Firings
//! come out of `poll` in due-time order, ties broken by registration order.
//!
//! Frame deltas are capped at `MAX_FRAME_DT` and each cadence fires at most
//! `MAX_SUBSTEPS` times per frame; any backlog beyond that is dropped so a
//! long stall never turns into a burst of catch-up ticks.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS};

/// Handle to a registered cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CadenceId(usize);

/// Slack for float drift when comparing due times
const DUE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone)]
struct Cadence {
    name: &'static str,
    period: f64,
    next_due: f64,
    fired_this_frame: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    cadences: Vec<Cadence>,
    now: f64,
    running: bool,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cadence firing `hz` times per second. Registration order
    /// breaks ties between cadences due at the same instant.
    pub fn register(&mut self, name: &'static str, hz: u32) -> CadenceId {
        let period = 1.0 / hz.max(1) as f64;
        self.cadences.push(Cadence {
            name,
            period,
            next_due: self.now + period,
            fired_this_frame: 0,
        });
        CadenceId(self.cadences.len() - 1)
    }

    pub fn name(&self, id: CadenceId) -> &'static str {
        self.cadences[id.0].name
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// (Re)start every cadence; the first firing is one period from now
    pub fn start(&mut self) {
        self.running = true;
        for cadence in &mut self.cadences {
            cadence.next_due = self.now + cadence.period;
            cadence.fired_this_frame = 0;
        }
        log::debug!("Scheduler started ({} cadences)", self.cadences.len());
    }

    /// Stop every cadence at once; pending firings are discarded
    pub fn cancel_all(&mut self) {
        if self.running {
            log::debug!("Scheduler cancelled at t={:.3}", self.now);
        }
        self.running = false;
    }

    /// Advance the clock by one frame
    pub fn advance(&mut self, frame_dt: f64) {
        if !self.running {
            return;
        }
        let dt = if frame_dt.is_finite() {
            frame_dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        self.now += dt;
        for cadence in &mut self.cadences {
            cadence.fired_this_frame = 0;
        }
    }

    /// Next due firing of this frame, if any
    pub fn poll(&mut self) -> Option<CadenceId> {
        if !self.running {
            return None;
        }
        let now = self.now;
        let ready = |c: &Cadence| {
            c.next_due <= now + DUE_EPSILON && c.fired_this_frame < MAX_SUBSTEPS
        };
        // Earliest due time, then the first registered cadence due by then
        let earliest = self
            .cadences
            .iter()
            .filter(|&c| ready(c))
            .map(|c| c.next_due)
            .reduce(f64::min);
        let due = earliest.and_then(|t| {
            self.cadences
                .iter()
                .position(|c| ready(c) && c.next_due <= t + DUE_EPSILON)
        });

        match due {
            Some(i) => {
                let cadence = &mut self.cadences[i];
                cadence.next_due += cadence.period;
                cadence.fired_this_frame += 1;
                Some(CadenceId(i))
            }
            None => {
                self.drop_backlog();
                None
            }
        }
    }

    /// Cadences that hit the per-frame cap skip whatever they still owe
    fn drop_backlog(&mut self) {
        let now = self.now;
        for cadence in &mut self.cadences {
            let mut dropped = 0u32;
            while cadence.next_due <= now + DUE_EPSILON {
                cadence.next_due += cadence.period;
                dropped += 1;
            }
            if dropped > 0 {
                log::debug!("{}: dropped {} late firings", cadence.name, dropped);
            }
        }
    }
}
