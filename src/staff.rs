use std::time::{Duration, Instant};

use crate::error::Error;
use crate::item::Item;
use crate::observer::{Actor, Role};
use crate::settings::Settings;
use crate::signal::Interrupt;
use crate::warehouse::{Admission, Warehouse};
use crate::worker::{Context, ControlFlow, Worker};

/* ---------- */

/// Longest uninterrupted sleep of a pacing worker.
const PACING_SLICE: Duration = Duration::from_millis(50);

/// Sleeps for `delay`, waking up early if the warehouse stops.
fn pace(delay: Duration, warehouse: &Warehouse) {
    let deadline = Instant::now() + delay;

    while warehouse.is_running() {
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            break;
        }

        std::thread::sleep(left.min(PACING_SLICE));
    }
}

/* ---------- */

/// The configuration of one supplier or retailer thread.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    actor: Actor,
    delay: Duration,
    urgent_ratio: f64,
    cores: Option<Vec<usize>>,
}

impl Assignment {
    /// Returns the assignment of the `id`-th supplier, drawing urgent items with probability `urgent_ratio`.
    #[inline]
    pub fn supplier(id: usize, delay: Duration, urgent_ratio: f64) -> Self {
        Self {
            actor: Actor::supplier(id),
            delay,
            urgent_ratio,
            cores: None,
        }
    }

    /// Returns the assignment of the `id`-th retailer.
    #[inline]
    pub fn retailer(id: usize, delay: Duration) -> Self {
        Self {
            actor: Actor::retailer(id),
            delay,
            urgent_ratio: 0.0,
            cores: None,
        }
    }

    /// Pins the thread to `cores`.
    #[inline]
    pub fn pinned(mut self, cores: Vec<usize>) -> Self {
        self.cores = Some(cores);
        self
    }

    /// Returns who the worker acts as.
    #[inline]
    pub fn actor(&self) -> Actor {
        self.actor
    }
}

impl Context for Assignment {
    type Target = Box<dyn Worker>;

    fn into_worker(self) -> Result<Self::Target, Error> {
        match self.actor.role {
            Role::Supplier => Ok(Box::new(Supplier {
                actor: self.actor,
                delay: self.delay,
                urgent_ratio: self.urgent_ratio,
            })),
            Role::Retailer => Ok(Box::new(Retailer {
                actor: self.actor,
                delay: self.delay,
            })),
            Role::Console => Err(Error::config("the console isn't a pooled worker")),
        }
    }

    #[inline]
    fn settings(&self) -> Settings {
        Settings::for_actor(self.actor)
    }

    #[inline]
    fn core_pinning(&self) -> Option<Vec<usize>> {
        self.cores.clone()
    }
}

/* ---------- */

/// Generates random items and supplies them, one per delay.
#[derive(Debug)]
pub struct Supplier {
    actor: Actor,
    delay: Duration,
    urgent_ratio: f64,
}

impl Worker for Supplier {
    fn on_start(&mut self, _: &Warehouse) {
        tracing::debug!(actor = %self.actor, "supplier started");
    }

    fn on_update(&mut self, warehouse: &Warehouse) -> ControlFlow {
        let item = Item::random(&mut rand::thread_rng(), self.urgent_ratio);

        pace(self.delay, warehouse);
        if !warehouse.is_running() {
            return ControlFlow::Break;
        }

        match warehouse.supply(self.actor, item) {
            Ok(Admission::Committed(())) => ControlFlow::Continue,
            Ok(Admission::Stopped) => ControlFlow::Break,
            Err(err) => {
                tracing::warn!(actor = %self.actor, %err, "supply failed");
                ControlFlow::Continue
            }
        }
    }
}

/* ---------- */

/// Takes items out of the warehouse, one per delay.
#[derive(Debug)]
pub struct Retailer {
    actor: Actor,
    delay: Duration,
}

impl Worker for Retailer {
    fn on_start(&mut self, _: &Warehouse) {
        tracing::debug!(actor = %self.actor, "retailer started");
    }

    fn on_update(&mut self, warehouse: &Warehouse) -> ControlFlow {
        match warehouse.retail(self.actor) {
            Admission::Committed(_) => {
                pace(self.delay, warehouse);
                ControlFlow::Continue
            }
            Admission::Stopped => ControlFlow::Break,
        }
    }
}

/* ---------- */

/// Turns an [`Interrupt`] into a warehouse shutdown.
///
/// Signal handlers only raise the flag; the supervisor polls it and does the actual
/// transition from a regular thread. It exits as soon as the warehouse stops, whoever stopped it.
#[derive(Debug)]
pub struct Supervisor {
    interrupt: Interrupt,
    poll: Duration,
}

impl Supervisor {
    /// Returns a supervisor checking `interrupt` every 20ms.
    #[inline]
    pub fn new(interrupt: Interrupt) -> Self {
        Self::with_poll(interrupt, Duration::from_millis(20))
    }

    /// Returns a supervisor checking `interrupt` every `poll`.
    #[inline]
    pub fn with_poll(interrupt: Interrupt, poll: Duration) -> Self {
        Self { interrupt, poll }
    }
}

impl Worker for Supervisor {
    fn on_update(&mut self, warehouse: &Warehouse) -> ControlFlow {
        if self.interrupt.is_raised() {
            tracing::info!("interrupt received, stopping the warehouse");
            warehouse.shutdown();
            return ControlFlow::Break;
        }

        std::thread::sleep(self.poll);
        ControlFlow::Continue
    }
}

/* ---------- */
