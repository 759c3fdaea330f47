use std::ops::DerefMut;

use crate::settings::Settings;
use crate::warehouse::Warehouse;
use crate::Error;

/* ---------- */

/// A worker is a thread that acts on a [`Warehouse`] until the warehouse stops.
///
/// Workers are defined by one main method, [`Worker::run`], which runs the actual loop. Its default
/// implementation calls [`Worker::on_start`] once, then [`Worker::on_update`] for as long as the
/// warehouse is running and the update doesn't return [`ControlFlow::Break`].
///
/// Default implementations are provided for the last two:
/// * [`Worker::on_start`] does nothing and returns immediately.
/// * [`Worker::on_update`] does nothing and returns [`ControlFlow::Break`] immediately.
///
/// # Examples
///
/// A worker restocking the warehouse with the same item until it stops:
///
/// ```
/// # use std::sync::Arc;
/// # use warehouse::*;
/// struct Restocker;
///
/// impl Worker for Restocker {
///     fn on_update(&mut self, warehouse: &Warehouse) -> ControlFlow {
///         match warehouse.supply(Actor::supplier(0), Item::normal(1)) {
///             Ok(Admission::Committed(())) => ControlFlow::Continue,
///             _ => ControlFlow::Break,
///         }
///     }
/// }
///
/// let warehouse = Arc::new(Warehouse::new(Plan::default(), Silent));
/// let mut runtime = Runtime::new(warehouse.clone());
///
/// runtime.launch(Restocker).unwrap();
/// # while warehouse.occupancy().total() < warehouse.capacity() {
/// #     std::thread::yield_now();
/// # }
/// warehouse.shutdown();
/// runtime.wait();
/// ```
pub trait Worker: Send {
    /// Called once before entering the loop. By default, this does nothing.
    #[inline]
    fn on_start(&mut self, warehouse: &Warehouse) {
        let _ = warehouse;
    }

    /// One iteration of the loop.
    ///
    /// By default, this method just returns [`ControlFlow::Break`].
    #[inline]
    fn on_update(&mut self, warehouse: &Warehouse) -> ControlFlow {
        let _ = warehouse;
        ControlFlow::Break
    }

    /// Main loop of the worker, run in its own thread by the [`Runtime`].
    ///
    /// By default, this first calls [`Worker::on_start`] then [`Worker::on_update`] in a loop that spins
    /// until [`Warehouse::is_running`] returns `false`.
    ///
    /// [`Runtime`]: crate::Runtime
    #[inline]
    fn run(&mut self, warehouse: &Warehouse) {
        self.on_start(warehouse);

        while warehouse.is_running() {
            if let ControlFlow::Break = self.on_update(warehouse) {
                break;
            }
        }
    }
}

impl<T: Worker + ?Sized> Worker for Box<T> {
    #[inline]
    fn on_start(&mut self, warehouse: &Warehouse) {
        self.deref_mut().on_start(warehouse)
    }

    #[inline]
    fn on_update(&mut self, warehouse: &Warehouse) -> ControlFlow {
        self.deref_mut().on_update(warehouse)
    }

    #[inline]
    fn run(&mut self, warehouse: &Warehouse) {
        self.deref_mut().run(warehouse)
    }
}

/* ---------- */

/// A worker configuration, consumed by [`Runtime::launch_from_context`] to build the worker.
///
/// Contexts also carry the thread [`Settings`] and the CPUs to pin the thread to.
///
/// [`Runtime::launch_from_context`]: crate::Runtime::launch_from_context
pub trait Context {
    /// The type of [`Worker`] built from this context.
    type Target: Worker;

    /// Consumes `self` to build the targeted [`Worker`].
    fn into_worker(self) -> Result<Self::Target, Error>;

    /// Returns the [`Settings`] of the worker's thread.
    ///
    /// By default, it returns default thread settings.
    #[inline]
    fn settings(&self) -> Settings {
        Settings::default()
    }

    /// Returns the CPU IDs to pin the worker's thread to.
    ///
    /// By default, it returns `None`.
    #[inline]
    fn core_pinning(&self) -> Option<Vec<usize>> {
        None
    }
}

/* ---------- */

/// Tells a worker's loop whether to keep going.
#[derive(Debug, PartialEq)]
pub enum ControlFlow {
    /// Run another iteration.
    Continue,
    /// Leave the loop.
    Break,
}
