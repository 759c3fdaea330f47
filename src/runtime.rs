use std::sync::Arc;
use std::thread::JoinHandle;

use crate::config::Config;
use crate::settings::Settings;
use crate::staff::Assignment;
use crate::warehouse::Warehouse;
use crate::worker::{Context, Worker};
use crate::Error;

/* ---------- */

/// Runs [`Workers`] threads around a shared [`Warehouse`].
///
/// When dropped, a runtime stops the warehouse and waits for all the workers to complete.
///
/// [`Workers`]: crate::Worker
pub struct Runtime {
    warehouse: Arc<Warehouse>,
    threads: Vec<JoinHandle<()>>,
}

impl Runtime {
    /// Returns a runtime with no worker yet.
    #[inline]
    pub fn new(warehouse: Arc<Warehouse>) -> Self {
        Self {
            warehouse,
            threads: Vec::new(),
        }
    }

    /// Returns the warehouse the workers act on.
    #[inline]
    pub fn warehouse(&self) -> &Arc<Warehouse> {
        &self.warehouse
    }

    /// Returns the number of threads waited for by [`Runtime::wait`].
    #[inline]
    pub fn workers(&self) -> usize {
        self.threads.len()
    }

    /// Runs a [`Worker`] in a new thread.
    ///
    /// # Errors
    ///
    /// On error, the corresponding error is returned and the warehouse is stopped.
    #[inline]
    pub fn launch<W: Worker + 'static>(&mut self, worker: W) -> Result<(), Error> {
        self.inner_spawn_thread(worker, Settings::default(), None)
    }

    /// Runs a [`Worker`] in a new thread configured with `settings`.
    ///
    /// # Errors
    ///
    /// On error, the corresponding error is returned and the warehouse is stopped.
    #[inline]
    pub fn launch_with_settings<W: Worker + 'static>(
        &mut self,
        worker: W,
        settings: Settings,
    ) -> Result<(), Error> {
        self.inner_spawn_thread(worker, settings, None)
    }

    /// Runs a [`Worker`] in a new thread whose affinity is set to `cores`.
    ///
    /// # Errors
    ///
    /// On error, the corresponding error is returned and the warehouse is stopped.
    #[inline]
    pub fn launch_pinned<W, C>(&mut self, worker: W, cores: C) -> Result<(), Error>
    where
        W: Worker + 'static,
        C: Into<Vec<usize>>,
    {
        self.inner_spawn_thread(worker, Settings::default(), Some(cores.into()))
    }

    /// Runs a [`Worker`] built from a [`Context`] in a new thread.
    ///
    /// The thread is configured with [`Context::settings`] and pinned with [`Context::core_pinning`].
    ///
    /// # Errors
    ///
    /// On error, the corresponding error is returned and the warehouse is stopped.
    #[inline]
    pub fn launch_from_context<W, C>(&mut self, ctx: C) -> Result<(), Error>
    where
        W: Worker + 'static,
        C: Context<Target = W>,
    {
        let settings = ctx.settings();
        let cores = ctx.core_pinning();
        let worker = ctx.into_worker().inspect_err(|_| {
            self.warehouse.shutdown();
        })?;

        self.inner_spawn_thread(worker, settings, cores)
    }

    /// Runs a [`Worker`] in a thread that is never joined.
    ///
    /// Meant for workers that may stay parked on something other than the warehouse,
    /// like a blocking read on stdin.
    ///
    /// # Errors
    ///
    /// Returns the error if the thread couldn't be spawned. The warehouse keeps running.
    pub fn launch_detached<W: Worker + 'static>(
        &mut self,
        worker: W,
        settings: Settings,
    ) -> Result<(), Error> {
        spawn_thread(worker, settings, None, &self.warehouse)?;
        Ok(())
    }

    /// Launches one thread per configured supplier and retailer.
    ///
    /// When CPUs are given in `config`, workers are pinned to them in turn.
    ///
    /// # Errors
    ///
    /// Stops at the first thread that can't be spawned, the warehouse is then stopped.
    pub fn staff(&mut self, config: &Config) -> Result<(), Error> {
        let plan = config.plan();
        let suppliers = (0..plan.suppliers)
            .map(|id| Assignment::supplier(id, config.supply_delay, config.urgent_ratio));
        let retailers = (0..plan.retailers).map(|id| Assignment::retailer(id, config.retail_delay));

        for (nth, assignment) in suppliers.chain(retailers).enumerate() {
            let assignment = match config.cores.get(nth % config.cores.len().max(1)) {
                Some(core) => assignment.pinned(vec![*core]),
                None => assignment,
            };

            self.launch_from_context(assignment)?;
        }

        tracing::info!(
            suppliers = plan.suppliers,
            retailers = plan.retailers,
            "staff launched"
        );
        Ok(())
    }

    /// Blocks the calling thread until all the runtime's workers stop.
    ///
    /// Workers stop once the warehouse does, this returns after a shutdown.
    pub fn wait(&mut self) {
        for thread in self.threads.drain(..) {
            let name = thread.thread().name().map(str::to_owned);

            if thread.join().is_err() {
                tracing::error!(thread = ?name, "worker panicked");
            }
        }
    }

    #[inline]
    fn inner_spawn_thread<W>(
        &mut self,
        worker: W,
        settings: Settings,
        cores: Option<Vec<usize>>,
    ) -> Result<(), Error>
    where
        W: Worker + 'static,
    {
        let thread = spawn_thread(worker, settings, cores, &self.warehouse).inspect_err(|_| {
            self.warehouse.shutdown();
        })?;

        self.threads.push(thread);
        Ok(())
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.warehouse.shutdown();
        self.wait()
    }
}

/* ---------- */

fn spawn_thread<W>(
    mut worker: W,
    settings: Settings,
    cores: Option<Vec<usize>>,
    warehouse: &Arc<Warehouse>,
) -> Result<JoinHandle<()>, Error>
where
    W: Worker + 'static,
{
    let warehouse = warehouse.clone();
    let thread = settings.into_inner().spawn(move || {
        if let Some(cores) = cores {
            if let Err(err) = affinity::set_thread_affinity(&cores) {
                tracing::warn!(?cores, %err, "failed to pin the worker thread");
            }
        }

        worker.run(&warehouse)
    })?;

    Ok(thread)
}

/* ---------- */
