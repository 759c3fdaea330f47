use std::io::Write;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};

use crate::observer::{Event, Observer, Snapshot};
use crate::warehouse::Warehouse;
use crate::worker::Worker;

/* ---------- */

const POLL: Duration = Duration::from_millis(50);

/// Returns a connected [`StatusBoard`] and [`Renderer`], the latter printing to `out`.
pub fn status_channel<W: Write + Send + 'static>(out: W) -> (StatusBoard, Renderer) {
    let (updates_tx, updates_rx) = unbounded();

    (
        StatusBoard(updates_tx),
        Renderer {
            updates: updates_rx,
            out: Box::new(out),
        },
    )
}

/* ---------- */

/// Publishes every [`Snapshot`] to a [`Renderer`].
///
/// The channel is unbounded, publishing never waits for the renderer.
#[derive(Debug, Clone)]
pub struct StatusBoard(Sender<Snapshot>);

impl Observer for StatusBoard {
    #[inline]
    fn on_event(&self, _: &Event, snapshot: &Snapshot) {
        // The renderer may already be gone at shutdown.
        let _ = self.0.send(snapshot.clone());
    }
}

/* ---------- */

/// Prints the snapshots published by a [`StatusBoard`], with an alert line on low or high stock.
pub struct Renderer {
    updates: Receiver<Snapshot>,
    out: Box<dyn Write + Send>,
}

impl Renderer {
    fn render(&mut self, snapshot: &Snapshot) {
        let mut rendered = writeln!(self.out, "[STATUS] {snapshot}");

        if snapshot.level.is_alert() {
            rendered = rendered.and_then(|()| {
                writeln!(
                    self.out,
                    "[STOCK ALERT] {} stock: {} items in warehouse!",
                    snapshot.level,
                    snapshot.normal + snapshot.urgent
                )
            });
        }

        if let Err(err) = rendered.and_then(|()| self.out.flush()) {
            tracing::debug!(%err, "failed to render the status");
        }
    }
}

impl Worker for Renderer {
    fn run(&mut self, warehouse: &Warehouse) {
        loop {
            match self.updates.recv_timeout(POLL) {
                Ok(snapshot) => self.render(&snapshot),
                Err(RecvTimeoutError::Timeout) if warehouse.is_running() => (),
                Err(_) => break,
            }
        }

        // Whatever was published before the shutdown.
        while let Ok(snapshot) = self.updates.try_recv() {
            self.render(&snapshot);
        }
    }
}

/* ---------- */
