use std::sync::Arc;

use parking_lot::Mutex;

use crate::{Error, Event, Observer, Plan, Snapshot, Warehouse};

/* ---------- */

/// Keeps everything a warehouse reports.
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    events: Mutex<Vec<(Event, Snapshot)>>,
    errors: Mutex<Vec<String>>,
    stopped: Mutex<usize>,
}

impl Recorder {
    pub(crate) fn events(&self) -> Vec<(Event, Snapshot)> {
        self.events.lock().clone()
    }

    pub(crate) fn errors(&self) -> usize {
        self.errors.lock().len()
    }

    pub(crate) fn stopped(&self) -> usize {
        *self.stopped.lock()
    }
}

impl Observer for Recorder {
    fn on_event(&self, event: &Event, snapshot: &Snapshot) {
        self.events.lock().push((*event, snapshot.clone()));
    }

    fn on_error(&self, error: &Error) {
        self.errors.lock().push(error.to_string());
    }

    fn on_stopped(&self) {
        *self.stopped.lock() += 1;
    }
}

/// Returns a warehouse shaped after `plan` along with the recorder observing it.
pub(crate) fn recorded(plan: Plan) -> (Arc<Warehouse>, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let warehouse = Arc::new(Warehouse::new(plan, recorder.clone()));

    (warehouse, recorder)
}
