use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use parking_lot::Mutex;

use crate::error::Error;
use crate::observer::{Event, Observer, Snapshot};

/* ---------- */

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Append-only event log.
///
/// Every record is one line, flushed as soon as it is written so that a crash loses
/// at most the record in flight. Write failures are traced and otherwise ignored:
/// the log never stops a worker.
#[derive(Debug)]
pub struct EventLog {
    path: PathBuf,
    sink: Mutex<BufWriter<File>>,
}

impl EventLog {
    /// Opens (or creates) the log at `path` for appending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LogSinkUnavailable`] if the file can't be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| Error::LogSinkUnavailable {
                path: path.clone(),
                source,
            })?;

        Ok(Self {
            path,
            sink: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Returns the path of the log file.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, record: &str) {
        let mut sink = self.sink.lock();
        let written = writeln!(sink, "{record}").and_then(|()| sink.flush());

        if let Err(err) = written {
            tracing::error!(path = %self.path.display(), %err, "failed to append to the event log");
        }
    }
}

impl Observer for EventLog {
    fn on_event(&self, event: &Event, snapshot: &Snapshot) {
        let now = now();

        self.append(&event_record(now, event));
        if snapshot.level.is_alert() {
            self.append(&alert_record(now, snapshot));
        }
    }

    fn on_error(&self, error: &Error) {
        self.append(&format!("[{}] ERROR {error}", now().format(TIMESTAMP_FORMAT)));
    }

    fn on_stopped(&self) {
        self.append(&format!("[{}] STOPPED", now().format(TIMESTAMP_FORMAT)));
    }
}

/* ---------- */

#[inline]
fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// `[YYYY-MM-DD HH:MM:SS] <EVENT> ThreadID=<id> Action=<action> Item=<value> [<PRIORITY>]`
fn event_record(at: NaiveDateTime, event: &Event) -> String {
    format!(
        "[{}] {} ThreadID={} Action={} Item={} [{}]",
        at.format(TIMESTAMP_FORMAT),
        event.actor.role.event_name(),
        event.actor.id,
        event.action,
        event.item.value(),
        event.item.priority().tag(),
    )
}

fn alert_record(at: NaiveDateTime, snapshot: &Snapshot) -> String {
    format!(
        "[{}] ALERT Level={} Normal={} Urgent={} Total={}",
        at.format(TIMESTAMP_FORMAT),
        snapshot.level,
        snapshot.normal,
        snapshot.urgent,
        snapshot.normal + snapshot.urgent,
    )
}

/* ---------- */
