use std::io;
use std::path::PathBuf;

use crate::item::Priority;

/* ---------- */

/// Errors raised by the warehouse and its collaborators.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An insert hit a full lane. The gate should make this unreachable.
    #[error("overflow: the {lane} lane is full")]
    Overflow {
        /// The lane the item was headed to.
        lane: Priority,
    },

    /// An extract found both lanes empty.
    #[error("underflow: the store is empty")]
    Underflow,

    /// Invalid startup parameters.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The event log could not be opened.
    #[error("cannot open the event log at {path}: {source}")]
    LogSinkUnavailable {
        /// Path of the log file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// A console line that isn't a known command.
    #[error("unknown command: {0:?}")]
    UnknownCommand(String),

    /// A worker thread could not be spawned.
    #[error(transparent)]
    ThreadStart(#[from] io::Error),
}

impl Error {
    #[inline]
    pub(crate) fn config<T: ToString>(msg: T) -> Self {
        Self::Config(msg.to_string())
    }
}
