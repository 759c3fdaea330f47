use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use signal_hook::consts::TERM_SIGNALS;
use signal_hook::flag;

/* ---------- */

/// An interrupt flag raised by the OS signal handlers.
///
/// The handlers only store `true` in the flag. The actual shutdown is carried out
/// by the [`Supervisor`] worker, outside of the signal context.
///
/// [`Supervisor`]: crate::Supervisor
#[derive(Debug, Default, Clone)]
pub struct Interrupt(Arc<AtomicBool>);

impl Interrupt {
    /// Returns a lowered flag that no signal is bound to.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a flag raised by `SIGINT`, `SIGTERM` and `SIGQUIT`.
    ///
    /// Repeated signals raise the same flag again and have no other effect.
    pub fn register() -> Self {
        let interrupt = Self::new();

        for sig in TERM_SIGNALS {
            if let Err(err) = flag::register(*sig, interrupt.0.clone()) {
                tracing::warn!(signal = *sig, %err, "failed to register the interrupt handler");
            }
        }

        interrupt
    }

    /// Raises the flag by hand.
    #[inline]
    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst)
    }

    /// Returns whether an interrupt was delivered.
    #[inline]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/* ---------- */
