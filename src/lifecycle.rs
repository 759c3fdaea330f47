use std::sync::atomic::{AtomicBool, Ordering};

/* ---------- */

/// The two states of a [`Warehouse`], `Running` being the initial one.
///
/// [`Warehouse`]: crate::Warehouse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Workers may produce and consume.
    Running,
    /// Terminal. No new work is accepted.
    Stopped,
}

/* ---------- */

/// The running flag of a warehouse together with the number of threads to wake up when it flips.
///
/// The flag only ever goes from running to stopped, and only once: [`Lifecycle::stop`] tells
/// which caller won the transition so that the wake-up is done exactly once.
#[derive(Debug)]
pub struct Lifecycle {
    stopped: AtomicBool,
    suppliers: usize,
    retailers: usize,
}

impl Lifecycle {
    /// Returns a running lifecycle for the given thread counts.
    #[inline]
    pub fn new(suppliers: usize, retailers: usize) -> Self {
        Self {
            stopped: AtomicBool::new(false),
            suppliers,
            retailers,
        }
    }

    /// Returns whether the warehouse still accepts work.
    #[inline]
    pub fn is_running(&self) -> bool {
        !self.stopped.load(Ordering::SeqCst)
    }

    /// Returns the current state.
    #[inline]
    pub fn state(&self) -> State {
        if self.is_running() {
            State::Running
        } else {
            State::Stopped
        }
    }

    /// Number of configured supplier threads.
    #[inline]
    pub fn suppliers(&self) -> usize {
        self.suppliers
    }

    /// Number of configured retailer threads.
    #[inline]
    pub fn retailers(&self) -> usize {
        self.retailers
    }

    /// Flips the flag to stopped. Returns `true` only for the call that did the flip.
    #[inline]
    pub(crate) fn stop(&self) -> bool {
        !self.stopped.swap(true, Ordering::SeqCst)
    }
}

/* ---------- */

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn stops_once() {
        let lifecycle = Lifecycle::new(3, 2);

        assert_eq!(lifecycle.state(), State::Running);
        assert!(lifecycle.stop());
        assert!(!lifecycle.stop());
        assert_eq!(lifecycle.state(), State::Stopped);
    }

    #[test]
    fn racing_stops_have_a_single_winner() {
        let lifecycle = Arc::new(Lifecycle::new(1, 1));

        let winners = (0..8)
            .map(|_| {
                let lifecycle = lifecycle.clone();
                std::thread::spawn(move || lifecycle.stop())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|thread| thread.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert!(!lifecycle.is_running());
    }
}
