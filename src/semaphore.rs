use parking_lot::{Condvar, Mutex};

/* ---------- */

/// A counting semaphore.
///
/// Each permit is one token. [`Semaphore::acquire`] parks the calling thread until a token is available,
/// [`Semaphore::release`] hands tokens back and wakes as many waiters.
#[derive(Debug, Default)]
pub struct Semaphore {
    permits: Mutex<usize>,
    available: Condvar,
}

impl Semaphore {
    /// Returns a semaphore holding `permits` tokens.
    #[inline]
    pub fn new(permits: usize) -> Self {
        Self {
            permits: Mutex::new(permits),
            available: Condvar::new(),
        }
    }

    /// Takes one token, blocking until one is available.
    pub fn acquire(&self) {
        let mut permits = self.permits.lock();
        while *permits == 0 {
            self.available.wait(&mut permits);
        }

        *permits -= 1;
    }

    /// Takes one token if one is available right now.
    pub fn try_acquire(&self) -> bool {
        let mut permits = self.permits.lock();
        if *permits == 0 {
            return false;
        }

        *permits -= 1;
        true
    }

    /// Gives back `count` tokens.
    pub fn release(&self, count: usize) {
        if count == 0 {
            return;
        }

        *self.permits.lock() += count;

        if count == 1 {
            self.available.notify_one();
        } else {
            self.available.notify_all();
        }
    }

    /// Returns the number of tokens currently available.
    #[inline]
    pub fn available(&self) -> usize {
        *self.permits.lock()
    }
}

/* ---------- */
