use parking_lot::{Mutex, MutexGuard};

use crate::observer::Event;
use crate::semaphore::Semaphore;
use crate::store::Store;

/* ---------- */

/// The state serialized by the [`Gate`] lock: the store, the remaining-work counter
/// and the last mutation.
#[derive(Debug)]
pub struct Ledger {
    pub(crate) store: Store,
    pub(crate) remaining: u64,
    pub(crate) last: Option<Event>,
}

impl Ledger {
    /// Returns the store.
    #[inline]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Returns how many retailer extractions are left before the automatic shutdown.
    #[inline]
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

/// The tokens held by a [`Gate`] at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tokens {
    /// Free-slot tokens, taken by producers.
    pub free: usize,
    /// Filled-slot tokens, taken by consumers.
    pub filled: usize,
}

impl Tokens {
    /// Returns the sum of both kinds of tokens.
    #[inline]
    pub fn total(&self) -> usize {
        self.free + self.filled
    }
}

/* ---------- */

/// Admission control in and out of the [`Store`].
///
/// A producer takes a free-slot token before inserting and hands a filled-slot token back afterwards,
/// a consumer does the mirror. Every store access happens behind the single lock.
/// Tokens are never touched while holding the lock.
#[derive(Debug)]
pub struct Gate {
    capacity: usize,
    free: Semaphore,
    filled: Semaphore,
    ledger: Mutex<Ledger>,
}

impl Gate {
    /// Returns a gate over an empty store of `capacity` slots, allowing `work` retailer extractions.
    pub fn new(capacity: usize, work: u64) -> Self {
        Self {
            capacity,
            free: Semaphore::new(capacity),
            filled: Semaphore::new(0),
            ledger: Mutex::new(Ledger {
                store: Store::new(capacity),
                remaining: work,
                last: None,
            }),
        }
    }

    /// Returns the number of slots shared by both lanes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the tokens currently available.
    ///
    /// With no thread between an acquire and its matching release, `free + filled == capacity`.
    #[inline]
    pub fn tokens(&self) -> Tokens {
        Tokens {
            free: self.free.available(),
            filled: self.filled.available(),
        }
    }

    /// Locks the store.
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock()
    }

    #[inline]
    pub(crate) fn free(&self) -> &Semaphore {
        &self.free
    }

    #[inline]
    pub(crate) fn filled(&self) -> &Semaphore {
        &self.filled
    }
}

/* ---------- */
