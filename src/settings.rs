use std::fmt::{Debug, Formatter, Result};
use std::thread::Builder;

use crate::observer::Actor;

/* ---------- */

/// Properties of a worker's thread.
pub struct Settings(Builder);

impl Settings {
    /// Returns settings for an unnamed thread with the platform's stack size.
    #[inline]
    pub fn new() -> Self {
        Self(Builder::new())
    }

    /// Returns settings naming the thread after `actor`, e.g. `supplier-3`.
    #[inline]
    pub fn for_actor(actor: Actor) -> Self {
        Self::new().name(format!("{}-{}", actor.role, actor.id))
    }

    /// Sets the thread's name. It must not contain null bytes (`\0`).
    #[inline]
    pub fn name<T: ToString>(self, name: T) -> Self {
        Self(self.0.name(name.to_string()))
    }

    #[inline]
    pub(crate) fn into_inner(self) -> Builder {
        self.0
    }
}

impl Default for Settings {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for Settings {
    #[inline]
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{:?}", self.0)
    }
}
