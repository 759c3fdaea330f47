use std::fmt::{self, Display, Formatter};

use rand::Rng;

/* ---------- */

/// The two priority classes an item can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    /// Served once the urgent lane is empty.
    Normal,
    /// Always served before any normal item.
    Urgent,
}

impl Priority {
    /// Returns the tag used in log records, e.g. `URGENT`.
    #[inline]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Urgent => "URGENT",
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => f.write_str("normal"),
            Self::Urgent => f.write_str("urgent"),
        }
    }
}

/* ---------- */

/// A unit of stock: a value and the priority it was supplied with.
///
/// Items are immutable. Whichever lane holds an item owns it until a retailer extracts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    value: u32,
    priority: Priority,
}

impl Item {
    /// Largest value (exclusive) produced by [`Item::random`].
    pub const MAX_VALUE: u32 = 100;

    /// Returns a new item.
    #[inline]
    pub fn new(value: u32, priority: Priority) -> Self {
        Self { value, priority }
    }

    /// Returns a normal-priority item.
    #[inline]
    pub fn normal(value: u32) -> Self {
        Self::new(value, Priority::Normal)
    }

    /// Returns an urgent item.
    #[inline]
    pub fn urgent(value: u32) -> Self {
        Self::new(value, Priority::Urgent)
    }

    /// Draws an item with a value in `0..100`, urgent with probability `urgent_ratio`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, urgent_ratio: f64) -> Self {
        let value = rng.gen_range(0..Self::MAX_VALUE);
        let priority = if rng.gen_bool(urgent_ratio.clamp(0.0, 1.0)) {
            Priority::Urgent
        } else {
            Priority::Normal
        };

        Self::new(value, priority)
    }

    /// Returns the item's value.
    #[inline]
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Returns the item's priority.
    #[inline]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns whether the item is urgent.
    #[inline]
    pub fn is_urgent(&self) -> bool {
        self.priority == Priority::Urgent
    }
}

/* ---------- */
