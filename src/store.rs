use crate::error::Error;
use crate::item::{Item, Priority};
use crate::lane::Lane;

/* ---------- */

/// Number of items held by each lane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Occupancy {
    /// Items waiting in the normal lane.
    pub normal: usize,
    /// Items waiting in the urgent lane.
    pub urgent: usize,
}

impl Occupancy {
    /// Returns the combined occupancy of both lanes.
    #[inline]
    pub fn total(&self) -> usize {
        self.normal + self.urgent
    }
}

/// Running totals of the pipeline. Both counters only grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Items successfully inserted.
    pub produced: u64,
    /// Items successfully extracted.
    pub consumed: u64,
}

/* ---------- */

/// The dual-lane store: a normal lane and an urgent lane that share no storage.
///
/// The store does not bound its combined occupancy, the [`Gate`]'s tokens do.
/// None of its methods are thread-safe on their own; they are only called with the gate's lock held.
///
/// [`Gate`]: crate::Gate
#[derive(Debug)]
pub struct Store {
    normal: Lane,
    urgent: Lane,
    stats: Statistics,
}

impl Store {
    /// Returns an empty store whose lanes can each hold `capacity` items.
    pub fn new(capacity: usize) -> Self {
        Self {
            normal: Lane::new(Priority::Normal, capacity),
            urgent: Lane::new(Priority::Urgent, capacity),
            stats: Statistics::default(),
        }
    }

    /// Inserts `item` in the lane matching its priority and counts it as produced.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Overflow`] if the lane is full. The item is dropped and isn't counted.
    pub fn insert(&mut self, item: Item) -> Result<(), Error> {
        self.lane_mut(item.priority()).push(item)?;
        self.stats.produced += 1;

        Ok(())
    }

    /// Removes the next item to serve and counts it as consumed.
    ///
    /// The urgent lane always wins when it holds anything; each lane is FIFO.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Underflow`] if both lanes are empty.
    pub fn extract(&mut self) -> Result<Item, Error> {
        let item = self
            .urgent
            .pop()
            .or_else(|| self.normal.pop())
            .ok_or(Error::Underflow)?;
        self.stats.consumed += 1;

        Ok(item)
    }

    /// Returns the occupancy of both lanes as of the last mutation.
    #[inline]
    pub fn occupancy(&self) -> Occupancy {
        Occupancy {
            normal: self.normal.len(),
            urgent: self.urgent.len(),
        }
    }

    /// Returns the production and consumption totals.
    #[inline]
    pub fn statistics(&self) -> Statistics {
        self.stats
    }

    /// Returns whether both lanes are empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.normal.is_empty() && self.urgent.is_empty()
    }

    #[inline]
    fn lane_mut(&mut self, priority: Priority) -> &mut Lane {
        match priority {
            Priority::Normal => &mut self.normal,
            Priority::Urgent => &mut self.urgent,
        }
    }
}

/* ---------- */
