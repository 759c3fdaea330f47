use crate::error::Error;
use crate::item::{Item, Priority};

/* ---------- */

/// A fixed-capacity circular queue of [`Items`], one per [`Priority`].
///
/// The slots are allocated once; pushing and popping only move the cursors.
/// A lane is not thread-safe by itself, it is only ever touched behind the [`Gate`] lock.
///
/// [`Items`]: crate::Item
/// [`Gate`]: crate::Gate
#[derive(Debug)]
pub struct Lane {
    priority: Priority,
    slots: Box<[Option<Item>]>,
    head: usize,
    tail: usize,
    len: usize,
}

impl Lane {
    /// Returns an empty lane able to hold `capacity` items.
    pub fn new(priority: Priority, capacity: usize) -> Self {
        Self {
            priority,
            slots: vec![None; capacity].into_boxed_slice(),
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Appends `item` at the tail.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Overflow`] if the lane is full, the item is then dropped.
    pub fn push(&mut self, item: Item) -> Result<(), Error> {
        if self.is_full() {
            return Err(Error::Overflow {
                lane: self.priority(),
            });
        }

        self.slots[self.tail] = Some(item);
        self.tail = self.advance(self.tail);
        self.len += 1;

        Ok(())
    }

    /// Removes the item at the head, if any.
    pub fn pop(&mut self) -> Option<Item> {
        if self.is_empty() {
            return None;
        }

        let item = self.slots[self.head].take();
        self.head = self.advance(self.head);
        self.len -= 1;

        item
    }

    /// Returns the number of items currently held.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns whether the lane holds nothing.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns whether every slot is taken.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Returns the number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the priority of the items this lane holds.
    #[inline]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    #[inline]
    fn advance(&self, cursor: usize) -> usize {
        (cursor + 1) % self.capacity()
    }
}

/* ---------- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_across_wraparound() {
        let mut lane = Lane::new(Priority::Normal, 3);

        // Push and pop enough to move both cursors around the ring twice.
        let mut expected = 0;
        for value in 0..10 {
            lane.push(Item::normal(value)).expect("lane has room");
            if lane.len() == 2 {
                assert_eq!(lane.pop().map(|item| item.value()), Some(expected));
                expected += 1;
            }
        }

        while let Some(item) = lane.pop() {
            assert_eq!(item.value(), expected);
            expected += 1;
        }
        assert_eq!(expected, 10);
    }

    #[test]
    fn full_lane_rejects_and_keeps_contents() {
        let mut lane = Lane::new(Priority::Urgent, 2);

        lane.push(Item::urgent(1)).unwrap();
        lane.push(Item::urgent(2)).unwrap();
        assert!(lane.is_full());

        let err = lane.push(Item::urgent(3)).unwrap_err();
        assert!(matches!(
            err,
            Error::Overflow {
                lane: Priority::Urgent
            }
        ));

        assert_eq!(lane.len(), 2);
        assert_eq!(lane.pop(), Some(Item::urgent(1)));
        assert_eq!(lane.pop(), Some(Item::urgent(2)));
    }

    #[test]
    fn empty_lane_pops_nothing() {
        let mut lane = Lane::new(Priority::Normal, 4);

        assert_eq!(lane.pop(), None);
        assert_eq!(lane.len(), 0);

        lane.push(Item::normal(5)).unwrap();
        lane.pop();
        assert_eq!(lane.pop(), None);
        assert!(lane.is_empty());
    }

    #[test]
    fn lane_uses_its_whole_capacity() {
        let mut lane = Lane::new(Priority::Normal, 10);

        for value in 0..10 {
            lane.push(Item::normal(value)).unwrap();
        }
        assert_eq!(lane.len(), lane.capacity());
        assert!(matches!(
            lane.push(Item::normal(10)),
            Err(Error::Overflow { lane: p }) if p == lane.priority()
        ));
    }
}
