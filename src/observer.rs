use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use crate::error::Error;
use crate::item::Item;
use crate::monitor::StockLevel;

/* ---------- */

/// The kind of thread acting on the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Produces items.
    Supplier,
    /// Consumes items.
    Retailer,
    /// The interactive prompt.
    Console,
}

impl Role {
    /// Returns the event name written in log records.
    #[inline]
    pub fn event_name(self) -> &'static str {
        match self {
            Self::Supplier => "SUPPLIER",
            Self::Retailer => "RETAILER",
            Self::Console => "CONSOLE",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Supplier => "supplier",
            Self::Retailer => "retailer",
            Self::Console => "console",
        })
    }
}

/// Identifies the thread behind an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Actor {
    /// What the thread does.
    pub role: Role,
    /// Index of the thread among those sharing its role.
    pub id: usize,
}

impl Actor {
    /// Returns the `id`-th supplier.
    #[inline]
    pub fn supplier(id: usize) -> Self {
        Self {
            role: Role::Supplier,
            id,
        }
    }

    /// Returns the `id`-th retailer.
    #[inline]
    pub fn retailer(id: usize) -> Self {
        Self {
            role: Role::Retailer,
            id,
        }
    }

    /// Returns the console actor.
    #[inline]
    pub fn console() -> Self {
        Self {
            role: Role::Console,
            id: 0,
        }
    }
}

impl Display for Actor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self.role, self.id)
    }
}

/// What happened to an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// The item entered the store.
    Produced,
    /// The item left the store.
    Consumed,
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Produced => "produced",
            Self::Consumed => "consumed",
        })
    }
}

/// One successful store mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    /// Who did it.
    pub actor: Actor,
    /// Insert or extract.
    pub action: Action,
    /// The item moved.
    pub item: Item,
}

impl Display for Event {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} item {} ({})",
            self.actor,
            self.action,
            self.item.value(),
            self.item.priority()
        )
    }
}

/* ---------- */

/// A read-only picture of the warehouse, taken under the store lock right after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// Configured supplier threads.
    pub suppliers: usize,
    /// Configured retailer threads.
    pub retailers: usize,
    /// Items in the normal lane.
    pub normal: usize,
    /// Items in the urgent lane.
    pub urgent: usize,
    /// Items produced so far.
    pub produced: u64,
    /// Items consumed so far.
    pub consumed: u64,
    /// Description of the mutation that led to this snapshot.
    pub last_action: String,
    /// Stock level classified from `normal` and `urgent`.
    pub level: StockLevel,
}

impl Display for Snapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "suppliers: {} | retailers: {} | normal: {} | urgent: {} | produced: {} | consumed: {} | stock: {} | last: {}",
            self.suppliers,
            self.retailers,
            self.normal,
            self.urgent,
            self.produced,
            self.consumed,
            self.level,
            self.last_action,
        )
    }
}

/* ---------- */

/// Receives what happens in a [`Warehouse`].
///
/// Observers are called with the store lock held, they must return quickly and never block.
///
/// [`Warehouse`]: crate::Warehouse
pub trait Observer: Send + Sync {
    /// Called after every successful insert or extract.
    fn on_event(&self, event: &Event, snapshot: &Snapshot);

    /// Called when an operation failed. By default, this does nothing.
    #[inline]
    fn on_error(&self, error: &Error) {
        let _ = error;
    }

    /// Called once, when the warehouse stops. By default, this does nothing.
    #[inline]
    fn on_stopped(&self) {}
}

impl<T: Observer + ?Sized> Observer for Arc<T> {
    #[inline]
    fn on_event(&self, event: &Event, snapshot: &Snapshot) {
        (**self).on_event(event, snapshot)
    }

    #[inline]
    fn on_error(&self, error: &Error) {
        (**self).on_error(error)
    }

    #[inline]
    fn on_stopped(&self) {
        (**self).on_stopped()
    }
}

/// An observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl Observer for Silent {
    #[inline]
    fn on_event(&self, _: &Event, _: &Snapshot) {}
}

/// Forwards everything to several observers, in order.
#[derive(Default)]
pub struct Observers(Vec<Arc<dyn Observer>>);

impl Observers {
    /// Returns an empty fan-out.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `observer` at the end of the fan-out.
    #[inline]
    pub fn with(mut self, observer: impl Observer + 'static) -> Self {
        self.0.push(Arc::new(observer));
        self
    }
}

impl Observer for Observers {
    fn on_event(&self, event: &Event, snapshot: &Snapshot) {
        self.0
            .iter()
            .for_each(|observer| observer.on_event(event, snapshot))
    }

    fn on_error(&self, error: &Error) {
        self.0.iter().for_each(|observer| observer.on_error(error))
    }

    fn on_stopped(&self) {
        self.0.iter().for_each(|observer| observer.on_stopped())
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Observers({})", self.0.len())
    }
}
