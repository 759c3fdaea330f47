use std::fmt::{self, Display, Formatter};

use crate::error::Error;
use crate::gate::{Gate, Ledger, Tokens};
use crate::item::Item;
use crate::lifecycle::{Lifecycle, State};
use crate::monitor::{StockLevel, Thresholds};
use crate::observer::{Action, Actor, Event, Observer, Snapshot};
use crate::store::{Occupancy, Statistics};

/* ---------- */

/// The shape of a [`Warehouse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    /// Slots shared by both lanes.
    pub capacity: usize,
    /// Supplier threads.
    pub suppliers: usize,
    /// Retailer threads.
    pub retailers: usize,
    /// Retailer extractions before the automatic shutdown.
    pub work: u64,
}

impl Default for Plan {
    #[inline]
    fn default() -> Self {
        Self {
            capacity: 10,
            suppliers: 1,
            retailers: 1,
            work: 10,
        }
    }
}

/// Outcome of an operation that may be cut short by the shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission<T> {
    /// The operation went through.
    Committed(T),
    /// The warehouse is stopped, nothing was done.
    Stopped,
}

impl<T> Admission<T> {
    /// Returns whether the warehouse turned the operation down.
    #[inline]
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Returns the committed value, if any.
    #[inline]
    pub fn committed(self) -> Option<T> {
        match self {
            Self::Committed(value) => Some(value),
            Self::Stopped => None,
        }
    }
}

/// Totals printed once every worker has been joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    /// Items produced over the whole run.
    pub produced: u64,
    /// Items consumed over the whole run.
    pub consumed: u64,
    /// Items left in the normal lane.
    pub normal: usize,
    /// Items left in the urgent lane.
    pub urgent: usize,
}

impl Display for Report {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "total produced: {}", self.produced)?;
        writeln!(f, "total consumed: {}", self.consumed)?;
        write!(
            f,
            "left in stock: {} normal, {} urgent",
            self.normal, self.urgent
        )
    }
}

/* ---------- */

/// The shared core of the pipeline: the gated store, its lifecycle and its observer.
///
/// Workers share a warehouse behind an [`Arc`] and drive it through [`Warehouse::supply`] and
/// [`Warehouse::retail`], which block on the gate tokens. [`Warehouse::shutdown`] stops it and
/// releases every thread parked on the gate.
///
/// [`Arc`]: std::sync::Arc
pub struct Warehouse {
    gate: Gate,
    lifecycle: Lifecycle,
    thresholds: Thresholds,
    observer: Box<dyn Observer>,
}

impl Warehouse {
    /// Returns a running warehouse shaped after `plan`, reporting to `observer`.
    pub fn new(plan: Plan, observer: impl Observer + 'static) -> Self {
        Self {
            gate: Gate::new(plan.capacity, plan.work),
            lifecycle: Lifecycle::new(plan.suppliers, plan.retailers),
            thresholds: Thresholds::for_capacity(plan.capacity),
            observer: Box::new(observer),
        }
    }

    /// Returns whether the warehouse still accepts work.
    #[inline]
    pub fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    /// Returns the current lifecycle state.
    #[inline]
    pub fn state(&self) -> State {
        self.lifecycle.state()
    }

    /// Returns the lifecycle, with the configured thread counts.
    #[inline]
    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Returns the gate tokens currently available.
    #[inline]
    pub fn tokens(&self) -> Tokens {
        self.gate.tokens()
    }

    /// Returns the number of slots shared by both lanes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.gate.capacity()
    }

    /// Producer side of the handshake: waits for a free slot, then inserts `item`.
    ///
    /// Blocks while the store is full. Returns [`Admission::Stopped`] if the warehouse stopped
    /// before or while waiting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Overflow`] if the target lane was full despite the free token.
    /// The item is dropped and the token handed back.
    pub fn supply(&self, actor: Actor, item: Item) -> Result<Admission<()>, Error> {
        if !self.is_running() {
            return Ok(Admission::Stopped);
        }

        self.gate.free().acquire();
        self.commit_insert(actor, item)
    }

    /// Consumer side of the handshake: waits for a filled slot, then extracts the next item.
    ///
    /// Blocks while the store is empty. Urgent items are always served first.
    /// Every extraction uses up one unit of work and the one using the last unit stops the warehouse.
    pub fn retail(&self, actor: Actor) -> Admission<Item> {
        loop {
            if !self.is_running() {
                return Admission::Stopped;
            }

            self.gate.filled().acquire();
            let mut ledger = self.gate.lock();

            if !self.is_running() || ledger.remaining == 0 {
                drop(ledger);
                self.gate.filled().release(1);
                return Admission::Stopped;
            }

            let item = match ledger.store.extract() {
                Ok(item) => item,
                Err(err) => {
                    // A token without an item. Give it back for the next waiter and start over.
                    tracing::debug!(%actor, "woke up on an empty store, retrying");
                    self.observer.on_error(&err);
                    drop(ledger);
                    self.gate.filled().release(1);
                    std::thread::yield_now();
                    continue;
                }
            };

            ledger.remaining -= 1;
            let exhausted = ledger.remaining == 0;
            self.notify(&mut ledger, actor, Action::Consumed, item);
            drop(ledger);

            self.gate.free().release(1);

            if exhausted {
                tracing::info!(%actor, "work bound reached");
                self.shutdown();
            }

            return Admission::Committed(item);
        }
    }

    /// Inserts `item` without waiting, for manual restocking.
    ///
    /// Counts as produced but doesn't touch the remaining work.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Overflow`] if no slot is free right now.
    pub fn stock(&self, actor: Actor, item: Item) -> Result<Admission<()>, Error> {
        if !self.is_running() {
            return Ok(Admission::Stopped);
        }

        if !self.gate.free().try_acquire() {
            let err = Error::Overflow {
                lane: item.priority(),
            };
            self.observer.on_error(&err);
            return Err(err);
        }

        self.commit_insert(actor, item)
    }

    /// Extracts the next item without waiting, for manual removal.
    ///
    /// Counts as consumed but doesn't touch the remaining work.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Underflow`] if nothing is in stock right now.
    pub fn unstock(&self, actor: Actor) -> Result<Admission<Item>, Error> {
        if !self.is_running() {
            return Ok(Admission::Stopped);
        }

        if !self.gate.filled().try_acquire() {
            self.observer.on_error(&Error::Underflow);
            return Err(Error::Underflow);
        }

        let mut ledger = self.gate.lock();
        if !self.is_running() {
            drop(ledger);
            self.gate.filled().release(1);
            return Ok(Admission::Stopped);
        }

        let item = match ledger.store.extract() {
            Ok(item) => item,
            Err(err) => {
                self.observer.on_error(&err);
                drop(ledger);
                self.gate.filled().release(1);
                return Err(err);
            }
        };

        self.notify(&mut ledger, actor, Action::Consumed, item);
        drop(ledger);

        self.gate.free().release(1);
        Ok(Admission::Committed(item))
    }

    /// Moves the warehouse to [`State::Stopped`] and wakes every thread that may be parked on the gate.
    ///
    /// Safe to call any number of times from any thread; only the first call has an effect,
    /// and it is the one returning `true`.
    pub fn shutdown(&self) -> bool {
        if !self.lifecycle.stop() {
            return false;
        }

        self.gate.lock().remaining = 0;

        // One token per configured thread, blocked or not. Extra tokens are taken by threads
        // that see the stopped state and leave.
        self.gate.free().release(self.lifecycle.suppliers());
        self.gate.filled().release(self.lifecycle.retailers());

        tracing::info!(
            suppliers = self.lifecycle.suppliers(),
            retailers = self.lifecycle.retailers(),
            "warehouse stopped"
        );
        self.observer.on_stopped();

        true
    }

    /// Returns the current picture of the warehouse.
    pub fn snapshot(&self) -> Snapshot {
        let ledger = self.gate.lock();
        self.snapshot_of(&ledger)
    }

    /// Returns the production and consumption totals.
    #[inline]
    pub fn statistics(&self) -> Statistics {
        self.gate.lock().store.statistics()
    }

    /// Returns the occupancy of both lanes.
    #[inline]
    pub fn occupancy(&self) -> Occupancy {
        self.gate.lock().store.occupancy()
    }

    /// Classifies the current occupancy.
    #[inline]
    pub fn stock_level(&self) -> StockLevel {
        self.thresholds.classify(self.occupancy())
    }

    /// Returns the final totals.
    pub fn report(&self) -> Report {
        let ledger = self.gate.lock();
        let stats = ledger.store.statistics();
        let occupancy = ledger.store.occupancy();

        Report {
            produced: stats.produced,
            consumed: stats.consumed,
            normal: occupancy.normal,
            urgent: occupancy.urgent,
        }
    }

    /// Second half of an insert, once a free token is held.
    fn commit_insert(&self, actor: Actor, item: Item) -> Result<Admission<()>, Error> {
        let mut ledger = self.gate.lock();

        if !self.is_running() {
            drop(ledger);
            self.gate.free().release(1);
            return Ok(Admission::Stopped);
        }

        if let Err(err) = ledger.store.insert(item) {
            tracing::warn!(%actor, %err, value = item.value(), "item dropped");
            self.observer.on_error(&err);
            drop(ledger);
            self.gate.free().release(1);
            return Err(err);
        }

        self.notify(&mut ledger, actor, Action::Produced, item);
        drop(ledger);

        self.gate.filled().release(1);
        Ok(Admission::Committed(()))
    }

    /// Records `event` as the last action and hands it to the observer, lock held.
    fn notify(&self, ledger: &mut Ledger, actor: Actor, action: Action, item: Item) {
        let event = Event {
            actor,
            action,
            item,
        };
        ledger.last = Some(event);

        let snapshot = self.snapshot_of(ledger);
        tracing::debug!(%event, level = %snapshot.level, "store updated");
        self.observer.on_event(&event, &snapshot);
    }

    fn snapshot_of(&self, ledger: &Ledger) -> Snapshot {
        let occupancy = ledger.store.occupancy();
        let stats = ledger.store.statistics();

        Snapshot {
            suppliers: self.lifecycle.suppliers(),
            retailers: self.lifecycle.retailers(),
            normal: occupancy.normal,
            urgent: occupancy.urgent,
            produced: stats.produced,
            consumed: stats.consumed,
            last_action: ledger
                .last
                .map(|event| event.to_string())
                .unwrap_or_else(|| String::from("none")),
            level: self.thresholds.classify(occupancy),
        }
    }
}

impl fmt::Debug for Warehouse {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Warehouse")
            .field("gate", &self.gate)
            .field("lifecycle", &self.lifecycle)
            .field("thresholds", &self.thresholds)
            .finish_non_exhaustive()
    }
}

/* ---------- */

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossbeam_channel::unbounded;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::item::Priority;
    use crate::test_utils::*;

    const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn urgent_items_first_through_the_gate() {
        let (warehouse, _) = recorded(Plan {
            work: 100,
            ..Plan::default()
        });
        let supplier = Actor::supplier(0);
        let retailer = Actor::retailer(0);

        for value in [1, 2, 3] {
            warehouse.supply(supplier, Item::urgent(value)).unwrap();
        }
        for value in [4, 5] {
            warehouse.supply(supplier, Item::normal(value)).unwrap();
        }

        let served = (0..3)
            .filter_map(|_| warehouse.retail(retailer).committed())
            .collect::<Vec<_>>();
        assert_eq!(
            served,
            vec![Item::urgent(1), Item::urgent(2), Item::urgent(3)]
        );
        assert_eq!(warehouse.occupancy(), Occupancy { normal: 2, urgent: 0 });
    }

    #[test]
    fn tokens_are_conserved_at_rest() {
        let (warehouse, _) = recorded(Plan {
            work: u64::MAX,
            ..Plan::default()
        });
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..2_000 {
            let tokens = warehouse.tokens();

            // Only take a branch that can't block.
            if tokens.free > 0 && (tokens.filled == 0 || rng.gen_bool(0.5)) {
                let item = Item::random(&mut rng, 0.4);
                warehouse.supply(Actor::supplier(0), item).unwrap();
            } else {
                assert!(warehouse.retail(Actor::retailer(0)).committed().is_some());
            }

            let tokens = warehouse.tokens();
            assert_eq!(tokens.total(), warehouse.capacity());
            assert_eq!(tokens.filled, warehouse.occupancy().total());
        }
    }

    #[test]
    fn work_bound_stops_the_warehouse() {
        let (warehouse, recorder) = recorded(Plan {
            work: 3,
            ..Plan::default()
        });

        for value in 0..5 {
            warehouse
                .supply(Actor::supplier(0), Item::normal(value))
                .unwrap();
        }
        for _ in 0..3 {
            assert!(!warehouse.retail(Actor::retailer(0)).is_stopped());
        }

        assert_eq!(warehouse.state(), State::Stopped);
        assert!(warehouse.retail(Actor::retailer(0)).is_stopped());
        assert_eq!(
            warehouse.supply(Actor::supplier(0), Item::normal(9)).unwrap(),
            Admission::Stopped
        );

        let report = warehouse.report();
        assert_eq!(report.consumed, 3);
        assert_eq!(report.produced, 5);
        assert_eq!(report.normal, 2);
        assert_eq!(recorder.stopped(), 1);
    }

    #[test]
    fn shutdown_is_idempotent() {
        let (warehouse, recorder) = recorded(Plan {
            suppliers: 3,
            retailers: 2,
            ..Plan::default()
        });
        warehouse
            .supply(Actor::supplier(0), Item::urgent(1))
            .unwrap();

        assert!(warehouse.shutdown());
        let once = (warehouse.tokens(), warehouse.report(), warehouse.state());

        assert!(!warehouse.shutdown());
        let twice = (warehouse.tokens(), warehouse.report(), warehouse.state());

        assert_eq!(once, twice);
        assert_eq!(once.0.free, 10 - 1 + 3);
        assert_eq!(once.0.filled, 1 + 2);
        assert_eq!(recorder.stopped(), 1);
    }

    #[test]
    fn concurrent_shutdowns_converge() {
        let (warehouse, recorder) = recorded(Plan::default());

        let winners = (0..8)
            .map(|_| {
                let warehouse = warehouse.clone();
                std::thread::spawn(move || warehouse.shutdown())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|thread| thread.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(recorder.stopped(), 1);
    }

    #[test]
    fn shutdown_releases_blocked_suppliers() {
        let (warehouse, _) = recorded(Plan {
            capacity: 2,
            suppliers: 3,
            retailers: 2,
            work: 10,
        });

        for value in 0..2 {
            warehouse
                .supply(Actor::supplier(0), Item::normal(value))
                .unwrap();
        }

        let (done_tx, done_rx) = unbounded();
        for id in 0..3 {
            let warehouse = warehouse.clone();
            let done_tx = done_tx.clone();

            std::thread::spawn(move || {
                let admission = warehouse.supply(Actor::supplier(id), Item::urgent(99));
                let _ = done_tx.send(admission.unwrap());
            });
        }

        std::thread::sleep(Duration::from_millis(100));
        assert!(done_rx.is_empty(), "suppliers should be parked on a full store");

        warehouse.shutdown();
        for _ in 0..3 {
            let admission = done_rx.recv_timeout(JOIN_TIMEOUT).expect("supplier stayed parked");
            assert_eq!(admission, Admission::Stopped);
        }

        assert_eq!(warehouse.statistics().produced, 2);
        assert_eq!(warehouse.occupancy().urgent, 0);
    }

    #[test]
    fn shutdown_releases_blocked_retailers() {
        let (warehouse, _) = recorded(Plan {
            capacity: 10,
            suppliers: 3,
            retailers: 2,
            work: 10,
        });

        let (done_tx, done_rx) = unbounded();
        for id in 0..2 {
            let warehouse = warehouse.clone();
            let done_tx = done_tx.clone();

            std::thread::spawn(move || {
                let _ = done_tx.send(warehouse.retail(Actor::retailer(id)));
            });
        }

        std::thread::sleep(Duration::from_millis(100));
        assert!(done_rx.is_empty(), "retailers should be parked on an empty store");

        warehouse.shutdown();
        for _ in 0..2 {
            let admission = done_rx.recv_timeout(JOIN_TIMEOUT).expect("retailer stayed parked");
            assert!(admission.is_stopped());
        }

        assert_eq!(warehouse.statistics().consumed, 0);
    }

    #[test]
    fn manual_stock_goes_through_the_gate() {
        let (warehouse, recorder) = recorded(Plan {
            capacity: 1,
            work: 5,
            ..Plan::default()
        });
        let console = Actor::console();

        assert_eq!(
            warehouse.stock(console, Item::urgent(7)).unwrap(),
            Admission::Committed(())
        );
        assert!(matches!(
            warehouse.stock(console, Item::normal(8)),
            Err(Error::Overflow {
                lane: Priority::Normal
            })
        ));

        assert_eq!(
            warehouse.unstock(console).unwrap(),
            Admission::Committed(Item::urgent(7))
        );
        assert!(matches!(warehouse.unstock(console), Err(Error::Underflow)));

        assert_eq!(warehouse.tokens().total(), 1);
        assert_eq!(recorder.errors(), 2);
        // Manual removals don't use up the retailers' work.
        assert_eq!(warehouse.gate.lock().remaining(), 5);
    }

    #[test]
    fn manual_removal_racing_a_shutdown_leaves_the_stock() {
        let (warehouse, recorder) = recorded(Plan {
            capacity: 4,
            ..Plan::default()
        });
        let console = Actor::console();

        warehouse.stock(console, Item::normal(3)).unwrap();
        warehouse.stock(console, Item::urgent(4)).unwrap();
        assert_eq!(warehouse.stock_level(), StockLevel::Normal);

        // Park the removal on the lock, after it took its filled token.
        let ledger = warehouse.gate.lock();
        let (done_tx, done_rx) = unbounded();
        {
            let warehouse = warehouse.clone();
            std::thread::spawn(move || {
                let _ = done_tx.send(warehouse.unstock(console));
            });
        }
        while warehouse.gate.filled().available() == 2 {
            std::thread::yield_now();
        }

        // Flip the flag without the lock, as a shutdown does before zeroing the counter.
        assert!(warehouse.lifecycle().stop());
        drop(ledger);

        let admission = done_rx.recv_timeout(JOIN_TIMEOUT).expect("removal stayed parked");
        assert!(admission.unwrap().is_stopped());

        assert_eq!(warehouse.occupancy().total(), 2);
        assert_eq!(warehouse.statistics().consumed, 0);
        assert_eq!(warehouse.tokens(), Tokens { free: 2, filled: 2 });
        assert_eq!(warehouse.stock_level(), StockLevel::Normal);
        assert_eq!(recorder.events().len(), 2);
    }

    #[test]
    fn observer_sees_every_mutation_with_its_level() {
        let (warehouse, recorder) = recorded(Plan {
            work: 100,
            ..Plan::default()
        });

        warehouse
            .supply(Actor::supplier(2), Item::normal(42))
            .unwrap();
        warehouse.retail(Actor::retailer(1));

        let events = recorder.events();
        assert_eq!(events.len(), 2);

        let (event, snapshot) = &events[0];
        assert_eq!(event.actor, Actor::supplier(2));
        assert_eq!(event.action, Action::Produced);
        assert_eq!(snapshot.normal, 1);
        assert_eq!(snapshot.level, StockLevel::Low);
        assert_eq!(snapshot.last_action, event.to_string());

        let (event, snapshot) = &events[1];
        assert_eq!(event.action, Action::Consumed);
        assert_eq!(event.item, Item::normal(42));
        assert_eq!((snapshot.produced, snapshot.consumed), (1, 1));
    }

    #[test]
    fn many_threads_consume_exactly_the_work_bound() {
        const WORK: u64 = 200;

        let plan = Plan {
            capacity: 10,
            suppliers: 4,
            retailers: 3,
            work: WORK,
        };
        let (warehouse, _) = recorded(plan);
        let (done_tx, done_rx) = unbounded();

        for id in 0..plan.suppliers {
            let warehouse = warehouse.clone();
            let done_tx = done_tx.clone();

            std::thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(id as u64);
                while warehouse.is_running() {
                    let item = Item::random(&mut rng, 0.5);
                    if let Ok(Admission::Stopped) = warehouse.supply(Actor::supplier(id), item) {
                        break;
                    }
                }
                let _ = done_tx.send(());
            });
        }

        for id in 0..plan.retailers {
            let warehouse = warehouse.clone();
            let done_tx = done_tx.clone();

            std::thread::spawn(move || {
                while let Admission::Committed(_) = warehouse.retail(Actor::retailer(id)) {}
                let _ = done_tx.send(());
            });
        }

        for _ in 0..plan.suppliers + plan.retailers {
            done_rx.recv_timeout(JOIN_TIMEOUT).expect("a worker never stopped");
        }

        let report = warehouse.report();
        assert_eq!(report.consumed, WORK);
        assert!(report.produced >= report.consumed);
        assert_eq!(
            report.produced - report.consumed,
            (report.normal + report.urgent) as u64
        );
        assert!(report.normal + report.urgent <= plan.capacity);
    }

    #[test]
    fn report_display() {
        let report = Report {
            produced: 7,
            consumed: 5,
            normal: 1,
            urgent: 1,
        };

        assert_eq!(
            report.to_string(),
            "total produced: 7\ntotal consumed: 5\nleft in stock: 1 normal, 1 urgent"
        );
    }
}
