//! A warehouse stock pipeline: supplier threads generate items and retailer threads consume them
//! through a fixed-capacity shared store.
//!
//! # Philosophy
//!
//! Every supplier and retailer is a `worker` running on its own OS thread for as long as the
//! [`Warehouse`] runs. Workers never talk to each other, they only meet at the warehouse's gate.
//!
//! The store is made of two lanes, normal and urgent. Whenever both hold items, retailers are
//! served from the urgent lane; within a lane, items leave in the order they came in.
//!
//! # Usage
//!
//! Here's a small pipeline with one supplier and one retailer, stopping on its own once five items
//! were consumed.
//!
//! ```
//! # use std::sync::Arc;
//! # use std::time::Duration;
//! # use warehouse::*;
//! let config = Config {
//!     plan: Plan { capacity: 10, suppliers: 1, retailers: 1, work: 5 },
//!     supply_delay: Duration::ZERO,
//!     retail_delay: Duration::ZERO,
//!     ..Config::default()
//! };
//!
//! let warehouse = Arc::new(Warehouse::new(config.plan(), Silent));
//! let mut runtime = Runtime::new(warehouse.clone());
//!
//! runtime.staff(&config).unwrap();
//! runtime.wait();
//!
//! assert_eq!(warehouse.report().consumed, 5);
//! ```
//!
//! # The gate
//!
//! The [`Gate`] holds two counting tokens, free slots and filled slots, and one lock around the store.
//! A supplier takes a free-slot token, inserts under the lock, then hands a filled-slot token back.
//! A retailer does the mirror.
//!
//! # Shutdown
//!
//! A warehouse stops once, either when retailers used up the work bound, on [`Warehouse::shutdown`]
//! or on an OS interrupt picked up by the [`Supervisor`]. Stopping posts one token per configured
//! thread so that nobody stays parked on the gate.
//!
//! # Observing
//!
//! Every mutation is reported, lock held, to an [`Observer`]: the [`EventLog`] appends records to a
//! file and the [`StatusBoard`] feeds a live [`Renderer`].

#![warn(missing_docs)]

mod config;
mod console;
mod display;
mod error;
mod gate;
mod item;
mod journal;
mod lane;
mod lifecycle;
mod monitor;
mod observer;
mod runtime;
mod semaphore;
mod settings;
mod signal;
mod staff;
mod store;
#[cfg(test)]
mod test_utils;
mod warehouse;
mod worker;

pub use config::*;
pub use console::*;
pub use display::*;
pub use error::*;
pub use gate::*;
pub use item::*;
pub use journal::*;
pub use lane::*;
pub use lifecycle::*;
pub use monitor::*;
pub use observer::*;
pub use runtime::*;
pub use semaphore::*;
pub use settings::*;
pub use signal::*;
pub use staff::*;
pub use store::*;
pub use warehouse::*;
pub use worker::*;
