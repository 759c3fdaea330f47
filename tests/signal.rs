//! Real signal delivery, in a process of its own.
//!
//! Every test binds its handlers before raising anything: an unhandled `SIGINT` would
//! kill the whole test binary.

use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::bounded;
use signal_hook::consts::SIGINT;
use signal_hook::low_level::raise;
use warehouse::{Config, Interrupt, Plan, Runtime, Silent, State, Supervisor, Warehouse};

const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

#[test]
fn repeated_interrupts_only_raise_the_flag() {
    let interrupt = Interrupt::register();
    assert!(!interrupt.is_raised());

    raise(SIGINT).expect("failed to raise SIGINT");
    std::thread::sleep(Duration::from_millis(20));
    assert!(interrupt.is_raised());

    // Still alive after the second one.
    raise(SIGINT).expect("failed to raise SIGINT");
    std::thread::sleep(Duration::from_millis(20));
    assert!(interrupt.is_raised());
}

#[test]
fn interrupt_winds_a_staffed_runtime_down() {
    let plan = Plan {
        capacity: 10,
        suppliers: 3,
        retailers: 2,
        work: u64::MAX,
    };
    let interrupt = Interrupt::register();
    let warehouse = Arc::new(Warehouse::new(plan, Silent));
    let mut rt = Runtime::new(warehouse.clone());

    rt.launch(Supervisor::with_poll(interrupt, Duration::from_millis(1)))
        .expect("failed to launch the supervisor");
    rt.staff(&Config {
        plan,
        supply_delay: Duration::from_millis(5),
        retail_delay: Duration::from_millis(5),
        ..Config::default()
    })
    .expect("failed to staff the warehouse");

    std::thread::sleep(Duration::from_millis(100));
    raise(SIGINT).expect("failed to raise SIGINT");

    let (done_tx, done_rx) = bounded(1);
    std::thread::spawn(move || {
        rt.wait();
        let _ = done_tx.send(());
    });
    done_rx
        .recv_timeout(JOIN_TIMEOUT)
        .expect("the runtime didn't wind down");

    assert_eq!(warehouse.state(), State::Stopped);
    let report = warehouse.report();
    assert!(report.produced >= report.consumed);
}
