mod common;

mod breakpoints;
mod execution;
mod predicates;
mod queries;

use crate::common::{session, simulator, wait_until, Event, TestHooks};
use simstalker::debugger::Error;
use std::thread;

#[test]
fn test_session_without_client_never_pauses() {
    let hooks = TestHooks::default();
    hooks.set_attached(false);
    let sim = simulator();
    let session = session(&hooks, &sim);

    session.arm(1);
    session.step_over();
    // runs on this thread, returns only if nothing pauses
    session.on_statement_trace(0, 1);
    session.on_exception(0, 2);

    assert!(hooks.events().is_empty());
    assert!(!session.is_paused());
}

#[test]
fn test_watch_registers_once() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = session(&hooks, &sim);

    session.watch("top.a").unwrap();
    session.watch("top.a").unwrap();
    assert_eq!(sim.watch_count(), 1);

    sim.set_value("TOP.top.a", 42);
    assert_eq!(
        hooks.events(),
        vec![Event::Value("TOP.top.a".to_string(), 42)]
    );

    assert!(matches!(session.watch("top.unknown"), Err(Error::HandleNotFound(_))));

    assert_eq!(session.unwatch_all(), 1);
    assert_eq!(sim.watch_count(), 0);
    assert!(matches!(session.unwatch("top.a"), Err(Error::NotMonitored(_))));

    sim.set_value("TOP.top.a", 43);
    assert_eq!(hooks.count(), 1);
}

#[test]
fn test_stop_releases_simulation_for_good() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = session(&hooks, &sim);
    session.arm(1);

    let sim_thread = thread::spawn({
        let session = session.clone();
        move || session.on_statement_trace(0, 1)
    });
    assert!(wait_until(|| hooks.count() == 1));
    assert!(session.is_paused());

    session.stop();
    sim_thread.join().unwrap();
    assert!(sim.is_finished());
    assert!(!session.is_paused());

    // never pauses again, repeated stop never blocks
    session.stop();
    session.continue_();
    session.on_statement_trace(0, 1);
    session.stop();
    assert_eq!(hooks.count(), 1);
}

#[test]
fn test_shutdown_pushes_stop() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = session(&hooks, &sim);

    session.shutdown();
    assert_eq!(hooks.events(), vec![Event::Stop]);
    // shutdown doesn't terminate simulation
    assert!(!sim.is_finished());
}
