use crate::common::{builder, session, simulator, wait_until, Event, TestHooks};
use simstalker::debugger::ClockMode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn test_step_mode_is_sticky() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = session(&hooks, &sim);

    session.step_over();
    assert!(session.is_step_mode());

    let sim_thread = thread::spawn({
        let session = session.clone();
        move || {
            session.on_statement_trace(0, 1);
            session.on_statement_trace(0, 2);
            session.on_statement_trace(0, 3);
        }
    });

    assert!(wait_until(|| hooks.count() == 1 && session.is_paused()));
    session.step_over();
    assert!(wait_until(|| hooks.count() == 2 && session.is_paused()));
    session.continue_();
    sim_thread.join().unwrap();

    assert!(!session.is_step_mode());
    let steps: Vec<u32> = hooks
        .events()
        .into_iter()
        .map(|e| match e {
            Event::Step(report) => report.id,
            other => panic!("unexpected event {other:?}"),
        })
        .collect();
    assert_eq!(steps, vec![1, 2]);
}

#[test]
fn test_step_mode_respects_condition() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = session(&hooks, &sim);
    assert!(session.attach_predicate(1, "a > 100"));
    assert!(!session.evaluate_predicate(1));

    session.step_over();
    let sim_thread = thread::spawn({
        let session = session.clone();
        move || {
            session.on_statement_trace(0, 1);
            session.on_statement_trace(0, 2);
        }
    });

    assert!(wait_until(|| hooks.count() == 1 && session.is_paused()));
    assert!(matches!(hooks.last(), Some(Event::Step(report)) if report.id == 2));
    session.continue_();
    sim_thread.join().unwrap();
    assert_eq!(hooks.count(), 1);
}

#[test]
fn test_release_while_running_is_ignored() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = session(&hooks, &sim);
    session.arm(1);

    // no permit is kept for a future pause
    session.continue_();

    let sim_thread = thread::spawn({
        let session = session.clone();
        move || session.on_statement_trace(0, 1)
    });
    assert!(wait_until(|| hooks.count() == 1));
    assert!(session.is_paused());
    session.continue_();
    sim_thread.join().unwrap();
}

#[test]
fn test_wait_for_client() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = Arc::new(builder(&hooks).start_paused(true).build(sim.clone()));
    assert!(session.is_paused());

    let released = Arc::new(AtomicBool::new(false));
    let sim_thread = thread::spawn({
        let session = session.clone();
        let released = released.clone();
        move || {
            session.wait_for_client();
            released.store(true, Ordering::SeqCst);
        }
    });

    assert!(!released.load(Ordering::SeqCst));
    session.continue_();
    sim_thread.join().unwrap();
    assert!(released.load(Ordering::SeqCst));
    assert!(!session.is_paused());
}

#[test]
fn test_pause_on_clock_edge() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = session(&hooks, &sim);

    // disabled by default
    session.on_clock_edge();
    assert_eq!(hooks.count(), 0);
    assert!(session.hierarchy("$").unwrap().snapshot.is_none());

    session.set_clock_mode(ClockMode::On).unwrap();
    assert!(session.is_pause_on_clock());
    sim.advance_time(5);

    let sim_thread = thread::spawn({
        let session = session.clone();
        move || session.on_clock_edge()
    });
    assert!(wait_until(|| hooks.count() == 1));
    let Some(Event::Clock(snapshot)) = hooks.last() else {
        panic!("clock event expected");
    };
    assert_eq!(snapshot.time, 5);
    assert_eq!(snapshot.values.get("top.child.out"), Some(&9));
    assert_eq!(snapshot.values.get("top.in"), Some(&9));

    let view = session.hierarchy("$").unwrap();
    assert_eq!(view.snapshot, Some(snapshot));

    session.set_clock_mode(ClockMode::Off).unwrap();
    session.continue_();
    sim_thread.join().unwrap();

    session.on_clock_edge();
    assert_eq!(hooks.count(), 1);
}

#[test]
fn test_synch_pauses_once() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = session(&hooks, &sim);

    session.set_clock_mode(ClockMode::Synch).unwrap();
    assert!(!session.is_pause_on_clock());
    sim.advance_time(3);

    let sim_thread = thread::spawn({
        let sim = sim.clone();
        move || sim.quiesce()
    });
    assert!(wait_until(|| hooks.count() == 1));
    assert_eq!(hooks.last(), Some(Event::Synch(3)));
    session.continue_();
    sim_thread.join().unwrap();

    // one-shot
    sim.quiesce();
    assert_eq!(hooks.count(), 1);
}
