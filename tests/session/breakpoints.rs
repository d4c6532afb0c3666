use crate::common::{
    builder, session, simulator, symbol_table, wait_until, Event, TestHooks, CHILD_FILE,
    TOP_FILE,
};
use simstalker::debugger::Error;
use simstalker::store::SymbolTableStore;
use std::sync::Arc;
use std::thread;

#[test]
fn test_arm_and_query_by_location() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = session(&hooks, &sim);

    let armed = session.arm_at(TOP_FILE, 12, None, None).unwrap();
    let ids: Vec<u32> = armed.iter().map(|bp| bp.id).collect();
    assert_eq!(ids, vec![2, 3]);
    assert!(armed.iter().all(|bp| !bp.condition));

    let found: Vec<u32> = session
        .breakpoints_at(TOP_FILE, 12, None)
        .unwrap()
        .iter()
        .map(|bp| bp.breakpoint_id)
        .collect();
    assert_eq!(found, ids);
    assert_eq!(session.armed_breakpoints(), vec![2, 3]);

    let removed = session.disarm_at(TOP_FILE, 12, Some(9)).unwrap();
    assert_eq!(removed, vec![3]);
    assert_eq!(session.armed_breakpoints(), vec![2]);

    let removed = session.disarm_at(TOP_FILE, 12, None).unwrap();
    assert_eq!(removed, vec![2, 3]);
    assert!(session.armed_breakpoints().is_empty());

    assert!(matches!(
        session.arm_at(TOP_FILE, 11, None, None),
        Err(Error::NoBreakpointAt(_, 11))
    ));
}

#[test]
fn test_disarm_file() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = session(&hooks, &sim);

    session.arm_at(TOP_FILE, 10, None, None).unwrap();
    session.arm_at(TOP_FILE, 12, None, None).unwrap();
    session.arm_at(CHILD_FILE, 3, None, None).unwrap();

    let mut removed = session.disarm_file(TOP_FILE).unwrap();
    removed.sort();
    assert_eq!(removed, vec![1, 2, 3]);
    assert_eq!(session.armed_breakpoints(), vec![4]);

    assert!(matches!(
        session.disarm_file("/src/none.v"),
        Err(Error::NoBreakpointsInFile(_))
    ));
}

#[test]
fn test_breakpoint_without_condition_stops() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = session(&hooks, &sim);
    session.arm_at(TOP_FILE, 10, None, None).unwrap();

    // unarmed breakpoints are passed through
    session.on_statement_trace(0, 2);
    assert_eq!(hooks.count(), 0);

    let sim_thread = thread::spawn({
        let session = session.clone();
        move || session.on_statement_trace(0, 1)
    });
    assert!(wait_until(|| hooks.count() == 1));
    assert!(session.is_paused());

    let Some(Event::Breakpoint(report)) = hooks.last() else {
        panic!("breakpoint event expected");
    };
    assert_eq!(report.id, 1);
    assert_eq!(report.instance_name, "top");
    assert_eq!(report.filename, TOP_FILE);
    assert_eq!(report.line, 10);
    assert_eq!(report.generator_value("a"), Some("1"));
    assert_eq!(report.generator_value("WIDTH"), Some("8"));
    assert_eq!(report.generator_value("ghost"), Some("ERROR"));
    assert_eq!(report.local_value("i"), Some("0"));

    session.continue_();
    sim_thread.join().unwrap();
    assert!(!session.is_paused());
}

#[test]
fn test_report_display_names() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = session(&hooks, &sim);

    let report = session.report(1, 4);
    assert_eq!(report.instance_name, "top.child");
    assert_eq!(report.filename, CHILD_FILE);
    assert_eq!(report.generator_value("b.1"), Some("5"));
}

#[test]
fn test_location_lookup_waits_for_store() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = Arc::new(builder(&hooks).build(sim.clone()));
    assert!(!session.is_connected());

    let control_thread = thread::spawn({
        let session = session.clone();
        move || session.arm_at(TOP_FILE, 10, None, None)
    });

    session.attach_store(Arc::new(SymbolTableStore::new(symbol_table())));
    let armed = control_thread.join().unwrap().unwrap();
    assert_eq!(armed[0].id, 1);
    assert!(session.is_connected());
}

#[test]
fn test_store_wait_cancelled_by_stop() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = Arc::new(builder(&hooks).build(sim.clone()));

    let control_thread = thread::spawn({
        let session = session.clone();
        move || session.files()
    });
    session.stop();
    assert!(matches!(
        control_thread.join().unwrap(),
        Err(Error::StoreNotAttached)
    ));
}

#[test]
fn test_exception_pauses_without_breakpoint() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = session(&hooks, &sim);

    let sim_thread = thread::spawn({
        let session = session.clone();
        move || session.on_exception(1, 4)
    });
    assert!(wait_until(|| hooks.count() == 1));
    let Some(Event::Exception(report)) = hooks.last() else {
        panic!("exception event expected");
    };
    assert_eq!(report.id, 4);

    session.continue_();
    sim_thread.join().unwrap();
}
