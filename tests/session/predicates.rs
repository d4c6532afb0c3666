use crate::common::{session, simulator, wait_until, Event, TestHooks, TOP_FILE};
use simstalker::debugger::expression::CompileError;
use simstalker::debugger::Error;
use std::thread;

#[test]
fn test_predicate_evaluation() {
    struct TestCase {
        condition: &'static str,
        a: i64,
        expected: bool,
    }
    let cases = vec![
        TestCase {
            condition: "a + 2",
            a: 1,
            expected: true,
        },
        TestCase {
            condition: "a + 2",
            a: -2,
            expected: false,
        },
        TestCase {
            condition: "a > 2",
            a: 1,
            expected: false,
        },
        TestCase {
            condition: "a > 2",
            a: 2,
            expected: false,
        },
        TestCase {
            condition: "a > 2",
            a: 3,
            expected: true,
        },
        TestCase {
            condition: "a == WIDTH && a % 2 == 0",
            a: 8,
            expected: true,
        },
        TestCase {
            condition: "a / 3",
            a: 2,
            expected: false,
        },
    ];

    let hooks = TestHooks::default();
    let sim = simulator();
    let session = session(&hooks, &sim);

    for tc in cases {
        assert!(session.attach_predicate(1, tc.condition), "{}", tc.condition);
        sim.set_value("TOP.top.a", tc.a);
        assert_eq!(
            session.evaluate_predicate(1),
            tc.expected,
            "condition: {}, a = {}",
            tc.condition,
            tc.a
        );
    }

    assert!(!session.evaluate_predicate(100));
    assert!(session.detach_predicate(1));
    assert!(!session.evaluate_predicate(1));
    assert!(!session.detach_predicate(1));
}

#[test]
fn test_unresolved_symbol_is_true() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = session(&hooks, &sim);

    assert!(session.attach_predicate(1, "ghost > 100"));
    assert!(session.evaluate_predicate(1));
}

#[test]
fn test_rejected_conditions() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = session(&hooks, &sim);

    assert!(matches!(
        session.try_attach_predicate(1, "a >"),
        Err(Error::Compile(CompileError::Syntax(_)))
    ));
    assert!(matches!(
        session.try_attach_predicate(1, "zz > 1"),
        Err(Error::Compile(CompileError::UnknownSymbol(name))) if name == "zz"
    ));
    assert!(matches!(
        session.try_attach_predicate(2, "s == 1"),
        Err(Error::NonIntegerConstant { name, .. }) if name == "s"
    ));
    assert!(matches!(
        session.try_attach_predicate(100, "a > 1"),
        Err(Error::InstanceNotFound(100))
    ));

    // rejected condition keeps the breakpoint armed and unconditional
    let armed = session.arm_at(TOP_FILE, 10, None, Some("a >")).unwrap();
    assert!(!armed[0].condition);
    assert!(session.is_armed(1));
    assert!(!session.evaluate_predicate(1));
}

#[test]
fn test_empty_condition_keeps_previous() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = session(&hooks, &sim);

    assert!(session.attach_predicate(1, "a == 1"));
    assert!(session.attach_predicate(1, "   "));
    assert!(session.evaluate_predicate(1));
    sim.set_value("TOP.top.a", 2);
    assert!(!session.evaluate_predicate(1));
}

#[test]
fn test_time_binding() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = session(&hooks, &sim);

    // no context variable named `time` at breakpoint 1
    assert!(session.attach_predicate(1, "time >= 10"));
    assert!(!session.evaluate_predicate(1));
    sim.advance_time(10);
    assert!(session.evaluate_predicate(1));

    // breakpoint 2 has a `time` context variable, simulation time is `time_`
    assert!(session.attach_predicate(2, "time_ > 5 && time == 7"));
    assert!(session.evaluate_predicate(2));
    assert!(session.attach_predicate(2, "time_ > 50"));
    assert!(!session.evaluate_predicate(2));
}

#[test]
fn test_conditional_breakpoint_stops_only_if_true() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = session(&hooks, &sim);

    let armed = session.arm_at(TOP_FILE, 10, None, Some("a > 2")).unwrap();
    assert!(armed[0].condition);

    // condition is false, trace returns right away
    session.on_statement_trace(0, 1);
    assert_eq!(hooks.count(), 0);

    sim.set_value("TOP.top.a", 3);
    let sim_thread = thread::spawn({
        let session = session.clone();
        move || session.on_statement_trace(0, 1)
    });
    assert!(wait_until(|| hooks.count() == 1));
    assert!(matches!(hooks.last(), Some(Event::Breakpoint(r)) if r.id == 1));

    session.continue_();
    sim_thread.join().unwrap();
}
