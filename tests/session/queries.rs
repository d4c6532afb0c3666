use crate::common::{session, simulator, TestHooks, CHILD_FILE, TOP_FILE};
use simstalker::debugger::{Error, VariableValue, UNRESOLVED};

#[test]
fn test_values() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = session(&hooks, &sim);
    sim.advance_time(12);

    assert_eq!(session.value("top.a").unwrap(), 1);
    assert_eq!(session.value("TOP.top.a").unwrap(), 1);
    assert_eq!(session.value("$time").unwrap(), 12);
    assert_eq!(session.time(), 12);
    assert!(matches!(session.value("top.x"), Err(Error::HandleNotFound(_))));

    let names = vec!["top.a".to_string(), "top.x".to_string(), "time".to_string()];
    assert_eq!(
        session.values(&names),
        vec![
            VariableValue::new("top.a", "1"),
            VariableValue::new("top.x", UNRESOLVED),
            VariableValue::new("time", "12"),
        ]
    );
}

#[test]
fn test_root_prefix() {
    let hooks = TestHooks::default();
    let sim = simulator();
    sim.add_signal("dut.top.a", 77);
    let session = session(&hooks, &sim);

    assert_eq!(session.root_prefix(), "TOP.");
    session.set_root_prefix("dut");
    assert_eq!(session.root_prefix(), "dut.");
    assert_eq!(session.value("top.a").unwrap(), 77);
}

#[test]
fn test_hierarchy_and_connections() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = session(&hooks, &sim);

    let view = session.hierarchy("$").unwrap();
    assert_eq!(view.scope, "");
    assert_eq!(view.children, vec!["top.child"]);
    assert!(session.hierarchy("top.child").unwrap().children.is_empty());

    let from = session.connections_from("top.child").unwrap();
    assert_eq!(from.len(), 1);
    assert_eq!(from[0].to_signal(), "top.in");
    assert_eq!(session.connections_to("top").unwrap(), from);
    assert!(session.connections_to("top.child").unwrap().is_empty());
}

#[test]
fn test_context_and_files() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = session(&hooks, &sim);

    let reports = session.context(TOP_FILE, 12).unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].local_value("time"), Some("7"));
    assert_eq!(reports[0].local_value("s"), Some("abc"));
    assert!(matches!(
        session.context(TOP_FILE, 1),
        Err(Error::NoBreakpointAt(_, 1))
    ));

    assert_eq!(session.files().unwrap(), vec![CHILD_FILE, TOP_FILE]);
}

#[test]
fn test_path_translation() {
    let hooks = TestHooks::default();
    let sim = simulator();
    let session = session(&hooks, &sim);
    session.set_path_map("/home/user/rtl", "/src");

    let armed = session
        .arm_at("/home/user/rtl/top.v", 10, None, None)
        .unwrap();
    assert_eq!(armed[0].id, 1);
    assert_eq!(session.report(0, 1).filename, "/home/user/rtl/top.v");
    assert_eq!(
        session.files().unwrap(),
        vec!["/home/user/rtl/child.v", "/home/user/rtl/top.v"]
    );
    // untranslated build tree paths still work
    assert!(session.breakpoints_at(TOP_FILE, 10, None).is_ok());
}
