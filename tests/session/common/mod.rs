use serde_json::json;
use simstalker::debugger::{
    BreakpointReport, ClockSnapshot, DebugSession, EventHook, SessionBuilder,
};
use simstalker::provider::MemorySimulator;
use simstalker::store::{SymbolTable, SymbolTableStore};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const WAIT_TIMEOUT: Duration = Duration::from_secs(5);
const WAIT_STEP: Duration = Duration::from_millis(5);

pub const TOP_FILE: &str = "/src/top.v";
pub const CHILD_FILE: &str = "/src/child.v";

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Breakpoint(BreakpointReport),
    Step(BreakpointReport),
    Exception(BreakpointReport),
    Clock(ClockSnapshot),
    Synch(u64),
    Value(String, i64),
    Stop,
}

/// Event hook that records every pushed event.
#[derive(Clone, Default)]
pub struct TestHooks {
    events: Arc<Mutex<Vec<Event>>>,
    detached: Arc<AtomicBool>,
}

impl TestHooks {
    fn push(&self, event: Event) -> anyhow::Result<()> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<Event> {
        self.events.lock().unwrap().last().cloned()
    }

    pub fn set_attached(&self, attached: bool) {
        self.detached.store(!attached, Ordering::SeqCst);
    }
}

impl EventHook for TestHooks {
    fn on_breakpoint(&self, report: &BreakpointReport) -> anyhow::Result<()> {
        self.push(Event::Breakpoint(report.clone()))
    }

    fn on_step(&self, report: &BreakpointReport) -> anyhow::Result<()> {
        self.push(Event::Step(report.clone()))
    }

    fn on_exception(&self, report: &BreakpointReport) -> anyhow::Result<()> {
        self.push(Event::Exception(report.clone()))
    }

    fn on_clock(&self, snapshot: &ClockSnapshot) -> anyhow::Result<()> {
        self.push(Event::Clock(snapshot.clone()))
    }

    fn on_synch(&self, time: u64) -> anyhow::Result<()> {
        self.push(Event::Synch(time))
    }

    fn on_value_change(&self, name: &str, value: i64) -> anyhow::Result<()> {
        self.push(Event::Value(name.to_string(), value))
    }

    fn on_stop(&self) -> anyhow::Result<()> {
        self.push(Event::Stop)
    }

    fn is_attached(&self) -> bool {
        !self.detached.load(Ordering::SeqCst)
    }
}

/// Poll a condition until it holds or a timeout expires.
pub fn wait_until(cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + WAIT_TIMEOUT;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(WAIT_STEP);
    }
    cond()
}

pub fn symbol_table() -> SymbolTable {
    serde_json::from_value(json!({
        "top_name": "top",
        "instances": [
            {"id": 0, "name": "top"},
            {"id": 1, "name": "top.child"},
        ],
        "breakpoints": [
            {"id": 1, "filename": TOP_FILE, "line": 10, "instances": [0]},
            {"id": 2, "filename": TOP_FILE, "line": 12, "column": 4, "instances": [0]},
            {"id": 3, "filename": TOP_FILE, "line": 12, "column": 9, "instances": [0]},
            {"id": 4, "filename": CHILD_FILE, "line": 3, "instances": [1]},
        ],
        "generator_variables": [
            {"instance_id": 0, "name": "a", "value": "a", "is_var": true},
            {"instance_id": 0, "name": "WIDTH", "value": "8"},
            {"instance_id": 0, "name": "ghost", "value": "ghost", "is_var": true},
            {"instance_id": 1, "name": "b", "value": "b[1]", "is_var": true},
        ],
        "context_variables": [
            {"breakpoint_id": 1, "name": "i", "value": "i", "is_var": true},
            {"breakpoint_id": 2, "name": "time", "value": "7"},
            {"breakpoint_id": 2, "name": "s", "value": "abc"},
        ],
        "hierarchy": [
            {"parent": "top", "child": "child"},
        ],
        "connections": [
            {"handle_from": "top.child", "var_from": "out", "handle_to": "top", "var_to": "in"},
        ],
    }))
    .unwrap()
}

/// Write the symbol table fixture into a fresh temporary file.
pub fn write_symbol_table(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("simstalker-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_vec(&symbol_table()).unwrap()).unwrap();
    path
}

pub fn simulator() -> Arc<MemorySimulator> {
    let sim = Arc::new(MemorySimulator::new());
    sim.add_signal("TOP.top.a", 1);
    sim.add_signal("TOP.top.i", 0);
    sim.add_signal("TOP.top.child.b[1]", 5);
    sim.add_signal("TOP.top.child.out", 9);
    sim.add_signal("TOP.top.in", 9);
    sim
}

pub fn builder(hooks: &TestHooks) -> SessionBuilder {
    SessionBuilder::new()
        .with_hooks(Arc::new(hooks.clone()))
        .with_store_poll_interval(Duration::from_millis(10))
        .start_paused(false)
}

/// Running session with attached symbol table.
pub fn session(hooks: &TestHooks, sim: &Arc<MemorySimulator>) -> Arc<DebugSession> {
    Arc::new(
        builder(hooks)
            .with_store(Arc::new(SymbolTableStore::new(symbol_table())))
            .build(sim.clone()),
    )
}
