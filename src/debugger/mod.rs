pub mod breakpoint;
pub mod error;
pub mod expression;
pub mod gate;
pub mod monitor;
pub mod report;
pub mod sourcemap;
pub mod symbol;

pub use error::Error;
pub use report::{
    BreakpointReport, ClockMode, ClockSnapshot, HierarchyView, VariableValue, UNRESOLVED,
};

use crate::debugger::breakpoint::{BreakpointRegistry, Hit};
use crate::debugger::expression::{Binding, Expression, Predicate, SymbolEnvironment};
use crate::debugger::gate::SuspendGate;
use crate::debugger::sourcemap::SourceMap;
use crate::debugger::symbol::{display_name, SymbolResolver, DEFAULT_ROOT_PREFIX};
use crate::provider::SignalProvider;
use crate::store::{BreakpointLocation, Connection, DebugInfoStore, SymbolTableStore, Variable};
use crate::{muted_error, weak_error};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::thread;
use std::time::Duration;

/// Name bound to simulation time in predicates.
const TIME_VARIABLE: &str = "time";
/// Used instead of [`TIME_VARIABLE`] if a context variable already has that name.
const TIME_VARIABLE_ALIAS: &str = "time_";

/// Outward notifications of a debug session.
///
/// Every `on_*` method except [`EventHook::on_value_change`] is called on the simulation
/// thread right before it blocks.
pub trait EventHook: Send + Sync {
    /// Called when an armed breakpoint is hit.
    fn on_breakpoint(&self, report: &BreakpointReport) -> anyhow::Result<()>;

    /// Called on every traced statement in step mode.
    fn on_step(&self, report: &BreakpointReport) -> anyhow::Result<()>;

    /// Called when an instrumented assertion fails.
    fn on_exception(&self, report: &BreakpointReport) -> anyhow::Result<()>;

    /// Called on clock edge if pause on clock edge is enabled.
    fn on_clock(&self, snapshot: &ClockSnapshot) -> anyhow::Result<()>;

    /// Called at the requested quiescent point.
    fn on_synch(&self, time: u64) -> anyhow::Result<()>;

    /// Called on value change of a monitored signal. May be called from any thread.
    fn on_value_change(&self, name: &str, value: i64) -> anyhow::Result<()>;

    /// Called once when the runtime shuts down.
    fn on_stop(&self) -> anyhow::Result<()>;

    /// Is there a client that can release a paused simulation.
    fn is_attached(&self) -> bool;
}

/// Hook without a client, simulation never pauses.
pub struct NopHook;

impl EventHook for NopHook {
    fn on_breakpoint(&self, _: &BreakpointReport) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_step(&self, _: &BreakpointReport) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_exception(&self, _: &BreakpointReport) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_clock(&self, _: &ClockSnapshot) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_synch(&self, _: u64) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_value_change(&self, _: &str, _: i64) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_stop(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn is_attached(&self) -> bool {
        false
    }
}

/// Breakpoint armed by source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArmedBreakpoint {
    pub id: u32,
    pub instance_id: u32,
    pub column: u32,
    /// True if a condition is attached to the breakpoint.
    pub condition: bool,
}

/// Debug information store, attached once the client connects.
struct StoreSlot {
    store: RwLock<Option<Arc<dyn DebugInfoStore>>>,
    poll_interval: Duration,
}

impl StoreSlot {
    fn get(&self) -> Option<Arc<dyn DebugInfoStore>> {
        self.store.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set(&self, store: Arc<dyn DebugInfoStore>) {
        *self.store.write().unwrap_or_else(|e| e.into_inner()) = Some(store);
    }

    /// Block until a store is attached. Give up if `cancelled` returns true.
    fn wait(&self, cancelled: impl Fn() -> bool) -> Result<Arc<dyn DebugInfoStore>, Error> {
        let mut logged = false;
        loop {
            if let Some(store) = self.get() {
                return Ok(store);
            }
            if cancelled() {
                return Err(Error::StoreNotAttached);
            }
            if !logged {
                log::info!(target: "session", "waiting for debug information store");
                logged = true;
            }
            thread::sleep(self.poll_interval);
        }
    }
}

/// Mutable settings shared by control requests.
#[derive(Default)]
struct SessionState {
    /// Current hierarchy scope, empty means design top.
    scope: String,
    source_map: SourceMap,
}

pub struct SessionBuilder {
    hooks: Arc<dyn EventHook>,
    root_prefix: String,
    poll_interval: Duration,
    start_paused: bool,
    store: Option<Arc<dyn DebugInfoStore>>,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self {
            hooks: Arc::new(NopHook),
            root_prefix: DEFAULT_ROOT_PREFIX.to_string(),
            poll_interval: Duration::from_millis(100),
            start_paused: true,
            store: None,
        }
    }
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set event hooks implementation.
    pub fn with_hooks(self, hooks: Arc<dyn EventHook>) -> Self {
        Self { hooks, ..self }
    }

    pub fn with_root_prefix(self, prefix: impl Into<String>) -> Self {
        Self {
            root_prefix: prefix.into(),
            ..self
        }
    }

    /// Set interval for polling the store slot while waiting for a store.
    pub fn with_store_poll_interval(self, interval: Duration) -> Self {
        Self {
            poll_interval: interval,
            ..self
        }
    }

    /// If false [`DebugSession::wait_for_client`] returns immediately.
    pub fn start_paused(self, paused: bool) -> Self {
        Self {
            start_paused: paused,
            ..self
        }
    }

    pub fn with_store(self, store: Arc<dyn DebugInfoStore>) -> Self {
        Self {
            store: Some(store),
            ..self
        }
    }

    pub fn build(self, provider: Arc<dyn SignalProvider>) -> DebugSession {
        DebugSession {
            hooks: self.hooks,
            resolver: SymbolResolver::new(provider, &self.root_prefix),
            breakpoints: BreakpointRegistry::new(),
            gate: SuspendGate::new(self.start_paused),
            store: StoreSlot {
                store: RwLock::new(self.store),
                poll_interval: self.poll_interval,
            },
            step_mode: AtomicBool::new(false),
            pause_on_clock: AtomicBool::new(false),
            paused_on_clock: AtomicBool::new(false),
            state: Mutex::default(),
        }
    }
}

/// Debug session of a running simulation.
///
/// Simulation thread drives the session through `on_*` methods, control thread mutates
/// session state and releases a paused simulation.
///
/// Lock scopes: breakpoint registry, symbol table (handle cache + monitors), session state
/// and store slot each have their own short-held lock. None of them is held while
/// the simulation thread is parked or while an event is pushed through the hook.
pub struct DebugSession {
    hooks: Arc<dyn EventHook>,
    resolver: SymbolResolver,
    breakpoints: BreakpointRegistry,
    gate: SuspendGate,
    store: StoreSlot,
    /// Stop at every traced statement.
    step_mode: AtomicBool,
    pause_on_clock: AtomicBool,
    /// Set after first pause on clock edge, gates clock snapshots in hierarchy replies.
    paused_on_clock: AtomicBool,
    state: Mutex<SessionState>,
}

impl DebugSession {
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn wait_store(&self) -> Result<Arc<dyn DebugInfoStore>, Error> {
        self.store.wait(|| self.gate.is_stopped())
    }

    pub fn resolver(&self) -> &SymbolResolver {
        &self.resolver
    }

    /// Pause the simulation thread: mark paused, push the event, block until released.
    /// Without an attached client simulation keeps running.
    fn suspend(&self, what: &str, push: impl FnOnce(&dyn EventHook) -> anyhow::Result<()>) {
        if !self.hooks.is_attached() {
            log::info!(target: "session", "{what}: no client attached, continue simulation");
            return;
        }
        if !self.gate.pause() {
            return;
        }

        log::debug!(target: "session", "{what}: simulation paused");
        if weak_error!(push(self.hooks.as_ref()).map_err(Error::Hook), "push event:").is_none() {
            // nobody will release us
            self.gate.release();
        }
        self.gate.wait();
        log::debug!(target: "session", "simulation resumed");
    }

    // --------------------------------- simulation thread -----------------------------------------

    /// Block simulation until the first release, if session starts paused.
    pub fn wait_for_client(&self) {
        log::info!(target: "session", "waiting for a client to release simulation");
        self.gate.wait();
    }

    /// Called by instrumented code before every traced statement.
    pub fn on_statement_trace(&self, instance_id: u32, breakpoint_id: u32) {
        let step = self.step_mode.load(Ordering::SeqCst);
        let stop = match self.breakpoints.hit(breakpoint_id, step) {
            Hit::Miss => false,
            Hit::Unconditional => true,
            Hit::Conditional(predicate) => self.evaluate(&predicate),
        };
        if !stop {
            return;
        }

        let report = self.report(instance_id, breakpoint_id);
        if step {
            self.suspend(&format!("step at {breakpoint_id}"), |h| h.on_step(&report));
        } else {
            self.suspend(&format!("breakpoint {breakpoint_id} hit"), |h| {
                h.on_breakpoint(&report)
            });
        }
    }

    /// Called by instrumented code on every clock edge.
    pub fn on_clock_edge(&self) {
        if !self.pause_on_clock.load(Ordering::SeqCst) {
            return;
        }
        self.paused_on_clock.store(true, Ordering::SeqCst);
        let snapshot = self.clock_snapshot();
        self.suspend("clock edge", |h| h.on_clock(&snapshot));
    }

    /// Called by instrumented code when an assertion fails.
    pub fn on_exception(&self, instance_id: u32, breakpoint_id: u32) {
        let report = self.report(instance_id, breakpoint_id);
        self.suspend(&format!("exception at {breakpoint_id}"), |h| {
            h.on_exception(&report)
        });
    }

    /// Pause once at the next quiescent point of simulation.
    pub fn on_synch_once(self: &Arc<Self>) -> Result<(), Error> {
        let session = Arc::downgrade(self);
        let registered = self
            .resolver
            .provider()
            .register_synch(Box::new(move || {
                if let Some(session) = session.upgrade() {
                    let time = session.time();
                    session.suspend("synch", |h| h.on_synch(time));
                }
            }));
        if !registered {
            return Err(Error::SynchRejected);
        }
        Ok(())
    }

    // --------------------------------- breakpoints -----------------------------------------------

    pub fn arm(&self, id: u32) -> bool {
        log::debug!(target: "session", "arm breakpoint {id}");
        self.breakpoints.arm(id)
    }

    /// Disarm a breakpoint, its condition is dropped too.
    pub fn disarm(&self, id: u32) -> bool {
        log::debug!(target: "session", "disarm breakpoint {id}");
        self.breakpoints.disarm(id)
    }

    pub fn is_armed(&self, id: u32) -> bool {
        self.breakpoints.is_armed(id)
    }

    pub fn armed_breakpoints(&self) -> Vec<u32> {
        self.breakpoints.armed()
    }

    /// Find breakpoints at a client source location.
    pub fn breakpoints_at(
        &self,
        file: &str,
        line: u32,
        column: Option<u32>,
    ) -> Result<Vec<BreakpointLocation>, Error> {
        let store = self.wait_store()?;
        let target = self.state().source_map.map_client_to_target(file);
        let locations = store.breakpoints_at(&target, line, column);
        if locations.is_empty() {
            log::warn!(target: "session", "no breakpoint at {target}:{line}");
            return Err(Error::NoBreakpointAt(target, line));
        }
        Ok(locations)
    }

    /// Arm every breakpoint at a client source location and attach a condition to each.
    pub fn arm_at(
        &self,
        file: &str,
        line: u32,
        column: Option<u32>,
        condition: Option<&str>,
    ) -> Result<Vec<ArmedBreakpoint>, Error> {
        let locations = self.breakpoints_at(file, line, column)?;
        Ok(locations
            .into_iter()
            .map(|loc| {
                self.arm(loc.breakpoint_id);
                let condition = match condition {
                    Some(text) if !text.trim().is_empty() => {
                        self.attach_predicate(loc.breakpoint_id, text)
                    }
                    _ => false,
                };
                ArmedBreakpoint {
                    id: loc.breakpoint_id,
                    instance_id: loc.instance_id,
                    column: loc.column,
                    condition,
                }
            })
            .collect())
    }

    /// Disarm every breakpoint at a client source location.
    pub fn disarm_at(&self, file: &str, line: u32, column: Option<u32>) -> Result<Vec<u32>, Error> {
        let locations = self.breakpoints_at(file, line, column)?;
        let mut ids: Vec<u32> = locations.iter().map(|l| l.breakpoint_id).collect();
        ids.dedup();
        ids.iter().for_each(|&id| {
            self.disarm(id);
        });
        Ok(ids)
    }

    /// Disarm every breakpoint of a client source file.
    pub fn disarm_file(&self, file: &str) -> Result<Vec<u32>, Error> {
        let store = self.wait_store()?;
        let target = self.state().source_map.map_client_to_target(file);
        let ids = store.breakpoints_in_file(&target);
        if ids.is_empty() {
            return Err(Error::NoBreakpointsInFile(target));
        }
        ids.iter().for_each(|&id| {
            self.disarm(id);
        });
        Ok(ids)
    }

    /// Attach a condition to a breakpoint. Return false if condition is rejected,
    /// an armed breakpoint stays armed in this case.
    pub fn attach_predicate(&self, id: u32, text: &str) -> bool {
        weak_error!(
            self.try_attach_predicate(id, text),
            "attach breakpoint condition:"
        )
        .is_some()
    }

    /// Attach a condition to a breakpoint. Empty text is accepted and attaches nothing.
    ///
    /// Condition identifiers are bound to the variables visible at breakpoint:
    /// generator (self) variables first, then context variables, first binding of a name
    /// wins. Live variables are read on every evaluation, others must be integer literals.
    pub fn try_attach_predicate(&self, id: u32, text: &str) -> Result<(), Error> {
        if text.trim().is_empty() {
            return Ok(());
        }

        let store = self.wait_store()?;
        let instance_id = store.instance_of(id).ok_or(Error::InstanceNotFound(id))?;
        let expr = Expression::parse(text)?;
        let identifiers = expr.identifiers();

        let self_vars = store.self_variables(instance_id, id);
        let context_vars = store.context_variables(instance_id, id);

        let mut env = SymbolEnvironment::new();
        let visible = self_vars
            .iter()
            .filter(|v| !v.name.is_empty())
            .chain(context_vars.iter());
        for var in visible {
            if !identifiers.contains(var.name.as_str()) || env.contains(&var.name) {
                continue;
            }
            env.bind(var.name.clone(), self.binding(var)?);
        }

        let time_name = if context_vars.iter().any(|v| v.name == TIME_VARIABLE) {
            TIME_VARIABLE_ALIAS
        } else {
            TIME_VARIABLE
        };
        if identifiers.contains(time_name) {
            env.bind(time_name, Binding::Time);
        }

        let predicate = Predicate::compile(text, env)?;
        self.breakpoints.set_predicate(id, predicate);
        log::info!(target: "session", "condition `{text}` attached to breakpoint {id}");
        Ok(())
    }

    fn binding(&self, var: &Variable) -> Result<Binding, Error> {
        if var.is_live {
            return Ok(Binding::Live(self.resolver.canonicalize(&var.full_handle())));
        }
        var.value
            .trim()
            .parse::<i64>()
            .map(Binding::Constant)
            .map_err(|_| Error::NonIntegerConstant {
                name: var.name.clone(),
                value: var.value.clone(),
            })
    }

    /// Remove breakpoint condition. Return false if there was no condition.
    pub fn detach_predicate(&self, id: u32) -> bool {
        self.breakpoints.remove_predicate(id)
    }

    /// Evaluate breakpoint condition. A breakpoint without condition evaluates to false.
    pub fn evaluate_predicate(&self, id: u32) -> bool {
        self.breakpoints
            .predicate(id)
            .map(|p| self.evaluate(&p))
            .unwrap_or(false)
    }

    fn evaluate(&self, predicate: &Predicate) -> bool {
        predicate.evaluate_with(|name, binding| match binding {
            Binding::Live(handle) => muted_error!(
                self.resolver.canonical_value(handle),
                "read condition symbol:"
            )
            .or_else(|| {
                log::debug!(target: "session", "`{name}` unresolved, condition is true");
                None
            }),
            Binding::Time => Some(self.resolver.read_time() as i64),
            Binding::Constant(v) => Some(*v),
        })
    }

    // --------------------------------- monitors --------------------------------------------------

    /// Push value of a signal to the client on every change.
    pub fn watch(&self, name: &str) -> Result<(), Error> {
        let hooks = self.hooks.clone();
        self.resolver.watch(name, move |canonical| {
            Box::new(move |value: i64| {
                weak_error!(hooks.on_value_change(&canonical, value).map_err(Error::Hook));
            })
        })
    }

    pub fn unwatch(&self, name: &str) -> Result<(), Error> {
        self.resolver.unwatch(name)
    }

    pub fn unwatch_all(&self) -> usize {
        self.resolver.unwatch_all()
    }

    // --------------------------------- execution -------------------------------------------------

    /// Leave step mode and resume simulation.
    pub fn continue_(&self) {
        self.step_mode.store(false, Ordering::SeqCst);
        self.gate.release();
    }

    /// Enter step mode (until next [`DebugSession::continue_`]) and resume simulation.
    pub fn step_over(&self) {
        self.step_mode.store(true, Ordering::SeqCst);
        self.gate.release();
    }

    /// Finish simulation. Simulation is never paused again.
    pub fn stop(&self) {
        log::info!(target: "session", "stop simulation");
        self.resolver.provider().terminate_simulation();
        self.gate.stop();
    }

    /// Release a simulation paused by a client that has gone.
    pub fn client_detached(&self) {
        log::info!(target: "session", "client detached, resume simulation");
        self.continue_();
    }

    /// Notify the client about shutdown and open the gate for good.
    pub fn shutdown(&self) {
        weak_error!(self.hooks.on_stop().map_err(Error::Hook), "push stop event:");
        self.gate.stop();
    }

    // --------------------------------- settings --------------------------------------------------

    pub fn set_root_prefix(&self, prefix: &str) {
        self.resolver.set_root_prefix(prefix);
    }

    pub fn root_prefix(&self) -> String {
        self.resolver.root_prefix()
    }

    pub fn set_clock_mode(self: &Arc<Self>, mode: ClockMode) -> Result<(), Error> {
        log::info!(target: "session", "pause on clock edge: {mode}");
        self.pause_on_clock
            .store(mode == ClockMode::On, Ordering::SeqCst);
        if mode == ClockMode::Synch {
            self.on_synch_once()?;
        }
        Ok(())
    }

    pub fn is_pause_on_clock(&self) -> bool {
        self.pause_on_clock.load(Ordering::SeqCst)
    }

    /// Add a path translation pair between client and build source trees.
    pub fn set_path_map(&self, client_prefix: &str, target_prefix: &str) {
        log::debug!(target: "session", "path map {client_prefix} -> {target_prefix}");
        self.state()
            .source_map
            .add(client_prefix, target_prefix);
    }

    pub fn attach_store(&self, store: Arc<dyn DebugInfoStore>) {
        self.store.set(store);
        log::info!(target: "session", "debug information store attached");
    }

    /// Load a symbol table and attach it. `database` is a path in the client tree.
    pub fn connect(
        &self,
        database: &str,
        path_map: Option<(&str, &str)>,
    ) -> Result<(), Error> {
        if let Some((client, target)) = path_map {
            self.set_path_map(client, target);
        }
        let path = self.state().source_map.map_client_to_target(database);
        let store = SymbolTableStore::open(&path).map_err(Error::StoreLoad)?;
        self.attach_store(Arc::new(store));
        Ok(())
    }

    // --------------------------------- queries ---------------------------------------------------

    pub fn is_connected(&self) -> bool {
        self.store.get().is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.gate.is_paused()
    }

    pub fn is_step_mode(&self) -> bool {
        self.step_mode.load(Ordering::SeqCst)
    }

    pub fn value(&self, name: &str) -> Result<i64, Error> {
        self.resolver.value(name)
    }

    /// Read a batch of values, unresolved ones are reported as [`UNRESOLVED`].
    pub fn values(&self, names: &[String]) -> Vec<VariableValue> {
        names
            .iter()
            .map(|name| VariableValue::new(name, self.value_string(name)))
            .collect()
    }

    fn value_string(&self, name: &str) -> String {
        muted_error!(self.resolver.value(name))
            .map(|v| v.to_string())
            .unwrap_or_else(|| UNRESOLVED.to_string())
    }

    pub fn time(&self) -> u64 {
        self.resolver.read_time()
    }

    /// Children of a scope (`$` or empty is design top). Scope becomes the current one.
    pub fn hierarchy(&self, scope: &str) -> Result<HierarchyView, Error> {
        let store = self.wait_store()?;
        let scope = if scope == "$" { "" } else { scope };
        let children = store
            .hierarchy(scope)
            .iter()
            .map(|h| h.handle_name())
            .collect();
        self.state().scope = scope.to_string();

        let snapshot = self
            .paused_on_clock
            .load(Ordering::SeqCst)
            .then(|| self.clock_snapshot());
        Ok(HierarchyView {
            scope: scope.to_string(),
            children,
            snapshot,
        })
    }

    pub fn connections_to(&self, handle: &str) -> Result<Vec<Connection>, Error> {
        Ok(self.wait_store()?.connections_to(handle))
    }

    pub fn connections_from(&self, handle: &str) -> Result<Vec<Connection>, Error> {
        Ok(self.wait_store()?.connections_from(handle))
    }

    /// Reports of every breakpoint at a client source location.
    pub fn context(&self, file: &str, line: u32) -> Result<Vec<BreakpointReport>, Error> {
        let store = self.wait_store()?;
        let locations = self.breakpoints_at(file, line, None)?;
        Ok(locations
            .iter()
            .map(|loc| self.build_report(store.as_ref(), loc.instance_id, loc.breakpoint_id))
            .collect())
    }

    /// Instrumented files in the client tree.
    pub fn files(&self) -> Result<Vec<String>, Error> {
        let files = self.wait_store()?.files();
        let state = self.state();
        Ok(files
            .iter()
            .map(|f| state.source_map.map_target_to_client(f))
            .collect())
    }

    /// Time and values of signals connecting children of the current scope.
    pub fn clock_snapshot(&self) -> ClockSnapshot {
        let mut snapshot = ClockSnapshot {
            time: self.time(),
            ..Default::default()
        };
        let Some(store) = self.store.get() else {
            return snapshot;
        };

        let scope = self.state().scope.clone();
        for child in store.hierarchy(&scope) {
            for conn in store.connections_from(&child.handle_name()) {
                let from = conn.from_signal();
                if let Some(value) = muted_error!(self.resolver.value(&from)) {
                    snapshot.values.insert(from, value);
                    snapshot.values.insert(conn.to_signal(), value);
                }
            }
        }
        snapshot
    }

    /// Report of a breakpoint. Without a store only ids are filled.
    pub fn report(&self, instance_id: u32, breakpoint_id: u32) -> BreakpointReport {
        match self.store.get() {
            Some(store) => self.build_report(store.as_ref(), instance_id, breakpoint_id),
            None => BreakpointReport {
                id: breakpoint_id,
                instance_id,
                instance_name: String::new(),
                filename: String::new(),
                line: 0,
                generator: vec![],
                local: vec![],
            },
        }
    }

    fn build_report(
        &self,
        store: &dyn DebugInfoStore,
        instance_id: u32,
        breakpoint_id: u32,
    ) -> BreakpointReport {
        let generator = store
            .self_variables(instance_id, breakpoint_id)
            .into_iter()
            .map(|var| {
                if var.is_live {
                    VariableValue::new(
                        display_name(&var.value),
                        self.value_string(&var.full_handle()),
                    )
                } else {
                    VariableValue::new(var.name, var.value)
                }
            })
            .collect();

        let local = store
            .context_variables(instance_id, breakpoint_id)
            .into_iter()
            .map(|var| {
                if var.is_live {
                    let value = self.value_string(&var.full_handle());
                    VariableValue::new(var.name, value)
                } else {
                    VariableValue::new(var.name, var.value)
                }
            })
            .collect();

        let (filename, line) = match store.breakpoint_location(breakpoint_id) {
            Some(loc) => (
                self.state().source_map.map_target_to_client(&loc.file),
                loc.line,
            ),
            None => (String::new(), 0),
        };

        BreakpointReport {
            id: breakpoint_id,
            instance_id,
            instance_name: store.instance_name(instance_id).unwrap_or_default(),
            filename,
            line,
            generator,
            local,
        }
    }
}
