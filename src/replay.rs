//! Replay of a recorded simulation trace against a debug session.
//!
//! A trace stands in for a real simulator: it sets signal values, advances time and calls
//! the same session entry points that instrumented code calls.

use crate::debugger::DebugSession;
use crate::provider::MemorySimulator;
use anyhow::Context;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One simulation event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Change signal value.
    Set { name: String, value: i64 },
    /// Move simulation time forward.
    Advance(u64),
    /// Traced statement.
    Trace { instance: u32, breakpoint: u32 },
    /// Clock edge.
    Clock,
    /// Failed assertion.
    Exception { instance: u32, breakpoint: u32 },
    /// Quiescent point, pending synch callbacks run.
    Quiesce,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Trace {
    /// Initial values of simulator signals.
    pub signals: IndexMap<String, i64>,
    pub steps: Vec<Step>,
}

impl Trace {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).with_context(|| format!("read trace {}", path.display()))?;
        serde_json::from_slice(&data).with_context(|| format!("parse trace {}", path.display()))
    }

    /// Create every trace signal in the simulator.
    pub fn load_signals(&self, sim: &MemorySimulator) {
        for (name, value) in &self.signals {
            sim.add_signal(name.as_str(), *value);
        }
    }

    /// Run trace steps on the calling thread. Stop early if simulation is finished.
    /// Return number of executed steps.
    pub fn replay(&self, sim: &MemorySimulator, session: &DebugSession) -> usize {
        for (n, step) in self.steps.iter().enumerate() {
            if sim.is_finished() {
                log::info!(target: "simstalker", "simulation finished after {n} steps");
                return n;
            }
            log::trace!(target: "simstalker", "step {n}: {step:?}");
            match step {
                Step::Set { name, value } => {
                    if !sim.set_value(name, *value) {
                        log::warn!(target: "simstalker", "unknown signal `{name}` in trace");
                    }
                }
                Step::Advance(delta) => {
                    sim.advance_time(*delta);
                }
                Step::Trace {
                    instance,
                    breakpoint,
                } => session.on_statement_trace(*instance, *breakpoint),
                Step::Clock => session.on_clock_edge(),
                Step::Exception {
                    instance,
                    breakpoint,
                } => session.on_exception(*instance, *breakpoint),
                Step::Quiesce => sim.quiesce(),
            }
        }
        self.steps.len()
    }
}
