//! Data pushed to the client when simulation stops.

use serde::Serialize;
use std::collections::BTreeMap;
use strum_macros::{Display, EnumString};

/// Value shown for a variable whose signal can't be resolved.
pub const UNRESOLVED: &str = "ERROR";

/// Pause on clock edge mode.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display, EnumString)]
pub enum ClockMode {
    #[strum(serialize = "on")]
    On,
    #[strum(serialize = "off")]
    Off,
    /// Stop once at the next quiescent point.
    #[strum(serialize = "synch")]
    Synch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableValue {
    pub name: String,
    pub value: String,
}

impl VariableValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Snapshot of a breakpoint: where it is and what is visible from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakpointReport {
    pub id: u32,
    pub instance_id: u32,
    pub instance_name: String,
    /// File in the client source tree, empty if unknown.
    pub filename: String,
    /// Zero if unknown.
    pub line: u32,
    /// Generator (self) variables.
    pub generator: Vec<VariableValue>,
    /// Context (local) variables.
    pub local: Vec<VariableValue>,
}

impl BreakpointReport {
    pub fn generator_value(&self, name: &str) -> Option<&str> {
        self.generator
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.value.as_str())
    }

    pub fn local_value(&self, name: &str) -> Option<&str> {
        self.local
            .iter()
            .find(|v| v.name == name)
            .map(|v| v.value.as_str())
    }
}

/// Simulation time and values of signals connecting the current scope children.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClockSnapshot {
    pub time: u64,
    pub values: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyView {
    pub scope: String,
    /// Child handle names (`parent.child`).
    pub children: Vec<String>,
    /// Present once simulation was paused on a clock edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<ClockSnapshot>,
}
