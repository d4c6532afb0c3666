//! Debug information store: source locations, variables and design hierarchy produced by the
//! compiler that instrumented the simulation.

pub mod json;

pub use json::{SymbolTable, SymbolTableStore};

use serde::{Deserialize, Serialize};

/// An (instance, breakpoint) pair found at a source location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreakpointLocation {
    pub instance_id: u32,
    pub breakpoint_id: u32,
    pub column: u32,
}

/// Source place of a breakpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

/// Variable visible at a breakpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Variable {
    /// Name under which a variable is visible in source code. May be empty for generator
    /// variables that have no front-end name.
    pub name: String,
    /// Signal path relative to `handle` for live variables, literal value otherwise.
    pub value: String,
    /// Hierarchical name of the owning instance.
    pub handle: String,
    /// True if variable is backed by a simulator signal.
    pub is_live: bool,
}

impl Variable {
    /// Fully qualified (but not yet root prefixed) signal name of a live variable.
    pub fn full_handle(&self) -> String {
        if self.handle.is_empty() {
            self.value.clone()
        } else {
            format!("{}.{}", self.handle, self.value)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hierarchy {
    pub parent_handle: String,
    pub child: String,
}

impl Hierarchy {
    pub fn handle_name(&self) -> String {
        format!("{}.{}", self.parent_handle, self.child)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Connection {
    pub handle_from: String,
    pub var_from: String,
    pub handle_to: String,
    pub var_to: String,
}

impl Connection {
    pub fn from_signal(&self) -> String {
        format!("{}.{}", self.handle_from, self.var_from)
    }

    pub fn to_signal(&self) -> String {
        format!("{}.{}", self.handle_to, self.var_to)
    }
}

/// Queryable debug information.
///
/// All file names are in the build tree (the tree the simulation was compiled in).
pub trait DebugInfoStore: Send + Sync {
    /// Breakpoints at a source line, optionally restricted to a column.
    fn breakpoints_at(&self, file: &str, line: u32, column: Option<u32>)
        -> Vec<BreakpointLocation>;

    /// All breakpoint ids in a file.
    fn breakpoints_in_file(&self, file: &str) -> Vec<u32>;

    fn breakpoint_location(&self, id: u32) -> Option<SourceLocation>;

    /// First instance that owns a breakpoint.
    fn instance_of(&self, breakpoint_id: u32) -> Option<u32>;

    fn instance_name(&self, instance_id: u32) -> Option<String>;

    /// Generator (self) variables of an instance visible at a breakpoint.
    fn self_variables(&self, instance_id: u32, breakpoint_id: u32) -> Vec<Variable>;

    /// Context (local) variables visible at a breakpoint.
    fn context_variables(&self, instance_id: u32, breakpoint_id: u32) -> Vec<Variable>;

    /// Children of a scope. Empty scope means design top.
    fn hierarchy(&self, scope: &str) -> Vec<Hierarchy>;

    fn connections_from(&self, handle: &str) -> Vec<Connection>;

    fn connections_to(&self, handle: &str) -> Vec<Connection>;

    /// Every instrumented source file.
    fn files(&self) -> Vec<String>;
}
