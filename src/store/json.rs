use crate::store::{
    BreakpointLocation, Connection, DebugInfoStore, Hierarchy, SourceLocation, Variable,
};
use anyhow::Context;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InstanceEntry {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BreakpointEntry {
    pub id: u32,
    pub filename: String,
    pub line: u32,
    /// Zero means "no column information".
    #[serde(default)]
    pub column: u32,
    /// Instances that execute this statement.
    pub instances: Vec<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneratorVariableEntry {
    pub instance_id: u32,
    #[serde(default)]
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub is_var: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContextVariableEntry {
    pub breakpoint_id: u32,
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub is_var: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HierarchyEntry {
    pub parent: String,
    pub child: String,
}

/// Serialized form of debug information, written by the instrumenting compiler.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SymbolTable {
    /// Name of the design top instance.
    pub top_name: String,
    pub instances: Vec<InstanceEntry>,
    pub breakpoints: Vec<BreakpointEntry>,
    pub generator_variables: Vec<GeneratorVariableEntry>,
    pub context_variables: Vec<ContextVariableEntry>,
    pub hierarchy: Vec<HierarchyEntry>,
    pub connections: Vec<Connection>,
}

/// [`DebugInfoStore`] over an in-memory [`SymbolTable`].
pub struct SymbolTableStore {
    table: SymbolTable,
    instance_names: HashMap<u32, String>,
    breakpoint_idx: HashMap<u32, usize>,
}

impl SymbolTableStore {
    pub fn new(table: SymbolTable) -> Self {
        let instance_names = table
            .instances
            .iter()
            .map(|i| (i.id, i.name.clone()))
            .collect();
        let breakpoint_idx = table
            .breakpoints
            .iter()
            .enumerate()
            .map(|(idx, bp)| (bp.id, idx))
            .collect();
        Self {
            table,
            instance_names,
            breakpoint_idx,
        }
    }

    /// Load a symbol table from JSON file.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data =
            fs::read(path).with_context(|| format!("read symbol table {}", path.display()))?;
        let table: SymbolTable = serde_json::from_slice(&data)
            .with_context(|| format!("parse symbol table {}", path.display()))?;
        log::info!(
            target: "store",
            "symbol table loaded from {}: {} breakpoints, {} instances",
            path.display(),
            table.breakpoints.len(),
            table.instances.len()
        );
        Ok(Self::new(table))
    }

    fn breakpoint(&self, id: u32) -> Option<&BreakpointEntry> {
        self.breakpoint_idx
            .get(&id)
            .map(|&idx| &self.table.breakpoints[idx])
    }
}

impl DebugInfoStore for SymbolTableStore {
    fn breakpoints_at(
        &self,
        file: &str,
        line: u32,
        column: Option<u32>,
    ) -> Vec<BreakpointLocation> {
        self.table
            .breakpoints
            .iter()
            .filter(|bp| bp.filename == file && bp.line == line)
            .filter(|bp| match column {
                Some(col) if col > 0 => bp.column == col,
                _ => true,
            })
            .flat_map(|bp| {
                bp.instances.iter().map(|&instance_id| BreakpointLocation {
                    instance_id,
                    breakpoint_id: bp.id,
                    column: bp.column,
                })
            })
            .collect()
    }

    fn breakpoints_in_file(&self, file: &str) -> Vec<u32> {
        self.table
            .breakpoints
            .iter()
            .filter(|bp| bp.filename == file)
            .map(|bp| bp.id)
            .collect()
    }

    fn breakpoint_location(&self, id: u32) -> Option<SourceLocation> {
        self.breakpoint(id).map(|bp| SourceLocation {
            file: bp.filename.clone(),
            line: bp.line,
        })
    }

    fn instance_of(&self, breakpoint_id: u32) -> Option<u32> {
        self.breakpoint(breakpoint_id)?.instances.first().copied()
    }

    fn instance_name(&self, instance_id: u32) -> Option<String> {
        self.instance_names.get(&instance_id).cloned()
    }

    fn self_variables(&self, instance_id: u32, breakpoint_id: u32) -> Vec<Variable> {
        if self.breakpoint(breakpoint_id).is_none() {
            return vec![];
        }
        let handle = self.instance_name(instance_id).unwrap_or_default();
        self.table
            .generator_variables
            .iter()
            .filter(|v| v.instance_id == instance_id)
            .map(|v| Variable {
                name: v.name.clone(),
                value: v.value.clone(),
                handle: handle.clone(),
                is_live: v.is_var,
            })
            .collect()
    }

    fn context_variables(&self, instance_id: u32, breakpoint_id: u32) -> Vec<Variable> {
        let handle = self.instance_name(instance_id).unwrap_or_default();
        self.table
            .context_variables
            .iter()
            .filter(|v| v.breakpoint_id == breakpoint_id)
            .map(|v| Variable {
                name: v.name.clone(),
                value: v.value.clone(),
                handle: handle.clone(),
                is_live: v.is_var,
            })
            .collect()
    }

    fn hierarchy(&self, scope: &str) -> Vec<Hierarchy> {
        let scope = if scope.is_empty() {
            self.table.top_name.as_str()
        } else {
            scope
        };
        self.table
            .hierarchy
            .iter()
            .filter(|h| h.parent == scope)
            .map(|h| Hierarchy {
                parent_handle: h.parent.clone(),
                child: h.child.clone(),
            })
            .collect()
    }

    fn connections_from(&self, handle: &str) -> Vec<Connection> {
        self.table
            .connections
            .iter()
            .filter(|c| c.handle_from == handle)
            .cloned()
            .collect()
    }

    fn connections_to(&self, handle: &str) -> Vec<Connection> {
        self.table
            .connections
            .iter()
            .filter(|c| c.handle_to == handle)
            .cloned()
            .collect()
    }

    fn files(&self) -> Vec<String> {
        self.table
            .breakpoints
            .iter()
            .map(|bp| bp.filename.clone())
            .unique()
            .sorted()
            .collect()
    }
}
