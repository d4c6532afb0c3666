use crate::debugger::expression::Predicate;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct Registry {
    armed: HashSet<u32>,
    predicates: HashMap<u32, Arc<Predicate>>,
}

/// Set of armed breakpoint ids with their conditions.
///
/// Arming and attaching a predicate are independent: a predicate may be attached to
/// a breakpoint that is not armed yet, and a failed attach never disarms a breakpoint.
#[derive(Default)]
pub struct BreakpointRegistry {
    inner: Mutex<Registry>,
}

/// What the registry knows about a traced breakpoint.
pub enum Hit {
    /// Breakpoint isn't armed.
    Miss,
    /// Armed breakpoint without condition.
    Unconditional,
    /// Armed breakpoint with condition, the condition must be evaluated by the caller.
    Conditional(Arc<Predicate>),
}

impl BreakpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Arm a breakpoint. Return false if breakpoint already armed.
    pub fn arm(&self, id: u32) -> bool {
        self.lock().armed.insert(id)
    }

    /// Disarm a breakpoint and drop its predicate. Return false if breakpoint wasn't armed.
    pub fn disarm(&self, id: u32) -> bool {
        let mut registry = self.lock();
        registry.predicates.remove(&id);
        registry.armed.remove(&id)
    }

    pub fn is_armed(&self, id: u32) -> bool {
        self.lock().armed.contains(&id)
    }

    /// All armed breakpoint ids in ascending order.
    pub fn armed(&self) -> Vec<u32> {
        let mut ids: Vec<_> = self.lock().armed.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Attach a predicate, the previous one (if any) is replaced.
    pub fn set_predicate(&self, id: u32, predicate: Predicate) {
        self.lock().predicates.insert(id, Arc::new(predicate));
    }

    /// Remove a predicate. Return false if there was no predicate.
    pub fn remove_predicate(&self, id: u32) -> bool {
        self.lock().predicates.remove(&id).is_some()
    }

    pub fn predicate(&self, id: u32) -> Option<Arc<Predicate>> {
        self.lock().predicates.get(&id).cloned()
    }

    /// Classify a trace of breakpoint `id`. With `forced` set, an unarmed breakpoint
    /// is treated as armed. An attached condition is reported in both cases.
    pub fn hit(&self, id: u32, forced: bool) -> Hit {
        let registry = self.lock();
        if !forced && !registry.armed.contains(&id) {
            return Hit::Miss;
        }
        match registry.predicates.get(&id) {
            Some(predicate) => Hit::Conditional(predicate.clone()),
            None => Hit::Unconditional,
        }
    }
}
