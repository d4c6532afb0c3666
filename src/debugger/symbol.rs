//! Symbol resolution: debug names to simulator handles.

use crate::debugger::error::Error;
use crate::debugger::monitor::MonitorRegistry;
use crate::provider::{Handle, SignalProvider, ValueChangeCallback};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

pub const DEFAULT_ROOT_PREFIX: &str = "TOP.";

/// Names that always mean current simulation time.
pub const TIME_SYMBOLS: [&str; 2] = ["time", "$time"];

pub fn is_time_symbol(name: &str) -> bool {
    TIME_SYMBOLS.contains(&name)
}

/// Name for reporting: `a[3]` shown as `a.3`.
pub fn display_name(name: &str) -> String {
    name.chars()
        .filter(|&c| c != ']')
        .map(|c| if c == '[' { '.' } else { c })
        .collect()
}

fn normalize_prefix(prefix: &str) -> String {
    if prefix.is_empty() || prefix.ends_with('.') {
        prefix.to_string()
    } else {
        format!("{prefix}.")
    }
}

/// Handle cache and monitors, guarded by a single lock.
#[derive(Default)]
struct SignalTable {
    cache: HashMap<String, Handle>,
    monitors: MonitorRegistry,
}

/// Resolve and read simulator signals by name.
///
/// Every name is canonicalized with the root prefix before lookup. Successful resolutions
/// are cached for the resolver lifetime, misses are retried on every lookup.
pub struct SymbolResolver {
    provider: Arc<dyn SignalProvider>,
    root_prefix: RwLock<String>,
    table: Mutex<SignalTable>,
}

impl SymbolResolver {
    pub fn new(provider: Arc<dyn SignalProvider>, root_prefix: &str) -> Self {
        Self {
            provider,
            root_prefix: RwLock::new(normalize_prefix(root_prefix)),
            table: Mutex::default(),
        }
    }

    fn table(&self) -> MutexGuard<'_, SignalTable> {
        self.table.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn provider(&self) -> &Arc<dyn SignalProvider> {
        &self.provider
    }

    pub fn root_prefix(&self) -> String {
        self.root_prefix
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Set a new root prefix, a trailing dot is appended if missing.
    /// Already cached resolutions are kept.
    pub fn set_root_prefix(&self, prefix: &str) {
        let prefix = normalize_prefix(prefix);
        log::debug!(target: "session", "root prefix set to `{prefix}`");
        *self.root_prefix.write().unwrap_or_else(|e| e.into_inner()) = prefix;
    }

    /// Prepend the root prefix to a name not rooted by it.
    pub fn canonicalize(&self, name: &str) -> String {
        let prefix = self.root_prefix.read().unwrap_or_else(|e| e.into_inner());
        if name.starts_with(prefix.as_str()) {
            name.to_string()
        } else {
            format!("{prefix}{name}")
        }
    }

    /// Resolve a handle by name.
    pub fn resolve(&self, name: &str) -> Result<Handle, Error> {
        let canonical = self.canonicalize(name);
        self.resolve_canonical(&canonical)
    }

    fn resolve_canonical(&self, canonical: &str) -> Result<Handle, Error> {
        if let Some(handle) = self.table().cache.get(canonical) {
            return Ok(*handle);
        }

        let handle = self
            .provider
            .resolve_handle(canonical)
            .ok_or_else(|| Error::HandleNotFound(canonical.to_string()))?;
        self.table().cache.insert(canonical.to_string(), handle);
        Ok(handle)
    }

    pub fn read(&self, handle: Handle) -> i64 {
        self.provider.read_value(handle)
    }

    pub fn read_time(&self) -> u64 {
        self.provider.read_time()
    }

    /// Read current value of a signal. Time symbols read simulation time.
    pub fn value(&self, name: &str) -> Result<i64, Error> {
        if is_time_symbol(name) {
            return Ok(self.read_time() as i64);
        }
        let handle = self.resolve(name)?;
        Ok(self.read(handle))
    }

    /// Read a value by an already canonical name.
    pub fn canonical_value(&self, canonical: &str) -> Result<i64, Error> {
        let handle = self.resolve_canonical(canonical)?;
        Ok(self.read(handle))
    }

    /// Watch value changes of a signal. `callback` is built with the canonical
    /// signal name. Watching an already monitored signal is a no-op.
    pub fn watch(
        &self,
        name: &str,
        callback: impl FnOnce(String) -> ValueChangeCallback,
    ) -> Result<(), Error> {
        let canonical = self.canonicalize(name);
        let handle = self.resolve_canonical(&canonical)?;

        let mut table = self.table();
        if table.monitors.is_monitored(&canonical) {
            return Ok(());
        }
        let token = self
            .provider
            .register_value_change(handle, callback(canonical.clone()))
            .ok_or_else(|| Error::WatchRejected(canonical.clone()))?;
        log::debug!(target: "session", "monitor `{canonical}` added");
        table.monitors.insert(canonical, token);
        Ok(())
    }

    /// Remove a value change watch.
    pub fn unwatch(&self, name: &str) -> Result<(), Error> {
        let canonical = self.canonicalize(name);
        let token = self
            .table()
            .monitors
            .remove(&canonical)
            .ok_or_else(|| Error::NotMonitored(canonical.clone()))?;
        self.provider.unregister(token);
        log::debug!(target: "session", "monitor `{canonical}` removed");
        Ok(())
    }

    /// Remove all value change watches, return removed count.
    pub fn unwatch_all(&self) -> usize {
        let monitors = self.table().monitors.drain();
        for (_, token) in &monitors {
            self.provider.unregister(*token);
        }
        monitors.len()
    }

    pub fn monitored(&self) -> Vec<String> {
        self.table().monitors.names()
    }
}
