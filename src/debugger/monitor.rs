use crate::provider::WatchToken;
use std::collections::HashMap;

/// Signals with a live value change watch, keyed by canonical name.
#[derive(Debug, Default)]
pub struct MonitorRegistry {
    monitors: HashMap<String, WatchToken>,
}

impl MonitorRegistry {
    pub fn is_monitored(&self, name: &str) -> bool {
        self.monitors.contains_key(name)
    }

    pub fn insert(&mut self, name: String, token: WatchToken) {
        self.monitors.insert(name, token);
    }

    pub fn remove(&mut self, name: &str) -> Option<WatchToken> {
        self.monitors.remove(name)
    }

    pub fn drain(&mut self) -> Vec<(String, WatchToken)> {
        self.monitors.drain().collect()
    }

    /// Monitored signal names in ascending order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.monitors.keys().cloned().collect();
        names.sort();
        names
    }
}
