use crate::provider::{
    Handle, SignalProvider, SynchCallback, ValueChangeCallback, WatchToken,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

type SharedCallback = Arc<dyn Fn(i64) + Send + Sync>;

#[derive(Default)]
struct Signals {
    by_name: HashMap<String, Handle>,
    values: HashMap<Handle, i64>,
    next_handle: u64,
}

#[derive(Default)]
struct Watches {
    callbacks: HashMap<WatchToken, (Handle, SharedCallback)>,
    next_token: u64,
}

/// In-memory simulator.
///
/// Signals are plain named integers. Value change callbacks fire synchronously on the thread
/// that calls [`MemorySimulator::set_value`], synch callbacks fire on the thread that calls
/// [`MemorySimulator::quiesce`]. Callbacks are never invoked while internal locks are held.
#[derive(Default)]
pub struct MemorySimulator {
    signals: Mutex<Signals>,
    watches: Mutex<Watches>,
    synch: Mutex<Vec<SynchCallback>>,
    time: AtomicU64,
    finished: AtomicBool,
}

impl MemorySimulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new signal (or reset value of an existing one) without firing callbacks.
    pub fn add_signal(&self, name: impl Into<String>, value: i64) -> Handle {
        let mut signals = self.signals.lock().unwrap();
        let name = name.into();
        let handle = match signals.by_name.get(&name) {
            Some(handle) => *handle,
            None => {
                signals.next_handle += 1;
                let handle = Handle::new(signals.next_handle);
                signals.by_name.insert(name, handle);
                handle
            }
        };
        signals.values.insert(handle, value);
        handle
    }

    /// Set signal value and fire value change callbacks if the value changed.
    /// Return false if signal not exists.
    pub fn set_value(&self, name: &str, value: i64) -> bool {
        let handle = {
            let mut signals = self.signals.lock().unwrap();
            let Some(handle) = signals.by_name.get(name).copied() else {
                return false;
            };
            let old = signals.values.insert(handle, value);
            if old == Some(value) {
                return true;
            }
            handle
        };

        let callbacks: Vec<SharedCallback> = self
            .watches
            .lock()
            .unwrap()
            .callbacks
            .values()
            .filter(|(h, _)| *h == handle)
            .map(|(_, cb)| cb.clone())
            .collect();
        callbacks.iter().for_each(|cb| cb(value));
        true
    }

    pub fn value(&self, name: &str) -> Option<i64> {
        let signals = self.signals.lock().unwrap();
        let handle = signals.by_name.get(name)?;
        signals.values.get(handle).copied()
    }

    pub fn advance_time(&self, delta: u64) -> u64 {
        self.time.fetch_add(delta, Ordering::SeqCst) + delta
    }

    /// Reach a quiescent point: run all pending synch callbacks.
    pub fn quiesce(&self) {
        let pending = std::mem::take(&mut *self.synch.lock().unwrap());
        pending.into_iter().for_each(|cb| cb());
    }

    pub fn watch_count(&self) -> usize {
        self.watches.lock().unwrap().callbacks.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }
}

impl SignalProvider for MemorySimulator {
    fn resolve_handle(&self, name: &str) -> Option<Handle> {
        self.signals.lock().unwrap().by_name.get(name).copied()
    }

    fn read_value(&self, handle: Handle) -> i64 {
        self.signals
            .lock()
            .unwrap()
            .values
            .get(&handle)
            .copied()
            .unwrap_or_default()
    }

    fn read_time(&self) -> u64 {
        self.time.load(Ordering::SeqCst)
    }

    fn register_value_change(
        &self,
        handle: Handle,
        callback: ValueChangeCallback,
    ) -> Option<WatchToken> {
        if !self.signals.lock().unwrap().values.contains_key(&handle) {
            return None;
        }
        let mut watches = self.watches.lock().unwrap();
        watches.next_token += 1;
        let token = WatchToken::new(watches.next_token);
        watches
            .callbacks
            .insert(token, (handle, Arc::from(callback)));
        Some(token)
    }

    fn unregister(&self, token: WatchToken) -> bool {
        self.watches
            .lock()
            .unwrap()
            .callbacks
            .remove(&token)
            .is_some()
    }

    fn register_synch(&self, callback: SynchCallback) -> bool {
        self.synch.lock().unwrap().push(callback);
        true
    }

    fn terminate_simulation(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }
}
