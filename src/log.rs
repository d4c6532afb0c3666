use log::{LevelFilter, Log, Metadata, Record};
use once_cell::sync::Lazy;
use std::sync::{Once, RwLock};

/// Global logger that delegates to a logger which may be replaced at run time.
/// Used to forward logs to a control client once it is connected.
pub struct LoggerSwitcher {
    inner: RwLock<Option<Box<dyn Log>>>,
    install: Once,
}

pub static LOGGER_SWITCHER: Lazy<LoggerSwitcher> = Lazy::new(|| LoggerSwitcher {
    inner: RwLock::new(None),
    install: Once::new(),
});

impl LoggerSwitcher {
    /// Replace the active logger. Switcher registers itself as the global logger on the
    /// first call.
    pub fn switch(&'static self, logger: impl Log + 'static, filter: LevelFilter) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = Some(Box::new(logger));
        self.install.call_once(|| {
            // fails only if another logger is already installed, then switching is a no-op
            _ = log::set_logger(self);
        });
        log::set_max_level(filter);
    }
}

impl Log for LoggerSwitcher {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.inner
            .read()
            .map(|l| l.as_ref().is_some_and(|l| l.enabled(metadata)))
            .unwrap_or(false)
    }

    fn log(&self, record: &Record) {
        if let Ok(logger) = self.inner.read() {
            if let Some(logger) = logger.as_ref() {
                logger.log(record)
            }
        }
    }

    fn flush(&self) {
        if let Ok(logger) = self.inner.read() {
            if let Some(logger) = logger.as_ref() {
                logger.flush()
            }
        }
    }
}

/// Install `env_logger` configured from `RUST_LOG`.
pub fn init_default() {
    let logger = env_logger::Logger::from_default_env();
    let filter = logger.filter();
    LOGGER_SWITCHER.switch(logger, filter);
}
