pub mod app;
pub mod calc_client;
pub mod config;
pub mod config_editor;
pub mod debounce;
pub mod export;
pub mod history;
pub mod logging;
pub mod messages;
pub mod pdf;
pub mod session;
pub mod state;
pub mod surface;

pub use app::Simulator;
pub use config::{ClientConfig, ConfigError};
pub use surface::Surface;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks `mutex`, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
