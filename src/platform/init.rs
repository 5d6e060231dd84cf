//! One-time initialization gate
//!
//! Backends that need process-wide setup (opening the GPIO chip, for
//! instance) guard it with an [`InitGate`]. Concurrent first callers block
//! until the single initializer finishes; a failed initializer leaves the
//! gate closed so a later call can retry.

use once_cell::sync::OnceCell;

/// Lazily initialized, thread-safe value
#[derive(Debug)]
pub struct InitGate<T> {
    cell: OnceCell<T>,
}

impl<T> InitGate<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Return the value, running `init` if no caller has succeeded yet
    ///
    /// At most one `init` runs at a time; once one succeeds it never runs
    /// again.
    pub fn get_or_try_init<E, F>(&self, init: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.cell.get_or_try_init(init)
    }

    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T> Default for InitGate<T> {
    fn default() -> Self {
        Self::new()
    }
}
