//! A small counting wake signal owned by a pending `select` call.
//!
//! Each `select` invocation allocates exactly one `WakeSignal`. Channels
//! the call is registered with increment it whenever a send or receive may
//! have become possible; the selecting thread consumes one permit between
//! polling rounds. Permits accumulate, so a notification that arrives
//! while the selector is mid-scan is never lost.
//!
//! The signal's own mutex is a leaf in the lock order: it is taken either
//! with no channel mutex held (the wait path) or innermost while one
//! channel mutex is held (the notify path), never the other way around.

use parking_lot::{Condvar, Mutex};

#[derive(Debug)]
pub(crate) struct WakeSignal {
  permits: Mutex<usize>,
  available: Condvar,
}

impl WakeSignal {
  pub(crate) fn new() -> Self {
    WakeSignal {
      permits: Mutex::new(0),
      available: Condvar::new(),
    }
  }

  /// Adds one permit and wakes the waiting selector, if any.
  pub(crate) fn notify(&self) {
    let mut permits = self.permits.lock();
    *permits += 1;
    self.available.notify_one();
  }

  /// Blocks until a permit is available, then consumes it.
  pub(crate) fn wait(&self) {
    let mut permits = self.permits.lock();
    while *permits == 0 {
      self.available.wait(&mut permits);
    }
    *permits -= 1;
  }
}
