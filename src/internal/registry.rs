//! Per-channel registry of pending selector wake signals.
//!
//! A channel keeps one registry per direction: signals waiting for a send
//! to become possible and signals waiting for a receive to become
//! possible. Entries are keyed by signal identity; the same signal may be
//! registered once per select arm, and deregistration removes a single
//! matching entry. The registry is owned by the channel state and only
//! mutated while the channel mutex is held.

use crate::internal::signal::WakeSignal;
use std::sync::Arc;

#[derive(Debug, Default)]
pub(crate) struct SelectorRegistry {
  handles: Vec<Arc<WakeSignal>>,
}

impl SelectorRegistry {
  pub(crate) fn new() -> Self {
    SelectorRegistry { handles: Vec::new() }
  }

  pub(crate) fn register(&mut self, handle: Arc<WakeSignal>) {
    self.handles.push(handle);
  }

  /// Removes one entry matching `handle` by identity.
  pub(crate) fn deregister(&mut self, handle: &Arc<WakeSignal>) {
    if let Some(pos) = self.handles.iter().position(|h| Arc::ptr_eq(h, handle)) {
      self.handles.swap_remove(pos);
    }
  }

  /// Wakes every registered selector.
  pub(crate) fn notify_all(&self) {
    for handle in &self.handles {
      handle.notify();
    }
  }

  pub(crate) fn is_empty(&self) -> bool {
    self.handles.is_empty()
  }

  pub(crate) fn count(&self) -> usize {
    self.handles.len()
  }
}
