// src/channel/core.rs

//! The shared channel core: one mutex guarding all mutable state, the
//! condition variables blocked operations wait on, and the buffered-mode
//! fast paths.
//!
//! ### Design principles
//!
//! 1. **One mutex per channel**: a single `parking_lot::Mutex` guards the
//!    closed flag, the buffer or rendezvous stage, and both selector
//!    registries. Every public operation takes it for its critical
//!    section; condvar waits release it atomically (monitor pattern).
//! 2. **Mode is a type, not a flag**: buffered and rendezvous channels
//!    share the state struct, but the `Mode` enum keeps the other mode's
//!    fields unrepresentable instead of leaving them dormant.
//! 3. **Selectors are notified on every enabling state change**: a
//!    successful buffered send or a rendezvous proposer arming notifies
//!    the complementary registry, so a pending `select` can never sleep
//!    through the state change that would satisfy it.

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::Arc;

use crate::error::{CloseError, RecvError, SendError, TryRecvError, TrySendError};
use crate::internal::buffer::Buffer;
use crate::internal::registry::SelectorRegistry;
use crate::internal::signal::WakeSignal;
use crate::telemetry;

use super::rendezvous::{self, Direction, Outcome, Rendezvous, Stage};

const LOC_CHANNEL: &str = "channel::core";
const EVT_CLOSE_BROADCAST: &str = "Channel:CloseBroadcast";
const CTR_BUFFERED_SENDS: &str = "BufferedSends";
const CTR_BUFFERED_RECVS: &str = "BufferedRecvs";
const CTR_HANDOFFS: &str = "RendezvousHandoffs";

/// Buffered and rendezvous channels never mix: a channel is constructed
/// in one mode and stays there.
#[derive(Debug)]
pub(crate) enum Mode<T> {
  Buffered(Buffer<T>),
  Rendezvous(Rendezvous<T>),
}

/// Mutable channel state. Every field is only ever touched with the
/// channel mutex held.
#[derive(Debug)]
pub(crate) struct ChanState<T> {
  /// Monotonic: set once by `close`, never reset.
  pub(crate) closed: bool,
  pub(crate) mode: Mode<T>,
  /// Selectors waiting for a send on this channel to become possible.
  pub(crate) send_selectors: SelectorRegistry,
  /// Selectors waiting for a receive on this channel to become possible.
  pub(crate) recv_selectors: SelectorRegistry,
}

impl<T> ChanState<T> {
  pub(crate) fn buffer_mut(&mut self) -> &mut Buffer<T> {
    match &mut self.mode {
      Mode::Buffered(buffer) => buffer,
      Mode::Rendezvous(_) => unreachable!("buffered op dispatched to a rendezvous channel"),
    }
  }

  pub(crate) fn rendezvous_mut(&mut self) -> &mut Rendezvous<T> {
    match &mut self.mode {
      Mode::Rendezvous(rendezvous) => rendezvous,
      Mode::Buffered(_) => unreachable!("rendezvous op dispatched to a buffered channel"),
    }
  }

  pub(crate) fn rendezvous_ref(&self) -> &Rendezvous<T> {
    match &self.mode {
      Mode::Rendezvous(rendezvous) => rendezvous,
      Mode::Buffered(_) => unreachable!("rendezvous op dispatched to a buffered channel"),
    }
  }
}

/// The shared owner of a channel's state, wrapped in an `Arc` by the
/// public handle.
#[derive(Debug)]
pub(crate) struct ChanShared<T> {
  pub(crate) capacity: usize,
  pub(crate) state: Mutex<ChanState<T>>,
  /// Buffered senders wait here for occupancy to drop.
  pub(crate) not_full: Condvar,
  /// Buffered receivers wait here for an item to arrive.
  pub(crate) not_empty: Condvar,
  /// The rendezvous proposer waits here for its pairing to complete.
  pub(crate) handoff_done: Condvar,
  /// Rendezvous arrivals that cannot join the current pairing wait here.
  pub(crate) retry: Condvar,
}

impl<T: Send> ChanShared<T> {
  pub(crate) fn new(capacity: usize) -> Self {
    let mode = if capacity == 0 {
      Mode::Rendezvous(Rendezvous::new())
    } else {
      Mode::Buffered(Buffer::new(capacity))
    };
    ChanShared {
      capacity,
      state: Mutex::new(ChanState {
        closed: false,
        mode,
        send_selectors: SelectorRegistry::new(),
        recv_selectors: SelectorRegistry::new(),
      }),
      not_full: Condvar::new(),
      not_empty: Condvar::new(),
      handoff_done: Condvar::new(),
      retry: Condvar::new(),
    }
  }

  // --- Buffered paths ---

  pub(crate) fn send_buffered(&self, mut payload: T) -> Result<(), SendError<T>> {
    let mut state = self.state.lock();
    loop {
      if state.closed {
        return Err(SendError::Closed(payload));
      }
      match state.buffer_mut().add(payload) {
        Ok(()) => {
          telemetry::increment_counter(LOC_CHANNEL, CTR_BUFFERED_SENDS);
          self.after_buffered_send(state);
          return Ok(());
        }
        Err(returned) => payload = returned,
      }
      self.not_full.wait(&mut state);
    }
  }

  pub(crate) fn recv_buffered(&self) -> Result<T, RecvError> {
    let mut state = self.state.lock();
    loop {
      // Drain rule: buffered items stay receivable after close.
      if let Some(item) = state.buffer_mut().remove() {
        telemetry::increment_counter(LOC_CHANNEL, CTR_BUFFERED_RECVS);
        self.after_buffered_recv(state);
        return Ok(item);
      }
      if state.closed {
        return Err(RecvError::Closed);
      }
      self.not_empty.wait(&mut state);
    }
  }

  pub(crate) fn try_send_buffered(&self, payload: T) -> Result<(), TrySendError<T>> {
    let mut state = self.state.lock();
    if state.closed {
      return Err(TrySendError::Closed(payload));
    }
    match state.buffer_mut().add(payload) {
      Ok(()) => {
        telemetry::increment_counter(LOC_CHANNEL, CTR_BUFFERED_SENDS);
        self.after_buffered_send(state);
        Ok(())
      }
      Err(returned) => Err(TrySendError::Full(returned)),
    }
  }

  pub(crate) fn try_recv_buffered(&self) -> Result<T, TryRecvError> {
    let mut state = self.state.lock();
    match state.buffer_mut().remove() {
      Some(item) => {
        telemetry::increment_counter(LOC_CHANNEL, CTR_BUFFERED_RECVS);
        self.after_buffered_recv(state);
        Ok(item)
      }
      None if state.closed => Err(TryRecvError::Closed),
      None => Err(TryRecvError::Empty),
    }
  }

  /// A receive became possible: notify selectors while the registry is
  /// still locked, then wake one blocked receiver.
  fn after_buffered_send(&self, state: MutexGuard<'_, ChanState<T>>) {
    state.recv_selectors.notify_all();
    drop(state);
    self.not_empty.notify_one();
  }

  /// A send became possible: the mirror image of `after_buffered_send`.
  fn after_buffered_recv(&self, state: MutexGuard<'_, ChanState<T>>) {
    state.send_selectors.notify_all();
    drop(state);
    self.not_full.notify_one();
  }

  // --- Rendezvous paths ---

  pub(crate) fn send_rendezvous(&self, payload: T) -> Result<(), SendError<T>> {
    let mut state = self.state.lock();
    match rendezvous::run(self, &mut state, Direction::Send, Some(payload)) {
      Outcome::Complete(_) => {
        telemetry::increment_counter(LOC_CHANNEL, CTR_HANDOFFS);
        Ok(())
      }
      Outcome::Closed(Some(payload)) => Err(SendError::Closed(payload)),
      Outcome::Closed(None) => unreachable!("a sending caller always recovers its payload"),
    }
  }

  pub(crate) fn recv_rendezvous(&self) -> Result<T, RecvError> {
    let mut state = self.state.lock();
    match rendezvous::run(self, &mut state, Direction::Receive, None) {
      Outcome::Complete(Some(item)) => {
        telemetry::increment_counter(LOC_CHANNEL, CTR_HANDOFFS);
        Ok(item)
      }
      Outcome::Complete(None) => unreachable!("a completed receive always carries a payload"),
      Outcome::Closed(_) => Err(RecvError::Closed),
    }
  }

  /// Non-blocking rendezvous send: one check-and-act under the mutex.
  ///
  /// Proceeds only when the complementary party is already committed: a
  /// receiving proposer is armed (consumed on the spot, no blocking), or
  /// a receive-selector is registered while the protocol is idle (this
  /// caller proposes and the pending select completes the pairing). In
  /// every other state it reports `Full` without arming, so a
  /// non-blocking caller never becomes the party an arbitrary later
  /// thread blocks waiting for.
  pub(crate) fn try_send_rendezvous(&self, payload: T) -> Result<(), TrySendError<T>> {
    let mut state = self.state.lock();
    if state.closed {
      return Err(TrySendError::Closed(payload));
    }
    let ready = match &state.rendezvous_ref().stage {
      Stage::Armed {
        direction: Direction::Receive,
        ..
      } => true,
      Stage::Idle => !state.recv_selectors.is_empty(),
      _ => false,
    };
    if !ready {
      return Err(TrySendError::Full(payload));
    }
    match rendezvous::run(self, &mut state, Direction::Send, Some(payload)) {
      Outcome::Complete(_) => {
        telemetry::increment_counter(LOC_CHANNEL, CTR_HANDOFFS);
        Ok(())
      }
      Outcome::Closed(Some(payload)) => Err(TrySendError::Closed(payload)),
      Outcome::Closed(None) => unreachable!("a sending caller always recovers its payload"),
    }
  }

  /// Non-blocking rendezvous receive; see `try_send_rendezvous`.
  pub(crate) fn try_recv_rendezvous(&self) -> Result<T, TryRecvError> {
    let mut state = self.state.lock();
    if state.closed {
      return Err(TryRecvError::Closed);
    }
    let ready = match &state.rendezvous_ref().stage {
      Stage::Armed {
        direction: Direction::Send,
        ..
      } => true,
      Stage::Idle => !state.send_selectors.is_empty(),
      _ => false,
    };
    if !ready {
      return Err(TryRecvError::Empty);
    }
    match rendezvous::run(self, &mut state, Direction::Receive, None) {
      Outcome::Complete(Some(item)) => {
        telemetry::increment_counter(LOC_CHANNEL, CTR_HANDOFFS);
        Ok(item)
      }
      Outcome::Complete(None) => unreachable!("a completed receive always carries a payload"),
      Outcome::Closed(_) => Err(TryRecvError::Closed),
    }
  }

  // --- Close ---

  /// Sets the closed flag and wakes every blocked party: selectors
  /// re-scan, buffered waiters and the rendezvous machine re-check the
  /// flag on wake. Never blocks.
  pub(crate) fn close(&self) -> Result<(), CloseError> {
    let mut state = self.state.lock();
    if state.closed {
      return Err(CloseError);
    }
    state.closed = true;
    telemetry::log_event(None, LOC_CHANNEL, EVT_CLOSE_BROADCAST, None);
    state.send_selectors.notify_all();
    state.recv_selectors.notify_all();
    drop(state);
    self.not_full.notify_all();
    self.not_empty.notify_all();
    self.handoff_done.notify_all();
    self.retry.notify_all();
    Ok(())
  }

  // --- Accessors ---

  pub(crate) fn is_closed(&self) -> bool {
    self.state.lock().closed
  }

  pub(crate) fn len(&self) -> usize {
    match &self.state.lock().mode {
      Mode::Buffered(buffer) => buffer.len(),
      Mode::Rendezvous(_) => 0,
    }
  }

  pub(crate) fn is_empty(&self) -> bool {
    match &self.state.lock().mode {
      Mode::Buffered(buffer) => buffer.is_empty(),
      Mode::Rendezvous(_) => true,
    }
  }

  pub(crate) fn is_full(&self) -> bool {
    match &self.state.lock().mode {
      Mode::Buffered(buffer) => buffer.is_full(),
      // A rendezvous channel never has room to store anything.
      Mode::Rendezvous(_) => true,
    }
  }

  // --- Selector registration (used by `select`) ---

  pub(crate) fn register_selector(&self, direction: Direction, handle: Arc<WakeSignal>) {
    let mut state = self.state.lock();
    match direction {
      Direction::Send => state.send_selectors.register(handle),
      Direction::Receive => state.recv_selectors.register(handle),
    }
  }

  pub(crate) fn deregister_selector(&self, direction: Direction, handle: &Arc<WakeSignal>) {
    let mut state = self.state.lock();
    match direction {
      Direction::Send => state.send_selectors.deregister(handle),
      Direction::Receive => state.recv_selectors.deregister(handle),
    }
  }
}
