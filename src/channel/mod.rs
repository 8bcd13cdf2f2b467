// src/channel/mod.rs

//! A blocking channel with two modes picked at construction time.
//!
//! A capacity above `0` creates a **buffered** channel: a fixed-capacity
//! FIFO decouples senders from receivers, `send` blocks while the buffer
//! is full and `recv` blocks while it is empty.
//!
//! A capacity of `0` creates a **rendezvous** channel: there is no
//! storage at all, and a `send` completes only by handing its payload
//! directly to a `recv` that is present at the same time.
//!
//! Channels are closed explicitly with [`Channel::close`]; dropping
//! handles never closes one. Close is one-shot and race-free with
//! concurrent blocked operations: every waiter re-checks the flag when
//! woken, so nothing blocks past a close. A closed buffered channel still
//! hands out its remaining buffered payloads before receives start
//! failing; a closed rendezvous channel fails receives immediately.
//!
//! ### Fairness
//!
//! The order in which blocked senders or receivers are woken is not
//! FIFO-fair. Wakeups are broadcast where several parties may be eligible
//! and an arbitrary blocked thread wins the retry race.

mod core;
mod rendezvous;

pub(crate) use self::core::{ChanShared, Mode};
pub(crate) use self::rendezvous::Direction;

use crate::error::{CloseError, DestroyError, RecvError, SendError, TryRecvError, TrySendError};
use std::fmt;
use std::sync::Arc;

/// A cloneable handle to one channel.
///
/// All clones refer to the same channel; payload ownership transfers from
/// the sender to the receiver. Handles are `Send` and `Sync` for any
/// `T: Send`.
pub struct Channel<T: Send> {
  pub(crate) shared: Arc<ChanShared<T>>,
}

impl<T: Send> Channel<T> {
  /// Creates a new channel. Capacity `0` selects rendezvous mode.
  pub fn new(capacity: usize) -> Self {
    Channel {
      shared: Arc::new(ChanShared::new(capacity)),
    }
  }

  /// `true` if this channel performs synchronous hand-offs (capacity 0).
  pub fn is_rendezvous(&self) -> bool {
    self.shared.capacity == 0
  }

  /// Sends a payload, blocking while the channel is full (buffered) or
  /// until a receiver takes the payload (rendezvous).
  ///
  /// Fails only when the channel is or becomes closed; the payload is
  /// handed back inside the error.
  pub fn send(&self, payload: T) -> Result<(), SendError<T>> {
    if self.is_rendezvous() {
      self.shared.send_rendezvous(payload)
    } else {
      self.shared.send_buffered(payload)
    }
  }

  /// Receives a payload, blocking while none is available.
  ///
  /// A closed buffered channel keeps yielding payloads until the buffer
  /// is drained, then fails. A closed rendezvous channel fails
  /// immediately.
  pub fn recv(&self) -> Result<T, RecvError> {
    if self.is_rendezvous() {
      self.shared.recv_rendezvous()
    } else {
      self.shared.recv_buffered()
    }
  }

  /// Sends without blocking on availability.
  ///
  /// A buffered channel reports [`TrySendError::Full`] instead of waiting
  /// for space. A rendezvous channel only proceeds when a receiver is
  /// already committed (an armed receiving proposer, or a registered
  /// receive-selector that will complete the pairing) and otherwise
  /// reports `Full` without arming itself.
  pub fn try_send(&self, payload: T) -> Result<(), TrySendError<T>> {
    if self.is_rendezvous() {
      self.shared.try_send_rendezvous(payload)
    } else {
      self.shared.try_send_buffered(payload)
    }
  }

  /// Receives without blocking on availability; mirror of
  /// [`Channel::try_send`]. Observes the same drain rule as
  /// [`Channel::recv`].
  pub fn try_recv(&self) -> Result<T, TryRecvError> {
    if self.is_rendezvous() {
      self.shared.try_recv_rendezvous()
    } else {
      self.shared.try_recv_buffered()
    }
  }

  /// Closes the channel, waking every blocked send, receive, and select
  /// so they observe the closed state. One-shot: closing an already
  /// closed channel fails. Never blocks.
  pub fn close(&self) -> Result<(), CloseError> {
    self.shared.close()
  }

  /// Consumes this handle after verifying the channel was closed.
  ///
  /// Destroying an open channel is refused and the intact handle is
  /// handed back inside the error. The backing storage is released once
  /// the last clone of the handle is gone, so in-flight operations on
  /// other clones stay safe regardless.
  pub fn destroy(self) -> Result<(), DestroyError<T>> {
    if !self.shared.is_closed() {
      return Err(DestroyError(self));
    }
    Ok(())
  }

  /// `true` once [`Channel::close`] has succeeded.
  pub fn is_closed(&self) -> bool {
    self.shared.is_closed()
  }

  /// The fixed capacity this channel was created with.
  pub fn capacity(&self) -> usize {
    self.shared.capacity
  }

  /// Number of buffered payloads. Always `0` for rendezvous channels:
  /// nothing is ever stored in one.
  pub fn len(&self) -> usize {
    self.shared.len()
  }

  /// `true` when no payload is buffered.
  pub fn is_empty(&self) -> bool {
    self.shared.is_empty()
  }

  /// `true` when a `try_send` would not find buffer space. Always `true`
  /// for rendezvous channels.
  pub fn is_full(&self) -> bool {
    self.shared.is_full()
  }
}

impl<T: Send> Clone for Channel<T> {
  fn clone(&self) -> Self {
    Channel {
      shared: Arc::clone(&self.shared),
    }
  }
}

impl<T: Send> fmt::Debug for Channel<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = self.shared.state.lock();
    let len = match &state.mode {
      Mode::Buffered(buffer) => buffer.len(),
      Mode::Rendezvous(_) => 0,
    };
    f.debug_struct("Channel")
      .field("capacity", &self.shared.capacity)
      .field("closed", &state.closed)
      .field("len", &len)
      .field("send_selectors", &state.send_selectors.count())
      .field("recv_selectors", &state.recv_selectors.count())
      .finish()
  }
}
