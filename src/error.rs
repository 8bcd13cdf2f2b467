// src/error.rs

use crate::channel::Channel;
use std::fmt;

/// Error returned by a blocking `send` on a closed channel. The payload
/// that could not be delivered is handed back to the caller.
#[derive(PartialEq, Eq, Clone)]
pub enum SendError<T> {
  /// The channel was closed before the payload could be transferred.
  Closed(T),
}

impl<T> SendError<T> {
  /// Consumes the error, returning the undelivered payload.
  #[inline]
  pub fn into_inner(self) -> T {
    match self {
      SendError::Closed(v) => v,
    }
  }
}

impl<T> fmt::Debug for SendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SendError::Closed(_) => write!(f, "SendError::Closed(..)"),
    }
  }
}

impl<T> fmt::Display for SendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SendError::Closed(_) => f.write_str("channel closed"),
    }
  }
}

impl<T> std::error::Error for SendError<T> {}

/// Error returned by `try_send` when the operation could not be completed
/// immediately. The payload being sent is returned in every variant.
#[derive(PartialEq, Eq, Clone)]
pub enum TrySendError<T> {
  /// The channel cannot accept the payload right now. For a buffered
  /// channel the buffer is at capacity; for a rendezvous channel no
  /// receiver is committed to take the payload.
  Full(T),
  /// The channel is closed.
  Closed(T),
}

impl<T> TrySendError<T> {
  /// Consumes the error, returning the payload that was not sent.
  #[inline]
  pub fn into_inner(self) -> T {
    match self {
      TrySendError::Full(v) => v,
      TrySendError::Closed(v) => v,
    }
  }
}

impl<T> fmt::Debug for TrySendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TrySendError::Full(_) => write!(f, "TrySendError::Full(..)"),
      TrySendError::Closed(_) => write!(f, "TrySendError::Closed(..)"),
    }
  }
}

impl<T> fmt::Display for TrySendError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TrySendError::Full(_) => f.write_str("channel full"),
      TrySendError::Closed(_) => f.write_str("channel closed"),
    }
  }
}

impl<T> std::error::Error for TrySendError<T> {}

/// Error returned by a blocking `recv`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum RecvError {
  /// The channel is closed and holds nothing left to receive.
  Closed,
}

impl std::error::Error for RecvError {}
impl fmt::Display for RecvError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RecvError::Closed => write!(f, "channel closed"),
    }
  }
}

/// Error returned by `try_recv` when a payload could not be received
/// immediately.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TryRecvError {
  /// No payload is available right now.
  Empty,
  /// The channel is closed and holds nothing left to receive.
  Closed,
}

impl std::error::Error for TryRecvError {}
impl fmt::Display for TryRecvError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TryRecvError::Empty => write!(f, "channel empty"),
      TryRecvError::Closed => write!(f, "channel closed"),
    }
  }
}

/// Error returned when attempting to close an already closed channel.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct CloseError;
impl std::error::Error for CloseError {}
impl fmt::Display for CloseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "channel is already closed")
  }
}

/// Error returned by `destroy` on a channel that is still open. The
/// handle is returned intact; the channel remains fully usable.
pub struct DestroyError<T: Send>(pub(crate) Channel<T>);

impl<T: Send> DestroyError<T> {
  /// Consumes the error, returning the untouched channel handle.
  #[inline]
  pub fn into_inner(self) -> Channel<T> {
    self.0
  }
}

impl<T: Send> fmt::Debug for DestroyError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "DestroyError(..)")
  }
}

impl<T: Send> fmt::Display for DestroyError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "channel must be closed before it can be destroyed")
  }
}

impl<T: Send> std::error::Error for DestroyError<T> {}

/// Error returned by `select` and `try_select`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SelectError {
  /// `select` was called with an empty arm list.
  NoArms,
  /// The channel of the arm at `index` is closed.
  Closed {
    /// Position of the offending arm in the list passed to `select`.
    index: usize,
  },
}

impl std::error::Error for SelectError {}
impl fmt::Display for SelectError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SelectError::NoArms => write!(f, "select requires at least one arm"),
      SelectError::Closed { index } => write!(f, "channel of arm {} is closed", index),
    }
  }
}
