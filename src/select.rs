// src/select.rs

//! Waiting on several channel operations at once.
//!
//! [`select`] takes an ordered list of send/receive arms, registers one
//! private wake signal with every listed channel, and polls the arms with
//! their non-blocking fast paths. Between full scans the calling thread
//! blocks on the signal; every channel state change that could satisfy an
//! arm increments it, so a scan only ever re-runs after a real state
//! change; select never spins. List order is the tie-break when several
//! arms are ready at once.
//!
//! Each channel's mutex is taken for one arm at a time and released
//! before the next arm is examined; no two channel mutexes are ever held
//! together, so select calls cannot form lock-ordering cycles across
//! channels.

use std::sync::Arc;

use crate::channel::{Channel, Direction};
use crate::error::{SelectError, TryRecvError, TrySendError};
use crate::internal::signal::WakeSignal;
use crate::telemetry;

const LOC_SELECT: &str = "select";
const CTR_SCAN_ROUNDS: &str = "SelectScanRounds";

/// One pending operation in a `select` call.
#[derive(Debug)]
pub enum SelectArm<'a, T: Send> {
  /// Send `payload` on `channel`. The slot is emptied iff this arm wins.
  Send {
    /// The channel to send on.
    channel: &'a Channel<T>,
    /// The payload to transfer; consumed when the arm wins.
    payload: Option<T>,
  },
  /// Receive a payload from `channel`.
  Recv {
    /// The channel to receive from.
    channel: &'a Channel<T>,
  },
}

impl<'a, T: Send> SelectArm<'a, T> {
  /// A send arm carrying `payload`.
  pub fn send(channel: &'a Channel<T>, payload: T) -> Self {
    SelectArm::Send {
      channel,
      payload: Some(payload),
    }
  }

  /// A receive arm.
  pub fn recv(channel: &'a Channel<T>) -> Self {
    SelectArm::Recv { channel }
  }

  /// Recovers the payload of a send arm that did not win.
  pub fn take_payload(&mut self) -> Option<T> {
    match self {
      SelectArm::Send { payload, .. } => payload.take(),
      SelectArm::Recv { .. } => None,
    }
  }

  fn channel(&self) -> &'a Channel<T> {
    match self {
      SelectArm::Send { channel, .. } | SelectArm::Recv { channel } => channel,
    }
  }

  fn direction(&self) -> Direction {
    match self {
      SelectArm::Send { .. } => Direction::Send,
      SelectArm::Recv { .. } => Direction::Receive,
    }
  }
}

/// The arm that resolved a `select` call.
#[derive(Debug, PartialEq, Eq)]
pub struct Selection<T> {
  /// Index of the winning arm in the list passed to `select`.
  pub index: usize,
  /// The received payload, for a winning receive arm.
  pub payload: Option<T>,
}

/// Blocks until exactly one arm completes, in list order on ties.
///
/// A closed channel resolves the call too: the error carries the index of
/// the offending arm, and a send arm keeps its payload for recovery via
/// [`SelectArm::take_payload`].
///
/// Listing the same channel for both directions in one call is not
/// supported: the two arms could pair with each other.
pub fn select<T: Send>(arms: &mut [SelectArm<'_, T>]) -> Result<Selection<T>, SelectError> {
  if arms.is_empty() {
    return Err(SelectError::NoArms);
  }

  let signal = Arc::new(WakeSignal::new());
  for arm in arms.iter() {
    arm
      .channel()
      .shared
      .register_selector(arm.direction(), Arc::clone(&signal));
  }

  let resolution = loop {
    telemetry::increment_counter(LOC_SELECT, CTR_SCAN_ROUNDS);
    if let Some(resolution) = scan(arms) {
      break resolution;
    }
    // Nothing ready: sleep until some registered channel changes state.
    signal.wait();
  };

  for arm in arms.iter() {
    arm
      .channel()
      .shared
      .deregister_selector(arm.direction(), &signal);
  }
  resolution
}

/// A single non-blocking pass over the arms.
///
/// `Ok(None)` means no arm was ready. No wake signal is registered: this
/// never blocks and leaves no state behind.
pub fn try_select<T: Send>(
  arms: &mut [SelectArm<'_, T>],
) -> Result<Option<Selection<T>>, SelectError> {
  if arms.is_empty() {
    return Err(SelectError::NoArms);
  }
  match scan(arms) {
    Some(resolution) => resolution.map(Some),
    None => Ok(None),
  }
}

fn scan<T: Send>(arms: &mut [SelectArm<'_, T>]) -> Option<Result<Selection<T>, SelectError>> {
  for (index, arm) in arms.iter_mut().enumerate() {
    match arm {
      SelectArm::Send { channel, payload } => {
        let Some(item) = payload.take() else {
          // The slot was already consumed by an earlier call over the
          // same arms; nothing left to offer.
          continue;
        };
        match channel.try_send(item) {
          Ok(()) => return Some(Ok(Selection { index, payload: None })),
          Err(TrySendError::Full(returned)) => *payload = Some(returned),
          Err(TrySendError::Closed(returned)) => {
            *payload = Some(returned);
            return Some(Err(SelectError::Closed { index }));
          }
        }
      }
      SelectArm::Recv { channel } => match channel.try_recv() {
        Ok(item) => {
          return Some(Ok(Selection {
            index,
            payload: Some(item),
          }))
        }
        Err(TryRecvError::Empty) => {}
        Err(TryRecvError::Closed) => return Some(Err(SelectError::Closed { index })),
      },
    }
  }
  None
}
