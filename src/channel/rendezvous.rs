//! The synchronous hand-off protocol for rendezvous (capacity 0) channels.
//!
//! The protocol is a three-stage handshake run entirely under the channel
//! mutex. The stage enum doubles as a single-slot exchange buffer: at most
//! one (sender, receiver) pairing is outstanding at any instant, so a
//! payload can never be duplicated or lost, and nothing is ever queued.
//!
//! - `Idle`: the first arrival of a pairing (the proposer) records its
//!   direction, moves its payload into the slot if it is sending, wakes
//!   the complementary side, and blocks until the hand-off completes.
//! - `Armed`: a complementary arrival consumes the pairing. It moves the
//!   payload across the slot, advances to `Handoff`, and wakes exactly
//!   the proposer. An arrival in the proposer's own direction instead
//!   joins the retry-waiters.
//! - `Handoff`: the pairing is being finalized; any arrival retries
//!   rather than interleaving with it.
//!
//! Retry wakeups are broadcast: the order in which blocked senders and
//! receivers win the re-arm race is deliberately unspecified.

use parking_lot::MutexGuard;
use std::mem;

use super::core::{ChanShared, ChanState};

/// The two roles a thread can take in the hand-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
  Send,
  Receive,
}

/// Protocol state, meaningful only for rendezvous channels.
#[derive(Debug)]
pub(crate) enum Stage<T> {
  /// No pairing in flight.
  Idle,
  /// A proposer is blocked waiting to be paired. A sending proposer arms
  /// with its payload in the slot; a receiving proposer arms with `None`.
  Armed {
    direction: Direction,
    slot: Option<T>,
  },
  /// A consumer completed the exchange and the proposer has not yet
  /// acknowledged. Holds the payload iff the proposer is receiving.
  Handoff { slot: Option<T> },
}

/// Rendezvous bookkeeping embedded in the channel state.
#[derive(Debug)]
pub(crate) struct Rendezvous<T> {
  pub(crate) stage: Stage<T>,
  pub(crate) waiting_senders: usize,
  pub(crate) waiting_receivers: usize,
}

impl<T> Rendezvous<T> {
  pub(crate) fn new() -> Self {
    Rendezvous {
      stage: Stage::Idle,
      waiting_senders: 0,
      waiting_receivers: 0,
    }
  }
}

/// How a hand-off attempt resolved.
pub(crate) enum Outcome<T> {
  /// The exchange happened. Holds the payload for a receiving caller.
  Complete(Option<T>),
  /// The channel closed before the caller could be paired. Hands the
  /// unsent payload back to a sending caller.
  Closed(Option<T>),
}

enum Step {
  Propose,
  Consume,
  Retry,
}

/// Runs the hand-off protocol to completion for one caller.
///
/// `slot` carries the payload for `Direction::Send` callers and must be
/// `None` for `Direction::Receive`. The channel mutex is held on entry
/// and on return; it is released only inside condvar waits.
pub(crate) fn run<T: Send>(
  shared: &ChanShared<T>,
  guard: &mut MutexGuard<'_, ChanState<T>>,
  direction: Direction,
  mut slot: Option<T>,
) -> Outcome<T> {
  loop {
    if guard.closed {
      return Outcome::Closed(slot);
    }

    match next_step(guard, direction) {
      Step::Propose => {
        guard.rendezvous_mut().stage = Stage::Armed {
          direction,
          slot: slot.take(),
        };
        // A proposer makes the complementary operation newly possible.
        match direction {
          Direction::Send => {
            guard.recv_selectors.notify_all();
            shared.not_empty.notify_all();
          }
          Direction::Receive => {
            guard.send_selectors.notify_all();
            shared.not_full.notify_all();
          }
        }
        return wait_for_handoff(shared, guard);
      }
      Step::Consume => {
        let rendezvous = guard.rendezvous_mut();
        let armed_slot = match mem::replace(&mut rendezvous.stage, Stage::Idle) {
          Stage::Armed { slot, .. } => slot,
          _ => unreachable!("consume step requires an armed proposer"),
        };
        let received = match direction {
          Direction::Receive => {
            rendezvous.stage = Stage::Handoff { slot: None };
            armed_slot
          }
          Direction::Send => {
            rendezvous.stage = Stage::Handoff { slot: slot.take() };
            // A receiving proposer arms empty-handed.
            armed_slot
          }
        };
        shared.handoff_done.notify_one();
        return Outcome::Complete(received);
      }
      Step::Retry => {
        match direction {
          Direction::Send => guard.rendezvous_mut().waiting_senders += 1,
          Direction::Receive => guard.rendezvous_mut().waiting_receivers += 1,
        }
        shared.retry.wait(guard);
        match direction {
          Direction::Send => guard.rendezvous_mut().waiting_senders -= 1,
          Direction::Receive => guard.rendezvous_mut().waiting_receivers -= 1,
        }
        // Re-evaluate from the top: the proposer we saw may have been
        // served while we slept, or the channel may have closed.
      }
    }
  }
}

fn next_step<T>(guard: &MutexGuard<'_, ChanState<T>>, direction: Direction) -> Step {
  match &guard.rendezvous_ref().stage {
    Stage::Idle => Step::Propose,
    Stage::Armed { direction: armed, .. } if *armed == direction => Step::Retry,
    Stage::Armed { .. } => Step::Consume,
    Stage::Handoff { .. } => Step::Retry,
  }
}

/// Blocks the proposer until a consumer completes the exchange or the
/// channel closes underneath it.
fn wait_for_handoff<T: Send>(
  shared: &ChanShared<T>,
  guard: &mut MutexGuard<'_, ChanState<T>>,
) -> Outcome<T> {
  loop {
    shared.handoff_done.wait(guard);

    // A completed hand-off wins over a concurrent close: the payload has
    // already changed hands.
    if matches!(guard.rendezvous_ref().stage, Stage::Handoff { .. }) {
      let slot = match mem::replace(&mut guard.rendezvous_mut().stage, Stage::Idle) {
        Stage::Handoff { slot } => slot,
        _ => unreachable!(),
      };
      shared.retry.notify_all();
      return Outcome::Complete(slot);
    }

    if guard.closed {
      // Closed while still armed: withdraw the proposal, recovering the
      // payload if this proposer was sending.
      let slot = match mem::replace(&mut guard.rendezvous_mut().stage, Stage::Idle) {
        Stage::Armed { slot, .. } => slot,
        _ => unreachable!("an armed proposer is only ever completed or closed out"),
      };
      return Outcome::Closed(slot);
    }

    // Spurious wakeup: still armed and not closed, keep waiting.
  }
}
