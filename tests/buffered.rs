mod common;
use common::*;

use filament::{Channel, TryRecvError, TrySendError};

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::Arc;
use std::thread;

#[test]
fn capacity_sends_never_block_then_the_next_one_does() {
  let channel = Channel::new(3);
  for i in 0..3 {
    channel.send(i).unwrap();
  }
  assert!(channel.is_full());

  // The fourth send must block until a receive makes room.
  let blocked_sender = {
    let channel = channel.clone();
    thread::spawn(move || channel.send(3))
  };
  assert!(
    still_running_after(&blocked_sender, SHORT_PAUSE),
    "send into a full buffer returned without blocking"
  );

  assert_eq!(channel.recv(), Ok(0));
  join_within(blocked_sender, LONG_TIMEOUT, "unblocked sender").unwrap();
  assert_eq!(channel.len(), 3);
}

#[test]
fn capacity_one_round_trip() {
  let channel = Channel::new(1);
  channel.send("x").unwrap();
  assert_eq!(channel.try_send("y"), Err(TrySendError::Full("y")));
  assert_eq!(channel.recv(), Ok("x"));
  assert_eq!(channel.try_send("y"), Ok(()));
}

#[test]
fn payloads_arrive_in_fifo_order() {
  let channel = Channel::new(8);
  for i in 0..8 {
    channel.send(i).unwrap();
  }
  for i in 0..8 {
    assert_eq!(channel.recv(), Ok(i));
  }
}

#[test]
fn try_recv_reports_empty() {
  let channel: Channel<u32> = Channel::new(4);
  assert_eq!(channel.try_recv(), Err(TryRecvError::Empty));
  channel.send(7).unwrap();
  assert_eq!(channel.try_recv(), Ok(7));
  assert_eq!(channel.try_recv(), Err(TryRecvError::Empty));
}

#[test]
fn blocked_receiver_wakes_on_send() {
  let channel: Channel<u64> = Channel::new(2);
  let receiver = {
    let channel = channel.clone();
    thread::spawn(move || channel.recv())
  };
  assert!(
    still_running_after(&receiver, SHORT_PAUSE),
    "recv on an empty buffer returned without blocking"
  );
  channel.send(99).unwrap();
  assert_eq!(join_within(receiver, LONG_TIMEOUT, "woken receiver"), Ok(99));
}

#[test]
fn accessors_track_occupancy() {
  let channel = Channel::new(2);
  assert_eq!(channel.capacity(), 2);
  assert!(channel.is_empty());
  assert!(!channel.is_full());
  assert!(!channel.is_rendezvous());

  channel.send(1).unwrap();
  assert_eq!(channel.len(), 1);
  channel.send(2).unwrap();
  assert!(channel.is_full());

  channel.recv().unwrap();
  channel.recv().unwrap();
  assert!(channel.is_empty());
}

#[test]
fn many_senders_many_receivers_each_item_exactly_once() {
  const SENDERS: usize = 4;
  const RECEIVERS: usize = 4;
  const ITEMS_PER_SENDER: usize = 250;

  let channel = Channel::new(16);
  let received = Arc::new(Mutex::new(HashSet::new()));

  let mut consumers = Vec::new();
  for _ in 0..RECEIVERS {
    let channel = channel.clone();
    let received = Arc::clone(&received);
    consumers.push(thread::spawn(move || {
      while let Ok(item) = channel.recv() {
        assert!(received.lock().unwrap().insert(item), "duplicate item received");
      }
    }));
  }

  let mut producers = Vec::new();
  for p_id in 0..SENDERS {
    let channel = channel.clone();
    producers.push(thread::spawn(move || {
      for i in 0..ITEMS_PER_SENDER {
        channel.send(p_id * ITEMS_PER_SENDER + i).unwrap();
      }
    }));
  }

  for producer in producers {
    join_within(producer, STRESS_TIMEOUT, "producer");
  }
  channel.close().unwrap();
  for consumer in consumers {
    join_within(consumer, STRESS_TIMEOUT, "consumer");
  }

  assert_eq!(received.lock().unwrap().len(), SENDERS * ITEMS_PER_SENDER);
}
