mod common;
use common::*;

use filament::{Channel, RecvError, SendError, TryRecvError, TrySendError};

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;
use std::time::Instant;

#[test]
fn send_and_recv_complete_as_a_pair() {
  let channel: Channel<u32> = Channel::new(0);
  assert!(channel.is_rendezvous());

  let receiver = {
    let channel = channel.clone();
    thread::spawn(move || channel.recv())
  };
  channel.send(42).unwrap();
  assert_eq!(join_within(receiver, LONG_TIMEOUT, "paired receiver"), Ok(42));
}

#[test]
fn solitary_send_blocks_until_closed_and_recovers_its_payload() {
  let channel: Channel<&str> = Channel::new(0);
  let sender = {
    let channel = channel.clone();
    thread::spawn(move || channel.send("undelivered"))
  };
  assert!(
    still_running_after(&sender, SHORT_PAUSE),
    "a rendezvous send with no receiver returned without blocking"
  );

  channel.close().unwrap();
  let result = join_within(sender, LONG_TIMEOUT, "closed-out sender");
  assert_eq!(result, Err(SendError::Closed("undelivered")));
}

#[test]
fn solitary_recv_blocks_until_closed() {
  let channel: Channel<u32> = Channel::new(0);
  let receiver = {
    let channel = channel.clone();
    thread::spawn(move || channel.recv())
  };
  assert!(still_running_after(&receiver, SHORT_PAUSE));

  channel.close().unwrap();
  assert_eq!(
    join_within(receiver, LONG_TIMEOUT, "closed-out receiver"),
    Err(RecvError::Closed)
  );
}

#[test]
fn try_ops_refuse_to_become_a_proposer() {
  let channel: Channel<u32> = Channel::new(0);
  // No complementary party is committed, so neither direction proceeds.
  assert_eq!(channel.try_send(1), Err(TrySendError::Full(1)));
  assert_eq!(channel.try_recv(), Err(TryRecvError::Empty));
}

#[test]
fn try_recv_consumes_an_armed_sender() {
  let channel: Channel<u32> = Channel::new(0);
  let sender = {
    let channel = channel.clone();
    thread::spawn(move || channel.send(7))
  };

  // Poll until the blocked send has armed itself.
  let deadline = Instant::now() + LONG_TIMEOUT;
  let received = loop {
    match channel.try_recv() {
      Ok(item) => break item,
      Err(TryRecvError::Empty) => {
        assert!(Instant::now() < deadline, "sender never armed");
        thread::yield_now();
      }
      Err(other) => panic!("unexpected error: {other:?}"),
    }
  };
  assert_eq!(received, 7);
  join_within(sender, LONG_TIMEOUT, "consumed sender").unwrap();
}

#[test]
fn try_send_consumes_an_armed_receiver() {
  let channel: Channel<u32> = Channel::new(0);
  let receiver = {
    let channel = channel.clone();
    thread::spawn(move || channel.recv())
  };

  let deadline = Instant::now() + LONG_TIMEOUT;
  let mut payload = 13;
  loop {
    match channel.try_send(payload) {
      Ok(()) => break,
      Err(TrySendError::Full(returned)) => {
        assert!(Instant::now() < deadline, "receiver never armed");
        payload = returned;
        thread::yield_now();
      }
      Err(other) => panic!("unexpected error: {other:?}"),
    }
  }
  assert_eq!(join_within(receiver, LONG_TIMEOUT, "paired receiver"), Ok(13));
}

#[test]
fn closed_rendezvous_channel_fails_immediately() {
  let channel: Channel<u32> = Channel::new(0);
  channel.close().unwrap();
  assert_eq!(channel.send(1), Err(SendError::Closed(1)));
  assert_eq!(channel.recv(), Err(RecvError::Closed));
  assert_eq!(channel.try_send(2), Err(TrySendError::Closed(2)));
  assert_eq!(channel.try_recv(), Err(TryRecvError::Closed));
}

#[test]
fn rendezvous_accessors_report_no_storage() {
  let channel: Channel<u32> = Channel::new(0);
  assert_eq!(channel.capacity(), 0);
  assert_eq!(channel.len(), 0);
  assert!(channel.is_empty());
  assert!(channel.is_full());
}

#[test]
fn every_payload_is_observed_exactly_once() {
  const SENDERS: usize = 4;
  const RECEIVERS: usize = 4;
  const ITEMS_PER_SENDER: usize = 200;

  let channel = Channel::new(0);
  let received = Arc::new(Mutex::new(HashSet::new()));

  let mut consumers = Vec::new();
  for _ in 0..RECEIVERS {
    let channel = channel.clone();
    let received = Arc::clone(&received);
    consumers.push(thread::spawn(move || {
      while let Ok(item) = channel.recv() {
        assert!(received.lock().unwrap().insert(item), "payload duplicated by hand-off");
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
    join_within(producer, STRESS_TIMEOUT, "rendezvous producer");
  }
  channel.close().unwrap();
  for consumer in consumers {
    join_within(consumer, STRESS_TIMEOUT, "rendezvous consumer");
  }

  assert_eq!(received.lock().unwrap().len(), SENDERS * ITEMS_PER_SENDER);
}
