#![allow(dead_code)]

// Shared constants and helpers for the integration tests.

use std::thread::JoinHandle;
use std::time::{Duration, Instant};

pub const SHORT_PAUSE: Duration = Duration::from_millis(100);
pub const LONG_TIMEOUT: Duration = Duration::from_secs(5);
pub const STRESS_TIMEOUT: Duration = Duration::from_secs(15);

/// Joins a thread, failing the test instead of hanging forever if the
/// thread deadlocked.
pub fn join_within<T>(handle: JoinHandle<T>, timeout: Duration, what: &str) -> T {
  let deadline = Instant::now() + timeout;
  while !handle.is_finished() {
    assert!(Instant::now() < deadline, "timed out waiting for {what}");
    std::thread::sleep(Duration::from_millis(5));
  }
  handle.join().unwrap()
}

/// True if the thread is still running after `pause` - used to assert
/// that an operation is genuinely blocked.
pub fn still_running_after<T>(handle: &JoinHandle<T>, pause: Duration) -> bool {
  std::thread::sleep(pause);
  !handle.is_finished()
}
