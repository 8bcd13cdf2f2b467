//! Blocking bounded and rendezvous channels with a multi-channel select.
//!
//! Filament provides a single [`Channel`] type covering two modes picked
//! at construction time: buffered (fixed capacity, FIFO) and rendezvous
//! (capacity 0, payloads hand off directly from a sender to a receiver
//! with no intermediate storage). A [`select`] call waits on any mix of
//! send and receive operations across channels and resolves exactly one
//! of them, scanning its arms in list order.
//!
//! All blocking is mutex/condvar based; there is no async API and no
//! timeout primitive. Callers that need a timeout race the operation
//! against [`Channel::close`] from another thread.

pub mod error;

pub mod channel;
pub mod select;
pub mod telemetry;

// Internal collaborators - not part of the public API.
mod internal;

// Public re-exports for convenience.
pub use channel::Channel;
pub use error::{
  CloseError, DestroyError, RecvError, SelectError, SendError, TryRecvError, TrySendError,
};
pub use select::{select, try_select, SelectArm, Selection};
