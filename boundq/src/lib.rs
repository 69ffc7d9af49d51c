//! # boundq
//!
//! A bounded, thread-safe FIFO queue backed by a fixed-size circular buffer.
//!
//! One mutex guards the buffer and its counters. Two condition variables share
//! that mutex: producers wait on "space available", consumers wait on "data
//! available". Non-blocking `try_*` operations report
//! [`QueueFull`](sync::error::QueueFull) / [`QueueEmpty`](sync::error::QueueEmpty)
//! instead of waiting.
//!
//! ## Example
//!
//! ```
//! use boundq::IntQueue;
//! use boundq::sync::error::{QueueEmpty, QueueFull};
//!
//! let queue = IntQueue::new(2)?;
//!
//! queue.try_enqueue(1).unwrap();
//! queue.try_enqueue(2).unwrap();
//! assert_eq!(queue.try_enqueue(3), Err(QueueFull(3)));
//!
//! assert_eq!(queue.dequeue(), 1);
//! assert_eq!(queue.try_dequeue(), Ok(2));
//! assert_eq!(queue.try_dequeue(), Err(QueueEmpty));
//! assert_eq!(queue.to_string(), "Len:0 Cap:2");
//! # Ok::<(), boundq::config::ConfigError>(())
//! ```
//!
//! ## Features
//!
//! - `tracing`: structured logging of construction, waits, timeouts and
//!   cancellation. Call [`init_tracing`] to install a subscriber.

pub mod config;
pub(crate) mod ring;
pub mod sync;
mod trace;

pub use trace::init_tracing;

#[doc(inline)]
pub use config::{ConfigError, QueueConfig};
#[doc(inline)]
pub use sync::bounded::{BoundedQueue, IntQueue, Timeout};
#[doc(inline)]
pub use sync::cancel::CancelToken;
