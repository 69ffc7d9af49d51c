//! Synchronization primitives for in-process communication.
//!
//! This module provides the blocking bounded queue and the pieces its
//! blocking operations are built from.

pub mod bounded;
pub mod cancel;
pub mod error;
