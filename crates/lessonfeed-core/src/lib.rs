//! Core of the lesson notification feed: connection lifecycle, message
//! classification and the bounded notification store.
//!
//! Everything here is pure and synchronous. Time is always passed in and
//! IO is left to the runtime, which executes the effects these types
//! return.

pub mod backoff;
pub mod classify;
pub mod connection;
pub mod feed;
pub mod format;
pub mod store;
pub mod types;
