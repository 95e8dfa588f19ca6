#![forbid(unsafe_code)]

//! # deck
//!
//! The shared code for the deck operator console. Encapsulates abstractions
//! for things like:
//!
//! - Status polling of the host, its network, and its fleet of clients
//! - Command dispatch to the host, a single client, or every client
//! - Bounded transcripts of rendered command output
//! - Logging and tracing
//!
//! The [`console`] module ties these together into a state machine that is
//! driven by UI events and never lets a failure escape to the caller.

pub mod config;
pub mod console;
pub mod dispatch;
#[doc(hidden)]
pub mod ipc;
pub mod log;
pub mod status;
pub mod transcript;
pub mod transport;
