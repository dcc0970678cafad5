//! termfolio - a terminal portfolio served over SSH
//!
//! Every connection gets its own session: a page list on the left, a
//! scrollable viewport on the right, and focus that moves between the two.
//! The rendering core ([`session`], [`ui`], [`pages`]) consumes decoded
//! events and produces complete ANSI frames; [`server`] adapts it to SSH
//! or Telnet over TCP.

pub mod config;
pub mod error;
pub mod logging;
pub mod pages;
pub mod server;
pub mod session;
pub mod ui;

pub use error::{Error, Result};
