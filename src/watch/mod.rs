// src/watch/mod.rs

//! File watching.
//!
//! This module is responsible for:
//! - Compiling the `[watch]` include/exclude globs (`patterns`).
//! - Wiring up a cross-platform filesystem watcher (`notify`) and grouping
//!   bursts of raw events into single change notifications (`watcher`).
//!
//! It does **not** decide whether a change starts a rebuild; that is the
//! engine's state machine.

pub mod patterns;
pub mod watcher;

pub use patterns::WatchProfile;
pub use watcher::{WatcherHandle, spawn_watcher};
