//! Application layer containing the core business logic orchestration.
//!
//! `SplitEngine` is the entry point for user and notification actions. All
//! writes are funnelled through `MainQueue`, an actor-like task fed by a
//! `tokio` channel, so state changes happen on a single logical thread.

pub mod engine;
pub mod feed;
pub mod queue;
pub mod state;
