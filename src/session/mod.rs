//! Chat session core.
//!
//! This module owns the request lifecycle of a chat widget: it takes the
//! user's text, shows it, asks a reply source for an answer while the typing
//! indicator animates, and shows the answer.
//!
//! # Architecture
//!
//! - [`ChatSessionController`]: the `Idle -> Sending -> Idle` state machine
//! - [`LatencyTracker`]: running mean of round-trip times
//! - [`Message`] / [`Sender`]: entries of the append-only log
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chat_widget::reply::SimulatedReplySource;
//! use chat_widget::session::{ChatSessionController, SessionSettings, SubmitOutcome};
//! use chat_widget::ui::{MemoryInput, MemorySurface};
//!
//! # async fn example() {
//! let surface = MemorySurface::new();
//! let controller = ChatSessionController::new(
//!     Arc::new(surface.clone()),
//!     Arc::new(MemoryInput::new()),
//!     Arc::new(SimulatedReplySource::default()),
//!     SessionSettings::default(),
//! );
//!
//! assert_eq!(controller.submit("hello").await, SubmitOutcome::Replied);
//! assert_eq!(surface.texts(), vec!["hello", "testt"]);
//! # }
//! ```

mod controller;
mod latency;
mod message;

pub use controller::{
    ChatSessionController, KeyHandled, SessionSettings, SessionState, SessionTexts, SubmitOutcome,
};
pub use latency::{LatencySummary, LatencyTracker};
pub use message::{Message, Sender};
