//! Chat widget session core
//!
//! A single-request chat widget: the user types a message, the widget shows
//! it, animates a "Typing" placeholder while one reply is fetched, then
//! shows the reply and accepts the next message.
//!
//! # Architecture
//!
//! - **Session**: the `Idle -> Sending -> Idle` controller and latency stats
//! - **UI seams**: rendering surface and input field traits with in-memory
//!   and terminal implementations
//! - **Reply sources**: HTTP endpoint client and a simulated local responder
//! - **Server**: demo `POST /chat` endpoint backed by any reply source
//!
//! # Modules
//!
//! - [`session`]: controller, messages, latency tracker
//! - [`ui`]: message view, typing indicator, input and key adapter
//! - [`reply`]: reply source trait and implementations
//! - [`server`]: Axum router for the chat endpoint
//! - [`config`]: layered configuration and CLI

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod config;
pub mod reply;
pub mod server;
pub mod session;
pub mod telemetry;
pub mod ui;
