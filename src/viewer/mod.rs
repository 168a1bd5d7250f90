//! Preview state and the controller that feeds it.
//!
//! `PreviewSession` is the synchronous state machine (NoData, Viewing,
//! Failed); `PreviewController` wraps it with the async fetch and parse.

mod controller;
mod session;

pub use controller::PreviewController;
pub use session::{LoadTicket, PreviewSession, PreviewState};
