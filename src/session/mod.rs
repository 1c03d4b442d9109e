//! The session event loop.
//!
//! A [`SessionEngine`] owns the page's forms and runs on one task. Hosts
//! drive it through a [`SessionHandle`] and observe it through
//! [`EngineEvent`]s.

mod command;
mod engine;
mod error;

pub use command::{Command, EngineEvent, SessionHandle};
pub use engine::SessionEngine;
pub use error::SessionError;
