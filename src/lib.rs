#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Save/autosave orchestration and the procedure wizard for rTMS treatment
//! session forms.
//!
//! The crate is organised leaf-first:
//!
//! - [`model`]: host forms, field validation, and immutable [`FormSnapshot`](model::FormSnapshot)s.
//! - [`save`]: the HTTP save path and response classification into [`SaveResult`](save::SaveResult).
//! - [`autosave`]: per-form debounce, in-flight guard, and status projection.
//! - [`actions`]: button actions (save, save-and-print, save-and-complete) and print URLs.
//! - [`wizard`]: the nine-step procedure wizard as a pure reducer.
//! - [`session`]: the single-task event loop wiring commands to all of the above.
//! - [`config`]: TOML-backed engine configuration.
//!
//! Rendering is left to the host: every component exposes state and emits
//! events, none of them draws anything.

pub mod actions;
pub mod autosave;
pub mod config;
pub mod model;
pub mod save;
pub mod session;
pub mod wizard;
