// logwhence - core/mod.rs
//
// Core attribution logic layer.
// Dependencies: standard library, serde, chrono, regex, tracing.
// Must NOT depend on: adapters, app, or platform.

pub mod locator;
pub mod model;
pub mod sink;
pub mod source;
pub mod trace;
