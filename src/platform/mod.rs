// logwhence - platform/mod.rs
//
// Platform abstraction layer: live stack capture and config file location.
// Dependencies: core model types, backtrace, directories.

pub mod config;
pub mod stack;
