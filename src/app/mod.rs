// logwhence - app/mod.rs
//
// Application layer: reference ingestion sinks and the replay pipeline
// used by the binary.

pub mod replay;
pub mod sink;
