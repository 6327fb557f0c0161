// TimeTrail - lib.rs
//
// Library entry point, exposing all modules for integration testing and
// for renderers that want the tree forest without going through the
// JSON/CSV export.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
