// TimeTrail - platform/mod.rs
//
// Platform abstraction layer: filesystem reads and config.toml.
// Dependencies: standard library, directories crate, core model types.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
