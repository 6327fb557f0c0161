// TimeTrail - app/mod.rs
//
// Application layer: orchestration of a run.
// Dependencies: core and platform layers.

pub mod pipeline;
