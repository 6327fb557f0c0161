// TimeTrail - core/mod.rs
//
// Core business logic layer: operation grammar, timestamp normalisation,
// action classification, line parsing, tree construction, and export.
// Must NOT depend on: platform, app, or touch the filesystem directly.

pub mod actions;
pub mod export;
pub mod grammar;
pub mod model;
pub mod parser;
pub mod timestamp;
pub mod tree;
