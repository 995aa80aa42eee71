//! Test infrastructure for the indexing pipeline.
//!
//! Provides fixture stores and a harness wiring every component to the
//! in-memory store and engine.

#![allow(dead_code)]

pub mod fixtures;
pub mod harness;

pub use fixtures::*;
pub use harness::*;
