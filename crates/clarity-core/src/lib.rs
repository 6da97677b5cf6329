//! Clarity Core
//!
//! Shared plumbing for the Clarity crates: logging, profiling, collections,
//! math re-exports, geometry primitives, engine configuration and display
//! density helpers.

pub mod alloc;
pub mod config;
pub mod geometry;
pub mod logging;
pub mod math;
pub mod platform;
pub mod profiling;
