//! Crawl orchestration
//!
//! Two layers: [`frontier`] implements the breadth-first traversal with
//! its ordering and limit guarantees, and [`coordinator`] wires the
//! configured fetch pipeline, document store, and protocol events into
//! the single/batch/site run modes.

pub mod coordinator;
pub mod frontier;

pub use coordinator::Engine;
pub use frontier::{FrontierEntry, PageConsumer, StopSignal, Termination};
