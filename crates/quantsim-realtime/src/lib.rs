//! Simulated-live signal pipeline.
//!
//! Three stages joined by bounded channels: per-symbol bar producers, a
//! signal stage running the strategy, and an execution stage owning the
//! portfolio. See [`RealtimePipeline`].

mod pipeline;

pub use pipeline::{PipelineConfig, PipelineReport, RealtimePipeline};
