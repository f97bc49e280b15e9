//! Power State Graph Core Library
//!
//! Learns a per-appliance model of power states and transitions from
//! recorded signatures:
//! - Bounded-memory running statistics with a Welch-test similarity score
//! - Spike detection and salience selection
//! - The power state graph and its vertex/edge incorporation passes
//! - Snapshot export for renderers
//! - Structured logging setup

pub mod error;
pub mod export;
pub mod filter;
pub mod graph;
pub mod logging;
pub mod signature;
pub mod spike;
pub mod statistic;

pub use error::{Error, ErrorCategory, Result};
pub use export::{EdgeSnapshot, GraphSnapshot, VertexSnapshot};
pub use filter::{classify_spike, reject_spike, SpikeVerdict};
pub use graph::{
    EdgePassSummary, IncorporationReport, PowerStateEdge, PowerStateGraph, VertexId,
    VertexMatch, VertexPassSummary,
};
pub use signature::Signature;
pub use spike::{detect_spikes, select_salient, Spike};
pub use statistic::{RunningStatistic, DEFAULT_ALPHA};

pub use psg_config::{GraphConfig, SpikeDetectionConfig, SpikeFilterConfig};
