//! Timing report types produced by static timing analysis.
//!
//! A [`TimingReport`] summarizes the result of one STA run: per-clock-domain
//! worst slack, the set of critical paths extracted by backtracking from the
//! worst endpoints, and a per-arc criticality vector used by timing-driven
//! placement and routing.

use crate::ids::TimingEdgeId;
use aion_common::Ident;
use serde::{Deserialize, Serialize};

/// The complete result of a static timing analysis run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimingReport {
    /// Per-clock-domain timing summaries.
    pub clock_domains: Vec<ClockDomainTiming>,
    /// Critical paths, worst slack first, truncated to a fixed count.
    pub critical_paths: Vec<CriticalPath>,
    /// Worst slack across all endpoints, in nanoseconds.
    pub worst_slack_ns: f64,
    /// Achieved frequency of the primary clock, in MHz.
    pub achieved_frequency_mhz: f64,
    /// Target frequency of the primary clock, in MHz.
    pub target_frequency_mhz: f64,
    /// Whether all timing constraints are met (no negative slack).
    pub met: bool,
    /// Per-arc criticality, indexed by `TimingEdgeId::as_raw()`.
    ///
    /// Each entry is normalised to `[0, 1]`: `1.0` marks the arc on the
    /// worst path, `0.0` marks an arc with no bearing on any tight path.
    /// Consumed by the placer's timing-cost term and the router's
    /// criticality-scaled rip-up penalty.
    pub edge_criticality: Vec<f64>,
}

impl TimingReport {
    /// Returns an empty report for a graph with no timing nodes.
    pub fn empty() -> Self {
        Self {
            met: true,
            ..Default::default()
        }
    }

    /// Returns the number of critical paths with negative slack.
    pub fn violation_count(&self) -> usize {
        self.critical_paths
            .iter()
            .filter(|p| p.slack_ns < 0.0)
            .count()
    }

    /// Returns the criticality of the given edge, or `0.0` if unknown.
    pub fn criticality(&self, edge: TimingEdgeId) -> f64 {
        self.edge_criticality
            .get(edge.as_raw() as usize)
            .copied()
            .unwrap_or(0.0)
    }
}

/// Timing summary for a single clock domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockDomainTiming {
    /// The interned name of the clock.
    pub clock_name: Ident,
    /// The clock's period in nanoseconds.
    pub period_ns: f64,
    /// Worst slack among endpoints attributed to this domain, in nanoseconds.
    pub worst_slack_ns: f64,
    /// Number of critical paths attributed to this domain.
    pub critical_path_count: usize,
    /// Number of distinct endpoints attributed to this domain.
    pub endpoint_count: usize,
    /// Whether this domain's worst slack is non-negative.
    pub met: bool,
}

/// One endpoint of a critical path: a timing graph node, and an optional pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingEndpoint {
    /// Interned name of the timing graph node (cell/port or I/O).
    pub node: Ident,
    /// The bel-pin index, for multi-bel-pin endpoints.
    pub pin: Option<u32>,
}

/// A single critical path from a driver endpoint to a sink endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticalPath {
    /// The path's starting endpoint (a source or register output).
    pub from: TimingEndpoint,
    /// The path's ending endpoint (a sink or register input).
    pub to: TimingEndpoint,
    /// Total path delay in nanoseconds.
    pub delay_ns: f64,
    /// Slack at the ending endpoint, in nanoseconds. Negative means violated.
    pub slack_ns: f64,
    /// The nodes visited along the path, in path order.
    pub elements: Vec<PathElement>,
}

/// One node visited along a [`CriticalPath`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathElement {
    /// Human-readable name of the visited node.
    pub node_name: String,
    /// Debug-formatted node type (cell pin, routing node, I/O, clock source).
    pub node_type: String,
    /// Incremental delay contributed by the incoming edge, in nanoseconds.
    pub delay_ns: f64,
    /// Cumulative delay from the path's start, in nanoseconds.
    pub cumulative_ns: f64,
    /// Physical location, if the node is bound to a bel.
    pub location: Option<(i32, i32)>,
    /// Source span of the originating cell, if known.
    pub source_span: Option<aion_source::Span>,
}
