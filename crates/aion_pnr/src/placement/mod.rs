//! Placement engine for the PnR pipeline.
//!
//! Assigns each cell in the netlist to a physical site on the FPGA device.
//! Uses random initial placement followed by simulated annealing refinement
//! to minimize wire length and timing-critical path delays.

mod anneal;
mod cost;
mod heap;
mod random;

use crate::context::Context;
use crate::data::PnrNetlist;
use crate::ids::PnrNetId;
use crate::settings::Settings;
use aion_arch::Architecture;
use aion_diagnostics::DiagnosticSink;
use std::collections::HashMap;

pub use cost::PlacementCost;

/// Performs placement on the netlist, assigning each cell to a device site.
///
/// Equivalent to `place_with_settings(netlist, arch, &Settings::with_defaults(), None, sink)`.
pub fn place(netlist: &mut PnrNetlist, arch: &dyn Architecture, sink: &DiagnosticSink) {
    place_with_settings(netlist, arch, &Settings::with_defaults(), None, sink)
}

/// Performs placement on the netlist, assigning each cell to a device site.
///
/// First generates a random initial placement using resource counts from the
/// architecture, then refines it with either simulated annealing or the
/// analytic (heap) placer, per the `"placer"` setting (`"sa"` or `"heap"`).
/// All mutation goes through a [`Context`] so bel occupancy and strength
/// arbitration are kept consistent with direct [`Context::bind_bel`] callers
/// elsewhere in the pipeline (e.g. packer-fixed cells).
///
/// `criticality`, when given, is threaded into the SA cost model so a
/// re-anneal pass after timing analysis can pull critical nets tighter.
pub fn place_with_settings(
    netlist: &mut PnrNetlist,
    arch: &dyn Architecture,
    settings: &Settings,
    criticality: Option<&HashMap<PnrNetId, f64>>,
    sink: &DiagnosticSink,
) {
    let mut ctx = Context::new(std::mem::take(netlist));
    place_in_context(&mut ctx, arch, settings, criticality, sink);
    *netlist = ctx.into_netlist();
}

/// Like [`place_with_settings`], but operates on an existing [`Context`] so
/// a caller that also routes through the same context doesn't pay for a
/// netlist round-trip between phases.
pub(crate) fn place_in_context(
    ctx: &mut Context,
    arch: &dyn Architecture,
    settings: &Settings,
    criticality: Option<&HashMap<PnrNetId, f64>>,
    sink: &DiagnosticSink,
) {
    random::random_placement(ctx, arch, sink);
    refine_in_context(ctx, arch, settings, criticality, sink);
}

/// Refines whatever placement `ctx` already holds — no initial random
/// placement — using the configured placer. Used for a timing-driven
/// re-anneal pass where starting from scratch would throw away the first
/// pass's work.
pub(crate) fn refine_in_context(
    ctx: &mut Context,
    arch: &dyn Architecture,
    settings: &Settings,
    criticality: Option<&HashMap<PnrNetId, f64>>,
    sink: &DiagnosticSink,
) {
    match settings.get_str("placer", "sa") {
        "heap" => heap::heap_placement(ctx, arch, sink),
        _ => anneal::simulated_annealing(ctx, arch, settings, criticality, sink),
    }
}
