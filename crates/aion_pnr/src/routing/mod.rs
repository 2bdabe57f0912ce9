//! Routing engine for the PnR pipeline.
//!
//! Routes all nets in the netlist, connecting each driver pin to its sink
//! pins through the device's routing fabric. Uses the PathFinder negotiated
//! congestion algorithm with A* search for individual net routing.

mod astar;
mod congestion;
mod pathfinder;

use crate::context::Context;
use crate::data::PnrNetlist;
use aion_arch::Architecture;
use aion_diagnostics::DiagnosticSink;

/// Routes all nets in the netlist.
///
/// When the device exposes no routing graph, produces stub route trees
/// (direct connections); otherwise runs PathFinder negotiated-congestion
/// routing through a [`Context`], so every wire/pip a net ends up routed
/// through is recorded in the context's occupancy maps alongside the
/// `routing` field on the net itself.
pub fn route(netlist: &mut PnrNetlist, arch: &dyn Architecture, sink: &DiagnosticSink) {
    if arch.routing_graph().wires.is_empty() {
        // No routing graph available: create direct route trees
        pathfinder::stub_routing(netlist, sink);
    } else {
        let mut ctx = Context::new(std::mem::take(netlist));
        pathfinder::pathfinder_route(&mut ctx, arch, sink);
        *netlist = ctx.into_netlist();
    }
}

/// Routes all nets through an existing [`Context`], reusing whatever bel
/// bindings it already holds (e.g. from placement) rather than rebuilding
/// one from a bare netlist.
pub(crate) fn route_in_context(ctx: &mut Context, arch: &dyn Architecture, sink: &DiagnosticSink) {
    if arch.routing_graph().wires.is_empty() {
        pathfinder::stub_routing(ctx.netlist_mut(), sink);
    } else {
        pathfinder::pathfinder_route(ctx, arch, sink);
    }
}
