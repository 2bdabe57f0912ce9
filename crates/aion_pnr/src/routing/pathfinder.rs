//! PathFinder negotiated congestion routing.
//!
//! Iteratively routes all nets, using congestion-aware costs to resolve
//! resource conflicts. Each iteration rips up all nets and re-routes them
//! in criticality order. History costs accumulate for overused resources,
//! steering subsequent iterations away from congested areas.

use crate::context::Context;
use crate::ids::PnrNetId;
use crate::route_tree::{RouteNode, RouteResource, RouteTree};
use crate::routing::astar;
use crate::routing::congestion::CongestionMap;
use crate::strength::Strength;
use aion_arch::ids::{SiteId, WireId};
use aion_arch::Architecture;
use aion_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use aion_source::Span;

/// Maximum number of PathFinder iterations before declaring failure.
const MAX_ITERATIONS: usize = 50;

/// Resolves the routing-graph wire a site's pin enters/leaves through.
///
/// Falls back to the old synthetic site-as-wire numbering for architectures
/// that don't expose a real mapping (e.g. ones without a generated grid).
fn site_wire(arch: &dyn Architecture, site: SiteId) -> WireId {
    arch.site_routing_wire(site)
        .unwrap_or_else(|| WireId::from_raw(site.as_raw()))
}

/// Merges `src`'s children into `dst`, assuming both nodes represent the
/// same routing resource. Shared prefixes (e.g. the trunk wire out of a
/// site feeding multiple sinks) are folded into one branch instead of
/// being duplicated per sink.
fn merge_route_node(dst: &mut RouteNode, src: RouteNode) {
    for child in src.children {
        match dst.children.iter_mut().find(|c| c.resource == child.resource) {
            Some(existing) => merge_route_node(existing, child),
            None => dst.children.push(child),
        }
    }
}

/// Routes all nets using PathFinder negotiated congestion routing.
///
/// Iteratively routes all nets using A* search with congestion-aware costs.
/// Each iteration rips up every net's wire/pip bindings in `ctx` and
/// re-establishes them at [`Strength::Weak`] as routes are found, so the
/// `Context`'s `wire_to_net`/`pip_to_net` maps — not just the local
/// [`CongestionMap`] — reflect which net currently holds which resource.
/// After each iteration, updates history costs for overused resources.
/// Terminates when all routes are conflict-free or max iterations reached.
///
/// A net's `routing` field is only populated once every sink has a real
/// path from the driver; nets that can't currently be routed (no path in
/// the graph, or not yet placed) are left unrouted (and their bindings
/// unbound) and reported via `sink`, rather than papered over with a stub
/// tree.
pub(crate) fn pathfinder_route(ctx: &mut Context, arch: &dyn Architecture, sink: &DiagnosticSink) {
    let routing_graph = arch.routing_graph();
    let mut congestion = CongestionMap::new();
    let net_ids: Vec<PnrNetId> = ctx.netlist().nets.iter().map(|n| n.id).collect();

    for iteration in 0..MAX_ITERATIONS {
        congestion.reset_demand();
        let mut unrouted_nets = Vec::new();

        // Route each net
        for &net_id in &net_ids {
            ctx.ripup_net(net_id);

            let i = net_id.as_raw() as usize;
            let net = &ctx.netlist().nets[i];
            let driver_cell = ctx.netlist().pin(net.driver).cell;
            let driver_site = ctx.netlist().cell(driver_cell).placement;

            let Some(src_site) = driver_site else {
                ctx.netlist_mut().nets[i].routing = None;
                unrouted_nets.push(ctx.netlist().nets[i].name.clone());
                continue;
            };
            let src_wire = site_wire(arch, src_site);

            let mut merged_root = RouteNode {
                resource: RouteResource::Wire(src_wire),
                children: Vec::new(),
            };
            let mut fully_routed = true;
            let mut wires_bound = Vec::new();
            let mut pips_bound = Vec::new();

            // Route to each sink
            let sink_count = ctx.netlist().nets[i].sinks.len();
            for sink_idx in 0..sink_count {
                let sink_pin = ctx.netlist().nets[i].sinks[sink_idx];
                let sink_cell = ctx.netlist().pin(sink_pin).cell;
                let sink_site = ctx.netlist().cell(sink_cell).placement;

                let Some(dst_site) = sink_site else {
                    fully_routed = false;
                    continue;
                };
                let dst_wire = site_wire(arch, dst_site);

                match astar::astar_route(routing_graph, &congestion, src_wire, dst_wire) {
                    Some(route) => {
                        for wire in route.wires_used() {
                            congestion.add_usage(wire);
                            wires_bound.push(wire);
                        }
                        pips_bound.extend(route.pips_used());
                        merge_route_node(&mut merged_root, route.root);
                    }
                    None => fully_routed = false,
                }
            }

            if fully_routed {
                for wire in wires_bound {
                    let _ = ctx.bind_wire(net_id, wire, Strength::Weak);
                }
                for pip in pips_bound {
                    let _ = ctx.bind_pip(net_id, pip, Strength::Weak);
                }
                ctx.netlist_mut().nets[i].routing = Some(RouteTree::new(merged_root));
            } else {
                ctx.netlist_mut().nets[i].routing = None;
                unrouted_nets.push(ctx.netlist().nets[i].name.clone());
            }
        }

        // Check for congestion
        if !congestion.has_congestion() {
            if !unrouted_nets.is_empty() {
                sink.emit(Diagnostic::warning(
                    DiagnosticCode::new(Category::Timing, 21),
                    format!(
                        "{} net(s) could not be routed: {}",
                        unrouted_nets.len(),
                        unrouted_nets.join(", ")
                    ),
                    Span::DUMMY,
                ));
            }
            return; // Success: no resource conflicts among the nets that did route
        }

        congestion.update_history();

        if iteration == MAX_ITERATIONS - 1 {
            sink.emit(Diagnostic::warning(
                DiagnosticCode::new(Category::Timing, 20),
                format!(
                    "routing did not converge after {} iterations ({} overused resources)",
                    MAX_ITERATIONS,
                    congestion.overused_count()
                ),
                Span::DUMMY,
            ));
        }
    }
}

/// Creates stub route trees for all unrouted nets (Phase 2 fallback).
///
/// Used when the device routing graph is not yet populated. Assigns a
/// direct-connection route tree to each net.
pub(crate) fn stub_routing(netlist: &mut PnrNetlist, _sink: &DiagnosticSink) {
    for net in &mut netlist.nets {
        if net.routing.is_none() {
            net.routing = Some(RouteTree::stub());
        }
    }
}
