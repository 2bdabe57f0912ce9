//! Analytic (heap) placer: quadratic-wirelength placement with legalization.
//!
//! Solves `Bx = d` (and the equivalent system for `y`) where `B` encodes net
//! connectivity with the bound2bound net model, then legalises the
//! fractional solution onto discrete bels by spreading overloaded sites
//! outward to their nearest free neighbors. The legalised result is handed
//! back to the caller, which typically runs a short simulated-annealing pass
//! afterward to clean up any remaining overlap artifacts from legalization.
//!
//! Selected by the `placer` setting (`"heap"`, as opposed to the default
//! `"sa"`); see [`super::place_with_settings`].

use crate::context::Context;
use crate::data::PnrCellType;
use crate::ids::{PnrCellId, PnrNetId};
use crate::placement::cost::SYNTHETIC_GRID_WIDTH;
use crate::strength::Strength;
use aion_arch::ids::SiteId;
use aion_arch::types::SiteType;
use aion_arch::Architecture;
use aion_diagnostics::DiagnosticSink;
use std::collections::HashMap;

/// Number of Jacobi relaxation sweeps used to solve the quadratic system.
const SOLVER_ITERATIONS: usize = 30;

/// Bound2bound net weight: for a net with `n` pins, each of the `n*(n-1)/2`
/// implied edges is weighted `1 / (n - 1)` so the net's total pull on any
/// one pin stays independent of its fanout.
fn bound2bound_weight(net_size: usize) -> f64 {
    if net_size <= 1 {
        0.0
    } else {
        1.0 / (net_size - 1) as f64
    }
}

/// Refines placement using the analytic quadratic-wirelength model.
///
/// Cells already bound at [`Strength::Fixed`] or stronger act as anchors in
/// the linear system; movable cells are solved for, then legalised onto the
/// nearest free compatible site via [`legalize`].
pub(crate) fn heap_placement(ctx: &mut Context, arch: &dyn Architecture, _sink: &DiagnosticSink) {
    let cell_ids: Vec<PnrCellId> = ctx.netlist().cells.iter().map(|c| c.id).collect();
    if cell_ids.len() < 2 {
        return;
    }

    let movable: Vec<PnrCellId> = cell_ids
        .iter()
        .copied()
        .filter(|&id| !ctx.netlist().cell(id).is_fixed)
        .collect();
    if movable.is_empty() {
        return;
    }

    let index_of: HashMap<PnrCellId, usize> = movable
        .iter()
        .enumerate()
        .map(|(i, &id)| (id, i))
        .collect();

    // Anchor position for every cell (movable cells start from their current
    // placement, or the origin if unplaced yet).
    let position = |cell: PnrCellId| -> (f64, f64) {
        match ctx.netlist().cell(cell).placement {
            Some(site) => {
                let (x, y) = crate::placement::cost::site_to_coords(
                    site.as_raw(),
                    SYNTHETIC_GRID_WIDTH,
                );
                (x as f64, y as f64)
            }
            None => (0.0, 0.0),
        }
    };

    let mut x: Vec<f64> = movable.iter().map(|&c| position(c).0).collect();
    let mut y: Vec<f64> = movable.iter().map(|&c| position(c).1).collect();

    // Build bound2bound edges: (cell_a, cell_b, weight), where either side
    // may be a fixed anchor (index_of lookup miss) contributing a constant
    // pull rather than a mutual spring.
    struct Edge {
        a: PnrCellId,
        b: PnrCellId,
        weight: f64,
    }
    let mut edges = Vec::new();
    for net in &ctx.netlist().nets {
        let mut pins = vec![ctx.netlist().pin(net.driver).cell];
        pins.extend(net.sinks.iter().map(|&p| ctx.netlist().pin(p).cell));
        pins.sort_by_key(|c| c.as_raw());
        pins.dedup();
        if pins.len() < 2 {
            continue;
        }
        let weight = bound2bound_weight(pins.len());
        for i in 0..pins.len() {
            for j in (i + 1)..pins.len() {
                edges.push(Edge {
                    a: pins[i],
                    b: pins[j],
                    weight,
                });
            }
        }
    }

    // Jacobi relaxation: each movable cell's coordinate converges toward the
    // weighted average of its neighbors (fixed neighbors contribute their
    // anchored coordinate every sweep).
    for _ in 0..SOLVER_ITERATIONS {
        let mut accum_x = vec![0.0; movable.len()];
        let mut accum_y = vec![0.0; movable.len()];
        let mut weight_sum = vec![0.0; movable.len()];

        for edge in &edges {
            let pos_a = index_of
                .get(&edge.a)
                .map(|&i| (x[i], y[i]))
                .unwrap_or_else(|| position(edge.a));
            let pos_b = index_of
                .get(&edge.b)
                .map(|&i| (x[i], y[i]))
                .unwrap_or_else(|| position(edge.b));

            if let Some(&i) = index_of.get(&edge.a) {
                accum_x[i] += edge.weight * pos_b.0;
                accum_y[i] += edge.weight * pos_b.1;
                weight_sum[i] += edge.weight;
            }
            if let Some(&i) = index_of.get(&edge.b) {
                accum_x[i] += edge.weight * pos_a.0;
                accum_y[i] += edge.weight * pos_a.1;
                weight_sum[i] += edge.weight;
            }
        }

        for i in 0..movable.len() {
            if weight_sum[i] > 0.0 {
                x[i] = accum_x[i] / weight_sum[i];
                y[i] = accum_y[i] / weight_sum[i];
            }
        }
    }

    legalize(ctx, arch, &movable, &x, &y);
}

/// Assigns each movable cell to the free, type-compatible site nearest its
/// fractional analytic position, breaking ties by site raw index so the
/// result is deterministic for a given solver output.
fn legalize(
    ctx: &mut Context,
    arch: &dyn Architecture,
    movable: &[PnrCellId],
    x: &[f64],
    y: &[f64],
) {
    let mut order: Vec<usize> = (0..movable.len()).collect();
    // Place cells with more extreme (already-spread) positions first so
    // early assignments don't crowd out cells the solver pulled to the
    // edges of the design.
    order.sort_by(|&a, &b| {
        let dist = |i: usize| x[i] * x[i] + y[i] * y[i];
        dist(b).partial_cmp(&dist(a)).unwrap_or(std::cmp::Ordering::Equal)
    });

    for &i in &order {
        let cell = movable[i];
        let cell_type = ctx.netlist().cell(cell).cell_type.clone();
        let candidates = candidate_sites(arch, &cell_type);
        if candidates.is_empty() {
            continue;
        }

        let mut best: Option<(SiteId, f64)> = None;
        for &site in &candidates {
            if !ctx.check_bel_avail(site, Strength::None) {
                continue;
            }
            let (sx, sy) = crate::placement::cost::site_to_coords(
                site.as_raw(),
                SYNTHETIC_GRID_WIDTH,
            );
            let dx = sx as f64 - x[i];
            let dy = sy as f64 - y[i];
            let dist = dx * dx + dy * dy;
            if best.map(|(_, d)| dist < d).unwrap_or(true) {
                best = Some((site, dist));
            }
        }

        if let Some((site, _)) = best {
            let _ = ctx.bind_bel(cell, site, Strength::Weak);
        }
    }
}

fn candidate_sites(arch: &dyn Architecture, cell_type: &PnrCellType) -> Vec<SiteId> {
    let types: &[SiteType] = match cell_type {
        PnrCellType::Lut { .. } | PnrCellType::Carry => {
            &[SiteType::LutFf, SiteType::Alm, SiteType::Lut]
        }
        PnrCellType::Dff => &[SiteType::LutFf, SiteType::Alm, SiteType::Ff],
        PnrCellType::Bram(_) => &[SiteType::BramSite],
        PnrCellType::Dsp(_) => &[SiteType::DspSite],
        PnrCellType::Iobuf { .. } => &[SiteType::IoPad],
        PnrCellType::Pll(_) => &[SiteType::Pll],
    };
    let real: Vec<SiteId> = types.iter().flat_map(|&t| arch.sites_of_type(t)).collect();
    if !real.is_empty() {
        return real;
    }
    // No real grid: fall back to a synthetic window around the origin large
    // enough to hold a small test design.
    (0..256).map(SiteId::from_raw).collect()
}
