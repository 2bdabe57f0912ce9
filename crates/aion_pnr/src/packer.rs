//! Technology packing between netlist conversion and placement.
//!
//! Runs once on the freshly-converted [`Context`], before any cell has a
//! site. Three passes, in order:
//!
//! 1. [`lower_soft_logic`] rewrites single-input LUTs to the canonical
//!    inverter truth table — the only soft-logic shape `convert_to_pnr`
//!    produces, since it leaves `init` as a placeholder all-zero vector.
//! 2. [`propagate_constants`] pins the zero-input dummy-driver LUTs that
//!    `convert_to_pnr` synthesizes for undriven signals and takes the nets
//!    they drive out of timing-critical accounting.
//! 3. [`form_clusters`] groups cells that should land on adjacent sites:
//!    contiguous `Carry` chains (split into runs of at most
//!    [`CARRY_CHAIN_MAX`], the CARRY4-style segmentation) and MUXF7-style
//!    trees (two LUTs feeding the data inputs of a 3-input select LUT).
//!    Each group is bound to an adjacent run of free sites up front, at
//!    [`Strength::Fixed`], so later placement passes can't pull it apart.
//!
//! What this module does *not* do: the original `XFormRule` cell-type
//! rewriting and macro expansion have no foothold here, because
//! [`PnrCellType`] carries no legacy or macro variants for such a table to
//! rewrite between — `convert_to_pnr` already emits the final cell types
//! directly. Likewise, constant propagation here stops at removing the
//! constant driver from congestion/timing accounting rather than folding
//! it into sink LUTs' `init` bits, because `PnrPin` doesn't record which
//! input index within a sink LUT a pin corresponds to.

use crate::context::Context;
use crate::data::{PnrCellType, PnrNetlist};
use crate::ids::PnrCellId;
use crate::strength::Strength;
use aion_arch::ids::SiteId;
use aion_arch::types::SiteType;
use aion_arch::Architecture;
use aion_common::LogicVec;
use aion_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use aion_ir::PortDirection;
use aion_source::Span;
use std::collections::HashSet;

/// Maximum cells coalesced into one placement cluster for a carry chain,
/// mirroring CARRY4's four-bit segmentation.
const CARRY_CHAIN_MAX: usize = 4;

/// Runs all packing passes over `ctx` in place.
pub(crate) fn pack(ctx: &mut Context, arch: &dyn Architecture, sink: &DiagnosticSink) {
    lower_soft_logic(ctx);
    propagate_constants(ctx);
    form_clusters(ctx, arch, sink);
}

/// Rewrites single-input LUTs to the canonical inverter truth table.
fn lower_soft_logic(ctx: &mut Context) {
    for cell in ctx.netlist_mut().cells.iter_mut() {
        if let PnrCellType::Lut { inputs: 1, init } = &mut cell.cell_type {
            *init = LogicVec::from_u64(0b01, 2);
        }
    }
}

/// Pins zero-input dummy-driver LUTs and drops their nets out of the
/// timing-critical set, so later passes don't spend effort routing or
/// annealing around a constant.
fn propagate_constants(ctx: &mut Context) {
    let dummy_cells: HashSet<PnrCellId> = ctx
        .netlist()
        .cells
        .iter()
        .filter(|c| matches!(c.cell_type, PnrCellType::Lut { inputs: 0, .. }))
        .map(|c| c.id)
        .collect();

    if dummy_cells.is_empty() {
        return;
    }

    let nl = ctx.netlist_mut();
    for &cell_id in &dummy_cells {
        nl.cell_mut(cell_id).is_fixed = true;
    }
    for net in nl.nets.iter_mut() {
        let driver_cell = nl.pins[net.driver.as_raw() as usize].cell;
        if dummy_cells.contains(&driver_cell) {
            net.timing_critical = false;
        }
    }
}

/// Detects carry chains and MUXF7-style select trees, then binds each
/// cluster to an adjacent run of free sites at [`Strength::Fixed`].
fn form_clusters(ctx: &mut Context, arch: &dyn Architecture, sink: &DiagnosticSink) {
    let clusters: Vec<Vec<PnrCellId>> = find_carry_chains(ctx.netlist())
        .into_iter()
        .chain(find_select_clusters(ctx.netlist()))
        .collect();

    for cluster in clusters {
        place_cluster(ctx, arch, &cluster, sink);
    }
}

/// Finds the immediate successor of each `Carry` cell in a chain: the
/// other `Carry` cell, if any, that one of this cell's output nets feeds
/// directly.
fn carry_successors(nl: &PnrNetlist, carry_set: &HashSet<PnrCellId>) -> std::collections::HashMap<PnrCellId, PnrCellId> {
    let mut succ = std::collections::HashMap::new();
    for net in &nl.nets {
        let driver_cell = nl.pin(net.driver).cell;
        if !carry_set.contains(&driver_cell) {
            continue;
        }
        for &sink_pin in &net.sinks {
            let sink_cell = nl.pin(sink_pin).cell;
            if sink_cell != driver_cell && carry_set.contains(&sink_cell) {
                succ.entry(driver_cell).or_insert(sink_cell);
            }
        }
    }
    succ
}

/// Groups contiguous `Carry` cells into chains, each chain chunked into
/// placement clusters of at most [`CARRY_CHAIN_MAX`] cells.
fn find_carry_chains(nl: &PnrNetlist) -> Vec<Vec<PnrCellId>> {
    let carry_cells: Vec<PnrCellId> = nl
        .cells
        .iter()
        .filter(|c| matches!(c.cell_type, PnrCellType::Carry))
        .map(|c| c.id)
        .collect();
    let carry_set: HashSet<PnrCellId> = carry_cells.iter().copied().collect();
    let succ = carry_successors(nl, &carry_set);
    let chain_tails: HashSet<PnrCellId> = succ.values().copied().collect();

    let mut chains = Vec::new();
    for &head in &carry_cells {
        if chain_tails.contains(&head) {
            continue; // not a chain head
        }
        let mut chain = vec![head];
        let mut visited = HashSet::new();
        visited.insert(head);
        let mut current = head;
        while let Some(&next) = succ.get(&current) {
            if !visited.insert(next) {
                break; // guards against a malformed cyclic netlist
            }
            chain.push(next);
            current = next;
        }
        if chain.len() > 1 {
            chains.push(chain);
        }
    }

    chains
        .into_iter()
        .flat_map(|chain| {
            chain
                .chunks(CARRY_CHAIN_MAX)
                .map(<[PnrCellId]>::to_vec)
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Finds cells whose output drives one of `cell_id`'s input pins.
fn input_drivers(nl: &PnrNetlist, cell_id: PnrCellId) -> Vec<PnrCellId> {
    let input_pins: Vec<_> = nl
        .pins
        .iter()
        .filter(|p| p.cell == cell_id && p.direction == PortDirection::Input)
        .map(|p| p.id)
        .collect();

    nl.nets
        .iter()
        .filter(|net| input_pins.iter().any(|&p| net.sinks.contains(&p)))
        .map(|net| nl.pin(net.driver).cell)
        .filter(|&c| c != cell_id)
        .collect()
}

/// Finds MUXF7-style trees: a 3-input select LUT (`convert_to_pnr`'s
/// encoding of `CellKind::Mux`) together with the LUT cells feeding its
/// data inputs. This crate's cell model has no notion of a LUT6, so the
/// cluster is formed around whatever LUT cells happen to feed the select
/// LUT's inputs rather than around a specific input width.
fn find_select_clusters(nl: &PnrNetlist) -> Vec<Vec<PnrCellId>> {
    let mut clusters = Vec::new();
    for cell in &nl.cells {
        if !matches!(cell.cell_type, PnrCellType::Lut { inputs: 3, .. }) {
            continue;
        }
        let feeders: Vec<PnrCellId> = input_drivers(nl, cell.id)
            .into_iter()
            .filter(|&c| matches!(nl.cell(c).cell_type, PnrCellType::Lut { .. }))
            .collect();

        if feeders.len() >= 2 {
            let mut group = vec![cell.id];
            group.extend(feeders);
            clusters.push(group);
        }
    }
    clusters
}

/// Returns the site-type candidates a packed cluster's cell type may land
/// on, mirroring [`crate::placement::random`]'s mapping.
fn cluster_candidate_sites(arch: &dyn Architecture, cell_type: &PnrCellType) -> Vec<SiteId> {
    let site_types: &[SiteType] = match cell_type {
        PnrCellType::Carry | PnrCellType::Lut { .. } => &[SiteType::LutFf, SiteType::Alm, SiteType::Lut],
        _ => &[],
    };

    let real: Vec<SiteId> = site_types.iter().flat_map(|&t| arch.sites_of_type(t)).collect();
    if !real.is_empty() {
        return real;
    }
    (0..arch.total_luts()).map(SiteId::from_raw).collect()
}

/// Finds a run of `len` sites, adjacent in `candidates`' ordering, that are
/// all currently free. For the generated grids the site-type listing is
/// row-major, so adjacency here approximates physical adjacency; it is not
/// guaranteed for architectures exposing no real grid.
fn find_contiguous_free_run(ctx: &Context, candidates: &[SiteId], len: usize) -> Option<Vec<SiteId>> {
    if candidates.len() < len {
        return None;
    }
    let mut sorted = candidates.to_vec();
    sorted.sort_by_key(SiteId::as_raw);
    sorted
        .windows(len)
        .find(|w| w.iter().all(|&s| ctx.check_bel_avail(s, Strength::None)))
        .map(<[SiteId]>::to_vec)
}

/// Binds every cell in `cluster` to an adjacent run of free sites at
/// [`Strength::Fixed`], marking each cell fixed so placement leaves the
/// group alone. Falls back to leaving the cluster for ordinary placement,
/// with a warning, when no contiguous run of free sites is available.
fn place_cluster(ctx: &mut Context, arch: &dyn Architecture, cluster: &[PnrCellId], sink: &DiagnosticSink) {
    if cluster.len() < 2 {
        return;
    }

    let cell_type = ctx.netlist().cell(cluster[0]).cell_type.clone();
    let candidates = cluster_candidate_sites(arch, &cell_type);

    match find_contiguous_free_run(ctx, &candidates, cluster.len()) {
        Some(sites) => {
            for (&cell_id, &site) in cluster.iter().zip(sites.iter()) {
                ctx.netlist_mut().cell_mut(cell_id).is_fixed = true;
                let _ = ctx.bind_bel(cell_id, site, Strength::Fixed);
            }
        }
        None => {
            sink.emit(Diagnostic::warning(
                DiagnosticCode::new(Category::Convention, 30),
                format!(
                    "packer cluster of {} cells found no contiguous free sites; placing independently",
                    cluster.len()
                ),
                Span::DUMMY,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{PnrCell, PnrNet, PnrPin};
    use crate::ids::{PnrNetId, PnrPinId};
    use aion_arch::load_architecture;

    fn lut(name: &str, inputs: u32) -> PnrCell {
        PnrCell {
            id: PnrCellId::from_raw(0),
            name: name.into(),
            cell_type: PnrCellType::Lut {
                inputs,
                init: LogicVec::from_bool(false),
            },
            placement: None,
            is_fixed: false,
        }
    }

    fn carry(name: &str) -> PnrCell {
        PnrCell {
            id: PnrCellId::from_raw(0),
            name: name.into(),
            cell_type: PnrCellType::Carry,
            placement: None,
            is_fixed: false,
        }
    }

    fn add_pin(nl: &mut PnrNetlist, name: &str, dir: PortDirection, cell: PnrCellId) -> PnrPinId {
        nl.add_pin(PnrPin {
            id: PnrPinId::from_raw(0),
            name: name.into(),
            direction: dir,
            cell,
            net: None,
        })
    }

    #[test]
    fn lower_soft_logic_fixes_inverter_init() {
        let mut nl = PnrNetlist::new();
        nl.add_cell(lut("inv", 1));
        nl.add_cell(lut("and2", 2));
        let mut ctx = Context::new(nl);
        lower_soft_logic(&mut ctx);
        let nl = ctx.into_netlist();

        let PnrCellType::Lut { init, .. } = &nl.cells[0].cell_type else { panic!() };
        assert_eq!(init.get(0), aion_common::Logic::One);
        assert_eq!(init.get(1), aion_common::Logic::Zero);

        let PnrCellType::Lut { init, .. } = &nl.cells[1].cell_type else { panic!() };
        assert!(init.is_all_zero());
    }

    #[test]
    fn propagate_constants_fixes_dummy_driver_and_marks_net_non_critical() {
        let mut nl = PnrNetlist::new();
        let dummy = nl.add_cell(lut("dummy_driver_sig", 0));
        let sink_cell = nl.add_cell(lut("sink", 2));
        let o = add_pin(&mut nl, "O", PortDirection::Output, dummy);
        let i = add_pin(&mut nl, "I", PortDirection::Input, sink_cell);
        nl.add_net(PnrNet {
            id: PnrNetId::from_raw(0),
            name: "sig".into(),
            driver: o,
            sinks: vec![i],
            routing: None,
            timing_critical: true,
        });

        let mut ctx = Context::new(nl);
        propagate_constants(&mut ctx);
        let nl = ctx.into_netlist();

        assert!(nl.cells[0].is_fixed);
        assert!(!nl.nets[0].timing_critical);
    }

    fn chained_carry_netlist(len: usize) -> PnrNetlist {
        let mut nl = PnrNetlist::new();
        let cells: Vec<_> = (0..len).map(|i| nl.add_cell(carry(&format!("carry_{i}")))).collect();
        for i in 0..len - 1 {
            let o = add_pin(&mut nl, "CO", PortDirection::Output, cells[i]);
            let ci = add_pin(&mut nl, "CI", PortDirection::Input, cells[i + 1]);
            nl.add_net(PnrNet {
                id: PnrNetId::from_raw(0),
                name: format!("chain_{i}"),
                driver: o,
                sinks: vec![ci],
                routing: None,
                timing_critical: false,
            });
        }
        nl
    }

    #[test]
    fn find_carry_chains_splits_long_chain_into_carry4_groups() {
        let nl = chained_carry_netlist(6);
        let chains = find_carry_chains(&nl);
        let total: usize = chains.iter().map(Vec::len).sum();
        assert_eq!(total, 6);
        assert!(chains.iter().all(|c| c.len() <= CARRY_CHAIN_MAX));
        assert_eq!(chains.len(), 2); // 4 + 2
    }

    #[test]
    fn find_carry_chains_ignores_unconnected_carry_cells() {
        let mut nl = PnrNetlist::new();
        nl.add_cell(carry("lone_a"));
        nl.add_cell(carry("lone_b"));
        assert!(find_carry_chains(&nl).is_empty());
    }

    #[test]
    fn find_select_clusters_detects_mux_tree() {
        let mut nl = PnrNetlist::new();
        let lut_a = nl.add_cell(lut("lut_a", 4));
        let lut_b = nl.add_cell(lut("lut_b", 4));
        let mux = nl.add_cell(lut("mux_sel", 3));

        let oa = add_pin(&mut nl, "O", PortDirection::Output, lut_a);
        let ob = add_pin(&mut nl, "O", PortDirection::Output, lut_b);
        let ia = add_pin(&mut nl, "I0", PortDirection::Input, mux);
        let ib = add_pin(&mut nl, "I1", PortDirection::Input, mux);

        nl.add_net(PnrNet {
            id: PnrNetId::from_raw(0),
            name: "a".into(),
            driver: oa,
            sinks: vec![ia],
            routing: None,
            timing_critical: false,
        });
        nl.add_net(PnrNet {
            id: PnrNetId::from_raw(0),
            name: "b".into(),
            driver: ob,
            sinks: vec![ib],
            routing: None,
            timing_critical: false,
        });

        let clusters = find_select_clusters(&nl);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 3);
        assert!(clusters[0].contains(&mux));
        assert!(clusters[0].contains(&lut_a));
        assert!(clusters[0].contains(&lut_b));
    }

    #[test]
    fn pack_binds_carry_chain_to_adjacent_fixed_sites() {
        let nl = chained_carry_netlist(4);
        let arch = load_architecture("cyclone_iv", "EP4CE22F17C6N").unwrap();
        let sink = DiagnosticSink::new();
        let mut ctx = Context::new(nl);
        pack(&mut ctx, &*arch, &sink);
        let nl = ctx.into_netlist();

        assert!(nl.cells.iter().all(|c| c.is_fixed));
        let sites: HashSet<_> = nl.cells.iter().map(|c| c.placement.unwrap()).collect();
        assert_eq!(sites.len(), 4);
    }

    #[test]
    fn pack_is_a_no_op_on_an_empty_netlist() {
        let arch = load_architecture("artix7", "xc7a100tcsg324-1").unwrap();
        let sink = DiagnosticSink::new();
        let mut ctx = Context::new(PnrNetlist::new());
        pack(&mut ctx, &*arch, &sink);
        assert_eq!(ctx.into_netlist().cell_count(), 0);
    }
}
