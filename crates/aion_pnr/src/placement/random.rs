//! Random initial placement.
//!
//! Assigns each unplaced cell to a random compatible site, binding it into
//! the [`Context`] at [`Strength::Weak`] (or [`Strength::Fixed`] for cells
//! the netlist already marks fixed) so later passes can tell a starting
//! guess from a pinned location. Where the architecture exposes a real grid
//! ([`Architecture::sites_of_type`] returns something), candidates are drawn
//! from the families of site actually present; architectures with no grid
//! model fall back to a synthetic site-ID range derived from resource counts.

use crate::context::Context;
use crate::data::PnrCellType;
use crate::strength::Strength;
use aion_arch::ids::SiteId;
use aion_arch::types::SiteType;
use aion_arch::Architecture;
use aion_diagnostics::DiagnosticSink;
use rand::Rng;

/// Assigns each unplaced cell to a random site.
pub(crate) fn random_placement(ctx: &mut Context, arch: &dyn Architecture, _sink: &DiagnosticSink) {
    let mut rng = rand::thread_rng();

    // Synthetic site ID ranges, used only when the architecture has no real
    // grid to draw candidates from.
    let lut_base: u32 = 0;
    let lut_max = arch.total_luts();
    let ff_base = lut_max;
    let ff_max = ff_base + arch.total_ffs();
    let bram_base = ff_max;
    let bram_max = bram_base + arch.total_bram();
    let dsp_base = bram_max;
    let dsp_max = dsp_base + arch.total_dsp();
    let io_base = dsp_max;
    let io_max = io_base + arch.total_io();
    let pll_base = io_max;
    let pll_max = pll_base + arch.total_pll();

    let synthetic_range = |cell_type: &PnrCellType| -> (u32, u32) {
        match cell_type {
            PnrCellType::Lut { .. } | PnrCellType::Carry => (lut_base, lut_max),
            PnrCellType::Dff => (ff_base, ff_max),
            PnrCellType::Bram(_) => (bram_base, bram_max),
            PnrCellType::Dsp(_) => (dsp_base, dsp_max),
            PnrCellType::Iobuf { .. } => (io_base, io_max),
            PnrCellType::Pll(_) => (pll_base, pll_max),
        }
    };

    let cell_ids: Vec<_> = ctx.netlist().cells.iter().map(|c| c.id).collect();
    for cell_id in cell_ids {
        let cell = ctx.netlist().cell(cell_id);
        if cell.is_fixed && cell.placement.is_some() {
            continue;
        }
        let is_fixed = cell.is_fixed;
        let cell_type = cell.cell_type.clone();

        let real_candidates = candidate_site_types(&cell_type)
            .iter()
            .flat_map(|&t| arch.sites_of_type(t))
            .collect::<Vec<_>>();

        let chosen = if !real_candidates.is_empty() {
            find_unused_site_from_list(&mut rng, &real_candidates, ctx)
        } else {
            let (base, max) = synthetic_range(&cell_type);
            find_unused_site_in_range(&mut rng, base, max, ctx)
        };

        if let Some(site) = chosen {
            let strength = if is_fixed {
                Strength::Fixed
            } else {
                Strength::Weak
            };
            let _ = ctx.bind_bel(cell_id, site, strength);
        }
    }
}

/// Returns the families of site a cell type may legally occupy, in
/// preference order.
fn candidate_site_types(cell_type: &PnrCellType) -> &'static [SiteType] {
    match cell_type {
        PnrCellType::Lut { .. } | PnrCellType::Carry => {
            &[SiteType::LutFf, SiteType::Alm, SiteType::Lut]
        }
        PnrCellType::Dff => &[SiteType::LutFf, SiteType::Alm, SiteType::Ff],
        PnrCellType::Bram(_) => &[SiteType::BramSite],
        PnrCellType::Dsp(_) => &[SiteType::DspSite],
        PnrCellType::Iobuf { .. } => &[SiteType::IoPad],
        PnrCellType::Pll(_) => &[SiteType::Pll],
    }
}

/// Picks an unoccupied site from a real, architecture-reported candidate list.
fn find_unused_site_from_list(
    rng: &mut impl Rng,
    candidates: &[SiteId],
    ctx: &Context,
) -> Option<SiteId> {
    if candidates.is_empty() {
        return None;
    }

    for _ in 0..100 {
        let site = candidates[rng.gen_range(0..candidates.len())];
        if ctx.check_bel_avail(site, Strength::None) {
            return Some(site);
        }
    }

    candidates
        .iter()
        .copied()
        .find(|&site| ctx.check_bel_avail(site, Strength::None))
}

/// Picks an unoccupied site ID in a synthetic `[base, max)` range.
fn find_unused_site_in_range(rng: &mut impl Rng, base: u32, max: u32, ctx: &Context) -> Option<SiteId> {
    if base >= max {
        return None;
    }

    for _ in 0..100 {
        let site = SiteId::from_raw(rng.gen_range(base..max));
        if ctx.check_bel_avail(site, Strength::None) {
            return Some(site);
        }
    }

    (base..max)
        .map(SiteId::from_raw)
        .find(|&site| ctx.check_bel_avail(site, Strength::None))
}
