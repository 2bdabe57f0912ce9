//! Simulated annealing placement refinement.
//!
//! Starting from an initial random placement, repeatedly proposes cell swaps
//! or relocations and accepts/rejects each move using the Metropolis criterion.
//! The temperature decreases geometrically, reducing the acceptance probability
//! of cost-increasing moves over time.

use crate::context::Context;
use crate::data::PnrCellType;
use crate::ids::PnrCellId;
use crate::ids::PnrNetId;
use crate::placement::cost::PlacementCost;
use crate::settings::Settings;
use crate::strength::Strength;
use aion_arch::ids::SiteId;
use aion_arch::Architecture;
use aion_diagnostics::DiagnosticSink;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// Minimum temperature threshold to stop annealing.
const MIN_TEMPERATURE: f64 = 0.001;

/// Number of consecutive non-improving temperature steps at or below
/// [`MIN_TEMPERATURE`] before annealing is declared converged.
const NON_IMPROVING_LIMIT: usize = 5;

/// Scale factor in the Metropolis acceptance probability
/// `exp(-SCALE * delta_cost / temperature)`.
const METROPOLIS_SCALE: f64 = 100.0;

/// Number of moves per temperature step, as a multiplier of cell count.
const MOVES_PER_TEMP_MULTIPLIER: usize = 10;

/// Smallest swap-candidate search radius (in site raw-index distance).
const MIN_DIAMETER: i64 = 4;

/// Largest swap-candidate search radius (in site raw-index distance).
const MAX_DIAMETER: i64 = 10_000;

/// The outcome of one temperature step, used to pick the next band.
struct StepStats {
    acceptance_rate: f64,
}

/// Picks the next temperature and search diameter from the previous step's
/// acceptance rate, following a four-band adaptive schedule (after VPR/
/// nextpnr's placer1): a high acceptance rate cools aggressively since the
/// placement is still loose, a low rate cools gently and shrinks the move
/// radius since most proposals are already being rejected.
fn next_band(stats: &StepStats, temperature: f64, diameter: i64) -> (f64, i64) {
    let r = stats.acceptance_rate;
    if r >= 0.8 {
        (temperature * 0.7, diameter)
    } else if r >= 0.6 {
        (temperature * 0.9, (diameter * 3 / 2).min(MAX_DIAMETER))
    } else if r >= 0.4 {
        (temperature * 0.95, diameter)
    } else {
        (temperature * 0.8, (diameter * 2 / 3).max(MIN_DIAMETER))
    }
}

/// Refines cell placement using simulated annealing.
///
/// Proposes random cell swaps and relocations, accepting moves that decrease
/// cost and probabilistically accepting cost-increasing moves based on the
/// Boltzmann probability `exp(-100 * delta_cost / temperature)`. The
/// temperature and swap-candidate search diameter are both adapted each step
/// from the previous step's acceptance rate (see [`next_band`]). Annealing
/// stops once [`NON_IMPROVING_LIMIT`] consecutive temperature steps fail to
/// improve the cost while at or below [`MIN_TEMPERATURE`] — a flat
/// temperature cutoff alone can stop while moves are still finding
/// improvements.
///
/// `criticality`, when given, weights each net's contribution to cost by its
/// timing criticality (see [`PlacementCost::total_cost_with_criticality`]),
/// so a re-anneal pass after static timing analysis can pull critical nets
/// tighter without re-running placement from scratch.
pub(crate) fn simulated_annealing(
    ctx: &mut Context,
    _arch: &dyn Architecture,
    settings: &Settings,
    criticality: Option<&HashMap<PnrNetId, f64>>,
    _sink: &DiagnosticSink,
) {
    let num_cells = ctx.netlist().cell_count();
    if num_cells < 2 {
        return;
    }

    let cost_fn = PlacementCost::default();
    let seed = settings.get_int("seed", 1) as u64;
    let mut rng = StdRng::seed_from_u64(seed);

    // Initial temperature proportional to sqrt(cell count)
    let mut temperature = (num_cells as f64).sqrt() * 2.0;
    let mut diameter = MAX_DIAMETER;
    let moves_per_temp = (MOVES_PER_TEMP_MULTIPLIER * num_cells).max(10);

    let mut current_cost = cost_fn.total_cost_with_criticality(ctx.netlist(), criticality);
    let mut non_improving_streak = 0usize;

    loop {
        let cost_before_step = current_cost;
        let mut accepted = 0;

        for _ in 0..moves_per_temp {
            // Select two random non-fixed cells for swapping
            let (cell_a, cell_b) = match select_swap_pair(&mut rng, ctx.netlist(), diameter) {
                Some(pair) => pair,
                None => continue,
            };

            let site_a = ctx.netlist().cell(cell_a).placement;
            let site_b = ctx.netlist().cell(cell_b).placement;
            apply_swap(ctx, cell_a, cell_b, site_b, site_a);

            let new_cost = cost_fn.total_cost_with_criticality(ctx.netlist(), criticality);
            let delta = new_cost - current_cost;

            // Metropolis criterion
            if delta < 0.0 || rng.gen::<f64>() < (-METROPOLIS_SCALE * delta / temperature).exp() {
                current_cost = new_cost;
                accepted += 1;
            } else {
                // Reject: undo swap
                apply_swap(ctx, cell_a, cell_b, site_a, site_b);
            }
        }

        if current_cost < cost_before_step {
            non_improving_streak = 0;
        } else {
            non_improving_streak += 1;
        }

        let acceptance_rate = accepted as f64 / moves_per_temp as f64;
        let (next_temperature, next_diameter) =
            next_band(&StepStats { acceptance_rate }, temperature, diameter);
        temperature = next_temperature;
        diameter = next_diameter;

        if temperature <= MIN_TEMPERATURE && non_improving_streak >= NON_IMPROVING_LIMIT {
            break;
        }
    }
}

/// Moves `cell_a` to `new_a` and `cell_b` to `new_b` (either may be
/// unplaced), unbinding both first so neither bind call can observe the
/// other's stale occupancy entry.
fn apply_swap(
    ctx: &mut Context,
    cell_a: PnrCellId,
    cell_b: PnrCellId,
    new_a: Option<SiteId>,
    new_b: Option<SiteId>,
) {
    let _ = ctx.unbind_bel(cell_a);
    let _ = ctx.unbind_bel(cell_b);
    if let Some(site) = new_a {
        let _ = ctx.bind_bel(cell_a, site, Strength::Weak);
    }
    if let Some(site) = new_b {
        let _ = ctx.bind_bel(cell_b, site, Strength::Weak);
    }
}

/// Selects two non-fixed cells of compatible types for swapping, restricted
/// to a site raw-index distance of at most `diameter` (the VPR-style
/// adaptive move radius; see [`next_band`]).
///
/// Returns their cell IDs, or `None` if no valid pair exists.
fn select_swap_pair(
    rng: &mut impl Rng,
    netlist: &crate::data::PnrNetlist,
    diameter: i64,
) -> Option<(PnrCellId, PnrCellId)> {
    let num_cells = netlist.cells.len();
    if num_cells < 2 {
        return None;
    }

    // Try random pairs up to 50 times
    for _ in 0..50 {
        let a = rng.gen_range(0..num_cells);
        let b = rng.gen_range(0..num_cells);

        if a == b {
            continue;
        }

        let cell_a = &netlist.cells[a];
        let cell_b = &netlist.cells[b];

        // Don't swap fixed cells
        if cell_a.is_fixed || cell_b.is_fixed {
            continue;
        }

        // Only swap cells of the same general type (LUT↔LUT, FF↔FF)
        if !cell_type_compatible(&cell_a.cell_type, &cell_b.cell_type) {
            continue;
        }

        if let (Some(site_a), Some(site_b)) = (cell_a.placement, cell_b.placement) {
            let dist = (site_a.as_raw() as i64 - site_b.as_raw() as i64).abs();
            if dist > diameter {
                continue;
            }
        }

        return Some((cell_a.id, cell_b.id));
    }

    None
}

/// Returns whether two cell types can swap placement locations.
fn cell_type_compatible(a: &PnrCellType, b: &PnrCellType) -> bool {
    matches!(
        (a, b),
        (PnrCellType::Lut { .. }, PnrCellType::Lut { .. })
            | (PnrCellType::Dff, PnrCellType::Dff)
            | (PnrCellType::Carry, PnrCellType::Carry)
            | (PnrCellType::Carry, PnrCellType::Lut { .. })
            | (PnrCellType::Lut { .. }, PnrCellType::Carry)
            | (PnrCellType::Bram(_), PnrCellType::Bram(_))
            | (PnrCellType::Dsp(_), PnrCellType::Dsp(_))
            | (PnrCellType::Iobuf { .. }, PnrCellType::Iobuf { .. })
            | (PnrCellType::Pll(_), PnrCellType::Pll(_))
    )
}
