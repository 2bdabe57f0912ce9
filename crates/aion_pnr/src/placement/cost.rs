//! Placement cost functions.
//!
//! Evaluates the quality of a placement using half-perimeter wire length (HPWL),
//! timing-critical path delays, and congestion estimates. The total cost is a
//! weighted sum used by simulated annealing to guide placement optimization.

#[cfg(test)]
use crate::data::PnrCell;
use crate::data::PnrNetlist;
use crate::ids::PnrNetId;

/// Weights for the placement cost function components.
#[derive(Debug, Clone)]
pub struct PlacementCost {
    /// Weight for wire length (HPWL) component.
    pub weight_wirelength: f64,
    /// Weight for timing component.
    pub weight_timing: f64,
    /// Weight for congestion component.
    pub weight_congestion: f64,
}

impl Default for PlacementCost {
    fn default() -> Self {
        Self {
            weight_wirelength: 1.0,
            weight_timing: 0.5,
            weight_congestion: 0.1,
        }
    }
}

impl PlacementCost {
    /// Computes the total placement cost for the current netlist state.
    ///
    /// Equivalent to `total_cost_with_criticality(netlist, None)`: wirelength
    /// only, with no timing term. Congestion is folded into the router's own
    /// cost model rather than the placer's.
    pub fn total_cost(&self, netlist: &PnrNetlist) -> f64 {
        self.total_cost_with_criticality(netlist, None)
    }

    /// Computes the total placement cost, optionally weighting each net's
    /// HPWL contribution by its timing criticality (0.0-1.0, from
    /// [`crate::timing_bridge::net_criticality_map`]).
    ///
    /// A net at criticality `c` contributes `(1 + weight_timing * c)` times
    /// its plain HPWL, so a fully critical net's wirelength matters
    /// `1 + weight_timing` times as much as a non-critical one's.
    pub fn total_cost_with_criticality(
        &self,
        netlist: &PnrNetlist,
        criticality: Option<&std::collections::HashMap<PnrNetId, f64>>,
    ) -> f64 {
        let mut total = 0.0;
        for i in 0..netlist.nets.len() {
            let net_id = PnrNetId::from_raw(i as u32);
            let hpwl = net_hpwl(netlist, net_id);
            let crit = criticality
                .and_then(|map| map.get(&net_id))
                .copied()
                .unwrap_or(0.0);
            total += self.weight_wirelength * hpwl * (1.0 + self.weight_timing * crit);
        }
        total
    }

    /// Computes the incremental cost change from swapping two cells.
    ///
    /// Only recomputes the HPWL for nets affected by the swapped cells,
    /// rather than recomputing the entire cost from scratch.
    pub fn incremental_cost(&self, netlist: &PnrNetlist, affected_nets: &[PnrNetId]) -> f64 {
        self.incremental_cost_with_criticality(netlist, affected_nets, None)
    }

    /// Like [`incremental_cost`](Self::incremental_cost), but timing-weighted
    /// the same way as [`total_cost_with_criticality`](Self::total_cost_with_criticality).
    pub fn incremental_cost_with_criticality(
        &self,
        netlist: &PnrNetlist,
        affected_nets: &[PnrNetId],
        criticality: Option<&std::collections::HashMap<PnrNetId, f64>>,
    ) -> f64 {
        let mut cost = 0.0;
        for &net_id in affected_nets {
            let hpwl = net_hpwl(netlist, net_id);
            let crit = criticality
                .and_then(|map| map.get(&net_id))
                .copied()
                .unwrap_or(0.0);
            cost += self.weight_wirelength * hpwl * (1.0 + self.weight_timing * crit);
        }
        cost
    }
}

/// Computes the total half-perimeter wire length across all nets.
///
/// HPWL is the half-perimeter of the bounding box of all pins on each net.
/// It is the standard placement metric — minimizing HPWL tends to produce
/// good routability and timing.
pub fn total_hpwl(netlist: &PnrNetlist) -> f64 {
    let mut total = 0.0;
    for i in 0..netlist.nets.len() {
        let net_id = PnrNetId::from_raw(i as u32);
        total += net_hpwl(netlist, net_id);
    }
    total
}

/// Synthetic grid width used to turn a raw site index into (x, y)
/// coordinates when the architecture doesn't expose real tile geometry.
pub(crate) const SYNTHETIC_GRID_WIDTH: u32 = 100;

/// Computes the HPWL for a single net.
///
/// Uses synthetic site coordinates (site_id / grid_width for row, site_id % grid_width
/// for column) since the actual grid is not populated in Phase 2.
fn net_hpwl(netlist: &PnrNetlist, net_id: PnrNetId) -> f64 {
    let net = netlist.net(net_id);

    // Collect all pin cell positions
    let mut min_x: i64 = i64::MAX;
    let mut max_x: i64 = i64::MIN;
    let mut min_y: i64 = i64::MAX;
    let mut max_y: i64 = i64::MIN;

    let grid_width = SYNTHETIC_GRID_WIDTH;

    let driver_cell = netlist.pin(net.driver).cell;
    if let Some(site) = netlist.cell(driver_cell).placement {
        let (x, y) = site_to_coords(site.as_raw(), grid_width);
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    for &sink_pin in &net.sinks {
        let sink_cell = netlist.pin(sink_pin).cell;
        if let Some(site) = netlist.cell(sink_cell).placement {
            let (x, y) = site_to_coords(site.as_raw(), grid_width);
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }
    }

    if min_x == i64::MAX {
        return 0.0;
    }

    (max_x - min_x + max_y - min_y) as f64
}

/// Converts a synthetic site ID to grid coordinates.
pub(crate) fn site_to_coords(site_raw: u32, grid_width: u32) -> (i64, i64) {
    let x = (site_raw % grid_width) as i64;
    let y = (site_raw / grid_width) as i64;
    (x, y)
}

/// Returns the list of net IDs affected by swapping two cells.
#[cfg(test)]
pub fn affected_nets(netlist: &PnrNetlist, cell_a: &PnrCell, cell_b: &PnrCell) -> Vec<PnrNetId> {
    let mut nets = std::collections::HashSet::new();

    // Find nets connected to either cell
    for pin in &netlist.pins {
        if pin.cell == cell_a.id || pin.cell == cell_b.id {
            if let Some(net_id) = pin.net {
                nets.insert(net_id);
            }
        }
    }

    // Also check net drivers/sinks
    for (i, net) in netlist.nets.iter().enumerate() {
        let driver_cell = netlist.pin(net.driver).cell;
        if driver_cell == cell_a.id || driver_cell == cell_b.id {
            nets.insert(PnrNetId::from_raw(i as u32));
        }
        for &sink in &net.sinks {
            let sink_cell = netlist.pin(sink).cell;
            if sink_cell == cell_a.id || sink_cell == cell_b.id {
                nets.insert(PnrNetId::from_raw(i as u32));
            }
        }
    }

    nets.into_iter().collect()
}
