//! The PnR context: a [`PnrNetlist`] plus the live bel/wire/pip occupancy.
//!
//! `PnrNetlist` records each cell's placement and each net's route tree, but
//! not the reverse mapping (which cell sits on a given bel, which net owns a
//! given wire or pip) or the [`Strength`] each binding was made with. placer
//! and router. Every bind/unbind goes through a `Context` so the forward
//! (netlist) and reverse (occupancy) views can never drift apart, and so an
//! attempt to steal a resource from a stronger binding fails instead of
//! silently overwriting it.

use crate::data::PnrNetlist;
use crate::ids::{PnrCellId, PnrNetId};
use crate::strength::Strength;
use aion_arch::ids::{PipId, SiteId, WireId};
use aion_common::{AionResult, InternalError};
use std::collections::HashMap;

/// A netlist together with its live bel, wire, and pip bindings.
#[derive(Debug, Clone, Default)]
pub struct Context {
    netlist: PnrNetlist,
    bel_to_cell: HashMap<SiteId, (PnrCellId, Strength)>,
    wire_to_net: HashMap<WireId, (PnrNetId, Strength)>,
    pip_to_net: HashMap<PipId, (PnrNetId, Strength)>,
}

impl Context {
    /// Wraps `netlist`, rebuilding bel occupancy from any pre-existing
    /// placements at [`Strength::Strong`].
    pub fn new(netlist: PnrNetlist) -> Self {
        let mut ctx = Self {
            netlist,
            bel_to_cell: HashMap::new(),
            wire_to_net: HashMap::new(),
            pip_to_net: HashMap::new(),
        };
        for cell in &ctx.netlist.cells {
            if let Some(site) = cell.placement {
                ctx.bel_to_cell.insert(site, (cell.id, Strength::Strong));
            }
        }
        ctx
    }

    /// Borrows the underlying netlist.
    pub fn netlist(&self) -> &PnrNetlist {
        &self.netlist
    }

    /// Borrows the underlying netlist mutably, bypassing occupancy
    /// bookkeeping. Only safe for reads or for edits that don't touch
    /// placement/routing fields; prefer `bind_*`/`unbind_*` otherwise.
    pub fn netlist_mut(&mut self) -> &mut PnrNetlist {
        &mut self.netlist
    }

    /// Consumes the context, discarding occupancy bookkeeping.
    pub fn into_netlist(self) -> PnrNetlist {
        self.netlist
    }

    /// Returns the cell occupying `bel`, with its binding strength.
    pub fn bel_occupant(&self, bel: SiteId) -> Option<(PnrCellId, Strength)> {
        self.bel_to_cell.get(&bel).copied()
    }

    /// Returns whether `bel` is free, or bound no more strongly than `threshold`.
    pub fn check_bel_avail(&self, bel: SiteId, threshold: Strength) -> bool {
        match self.bel_to_cell.get(&bel) {
            None => true,
            Some((_, strength)) => strength.rippable_at(threshold),
        }
    }

    /// Binds `cell` to `bel` at the given strength.
    ///
    /// Fails if `bel` is already occupied by a different cell at a strength
    /// that exceeds `strength`. Moves the cell off its previous bel, if any.
    pub fn bind_bel(&mut self, cell: PnrCellId, bel: SiteId, strength: Strength) -> AionResult<()> {
        if let Some((occupant, existing)) = self.bel_to_cell.get(&bel).copied() {
            if occupant != cell && !existing.rippable_at(strength) {
                return Err(InternalError::new(format!(
                    "bel {bel:?} is held by cell {occupant:?} at strength {existing:?}, \
                     cannot bind cell {cell:?} at {strength:?}"
                )));
            }
        }
        if let Some(prev_bel) = self.netlist.cell(cell).placement {
            if prev_bel != bel {
                self.bel_to_cell.remove(&prev_bel);
            }
        }
        self.bel_to_cell.insert(bel, (cell, strength));
        self.netlist.cell_mut(cell).placement = Some(bel);
        Ok(())
    }

    /// Unbinds `cell` from its current bel.
    ///
    /// Fails if the cell is not currently placed.
    pub fn unbind_bel(&mut self, cell: PnrCellId) -> AionResult<()> {
        let bel = self.netlist.cell(cell).placement.ok_or_else(|| {
            InternalError::new(format!("cell {cell:?} has no bel binding to unbind"))
        })?;
        self.bel_to_cell.remove(&bel);
        self.netlist.cell_mut(cell).placement = None;
        Ok(())
    }

    /// Returns the net occupying `wire`, with its binding strength.
    pub fn wire_occupant(&self, wire: WireId) -> Option<(PnrNetId, Strength)> {
        self.wire_to_net.get(&wire).copied()
    }

    /// Returns whether `wire` is free, or bound no more strongly than `threshold`.
    pub fn check_wire_avail(&self, wire: WireId, threshold: Strength) -> bool {
        match self.wire_to_net.get(&wire) {
            None => true,
            Some((_, strength)) => strength.rippable_at(threshold),
        }
    }

    /// Binds `wire` to `net` at the given strength.
    ///
    /// Fails if `wire` is already bound to a different net at a strength
    /// that exceeds `strength`; rebinding the same net at a new strength
    /// always succeeds.
    pub fn bind_wire(&mut self, net: PnrNetId, wire: WireId, strength: Strength) -> AionResult<()> {
        if let Some((occupant, existing)) = self.wire_to_net.get(&wire).copied() {
            if occupant != net && !existing.rippable_at(strength) {
                return Err(InternalError::new(format!(
                    "wire {wire:?} is held by net {occupant:?} at strength {existing:?}, \
                     cannot bind net {net:?} at {strength:?}"
                )));
            }
        }
        self.wire_to_net.insert(wire, (net, strength));
        Ok(())
    }

    /// Unbinds `wire`, whatever net currently holds it.
    ///
    /// Fails if `wire` is not currently bound.
    pub fn unbind_wire(&mut self, wire: WireId) -> AionResult<()> {
        self.wire_to_net
            .remove(&wire)
            .map(|_| ())
            .ok_or_else(|| InternalError::new(format!("wire {wire:?} was not bound")))
    }

    /// Returns the net occupying `pip`, with its binding strength.
    pub fn pip_occupant(&self, pip: PipId) -> Option<(PnrNetId, Strength)> {
        self.pip_to_net.get(&pip).copied()
    }

    /// Returns whether `pip` is free, or bound no more strongly than `threshold`.
    pub fn check_pip_avail(&self, pip: PipId, threshold: Strength) -> bool {
        match self.pip_to_net.get(&pip) {
            None => true,
            Some((_, strength)) => strength.rippable_at(threshold),
        }
    }

    /// Like [`check_pip_avail`](Self::check_pip_avail), but a pip already
    /// bound to `net` itself is always available (reusing a pip for the
    /// same net's fanout is not a conflict).
    pub fn check_pip_avail_for_net(&self, pip: PipId, net: PnrNetId, threshold: Strength) -> bool {
        match self.pip_to_net.get(&pip) {
            None => true,
            Some((occupant, _)) if *occupant == net => true,
            Some((_, strength)) => strength.rippable_at(threshold),
        }
    }

    /// Binds `pip` to `net` at the given strength.
    pub fn bind_pip(&mut self, net: PnrNetId, pip: PipId, strength: Strength) -> AionResult<()> {
        if let Some((occupant, existing)) = self.pip_to_net.get(&pip).copied() {
            if occupant != net && !existing.rippable_at(strength) {
                return Err(InternalError::new(format!(
                    "pip {pip:?} is held by net {occupant:?} at strength {existing:?}, \
                     cannot bind net {net:?} at {strength:?}"
                )));
            }
        }
        self.pip_to_net.insert(pip, (net, strength));
        Ok(())
    }

    /// Unbinds `pip`, whatever net currently holds it.
    ///
    /// Fails if `pip` is not currently bound.
    pub fn unbind_pip(&mut self, pip: PipId) -> AionResult<()> {
        self.pip_to_net
            .remove(&pip)
            .map(|_| ())
            .ok_or_else(|| InternalError::new(format!("pip {pip:?} was not bound")))
    }

    /// Unbinds every wire and pip currently held by `net`.
    pub fn ripup_net(&mut self, net: PnrNetId) {
        self.wire_to_net.retain(|_, (n, _)| *n != net);
        self.pip_to_net.retain(|_, (n, _)| *n != net);
    }
}
