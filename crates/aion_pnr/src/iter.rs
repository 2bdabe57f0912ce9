//! Iterator algebra over a device's bels, wires, and pips.
//!
//! The router walks "downhill" (driven) and "uphill" (driving) pips of a
//! wire on every expansion step, so that lookup has to be O(1) rather than
//! a linear scan of every pip in the device. [`WireAdjacency`] builds the
//! reverse index once per architecture and hands out plain slice iterators
//! over it; [`SiteBels`] does the same for a site's BEL list, which is
//! already contiguous and needs no index.

use aion_arch::ids::{BelId, PipId, WireId};
use aion_arch::types::{Bel, RoutingGraph};
use std::collections::HashMap;

/// A reverse index from wire to the pips it drives and the pips that drive it.
///
/// Built once from a [`RoutingGraph`]; every `downhill_pips`/`uphill_pips`
/// call afterward is a single hash lookup plus a slice iterator.
#[derive(Debug, Clone, Default)]
pub struct WireAdjacency {
    downhill: HashMap<WireId, Vec<PipId>>,
    uphill: HashMap<WireId, Vec<PipId>>,
}

impl WireAdjacency {
    /// Builds the adjacency index from every pip in `graph`.
    pub fn build(graph: &RoutingGraph) -> Self {
        let mut downhill: HashMap<WireId, Vec<PipId>> = HashMap::new();
        let mut uphill: HashMap<WireId, Vec<PipId>> = HashMap::new();
        for pip in &graph.pips {
            downhill.entry(pip.src_wire).or_default().push(pip.id);
            uphill.entry(pip.dst_wire).or_default().push(pip.id);
        }
        Self { downhill, uphill }
    }

    /// Returns the pips driven by `wire` (i.e. `wire` is their source).
    pub fn downhill_pips(&self, wire: WireId) -> PipIdIter<'_> {
        PipIdIter::new(self.downhill.get(&wire))
    }

    /// Returns the pips that drive `wire` (i.e. `wire` is their destination).
    pub fn uphill_pips(&self, wire: WireId) -> PipIdIter<'_> {
        PipIdIter::new(self.uphill.get(&wire))
    }
}

/// An O(1)-per-step iterator over a precomputed list of pip IDs.
pub struct PipIdIter<'a> {
    inner: std::slice::Iter<'a, PipId>,
}

impl<'a> PipIdIter<'a> {
    fn new(pips: Option<&'a Vec<PipId>>) -> Self {
        const EMPTY: &[PipId] = &[];
        Self {
            inner: pips.map(|v| v.as_slice()).unwrap_or(EMPTY).iter(),
        }
    }
}

impl Iterator for PipIdIter<'_> {
    type Item = PipId;

    fn next(&mut self) -> Option<PipId> {
        self.inner.next().copied()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for PipIdIter<'_> {}

/// An O(1)-per-step iterator over the BELs of a site.
pub struct SiteBels<'a> {
    inner: std::slice::Iter<'a, Bel>,
}

impl<'a> SiteBels<'a> {
    /// Iterates the BELs in `bels` in declaration order.
    pub fn new(bels: &'a [Bel]) -> Self {
        Self { inner: bels.iter() }
    }
}

impl<'a> Iterator for SiteBels<'a> {
    type Item = &'a Bel;

    fn next(&mut self) -> Option<&'a Bel> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for SiteBels<'_> {}

/// Returns the IDs of the BELs in `bels`, in declaration order.
pub fn bel_ids(bels: &[Bel]) -> impl Iterator<Item = BelId> + '_ {
    SiteBels::new(bels).map(|b| b.id)
}
