//! Procedural tile/site/wire/pip grid generation, shared across families.
//!
//! The [`Architecture`](crate::Architecture) trait's Phase 3 methods
//! (`grid_dimensions`, `get_tile`, `get_site`, `sites_of_type`,
//! `routing_graph`, `pip_delay`, `wire_delay`) default to an empty grid —
//! correct for resource accounting, useless for placement and routing.
//! [`GeneratedGrid`] builds a real, synthetic-but-connected grid from a
//! family's resource counts and LUT width, so every family gets working
//! bels/wires/pips for free by calling [`GeneratedGrid::build`] once at
//! construction and delegating its Phase 3 methods to the result.
//!
//! The grid shape: a rectangular core of logic tiles (one [`SiteType::Alm`]-
//! or [`SiteType::LutFf`]-style site per tile, sized to the family's LUT
//! width), periodic BRAM and DSP tiles interleaved every few columns, and a
//! one-tile perimeter ring of I/O tiles. Tiles are connected by a local
//! mesh: one wire per cardinal direction linking each tile to its neighbour,
//! plus intra-tile pips from each bel's output to the tile's outgoing wires.

use crate::ids::{BelId, PipId, SiteId, WireId};
use crate::types::{Bel, BelType, Delay, Pip, RoutingGraph, Site, SiteType, Tile, TileType, Wire};
use std::collections::HashMap;

/// Resource counts and geometry hints used to generate a device grid.
#[derive(Debug, Clone, Copy)]
pub struct GridConfig {
    /// Number of logic sites (LUT+FF pairs, or ALMs) to provide.
    pub logic_sites: u32,
    /// Number of block RAM sites to provide.
    pub bram_sites: u32,
    /// Number of DSP sites to provide.
    pub dsp_sites: u32,
    /// Number of I/O sites to provide.
    pub io_sites: u32,
    /// LUT input count for this family (drives bel-pin counts per site).
    pub lut_width: u32,
}

/// A procedurally generated device grid: tiles, sites, and a routing mesh.
#[derive(Debug, Clone)]
pub struct GeneratedGrid {
    cols: u32,
    rows: u32,
    tiles: Vec<Tile>,
    sites: Vec<Site>,
    routing: RoutingGraph,
    site_wire: HashMap<SiteId, WireId>,
}

impl GeneratedGrid {
    /// Builds a grid from the given resource configuration.
    ///
    /// Lays out a square-ish core of logic tiles large enough to hold
    /// `logic_sites`, reserves every 8th interior column for a BRAM tile and
    /// every 16th for a DSP tile (until each budget is exhausted), and wraps
    /// the result in a one-tile ring of I/O tiles.
    pub fn build(config: &GridConfig) -> Self {
        let core_side = (config.logic_sites as f64).sqrt().ceil().max(1.0) as u32;
        let cols = core_side + 2;
        let rows = core_side + 2;

        let mut tiles = vec![
            Tile {
                col: 0,
                row: 0,
                tile_type: TileType::Empty,
                sites: Vec::new(),
            };
            (cols * rows) as usize
        ];
        let mut sites = Vec::new();
        let mut remaining_bram = config.bram_sites;
        let mut remaining_dsp = config.dsp_sites;
        let mut remaining_logic = config.logic_sites;
        let mut remaining_io = config.io_sites;

        for row in 0..rows {
            for col in 0..cols {
                let idx = (row * cols + col) as usize;
                let is_perimeter = col == 0 || row == 0 || col == cols - 1 || row == rows - 1;

                let (tile_type, site) = if is_perimeter {
                    if remaining_io > 0 {
                        remaining_io -= 1;
                        let site_id = SiteId::from_raw(sites.len() as u32);
                        (
                            TileType::Io,
                            Some(Self::make_site(site_id, SiteType::IoPad, col, row, 1)),
                        )
                    } else {
                        (TileType::Empty, None)
                    }
                } else if col % 16 == 0 && remaining_dsp > 0 {
                    remaining_dsp -= 1;
                    let site_id = SiteId::from_raw(sites.len() as u32);
                    (
                        TileType::Dsp,
                        Some(Self::make_site(site_id, SiteType::DspSite, col, row, 1)),
                    )
                } else if col % 8 == 0 && remaining_bram > 0 {
                    remaining_bram -= 1;
                    let site_id = SiteId::from_raw(sites.len() as u32);
                    (
                        TileType::Bram,
                        Some(Self::make_site(site_id, SiteType::BramSite, col, row, 1)),
                    )
                } else if remaining_logic > 0 {
                    remaining_logic -= 1;
                    let site_id = SiteId::from_raw(sites.len() as u32);
                    (
                        TileType::Logic,
                        Some(Self::make_logic_site(
                            site_id,
                            col,
                            row,
                            config.lut_width,
                        )),
                    )
                } else {
                    (TileType::Empty, None)
                };

                let mut tile = Tile {
                    col,
                    row,
                    tile_type,
                    sites: Vec::new(),
                };
                if let Some(site) = site {
                    tile.sites.push(site.id);
                    sites.push(site);
                }
                tiles[idx] = tile;
            }
        }

        let (routing, site_wire) = Self::build_routing(&tiles, cols, rows, &sites, config.lut_width);

        Self {
            cols,
            rows,
            tiles,
            sites,
            routing,
            site_wire,
        }
    }

    fn make_logic_site(id: SiteId, col: u32, row: u32, lut_width: u32) -> Site {
        let mut bels = Vec::new();
        for i in 0..2 {
            bels.push(Bel {
                id: BelId::from_raw(id.as_raw() * 4 + i),
                name: format!("LUT{i}"),
                bel_type: BelType::Lut,
            });
            bels.push(Bel {
                id: BelId::from_raw(id.as_raw() * 4 + 2 + i),
                name: format!("FF{i}"),
                bel_type: BelType::Ff,
            });
        }
        let site_type = if lut_width >= 6 {
            SiteType::Alm
        } else {
            SiteType::LutFf
        };
        Site {
            id,
            site_type,
            bels,
            tile_col: col,
            tile_row: row,
        }
    }

    fn make_site(id: SiteId, site_type: SiteType, col: u32, row: u32, bel_count: u32) -> Site {
        let bel_type = match site_type {
            SiteType::BramSite => BelType::BramPrimitive,
            SiteType::DspSite => BelType::DspPrimitive,
            SiteType::IoPad => BelType::IoBuf,
            _ => BelType::Lut,
        };
        let bels = (0..bel_count)
            .map(|i| Bel {
                id: BelId::from_raw(id.as_raw() * 4 + i),
                name: format!("{site_type:?}{i}"),
                bel_type,
            })
            .collect();
        Site {
            id,
            site_type,
            bels,
            tile_col: col,
            tile_row: row,
        }
    }

    /// Builds the local routing mesh: one wire per tile per cardinal
    /// direction to its neighbour, plus an intra-tile pip from each bel to
    /// the tile's outgoing wires.
    fn build_routing(
        tiles: &[Tile],
        cols: u32,
        rows: u32,
        sites: &[Site],
        _lut_width: u32,
    ) -> (RoutingGraph, HashMap<SiteId, WireId>) {
        let mut wires = Vec::new();
        let mut pips = Vec::new();
        let mut site_wire = HashMap::new();

        // One local wire per tile, used as the tile's routing trunk.
        let mut trunk_wire = vec![WireId::from_raw(0); (cols * rows) as usize];
        for row in 0..rows {
            for col in 0..cols {
                let idx = (row * cols + col) as usize;
                let wid = WireId::from_raw(wires.len() as u32);
                trunk_wire[idx] = wid;
                wires.push(Wire {
                    id: wid,
                    name: format!("TRUNK_X{col}Y{row}"),
                });
            }
        }

        // Intra-tile pips: every bel in the tile's site feeds the trunk wire.
        // The trunk is also the site's routing entry/exit point — every bel
        // in the site funnels into it, so it's the natural site-pin surrogate
        // for this generated mesh.
        for site in sites {
            let idx = (site.tile_row * cols + site.tile_col) as usize;
            let trunk = trunk_wire[idx];
            site_wire.insert(site.id, trunk);
            for bel in &site.bels {
                let bel_wire_id = WireId::from_raw(wires.len() as u32);
                wires.push(Wire {
                    id: bel_wire_id,
                    name: format!("{}_{}", site.tile_col, bel.name),
                });
                pips.push(Pip {
                    id: PipId::from_raw(pips.len() as u32),
                    src_wire: bel_wire_id,
                    dst_wire: trunk,
                    delay: Delay::new(0.02, 0.04, 0.08),
                });
            }
        }

        // Mesh pips: each tile's trunk feeds its east and north neighbours
        // (a directed pip per hop is sufficient for a connected graph; A*
        // treats the pip set as the downhill edges of the source wire).
        for row in 0..rows {
            for col in 0..cols {
                let idx = (row * cols + col) as usize;
                let here = trunk_wire[idx];

                if col + 1 < cols {
                    let east = trunk_wire[(row * cols + col + 1) as usize];
                    pips.push(Pip {
                        id: PipId::from_raw(pips.len() as u32),
                        src_wire: here,
                        dst_wire: east,
                        delay: Delay::new(0.05, 0.1, 0.2),
                    });
                    pips.push(Pip {
                        id: PipId::from_raw(pips.len() as u32),
                        src_wire: east,
                        dst_wire: here,
                        delay: Delay::new(0.05, 0.1, 0.2),
                    });
                }
                if row + 1 < rows {
                    let north = trunk_wire[((row + 1) * cols + col) as usize];
                    pips.push(Pip {
                        id: PipId::from_raw(pips.len() as u32),
                        src_wire: here,
                        dst_wire: north,
                        delay: Delay::new(0.05, 0.1, 0.2),
                    });
                    pips.push(Pip {
                        id: PipId::from_raw(pips.len() as u32),
                        src_wire: north,
                        dst_wire: here,
                        delay: Delay::new(0.05, 0.1, 0.2),
                    });
                }
            }
        }
        let _ = tiles;

        (RoutingGraph { wires, pips }, site_wire)
    }

    /// Returns the grid dimensions as (columns, rows).
    pub fn grid_dimensions(&self) -> (u32, u32) {
        (self.cols, self.rows)
    }

    /// Returns the tile at the given coordinates, if in bounds.
    pub fn get_tile(&self, col: u32, row: u32) -> Option<&Tile> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.tiles.get((row * self.cols + col) as usize)
    }

    /// Returns the site with the given ID.
    pub fn get_site(&self, id: SiteId) -> Option<&Site> {
        self.sites.get(id.as_raw() as usize)
    }

    /// Returns all sites of the given type.
    pub fn sites_of_type(&self, site_type: SiteType) -> Vec<SiteId> {
        self.sites
            .iter()
            .filter(|s| s.site_type == site_type)
            .map(|s| s.id)
            .collect()
    }

    /// Returns the full routing graph.
    pub fn routing_graph(&self) -> &RoutingGraph {
        &self.routing
    }

    /// Returns the wire a router should enter/leave `site` through: the
    /// tile's trunk wire, which every bel in the site's intra-tile pips
    /// feed into.
    pub fn site_routing_wire(&self, site: SiteId) -> Option<WireId> {
        self.site_wire.get(&site).copied()
    }

    /// Returns the delay of the given pip, or zero if unknown.
    pub fn pip_delay(&self, pip: PipId) -> Delay {
        self.routing
            .pips
            .get(pip.as_raw() as usize)
            .map(|p| p.delay)
            .unwrap_or(Delay::ZERO)
    }

    /// Returns an estimated per-hop wire delay (wires themselves are
    /// zero-delay equipotentials; delay accrues on the pips between them).
    pub fn wire_delay(&self, _wire: WireId) -> Delay {
        Delay::ZERO
    }

    /// Total number of sites in the grid.
    pub fn site_count(&self) -> usize {
        self.sites.len()
    }
}
