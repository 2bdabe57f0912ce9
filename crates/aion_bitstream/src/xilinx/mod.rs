//! Xilinx bitstream generation.
//!
//! Provides the `XilinxBitstreamGenerator` which converts a placed-and-routed
//! `PnrNetlist` into Xilinx BIT format bitstream files. Uses
//! `SimplifiedXilinxDb` for cell-to-config-bit mapping and the BIT format
//! writer for file output.

pub mod bit;
pub mod config_db;

use crate::config_bits::{ConfigBitDatabase, ConfigImage};
use crate::{compute_checksum, Bitstream, BitstreamFormat, BitstreamGenerator};
use aion_arch::Architecture;
use aion_common::{AionResult, InternalError};
use aion_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use aion_pnr::{PnrCellType, PnrNetlist, RouteResource};
use aion_source::Span;
use config_db::SimplifiedXilinxDb;

/// Bitstream generator for Xilinx FPGA devices.
///
/// Supports Artix-7 and other Xilinx 7-series device families.
/// Generates BIT format bitstreams.
#[derive(Debug)]
pub struct XilinxBitstreamGenerator {
    /// Supported output formats.
    formats: Vec<BitstreamFormat>,
}

impl Default for XilinxBitstreamGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl XilinxBitstreamGenerator {
    /// Creates a new Xilinx bitstream generator.
    pub fn new() -> Self {
        Self {
            formats: vec![BitstreamFormat::Bit],
        }
    }
}

impl BitstreamGenerator for XilinxBitstreamGenerator {
    fn generate(
        &self,
        netlist: &PnrNetlist,
        arch: &dyn Architecture,
        format: BitstreamFormat,
        sink: &DiagnosticSink,
    ) -> AionResult<Bitstream> {
        if !self.formats.contains(&format) {
            return Err(InternalError::new(format!(
                "Xilinx generator does not support format {}",
                format
            )));
        }

        let config_db = SimplifiedXilinxDb;
        let config = assemble_xilinx_config(netlist, &config_db, sink);

        let data = bit::write_bit(&config, arch.device_name(), "aion_design");

        let checksum = compute_checksum(&data);

        Ok(Bitstream {
            data,
            format,
            device: arch.device_name().to_string(),
            checksum,
        })
    }

    fn supported_formats(&self) -> &[BitstreamFormat] {
        &self.formats
    }
}

/// Assembles configuration bits from a PnR netlist using the Xilinx config database.
///
/// Iterates over all placed cells and routed nets, mapping each to physical
/// configuration bits. Unplaced cells and stub-routed nets emit warnings
/// and are skipped.
fn assemble_xilinx_config(
    netlist: &PnrNetlist,
    config_db: &dyn ConfigBitDatabase,
    sink: &DiagnosticSink,
) -> ConfigImage {
    let mut image = ConfigImage::new(config_db.frame_word_count(), config_db.total_frame_count());

    // Process cells
    for cell in &netlist.cells {
        let site = match cell.placement {
            Some(s) => s,
            None => {
                sink.emit(Diagnostic::warning(
                    DiagnosticCode::new(Category::Vendor, 501),
                    format!("cell '{}' is not placed, skipping config bits", cell.name),
                    Span::DUMMY,
                ));
                continue;
            }
        };

        let bits = match &cell.cell_type {
            PnrCellType::Lut { inputs, init } => config_db.lut_config_bits(site, init, *inputs),
            PnrCellType::Dff => config_db.ff_config_bits(site),
            PnrCellType::Iobuf {
                direction,
                standard,
            } => config_db.iobuf_config_bits(site, *direction, standard),
            PnrCellType::Bram(cfg) => config_db.bram_config_bits(site, cfg.width, cfg.depth),
            PnrCellType::Dsp(cfg) => config_db.dsp_config_bits(site, cfg.width_a, cfg.width_b),
            PnrCellType::Carry | PnrCellType::Pll(_) => config_db.ff_config_bits(site),
        };

        for bit in bits {
            image.set_bit(bit);
        }
    }

    // Process nets
    for net in &netlist.nets {
        match &net.routing {
            Some(route_tree) => {
                let pips = route_tree.pips_used();
                if pips.is_empty() {
                    if matches!(route_tree.root.resource, RouteResource::Direct) {
                        sink.emit(Diagnostic::warning(
                            DiagnosticCode::new(Category::Vendor, 502),
                            format!(
                                "net '{}' has stub routing, PIP config bits skipped",
                                net.name
                            ),
                            Span::DUMMY,
                        ));
                    }
                    continue;
                }
                for pip in pips {
                    let bits = config_db.pip_config_bits(pip);
                    for bit in bits {
                        image.set_bit(bit);
                    }
                }
            }
            None => {
                sink.emit(Diagnostic::warning(
                    DiagnosticCode::new(Category::Vendor, 502),
                    format!("net '{}' is not routed, PIP config bits skipped", net.name),
                    Span::DUMMY,
                ));
            }
        }
    }

    image
}
