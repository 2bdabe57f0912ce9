//! Bitstream generation for Intel and Xilinx FPGA devices.
//!
//! This crate converts a placed-and-routed `PnrNetlist` into vendor-specific
//! binary files (Intel SOF/POF/RBF, Xilinx BIT). It provides the
//! `BitstreamGenerator` trait with implementations for each vendor family,
//! a `ConfigBitDatabase` abstraction for mapping logical cells to physical
//! configuration bits, and format writers for each output format.
//!
//! The main entry point is `generate_bitstream()`, which dispatches to the
//! appropriate vendor-specific generator based on the target architecture.

#![warn(missing_docs)]

pub mod config_bits;
pub mod crc;
pub mod intel;
pub mod xilinx;

use aion_arch::Architecture;
use aion_common::{AionResult, InternalError};
use aion_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use aion_pnr::PnrNetlist;
use aion_source::Span;
use serde::{Deserialize, Serialize};

/// The output format for a generated bitstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BitstreamFormat {
    /// Intel/Altera SRAM Object File (.sof).
    Sof,
    /// Intel/Altera Programmer Object File (.pof) for flash programming.
    Pof,
    /// Intel/Altera Raw Binary File (.rbf) — headerless raw configuration data.
    Rbf,
    /// Xilinx bitstream file (.bit) with TLV header and command sequence.
    Bit,
}

impl BitstreamFormat {
    /// Returns the conventional file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            BitstreamFormat::Sof => "sof",
            BitstreamFormat::Pof => "pof",
            BitstreamFormat::Rbf => "rbf",
            BitstreamFormat::Bit => "bit",
        }
    }
}

impl std::fmt::Display for BitstreamFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BitstreamFormat::Sof => write!(f, "SOF"),
            BitstreamFormat::Pof => write!(f, "POF"),
            BitstreamFormat::Rbf => write!(f, "RBF"),
            BitstreamFormat::Bit => write!(f, "BIT"),
        }
    }
}

/// A generated bitstream ready for programming or file output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bitstream {
    /// The raw binary data of the bitstream.
    pub data: Vec<u8>,
    /// The format of this bitstream.
    pub format: BitstreamFormat,
    /// The target device name (e.g., "EP4CE6E22C8").
    pub device: String,
    /// A checksum over the bitstream data for integrity verification.
    pub checksum: u32,
}

/// Trait for vendor-specific bitstream generators.
///
/// Implementations convert a placed-and-routed netlist into a binary bitstream
/// for a specific FPGA device family.
pub trait BitstreamGenerator {
    /// Generates a bitstream from the given netlist and architecture.
    ///
    /// Returns the bitstream data in the requested format, or an error if
    /// the format is unsupported or generation fails.
    fn generate(
        &self,
        netlist: &PnrNetlist,
        arch: &dyn Architecture,
        format: BitstreamFormat,
        sink: &DiagnosticSink,
    ) -> AionResult<Bitstream>;

    /// Returns the list of formats supported by this generator.
    fn supported_formats(&self) -> &[BitstreamFormat];
}

/// Creates a bitstream generator for the given architecture.
///
/// Dispatches on the architecture's `family_name()` to select the appropriate
/// vendor-specific generator (Intel or Xilinx).
pub fn create_generator(arch: &dyn Architecture) -> AionResult<Box<dyn BitstreamGenerator>> {
    let family = arch.family_name().to_lowercase();
    match family.as_str() {
        "cyclone_iv" | "cyclone_v" => Ok(Box::new(intel::IntelBitstreamGenerator::new())),
        "artix7" => Ok(Box::new(xilinx::XilinxBitstreamGenerator::new())),
        _ => Err(InternalError::new(format!(
            "unsupported architecture family for bitstream generation: {}",
            arch.family_name()
        ))),
    }
}

/// Convenience function to generate a bitstream in one call.
///
/// Creates the appropriate generator for the architecture, then generates
/// the bitstream in the requested format.
pub fn generate_bitstream(
    netlist: &PnrNetlist,
    arch: &dyn Architecture,
    format: BitstreamFormat,
    sink: &DiagnosticSink,
) -> AionResult<Bitstream> {
    let generator = create_generator(arch)?;

    if !generator.supported_formats().contains(&format) {
        sink.emit(Diagnostic::error(
            DiagnosticCode::new(Category::Vendor, 503),
            format!(
                "format {} is not supported for device family {}",
                format,
                arch.family_name()
            ),
            Span::DUMMY,
        ));
        return Err(InternalError::new(format!(
            "unsupported format {} for family {}",
            format,
            arch.family_name()
        )));
    }

    generator.generate(netlist, arch, format, sink)
}

/// Computes a simple checksum over bitstream data using XOR folding.
///
/// Processes the data in 4-byte big-endian words, XORing them together.
pub fn compute_checksum(data: &[u8]) -> u32 {
    let mut checksum: u32 = 0;
    for chunk in data.chunks(4) {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        checksum ^= u32::from_be_bytes(word);
    }
    checksum
}
