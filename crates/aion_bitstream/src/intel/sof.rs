//! Intel/Altera SOF (SRAM Object File) format writer.
//!
//! SOF files contain a header with device and design metadata, followed by
//! configuration frame data and a CRC-16 footer. They are the primary
//! programming format for Intel/Altera FPGA SRAM configuration.

use crate::config_bits::ConfigImage;
use crate::crc::crc16;

/// Magic bytes identifying a SOF file.
const SOF_MAGIC: &[u8] = b"AION_SOF";

/// SOF format version.
const SOF_VERSION: u8 = 1;

/// Writes a SOF file from the given configuration image.
///
/// The SOF format contains:
/// 1. Magic identifier (`AION_SOF`)
/// 2. Version byte
/// 3. Device name (length-prefixed string)
/// 4. Design name (length-prefixed string)
/// 5. Frame count (u32 BE)
/// 6. Frame word count (u32 BE)
/// 7. Frame data (each frame: address u32 BE + word data u32 BE)
/// 8. CRC-16 over all preceding data
pub fn write_sof(config: &ConfigImage, device_name: &str, design_name: &str) -> Vec<u8> {
    let mut data = Vec::new();

    // Header
    data.extend_from_slice(SOF_MAGIC);
    data.push(SOF_VERSION);

    // Device name (length-prefixed)
    write_length_prefixed_string(&mut data, device_name);

    // Design name (length-prefixed)
    write_length_prefixed_string(&mut data, design_name);

    // Frame metadata
    let frames = config.finalize();
    data.extend_from_slice(&(frames.len() as u32).to_be_bytes());
    data.extend_from_slice(&config.frame_word_count.to_be_bytes());

    // Frame data
    for frame in &frames {
        data.extend_from_slice(&frame.address.as_raw().to_be_bytes());
        for &word in &frame.data {
            data.extend_from_slice(&word.to_be_bytes());
        }
    }

    // CRC-16 footer
    let checksum = crc16(&data);
    data.extend_from_slice(&checksum.to_be_bytes());

    data
}

/// Writes a length-prefixed string (u16 BE length + UTF-8 bytes).
fn write_length_prefixed_string(data: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    let len = bytes.len().min(u16::MAX as usize) as u16;
    data.extend_from_slice(&len.to_be_bytes());
    data.extend_from_slice(&bytes[..len as usize]);
}
