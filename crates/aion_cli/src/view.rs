//! Implementation of the `aion view` command.
//!
//! Loads a previously saved waveform file (VCD) and opens it in the TUI
//! viewer for interactive inspection without re-running the simulation.

use std::path::Path;

use aion_sim::vcd_loader::load_vcd_file;
use aion_tui::app::SignalInfo;
use aion_tui::waveform_data::WaveformData;

use crate::{GlobalArgs, ViewArgs};

/// Runs the `aion view` command.
///
/// Loads a waveform file and launches the TUI viewer. Currently supports
/// VCD files; other formats return an error.
pub fn run(args: &ViewArgs, _global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let path = Path::new(&args.file);

    if !path.exists() {
        return Err(format!("file not found: {}", args.file).into());
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "vcd" => view_vcd(path),
        _ => Err(format!("unsupported waveform format: .{ext} (supported: .vcd)").into()),
    }
}

/// Loads a VCD file and opens it in the TUI viewer.
fn view_vcd(path: &Path) -> Result<i32, Box<dyn std::error::Error>> {
    let loaded = load_vcd_file(path)?;
    let waveform = WaveformData::from_loaded(&loaded);

    let signal_info: Vec<SignalInfo> = loaded
        .signals
        .iter()
        .enumerate()
        .map(|(i, sig)| SignalInfo {
            id: aion_sim::SimSignalId::from_raw(i as u32),
            name: sig.name.clone(),
            width: sig.width,
        })
        .collect();

    aion_tui::run_tui_viewer(waveform, signal_info)?;

    Ok(0)
}
