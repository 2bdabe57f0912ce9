//! Conversion from synthesized [`MappedDesign`] to [`PnrNetlist`].
//!
//! Flattens the hierarchical module structure into a flat netlist of PnR cells,
//! pins, and nets. Top-level ports become I/O buffer cells with fixed placement.
//! Signal connectivity is traced through cell port connections to build nets.

use crate::data::{PnrCell, PnrCellType, PnrNet, PnrNetlist, PnrPin};
use crate::ids::{PnrCellId, PnrNetId, PnrPinId};
use aion_common::{Interner, LogicVec};
use aion_ir::{CellKind, PortDirection, SignalRef};
use aion_synth::{MappedDesign, MappedModule};
use std::collections::HashMap;

/// Converts a [`MappedDesign`] into a flat [`PnrNetlist`].
///
/// Creates PnR cells for every IR cell in the top module, creates I/O buffer
/// cells for top-level ports, and builds nets from signal connectivity.
pub fn convert_to_pnr(design: &MappedDesign, interner: &Interner) -> PnrNetlist {
    let mut netlist = PnrNetlist::new();
    let top = design.modules.get(design.top);

    // Track signal→net mapping for net construction
    let mut signal_nets: HashMap<u32, PnrNetId> = HashMap::new();
    // Track signal→driver pin for building nets
    let mut signal_drivers: HashMap<u32, PnrPinId> = HashMap::new();
    // Track signal→sink pins for building nets
    let mut signal_sinks: HashMap<u32, Vec<PnrPinId>> = HashMap::new();

    // 1. Create I/O buffer cells for top-level ports
    create_io_cells(
        top,
        interner,
        &mut netlist,
        &mut signal_drivers,
        &mut signal_sinks,
    );

    // 2. Create PnR cells for each IR cell in the top module
    create_logic_cells(
        top,
        interner,
        &mut netlist,
        &mut signal_drivers,
        &mut signal_sinks,
    );

    // 3. Build nets from signal connectivity
    build_nets(
        top,
        interner,
        &mut netlist,
        &signal_drivers,
        &signal_sinks,
        &mut signal_nets,
    );

    netlist
}

/// Creates I/O buffer cells for top-level ports.
fn create_io_cells(
    module: &MappedModule,
    interner: &Interner,
    netlist: &mut PnrNetlist,
    signal_drivers: &mut HashMap<u32, PnrPinId>,
    signal_sinks: &mut HashMap<u32, Vec<PnrPinId>>,
) {
    for port in &module.ports {
        let port_name = interner.resolve(port.name).to_string();
        let cell_id = netlist.add_cell(PnrCell {
            id: PnrCellId::from_raw(0),
            name: format!("io_{port_name}"),
            cell_type: PnrCellType::Iobuf {
                direction: port.direction,
                standard: "LVCMOS33".into(),
            },
            placement: None,
            is_fixed: true,
        });

        // I/O buffers have a single pin
        let pin_dir = match port.direction {
            PortDirection::Input => PortDirection::Output, // IO drives internal net
            PortDirection::Output => PortDirection::Input, // IO receives from internal net
            PortDirection::InOut => PortDirection::InOut,
        };

        let pin_id = netlist.add_pin(PnrPin {
            id: PnrPinId::from_raw(0),
            name: port_name,
            direction: pin_dir,
            cell: cell_id,
            net: None,
        });

        let sig_raw = port.signal.as_raw();
        match port.direction {
            PortDirection::Input => {
                signal_drivers.insert(sig_raw, pin_id);
            }
            PortDirection::Output => {
                signal_sinks.entry(sig_raw).or_default().push(pin_id);
            }
            PortDirection::InOut => {
                signal_drivers.insert(sig_raw, pin_id);
            }
        }
    }
}

/// Creates PnR cells for each IR cell in the module.
fn create_logic_cells(
    module: &MappedModule,
    interner: &Interner,
    netlist: &mut PnrNetlist,
    signal_drivers: &mut HashMap<u32, PnrPinId>,
    signal_sinks: &mut HashMap<u32, Vec<PnrPinId>>,
) {
    for (cell_id, cell) in module.cells.iter() {
        let cell_name = format!("cell_{}", cell_id.as_raw());
        let cell_type = ir_cell_to_pnr_type(&cell.kind);

        let pnr_cell_id = netlist.add_cell(PnrCell {
            id: PnrCellId::from_raw(0),
            name: cell_name,
            cell_type,
            placement: None,
            is_fixed: false,
        });

        // Create pins for each connection on the IR cell
        for conn in &cell.connections {
            let pin_name = interner.resolve(conn.port_name).to_string();

            let pin_id = netlist.add_pin(PnrPin {
                id: PnrPinId::from_raw(0),
                name: pin_name,
                direction: conn.direction,
                cell: pnr_cell_id,
                net: None,
            });

            // Track connectivity based on signal reference
            if let SignalRef::Signal(sig_id) = &conn.signal {
                let sig_raw = sig_id.as_raw();
                match conn.direction {
                    PortDirection::Output => {
                        signal_drivers.insert(sig_raw, pin_id);
                    }
                    PortDirection::Input | PortDirection::InOut => {
                        signal_sinks.entry(sig_raw).or_default().push(pin_id);
                    }
                }
            }
        }
    }
}

/// Converts an IR [`CellKind`] to a [`PnrCellType`].
fn ir_cell_to_pnr_type(kind: &CellKind) -> PnrCellType {
    match kind {
        CellKind::And { .. } | CellKind::Or { .. } | CellKind::Xor { .. } => PnrCellType::Lut {
            inputs: 2,
            init: LogicVec::from_bool(false),
        },
        CellKind::Not { .. } => PnrCellType::Lut {
            inputs: 1,
            init: LogicVec::from_bool(false),
        },
        CellKind::Mux { .. } => PnrCellType::Lut {
            inputs: 3,
            init: LogicVec::from_bool(false),
        },
        CellKind::Dff { .. } => PnrCellType::Dff,
        CellKind::Eq { .. } | CellKind::Lt { .. } => PnrCellType::Lut {
            inputs: 2,
            init: LogicVec::from_bool(false),
        },
        CellKind::Add { .. } | CellKind::Sub { .. } => PnrCellType::Carry,
        _ => PnrCellType::Lut {
            inputs: 2,
            init: LogicVec::from_bool(false),
        },
    }
}

/// Builds nets from signal connectivity information.
fn build_nets(
    module: &MappedModule,
    interner: &Interner,
    netlist: &mut PnrNetlist,
    signal_drivers: &HashMap<u32, PnrPinId>,
    signal_sinks: &HashMap<u32, Vec<PnrPinId>>,
    signal_nets: &mut HashMap<u32, PnrNetId>,
) {
    for (sig_id, signal) in module.signals.iter() {
        let sig_raw = sig_id.as_raw();
        let driver = signal_drivers.get(&sig_raw);
        let sinks = signal_sinks.get(&sig_raw);

        // Only create nets for signals that have at least a driver or sinks
        if driver.is_none() && sinks.is_none() {
            continue;
        }

        let sig_name = interner.resolve(signal.name).to_string();

        // Use a dummy pin if no driver is found
        let driver_pin = match driver {
            Some(&pin) => pin,
            None => {
                // Create a dummy driver pin
                let dummy_cell = netlist.add_cell(PnrCell {
                    id: PnrCellId::from_raw(0),
                    name: format!("dummy_driver_{sig_name}"),
                    cell_type: PnrCellType::Lut {
                        inputs: 0,
                        init: LogicVec::from_bool(false),
                    },
                    placement: None,
                    is_fixed: false,
                });
                netlist.add_pin(PnrPin {
                    id: PnrPinId::from_raw(0),
                    name: "O".into(),
                    direction: PortDirection::Output,
                    cell: dummy_cell,
                    net: None,
                })
            }
        };

        let sink_pins = sinks.cloned().unwrap_or_default();

        let net_id = netlist.add_net(PnrNet {
            id: PnrNetId::from_raw(0),
            name: sig_name,
            driver: driver_pin,
            sinks: sink_pins,
            routing: None,
            timing_critical: false,
        });

        signal_nets.insert(sig_raw, net_id);
    }
}
