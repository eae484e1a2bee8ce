//! Text templates spliced into the generated files.
//!
//! Three block kinds exist, one per insertion site:
//! - port declarations appended to the `<project>_system` port list
//! - intermediate wires plus one `bus_adaption` instance per new port, placed
//!   at the first blank line of the module body
//! - Qsys interface declarations for `<project>_system_hw.tcl`
//!
//! All of them are rendered from the same AVM sub-port catalogue, so the
//! HDL side and the Qsys side cannot drift apart.

use crate::config::BusWidths;
use crate::models::{avm_subports, PortCategory};

/// Kernel-facing (input side) widths of the bus adapter. These are fixed by the
/// kernel wrapper the HLS compiler generates, not by configuration.
pub const ADAPTER_INPUT_WIDTHS: BusWidths = BusWidths {
    data_width: 256,
    addr_width: 31,
    byteenable_width: 32,
    burstcount_width: 5,
};

/// Connection order of the adapter's `avm_port_in_*` / `avm_port_out_*` pins
const ADAPTER_PIN_ORDER: [&str; 11] = [
    "enable",
    "readdata",
    "readdatavalid",
    "waitrequest",
    "address",
    "read",
    "write",
    "writeack",
    "writedata",
    "byteenable",
    "burstcount",
];

/// Qsys properties set on every new Avalon master interface
const INTERFACE_PROPERTIES: [(&str, &str); 8] = [
    ("associatedClock", "clock_reset"),
    ("burstOnBurstBoundariesOnly", "false"),
    ("doStreamReads", "false"),
    ("doStreamWrites", "false"),
    ("linewrapBursts", "false"),
    ("readWaitTime", "0"),
    ("ASSOCIATED_CLOCK", "clock_reset"),
    ("ENABLED", "true"),
];

/// Name of the intermediate wire bundle `index` of a category, e.g. `avm_kernel_bus_adaption_3`
pub fn wire_name(category: PortCategory, index: usize) -> String {
    format!("{}_{}", category.wire_prefix(), index)
}

/// Comment plus one declaration per sub-signal, every line comma-terminated.
///
/// ```text
///     // AVM avm_svm_port_0_rw
///     output logic avm_svm_port_0_rw_enable,
///     output logic [4:0] avm_svm_port_0_rw_burstcount,
/// ```
pub fn port_declarations(category: PortCategory, index: usize, bus: &BusWidths) -> Vec<String> {
    let port = category.port_name(index);
    let mut lines = Vec::with_capacity(12);
    lines.push(format!("    // AVM {}", port));
    for sub in avm_subports(bus) {
        lines.push(format!(
            "    {} logic {}{}_{},",
            sub.direction.as_hdl(),
            sub.hdl_range(),
            port,
            sub.name
        ));
    }
    lines
}

/// Intermediate wires and the `bus_adaption` instance bridging the kernel's
/// wide bus to the exported port.
pub fn adapter_block(category: PortCategory, index: usize, bus: &BusWidths) -> Vec<String> {
    let wire = wire_name(category, index);
    let port = category.port_name(index);
    let mut lines = Vec::with_capacity(56);

    lines.push(String::new());
    for sub in avm_subports(&ADAPTER_INPUT_WIDTHS) {
        lines.push(format!("  wire {}{}_{};", sub.hdl_range(), wire, sub.name));
    }
    lines.push(String::new());

    lines.push("  bus_adaption".to_string());
    lines.push("  #(".to_string());
    lines.push(format!("      .ENABLE_ACP ({}),", category.enable_acp()));
    lines.push(format!("      .INPUT_DATAWDTH ({}),", ADAPTER_INPUT_WIDTHS.data_width));
    lines.push(format!("      .INPUT_ADDRWDTH  ({}),", ADAPTER_INPUT_WIDTHS.addr_width));
    lines.push(format!("      .INPUT_BYTEENWDTH ({}),", ADAPTER_INPUT_WIDTHS.byteenable_width));
    lines.push(format!("      .INPUT_BURSTCOUNT ({}),", ADAPTER_INPUT_WIDTHS.burstcount_width));
    lines.push(format!("      .OUTPUT_DATAWDTH ({}),", bus.data_width));
    lines.push(format!("      .OUTPUT_ADDRWDTH ({}),", bus.addr_width));
    lines.push(format!("      .OUTPUT_BYTEENWDTH ({}),", bus.byteenable_width));
    lines.push(format!("      .OUTPUT_BURSTCOUNT ({})", bus.burstcount_width));
    lines.push("  )".to_string());
    lines.push(format!("  {}{}", category.instance_prefix(), index));
    lines.push("  (".to_string());

    for pin in ADAPTER_PIN_ORDER {
        lines.push(format!("      .avm_port_in_{} ({}_{}),", pin, wire, pin));
    }
    lines.push(String::new());

    let last = ADAPTER_PIN_ORDER.len() - 1;
    for (i, pin) in ADAPTER_PIN_ORDER.iter().enumerate() {
        // the generated enable pin has always carried a space inside the parenthesis
        let open = if *pin == "enable" { "( " } else { "(" };
        let separator = if i == last { "" } else { "," };
        lines.push(format!(
            "      .avm_port_out_{} {}{}_{}){}",
            pin, open, port, pin, separator
        ));
    }
    lines.push("  );".to_string());
    lines.push(String::new());

    lines
}

/// Qsys `add_interface` block for one new port. `enable` and `writeack` have no
/// Avalon role and are left off the interface.
pub fn interface_declarations(category: PortCategory, index: usize, bus: &BusWidths) -> Vec<String> {
    let port = category.port_name(index);
    let mut lines = Vec::with_capacity(20);

    lines.push(format!("### AVM {}", port));
    lines.push(format!("add_interface {} avalon start", port));
    for (property, value) in INTERFACE_PROPERTIES {
        lines.push(format!(
            "set_interface_property {} {} {}",
            port, property, value
        ));
    }
    for sub in avm_subports(bus).iter().filter(|sub| sub.is_external()) {
        lines.push(format!(
            "add_interface_port {} {}_{} {} {} {}",
            port,
            port,
            sub.name,
            sub.name,
            sub.direction.as_qsys(),
            sub.qsys_width()
        ));
    }
    lines.push(String::new());

    lines
}
