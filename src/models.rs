//! Core data types for the SVM fixup pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;

use crate::config::BusWidths;

/// Signal direction as seen from the kernel system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Driven by the kernel system (consumer of memory)
    Output,
    /// Driven by the memory side (producer of data)
    Input,
}

impl Direction {
    /// HDL keyword (`output` / `input`)
    pub fn as_hdl(&self) -> &'static str {
        match self {
            Direction::Output => "output",
            Direction::Input => "input",
        }
    }

    /// Qsys interface port direction (`Output` / `Input`)
    pub fn as_qsys(&self) -> &'static str {
        match self {
            Direction::Output => "Output",
            Direction::Input => "Input",
        }
    }
}

/// One sub-signal of an Avalon memory-mapped master bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubPort {
    pub direction: Direction,
    pub name: &'static str,
    /// Bit width, 0 for a single-bit signal
    pub width: u32,
}

impl SubPort {
    const fn new(direction: Direction, name: &'static str, width: u32) -> Self {
        SubPort { direction, name, width }
    }

    /// Whether the signal is exported on the Qsys interface.
    /// `enable` and `writeack` only exist on the HDL side.
    pub fn is_external(&self) -> bool {
        self.name != "enable" && self.name != "writeack"
    }

    /// HDL range prefix, e.g. `[127:0] `, empty for single-bit signals
    pub fn hdl_range(&self) -> String {
        if self.width == 0 {
            String::new()
        } else {
            format!("[{}:0] ", self.width - 1)
        }
    }

    /// Width as declared to Qsys (single-bit signals are width 1)
    pub fn qsys_width(&self) -> u32 {
        if self.width == 0 {
            1
        } else {
            self.width
        }
    }
}

/// Number of sub-signals in one AVM bus.
pub const AVM_SUBPORT_COUNT: usize = 11;

/// The AVM bus catalogue, in declaration order, for the given external widths.
pub fn avm_subports(bus: &BusWidths) -> [SubPort; AVM_SUBPORT_COUNT] {
    use Direction::{Input, Output};
    [
        SubPort::new(Output, "enable", 0),
        SubPort::new(Output, "read", 0),
        SubPort::new(Output, "write", 0),
        SubPort::new(Output, "burstcount", bus.burstcount_width),
        SubPort::new(Output, "address", bus.addr_width),
        SubPort::new(Output, "writedata", bus.data_width),
        SubPort::new(Output, "byteenable", bus.byteenable_width),
        SubPort::new(Input, "waitrequest", 0),
        SubPort::new(Input, "readdata", bus.data_width),
        SubPort::new(Input, "readdatavalid", 0),
        SubPort::new(Input, "writeack", 0),
    ]
}

/// Category of a newly exposed memory port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PortCategory {
    /// Standard shared-virtual-memory port
    Svm,
    /// Atomic / lock-service port
    LockService,
}

impl PortCategory {
    /// Prefix of the externally exposed port, e.g. `avm_svm_port`
    pub fn port_prefix(&self) -> &'static str {
        match self {
            PortCategory::Svm => "avm_svm_port",
            PortCategory::LockService => "avm_lockservice_port",
        }
    }

    /// Prefix of the intermediate wires between kernel and adapter
    pub fn wire_prefix(&self) -> &'static str {
        match self {
            PortCategory::Svm => "avm_kernel_bus_adaption",
            PortCategory::LockService => "avm_lockservice_bus_adaption",
        }
    }

    /// Prefix of the adapter instance name
    pub fn instance_prefix(&self) -> &'static str {
        match self {
            PortCategory::Svm => "bus_adaption_kernel_top",
            PortCategory::LockService => "bus_adaption_lockservice_top",
        }
    }

    /// Value of the adapter's ENABLE_ACP parameter
    pub fn enable_acp(&self) -> u32 {
        match self {
            PortCategory::Svm => 1,
            PortCategory::LockService => 0,
        }
    }

    /// Name of the `index`-th external port of this category, e.g. `avm_svm_port_0_rw`
    pub fn port_name(&self, index: usize) -> String {
        format!("{}_{}_rw", self.port_prefix(), index)
    }
}

impl fmt::Display for PortCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PortCategory::Svm => write!(f, "svm"),
            PortCategory::LockService => write!(f, "lock-service"),
        }
    }
}

/// A kernel found in the generated top-level description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Kernel(String);

impl Kernel {
    pub fn new(name: impl Into<String>) -> Self {
        Kernel(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Memory ports to convert for one kernel (or summed over all kernels).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PortTally {
    pub svm: usize,
    pub lock_service: usize,
}

impl PortTally {
    pub fn new(svm: usize, lock_service: usize) -> Self {
        PortTally { svm, lock_service }
    }

    /// Both categories combined
    pub fn combined(&self) -> usize {
        self.svm + self.lock_service
    }

    pub fn count(&self, category: PortCategory) -> usize {
        match category {
            PortCategory::Svm => self.svm,
            PortCategory::LockService => self.lock_service,
        }
    }
}

impl AddAssign for PortTally {
    fn add_assign(&mut self, rhs: PortTally) {
        self.svm += rhs.svm;
        self.lock_service += rhs.lock_service;
    }
}

/// Grand totals across all kernels, as returned by the structural rewriter.
pub type PortTotals = PortTally;
