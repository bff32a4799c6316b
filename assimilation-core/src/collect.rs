//! Gathers raw facts from the host and from external discovery tools.
//!
//! Each source is asked exactly once. A source that fails becomes a
//! [`Probe::Unavailable`] in the report; nothing here aborts a scan.
use crate::command::CommandRunner;
use crate::normalize::{MemoryInfo, parse_bus_listing, parse_ip_addr, parse_meminfo};
use crate::report::{
    Category, DeviceRecord, NetworkInterface, Probe, ScanReport, ScanType, SystemFacts, UNKNOWN,
};
use std::fs;
use std::path::PathBuf;
use sysinfo::{CpuRefreshKind, RefreshKind, System};
use tracing::{debug, warn};

const MEMINFO_PATH: &str = "/proc/meminfo";

pub struct Collector<R> {
    runner: R,
    meminfo_path: PathBuf,
}

impl<R: CommandRunner> Collector<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            meminfo_path: PathBuf::from(MEMINFO_PATH),
        }
    }

    /// Reads memory figures from `path` instead of `/proc/meminfo`.
    pub fn with_meminfo_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.meminfo_path = path.into();
        self
    }

    /// Runs every source `scan_type` asks for and assembles the report.
    pub fn scan(&self, scan_type: ScanType) -> ScanReport {
        debug!(%scan_type, "starting scan");
        let mut report = ScanReport {
            system_info: self.system_facts(),
            usb_devices: None,
            pci_devices: None,
            network: None,
            dmi_info: None,
            lshw: None,
        };

        for category in scan_type.categories() {
            match category {
                Category::Usb => report.usb_devices = Some(self.usb_devices()),
                Category::Pci => report.pci_devices = Some(self.pci_devices()),
                Category::Network => report.network = Some(self.network_interfaces()),
                Category::Dmi => report.dmi_info = Some(self.dmi_table()),
                Category::Hardware => report.lshw = Some(self.hardware_listing()),
            }
        }
        report
    }

    pub fn system_facts(&self) -> SystemFacts {
        let system = System::new_with_specifics(
            RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing()),
        );
        let processor = system
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .filter(|brand| !brand.is_empty());

        let memory = self.memory_info();

        SystemFacts {
            hostname: System::host_name().unwrap_or_else(|| UNKNOWN.to_string()),
            platform: System::long_os_version().unwrap_or_else(|| UNKNOWN.to_string()),
            processor: processor.unwrap_or_else(|| UNKNOWN.to_string()),
            architecture: std::env::consts::ARCH.to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Local::now().to_rfc3339(),
            kernel: self
                .probe("uname", &["-r"])
                .map(|release| release.trim().to_string())
                .or_unknown(),
            memory_total: memory.total.unwrap_or_else(|| UNKNOWN.to_string()),
            memory_free: memory.free.unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }

    fn memory_info(&self) -> MemoryInfo {
        match fs::read_to_string(&self.meminfo_path) {
            Ok(raw) => parse_meminfo(&raw),
            Err(e) => {
                warn!(path = %self.meminfo_path.display(), error = %e, "memory info unavailable");
                MemoryInfo::default()
            }
        }
    }

    pub fn usb_devices(&self) -> Probe<Vec<DeviceRecord>> {
        self.probe("lsusb", &[]).map(|raw| parse_bus_listing(&raw))
    }

    pub fn pci_devices(&self) -> Probe<Vec<DeviceRecord>> {
        self.probe("lspci", &[]).map(|raw| parse_bus_listing(&raw))
    }

    pub fn network_interfaces(&self) -> Probe<Vec<NetworkInterface>> {
        self.probe("ip", &["addr"]).map(|raw| parse_ip_addr(&raw))
    }

    pub fn dmi_table(&self) -> Probe<String> {
        self.probe("dmidecode", &[])
    }

    pub fn hardware_listing(&self) -> Probe<String> {
        self.probe("lshw", &["-short"])
    }

    fn probe(&self, program: &str, args: &[&str]) -> Probe<String> {
        match self.runner.output(program, args) {
            Ok(stdout) => Probe::Value(stdout),
            Err(e) => {
                warn!(program, error = %e, "source unavailable");
                Probe::unavailable(e.to_string())
            }
        }
    }
}
