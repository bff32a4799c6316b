//! The typed scan report and the scan types that shape it.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder for a system fact that could not be determined.
pub const UNKNOWN: &str = "unknown";

/// Outcome of asking one information source for its data.
///
/// A source that fails is recorded as `Unavailable` with the reason instead
/// of aborting the scan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Probe<T> {
    Value(T),
    Unavailable { unavailable: String },
}

impl<T> Probe<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Probe::Unavailable {
            unavailable: reason.into(),
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Probe::Value(v) => Some(v),
            Probe::Unavailable { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Probe<U> {
        match self {
            Probe::Value(v) => Probe::Value(f(v)),
            Probe::Unavailable { unavailable } => Probe::Unavailable { unavailable },
        }
    }
}

impl Probe<String> {
    /// Collapses the probe into a plain fact string.
    pub fn or_unknown(self) -> String {
        match self {
            Probe::Value(v) => v,
            Probe::Unavailable { .. } => UNKNOWN.to_string(),
        }
    }
}

/// Scalar facts about the running host. Every field is always present;
/// facts that could not be read hold [`UNKNOWN`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemFacts {
    pub hostname: String,
    pub platform: String,
    pub processor: String,
    pub architecture: String,
    pub tool_version: String,
    pub timestamp: String,
    pub kernel: String,
    pub memory_total: String,
    pub memory_free: String,
}

impl SystemFacts {
    /// Facts as `(name, value)` pairs in report order.
    pub fn entries(&self) -> [(&'static str, &str); 9] {
        [
            ("hostname", self.hostname.as_str()),
            ("platform", self.platform.as_str()),
            ("processor", self.processor.as_str()),
            ("architecture", self.architecture.as_str()),
            ("tool_version", self.tool_version.as_str()),
            ("timestamp", self.timestamp.as_str()),
            ("kernel", self.kernel.as_str()),
            ("memory_total", self.memory_total.as_str()),
            ("memory_free", self.memory_free.as_str()),
        ]
    }
}

/// One line of bus-listing output, kept verbatim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceRecord(pub String);

impl fmt::Display for DeviceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub name: String,
    pub details: Vec<String>,
}

/// Everything one scan gathered. Sections the scan type did not ask for
/// are `None` and are left out of every encoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    pub system_info: SystemFacts,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usb_devices: Option<Probe<Vec<DeviceRecord>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pci_devices: Option<Probe<Vec<DeviceRecord>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network: Option<Probe<Vec<NetworkInterface>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dmi_info: Option<Probe<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lshw: Option<Probe<String>>,
}

/// An optional report section. System facts are always gathered and have
/// no category.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Usb,
    Pci,
    Network,
    Dmi,
    Hardware,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScanType {
    Full,
    #[default]
    Quick,
    Network,
    Usb,
    Pci,
}

impl ScanType {
    /// The sections this scan type gathers, in collection order.
    pub fn categories(self) -> &'static [Category] {
        use Category::*;
        match self {
            ScanType::Full => &[Usb, Pci, Network, Dmi, Hardware],
            ScanType::Quick => &[Usb, Pci],
            ScanType::Network => &[Network],
            ScanType::Usb => &[Usb],
            ScanType::Pci => &[Pci],
        }
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScanType::Full => "full",
            ScanType::Quick => "quick",
            ScanType::Network => "network",
            ScanType::Usb => "usb",
            ScanType::Pci => "pci",
        };
        f.write_str(name)
    }
}
