//! Serializes a [`ScanReport`] into one of the supported output encodings.
use crate::report::{DeviceRecord, NetworkInterface, Probe, ScanReport};
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    #[default]
    Text,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to encode report as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "yaml")]
    #[error("failed to encode report as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub fn render(report: &ScanReport, format: Format) -> Result<String, RenderError> {
    match format {
        Format::Json => to_json(report),
        Format::Yaml => to_yaml(report),
        Format::Text => Ok(to_text(report)),
    }
}

pub fn to_json(report: &ScanReport) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(feature = "yaml")]
pub fn to_yaml(report: &ScanReport) -> Result<String, RenderError> {
    Ok(serde_yaml::to_string(report)?)
}

#[cfg(not(feature = "yaml"))]
pub fn to_yaml(report: &ScanReport) -> Result<String, RenderError> {
    tracing::warn!("built without YAML support, falling back to JSON output");
    to_json(report)
}

/// Human-readable listing: one heading per present section, in fixed order.
pub fn to_text(report: &ScanReport) -> String {
    TextReport(report).to_string()
}

struct TextReport<'a>(&'a ScanReport);

impl TextReport<'_> {
    fn devices(
        f: &mut fmt::Formatter<'_>,
        heading: &str,
        devices: &Probe<Vec<DeviceRecord>>,
    ) -> fmt::Result {
        write!(f, "\n=== {heading} ===")?;
        match devices {
            Probe::Value(records) => records.iter().try_for_each(|r| write!(f, "\n{r}")),
            Probe::Unavailable { unavailable } => write!(f, "\nError: {unavailable}"),
        }
    }

    fn raw(f: &mut fmt::Formatter<'_>, heading: &str, raw: &Probe<String>) -> fmt::Result {
        write!(f, "\n=== {heading} ===\n")?;
        match raw {
            Probe::Value(text) => f.write_str(text),
            Probe::Unavailable { unavailable } => write!(f, "Error: {unavailable}"),
        }
    }

    fn network(f: &mut fmt::Formatter<'_>, network: &Probe<Vec<NetworkInterface>>) -> fmt::Result {
        f.write_str("\n=== Network Interfaces ===")?;
        match network {
            Probe::Value(interfaces) => {
                for interface in interfaces {
                    write!(f, "\nInterface: {}", interface.name)?;
                    for detail in &interface.details {
                        write!(f, "\n  {detail}")?;
                    }
                }
                Ok(())
            }
            Probe::Unavailable { unavailable } => write!(f, "\nError: {unavailable}"),
        }
    }
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        f.write_str("=== System Information ===")?;
        for (key, value) in report.system_info.entries() {
            write!(f, "\n{key}: {value}")?;
        }

        if let Some(usb) = &report.usb_devices {
            Self::devices(f, "USB Devices", usb)?;
        }
        if let Some(pci) = &report.pci_devices {
            Self::devices(f, "PCI Devices", pci)?;
        }
        if let Some(network) = &report.network {
            Self::network(f, network)?;
        }
        if let Some(dmi) = &report.dmi_info {
            Self::raw(f, "DMI Information", dmi)?;
        }
        if let Some(lshw) = &report.lshw {
            Self::raw(f, "Hardware Information", lshw)?;
        }
        Ok(())
    }
}
