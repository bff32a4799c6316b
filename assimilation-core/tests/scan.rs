use assimilation_core::collect::Collector;
use assimilation_core::command::{CommandError, CommandRunner};
use assimilation_core::render::{self, Format};
use assimilation_core::report::{Probe, ScanReport, ScanType};
use std::collections::HashMap;

const LSUSB: &str = "\
Bus 001 Device 001: ID 1d6b:0002 Linux Foundation 2.0 root hub
Bus 001 Device 004: ID 0781:5581 SanDisk Corp. Ultra
";

const IP_ADDR: &str = "\
1: lo: <LOOPBACK,UP,LOWER_UP> mtu 65536 qdisc noqueue state UNKNOWN group default qlen 1000
    link/loopback 00:00:00:00:00:00 brd 00:00:00:00:00:00
    inet 127.0.0.1/8 scope host lo
";

/// A host where every discovery tool is installed except `lspci`.
struct Host(HashMap<&'static str, &'static str>);

impl Host {
    fn new() -> Self {
        Self(HashMap::from([
            ("uname", "6.8.0-45-generic\n"),
            ("lsusb", LSUSB),
            ("ip", IP_ADDR),
            ("dmidecode", "# dmidecode 3.5\nSMBIOS 3.3.0 present.\n"),
            ("lshw", "H/W path  Device  Class   Description\n/0/100   bus     Motherboard\n"),
        ]))
    }
}

impl CommandRunner for Host {
    fn output(&self, program: &str, _args: &[&str]) -> Result<String, CommandError> {
        self.0
            .get(program)
            .map(|out| out.to_string())
            .ok_or_else(|| CommandError::NotFound {
                program: program.to_string(),
            })
    }

    fn status(&self, program: &str, args: &[&str]) -> Result<(), CommandError> {
        self.output(program, args).map(|_| ())
    }
}

fn sections(report: &ScanReport) -> [bool; 5] {
    [
        report.usb_devices.is_some(),
        report.pci_devices.is_some(),
        report.network.is_some(),
        report.dmi_info.is_some(),
        report.lshw.is_some(),
    ]
}

#[test]
fn each_scan_type_has_exactly_its_sections() {
    let collector = Collector::new(Host::new());
    let cases = [
        (ScanType::Full, [true, true, true, true, true]),
        (ScanType::Quick, [true, true, false, false, false]),
        (ScanType::Network, [false, false, true, false, false]),
        (ScanType::Usb, [true, false, false, false, false]),
        (ScanType::Pci, [false, true, false, false, false]),
    ];

    for (scan_type, expected) in cases {
        assert_eq!(sections(&collector.scan(scan_type)), expected, "{scan_type}");
    }
}

#[test]
fn missing_tool_degrades_only_its_section() {
    let report = Collector::new(Host::new()).scan(ScanType::Full);

    assert_eq!(report.system_info.kernel, "6.8.0-45-generic");
    assert_eq!(report.usb_devices.as_ref().unwrap().value().unwrap().len(), 2);
    assert!(matches!(report.pci_devices, Some(Probe::Unavailable { .. })));
    assert_eq!(report.network.as_ref().unwrap().value().unwrap()[0].details.len(), 2);
}

#[test]
fn full_report_survives_a_json_round_trip() {
    let report = Collector::new(Host::new()).scan(ScanType::Full);
    let json = render::render(&report, Format::Json).unwrap();
    let parsed: ScanReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, report);
}

#[test]
fn text_output_follows_section_order() {
    let report = Collector::new(Host::new()).scan(ScanType::Full);
    let text = render::render(&report, Format::Text).unwrap();

    let headings = [
        "=== System Information ===",
        "=== USB Devices ===",
        "=== PCI Devices ===",
        "=== Network Interfaces ===",
        "=== DMI Information ===",
        "=== Hardware Information ===",
    ];
    let positions: Vec<usize> = headings.iter().map(|h| text.find(h).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(text.contains("Interface: lo\n  link/loopback"));
    assert!(text.contains("\nError: lspci not found"));
}
