//! Parsers that turn raw tool output into report records.
use crate::report::{DeviceRecord, NetworkInterface};

/// The `MemTotal` and `MemFree` values of a `/proc/meminfo` dump, as the
/// first token after each label (the unit is dropped).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryInfo {
    pub total: Option<String>,
    pub free: Option<String>,
}

pub fn parse_meminfo(raw: &str) -> MemoryInfo {
    let mut info = MemoryInfo::default();
    for line in raw.lines() {
        if let Some(rest) = line.strip_prefix("MemTotal:") {
            info.total = rest.split_whitespace().next().map(str::to_string);
        } else if let Some(rest) = line.strip_prefix("MemFree:") {
            info.free = rest.split_whitespace().next().map(str::to_string);
        }
    }
    info
}

/// One record per non-blank line of `lsusb`/`lspci` style output.
pub fn parse_bus_listing(raw: &str) -> Vec<DeviceRecord> {
    raw.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| DeviceRecord(line.to_string()))
        .collect()
}

#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    /// `2: eth0: <BROADCAST,...>` names the interface `eth0`.
    Header(&'a str),
    /// Indented continuation of the current interface.
    Detail(&'a str),
    /// Unindented line without a second colon-separated field.
    Malformed,
}

fn classify(line: &str) -> Line<'_> {
    if line.starts_with(char::is_whitespace) {
        return Line::Detail(line.trim());
    }
    let mut fields = line.splitn(3, ':');
    fields.next();
    match fields.next() {
        Some(name) => Line::Header(name.trim()),
        None => Line::Malformed,
    }
}

enum State {
    NoCurrentInterface,
    InInterface(NetworkInterface),
}

/// Groups `ip addr` output into interfaces.
///
/// Detail lines seen before the first header are dropped. Malformed header
/// lines neither open an interface nor close the current one.
pub fn parse_ip_addr(raw: &str) -> Vec<NetworkInterface> {
    let mut interfaces = Vec::new();
    let mut state = State::NoCurrentInterface;

    for line in raw.lines() {
        state = match (state, classify(line)) {
            (State::NoCurrentInterface, Line::Detail(_)) => State::NoCurrentInterface,
            (State::InInterface(mut current), Line::Detail(detail)) => {
                current.details.push(detail.to_string());
                State::InInterface(current)
            }
            (previous, Line::Header(name)) => {
                if let State::InInterface(done) = previous {
                    interfaces.push(done);
                }
                State::InInterface(NetworkInterface {
                    name: name.to_string(),
                    details: Vec::new(),
                })
            }
            (unchanged, Line::Malformed) => unchanged,
        };
    }

    if let State::InInterface(done) = state {
        interfaces.push(done);
    }
    interfaces
}
