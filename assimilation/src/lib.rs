//! Shared pieces of the `hardware-scan` and `usb-assimilate` front-ends.
pub mod logging;
pub mod ui;
