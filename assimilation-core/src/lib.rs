//! The core, UI-agnostic library for the assimilation tools.
//!
//! `assimilation-core` backs two operator front-ends: a hardware inventory
//! scanner and a USB media provisioning tool. It handles running discovery
//! tools, normalizing their output into a typed report, and the safety-gated
//! write onto removable media.
//!
//! The library is structured into several key modules:
//! - [`command`]: The [`command::CommandRunner`] seam over external programs.
//! - [`collect`], [`normalize`], [`report`]: Gathering and shaping a
//!   [`report::ScanReport`].
//! - [`render`]: JSON, YAML and plain-text encodings of a report.
//! - [`device`]: Validating that a target is an existing, removable disk.
//! - [`confirm`]: The interactive confirmation gate and its `--force` bypass.
//! - [`transfer`]: Clone, install and Ventoy setup.
//! - [`assimilate`]: The validate, confirm, write sequence.
//!
//! ## Example: Scanning the host
//!
//! ```rust,no_run
//! use assimilation_core::collect::Collector;
//! use assimilation_core::command::SystemRunner;
//! use assimilation_core::render::{render, Format};
//! use assimilation_core::report::ScanType;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let report = Collector::new(SystemRunner).scan(ScanType::Quick);
//!     println!("{}", render(&report, Format::Json)?);
//!     Ok(())
//! }
//! ```

pub mod assimilate;
pub mod collect;
pub mod command;
pub mod config;
pub mod confirm;
pub mod device;
pub mod normalize;
pub mod render;
pub mod report;
pub mod transfer;
