//! Target device validation.
//!
//! A [`DeviceValidator`] decides, freshly on every call, whether a path may
//! be overwritten. Nothing is cached: the device behind a path can change
//! between runs.
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const SYS_BLOCK: &str = "/sys/block";

/// A block device that passed validation and may be written to.
#[derive(Clone, Debug)]
pub struct TargetDevice {
    /// The system path to the device (e.g., `/dev/sdb`).
    pub path: PathBuf,
    /// The kernel-provided name of the device (e.g., "sdb").
    pub name: String,
    /// The sysfs `removable` flag as read during validation.
    ///
    /// Invariant: [`DeviceValidator::validate`] rejects fixed disks, so every
    /// `TargetDevice` it returns carries `true` here.
    pub removable: bool,
    /// The total size of the device in gigabytes (GB), 0 when unknown.
    pub size_gb: f64,
}

impl fmt::Display for TargetDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.size_gb > 0.0 {
            write!(f, "{} ({:.1} GB)", self.path.display(), self.size_gb)
        } else {
            write!(f, "{}", self.path.display())
        }
    }
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{0}: device not found")]
    NotFound(PathBuf),
    #[error("{path}: cannot determine removability, treating as non-removable")]
    RemovabilityUnknown {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0}: device not removable, refusing to target a fixed disk")]
    NotRemovable(PathBuf),
    #[error("{0}: device hosts the running system")]
    SystemDisk(PathBuf),
}

/// Maps a partition path to its parent disk (e.g., `/dev/sda1` -> `/dev/sda`,
/// `/dev/nvme0n1p2` -> `/dev/nvme0n1`).
pub fn parent_device_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();

    if path_str.starts_with("/dev/sd") || path_str.starts_with("/dev/vd") {
        let trimmed = path_str.trim_end_matches(|c: char| c.is_ascii_digit());
        return PathBuf::from(trimmed);
    }
    if path_str.starts_with("/dev/mmcblk") || path_str.starts_with("/dev/nvme") {
        if let Some(index) = path_str.rfind('p') {
            let suffix = &path_str[index + 1..];
            if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) {
                return PathBuf::from(&path_str[..index]);
            }
        }
    }

    path.to_path_buf()
}

/// Finds the disk holding the root filesystem, if `sysinfo` can see it.
pub fn system_disk() -> Option<PathBuf> {
    let disks = sysinfo::Disks::new_with_refreshed_list();
    disks
        .iter()
        .find(|disk| disk.mount_point() == Path::new("/"))
        .map(|disk| parent_device_path(&PathBuf::from("/dev/").join(disk.name())))
}

pub struct DeviceValidator {
    sys_block: PathBuf,
    system_disk: Option<PathBuf>,
}

impl Default for DeviceValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceValidator {
    /// A validator over the live `/sys/block` that also refuses the system disk.
    pub fn new() -> Self {
        Self {
            sys_block: PathBuf::from(SYS_BLOCK),
            system_disk: system_disk(),
        }
    }

    /// A validator reading device metadata below `sys_block`, with no system
    /// disk exclusion.
    pub fn with_sys_block(sys_block: impl Into<PathBuf>) -> Self {
        Self {
            sys_block: sys_block.into(),
            system_disk: None,
        }
    }

    pub fn excluding(mut self, system_disk: impl Into<PathBuf>) -> Self {
        self.system_disk = Some(system_disk.into());
        self
    }

    fn read_sys_file(&self, device_name: &str, file: &str) -> io::Result<String> {
        let path = self.sys_block.join(device_name).join(file);
        fs::read_to_string(path).map(|s| s.trim().to_string())
    }

    pub fn validate(&self, path: &Path) -> Result<TargetDevice, ValidationError> {
        if !path.exists() {
            return Err(ValidationError::NotFound(path.to_path_buf()));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let removable = self
            .read_sys_file(&name, "removable")
            .map_err(|source| ValidationError::RemovabilityUnknown {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(device = %path.display(), removable = %removable, "read removable flag");
        if removable != "1" {
            return Err(ValidationError::NotRemovable(path.to_path_buf()));
        }

        if self.system_disk.as_deref() == Some(path) {
            return Err(ValidationError::SystemDisk(path.to_path_buf()));
        }

        let size_sectors = self
            .read_sys_file(&name, "size")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);
        let size_gb = (size_sectors * 512) as f64 / (1024.0 * 1024.0 * 1024.0);

        Ok(TargetDevice {
            path: path.to_path_buf(),
            name,
            removable: true,
            size_gb,
        })
    }
}
