//! Raw block copy from a source stream onto a target device.
use super::{TransferError, TransferProgress};
use nix::ioctl_read;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::fs::{FileTypeExt, OpenOptionsExt};
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

/// Fixed transfer block: 4 MiB.
pub const BLOCK_SIZE: usize = 4 * 1024 * 1024;

/// Alignment for O_DIRECT buffers and write lengths. Covers both 512-byte
/// and 4K-native logical block sizes.
pub const DIRECT_IO_ALIGN: usize = 4096;

ioctl_read!(blkgetsize64, 0x12, 114, u64);

#[derive(Clone, Copy, Debug)]
pub struct CopyOptions {
    /// Open the target with `O_DIRECT`, bypassing the page cache.
    pub direct_io: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self { direct_io: true }
    }
}

/// Bytes to copy, with their length when it is known up front.
pub struct Source {
    pub path: PathBuf,
    pub reader: Box<dyn Read>,
    /// `None` for streams such as decompressors.
    pub len: Option<u64>,
}

impl Source {
    /// Opens a regular file or a block device. A block device's length
    /// comes from `BLKGETSIZE64`.
    pub fn open(path: &Path) -> Result<Self, TransferError> {
        let file = File::open(path).map_err(|e| TransferError::io("open", path, e))?;
        let len = byte_len(&file, path)?;
        Ok(Self {
            path: path.to_path_buf(),
            reader: Box::new(file),
            len: Some(len),
        })
    }
}

fn byte_len(file: &File, path: &Path) -> Result<u64, TransferError> {
    let metadata = file
        .metadata()
        .map_err(|e| TransferError::io("inspect", path, e))?;

    if !metadata.file_type().is_block_device() {
        return Ok(metadata.len());
    }

    let mut size_bytes: u64 = 0;
    // SAFETY: the fd is open for the duration of the call and the kernel
    // writes exactly one u64 through the pointer.
    unsafe { blkgetsize64(file.as_raw_fd(), &mut size_bytes) }
        .map_err(|errno| TransferError::io("size", path, errno.into()))?;
    Ok(size_bytes)
}

/// Length of an O_DIRECT write carrying `len` payload bytes.
pub fn padded_len(len: usize) -> usize {
    len.div_ceil(DIRECT_IO_ALIGN) * DIRECT_IO_ALIGN
}

/// Reads until `buf` is full or the stream ends.
fn fill(reader: &mut dyn Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Streams all of `source` onto the start of `target` in [`BLOCK_SIZE`]
/// chunks.
///
/// The target must already exist; it is neither created nor truncated.
/// Returns the number of source bytes written.
pub fn run(
    mut source: Source,
    target: &Path,
    options: &CopyOptions,
    progress: &mut dyn TransferProgress,
) -> Result<u64, TransferError> {
    if source.len == Some(0) {
        return Err(TransferError::EmptySource(source.path));
    }

    let mut open = OpenOptions::new();
    open.write(true);
    if options.direct_io {
        open.custom_flags(libc::O_DIRECT);
    }
    let mut target_file = open
        .open(target)
        .map_err(|e| TransferError::io("open", target, e))?;

    progress.copy_started(source.len);

    let mut buf = vec![0u8; BLOCK_SIZE + DIRECT_IO_ALIGN];
    let offset = buf.as_ptr().align_offset(DIRECT_IO_ALIGN);
    let buffer = &mut buf[offset..offset + BLOCK_SIZE];

    let mut written: u64 = 0;
    loop {
        let n = fill(source.reader.as_mut(), buffer)
            .map_err(|e| TransferError::io("read", &source.path, e))?;
        if n == 0 {
            break;
        }

        // A short final chunk is zero-padded for O_DIRECT.
        let chunk = if options.direct_io {
            let padded = padded_len(n);
            buffer[n..padded].fill(0);
            padded
        } else {
            n
        };

        target_file
            .write_all(&buffer[..chunk])
            .map_err(|e| TransferError::io("write", target, e))?;
        written += n as u64;
        progress.copied(written);

        if n < BLOCK_SIZE {
            break;
        }
    }

    if written == 0 {
        return Err(TransferError::EmptySource(source.path));
    }

    target_file
        .flush()
        .and_then(|()| target_file.sync_all())
        .map_err(|e| TransferError::io("sync", target, e))?;
    Ok(written)
}
