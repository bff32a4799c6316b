//! Image sources: plain files, or `.gz`/`.xz`/`.zst` decoded while copying.
use super::TransferError;
use super::copy::Source;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;
use xz2::read::XzDecoder;
use zstd::stream::read::Decoder as ZstdDecoder;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Codec {
    Gzip,
    Xz,
    Zstd,
}

/// Picks a decoder from the file suffix, case-insensitively.
fn codec(path: &Path) -> Option<Codec> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "gz" | "gzip" => Some(Codec::Gzip),
        "xz" => Some(Codec::Xz),
        "zst" | "zstd" => Some(Codec::Zstd),
        _ => None,
    }
}

/// Opens an install image. Compressed images stream through their decoder,
/// so their decoded length is unknown until the copy ends.
pub fn open_image(path: &Path) -> Result<Source, TransferError> {
    let Some(codec) = codec(path) else {
        return Source::open(path);
    };

    debug!(image = %path.display(), ?codec, "decoding image while copying");
    let file = BufReader::new(File::open(path).map_err(|e| TransferError::io("open", path, e))?);
    let reader: Box<dyn Read> = match codec {
        Codec::Gzip => Box::new(GzDecoder::new(file)),
        Codec::Xz => Box::new(XzDecoder::new(file)),
        Codec::Zstd => Box::new(ZstdDecoder::with_buffer(file).map_err(|source| {
            TransferError::Decompress {
                path: path.to_path_buf(),
                source,
            }
        })?),
    };

    Ok(Source {
        path: path.to_path_buf(),
        reader,
        len: None,
    })
}
