//! Transparent compression for job inputs and outputs.
//!
//! Inputs are matched to a [`CompressionCodec`] by file extension first and by
//! magic bytes second, so `access.log.gz` and a gzip file without the suffix
//! both read as plain lines. Outputs are matched by extension only.
//!
//! Gzip is built in behind the `compression-gzip` feature (on by default).
//! Other codecs can be added at runtime with [`register_codec`].
//!
//! ```no_run
//! use tabreduce::io::compression::{auto_detect_reader, auto_detect_writer};
//! use std::fs::File;
//! # fn main() -> anyhow::Result<()> {
//! let reader = auto_detect_reader(File::open("hits.tsv.gz")?, "hits.tsv.gz")?;
//! let writer = auto_detect_writer(File::create("totals.tsv.gz")?, "totals.tsv.gz")?;
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

static CODEC_REGISTRY: RwLock<Option<Vec<Arc<dyn CompressionCodec>>>> = RwLock::new(None);

fn builtin_codecs() -> Vec<Arc<dyn CompressionCodec>> {
    vec![
        #[cfg(feature = "compression-gzip")]
        Arc::new(GzipCodec),
    ]
}

fn registry() -> Vec<Arc<dyn CompressionCodec>> {
    let mut lock = CODEC_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    lock.get_or_insert_with(builtin_codecs).clone()
}

/// Register an additional codec, consulted after the built-in ones.
pub fn register_codec(codec: Arc<dyn CompressionCodec>) {
    let mut lock = CODEC_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    lock.get_or_insert_with(builtin_codecs).push(codec);
}

/// A stream compression format.
///
/// Implementations live in a process-wide registry, hence `Send + Sync`.
pub trait CompressionCodec: Send + Sync {
    /// Short name used in logs and error context, e.g. `gzip`.
    fn name(&self) -> &str;

    /// Lowercase file suffixes including the dot, e.g. `&[".gz"]`.
    fn extensions(&self) -> &[&str];

    /// Leading bytes identifying the format, if it has any.
    fn magic_bytes(&self) -> Option<&[u8]>;

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>>;

    fn wrap_writer_dyn(&self, writer: Box<dyn Write>) -> std::io::Result<Box<dyn Write>>;
}

fn detect_from_extension(path: &Path) -> Option<Arc<dyn CompressionCodec>> {
    let name = path.to_string_lossy().to_lowercase();
    registry()
        .into_iter()
        .find(|codec| codec.extensions().iter().any(|ext| name.ends_with(ext)))
}

/// Peeks without consuming.
fn detect_from_magic<R: BufRead>(reader: &mut R) -> Option<Arc<dyn CompressionCodec>> {
    let buf = reader.fill_buf().ok()?;
    if buf.is_empty() {
        return None;
    }
    registry()
        .into_iter()
        .find(|codec| codec.magic_bytes().is_some_and(|magic| buf.starts_with(magic)))
}

/// Wrap `reader` in a decompressor when `path_hint` or the stream's first bytes
/// name a registered codec; otherwise return it buffered as-is.
///
/// # Errors
/// Returns an error if the codec fails to wrap the stream.
pub fn auto_detect_reader<R: Read + 'static>(
    reader: R,
    path_hint: impl AsRef<Path>,
) -> Result<Box<dyn Read>> {
    let path = path_hint.as_ref();
    if let Some(codec) = detect_from_extension(path) {
        debug!(codec = codec.name(), path = %path.display(), "decompressing input by extension");
        return codec
            .wrap_reader_dyn(Box::new(reader))
            .with_context(|| format!("wrap reader with {} codec", codec.name()));
    }

    let mut buf_reader = BufReader::new(reader);
    if let Some(codec) = detect_from_magic(&mut buf_reader) {
        debug!(codec = codec.name(), path = %path.display(), "decompressing input by magic bytes");
        return codec
            .wrap_reader_dyn(Box::new(buf_reader))
            .with_context(|| format!("wrap reader with {} codec", codec.name()));
    }

    Ok(Box::new(buf_reader))
}

/// Wrap `writer` in a compressor when `path_hint`'s extension names a
/// registered codec; otherwise return it buffered.
///
/// Flushing the returned writer finalizes a gzip stream and reports any
/// error doing so; dropping it finalizes too but loses that error.
///
/// # Errors
/// Returns an error if the codec fails to wrap the stream.
pub fn auto_detect_writer<W: Write + 'static>(
    writer: W,
    path_hint: impl AsRef<Path>,
) -> Result<Box<dyn Write>> {
    if let Some(codec) = detect_from_extension(path_hint.as_ref()) {
        return codec
            .wrap_writer_dyn(Box::new(writer))
            .with_context(|| format!("wrap writer with {} codec", codec.name()));
    }
    Ok(Box::new(BufWriter::new(writer)))
}

/* ===================== gzip ===================== */

#[cfg(feature = "compression-gzip")]
struct GzipCodec;

#[cfg(feature = "compression-gzip")]
impl CompressionCodec for GzipCodec {
    fn name(&self) -> &str {
        "gzip"
    }

    fn extensions(&self) -> &[&str] {
        &[".gz", ".gzip"]
    }

    fn magic_bytes(&self) -> Option<&[u8]> {
        Some(&[0x1f, 0x8b])
    }

    fn wrap_reader_dyn(&self, reader: Box<dyn Read>) -> std::io::Result<Box<dyn Read>> {
        use flate2::read::MultiGzDecoder;
        Ok(Box::new(MultiGzDecoder::new(reader)))
    }

    fn wrap_writer_dyn(&self, writer: Box<dyn Write>) -> std::io::Result<Box<dyn Write>> {
        Ok(Box::new(BufWriter::new(GzipMembers::new(writer))))
    }
}

/// Gzip writer whose `flush` completes the current member, trailer included.
///
/// Writes after a flush open a new member; the result is a multi-member file,
/// which [`flate2::read::MultiGzDecoder`] reads back as one stream.
#[cfg(feature = "compression-gzip")]
enum GzipMembers {
    Open(flate2::write::GzEncoder<Box<dyn Write>>),
    Closed(Box<dyn Write>),
    Failed,
}

#[cfg(feature = "compression-gzip")]
impl GzipMembers {
    fn new(writer: Box<dyn Write>) -> Self {
        Self::Open(flate2::write::GzEncoder::new(
            writer,
            flate2::Compression::default(),
        ))
    }

    fn failed() -> std::io::Error {
        std::io::Error::other("gzip output failed earlier")
    }
}

#[cfg(feature = "compression-gzip")]
impl Write for GzipMembers {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        if matches!(self, Self::Closed(_))
            && let Self::Closed(inner) = std::mem::replace(self, Self::Failed)
        {
            *self = Self::new(inner);
        }
        match self {
            Self::Open(encoder) => encoder.write(buf),
            Self::Closed(_) | Self::Failed => Err(Self::failed()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut inner = match std::mem::replace(self, Self::Failed) {
            Self::Open(encoder) => encoder.finish()?,
            Self::Closed(inner) => inner,
            Self::Failed => return Err(Self::failed()),
        };
        inner.flush()?;
        *self = Self::Closed(inner);
        Ok(())
    }
}
