//! Compression format detection and per-format strategy selection.
//!
//! The format is a closed enum keyed off the file name suffix, so dispatch
//! is exhaustive at compile time instead of going through a runtime lookup
//! table. Each variant knows how to build the argv for its external
//! decompressor and how to construct its in-process codec streams.

use crate::error::{Result, ZseqError};
use crate::exec::ExternalTools;
use crate::reader::SourceStream;
use crate::writer::SinkStream;
use bzip2::read::MultiBzDecoder;
use bzip2::write::BzEncoder;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use xz2::read::XzDecoder;
use xz2::write::XzEncoder;

/// Supported compression formats for transparent file access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// No compression - plain file
    None,
    /// Gzip compression (.gz files)
    Gzip,
    /// Bzip2 compression (.bz2 files)
    Bzip2,
    /// XZ/LZMA compression (.xz and .lzma files)
    Xz,
}

// Deterministic, longest-suffix-first dispatch table. The suffixes are
// disjoint today; keeping the table ordered means a future overlapping
// entry cannot depend on map iteration order.
const SUFFIXES: &[(&str, Format)] = &[
    (".lzma", Format::Xz),
    (".bz2", Format::Bzip2),
    (".gz", Format::Gzip),
    (".xz", Format::Xz),
];

impl Format {
    /// Detect the format from the trailing suffix of a file name.
    ///
    /// Matching is a case-sensitive exact suffix comparison; an unrecognized
    /// (or non-UTF-8) name is treated as uncompressed.
    pub fn from_path(path: &Path) -> Format {
        let Some(name) = path.as_os_str().to_str() else {
            return Format::None;
        };
        for (suffix, format) in SUFFIXES {
            if name.ends_with(suffix) {
                return *format;
            }
        }
        Format::None
    }

    /// Get human-readable name for the format
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Xz => "xz",
        }
    }

    /// Check if this format represents compressed data
    pub fn is_compressed(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Argv for decompressing this format through an external process
    /// (`<tool> -c -d`), or `None` when no suitable tool is resolved.
    ///
    /// With `parallel`, the multi-core variant (pigz, pbzip2) is preferred
    /// and the serial tool is the fallback. `Format::None` never uses an
    /// external process.
    pub fn external_command(
        &self,
        tools: &ExternalTools,
        parallel: bool,
    ) -> Option<Vec<OsString>> {
        let tool = match self {
            Self::None => None,
            Self::Gzip => {
                if parallel {
                    tools.pigz.as_ref().or(tools.gzip.as_ref())
                } else {
                    tools.gzip.as_ref()
                }
            }
            Self::Bzip2 => {
                if parallel {
                    tools.pbzip2.as_ref().or(tools.bzip2.as_ref())
                } else {
                    tools.bzip2.as_ref()
                }
            }
            // xz decompresses .lzma as well; no parallel variant is known
            Self::Xz => tools.xz.as_ref(),
        }?;
        Some(decompress_argv(tool))
    }

    /// Open `path` for reading through the in-process codec for this format.
    pub fn open_reader(&self, path: &Path) -> Result<Box<dyn SourceStream>> {
        let file = File::open(path)
            .map_err(|e| ZseqError::file(format!("Failed to open {}", path.display()), e))?;
        Ok(match self {
            Self::None => Box::new(file),
            Self::Gzip => Box::new(MultiGzDecoder::new(BufReader::new(file))),
            Self::Bzip2 => Box::new(MultiBzDecoder::new(BufReader::new(file))),
            Self::Xz => Box::new(XzDecoder::new_multi_decoder(BufReader::new(file))),
        })
    }

    /// Create `path` for writing through the in-process codec for this
    /// format.
    pub fn open_writer(&self, path: &Path) -> Result<Box<dyn SinkStream>> {
        let file = File::create(path)
            .map_err(|e| ZseqError::file(format!("Failed to create {}", path.display()), e))?;
        Ok(match self {
            Self::None => Box::new(file),
            Self::Gzip => Box::new(GzEncoder::new(
                BufWriter::new(file),
                flate2::Compression::default(),
            )),
            Self::Bzip2 => Box::new(BzEncoder::new(
                BufWriter::new(file),
                bzip2::Compression::default(),
            )),
            Self::Xz => Box::new(XzEncoder::new(BufWriter::new(file), 6)),
        })
    }
}

fn decompress_argv(tool: &PathBuf) -> Vec<OsString> {
    vec![
        tool.clone().into_os_string(),
        OsString::from("-c"),
        OsString::from("-d"),
    ]
}

// The in-process codec streams need nothing beyond dropping on shutdown
impl<R: Read + Send> SourceStream for MultiGzDecoder<R> {}
impl<R: Read + Send> SourceStream for MultiBzDecoder<R> {}
impl<R: Read + Send> SourceStream for XzDecoder<R> {}

// Encoders must emit their trailer before the descriptor drops
impl<W: Write + Send> SinkStream for GzEncoder<W> {
    fn finish_stream(&mut self) -> std::io::Result<()> {
        self.try_finish()?;
        self.get_mut().flush()
    }
}

impl<W: Write + Send> SinkStream for BzEncoder<W> {
    fn finish_stream(&mut self) -> std::io::Result<()> {
        self.try_finish()?;
        self.get_mut().flush()
    }
}

impl<W: Write + Send> SinkStream for XzEncoder<W> {
    fn finish_stream(&mut self) -> std::io::Result<()> {
        self.try_finish()?;
        self.get_mut().flush()
    }
}
