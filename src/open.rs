//! Public entry point tying suffix dispatch and strategy selection together.
//!
//! [`open`] inspects the file name suffix, picks a decompression (or
//! compression) strategy, and returns a [`SeqFile`] holding the stream for
//! the requested mode. Strategy priority with `external` requested:
//! parallel-capable external tool (when `parallel` is also set), then the
//! serial external tool, then the in-process codec.

use crate::error::{Result, ZseqError};
use crate::exec::ExternalTools;
use crate::format::Format;
use crate::process::{ProcessStream, StreamInput};
use crate::reader::{ByteReader, SourceStream};
use crate::text::{TextOptions, TextReader};
use crate::writer::{ByteWriter, SinkStream, TextWriter};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// The four supported open modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// `rt` - read decoded text
    ReadText,
    /// `rb` - read raw bytes
    ReadBinary,
    /// `wt` - write encoded text
    WriteText,
    /// `wb` - write raw bytes
    WriteBinary,
}

impl OpenMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReadText => "rt",
            Self::ReadBinary => "rb",
            Self::WriteText => "wt",
            Self::WriteBinary => "wb",
        }
    }

    pub fn is_read(&self) -> bool {
        matches!(self, Self::ReadText | Self::ReadBinary)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::ReadText | Self::WriteText)
    }
}

impl FromStr for OpenMode {
    type Err = ZseqError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "rt" => Ok(Self::ReadText),
            "rb" => Ok(Self::ReadBinary),
            "wt" => Ok(Self::WriteText),
            "wb" => Ok(Self::WriteBinary),
            other => Err(ZseqError::invalid_argument(format!(
                "unsupported mode {other:?}, must be one of rb, rt, wb, wt"
            ))),
        }
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options accepted by [`open`].
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    /// Text-mode decoding configuration (ignored in binary modes).
    pub text: TextOptions,
    /// Prefer an external decompressor process over the in-process codec.
    pub external: bool,
    /// With `external`, prefer the parallel-capable tool variant.
    pub parallel: bool,
    /// Resolved tool paths; `None` resolves from the environment at open
    /// time.
    pub tools: Option<ExternalTools>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: TextOptions) -> Self {
        self.text = text;
        self
    }

    pub fn external(mut self, external: bool) -> Self {
        self.external = external;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn tools(mut self, tools: ExternalTools) -> Self {
        self.tools = Some(tools);
        self
    }
}

/// An opened sequential file in one of the four modes.
pub enum SeqFile {
    ReadText(TextReader<Box<dyn SourceStream>>),
    ReadBinary(ByteReader<Box<dyn SourceStream>>),
    WriteText(TextWriter<Box<dyn SinkStream>>),
    WriteBinary(ByteWriter<Box<dyn SinkStream>>),
}

impl std::fmt::Debug for SeqFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ReadText(_) => "ReadText",
            Self::ReadBinary(_) => "ReadBinary",
            Self::WriteText(_) => "WriteText",
            Self::WriteBinary(_) => "WriteBinary",
        };
        f.debug_tuple(name).finish()
    }
}

impl SeqFile {
    /// The mode this file was opened in.
    pub fn mode(&self) -> OpenMode {
        match self {
            Self::ReadText(_) => OpenMode::ReadText,
            Self::ReadBinary(_) => OpenMode::ReadBinary,
            Self::WriteText(_) => OpenMode::WriteText,
            Self::WriteBinary(_) => OpenMode::WriteBinary,
        }
    }

    /// Tear down the underlying stream. Idempotent, never fails.
    pub fn close(&mut self) {
        match self {
            Self::ReadText(r) => crate::reader::SequentialRead::close(r),
            Self::ReadBinary(r) => crate::reader::SequentialRead::close(r),
            Self::WriteText(w) => w.close(),
            Self::WriteBinary(w) => w.close(),
        }
    }

    /// Unwrap the text reader; panics for other modes.
    pub fn into_text_reader(self) -> TextReader<Box<dyn SourceStream>> {
        match self {
            Self::ReadText(r) => r,
            other => panic!("stream was opened in mode {}", other.mode()),
        }
    }

    /// Unwrap the binary reader; panics for other modes.
    pub fn into_binary_reader(self) -> ByteReader<Box<dyn SourceStream>> {
        match self {
            Self::ReadBinary(r) => r,
            other => panic!("stream was opened in mode {}", other.mode()),
        }
    }

    /// Unwrap the text writer; panics for other modes.
    pub fn into_text_writer(self) -> TextWriter<Box<dyn SinkStream>> {
        match self {
            Self::WriteText(w) => w,
            other => panic!("stream was opened in mode {}", other.mode()),
        }
    }

    /// Unwrap the binary writer; panics for other modes.
    pub fn into_binary_writer(self) -> ByteWriter<Box<dyn SinkStream>> {
        match self {
            Self::WriteBinary(w) => w,
            other => panic!("stream was opened in mode {}", other.mode()),
        }
    }
}

/// Open `path` for sequential access, decompressing (or compressing)
/// transparently based on the file name suffix.
///
/// `mode` must be one of `rt`, `rb`, `wt`, `wb`; anything else fails with
/// [`ZseqError::InvalidArgument`] before any filesystem or process activity.
/// Writing through an external process is unsupported and fails with
/// [`ZseqError::NotImplemented`].
pub fn open(path: impl AsRef<Path>, mode: &str, options: OpenOptions) -> Result<SeqFile> {
    let mode: OpenMode = mode.parse()?;
    open_with_mode(path.as_ref(), mode, options)
}

fn open_with_mode(path: &Path, mode: OpenMode, options: OpenOptions) -> Result<SeqFile> {
    let format = Format::from_path(path);
    log::debug!(
        "opening {} as {} (mode {mode}, external={}, parallel={})",
        path.display(),
        format.name(),
        options.external,
        options.parallel
    );

    if mode.is_read() {
        let source = open_source(path, format, &options)?;
        Ok(if mode.is_text() {
            SeqFile::ReadText(TextReader::new(source, options.text))
        } else {
            SeqFile::ReadBinary(ByteReader::new(source))
        })
    } else {
        // `external`/`parallel` are meaningless for uncompressed output and
        // simply ignored, matching the read side's handling of plain files.
        if format.is_compressed() && options.external {
            return Err(ZseqError::not_implemented(
                "writing compressed data through an external process",
            ));
        }
        let sink = format.open_writer(path)?;
        Ok(if mode.is_text() {
            SeqFile::WriteText(TextWriter::new(sink, options.text))
        } else {
            SeqFile::WriteBinary(ByteWriter::new(sink))
        })
    }
}

/// Build the byte source for a read, honoring the external/parallel/library
/// priority order.
fn open_source(
    path: &Path,
    format: Format,
    options: &OpenOptions,
) -> Result<Box<dyn SourceStream>> {
    if format.is_compressed() && options.external {
        let tools = match &options.tools {
            Some(tools) => tools.clone(),
            None => ExternalTools::from_env(),
        };
        if let Some(argv) = format.external_command(&tools, options.parallel) {
            let stream = ProcessStream::spawn(&argv, StreamInput::Path(path))?;
            return Ok(Box::new(stream));
        }
        log::debug!(
            "no external {} tool available, using library codec",
            format.name()
        );
    }
    format.open_reader(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("rt".parse::<OpenMode>().unwrap(), OpenMode::ReadText);
        assert_eq!("rb".parse::<OpenMode>().unwrap(), OpenMode::ReadBinary);
        assert_eq!("wt".parse::<OpenMode>().unwrap(), OpenMode::WriteText);
        assert_eq!("wb".parse::<OpenMode>().unwrap(), OpenMode::WriteBinary);
    }

    #[test]
    fn test_invalid_modes_rejected() {
        for mode in ["x", "r", "w", "rbt", "", "RT", "a"] {
            let err = mode.parse::<OpenMode>().unwrap_err();
            assert!(
                matches!(err, ZseqError::InvalidArgument { .. }),
                "mode {mode:?} should be invalid"
            );
        }
    }

    #[test]
    fn test_invalid_mode_fails_before_io() {
        // The path does not exist; an invalid mode must win over that
        let err = open("/does/not/exist.gz", "x", OpenOptions::new()).unwrap_err();
        assert!(matches!(err, ZseqError::InvalidArgument { .. }));
    }

    #[test]
    fn test_external_compressed_write_is_not_implemented() {
        let options = OpenOptions::new()
            .external(true)
            .tools(ExternalTools::none());
        let err = open("/tmp/zseq-test-out.gz", "wb", options).unwrap_err();
        assert!(matches!(err, ZseqError::NotImplemented { .. }));
    }

    #[test]
    fn test_mode_predicates() {
        assert!(OpenMode::ReadText.is_read());
        assert!(OpenMode::ReadBinary.is_read());
        assert!(!OpenMode::WriteText.is_read());
        assert!(!OpenMode::WriteBinary.is_read());

        assert!(OpenMode::ReadText.is_text());
        assert!(OpenMode::WriteText.is_text());
        assert!(!OpenMode::ReadBinary.is_text());
        assert!(!OpenMode::WriteBinary.is_text());
    }

    #[test]
    fn test_mode_roundtrip_display() {
        for mode in ["rt", "rb", "wt", "wb"] {
            assert_eq!(mode.parse::<OpenMode>().unwrap().to_string(), mode);
        }
    }
}
