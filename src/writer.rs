//! Sequential write support for library-mode streams.
//!
//! Writing goes through the in-process codecs only; the external-process
//! path is read-only by design and rejects write modes at construction.
//!
//! Writers mirror the reader lifecycle: `close` is idempotent, finishes the
//! codec stream (emitting any trailer), and releases the descriptor; writes
//! after `close` fail with [`ZseqError::StreamClosed`]. `Drop` closes, so an
//! unclosed writer still produces a complete compressed stream, though any
//! final flush error is only logged at that point.

use crate::error::{Result, ZseqError};
use crate::text::{Newline, TextOptions};
use encoding_rs::{Encoding, UTF_8};
use std::borrow::Cow;
use std::fs::File;
use std::io::Write;

/// Seam trait for the byte sinks a writer can wrap.
///
/// `finish_stream` is invoked exactly once when the owning writer closes;
/// codec encoders use it to write their trailer and flush.
pub trait SinkStream: Write + Send {
    fn finish_stream(&mut self) -> std::io::Result<()> {
        self.flush()
    }
}

impl SinkStream for File {}

impl SinkStream for Box<dyn SinkStream> {
    fn finish_stream(&mut self) -> std::io::Result<()> {
        (**self).finish_stream()
    }
}

/// Binary-mode sequential writer over a [`SinkStream`].
pub struct ByteWriter<W: SinkStream> {
    // None once closed; doubles as the use-after-close flag
    inner: Option<W>,
}

impl<W: SinkStream> ByteWriter<W> {
    pub fn new(sink: W) -> Self {
        Self { inner: Some(sink) }
    }

    fn sink(&mut self) -> Result<&mut W> {
        self.inner.as_mut().ok_or(ZseqError::StreamClosed)
    }

    /// Write all of `data` to the stream.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        self.sink()?.write_all(data)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.sink()?.flush()?;
        Ok(())
    }

    /// Finish the stream and release the sink. Idempotent, never fails;
    /// a failed final flush is logged.
    pub fn close(&mut self) {
        if let Some(mut sink) = self.inner.take() {
            if let Err(e) = sink.finish_stream() {
                log::warn!("failed to finish output stream: {e}");
            }
        }
    }
}

impl<W: SinkStream> Drop for ByteWriter<W> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Text-mode sequential writer over a [`SinkStream`].
///
/// Text is newline-translated per the configured [`Newline`] policy and
/// encoded with the configured encoding before it reaches the sink.
/// Unmappable characters are replaced with the encoding's standard
/// substitution; the strict/ignore read policies do not apply on the write
/// side.
pub struct TextWriter<W: SinkStream> {
    inner: ByteWriter<W>,
    encoding: &'static Encoding,
    newline: Newline,
}

impl<W: SinkStream> TextWriter<W> {
    pub fn new(sink: W, options: TextOptions) -> Self {
        Self {
            inner: ByteWriter::new(sink),
            encoding: options.encoding,
            newline: options.newline,
        }
    }

    /// Write `text` to the stream.
    pub fn write(&mut self, text: &str) -> Result<()> {
        let translated = translate_newlines(text, self.newline);
        if self.encoding == UTF_8 {
            self.inner.write(translated.as_bytes())
        } else {
            let (encoded, _, _) = self.encoding.encode(&translated);
            self.inner.write(&encoded)
        }
    }

    /// Write `line` followed by the policy's line terminator.
    pub fn write_line(&mut self, line: &str) -> Result<()> {
        self.write(line)?;
        self.write("\n")
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }

    /// Finish the stream and release the sink. Idempotent, never fails.
    pub fn close(&mut self) {
        self.inner.close();
    }
}

fn translate_newlines(text: &str, newline: Newline) -> Cow<'_, str> {
    let terminator = match newline {
        // Universal write translation targets the platform terminator
        #[cfg(windows)]
        Newline::Universal => "\r\n",
        #[cfg(not(windows))]
        Newline::Universal => "\n",
        Newline::Passthrough | Newline::Lf => "\n",
        Newline::Cr => "\r",
        Newline::CrLf => "\r\n",
    };
    if terminator == "\n" || !text.contains('\n') {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.replace('\n', terminator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    // Shared buffer so the written bytes survive the writer
    #[derive(Clone, Default)]
    struct MemSink(Arc<Mutex<Vec<u8>>>);

    impl MemSink {
        fn contents(&self) -> Vec<u8> {
            self.0.lock().unwrap().clone()
        }
    }

    impl Write for MemSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl SinkStream for MemSink {}

    #[test]
    fn test_byte_writer_roundtrip() {
        let sink = MemSink::default();
        let mut w = ByteWriter::new(sink.clone());
        w.write(b"line 1\n").unwrap();
        w.write(b"line 2\n").unwrap();
        w.close();
        assert_eq!(sink.contents(), b"line 1\nline 2\n");
    }

    #[test]
    fn test_write_after_close() {
        let mut w = ByteWriter::new(MemSink::default());
        w.close();
        assert!(matches!(w.write(b"data"), Err(ZseqError::StreamClosed)));
        assert!(matches!(w.flush(), Err(ZseqError::StreamClosed)));
        w.close();
        w.close();
    }

    #[test]
    fn test_text_writer_encodes_utf8() {
        let sink = MemSink::default();
        let mut w = TextWriter::new(sink.clone(), TextOptions::default());
        w.write("line 3\u{2026}\n").unwrap();
        w.close();
        assert_eq!(sink.contents(), b"line 3\xe2\x80\xa6\n");
    }

    #[test]
    fn test_text_writer_crlf_translation() {
        let sink = MemSink::default();
        let options = TextOptions::default().newline(Newline::CrLf);
        let mut w = TextWriter::new(sink.clone(), options);
        w.write_line("one").unwrap();
        w.close();
        assert_eq!(sink.contents(), b"one\r\n");
    }

    #[test]
    fn test_text_writer_non_utf8_encoding() {
        let sink = MemSink::default();
        let options = TextOptions::default().encoding(encoding_rs::WINDOWS_1252);
        let mut w = TextWriter::new(sink.clone(), options);
        w.write("caf\u{e9}").unwrap();
        w.close();
        assert_eq!(sink.contents(), b"caf\xe9");
    }
}
