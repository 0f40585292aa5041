//! Text-mode decoding layer for sequential streams.
//!
//! [`TextReader`] wraps a byte source in an incremental decoder so that
//! text-mode reads always hand out complete characters, even when a
//! multi-byte sequence straddles the chunk boundary of an underlying pipe
//! read. Decoding uses `encoding_rs`; the decoder, not the reader, buffers
//! partial sequences between chunks.
//!
//! Three policies are independently configurable through [`TextOptions`]:
//! the character encoding (default UTF-8), what to do with malformed input
//! ([`DecodeErrors`], default strict), and newline handling ([`Newline`],
//! default universal translation).

use crate::error::{Result, ZseqError};
use crate::reader::{SequentialRead, SourceStream};
use encoding_rs::{Decoder, DecoderResult, Encoding, UTF_8};
use std::io::Read;
use std::mem;

// Pipe reads happen in chunks of this size before decoding
const CHUNK_SIZE: usize = 8 * 1024;

/// Policy for malformed byte sequences encountered while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeErrors {
    /// Fail the read that encounters the malformed data.
    #[default]
    Strict,
    /// Substitute U+FFFD REPLACEMENT CHARACTER.
    Replace,
    /// Drop the malformed bytes.
    Ignore,
}

/// Newline handling policy for text-mode streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Newline {
    /// Translate `\r\n` and bare `\r` to `\n` on read; lines end at `\n`.
    /// On write, `\n` is left as the platform terminator.
    #[default]
    Universal,
    /// No translation; lines end at `\n`.
    Passthrough,
    /// No translation; lines end at `\n`, and writes keep `\n`.
    Lf,
    /// No translation; lines end at `\r`, and writes translate `\n` to `\r`.
    Cr,
    /// No translation; lines end at `\r\n`, and writes translate `\n` to
    /// `\r\n`.
    CrLf,
}

impl Newline {
    /// The line terminator used by `read_line` under this policy.
    pub fn terminator(self) -> &'static str {
        match self {
            Newline::Universal | Newline::Passthrough | Newline::Lf => "\n",
            Newline::Cr => "\r",
            Newline::CrLf => "\r\n",
        }
    }
}

/// Configuration for the text decoding layer. Each field is independently
/// overridable; the defaults are UTF-8, strict errors, universal newlines.
///
/// The default encoding is always UTF-8 rather than a locale-derived
/// "platform preferred" one: locale lookup would make the default vary
/// between hosts reading the same file, and every other encoding remains
/// one [`encoding_rs`] label away via [`TextOptions::encoding`].
#[derive(Debug, Clone, Copy)]
pub struct TextOptions {
    pub encoding: &'static Encoding,
    pub errors: DecodeErrors,
    pub newline: Newline,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            encoding: UTF_8,
            errors: DecodeErrors::Strict,
            newline: Newline::Universal,
        }
    }
}

impl TextOptions {
    pub fn encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn errors(mut self, errors: DecodeErrors) -> Self {
        self.errors = errors;
        self
    }

    pub fn newline(mut self, newline: Newline) -> Self {
        self.newline = newline;
        self
    }
}

/// Text-mode sequential reader over a [`SourceStream`].
///
/// `read(Some(n))` counts decoded characters, not bytes. Lines respect the
/// configured [`Newline`] policy.
pub struct TextReader<R: SourceStream> {
    // None once closed; doubles as the use-after-close flag
    inner: Option<R>,
    decoder: Decoder,
    encoding: &'static Encoding,
    errors: DecodeErrors,
    newline: Newline,
    // Decoded, newline-translated text not yet handed out
    buf: String,
    // Universal mode: a CR at the end of a chunk is held back until the
    // next chunk tells us whether it starts a \r\n pair
    pending_cr: bool,
    eof: bool,
}

impl<R: SourceStream> TextReader<R> {
    pub fn new(source: R, options: TextOptions) -> Self {
        Self {
            inner: Some(source),
            decoder: options.encoding.new_decoder_without_bom_handling(),
            encoding: options.encoding,
            errors: options.errors,
            newline: options.newline,
            buf: String::new(),
            pending_cr: false,
            eof: false,
        }
    }

    /// Pull one chunk from the source, decode it, translate newlines, and
    /// append the result to the internal buffer.
    fn fill(&mut self) -> Result<()> {
        if self.eof {
            return Ok(());
        }
        let source = self.inner.as_mut().ok_or(ZseqError::StreamClosed)?;

        let mut raw = [0u8; CHUNK_SIZE];
        let n = source.read(&mut raw)?;
        let last = n == 0;

        let mut decoded = String::new();
        self.decode_chunk(&raw[..n], last, &mut decoded)?;

        match self.newline {
            Newline::Universal => self.translate_universal(&decoded),
            _ => self.buf.push_str(&decoded),
        }

        if last {
            if self.pending_cr {
                self.buf.push('\n');
                self.pending_cr = false;
            }
            self.eof = true;
        }
        Ok(())
    }

    /// Run the incremental decoder over one chunk, applying the configured
    /// error policy. `last` flushes the decoder so a trailing partial
    /// sequence is reported instead of silently dropped.
    fn decode_chunk(&mut self, chunk: &[u8], last: bool, out: &mut String) -> Result<()> {
        let mut pos = 0;
        loop {
            if let Some(needed) = self
                .decoder
                .max_utf8_buffer_length_without_replacement(chunk.len() - pos)
            {
                out.reserve(needed);
            }
            let (result, read) =
                self.decoder
                    .decode_to_string_without_replacement(&chunk[pos..], out, last);
            pos += read;
            match result {
                DecoderResult::InputEmpty => return Ok(()),
                DecoderResult::OutputFull => continue,
                DecoderResult::Malformed(_, _) => match self.errors {
                    DecodeErrors::Strict => {
                        return Err(ZseqError::Decode {
                            encoding: self.encoding.name(),
                        })
                    }
                    DecodeErrors::Replace => out.push('\u{FFFD}'),
                    DecodeErrors::Ignore => {}
                },
            }
        }
    }

    /// Universal newline translation: `\r\n` and bare `\r` both become `\n`.
    fn translate_universal(&mut self, decoded: &str) {
        for c in decoded.chars() {
            if self.pending_cr {
                self.pending_cr = false;
                self.buf.push('\n');
                if c == '\n' {
                    continue; // the pair collapses to one newline
                }
            }
            if c == '\r' {
                self.pending_cr = true;
            } else {
                self.buf.push(c);
            }
        }
    }

    /// Index just past the next line terminator in the buffer, if present.
    fn find_line_end(&self) -> Option<usize> {
        match self.newline.terminator() {
            "\r\n" => self.buf.find("\r\n").map(|i| i + 2),
            term => {
                // Single-byte ASCII terminator; the byte offset is a char
                // boundary, so splitting there is safe
                memchr::memchr(term.as_bytes()[0], self.buf.as_bytes()).map(|i| i + 1)
            }
        }
    }

    fn check_open(&self) -> Result<()> {
        if self.inner.is_none() {
            return Err(ZseqError::StreamClosed);
        }
        Ok(())
    }
}

impl<R: SourceStream> SequentialRead for TextReader<R> {
    type Unit = String;

    fn read(&mut self, limit: Option<usize>) -> Result<String> {
        self.check_open()?;
        match limit {
            None => {
                while !self.eof {
                    self.fill()?;
                }
                Ok(mem::take(&mut self.buf))
            }
            Some(limit) => {
                while self.buf.chars().count() < limit && !self.eof {
                    self.fill()?;
                }
                let end = self
                    .buf
                    .char_indices()
                    .nth(limit)
                    .map(|(i, _)| i)
                    .unwrap_or(self.buf.len());
                let rest = self.buf.split_off(end);
                Ok(mem::replace(&mut self.buf, rest))
            }
        }
    }

    fn read_line(&mut self) -> Result<String> {
        self.check_open()?;
        loop {
            if let Some(end) = self.find_line_end() {
                let rest = self.buf.split_off(end);
                return Ok(mem::replace(&mut self.buf, rest));
            }
            if self.eof {
                // Final unterminated line, or empty at end-of-stream
                return Ok(mem::take(&mut self.buf));
            }
            self.fill()?;
        }
    }

    fn close(&mut self) {
        if let Some(mut source) = self.inner.take() {
            source.shutdown();
        }
        self.buf.clear();
    }
}

impl<R: SourceStream> Drop for TextReader<R> {
    fn drop(&mut self) {
        self.close();
    }
}
