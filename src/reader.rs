//! Sequential read abstraction shared by process-backed and library-backed
//! streams.
//!
//! [`SequentialRead`] is the capability surface of every readable stream in
//! this crate: bounded and unbounded reads, line-oriented reads, lazy line
//! iteration, and idempotent close. [`ByteReader`] implements it for binary
//! mode over any [`SourceStream`]; the text-mode counterpart lives in
//! [`crate::text`].

use crate::error::{Result, ZseqError};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};

/// Seam trait for the byte sources a reader can wrap.
///
/// A source is an ordinary `io::Read` plus a `shutdown` hook invoked exactly
/// once when the owning reader closes. Plain files and in-process decoders
/// need nothing beyond dropping their descriptor; a process-backed source
/// uses the hook to terminate and reap its child.
pub trait SourceStream: Read + Send {
    /// Release resources that dropping alone would leak. Must be safe to
    /// call from cleanup paths, so it never fails.
    fn shutdown(&mut self) {}
}

impl SourceStream for File {}

impl SourceStream for Box<dyn SourceStream> {
    fn shutdown(&mut self) {
        (**self).shutdown()
    }
}

/// A unit of data handed out by a sequential reader: `Vec<u8>` in binary
/// mode, `String` in text mode.
pub trait Chunk {
    fn is_empty(&self) -> bool;
}

impl Chunk for Vec<u8> {
    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }
}

impl Chunk for String {
    fn is_empty(&self) -> bool {
        String::is_empty(self)
    }
}

/// Sequential, forward-only read operations.
///
/// All operations fail with [`ZseqError::StreamClosed`] once [`close`] has
/// been called. An empty result from `read` or `read_line` means
/// end-of-stream and only end-of-stream.
///
/// Instances are not thread-safe; concurrent use of one reader from multiple
/// threads is not supported.
///
/// [`close`]: SequentialRead::close
pub trait SequentialRead {
    /// `Vec<u8>` for binary streams, `String` for text streams.
    type Unit: Chunk;

    /// Read up to `limit` units (bytes or decoded characters).
    ///
    /// `None` reads everything remaining. With `Some(n)`, fewer than `n`
    /// units are returned only at end-of-stream, and an empty unit exactly
    /// at end-of-stream.
    fn read(&mut self, limit: Option<usize>) -> Result<Self::Unit>;

    /// Read the next line, including its terminator. Empty at end-of-stream.
    fn read_line(&mut self) -> Result<Self::Unit>;

    /// Read all remaining lines, each retaining its terminator.
    fn read_all_lines(&mut self) -> Result<Vec<Self::Unit>>
    where
        Self: Sized,
    {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line()?;
            if line.is_empty() {
                return Ok(lines);
            }
            lines.push(line);
        }
    }

    /// Lazy iterator over the remaining lines.
    ///
    /// Finite (ends at end-of-stream) and not restartable: a second call
    /// continues where the first left off.
    fn lines(&mut self) -> Lines<'_, Self>
    where
        Self: Sized,
    {
        Lines {
            reader: self,
            done: false,
        }
    }

    /// Tear down the stream. Idempotent; subsequent calls are no-ops and
    /// never fail.
    fn close(&mut self);
}

/// Iterator over the lines of a [`SequentialRead`], created by
/// [`SequentialRead::lines`].
pub struct Lines<'a, R: SequentialRead> {
    reader: &'a mut R,
    done: bool,
}

impl<R: SequentialRead> Iterator for Lines<'_, R> {
    type Item = Result<R::Unit>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_line() {
            Ok(line) if line.is_empty() => {
                self.done = true;
                None
            }
            Ok(line) => Some(Ok(line)),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Binary-mode sequential reader over a [`SourceStream`].
pub struct ByteReader<R: SourceStream> {
    // None once closed; doubles as the use-after-close flag
    inner: Option<BufReader<R>>,
}

impl<R: SourceStream> ByteReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            inner: Some(BufReader::new(source)),
        }
    }

    fn stream(&mut self) -> Result<&mut BufReader<R>> {
        self.inner.as_mut().ok_or(ZseqError::StreamClosed)
    }
}

impl<R: SourceStream> SequentialRead for ByteReader<R> {
    type Unit = Vec<u8>;

    fn read(&mut self, limit: Option<usize>) -> Result<Vec<u8>> {
        let stream = self.stream()?;
        match limit {
            None => {
                let mut data = Vec::new();
                stream.read_to_end(&mut data)?;
                Ok(data)
            }
            Some(limit) => {
                let mut data = vec![0u8; limit];
                let mut filled = 0;
                // A pipe may deliver fewer bytes than asked for; keep going
                // until the request is satisfied or the stream ends.
                while filled < limit {
                    let n = stream.read(&mut data[filled..])?;
                    if n == 0 {
                        break;
                    }
                    filled += n;
                }
                data.truncate(filled);
                Ok(data)
            }
        }
    }

    fn read_line(&mut self) -> Result<Vec<u8>> {
        let mut line = Vec::new();
        self.stream()?.read_until(b'\n', &mut line)?;
        Ok(line)
    }

    fn close(&mut self) {
        if let Some(mut stream) = self.inner.take() {
            stream.get_mut().shutdown();
        }
    }
}

impl<R: SourceStream> Drop for ByteReader<R> {
    fn drop(&mut self) {
        self.close();
    }
}
