//! Process-backed stream adapter.
//!
//! [`ProcessStream`] wraps an external decompressor process and exposes its
//! stdout as an ordinary byte source. The child's stdin is wired directly to
//! the compressed input (a file the stream opens itself, or a duplicated
//! caller-supplied handle), so decompressed bytes flow child -> pipe ->
//! reader with no intermediate copies in this process.
//!
//! Lifecycle: the child is spawned once at construction and never respawned.
//! [`ProcessStream::close`] drops the stdout pipe, kills the child, and
//! waits for it, reclaiming its process-table entry; it is idempotent and
//! never fails, and `Drop` invokes it, so leaving scope (normally or by
//! unwind) cannot leak the child or its descriptors.
//!
//! A `ProcessStream` is not thread-safe; concurrent use of one instance from
//! multiple threads is not supported.

use crate::error::{Result, ZseqError};
use crate::open::OpenMode;
use crate::reader::{ByteReader, SourceStream};
use crate::text::{TextOptions, TextReader};
use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

/// The compressed input fed to the child process's stdin.
pub enum StreamInput<'a> {
    /// A filesystem path; the stream opens it read-only and owns the
    /// resulting handle.
    Path(&'a Path),
    /// A caller-owned handle. The descriptor is duplicated for the child;
    /// the caller's handle is never closed or otherwise mutated.
    Handle(&'a File),
}

impl<'a> From<&'a Path> for StreamInput<'a> {
    fn from(path: &'a Path) -> Self {
        StreamInput::Path(path)
    }
}

impl<'a> From<&'a File> for StreamInput<'a> {
    fn from(file: &'a File) -> Self {
        StreamInput::Handle(file)
    }
}

/// A spawned decompressor process presented as a readable byte stream.
#[derive(Debug)]
pub struct ProcessStream {
    // Both None once closed
    child: Option<Child>,
    stdout: Option<ChildStdout>,
}

impl ProcessStream {
    /// Spawn `argv` with stdin connected to `input` and stdout piped back.
    ///
    /// Fails with [`ZseqError::InvalidArgument`] for an empty argv and
    /// [`ZseqError::Spawn`] if the command cannot be started. On a failed
    /// spawn the stream-opened input handle has already been released; a
    /// caller-supplied handle is untouched either way.
    pub fn spawn<S: AsRef<OsStr>>(argv: &[S], input: StreamInput<'_>) -> Result<Self> {
        let (program, args) = argv.split_first().ok_or_else(|| {
            ZseqError::invalid_argument("external command argv must not be empty")
        })?;

        let stdin = match input {
            StreamInput::Path(path) => {
                let file = File::open(path).map_err(|e| {
                    ZseqError::file(format!("Failed to open {}", path.display()), e)
                })?;
                Stdio::from(file)
            }
            StreamInput::Handle(file) => {
                let dup = file
                    .try_clone()
                    .map_err(|e| ZseqError::file("Failed to duplicate input handle", e))?;
                Stdio::from(dup)
            }
        };

        let command: Vec<&OsStr> = argv.iter().map(|arg| arg.as_ref()).collect();
        log::debug!("spawning {command:?}");

        // If spawn fails, `stdin` (and the handle inside it) drops here,
        // satisfying the no-dangling-handle construction contract.
        let mut child = Command::new(program)
            .args(args)
            .stdin(stdin)
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ZseqError::spawn(
                    format!("Failed to start {}", Path::new(program.as_ref()).display()),
                    e,
                )
            })?;

        let stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                // Should not happen with Stdio::piped; reap the child and
                // report it as a spawn failure rather than panicking.
                let _ = child.kill();
                let _ = child.wait();
                return Err(ZseqError::spawn(
                    "Child stdout pipe was not captured".to_string(),
                    std::io::Error::new(std::io::ErrorKind::BrokenPipe, "missing stdout pipe"),
                ));
            }
        };

        Ok(Self {
            child: Some(child),
            stdout: Some(stdout),
        })
    }

    /// Tear down the stream: close the output pipe, terminate the child, and
    /// wait for it. Idempotent, never fails.
    ///
    /// Termination is an immediate forced kill. The contract never promises
    /// the child runs to completion, and a kill cannot be ignored, so no
    /// grace-then-escalate ladder is needed; `wait` reaps the process-table
    /// entry unconditionally.
    pub fn close(&mut self) {
        // Closing the pipe first lets a still-writing child exit on its own
        // via a broken pipe even if the kill races with normal exit.
        self.stdout.take();
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                // Already-exited children report InvalidInput on some
                // platforms; anything else is still not worth failing close
                log::trace!("kill after close: {e}");
            }
            match child.wait() {
                Ok(status) => log::trace!("child reaped: {status}"),
                Err(e) => log::warn!("failed to wait on child process: {e}"),
            }
        }
    }

    /// Whether the stream has been closed.
    pub fn is_closed(&self) -> bool {
        self.child.is_none()
    }
}

impl Read for ProcessStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.stdout.as_mut() {
            Some(stdout) => stdout.read(buf),
            None => Ok(0),
        }
    }
}

impl SourceStream for ProcessStream {
    fn shutdown(&mut self) {
        self.close();
    }
}

impl Drop for ProcessStream {
    fn drop(&mut self) {
        self.close();
    }
}

/// Construction entry point for process-backed readers: spawn `argv` over
/// `input` and wrap the stream for the requested mode.
///
/// Write modes fail fast with [`ZseqError::NotImplemented`] before any
/// handle is opened or process spawned; compressing through an external
/// process is deliberately unsupported.
pub fn open_process_reader(
    argv: &[OsString],
    input: StreamInput<'_>,
    mode: OpenMode,
    text: TextOptions,
) -> Result<ProcessReader> {
    match mode {
        OpenMode::WriteText | OpenMode::WriteBinary => Err(ZseqError::not_implemented(
            "writing through an external process",
        )),
        OpenMode::ReadBinary => {
            let stream = ProcessStream::spawn(argv, input)?;
            Ok(ProcessReader::Binary(ByteReader::new(stream)))
        }
        OpenMode::ReadText => {
            let stream = ProcessStream::spawn(argv, input)?;
            Ok(ProcessReader::Text(TextReader::new(stream, text)))
        }
    }
}

/// A process-backed reader in the mode requested at construction.
pub enum ProcessReader {
    Binary(ByteReader<ProcessStream>),
    Text(TextReader<ProcessStream>),
}

impl std::fmt::Debug for ProcessReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Binary(_) => "Binary",
            Self::Text(_) => "Text",
        };
        f.debug_tuple(name).finish()
    }
}

impl ProcessReader {
    pub fn close(&mut self) {
        match self {
            ProcessReader::Binary(r) => crate::reader::SequentialRead::close(r),
            ProcessReader::Text(r) => crate::reader::SequentialRead::close(r),
        }
    }

    /// Unwrap the binary reader; panics if the mode was text.
    pub fn into_binary(self) -> ByteReader<ProcessStream> {
        match self {
            ProcessReader::Binary(r) => r,
            ProcessReader::Text(_) => panic!("process reader was opened in text mode"),
        }
    }

    /// Unwrap the text reader; panics if the mode was binary.
    pub fn into_text(self) -> TextReader<ProcessStream> {
        match self {
            ProcessReader::Text(r) => r,
            ProcessReader::Binary(_) => panic!("process reader was opened in binary mode"),
        }
    }
}
