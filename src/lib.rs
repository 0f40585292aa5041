//! # zseq - Transparent Sequential Access to Compressed Files
//!
//! Open a file by path and read (or write) it as an ordinary sequential
//! stream, regardless of whether it is uncompressed or compressed with gzip,
//! bzip2, or xz/lzma. The format is selected from the file name suffix;
//! decompression happens either in-process through the codec crates or by
//! spawning an external decompressor process whose stdout becomes the
//! stream.
//!
//! ## Features
//!
//! - **Suffix dispatch**: `.gz`, `.bz2`, `.xz`, `.lzma`, or plain files
//! - **External process mode**: delegate decompression to `gzip`/`bzip2`/
//!   `xz`, preferring parallel variants (`pigz`, `pbzip2`) when asked,
//!   with automatic fallback to the in-process codecs
//! - **Text and binary modes**: configurable encoding, decoding error
//!   policy, and newline translation in text mode
//! - **Deterministic teardown**: closing (or dropping) a process-backed
//!   stream terminates and reaps the child; close is always idempotent
//!
//! ## Example
//!
//! ```no_run
//! use zseq::{open, OpenOptions, SequentialRead};
//!
//! # fn main() -> zseq::Result<()> {
//! let file = open("access.log.gz", "rt", OpenOptions::new().external(true))?;
//! let mut reader = file.into_text_reader();
//! for line in reader.lines() {
//!     println!("{}", line?.trim_end());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Streams are not thread-safe: one stream instance must not be used from
//! multiple threads concurrently.

// Core modules
pub mod error;
pub mod exec;
pub mod format;
pub mod open;
pub mod process;
pub mod reader;
pub mod text;
pub mod writer;

// Re-export commonly used types for convenience
pub use error::{Result, ZseqError};

// Public API surface for external usage
pub use exec::{which, ExternalTools};
pub use format::Format;
pub use open::{open, OpenMode, OpenOptions, SeqFile};
pub use process::{open_process_reader, ProcessReader, ProcessStream, StreamInput};
pub use reader::{ByteReader, Lines, SequentialRead, SourceStream};
pub use text::{DecodeErrors, Newline, TextOptions, TextReader};
pub use writer::{ByteWriter, SinkStream, TextWriter};
