//! External executable resolution.
//!
//! Decompression can optionally be delegated to an external tool (`gzip`,
//! `xz`, ...) instead of the in-process codecs. This module answers the
//! question "is a usable binary available?" by searching `PATH` the way a
//! shell would. Absence is a normal outcome, not an error: callers use the
//! `None` result to feature-detect the external acceleration path and fall
//! back to the library codecs.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Check whether the specified path is an existing, executable, regular file.
pub fn is_executable_file(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match path.metadata() {
            Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
            Err(_) => false,
        }
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}

/// Return the path to the specified executable, or `None` if not found.
///
/// Absolute paths are checked directly; bare names are searched for in each
/// directory of `PATH`, in listed order, first match wins.
pub fn which(executable: impl AsRef<OsStr>) -> Option<PathBuf> {
    which_in(executable, env::var_os("PATH"))
}

/// Like [`which`], but over an explicit search-path value instead of the
/// `PATH` environment variable.
pub fn which_in(
    executable: impl AsRef<OsStr>,
    search_path: Option<impl AsRef<OsStr>>,
) -> Option<PathBuf> {
    let executable = Path::new(executable.as_ref());

    if executable.is_absolute() {
        if is_executable_file(executable) {
            return Some(executable.to_path_buf());
        }
        return None;
    }

    let search_path = search_path?;
    env::split_paths(&search_path)
        .map(|dir| dir.join(executable))
        .find(|candidate| is_executable_file(candidate))
}

/// Resolved paths of the external decompression tools.
///
/// The reference for which tool serves which format lives in
/// [`Format`](crate::format::Format); this struct only records what the
/// environment currently provides. Resolution is explicit: call
/// [`ExternalTools::from_env`] again to pick up `PATH` changes. An instance
/// can be handed to [`OpenOptions`](crate::open::OpenOptions) to avoid
/// re-scanning on every open, or to pin tools to specific paths in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalTools {
    pub gzip: Option<PathBuf>,
    pub pigz: Option<PathBuf>,
    pub bzip2: Option<PathBuf>,
    pub pbzip2: Option<PathBuf>,
    pub xz: Option<PathBuf>,
}

impl ExternalTools {
    /// Resolve all known tools against the current `PATH`.
    pub fn from_env() -> Self {
        let tools = Self {
            gzip: which("gzip"),
            pigz: which("pigz"),
            bzip2: which("bzip2"),
            pbzip2: which("pbzip2"),
            xz: which("xz"),
        };
        log::debug!("resolved external tools: {tools:?}");
        tools
    }

    /// A configuration with no tools resolved; external mode always falls
    /// back to the library codecs.
    pub fn none() -> Self {
        Self::default()
    }
}
