/*!
Selection of the files a search session visits.

This crate decides which files a recursive search actually reads: it
walks directories, applies include/exclude wildcard lists (with
gitignore style `!` overrides), honors hidden file, device, symlink and
depth policies, sniffs leading "magic" bytes, and refuses to search the
program's own output. It also carries the built-in registry mapping file
type names to extension sets and magic signatures.

The entry point is [`WalkBuilder`], which configures and produces a
serial iterator of [`DirEntry`] values.
*/

#![deny(missing_docs)]

use std::error;
use std::fmt;
use std::io;
use std::path::PathBuf;

pub use crate::filter::{Filter, FilterBuilder};
pub use crate::types::{definitions, find_type, FileTypeDef};
pub use crate::walk::{
    DevicePolicy, DirEntry, DirectoryPolicy, Walk, WalkBuilder,
};

mod filter;
mod types;
mod walk;

/// An error that can occur while selecting files.
#[derive(Debug)]
pub enum Error {
    /// An error parsing or compiling a wildcard.
    Glob(unigrep_globset::Error),
    /// An I/O error tied to a particular path.
    Io {
        /// The path the operation failed on.
        path: PathBuf,
        /// The underlying error.
        err: io::Error,
    },
    /// A directory was named as an input while the directory policy says
    /// to read it as a file.
    IsDirectory(PathBuf),
    /// A magic signature pattern failed to compile.
    Magic {
        /// The pattern that failed.
        pattern: String,
        /// The compile error rendered as a string.
        err: String,
    },
    /// An unknown file type tag was requested.
    UnrecognizedFileType(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, err: io::Error) -> Error {
        Error::Io { path: path.into(), err }
    }
}

impl error::Error for Error {
    fn description(&self) -> &str {
        match *self {
            Error::Glob(_) => "glob error",
            Error::Io { .. } => "I/O error",
            Error::IsDirectory(_) => "is a directory",
            Error::Magic { .. } => "invalid magic pattern",
            Error::UnrecognizedFileType(_) => "unrecognized file type",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Glob(ref err) => err.fmt(f),
            Error::Io { ref path, ref err } => {
                write!(f, "{}: {}", path.display(), err)
            }
            Error::IsDirectory(ref path) => {
                write!(f, "{}: is a directory", path.display())
            }
            Error::Magic { ref pattern, ref err } => {
                write!(f, "invalid magic pattern '{}': {}", pattern, err)
            }
            Error::UnrecognizedFileType(ref name) => {
                write!(f, "unrecognized file type: {}", name)
            }
        }
    }
}

impl From<unigrep_globset::Error> for Error {
    fn from(err: unigrep_globset::Error) -> Error {
        Error::Glob(err)
    }
}
