use std::env;
use std::error;
use std::ffi::OsStr;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::str;

use crate::escape::{escape, escape_os};

/// An error that occurs when a pattern could not be converted to valid
/// UTF-8.
///
/// The purpose of this error is to give a more targeted failure mode for
/// patterns written by end users that are not valid UTF-8.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvalidPatternError {
    original: String,
    valid_up_to: usize,
}

impl InvalidPatternError {
    /// Returns the index in the given string up to which valid UTF-8 was
    /// verified.
    pub fn valid_up_to(&self) -> usize {
        self.valid_up_to
    }
}

impl error::Error for InvalidPatternError {
    fn description(&self) -> &str {
        "invalid pattern"
    }
}

impl fmt::Display for InvalidPatternError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "found invalid UTF-8 in pattern at byte offset {} \
             (use hex escape sequences to match arbitrary bytes \
             in a pattern, e.g., \\xFF): '{}'",
            self.valid_up_to, self.original,
        )
    }
}

impl From<InvalidPatternError> for io::Error {
    fn from(paterr: InvalidPatternError) -> io::Error {
        io::Error::new(io::ErrorKind::Other, paterr)
    }
}

/// Convert an OS string into a regular expression pattern.
///
/// This conversion fails if the given pattern is not valid UTF-8, in
/// which case, a targeted error with more information about where the
/// invalid UTF-8 occurs is given. The error also suggests the use of hex
/// escape sequences, which are supported by many regex engines.
pub fn pattern_from_os(pattern: &OsStr) -> Result<&str, InvalidPatternError> {
    pattern.to_str().ok_or_else(|| {
        let valid_up_to = pattern
            .to_string_lossy()
            .find('\u{FFFD}')
            .expect("a Unicode replacement codepoint for invalid UTF-8");
        InvalidPatternError { original: escape_os(pattern), valid_up_to }
    })
}

/// Convert arbitrary bytes into a regular expression pattern.
///
/// This conversion fails if the given pattern is not valid UTF-8, in
/// which case, a targeted error with more information about where the
/// invalid UTF-8 occurs is given.
pub fn pattern_from_bytes(
    pattern: &[u8],
) -> Result<&str, InvalidPatternError> {
    str::from_utf8(pattern).map_err(|err| InvalidPatternError {
        original: escape(pattern),
        valid_up_to: err.valid_up_to(),
    })
}

/// The contents of a pattern file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PatternFile {
    /// The pattern fragments found in the file, one per non-empty line.
    pub patterns: Vec<String>,
    /// True when the file's first line was the `###-o` marker, which
    /// requests only-matching output.
    pub only_matching: bool,
}

/// Resolve the name of a pattern file against the current working
/// directory, then each directory on the search path (typically drawn
/// from `GREP_PATH`), then an optional install time default directory.
pub fn resolve_pattern_file(
    name: &Path,
    search_path: Option<&OsStr>,
    default_dir: Option<&Path>,
) -> PathBuf {
    if name.is_absolute() || name.exists() {
        return name.to_path_buf();
    }
    if let Some(search_path) = search_path {
        for dir in env::split_paths(search_path) {
            let candidate = dir.join(name);
            if candidate.exists() {
                return candidate;
            }
        }
    }
    if let Some(dir) = default_dir {
        let candidate = dir.join(name);
        if candidate.exists() {
            return candidate;
        }
    }
    name.to_path_buf()
}

/// Read pattern fragments from a file, one per line.
///
/// Leading and trailing whitespace is trimmed from every line, and empty
/// lines are skipped. A first line consisting of `###-o` is not a
/// pattern; it marks the file as requesting only-matching output.
///
/// If there was a problem reading the file or if any fragment contains
/// invalid UTF-8, then an error is returned with the file path and line
/// number included.
pub fn patterns_from_path<P: AsRef<Path>>(
    path: P,
) -> io::Result<PatternFile> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|err| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("{}: {}", path.display(), err),
        )
    })?;
    patterns_from_reader(file).map_err(|err| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("{}:{}", path.display(), err),
        )
    })
}

/// Read pattern fragments from stdin, one per line.
pub fn patterns_from_stdin() -> io::Result<PatternFile> {
    let stdin = io::stdin();
    let locked = stdin.lock();
    patterns_from_reader(locked).map_err(|err| {
        io::Error::new(io::ErrorKind::Other, format!("<stdin>:{}", err))
    })
}

/// Read pattern fragments from any reader, one per line. See
/// [`patterns_from_path`] for the rules applied to lines.
///
/// Note that this routine uses its own internal buffer, so the caller
/// should not provide their own buffered reader if possible.
///
/// # Example
///
/// This shows how to parse patterns, one per line.
///
/// ```
/// use unigrep_cli::patterns_from_reader;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let patterns = "\
/// foo
/// bar\\s+foo
/// [a-z]{3}
/// ";
///
/// let file = patterns_from_reader(patterns.as_bytes())?;
/// assert_eq!(file.patterns, vec![
///     r"foo",
///     r"bar\s+foo",
///     r"[a-z]{3}",
/// ]);
/// assert!(!file.only_matching);
/// # Ok(()) }
/// ```
pub fn patterns_from_reader<R: io::Read>(rdr: R) -> io::Result<PatternFile> {
    let mut result = PatternFile::default();
    let mut bufrdr = io::BufReader::new(rdr);
    let mut line = vec![];
    let mut line_number = 0;
    while {
        line.clear();
        line_number += 1;
        bufrdr.read_until(b'\n', &mut line)? > 0
    } {
        match pattern_from_bytes(&line) {
            Ok(pattern) => {
                let pattern = pattern.trim();
                if line_number == 1 && pattern == "###-o" {
                    result.only_matching = true;
                } else if !pattern.is_empty() {
                    result.patterns.push(pattern.to_string());
                }
            }
            Err(err) => {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    format!("{}: {}", line_number, err),
                ));
            }
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes() {
        let pat = b"abc\xFFxyz";
        let err = pattern_from_bytes(pat).unwrap_err();
        assert_eq!(3, err.valid_up_to());
    }

    #[test]
    #[cfg(unix)]
    fn os() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let pat = OsStr::from_bytes(b"abc\xFFxyz");
        let err = pattern_from_os(pat).unwrap_err();
        assert_eq!(3, err.valid_up_to());
    }

    #[test]
    fn reader_skips_blank_lines() {
        let got = patterns_from_reader(&b"foo\n\n  bar \n"[..]).unwrap();
        assert_eq!(got.patterns, vec!["foo", "bar"]);
        assert!(!got.only_matching);
    }

    #[test]
    fn only_matching_marker() {
        let got = patterns_from_reader(&b"###-o\nfoo\n"[..]).unwrap();
        assert_eq!(got.patterns, vec!["foo"]);
        assert!(got.only_matching);

        // The marker only counts on the first line.
        let got = patterns_from_reader(&b"foo\n###-o\n"[..]).unwrap();
        assert_eq!(got.patterns, vec!["foo", "###-o"]);
        assert!(!got.only_matching);
    }
}
