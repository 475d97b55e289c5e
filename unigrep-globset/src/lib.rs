/*!
Wildcard matching against file paths.

A [`Glob`] is a single shell style wildcard expression using `*`, `?`,
character classes like `[a-z]` and `\` to quote a metacharacter. A glob
that contains a path separator is matched against an entire path name,
while all other globs are matched against a path's base name only, which
is how grep tools interpret `--include`/`--exclude` expressions.

Globs are compiled down to anchored byte oriented regexes instead of
being interpreted, so matching many paths against one glob is cheap. A
[`GlobSet`] bundles several compiled globs together and answers whether
any of them match.
*/

#![deny(missing_docs)]

use std::error;
use std::fmt;
use std::path::Path;

use regex::bytes::Regex;

/// Represents an error that can occur when parsing a glob pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    /// The original glob provided by the caller.
    glob: String,
    /// The kind of error.
    kind: ErrorKind,
}

/// The kind of error that can occur when parsing a glob pattern.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Occurs when a character class (e.g., `[abc]`) is not closed.
    UnclosedClass,
    /// Occurs when a range in a character class (e.g., `[a-z]`) is
    /// invalid. For example, if the range starts with a lexicographically
    /// larger character than it ends with.
    InvalidRange(char, char),
    /// Occurs when the glob ends with a lone `\`.
    DanglingEscape,
    /// An error associated with compiling the lowered regex.
    Regex(String),
}

impl error::Error for Error {
    fn description(&self) -> &str {
        match self.kind {
            ErrorKind::UnclosedClass => "unclosed character class",
            ErrorKind::InvalidRange(_, _) => "invalid character range",
            ErrorKind::DanglingEscape => "dangling '\\'",
            ErrorKind::Regex(_) => "regex error",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            ErrorKind::UnclosedClass => {
                write!(f, "error parsing glob '{}': unclosed character class",
                       self.glob)
            }
            ErrorKind::InvalidRange(s, e) => {
                write!(f, "error parsing glob '{}': invalid range ({} > {})",
                       self.glob, s, e)
            }
            ErrorKind::DanglingEscape => {
                write!(f, "error parsing glob '{}': dangling '\\'", self.glob)
            }
            ErrorKind::Regex(ref err) => {
                write!(f, "error compiling glob '{}': {}", self.glob, err)
            }
        }
    }
}

impl Error {
    /// Return the glob that caused this error, if one exists.
    pub fn glob(&self) -> &str {
        &self.glob
    }

    /// Return the kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }
}

/// A single glob, compiled for matching against path names.
#[derive(Clone, Debug)]
pub struct Glob {
    /// The original text of the glob.
    glob: String,
    /// The compiled anchored regex.
    re: Regex,
    /// True when the glob contains a path separator, in which case it is
    /// matched against a full path name instead of a base name.
    full_path: bool,
}

impl Glob {
    /// Parse and compile a glob from its string representation.
    pub fn new(glob: &str) -> Result<Glob, Error> {
        // A leading `/` only anchors the glob at the root of the walk; it
        // is not part of the name matched.
        let (pat, full_path) = if glob.starts_with('/') {
            (&glob[1..], true)
        } else {
            (glob, glob.contains('/'))
        };
        let source = translate(glob, pat)?;
        let re = regex::bytes::RegexBuilder::new(&source)
            .unicode(false)
            .dot_matches_new_line(true)
            .build()
            .map_err(|err| Error {
                glob: glob.to_string(),
                kind: ErrorKind::Regex(err.to_string()),
            })?;
        Ok(Glob { glob: glob.to_string(), re, full_path })
    }

    /// Return the original text of this glob.
    pub fn glob(&self) -> &str {
        &self.glob
    }

    /// Returns true when this glob must be matched against a full path
    /// name rather than a base name.
    pub fn is_full_path(&self) -> bool {
        self.full_path
    }

    /// Test the given path name and base name against this glob.
    ///
    /// The glob is applied to `path` when it contains a path separator
    /// and to `basename` otherwise.
    pub fn is_match(&self, path: &[u8], basename: &[u8]) -> bool {
        if self.full_path {
            self.re.is_match(path)
        } else {
            self.re.is_match(basename)
        }
    }

    /// Like `is_match`, but accepts a `Path` and derives the base name
    /// from it.
    pub fn is_match_path(&self, path: &Path) -> bool {
        let full = path_bytes(path);
        let base = path.file_name().map(os_bytes).unwrap_or_default();
        self.is_match(&full, &base)
    }
}

/// A set of globs matched together.
///
/// An empty set matches nothing.
#[derive(Clone, Debug, Default)]
pub struct GlobSet {
    globs: Vec<Glob>,
}

impl GlobSet {
    /// Create an empty glob set.
    pub fn empty() -> GlobSet {
        GlobSet { globs: vec![] }
    }

    /// Add a compiled glob to this set.
    pub fn add(&mut self, glob: Glob) {
        self.globs.push(glob);
    }

    /// Returns true if and only if this set contains no globs.
    pub fn is_empty(&self) -> bool {
        self.globs.is_empty()
    }

    /// Return the number of globs in this set.
    pub fn len(&self) -> usize {
        self.globs.len()
    }

    /// Returns true if and only if any glob in this set matches the
    /// given path name and base name.
    pub fn is_match(&self, path: &[u8], basename: &[u8]) -> bool {
        self.globs.iter().any(|g| g.is_match(path, basename))
    }

    /// Like `is_match`, but accepts a `Path` and derives the base name
    /// from it.
    pub fn is_match_path(&self, path: &Path) -> bool {
        let full = path_bytes(path);
        let base = path.file_name().map(os_bytes).unwrap_or_default();
        self.is_match(&full, &base)
    }
}

/// Lower a glob into an anchored regex over bytes.
///
/// `*` and `?` never match a path separator, which matches the shell's
/// treatment of wildcards in path components.
fn translate(original: &str, pat: &str) -> Result<String, Error> {
    let err = |kind| Error { glob: original.to_string(), kind };

    let mut re = String::with_capacity(pat.len() + 16);
    re.push_str("\\A");
    let mut chars = pat.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => re.push_str("[^/]*"),
            '?' => re.push_str("[^/]"),
            '\\' => match chars.next() {
                Some(c) => push_literal(&mut re, c),
                None => return Err(err(ErrorKind::DanglingEscape)),
            },
            '[' => {
                re.push('[');
                // `!` and `^` both negate; `]` as the first member is a
                // literal.
                if let Some(&c2) = chars.peek() {
                    if c2 == '!' || c2 == '^' {
                        chars.next();
                        re.push('^');
                    }
                }
                if let Some(&']') = chars.peek() {
                    chars.next();
                    re.push_str("\\]");
                }
                let mut closed = false;
                let mut prev = None;
                while let Some(c) = chars.next() {
                    match c {
                        ']' => {
                            closed = true;
                            break;
                        }
                        '\\' => match chars.next() {
                            Some(c) => {
                                push_class_literal(&mut re, c);
                                prev = Some(c);
                            }
                            None => {
                                return Err(err(ErrorKind::DanglingEscape))
                            }
                        },
                        '-' => {
                            // Interior `-` introduces a range; leading and
                            // trailing `-` are literals.
                            match (prev, chars.peek()) {
                                (Some(s), Some(&e)) if e != ']' => {
                                    chars.next();
                                    if s > e {
                                        return Err(err(
                                            ErrorKind::InvalidRange(s, e),
                                        ));
                                    }
                                    re.push('-');
                                    push_class_literal(&mut re, e);
                                    prev = None;
                                }
                                _ => {
                                    re.push_str("\\-");
                                    prev = Some('-');
                                }
                            }
                        }
                        c => {
                            push_class_literal(&mut re, c);
                            prev = Some(c);
                        }
                    }
                }
                if !closed {
                    return Err(err(ErrorKind::UnclosedClass));
                }
                re.push(']');
            }
            c => push_literal(&mut re, c),
        }
    }
    re.push_str("\\z");
    Ok(re)
}

fn push_literal(re: &mut String, c: char) {
    match c {
        '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}'
        | '^' | '$' | '#' | '&' | '-' | '~' | '\\' => {
            re.push('\\');
            re.push(c);
        }
        _ => re.push(c),
    }
}

fn push_class_literal(re: &mut String, c: char) {
    if c == ']' || c == '\\' || c == '^' || c == '-' || c == '&' {
        re.push('\\');
    }
    re.push(c);
}

#[cfg(unix)]
fn path_bytes(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(not(unix))]
fn path_bytes(path: &Path) -> Vec<u8> {
    path.to_string_lossy().into_owned().into_bytes()
}

#[cfg(unix)]
fn os_bytes(s: &std::ffi::OsStr) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    s.as_bytes().to_vec()
}

#[cfg(not(unix))]
fn os_bytes(s: &std::ffi::OsStr) -> Vec<u8> {
    s.to_string_lossy().into_owned().into_bytes()
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, Glob, GlobSet};

    fn matches(glob: &str, path: &str) -> bool {
        let base = path.rsplit('/').next().unwrap();
        Glob::new(glob)
            .unwrap()
            .is_match(path.as_bytes(), base.as_bytes())
    }

    #[test]
    fn literals() {
        assert!(matches("foo.rs", "foo.rs"));
        assert!(!matches("foo.rs", "bar.rs"));
        assert!(matches("foo.rs", "src/foo.rs"));
    }

    #[test]
    fn star() {
        assert!(matches("*.rs", "foo.rs"));
        assert!(matches("*.rs", "src/foo.rs"));
        assert!(!matches("*.rs", "foo.c"));
        assert!(matches("*", "anything"));
        assert!(matches("a*c", "abc"));
        assert!(matches("a*c", "ac"));
    }

    #[test]
    fn star_does_not_cross_separator() {
        // A pathname glob forces full path matching, and `*` stays
        // within one component.
        assert!(matches("src/*.rs", "src/foo.rs"));
        assert!(!matches("src/*.rs", "src/x/foo.rs"));
        assert!(!matches("*/foo.rs", "a/b/foo.rs"));
    }

    #[test]
    fn question() {
        assert!(matches("?.rs", "a.rs"));
        assert!(!matches("?.rs", "ab.rs"));
        assert!(!matches("a?c", "a/c"));
    }

    #[test]
    fn classes() {
        assert!(matches("[ab].rs", "a.rs"));
        assert!(matches("[ab].rs", "b.rs"));
        assert!(!matches("[ab].rs", "c.rs"));
        assert!(matches("[a-z].rs", "q.rs"));
        assert!(!matches("[a-z].rs", "Q.rs"));
        assert!(matches("[!a-z].rs", "Q.rs"));
        assert!(matches("[^a-z].rs", "Q.rs"));
        assert!(matches("[]].rs", "].rs"));
        assert!(matches("[a-]x", "-x"));
        assert!(matches("[a-]x", "ax"));
    }

    #[test]
    fn escapes() {
        assert!(matches(r"\*.rs", "*.rs"));
        assert!(!matches(r"\*.rs", "a.rs"));
        assert!(matches(r"a\[b", "a[b"));
    }

    #[test]
    fn leading_slash_anchors() {
        let g = Glob::new("/foo.rs").unwrap();
        assert!(g.is_full_path());
        assert!(g.is_match(b"foo.rs", b"foo.rs"));
        assert!(!g.is_match(b"src/foo.rs", b"foo.rs"));
    }

    #[test]
    fn errors() {
        assert_eq!(
            *Glob::new("[abc").unwrap_err().kind(),
            ErrorKind::UnclosedClass
        );
        assert_eq!(
            *Glob::new(r"abc\").unwrap_err().kind(),
            ErrorKind::DanglingEscape
        );
        assert_eq!(
            *Glob::new("[z-a]").unwrap_err().kind(),
            ErrorKind::InvalidRange('z', 'a')
        );
    }

    #[test]
    fn sets() {
        let mut set = GlobSet::empty();
        assert!(!set.is_match(b"foo.rs", b"foo.rs"));
        set.add(Glob::new("*.rs").unwrap());
        set.add(Glob::new("*.toml").unwrap());
        assert!(set.is_match(b"foo.rs", b"foo.rs"));
        assert!(set.is_match(b"Cargo.toml", b"Cargo.toml"));
        assert!(!set.is_match(b"foo.c", b"foo.c"));
        assert_eq!(set.len(), 2);
    }
}
