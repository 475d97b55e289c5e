use std::path::Path;

use unigrep_select::{DirEntry, Error};

/// A configuration for describing how subjects should be built.
#[derive(Clone, Debug)]
struct Config {
    strip_dot_prefix: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config { strip_dot_prefix: false }
    }
}

/// A builder for constructing things to search over.
#[derive(Clone, Debug)]
pub struct SubjectBuilder {
    config: Config,
}

impl SubjectBuilder {
    /// Return a new subject builder with a default configuration.
    pub fn new() -> SubjectBuilder {
        SubjectBuilder { config: Config::default() }
    }

    /// Create a new subject from the result of walking.
    ///
    /// Walk errors become user facing warnings here: an unreadable entry
    /// is reported and skipped, and a directory named as an input under
    /// the `read` directory policy warns without derailing the session.
    pub fn build_from_result(
        &self,
        result: Result<DirEntry, Error>,
    ) -> Option<Subject> {
        match result {
            Ok(dent) => Some(self.build(dent)),
            Err(Error::IsDirectory(path)) => {
                message!("{}: is a directory", path.display());
                None
            }
            Err(err) => {
                err_message!("{}", err);
                None
            }
        }
    }

    /// Create a new subject using this builder's configuration.
    pub fn build(&self, dent: DirEntry) -> Subject {
        Subject { dent, strip_dot_prefix: self.config.strip_dot_prefix }
    }

    /// When enabled, if the subject's file path starts with `./` then it
    /// is stripped.
    ///
    /// This is useful when implicitly searching the current working
    /// directory.
    pub fn strip_dot_prefix(&mut self, yes: bool) -> &mut SubjectBuilder {
        self.config.strip_dot_prefix = yes;
        self
    }
}

/// A subject is a thing we want to search. Generally, a subject is
/// either a file or stdin.
#[derive(Clone, Debug)]
pub struct Subject {
    dent: DirEntry,
    strip_dot_prefix: bool,
}

impl Subject {
    /// Return a subject representing standard input.
    pub fn stdin() -> Subject {
        Subject { dent: DirEntry::stdin(), strip_dot_prefix: false }
    }

    /// Return the file path corresponding to this subject.
    pub fn path(&self) -> &Path {
        if self.strip_dot_prefix && self.dent.path().starts_with("./") {
            self.dent.path().strip_prefix("./").unwrap()
        } else {
            self.dent.path()
        }
    }

    /// Returns true if and only if this entry corresponds to stdin.
    pub fn is_stdin(&self) -> bool {
        self.dent.is_stdin()
    }

    /// Returns true if and only if this entry corresponds to a device,
    /// FIFO or socket admitted by the device policy.
    pub fn is_device(&self) -> bool {
        self.dent.is_device()
    }
}
