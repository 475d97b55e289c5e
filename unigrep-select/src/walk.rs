use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use regex::bytes::{Regex, RegexBuilder};
use same_file::Handle;
use walkdir::WalkDir;

use crate::filter::Filter;
use crate::Error;

/// How directories named as inputs or encountered while walking are
/// handled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DirectoryPolicy {
    /// Attempting to read a directory as a file warns and skips it.
    Read,
    /// Directories are descended into.
    Recurse,
    /// Directories are silently skipped.
    Skip,
}

/// How devices, FIFOs and sockets are handled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DevicePolicy {
    /// Devices are searched like files.
    Read,
    /// Devices are silently skipped.
    Skip,
}

/// A single file selected for searching.
#[derive(Clone, Debug)]
pub struct DirEntry {
    path: PathBuf,
    depth: usize,
    kind: EntryKind,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum EntryKind {
    /// Standard input.
    Stdin,
    /// A regular file (or a symlink that resolved to one).
    File,
    /// A device, FIFO or socket admitted by the device policy.
    Device,
}

impl DirEntry {
    /// An entry representing standard input.
    pub fn stdin() -> DirEntry {
        DirEntry {
            path: PathBuf::from("-"),
            depth: 0,
            kind: EntryKind::Stdin,
        }
    }

    fn file(path: PathBuf, depth: usize) -> DirEntry {
        DirEntry { path, depth, kind: EntryKind::File }
    }

    fn device(path: PathBuf, depth: usize) -> DirEntry {
        DirEntry { path, depth, kind: EntryKind::Device }
    }

    /// The path of this entry.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The depth at which this entry was found. Entries named directly
    /// on the command line have depth `0`.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns true if and only if this entry is standard input.
    pub fn is_stdin(&self) -> bool {
        self.kind == EntryKind::Stdin
    }

    /// Returns true if and only if this entry is a device, FIFO or
    /// socket.
    pub fn is_device(&self) -> bool {
        self.kind == EntryKind::Device
    }
}

/// A builder for a file selection walk.
#[derive(Clone, Debug)]
pub struct WalkBuilder {
    paths: Vec<PathBuf>,
    filter: Filter,
    magic: Option<String>,
    max_depth: Option<usize>,
    skip_hidden: bool,
    follow_args: bool,
    follow: bool,
    directories: DirectoryPolicy,
    devices: DevicePolicy,
    skip_stdout: bool,
}

impl WalkBuilder {
    /// Create a new builder for walking the given initial path.
    pub fn new<P: AsRef<Path>>(path: P) -> WalkBuilder {
        WalkBuilder {
            paths: vec![path.as_ref().to_path_buf()],
            filter: Filter::default(),
            magic: None,
            max_depth: None,
            skip_hidden: false,
            follow_args: true,
            follow: false,
            directories: DirectoryPolicy::Read,
            devices: DevicePolicy::Skip,
            skip_stdout: true,
        }
    }

    /// Add another initial path to walk.
    pub fn add<P: AsRef<Path>>(&mut self, path: P) -> &mut WalkBuilder {
        self.paths.push(path.as_ref().to_path_buf());
        self
    }

    /// Set the include/exclude filter applied to walked entries.
    pub fn filter(&mut self, filter: Filter) -> &mut WalkBuilder {
        self.filter = filter;
        self
    }

    /// Set the combined magic signature pattern. When set, a candidate
    /// file is admitted when its leading bytes match, or when a file
    /// include wildcard admits it by name alone.
    pub fn magic(&mut self, pattern: Option<String>) -> &mut WalkBuilder {
        self.magic = pattern;
        self
    }

    /// Cap the recursion depth. Depth 1 is the immediate children of an
    /// initial path.
    pub fn max_depth(&mut self, depth: Option<usize>) -> &mut WalkBuilder {
        self.max_depth = depth;
        self
    }

    /// Skip entries whose base name begins with a dot.
    pub fn skip_hidden(&mut self, yes: bool) -> &mut WalkBuilder {
        self.skip_hidden = yes;
        self
    }

    /// Whether symlinks named directly on the command line are followed.
    ///
    /// This is enabled by default.
    pub fn follow_args(&mut self, yes: bool) -> &mut WalkBuilder {
        self.follow_args = yes;
        self
    }

    /// Whether symlinks encountered during recursion are followed.
    ///
    /// This is disabled by default.
    pub fn follow(&mut self, yes: bool) -> &mut WalkBuilder {
        self.follow = yes;
        self
    }

    /// Set the directory policy.
    pub fn directories(
        &mut self,
        policy: DirectoryPolicy,
    ) -> &mut WalkBuilder {
        self.directories = policy;
        self
    }

    /// Set the device policy.
    pub fn devices(&mut self, policy: DevicePolicy) -> &mut WalkBuilder {
        self.devices = policy;
        self
    }

    /// Whether to skip files whose handle is the same as stdout's. This
    /// prevents a search from reading its own output, and is enabled by
    /// default.
    pub fn skip_stdout(&mut self, yes: bool) -> &mut WalkBuilder {
        self.skip_stdout = yes;
        self
    }

    /// Build the walk.
    pub fn build(&self) -> Result<Walk, Error> {
        let magic = match self.magic {
            None => None,
            Some(ref pattern) => {
                let anchored = format!("^(?:{})", pattern);
                let re = RegexBuilder::new(&anchored)
                    .unicode(false)
                    .dot_matches_new_line(true)
                    .build()
                    .map_err(|err| Error::Magic {
                        pattern: pattern.clone(),
                        err: err.to_string(),
                    })?;
                Some(re)
            }
        };
        let stdout_handle = if self.skip_stdout {
            Handle::stdout().ok()
        } else {
            None
        };
        Ok(Walk {
            config: self.clone(),
            magic,
            stdout_handle,
            paths: self.paths.clone().into_iter(),
            current: None,
        })
    }
}

/// A serial iterator over the files admitted for searching.
///
/// Items are `Result<DirEntry, Error>`: policy skips are silent, while
/// conditions the user should hear about (unreadable entries, a
/// directory given as input under the `read` policy) surface as errors
/// without ending the walk.
#[derive(Debug)]
pub struct Walk {
    config: WalkBuilder,
    magic: Option<Regex>,
    stdout_handle: Option<Handle>,
    paths: std::vec::IntoIter<PathBuf>,
    current: Option<walkdir::IntoIter>,
}

impl Walk {
    /// Decide whether an already walked file should be yielded.
    /// Returns `Ok(None)` for silent skips.
    fn admit_file(
        &self,
        path: &Path,
        depth: usize,
        is_dir: bool,
    ) -> Result<Option<DirEntry>, Error> {
        debug_assert!(!is_dir);

        let base = basename_bytes(path);
        if depth > 0 && self.config.skip_hidden && is_hidden_name(&base) {
            return Ok(None);
        }
        let full = path_bytes(path);
        // Entries named on the command line bypass name filtering, like
        // explicitly named files always do in grep tools.
        if depth > 0 {
            if self.config.filter.file_excluded(&full, &base) {
                return Ok(None);
            }
            let by_name = self.config.filter.file_included(&full, &base);
            match self.magic {
                None => {
                    if !by_name {
                        return Ok(None);
                    }
                }
                Some(ref re) => {
                    // Magic admits a file regardless of the include
                    // lists; name based inclusion still works when the
                    // leading bytes don't match.
                    let by_name = self.config.filter.has_file_includes()
                        && by_name;
                    if !by_name && !self.sniff(path, re)? {
                        return Ok(None);
                    }
                }
            }
        }
        if let Some(ref stdout) = self.stdout_handle {
            if let Ok(handle) = Handle::from_path(path) {
                if handle == *stdout {
                    log::debug!(
                        "{}: skipping, same file as stdout",
                        path.display()
                    );
                    return Ok(None);
                }
            }
        }
        Ok(Some(DirEntry::file(path.to_path_buf(), depth)))
    }

    /// Match the leading bytes of the file against the magic pattern.
    fn sniff(&self, path: &Path, re: &Regex) -> Result<bool, Error> {
        let mut file =
            File::open(path).map_err(|err| Error::io(path, err))?;
        let mut buf = [0u8; 4096];
        let mut len = 0;
        while len < buf.len() {
            match file.read(&mut buf[len..]) {
                Ok(0) => break,
                Ok(n) => len += n,
                Err(ref err)
                    if err.kind() == std::io::ErrorKind::Interrupted =>
                {
                    continue;
                }
                Err(err) => return Err(Error::io(path, err)),
            }
        }
        Ok(re.is_match(&buf[..len]))
    }

    /// Handle one top level path, either yielding it directly or
    /// setting up a recursive traversal.
    fn start_path(
        &mut self,
        path: PathBuf,
    ) -> Option<Result<DirEntry, Error>> {
        let follow_arg = self.config.follow_args || self.config.follow;
        let md = if follow_arg {
            fs::metadata(&path)
        } else {
            fs::symlink_metadata(&path)
        };
        let md = match md {
            Ok(md) => md,
            Err(err) => return Some(Err(Error::io(path, err))),
        };
        let ft = md.file_type();
        if ft.is_symlink() {
            // Only reachable when argument dereferencing is off.
            return None;
        }
        if ft.is_dir() {
            match self.config.directories {
                DirectoryPolicy::Read => {
                    return Some(Err(Error::IsDirectory(path)));
                }
                DirectoryPolicy::Skip => return None,
                DirectoryPolicy::Recurse => {
                    let mut walker = WalkDir::new(path)
                        .follow_links(self.config.follow)
                        .follow_root_links(follow_arg);
                    if let Some(depth) = self.config.max_depth {
                        walker = walker.max_depth(depth);
                    }
                    self.current = Some(walker.into_iter());
                    return self.next_in_current();
                }
            }
        }
        if is_device(&ft) {
            return match self.config.devices {
                DevicePolicy::Read => {
                    Some(Ok(DirEntry::device(path, 0)))
                }
                DevicePolicy::Skip => None,
            };
        }
        match self.admit_file(&path, 0, false) {
            Ok(Some(dent)) => Some(Ok(dent)),
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        }
    }

    /// Pull the next admitted entry out of the current recursive
    /// traversal, if one is active.
    fn next_in_current(&mut self) -> Option<Result<DirEntry, Error>> {
        loop {
            let next = self.current.as_mut()?.next();
            let dent = match next {
                None => {
                    self.current = None;
                    return None;
                }
                Some(Err(err)) => {
                    let path = err
                        .path()
                        .map(|p| p.to_path_buf())
                        .unwrap_or_default();
                    let ioerr = err.into_io_error().unwrap_or_else(|| {
                        std::io::Error::new(
                            std::io::ErrorKind::Other,
                            "directory walk error",
                        )
                    });
                    return Some(Err(Error::io(path, ioerr)));
                }
                Some(Ok(dent)) => dent,
            };
            let depth = dent.depth();
            let ft = dent.file_type();
            if ft.is_dir() {
                if depth == 0 {
                    continue;
                }
                let base = basename_bytes(dent.path());
                let skip = (self.config.skip_hidden
                    && is_hidden_name(&base))
                    || !self
                        .config
                        .filter
                        .admits_dir(&path_bytes(dent.path()), &base);
                if skip {
                    log::debug!(
                        "{}: directory filtered from the walk",
                        dent.path().display()
                    );
                    self.current.as_mut().unwrap().skip_current_dir();
                }
                continue;
            }
            if ft.is_symlink() {
                // Symlinks inside the tree are only followed when the
                // walker was configured to follow them, in which case
                // walkdir has already resolved them.
                continue;
            }
            if is_device(&ft) {
                match self.config.devices {
                    DevicePolicy::Read => {
                        return Some(Ok(DirEntry::device(
                            dent.path().to_path_buf(),
                            depth,
                        )));
                    }
                    DevicePolicy::Skip => continue,
                }
            }
            if !ft.is_file() {
                continue;
            }
            match self.admit_file(dent.path(), depth, false) {
                Ok(Some(entry)) => return Some(Ok(entry)),
                Ok(None) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

impl Iterator for Walk {
    type Item = Result<DirEntry, Error>;

    fn next(&mut self) -> Option<Result<DirEntry, Error>> {
        loop {
            if self.current.is_some() {
                if let Some(item) = self.next_in_current() {
                    return Some(item);
                }
                continue;
            }
            let path = self.paths.next()?;
            if let Some(item) = self.start_path(path) {
                return Some(item);
            }
        }
    }
}

fn is_hidden_name(base: &[u8]) -> bool {
    base.first() == Some(&b'.')
}

#[cfg(unix)]
fn is_device(ft: &fs::FileType) -> bool {
    use std::os::unix::fs::FileTypeExt;
    ft.is_block_device()
        || ft.is_char_device()
        || ft.is_fifo()
        || ft.is_socket()
}

#[cfg(not(unix))]
fn is_device(_ft: &fs::FileType) -> bool {
    false
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
fn basename_bytes(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.file_name().map(|b| b.as_bytes().to_vec()).unwrap_or_default()
}

#[cfg(not(unix))]
fn basename_bytes(path: &Path) -> Vec<u8> {
    path.file_name()
        .map(|b| b.to_string_lossy().into_owned().into_bytes())
        .unwrap_or_default()
}
