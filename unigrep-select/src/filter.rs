use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use unigrep_globset::{Glob, GlobSet};

use crate::Error;

/// Builds the include/exclude wildcard lists that decide which walked
/// entries are admitted.
///
/// There are four primary lists: include and exclude, each for files and
/// for directories. Every list has a parallel override list, populated
/// by gitignore style `!` prefixed wildcards, which re-admits entries
/// that the primary list would have rejected.
#[derive(Clone, Debug, Default)]
pub struct FilterBuilder {
    filter: Filter,
}

impl FilterBuilder {
    /// Create a builder with empty lists, which admit everything.
    pub fn new() -> FilterBuilder {
        FilterBuilder::default()
    }

    /// Produce the finished filter.
    pub fn build(&self) -> Filter {
        self.filter.clone()
    }

    /// Add an include wildcard for files.
    ///
    /// A leading `!` registers the wildcard on the include override
    /// list; a trailing `/` redirects it to the directory list.
    pub fn include(&mut self, glob: &str) -> Result<&mut FilterBuilder, Error> {
        add(glob, &mut self.filter.include_files,
            &mut self.filter.include_files_override,
            &mut self.filter.include_dirs,
            &mut self.filter.include_dirs_override)?;
        Ok(self)
    }

    /// Add an exclude wildcard for files.
    ///
    /// A leading `!` registers the wildcard on the exclude override
    /// list; a trailing `/` redirects it to the directory list.
    pub fn exclude(&mut self, glob: &str) -> Result<&mut FilterBuilder, Error> {
        add(glob, &mut self.filter.exclude_files,
            &mut self.filter.exclude_files_override,
            &mut self.filter.exclude_dirs,
            &mut self.filter.exclude_dirs_override)?;
        Ok(self)
    }

    /// Add an include wildcard for directories.
    pub fn include_dir(
        &mut self,
        glob: &str,
    ) -> Result<&mut FilterBuilder, Error> {
        add_dir(glob, &mut self.filter.include_dirs,
            &mut self.filter.include_dirs_override)?;
        Ok(self)
    }

    /// Add an exclude wildcard for directories.
    pub fn exclude_dir(
        &mut self,
        glob: &str,
    ) -> Result<&mut FilterBuilder, Error> {
        add_dir(glob, &mut self.filter.exclude_dirs,
            &mut self.filter.exclude_dirs_override)?;
        Ok(self)
    }

    /// Load include wildcards from a gitignore style list file: one
    /// wildcard per line, `#` starts a comment, `!` inverts and a
    /// trailing `/` restricts the wildcard to directories.
    pub fn include_from<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> Result<&mut FilterBuilder, Error> {
        let lines = read_lines(path.as_ref())?;
        for line in lines {
            self.include(&line)?;
        }
        Ok(self)
    }

    /// Load exclude wildcards from a gitignore style list file.
    pub fn exclude_from<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> Result<&mut FilterBuilder, Error> {
        let lines = read_lines(path.as_ref())?;
        for line in lines {
            self.exclude(&line)?;
        }
        Ok(self)
    }
}

fn read_lines(path: &Path) -> Result<Vec<String>, Error> {
    let file = File::open(path).map_err(|err| Error::io(path, err))?;
    let rdr = BufReader::new(file);
    let mut lines = vec![];
    for line in rdr.lines() {
        let line = line.map_err(|err| Error::io(path, err))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        lines.push(line.to_string());
    }
    Ok(lines)
}

fn add(
    glob: &str,
    files: &mut GlobSet,
    files_override: &mut GlobSet,
    dirs: &mut GlobSet,
    dirs_override: &mut GlobSet,
) -> Result<(), Error> {
    let (glob, invert) = match glob.strip_prefix('!') {
        Some(rest) => (rest, true),
        None => (glob, false),
    };
    let (glob, dir_only) = match glob.strip_suffix('/') {
        Some(rest) => (rest, true),
        None => (glob, false),
    };
    let compiled = Glob::new(glob)?;
    let set = match (dir_only, invert) {
        (false, false) => files,
        (false, true) => files_override,
        (true, false) => dirs,
        (true, true) => dirs_override,
    };
    set.add(compiled);
    Ok(())
}

fn add_dir(
    glob: &str,
    dirs: &mut GlobSet,
    dirs_override: &mut GlobSet,
) -> Result<(), Error> {
    let (glob, invert) = match glob.strip_prefix('!') {
        Some(rest) => (rest, true),
        None => (glob, false),
    };
    let glob = glob.strip_suffix('/').unwrap_or(glob);
    let compiled = Glob::new(glob)?;
    if invert {
        dirs_override.add(compiled);
    } else {
        dirs.add(compiled);
    }
    Ok(())
}

/// The compiled include/exclude lists.
///
/// Evaluation is uniform for files and directories: the override list
/// is consulted first and wins; otherwise a match on the exclude list
/// rejects the entry; finally, when the include list is non-empty, an
/// entry is admitted only when some include wildcard matches it (after
/// a pre-check of the include override list, which un-includes).
#[derive(Clone, Debug, Default)]
pub struct Filter {
    include_files: GlobSet,
    include_files_override: GlobSet,
    include_dirs: GlobSet,
    include_dirs_override: GlobSet,
    exclude_files: GlobSet,
    exclude_files_override: GlobSet,
    exclude_dirs: GlobSet,
    exclude_dirs_override: GlobSet,
}

impl Filter {
    /// Returns true if and only if there are no wildcards at all.
    pub fn is_empty(&self) -> bool {
        self.include_files.is_empty()
            && self.include_files_override.is_empty()
            && self.include_dirs.is_empty()
            && self.include_dirs_override.is_empty()
            && self.exclude_files.is_empty()
            && self.exclude_files_override.is_empty()
            && self.exclude_dirs.is_empty()
            && self.exclude_dirs_override.is_empty()
    }

    /// Returns true if and only if any file include wildcards are
    /// present.
    pub fn has_file_includes(&self) -> bool {
        !self.include_files.is_empty()
    }

    /// Returns true if and only if the given file name matches a file
    /// include wildcard, after consulting the include override list.
    pub fn file_included(&self, path: &[u8], basename: &[u8]) -> bool {
        if self.include_files.is_empty() {
            return true;
        }
        if self.include_files_override.is_match(path, basename) {
            return false;
        }
        self.include_files.is_match(path, basename)
    }

    /// Returns true if and only if the given file name is rejected by
    /// the exclude list (and not re-admitted by an override).
    pub fn file_excluded(&self, path: &[u8], basename: &[u8]) -> bool {
        if self.exclude_files_override.is_match(path, basename) {
            return false;
        }
        self.exclude_files.is_match(path, basename)
    }

    /// Whether a file with the given name is admitted.
    pub fn admits_file(&self, path: &[u8], basename: &[u8]) -> bool {
        !self.file_excluded(path, basename)
            && self.file_included(path, basename)
    }

    /// Whether a directory with the given name may be entered.
    pub fn admits_dir(&self, path: &[u8], basename: &[u8]) -> bool {
        if self.exclude_dirs_override.is_match(path, basename) {
            return true;
        }
        if self.exclude_dirs.is_match(path, basename) {
            return false;
        }
        if self.include_dirs.is_empty() {
            return true;
        }
        if self.include_dirs_override.is_match(path, basename) {
            return false;
        }
        self.include_dirs.is_match(path, basename)
    }
}

#[cfg(test)]
mod tests {
    use super::FilterBuilder;

    fn admits_file(filter: &super::Filter, path: &str) -> bool {
        let base = path.rsplit('/').next().unwrap();
        filter.admits_file(path.as_bytes(), base.as_bytes())
    }

    fn admits_dir(filter: &super::Filter, path: &str) -> bool {
        let base = path.rsplit('/').next().unwrap();
        filter.admits_dir(path.as_bytes(), base.as_bytes())
    }

    #[test]
    fn empty_admits_everything() {
        let filter = FilterBuilder::new().build();
        assert!(admits_file(&filter, "anything.txt"));
        assert!(admits_dir(&filter, "anywhere"));
    }

    #[test]
    fn excludes_reject() {
        let mut builder = FilterBuilder::new();
        builder.exclude("*.o").unwrap();
        let filter = builder.build();
        assert!(!admits_file(&filter, "main.o"));
        assert!(admits_file(&filter, "main.c"));
    }

    #[test]
    fn override_readmits() {
        let mut builder = FilterBuilder::new();
        builder.exclude("*.o").unwrap();
        builder.exclude("!keep.o").unwrap();
        let filter = builder.build();
        assert!(!admits_file(&filter, "main.o"));
        assert!(admits_file(&filter, "keep.o"));
    }

    #[test]
    fn includes_restrict() {
        let mut builder = FilterBuilder::new();
        builder.include("*.rs").unwrap();
        let filter = builder.build();
        assert!(admits_file(&filter, "lib.rs"));
        assert!(!admits_file(&filter, "lib.c"));
        // Directories are not restricted by file includes.
        assert!(admits_dir(&filter, "src"));
    }

    #[test]
    fn include_override_unincludes() {
        let mut builder = FilterBuilder::new();
        builder.include("*.rs").unwrap();
        builder.include("!generated.rs").unwrap();
        let filter = builder.build();
        assert!(admits_file(&filter, "lib.rs"));
        assert!(!admits_file(&filter, "generated.rs"));
    }

    #[test]
    fn exclude_beats_include() {
        let mut builder = FilterBuilder::new();
        builder.include("*.rs").unwrap();
        builder.exclude("bad.rs").unwrap();
        let filter = builder.build();
        assert!(admits_file(&filter, "good.rs"));
        assert!(!admits_file(&filter, "bad.rs"));
    }

    #[test]
    fn trailing_slash_selects_dir_list() {
        let mut builder = FilterBuilder::new();
        builder.exclude("target/").unwrap();
        let filter = builder.build();
        // The wildcard applies to directories, not files.
        assert!(admits_file(&filter, "target"));
        assert!(!admits_dir(&filter, "target"));
    }

    #[test]
    fn dir_excludes() {
        let mut builder = FilterBuilder::new();
        builder.exclude_dir(".git").unwrap();
        builder.exclude_dir("!keep").unwrap();
        let filter = builder.build();
        assert!(!admits_dir(&filter, ".git"));
        assert!(admits_dir(&filter, "src"));
        assert!(admits_dir(&filter, "keep"));
    }
}
