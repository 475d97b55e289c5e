use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use unigrep_cli as cli;
use unigrep_matcher::Matcher;
#[cfg(feature = "pcre2")]
use unigrep_pcre2::RegexMatcher as PCRE2RegexMatcher;
use unigrep_printer::{Standard, Summary};
use unigrep_regex::RegexMatcher as RustRegexMatcher;
use unigrep_searcher::Engine;
use termcolor::WriteColor;

use crate::subject::Subject;

/// The configuration for the search worker. This controls the bits of
/// the search that sit above the engine: decompression and the name
/// shown for standard input.
#[derive(Clone, Debug)]
struct Config {
    search_zip: bool,
    label: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Config {
        Config { search_zip: false, label: None }
    }
}

/// A builder for configuring and constructing a search worker.
#[derive(Clone, Debug)]
pub struct SearchWorkerBuilder {
    config: Config,
    decomp_builder: cli::DecompressionReaderBuilder,
}

impl Default for SearchWorkerBuilder {
    fn default() -> SearchWorkerBuilder {
        SearchWorkerBuilder::new()
    }
}

impl SearchWorkerBuilder {
    /// Create a new builder for configuring and constructing a search
    /// worker.
    pub fn new() -> SearchWorkerBuilder {
        SearchWorkerBuilder {
            config: Config::default(),
            decomp_builder: cli::DecompressionReaderBuilder::new(),
        }
    }

    /// Create a new search worker using the given matcher, engine and
    /// printer.
    pub fn build<W: WriteColor>(
        &self,
        matcher: PatternMatcher,
        engine: Engine,
        printer: Printer<W>,
    ) -> SearchWorker<W> {
        let config = self.config.clone();
        let decomp_builder = self.decomp_builder.clone();
        SearchWorker { config, decomp_builder, matcher, engine, printer }
    }

    /// Enable the decompression and searching of common compressed
    /// files.
    ///
    /// When enabled, if a particular file path is recognized as a
    /// compressed file, then it is decompressed before searching.
    pub fn search_zip(&mut self, yes: bool) -> &mut SearchWorkerBuilder {
        self.config.search_zip = yes;
        self
    }

    /// Set the path label used for standard input in the output.
    pub fn label(
        &mut self,
        label: Option<PathBuf>,
    ) -> &mut SearchWorkerBuilder {
        self.config.label = label;
        self
    }
}

/// The result of executing a search.
///
/// The search output itself goes to the printer; this carries the
/// aggregate facts a session wants afterwards.
#[derive(Clone, Debug, Default)]
pub struct SearchResult {
    has_match: bool,
    matched_lines: u64,
    matches: u64,
    bytes_searched: u64,
}

impl SearchResult {
    /// Whether the search found a match or not.
    pub fn has_match(&self) -> bool {
        self.has_match
    }
}

/// Aggregate statistics over a whole session, printed by `--stats`.
#[derive(Clone, Debug, Default)]
pub struct Totals {
    files_searched: u64,
    files_matched: u64,
    matched_lines: u64,
    matches: u64,
    bytes_searched: u64,
}

impl Totals {
    /// A fresh, zeroed tally.
    pub fn new() -> Totals {
        Totals::default()
    }

    /// Fold one search's result into the tally.
    pub fn add(&mut self, result: &SearchResult) {
        self.files_searched += 1;
        if result.has_match {
            self.files_matched += 1;
        }
        self.matched_lines += result.matched_lines;
        self.matches += result.matches;
        self.bytes_searched += result.bytes_searched;
    }

    /// Render the tally in the `--stats` format.
    pub fn write<W: Write>(
        &self,
        mut wtr: W,
        elapsed: Duration,
    ) -> io::Result<()> {
        write!(
            wtr,
            "
{files_searched} files searched
{files_matched} files matched
{matched_lines} matching lines
{matches} matches
{bytes_searched} bytes searched
{elapsed:0.6} seconds
",
            files_searched = self.files_searched,
            files_matched = self.files_matched,
            matched_lines = self.matched_lines,
            matches = self.matches,
            bytes_searched = self.bytes_searched,
            elapsed = fractional_seconds(elapsed),
        )
    }
}

/// The pattern matcher used by a search worker.
#[derive(Clone, Debug)]
pub enum PatternMatcher {
    RustRegex(RustRegexMatcher),
    #[cfg(feature = "pcre2")]
    PCRE2(PCRE2RegexMatcher),
}

/// The printer used by a search worker.
///
/// The `W` type parameter refers to the type of the underlying writer.
#[derive(Debug)]
pub enum Printer<W> {
    /// Use the standard printer, which supports the classic grep-like
    /// format.
    Standard(Standard<W>),
    /// Use the summary printer, which supports aggregate displays of
    /// search results.
    Summary(Summary<W>),
}

impl<W: WriteColor> Printer<W> {
    /// Return a mutable reference to the underlying printer's writer.
    pub fn get_mut(&mut self) -> &mut W {
        match *self {
            Printer::Standard(ref mut p) => p.get_mut(),
            Printer::Summary(ref mut p) => p.get_mut(),
        }
    }
}

/// A worker for executing searches.
///
/// It is intended for a single worker to execute many searches, and is
/// generally intended to be used from a single thread.
#[derive(Debug)]
pub struct SearchWorker<W> {
    config: Config,
    decomp_builder: cli::DecompressionReaderBuilder,
    matcher: PatternMatcher,
    engine: Engine,
    printer: Printer<W>,
}

impl<W: WriteColor> SearchWorker<W> {
    /// Execute a search over the given subject.
    pub fn search(&mut self, subject: &Subject) -> io::Result<SearchResult> {
        if subject.is_stdin() {
            let stdin = io::stdin();
            // A `return` here appeases the borrow checker: the stdin
            // lock must not outlive this block.
            return self.search_reader(None, &mut stdin.lock());
        }
        let path = subject.path().to_path_buf();
        if self.should_decompress(&path) {
            let mut rdr = self
                .decomp_builder
                .build(&path)
                .map_err(io::Error::from)?;
            self.search_reader(Some(&path), &mut rdr)
        } else if subject.is_device() {
            let mut file = File::open(&path)?;
            self.search_reader(Some(&path), &mut file)
        } else {
            self.search_path(&path)
        }
    }

    /// Return a mutable reference to the underlying printer.
    pub fn printer(&mut self) -> &mut Printer<W> {
        &mut self.printer
    }

    /// Print the session totals to the underlying writer.
    pub fn print_totals(
        &mut self,
        elapsed: Duration,
        totals: &Totals,
    ) -> io::Result<()> {
        totals.write(self.printer.get_mut(), elapsed)
    }

    /// Returns true if and only if the given file path should be
    /// decompressed before searching.
    fn should_decompress(&self, path: &Path) -> bool {
        if !self.config.search_zip {
            return false;
        }
        self.decomp_builder.get_matcher().has_command(path)
    }

    /// Search the contents of the given file path.
    fn search_path(&mut self, path: &Path) -> io::Result<SearchResult> {
        use self::PatternMatcher::*;

        let (engine, printer) = (&self.engine, &mut self.printer);
        match self.matcher {
            RustRegex(ref m) => search_path(engine, m, printer, path),
            #[cfg(feature = "pcre2")]
            PCRE2(ref m) => search_path(engine, m, printer, path),
        }
    }

    /// Executes a search on the given reader, which may or may not
    /// correspond directly to the contents of the given file path.
    /// Instead, the reader may actually cause something else to be
    /// searched (for example, when decompression is enabled, or for
    /// standard input). In those cases, the file path is used for
    /// display purposes.
    fn search_reader<R: io::Read>(
        &mut self,
        path: Option<&Path>,
        rdr: &mut R,
    ) -> io::Result<SearchResult> {
        use self::PatternMatcher::*;

        let label = match path {
            Some(path) => path.to_path_buf(),
            None => self
                .config
                .label
                .clone()
                .unwrap_or_else(|| PathBuf::from("(standard input)")),
        };
        let (engine, printer) = (&self.engine, &mut self.printer);
        match self.matcher {
            RustRegex(ref m) => {
                search_reader(engine, m, printer, &label, rdr)
            }
            #[cfg(feature = "pcre2")]
            PCRE2(ref m) => {
                search_reader(engine, m, printer, &label, rdr)
            }
        }
    }
}

/// Search the contents of the given file path using the given matcher,
/// engine and printer.
fn search_path<M: Matcher, W: WriteColor>(
    engine: &Engine,
    matcher: M,
    printer: &mut Printer<W>,
    path: &Path,
) -> io::Result<SearchResult> {
    match *printer {
        Printer::Standard(ref mut p) => {
            let mut sink = p.sink_with_path(path);
            engine.search_path(matcher, path, &mut sink)?;
            Ok(SearchResult {
                has_match: sink.has_match(),
                matched_lines: sink.selected_lines(),
                matches: sink.match_count(),
                bytes_searched: sink.bytes_searched(),
            })
        }
        Printer::Summary(ref mut p) => {
            let mut sink = p.sink_with_path(path);
            engine.search_path(matcher, path, &mut sink)?;
            Ok(SearchResult {
                has_match: sink.has_match(),
                matched_lines: sink.selected_lines(),
                matches: sink.match_count(),
                bytes_searched: sink.bytes_searched(),
            })
        }
    }
}

/// Search the contents of the given reader using the given matcher,
/// engine and printer.
fn search_reader<M: Matcher, R: io::Read, W: WriteColor>(
    engine: &Engine,
    matcher: M,
    printer: &mut Printer<W>,
    path: &Path,
    rdr: R,
) -> io::Result<SearchResult> {
    match *printer {
        Printer::Standard(ref mut p) => {
            let mut sink = p.sink_with_path(path);
            engine.search_reader(matcher, rdr, &mut sink)?;
            Ok(SearchResult {
                has_match: sink.has_match(),
                matched_lines: sink.selected_lines(),
                matches: sink.match_count(),
                bytes_searched: sink.bytes_searched(),
            })
        }
        Printer::Summary(ref mut p) => {
            let mut sink = p.sink_with_path(path);
            engine.search_reader(matcher, rdr, &mut sink)?;
            Ok(SearchResult {
                has_match: sink.has_match(),
                matched_lines: sink.selected_lines(),
                matches: sink.match_count(),
                bytes_searched: sink.bytes_searched(),
            })
        }
    }
}

/// Format the given duration as fractional seconds.
fn fractional_seconds(duration: Duration) -> f64 {
    duration.as_secs() as f64 + f64::from(duration.subsec_nanos()) * 1e-9
}
