use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::ArgMatches;

use unigrep_cli as cli;
use unigrep_printer::{
    ColorSpecs, StandardBuilder, SummaryBuilder, SummaryKind,
};
use unigrep_regex::translate_basic;
use unigrep_searcher::{
    BinaryPolicy, Engine, EngineBuilder, MmapChoice, SourceEncoding,
};
use unigrep_select::{
    definitions, find_type, DevicePolicy, DirectoryPolicy, FilterBuilder,
    Walk, WalkBuilder,
};
use termcolor::{self, ColorChoice, WriteColor};

use crate::app;
use crate::messages;
use crate::search::{
    PatternMatcher, Printer, SearchWorker, SearchWorkerBuilder,
};
use crate::subject::SubjectBuilder;
use crate::Result;

/// The command to run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Command {
    /// Execute a search.
    Search,
    /// Print the built-in file type table.
    Types,
}

/// The lowered, immutable result of parsing the command line.
///
/// Everything the components need is derived once here; the rest of the
/// program never consults the raw matches again.
#[derive(Debug)]
pub struct Args {
    matches: ArgMatches<'static>,
    command: Command,
    paths: Vec<PathBuf>,
    using_default_path: bool,
    stdin_mode: bool,
    /// Effective display options after the conflict rules are applied:
    /// context or passthrough disable only-matching, and inversion
    /// disables both only-matching and no-group.
    only_matching: bool,
    no_group: bool,
    any_line: bool,
    before_context: usize,
    after_context: usize,
    allow_empty: bool,
    matcher: PatternMatcher,
    binary_mode: BinaryPolicy,
    with_filename: bool,
    color_specs: ColorSpecs,
    color_choice: ColorChoice,
    started_at: Instant,
}

impl Args {
    /// Parse the command line and lower it.
    pub fn parse() -> Result<Args> {
        let matches = match app::app().get_matches_safe() {
            Ok(matches) => matches,
            Err(err) => {
                use clap::ErrorKind::*;
                if err.kind == HelpDisplayed || err.kind == VersionDisplayed
                {
                    let _ = write!(io::stdout(), "{}", err);
                    std::process::exit(0);
                }
                return Err(err.into());
            }
        };

        messages::set_messages(
            !(matches.is_present("quiet")
                || matches.is_present("no-messages")),
        );
        if matches.is_present("debug") {
            crate::logger::Logger::init()?;
            log::set_max_level(log::LevelFilter::Trace);
        }

        let command = if matches
            .values_of("file-type")
            .map_or(false, |mut vals| vals.any(|v| v == "list"))
        {
            Command::Types
        } else {
            Command::Search
        };

        // Printing the type table needs no pattern at all.
        let (pattern, pattern_only_matching, mut allow_empty) =
            if command == Command::Types {
                (String::new(), false, false)
            } else {
                assemble_pattern(&matches)?
            };
        let matcher = build_matcher(&matches, &pattern)?;
        allow_empty = allow_empty || matches.is_present("empty");

        // Option interactions: passthrough zeroes the context windows;
        // any context or passthrough disables only-matching; inversion
        // disables only-matching and no-group.
        let mut before_context = parse_usize(&matches, "before-context")?;
        let mut after_context = parse_usize(&matches, "after-context")?;
        if let Some(both) = parse_opt_usize(&matches, "context")? {
            before_context = both;
            after_context = both;
        }
        let any_line = matches.is_present("any-line");
        if any_line {
            before_context = 0;
            after_context = 0;
        }
        let invert = matches.is_present("invert-match");
        let mut only_matching = matches.is_present("only-matching")
            || pattern_only_matching;
        if any_line || before_context > 0 || after_context > 0 {
            only_matching = false;
        }
        let mut no_group = matches.is_present("no-group");
        if invert {
            only_matching = false;
            no_group = false;
        }

        let binary_mode = binary_mode(&matches);

        let (paths, using_default_path, stdin_mode) = paths(&matches);
        let with_filename = if matches.is_present("with-filename") {
            true
        } else if matches.is_present("no-filename") {
            false
        } else {
            paths.len() > 1
                || directory_policy(&matches).0 == DirectoryPolicy::Recurse
        };

        let (color_specs, color_choice) = colors(&matches, invert);

        Ok(Args {
            matches,
            command,
            paths,
            using_default_path,
            stdin_mode,
            only_matching,
            no_group,
            any_line,
            before_context,
            after_context,
            allow_empty,
            matcher,
            binary_mode,
            with_filename,
            color_specs,
            color_choice,
            started_at: Instant::now(),
        })
    }

    /// The command to run.
    pub fn command(&self) -> Command {
        self.command
    }

    /// Whether quiet mode is in effect.
    pub fn quiet(&self) -> bool {
        self.matches.is_present("quiet")
    }

    /// Whether the session should print statistics at the end.
    pub fn stats(&self) -> bool {
        self.matches.is_present("stats")
    }

    /// The instant the session started, for statistics.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// The cap on the number of matched files, if any. Quiet mode stops
    /// at the first one.
    pub fn max_files(&self) -> Result<Option<u64>> {
        if self.quiet() {
            return Ok(Some(1));
        }
        parse_opt_u64(&self.matches, "max-files")
    }

    /// Whether the default path (stdin or the working directory) is in
    /// use because no inputs were given.
    pub fn using_default_path(&self) -> bool {
        self.using_default_path
    }

    /// Whether the session searches standard input instead of walking
    /// the file system.
    pub fn stdin_mode(&self) -> bool {
        self.stdin_mode
    }

    /// Build the output writer, honoring the pager, buffering and color
    /// settings.
    pub fn stdout(&self) -> Result<OutputWriter> {
        if let Some(cmd) = self.pager_command() {
            let pager = cli::PagerWriter::new(&cmd)?;
            return Ok(match self.color_choice {
                ColorChoice::Never => {
                    OutputWriter::PagerNoColor(termcolor::NoColor::new(pager))
                }
                _ => OutputWriter::Pager(termcolor::Ansi::new(pager)),
            });
        }
        Ok(OutputWriter::Stdout(if self.matches.is_present("line-buffered")
        {
            cli::stdout_buffered_line(self.color_choice)
        } else {
            cli::stdout(self.color_choice)
        }))
    }

    /// The pager command, when paged output was requested.
    fn pager_command(&self) -> Option<String> {
        if !self.matches.is_present("pager") {
            return None;
        }
        if let Some(cmd) = self.matches.value_of("pager") {
            return Some(cmd.to_string());
        }
        Some(env::var("PAGER").unwrap_or_else(|_| "less".to_string()))
    }

    /// Build the subject builder.
    pub fn subject_builder(&self) -> SubjectBuilder {
        let mut builder = SubjectBuilder::new();
        builder.strip_dot_prefix(self.using_default_path);
        builder
    }

    /// Build a search worker over the given writer.
    pub fn search_worker<W: WriteColor>(
        &self,
        wtr: W,
    ) -> Result<SearchWorker<W>> {
        let mut builder = SearchWorkerBuilder::new();
        builder
            .search_zip(self.matches.is_present("decompress"))
            .label(self.matches.value_of("label").map(PathBuf::from));
        let printer = self.printer(wtr)?;
        Ok(builder.build(self.matcher.clone(), self.engine()?, printer))
    }

    /// Build the match-and-emit engine.
    fn engine(&self) -> Result<Engine> {
        let mut builder = EngineBuilder::new();
        builder
            .line_number(
                self.matches.is_present("line-number")
                    || self.matches.is_present("only-line-number"),
            )
            .invert_match(self.matches.is_present("invert-match"))
            .before_context(self.before_context)
            .after_context(self.after_context)
            .passthru(self.any_line)
            .max_count(parse_opt_u64(&self.matches, "max-count")?)
            .allow_empty(self.allow_empty)
            .collect_spans(self.needs_spans())
            .binary(self.effective_binary_policy())
            .memory_map(unsafe { MmapChoice::auto() });
        if let Some(label) = self.matches.value_of("encoding") {
            builder.encoding(Some(SourceEncoding::new(label)?));
        }
        Ok(builder.build())
    }

    /// Whether any of the selected output shapes needs the engine to
    /// compute per-match spans.
    fn needs_spans(&self) -> bool {
        let matches = &self.matches;
        // Coloring matched text requires the spans.
        let colored = self.color_choice != ColorChoice::Never
            && (!self.color_specs.matched_selected().is_none()
                || !self.color_specs.matched_context().is_none());
        colored
            || self.only_matching
            || self.no_group
            || matches.is_present("only-line-number")
            || matches.is_present("column-number")
            || matches.is_present("stats")
            || self.binary_mode == BinaryPolicy::Hex
            || self.binary_mode == BinaryPolicy::WithHex
    }

    /// The binary policy handed to the engine.
    ///
    /// The display oriented policies only make sense when line content
    /// is actually shown, so the summary modes run as text; the
    /// without-match filter applies everywhere.
    fn effective_binary_policy(&self) -> BinaryPolicy {
        let matches = &self.matches;
        let summary_mode = matches.is_present("quiet")
            || matches.is_present("files-with-matches")
            || matches.is_present("files-without-match")
            || matches.is_present("count");
        if summary_mode && self.binary_mode != BinaryPolicy::WithoutMatch {
            BinaryPolicy::Text
        } else {
            self.binary_mode
        }
    }

    /// Build the printer for the selected output mode.
    fn printer<W: WriteColor>(&self, wtr: W) -> Result<Printer<W>> {
        let matches = &self.matches;
        let summary_kind = if matches.is_present("quiet") {
            Some(SummaryKind::Quiet)
        } else if matches.is_present("files-with-matches") {
            Some(SummaryKind::PathWithMatch)
        } else if matches.is_present("files-without-match") {
            Some(SummaryKind::PathWithoutMatch)
        } else if matches.is_present("count") {
            if self.no_group {
                Some(SummaryKind::CountMatches)
            } else {
                Some(SummaryKind::Count)
            }
        } else {
            None
        };

        let path_terminator = if matches.is_present("null") {
            Some(b'\x00')
        } else {
            None
        };

        if let Some(kind) = summary_kind {
            let mut builder = SummaryBuilder::new();
            builder
                .kind(kind)
                .color_specs(self.color_specs.clone())
                .path(self.with_filename)
                .path_terminator(path_terminator);
            if let Some(sep) = matches.value_of("separator") {
                builder.separator_field(cli::unescape(sep));
            }
            return Ok(Printer::Summary(builder.build(wtr)));
        }

        let mut builder = StandardBuilder::new();
        builder
            .color_specs(self.color_specs.clone())
            .path(self.with_filename)
            .only_matching(self.only_matching)
            .only_line_number(matches.is_present("only-line-number"))
            .per_match(self.no_group)
            .column(matches.is_present("column-number"))
            .byte_offset(matches.is_present("byte-offset"))
            .initial_tab(matches.is_present("initial-tab"))
            .hex(
                self.binary_mode == BinaryPolicy::Hex
                    || self.binary_mode == BinaryPolicy::WithHex,
            )
            .hex_offset(self.binary_mode == BinaryPolicy::Hex)
            .break_lines(
                matches.is_present("break") || matches.is_present("pager"),
            )
            .path_terminator(path_terminator);
        if let Some(width) = parse_opt_u64(matches, "tabs")? {
            builder.tab_width(width);
        }
        if let Some(sep) = matches.value_of("separator") {
            builder.separator_field_match(cli::unescape(sep));
        }
        if matches.is_present("no-group-separator") {
            builder.separator_group(None);
        } else if let Some(sep) = matches.value_of("group-separator") {
            builder.separator_group(Some(cli::unescape(sep)));
        }
        Ok(Printer::Standard(builder.build(wtr)))
    }

    /// Build the file system walk for this session.
    pub fn walker(&self) -> Result<Walk> {
        let matches = &self.matches;
        let mut paths = self.paths.iter();
        let first = paths
            .next()
            .expect("walker is only used when paths are present");
        let mut builder = WalkBuilder::new(first);
        for path in paths {
            builder.add(path);
        }

        let (dir_policy, follow) = directory_policy(matches);
        builder
            .directories(dir_policy)
            .follow(follow || matches.is_present("dereference"))
            .follow_args(!matches.is_present("no-dereference"))
            .devices(match matches.value_of("devices") {
                Some("read") => DevicePolicy::Read,
                _ => DevicePolicy::Skip,
            })
            .skip_hidden(matches.is_present("no-hidden"))
            .max_depth(parse_opt_usize(matches, "max-depth")?);

        let mut filter = FilterBuilder::new();
        if let Some(globs) = matches.values_of("include") {
            for glob in globs {
                filter.include(glob)?;
            }
        }
        if let Some(globs) = matches.values_of("exclude") {
            for glob in globs {
                filter.exclude(glob)?;
            }
        }
        if let Some(globs) = matches.values_of("include-dir") {
            for glob in globs {
                filter.include_dir(glob)?;
            }
        }
        if let Some(globs) = matches.values_of("exclude-dir") {
            for glob in globs {
                filter.exclude_dir(glob)?;
            }
        }
        if let Some(files) = matches.values_of("include-from") {
            for file in files {
                filter.include_from(file)?;
            }
        }
        if let Some(files) = matches.values_of("exclude-from") {
            for file in files {
                filter.exclude_from(file)?;
            }
        }

        // File extensions and named types lower into include globs and
        // magic signatures.
        let mut magics: Vec<String> = vec![];
        if let Some(exts) = matches.values_of("file-extensions") {
            for exts in exts {
                for ext in exts.split(',') {
                    if !ext.is_empty() {
                        filter.include(&format!("*.{}", ext))?;
                    }
                }
            }
        }
        if let Some(types) = matches.values_of("file-type") {
            for types in types {
                for name in types.split(',') {
                    let def = find_type(name).ok_or_else(|| {
                        unigrep_select::Error::UnrecognizedFileType(
                            name.to_string(),
                        )
                    })?;
                    for ext in def.extensions().split(',') {
                        filter.include(&format!("*.{}", ext))?;
                    }
                    if let Some(magic) = def.magic() {
                        magics.push(magic.to_string());
                    }
                }
            }
        }
        if let Some(patterns) = matches.values_of("file-magic") {
            for pattern in patterns {
                magics.push(pattern.to_string());
            }
        }
        builder.filter(filter.build());
        if !magics.is_empty() {
            builder.magic(Some(magics.join("|")));
        }
        Ok(builder.build()?)
    }

    /// Print the built-in file type table to the given writer.
    pub fn print_types<W: Write>(&self, mut wtr: W) -> io::Result<()> {
        for def in definitions() {
            writeln!(wtr, "{:>12} = -O {}", def.name(), def.extensions())?;
            if let Some(magic) = def.magic() {
                writeln!(wtr, "{:>15} -M '{}'", "", magic)?;
            }
        }
        Ok(())
    }
}

/// Collect the pattern fragments from the positional argument, `-e`
/// occurrences and `-f` files, and fold them into a single regex.
///
/// Returns the assembled pattern, whether a pattern file requested
/// only-matching output, and whether empty matches were implicitly
/// allowed by a literal `^$` fragment.
fn assemble_pattern(
    matches: &ArgMatches<'static>,
) -> Result<(String, bool, bool)> {
    let fixed = matches.is_present("fixed-strings");
    let basic = matches.is_present("basic-regexp");
    let via_flags =
        matches.is_present("regexp") || matches.is_present("file");

    let mut fragments: Vec<String> = vec![];
    if let Some(vals) = matches.values_of_os("regexp") {
        for val in vals {
            fragments.push(cli::pattern_from_os(val)?.to_string());
        }
    }
    if !via_flags {
        if let Some(val) = matches.value_of_os("pattern") {
            fragments.push(cli::pattern_from_os(val)?.to_string());
        }
    }

    let mut only_matching = false;
    if let Some(files) = matches.values_of_os("file") {
        let search_path = env::var_os("GREP_PATH");
        let default_dir = option_env!("UNIGREP_PATTERN_HOME");
        for file in files {
            let path = cli::resolve_pattern_file(
                Path::new(file),
                search_path.as_deref(),
                default_dir.map(Path::new),
            );
            let loaded = cli::patterns_from_path(&path)?;
            only_matching = only_matching || loaded.only_matching;
            fragments.extend(loaded.patterns);
        }
    }

    if fragments.is_empty() {
        return Err(From::from(
            "no pattern given; specify one as an argument, or with -e or -f",
        ));
    }

    let mut pieces: Vec<String> = vec![];
    let mut allow_empty = false;
    for fragment in &fragments {
        for piece in fragment.split('\n') {
            if piece == "^$" {
                // Explicitly asking for empty lines implies permission
                // to match nothing.
                allow_empty = true;
            }
            let piece = if fixed {
                regex::escape(piece)
            } else if basic {
                translate_basic(piece)
            } else {
                piece.to_string()
            };
            pieces.push(piece);
        }
    }
    Ok((pieces.join("|"), only_matching, allow_empty))
}

/// Build the pattern matcher from the assembled pattern.
///
/// When the pattern insists on matching through a line terminator, the
/// matcher is built without the single-line guarantee, which makes the
/// engine bind whole sources instead of streaming lines.
fn build_matcher(
    matches: &ArgMatches<'static>,
    pattern: &str,
) -> Result<PatternMatcher> {
    let whole_line = matches.is_present("line-regexp");

    if matches.is_present("perl-regexp") {
        return build_pcre2_matcher(matches, pattern, whole_line);
    }

    let pattern = if whole_line {
        format!("^(?:{})$", pattern)
    } else {
        pattern.to_string()
    };
    let mut builder = unigrep_regex::RegexMatcherBuilder::new();
    builder
        .case_insensitive(matches.is_present("ignore-case"))
        .case_smart(matches.is_present("smart-case"))
        .multi_line(true)
        .ignore_whitespace(matches.is_present("free-space"))
        .unicode(!matches.is_present("binary"))
        .word(matches.is_present("word-regexp"));

    // Prefer the line oriented streaming strategy.
    match builder.line_terminator(Some(b'\n')).build(&pattern) {
        Ok(matcher) => Ok(PatternMatcher::RustRegex(matcher)),
        Err(_) => {
            let matcher = builder.line_terminator(None).build(&pattern)?;
            Ok(PatternMatcher::RustRegex(matcher))
        }
    }
}

#[cfg(feature = "pcre2")]
fn build_pcre2_matcher(
    matches: &ArgMatches<'static>,
    pattern: &str,
    whole_line: bool,
) -> Result<PatternMatcher> {
    let mut builder = unigrep_pcre2::RegexMatcherBuilder::new();
    builder
        .caseless(matches.is_present("ignore-case"))
        .case_smart(matches.is_present("smart-case"))
        .multi_line(true)
        .word(matches.is_present("word-regexp"))
        .whole_line(whole_line)
        .jit_if_available(true);
    if !matches.is_present("binary") {
        builder.utf(true).ucp(true);
    }
    let matcher = builder.build(pattern)?;
    // PCRE2 makes no guarantee about line terminators in matches, so
    // the engine binds whole sources when searching with it.
    Ok(PatternMatcher::PCRE2(matcher))
}

#[cfg(not(feature = "pcre2"))]
fn build_pcre2_matcher(
    _matches: &ArgMatches<'static>,
    _pattern: &str,
    _whole_line: bool,
) -> Result<PatternMatcher> {
    Err(From::from(
        "PCRE2 is not available in this build of unigrep; \
         rebuild with the 'pcre2' feature to use -P",
    ))
}

/// Derive the binary policy from the flags.
fn binary_mode(matches: &ArgMatches<'static>) -> BinaryPolicy {
    if let Some(name) = matches.value_of("binary-files") {
        return match name {
            "without-match" => BinaryPolicy::WithoutMatch,
            "text" => BinaryPolicy::Text,
            "hex" => BinaryPolicy::Hex,
            "with-hex" => BinaryPolicy::WithHex,
            _ => BinaryPolicy::Binary,
        };
    }
    if matches.is_present("hex") {
        BinaryPolicy::Hex
    } else if matches.is_present("with-hex") {
        BinaryPolicy::WithHex
    } else if matches.is_present("text") {
        BinaryPolicy::Text
    } else if matches.is_present("binary-without-match") {
        BinaryPolicy::WithoutMatch
    } else {
        BinaryPolicy::Binary
    }
}

/// The directory policy plus whether recursion should follow symlinks.
fn directory_policy(
    matches: &ArgMatches<'static>,
) -> (DirectoryPolicy, bool) {
    if matches.is_present("dereference-recursive") {
        return (DirectoryPolicy::Recurse, true);
    }
    if matches.is_present("recursive") {
        return (DirectoryPolicy::Recurse, false);
    }
    match matches.value_of("directories") {
        Some("recurse") => (DirectoryPolicy::Recurse, false),
        Some("dereference-recurse") => (DirectoryPolicy::Recurse, true),
        Some("skip") => (DirectoryPolicy::Skip, false),
        _ => (DirectoryPolicy::Read, false),
    }
}

/// Compute the input paths, whether the default path is in use, and
/// whether the session should read standard input.
fn paths(matches: &ArgMatches<'static>) -> (Vec<PathBuf>, bool, bool) {
    let via_flags =
        matches.is_present("regexp") || matches.is_present("file");
    let mut paths: Vec<PathBuf> = vec![];
    if via_flags {
        // With -e/-f, the first positional is a path, not a pattern.
        if let Some(first) = matches.value_of_os("pattern") {
            paths.push(PathBuf::from(first));
        }
    }
    if let Some(rest) = matches.values_of_os("path") {
        paths.extend(rest.map(PathBuf::from));
    }
    if paths.len() == 1 && paths[0] == Path::new("-") {
        return (vec![], false, true);
    }
    if !paths.is_empty() {
        return (paths, false, false);
    }
    // No inputs: recurse over the working directory when recursion was
    // requested, otherwise read standard input.
    if directory_policy(matches).0 == DirectoryPolicy::Recurse {
        (vec![PathBuf::from("./")], true, false)
    } else {
        (vec![], true, true)
    }
}

/// Determine the color configuration.
fn colors(
    matches: &ArgMatches<'static>,
    invert: bool,
) -> (ColorSpecs, ColorChoice) {
    let mut specs = match env::var("GREP_COLORS") {
        Ok(ref val) if !val.is_empty() => {
            ColorSpecs::from_grep_colors(val)
        }
        _ => match env::var("GREP_COLOR") {
            Ok(ref val) if !val.is_empty() => {
                ColorSpecs::from_grep_colors(&format!("mt={}", val))
            }
            _ => ColorSpecs::default_colors(),
        },
    };
    if specs.reverse_video() && invert {
        specs.swap_line_colors();
    }

    let when = matches.value_of("color").unwrap_or("auto");
    let choice = match when {
        "never" => ColorChoice::Never,
        "always" => ColorChoice::Always,
        _ => {
            let color_term = env::var("TERM").map_or(false, |term| {
                term.contains("ansi")
                    || term.contains("xterm")
                    || term.contains("color")
            });
            if color_term && cli::is_tty_stdout() {
                ColorChoice::Always
            } else {
                ColorChoice::Never
            }
        }
    };
    (specs, choice)
}

fn parse_usize(
    matches: &ArgMatches<'static>,
    name: &str,
) -> Result<usize> {
    Ok(parse_opt_usize(matches, name)?.unwrap_or(0))
}

fn parse_opt_usize(
    matches: &ArgMatches<'static>,
    name: &str,
) -> Result<Option<usize>> {
    match matches.value_of(name) {
        None => Ok(None),
        Some(val) => val
            .parse()
            .map(Some)
            .map_err(|err| {
                From::from(format!("invalid --{} value: {}", name, err))
            }),
    }
}

fn parse_opt_u64(
    matches: &ArgMatches<'static>,
    name: &str,
) -> Result<Option<u64>> {
    match matches.value_of(name) {
        None => Ok(None),
        Some(val) => val
            .parse()
            .map(Some)
            .map_err(|err| {
                From::from(format!("invalid --{} value: {}", name, err))
            }),
    }
}

/// The session's output writer: stdout with the configured buffering, or
/// a pager with or without color.
pub enum OutputWriter {
    Stdout(cli::StandardStream),
    Pager(termcolor::Ansi<cli::PagerWriter>),
    PagerNoColor(termcolor::NoColor<cli::PagerWriter>),
}

impl Write for OutputWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match *self {
            OutputWriter::Stdout(ref mut w) => w.write(buf),
            OutputWriter::Pager(ref mut w) => w.write(buf),
            OutputWriter::PagerNoColor(ref mut w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match *self {
            OutputWriter::Stdout(ref mut w) => w.flush(),
            OutputWriter::Pager(ref mut w) => w.flush(),
            OutputWriter::PagerNoColor(ref mut w) => w.flush(),
        }
    }
}

impl WriteColor for OutputWriter {
    fn supports_color(&self) -> bool {
        match *self {
            OutputWriter::Stdout(ref w) => w.supports_color(),
            OutputWriter::Pager(ref w) => w.supports_color(),
            OutputWriter::PagerNoColor(ref w) => w.supports_color(),
        }
    }

    fn set_color(&mut self, spec: &termcolor::ColorSpec) -> io::Result<()> {
        match *self {
            OutputWriter::Stdout(ref mut w) => w.set_color(spec),
            OutputWriter::Pager(ref mut w) => w.set_color(spec),
            OutputWriter::PagerNoColor(ref mut w) => w.set_color(spec),
        }
    }

    fn reset(&mut self) -> io::Result<()> {
        match *self {
            OutputWriter::Stdout(ref mut w) => w.reset(),
            OutputWriter::Pager(ref mut w) => w.reset(),
            OutputWriter::PagerNoColor(ref mut w) => w.reset(),
        }
    }

    fn is_synchronous(&self) -> bool {
        match *self {
            OutputWriter::Stdout(ref w) => w.is_synchronous(),
            OutputWriter::Pager(ref w) => w.is_synchronous(),
            OutputWriter::PagerNoColor(ref w) => w.is_synchronous(),
        }
    }
}
