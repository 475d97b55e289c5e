// This module defines the set of command line arguments that unigrep
// supports, including some light validation.
//
// The only other place that deals with clap is args.rs, which is where
// we read clap's configuration from the end user's arguments and turn it
// into a unigrep-specific configuration type that is not coupled with
// clap.

use clap::{self, crate_authors, crate_version, App, AppSettings, Arg};

const ABOUT: &str = "
unigrep universally searches files for lines matching a regex pattern,
with grep compatible output, Unicode aware matching, recursive directory
traversal and hex rendering of binary data.";

const USAGE: &str = "
    unigrep [OPTIONS] PATTERN [PATH ...]
    unigrep [OPTIONS] [-e PATTERN ...] [-f FILE ...] [PATH ...]";

const TEMPLATE: &str = "\
{bin} {version}
{about}

USAGE:{usage}

ARGS:
{positionals}

OPTIONS:
{unified}";

/// Build a clap application.
pub fn app() -> App<'static, 'static> {
    let mut app = App::new("unigrep")
        .author(crate_authors!())
        .version(crate_version!())
        .about(ABOUT)
        .max_term_width(100)
        .usage(USAGE)
        .template(TEMPLATE)
        .setting(AppSettings::UnifiedHelpMessage)
        .arg(
            Arg::with_name("pattern")
                .help("A regular expression used for searching."),
        )
        .arg(
            Arg::with_name("path")
                .multiple(true)
                .help("A file or directory to search."),
        );
    for arg in all_args() {
        app = app.arg(arg);
    }
    app
}

type ClapArg = Arg<'static, 'static>;

fn flag(name: &'static str, short: &'static str, help: &'static str) -> ClapArg {
    let mut arg = Arg::with_name(name).long(name).help(help);
    if !short.is_empty() {
        arg = arg.short(short);
    }
    arg
}

fn value(
    name: &'static str,
    short: &'static str,
    value_name: &'static str,
    help: &'static str,
) -> ClapArg {
    flag(name, short, help).value_name(value_name).takes_value(true)
}

fn all_args() -> Vec<ClapArg> {
    vec![
        // Pattern selection.
        value("regexp", "e", "PATTERN", "A pattern to search for.")
            .multiple(true)
            .number_of_values(1)
            .allow_hyphen_values(true),
        value("file", "f", "FILE", "Read patterns from FILE, one per line.")
            .multiple(true)
            .number_of_values(1),
        flag("fixed-strings", "F", "Treat all patterns as literal strings."),
        flag("basic-regexp", "G", "Interpret patterns as basic regular \
              expressions."),
        flag("extended-regexp", "E", "Interpret patterns as extended \
              regular expressions (the default)."),
        flag("perl-regexp", "P", "Interpret patterns as Perl compatible \
              regular expressions."),
        flag("ignore-case", "i", "Case insensitive matching."),
        flag("smart-case", "j", "Case insensitive matching unless a \
              pattern contains an upper case letter."),
        flag("word-regexp", "w", "Only match whole words."),
        flag("line-regexp", "x", "Only match whole lines."),
        flag("empty", "Y", "Allow patterns to match empty strings."),
        flag("binary", "U", "Disable Unicode matching; patterns match \
              raw bytes."),
        flag("free-space", "", "Ignore whitespace in patterns; # starts \
              a comment."),
        // Output modes.
        flag("invert-match", "v", "Select lines that do not match."),
        flag("count", "c", "Only print a count of selected lines per \
              file."),
        flag("files-with-matches", "l", "Only print the names of files \
              with selected lines."),
        flag("files-without-match", "L", "Only print the names of files \
              without selected lines."),
        flag("only-matching", "o", "Only print the matched parts of \
              lines."),
        flag("only-line-number", "N", "Only print the line numbers of \
              selected lines."),
        flag("quiet", "q", "Do not print anything; exit with status 0 on \
              the first match.")
            .alias("silent"),
        flag("any-line", "y", "Print every line; non-matching lines are \
              shown as context."),
        flag("no-group", "g", "Do not group matches on the same line; \
              print one line per match."),
        // Context.
        value("after-context", "A", "NUM", "Print NUM lines of trailing \
              context."),
        value("before-context", "B", "NUM", "Print NUM lines of leading \
              context."),
        value("context", "C", "NUM", "Print NUM lines of leading and \
              trailing context."),
        flag("break", "", "Print a blank line after the results of each \
              file."),
        value("group-separator", "", "SEP", "Use SEP as the group \
              separator for context output."),
        flag("no-group-separator", "", "Do not print a separator between \
              groups of context lines."),
        // Header fields.
        flag("with-filename", "H", "Always print the file name for \
              matches."),
        flag("no-filename", "h", "Never print file names."),
        value("label", "", "LABEL", "Use LABEL as the name for standard \
              input."),
        flag("line-number", "n", "Print the line number of each matched \
              line."),
        flag("column-number", "k", "Print the column number of the first \
              match on each matched line."),
        flag("byte-offset", "b", "Print the byte offset of each matched \
              line (or match with -o)."),
        flag("initial-tab", "T", "Align matched lines with a tab after \
              the header fields."),
        flag("null", "Z", "Print a NUL byte after file names."),
        value("separator", "", "SEP", "Use SEP as the field separator \
              instead of ':'."),
        // File selection.
        flag("recursive", "r", "Recursively search directories, not \
              following symlinks."),
        flag("dereference-recursive", "R", "Recursively search \
              directories, following symlinks."),
        flag("dereference", "S", "Follow symlinks while recursing."),
        flag("no-dereference", "p", "Never follow symlinks, even for \
              command line arguments."),
        value("directories", "d", "ACTION", "How to handle directories: \
              read, recurse, skip or dereference-recurse.")
            .possible_values(&["read", "recurse", "skip",
                               "dereference-recurse"]),
        value("devices", "D", "ACTION", "How to handle devices, FIFOs \
              and sockets: read or skip.")
            .possible_values(&["read", "skip"]),
        value("max-depth", "", "NUM", "Limit directory recursion to NUM \
              levels."),
        value("max-files", "", "NUM", "Stop after NUM matching files."),
        flag("no-hidden", "", "Skip hidden files and directories."),
        value("include", "", "GLOB", "Only search files whose name \
              matches GLOB.")
            .multiple(true)
            .number_of_values(1),
        value("exclude", "", "GLOB", "Skip files whose name matches \
              GLOB.")
            .multiple(true)
            .number_of_values(1),
        value("include-dir", "", "GLOB", "Only recurse into directories \
              whose name matches GLOB.")
            .multiple(true)
            .number_of_values(1),
        value("exclude-dir", "", "GLOB", "Skip directories whose name \
              matches GLOB.")
            .multiple(true)
            .number_of_values(1),
        value("include-from", "", "FILE", "Read include globs from FILE, \
              gitignore style.")
            .multiple(true)
            .number_of_values(1),
        value("exclude-from", "", "FILE", "Read exclude globs from FILE, \
              gitignore style.")
            .multiple(true)
            .number_of_values(1),
        value("file-extensions", "O", "EXTS", "Only search files with a \
              listed extension.")
            .multiple(true)
            .number_of_values(1),
        value("file-type", "t", "TYPES", "Only search files of the \
              listed types; -tlist shows the types.")
            .multiple(true)
            .number_of_values(1),
        value("file-magic", "M", "MAGIC", "Only search files whose \
              leading bytes match the MAGIC regex.")
            .multiple(true)
            .number_of_values(1),
        // Limits, encodings, compression.
        value("max-count", "m", "NUM", "Stop searching a file after NUM \
              matching lines."),
        value("encoding", "Q", "ENCODING", "The encoding of the input; \
              transcoded before matching."),
        flag("decompress", "z", "Decompress files before searching."),
        // Output tuning.
        value("color", "", "WHEN", "When to use colors: never, auto or \
              always.")
            .min_values(0)
            .possible_values(&["never", "auto", "always"])
            .default_value("auto"),
        value("pager", "", "COMMAND", "Pipe output through COMMAND \
              (default 'less').")
            .min_values(0),
        flag("line-buffered", "", "Flush output after every line."),
        value("tabs", "", "NUM", "Tab size for column computation: 1, 2, \
              4 or 8.")
            .possible_values(&["1", "2", "4", "8"]),
        flag("stats", "", "Print search statistics when done."),
        // Binary data.
        flag("text", "a", "Search binary files as if they were text."),
        flag("binary-without-match", "I", "Treat binary files as if they \
              contained no matches."),
        flag("hex", "X", "Print all output in hex."),
        flag("with-hex", "W", "Print binary matches in hex, text matches \
              as text."),
        value("binary-files", "", "TYPE", "How to handle binary files: \
              binary, without-match, text, hex or with-hex.")
            .possible_values(&["binary", "without-match", "text", "hex",
                               "with-hex"]),
        // Diagnostics.
        flag("no-messages", "s", "Suppress error messages about \
              unreadable files."),
        flag("debug", "", "Print debug messages to stderr."),
    ]
}
