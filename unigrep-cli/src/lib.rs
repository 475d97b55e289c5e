/*!
This crate provides common routines used in command line applications,
with a focus on routines useful for search oriented applications. As a
utility library, there is no central type or function. However, a key
focus of this crate is to improve failure modes and provide user
friendly error messages when things go wrong.

To the best extent possible, everything in this crate works on Windows,
macOS and Linux.

# Standard I/O

[`is_readable_stdin`], [`is_tty_stderr`], [`is_tty_stdin`] and
[`is_tty_stdout`] query aspects of standard I/O. `is_readable_stdin`
determines whether stdin can be usefully read from, while the `tty`
methods determine whether a tty is attached to stdin/stdout/stderr.

# Coloring and buffering

[`stdout`], [`stdout_buffered_block`] and [`stdout_buffered_line`] are
alternative constructors for [`StandardStream`]. A `StandardStream`
implements `termcolor::WriteColor`, which provides a way to emit colors
to terminals. Its key use is the encapsulation of buffering style.
Namely, `stdout` will return a line buffered `StandardStream` if and
only if stdout is connected to a tty, and will otherwise return a block
buffered `StandardStream`. Line buffering is important for use with a
tty because it typically decreases the latency at which the end user
sees output. Block buffering is used otherwise because it is faster.

[`PagerWriter`] pipes output through a pager process instead of writing
it to stdout directly.

# Escaping

The [`escape`], [`escape_os`], [`unescape`] and [`unescape_os`] routines
provide a user friendly way of dealing with UTF-8 encoded strings that
can express arbitrary bytes.

# Building patterns

Typically, regular expression patterns must be valid UTF-8. However,
command line arguments aren't guaranteed to be valid UTF-8. The
[`pattern_from_bytes`] and [`pattern_from_os`] routines convert
arguments with good error messages, including reporting exactly where
the first invalid UTF-8 byte is seen.

Additionally, patterns can be read from files with
[`patterns_from_path`], [`patterns_from_reader`] and
[`patterns_from_stdin`], with file name resolution against a search path
handled by [`resolve_pattern_file`].

# Processes

The [`CommandReader`] and [`DecompressionReader`] types provide a way to
read the output of spawned processes, with the latter picking the
decompression command by file extension. Errors from the spawned process
surface its stderr.
*/

#![deny(missing_docs)]

mod decompress;
mod escape;
mod pager;
mod pattern;
mod process;
mod wtr;

pub use crate::decompress::{
    DecompressionMatcher, DecompressionMatcherBuilder, DecompressionReader,
    DecompressionReaderBuilder,
};
pub use crate::escape::{escape, escape_os, unescape, unescape_os};
pub use crate::pager::PagerWriter;
pub use crate::pattern::{
    pattern_from_bytes, pattern_from_os, patterns_from_path,
    patterns_from_reader, patterns_from_stdin, resolve_pattern_file,
    InvalidPatternError, PatternFile,
};
pub use crate::process::{CommandError, CommandReader};
pub use crate::wtr::{
    stdout, stdout_buffered_block, stdout_buffered_line, StandardStream,
};

/// Returns true if and only if stdin is believed to be readable.
///
/// When stdin is readable, command line programs may choose to behave
/// differently than when stdin is not readable. For example, `command
/// foo` might search the current directory for occurrences of `foo`
/// where as `command foo < some-file` or `cat some-file | command foo`
/// might instead only search stdin for occurrences of `foo`.
pub fn is_readable_stdin() -> bool {
    #[cfg(unix)]
    fn imp() -> bool {
        use std::fs::File;
        use std::os::unix::fs::FileTypeExt;
        use std::os::unix::io::{AsRawFd, FromRawFd};

        let stdin = std::io::stdin();
        let fd = stdin.as_raw_fd();
        // SAFETY: we only stat the file and forget it before the
        // borrowed descriptor could be closed twice.
        let file = unsafe { File::from_raw_fd(fd) };
        let result = file
            .metadata()
            .map(|md| {
                let ft = md.file_type();
                ft.is_file() || ft.is_fifo()
            })
            .unwrap_or(false);
        std::mem::forget(file);
        result
    }

    #[cfg(not(unix))]
    fn imp() -> bool {
        !is_tty_stdin()
    }

    imp()
}

/// Returns true if and only if stdin is believed to be connected to a
/// tty or a console.
pub fn is_tty_stdin() -> bool {
    atty::is(atty::Stream::Stdin)
}

/// Returns true if and only if stdout is believed to be connected to a
/// tty or a console.
///
/// This is useful for when you want your command line program to produce
/// different output depending on whether it's printing directly to a
/// user's terminal or whether it's being redirected somewhere else. For
/// example, implementations of `ls` will often show one item per line
/// when stdout is redirected, but will condense multiple items onto each
/// line when stdout is connected to a tty.
pub fn is_tty_stdout() -> bool {
    atty::is(atty::Stream::Stdout)
}

/// Returns true if and only if stderr is believed to be connected to a
/// tty or a console.
pub fn is_tty_stderr() -> bool {
    atty::is(atty::Stream::Stderr)
}
