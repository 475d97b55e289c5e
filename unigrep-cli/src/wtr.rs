use std::io::{self, Write};

use termcolor::{ColorChoice, ColorSpec, WriteColor};

use crate::is_tty_stdout;

/// A color-capable writer to standard output with the buffering strategy
/// already chosen.
///
/// Line buffering keeps latency low when a person is watching a
/// terminal; block buffering is faster when output goes to a file or a
/// pipe. The concrete `termcolor` stream is erased behind a box so that
/// callers don't carry the choice in their types.
pub struct StandardStream(Box<dyn WriteColor>);

/// Returns a writer to stdout for the given color choice, line buffered
/// when stdout is a terminal and block buffered otherwise.
pub fn stdout(color_choice: ColorChoice) -> StandardStream {
    if is_tty_stdout() {
        stdout_buffered_line(color_choice)
    } else {
        stdout_buffered_block(color_choice)
    }
}

/// Returns a line buffered writer to stdout for the given color choice.
///
/// Use this when printing results directly to a person, so output
/// appears as soon as each line is complete.
pub fn stdout_buffered_line(color_choice: ColorChoice) -> StandardStream {
    StandardStream(Box::new(termcolor::StandardStream::stdout(color_choice)))
}

/// Returns a block buffered writer to stdout for the given color choice.
///
/// Use this when stdout feeds a file or another program, where
/// throughput matters more than latency.
pub fn stdout_buffered_block(color_choice: ColorChoice) -> StandardStream {
    StandardStream(Box::new(termcolor::BufferedStandardStream::stdout(
        color_choice,
    )))
}

impl io::Write for StandardStream {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    #[inline]
    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

impl WriteColor for StandardStream {
    #[inline]
    fn supports_color(&self) -> bool {
        self.0.supports_color()
    }

    #[inline]
    fn set_color(&mut self, spec: &ColorSpec) -> io::Result<()> {
        self.0.set_color(spec)
    }

    #[inline]
    fn reset(&mut self) -> io::Result<()> {
        self.0.reset()
    }

    #[inline]
    fn is_synchronous(&self) -> bool {
        self.0.is_synchronous()
    }
}
