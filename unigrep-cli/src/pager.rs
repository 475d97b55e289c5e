use std::io::{self, Write};
use std::process::{Child, ChildStdin, Command, Stdio};

/// A writer that pipes everything written to it into a pager process.
///
/// The pager's stdout and stderr are inherited, so the pager draws on
/// the user's terminal directly. Dropping the writer closes the pager's
/// stdin and waits for it to exit, which is what lets the user keep
/// scrolling after the search finishes.
///
/// This writer only implements `io::Write`. When colored paged output is
/// wanted, wrap it in `termcolor::Ansi`; for plain output, wrap it in
/// `termcolor::NoColor`.
#[derive(Debug)]
pub struct PagerWriter {
    child: Child,
    stdin: Option<ChildStdin>,
}

impl PagerWriter {
    /// Spawn the given pager command.
    ///
    /// The command is split on whitespace: the first word is the program
    /// and the rest are arguments. When the command is `less` with no
    /// arguments, `-R` is added so ANSI colors pass through.
    pub fn new(cmd: &str) -> io::Result<PagerWriter> {
        let mut words = cmd.split_whitespace();
        let program = words.next().ok_or_else(|| {
            io::Error::new(io::ErrorKind::Other, "empty pager command")
        })?;
        let mut command = Command::new(program);
        let mut any_args = false;
        for arg in words {
            any_args = true;
            command.arg(arg);
        }
        if program == "less" && !any_args {
            command.arg("-R");
        }
        let mut child = command.stdin(Stdio::piped()).spawn()?;
        let stdin = child.stdin.take();
        Ok(PagerWriter { child, stdin })
    }
}

impl Write for PagerWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.stdin {
            Some(ref mut stdin) => stdin.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.stdin {
            Some(ref mut stdin) => stdin.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for PagerWriter {
    fn drop(&mut self) {
        // Closing stdin signals EOF to the pager; then wait so the
        // terminal isn't released before the user quits it.
        drop(self.stdin.take());
        let _ = self.child.wait();
    }
}
