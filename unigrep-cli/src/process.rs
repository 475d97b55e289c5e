use std::error;
use std::fmt;
use std::io::{self, Read};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::thread::{self, JoinHandle};

/// An error that can occur while running a command and reading its
/// output.
///
/// When the command itself fails, its stderr is captured and becomes
/// the error message, so the underlying failure mode is surfaced to the
/// user. This error converts seamlessly to an `io::Error`.
#[derive(Debug)]
pub struct CommandError {
    kind: CommandErrorKind,
}

#[derive(Debug)]
enum CommandErrorKind {
    Io(io::Error),
    Stderr(Vec<u8>),
}

impl CommandError {
    /// Create an error from an I/O error.
    pub(crate) fn io(ioerr: io::Error) -> CommandError {
        CommandError { kind: CommandErrorKind::Io(ioerr) }
    }

    /// Create an error from the contents of stderr (which may be
    /// empty).
    pub(crate) fn stderr(bytes: Vec<u8>) -> CommandError {
        CommandError { kind: CommandErrorKind::Stderr(bytes) }
    }
}

impl error::Error for CommandError {
    fn description(&self) -> &str {
        "command error"
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            CommandErrorKind::Io(ref err) => err.fmt(f),
            CommandErrorKind::Stderr(ref bytes) => {
                let msg = String::from_utf8_lossy(bytes);
                if msg.trim().is_empty() {
                    write!(f, "<stderr is empty>")
                } else {
                    let div = "-".repeat(79);
                    write!(f, "\n{}\n{}\n{}", div, msg.trim(), div)
                }
            }
        }
    }
}

impl From<io::Error> for CommandError {
    fn from(ioerr: io::Error) -> CommandError {
        CommandError::io(ioerr)
    }
}

impl From<CommandError> for io::Error {
    fn from(cmderr: CommandError) -> io::Error {
        match cmderr.kind {
            CommandErrorKind::Io(ioerr) => ioerr,
            CommandErrorKind::Stderr(_) => {
                io::Error::new(io::ErrorKind::Other, cmderr)
            }
        }
    }
}

/// A streaming reader over a spawned command's stdout.
///
/// The command's stderr is always drained on a separate thread while
/// stdout is being read. That way a noisy command can never fill the
/// stderr pipe and deadlock against us, and when the command exits with
/// a failing status, the collected stderr becomes the error returned to
/// the caller.
#[derive(Debug)]
pub struct CommandReader {
    child: Child,
    stdout: ChildStdout,
    stderr: Option<JoinHandle<CommandError>>,
    done: bool,
}

impl CommandReader {
    /// Spawn the given command and return a reader over its stdout.
    ///
    /// The caller should fully configure the command (arguments,
    /// environment, working directory) first; the stdout and stderr
    /// pipes are overridden here.
    pub fn new(cmd: &mut Command) -> Result<CommandReader, CommandError> {
        let mut child = cmd
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;
        let stdout = child.stdout.take().unwrap();
        let mut stderr_pipe = child.stderr.take().unwrap();
        let stderr = thread::spawn(move || {
            let mut bytes = vec![];
            match stderr_pipe.read_to_end(&mut bytes) {
                Ok(_) => CommandError::stderr(bytes),
                Err(err) => CommandError::io(err),
            }
        });
        Ok(CommandReader { child, stdout, stderr: Some(stderr), done: false })
    }
}

impl Read for CommandReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.done {
            return Ok(0);
        }
        let nread = self.stdout.read(buf)?;
        if nread == 0 {
            self.done = true;
            // Reap the child now that stdout is exhausted; a failing
            // exit status turns the collected stderr into the error.
            if !self.child.wait()?.success() {
                let err = self
                    .stderr
                    .take()
                    .expect("stderr is drained exactly once")
                    .join()
                    .expect("stderr thread does not panic");
                return Err(io::Error::from(err));
            }
        }
        Ok(nread)
    }
}
