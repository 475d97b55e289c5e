use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};

static TEST_DIR_COUNT: AtomicUsize = AtomicUsize::new(0);

/// A scratch directory for a single test, removed when dropped.
///
/// Commands created through it run with the directory as their working
/// directory, which keeps the printed file names relative and easy to
/// assert on.
#[derive(Debug)]
pub struct WorkDir {
    dir: PathBuf,
}

impl WorkDir {
    /// Create a fresh scratch directory named after the test.
    pub fn new(name: &str) -> WorkDir {
        let id = TEST_DIR_COUNT.fetch_add(1, Ordering::SeqCst);
        let dir = env::temp_dir().join(format!(
            "unigrep-test-{}-{}-{}",
            name,
            std::process::id(),
            id
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        WorkDir { dir }
    }

    /// Create a file with the given contents under this directory.
    pub fn create(&self, name: &str, contents: &[u8]) {
        let path = self.dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
    }

    /// Return the path to this directory.
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Build a command for the unigrep binary with this directory as the
    /// working directory and a clean environment for color and pattern
    /// resolution.
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_unigrep"));
        cmd.current_dir(&self.dir);
        cmd.env_remove("GREP_COLOR");
        cmd.env_remove("GREP_COLORS");
        cmd.env_remove("GREP_PATH");
        cmd.env("TERM", "dumb");
        cmd
    }

    /// Run the command and return its output.
    pub fn output(&self, cmd: &mut Command) -> Output {
        cmd.output().unwrap()
    }

    /// Run the command with the given bytes piped to stdin.
    pub fn pipe(&self, cmd: &mut Command, input: &[u8]) -> Output {
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        let mut child = cmd.spawn().unwrap();
        child.stdin.as_mut().unwrap().write_all(input).unwrap();
        child.stdin.take();
        child.wait_with_output().unwrap()
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            let _ = fs::remove_dir_all(&self.dir);
        }
    }
}

/// Return stdout as a string, panicking on invalid UTF-8.
pub fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

/// Return the exit code of the output, panicking if the process was
/// killed by a signal.
pub fn code(output: &Output) -> i32 {
    output.status.code().unwrap()
}

/// Sort the lines of the given string; useful when the walk order is
/// not specified.
pub fn sort_lines(s: &str) -> Vec<String> {
    let mut lines: Vec<String> =
        s.lines().map(|line| line.to_string()).collect();
    lines.sort();
    lines
}
