use std::error;
use std::io::{self, Write};
use std::process;
use std::time::Instant;

use crate::args::{Args, Command};
use crate::subject::Subject;

#[macro_use]
mod messages;

mod app;
mod args;
mod logger;
mod search;
mod subject;

// Rust no longer uses jemalloc by default, so unigrep will use the
// system allocator. On Linux, this would normally be glibc's allocator,
// which is pretty good. In particular, unigrep does not have a
// particularly allocation heavy workload, so there really isn't much
// difference (for unigrep's purposes) between glibc's allocator and
// jemalloc.
//
// However, when unigrep is built with musl, this means unigrep will use
// musl's allocator, which appears to be substantially worse. Therefore,
// when building with musl, we use jemalloc.
//
// We don't unconditionally use jemalloc because it can be nice to use
// the system's default allocator by default. Moreover, jemalloc seems to
// increase compilation times by a bit. Also, we only do this on 64-bit
// systems since jemalloc doesn't support i686.
#[cfg(all(target_env = "musl", target_pointer_width = "64"))]
#[global_allocator]
static ALLOC: jemallocator::Jemalloc = jemallocator::Jemalloc;

type Result<T> = ::std::result::Result<T, Box<dyn error::Error>>;

fn main() {
    match Args::parse().and_then(try_main) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("{}", err);
            process::exit(2);
        }
    }
}

fn try_main(args: Args) -> Result<i32> {
    let matched = match args.command() {
        Command::Search => search(&args)?,
        Command::Types => types(&args)?,
    };
    // At least one line selected exits 0; none exits 1; errors exit 2.
    // Quiet mode reports success on a match even when soft errors were
    // seen along the way.
    if matched && (args.quiet() || !messages::errored()) {
        Ok(0)
    } else if messages::errored() {
        Ok(2)
    } else {
        Ok(1)
    }
}

/// The top level entry point for searching. This recursively steps
/// through the file list (or reads standard input) and searches each
/// subject in turn.
fn search(args: &Args) -> Result<bool> {
    let started_at = args.started_at();
    let quit_after = args.max_files()?;
    let mut totals =
        if args.stats() { Some(search::Totals::new()) } else { None };
    let mut searcher = args.search_worker(args.stdout()?)?;
    let mut matched_files = 0u64;
    let mut matched = false;
    let mut searched = false;

    let mut handle_subject =
        |subject: &Subject,
         searcher: &mut search::SearchWorker<args::OutputWriter>|
         -> Result<bool> {
            searched = true;
            let result = match searcher.search(subject) {
                Ok(result) => result,
                // A broken pipe means graceful termination.
                Err(err) if err.kind() == io::ErrorKind::BrokenPipe => {
                    return Ok(false);
                }
                Err(err) => {
                    err_message!("{}: {}", subject.path().display(), err);
                    return Ok(true);
                }
            };
            if result.has_match() {
                matched = true;
                matched_files += 1;
            }
            if let Some(ref mut totals) = totals {
                totals.add(&result);
            }
            // Sessions terminate after the configured number of matched
            // files; quiet mode stops at the first.
            Ok(quit_after.map_or(true, |limit| matched_files < limit))
        };

    if args.stdin_mode() {
        let subject = Subject::stdin();
        handle_subject(&subject, &mut searcher)?;
    } else {
        let subject_builder = args.subject_builder();
        for result in args.walker()? {
            let subject = match subject_builder.build_from_result(result) {
                Some(subject) => subject,
                None => continue,
            };
            if !handle_subject(&subject, &mut searcher)? {
                break;
            }
        }
    }

    if args.using_default_path() && !searched {
        message!(
            "no files were searched, which means the applied filters \
             excluded every candidate"
        );
    }
    if let Some(ref totals) = totals {
        let elapsed = Instant::now().duration_since(started_at);
        // We don't care if we couldn't print this successfully.
        let _ = searcher.print_totals(elapsed, totals);
    }
    Ok(matched)
}

/// The top level entry point for `-t list`.
fn types(args: &Args) -> Result<bool> {
    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    args.print_types(&mut stdout)?;
    stdout.flush()?;
    Ok(true)
}
