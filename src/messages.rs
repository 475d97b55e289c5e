use std::sync::atomic::{AtomicBool, Ordering};

static MESSAGES: AtomicBool = AtomicBool::new(false);
static ERRORED: AtomicBool = AtomicBool::new(false);

/// Emit a non-fatal diagnostic to stderr, unless messages have been
/// suppressed.
#[macro_export]
macro_rules! message {
    ($($tt:tt)*) => {
        if crate::messages::messages() {
            eprintln!($($tt)*);
        }
    }
}

/// Like `message!`, but also records that an error occurred, which makes
/// the process exit with an error code at the end of the session.
#[macro_export]
macro_rules! err_message {
    ($($tt:tt)*) => {
        crate::messages::set_errored();
        message!($($tt)*);
    }
}

/// Returns true if and only if messages should be shown.
pub fn messages() -> bool {
    MESSAGES.load(Ordering::SeqCst)
}

/// Set whether messages should be shown or not.
///
/// By default, they are not shown.
pub fn set_messages(yes: bool) {
    MESSAGES.store(yes, Ordering::SeqCst)
}

/// Returns true if and only if an error message has been emitted during
/// this session.
pub fn errored() -> bool {
    ERRORED.load(Ordering::SeqCst)
}

/// Record that an error message was emitted.
pub fn set_errored() {
    ERRORED.store(true, Ordering::SeqCst);
}
