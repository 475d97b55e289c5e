/*!
An implementation of the `Matcher` trait using PCRE2, for
Perl-compatible pattern syntax (back references, look-around) that the
default finite automata engine does not support.
*/

#![deny(missing_docs)]

pub use crate::error::{Error, ErrorKind};
pub use crate::matcher::{RegexMatcher, RegexMatcherBuilder};
pub use pcre2::{is_jit_available, version};

mod error;
mod matcher;
