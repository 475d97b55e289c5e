/*!
An implementation of the `Matcher` trait for Rust's regex engine.

This crate is also where user supplied pattern fragments are shaped into
a form the engine accepts: case smarts, whole word wrapping, basic regex
translation and line terminator hygiene all live here.
*/

#![deny(missing_docs)]

pub use crate::error::{Error, ErrorKind};
pub use crate::matcher::{RegexMatcher, RegexMatcherBuilder};
pub use crate::translate::translate_basic;

mod ast;
mod config;
mod error;
mod matcher;
mod non_matching;
mod strip;
mod translate;
mod util;
mod word;
