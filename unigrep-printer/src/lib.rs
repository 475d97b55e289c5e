/*!
This crate renders the line records pushed by the `unigrep-searcher`
engine.

The [`Standard`] printer shows results in a human readable format
modeled after the formats used by standard grep-like tools: header
fields (file name, line number, column, byte offset) with configurable
separators, `GREP_COLORS` style coloring, only-matching and per-match
record shapes, and hex dump rendering of binary lines.

The [`Summary`] printer shows *aggregate* results for a single search:
counts of selected lines or individual matches, source name listings,
or nothing at all for quiet searches.

Both printers implement the engine's `Report` trait and render what
arrives; selection, context, inversion, binary classification and match
quotas are all decided by the engine.

# Example

This example shows how to create a "standard" printer and execute a
search.

```
use std::error::Error;

use unigrep_regex::RegexMatcher;
use unigrep_printer::Standard;
use unigrep_searcher::Engine;

const HAYSTACK: &'static [u8] = b"\
A ship in harbor is safe, kept dry by the pilots of the port,
but that is not what ships are built for, said the old keeper;
sail past the harbor wall and learn what the charts leave out.
";

# fn main() { example().unwrap(); }
fn example() -> Result<(), Box<dyn Error>> {
    let matcher = RegexMatcher::new(r"harbor")?;
    let mut printer = Standard::new_no_color(vec![]);
    Engine::new().search_slice(&matcher, HAYSTACK, &mut printer.sink())?;

    // into_inner gives us back the underlying writer we provided to
    // new_no_color, which is wrapped in a termcolor::NoColor. Thus, a
    // second into_inner gives us back the actual buffer.
    let output = String::from_utf8(printer.into_inner().into_inner())?;
    let expected = "\
1:A ship in harbor is safe, kept dry by the pilots of the port,
3:sail past the harbor wall and learn what the charts leave out.
";
    assert_eq!(output, expected);
    Ok(())
}
```
*/

#![deny(missing_docs)]

pub use crate::color::{ColorSpecs, Sgr, SGR_OFF};
pub use crate::hex::{HexDumper, HexMode};
pub use crate::standard::{Standard, StandardBuilder, StandardSink};
pub use crate::summary::{Summary, SummaryBuilder, SummaryKind, SummarySink};
pub use crate::util::PrinterPath;

#[macro_use]
mod macros;

mod color;
mod hex;
mod standard;
mod summary;
mod util;
