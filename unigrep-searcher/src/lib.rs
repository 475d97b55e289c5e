/*!
The line oriented match-and-emit engine.

An [`Engine`] takes a `Matcher` (defined in the `unigrep-matcher` crate)
and a source of bytes, walks the source line by line, and pushes every
emitted line to a [`Report`]: selected lines, leading context recalled
from a sliding window of recent lines, trailing context, passthrough
lines, block gaps and the end-of-source summary. Inversion, context
windows, per-line binary classification, match quotas, span collection
and source transcoding all happen here, so that a `Report` only renders.

Input handling is uniform over heterogeneous sources: an [`Input`] can
be a memory mapped file searched in place, or a streaming reader, with
transparent transcoding of declared source encodings (see
[`SourceEncoding`]) layered in front.

# Example

This example collects the matching lines of a haystack along with their
line numbers.

```
use std::io;

use unigrep_regex::RegexMatcher;
use unigrep_searcher::{Engine, Flow, Line, Report};

const HAYSTACK: &'static [u8] = b"\
A ship in harbor is safe, kept dry by the pilots of the port,
but that is not what ships are built for, said the old keeper;
sail past the harbor wall and learn what the charts leave out.
";

struct Matches(Vec<(u64, String)>);

impl Report for Matches {
    fn line(&mut self, line: &Line) -> io::Result<Flow> {
        if line.class().is_selected() {
            let text = String::from_utf8_lossy(line.bytes());
            self.0.push((line.number().unwrap(), text.into_owned()));
        }
        Ok(Flow::Continue)
    }
}

# fn main() { example().unwrap() }
fn example() -> Result<(), Box<dyn std::error::Error>> {
    let matcher = RegexMatcher::new("harbor")?;
    let mut matches = Matches(vec![]);
    Engine::new().search_slice(&matcher, HAYSTACK, &mut matches)?;

    assert_eq!(matches.0.len(), 2);
    assert_eq!(matches.0[0].0, 1);
    assert_eq!(matches.0[1].0, 3);
    Ok(())
}
```
*/

#![deny(missing_docs)]

pub use crate::decode::{
    DecodeBuilder, DecodeReader, SourceEncoding, UnknownEncodingError,
};
pub use crate::engine::{BinaryPolicy, Engine, EngineBuilder};
pub use crate::input::{Input, MmapChoice};
pub use crate::report::{End, Flow, Line, LineClass, Report};
pub use crate::ring::{ContextRing, Remembered};

mod decode;
mod engine;
mod input;
mod report;
mod ring;
#[cfg(test)]
mod testutil;
