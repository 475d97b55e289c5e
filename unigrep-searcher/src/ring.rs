/*!
The sliding window of recent lines used to emit leading context.
*/

/// A cyclic buffer holding the most recent lines of a source.
///
/// The ring has `before + 1` slots and the slot for line `L` is
/// `L mod (before + 1)`, so by the time a match is found on the current
/// line, the previous `before` lines are still resident and can be
/// printed as leading context on demand. Each slot keeps the line's
/// bytes, its absolute byte offset and its binary flag, since a context
/// line is rendered with its own properties, not the matching line's.
#[derive(Clone, Debug)]
pub struct ContextRing {
    slots: Vec<Slot>,
}

#[derive(Clone, Debug, Default)]
struct Slot {
    /// The 1-based line number held in this slot, or 0 when the slot
    /// has not been filled yet.
    number: u64,
    offset: u64,
    binary: bool,
    bytes: Vec<u8>,
}

/// A view of one remembered line.
#[derive(Clone, Copy, Debug)]
pub struct Remembered<'a> {
    /// The line's bytes, including its terminator when it had one.
    pub bytes: &'a [u8],
    /// The absolute byte offset of the line's start.
    pub offset: u64,
    /// Whether the line was classified as binary when it was read.
    pub binary: bool,
}

impl ContextRing {
    fn slot_mut(&mut self, number: u64) -> &mut Slot {
        let len = self.slots.len() as u64;
        &mut self.slots[(number % len) as usize]
    }

    /// Create a ring able to serve `before` lines of leading context.
    pub fn new(before: usize) -> ContextRing {
        ContextRing { slots: vec![Slot::default(); before + 1] }
    }

    /// Forget everything, for reuse with a new source.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.number = 0;
        }
    }

    /// Remember the given line.
    ///
    /// The slot it lands in is determined by the line number alone, so
    /// a line `before + 1` lines later will overwrite it, which is
    /// exactly when it falls out of every possible context window.
    pub fn remember(
        &mut self,
        number: u64,
        offset: u64,
        binary: bool,
        bytes: &[u8],
    ) {
        let slot = self.slot_mut(number);
        slot.number = number;
        slot.offset = offset;
        slot.binary = binary;
        slot.bytes.clear();
        slot.bytes.extend_from_slice(bytes);
    }

    /// Look a line up by number. This only succeeds while the line is
    /// within the window, i.e. at most `before` lines behind the most
    /// recently remembered one.
    pub fn recall(&self, number: u64) -> Option<Remembered> {
        if number == 0 {
            return None;
        }
        let slot = &self.slots[(number % self.slots.len() as u64) as usize];
        if slot.number != number {
            return None;
        }
        Some(Remembered {
            bytes: &slot.bytes,
            offset: slot.offset,
            binary: slot.binary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ContextRing;

    #[test]
    fn recall_within_window() {
        let mut ring = ContextRing::new(2);
        ring.remember(1, 0, false, b"one\n");
        ring.remember(2, 4, false, b"two\n");
        ring.remember(3, 8, true, b"three\n");

        let got = ring.recall(2).unwrap();
        assert_eq!(got.bytes, b"two\n");
        assert_eq!(got.offset, 4);
        assert!(!got.binary);
        assert!(ring.recall(3).unwrap().binary);
    }

    #[test]
    fn old_lines_fall_out() {
        let mut ring = ContextRing::new(1);
        ring.remember(1, 0, false, b"one\n");
        ring.remember(2, 4, false, b"two\n");
        // Slot reuse: line 3 lands where line 1 lived.
        ring.remember(3, 8, false, b"three\n");
        assert!(ring.recall(1).is_none());
        assert!(ring.recall(2).is_some());
        assert!(ring.recall(3).is_some());
    }

    #[test]
    fn zero_context_remembers_only_current() {
        let mut ring = ContextRing::new(0);
        ring.remember(1, 0, false, b"one\n");
        assert!(ring.recall(1).is_some());
        ring.remember(2, 4, false, b"two\n");
        assert!(ring.recall(1).is_none());
    }

    #[test]
    fn clear_forgets() {
        let mut ring = ContextRing::new(3);
        ring.remember(1, 0, false, b"one\n");
        ring.clear();
        assert!(ring.recall(1).is_none());
        // Never-filled and cleared slots both miss.
        assert!(ring.recall(0).is_none());
    }
}
