//! Separator-set tokenizer.
//!
//! Splits a line into maximal runs of non-separator bytes without
//! allocating. Separator membership is a 128-bit table built at compile
//! time, so each test is a shift and a mask.

/// Set of ASCII separator bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeparatorSet {
    bits: [u64; 2],
}

impl SeparatorSet {
    /// Build a set from ASCII bytes.
    ///
    /// # Panics
    /// If any byte is not ASCII; splitting on such a byte could cut a
    /// UTF-8 sequence in half.
    pub const fn new(bytes: &[u8]) -> Self {
        let mut bits = [0u64; 2];
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            assert!(b.is_ascii(), "separators must be ASCII");
            bits[(b >> 6) as usize] |= 1u64 << (b & 63);
            i += 1;
        }
        Self { bits }
    }

    /// Membership test.
    #[inline]
    pub const fn contains(&self, b: u8) -> bool {
        b.is_ascii() && self.bits[(b >> 6) as usize] & (1u64 << (b & 63)) != 0
    }
}

/// Line terminators: yields whole lines.
pub const LINE: SeparatorSet = SeparatorSet::new(b"\n\r");

/// Blanks between values.
pub const BLANKS: SeparatorSet = SeparatorSet::new(b" \t\n\r");

/// Blanks or commas between numeric values.
pub const NUMBER_SEPARATORS: SeparatorSet = SeparatorSet::new(b" \t\n\r,");

/// Next token of `input`.
///
/// Skips leading separators and returns the maximal run of non-separator
/// bytes together with the remainder that follows the separator ending it.
/// Returns `None` once only separators (or nothing) remain.
pub fn next_token<'a>(input: &'a str, separators: &SeparatorSet) -> Option<(&'a str, &'a str)> {
    let bytes = input.as_bytes();
    let start = bytes.iter().position(|&b| !separators.contains(b))?;
    let end = bytes[start..]
        .iter()
        .position(|&b| separators.contains(b))
        .map_or(bytes.len(), |len| start + len);
    let rest = if end < bytes.len() { end + 1 } else { end };
    Some((&input[start..end], &input[rest..]))
}

/// Iterator over the tokens of a string.
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    rest: &'a str,
    separators: SeparatorSet,
}

impl<'a> Tokens<'a> {
    /// Tokens of `input` split on `separators`.
    pub fn new(input: &'a str, separators: SeparatorSet) -> Self {
        Self {
            rest: input,
            separators,
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let (token, rest) = next_token(self.rest, &self.separators)?;
        self.rest = rest;
        Some(token)
    }
}
