//! The coding unit: a short, immutable group of bytes.

use std::fmt;

/// One symbol of the input alphabet.
///
/// A symbol holds between 1 and the configured symbol size bytes; only the
/// last symbol of a stream may be shorter. Equality and hashing use the exact
/// byte content, so symbols of different lengths never compare equal.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Symbol(Box<[u8]>);

impl Symbol {
    /// Build a symbol from the bytes read for it.
    pub fn new(bytes: &[u8]) -> Self {
        debug_assert!(!bytes.is_empty(), "symbols are never empty");
        Symbol(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&[u8]> for Symbol {
    fn from(bytes: &[u8]) -> Self {
        Symbol::new(bytes)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol(")?;
        for b in self.0.iter() {
            write!(f, "{:02x}", b)?;
        }
        write!(f, ")")
    }
}
