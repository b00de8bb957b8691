//! Character I/O for the VM.

use crate::error::{Fault, FaultKind};

/// Lowest printable ASCII code accepted by `Output`.
pub const PRINTABLE_MIN: u8 = 32;
/// Highest printable ASCII code accepted by `Output`.
pub const PRINTABLE_MAX: u8 = 126;

/// Forward-only cursor over the program's input characters.
///
/// Character codes are stored modulo 256 since they land in byte registers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputStream {
    codes: Vec<u8>,
    position: usize,
}

impl InputStream {
    pub fn new(codes: Vec<u8>) -> Self {
        Self { codes, position: 0 }
    }

    /// Next character code, advancing the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`FaultKind::InputStreamEmpty`] once the input is exhausted;
    /// the cursor is left where it was.
    pub fn next_code(&mut self) -> Result<u8, Fault> {
        let code = *self
            .codes
            .get(self.position)
            .ok_or(FaultKind::InputStreamEmpty)?;
        self.position += 1;
        Ok(code)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.codes.len().saturating_sub(self.position)
    }

    pub fn rewind(&mut self) {
        self.position = 0;
    }
}

/// Each character becomes one code: its scalar value modulo 256. Characters
/// beyond Latin-1 wrap, so `'Ł'` (U+0141) reads as `'A'` (0x41).
impl From<&str> for InputStream {
    fn from(text: &str) -> Self {
        Self::new(text.chars().map(|c| c as u32 as u8).collect())
    }
}

impl From<Vec<u8>> for InputStream {
    fn from(codes: Vec<u8>) -> Self {
        Self::new(codes)
    }
}

/// Append-only output produced by `Output` instructions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputBuffer {
    text: String,
}

impl OutputBuffer {
    /// Appends a printable ASCII character.
    ///
    /// # Errors
    ///
    /// Returns [`FaultKind::OutputNonAscii`] for codes outside `32..=126`,
    /// leaving the buffer unchanged.
    pub fn push(&mut self, code: u8) -> Result<(), Fault> {
        if !(PRINTABLE_MIN..=PRINTABLE_MAX).contains(&code) {
            return Err(FaultKind::OutputNonAscii.into());
        }
        self.text.push(code as char);
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}
