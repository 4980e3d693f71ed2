//! UTF-16 column arithmetic.
//!
//! Editor positions count columns in UTF-16 code units while Rust strings are
//! indexed by byte. These helpers convert between the two for a single line.

/// Length of `s` in UTF-16 code units.
pub fn utf16_len(s: &str) -> u32 {
    s.encode_utf16().count() as u32
}

/// UTF-16 column of the byte offset `byte` within `line`.
///
/// Offsets past the end of the line, or inside a multi-byte character, are
/// clamped to the nearest preceding character boundary.
pub fn utf16_column(line: &str, byte: usize) -> u32 {
    let mut end = byte.min(line.len());
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    utf16_len(&line[..end])
}

/// Byte offset of the UTF-16 column `column` within `line`, clamped to the
/// line length.
pub fn byte_offset(line: &str, column: u32) -> usize {
    let mut units = 0u32;
    for (offset, ch) in line.char_indices() {
        if units >= column {
            return offset;
        }
        units += ch.len_utf16() as u32;
    }
    line.len()
}
