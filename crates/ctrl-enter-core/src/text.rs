use ropey::Rope;

/// Number of UTF-16 code units in `text`.
pub(crate) fn utf16_len(text: &str) -> u32 {
    text.encode_utf16().count() as u32
}

/// Byte offset of the char boundary at (or just before) `utf16_offset`.
pub(crate) fn utf16_to_byte(text: &str, utf16_offset: u32) -> usize {
    let mut units = 0u32;
    for (byte, ch) in text.char_indices() {
        if units >= utf16_offset {
            return byte;
        }
        units += ch.len_utf16() as u32;
        // Inside a surrogate pair: round down to the char start.
        if units > utf16_offset {
            return byte;
        }
    }
    text.len()
}

/// Replace `start..end` (UTF-16 units, clamped) with a single `'\n'`.
///
/// Returns the new value and the caret offset right after the inserted break.
pub(crate) fn splice_line_break(value: &str, start: u32, end: u32) -> (String, u32) {
    let mut rope = Rope::from_str(value);
    let len = rope.len_utf16_cu();
    let start = (start as usize).min(len);
    let end = (end as usize).clamp(start, len);

    let start_char = rope.utf16_cu_to_char(start);
    let end_char = rope.utf16_cu_to_char(end);
    rope.remove(start_char..end_char);
    rope.insert_char(start_char, '\n');

    let caret = rope.char_to_utf16_cu(start_char) + 1;
    (rope.to_string(), caret as u32)
}
