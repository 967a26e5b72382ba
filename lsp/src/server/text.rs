use ropey::Rope;
use tower_lsp::lsp_types::{Position, TextDocumentContentChangeEvent};

// Convert LSP UTF-16 position to Rope char index (scalar values), clamped to the end of the line.
pub fn position_to_char_idx(text: &Rope, pos: Position) -> usize {
    let line_idx = pos.line as usize;
    if line_idx >= text.len_lines() {
        return text.len_chars();
    }
    let line_start_char = text.line_to_char(line_idx);
    let line_slice = text.line(line_idx);
    let target_utf16 = pos.character as usize;

    if let Some(s) = line_slice.as_str() {
        if s.is_ascii() {
            let clamped = target_utf16.min(s.len());
            return line_start_char + clamped;
        }
    }

    let mut seen_utf16 = 0usize;
    let mut chars_in_line = 0usize;
    for ch in line_slice.chars() {
        let u16_len = ch.len_utf16();
        if seen_utf16 + u16_len > target_utf16 {
            break;
        }
        seen_utf16 += u16_len;
        chars_in_line += 1;
        if seen_utf16 == target_utf16 {
            break;
        }
    }
    line_start_char + chars_in_line
}

// Apply one LSP change (ranged or whole-document) to a rope buffer.
pub fn apply_change(text: &mut Rope, change: &TextDocumentContentChangeEvent) {
    let Some(range) = &change.range else {
        *text = Rope::from_str(&change.text);
        return;
    };
    let start_char = position_to_char_idx(text, range.start);
    let end_char = position_to_char_idx(text, range.end);
    let (s, e) = if start_char <= end_char {
        (start_char, end_char)
    } else {
        (end_char, start_char)
    };
    if s != e {
        text.remove(s..e);
    }
    if !change.text.is_empty() {
        text.insert(s, &change.text);
    }
}

/// Byte column within `line` for a UTF-16 column, clamped to the line end.
pub fn utf16_to_byte_col(line: &str, utf16_col: u32) -> usize {
    let target = utf16_col as usize;
    if line.is_ascii() {
        return target.min(line.len());
    }
    let mut seen = 0usize;
    for (byte, ch) in line.char_indices() {
        if seen >= target {
            return byte;
        }
        seen += ch.len_utf16();
    }
    line.len()
}

/// UTF-16 column of byte offset `byte_col` within `line`.
pub fn byte_to_utf16_col(line: &str, byte_col: usize) -> u32 {
    let byte_col = byte_col.min(line.len());
    if line.is_ascii() {
        return byte_col as u32;
    }
    let prefix = line.get(..byte_col).unwrap_or(line);
    prefix.chars().map(char::len_utf16).sum::<usize>() as u32
}

/// Text of one line without its terminator; empty past the end of the document.
pub fn line_text(content: &str, line: u32) -> &str {
    content
        .split('\n')
        .nth(line as usize)
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or_default()
}
