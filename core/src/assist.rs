//! Editor helpers: completion catalogue, hover text and signature help.
//!
//! Positions are `(line, byte column)` into lines produced by [`split_lines`]; converting from and
//! to editor coordinates is the caller's job.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::analyze::split_lines;
use crate::builtins::{self, BUILTINS, Builtin, BuiltinKind, KEYWORDS};


/// How far above a word the hover scan looks for documentation.
pub const DOC_SCAN_LINES: usize = 20;

const DOCSTRING_FENCE: &str = "\"\"\"";

static USER_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([A-Za-z_][A-Za-z0-9_]*)\s*\(([^)]*)\)\s*=").expect("valid user function pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionKind {
    Function,
    Constant,
    Keyword,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionEntry {
    pub label: &'static str,
    pub kind: CompletionKind,
    pub detail: Option<&'static str>,
    pub documentation: Option<&'static str>,
}

/// Every built-in followed by the keywords. Keywords that are also built-ins appear twice.
pub fn completion_catalogue() -> Vec<CompletionEntry> {
    let builtins = BUILTINS.iter().map(|b| CompletionEntry {
        label: b.name,
        kind: match b.kind {
            BuiltinKind::Function => CompletionKind::Function,
            BuiltinKind::Constant => CompletionKind::Constant,
        },
        detail: Some(b.detail),
        documentation: Some(b.documentation),
    });
    let keywords = KEYWORDS.iter().map(|&k| CompletionEntry {
        label: k,
        kind: CompletionKind::Keyword,
        detail: None,
        documentation: None,
    });
    builtins.chain(keywords).collect()
}

/// Byte span of the identifier touching `col` (either inside it or right after its last byte).
pub fn word_at(line: &str, col: usize) -> Option<(usize, usize)> {
    let bytes = line.as_bytes();
    let col = col.min(bytes.len());
    let is_word = |b: u8| b.is_ascii_alphanumeric() || b == b'_';

    let mut start = col;
    while start > 0 && is_word(bytes[start - 1]) {
        start -= 1;
    }
    let mut end = col;
    while end < bytes.len() && is_word(bytes[end]) {
        end += 1;
    }
    // identifiers cannot start with a digit
    while start < end && bytes[start].is_ascii_digit() {
        start += 1;
    }
    (start < end).then_some((start, end))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverInfo {
    pub line: usize,
    pub start: usize,
    pub end: usize,
    pub markdown: String,
}

/// Built-in signature and docs for the word under the cursor, plus any `#` comments or `"""`
/// docstring directly above it. `None` when there is nothing to show.
pub fn hover(content: &str, line: usize, col: usize) -> Option<HoverInfo> {
    let lines = split_lines(content);
    let text = lines.get(line)?;
    let (start, end) = word_at(text, col)?;
    let word = &text[start..end];

    let mut markdown = String::new();
    if let Some(b) = builtins::lookup(word) {
        markdown.push_str(&builtin_markdown(b));
    }
    let docs = docs_above(&lines, line);
    if markdown.is_empty() && docs.is_none() {
        return None;
    }
    if let Some(docs) = docs {
        if !markdown.is_empty() {
            markdown.push_str("\n\n");
        }
        markdown.push_str(&docs);
    }
    Some(HoverInfo {
        line,
        start,
        end,
        markdown,
    })
}

fn builtin_markdown(b: &Builtin) -> String {
    format!("```ms\n{}\n```\n{}", b.signature(), b.documentation)
}

/// `#` comment lines directly above `line` (document order), followed by the `"""` block that
/// ends above them, if any.
fn docs_above(lines: &[&str], line: usize) -> Option<String> {
    let floor = line.saturating_sub(DOC_SCAN_LINES);
    let mut comments = Vec::new();
    let mut docstring = None;

    for idx in (floor..line).rev() {
        let text = lines[idx].trim();
        if text.starts_with('#') {
            comments.push(text);
            continue;
        }
        if text.contains(DOCSTRING_FENCE) {
            docstring = Some(docstring_ending_at(lines, idx));
            break;
        }
        if !text.is_empty() {
            break;
        }
    }

    comments.reverse();
    let mut parts: Vec<String> = Vec::new();
    if !comments.is_empty() {
        parts.push(comments.join("\n"));
    }
    parts.extend(docstring);
    if parts.is_empty() {
        return None;
    }
    Some(parts.join("\n"))
}

/// Block from the opening fence through the fence on line `close`, as a code block.
fn docstring_ending_at(lines: &[&str], close: usize) -> String {
    let closed_inline = lines[close].matches(DOCSTRING_FENCE).count() >= 2;
    let mut open = close;
    if !closed_inline {
        while open > 0 {
            open -= 1;
            if lines[open].contains(DOCSTRING_FENCE) {
                break;
            }
        }
    }
    format!("```ms\n{}\n```", lines[open..=close].join("\n"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInfo {
    pub label: String,
    pub documentation: String,
    pub parameters: Vec<String>,
    pub active_parameter: u32,
}

/// Innermost unclosed call before the cursor on one line: its name and the index of the
/// argument being typed (top-level commas since the `(`).
pub fn find_call_before_cursor(line_prefix: &str) -> Option<(&str, usize)> {
    let bytes = line_prefix.as_bytes();
    let mut depth = 0usize;
    let mut commas = 0usize;
    let mut i = bytes.len();
    while i > 0 {
        i -= 1;
        match bytes[i] {
            b')' => depth += 1,
            b'(' if depth > 0 => depth -= 1,
            b'(' => {
                let mut end = i;
                while end > 0 && bytes[end - 1].is_ascii_whitespace() {
                    end -= 1;
                }
                let (start, end) = word_at(&line_prefix[..end], end)?;
                return Some((&line_prefix[start..end], commas));
            }
            b',' if depth == 0 => commas += 1,
            _ => {}
        }
    }
    None
}

/// Built-in function signature, else the first `name(params) = ...` definition in `content`.
pub fn signature_help(content: &str, line: usize, col: usize) -> Option<SignatureInfo> {
    let lines = split_lines(content);
    let text = lines.get(line)?;
    let prefix = text.get(..col.min(text.len()))?;
    let (name, active) = find_call_before_cursor(prefix)?;

    if let Some(b) = builtins::function(name) {
        let parameters: Vec<String> = b
            .parameters
            .unwrap_or_default()
            .iter()
            .map(|p| p.to_string())
            .collect();
        return Some(SignatureInfo {
            label: b.signature(),
            documentation: b.documentation.to_string(),
            active_parameter: clamp_active(active, parameters.len()),
            parameters,
        });
    }

    let caps = USER_FUNCTION
        .captures_iter(content)
        .find(|c| c.get(1).is_some_and(|m| m.as_str() == name))?;
    let parameters: Vec<String> = caps
        .get(2)
        .map(|m| {
            m.as_str()
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Some(SignatureInfo {
        label: format!("{}({})", name, parameters.join(", ")),
        documentation: "User-defined function".to_string(),
        active_parameter: clamp_active(active, parameters.len()),
        parameters,
    })
}

fn clamp_active(active: usize, len: usize) -> u32 {
    active.min(len.saturating_sub(1)) as u32
}
