use std::fmt;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::util::fast_map::{FastHashSet, fast_hash_set_with_capacity};

/// Classification of a lexical unit. Identifiers are surfaced to editors as "variable".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Keyword,
    String,
    Number,
    Operator,
    Identifier,
    Comment,
}

impl TokenKind {
    /// Name used in the editor-facing token legend.
    pub fn legend_name(self) -> &'static str {
        match self {
            TokenKind::Keyword => "keyword",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Operator => "operator",
            TokenKind::Identifier => "variable",
            TokenKind::Comment => "comment",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.legend_name())
    }
}

/// A classified half-open byte range `[start, end)` of the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, end: usize) -> Self {
        Self { kind, start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.start..self.end]
    }
}

const RESERVED: &[&str] = &[
    "import", "print", "log", "d", "sin", "cos", "tan", "sec", "csc", "cot", "asin", "acos", "atan", "asec", "acsc",
    "acot", "sinh", "cosh", "tanh", "sech", "csch", "coth", "asinh", "acosh", "atanh", "asech", "acsch", "acoth",
    "erf", "erfc", "ln", "pi", "e", "i", "j", "k",
];

static RESERVED_SET: Lazy<FastHashSet<&'static str>> = Lazy::new(|| {
    let mut set = fast_hash_set_with_capacity(RESERVED.len());
    set.extend(RESERVED.iter().copied());
    set
});

/// Exact, case-sensitive reserved-word check.
pub fn is_reserved_word(word: &str) -> bool {
    RESERVED_SET.contains(word)
}

const TWO_CHAR_OPERATORS: [&[u8; 2]; 5] = [b"==", b"!=", b">=", b"<=", b"->"];

const ASCII_DIGIT: u8 = 1 << 0;
const ASCII_IDENT_START: u8 = 1 << 1;
const ASCII_IDENT_CONT: u8 = 1 << 2;
const ASCII_OPERATOR: u8 = 1 << 3;

const fn build_ascii_class() -> [u8; 128] {
    let mut table = [0u8; 128];
    let mut i = 0;
    while i < 128 {
        let c = i as u8;
        if c >= b'0' && c <= b'9' {
            table[i] |= ASCII_DIGIT | ASCII_IDENT_CONT;
        }
        if (c >= b'a' && c <= b'z') || (c >= b'A' && c <= b'Z') || c == b'_' {
            table[i] |= ASCII_IDENT_START | ASCII_IDENT_CONT;
        }
        if matches!(
            c,
            b'+' | b'-' | b'*' | b'/' | b'^' | b'=' | b'(' | b')' | b'[' | b']' | b'{' | b'}' | b',' | b'!' | b'<' | b'>'
                | b'|' | b':'
        ) {
            table[i] |= ASCII_OPERATOR;
        }
        i += 1;
    }
    table
}

const ASCII_CLASS: [u8; 128] = build_ascii_class();

#[inline]
fn has_class(b: u8, class: u8) -> bool {
    b.is_ascii() && ASCII_CLASS[b as usize] & class != 0
}

#[inline]
fn is_digit_or_underscore(b: u8) -> bool {
    has_class(b, ASCII_DIGIT) || b == b'_'
}

/// Single-pass, state-free scanner. Unrecognized characters are skipped one at a time.
///
/// Iterating yields tokens lazily; [`tokenize`] collects them.
pub struct Tokenizer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    idx: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            idx: 0,
        }
    }

    pub fn tokenize(input: &str) -> Vec<Token> {
        Tokenizer::new(input).collect()
    }

    fn eof(&self) -> bool {
        self.idx >= self.bytes.len()
    }

    fn peek_at(&self, idx: usize) -> Option<u8> {
        self.bytes.get(idx).copied()
    }

    fn starts_with_at(&self, idx: usize, pat: &[u8]) -> bool {
        self.bytes.get(idx..idx + pat.len()) == Some(pat)
    }

    /// Width in bytes of the character starting at `idx`.
    fn char_width_at(&self, idx: usize) -> usize {
        self.input[idx..].chars().next().map(char::len_utf8).unwrap_or(1)
    }

    fn scan_comment(&mut self) -> Token {
        let start = self.idx;
        let end = match self.bytes[start..].iter().position(|b| *b == b'\n') {
            Some(rel) => start + rel,
            None => self.bytes.len(),
        };
        self.idx = end;
        Token::new(TokenKind::Comment, start, end)
    }

    fn scan_string(&mut self) -> Token {
        let start = self.idx;
        let len = self.bytes.len();
        if self.starts_with_at(start, b"\"\"\"") {
            let mut i = start + 3;
            while i < len && !self.starts_with_at(i, b"\"\"\"") {
                i += 1;
            }
            self.idx = (i + 3).min(len);
            return Token::new(TokenKind::String, start, self.idx);
        }

        let mut i = start + 1;
        while i < len && self.bytes[i] != b'"' {
            if self.bytes[i] == b'\\' && i + 1 < len {
                i += 1 + self.char_width_at(i + 1);
            } else {
                i += 1;
            }
        }
        self.idx = (i + 1).min(len);
        Token::new(TokenKind::String, start, self.idx)
    }

    fn scan_number(&mut self) -> Token {
        let start = self.idx;
        let mut i = start + 1;
        while self.peek_at(i).is_some_and(is_digit_or_underscore) {
            i += 1;
        }
        if self.peek_at(i) == Some(b'.') {
            i += 1;
            while self.peek_at(i).is_some_and(is_digit_or_underscore) {
                i += 1;
            }
        }
        self.idx = i;
        Token::new(TokenKind::Number, start, i)
    }

    fn scan_word(&mut self) -> Token {
        let start = self.idx;
        let mut i = start + 1;
        while self.peek_at(i).is_some_and(|b| has_class(b, ASCII_IDENT_CONT)) {
            i += 1;
        }
        self.idx = i;
        let kind = if is_reserved_word(&self.input[start..i]) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Token::new(kind, start, i)
    }

    fn scan_operator(&mut self) -> Option<Token> {
        let start = self.idx;
        if TWO_CHAR_OPERATORS.iter().any(|op| self.starts_with_at(start, *op)) {
            self.idx += 2;
            return Some(Token::new(TokenKind::Operator, start, self.idx));
        }
        if has_class(self.bytes[start], ASCII_OPERATOR) {
            self.idx += 1;
            return Some(Token::new(TokenKind::Operator, start, self.idx));
        }
        None
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        while !self.eof() {
            let b = self.bytes[self.idx];

            if b == b'#' {
                return Some(self.scan_comment());
            }
            if b == b'"' {
                return Some(self.scan_string());
            }
            if has_class(b, ASCII_DIGIT) || (b == b'.' && self.peek_at(self.idx + 1).is_some_and(|n| has_class(n, ASCII_DIGIT))) {
                return Some(self.scan_number());
            }
            if has_class(b, ASCII_IDENT_START) {
                return Some(self.scan_word());
            }
            if let Some(tok) = self.scan_operator() {
                return Some(tok);
            }

            // whitespace or an unrecognized character: skip a whole char so offsets stay on boundaries
            self.idx += self.char_width_at(self.idx);
        }
        None
    }
}

pub fn tokenize(input: &str) -> Vec<Token> {
    Tokenizer::tokenize(input)
}
