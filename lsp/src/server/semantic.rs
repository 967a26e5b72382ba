use ms_core::analyze::diagnostic::utf16_len;
use ms_core::token::{TokenKind, tokenize};
use tower_lsp::lsp_types::{SemanticToken, SemanticTokenType, SemanticTokensLegend};

/// Legend order; a token's type is its index here.
pub const TOKEN_TYPES: [SemanticTokenType; 7] = [
    SemanticTokenType::KEYWORD,
    SemanticTokenType::STRING,
    SemanticTokenType::NUMBER,
    SemanticTokenType::OPERATOR,
    SemanticTokenType::FUNCTION,
    SemanticTokenType::VARIABLE,
    SemanticTokenType::COMMENT,
];

pub fn legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: TOKEN_TYPES.to_vec(),
        token_modifiers: Vec::new(),
    }
}

pub fn token_type_index(kind: TokenKind) -> u32 {
    match kind {
        TokenKind::Keyword => 0,
        TokenKind::String => 1,
        TokenKind::Number => 2,
        TokenKind::Operator => 3,
        TokenKind::Identifier => 5,
        TokenKind::Comment => 6,
    }
}

/// Lexes `content` and delta-encodes every token. Tokens spanning several lines (triple-quoted
/// strings) are split into one entry per line; positions are UTF-16.
pub fn encode_semantic_tokens(content: &str) -> Vec<SemanticToken> {
    let line_starts: Vec<usize> = std::iter::once(0)
        .chain(content.match_indices('\n').map(|(i, _)| i + 1))
        .collect();

    let mut out = Vec::new();
    let (mut prev_line, mut prev_col) = (0u32, 0u32);
    for token in tokenize(content) {
        let token_type = token_type_index(token.kind);
        let mut line = line_starts.partition_point(|&s| s <= token.start) - 1;
        let mut piece_start = token.start;

        while piece_start < token.end {
            let line_start = line_starts[line];
            let line_end = line_starts.get(line + 1).map_or(content.len(), |next| next - 1);
            let mut piece_end = token.end.min(line_end);
            if piece_end == line_end && content[..piece_end].ends_with('\r') {
                piece_end -= 1;
            }

            let length = utf16_len(&content[piece_start..piece_end.max(piece_start)]) as u32;
            if length > 0 {
                let col = utf16_len(&content[line_start..piece_start]) as u32;
                let line_u32 = line as u32;
                let delta_line = line_u32 - prev_line;
                let delta_start = if delta_line == 0 { col - prev_col } else { col };
                out.push(SemanticToken {
                    delta_line,
                    delta_start,
                    length,
                    token_type,
                    token_modifiers_bitset: 0,
                });
                prev_line = line_u32;
                prev_col = col;
            }

            piece_start = line_end + 1;
            line += 1;
        }
    }
    out
}
