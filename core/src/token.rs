mod lexer;

pub use lexer::{Token, TokenKind, Tokenizer, is_reserved_word, tokenize};
