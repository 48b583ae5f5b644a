use serde::Serialize;

use crate::grammar::END_MARK;

/// Classification of a token produced by the lexical analyzer. A closed
/// union so that every consumer matches exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Keyword,
    Identifier,
    IntegerLiteral,
    FloatLiteral,
    StringLiteral,
    Operator,
    Delimiter,
    EndOfInput,
}

/// One classified token. The grammar's terminal alphabet stays finite
/// because identifier and literal tokens enter it under their class name
/// rather than their spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line,
        }
    }

    /// The terminal identifier this token contributes to the parser's
    /// input: the generic class name for identifiers and literals, the
    /// end marker for end-of-input, the exact spelling for everything
    /// else.
    pub fn terminal_name(&self) -> &str {
        match self.kind {
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::IntegerLiteral => "INTEGER_LITERAL",
            TokenKind::FloatLiteral => "FLOAT_LITERAL",
            TokenKind::StringLiteral => "STRING_LITERAL",
            TokenKind::EndOfInput => END_MARK,
            TokenKind::Keyword | TokenKind::Operator | TokenKind::Delimiter => &self.lexeme,
        }
    }
}

/// Maps a token list to the terminal stream the parser consumes, with the
/// end marker appended when the lexer did not supply one.
pub fn terminal_stream(tokens: &[Token]) -> Vec<String> {
    let mut stream: Vec<String> = tokens
        .iter()
        .map(|token| token.terminal_name().to_string())
        .collect();
    if stream.last().map(String::as_str) != Some(END_MARK) {
        stream.push(END_MARK.to_string());
    }
    stream
}
