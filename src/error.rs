use thiserror::Error;

/// An error raised while constructing a [`Grammar`](crate::Grammar).
///
/// Construction either succeeds with a fully validated grammar or fails
/// with one of these; no partially built grammar is observable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// The start symbol is not a member of the nonterminal set.
    #[error("start symbol '{0}' is not a declared nonterminal")]
    UndeclaredStartSymbol(String),

    /// A production mentions a symbol that is neither a declared terminal
    /// nor a declared nonterminal.
    #[error("undefined symbol '{symbol}' in a production of '{non_terminal}'")]
    UndefinedSymbol {
        symbol: String,
        non_terminal: String,
    },

    /// An epsilon marker appeared inside a longer right-hand side. Epsilon
    /// must be the sole element of its production.
    #[error("epsilon must be the only symbol of its production (nonterminal '{non_terminal}')")]
    MisplacedEpsilon { non_terminal: String },
}

/// Reported by the strict parse-table build when two productions of the
/// same nonterminal claim the same lookahead cell.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("grammar is not LL(1): conflicting table entries for ({non_terminal}, '{terminal}')")]
pub struct Ll1Conflict {
    pub non_terminal: String,
    pub terminal: String,
}

/// A syntax error raised by [`Ll1Parser::parse`](crate::Ll1Parser::parse).
///
/// Every variant is fatal to the parse attempt: there is no recovery and
/// no partial tree. `position` is the index into the terminal stream at
/// which the parse stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The terminal on top of the stack differs from the current token.
    #[error("expected '{expected}', found '{found}' (token {position})")]
    TerminalMismatch {
        expected: String,
        found: String,
        position: usize,
    },

    /// The parse table has no entry for the current (nonterminal,
    /// lookahead) pair.
    #[error("no production for ({non_terminal}, '{lookahead}') (token {position})")]
    NoApplicableProduction {
        non_terminal: String,
        lookahead: String,
        position: usize,
    },

    /// The stack emptied while tokens were still left in the stream.
    #[error("input not fully consumed (token {position})")]
    UnconsumedInput { position: usize },

    /// The stream ran out while a symbol was still expected.
    #[error("unexpected end of input: expected '{expected}' (token {position})")]
    PrematureEnd { expected: String, position: usize },
}
