use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::Serialize;

use super::{END_MARK, EPSILON};
use crate::error::GrammarError;

/// A grammar symbol. Equality and hashing follow variant + name, so the
/// same name tagged as terminal and as nonterminal compares unequal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Symbol {
    NonTerminal(String),
    Terminal(String),
    /// The empty-string marker. Only valid as the sole symbol of a
    /// right-hand side.
    Epsilon,
    /// The end-of-input marker `$`. Never declared as an ordinary
    /// terminal, but matched like one.
    End,
}

impl Symbol {
    pub fn non_terminal(name: impl Into<String>) -> Self {
        Symbol::NonTerminal(name.into())
    }

    pub fn terminal(name: impl Into<String>) -> Self {
        Symbol::Terminal(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Symbol::NonTerminal(name) | Symbol::Terminal(name) => name,
            Symbol::Epsilon => EPSILON,
            Symbol::End => END_MARK,
        }
    }

    /// Terminals and the end marker both match input tokens.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_) | Symbol::End)
    }

    pub fn is_non_terminal(&self) -> bool {
        matches!(self, Symbol::NonTerminal(_))
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An immutable context-free grammar.
///
/// Example:
///
///   S → begin STATEMENTS end
///
///   STATEMENTS → STATEMENT STATEMENTS
///              | ε
///
///   STATEMENT → IDENTIFIER := EXPR ;
///             | if ( COND ) writeln ( WRITE_ARG ) else writeln ( WRITE_ARG ) ;
///
/// Right-hand sides of a nonterminal keep their declaration order; that
/// order is the tie-break that makes table building and normalization
/// deterministic. Every transformation returns a new grammar, the input is
/// never touched.
#[derive(Debug, Clone, PartialEq)]
pub struct Grammar {
    pub(crate) non_terminals: HashSet<String>,
    pub(crate) terminals: HashSet<String>,
    pub(crate) start_symbol: String,
    pub(crate) productions: HashMap<String, Vec<Vec<Symbol>>>,
}

impl Grammar {
    /// Builds a grammar from its four parts, validating that the start
    /// symbol is declared and that every production only mentions declared
    /// symbols (or epsilon, alone on its right-hand side).
    pub fn new(
        non_terminals: HashSet<String>,
        terminals: HashSet<String>,
        start_symbol: impl Into<String>,
        productions: HashMap<String, Vec<Vec<Symbol>>>,
    ) -> Result<Self, GrammarError> {
        let start_symbol = start_symbol.into();
        if !non_terminals.contains(&start_symbol) {
            return Err(GrammarError::UndeclaredStartSymbol(start_symbol));
        }

        let mut productions = productions;
        for (head, rhss) in productions.iter_mut() {
            if !non_terminals.contains(head) {
                return Err(GrammarError::UndefinedSymbol {
                    symbol: head.clone(),
                    non_terminal: head.clone(),
                });
            }
            for rhs in rhss.iter_mut() {
                // An empty right-hand side means the empty string.
                if rhs.is_empty() {
                    *rhs = vec![Symbol::Epsilon];
                    continue;
                }
                for symbol in rhs.iter() {
                    match symbol {
                        Symbol::Epsilon if rhs.len() != 1 => {
                            return Err(GrammarError::MisplacedEpsilon {
                                non_terminal: head.clone(),
                            });
                        }
                        Symbol::Epsilon | Symbol::End => {}
                        Symbol::Terminal(name) if !terminals.contains(name) => {
                            return Err(GrammarError::UndefinedSymbol {
                                symbol: name.clone(),
                                non_terminal: head.clone(),
                            });
                        }
                        Symbol::NonTerminal(name) if !non_terminals.contains(name) => {
                            return Err(GrammarError::UndefinedSymbol {
                                symbol: name.clone(),
                                non_terminal: head.clone(),
                            });
                        }
                        Symbol::Terminal(_) | Symbol::NonTerminal(_) => {}
                    }
                }
            }
        }

        Ok(Self {
            non_terminals,
            terminals,
            start_symbol,
            productions,
        })
    }

    pub fn start_symbol(&self) -> &str {
        &self.start_symbol
    }

    pub fn non_terminals(&self) -> &HashSet<String> {
        &self.non_terminals
    }

    pub fn terminals(&self) -> &HashSet<String> {
        &self.terminals
    }

    /// The right-hand sides declared for `non_terminal`, in declaration
    /// order. Empty for nonterminals without productions and for unknown
    /// names.
    pub fn productions_for(&self, non_terminal: &str) -> &[Vec<Symbol>] {
        self.productions
            .get(non_terminal)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// True for declared terminals and for the end marker.
    pub fn is_terminal(&self, name: &str) -> bool {
        name == END_MARK || self.terminals.contains(name)
    }

    pub fn is_non_terminal(&self, name: &str) -> bool {
        self.non_terminals.contains(name)
    }

    /// The demo grammar used by the binary and the tests: a begin/end
    /// block of assignment and conditional-writeln statements.
    pub fn example() -> Self {
        let n = |s: &str| Symbol::non_terminal(s);
        let t = |s: &str| Symbol::terminal(s);

        let non_terminals: HashSet<String> = [
            "S",
            "STATEMENTS",
            "STATEMENT",
            "EXPR",
            "COND",
            "COND_TAIL",
            "REL_EXPR",
            "REL_OP",
            "WRITE_ARG",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let terminals: HashSet<String> = [
            "begin",
            "end",
            "if",
            "else",
            "writeln",
            ":=",
            ";",
            "(",
            ")",
            "<",
            ">",
            "=",
            "<=",
            ">=",
            "<>",
            "or",
            "IDENTIFIER",
            "INTEGER_LITERAL",
            "FLOAT_LITERAL",
            "STRING_LITERAL",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let mut productions: HashMap<String, Vec<Vec<Symbol>>> = HashMap::new();
        productions.insert(
            "S".to_string(),
            vec![vec![t("begin"), n("STATEMENTS"), t("end")]],
        );
        productions.insert(
            "STATEMENTS".to_string(),
            vec![vec![n("STATEMENT"), n("STATEMENTS")], vec![Symbol::Epsilon]],
        );
        productions.insert(
            "STATEMENT".to_string(),
            vec![
                vec![t("IDENTIFIER"), t(":="), n("EXPR"), t(";")],
                vec![
                    t("if"),
                    t("("),
                    n("COND"),
                    t(")"),
                    t("writeln"),
                    t("("),
                    n("WRITE_ARG"),
                    t(")"),
                    t("else"),
                    t("writeln"),
                    t("("),
                    n("WRITE_ARG"),
                    t(")"),
                    t(";"),
                ],
            ],
        );
        productions.insert(
            "EXPR".to_string(),
            vec![
                vec![t("IDENTIFIER")],
                vec![t("INTEGER_LITERAL")],
                vec![t("FLOAT_LITERAL")],
            ],
        );
        productions.insert(
            "COND".to_string(),
            vec![vec![n("REL_EXPR"), n("COND_TAIL")]],
        );
        productions.insert(
            "COND_TAIL".to_string(),
            vec![
                vec![t("or"), n("REL_EXPR"), n("COND_TAIL")],
                vec![Symbol::Epsilon],
            ],
        );
        productions.insert(
            "REL_EXPR".to_string(),
            vec![vec![t("IDENTIFIER"), n("REL_OP"), t("IDENTIFIER")]],
        );
        productions.insert(
            "REL_OP".to_string(),
            vec![
                vec![t("<")],
                vec![t(">")],
                vec![t("=")],
                vec![t("<=")],
                vec![t(">=")],
                vec![t("<>")],
            ],
        );
        productions.insert(
            "WRITE_ARG".to_string(),
            vec![vec![t("STRING_LITERAL")]],
        );

        Self::new(non_terminals, terminals, "S", productions)
            .unwrap_or_else(|e| panic!("example grammar is invalid: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_parts() -> (
        HashSet<String>,
        HashSet<String>,
        HashMap<String, Vec<Vec<Symbol>>>,
    ) {
        let non_terminals: HashSet<String> = ["S"].into_iter().map(String::from).collect();
        let terminals: HashSet<String> = ["a"].into_iter().map(String::from).collect();
        let mut productions = HashMap::new();
        productions.insert("S".to_string(), vec![vec![Symbol::terminal("a")]]);
        (non_terminals, terminals, productions)
    }

    #[test]
    fn builds_and_exposes_parts() {
        let (vn, vt, p) = toy_parts();
        let g = Grammar::new(vn, vt, "S", p).unwrap();
        assert_eq!(g.start_symbol(), "S");
        assert!(g.is_non_terminal("S"));
        assert!(g.is_terminal("a"));
        assert!(g.is_terminal("$"));
        assert!(!g.is_terminal("S"));
        assert_eq!(g.productions_for("S"), [vec![Symbol::terminal("a")]]);
        assert!(g.productions_for("UNKNOWN").is_empty());
    }

    #[test]
    fn rejects_undeclared_start_symbol() {
        let (vn, vt, p) = toy_parts();
        let err = Grammar::new(vn, vt, "T", p).unwrap_err();
        assert_eq!(err, GrammarError::UndeclaredStartSymbol("T".to_string()));
    }

    #[test]
    fn rejects_undefined_symbol_in_rhs() {
        let (vn, vt, mut p) = toy_parts();
        p.get_mut("S")
            .unwrap()
            .push(vec![Symbol::non_terminal("MISSING")]);
        let err = Grammar::new(vn, vt, "S", p).unwrap_err();
        assert_eq!(
            err,
            GrammarError::UndefinedSymbol {
                symbol: "MISSING".to_string(),
                non_terminal: "S".to_string(),
            }
        );
    }

    #[test]
    fn rejects_undeclared_terminal() {
        let (vn, vt, mut p) = toy_parts();
        p.get_mut("S").unwrap().push(vec![Symbol::terminal("b")]);
        assert!(Grammar::new(vn, vt, "S", p).is_err());
    }

    #[test]
    fn rejects_epsilon_inside_longer_rhs() {
        let (vn, vt, mut p) = toy_parts();
        p.get_mut("S")
            .unwrap()
            .push(vec![Symbol::Epsilon, Symbol::terminal("a")]);
        let err = Grammar::new(vn, vt, "S", p).unwrap_err();
        assert_eq!(
            err,
            GrammarError::MisplacedEpsilon {
                non_terminal: "S".to_string(),
            }
        );
    }

    #[test]
    fn empty_rhs_becomes_epsilon() {
        let (vn, vt, mut p) = toy_parts();
        p.get_mut("S").unwrap().push(vec![]);
        let g = Grammar::new(vn, vt, "S", p).unwrap();
        assert_eq!(g.productions_for("S")[1], vec![Symbol::Epsilon]);
    }

    #[test]
    fn symbol_equality_is_by_variant_and_name() {
        assert_ne!(Symbol::terminal("x"), Symbol::non_terminal("x"));
        assert_eq!(Symbol::End.name(), "$");
        assert_eq!(Symbol::Epsilon.name(), "ε");
    }

    #[test]
    fn example_grammar_is_valid() {
        let g = Grammar::example();
        assert_eq!(g.start_symbol(), "S");
        assert_eq!(g.productions_for("REL_OP").len(), 6);
        assert!(g.is_terminal(":="));
        assert!(g.is_non_terminal("COND_TAIL"));
    }
}
