use serde::Serialize;

use super::{grammar::Symbol, parse_table::ParseTable, Grammar, END_MARK, EPSILON};
use crate::error::ParseError;

/// One node of a parse tree. The parent exclusively owns its children;
/// the tree is never shared or mutated once returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseTreeNode {
    pub name: String,
    pub is_terminal: bool,
    pub children: Vec<ParseTreeNode>,
}

impl ParseTreeNode {
    /// The terminal leaves of the subtree, left to right, `ε` leaves
    /// skipped. For a successful parse this spells the accepted input
    /// without the end marker.
    pub fn terminal_leaves(&self) -> Vec<&str> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a str>) {
        if self.children.is_empty() {
            if self.is_terminal && self.name != EPSILON {
                leaves.push(&self.name);
            }
            return;
        }
        for child in &self.children {
            child.collect_leaves(leaves);
        }
    }
}

/// Nodes live in an index-addressed arena while the parse is running;
/// children are attached to parents that are still on the stack, which an
/// owned tree cannot express. The arena is converted to owned nodes once
/// the parse succeeds.
struct ArenaNode {
    name: String,
    is_terminal: bool,
    children: Vec<usize>,
}

fn alloc(arena: &mut Vec<ArenaNode>, name: &str, is_terminal: bool) -> usize {
    arena.push(ArenaNode {
        name: name.to_string(),
        is_terminal,
        children: Vec::new(),
    });
    arena.len() - 1
}

/// Table-driven top-down parser. Borrows the grammar and its table; each
/// `parse` call is independent and produces a fresh tree.
pub struct Ll1Parser<'a> {
    grammar: &'a Grammar,
    table: &'a ParseTable,
}

impl<'a> Ll1Parser<'a> {
    pub fn new(grammar: &'a Grammar, table: &'a ParseTable) -> Self {
        Self { grammar, table }
    }

    /// Parses a terminal stream whose last element is expected to be the
    /// end marker. On success the returned root mirrors the leftmost
    /// derivation chosen by the table; on failure no tree is returned.
    pub fn parse<T: AsRef<str>>(&self, tokens: &[T]) -> Result<ParseTreeNode, ParseError> {
        let mut arena: Vec<ArenaNode> = Vec::new();
        let root = alloc(&mut arena, self.grammar.start_symbol(), false);
        let end = alloc(&mut arena, END_MARK, true);

        // End marker at the bottom, start symbol on top.
        let mut stack: Vec<usize> = vec![end, root];
        let mut pos = 0usize;

        while let Some(&top) = stack.last() {
            let current = tokens.get(pos).map(AsRef::as_ref);

            if arena[top].is_terminal {
                match current {
                    Some(token) if token == arena[top].name => {
                        stack.pop();
                        pos += 1;
                    }
                    Some(token) => {
                        return Err(ParseError::TerminalMismatch {
                            expected: arena[top].name.clone(),
                            found: token.to_string(),
                            position: pos,
                        });
                    }
                    None => {
                        return Err(ParseError::PrematureEnd {
                            expected: arena[top].name.clone(),
                            position: pos,
                        });
                    }
                }
                continue;
            }

            let Some(token) = current else {
                return Err(ParseError::PrematureEnd {
                    expected: arena[top].name.clone(),
                    position: pos,
                });
            };
            let Some(rhs) = self.table.get(&arena[top].name, token) else {
                return Err(ParseError::NoApplicableProduction {
                    non_terminal: arena[top].name.clone(),
                    lookahead: token.to_string(),
                    position: pos,
                });
            };

            stack.pop();
            if rhs.len() == 1 && rhs[0] == Symbol::Epsilon {
                // The ε leaf goes into the tree but never onto the stack.
                let leaf = alloc(&mut arena, EPSILON, true);
                arena[top].children.push(leaf);
            } else {
                let children: Vec<usize> = rhs
                    .iter()
                    .map(|symbol| alloc(&mut arena, symbol.name(), symbol.is_terminal()))
                    .collect();
                arena[top].children.extend(&children);
                // Reverse push so the leftmost symbol is processed next.
                stack.extend(children.iter().rev());
            }
        }

        if pos != tokens.len() {
            return Err(ParseError::UnconsumedInput { position: pos });
        }
        Ok(Self::materialize(&arena, root))
    }

    fn materialize(arena: &[ArenaNode], index: usize) -> ParseTreeNode {
        let node = &arena[index];
        ParseTreeNode {
            name: node.name.clone(),
            is_terminal: node.is_terminal,
            children: node
                .children
                .iter()
                .map(|&child| Self::materialize(arena, child))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{first_follow::FirstFollow, test_grammar};
    use super::*;

    fn example_parser_parts() -> (Grammar, ParseTable) {
        let g = Grammar::example();
        let sets = FirstFollow::compute(&g);
        let table = ParseTable::build(&g, &sets);
        (g, table)
    }

    #[test]
    fn parses_an_assignment_statement() {
        let (g, table) = example_parser_parts();
        let parser = Ll1Parser::new(&g, &table);
        let tokens = [
            "begin",
            "IDENTIFIER",
            ":=",
            "INTEGER_LITERAL",
            ";",
            "end",
            "$",
        ];
        let tree = parser.parse(&tokens).unwrap();

        assert_eq!(tree.name, "S");
        assert!(!tree.is_terminal);
        assert_eq!(
            tree.terminal_leaves(),
            ["begin", "IDENTIFIER", ":=", "INTEGER_LITERAL", ";", "end"]
        );

        // S → begin STATEMENTS end; the inner STATEMENTS expands via ε.
        let statements = &tree.children[1];
        assert_eq!(statements.name, "STATEMENTS");
        let inner = &statements.children[1];
        assert_eq!(inner.name, "STATEMENTS");
        assert_eq!(inner.children.len(), 1);
        assert_eq!(inner.children[0].name, EPSILON);
        assert!(inner.children[0].is_terminal);
    }

    #[test]
    fn parses_a_conditional_statement() {
        let (g, table) = example_parser_parts();
        let parser = Ll1Parser::new(&g, &table);
        let tokens = [
            "begin", "if", "(", "IDENTIFIER", "<", "IDENTIFIER", ")", "writeln", "(",
            "STRING_LITERAL", ")", "else", "writeln", "(", "STRING_LITERAL", ")", ";", "end", "$",
        ];
        let tree = parser.parse(&tokens).unwrap();
        assert_eq!(tree.terminal_leaves(), &tokens[..tokens.len() - 1]);
    }

    #[test]
    fn missing_assign_token_is_a_terminal_mismatch() {
        let (g, table) = example_parser_parts();
        let parser = Ll1Parser::new(&g, &table);
        let tokens = ["begin", "IDENTIFIER", "INTEGER_LITERAL", ";", "end", "$"];
        let err = parser.parse(&tokens).unwrap_err();
        assert_eq!(
            err,
            ParseError::TerminalMismatch {
                expected: ":=".to_string(),
                found: "INTEGER_LITERAL".to_string(),
                position: 2,
            }
        );
    }

    #[test]
    fn impossible_lookahead_has_no_applicable_production() {
        let (g, table) = example_parser_parts();
        let parser = Ll1Parser::new(&g, &table);
        let tokens = ["begin", "else", "end", "$"];
        let err = parser.parse(&tokens).unwrap_err();
        assert_eq!(
            err,
            ParseError::NoApplicableProduction {
                non_terminal: "STATEMENTS".to_string(),
                lookahead: "else".to_string(),
                position: 1,
            }
        );
    }

    #[test]
    fn trailing_tokens_are_unconsumed_input() {
        let (g, table) = example_parser_parts();
        let parser = Ll1Parser::new(&g, &table);
        let tokens = ["begin", "end", "$", "IDENTIFIER"];
        let err = parser.parse(&tokens).unwrap_err();
        assert_eq!(err, ParseError::UnconsumedInput { position: 3 });
    }

    #[test]
    fn missing_end_marker_ends_prematurely() {
        let (g, table) = example_parser_parts();
        let parser = Ll1Parser::new(&g, &table);
        let tokens = ["begin", "IDENTIFIER", ":=", "INTEGER_LITERAL", ";", "end"];
        let err = parser.parse(&tokens).unwrap_err();
        assert_eq!(
            err,
            ParseError::PrematureEnd {
                expected: "$".to_string(),
                position: 6,
            }
        );
    }

    #[test]
    fn empty_stream_ends_prematurely_at_the_start_symbol() {
        let (g, table) = example_parser_parts();
        let parser = Ll1Parser::new(&g, &table);
        let err = parser.parse::<&str>(&[]).unwrap_err();
        assert_eq!(
            err,
            ParseError::PrematureEnd {
                expected: "S".to_string(),
                position: 0,
            }
        );
    }

    #[test]
    fn tree_matches_the_chosen_derivation_exactly() {
        // S → a S b | c : fully deterministic, easy to check node by node.
        let g = test_grammar(
            "S",
            vec![(
                "S",
                vec![
                    vec![
                        Symbol::terminal("a"),
                        Symbol::non_terminal("S"),
                        Symbol::terminal("b"),
                    ],
                    vec![Symbol::terminal("c")],
                ],
            )],
        );
        let sets = FirstFollow::compute(&g);
        let table = ParseTable::build(&g, &sets);
        let parser = Ll1Parser::new(&g, &table);

        let tree = parser.parse(&["a", "a", "c", "b", "b", "$"]).unwrap();
        assert_eq!(tree.terminal_leaves(), ["a", "a", "c", "b", "b"]);
        let middle = &tree.children[1];
        assert_eq!(middle.name, "S");
        let innermost = &middle.children[1];
        assert_eq!(innermost.name, "S");
        assert_eq!(innermost.children.len(), 1);
        assert_eq!(innermost.children[0].name, "c");
        assert!(innermost.children[0].is_terminal);
    }
}
