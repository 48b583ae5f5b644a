pub mod error;
pub mod grammar;
pub mod token;

pub use error::{GrammarError, Ll1Conflict, ParseError};
pub use grammar::first_follow::FirstFollow;
pub use grammar::parse_table::ParseTable;
pub use grammar::parser::{Ll1Parser, ParseTreeNode};
pub use grammar::{Grammar, Symbol};
pub use token::{terminal_stream, Token, TokenKind};

#[cfg(test)]
mod scenario_tests {
    use super::*;

    fn pipeline(grammar: &Grammar) -> (FirstFollow, ParseTable) {
        let sets = FirstFollow::compute(grammar);
        let table = ParseTable::build(grammar, &sets);
        (sets, table)
    }

    #[test]
    fn assignment_program_parses_end_to_end() {
        let grammar = Grammar::example();
        let (_, table) = pipeline(&grammar);
        let parser = Ll1Parser::new(&grammar, &table);

        let tokens = terminal_stream(&[
            Token::new(TokenKind::Keyword, "begin", 1),
            Token::new(TokenKind::Identifier, "total", 2),
            Token::new(TokenKind::Operator, ":=", 2),
            Token::new(TokenKind::IntegerLiteral, "42", 2),
            Token::new(TokenKind::Delimiter, ";", 2),
            Token::new(TokenKind::Keyword, "end", 3),
        ]);
        let tree = parser.parse(&tokens).unwrap();
        assert_eq!(
            tree.terminal_leaves(),
            ["begin", "IDENTIFIER", ":=", "INTEGER_LITERAL", ";", "end"]
        );
    }

    #[test]
    fn derivable_strings_round_trip_through_the_parser() {
        let grammar = Grammar::example();
        let (_, table) = pipeline(&grammar);
        let parser = Ll1Parser::new(&grammar, &table);

        let words: [&[&str]; 3] = [
            &["begin", "end"],
            &["begin", "IDENTIFIER", ":=", "FLOAT_LITERAL", ";", "end"],
            &[
                "begin", "IDENTIFIER", ":=", "IDENTIFIER", ";", "if", "(", "IDENTIFIER", ">=",
                "IDENTIFIER", "or", "IDENTIFIER", "<>", "IDENTIFIER", ")", "writeln", "(",
                "STRING_LITERAL", ")", "else", "writeln", "(", "STRING_LITERAL", ")", ";", "end",
            ],
        ];
        for word in words {
            let mut stream: Vec<&str> = word.to_vec();
            stream.push("$");
            let tree = parser.parse(&stream).unwrap();
            assert_eq!(tree.terminal_leaves(), word);
        }
    }

    #[test]
    fn corrupting_one_token_never_parses() {
        let grammar = Grammar::example();
        let (_, table) = pipeline(&grammar);
        let parser = Ll1Parser::new(&grammar, &table);

        let good = ["begin", "IDENTIFIER", ":=", "INTEGER_LITERAL", ";", "end", "$"];
        assert!(parser.parse(&good).is_ok());

        for position in 0..good.len() - 1 {
            let mut bad = good;
            bad[position] = "writeln";
            let err = parser.parse(&bad).unwrap_err();
            assert!(
                matches!(
                    err,
                    ParseError::TerminalMismatch { .. }
                        | ParseError::NoApplicableProduction { .. }
                ),
                "position {}: unexpected error {:?}",
                position,
                err
            );
        }
    }

    #[test]
    fn first_sets_stay_inside_the_terminal_universe() {
        let grammar = Grammar::example();
        let (sets, _) = pipeline(&grammar);
        for non_terminal in grammar.non_terminals() {
            for symbol in sets.first(non_terminal) {
                assert!(
                    symbol == "ε" || grammar.terminals().contains(symbol),
                    "FIRST({}) leaked '{}'",
                    non_terminal,
                    symbol
                );
            }
        }
    }

    #[test]
    fn normalization_drops_epsilon_alternatives_from_the_example() {
        // The ε alternatives disappear; deleted-occurrence variants keep
        // the derived language unchanged.
        let grammar = Grammar::example().normalized();
        assert!(grammar
            .productions_for("STATEMENTS")
            .iter()
            .all(|rhs| !(rhs.len() == 1 && rhs[0] == Symbol::Epsilon)));
        assert!(grammar.non_terminals().contains("STATEMENT"));
        assert!(grammar.terminals().contains("begin"));
    }
}
