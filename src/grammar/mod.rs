pub mod first_follow;
pub mod grammar;
pub mod normalize;
pub mod parse_table;
pub mod parser;
pub mod pretty_print;
pub use grammar::{Grammar, Symbol};

pub const EPSILON: &str = "ε";
pub const END_MARK: &str = "$";

/// Builds a grammar from rule pairs, deriving the nonterminal set from the
/// rule heads and the terminal set from the right-hand sides.
#[cfg(test)]
pub(crate) fn test_grammar(start: &str, rules: Vec<(&str, Vec<Vec<Symbol>>)>) -> Grammar {
    use std::collections::{HashMap, HashSet};

    let non_terminals: HashSet<String> =
        rules.iter().map(|(head, _)| head.to_string()).collect();
    let terminals: HashSet<String> = rules
        .iter()
        .flat_map(|(_, rhss)| rhss.iter().flatten())
        .filter_map(|symbol| match symbol {
            Symbol::Terminal(name) => Some(name.clone()),
            _ => None,
        })
        .collect();
    let productions: HashMap<String, Vec<Vec<Symbol>>> = rules
        .into_iter()
        .map(|(head, rhss)| (head.to_string(), rhss))
        .collect();
    Grammar::new(non_terminals, terminals, start, productions).unwrap()
}
