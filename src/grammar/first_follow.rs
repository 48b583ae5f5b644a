use std::collections::{HashMap, HashSet};

use log::debug;

use super::{grammar::Symbol, Grammar, END_MARK, EPSILON};

/// FIRST and FOLLOW sets for one grammar, computed once and immutable
/// afterwards. Sets are keyed by symbol name and contain terminal names,
/// plus `ε` in FIRST sets and `$` in FOLLOW sets.
#[derive(Debug, Clone)]
pub struct FirstFollow {
    first: HashMap<String, HashSet<String>>,
    follow: HashMap<String, HashSet<String>>,
    empty: HashSet<String>,
}

impl FirstFollow {
    /// Computes both set families for `grammar`. Pure: no caches survive
    /// outside the returned value, so distinct grammars can be processed
    /// independently.
    pub fn compute(grammar: &Grammar) -> Self {
        let mut sets = Self {
            first: HashMap::new(),
            follow: HashMap::new(),
            empty: HashSet::new(),
        };

        // FIRST(t) = {t} for every terminal, the end marker included.
        for terminal in grammar.terminals() {
            sets.first
                .insert(terminal.clone(), HashSet::from([terminal.clone()]));
        }
        sets.first
            .insert(END_MARK.to_string(), HashSet::from([END_MARK.to_string()]));
        for non_terminal in grammar.non_terminals() {
            sets.first.insert(non_terminal.clone(), HashSet::new());
            sets.follow.insert(non_terminal.clone(), HashSet::new());
        }
        if let Some(follow_start) = sets.follow.get_mut(grammar.start_symbol()) {
            follow_start.insert(END_MARK.to_string());
        }

        sets.compute_first(grammar);
        sets.compute_follow(grammar);
        sets
    }

    /// FIRST of `symbol`, or the empty set for unknown names. Absence of
    /// information is not an error.
    pub fn first(&self, symbol: &str) -> &HashSet<String> {
        self.first.get(symbol).unwrap_or(&self.empty)
    }

    /// FOLLOW of `non_terminal`, or the empty set for unknown names.
    pub fn follow(&self, non_terminal: &str) -> &HashSet<String> {
        self.follow.get(non_terminal).unwrap_or(&self.empty)
    }

    /// FIRST of a symbol sequence: scan left to right, collect FIRST of
    /// each symbol minus `ε`, and stop at the first symbol that cannot
    /// vanish. `ε` ends up in the result only when every symbol was
    /// nullable (or the sequence is `[ε]`, or empty).
    pub fn first_of_sequence(&self, sequence: &[Symbol]) -> HashSet<String> {
        let mut result = HashSet::new();
        let mut all_nullable = true;
        for symbol in sequence {
            match symbol {
                Symbol::Terminal(_) | Symbol::End | Symbol::Epsilon => {
                    result.insert(symbol.name().to_string());
                    all_nullable = false;
                    break;
                }
                Symbol::NonTerminal(name) => {
                    let first_sym = self.first(name);
                    result.extend(first_sym.iter().cloned());
                    if !first_sym.contains(EPSILON) {
                        all_nullable = false;
                        break;
                    }
                    result.remove(EPSILON);
                }
            }
        }
        if all_nullable {
            result.insert(EPSILON.to_string());
        }
        result
    }

    fn compute_first(&mut self, grammar: &Grammar) {
        let mut passes = 0u32;
        let mut changed = true;
        while changed {
            changed = false;
            passes += 1;
            for non_terminal in grammar.non_terminals() {
                for production in grammar.productions_for(non_terminal) {
                    let addition = self.first_of_sequence(production);
                    let first = self.first.get_mut(non_terminal).unwrap();
                    let before = first.len();
                    first.extend(addition);
                    if first.len() > before {
                        changed = true;
                    }
                }
            }
        }
        debug!("FIRST sets converged after {} pass(es)", passes);
    }

    fn compute_follow(&mut self, grammar: &Grammar) {
        let mut passes = 0u32;
        let mut changed = true;
        while changed {
            changed = false;
            passes += 1;
            for non_terminal in grammar.non_terminals() {
                for production in grammar.productions_for(non_terminal) {
                    for (i, symbol) in production.iter().enumerate() {
                        let Symbol::NonTerminal(name) = symbol else {
                            continue;
                        };
                        let first_beta = self.first_of_sequence(&production[i + 1..]);
                        // When the suffix can vanish, whatever follows the
                        // head also follows this occurrence.
                        let head_follow = if first_beta.contains(EPSILON) {
                            Some(self.follow(non_terminal).clone())
                        } else {
                            None
                        };

                        let follow = self.follow.get_mut(name).unwrap();
                        let before = follow.len();
                        follow.extend(first_beta.into_iter().filter(|s| s != EPSILON));
                        if let Some(head_follow) = head_follow {
                            follow.extend(head_follow);
                        }
                        if follow.len() > before {
                            changed = true;
                        }
                    }
                }
            }
        }
        debug!("FOLLOW sets converged after {} pass(es)", passes);
    }
}
