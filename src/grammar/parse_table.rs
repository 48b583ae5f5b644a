use std::collections::HashMap;

use log::debug;

use super::{first_follow::FirstFollow, grammar::Symbol, Grammar, EPSILON};
use crate::error::Ll1Conflict;

/// The LL(1) decision table: at most one right-hand side per (nonterminal,
/// lookahead terminal) pair, the end marker included among the lookaheads.
/// Built once from a grammar and its FIRST/FOLLOW sets, immutable
/// afterwards.
#[derive(Debug, Clone)]
pub struct ParseTable {
    rows: HashMap<String, HashMap<String, Vec<Symbol>>>,
}

impl ParseTable {
    /// Builds the table with the permissive collision policy: when two
    /// productions of one nonterminal claim the same cell, the later one
    /// in declaration order wins and nothing is reported.
    pub fn build(grammar: &Grammar, sets: &FirstFollow) -> Self {
        Self::build_inner(grammar, sets).0
    }

    /// Builds the table, rejecting the grammar as not LL(1) on the first
    /// cell claimed twice.
    pub fn build_strict(grammar: &Grammar, sets: &FirstFollow) -> Result<Self, Ll1Conflict> {
        match Self::build_inner(grammar, sets) {
            (table, None) => Ok(table),
            (_, Some(conflict)) => Err(conflict),
        }
    }

    fn build_inner(grammar: &Grammar, sets: &FirstFollow) -> (Self, Option<Ll1Conflict>) {
        let mut rows: HashMap<String, HashMap<String, Vec<Symbol>>> = HashMap::new();
        let mut conflict = None;

        for non_terminal in grammar.non_terminals() {
            for production in grammar.productions_for(non_terminal) {
                let first_alpha = sets.first_of_sequence(production);

                for terminal in first_alpha.iter().filter(|t| *t != EPSILON) {
                    Self::claim(
                        &mut rows,
                        &mut conflict,
                        non_terminal,
                        terminal,
                        production,
                    );
                }
                // A vanishing production is chosen on every lookahead that
                // may follow the nonterminal.
                if first_alpha.contains(EPSILON) {
                    for terminal in sets.follow(non_terminal) {
                        Self::claim(
                            &mut rows,
                            &mut conflict,
                            non_terminal,
                            terminal,
                            production,
                        );
                    }
                }
            }
        }

        (Self { rows }, conflict)
    }

    fn claim(
        rows: &mut HashMap<String, HashMap<String, Vec<Symbol>>>,
        conflict: &mut Option<Ll1Conflict>,
        non_terminal: &str,
        terminal: &str,
        production: &[Symbol],
    ) {
        let row = rows.entry(non_terminal.to_string()).or_default();
        if let Some(previous) = row.insert(terminal.to_string(), production.to_vec()) {
            debug!(
                "table cell ({}, '{}') overwritten: {:?} -> {:?}",
                non_terminal, terminal, previous, production
            );
            if conflict.is_none() {
                *conflict = Some(Ll1Conflict {
                    non_terminal: non_terminal.to_string(),
                    terminal: terminal.to_string(),
                });
            }
        }
    }

    /// The production chosen for `(non_terminal, terminal)`, if any.
    /// Absence is not an error here; the parser turns it into one.
    pub fn get(&self, non_terminal: &str, terminal: &str) -> Option<&[Symbol]> {
        self.rows
            .get(non_terminal)?
            .get(terminal)
            .map(Vec::as_slice)
    }
}
