use std::collections::{HashMap, HashSet, VecDeque};

use log::debug;

use super::{grammar::Symbol, Grammar};

/// Appends prime marks until the name collides with nothing in `used`.
fn fresh_name(used: &HashSet<String>, mut name: String) -> String {
    while used.contains(&name) {
        name.push('\'');
    }
    name
}

fn is_epsilon_rhs(rhs: &[Symbol]) -> bool {
    rhs.len() == 1 && rhs[0] == Symbol::Epsilon
}

impl Grammar {
    /// Normalizes the grammar: drops non-generating and unreachable
    /// symbols, then eliminates ε productions. Returns a fresh grammar and
    /// never mutates `self`.
    ///
    /// A grammar whose start symbol cannot derive any terminal string has
    /// an empty language; the result is then the empty grammar (no
    /// symbols, no productions, same start symbol). That is a regular
    /// return value, not an error.
    pub fn normalized(&self) -> Grammar {
        let generating = self.generating_non_terminals();
        if !generating.contains(&self.start_symbol) {
            debug!(
                "start symbol '{}' generates no terminal string; language is empty",
                self.start_symbol
            );
            return Grammar {
                non_terminals: HashSet::new(),
                terminals: HashSet::new(),
                start_symbol: self.start_symbol.clone(),
                productions: HashMap::new(),
            };
        }

        // Useless-symbol elimination: keep generating nonterminals, drop
        // every right-hand side that mentions a non-generating one.
        let mut non_terminals: HashSet<String> = self
            .non_terminals
            .intersection(&generating)
            .cloned()
            .collect();
        let mut productions: HashMap<String, Vec<Vec<Symbol>>> = HashMap::new();
        for non_terminal in &non_terminals {
            let kept: Vec<Vec<Symbol>> = self
                .productions_for(non_terminal)
                .iter()
                .filter(|rhs| {
                    rhs.iter().all(|symbol| match symbol {
                        Symbol::NonTerminal(name) => generating.contains(name),
                        _ => true,
                    })
                })
                .cloned()
                .collect();
            productions.insert(non_terminal.clone(), kept);
        }

        // Reachability: breadth-first over the surviving productions.
        let mut reachable: HashSet<String> = HashSet::from([self.start_symbol.clone()]);
        let mut queue: VecDeque<String> = VecDeque::from([self.start_symbol.clone()]);
        while let Some(current) = queue.pop_front() {
            for rhs in productions.get(&current).into_iter().flatten() {
                for symbol in rhs {
                    match symbol {
                        Symbol::NonTerminal(name) => {
                            if reachable.insert(name.clone()) {
                                queue.push_back(name.clone());
                            }
                        }
                        Symbol::Terminal(name) => {
                            reachable.insert(name.clone());
                        }
                        Symbol::Epsilon | Symbol::End => {}
                    }
                }
            }
        }
        non_terminals.retain(|name| reachable.contains(name));
        let terminals: HashSet<String> = self
            .terminals
            .iter()
            .filter(|name| reachable.contains(*name))
            .cloned()
            .collect();
        productions.retain(|head, _| non_terminals.contains(head));

        // Epsilon elimination. Nullable means "has a production that is
        // literally ε"; the generated deletion variants stand in for the
        // dropped ε alternatives.
        let nullable: HashSet<String> = productions
            .iter()
            .filter(|(_, rhss)| rhss.iter().any(|rhs| is_epsilon_rhs(rhs)))
            .map(|(head, _)| head.clone())
            .collect();

        let mut new_productions: HashMap<String, Vec<Vec<Symbol>>> = HashMap::new();
        for (head, rhss) in &productions {
            let mut kept: Vec<Vec<Symbol>> = Vec::new();
            let mut seen: HashSet<Vec<Symbol>> = HashSet::new();
            for rhs in rhss {
                if is_epsilon_rhs(rhs) {
                    continue;
                }
                if seen.insert(rhs.clone()) {
                    kept.push(rhs.clone());
                }

                let nullable_positions: Vec<usize> = rhs
                    .iter()
                    .enumerate()
                    .filter_map(|(i, symbol)| match symbol {
                        Symbol::NonTerminal(name) if nullable.contains(name) => Some(i),
                        _ => None,
                    })
                    .collect();

                // Every non-empty subset of the nullable occurrences may
                // vanish; a set bit deletes the occurrence. Variants that
                // would leave nothing are skipped.
                for mask in 1u64..(1u64 << nullable_positions.len()) {
                    let mut variant: Vec<Symbol> = Vec::with_capacity(rhs.len());
                    for (i, symbol) in rhs.iter().enumerate() {
                        if let Some(bit) = nullable_positions.iter().position(|&p| p == i) {
                            if mask & (1 << bit) != 0 {
                                continue;
                            }
                        }
                        variant.push(symbol.clone());
                    }
                    if !variant.is_empty() && seen.insert(variant.clone()) {
                        kept.push(variant);
                    }
                }
            }
            new_productions.insert(head.clone(), kept);
        }

        debug!(
            "normalized grammar: {} nonterminal(s), {} terminal(s)",
            non_terminals.len(),
            terminals.len()
        );
        Grammar {
            non_terminals,
            terminals,
            start_symbol: self.start_symbol.clone(),
            productions: new_productions,
        }
    }

    /// Normalizes and then binarizes the grammar: every terminal inside a
    /// multi-symbol right-hand side is replaced by an alias nonterminal
    /// (`N_b → b`, reused per terminal, primed on a name collision), and
    /// right-hand sides still longer than two symbols are split into
    /// chains of fresh pair nonterminals.
    pub fn binarized(&self) -> Grammar {
        let normalized = self.normalized();
        if normalized.non_terminals.is_empty() {
            return normalized;
        }

        let mut used: HashSet<String> = normalized
            .non_terminals
            .union(&normalized.terminals)
            .cloned()
            .collect();
        let mut aliases: HashMap<String, String> = HashMap::new();
        let mut alias_rules: Vec<(String, Vec<Symbol>)> = Vec::new();
        let mut chain_rules: Vec<(String, Vec<Symbol>)> = Vec::new();
        let mut productions: HashMap<String, Vec<Vec<Symbol>>> = HashMap::new();

        for (head, rhss) in &normalized.productions {
            let mut new_rhss: Vec<Vec<Symbol>> = Vec::new();
            for rhs in rhss {
                if rhs.len() < 2 {
                    new_rhss.push(rhs.clone());
                    continue;
                }

                let substituted: Vec<Symbol> = rhs
                    .iter()
                    .map(|symbol| match symbol {
                        Symbol::Terminal(name) => {
                            let alias = aliases.entry(name.clone()).or_insert_with(|| {
                                let fresh = fresh_name(&used, format!("N_{}", name));
                                used.insert(fresh.clone());
                                alias_rules
                                    .push((fresh.clone(), vec![Symbol::Terminal(name.clone())]));
                                fresh
                            });
                            Symbol::NonTerminal(alias.clone())
                        }
                        other => other.clone(),
                    })
                    .collect();

                // Longer right-hand sides are split into pair chains
                // instead of being dropped.
                let mut remaining = substituted;
                let mut owner: Option<String> = None;
                loop {
                    if remaining.len() <= 2 {
                        match owner {
                            None => new_rhss.push(remaining),
                            Some(link) => chain_rules.push((link, remaining)),
                        }
                        break;
                    }
                    let leading = remaining.remove(0);
                    let link = fresh_name(&used, head.clone());
                    used.insert(link.clone());
                    let pair = vec![leading, Symbol::NonTerminal(link.clone())];
                    match owner {
                        None => new_rhss.push(pair),
                        Some(previous) => chain_rules.push((previous, pair)),
                    }
                    owner = Some(link);
                }
            }
            productions.insert(head.clone(), new_rhss);
        }

        let mut non_terminals = normalized.non_terminals.clone();
        for (link, rhs) in chain_rules {
            non_terminals.insert(link.clone());
            productions.insert(link, vec![rhs]);
        }
        for (alias, rhs) in alias_rules {
            non_terminals.insert(alias.clone());
            productions.insert(alias, vec![rhs]);
        }

        debug!(
            "binarized grammar: {} nonterminal(s) after aliasing and chaining",
            non_terminals.len()
        );
        Grammar {
            non_terminals,
            terminals: normalized.terminals.clone(),
            start_symbol: normalized.start_symbol.clone(),
            productions,
        }
    }

    fn generating_non_terminals(&self) -> HashSet<String> {
        let mut generating: HashSet<String> = HashSet::new();
        let mut changed = true;
        while changed {
            changed = false;
            for (head, rhss) in &self.productions {
                if generating.contains(head) {
                    continue;
                }
                let produces = rhss.iter().any(|rhs| {
                    rhs.iter().all(|symbol| match symbol {
                        Symbol::Terminal(_) | Symbol::End | Symbol::Epsilon => true,
                        Symbol::NonTerminal(name) => generating.contains(name),
                    })
                });
                if produces {
                    generating.insert(head.clone());
                    changed = true;
                }
            }
        }
        generating
    }
}
