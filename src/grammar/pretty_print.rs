use crowbook_text_processing::escape;
use serde::Serialize;

use super::{
    first_follow::FirstFollow, parse_table::ParseTable, parser::ParseTreeNode, Grammar,
    END_MARK, EPSILON,
};

/// Nonterminals in display order: start symbol first, the rest sorted.
fn ordered_non_terminals(grammar: &Grammar) -> Vec<&str> {
    let mut names: Vec<&str> = grammar
        .non_terminals()
        .iter()
        .map(String::as_str)
        .collect();
    names.sort_unstable();
    if let Some(i) = names.iter().position(|&n| n == grammar.start_symbol()) {
        let start = names.remove(i);
        names.insert(0, start);
    }
    names
}

/// Terminal columns in display order: sorted, end marker last.
fn ordered_terminals(grammar: &Grammar) -> Vec<&str> {
    let mut names: Vec<&str> = grammar.terminals().iter().map(String::as_str).collect();
    names.sort_unstable();
    names.push(END_MARK);
    names
}

fn aligned_grid(rows: &[Vec<String>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let width: Vec<usize> = (0..columns)
        .map(|j| rows.iter().filter_map(|row| row.get(j)).map(String::len).max().unwrap_or(0))
        .collect();
    rows.iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                .collect::<Vec<_>>()
                .join(" | ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput<'a> {
    pub left: &'a str,
    pub rights: Vec<Vec<&'a str>>,
}

impl ProductionOutput<'_> {
    pub fn to_plaintext(&self, left_width: usize, multiline: bool) -> String {
        self.rights
            .iter()
            .map(|right| right.join(" "))
            .enumerate()
            .map(|(i, right)| {
                if i == 0 {
                    format!("{:>width$} -> {}", self.left, right, width = left_width)
                } else if multiline {
                    format!("{:>width$}  | {}", "", right, width = left_width)
                } else {
                    format!(" | {}", right)
                }
            })
            .collect::<Vec<_>>()
            .join(if multiline { "\n" } else { "" })
    }

    pub fn to_latex(&self, and_sign: bool) -> String {
        if self.rights.is_empty() {
            return String::new();
        }
        let left = if and_sign {
            format!("{} & \\rightarrow &", escape::tex(self.left))
        } else {
            format!("{} \\rightarrow ", escape::tex(self.left))
        };
        let right = self
            .rights
            .iter()
            .map(|right| {
                right
                    .iter()
                    .map(|s| escape::tex(*s))
                    .collect::<Vec<_>>()
                    .join(" \\ ")
            })
            .collect::<Vec<_>>()
            .join(" \\mid ");
        (left + &right).replace(EPSILON, "\\epsilon")
    }
}

#[derive(Debug, Serialize)]
pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
}

impl ProductionOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let left_max_len = self
            .productions
            .iter()
            .map(|p| p.left.len())
            .max()
            .unwrap_or(0);
        self.productions
            .iter()
            .map(|p| p.to_plaintext(left_max_len, true))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(self.productions.iter().map(|p| p.to_latex(true)))
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<_>>()
            .join("\\\\\n")
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap()
    }
}

impl Grammar {
    pub fn to_production_output_vec(&self) -> ProductionOutputVec {
        let productions = ordered_non_terminals(self)
            .into_iter()
            .map(|left| ProductionOutput {
                left,
                rights: self
                    .productions_for(left)
                    .iter()
                    .map(|rhs| rhs.iter().map(|s| s.name()).collect())
                    .collect(),
            })
            .collect();
        ProductionOutputVec { productions }
    }
}

#[derive(Debug, Serialize)]
struct NonTerminalOutput<'a> {
    name: &'a str,
    nullable: bool,
    first: Vec<&'a str>,
    follow: Vec<&'a str>,
}

impl NonTerminalOutput<'_> {
    fn to_plaintext(&self) -> String {
        format!(
            "{} | {} | {} | {}",
            self.name,
            self.nullable,
            self.first.join(", "),
            self.follow.join(", ")
        )
    }

    fn to_latex(&self) -> String {
        fn f(items: &[&str]) -> String {
            items
                .iter()
                .map(|s| escape::tex(*s))
                .collect::<Vec<_>>()
                .join(r"\ ")
                .replace(EPSILON, r"$\epsilon$")
        }
        format!(
            "{} & {} & {} & {}",
            escape::tex(self.name),
            self.nullable,
            f(&self.first),
            f(&self.follow)
        )
    }
}

/// FIRST/FOLLOW summary of every nonterminal, for diagnostic display.
#[derive(Debug, Serialize)]
pub struct NonTerminalOutputVec<'a> {
    data: Vec<NonTerminalOutput<'a>>,
}

impl NonTerminalOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        self.data
            .iter()
            .map(|e| e.to_plaintext())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap()
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|e| e.to_latex())
            .collect::<Vec<_>>()
            .join("\\\\\n ");
        "\\begin{tabular}{c|c|c|c}\n".to_string()
            + "Symbol & Nullable & First & Follow\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

impl Grammar {
    pub fn to_non_terminal_output_vec<'a>(
        &'a self,
        sets: &'a FirstFollow,
    ) -> NonTerminalOutputVec<'a> {
        let data = ordered_non_terminals(self)
            .into_iter()
            .map(|name| {
                let mut first: Vec<&str> =
                    sets.first(name).iter().map(String::as_str).collect();
                let mut follow: Vec<&str> =
                    sets.follow(name).iter().map(String::as_str).collect();
                first.sort_unstable();
                follow.sort_unstable();
                NonTerminalOutput {
                    name,
                    nullable: sets.first(name).contains(EPSILON),
                    first,
                    follow,
                }
            })
            .collect();
        NonTerminalOutputVec { data }
    }
}

/// The LL(1) table as a rectangular grid of rendered cells.
#[derive(Debug, Serialize)]
pub struct Ll1TableOutput<'a> {
    terminals: Vec<&'a str>,
    rows: Vec<(&'a str, Vec<String>)>,
}

impl Ll1TableOutput<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut grid: Vec<Vec<String>> = Vec::new();
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().map(|t| t.to_string()));
        grid.push(header);
        for (left, cells) in &self.rows {
            let mut line = vec![left.to_string()];
            line.extend(cells.iter().cloned());
            grid.push(line);
        }
        aligned_grid(&grid)
    }

    pub fn to_latex(&self) -> String {
        let header = std::iter::once(String::new())
            .chain(
                self.terminals
                    .iter()
                    .map(|t| format!("\\text{{{}}}", escape::tex(*t))),
            )
            .collect::<Vec<_>>()
            .join(" & ");
        let body = self
            .rows
            .iter()
            .map(|(left, cells)| {
                std::iter::once(escape::tex(*left).to_string())
                    .chain(
                        cells
                            .iter()
                            .map(|c| escape::tex(c).replace(EPSILON, "$\\epsilon$")),
                    )
                    .collect::<Vec<_>>()
                    .join(" & ")
            })
            .collect::<Vec<_>>()
            .join("\\\\\n");
        format!(
            "\\[\\begin{{array}}{{c{}}}\n{}\\\\\\hline\n{}\n\\end{{array}}\\]",
            "|l".repeat(self.terminals.len()),
            header,
            body
        )
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap()
    }
}

impl ParseTable {
    pub fn to_output<'a>(&self, grammar: &'a Grammar) -> Ll1TableOutput<'a> {
        let terminals = ordered_terminals(grammar);
        let rows = ordered_non_terminals(grammar)
            .into_iter()
            .map(|left| {
                let cells = terminals
                    .iter()
                    .map(|terminal| match self.get(left, terminal) {
                        Some(rhs) => {
                            let right = rhs
                                .iter()
                                .map(|s| s.name())
                                .collect::<Vec<_>>()
                                .join(" ");
                            format!("{} -> {}", left, right)
                        }
                        None => String::new(),
                    })
                    .collect();
                (left, cells)
            })
            .collect();
        Ll1TableOutput { terminals, rows }
    }
}

impl ParseTreeNode {
    /// Indented rendering of the subtree, one symbol per line.
    pub fn to_plaintext(&self) -> String {
        let mut out = String::new();
        self.write_plaintext(&mut out, 0);
        out
    }

    fn write_plaintext(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(&self.name);
        out.push('\n');
        for child in &self.children {
            child.write_plaintext(out, depth + 1);
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_grammar;
    use super::*;
    use crate::grammar::grammar::Symbol;

    fn tiny() -> Grammar {
        test_grammar(
            "S",
            vec![(
                "S",
                vec![
                    vec![Symbol::terminal("a"), Symbol::non_terminal("S")],
                    vec![Symbol::Epsilon],
                ],
            )],
        )
    }

    #[test]
    fn productions_render_with_alternatives() {
        let text = tiny().to_production_output_vec().to_plaintext();
        assert_eq!(text, "S -> a S\n   | ε");
    }

    #[test]
    fn non_terminal_summary_lists_sorted_sets() {
        let g = tiny();
        let sets = FirstFollow::compute(&g);
        let text = g.to_non_terminal_output_vec(&sets).to_plaintext();
        assert_eq!(text, "S | true | a, ε | $");
    }

    #[test]
    fn table_grid_has_one_column_per_terminal_plus_end() {
        let g = tiny();
        let sets = FirstFollow::compute(&g);
        let table = ParseTable::build(&g, &sets);
        let out = table.to_output(&g);
        let text = out.to_plaintext();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains('a'));
        assert!(lines[0].contains('$'));
        assert!(lines[1].contains("S -> a S"));
        assert!(lines[1].contains("S -> ε"));
    }

    #[test]
    fn tree_rendering_indents_children() {
        let g = tiny();
        let sets = FirstFollow::compute(&g);
        let table = ParseTable::build(&g, &sets);
        let parser = crate::grammar::parser::Ll1Parser::new(&g, &table);
        let tree = parser.parse(&["a", "$"]).unwrap();
        assert_eq!(tree.to_plaintext(), "S\n  a\n  S\n    ε\n");
    }

    #[test]
    fn json_output_is_well_formed() {
        let g = tiny();
        let sets = FirstFollow::compute(&g);
        let json = g.to_non_terminal_output_vec(&sets).to_json();
        assert!(json.starts_with('{'));
        assert!(json.contains("\"nullable\":true"));
    }
}
