use std::{fs, io::BufRead};

use ll1_workbench::{FirstFollow, Grammar, Ll1Parser, ParseTable};

fn print_help() {
    println!("Usage: ll1-workbench outputs [options] [token file]");
    println!("outputs:");
    println!("  prod: Productions of the demo grammar");
    println!("  nff: Nullable, FIRST and FOLLOW sets");
    println!("  ll1: LL(1) parse table");
    println!("  norm: Normalized grammar (useless symbols and ε-productions removed)");
    println!("  bin: Normalized and binarized grammar");
    println!("  tree: Parse tree of the token stream read from the file or stdin");
    println!("options:");
    println!("  -h: Print this help");
    println!("  -l: Print in LaTeX format");
    println!("  -j: Print in JSON format");
}

enum OutputFormat {
    Plain,
    LaTeX,
    Json,
}

fn main() {
    pretty_env_logger::init();

    let args = std::env::args().skip(1).collect::<Vec<String>>();
    let mut outputs: Vec<&str> = Vec::new();
    let mut i: usize = 0;
    while i < args.len() && ["prod", "nff", "ll1", "norm", "bin", "tree"].contains(&args[i].as_str())
    {
        outputs.push(args[i].as_str());
        i += 1;
    }

    let mut output_format = OutputFormat::Plain;
    while i < args.len() && ["-h", "--help", "-l", "-j"].contains(&args[i].as_str()) {
        if args[i] == "-h" || args[i] == "--help" {
            print_help();
            return;
        } else if args[i] == "-l" {
            output_format = OutputFormat::LaTeX;
        } else if args[i] == "-j" {
            output_format = OutputFormat::Json;
        }
        i += 1;
    }

    if i + 1 < args.len() || outputs.is_empty() {
        print_help();
        return;
    }

    let grammar = Grammar::example();
    let sets = FirstFollow::compute(&grammar);
    let table = ParseTable::build(&grammar, &sets);

    for output in &outputs {
        match *output {
            "prod" => {
                let t = grammar.to_production_output_vec();
                println!(
                    "{}",
                    match output_format {
                        OutputFormat::Plain => t.to_plaintext(),
                        OutputFormat::LaTeX => t.to_latex(),
                        OutputFormat::Json => t.to_json(),
                    }
                );
            }
            "nff" => {
                let t = grammar.to_non_terminal_output_vec(&sets);
                println!(
                    "{}",
                    match output_format {
                        OutputFormat::Plain => t.to_plaintext(),
                        OutputFormat::LaTeX => t.to_latex(),
                        OutputFormat::Json => t.to_json(),
                    }
                );
            }
            "ll1" => {
                let t = table.to_output(&grammar);
                println!(
                    "{}",
                    match output_format {
                        OutputFormat::Plain => t.to_plaintext(),
                        OutputFormat::LaTeX => t.to_latex(),
                        OutputFormat::Json => t.to_json(),
                    }
                );
            }
            "norm" => {
                let normalized = grammar.normalized();
                let t = normalized.to_production_output_vec();
                println!(
                    "{}",
                    match output_format {
                        OutputFormat::Plain => t.to_plaintext(),
                        OutputFormat::LaTeX => t.to_latex(),
                        OutputFormat::Json => t.to_json(),
                    }
                );
            }
            "bin" => {
                let binarized = grammar.binarized();
                let t = binarized.to_production_output_vec();
                println!(
                    "{}",
                    match output_format {
                        OutputFormat::Plain => t.to_plaintext(),
                        OutputFormat::LaTeX => t.to_latex(),
                        OutputFormat::Json => t.to_json(),
                    }
                );
            }
            "tree" => {
                let input: String = if i == args.len() {
                    std::io::stdin()
                        .lock()
                        .lines()
                        .map(|l| l.unwrap())
                        .collect::<Vec<String>>()
                        .join("\n")
                } else {
                    fs::read_to_string(args[i].as_str()).expect("Failed to read file")
                };
                let mut tokens: Vec<String> =
                    input.split_whitespace().map(str::to_string).collect();
                if tokens.last().map(String::as_str) != Some("$") {
                    tokens.push("$".to_string());
                }

                let parser = Ll1Parser::new(&grammar, &table);
                match parser.parse(&tokens) {
                    Ok(tree) => println!(
                        "{}",
                        match output_format {
                            OutputFormat::Json => tree.to_json(),
                            _ => tree.to_plaintext(),
                        }
                    ),
                    Err(e) => {
                        eprintln!("Syntax error: {}", e);
                        std::process::exit(1);
                    }
                }
            }
            _ => unreachable!(),
        }
    }
}
