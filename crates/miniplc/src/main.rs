use std::fs;
use std::path::PathBuf;
use std::process;

use ariadne::{Color, Label, Report, ReportKind, Source};
use clap::Parser;
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use minipl_checker::semantic::Analysis;
use minipl_checker::{check_with_options, SyntaxTree};
use minipl_common::config::{self, CheckerConfig};
use minipl_common::{Diagnostic, Position};

/// Mini-PL static checker.
///
/// Type-checks a parsed Mini-PL program given as a JSON syntax tree.
#[derive(Parser)]
#[command(
    name = "miniplc",
    version,
    about,
    long_about = "Mini-PL static checker.\n\nReads a syntax tree (JSON, as produced by the Mini-PL parser) and reports\nevery semantic error in the program.\n\nExamples:\n  miniplc prog.json                      Check and list errors\n  miniplc prog.json --source prog.mpl    Show errors against the program text\n  miniplc prog.json --json               Print errors as JSON\n  miniplc prog.json --emit-types         Print the resolved type of each node"
)]
struct Cli {
    /// Input syntax tree (.json).
    input: PathBuf,

    /// Program text the tree was parsed from, used to render diagnostics.
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Configuration file (default: nearest minipl.toml above the input).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print diagnostics as JSON to stdout.
    #[arg(long)]
    json: bool,

    /// Print the resolved type of every visited node.
    #[arg(long = "emit-types")]
    emit_types: bool,

    /// Do not print the summary line when the program is well-typed.
    #[arg(short, long)]
    quiet: bool,
}

fn init_tracing() {
    // MINIPLC_LOG takes EnvFilter directives, e.g. `minipl_checker=trace`.
    let filter = EnvFilter::try_from_env("MINIPLC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false)
                .with_target(true)
                .with_level(true),
        )
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let json = match fs::read_to_string(&cli.input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: could not read '{}': {}", cli.input.display(), e);
            process::exit(1);
        }
    };

    let tree = match SyntaxTree::from_json(&json) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("error: {}: {}", cli.input.display(), e);
            process::exit(1);
        }
    };
    debug!(nodes = tree.len(), "loaded syntax tree");

    // === Configuration ===
    let abs_input = fs::canonicalize(&cli.input).unwrap_or_else(|_| cli.input.clone());
    let loaded = match &cli.config {
        Some(path) => config::load_config(path),
        None => config::find_and_load_config(&abs_input),
    };
    let config: CheckerConfig = match loaded {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };
    match &config.source {
        Some(path) => info!(path = %path.display(), "using configuration"),
        None => info!("no minipl.toml found, using default options"),
    }

    // === Program text (optional) ===
    let source = match &cli.source {
        Some(path) => match fs::read_to_string(path) {
            Ok(text) => Some((path_name(path), text)),
            Err(e) => {
                eprintln!("error: could not read '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => None,
    };

    // === Semantic analysis ===
    let analysis = check_with_options(&tree, config.checker);

    if cli.json {
        print_json(&analysis, &tree, cli.emit_types);
    } else {
        if cli.emit_types {
            print_types(&analysis, &tree);
        }
        for diag in analysis.diagnostics.iter() {
            match &source {
                Some((name, text)) => print_diagnostic(diag, text, name),
                None => eprintln!("{}", diag),
            }
        }
    }

    if !analysis.is_well_typed() {
        process::exit(1);
    }
    if !cli.quiet && !cli.json {
        println!("No errors found.");
    }
}

fn path_name(path: &std::path::Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

fn print_types(analysis: &Analysis, tree: &SyntaxTree) {
    for (id, ty) in analysis.types.iter() {
        let node = tree.node(id);
        println!(
            "{:>5} {:>4}:{:<3} {:<14} {:<12} {}",
            id.to_string(),
            node.symbol.position.line,
            node.symbol.position.column,
            node.kind.name(),
            format!("{:?}", node.symbol.lexeme),
            ty,
        );
    }
}

fn print_json(analysis: &Analysis, tree: &SyntaxTree, emit_types: bool) {
    let diagnostics: Vec<_> = analysis
        .diagnostics
        .iter()
        .map(|d| {
            json!({
                "description": d.description(),
                "lexeme": d.symbol.lexeme,
                "line": d.symbol.position.line,
                "column": d.symbol.position.column,
            })
        })
        .collect();

    let mut output = json!({
        "well_typed": analysis.is_well_typed(),
        "nodes": tree.len(),
        "diagnostics": diagnostics,
    });
    if emit_types {
        output["types"] = json!(analysis.types);
    }

    match serde_json::to_string_pretty(&output) {
        Ok(text) => println!("{}", text),
        Err(e) => {
            eprintln!("error: failed to serialize diagnostics: {}", e);
            process::exit(1);
        }
    }
}

fn print_diagnostic(diag: &Diagnostic, source: &str, file_name: &str) {
    let Some(start) = char_offset(source, diag.symbol.position) else {
        // The symbol lies outside the given text; fall back to the plain form.
        eprintln!("{}", diag);
        return;
    };
    let end = start + diag.symbol.lexeme.chars().count().max(1);
    let message = diag.description();

    let printed = Report::build(ReportKind::Error, file_name, start)
        .with_message(&message)
        .with_label(
            Label::new((file_name, start..end))
                .with_message(format!("on line {}", diag.line()))
                .with_color(Color::Red),
        )
        .finish()
        .eprint((file_name, Source::from(source)));
    if printed.is_err() {
        eprintln!("{}", diag);
    }
}

/// Character offset of a 1-based line/column position in `source`.
///
/// Columns past the end of their line are clamped to the line end.
fn char_offset(source: &str, position: Position) -> Option<usize> {
    let target = position.line.checked_sub(1)? as usize;
    let mut offset = 0;
    for (idx, line) in source.split_inclusive('\n').enumerate() {
        if idx == target {
            let width = line.trim_end_matches(['\n', '\r']).chars().count();
            let column = (position.column as usize).saturating_sub(1);
            return Some(offset + column.min(width));
        }
        offset += line.chars().count();
    }
    None
}
