//! SignalLang front-end driver.
//!
//! Reads a source file (or stdin), lowers it to TAC, runs dead code
//! elimination, and prints the results. Diagnostics never make the run fail;
//! only I/O problems produce a nonzero exit.

use clap::Parser;
use signalc::{
    compile, eliminate_dead_code, print_tac, FrontendError, Lexer, Reporter, SymbolTable,
    TokenKind,
};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "signalc",
    about = "SignalLang front end: lowers assignments to TAC and prunes dead code"
)]
struct Cli {
    /// Source file; reads stdin when omitted.
    input: Option<PathBuf>,

    /// Print the token stream before compiling.
    #[arg(long)]
    dump_tokens: bool,

    /// Print the final symbol table.
    #[arg(long)]
    dump_symbols: bool,

    /// Skip the dead code elimination pass.
    #[arg(long)]
    no_dce: bool,

    /// Also write the diagnostic summary to this file.
    #[arg(long)]
    errors_out: Option<PathBuf>,
}

fn read_source(input: &Option<PathBuf>) -> Result<String, FrontendError> {
    match input {
        Some(path) => std::fs::read_to_string(path).map_err(|source| FrontendError::Read {
            path: path.display().to_string(),
            source,
        }),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|source| FrontendError::Read {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            Ok(buffer)
        }
    }
}

fn dump_tokens(source: &str) {
    // Side flow mirroring the lexer demo: a throwaway reporter and symbol
    // table, so token placeholders show up in a dump without polluting the
    // main compilation.
    let reporter = Reporter::shared();
    let mut lexer = Lexer::new(reporter.clone());
    let mut sym = SymbolTable::new(reporter);
    let tokens = lexer.tokenize_with_symbols(source, &mut sym);

    println!("{:<12}{:<15}{:<8}{:<8}", "TOKEN", "LEXEME", "LINE", "COL");
    println!("{}", "-".repeat(45));
    for t in &tokens {
        println!("{:<12}{:<15}{:<8}{:<8}", t.kind.to_string(), t.lexeme, t.line, t.column);
        if t.kind == TokenKind::Eof {
            break;
        }
    }
    println!();
}

fn main() -> Result<(), FrontendError> {
    env_logger::init();
    let cli = Cli::parse();

    let source = read_source(&cli.input)?;

    if cli.dump_tokens {
        dump_tokens(&source);
    }

    let mut compilation = compile(&source);

    println!("=== TAC ===");
    print!("{}", print_tac(&compilation.tac));

    if !cli.no_dce {
        eliminate_dead_code(&mut compilation.tac, &compilation.symtab);
        println!("\n=== TAC (after DCE) ===");
        print!("{}", print_tac(&compilation.tac));
    }

    if cli.dump_symbols {
        println!();
        print!("{}", compilation.symtab.dump());
    }

    let reporter = compilation.reporter.borrow();
    if !reporter.all().is_empty() {
        println!();
        print!("{}", reporter.summary());
    }
    if let Some(path) = &cli.errors_out {
        reporter.save_to_file(path)?;
    }

    Ok(())
}
