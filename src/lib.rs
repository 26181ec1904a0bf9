//! signalc - SignalLang compiler front end.
//!
//! Lowers straight-line arithmetic-assignment source text to a flat
//! three-address-code sequence and removes instructions whose results are
//! provably unobservable.
//!
//! # Primary Usage
//!
//! ```
//! use signalc::{compile, eliminate_dead_code, print_tac};
//!
//! let mut compilation = compile("x = 1.5 + 2.0;\ny = x * 2.0;");
//! eliminate_dead_code(&mut compilation.tac, &compilation.symtab);
//! println!("{}", print_tac(&compilation.tac));
//! ```
//!
//! # Architecture
//!
//! - [`lexer`] - Streaming tokenizer with line/column tracking
//! - [`symtab`] - Scope-aware symbol table with placeholder promotion
//! - [`tac`] - TAC data model, generator, and dead code eliminator
//! - [`diag`] - Fire-and-forget diagnostic collection

pub mod diag;
pub mod lexer;
pub mod symtab;
pub mod tac;

pub use diag::{Diagnostic, FrontendError, Phase, Reporter, Severity};
pub use lexer::{Lexer, Token, TokenKind};
pub use symtab::{SymbolEntry, SymbolKind, SymbolPatch, SymbolTable};
pub use tac::{eliminate_dead_code, print_tac, TacGenerator, TacInst, TacOp};

use std::cell::RefCell;
use std::rc::Rc;

/// Everything a front-end run produces. Diagnostics live behind the shared
/// reporter handle that all phases wrote through.
pub struct Compilation {
    pub tac: Vec<TacInst>,
    pub symtab: SymbolTable,
    pub reporter: Rc<RefCell<Reporter>>,
}

/// Run lexing and TAC generation over `source`. Never fails; whatever went
/// wrong is recorded in the returned reporter.
pub fn compile(source: &str) -> Compilation {
    let reporter = Reporter::shared();
    let mut lexer = Lexer::new(reporter.clone());
    lexer.set_source(source);
    let mut symtab = SymbolTable::new(reporter.clone());
    let mut tac = Vec::new();
    TacGenerator::new(&mut lexer, &mut symtab, reporter.clone()).generate(&mut tac);
    Compilation {
        tac,
        symtab,
        reporter,
    }
}
