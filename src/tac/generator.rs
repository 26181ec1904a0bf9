// This module implements the three-address-code generator, a single-pass
// recursive-descent lowering of the assignment grammar with one token of
// lookahead. It owns the temporary-id counter and the LIFO reclaim pool, both
// of which persist for the whole generation run. Syntax and semantic problems
// go to the shared Reporter; the generator recovers at the next statement
// boundary and never propagates failure to its caller.

//! Lowering of SignalLang statements to TAC.
//!
//! Grammar driven to completion:
//!
//! ```text
//! program := stmt* EOF
//! stmt    := IDENT '=' expr ';'
//! expr    := term (('+'|'-') term)*
//! term    := factor (('*'|'/') factor)*
//! factor  := IDENT | NUMBER
//! ```

use crate::diag::{Phase, Reporter};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::symtab::{SymbolEntry, SymbolKind, SymbolTable};
use crate::tac::{TacInst, TacOp};
use std::cell::RefCell;
use std::rc::Rc;

/// A value-holding name produced by expression lowering. Reclaim eligibility
/// is decided by provenance, never by name prefix: a user variable that
/// happens to be called `t0` is not a temporary.
struct Operand {
    name: String,
    is_temp: bool,
}

pub struct TacGenerator<'a> {
    lexer: &'a mut Lexer,
    sym: &'a mut SymbolTable,
    reporter: Rc<RefCell<Reporter>>,
    cur: Token,
    temp_counter: u32,
    free_temps: Vec<String>,
}

impl<'a> TacGenerator<'a> {
    /// Primes the one-token lookahead, so the lexer must already have its
    /// source installed.
    pub fn new(
        lexer: &'a mut Lexer,
        sym: &'a mut SymbolTable,
        reporter: Rc<RefCell<Reporter>>,
    ) -> Self {
        let mut gen = Self {
            lexer,
            sym,
            reporter,
            cur: Token {
                kind: TokenKind::Eof,
                lexeme: String::new(),
                line: 0,
                column: 0,
            },
            temp_counter: 0,
            free_temps: Vec::new(),
        };
        gen.advance();
        gen
    }

    fn advance(&mut self) {
        self.cur = self.lexer.next_token();
    }

    fn syntax_error(&mut self, message: impl Into<String>) {
        self.reporter.borrow_mut().error(
            Phase::Syntax,
            message,
            Some(self.cur.line),
            Some(self.cur.column),
        );
    }

    fn new_temp(&mut self) -> String {
        if let Some(t) = self.free_temps.pop() {
            return t;
        }
        let t = format!("t{}", self.temp_counter);
        self.temp_counter += 1;
        t
    }

    fn release(&mut self, operand: Operand) {
        if operand.is_temp {
            self.free_temps.push(operand.name);
        }
    }

    /// Drive the program to completion, appending instructions to `out`.
    /// Never fails: problems are reported and recovery skips to the next
    /// statement terminator, leaving already-emitted instructions intact.
    pub fn generate(&mut self, out: &mut Vec<TacInst>) {
        while self.cur.kind != TokenKind::Eof {
            if !self.parse_statement(out) {
                self.syntax_error("Skipping to next ';' on parse error");
                while self.cur.kind != TokenKind::Semicolon && self.cur.kind != TokenKind::Eof {
                    self.advance();
                }
                if self.cur.kind == TokenKind::Semicolon {
                    self.advance();
                }
            }
        }
        log::debug!(
            "generation finished: {} instructions, {} temps minted",
            out.len(),
            self.temp_counter
        );
    }

    fn parse_statement(&mut self, out: &mut Vec<TacInst>) -> bool {
        if self.cur.kind != TokenKind::Ident {
            self.syntax_error("Expected identifier at start of statement");
            return false;
        }
        let lhs = self.cur.lexeme.clone();
        let lhs_line = self.cur.line;
        self.advance();

        if self.cur.kind != TokenKind::Assign {
            self.syntax_error("Expected '=' after identifier");
            return false;
        }
        self.advance();

        let Some(rhs) = self.parse_expression(out) else {
            self.syntax_error("Invalid expression in assignment");
            return false;
        };

        if self.cur.kind != TokenKind::Semicolon {
            self.syntax_error("Missing semicolon at end of statement");
            return false;
        }
        self.advance();

        // Assignment target: promote an existing dummy in place, declare a
        // fresh variable when the name is unbound, and leave a concrete
        // entry alone (re-assignment, not re-declaration).
        let binding = self.sym.lookup(&lhs).map(|entry| entry.is_dummy);
        match binding {
            Some(true) => {
                self.sym.promote_placeholder(&lhs, lhs_line);
            }
            Some(false) => {}
            None => {
                let entry = SymbolEntry::new(
                    &lhs,
                    SymbolKind::Variable,
                    "float",
                    self.sym.current_scope(),
                    lhs_line,
                );
                self.sym.insert(entry);
            }
        }

        out.push(TacInst::assign(&lhs, rhs.name));
        // Assignment counts as a reference.
        self.sym.mark_used(&lhs);
        log::trace!("lowered statement assigning '{lhs}' at line {lhs_line}");
        true
    }

    fn parse_expression(&mut self, out: &mut Vec<TacInst>) -> Option<Operand> {
        let mut left = self.parse_term(out)?;

        while matches!(self.cur.kind, TokenKind::Plus | TokenKind::Minus) {
            let op = if self.cur.kind == TokenKind::Plus {
                TacOp::Add
            } else {
                TacOp::Sub
            };
            self.advance();
            let Some(right) = self.parse_term(out) else {
                self.syntax_error("Missing term after operator");
                return None;
            };
            left = self.fold(out, op, left, right);
        }
        Some(left)
    }

    fn parse_term(&mut self, out: &mut Vec<TacInst>) -> Option<Operand> {
        let mut left = self.parse_factor(out)?;

        while matches!(self.cur.kind, TokenKind::Star | TokenKind::Slash) {
            let op = if self.cur.kind == TokenKind::Star {
                TacOp::Mul
            } else {
                TacOp::Div
            };
            self.advance();
            let Some(right) = self.parse_factor(out) else {
                self.syntax_error("Missing factor after operator");
                return None;
            };
            left = self.fold(out, op, left, right);
        }
        Some(left)
    }

    // One left-associative application: emit into a fresh temporary and
    // return consumed temporaries to the pool, left before right.
    fn fold(&mut self, out: &mut Vec<TacInst>, op: TacOp, left: Operand, right: Operand) -> Operand {
        let dest = self.new_temp();
        out.push(TacInst::binary(op, &dest, &left.name, &right.name));
        self.release(left);
        self.release(right);
        Operand {
            name: dest,
            is_temp: true,
        }
    }

    fn parse_factor(&mut self, out: &mut Vec<TacInst>) -> Option<Operand> {
        match self.cur.kind {
            TokenKind::Ident => {
                let name = self.cur.lexeme.clone();
                self.sym.mark_used(&name);
                self.advance();
                Some(Operand {
                    name,
                    is_temp: false,
                })
            }
            TokenKind::FloatLit => {
                let literal = self.cur.lexeme.clone();
                let dest = self.new_temp();
                out.push(TacInst::load_const(&dest, literal));
                self.advance();
                Some(Operand {
                    name: dest,
                    is_temp: true,
                })
            }
            _ => {
                self.syntax_error("Expected identifier or float literal");
                None
            }
        }
    }
}
