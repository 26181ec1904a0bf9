//! Three-address-code representation.
//!
//! The IR is one flat instruction sequence; the grammar has no control flow,
//! so there are no blocks and no jumps. Every instruction is pure: it binds
//! its own destination and does nothing else, which is the property the dead
//! code eliminator's backward pass relies on.

use std::fmt;

pub mod dce;
pub mod generator;

pub use dce::eliminate_dead_code;
pub use generator::TacGenerator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TacOp {
    /// dest = literal
    LoadConst,
    /// dest = arg1
    Assign,
    Add,
    Sub,
    Mul,
    Div,
}

impl TacOp {
    fn symbol(self) -> &'static str {
        match self {
            TacOp::Add => "+",
            TacOp::Sub => "-",
            TacOp::Mul => "*",
            TacOp::Div => "/",
            TacOp::LoadConst | TacOp::Assign => "",
        }
    }
}

/// One TAC instruction: an opcode, a destination name, up to two operand
/// names, and (LoadConst only) the unparsed literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TacInst {
    pub op: TacOp,
    pub dest: String,
    pub arg1: Option<String>,
    pub arg2: Option<String>,
    pub literal: Option<String>,
}

impl TacInst {
    pub fn load_const(dest: impl Into<String>, literal: impl Into<String>) -> Self {
        Self {
            op: TacOp::LoadConst,
            dest: dest.into(),
            arg1: None,
            arg2: None,
            literal: Some(literal.into()),
        }
    }

    pub fn assign(dest: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            op: TacOp::Assign,
            dest: dest.into(),
            arg1: Some(src.into()),
            arg2: None,
            literal: None,
        }
    }

    pub fn binary(
        op: TacOp,
        dest: impl Into<String>,
        a: impl Into<String>,
        b: impl Into<String>,
    ) -> Self {
        debug_assert!(matches!(op, TacOp::Add | TacOp::Sub | TacOp::Mul | TacOp::Div));
        Self {
            op,
            dest: dest.into(),
            arg1: Some(a.into()),
            arg2: Some(b.into()),
            literal: None,
        }
    }

    /// Names this instruction reads.
    pub fn uses(&self) -> impl Iterator<Item = &str> {
        let (a, b) = match self.op {
            TacOp::LoadConst => (None, None),
            TacOp::Assign => (self.arg1.as_deref(), None),
            _ => (self.arg1.as_deref(), self.arg2.as_deref()),
        };
        a.into_iter().chain(b)
    }
}

impl fmt::Display for TacInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            TacOp::LoadConst => {
                write!(f, "{} = {}", self.dest, self.literal.as_deref().unwrap_or(""))
            }
            TacOp::Assign => {
                write!(f, "{} = {}", self.dest, self.arg1.as_deref().unwrap_or(""))
            }
            _ => write!(
                f,
                "{} = {} {} {}",
                self.dest,
                self.arg1.as_deref().unwrap_or(""),
                self.op.symbol(),
                self.arg2.as_deref().unwrap_or(""),
            ),
        }
    }
}

/// Render the whole sequence with instruction indices, one per line.
pub fn print_tac(tac: &[TacInst]) -> String {
    let mut out = String::new();
    for (i, inst) in tac.iter().enumerate() {
        out.push_str(&format!("{i}:\t{inst}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(TacInst::load_const("t0", "1.5").to_string(), "t0 = 1.5");
        assert_eq!(TacInst::assign("x", "t0").to_string(), "x = t0");
        assert_eq!(
            TacInst::binary(TacOp::Mul, "t1", "a", "b").to_string(),
            "t1 = a * b"
        );
    }

    #[test]
    fn uses_per_opcode() {
        let load_inst = TacInst::load_const("t0", "1.0");
        let load: Vec<&str> = load_inst.uses().collect();
        assert!(load.is_empty());

        let assign_inst = TacInst::assign("x", "t0");
        let assign: Vec<&str> = assign_inst.uses().collect();
        assert_eq!(assign, vec!["t0"]);

        let add_inst = TacInst::binary(TacOp::Add, "t2", "t0", "t1");
        let add: Vec<&str> = add_inst.uses().collect();
        assert_eq!(add, vec!["t0", "t1"]);
    }

    #[test]
    fn print_indexes_each_line() {
        let tac = vec![TacInst::load_const("t0", "2.0"), TacInst::assign("x", "t0")];
        assert_eq!(print_tac(&tac), "0:\tt0 = 2.0\n1:\tx = t0\n");
    }
}
