// This module implements the backward-liveness dead code pass over the flat TAC
// sequence. The live set is seeded from every named (non-temporary) destination the
// symbol table does not report as unused, then a single last-to-first scan keeps
// each instruction whose destination is live and propagates liveness into its
// operands. A single pass is sound because the sequence has no control flow and
// every instruction is pure. Liveness is tracked per name, never killed at a
// definition; see the note on eliminate_dead_code.

//! Dead code elimination over the TAC sequence.

use crate::symtab::SymbolTable;
use crate::tac::TacInst;
use std::collections::HashSet;

/// Drop every instruction whose result cannot reach an externally observable
/// name. Retained instructions keep their original relative order, and the
/// pass is idempotent on its own output.
///
/// Liveness here is per *name*, not per definition: the live set is never
/// killed at a defining instruction, so once a name is live from some later
/// use, every earlier definition of that name is kept, even one shadowed by
/// an intervening redefinition. This over-retention is a deliberate part of
/// the pass's contract and is covered by tests.
pub fn eliminate_dead_code(tac: &mut Vec<TacInst>, sym: &SymbolTable) {
    // Named destinations are the ones bound in the symbol table; temporaries
    // never appear there.
    let declared: HashSet<&str> = tac
        .iter()
        .filter(|inst| sym.lookup(&inst.dest).is_some())
        .map(|inst| inst.dest.as_str())
        .collect();

    let unused: HashSet<String> = sym
        .get_unused_entries()
        .into_iter()
        .map(|e| e.name)
        .collect();

    let mut live: HashSet<String> = declared
        .into_iter()
        .filter(|name| !unused.contains(*name))
        .map(str::to_string)
        .collect();

    let mut keep = vec![false; tac.len()];
    for (i, inst) in tac.iter().enumerate().rev() {
        if live.contains(&inst.dest) {
            keep[i] = true;
            for used in inst.uses() {
                live.insert(used.to_string());
            }
        }
    }

    let before = tac.len();
    let mut idx = 0;
    tac.retain(|_| {
        let k = keep[idx];
        idx += 1;
        k
    });
    log::debug!("dce kept {} of {before} instructions", tac.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::Reporter;
    use crate::symtab::{SymbolEntry, SymbolKind};
    use crate::tac::{TacInst, TacOp};

    fn table_with(entries: &[(&str, bool)]) -> SymbolTable {
        let mut sym = SymbolTable::new(Reporter::shared());
        for &(name, used) in entries {
            sym.insert(SymbolEntry::new(name, SymbolKind::Variable, "float", 0, 1));
            if used {
                sym.mark_used(name);
            }
        }
        sym
    }

    fn sample_chain() -> Vec<TacInst> {
        vec![
            TacInst::load_const("t0", "1.5"),
            TacInst::load_const("t1", "2.0"),
            TacInst::binary(TacOp::Add, "t2", "t0", "t1"),
            TacInst::assign("x", "t2"),
        ]
    }

    #[test]
    fn unused_destination_drops_the_whole_chain() {
        let sym = table_with(&[("x", false)]);
        let mut tac = sample_chain();
        eliminate_dead_code(&mut tac, &sym);
        assert!(tac.is_empty());
    }

    #[test]
    fn used_destination_keeps_the_whole_chain() {
        let sym = table_with(&[("x", true)]);
        let mut tac = sample_chain();
        eliminate_dead_code(&mut tac, &sym);
        assert_eq!(tac, sample_chain());
    }

    #[test]
    fn mixed_statements_drop_only_dead_chains() {
        let sym = table_with(&[("x", true), ("dead", false)]);
        let mut tac = vec![
            TacInst::load_const("t0", "1.0"),
            TacInst::assign("x", "t0"),
            TacInst::load_const("t1", "9.9"),
            TacInst::assign("dead", "t1"),
        ];
        eliminate_dead_code(&mut tac, &sym);
        assert_eq!(
            tac,
            vec![TacInst::load_const("t0", "1.0"), TacInst::assign("x", "t0")]
        );
    }

    #[test]
    fn never_grows_and_is_idempotent() {
        let sym = table_with(&[("x", true), ("dead", false)]);
        let mut tac = vec![
            TacInst::load_const("t0", "1.0"),
            TacInst::assign("dead", "t0"),
            TacInst::load_const("t1", "2.0"),
            TacInst::assign("x", "t1"),
        ];
        let before = tac.len();
        eliminate_dead_code(&mut tac, &sym);
        assert!(tac.len() <= before);

        let once = tac.clone();
        eliminate_dead_code(&mut tac, &sym);
        assert_eq!(tac, once);
    }

    #[test]
    fn per_name_liveness_retains_shadowed_definitions() {
        // x is redefined before any use reaches the first definition; the
        // pass keeps both because liveness is never killed at a definition.
        let sym = table_with(&[("x", true), ("y", true)]);
        let mut tac = vec![
            TacInst::load_const("t0", "1.0"),
            TacInst::assign("x", "t0"),
            TacInst::load_const("t1", "2.0"),
            TacInst::assign("x", "t1"),
            TacInst::assign("y", "x"),
        ];
        let all = tac.clone();
        eliminate_dead_code(&mut tac, &sym);
        assert_eq!(tac, all);
    }

    #[test]
    fn retained_instructions_keep_relative_order() {
        let sym = table_with(&[("a", true), ("b", true), ("dead", false)]);
        let mut tac = vec![
            TacInst::load_const("t0", "1.0"),
            TacInst::assign("a", "t0"),
            TacInst::load_const("t1", "5.0"),
            TacInst::assign("dead", "t1"),
            TacInst::binary(TacOp::Mul, "t2", "a", "a"),
            TacInst::assign("b", "t2"),
        ];
        eliminate_dead_code(&mut tac, &sym);
        assert_eq!(
            tac,
            vec![
                TacInst::load_const("t0", "1.0"),
                TacInst::assign("a", "t0"),
                TacInst::binary(TacOp::Mul, "t2", "a", "a"),
                TacInst::assign("b", "t2"),
            ]
        );
    }
}
