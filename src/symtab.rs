// This module implements the scope-aware symbol table that backs the whole front end.
// Scopes form a stack of name->entry maps; frame 0 is the permanent global frame.
// Entries come into existence three ways: explicit insertion, speculative token
// placeholders minted when an identifier is first sighted, and auto-repaired dummies
// synthesized when an unbound name is read. Placeholders are promoted in place when
// an assignment target resolves to them. The is_used bookkeeping recorded here is
// what the dead code eliminator later consults.

//! Scoped symbol table with speculative placeholder entries.

use crate::diag::{Phase, Reporter};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::rc::Rc;

/// What a symbol table entry stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Constant,
    Function,
    Builtin,
    /// Speculative placeholder minted from a lexical sighting.
    Token,
}

impl SymbolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Variable => "variable",
            SymbolKind::Constant => "constant",
            SymbolKind::Function => "function",
            SymbolKind::Builtin => "builtin",
            SymbolKind::Token => "token",
        }
    }
}

/// One identifier binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEntry {
    pub name: String,
    pub kind: SymbolKind,
    /// Type tag: "float", "unknown", or a function signature.
    pub ty: String,
    /// Scope depth at creation; 0 is global. Immutable after insertion.
    pub scope_level: usize,
    /// Symbolic slot id, assigned lazily at insertion from one shared counter.
    pub addr: Option<String>,
    /// Initial literal value, if any.
    pub value: Option<String>,
    pub is_state: bool,
    pub is_used: bool,
    /// Source line of the declaration, -1 if synthesized.
    pub decl_line: i32,
    /// True for placeholder entries awaiting promotion.
    pub is_dummy: bool,
}

impl SymbolEntry {
    pub fn new(
        name: impl Into<String>,
        kind: SymbolKind,
        ty: impl Into<String>,
        scope_level: usize,
        decl_line: i32,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            ty: ty.into(),
            scope_level,
            addr: None,
            value: None,
            is_state: false,
            is_used: false,
            decl_line,
            is_dummy: false,
        }
    }

    /// Placeholder -> concrete transition. Clears `is_dummy` exactly once;
    /// scope and address are untouched.
    fn promote(&mut self, kind: SymbolKind, ty: impl Into<String>, decl_line: i32) {
        debug_assert!(self.is_dummy, "promote called on a concrete entry");
        self.kind = kind;
        self.ty = ty.into();
        self.decl_line = decl_line;
        self.is_dummy = false;
    }
}

/// Explicit field-level patch applied by [`SymbolTable::update_entry`].
///
/// Promotion state is deliberately not patchable; it only changes through
/// [`SymbolTable::promote_placeholder`].
#[derive(Debug, Clone, Default)]
pub struct SymbolPatch {
    pub kind: Option<SymbolKind>,
    pub ty: Option<String>,
    pub value: Option<String>,
    pub is_state: Option<bool>,
    pub decl_line: Option<i32>,
}

/// Stack of nested scopes, each an independent name->entry map.
pub struct SymbolTable {
    scopes: Vec<HashMap<String, SymbolEntry>>,
    next_addr_index: usize,
    reporter: Rc<RefCell<Reporter>>,
}

impl SymbolTable {
    pub fn new(reporter: Rc<RefCell<Reporter>>) -> Self {
        Self {
            scopes: vec![HashMap::new()],
            next_addr_index: 0,
            reporter,
        }
    }

    /// Push a fresh scope frame.
    pub fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pop the innermost frame. The global frame is permanent, so popping
    /// at depth 0 is a no-op.
    pub fn end_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Current scope depth; 0 is global.
    pub fn current_scope(&self) -> usize {
        self.scopes.len() - 1
    }

    // Addresses are symbolic only: globals and state variables get a fake
    // hex slot, everything else a stack slot. One counter serves all kinds.
    fn assign_addr(&mut self, entry: &mut SymbolEntry) {
        if entry.addr.is_some() {
            return;
        }
        let idx = self.next_addr_index;
        self.next_addr_index += 1;
        let global_like = entry.kind == SymbolKind::Variable
            && (entry.is_state || entry.scope_level == 0);
        entry.addr = Some(if global_like {
            format!("0x{:x}", 0x1000 + idx)
        } else {
            format!("stk{idx}")
        });
    }

    /// Add an entry to the innermost frame. Fails, with a DuplicateDeclaration
    /// diagnostic citing the original, iff the name already exists in that
    /// frame. Shadowing an outer-scope name is always permitted.
    pub fn insert(&mut self, entry: SymbolEntry) -> bool {
        let level = self.current_scope();
        if let Some(existing) = self.scopes[level].get(&entry.name) {
            let message = format!(
                "Duplicate declaration of '{}'; previously declared at line {}",
                entry.name, existing.decl_line
            );
            let line = (entry.decl_line >= 0).then_some(entry.decl_line);
            self.reporter.borrow_mut().error(Phase::Semantic, message, line, None);
            return false;
        }

        let mut entry = entry;
        entry.scope_level = level;
        self.assign_addr(&mut entry);
        self.scopes[level].insert(entry.name.clone(), entry);
        true
    }

    /// Insert a dummy Token entry for a sighted identifier. Silently refuses
    /// when the name already exists in the current scope; placeholder
    /// creation must never produce duplicate diagnostics.
    pub fn insert_token_placeholder(&mut self, name: &str, line: i32) -> bool {
        if self.exists_in_current_scope(name) {
            return false;
        }
        let mut entry =
            SymbolEntry::new(name, SymbolKind::Token, "unknown", self.current_scope(), line);
        entry.is_dummy = true;
        self.insert(entry)
    }

    /// Innermost-to-outermost scan; first match wins.
    pub fn lookup(&self, name: &str) -> Option<&SymbolEntry> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn lookup_mut(&mut self, name: &str) -> Option<&mut SymbolEntry> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
    }

    /// Innermost frame only.
    pub fn lookup_local(&self, name: &str) -> Option<&SymbolEntry> {
        self.scopes.last().and_then(|scope| scope.get(name))
    }

    pub fn exists_in_current_scope(&self, name: &str) -> bool {
        self.lookup_local(name).is_some()
    }

    /// Record a reference to `name`. An unbound name is diagnosed once and
    /// repaired with a used dummy in the global frame, so the same name never
    /// re-triggers the diagnostic.
    pub fn mark_used(&mut self, name: &str) {
        if let Some(entry) = self.lookup_mut(name) {
            entry.is_used = true;
            return;
        }

        self.reporter.borrow_mut().error(
            Phase::Semantic,
            format!("Undeclared Identifier '{name}' used"),
            None,
            None,
        );
        let mut dummy = SymbolEntry::new(name, SymbolKind::Variable, "unknown", 0, -1);
        dummy.is_dummy = true;
        dummy.is_used = true;
        // Straight into the global frame, bypassing insert: no duplicate
        // check applies and no address is assigned.
        self.scopes[0].insert(name.to_string(), dummy);
    }

    /// Promote the placeholder bound to `name` into a concrete float
    /// variable declared at `decl_line`. Returns false when no dummy entry
    /// is reachable; a concrete entry is left untouched.
    pub fn promote_placeholder(&mut self, name: &str, decl_line: i32) -> bool {
        match self.lookup_mut(name) {
            Some(entry) if entry.is_dummy => {
                entry.promote(SymbolKind::Variable, "float", decl_line);
                true
            }
            _ => false,
        }
    }

    /// Apply a field-level patch to `name` in the current scope. When the
    /// name is absent a default variable entry is inserted first, subject to
    /// the usual insertion rules; failure of that implicit insert is the only
    /// failure mode.
    pub fn update_entry(&mut self, name: &str, patch: SymbolPatch) -> bool {
        if !self.exists_in_current_scope(name) {
            let entry =
                SymbolEntry::new(name, SymbolKind::Variable, "unknown", self.current_scope(), -1);
            if !self.insert(entry) {
                return false;
            }
        }
        let level = self.current_scope();
        let Some(entry) = self.scopes[level].get_mut(name) else {
            return false;
        };
        if let Some(kind) = patch.kind {
            entry.kind = kind;
        }
        if let Some(ty) = patch.ty {
            entry.ty = ty;
        }
        if let Some(value) = patch.value {
            entry.value = Some(value);
        }
        if let Some(is_state) = patch.is_state {
            entry.is_state = is_state;
        }
        if let Some(line) = patch.decl_line {
            entry.decl_line = line;
        }
        true
    }

    /// Every entry never marked used, innermost scopes first.
    pub fn get_unused_entries(&self) -> Vec<SymbolEntry> {
        let mut res = Vec::new();
        for scope in self.scopes.iter().rev() {
            res.extend(scope.values().filter(|e| !e.is_used).cloned());
        }
        res
    }

    /// Full textual render of every scope frame.
    pub fn dump(&self) -> String {
        let mut out = String::from("=== Symbol Table Dump ===\n");
        for (level, scope) in self.scopes.iter().enumerate() {
            let _ = writeln!(out, "Scope level {level}:");
            for entry in scope.values() {
                let _ = write!(
                    out,
                    "  name='{}' kind='{}' type='{}' addr='{}' scope={} decl_line={} is_state={} is_used={}",
                    entry.name,
                    entry.kind.as_str(),
                    entry.ty,
                    entry.addr.as_deref().unwrap_or(""),
                    entry.scope_level,
                    entry.decl_line,
                    if entry.is_state { "yes" } else { "no" },
                    if entry.is_used { "yes" } else { "no" },
                );
                if entry.is_dummy {
                    out.push_str(" [DUMMY]");
                }
                if let Some(value) = &entry.value {
                    let _ = write!(out, " value='{value}'");
                }
                out.push('\n');
            }
        }
        out.push_str("=========================\n");
        out
    }

    /// Full reset: one empty global frame, address counter back to zero.
    pub fn clear(&mut self) {
        self.scopes.clear();
        self.scopes.push(HashMap::new());
        self.next_addr_index = 0;
    }
}
