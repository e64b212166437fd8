//! Lexically scoped symbol table.
//!
//! Scopes form a tree: each [`Scope`] holds its bindings and a parent id.
//! Lookup walks the parent chain; updates act on the scope that owns the
//! name. Function invocations push a child of the function's *defining*
//! scope, so resolution is lexical rather than dynamic.
//!
//! The global scope always contains the pre-installed entries: the three
//! data types and the four built-in functions.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use viper_par::ast::FunctionNode;
use viper_util::symbol::{
    SYM_BOOL, SYM_INPUT_EXPR, SYM_INPUT_NUM, SYM_NUM, SYM_PRINT, SYM_STRING, SYM_SUM,
};
use viper_util::Symbol;

use crate::builtins::Builtin;
use crate::value::Value;

/// Index of a scope in the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(u32);

impl ScopeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a name is bound to. The variant is the entry's kind; reassignment
/// may replace a `Variable`'s payload but never an entry's kind.
#[derive(Clone, Debug, PartialEq)]
pub enum SymbolEntry {
    /// A pre-installed data type name (`num`, `bool`, `String`).
    DataType,
    /// A pre-installed built-in function.
    InbuiltFunc(Builtin),
    /// A user function, with the scope it was defined in.
    FuncDef { node: FunctionNode, scope: ScopeId },
    /// A declared variable and its current value.
    Variable(Value),
}

/// A single scope: bindings plus a parent link.
#[derive(Debug)]
pub struct Scope {
    bindings: FxHashMap<Symbol, SymbolEntry>,
    parent: Option<ScopeId>,
}

/// The pre-installed global entries, in their canonical order.
pub fn preinstalled() -> IndexMap<Symbol, SymbolEntry> {
    IndexMap::from_iter([
        (SYM_NUM, SymbolEntry::DataType),
        (SYM_BOOL, SymbolEntry::DataType),
        (SYM_STRING, SymbolEntry::DataType),
        (SYM_PRINT, SymbolEntry::InbuiltFunc(Builtin::Print)),
        (SYM_SUM, SymbolEntry::InbuiltFunc(Builtin::Sum)),
        (SYM_INPUT_EXPR, SymbolEntry::InbuiltFunc(Builtin::InputExpr)),
        (SYM_INPUT_NUM, SymbolEntry::InbuiltFunc(Builtin::InputNum)),
    ])
}

/// Arena of scopes with a current-scope cursor.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    current: ScopeId,
}

impl ScopeTree {
    /// A tree holding just the fresh global scope.
    pub fn new() -> Self {
        let global = Scope {
            bindings: preinstalled().into_iter().collect(),
            parent: None,
        };
        Self { scopes: vec![global], current: ScopeId(0) }
    }

    pub fn current(&self) -> ScopeId {
        self.current
    }

    /// Push a fresh scope under `parent` and make it current. Returns the
    /// new scope's id.
    pub fn push_scope(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope { bindings: FxHashMap::default(), parent: Some(parent) });
        self.current = id;
        id
    }

    /// Make `scope` current again (when unwinding from a call).
    pub fn pop_to(&mut self, scope: ScopeId) {
        self.current = scope;
    }

    /// Bind `name` in the current scope, shadowing any outer binding.
    pub fn insert(&mut self, name: Symbol, entry: SymbolEntry) {
        self.scopes[self.current.index()].bindings.insert(name, entry);
    }

    /// Resolve `name` from the current scope outward.
    pub fn resolve(&self, name: Symbol) -> Option<&SymbolEntry> {
        let mut id = self.current;
        loop {
            let scope = &self.scopes[id.index()];
            if let Some(entry) = scope.bindings.get(&name) {
                return Some(entry);
            }
            id = scope.parent?;
        }
    }

    pub fn contains(&self, name: Symbol) -> bool {
        self.resolve(name).is_some()
    }

    /// Replace the value of the `Variable` entry owning `name`, walking the
    /// parent chain to the owning scope. Returns false when the name is
    /// unbound or not a variable.
    pub fn update_variable(&mut self, name: Symbol, value: Value) -> bool {
        let mut id = self.current;
        loop {
            let scope_parent = self.scopes[id.index()].parent;
            if let Some(entry) = self.scopes[id.index()].bindings.get_mut(&name) {
                return match entry {
                    SymbolEntry::Variable(slot) => {
                        *slot = value;
                        true
                    }
                    _ => false,
                };
            }
            match scope_parent {
                Some(parent) => id = parent,
                None => return false,
            }
        }
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn globals_are_preinstalled() {
        let tree = ScopeTree::new();
        assert!(matches!(tree.resolve(SYM_NUM), Some(SymbolEntry::DataType)));
        assert!(matches!(
            tree.resolve(SYM_PRINT),
            Some(SymbolEntry::InbuiltFunc(Builtin::Print))
        ));
        assert!(tree.contains(SYM_INPUT_NUM));
    }

    #[test]
    fn preinstalled_order_is_stable() {
        let names: Vec<&str> = preinstalled().keys().map(|s| s.as_str()).collect();
        assert_eq!(
            names,
            vec!["num", "bool", "String", "print", "sum", "inputExpr", "inputNum"]
        );
    }

    #[test]
    fn lookup_walks_the_parent_chain() {
        let mut tree = ScopeTree::new();
        let x = Symbol::intern("x");
        tree.insert(x, SymbolEntry::Variable(Value::int(1)));

        let global = tree.current();
        tree.push_scope(global);
        assert!(matches!(tree.resolve(x), Some(SymbolEntry::Variable(_))));
    }

    #[test]
    fn child_bindings_shadow_without_leaking() {
        let mut tree = ScopeTree::new();
        let x = Symbol::intern("shadowed");
        tree.insert(x, SymbolEntry::Variable(Value::int(1)));

        let global = tree.current();
        tree.push_scope(global);
        tree.insert(x, SymbolEntry::Variable(Value::int(2)));
        assert_eq!(
            tree.resolve(x),
            Some(&SymbolEntry::Variable(Value::int(2)))
        );

        tree.pop_to(global);
        assert_eq!(
            tree.resolve(x),
            Some(&SymbolEntry::Variable(Value::int(1)))
        );
    }

    #[test]
    fn update_acts_on_the_owning_scope() {
        let mut tree = ScopeTree::new();
        let x = Symbol::intern("owned");
        tree.insert(x, SymbolEntry::Variable(Value::int(1)));

        let global = tree.current();
        tree.push_scope(global);
        assert!(tree.update_variable(x, Value::int(5)));

        tree.pop_to(global);
        assert_eq!(
            tree.resolve(x),
            Some(&SymbolEntry::Variable(Value::int(5)))
        );
    }

    #[test]
    fn update_refuses_non_variables() {
        let mut tree = ScopeTree::new();
        assert!(!tree.update_variable(SYM_PRINT, Value::int(1)));
        assert!(!tree.update_variable(Symbol::intern("missing"), Value::int(1)));
        // The kind is preserved.
        assert!(matches!(
            tree.resolve(SYM_PRINT),
            Some(SymbolEntry::InbuiltFunc(Builtin::Print))
        ));
    }
}
