//! Lexical scopes.
//!
//! Scopes form a tree rooted at the global scope. Each scope keeps its
//! bindings in insertion order; the code generator numbers a function's
//! variables by walking this tree, so the order is observable.

use std::fmt;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::symbols::SymbolId;

/// Handle to a scope in a [`ScopeTree`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
    /// The global scope.
    pub const ROOT: ScopeId = ScopeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeId({})", self.0)
    }
}

/// What introduced a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Types and functions.
    Global,
    /// A struct's fields.
    Struct,
    /// A function's parameters.
    Function,
    /// A `{ ... }` block.
    Block,
}

#[derive(Debug, Clone)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    children: Vec<ScopeId>,
    bindings: IndexMap<String, SymbolId, FxBuildHasher>,
}

impl Scope {
    fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Self {
            kind,
            parent,
            children: Vec::new(),
            bindings: IndexMap::with_hasher(FxBuildHasher),
        }
    }

    /// Child scopes in creation order.
    pub fn children(&self) -> &[ScopeId] {
        &self.children
    }

    /// Symbols bound directly in this scope, in insertion order.
    pub fn symbols(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.bindings.values().copied()
    }
}

/// Arena of every scope in a program.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// A tree holding only the global scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(ScopeKind::Global, None)],
        }
    }

    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    /// Open a new scope nested in `parent`.
    pub fn push(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(kind, Some(parent)));
        self.scopes[parent.index()].children.push(id);
        id
    }

    /// Bind `name` in `scope`. Returns the symbol it previously named
    /// there, leaving the old binding in place.
    pub fn bind(&mut self, scope: ScopeId, name: &str, symbol: SymbolId) -> Option<SymbolId> {
        let bindings = &mut self.scopes[scope.index()].bindings;
        if let Some(&existing) = bindings.get(name) {
            return Some(existing);
        }
        bindings.insert(name.to_string(), symbol);
        None
    }

    /// Look `name` up in `scope` only.
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.get(scope).bindings.get(name).copied()
    }

    /// Look `name` up in `scope` and then each enclosing scope.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(symbol) = self.lookup_local(id, name) {
                return Some(symbol);
            }
            current = self.get(id).parent;
        }
        None
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}
