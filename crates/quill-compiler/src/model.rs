//! Results of semantic analysis.
//!
//! The AST is never written to. Everything the passes learn about a node
//! is stored in [`Decorations`], keyed by the node's [`NodeId`].
//!
//! The two pass outputs are distinct types. [`DeclaredModel`] can only be
//! produced by the declaration pass and [`CheckedModel`] only by the type
//! checker consuming a `DeclaredModel`, so nothing downstream can observe a
//! half-analyzed program.

use std::ops::Deref;

use quill_parser::ast::NodeId;
use rustc_hash::FxHashMap;

use crate::scope::{ScopeId, ScopeTree};
use crate::symbols::{SymbolId, SymbolTable};
use crate::types::{TypeDictionary, TypeId};

/// Per-node side tables.
#[derive(Debug, Clone, Default)]
pub struct Decorations {
    /// Scope opened by a struct, function or block.
    scopes: FxHashMap<NodeId, ScopeId>,
    /// Symbol declared by a declaration node, or resolved by a name.
    symbols: FxHashMap<NodeId, SymbolId>,
    /// Type of every expression and type expression.
    types: FxHashMap<NodeId, TypeId>,
    /// Struct type a `new` field initializer writes into.
    init_owners: FxHashMap<NodeId, TypeId>,
}

impl Decorations {
    pub fn scope(&self, node: NodeId) -> Option<ScopeId> {
        self.scopes.get(&node).copied()
    }

    pub fn symbol(&self, node: NodeId) -> Option<SymbolId> {
        self.symbols.get(&node).copied()
    }

    pub fn type_of(&self, node: NodeId) -> Option<TypeId> {
        self.types.get(&node).copied()
    }

    pub fn init_owner(&self, node: NodeId) -> Option<TypeId> {
        self.init_owners.get(&node).copied()
    }

    pub(crate) fn set_scope(&mut self, node: NodeId, scope: ScopeId) {
        self.scopes.insert(node, scope);
    }

    pub(crate) fn set_symbol(&mut self, node: NodeId, symbol: SymbolId) {
        self.symbols.insert(node, symbol);
    }

    pub(crate) fn set_type(&mut self, node: NodeId, ty: TypeId) {
        self.types.insert(node, ty);
    }

    pub(crate) fn set_init_owner(&mut self, node: NodeId, ty: TypeId) {
        self.init_owners.insert(node, ty);
    }
}

/// Everything known about an analyzed program.
#[derive(Debug, Clone)]
pub struct SemanticModel {
    pub types: TypeDictionary,
    pub symbols: SymbolTable,
    pub scopes: ScopeTree,
    pub decorations: Decorations,
    /// Function symbols in declaration order.
    pub functions: Vec<SymbolId>,
}

impl SemanticModel {
    pub(crate) fn new() -> Self {
        Self {
            types: TypeDictionary::new(),
            symbols: SymbolTable::new(),
            scopes: ScopeTree::new(),
            decorations: Decorations::default(),
            functions: Vec::new(),
        }
    }

    /// The symbol bound to `name` in the global scope.
    pub fn global(&self, name: &str) -> Option<SymbolId> {
        self.scopes.lookup_local(ScopeId::ROOT, name)
    }

    /// `describe()` of the type of the global called `name`.
    pub fn describe_global(&self, name: &str) -> Option<String> {
        self.global(name)
            .map(|id| self.types.describe(self.symbols.get(id).ty()))
    }
}

/// Output of the declaration pass: every struct and function signature is
/// known, local variables of `var x = e` form are still untyped.
#[derive(Debug, Clone)]
pub struct DeclaredModel(SemanticModel);

impl DeclaredModel {
    pub(crate) fn new(model: SemanticModel) -> Self {
        Self(model)
    }

    pub(crate) fn into_inner(self) -> SemanticModel {
        self.0
    }
}

impl Deref for DeclaredModel {
    type Target = SemanticModel;

    fn deref(&self) -> &SemanticModel {
        &self.0
    }
}

/// Output of the type checker: every expression has a type and every
/// variable a concrete type.
#[derive(Debug, Clone)]
pub struct CheckedModel(SemanticModel);

impl CheckedModel {
    pub(crate) fn new(model: SemanticModel) -> Self {
        Self(model)
    }

    pub(crate) fn symbols_mut(&mut self) -> &mut SymbolTable {
        &mut self.0.symbols
    }
}

impl Deref for CheckedModel {
    type Target = SemanticModel;

    fn deref(&self) -> &SemanticModel {
        &self.0
    }
}
