//! Register assignment for a function's variables.
//!
//! Registers are numbered by walking the function's scope tree. Each scope
//! starts counting where its parent stopped, so variables in nested blocks
//! never collide with anything visible from an enclosing scope, while
//! sibling blocks reuse the same range.

use rustc_hash::FxHashMap;

use crate::model::SemanticModel;
use crate::scope::ScopeId;
use crate::symbols::SymbolId;

/// Register of every variable in one function.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterMap {
    registers: FxHashMap<SymbolId, u32>,
    /// One past the highest register used.
    local_count: u32,
}

impl RegisterMap {
    /// Number the variables declared in the function scope `scope` and
    /// every scope below it, starting from register 0.
    pub fn assign(model: &SemanticModel, scope: ScopeId) -> Self {
        let mut map = Self::default();
        map.visit(model, scope, 0);
        map
    }

    fn visit(&mut self, model: &SemanticModel, scope: ScopeId, base: u32) {
        let mut reg = base;
        for symbol in model.scopes.get(scope).symbols() {
            if model.symbols.var(symbol).is_some() {
                self.registers.insert(symbol, reg);
                reg += 1;
            }
        }
        self.local_count = self.local_count.max(reg);
        for &child in model.scopes.get(scope).children() {
            self.visit(model, child, reg);
        }
    }

    pub fn get(&self, symbol: SymbolId) -> Option<u32> {
        self.registers.get(&symbol).copied()
    }

    /// Size of the function's register space.
    pub fn local_count(&self) -> u32 {
        self.local_count
    }

    pub fn len(&self) -> usize {
        self.registers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registers.is_empty()
    }
}
