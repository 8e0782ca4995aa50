//! Declaration Pass (Pass 1) - define struct types and function signatures.
//!
//! Walks the whole program once, in source order:
//!
//! - structs get a type and a field scope; fields are appended in
//!   declaration order and the struct is sealed when the walk leaves it
//! - functions get a type and a symbol *before* their parameters are
//!   visited, so bodies may call the function recursively
//! - blocks get a scope; `var x = e` locals are bound with type `$Any`
//!   and `var x: T` locals with their declared type
//! - every type expression, including those inside `new`, is resolved
//!
//! A name in type position that is not bound yet creates a pending struct,
//! which is what makes self-referential and mutually recursive structs work.

use quill_core::{CompilationError, DeclKind};
use quill_parser::ast::{
    Block, Expr, FuncDecl, Ident, Item, NewExpr, NewInit, Program, Stmt, StructDecl, TypeExpr,
    TypeExprKind, VarDecl, VarStmt,
};
use tracing::{debug, trace};

use crate::model::{DeclaredModel, SemanticModel};
use crate::scope::{ScopeId, ScopeKind};
use crate::symbols::{FunctionSymbol, Symbol, SymbolId, TypeSymbol, VarKind, VarSymbol};
use crate::types::{FunctionType, Param, Type, TypeId};

/// Pass 1: declare every struct, function and variable.
pub struct DeclarationPass {
    model: SemanticModel,
}

impl Default for DeclarationPass {
    fn default() -> Self {
        Self::new()
    }
}

impl DeclarationPass {
    /// A pass over a fresh model whose global scope binds `Int`.
    pub fn new() -> Self {
        let mut model = SemanticModel::new();
        let int = model.symbols.alloc(Symbol::Type(TypeSymbol {
            name: "Int".to_string(),
            ty: TypeId::INT,
        }));
        model.scopes.bind(ScopeId::ROOT, "Int", int);
        Self { model }
    }

    /// Run the pass over `program`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(mut self, program: &Program<'_>) -> Result<DeclaredModel, CompilationError> {
        for item in program.items() {
            match item {
                Item::Struct(decl) => self.visit_struct(decl)?,
                Item::Func(decl) => self.visit_function(decl)?,
            }
        }
        debug!(
            types = self.model.types.len(),
            symbols = self.model.symbols.len(),
            "declaration pass complete"
        );
        Ok(DeclaredModel::new(self.model))
    }

    // ==========================================================================
    // Structs
    // ==========================================================================

    fn visit_struct(&mut self, decl: &StructDecl<'_>) -> Result<(), CompilationError> {
        let name = decl.name.name;
        let (symbol, ty) = match self.model.global(name) {
            Some(existing) => match self.model.symbols.get(existing) {
                Symbol::Type(s)
                    if self
                        .model
                        .types
                        .get(s.ty)
                        .as_struct()
                        .is_some_and(|st| st.is_pending()) =>
                {
                    (existing, s.ty)
                }
                _ => return Err(duplicate(DeclKind::Struct, decl.name)),
            },
            None => {
                let ty = self.model.types.intern_struct(name, decl.name.span)?;
                (self.bind_type(name, ty), ty)
            }
        };

        let scope = self.model.scopes.push(ScopeId::ROOT, ScopeKind::Struct);
        self.model.decorations.set_symbol(decl.id, symbol);
        self.model.decorations.set_scope(decl.id, scope);

        for field in decl.fields {
            if self.model.scopes.lookup_local(scope, field.name.name).is_some() {
                return Err(duplicate(DeclKind::Field, field.name));
            }
            let field_ty = self.resolve_type(field.ty)?;
            self.declare_var(scope, field, field_ty, VarKind::Field);
            self.model
                .types
                .add_field(ty, field.name.name, field_ty, field.name.span)?;
        }
        self.model.types.complete_struct(ty);

        debug!(name, fields = decl.fields.len(), "declared struct");
        Ok(())
    }

    // ==========================================================================
    // Functions
    // ==========================================================================

    fn visit_function(&mut self, decl: &FuncDecl<'_>) -> Result<(), CompilationError> {
        let name = decl.name.name;
        if self.model.global(name).is_some() {
            return Err(duplicate(DeclKind::Function, decl.name));
        }

        let ty = self
            .model
            .types
            .intern(Type::Function(FunctionType::new(name)), decl.name.span)?;
        let scope = self.model.scopes.push(ScopeId::ROOT, ScopeKind::Function);
        let symbol = self.model.symbols.alloc(Symbol::Function(FunctionSymbol {
            name: name.to_string(),
            ty,
            decl: decl.id,
            scope,
            code: None,
        }));
        self.model.scopes.bind(ScopeId::ROOT, name, symbol);
        self.model.decorations.set_symbol(decl.id, symbol);
        self.model.decorations.set_scope(decl.id, scope);
        self.model.functions.push(symbol);

        for param in decl.params {
            let param_ty = self.resolve_type(param.ty)?;
            if self.model.scopes.lookup_local(scope, param.name.name).is_some() {
                return Err(duplicate(DeclKind::Parameter, param.name));
            }
            let param_symbol = self.declare_var(scope, param, param_ty, VarKind::Param);
            self.model.types.add_param(
                ty,
                Param {
                    name: param.name.name.to_string(),
                    ty: param_ty,
                    symbol: param_symbol,
                },
            );
        }

        let return_type = match decl.return_type {
            Some(ret) => self.resolve_type(ret)?,
            None => TypeId::VOID,
        };
        self.model.types.set_return_type(ty, return_type);

        self.visit_block(decl.body, scope)?;

        debug!(signature = %self.model.types.describe(ty), "declared function");
        Ok(())
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    fn visit_block(&mut self, block: &Block<'_>, parent: ScopeId) -> Result<(), CompilationError> {
        let scope = self.model.scopes.push(parent, ScopeKind::Block);
        self.model.decorations.set_scope(block.id, scope);
        for stmt in block.stmts {
            self.visit_stmt(stmt, scope)?;
        }
        Ok(())
    }

    fn visit_stmt(&mut self, stmt: &Stmt<'_>, scope: ScopeId) -> Result<(), CompilationError> {
        match stmt {
            Stmt::Block(block) => self.visit_block(block, scope),
            Stmt::Var(var) => self.visit_var(var, scope),
            Stmt::VarDecl(decl) => {
                let ty = self.resolve_type(decl.ty)?;
                if self.model.scopes.lookup_local(scope, decl.name.name).is_some() {
                    return Err(duplicate(DeclKind::Variable, decl.name));
                }
                self.declare_var(scope, decl, ty, VarKind::Local);
                Ok(())
            }
            Stmt::If(stmt) => {
                self.visit_expr(stmt.condition)?;
                self.visit_stmt(stmt.then_branch, scope)?;
                if let Some(else_branch) = stmt.else_branch {
                    self.visit_stmt(else_branch, scope)?;
                }
                Ok(())
            }
            Stmt::While(stmt) => {
                self.visit_expr(stmt.condition)?;
                self.visit_stmt(stmt.body, scope)
            }
            Stmt::Return(ret) => match ret.value {
                Some(value) => self.visit_expr(value),
                None => Ok(()),
            },
            Stmt::Assign(assign) => {
                self.visit_expr(assign.target)?;
                self.visit_expr(assign.value)
            }
            Stmt::Expr(stmt) => self.visit_expr(stmt.expr),
            Stmt::Break(_) | Stmt::Continue(_) => Ok(()),
        }
    }

    fn visit_var(&mut self, var: &VarStmt<'_>, scope: ScopeId) -> Result<(), CompilationError> {
        if self.model.scopes.lookup_local(scope, var.name.name).is_some() {
            return Err(duplicate(DeclKind::Variable, var.name));
        }
        let symbol = self.model.symbols.alloc(Symbol::Var(VarSymbol {
            name: var.name.name.to_string(),
            kind: VarKind::Local,
            ty: TypeId::ANY,
            span: var.name.span,
        }));
        self.model.scopes.bind(scope, var.name.name, symbol);
        self.model.decorations.set_symbol(var.id, symbol);
        self.visit_expr(var.init)
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    /// Only `new` carries a type expression; everything else just recurses.
    fn visit_expr(&mut self, expr: &Expr<'_>) -> Result<(), CompilationError> {
        match expr {
            Expr::Literal(_) | Expr::Name(_) => Ok(()),
            Expr::Binary(e) => {
                self.visit_expr(e.left)?;
                self.visit_expr(e.right)
            }
            Expr::Unary(e) => self.visit_expr(e.operand),
            Expr::Call(e) => {
                self.visit_expr(e.callee)?;
                e.args.iter().try_for_each(|arg| self.visit_expr(arg))
            }
            Expr::Index(e) => {
                self.visit_expr(e.array)?;
                self.visit_expr(e.index)
            }
            Expr::Field(e) => self.visit_expr(e.object),
            Expr::New(e) => self.visit_new(e),
        }
    }

    fn visit_new(&mut self, new: &NewExpr<'_>) -> Result<(), CompilationError> {
        self.resolve_type(new.ty)?;
        for init in new.inits {
            match init {
                NewInit::Field(field) => self.visit_expr(field.value)?,
                NewInit::Element(value) => self.visit_expr(value)?,
            }
        }
        Ok(())
    }

    // ==========================================================================
    // Helpers
    // ==========================================================================

    /// Resolve a type expression and record the result against its node.
    fn resolve_type(&mut self, texpr: &TypeExpr<'_>) -> Result<TypeId, CompilationError> {
        let ty = match texpr.kind {
            TypeExprKind::Named(ident) => {
                let base = self.resolve_type_name(ident)?;
                if texpr.nullable {
                    self.model.types.make_nullable(base, texpr.span)?
                } else {
                    base
                }
            }
            TypeExprKind::Array(element) => {
                let element_ty = self.resolve_type(element)?;
                self.model
                    .types
                    .make_array_type(element_ty, texpr.nullable, texpr.span)?
            }
        };
        self.model.decorations.set_type(texpr.id, ty);
        Ok(ty)
    }

    /// The type a name refers to; an unknown name becomes a pending struct.
    fn resolve_type_name(&mut self, ident: Ident<'_>) -> Result<TypeId, CompilationError> {
        match self.model.global(ident.name) {
            Some(symbol) => match self.model.symbols.get(symbol) {
                Symbol::Type(s) => Ok(s.ty),
                _ => Err(CompilationError::NotAType {
                    name: ident.name.to_string(),
                    span: ident.span,
                }),
            },
            None => {
                let ty = self.model.types.intern_struct(ident.name, ident.span)?;
                self.bind_type(ident.name, ty);
                trace!(name = ident.name, "forward reference creates pending struct");
                Ok(ty)
            }
        }
    }

    fn bind_type(&mut self, name: &str, ty: TypeId) -> SymbolId {
        let symbol = self.model.symbols.alloc(Symbol::Type(TypeSymbol {
            name: name.to_string(),
            ty,
        }));
        self.model.scopes.bind(ScopeId::ROOT, name, symbol);
        symbol
    }

    fn declare_var(
        &mut self,
        scope: ScopeId,
        decl: &VarDecl<'_>,
        ty: TypeId,
        kind: VarKind,
    ) -> SymbolId {
        let symbol = self.model.symbols.alloc(Symbol::Var(VarSymbol {
            name: decl.name.name.to_string(),
            kind,
            ty,
            span: decl.name.span,
        }));
        self.model.scopes.bind(scope, decl.name.name, symbol);
        self.model.decorations.set_symbol(decl.id, symbol);
        symbol
    }
}

fn duplicate(kind: DeclKind, name: Ident<'_>) -> CompilationError {
    CompilationError::DuplicateDeclaration {
        kind,
        name: name.name.to_string(),
        span: name.span,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bumpalo::Bump;
    use quill_parser::Parser;

    fn declare(source: &str) -> Result<DeclaredModel, CompilationError> {
        let arena = Bump::new();
        let program = Parser::parse(source, &arena).unwrap();
        DeclarationPass::new().run(&program)
    }

    #[test]
    fn declares_recursive_struct() {
        let model = declare("struct Tree { var left: Tree? var right: Tree? }").unwrap();
        assert_eq!(
            model.describe_global("Tree").unwrap(),
            "struct Tree{left: Tree?;right: Tree?;}"
        );
    }

    #[test]
    fn forward_reference_is_completed_by_later_struct() {
        let model = declare(
            "struct Tree { var children: [TreeArray?]? }
             struct TreeArray { var elems: [Tree?]? }",
        )
        .unwrap();
        assert_eq!(
            model.describe_global("Tree").unwrap(),
            "struct Tree{children: [TreeArray?,Int]?;}"
        );
        assert_eq!(
            model.describe_global("TreeArray").unwrap(),
            "struct TreeArray{elems: [Tree?,Int]?;}"
        );
    }

    #[test]
    fn declares_function_signature() {
        let model = declare("func add(a: Int, b: Int) -> Int { return a + b }").unwrap();
        assert_eq!(
            model.describe_global("add").unwrap(),
            "func add(a: Int,b: Int)->Int"
        );
        assert_eq!(model.functions.len(), 1);
    }

    #[test]
    fn void_function_has_no_arrow() {
        let model = declare("func noop() { }").unwrap();
        assert_eq!(model.describe_global("noop").unwrap(), "func noop()");
    }

    #[test]
    fn inferred_locals_start_as_any() {
        let arena = Bump::new();
        let program = Parser::parse("func f() { var x = 1 }", &arena).unwrap();
        let model = DeclarationPass::new().run(&program).unwrap();
        let (_, symbol) = model
            .symbols
            .iter()
            .find(|(_, s)| s.name() == "x")
            .unwrap();
        assert_eq!(symbol.ty(), TypeId::ANY);
    }

    #[test]
    fn rejects_duplicate_struct() {
        let err = declare("struct A { var x: Int } struct A { var y: Int }").unwrap_err();
        assert!(matches!(
            err,
            CompilationError::DuplicateDeclaration {
                kind: DeclKind::Struct,
                ..
            }
        ));
    }

    #[test]
    fn rejects_duplicate_function() {
        let err = declare("func f() { } func f() { }").unwrap_err();
        assert!(matches!(
            err,
            CompilationError::DuplicateDeclaration {
                kind: DeclKind::Function,
                ..
            }
        ));
    }

    #[test]
    fn rejects_duplicate_field() {
        let err = declare("struct A { var x: Int var x: Int }").unwrap_err();
        assert!(matches!(
            err,
            CompilationError::DuplicateDeclaration {
                kind: DeclKind::Field,
                ..
            }
        ));
    }

    #[test]
    fn rejects_duplicate_local_in_same_block() {
        let err = declare("func f() { var x = 1 var x = 2 }").unwrap_err();
        assert!(matches!(
            err,
            CompilationError::DuplicateDeclaration {
                kind: DeclKind::Variable,
                ..
            }
        ));
    }

    #[test]
    fn shadowing_in_nested_block_is_allowed() {
        assert!(declare("func f() { var x = 1 { var x = 2 } }").is_ok());
    }

    #[test]
    fn rejects_nullable_int() {
        let err = declare("struct A { var x: Int? }").unwrap_err();
        assert!(matches!(err, CompilationError::NullablePrimitive { .. }));
    }

    #[test]
    fn rejects_array_of_array() {
        let err = declare("struct A { var x: [[Int]] }").unwrap_err();
        assert!(matches!(err, CompilationError::ArrayOfArray { .. }));
    }

    #[test]
    fn rejects_function_name_in_type_position() {
        let err = declare("func f() { } struct A { var x: f }").unwrap_err();
        assert!(matches!(err, CompilationError::NotAType { .. }));
    }

    #[test]
    fn resolves_types_inside_new() {
        let model = declare("func f() { var p = new Point { x = 1 } }").unwrap();
        let ty = model.types.lookup("Point").unwrap();
        assert!(model.types.get(ty).as_struct().unwrap().is_pending());
    }
}
