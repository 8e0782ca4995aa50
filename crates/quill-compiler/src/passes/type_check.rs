//! Type Check Pass (Pass 2) - type every expression and variable.
//!
//! Runs after [`DeclarationPass`](super::DeclarationPass), so every struct
//! layout and function signature is already known. The pass walks each
//! function body once:
//!
//! - every expression gets its type recorded against its node id
//! - every name gets the symbol it resolves to
//! - `var x = e` locals take the type of their initializer
//!
//! Anything ill-typed aborts with the first error found.

use quill_core::{CompilationError, Span};
use quill_parser::ast::{
    AssignStmt, Block, CallExpr, Expr, FieldExpr, FuncDecl, IndexExpr, Item, NameExpr, NewExpr,
    NewInit, Program, Stmt, VarStmt,
};
use rustc_hash::FxHashSet;
use tracing::debug;

use crate::model::{CheckedModel, DeclaredModel, SemanticModel};
use crate::scope::ScopeId;
use crate::symbols::Symbol;
use crate::types::{Type, TypeId};

/// Pass 2: check types across every function body.
pub struct TypeCheckPass {
    model: SemanticModel,
    /// Declared return type of the function being checked.
    return_type: TypeId,
}

impl TypeCheckPass {
    /// Run the pass over `program`, consuming the model pass 1 built for it.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(
        declared: DeclaredModel,
        program: &Program<'_>,
    ) -> Result<CheckedModel, CompilationError> {
        let mut pass = Self {
            model: declared.into_inner(),
            return_type: TypeId::VOID,
        };
        for item in program.items() {
            if let Item::Func(decl) = item {
                pass.check_function(decl)?;
            }
        }
        debug!(types = pass.model.types.len(), "type check complete");
        Ok(CheckedModel::new(pass.model))
    }

    fn check_function(&mut self, decl: &FuncDecl<'_>) -> Result<(), CompilationError> {
        let Some((scope, ty)) = self
            .model
            .decorations
            .symbol(decl.id)
            .and_then(|id| self.model.symbols.function(id))
            .map(|f| (f.scope, f.ty))
        else {
            return Err(unknown(decl.name.name, decl.name.span));
        };
        self.return_type = self
            .model
            .types
            .function(ty)
            .map_or(TypeId::VOID, |f| f.return_type());

        self.check_block(decl.body, scope)?;
        debug!(function = decl.name.name, "checked function");
        Ok(())
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    fn check_block(&mut self, block: &Block<'_>, parent: ScopeId) -> Result<(), CompilationError> {
        let scope = self.model.decorations.scope(block.id).unwrap_or(parent);
        for stmt in block.stmts {
            self.check_stmt(stmt, scope)?;
        }
        Ok(())
    }

    fn check_stmt(&mut self, stmt: &Stmt<'_>, scope: ScopeId) -> Result<(), CompilationError> {
        match stmt {
            Stmt::Block(block) => self.check_block(block, scope),
            Stmt::Var(var) => self.check_var(var, scope),
            Stmt::VarDecl(_) | Stmt::Break(_) | Stmt::Continue(_) => Ok(()),
            Stmt::If(stmt) => {
                self.check_condition(stmt.condition, scope)?;
                self.check_stmt(stmt.then_branch, scope)?;
                if let Some(else_branch) = stmt.else_branch {
                    self.check_stmt(else_branch, scope)?;
                }
                Ok(())
            }
            Stmt::While(stmt) => {
                self.check_condition(stmt.condition, scope)?;
                self.check_stmt(stmt.body, scope)
            }
            Stmt::Return(ret) => {
                let found = match ret.value {
                    Some(value) => self.check_expr(value, scope)?,
                    None => TypeId::VOID,
                };
                let ok = if self.return_type == TypeId::VOID {
                    found == TypeId::VOID
                } else {
                    self.model.types.is_assignable(self.return_type, found)
                };
                if !ok {
                    return Err(CompilationError::ReturnTypeMismatch {
                        expected: self.type_name(self.return_type),
                        found: self.type_name(found),
                        span: ret.span,
                    });
                }
                Ok(())
            }
            Stmt::Assign(assign) => self.check_assign(assign, scope),
            Stmt::Expr(stmt) => self.check_expr(stmt.expr, scope).map(|_| ()),
        }
    }

    fn check_var(&mut self, var: &VarStmt<'_>, scope: ScopeId) -> Result<(), CompilationError> {
        let init = self.check_expr(var.init, scope)?;
        if init == TypeId::VOID {
            return Err(CompilationError::TypeMismatch {
                expected: "value".to_string(),
                found: self.type_name(init),
                span: var.init.span(),
            });
        }
        let Some(symbol) = self.model.decorations.symbol(var.id) else {
            return Err(unknown(var.name.name, var.name.span));
        };
        let current = self.model.symbols.get(symbol).ty();
        let merged = self.model.types.merge(init, current, var.span)?;
        self.model.symbols.set_var_type(symbol, merged);
        Ok(())
    }

    fn check_assign(
        &mut self,
        assign: &AssignStmt<'_>,
        scope: ScopeId,
    ) -> Result<(), CompilationError> {
        let target = self.check_expr(assign.target, scope)?;
        let assignable = match assign.target {
            Expr::Name(name) => self
                .model
                .decorations
                .symbol(name.id)
                .is_some_and(|s| self.model.symbols.var(s).is_some()),
            Expr::Field(_) | Expr::Index(_) => true,
            _ => false,
        };
        if !assignable {
            return Err(CompilationError::InvalidAssignmentTarget {
                span: assign.target.span(),
            });
        }
        let value = self.check_expr(assign.value, scope)?;
        self.expect_assignable(target, value, assign.value.span())
    }

    fn check_condition(&mut self, cond: &Expr<'_>, scope: ScopeId) -> Result<(), CompilationError> {
        let ty = self.check_expr(cond, scope)?;
        if ty != TypeId::INT {
            return Err(CompilationError::ConditionNotInteger {
                type_name: self.type_name(ty),
                span: cond.span(),
            });
        }
        Ok(())
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    fn check_expr(&mut self, expr: &Expr<'_>, scope: ScopeId) -> Result<TypeId, CompilationError> {
        let ty = match expr {
            Expr::Literal(_) => TypeId::INT,
            Expr::Name(name) => self.check_name(name, scope)?,
            Expr::Binary(e) => {
                let left = self.check_expr(e.left, scope)?;
                let right = self.check_expr(e.right, scope)?;
                self.expect_int(left, e.op.as_str(), e.left.span())?;
                self.expect_int(right, e.op.as_str(), e.right.span())?;
                self.model.types.merge(left, right, e.span)?
            }
            Expr::Unary(e) => {
                let operand = self.check_expr(e.operand, scope)?;
                self.expect_int(operand, e.op.as_str(), e.operand.span())?;
                operand
            }
            Expr::Call(e) => self.check_call(e, scope)?,
            Expr::Index(e) => self.check_index(e, scope)?,
            Expr::Field(e) => self.check_field(e, scope)?,
            Expr::New(e) => self.check_new(e, scope)?,
        };
        self.model.decorations.set_type(expr.id(), ty);
        Ok(ty)
    }

    fn check_name(&mut self, name: &NameExpr<'_>, scope: ScopeId) -> Result<TypeId, CompilationError> {
        let ident = name.ident;
        let Some(symbol) = self.model.scopes.lookup(scope, ident.name) else {
            return Err(unknown(ident.name, ident.span));
        };
        self.model.decorations.set_symbol(name.id, symbol);
        match self.model.symbols.get(symbol) {
            Symbol::Type(_) => Err(CompilationError::NotAValue {
                name: ident.name.to_string(),
                span: ident.span,
            }),
            Symbol::Function(f) => Ok(f.ty),
            Symbol::Var(v) if v.ty == TypeId::ANY => Err(CompilationError::UntypedSymbol {
                name: ident.name.to_string(),
                span: ident.span,
            }),
            Symbol::Var(v) => Ok(v.ty),
        }
    }

    fn check_call(&mut self, call: &CallExpr<'_>, scope: ScopeId) -> Result<TypeId, CompilationError> {
        let callee = self.check_expr(call.callee, scope)?;
        let Some(func) = self.model.types.function(callee) else {
            return Err(CompilationError::NotCallable {
                type_name: self.type_name(callee),
                span: call.callee.span(),
            });
        };
        let name = func.name.clone();
        let return_type = func.return_type();
        let params: Vec<TypeId> = func.params().iter().map(|p| p.ty).collect();

        if params.len() != call.args.len() {
            return Err(CompilationError::ArgumentCountMismatch {
                name,
                expected: params.len(),
                got: call.args.len(),
                span: call.span,
            });
        }
        for (arg, param) in call.args.iter().zip(params) {
            let found = self.check_expr(arg, scope)?;
            self.expect_assignable(param, found, arg.span())?;
        }
        Ok(return_type)
    }

    fn check_index(&mut self, index: &IndexExpr<'_>, scope: ScopeId) -> Result<TypeId, CompilationError> {
        let array = self.check_expr(index.array, scope)?;
        let Some(element) = self.model.types.element_of(array) else {
            return Err(CompilationError::NotAnArray {
                type_name: self.type_name(array),
                span: index.array.span(),
            });
        };
        let idx = self.check_expr(index.index, scope)?;
        self.expect_assignable(TypeId::INT, idx, index.index.span())?;
        Ok(element)
    }

    fn check_field(&mut self, access: &FieldExpr<'_>, scope: ScopeId) -> Result<TypeId, CompilationError> {
        let object = self.check_expr(access.object, scope)?;
        let Some((_, st)) = self.model.types.struct_of(object) else {
            return Err(CompilationError::NotAStruct {
                type_name: self.type_name(object),
                span: access.object.span(),
            });
        };
        match st.field(access.field.name) {
            Some(field) => Ok(field.ty),
            None => Err(CompilationError::UnknownField {
                field: access.field.name.to_string(),
                type_name: st.name.clone(),
                span: access.field.span,
            }),
        }
    }

    fn check_new(&mut self, new: &NewExpr<'_>, scope: ScopeId) -> Result<TypeId, CompilationError> {
        let Some(ty) = self.model.decorations.type_of(new.ty.id) else {
            return Err(CompilationError::InvalidNewType {
                type_name: "$Any".to_string(),
                span: new.ty.span,
            });
        };
        let element = match self.model.types.get(ty) {
            Type::Struct(_) => None,
            Type::Array(element) => Some(*element),
            _ => {
                return Err(CompilationError::InvalidNewType {
                    type_name: self.type_name(ty),
                    span: new.ty.span,
                });
            }
        };
        match element {
            None => self.check_struct_inits(new, ty, scope)?,
            Some(element) => {
                for init in new.inits {
                    let NewInit::Element(value) = init else {
                        return Err(invalid_init(
                            "array initializer cannot name a field",
                            init.span(),
                        ));
                    };
                    let found = self.check_expr(value, scope)?;
                    self.expect_assignable(element, found, value.span())?;
                }
            }
        }
        Ok(ty)
    }

    fn check_struct_inits(
        &mut self,
        new: &NewExpr<'_>,
        ty: TypeId,
        scope: ScopeId,
    ) -> Result<(), CompilationError> {
        let mut seen = FxHashSet::default();
        for init in new.inits {
            let NewInit::Field(field) = init else {
                return Err(invalid_init(
                    "struct initializer must name a field",
                    init.span(),
                ));
            };
            if !seen.insert(field.name.name) {
                return Err(invalid_init(
                    &format!("field '{}' initialized twice", field.name.name),
                    field.span,
                ));
            }
            let expected = match self.model.types.struct_of(ty).and_then(|(_, st)| {
                st.field(field.name.name).map(|f| f.ty)
            }) {
                Some(expected) => expected,
                None => {
                    return Err(CompilationError::UnknownField {
                        field: field.name.name.to_string(),
                        type_name: self.type_name(ty),
                        span: field.name.span,
                    });
                }
            };
            let found = self.check_expr(field.value, scope)?;
            self.expect_assignable(expected, found, field.value.span())?;
            self.model.decorations.set_init_owner(field.id, ty);
        }
        Ok(())
    }

    // ==========================================================================
    // Helpers
    // ==========================================================================

    fn expect_int(&self, ty: TypeId, op: &str, span: Span) -> Result<(), CompilationError> {
        if ty == TypeId::INT {
            Ok(())
        } else {
            Err(CompilationError::OperandMismatch {
                op: op.to_string(),
                type_name: self.type_name(ty),
                span,
            })
        }
    }

    fn expect_assignable(&self, dst: TypeId, src: TypeId, span: Span) -> Result<(), CompilationError> {
        if self.model.types.is_assignable(dst, src) {
            Ok(())
        } else {
            Err(CompilationError::TypeMismatch {
                expected: self.type_name(dst),
                found: self.type_name(src),
                span,
            })
        }
    }

    fn type_name(&self, ty: TypeId) -> String {
        self.model.types.name(ty).to_string()
    }
}

fn unknown(name: &str, span: Span) -> CompilationError {
    CompilationError::UnknownSymbol {
        name: name.to_string(),
        span,
    }
}

fn invalid_init(message: &str, span: Span) -> CompilationError {
    CompilationError::InvalidInitializer {
        message: message.to_string(),
        span,
    }
}
