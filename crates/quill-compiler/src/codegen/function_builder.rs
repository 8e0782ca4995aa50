//! Lowering of one function body to a basic-block graph.
//!
//! Expressions are compiled by abstract interpretation over a virtual
//! operand stack. Nothing is evaluated; each expression pushes the
//! [`Operand`] that will hold its value:
//!
//! - literals push constants, and operators over constants fold into a new
//!   constant without emitting anything
//! - any other operator result goes to a temp, numbered by the stack slot it
//!   occupies, so temps are reused as soon as their value is consumed
//! - index and field accesses push symbolic operands. A store to one becomes
//!   a single instruction; reading one first moves it into a temp.
//!
//! Between statements the stack is empty.

use quill_core::CompilationError;
use quill_parser::ast::{
    AssignStmt, BinaryOp, Block, CallExpr, Expr, FuncDecl, IfStmt, NewExpr, NewInit, NodeId,
    Stmt, UnaryOp, WhileStmt,
};
use tracing::trace;

use super::function_code::reachable_blocks;
use super::{BasicBlock, BlockFlags, BlockId, FunctionCode, Instruction, Operand, RegisterMap};
use crate::model::CheckedModel;
use crate::options::CompilerOptions;
use crate::symbols::SymbolId;
use crate::types::{Type, TypeId};

/// Where `break` and `continue` go inside the innermost loop.
#[derive(Debug, Clone, Copy)]
struct LoopTargets {
    break_to: BlockId,
    continue_to: BlockId,
}

pub struct FunctionBuilder<'m> {
    model: &'m CheckedModel,
    options: CompilerOptions,
    registers: RegisterMap,
    blocks: Vec<BasicBlock>,
    current: BlockId,
    stack: Vec<Operand>,
}

impl<'m> FunctionBuilder<'m> {
    /// Generate code for `decl`, whose symbol is `symbol`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build(
        model: &'m CheckedModel,
        symbol: SymbolId,
        decl: &FuncDecl<'_>,
        options: CompilerOptions,
    ) -> Result<FunctionCode, CompilationError> {
        let registers = match model.symbols.function(symbol) {
            Some(func) => RegisterMap::assign(model, func.scope),
            None => RegisterMap::default(),
        };
        let mut builder = Self {
            model,
            options,
            registers,
            blocks: Vec::new(),
            current: BlockId::ENTRY,
            stack: Vec::new(),
        };

        let entry = builder.create_block(BlockFlags::ENTRY);
        let exit = builder.create_block(BlockFlags::EXIT);
        builder.current = entry;
        builder.compile_block(decl.body, None)?;
        if builder.current != exit {
            builder.start_block(exit);
        }

        let blocks = builder.prune_unreachable();
        trace!(
            function = decl.name.name,
            blocks = blocks.len(),
            "built control flow graph"
        );
        Ok(FunctionCode::new(
            decl.name.name.to_string(),
            blocks,
            builder.registers,
        ))
    }

    // ==========================================================================
    // Blocks
    // ==========================================================================

    fn create_block(&mut self, flags: BlockFlags) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        self.blocks.push(BasicBlock::new(id, flags));
        id
    }

    fn block_mut(&mut self, id: BlockId) -> &mut BasicBlock {
        &mut self.blocks[id.index()]
    }

    fn is_terminated(&self, id: BlockId) -> bool {
        self.blocks[id.index()].is_terminated()
    }

    /// The block to emit into. Code following a jump or branch lands in a
    /// fresh block that nothing reaches; it is pruned at the end.
    fn open_block(&mut self) -> BlockId {
        if self.is_terminated(self.current) {
            self.current = self.create_block(BlockFlags::empty());
        }
        self.current
    }

    fn code(&mut self, instruction: Instruction) {
        let id = self.open_block();
        self.block_mut(id).instructions.push(instruction);
    }

    fn add_edge(&mut self, from: BlockId, to: BlockId) {
        self.block_mut(from).successors.push(to);
        self.block_mut(to).predecessors.push(from);
    }

    fn jump_to(&mut self, target: BlockId) {
        let from = self.open_block();
        self.block_mut(from)
            .instructions
            .push(Instruction::Jump { target });
        self.add_edge(from, target);
    }

    fn branch(&mut self, condition: Operand, if_true: BlockId, if_false: BlockId) {
        let from = self.open_block();
        self.block_mut(from).instructions.push(Instruction::Branch {
            condition,
            if_true,
            if_false,
        });
        self.add_edge(from, if_true);
        self.add_edge(from, if_false);
    }

    /// Continue emitting into `block`, falling through to it if the current
    /// block is still open.
    fn start_block(&mut self, block: BlockId) {
        if !self.is_terminated(self.current) {
            self.jump_to(block);
        }
        self.current = block;
    }

    fn prune_unreachable(&mut self) -> Vec<BasicBlock> {
        let reachable = reachable_blocks(&self.blocks);
        let mut kept: Vec<BasicBlock> = std::mem::take(&mut self.blocks)
            .into_iter()
            .filter(|b| reachable.contains(&b.id) || b.flags.contains(BlockFlags::EXIT))
            .collect();
        for block in &mut kept {
            block.predecessors.retain(|p| reachable.contains(p));
        }
        kept
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    fn compile_block(
        &mut self,
        block: &Block<'_>,
        loops: Option<LoopTargets>,
    ) -> Result<(), CompilationError> {
        for stmt in block.stmts {
            self.compile_stmt(stmt, loops)?;
        }
        Ok(())
    }

    fn compile_stmt(
        &mut self,
        stmt: &Stmt<'_>,
        loops: Option<LoopTargets>,
    ) -> Result<(), CompilationError> {
        match stmt {
            Stmt::Block(block) => self.compile_block(block, loops)?,
            Stmt::Var(var) => {
                self.compile_value(var.init);
                let value = self.pop();
                let local = self.local(self.symbol_of(var.id));
                self.code(Instruction::Move {
                    from: value,
                    to: local,
                });
            }
            Stmt::VarDecl(_) => {}
            Stmt::If(stmt) => self.compile_if(stmt, loops)?,
            Stmt::While(stmt) => self.compile_while(stmt)?,
            Stmt::Break(stmt) => {
                let targets = loops.ok_or(CompilationError::BreakOutsideLoop { span: stmt.span })?;
                self.jump_to(targets.break_to);
            }
            Stmt::Continue(stmt) => {
                let targets =
                    loops.ok_or(CompilationError::ContinueOutsideLoop { span: stmt.span })?;
                self.jump_to(targets.continue_to);
            }
            Stmt::Return(ret) => {
                if let Some(value) = ret.value {
                    self.compile_expr(value);
                    assert!(
                        self.stack.len() <= 1,
                        "virtual stack holds {} operands at return",
                        self.stack.len()
                    );
                    if !self.stack.is_empty() {
                        let value = self.pop();
                        self.code(Instruction::Move {
                            from: value,
                            to: Operand::Return,
                        });
                    }
                }
                self.jump_to(BlockId::EXIT);
            }
            Stmt::Assign(assign) => self.compile_assign(assign),
            Stmt::Expr(stmt) => {
                self.compile_value(stmt.expr);
                if !self.stack.is_empty() {
                    self.pop();
                }
            }
        }
        assert!(
            self.stack.is_empty(),
            "virtual stack not empty after statement: {:?}",
            self.stack
        );
        Ok(())
    }

    fn compile_if(
        &mut self,
        stmt: &IfStmt<'_>,
        loops: Option<LoopTargets>,
    ) -> Result<(), CompilationError> {
        let then_block = self.create_block(BlockFlags::empty());
        let else_block = stmt
            .else_branch
            .map(|_| self.create_block(BlockFlags::empty()));
        let join = self.create_block(BlockFlags::empty());

        self.compile_value(stmt.condition);
        let condition = self.pop();
        self.branch(condition, then_block, else_block.unwrap_or(join));

        self.start_block(then_block);
        self.compile_stmt(stmt.then_branch, loops)?;
        if !self.is_terminated(self.current) {
            self.jump_to(join);
        }
        if let (Some(else_block), Some(else_branch)) = (else_block, stmt.else_branch) {
            self.start_block(else_block);
            self.compile_stmt(else_branch, loops)?;
            if !self.is_terminated(self.current) {
                self.jump_to(join);
            }
        }
        self.start_block(join);
        Ok(())
    }

    fn compile_while(&mut self, stmt: &WhileStmt<'_>) -> Result<(), CompilationError> {
        let head = self.create_block(BlockFlags::LOOP_HEAD);
        let body = self.create_block(BlockFlags::empty());
        let exit = self.create_block(BlockFlags::empty());

        self.start_block(head);
        self.compile_value(stmt.condition);
        let condition = self.pop();
        self.branch(condition, body, exit);

        self.start_block(body);
        let targets = LoopTargets {
            break_to: exit,
            continue_to: head,
        };
        self.compile_stmt(stmt.body, Some(targets))?;
        if !self.is_terminated(self.current) {
            self.jump_to(head);
        }
        self.start_block(exit);
        Ok(())
    }

    fn compile_assign(&mut self, assign: &AssignStmt<'_>) {
        if let Expr::Name(name) = assign.target {
            self.compile_value(assign.value);
            let value = self.pop();
            let local = self.local(self.symbol_of(name.id));
            self.code(Instruction::Move {
                from: value,
                to: local,
            });
            return;
        }

        // Left symbolic: the store goes straight into the cell.
        self.compile_expr(assign.target);
        self.compile_value(assign.value);
        let value = self.pop();
        let target = self.pop();
        self.code(Instruction::Move {
            from: value,
            to: target,
        });
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    /// Compile `expr` and make sure its value is not a symbolic cell.
    fn compile_value(&mut self, expr: &Expr<'_>) {
        self.compile_expr(expr);
        self.materialize();
    }

    fn compile_expr(&mut self, expr: &Expr<'_>) {
        match expr {
            Expr::Literal(lit) => self.push(Operand::Constant(lit.value)),
            Expr::Name(name) => {
                let ty = self.type_of(expr.id());
                if matches!(self.model.types.get(ty), Type::Function(_)) {
                    let operand = Operand::Function {
                        ty,
                        name: name.ident.name.to_string(),
                    };
                    self.push(operand);
                } else {
                    let local = self.local(self.symbol_of(name.id));
                    self.push(local);
                }
            }
            Expr::Binary(e) => {
                self.compile_value(e.left);
                self.compile_value(e.right);
                let right = self.pop();
                let left = self.pop();
                let folded = match (left.as_constant(), right.as_constant()) {
                    (Some(l), Some(r)) if self.options.fold_constants => fold_binary(e.op, l, r),
                    _ => None,
                };
                match folded {
                    Some(value) => self.push(Operand::Constant(value)),
                    None => {
                        let result = self.create_temp();
                        self.code(Instruction::Binary {
                            op: e.op,
                            result,
                            left,
                            right,
                        });
                    }
                }
            }
            Expr::Unary(e) => {
                self.compile_value(e.operand);
                let operand = self.pop();
                match operand.as_constant() {
                    Some(value) if self.options.fold_constants => {
                        self.push(Operand::Constant(fold_unary(e.op, value)));
                    }
                    _ => {
                        let result = self.create_temp();
                        self.code(Instruction::Unary {
                            op: e.op,
                            result,
                            operand,
                        });
                    }
                }
            }
            Expr::Call(call) => self.compile_call(call),
            Expr::Index(e) => {
                self.compile_value(e.array);
                self.compile_value(e.index);
                let index = self.pop();
                let array = self.pop();
                self.push(Operand::LoadIndexed {
                    array: Box::new(array),
                    index: Box::new(index),
                });
            }
            Expr::Field(e) => {
                let index = self.field_index(self.type_of(e.object.id()), e.field.name);
                self.compile_value(e.object);
                let object = self.pop();
                self.push(Operand::LoadField {
                    object: Box::new(object),
                    field: e.field.name.to_string(),
                    index,
                });
            }
            Expr::New(new) => self.compile_new(new),
        }
    }

    fn compile_call(&mut self, call: &CallExpr<'_>) {
        self.compile_expr(call.callee);
        let callee = self.into_temp();

        let mut args = Vec::with_capacity(call.args.len());
        for arg in call.args {
            self.compile_value(arg);
            args.push(self.into_temp());
        }
        let arg_count = args.len();
        self.code(Instruction::Call { callee, args });
        for _ in 0..=arg_count {
            self.pop();
        }

        let returns_value = self
            .model
            .types
            .function(self.type_of(call.callee.id()))
            .is_some_and(|f| f.return_type() != TypeId::VOID);
        if returns_value {
            self.create_temp();
        }
    }

    fn compile_new(&mut self, new: &NewExpr<'_>) {
        let ty = self.type_of(new.ty.id);
        let name = self.model.types.name(ty).to_string();
        let instance = self.create_temp();
        self.code(Instruction::Move {
            from: Operand::New { ty, name },
            to: instance.clone(),
        });

        for init in new.inits {
            match init {
                NewInit::Element(value) => {
                    self.compile_value(value);
                    let value = self.pop();
                    self.code(Instruction::Append {
                        array: instance.clone(),
                        value,
                    });
                }
                NewInit::Field(field) => {
                    let owner = match self.model.decorations.init_owner(field.id) {
                        Some(owner) => owner,
                        None => panic!("field initializer '{}' has no owner", field.name.name),
                    };
                    let index = self.field_index(owner, field.name.name);
                    self.push(Operand::LoadField {
                        object: Box::new(instance.clone()),
                        field: field.name.name.to_string(),
                        index,
                    });
                    self.compile_value(field.value);
                    let value = self.pop();
                    let target = self.pop();
                    self.code(Instruction::Move {
                        from: value,
                        to: target,
                    });
                }
            }
        }
    }

    // ==========================================================================
    // Virtual stack
    // ==========================================================================

    fn push(&mut self, operand: Operand) {
        self.stack.push(operand);
    }

    fn pop(&mut self) -> Operand {
        match self.stack.pop() {
            Some(operand) => operand,
            None => panic!("virtual stack underflow"),
        }
    }

    fn top(&self) -> &Operand {
        match self.stack.last() {
            Some(operand) => operand,
            None => panic!("virtual stack is empty"),
        }
    }

    /// Push a temp for the slot about to be occupied.
    ///
    /// Normally the slot number, but never one still read by an operand
    /// below it, such as the index of a pending store target.
    fn create_temp(&mut self) -> Operand {
        let in_use = self
            .stack
            .iter()
            .filter_map(Operand::highest_temp)
            .max()
            .map_or(0, |n| n + 1);
        let temp = Operand::Temp((self.stack.len() as u32).max(in_use));
        self.stack.push(temp.clone());
        temp
    }

    /// Load a symbolic cell on top of the stack into a temp.
    fn materialize(&mut self) {
        if self.stack.last().is_some_and(Operand::is_indexed) {
            let cell = self.pop();
            let temp = self.create_temp();
            self.code(Instruction::Move {
                from: cell,
                to: temp,
            });
        }
    }

    /// Make sure the top of the stack is a temp and return it.
    fn into_temp(&mut self) -> Operand {
        if !self.top().is_temp() {
            let value = self.pop();
            let temp = self.create_temp();
            self.code(Instruction::Move {
                from: value,
                to: temp,
            });
        }
        self.top().clone()
    }

    // ==========================================================================
    // Decorations
    // ==========================================================================

    fn type_of(&self, node: NodeId) -> TypeId {
        match self.model.decorations.type_of(node) {
            Some(ty) => ty,
            None => panic!("node {node:?} has no type"),
        }
    }

    fn symbol_of(&self, node: NodeId) -> SymbolId {
        match self.model.decorations.symbol(node) {
            Some(symbol) => symbol,
            None => panic!("node {node:?} has no symbol"),
        }
    }

    fn local(&self, symbol: SymbolId) -> Operand {
        let Some(reg) = self.registers.get(symbol) else {
            panic!("{symbol:?} has no register");
        };
        Operand::Local {
            reg,
            name: self.model.symbols.get(symbol).name().to_string(),
        }
    }

    fn field_index(&self, ty: TypeId, field: &str) -> usize {
        match self
            .model
            .types
            .struct_of(ty)
            .and_then(|(_, st)| st.field_index(field))
        {
            Some(index) => index,
            None => panic!("field '{field}' not found on {}", self.model.types.name(ty)),
        }
    }
}

/// Compile-time value of `l op r`, if it can be computed.
///
/// Division and remainder by zero are left to run time.
fn fold_binary(op: BinaryOp, l: i64, r: i64) -> Option<i64> {
    let value = match op {
        BinaryOp::Add => l.wrapping_add(r),
        BinaryOp::Sub => l.wrapping_sub(r),
        BinaryOp::Mul => l.wrapping_mul(r),
        BinaryOp::Div if r == 0 => return None,
        BinaryOp::Div => l.wrapping_div(r),
        BinaryOp::Mod if r == 0 => return None,
        BinaryOp::Mod => l.wrapping_rem(r),
        BinaryOp::Equal => (l == r) as i64,
        BinaryOp::NotEqual => (l != r) as i64,
        BinaryOp::Less => (l < r) as i64,
        BinaryOp::LessEqual => (l <= r) as i64,
        BinaryOp::Greater => (l > r) as i64,
        BinaryOp::GreaterEqual => (l >= r) as i64,
        BinaryOp::LogicalAnd => (l != 0 && r != 0) as i64,
        BinaryOp::LogicalOr => (l != 0 || r != 0) as i64,
    };
    Some(value)
}

fn fold_unary(op: UnaryOp, value: i64) -> i64 {
    match op {
        UnaryOp::Neg => value.wrapping_neg(),
        UnaryOp::LogicalNot => (value == 0) as i64,
    }
}
