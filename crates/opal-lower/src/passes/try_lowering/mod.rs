//! Try-block lowering.
//!
//! Rewrites `try { ... }` block expressions and `expr?` propagation
//! operators into constructs later stages already understand: labeled
//! blocks, label-breaks, matches on the success/failure constructors, and
//! plain returns. Runs after name-binding and before type-checking; the
//! output may still be ill-typed, inference reports that later.
//!
//! A propagation operator resolves against the nearest lexically enclosing
//! try block. Without one it targets the enclosing function's own error
//! return; with neither it is a user error, reported through the diagnostic
//! sink and replaced with a poison node so the walk continues.

use std::mem;

use opal_core::ast::{
    BlockStmt, Expr, ExprBlock, ExprError, ExprInvokeTarget, ExprKind, ExprTry, ExprTryBlock, Item,
    ItemChunk, ItemKind, Node, NodeKind,
};
use opal_core::diagnostics::{Diagnostic, DiagnosticManager};
use opal_core::error::Result;
use opal_core::id::Label;
use opal_core::{debug, trace};

use crate::lower_ensure;

mod factory;
#[cfg(test)]
mod tests;

/// Diagnostic code for a propagation operator with nothing to propagate to.
pub const MISPLACED_PROPAGATION_OPERATOR: &str = "E0571";

/// Eliminate every try block and propagation operator under `node`.
///
/// Source-level misuse does not fail the pass; it is reported to
/// `diagnostics` and the offending node is replaced with a poison
/// expression. `Err` is reserved for trees an earlier pass corrupted.
pub fn lower_try_blocks(node: &mut Node, diagnostics: &DiagnosticManager) -> Result<()> {
    let mut pass = TryLowering::new(diagnostics);
    match node.kind_mut() {
        NodeKind::File(file) => pass.rewrite_items(&mut file.items)?,
        NodeKind::Item(item) => pass.rewrite_item(item)?,
        NodeKind::Expr(expr) => pass.rewrite_expr(expr)?,
    }
    debug_assert!(
        !contains_propagation_nodes(node),
        "lowering left a propagation node behind"
    );
    Ok(())
}

struct TryLowering<'a> {
    /// Labels of the try blocks lexically enclosing the walk position,
    /// innermost last. Masked, not popped, when the walk enters a nested
    /// function or const initializer.
    scopes: Vec<Label>,
    /// How many function bodies enclose the walk position.
    fn_depth: usize,
    diagnostics: &'a DiagnosticManager,
}

impl<'a> TryLowering<'a> {
    fn new(diagnostics: &'a DiagnosticManager) -> Self {
        Self {
            scopes: Vec::new(),
            fn_depth: 0,
            diagnostics,
        }
    }

    fn rewrite_items(&mut self, items: &mut ItemChunk) -> Result<()> {
        for item in items {
            self.rewrite_item(item)?;
        }
        Ok(())
    }

    fn rewrite_item(&mut self, item: &mut Item) -> Result<()> {
        match item.kind_mut() {
            ItemKind::Module(module) => self.rewrite_items(&mut module.items),
            ItemKind::DefFunction(func) => {
                // Propagation never crosses a function boundary: labels of
                // enclosing try blocks are not in scope inside the body.
                let outer_scopes = mem::take(&mut self.scopes);
                self.fn_depth += 1;
                let result = self.rewrite_expr(func.body.as_mut());
                self.fn_depth -= 1;
                self.scopes = outer_scopes;
                result
            }
            ItemKind::DefConst(def) => {
                // A const initializer has no function error contract either.
                let outer_scopes = mem::take(&mut self.scopes);
                let outer_depth = mem::replace(&mut self.fn_depth, 0);
                let result = self.rewrite_expr(def.value.as_mut());
                self.fn_depth = outer_depth;
                self.scopes = outer_scopes;
                result
            }
            ItemKind::Expr(expr) => self.rewrite_expr(expr),
        }
    }

    fn rewrite_stmt(&mut self, stmt: &mut BlockStmt) -> Result<()> {
        match stmt {
            BlockStmt::Item(item) => self.rewrite_item(item),
            BlockStmt::Let(stmt_let) => {
                lower_ensure!(
                    stmt_let.init.is_some() || stmt_let.diverge.is_none(),
                    "let statement with diverge arm but no initializer"
                );
                if let Some(init) = stmt_let.init.as_mut() {
                    self.rewrite_expr(init)?;
                }
                if let Some(diverge) = stmt_let.diverge.as_mut() {
                    self.rewrite_expr(diverge)?;
                }
                Ok(())
            }
            BlockStmt::Expr(stmt_expr) => self.rewrite_expr(stmt_expr.expr.as_mut()),
            BlockStmt::Noop => Ok(()),
        }
    }

    fn rewrite_expr(&mut self, expr: &mut Expr) -> Result<()> {
        if matches!(expr.kind(), ExprKind::TryBlock(_)) {
            let (ty, kind) = mem::replace(expr, Expr::unit()).into_parts();
            let ExprKind::TryBlock(try_block) = kind else {
                unreachable!("kind checked above");
            };
            *expr = Expr::from_parts(ty, self.desugar_try_block(try_block)?);
            // The replacement is fully lowered; do not walk into it again.
            return Ok(());
        }

        if matches!(expr.kind(), ExprKind::Try(_)) {
            let (ty, kind) = mem::replace(expr, Expr::unit()).into_parts();
            let ExprKind::Try(op) = kind else {
                unreachable!("kind checked above");
            };
            *expr = Expr::from_parts(ty, self.rewrite_propagation(op)?);
            return Ok(());
        }

        match expr.kind_mut() {
            ExprKind::TryBlock(_) | ExprKind::Try(_) => {
                unreachable!("handled above")
            }
            ExprKind::Block(block) => {
                for stmt in &mut block.stmts {
                    self.rewrite_stmt(stmt)?;
                }
                Ok(())
            }
            ExprKind::Match(expr_match) => {
                self.rewrite_expr(expr_match.scrutinee.as_mut())?;
                for arm in &mut expr_match.arms {
                    if let Some(guard) = arm.guard.as_mut() {
                        self.rewrite_expr(guard)?;
                    }
                    self.rewrite_expr(arm.body.as_mut())?;
                }
                Ok(())
            }
            ExprKind::If(expr_if) => {
                self.rewrite_expr(expr_if.cond.as_mut())?;
                self.rewrite_expr(expr_if.then.as_mut())?;
                if let Some(elze) = expr_if.elze.as_mut() {
                    self.rewrite_expr(elze)?;
                }
                Ok(())
            }
            ExprKind::Loop(expr_loop) => self.rewrite_expr(expr_loop.body.as_mut()),
            ExprKind::While(expr_while) => {
                self.rewrite_expr(expr_while.cond.as_mut())?;
                self.rewrite_expr(expr_while.body.as_mut())
            }
            ExprKind::Invoke(invoke) => {
                if let ExprInvokeTarget::Expr(target) = &mut invoke.target {
                    self.rewrite_expr(target.as_mut())?;
                }
                for arg in &mut invoke.args {
                    self.rewrite_expr(arg)?;
                }
                Ok(())
            }
            ExprKind::BinOp(bin_op) => {
                self.rewrite_expr(bin_op.lhs.as_mut())?;
                self.rewrite_expr(bin_op.rhs.as_mut())
            }
            ExprKind::UnOp(un_op) => self.rewrite_expr(un_op.operand.as_mut()),
            ExprKind::Assign(assign) => {
                self.rewrite_expr(assign.target.as_mut())?;
                self.rewrite_expr(assign.value.as_mut())
            }
            ExprKind::Break(expr_break) => {
                if let Some(value) = expr_break.value.as_mut() {
                    self.rewrite_expr(value)?;
                }
                Ok(())
            }
            ExprKind::Return(expr_return) => {
                if let Some(value) = expr_return.value.as_mut() {
                    self.rewrite_expr(value)?;
                }
                Ok(())
            }
            ExprKind::Let(expr_let) => self.rewrite_expr(expr_let.expr.as_mut()),
            ExprKind::Tuple(tuple) => {
                for value in &mut tuple.values {
                    self.rewrite_expr(value)?;
                }
                Ok(())
            }
            ExprKind::Paren(paren) => self.rewrite_expr(paren.expr.as_mut()),
            ExprKind::Locator(_)
            | ExprKind::Value(_)
            | ExprKind::Continue(_)
            | ExprKind::Error(_) => Ok(()),
        }
    }

    /// Desugar one try block, consuming it.
    ///
    /// The block's statements are rewritten under a fresh label pushed onto
    /// the scope stack, so propagation operators in the body (including a
    /// tail operator, and excluding anything nested under a further try
    /// block or function) exit through this block's label. The tail value,
    /// or unit when there is none, is wrapped as a success.
    fn desugar_try_block(&mut self, try_block: ExprTryBlock) -> Result<ExprKind> {
        let ExprTryBlock { span, mut body } = try_block;

        let label = Label::fresh();
        debug!("lowering try block at {span} under {label}");

        self.scopes.push(label);
        let rewritten = body
            .stmts
            .iter_mut()
            .try_for_each(|stmt| self.rewrite_stmt(stmt));
        self.scopes.pop();
        rewritten?;

        let tail = body.take_last_expr().unwrap_or_else(Expr::unit);
        let mut lowered = ExprBlock::new_stmts(mem::take(&mut body.stmts))
            .with_label(label)
            .with_span(span);
        lowered.push_expr(factory::wrap_success(tail, span));
        Ok(ExprKind::Block(lowered))
    }

    /// Desugar one propagation operator, consuming it.
    fn rewrite_propagation(&mut self, op: ExprTry) -> Result<ExprKind> {
        let span = op.span;
        let mut operand = *op.expr;
        self.rewrite_expr(&mut operand)?;

        match self.scopes.last().copied() {
            Some(label) => {
                trace!("propagation operator at {span} exits through {label}");
                Ok(factory::propagate_match(
                    operand,
                    span,
                    factory::FailureExit::Break(label),
                ))
            }
            None if self.fn_depth > 0 => {
                trace!("propagation operator at {span} exits through the enclosing function");
                Ok(factory::propagate_match(
                    operand,
                    span,
                    factory::FailureExit::Return,
                ))
            }
            None => {
                self.diagnostics.add_diagnostic(
                    Diagnostic::error("propagation operator outside a try block or function")
                        .with_span(span)
                        .with_code(MISPLACED_PROPAGATION_OPERATOR)
                        .with_suggestion("wrap the expression in a `try { ... }` block"),
                );
                Ok(ExprKind::Error(ExprError::new(span)))
            }
        }
    }
}

/// Whether any try block or propagation operator remains under `node`.
/// The pass post-condition is that this returns false; tests and the
/// pass itself rely on it.
pub fn contains_propagation_nodes(node: &Node) -> bool {
    match node.kind() {
        NodeKind::File(file) => file.items.iter().any(item_contains),
        NodeKind::Item(item) => item_contains(item),
        NodeKind::Expr(expr) => expr_contains(expr),
    }
}

fn item_contains(item: &Item) -> bool {
    match item.kind() {
        ItemKind::Module(module) => module.items.iter().any(item_contains),
        ItemKind::DefFunction(func) => expr_contains(&func.body),
        ItemKind::DefConst(def) => expr_contains(&def.value),
        ItemKind::Expr(expr) => expr_contains(expr),
    }
}

fn stmt_contains(stmt: &BlockStmt) -> bool {
    match stmt {
        BlockStmt::Item(item) => item_contains(item),
        BlockStmt::Let(stmt_let) => {
            stmt_let.init.iter().any(expr_contains) || stmt_let.diverge.iter().any(expr_contains)
        }
        BlockStmt::Expr(stmt_expr) => expr_contains(&stmt_expr.expr),
        BlockStmt::Noop => false,
    }
}

fn expr_contains(expr: &Expr) -> bool {
    match expr.kind() {
        ExprKind::TryBlock(_) | ExprKind::Try(_) => true,
        ExprKind::Block(block) => block.stmts.iter().any(stmt_contains),
        ExprKind::Match(expr_match) => {
            expr_contains(&expr_match.scrutinee)
                || expr_match.arms.iter().any(|arm| {
                    arm.guard.iter().any(|guard| expr_contains(guard)) || expr_contains(&arm.body)
                })
        }
        ExprKind::If(expr_if) => {
            expr_contains(&expr_if.cond)
                || expr_contains(&expr_if.then)
                || expr_if.elze.iter().any(|elze| expr_contains(elze))
        }
        ExprKind::Loop(expr_loop) => expr_contains(&expr_loop.body),
        ExprKind::While(expr_while) => {
            expr_contains(&expr_while.cond) || expr_contains(&expr_while.body)
        }
        ExprKind::Invoke(invoke) => {
            let target = match &invoke.target {
                ExprInvokeTarget::Expr(target) => expr_contains(target),
                ExprInvokeTarget::Function(_) => false,
            };
            target || invoke.args.iter().any(expr_contains)
        }
        ExprKind::BinOp(bin_op) => expr_contains(&bin_op.lhs) || expr_contains(&bin_op.rhs),
        ExprKind::UnOp(un_op) => expr_contains(&un_op.operand),
        ExprKind::Assign(assign) => expr_contains(&assign.target) || expr_contains(&assign.value),
        ExprKind::Break(expr_break) => expr_break.value.iter().any(|value| expr_contains(value)),
        ExprKind::Return(expr_return) => {
            expr_return.value.iter().any(|value| expr_contains(value))
        }
        ExprKind::Let(expr_let) => expr_contains(&expr_let.expr),
        ExprKind::Tuple(tuple) => tuple.values.iter().any(expr_contains),
        ExprKind::Paren(paren) => expr_contains(&paren.expr),
        ExprKind::Locator(_) | ExprKind::Value(_) | ExprKind::Continue(_) | ExprKind::Error(_) => {
            false
        }
    }
}
