use crate::ast::{BExpr, BItem, Expr, ExprKind, Item, Pattern};
use crate::id::Label;
use crate::span::Span;
use crate::{common_enum, common_struct};

common_enum! {
    pub enum BlockStmt {
        Item(BItem),
        Let(StmtLet),
        Expr(BlockStmtExpr),
        /// really noop
        Noop,
    }
}

impl BlockStmt {
    pub fn span(&self) -> Span {
        match self {
            Self::Expr(expr) => expr.expr.span(),
            Self::Let(stmt) => Span::union(
                [
                    stmt.init.as_ref().map(|expr| expr.span()),
                    stmt.diverge.as_ref().map(|expr| expr.span()),
                ]
                .into_iter()
                .flatten(),
            ),
            Self::Item(_) | Self::Noop => Span::null(),
        }
    }

    pub fn noop() -> Self {
        Self::Noop
    }

    pub fn item(item: Item) -> Self {
        Self::Item(Box::new(item))
    }

    pub fn is_unit(&self) -> bool {
        match self {
            Self::Expr(expr) => expr.expr.is_unit(),
            Self::Noop => true,
            _ => false,
        }
    }
}

common_struct! {
    pub struct BlockStmtExpr {
        pub expr: BExpr,
        /// default is to keep semicolon, but for some expr like if, the default case is different
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub semicolon: Option<bool>,
    }
}

impl BlockStmtExpr {
    pub fn new(expr: impl Into<BExpr>) -> Self {
        Self {
            expr: expr.into(),
            semicolon: None,
        }
    }

    pub fn with_semicolon(mut self, semicolon: bool) -> Self {
        self.semicolon = Some(semicolon);
        self
    }

    pub fn has_value(&self) -> bool {
        self.semicolon != Some(true)
    }
}

common_struct! {
    pub struct StmtLet {
        pub pat: Pattern,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub init: Option<Expr>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub diverge: Option<Expr>,
    }
}

impl StmtLet {
    pub fn new(pat: Pattern, init: Option<Expr>, diverge: Option<Expr>) -> Self {
        assert!(diverge.is_none() || init.is_some(), "diverge without init");
        Self { pat, init, diverge }
    }

    pub fn new_simple(name: crate::ast::Ident, value: Expr) -> Self {
        Self {
            pat: Pattern::ident(name),
            init: Some(value),
            diverge: None,
        }
    }
}

pub type StmtChunk = Vec<BlockStmt>;

common_struct! {
    pub struct ExprBlock {
        #[serde(default)]
        pub span: Span,
        /// Labeled blocks are a lowering target; the parser never labels one.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub label: Option<Label>,
        pub stmts: StmtChunk,
    }
}

impl ExprBlock {
    pub fn new() -> Self {
        Self {
            span: Span::null(),
            label: None,
            stmts: Vec::new(),
        }
    }

    pub fn new_stmts(stmts: StmtChunk) -> Self {
        Self {
            span: Span::null(),
            label: None,
            stmts,
        }
    }

    pub fn new_stmts_expr(stmts: StmtChunk, expr: impl Into<BExpr>) -> Self {
        let mut this = Self::new_stmts(stmts);
        this.push_expr(expr);
        this
    }

    pub fn new_expr(expr: Expr) -> Self {
        Self {
            span: Span::null(),
            label: None,
            stmts: vec![BlockStmt::Expr(BlockStmtExpr::new(expr))],
        }
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Force a trailing value-expression statement into statement position.
    pub fn seal(&mut self) {
        if let Some(BlockStmt::Expr(expr)) = self.stmts.last_mut() {
            if expr.semicolon == Some(false) {
                expr.semicolon = Some(true);
            }
        }
    }

    pub fn push_stmt(&mut self, stmt: BlockStmt) {
        self.stmts.push(stmt);
        self.seal();
    }

    /// Append `stmt` as the block's tail expression.
    pub fn push_expr(&mut self, stmt: impl Into<BExpr>) {
        self.seal();
        self.stmts.push(BlockStmt::Expr(
            BlockStmtExpr::new(stmt).with_semicolon(false),
        ));
    }

    pub fn last_expr(&self) -> Option<&Expr> {
        let stmt = self.stmts.last()?;
        let BlockStmt::Expr(expr) = stmt else {
            return None;
        };
        if !expr.has_value() {
            return None;
        }
        Some(&expr.expr)
    }

    pub fn last_expr_mut(&mut self) -> Option<&mut Expr> {
        let stmt = self.stmts.last_mut()?;
        let BlockStmt::Expr(expr) = stmt else {
            return None;
        };
        if !expr.has_value() {
            return None;
        }
        Some(&mut expr.expr)
    }

    /// Detach the tail expression, leaving only statement-position stmts.
    pub fn take_last_expr(&mut self) -> Option<Expr> {
        self.last_expr()?;
        let Some(BlockStmt::Expr(stmt)) = self.stmts.pop() else {
            unreachable!("last_expr checked the tail shape");
        };
        Some(*stmt.expr)
    }

    /// returns the first few stmts, leaving behind the last expr
    pub fn first_stmts(&self) -> &[BlockStmt] {
        if self.last_expr().is_some() {
            &self.stmts[..self.stmts.len() - 1]
        } else {
            &self.stmts
        }
    }

    pub fn into_expr(mut self) -> Expr {
        if self.stmts.len() == 1 && self.label.is_none() {
            if let Some(expr) = self.last_expr_mut() {
                return std::mem::replace(expr, Expr::unit());
            }
        }

        ExprKind::Block(self).into()
    }

    pub fn span(&self) -> Span {
        if self.span.is_null() {
            Span::union(self.stmts.iter().map(BlockStmt::span))
        } else {
            self.span
        }
    }
}

impl Default for ExprBlock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ast::Value;

    #[test]
    fn push_expr_keeps_only_the_tail_as_value() {
        let mut block = ExprBlock::new();
        block.push_expr(Expr::value(Value::int(1)));
        block.push_expr(Expr::value(Value::int(2)));

        assert_eq!(block.stmts.len(), 2);
        assert_eq!(block.last_expr(), Some(&Expr::value(Value::int(2))));
        assert_eq!(block.first_stmts().len(), 1);
    }

    #[test]
    fn take_last_expr_detaches_the_tail() {
        let mut block = ExprBlock::new();
        block.push_stmt(BlockStmt::Let(StmtLet::new_simple(
            "x".into(),
            Expr::value(Value::int(1)),
        )));
        block.push_expr(Expr::ident("x".into()));

        assert_eq!(block.take_last_expr(), Some(Expr::ident("x".into())));
        assert_eq!(block.stmts.len(), 1);
        assert_eq!(block.take_last_expr(), None);
    }

    #[test]
    fn sealed_block_has_no_tail() {
        let mut block = ExprBlock::new();
        block.push_expr(Expr::value(Value::int(5)));
        block.seal();
        assert_eq!(block.last_expr(), None);
    }
}
