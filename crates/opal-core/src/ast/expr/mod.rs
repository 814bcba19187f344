use crate::ast::{BValue, Ident, Locator, Ty, TySlot, Value};
use crate::span::Span;
use crate::{common_enum, common_struct};

mod stmt;
mod value;

pub use stmt::*;
pub use value::*;

pub type BExpr = Box<Expr>;

common_enum! {
    /// Expr is an expression that returns a value.
    pub enum ExprKind {
        Locator(Locator),
        Value(BValue),
        Block(ExprBlock),
        /// `try { ... }`; eliminated by lowering before type-checking.
        TryBlock(ExprTryBlock),
        /// `expr?`; eliminated together with [`ExprKind::TryBlock`].
        Try(ExprTry),
        Match(ExprMatch),
        If(ExprIf),
        Loop(ExprLoop),
        While(ExprWhile),
        Invoke(ExprInvoke),
        BinOp(ExprBinOp),
        UnOp(ExprUnOp),
        Assign(ExprAssign),
        Break(ExprBreak),
        Continue(ExprContinue),
        Return(ExprReturn),
        Let(ExprLet),
        Tuple(ExprTuple),
        Paren(ExprParen),
        /// Poison node standing in for an expression that already has a
        /// reported diagnostic. Later stages skip over it.
        Error(ExprError),
    }
}

common_struct! {
    pub struct Expr {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub ty: TySlot,
        #[serde(flatten)]
        pub kind: ExprKind,
    }
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Self { ty: None, kind }
    }

    pub fn with_ty(kind: ExprKind, ty: TySlot) -> Self {
        Self { ty, kind }
    }

    pub fn ty(&self) -> Option<&Ty> {
        self.ty.as_ref()
    }

    pub fn set_ty(&mut self, ty: Ty) {
        self.ty = Some(ty);
    }

    pub fn kind(&self) -> &ExprKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ExprKind {
        &mut self.kind
    }

    pub fn into_parts(self) -> (TySlot, ExprKind) {
        (self.ty, self.kind)
    }

    pub fn from_parts(ty: TySlot, kind: ExprKind) -> Self {
        Self { ty, kind }
    }

    pub fn unit() -> Expr {
        ExprKind::Value(Box::new(Value::unit())).into()
    }

    pub fn is_unit(&self) -> bool {
        match &self.kind {
            ExprKind::Value(value) => value.is_unit(),
            _ => false,
        }
    }

    pub fn value(v: Value) -> Expr {
        ExprKind::Value(Box::new(v)).into()
    }

    pub fn ident(name: Ident) -> Expr {
        ExprKind::Locator(Locator::ident(name)).into()
    }

    pub fn locator(locator: Locator) -> Expr {
        ExprKind::Locator(locator).into()
    }

    pub fn block(block: ExprBlock) -> Expr {
        block.into_expr()
    }

    pub fn into_block(self) -> ExprBlock {
        let (ty, kind) = self.into_parts();
        match kind {
            ExprKind::Block(block) => block,
            other => ExprBlock::new_expr(Expr::from_parts(ty, other)),
        }
    }

    pub fn span(&self) -> Span {
        match &self.kind {
            ExprKind::Locator(_) | ExprKind::Value(_) => Span::null(),
            ExprKind::Block(block) => block.span(),
            ExprKind::TryBlock(try_block) => try_block.span(),
            ExprKind::Try(expr_try) => expr_try.span(),
            ExprKind::Match(expr_match) => expr_match.span(),
            ExprKind::If(expr_if) => expr_if.span(),
            ExprKind::Loop(expr_loop) => expr_loop.span(),
            ExprKind::While(expr_while) => expr_while.span(),
            ExprKind::Invoke(invoke) => invoke.span(),
            ExprKind::BinOp(bin_op) => bin_op.span(),
            ExprKind::UnOp(un_op) => un_op.span(),
            ExprKind::Assign(assign) => assign.span(),
            ExprKind::Break(expr_break) => expr_break.span(),
            ExprKind::Continue(expr_continue) => expr_continue.span(),
            ExprKind::Return(expr_return) => expr_return.span(),
            ExprKind::Let(expr_let) => expr_let.span(),
            ExprKind::Tuple(tuple) => tuple.span(),
            ExprKind::Paren(paren) => paren.span(),
            ExprKind::Error(error) => error.span(),
        }
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(text) => f.write_str(&text),
            Err(_) => f.write_str("<expr serialization error>"),
        }
    }
}

impl<T> From<T> for Expr
where
    ExprKind: From<T>,
{
    fn from(value: T) -> Self {
        Expr::new(ExprKind::from(value))
    }
}

impl From<BExpr> for Expr {
    fn from(expr: BExpr) -> Self {
        *expr
    }
}
