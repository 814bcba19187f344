use crate::ast::{BExpr, BPattern, Expr, ExprBlock, Locator, Pattern};
use crate::id::Label;
use crate::span::Span;
use crate::{common_enum, common_struct};

fn span_or(span: Span, fallback: Span) -> Span {
    if span.is_null() {
        fallback
    } else {
        span
    }
}

fn union_spans(spans: impl IntoIterator<Item = Span>) -> Span {
    Span::union(spans)
}

common_struct! {
    /// `try { ... }`: evaluate statements, exit early with a wrapped
    /// failure on propagation, otherwise wrap the tail as a success.
    pub struct ExprTryBlock {
        #[serde(default)]
        pub span: Span,
        pub body: ExprBlock,
    }
}

impl ExprTryBlock {
    pub fn new(body: ExprBlock) -> Self {
        Self {
            span: Span::null(),
            body,
        }
    }

    pub fn span(&self) -> Span {
        span_or(self.span, self.body.span())
    }
}

common_struct! {
    /// `expr?`: unwrap a success value or exit the nearest enclosing
    /// propagation scope with the failure value.
    pub struct ExprTry {
        #[serde(default)]
        pub span: Span,
        pub expr: BExpr,
    }
}

impl ExprTry {
    pub fn new(expr: impl Into<BExpr>) -> Self {
        Self {
            span: Span::null(),
            expr: expr.into(),
        }
    }

    pub fn span(&self) -> Span {
        span_or(self.span, self.expr.span())
    }
}

common_struct! {
    pub struct MatchArm {
        #[serde(default)]
        pub span: Span,
        pub pat: Pattern,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub guard: Option<BExpr>,
        pub body: BExpr,
    }
}

impl MatchArm {
    pub fn new(pat: Pattern, body: impl Into<BExpr>) -> Self {
        Self {
            span: Span::null(),
            pat,
            guard: None,
            body: body.into(),
        }
    }

    pub fn span(&self) -> Span {
        span_or(self.span, self.body.span())
    }
}

common_struct! {
    pub struct ExprMatch {
        #[serde(default)]
        pub span: Span,
        pub scrutinee: BExpr,
        pub arms: Vec<MatchArm>,
    }
}

impl ExprMatch {
    pub fn new(scrutinee: impl Into<BExpr>, arms: Vec<MatchArm>) -> Self {
        Self {
            span: Span::null(),
            scrutinee: scrutinee.into(),
            arms,
        }
    }

    pub fn span(&self) -> Span {
        span_or(
            self.span,
            union_spans(
                [self.scrutinee.span()]
                    .into_iter()
                    .chain(self.arms.iter().map(MatchArm::span)),
            ),
        )
    }
}

common_struct! {
    pub struct ExprIf {
        #[serde(default)]
        pub span: Span,
        pub cond: BExpr,
        pub then: BExpr,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub elze: Option<BExpr>,
    }
}

impl ExprIf {
    pub fn span(&self) -> Span {
        span_or(
            self.span,
            union_spans(
                [self.cond.span(), self.then.span()]
                    .into_iter()
                    .chain(self.elze.as_ref().map(|elze| elze.span())),
            ),
        )
    }
}

common_struct! {
    pub struct ExprLoop {
        #[serde(default)]
        pub span: Span,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub label: Option<Label>,
        pub body: BExpr,
    }
}

impl ExprLoop {
    pub fn span(&self) -> Span {
        span_or(self.span, self.body.span())
    }
}

common_struct! {
    pub struct ExprWhile {
        #[serde(default)]
        pub span: Span,
        pub cond: BExpr,
        pub body: BExpr,
    }
}

impl ExprWhile {
    pub fn span(&self) -> Span {
        span_or(self.span, union_spans([self.cond.span(), self.body.span()]))
    }
}

common_enum! {
    pub enum ExprInvokeTarget {
        Function(Locator),
        Expr(BExpr),
    }
}

common_struct! {
    pub struct ExprInvoke {
        #[serde(default)]
        pub span: Span,
        pub target: ExprInvokeTarget,
        pub args: Vec<Expr>,
    }
}

impl ExprInvoke {
    pub fn new_function(locator: Locator, args: Vec<Expr>) -> Self {
        Self {
            span: Span::null(),
            target: ExprInvokeTarget::Function(locator),
            args,
        }
    }

    pub fn span(&self) -> Span {
        let target = match &self.target {
            ExprInvokeTarget::Function(_) => Span::null(),
            ExprInvokeTarget::Expr(expr) => expr.span(),
        };
        span_or(
            self.span,
            union_spans([target].into_iter().chain(self.args.iter().map(Expr::span))),
        )
    }
}

common_enum! {
    pub enum BinOpKind {
        Add,
        Sub,
        Mul,
        Div,
        Rem,
        Eq,
        Ne,
        Lt,
        Le,
        Gt,
        Ge,
        And,
        Or,
    }
}

common_struct! {
    pub struct ExprBinOp {
        #[serde(default)]
        pub span: Span,
        pub kind: BinOpKind,
        pub lhs: BExpr,
        pub rhs: BExpr,
    }
}

impl ExprBinOp {
    pub fn span(&self) -> Span {
        span_or(self.span, union_spans([self.lhs.span(), self.rhs.span()]))
    }
}

common_enum! {
    pub enum UnOpKind {
        Not,
        Neg,
    }
}

common_struct! {
    pub struct ExprUnOp {
        #[serde(default)]
        pub span: Span,
        pub kind: UnOpKind,
        pub operand: BExpr,
    }
}

impl ExprUnOp {
    pub fn span(&self) -> Span {
        span_or(self.span, self.operand.span())
    }
}

common_struct! {
    pub struct ExprAssign {
        #[serde(default)]
        pub span: Span,
        pub target: BExpr,
        pub value: BExpr,
    }
}

impl ExprAssign {
    pub fn span(&self) -> Span {
        span_or(
            self.span,
            union_spans([self.target.span(), self.value.span()]),
        )
    }
}

common_struct! {
    /// Exit the labeled region carrying an optional value.
    pub struct ExprBreak {
        #[serde(default)]
        pub span: Span,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub label: Option<Label>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub value: Option<BExpr>,
    }
}

impl ExprBreak {
    pub fn with_label_value(label: Label, value: Expr) -> Self {
        Self {
            span: Span::null(),
            label: Some(label),
            value: Some(Box::new(value)),
        }
    }

    pub fn span(&self) -> Span {
        span_or(
            self.span,
            self.value
                .as_ref()
                .map(|value| value.span())
                .unwrap_or_else(Span::null),
        )
    }
}

common_struct! {
    pub struct ExprContinue {
        #[serde(default)]
        pub span: Span,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub label: Option<Label>,
    }
}

impl ExprContinue {
    pub fn span(&self) -> Span {
        self.span
    }
}

common_struct! {
    pub struct ExprReturn {
        #[serde(default)]
        pub span: Span,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub value: Option<BExpr>,
    }
}

impl ExprReturn {
    pub fn new(value: Option<Expr>) -> Self {
        Self {
            span: Span::null(),
            value: value.map(Box::new),
        }
    }

    pub fn span(&self) -> Span {
        span_or(
            self.span,
            self.value
                .as_ref()
                .map(|value| value.span())
                .unwrap_or_else(Span::null),
        )
    }
}

common_struct! {
    /// `let pat = expr` in expression position, e.g. `if let`.
    pub struct ExprLet {
        #[serde(default)]
        pub span: Span,
        pub pat: BPattern,
        pub expr: BExpr,
    }
}

impl ExprLet {
    pub fn span(&self) -> Span {
        span_or(self.span, self.expr.span())
    }
}

common_struct! {
    pub struct ExprTuple {
        #[serde(default)]
        pub span: Span,
        pub values: Vec<Expr>,
    }
}

impl ExprTuple {
    pub fn span(&self) -> Span {
        span_or(self.span, union_spans(self.values.iter().map(Expr::span)))
    }
}

common_struct! {
    pub struct ExprParen {
        #[serde(default)]
        pub span: Span,
        pub expr: BExpr,
    }
}

impl ExprParen {
    pub fn span(&self) -> Span {
        span_or(self.span, self.expr.span())
    }
}

common_struct! {
    pub struct ExprError {
        #[serde(default)]
        pub span: Span,
    }
}

impl ExprError {
    pub fn new(span: Span) -> Self {
        Self { span }
    }

    pub fn span(&self) -> Span {
        self.span
    }
}
