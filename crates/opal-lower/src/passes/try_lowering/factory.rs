//! Node factory for the lowered shapes.
//!
//! Success and failure wrapping are ordinary constructor calls on the
//! prelude names `Ok` and `Err`; failure conversion is a call to
//! `From::from`. The pass attaches no types to any of these; inference
//! resolves them later.

use opal_core::ast::{
    Expr, ExprBreak, ExprInvoke, ExprKind, ExprMatch, ExprReturn, Ident, Locator, MatchArm, Path,
    Pattern, PatternTupleStruct,
};
use opal_core::id::{self, Label};
use opal_core::span::Span;

const SUCCESS_CTOR: &str = "Ok";
const FAILURE_CTOR: &str = "Err";
const FAILURE_CONVERT: [&str; 2] = ["From", "from"];

/// Where a rewritten propagation operator sends its failure value.
pub(super) enum FailureExit {
    /// `break 'label Err(...)` out of the enclosing try block.
    Break(Label),
    /// `return Err(...)` out of the enclosing function.
    Return,
}

/// `Ok(value)`
pub(super) fn wrap_success(value: Expr, span: Span) -> Expr {
    ctor_call(SUCCESS_CTOR, value, span)
}

/// `Err(value)`
pub(super) fn wrap_failure(value: Expr, span: Span) -> Expr {
    ctor_call(FAILURE_CTOR, value, span)
}

/// `From::from(value)`
pub(super) fn convert_failure(value: Expr, span: Span) -> Expr {
    let segments = FAILURE_CONVERT.iter().map(|s| Ident::new(*s)).collect();
    invoke(Locator::path(Path::new(segments)), value, span)
}

/// `match operand { Ok(v) => v, Err(e) => <exit> Err(From::from(e)) }`
/// with hygienic `v` and `e`.
pub(super) fn propagate_match(operand: Expr, span: Span, exit: FailureExit) -> ExprKind {
    let ok_bind = id::fresh_ident("ok");
    let err_bind = id::fresh_ident("err");

    let ok_arm = MatchArm::new(
        tuple_struct_pat(SUCCESS_CTOR, ok_bind.clone()),
        Expr::ident(ok_bind),
    );

    let failure = wrap_failure(convert_failure(Expr::ident(err_bind.clone()), span), span);
    let exit_expr: Expr = match exit {
        FailureExit::Break(label) => ExprBreak::with_label_value(label, failure).into(),
        FailureExit::Return => ExprReturn::new(Some(failure)).into(),
    };
    let err_arm = MatchArm::new(tuple_struct_pat(FAILURE_CTOR, err_bind), exit_expr);

    let mut lowered = ExprMatch::new(operand, vec![ok_arm, err_arm]);
    lowered.span = span;
    ExprKind::Match(lowered)
}

fn tuple_struct_pat(ctor: &str, bind: Ident) -> Pattern {
    PatternTupleStruct {
        name: Locator::ident(Ident::new(ctor)),
        patterns: vec![Pattern::ident(bind)],
    }
    .into()
}

fn ctor_call(name: &str, value: Expr, span: Span) -> Expr {
    invoke(Locator::ident(Ident::new(name)), value, span)
}

fn invoke(target: Locator, value: Expr, span: Span) -> Expr {
    let mut call = ExprInvoke::new_function(target, vec![value]);
    call.span = span;
    call.into()
}
