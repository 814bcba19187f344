use itertools::Itertools;
use pretty_assertions::assert_eq;

use opal_core::ast::{
    BlockStmt, BlockStmtExpr, Expr, ExprBlock, ExprInvokeTarget, ExprKind, ExprMatch, ExprTry,
    ExprTryBlock, File, Ident, Item, ItemDefConst, ItemDefFunction, ItemKind, Node, NodeKind,
    Pattern, PatternKind, Value,
};
use opal_core::diagnostics::{DiagnosticLevel, DiagnosticManager};
use opal_core::id::Label;

use super::*;

fn int(value: i64) -> Expr {
    Expr::value(Value::int(value))
}

fn var(name: &str) -> Expr {
    Expr::ident(name.into())
}

fn call(name: &str, args: Vec<Expr>) -> Expr {
    opal_core::ast::ExprInvoke::new_function(opal_core::ast::Locator::ident(name.into()), args)
        .into()
}

fn try_op(operand: Expr) -> Expr {
    ExprTry::new(operand).into()
}

fn try_block(body: ExprBlock) -> Expr {
    ExprTryBlock::new(body).into()
}

/// `{ stmts; tail }` with each stmt in statement position, tail as the value.
fn body(stmts: Vec<BlockStmt>, tail: Option<Expr>) -> ExprBlock {
    let mut block = ExprBlock::new_stmts(stmts);
    if let Some(tail) = tail {
        block.push_expr(tail);
    }
    block
}

fn stmt(expr: Expr) -> BlockStmt {
    BlockStmt::Expr(BlockStmtExpr::new(expr).with_semicolon(true))
}

fn lower_expr(expr: Expr) -> (Expr, DiagnosticManager) {
    let diagnostics = DiagnosticManager::new();
    let mut node = Node::expr(expr);
    lower_try_blocks(&mut node, &diagnostics).expect("lowering never fails on well-formed trees");
    let NodeKind::Expr(expr) = node.into_kind() else {
        panic!("expression node stays an expression node");
    };
    (expr, diagnostics)
}

fn as_labeled_block(expr: &Expr) -> (&ExprBlock, Label) {
    let ExprKind::Block(block) = expr.kind() else {
        panic!("expected a block, got {expr}");
    };
    let label = block.label.expect("expected a labeled block");
    (block, label)
}

fn tail_of(block: &ExprBlock) -> &Expr {
    block.last_expr().expect("block has a tail expression")
}

/// Assert `expr` is a one-argument call to `name` and return the argument.
fn unwrap_call<'e>(expr: &'e Expr, name: &str) -> &'e Expr {
    let ExprKind::Invoke(invoke) = expr.kind() else {
        panic!("expected a call to {name}, got {expr}");
    };
    let ExprInvokeTarget::Function(locator) = &invoke.target else {
        panic!("expected a named call target");
    };
    assert_eq!(locator.to_string(), name);
    assert_eq!(invoke.args.len(), 1);
    &invoke.args[0]
}

fn as_match(expr: &Expr) -> &ExprMatch {
    let ExprKind::Match(expr_match) = expr.kind() else {
        panic!("expected a match, got {expr}");
    };
    expr_match
}

fn bound_ident(pat: &Pattern) -> &Ident {
    let PatternKind::TupleStruct(tuple_struct) = pat.kind() else {
        panic!("expected a constructor pattern");
    };
    assert_eq!(tuple_struct.patterns.len(), 1);
    tuple_struct.patterns[0].as_ident().expect("binding pattern")
}

#[test]
fn lowers_empty_try_block_to_wrapped_unit() {
    let (lowered, diagnostics) = lower_expr(try_block(body(vec![], None)));

    let (block, _) = as_labeled_block(&lowered);
    assert_eq!(block.stmts.len(), 1);
    let wrapped = unwrap_call(tail_of(block), "Ok");
    assert_eq!(wrapped, &Expr::unit());
    assert!(diagnostics.get_diagnostics().is_empty());
}

#[test]
fn lowers_simple_success_value() {
    let (lowered, diagnostics) = lower_expr(try_block(body(vec![], Some(int(5)))));

    let (block, _) = as_labeled_block(&lowered);
    assert_eq!(unwrap_call(tail_of(block), "Ok"), &int(5));
    assert!(diagnostics.get_diagnostics().is_empty());
    assert!(!contains_propagation_nodes(&Node::expr(lowered)));
}

#[test]
fn lowers_propagation_and_tail_composition() {
    // try { x?; y }
    let input = try_block(body(vec![stmt(try_op(var("x")))], Some(var("y"))));
    let (lowered, diagnostics) = lower_expr(input);

    let (block, label) = as_labeled_block(&lowered);
    assert_eq!(block.stmts.len(), 2);

    // x? became: match x { Ok(v) => v, Err(e) => break 'label Err(From::from(e)) }
    let BlockStmt::Expr(first) = &block.stmts[0] else {
        panic!("expected the rewritten operator in statement position");
    };
    assert!(!first.has_value());
    let lowered_op = as_match(&first.expr);
    assert_eq!(lowered_op.scrutinee.as_ref(), &var("x"));
    assert_eq!(lowered_op.arms.len(), 2);

    let ok_bind = bound_ident(&lowered_op.arms[0].pat);
    assert!(ok_bind.as_str().starts_with("__opal_ok"));
    assert_eq!(lowered_op.arms[0].body.as_ref(), &Expr::ident(ok_bind.clone()));

    let err_bind = bound_ident(&lowered_op.arms[1].pat).clone();
    let ExprKind::Break(exit) = lowered_op.arms[1].body.kind() else {
        panic!("failure arm exits the labeled region");
    };
    assert_eq!(exit.label, Some(label));
    let failure = exit.value.as_deref().expect("break carries the failure");
    let converted = unwrap_call(failure, "Err");
    assert_eq!(unwrap_call(converted, "From::from"), &Expr::ident(err_bind));

    // the tail wraps as a success
    assert_eq!(unwrap_call(tail_of(block), "Ok"), &var("y"));
    assert!(diagnostics.get_diagnostics().is_empty());
}

#[test]
fn nested_blocks_resolve_to_innermost_label() {
    // try { a?; try { b? } }
    let inner = try_block(body(vec![], Some(try_op(var("b")))));
    let input = try_block(body(vec![stmt(try_op(var("a")))], Some(inner)));
    let (lowered, diagnostics) = lower_expr(input);

    let (outer_block, outer_label) = as_labeled_block(&lowered);

    // a? targets the outer label
    let BlockStmt::Expr(first) = &outer_block.stmts[0] else {
        panic!("expected the rewritten operator in statement position");
    };
    let ExprKind::Break(outer_exit) = as_match(&first.expr).arms[1].body.kind() else {
        panic!("failure arm exits the labeled region");
    };
    assert_eq!(outer_exit.label, Some(outer_label));

    // b? targets the inner label, never the outer one
    let (inner_block, inner_label) = as_labeled_block(unwrap_call(tail_of(outer_block), "Ok"));
    assert_ne!(inner_label, outer_label);
    let inner_op = as_match(unwrap_call(tail_of(inner_block), "Ok"));
    let ExprKind::Break(inner_exit) = inner_op.arms[1].body.kind() else {
        panic!("failure arm exits the labeled region");
    };
    assert_eq!(inner_exit.label, Some(inner_label));

    assert!(diagnostics.get_diagnostics().is_empty());
    assert!(!contains_propagation_nodes(&Node::expr(lowered)));
}

#[test]
fn identity_on_tree_without_propagation() {
    let input: Expr = opal_core::ast::ExprIf {
        span: opal_core::span::Span::null(),
        cond: Box::new(var("flag")),
        then: Box::new(call("produce", vec![int(1), var("x")])),
        elze: Some(Box::new(Expr::block(body(
            vec![stmt(call("consume", vec![var("x")]))],
            Some(int(2)),
        )))),
    }
    .into();

    let (lowered, diagnostics) = lower_expr(input.clone());
    assert_eq!(lowered, input);
    assert!(diagnostics.get_diagnostics().is_empty());
}

#[test]
fn lowering_is_idempotent() {
    let input = try_block(body(vec![stmt(try_op(var("x")))], Some(var("y"))));
    let (once, _) = lower_expr(input);
    let (twice, diagnostics) = lower_expr(once.clone());

    assert_eq!(twice, once);
    assert!(diagnostics.get_diagnostics().is_empty());
}

#[test]
fn misplaced_operator_reports_and_poisons() {
    let (lowered, diagnostics) = lower_expr(try_op(var("x")));

    assert!(matches!(lowered.kind(), ExprKind::Error(_)));

    let reported = diagnostics.get_diagnostics();
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].level, DiagnosticLevel::Error);
    assert_eq!(
        reported[0].code.as_deref(),
        Some(MISPLACED_PROPAGATION_OPERATOR)
    );
}

#[test]
fn operator_in_function_targets_function_return() {
    let func = ItemDefFunction::new_simple(Ident::new("fetch"), try_op(var("source")));
    let mut node = Node::file(File {
        path: "test.opal".into(),
        items: vec![Item::new(ItemKind::DefFunction(func))],
    });

    let diagnostics = DiagnosticManager::new();
    lower_try_blocks(&mut node, &diagnostics).unwrap();

    let NodeKind::File(file) = node.kind() else {
        panic!("file node stays a file node");
    };
    let ItemKind::DefFunction(func) = file.items[0].kind() else {
        panic!("function item stays a function item");
    };
    let lowered_op = as_match(&func.body);
    assert_eq!(lowered_op.scrutinee.as_ref(), &var("source"));
    let ExprKind::Return(exit) = lowered_op.arms[1].body.kind() else {
        panic!("failure arm returns from the function");
    };
    let failure = exit.value.as_deref().expect("return carries the failure");
    unwrap_call(failure, "Err");
    assert!(diagnostics.get_diagnostics().is_empty());
}

#[test]
fn operator_in_const_initializer_is_misplaced() {
    let def = ItemDefConst::new(Ident::new("SEED"), try_op(var("entropy")));
    let mut node = Node::file(File {
        path: "test.opal".into(),
        items: vec![Item::new(ItemKind::DefConst(def))],
    });

    let diagnostics = DiagnosticManager::new();
    lower_try_blocks(&mut node, &diagnostics).unwrap();

    let reported = diagnostics.get_diagnostics();
    assert_eq!(reported.len(), 1);
    assert_eq!(
        reported[0].code.as_deref(),
        Some(MISPLACED_PROPAGATION_OPERATOR)
    );

    let NodeKind::File(file) = node.kind() else {
        panic!("file node stays a file node");
    };
    let ItemKind::DefConst(def) = file.items[0].kind() else {
        panic!("const item stays a const item");
    };
    assert!(matches!(def.value.kind(), ExprKind::Error(_)));
}

#[test]
fn nested_function_masks_enclosing_try_scope() {
    // try { fn helper() { a? }  5 }
    let helper = ItemDefFunction::new_simple(Ident::new("helper"), try_op(var("a")));
    let input = try_block(body(
        vec![BlockStmt::item(Item::new(ItemKind::DefFunction(helper)))],
        Some(int(5)),
    ));

    let (lowered, diagnostics) = lower_expr(input);

    let (block, _) = as_labeled_block(&lowered);
    let BlockStmt::Item(item) = &block.stmts[0] else {
        panic!("function item stays in place");
    };
    let ItemKind::DefFunction(helper) = item.kind() else {
        panic!("function item stays a function item");
    };
    // inside the nested function the try label is out of scope, so the
    // operator falls back to the function's own error return
    let lowered_op = as_match(&helper.body);
    assert!(matches!(
        lowered_op.arms[1].body.kind(),
        ExprKind::Return(_)
    ));
    assert!(diagnostics.get_diagnostics().is_empty());
}

#[test]
fn labels_are_unique_across_sibling_blocks() {
    let stmts = (0..10)
        .map(|i| stmt(try_block(body(vec![], Some(int(i))))))
        .collect();
    let input: Expr = ExprKind::Block(ExprBlock::new_stmts(stmts)).into();

    let (lowered, diagnostics) = lower_expr(input);

    let ExprKind::Block(block) = lowered.kind() else {
        panic!("expected the surrounding block");
    };
    let labels: Vec<Label> = block
        .stmts
        .iter()
        .map(|stmt| {
            let BlockStmt::Expr(stmt) = stmt else {
                panic!("expected an expression statement");
            };
            as_labeled_block(&stmt.expr).1
        })
        .collect();

    assert_eq!(labels.iter().unique().count(), labels.len());
    assert!(diagnostics.get_diagnostics().is_empty());
}

#[test]
fn eliminates_propagation_nodes_everywhere() {
    // fn gnarly() { while try { a? } { consume(try { b }) } }
    let cond = try_block(body(vec![], Some(try_op(var("a")))));
    let loop_body = call("consume", vec![try_block(body(vec![], Some(var("b"))))]);
    let while_expr: Expr = opal_core::ast::ExprWhile {
        span: opal_core::span::Span::null(),
        cond: Box::new(cond),
        body: Box::new(loop_body),
    }
    .into();
    let func = ItemDefFunction::new_simple(Ident::new("gnarly"), while_expr);
    let mut node = Node::file(File {
        path: "test.opal".into(),
        items: vec![Item::new(ItemKind::DefFunction(func))],
    });

    let diagnostics = DiagnosticManager::new();
    lower_try_blocks(&mut node, &diagnostics).unwrap();

    assert!(!contains_propagation_nodes(&node));
    assert!(diagnostics.get_diagnostics().is_empty());
}
