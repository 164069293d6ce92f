//! The generator transform: functions containing `yield` become resumable
//! state machines.

mod common;

use common::*;
use pyrite::ast::{Expr, ExprLoc, Stmt, Target};

/// def gen(n):
///     for i in range(n):
///         yield i * i
fn squares_generator() -> Stmt {
    let product = ExprLoc::new(
        Expr::Op {
            op: pyrite::ast::BinOp::Mul,
            left: Box::new(name("i", 2)),
            right: Box::new(name("i", 2)),
        },
        2,
    );
    let body = vec![discard(ExprLoc::new(Expr::Yield(Some(Box::new(product))), 2), 2)];
    Stmt::Function(def(
        "gen",
        &["n"],
        vec![stmt(
            Stmt::For {
                target: Target::Name("i".to_owned()),
                iter: call(name("range", 2), vec![name("n", 2)], 2),
                body,
                orelse: None,
            },
            2,
        )],
    ))
}

#[test]
fn generator_object_protocol() {
    let js = compile_js("m", vec![stmt(squares_generator(), 1)], plain_options());
    assert!(js.contains("var $generator_state = [0], $generator_exc = [null], $yield_value = null, $exc = null, $is_executing=false;"));
    assert!(js.contains("$generator['next'] = function () {"));
    assert!(js.contains("$generator['send'] = function ($val) {"));
    assert!(js.contains("$generator['throw'] = function ($exc_type, $exc_value) {"));
    assert!(js.contains("$generator['close'] = function () {"));
    assert!(js.contains("$generator['__iter__'] = function () {return $generator;};"));
    assert!(js.contains("$generator['__next'] = function () {"));
    assert!(js.contains("if ($is_executing) throw pyjslib.ValueError('generator already executing');"));
    assert!(js.contains("throw pyjslib.StopIteration;"));
    assert!(js.contains("return $generator;"));
}

#[test]
fn yield_parks_value_and_records_state() {
    let js = compile_js("m", vec![stmt(squares_generator(), 1)], plain_options());
    assert!(js.contains("$yield_value = (i * i);"));
    assert!(js.contains("$yielding = true;"));
    assert!(js.contains("return $yield_value;"));
    // Resumption delivers exceptions injected via throw() at the yield site.
    assert!(js.contains("if (typeof $exc != 'undefined' && $exc != null) {"));
    assert!(js.contains("throw $exc;"));
}

#[test]
fn state_numbers_are_contiguous_per_depth() {
    let js = compile_js("m", vec![stmt(squares_generator(), 1)], plain_options());
    for depth in 0..2 {
        let mut max_state = 0;
        while js.contains(&format!("if ($generator_state[{depth}] == {} ", max_state + 1))
            || js.contains(&format!("if ($generator_state[{depth}] == {})", max_state + 1))
        {
            max_state += 1;
        }
        assert!(max_state >= 2, "depth {depth} has at least an entry and an exit case");
        for state in 1..=max_state {
            assert!(
                js.contains(&format!("if ($generator_state[{depth}] == {state})")),
                "case {state} at depth {depth} is addressable"
            );
        }
    }
}

#[test]
fn for_loop_resumes_through_state_reset() {
    let js = compile_js("m", vec![stmt(squares_generator(), 1)], plain_options());
    assert!(js.contains("for (;true;$generator_state[1] = 0) {"));
    assert!(js.contains("if (typeof $generator_state[1] == 'undefined' || $generator_state[1] == 0) {"));
    assert!(js.contains("if (e.__name__ != 'StopIteration') {"));
}

#[test]
fn plain_functions_are_untouched() {
    let js = compile_js(
        "m",
        vec![stmt(
            Stmt::Function(def("f", &[], vec![stmt(Stmt::Return(int(1, 1)), 1)])),
            1,
        )],
        plain_options(),
    );
    assert!(!js.contains("$generator"));
    assert!(!js.contains("$yield_value"));
}

#[test]
fn bare_return_is_allowed_inside_generators() {
    let body = vec![
        discard(ExprLoc::new(Expr::Yield(Some(Box::new(int(1, 2)))), 2), 2),
        stmt(Stmt::Return(none(3)), 3),
    ];
    let js = compile_js(
        "m",
        vec![stmt(Stmt::Function(def("g", &[], body)), 1)],
        plain_options(),
    );
    assert!(js.contains("return;"));
}

#[test]
fn valued_return_is_rejected_inside_generators() {
    let body = vec![
        discard(ExprLoc::new(Expr::Yield(Some(Box::new(int(1, 2)))), 2), 2),
        stmt(Stmt::Return(int(5, 3)), 3),
    ];
    let err = compile_err("m", vec![stmt(Stmt::Function(def("g", &[], body)), 1)], plain_options());
    assert!(err.to_string().contains("'return' with argument inside generator"));
    assert_eq!(err.lineno(), 3);
}

#[test]
fn while_loop_in_generator_reenters_through_state_guard() {
    // def g():
    //     while x:
    //         yield 1
    let body = vec![stmt(
        Stmt::While {
            test: name("x", 2),
            body: vec![discard(ExprLoc::new(Expr::Yield(Some(Box::new(int(1, 3)))), 3), 3)],
            orelse: None,
        },
        2,
    )];
    let js = compile_js(
        "m",
        vec![stmt(Stmt::Function(def("g", &[], body)), 1)],
        plain_options(),
    );
    // The loop head doubles as resume condition and loop test.
    assert!(js.contains("for (;($generator_state[0] == 1 && $generator_state[1] != 0)||(pyjslib['bool'](m.x));$generator_state[1] = 0) {"));
}

#[test]
fn native_return_disables_source_tracking_in_generators() {
    // A raw-JS literal containing `return` cannot coexist with the tracking
    // epilogue inside the state machine.
    let mut options = plain_options();
    options.source_tracking = true;
    options.line_tracking = true;
    let body = vec![
        discard(call(name("JS", 2), vec![string("return $x;", 2)], 2), 2),
        discard(ExprLoc::new(Expr::Yield(Some(Box::new(int(1, 3)))), 3), 3),
    ];
    let js = compile_js(
        "m",
        vec![
            from_import("__pyjamas__", &["JS"], 1),
            stmt(Stmt::Function(def("g", &[], body)), 2),
        ],
        options,
    );
    assert!(js.contains("return $x;"));
    assert!(
        !js.contains("$pyjs.trackstack.push"),
        "tracking is off inside a generator with a native return"
    );
}
