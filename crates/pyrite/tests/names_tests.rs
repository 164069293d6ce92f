//! Name resolution as observed through emitted output: module-level versus
//! local binding, globals, builtins and reserved-word mangling.

mod common;

use common::*;
use pyrite::ast::{Expr, ExprLoc, Stmt, Target};

#[test]
fn module_names_live_on_the_module_object() {
    let js = compile_js(
        "m",
        vec![assign(Target::Name("x".to_owned()), int(1, 1), 1)],
        plain_options(),
    );
    assert!(js.contains("m['x'] = 1;"));
}

#[test]
fn function_locals_are_declared_and_bare() {
    let func = def(
        "f",
        &[],
        vec![
            assign(Target::Name("x".to_owned()), int(1, 2), 2),
            stmt(Stmt::Return(name("x", 3)), 3),
        ],
    );
    let js = compile_js("m", vec![stmt(Stmt::Function(func), 1)], plain_options());
    assert!(js.contains("var x;"));
    assert!(js.contains("x = 1;"));
    assert!(js.contains("return x;"));
}

#[test]
fn global_declaration_reuses_the_module_slot() {
    // x = 1
    // def f(): global x; x = 2
    let func = def(
        "f",
        &[],
        vec![
            stmt(Stmt::Global(vec!["x".to_owned()]), 3),
            assign(Target::Name("x".to_owned()), int(2, 4), 4),
        ],
    );
    let js = compile_js(
        "m",
        vec![
            assign(Target::Name("x".to_owned()), int(1, 1), 1),
            stmt(Stmt::Function(func), 2),
        ],
        plain_options(),
    );
    assert!(js.contains("m['x'] = 1;"));
    assert!(js.contains("m['x'] = 2;"), "the global assignment hits the module slot");
    assert!(!js.contains("var x;"), "a declared global never becomes a local");
}

#[test]
fn unknown_names_defer_to_module_level() {
    let js = compile_js(
        "m",
        vec![discard(call(name("helper", 1), vec![], 1), 1)],
        plain_options(),
    );
    // Unresolved names are emitted with the module prefix; the runtime
    // throws at execution time if the symbol never materializes.
    assert!(js.contains("m.helper();"));
}

#[test]
fn builtins_resolve_to_the_runtime_library() {
    let js = compile_js(
        "m",
        vec![discard(call(name("range", 1), vec![int(3, 1)], 1), 1)],
        plain_options(),
    );
    assert!(js.contains("pyjslib['range'](3);"));
}

#[test]
fn literal_constants_map_directly() {
    let js = compile_js(
        "m",
        vec![
            assign(Target::Name("t".to_owned()), name("True", 1), 1),
            assign(Target::Name("f".to_owned()), name("False", 2), 2),
            assign(Target::Name("n".to_owned()), name("None", 3), 3),
        ],
        plain_options(),
    );
    assert!(js.contains("m['t'] = true;"));
    assert!(js.contains("m['f'] = false;"));
    assert!(js.contains("m['n'] = null;"));
}

#[test]
fn reserved_words_are_mangled_in_the_variable_channel() {
    let func = def(
        "f",
        &["class"],
        vec![
            assign(Target::Name("delete".to_owned()), name("class", 2), 2),
            stmt(Stmt::Return(name("delete", 3)), 3),
        ],
    );
    let js = compile_js("m", vec![stmt(Stmt::Function(func), 1)], plain_options());
    assert!(js.contains("function($$class) {"));
    assert!(js.contains("var $$class,$$delete;"));
    assert!(js.contains("$$delete = $$class;"));
    assert!(js.contains("return $$delete;"));
}

#[test]
fn special_attributes_are_mangled_in_the_attribute_channel() {
    let js = compile_js(
        "m",
        vec![assign(
            Target::Name("p".to_owned()),
            getattr(name("cls", 1), "prototype", 1),
            1,
        )],
        plain_options(),
    );
    assert!(js.contains("m.cls['$$prototype']"));
    assert!(!js.contains("cls.prototype"));
}

#[test]
fn locals_shadow_builtins() {
    let func = def(
        "f",
        &["len"],
        vec![stmt(Stmt::Return(call(name("len", 2), vec![int(1, 2)], 2)), 2)],
    );
    let js = compile_js("m", vec![stmt(Stmt::Function(func), 1)], plain_options());
    assert!(js.contains("return len(1);"));
}

#[test]
fn attribute_chains_join_in_bracket_form() {
    let chain = getattr(getattr(name("a", 1), "b", 1), "c", 1);
    let js = compile_js(
        "m",
        vec![assign(Target::Name("r".to_owned()), chain, 1)],
        plain_options(),
    );
    assert!(js.contains("m['r'] = m.a['b']['c'];"));
}

#[test]
fn method_calls_with_keywords_use_the_dispatcher() {
    let target = getattr(name("obj", 1), "meth", 1);
    let call_expr = call_kw(
        target,
        vec![pyrite::ast::CallArg::Keyword {
            name: "x".to_owned(),
            value: int(1, 1),
        }],
        1,
    );
    let js = compile_js("m", vec![discard(call_expr, 1)], plain_options());
    assert!(js.contains("$pyjs_kwargs_call(m.obj, 'meth', null, null, [{x:1}]);"));
}

#[test]
fn star_args_use_the_dispatcher() {
    let call_expr = ExprLoc::new(
        Expr::Call(pyrite::ast::CallFunc {
            func: Box::new(name("f", 1)),
            args: vec![pyrite::ast::CallArg::Positional(int(1, 1))],
            star_args: Some(Box::new(name("rest", 1))),
            dstar_args: None,
        }),
        1,
    );
    let js = compile_js("m", vec![discard(call_expr, 1)], plain_options());
    assert!(js.contains("$pyjs_kwargs_call(m, 'f', m.rest, null, [{}, 1]);"));
}

#[test]
fn comparison_operators_lower_to_runtime_protocols() {
    let cmp = |op, lineno| {
        ExprLoc::new(
            Expr::Compare {
                left: Box::new(name("a", lineno)),
                ops: vec![(op, name("b", lineno))],
            },
            lineno,
        )
    };
    use pyrite::ast::CompareOp;
    let js = compile_js(
        "m",
        vec![
            assign(Target::Name("lt".to_owned()), cmp(CompareOp::Lt, 1), 1),
            assign(Target::Name("contains".to_owned()), cmp(CompareOp::In, 2), 2),
            assign(Target::Name("same".to_owned()), cmp(CompareOp::Is, 3), 3),
            assign(Target::Name("not_same".to_owned()), cmp(CompareOp::IsNot, 4), 4),
        ],
        plain_options(),
    );
    assert!(js.contains("(pyjslib['cmp'](m.a, m.b) == -1)"));
    assert!(js.contains("m.b.__contains__(m.a)"));
    assert!(js.contains("(m.a === m.b)"));
    assert!(js.contains("(m.a !== m.b)"));
}
