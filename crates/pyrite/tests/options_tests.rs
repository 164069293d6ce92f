//! Compile switches: decorators, the marker call, presets and the
//! per-function options stack.

mod common;

use common::*;
use pyrite::ast::{Expr, ExprLoc, Stmt, Target};

#[test]
fn speed_marker_call_drops_print_statements() {
    let marker = call(name("setCompilerOptions", 2), vec![string("Speed", 2)], 2);
    let js = compile_js(
        "m",
        vec![
            from_import("__pyjamas__", &["setCompilerOptions"], 1),
            discard(marker, 2),
            stmt(
                Stmt::Print {
                    args: vec![string("hi", 3)],
                    newline: true,
                },
                3,
            ),
        ],
        plain_options(),
    );
    assert!(!js.contains("printFunc"), "Speed disables print statements");
    assert!(!js.contains("setCompilerOptions"), "the marker call emits nothing");
}

#[test]
fn compiler_decorator_scopes_to_one_function() {
    // @compiler.noPrintStatements applies inside f only.
    let mut func = def(
        "f",
        &[],
        vec![stmt(
            Stmt::Print {
                args: vec![string("inner", 2)],
                newline: true,
            },
            2,
        )],
    );
    func.decorators = vec![getattr(name("compiler", 1), "noPrintStatements", 1)];
    let js = compile_js(
        "m",
        vec![
            stmt(Stmt::Function(func), 1),
            stmt(
                Stmt::Print {
                    args: vec![string("outer", 3)],
                    newline: true,
                },
                3,
            ),
        ],
        plain_options(),
    );
    // Only the module-level print survives: the options frame pops with f.
    assert_eq!(js.matches("printFunc").count(), 1);
    assert!(js.contains("String('outer')"));
    assert!(!js.contains("String('inner')"));
}

#[test]
fn ordinary_decorators_wrap_the_function() {
    let mut func = def("f", &[], vec![stmt(Stmt::Pass, 2)]);
    func.decorators = vec![name("memoize", 1)];
    let js = compile_js("m", vec![stmt(Stmt::Function(func), 1)], plain_options());
    assert!(js.contains("m['f'] = m.memoize(pyjslib['staticmethod'](m['f']));"));
}

#[test]
fn operator_funcs_switch_selects_lowering() {
    let sum = |lineno| {
        ExprLoc::new(
            Expr::Op {
                op: pyrite::ast::BinOp::Add,
                left: Box::new(name("a", lineno)),
                right: Box::new(name("b", lineno)),
            },
            lineno,
        )
    };
    let js = compile_js(
        "m",
        vec![assign(Target::Name("r".to_owned()), sum(1), 1)],
        plain_options(),
    );
    assert!(js.contains("m['r'] = (m.a + m.b);"));
    assert!(!js.contains("op_add"));

    let mut options = plain_options();
    options.operator_funcs = true;
    let js = compile_js(
        "m",
        vec![assign(Target::Name("r".to_owned()), sum(1), 1)],
        options,
    );
    assert!(js.contains("pyjslib['op_add']($add000001,$add000002)"));
    assert!(js.contains("typeof ($add000001=m.a)==typeof ($add000002=m.b)"));
    assert!(js.contains("(typeof $add000001=='number'||typeof $add000001=='string')"));
}

#[test]
fn inline_bool_expands_the_truth_protocol() {
    let body = vec![stmt(
        Stmt::While {
            test: name("x", 1),
            body: vec![stmt(Stmt::Pass, 2)],
            orelse: None,
        },
        1,
    )];
    let js = compile_js("m", body.clone(), plain_options());
    assert!(js.contains("while (pyjslib['bool'](m.x)) {"));

    let mut options = plain_options();
    options.inline_bool = true;
    let js = compile_js("m", body, options);
    assert!(js.contains("__nonzero__"));
    assert!(js.contains("__len__"));
    assert!(!js.contains("pyjslib['bool']"));
}

#[test]
fn inline_eq_expands_the_equality_protocol() {
    let compare = ExprLoc::new(
        Expr::Compare {
            left: Box::new(name("a", 1)),
            ops: vec![(pyrite::ast::CompareOp::Eq, name("b", 1))],
        },
        1,
    );
    let js = compile_js(
        "m",
        vec![assign(Target::Name("r".to_owned()), compare.clone(), 1)],
        plain_options(),
    );
    assert!(js.contains("pyjslib['eq'](m.a, m.b)"));

    let mut options = plain_options();
    options.inline_eq = true;
    let js = compile_js("m", vec![assign(Target::Name("r".to_owned()), compare, 1)], options);
    assert!(js.contains("__cmp__"));
    assert!(!js.contains("pyjslib['eq']"));
}

#[test]
fn inline_len_expands_builtin_len_calls() {
    let len_call = call(name("len", 1), vec![name("xs", 1)], 1);
    let js = compile_js(
        "m",
        vec![assign(Target::Name("n".to_owned()), len_call.clone(), 1)],
        plain_options(),
    );
    assert!(js.contains("pyjslib['len'](m.xs)"));

    let mut options = plain_options();
    options.inline_len = true;
    let js = compile_js("m", vec![assign(Target::Name("n".to_owned()), len_call, 1)], options);
    assert!(js.contains("typeof $len000001.__len__ == 'function'"));
    assert!(js.contains("object has no len()"));
}

#[test]
fn descriptors_route_attribute_stores_through_setattr() {
    let store = assign(
        Target::Attr {
            object: name("o", 1),
            attr: "p".to_owned(),
        },
        int(1, 1),
        1,
    );
    let js = compile_js("m", vec![store.clone()], plain_options());
    assert!(js.contains("m.o.p = 1;"));

    let mut options = plain_options();
    options.descriptors = true;
    let js = compile_js("m", vec![store], options);
    assert!(js.contains("pyjslib['setattr'](m.o, 'p', 1);"));
}

#[test]
fn bound_methods_route_reads_through_getattr() {
    let read = assign(
        Target::Name("f".to_owned()),
        getattr(name("o", 1), "meth", 1),
        1,
    );
    let mut options = plain_options();
    options.bound_methods = true;
    let js = compile_js("m", vec![read], options);
    assert!(js.contains("typeof m.o['meth'] == 'function' && m.o.__is_instance__"));
    assert!(js.contains("pyjslib['getattr'](m.o, 'meth')"));
}

#[test]
fn attribute_checking_guards_undefined_reads() {
    let read = assign(
        Target::Name("f".to_owned()),
        getattr(name("o", 1), "p", 1),
        1,
    );
    let mut options = plain_options();
    options.attribute_checking = true;
    let js = compile_js("m", vec![read], options);
    assert!(js.contains("typeof m.o['p']=='undefined'?"));
    assert!(js.contains("is undefined"));
}

#[test]
fn debug_wraps_calls_in_the_retry_shim() {
    let mut options = plain_options();
    options.debug = true;
    let js = compile_js(
        "m",
        vec![discard(call(name("f", 1), vec![], 1), 1)],
        options,
    );
    assert!(js.contains("$pyjs_dbg_000001_retry"));
    assert!(js.contains("pyjslib['debugReport'](\"Module m at line 1 :\\n\""));
    assert!(js.contains("debugger;"));
}

#[test]
fn source_tracking_instruments_functions_and_lines() {
    let mut options = plain_options();
    options.source_tracking = true;
    options.line_tracking = true;
    let func = def("f", &[], vec![stmt(Stmt::Return(int(1, 2)), 2)]);
    let js = compile_js("m", vec![stmt(Stmt::Function(func), 1)], options);
    assert!(js.contains("$pyjs.track={module:'m',lineno:1};$pyjs.trackstack.push($pyjs.track);"));
    assert!(js.contains("$pyjs.track.lineno=2;"));
    assert!(js.contains("var $pyjs__ret = 1;"));
    assert!(js.contains("$pyjs.trackstack.pop();$pyjs.track=$pyjs.trackstack.pop();$pyjs.trackstack.push($pyjs.track);"));
    assert!(js.contains("return $pyjs__ret;"));
}

#[test]
fn store_source_emits_the_line_table() {
    let mut options = plain_options();
    options.source_tracking = true;
    options.store_source = true;
    let module = pyrite::ast::Module {
        body: vec![assign(Target::Name("x".to_owned()), int(1, 2), 2)],
    };
    let unit = pyrite::translate("m", &module, "# first\nx = 1\n", options, &mut pyrite::NoDiag)
        .expect("translation succeeds");
    assert!(unit.js.contains("m.__track_lines__ = new Array();"));
    assert!(unit.js.contains("m.__track_lines__[2] = \"m.py, line 2:\\n    x = 1\";"));
}
