//! Whole-module translation: wrapper shape, functions, classes and the
//! assignment family.

mod common;

use common::*;
use pretty_assertions::assert_eq;
use pyrite::ast::{AugOp, AugTarget, ClassDef, Expr, ExprLoc, Literal, Stmt, Target};
use similar::TextDiff;

#[test]
fn module_wrapper_shape() {
    let js = compile_js("greeting", vec![], plain_options());
    assert!(js.contains("/* start module: greeting */"));
    assert!(js.contains("var greeting;"), "dot-free modules declare a short name");
    assert!(js.contains("$pyjs.loaded_modules['greeting'] = function (__mod_name__) {"));
    assert!(js.contains("if($pyjs.loaded_modules['greeting'].__was_initialized__) return $pyjs.loaded_modules['greeting'];"));
    assert!(js.contains("greeting.__was_initialized__ = true;"));
    assert!(js.contains("var __name__ = greeting.__name__ = __mod_name__;"));
    assert!(js.contains("return this;"));
    assert!(js.contains("}; /* end greeting */"));
    assert!(!js.contains("PYJS_DEPS"), "no imports, no deps trailer");
}

#[test]
fn dotted_module_gets_local_alias() {
    let js = compile_js("ui.widgets", vec![], plain_options());
    assert!(!js.contains("var ui.widgets;"));
    assert!(js.contains("ui['widgets'] = $pyjs.loaded_modules[\"ui.widgets\"];"));
    assert!(js.contains("var widgets = ui['widgets'];"));
}

#[test]
fn translation_is_deterministic() {
    let make = || {
        compile_js(
            "m",
            vec![
                assign(Target::Name("x".to_owned()), int(1, 1), 1),
                stmt(Stmt::Function(def("f", &["a"], vec![stmt(Stmt::Return(name("a", 2)), 2)])), 2),
            ],
            plain_options(),
        )
    };
    let first = make();
    let second = make();
    let diff = TextDiff::from_lines(&first, &second);
    assert!((diff.ratio() - 1.0).abs() < f32::EPSILON, "two runs must emit identical output");
    assert_eq!(first, second);
}

#[test]
fn identity_function() {
    // def f(x): return x
    let mut options = plain_options();
    options.function_argument_checking = true;
    let js = compile_js(
        "m",
        vec![stmt(
            Stmt::Function(def("f", &["x"], vec![stmt(Stmt::Return(name("x", 1)), 1)])),
            1,
        )],
        options,
    );
    assert!(js.contains("m['f'] = function(x) {"));
    assert!(js.contains(
        "if ($pyjs.options.arg_count && arguments.length != 1) $pyjs__exception_func_param(arguments.callee.__name__, 1, 1, arguments.length);"
    ));
    assert!(js.contains("return x;"));
    assert!(js.contains("m['f'].__name__ = 'f';"));
    assert!(js.contains("m['f'].__bind_type__ = 0;"));
    assert!(js.contains("m['f'].__args__ = [null,null,['x']];"));
}

#[test]
fn defaults_and_kwargs() {
    // def g(a, b=2, **kw): return (a, b, kw)
    let mut func = def(
        "g",
        &["a", "b", "kw"],
        vec![stmt(
            Stmt::Return(ExprLoc::new(
                Expr::Tuple(vec![name("a", 2), name("b", 2), name("kw", 2)]),
                2,
            )),
            2,
        )],
    );
    func.defaults = vec![int(2, 1)];
    func.kwargs = true;
    let mut options = plain_options();
    options.function_argument_checking = true;
    let js = compile_js("m", vec![stmt(Stmt::Function(func), 1)], options);

    assert!(js.contains("m['g'] = function(a, b) {"));
    // The keyword bundle is pulled off the argument tail by its sentinel.
    assert!(js.contains("typeof kw.$pyjs_is_kwarg == 'undefined'"));
    assert!(js.contains("delete kw['$pyjs_is_kwarg'];"));
    assert!(js.contains("kw = pyjslib['Dict']({});"));
    // The default for b comes from the argument descriptor.
    assert!(js.contains("if (typeof b == 'undefined') b=arguments.callee.__args__[3][1];"));
    assert!(js.contains("m['g'].__args__ = [null,['kw'],['a'],['b', 2]];"));
    assert!(js.contains("return new pyjslib['Tuple']([a, b, kw]);"));
}

#[test]
fn varargs_collect_into_tuple() {
    let mut func = def("f", &["a", "rest"], vec![stmt(Stmt::Return(name("rest", 1)), 1)]);
    func.varargs = true;
    let js = compile_js("m", vec![stmt(Stmt::Function(func), 1)], plain_options());
    assert!(js.contains("var rest = new Array();"));
    assert!(js.contains("for (var $pyjs__va_arg = 1; $pyjs__va_arg < arguments.length; $pyjs__va_arg++) {"));
    assert!(js.contains("rest = pyjslib['Tuple'](rest);"));
}

#[test]
fn simple_class_with_init() {
    // class C: def __init__(self, v): self.v = v
    let init = def(
        "__init__",
        &["self", "v"],
        vec![assign(
            Target::Attr {
                object: name("self", 2),
                attr: "v".to_owned(),
            },
            name("v", 2),
            2,
        )],
    );
    let class = ClassDef {
        name: "C".to_owned(),
        bases: vec![],
        code: vec![stmt(Stmt::Function(init), 2)],
    };
    let js = compile_js("m", vec![stmt(Stmt::Class(class), 1)], plain_options());

    assert!(js.contains("m['C'] = (function(){"));
    assert!(js.contains("var $cls_instance = $pyjs__class_instance('C');"));
    assert!(js.contains("$cls_definition.__md5__ = '"));
    assert!(js.contains("$method = $pyjs__bind_method($cls_instance, '__init__', function(v) {"));
    assert!(js.contains("var self = this;"));
    assert!(js.contains("var self = arguments[0];"));
    assert!(js.contains("self.v = v;"));
    assert!(js.contains("$cls_definition['__init__'] = $method;"));
    // Bound method tag plus the argument descriptor close the binding call.
    assert!(js.contains("\t, 1, [null,null,['self'],['v']]);"));
    assert!(js.contains("return $pyjs__class_function($cls_instance, $cls_definition,"));
    assert!(js.contains("new Array(pyjslib.object));"));
}

#[test]
fn class_md5_varies_with_definition() {
    let class = |n: &str| ClassDef {
        name: n.to_owned(),
        bases: vec![],
        code: vec![],
    };
    let a = compile_js("m", vec![stmt(Stmt::Class(class("A")), 1)], plain_options());
    let b = compile_js("m", vec![stmt(Stmt::Class(class("B")), 1)], plain_options());
    let md5_of = |js: &str| {
        let start = js.find("__md5__ = '").expect("md5 present") + "__md5__ = '".len();
        js[start..start + 32].to_owned()
    };
    assert_ne!(md5_of(&a), md5_of(&b));
}

#[test]
fn augmented_subscript_assignment_evaluates_once() {
    // a[i] += 1
    let mut options = plain_options();
    options.operator_funcs = true;
    let js = compile_js(
        "m",
        vec![stmt(
            Stmt::AugAssign {
                target: AugTarget::Subscript {
                    object: name("a", 1),
                    index: name("i", 1),
                },
                op: AugOp::Add,
                value: int(1, 1),
            },
            1,
        )],
        options,
    );
    assert!(js.contains("var $augsub000001 = m.i;"));
    assert!(js.contains("var $augexpr000001 = m.a;"));
    assert!(js.contains("$augexpr000001.__setitem__($augsub000001,"));
    assert!(js.contains(".__getitem__($augsub000001)"));
    assert!(js.contains("pyjslib['op_add']($add000001,$add000002)"));
    // Container and key are each evaluated exactly once.
    assert_eq!(js.matches("m.a").count(), 1);
    assert_eq!(js.matches("m.i").count(), 1);
}

#[test]
fn multiple_assignment_uses_one_temporary() {
    // a = b = expr
    let js = compile_js(
        "m",
        vec![stmt(
            Stmt::Assign {
                targets: vec![Target::Name("a".to_owned()), Target::Name("b".to_owned())],
                value: int(7, 1),
            },
            1,
        )],
        plain_options(),
    );
    assert!(js.contains("$assign000001 = 7;"));
    assert!(js.contains("m['a'] = $assign000001;"));
    assert!(js.contains("m['b'] = $assign000001;"));
}

#[test]
fn tuple_destructuring_goes_through_getitem() {
    let js = compile_js(
        "m",
        vec![stmt(
            Stmt::Assign {
                targets: vec![Target::Tuple(vec![
                    Target::Name("a".to_owned()),
                    Target::Name("b".to_owned()),
                ])],
                value: name("pair", 1),
            },
            1,
        )],
        plain_options(),
    );
    assert!(js.contains("var $tupleassign000001 = m.pair;"));
    assert!(js.contains("m['a'] = $tupleassign000001.__getitem__(0);"));
    assert!(js.contains("m['b'] = $tupleassign000001.__getitem__(1);"));
}

#[test]
fn subscript_store_uses_item_protocol() {
    let js = compile_js(
        "m",
        vec![assign(
            Target::Subscript {
                object: name("d", 1),
                index: string("k", 1),
            },
            int(3, 1),
            1,
        )],
        plain_options(),
    );
    assert!(js.contains("m.d.__setitem__(String('k'), 3);"));
    assert!(!js.contains("m.d[String('k')] ="), "no native subscript stores");
}

#[test]
fn delete_forms() {
    let js = compile_js(
        "m",
        vec![
            assign(Target::Name("x".to_owned()), int(1, 1), 1),
            stmt(Stmt::Delete(Target::Name("x".to_owned())), 2),
            stmt(
                Stmt::Delete(Target::Attr {
                    object: name("o", 3),
                    attr: "p".to_owned(),
                }),
                3,
            ),
            stmt(
                Stmt::Delete(Target::Subscript {
                    object: name("d", 4),
                    index: int(0, 4),
                }),
                4,
            ),
        ],
        plain_options(),
    );
    assert!(js.contains("delete m['x'];"));
    assert!(js.contains("pyjslib['delattr'](m.o, 'p');"));
    assert!(js.contains("m.d.__delitem__(0);"));
}

#[test]
fn print_statement_lowered_to_runtime() {
    let js = compile_js(
        "m",
        vec![stmt(
            Stmt::Print {
                args: vec![string("hi", 1)],
                newline: true,
            },
            1,
        )],
        plain_options(),
    );
    assert!(js.contains("pyjslib['printFunc']([String('hi')], 1);"));
}

#[test]
fn lambda_becomes_named_helper() {
    let lambda = ExprLoc::new(
        Expr::Lambda(Box::new(pyrite::ast::LambdaDef {
            argnames: vec!["a".to_owned()],
            defaults: vec![],
            varargs: false,
            kwargs: false,
            body: ExprLoc::new(
                Expr::Op {
                    op: pyrite::ast::BinOp::Add,
                    left: Box::new(name("a", 1)),
                    right: Box::new(int(1, 1)),
                },
                1,
            ),
        })),
        1,
    );
    let js = compile_js(
        "m",
        vec![assign(Target::Name("inc".to_owned()), lambda, 1)],
        plain_options(),
    );
    assert!(js.contains("var $lambda000001;"));
    assert!(js.contains("$lambda000001 = function(a) {"));
    assert!(js.contains("return (a + 1);"));
    assert!(js.contains("m['inc'] = $lambda000001;"));
}

#[test]
fn list_comprehension_is_an_iife_over_the_loop_protocol() {
    // [x for x in items if x]
    let comp = ExprLoc::new(
        Expr::ListComp {
            expr: Box::new(name("x", 1)),
            generators: vec![pyrite::ast::CompFor {
                target: Target::Name("x".to_owned()),
                iter: name("items", 1),
                ifs: vec![name("x", 1)],
                lineno: 1,
            }],
        },
        1,
    );
    let js = compile_js(
        "m",
        vec![assign(Target::Name("r".to_owned()), comp, 1)],
        plain_options(),
    );
    assert!(js.contains("var $listcomp000001 = pyjslib['List']();"));
    assert!(js.contains(".__iter__();"));
    assert!(js.contains(".next();"));
    assert!(js.contains("$listcomp000001.append(x);"));
    assert!(js.contains("if (e.__name__ != 'StopIteration') {"));
    assert!(js.contains("return $listcomp000001;}()"));
}

#[test]
fn string_formatting_uses_sprintf() {
    let fmt = ExprLoc::new(
        Expr::Op {
            op: pyrite::ast::BinOp::Mod,
            left: Box::new(string("%s!", 1)),
            right: Box::new(name("who", 1)),
        },
        1,
    );
    let js = compile_js("m", vec![assign(Target::Name("s".to_owned()), fmt, 1)], plain_options());
    assert!(js.contains("pyjslib['sprintf'](String('%s!'), m.who)"));
}

#[test]
fn float_constants_round_trip_through_ryu() {
    let js = compile_js(
        "m",
        vec![assign(
            Target::Name("x".to_owned()),
            ExprLoc::constant(Literal::Float(2.5), 1),
            1,
        )],
        plain_options(),
    );
    assert!(js.contains("m['x'] = 2.5;"));
}
