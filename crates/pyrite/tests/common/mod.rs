//! Shared helpers for building input trees and running translations.

#![allow(dead_code)]

use pyrite::ast::{
    CallArg, CallFunc, Expr, ExprLoc, FunctionDef, ImportName, Literal, Module, Stmt, StmtLoc, Target,
};
use pyrite::{CompileOptions, NoDiag, TranslateError, TranslationUnit, translate};

/// Translates `body` as module `name` with the given options.
pub fn compile_with(name: &str, body: Vec<StmtLoc>, options: CompileOptions) -> TranslationUnit {
    translate(name, &Module { body }, "", options, &mut NoDiag).expect("translation succeeds")
}

/// Translates and returns the emitted JavaScript only.
pub fn compile_js(name: &str, body: Vec<StmtLoc>, options: CompileOptions) -> String {
    compile_with(name, body, options).js
}

/// Translates expecting a failure.
pub fn compile_err(name: &str, body: Vec<StmtLoc>, options: CompileOptions) -> TranslateError {
    translate(name, &Module { body }, "", options, &mut NoDiag).expect_err("translation fails")
}

/// Options with every switch off: the minimal, easiest-to-read output.
pub fn plain_options() -> CompileOptions {
    CompileOptions {
        debug: false,
        print_statements: true,
        function_argument_checking: false,
        attribute_checking: false,
        bound_methods: false,
        descriptors: false,
        source_tracking: false,
        line_tracking: false,
        store_source: false,
        inline_bool: false,
        inline_eq: false,
        inline_len: false,
        operator_funcs: false,
    }
}

pub fn stmt(stmt: Stmt, lineno: u32) -> StmtLoc {
    StmtLoc::new(stmt, lineno)
}

pub fn name(name: &str, lineno: u32) -> ExprLoc {
    ExprLoc::name(name, lineno)
}

pub fn int(value: i64, lineno: u32) -> ExprLoc {
    ExprLoc::constant(Literal::Int(value), lineno)
}

pub fn string(value: &str, lineno: u32) -> ExprLoc {
    ExprLoc::constant(Literal::Str(value.to_owned()), lineno)
}

pub fn none(lineno: u32) -> ExprLoc {
    ExprLoc::constant(Literal::None, lineno)
}

pub fn getattr(object: ExprLoc, attr: &str, lineno: u32) -> ExprLoc {
    ExprLoc::new(
        Expr::Getattr {
            object: Box::new(object),
            attr: attr.to_owned(),
        },
        lineno,
    )
}

pub fn call(func: ExprLoc, args: Vec<ExprLoc>, lineno: u32) -> ExprLoc {
    ExprLoc::new(Expr::Call(CallFunc::positional(func, args)), lineno)
}

pub fn call_kw(func: ExprLoc, args: Vec<CallArg>, lineno: u32) -> ExprLoc {
    ExprLoc::new(
        Expr::Call(CallFunc {
            func: Box::new(func),
            args,
            star_args: None,
            dstar_args: None,
        }),
        lineno,
    )
}

pub fn assign(target: Target, value: ExprLoc, lineno: u32) -> StmtLoc {
    stmt(
        Stmt::Assign {
            targets: vec![target],
            value,
        },
        lineno,
    )
}

pub fn discard(expr: ExprLoc, lineno: u32) -> StmtLoc {
    stmt(Stmt::Discard(expr), lineno)
}

/// A plain function definition with positional parameters only.
pub fn def(name: &str, args: &[&str], code: Vec<StmtLoc>) -> FunctionDef {
    FunctionDef {
        name: name.to_owned(),
        argnames: args.iter().map(|a| (*a).to_owned()).collect(),
        defaults: vec![],
        varargs: false,
        kwargs: false,
        code,
        decorators: vec![],
    }
}

pub fn import(names: &[&str], lineno: u32) -> StmtLoc {
    stmt(
        Stmt::Import {
            names: names.iter().map(|n| ImportName::plain(*n)).collect(),
        },
        lineno,
    )
}

pub fn from_import(module: &str, names: &[&str], lineno: u32) -> StmtLoc {
    stmt(
        Stmt::From {
            module: module.to_owned(),
            names: names.iter().map(|n| ImportName::plain(*n)).collect(),
        },
        lineno,
    )
}

/// The body of the first emitted function, between its header and closer.
pub fn function_body<'a>(js: &'a str, header: &str) -> &'a str {
    let start = js.find(header).expect("function header present");
    let rest = &js[start + header.len()..];
    let end = rest.find("};").expect("function closer present");
    &rest[..end]
}
