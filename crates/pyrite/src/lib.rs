#![doc = include_str!("../../../README.md")]
#![expect(clippy::struct_excessive_bools, reason = "compile switches are a flat flag surface")]

pub mod ast;
mod builtins;
mod classes;
mod error;
mod expressions;
mod functions;
mod generator;
mod intrinsics;
mod mangle;
mod options;
mod output;
mod scope;
mod statements;
mod translator;

pub use crate::{
    error::{CollectDiag, DiagnosticSink, NoDiag, StderrDiag, TranslateError},
    options::{CompileOptions, OptionPreset},
    scope::NameKind,
    translator::{
        FindFile, JsImport, JsImportLocation, JsImportMode, TranslationUnit, translate, translate_with_lookup,
    },
};
