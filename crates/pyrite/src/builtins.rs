//! Name tables for the runtime library the emitted code executes against.
//!
//! Name resolution falls through to these tables after every lexical scope has
//! been searched: first the builtin functions, then the builtin classes, then
//! the literal constants. A hit resolves to a subscript on the runtime library
//! object so remapped names stay addressable.

use crate::mangle::attrib_remap;

/// Functions provided by the runtime library.
pub(crate) const BUILTIN_FUNCTIONS: &[&str] = &[
    "__import__",
    "abs",
    "all",
    "any",
    "bool",
    "callable",
    "chr",
    "cmp",
    "delattr",
    "dir",
    "divmod",
    "enumerate",
    "filter",
    "float",
    "getattr",
    "hasattr",
    "hash",
    "hex",
    "int",
    "isinstance",
    "len",
    "map",
    "max",
    "min",
    "oct",
    "open",
    "ord",
    "pow",
    "range",
    "repr",
    "round",
    "setattr",
    "staticmethod",
    "str",
    "super",
    "type",
];

/// Classes (including the exception hierarchy) provided by the runtime library.
pub(crate) const BUILTIN_CLASSES: &[&str] = &[
    "ArithmeticError",
    "AttributeError",
    "BaseException",
    "Exception",
    "GeneratorExit",
    "ImportError",
    "IndexError",
    "KeyError",
    "LookupError",
    "NameError",
    "NotImplementedError",
    "RuntimeError",
    "StandardError",
    "StopIteration",
    "TypeError",
    "ValueError",
    "ZeroDivisionError",
    "dict",
    "list",
    "object",
    "property",
    "tuple",
];

/// Python literal constants with direct JavaScript spellings.
pub(crate) fn literal_constant(name: &str) -> Option<&'static str> {
    match name {
        "True" => Some("true"),
        "False" => Some("false"),
        "None" => Some("null"),
        _ => None,
    }
}

pub(crate) fn is_builtin(name: &str) -> bool {
    BUILTIN_FUNCTIONS.contains(&name) || BUILTIN_CLASSES.contains(&name)
}

/// The emitted reference for a runtime-library builtin.
pub(crate) fn builtin_ref(name: &str) -> String {
    format!("pyjslib['{}']", attrib_remap(name))
}
