//! Lexical scopes and name resolution.
//!
//! A scope frame maps each Python name to the kind it was declared as and the
//! JavaScript name it resolves to. Frames stack up for modules, functions and
//! class bodies; resolution walks innermost-out and then falls through to the
//! runtime builtin tables. Frame entries are insertion-ordered because the
//! emitted local `var` declaration list is built from them.

use indexmap::IndexMap;

use crate::builtins;
use crate::mangle::attrib_remap;

/// Classification of a resolved name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum NameKind {
    /// Provided by the runtime library.
    Builtin,
    /// An imported module bound inside a function or class body.
    Module,
    /// An imported module bound at module level.
    RootModule,
    Class,
    Function,
    Method,
    /// A class-body attribute assignment.
    Attribute,
    Variable,
    /// Declared `global` in the current scope.
    Global,
    Imported,
    /// A compiler intrinsic imported from the magic intrinsics module.
    Intrinsic,
    /// A raw JavaScript name imported from the native-names module.
    NativeJs,
}

/// One resolved entry in a scope frame.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub(crate) struct LookupEntry {
    pub kind: NameKind,
    pub py_name: String,
    pub js_name: String,
}

/// A single lexical scope.
#[derive(Debug, Clone, Default)]
pub(crate) struct Frame {
    entries: IndexMap<String, LookupEntry>,
    /// Optional prefix used to synthesize qualified names when resolution
    /// lands in this frame from an inner scope.
    pub prefix: Option<String>,
}

impl Frame {
    pub fn entries(&self) -> impl Iterator<Item = &LookupEntry> {
        self.entries.values()
    }
}

/// A successful name resolution.
#[derive(Debug, Clone)]
pub(crate) struct Lookup {
    pub kind: NameKind,
    pub js_name: String,
    /// Frame index the hit came from; `None` for builtin-table hits.
    pub depth: Option<usize>,
    /// True when the hit was in the innermost frame.
    pub is_local: bool,
}

/// The stack of lexical scopes, innermost last.
#[derive(Debug, Default)]
pub(crate) struct ScopeStack {
    frames: Vec<Frame>,
}

impl ScopeStack {
    /// Creates a stack holding the module-level frame.
    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    pub fn push(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Pushes a previously popped frame back; class bodies reuse their
    /// private frame across member emissions this way.
    pub fn push_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Frame {
        self.frames.pop().expect("scope stack underflow")
    }

    pub fn innermost(&self) -> &Frame {
        self.frames.last().expect("scope stack is never empty")
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Records `py_name` in the innermost frame.
    ///
    /// The `js_name` must already be mangled. A name recorded twice keeps its
    /// first kind; later additions only update the emitted name.
    pub fn add(&mut self, kind: NameKind, py_name: &str, js_name: String) {
        let frame = self.frames.last_mut().expect("scope stack is never empty");
        let kind = frame.entries.get(py_name).map_or(kind, |existing| existing.kind);
        frame.entries.insert(
            py_name.to_owned(),
            LookupEntry {
                kind,
                py_name: py_name.to_owned(),
                js_name,
            },
        );
    }

    /// Resolves `name` against the frames, then the builtin tables.
    pub fn lookup(&self, name: &str) -> Option<Lookup> {
        let max_depth = self.frames.len() - 1;
        for (depth, frame) in self.frames.iter().enumerate().rev() {
            if let Some(entry) = frame.entries.get(name) {
                return Some(Lookup {
                    kind: entry.kind,
                    js_name: entry.js_name.clone(),
                    depth: Some(depth),
                    is_local: depth == max_depth,
                });
            }
        }
        if builtins::is_builtin(name) {
            return Some(Lookup {
                kind: NameKind::Builtin,
                js_name: builtins::builtin_ref(name),
                depth: None,
                is_local: false,
            });
        }
        builtins::literal_constant(name).map(|js| Lookup {
            kind: NameKind::Builtin,
            js_name: js.to_owned(),
            depth: None,
            is_local: false,
        })
    }

    /// Finds the nearest scope prefix at or below `depth`.
    pub fn prefix_at(&self, depth: usize) -> Option<&str> {
        self.frames[..=depth]
            .iter()
            .rev()
            .find_map(|frame| frame.prefix.as_deref())
    }
}

/// Mangles a dotted name for emission: the head through the variable channel
/// (unless it resolves to a builtin) and the tail through the attribute join.
pub(crate) fn js_name(kind: NameKind, name: &str) -> String {
    let mut words: Vec<String> = name.split('.').map(str::to_owned).collect();
    if kind != NameKind::Builtin {
        words[0] = crate::mangle::vars_remap(&words[0]);
    }
    crate::mangle::attrib_join(&words)
}

/// Remaps a bare attribute name; dotted input is a caller bug.
pub(crate) fn attr_name(word: &str) -> String {
    debug_assert!(!word.contains('.'), "attribute names never contain dots");
    attrib_remap(word)
}
