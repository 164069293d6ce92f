//! The translation driver: module wrapper emission, import handling and the
//! shared state every emitter leans on.
//!
//! One [`Translator`] exists per module translation. It owns the output
//! stream, the scope and options stacks and the generator bookkeeping; the
//! expression, statement, function, class and generator emitters are all
//! implemented on it. Nothing is written to the caller until the whole module
//! has been emitted successfully.

use std::collections::BTreeMap;

use indexmap::IndexSet;
use smallvec::{SmallVec, smallvec};

use crate::ast::{ImportName, Module};
use crate::classes::Klass;
use crate::error::{DiagnosticSink, TranslateError};
use crate::options::CompileOptions;
use crate::output::OutputStack;
use crate::scope::{self, NameKind, ScopeStack};

/// Callback probing whether a JavaScript file exists on the import path.
///
/// Supplied by the driver; the translator itself performs no I/O. A probe
/// miss produces a soft warning, never an error.
pub type FindFile<'a> = &'a dyn Fn(&str) -> bool;

/// The result of a successful module translation.
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    /// The emitted JavaScript text.
    pub js: String,
    /// Modules this unit depends on, in first-reference order, with parent
    /// packages of dotted imports included. Mirrors the `PYJS_DEPS` trailer.
    pub imported_modules: Vec<String>,
    /// JavaScript files requested via `jsimport(...)` or `.js` imports.
    pub imported_js: Vec<JsImport>,
}

/// One requested JavaScript file import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsImport {
    pub path: String,
    pub mode: JsImportMode,
    pub location: JsImportLocation,
}

/// How a JavaScript import should be linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum JsImportMode {
    #[default]
    Default,
    Static,
    Dynamic,
}

/// Where a statically linked JavaScript import should be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum JsImportLocation {
    Early,
    #[default]
    Middle,
    Late,
}

/// Translates one module and returns the emitted JavaScript plus its
/// dependency lists.
///
/// `src` is the module's source text; it is only consulted for the
/// store-source traceback table, so an empty string is acceptable when that
/// switch is off.
pub fn translate(
    module_name: &str,
    module: &Module,
    src: &str,
    options: CompileOptions,
    diag: &mut dyn DiagnosticSink,
) -> Result<TranslationUnit, TranslateError> {
    translate_with_lookup(module_name, module, src, options, diag, None)
}

/// Like [`translate`], with a probe for JavaScript files on the import path
/// so missing `jsimport` targets surface as soft warnings.
pub fn translate_with_lookup(
    module_name: &str,
    module: &Module,
    src: &str,
    options: CompileOptions,
    diag: &mut dyn DiagnosticSink,
    find_file: Option<FindFile<'_>>,
) -> Result<TranslationUnit, TranslateError> {
    let mut translator = Translator::new(module_name, src, options, diag, find_file);
    translator.emit_module(module)?;
    debug_assert_eq!(translator.out.indent_level(), 0, "unbalanced indentation at module end");
    let Translator {
        out,
        imported_modules,
        imported_js,
        ..
    } = translator;
    Ok(TranslationUnit {
        js: out.into_output(),
        imported_modules: imported_modules.into_iter().collect(),
        imported_js,
    })
}

/// Per-module translation state shared by all emitters.
pub(crate) struct Translator<'a> {
    pub(crate) module_name: String,
    /// `"<module_name>."`, prepended to names that resolve to module level.
    module_prefix: String,
    js_module_name: String,
    src_lines: Vec<String>,
    pub(crate) opts: CompileOptions,
    option_stack: Vec<CompileOptions>,
    pub(crate) scopes: ScopeStack,
    pub(crate) out: OutputStack,
    imported_modules: IndexSet<String>,
    pub(crate) imported_js: Vec<JsImport>,
    /// Source lines referenced by tracking instrumentation, keyed by line
    /// number so the emitted store-source table is ordered.
    track_lines: BTreeMap<u32, String>,
    pub(crate) stacksize_depth: u32,
    pub(crate) try_depth: i64,
    pub(crate) is_generator: bool,
    pub(crate) has_yield: bool,
    pub(crate) has_js_return: bool,
    pub(crate) ignore_debug: bool,
    pub(crate) generator_states: SmallVec<[u32; 8]>,
    pub(crate) state_max_depth: usize,
    diag: &'a mut dyn DiagnosticSink,
    find_file: Option<FindFile<'a>>,
}

impl<'a> Translator<'a> {
    fn new(
        module_name: &str,
        src: &str,
        options: CompileOptions,
        diag: &'a mut dyn DiagnosticSink,
        find_file: Option<FindFile<'a>>,
    ) -> Self {
        let js_module_name = scope::js_name(NameKind::Variable, module_name);
        let src = src.replace("\r\n", "\n").replace("\n\r", "\n").replace('\r', "\n");
        Self {
            module_name: module_name.to_owned(),
            module_prefix: format!("{module_name}."),
            js_module_name,
            src_lines: src.split('\n').map(str::to_owned).collect(),
            opts: options,
            option_stack: Vec::new(),
            scopes: ScopeStack::new(),
            out: OutputStack::new(),
            imported_modules: IndexSet::new(),
            imported_js: Vec::new(),
            track_lines: BTreeMap::new(),
            stacksize_depth: 0,
            try_depth: -1,
            is_generator: false,
            has_yield: false,
            has_js_return: false,
            ignore_debug: false,
            generator_states: smallvec![],
            state_max_depth: 0,
            diag,
            find_file,
        }
    }

    fn emit_module(&mut self, module: &Module) -> Result<(), TranslateError> {
        let m = self.module_name.clone();
        let js = self.js_module_name.clone();
        let sp = self.out.spacing();
        self.out.writeln(&format!("{sp}/* start module: {m} */"));
        if !m.contains('.') {
            self.out.writeln(&format!("{sp}var {js};"));
        }
        let ind = self.out.indent();
        self.out
            .writeln(&format!("{ind}$pyjs.loaded_modules['{m}'] = function (__mod_name__) {{"));
        let sp = self.out.spacing();
        self.out.writeln(&format!(
            "{sp}if($pyjs.loaded_modules['{m}'].__was_initialized__) return $pyjs.loaded_modules['{m}'];"
        ));
        self.out.writeln(&format!("{sp}{js} = $pyjs.loaded_modules[\"{m}\"];"));
        self.out.writeln(&format!("{sp}{js}.__was_initialized__ = true;"));
        self.out.writeln(&format!("{sp}if (__mod_name__ == null) __mod_name__ = '{m}';"));
        let name_lhs = format!("{js}.__name__");
        self.add_lookup(NameKind::Builtin, "__name__", &name_lhs);
        self.out.writeln(&format!("{sp}var __name__ = {name_lhs} = __mod_name__;"));
        if self.opts.source_tracking {
            self.out.writeln(&format!("{sp}{js}.__track_lines__ = new Array();"));
        }
        if m.contains('.') {
            let short = m.rsplit('.').next().expect("split yields at least one part");
            let short = scope::js_name(NameKind::Variable, short);
            self.out.writeln(&format!("{sp}var {short} = {js};"));
        }

        let wrap_attr_check = self.opts.attribute_checking && m != "sys" && m != "pyjslib";
        if wrap_attr_check {
            let ind = self.out.indent();
            self.out.writeln(&format!("{ind}try {{"));
        }

        self.out.push_buffer();
        self.track_lineno(1, true);
        for child in &module.body {
            self.has_js_return = false;
            self.has_yield = false;
            self.is_generator = false;
            self.stmt_at(child, None, true, true)?;
        }
        let captured = self.out.pop_buffer();

        if self.opts.source_tracking && self.opts.store_source {
            let sp = self.out.spacing();
            for (line, trace) in &self.track_lines {
                self.out
                    .writeln(&format!("{sp}{js}.__track_lines__[{line}] = \"{trace}\";"));
            }
        }
        let decl = self.local_var_decl(&[]);
        if !decl.is_empty() {
            self.out.writeln(&decl);
        }
        self.out.write(&captured);

        if wrap_attr_check {
            let ded = self.out.dedent();
            self.out.writeln(&format!(
                "{ded}}} catch ($pyjs_attr_err) {{throw pyjslib['_errorMapping']($pyjs_attr_err)}};"
            ));
        }
        let sp = self.out.spacing();
        self.out.writeln(&format!("{sp}return this;"));
        let ded = self.out.dedent();
        self.out.writeln(&format!("{ded}}}; /* end {m} */"));
        self.out.writeln("");
        self.out.writeln(&format!("{ded}/* end module: {m} */"));
        self.out.writeln("");

        if !self.imported_modules.is_empty() {
            let deps: Vec<String> = self.imported_modules.iter().map(|d| format!("'{d}'")).collect();
            self.out.writeln("/*");
            self.out.writeln(&format!("PYJS_DEPS: [{}]", deps.join(", ")));
            self.out.writeln("*/");
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Shared helpers
    // ------------------------------------------------------------------

    pub(crate) fn err(&self, message: impl Into<String>, lineno: u32) -> TranslateError {
        TranslateError::translation(message, &self.module_name, lineno)
    }

    pub(crate) fn config_err(&self, message: impl Into<String>, lineno: u32) -> TranslateError {
        TranslateError::configuration(message, &self.module_name, lineno)
    }

    pub(crate) fn modpfx(&self) -> &str {
        &self.module_prefix
    }

    /// Records a name in the innermost scope and returns its mangled form.
    pub(crate) fn add_lookup(&mut self, kind: NameKind, py_name: &str, js_name: &str) -> String {
        let mangled = scope::js_name(kind, js_name);
        self.scopes.add(kind, py_name, mangled.clone());
        mangled
    }

    /// Allocates a fresh temporary, registered as a local variable.
    pub(crate) fn temp_var(&mut self, prefix: &str) -> String {
        let v = self.out.uniqid(prefix);
        self.scopes.add(NameKind::Variable, &v, v.clone());
        v
    }

    /// The emitted name for a resolution that fell through every scope.
    pub(crate) fn scope_name(&self, name: &str, depth: Option<usize>, is_local: bool) -> String {
        if is_local {
            return name.to_owned();
        }
        if let Some(depth) = depth
            && let Some(prefix) = self.scopes.prefix_at(depth)
        {
            return format!("{prefix}{name}");
        }
        format!("{}{}", self.module_prefix, name)
    }

    /// Resolves a name expression; unknown names are deferred to module level.
    pub(crate) fn name_expr(&self, name: &str) -> String {
        match self.scopes.lookup(name) {
            Some(hit) => hit.js_name,
            None => self.scope_name(name, None, false),
        }
    }

    /// The assignable form of `name`, registering it in scope as `kind`.
    pub(crate) fn lhs_from_name(&mut self, name: &str, top_level: bool, klass: Option<&Klass>, kind: NameKind) -> String {
        match self.scopes.lookup(name) {
            Some(hit) if hit.is_local => {
                self.add_lookup(kind, name, &hit.js_name);
                hit.js_name
            }
            _ if top_level => match klass {
                Some(klass) => format!("{}.{name}", klass.name),
                None => {
                    let vname = format!("{}{}", self.modpfx(), name);
                    self.add_lookup(kind, name, &vname)
                }
            },
            _ => self.add_lookup(kind, name, name),
        }
    }

    /// The `var a,b,c;` declaration line for the innermost scope, or an empty
    /// string when nothing needs declaring. Qualified names (anything with a
    /// subscript) live on their owner object and are skipped.
    pub(crate) fn local_var_decl(&self, ignore: &[String]) -> String {
        let names: Vec<&str> = self
            .scopes
            .innermost()
            .entries()
            .filter(|entry| {
                !entry.js_name.contains('[')
                    && !ignore.contains(&entry.py_name)
                    && !matches!(entry.kind, NameKind::Intrinsic | NameKind::NativeJs | NameKind::Global)
            })
            .map(|entry| entry.js_name.as_str())
            .collect();
        if names.is_empty() {
            return String::new();
        }
        format!("{}var {};", self.out.spacing(), names.join(","))
    }

    pub(crate) fn push_options(&mut self) {
        self.option_stack.push(self.opts);
    }

    pub(crate) fn pop_options(&mut self) {
        self.opts = self.option_stack.pop().expect("options stack underflow");
    }

    pub(crate) fn options_depth(&self) -> usize {
        self.option_stack.len()
    }

    // ------------------------------------------------------------------
    // Source tracking
    // ------------------------------------------------------------------

    /// Statement-exit bookkeeping for the track stack.
    pub(crate) const TRACK_POP: &'static str =
        "$pyjs.trackstack.pop();$pyjs.track=$pyjs.trackstack.pop();$pyjs.trackstack.push($pyjs.track);";

    pub(crate) fn track_lineno(&mut self, lineno: u32, module: bool) {
        if !self.opts.source_tracking || lineno == 0 {
            return;
        }
        let sp = self.out.spacing();
        if module {
            let m = self.module_name.clone();
            self.out.writeln(&format!("{sp}$pyjs.track.module='{m}';"));
        }
        if self.opts.line_tracking {
            self.out.writeln(&format!("{sp}$pyjs.track.lineno={lineno};"));
        }
        if self.opts.store_source {
            let trace = self.line_trace(lineno);
            self.track_lines.insert(lineno, trace);
        }
    }

    fn line_trace(&self, lineno: u32) -> String {
        let src = self
            .src_lines
            .get(lineno.saturating_sub(1) as usize)
            .map_or("", |line| line.trim());
        let src = src.replace('\\', "\\\\").replace('"', "\\\"").replace('\'', "\\'");
        format!("{}.py, line {lineno}:\\n    {src}", self.module_name)
    }

    /// Wraps a call in the debug retry shim that reports the failing line.
    pub(crate) fn track_call(&mut self, call_code: String, lineno: u32) -> String {
        if self.ignore_debug || !self.opts.debug || call_code.trim().is_empty() {
            return call_code;
        }
        let dbg = self.out.uniqid("$pyjs_dbg_");
        let m = &self.module_name;
        format!(
            "(function(){{\
var {dbg}_retry = 0;
try{{var {dbg}_res={call_code};}}catch({dbg}_err){{
    if ({dbg}_err.__name__ != 'StopIteration') {{
        var save_stack = $pyjs.__last_exception_stack__;
        sys.save_exception_stack();
        var $pyjs_msg = \"\";

        try {{
            $pyjs_msg = \"\\n\" + sys.trackstackstr();
        }} catch (s) {{}};
        $pyjs.__last_exception_stack__ = save_stack;
        if ($pyjs_msg !== $pyjs.debug_msg) {{
            pyjslib['debugReport'](\"Module {m} at line {lineno} :\\n\" + {dbg}_err + $pyjs_msg);
            $pyjs.debug_msg = $pyjs_msg;
            debugger;
        }}
    }}
    switch ({dbg}_retry) {{
        case 1:
            {dbg}_res={call_code};
            break;
        case 2:
            break;
        default:
            throw {dbg}_err;
    }}
}}return {dbg}_res}})()"
        )
    }

    // ------------------------------------------------------------------
    // Imports
    // ------------------------------------------------------------------

    /// Records a module dependency together with its parent packages.
    pub(crate) fn add_imported_module(&mut self, import_name: &str) {
        self.imported_modules.insert(import_name.to_owned());
        if import_name.ends_with(".js") {
            return;
        }
        let mut prefix = String::new();
        for part in import_name.split('.') {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(part);
            self.imported_modules.insert(prefix.clone());
        }
    }

    pub(crate) fn warn_missing_js(&mut self, path: &str) {
        if let Some(find_file) = self.find_file
            && !find_file(path)
        {
            self.diag.warning(&format!("unable to find imported javascript: {path}"));
        }
    }

    pub(crate) fn emit_import(
        &mut self,
        names: &[ImportName],
        klass: Option<&Klass>,
        top_level: bool,
        root_level: bool,
    ) -> Result<(), TranslateError> {
        for name in names {
            if name.name == "__pyjamas__" {
                continue;
            }
            self.do_import(&name.name, name.alias.as_deref(), klass, top_level, root_level, true)?;
        }
        Ok(())
    }

    fn do_import(
        &mut self,
        import_name: &str,
        alias: Option<&str>,
        klass: Option<&Klass>,
        top_level: bool,
        root_level: bool,
        assign_base: bool,
    ) -> Result<(), TranslateError> {
        if import_name.ends_with(".js") {
            self.add_imported_module(import_name);
            self.warn_missing_js(import_name);
            self.imported_js.push(JsImport {
                path: import_name.to_owned(),
                mode: JsImportMode::Default,
                location: JsImportLocation::Middle,
            });
            return Ok(());
        }
        let mod_type = if root_level { NameKind::RootModule } else { NameKind::Module };
        let package_name = import_name.split('.').next().expect("split yields at least one part");

        let mod_kind = self.scopes.lookup(import_name).map(|hit| hit.kind);
        let package_kind = self.scopes.lookup(package_name).map(|hit| hit.kind);

        let needs_import = mod_kind != Some(NameKind::RootModule)
            || (assign_base && !matches!(package_kind, Some(NameKind::RootModule | NameKind::Module)));
        let mut import_stmt = None;
        if needs_import {
            let stmt = format!("pyjslib['___import___']('{import_name}', '{}'", self.module_name);
            if !assign_base {
                let sp = self.out.spacing();
                self.out.writeln(&format!("{sp}{stmt});"));
            }
            self.lhs_from_name(import_name, top_level, klass, mod_type);
            self.add_imported_module(import_name);
            import_stmt = Some(stmt);
        }
        if assign_base {
            let ass_name = alias.unwrap_or(package_name);
            if alias.is_some()
                && let Some(stmt) = import_stmt.as_mut()
            {
                stmt.push_str(",null , false");
            }
            let lhs = self.lhs_from_name(ass_name, top_level, klass, mod_type);
            let mod_name = if alias.is_some() { import_name } else { ass_name };
            let assignment = match import_stmt {
                None => format!("{lhs} = $pyjs.__modules__['{mod_name}'];"),
                Some(stmt) => format!("{lhs} = {stmt});"),
            };
            let sp = self.out.spacing();
            self.out.writeln(&format!("{sp}{assignment}"));
        }
        Ok(())
    }

    pub(crate) fn emit_from(
        &mut self,
        module: &str,
        names: &[ImportName],
        klass: Option<&Klass>,
        top_level: bool,
        root_level: bool,
    ) -> Result<(), TranslateError> {
        if module == "__pyjamas__" {
            for name in names {
                let ass_name = name.alias.as_deref().unwrap_or(&name.name);
                if crate::intrinsics::is_intrinsic(&name.name) {
                    self.add_lookup(NameKind::Intrinsic, ass_name, &name.name);
                }
                // Unknown names are ignored so modules stay importable by a
                // plain Python interpreter.
            }
            return Ok(());
        }
        if module == "__javascript__" {
            for name in names {
                let ass_name = name.alias.as_deref().unwrap_or(&name.name);
                self.add_lookup(NameKind::NativeJs, ass_name, ass_name);
            }
            return Ok(());
        }
        for name in names {
            let sub = format!("{module}.{}", name.name);
            self.do_import(&sub, None, klass, top_level, root_level, false)?;
            let ass_name = name.alias.as_deref().unwrap_or(&name.name);
            let lhs = self.lhs_from_name(ass_name, top_level, klass, NameKind::Variable);
            let path: Vec<String> = sub.split('.').map(|part| format!("'{part}'")).collect();
            let rhs = format!("$pyjs.__modules__[{}]", path.join("]["));
            let sp = self.out.spacing();
            self.out.writeln(&format!("{sp}{lhs} = {rhs};"));
        }
        Ok(())
    }
}
