//! Function and method emission: argument binding preludes, default values,
//! `*args`/`**kwargs` handling, bind types and decorator application.
//!
//! A body is first emitted into a capture buffer so the local `var`
//! declaration list can be spliced in once every local is known. When the
//! body turns out to contain `yield`, the capture is discarded and re-emitted
//! in generator mode; when it contains a raw-JavaScript `return`, it is
//! re-emitted with source tracking off (the two cannot coexist under the
//! state machine rewrite).

use smallvec::smallvec;

use crate::ast::{CallFunc, Expr, ExprLoc, FunctionDef, Stmt};
use crate::classes::Klass;
use crate::error::TranslateError;
use crate::scope::{NameKind, attr_name};
use crate::translator::Translator;

/// How the runtime should dispatch calls to an emitted function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BindKind {
    Static,
    Bound,
    Class,
}

impl BindKind {
    fn tag(self) -> u8 {
        match self {
            Self::Static => 0,
            Self::Bound => 1,
            Self::Class => 2,
        }
    }
}

impl Translator<'_> {
    /// Emits a module-level or local function definition.
    pub(crate) fn emit_function(
        &mut self,
        node: &FunctionDef,
        lineno: u32,
        klass: Option<&Klass>,
        top_level: bool,
        local: bool,
    ) -> Result<(), TranslateError> {
        let options_depth = self.options_depth();
        self.push_options();
        let save_has_js_return = self.has_js_return;
        self.has_js_return = false;
        let save_has_yield = self.has_yield;
        self.has_yield = false;
        let save_is_generator = self.is_generator;
        self.is_generator = false;
        let save_generator_states = std::mem::replace(&mut self.generator_states, smallvec![0]);
        let save_state_max_depth = self.state_max_depth;
        self.state_max_depth = self.generator_states.len();

        let function_name = if local {
            node.name.clone()
        } else {
            format!("{}{}", self.modpfx(), node.name)
        };
        let function_name = self.add_lookup(NameKind::Function, &node.name, &function_name);
        let (staticmethod, classmethod, decorator_code) =
            self.parse_decorators(&node.decorators, lineno, klass, top_level)?;
        if staticmethod || classmethod {
            return Err(self.err(
                "staticmethod and classmethod decorators are only supported on methods",
                lineno,
            ));
        }
        self.scopes.push();

        let (declared, varargname, kwargname) = self.bind_signature(node, lineno)?;

        let ind = self.out.indent();
        self.out.writeln(&format!(
            "{ind}{function_name} = function({}) {{",
            declared.join(", ")
        ));
        self.static_method_init(node, &declared, varargname.as_deref(), kwargname.as_deref());
        self.default_args_handler(node, &declared, kwargname.as_deref());

        let mut ignore = declared.clone();
        ignore.extend(kwargname.clone());
        ignore.extend(varargname.clone());

        self.emit_body(node, lineno, None)?;
        let captured = self.out.pop_buffer();
        let decl = self.local_var_decl(&ignore);
        if !decl.is_empty() {
            self.out.writeln(&decl);
        }
        if self.is_generator {
            self.emit_generator_body(&captured);
        } else {
            self.out.write(&captured);
            self.emit_fallthrough_return(node);
        }

        let ded = self.out.dedent();
        self.out.writeln(&format!("{ded}}};"));
        let sp = self.out.spacing();
        self.out
            .writeln(&format!("{sp}{function_name}.__name__ = '{}';", node.name));
        self.out.writeln("");

        self.func_args(
            node,
            klass,
            Some(&function_name),
            BindKind::Static,
            &declared,
            varargname.as_deref(),
            kwargname.as_deref(),
        )?;

        if let Some(code) = decorator_code {
            let decorated = code.replace("%s", &function_name);
            let sp = self.out.spacing();
            self.out.writeln(&format!("{sp}{function_name} = {decorated};"));
        }

        self.generator_states = save_generator_states;
        self.state_max_depth = save_state_max_depth;
        self.is_generator = save_is_generator;
        self.has_yield = save_has_yield;
        self.has_js_return = save_has_js_return;
        self.pop_options();
        self.scopes.pop();
        debug_assert_eq!(self.options_depth(), options_depth, "unbalanced options stack");
        Ok(())
    }

    /// Emits one method inside a class body.
    pub(crate) fn emit_method(
        &mut self,
        node: &FunctionDef,
        lineno: u32,
        klass: &Klass,
    ) -> Result<(), TranslateError> {
        self.push_options();
        let save_has_js_return = self.has_js_return;
        self.has_js_return = false;
        let save_has_yield = self.has_yield;
        self.has_yield = false;
        let save_is_generator = self.is_generator;
        self.is_generator = false;
        let save_generator_states = std::mem::replace(&mut self.generator_states, smallvec![0]);
        let save_state_max_depth = self.state_max_depth;
        self.state_max_depth = self.generator_states.len();

        let method_name = attr_name(&node.name);
        let (mut staticmethod, classmethod, _) = self.parse_decorators(&node.decorators, lineno, Some(klass), false)?;
        // __new__ receives the class, never an instance.
        if node.name == "__new__" {
            staticmethod = true;
        }

        self.scopes.push();
        let (declared, varargname, kwargname) = self.bind_signature(node, lineno)?;

        let visible_args = if staticmethod { &declared[..] } else { declared.get(1..).unwrap_or(&[]) };
        let ind = self.out.indent();
        self.out.writeln(&format!(
            "{ind}$method = $pyjs__bind_method($cls_instance, '{method_name}', function({}) {{",
            visible_args.join(", ")
        ));
        if staticmethod {
            self.static_method_init(node, &declared, varargname.as_deref(), kwargname.as_deref());
        } else if classmethod {
            self.class_method_init(node, &declared, varargname.as_deref(), kwargname.as_deref());
        } else {
            self.instance_method_init(node, &declared, varargname.as_deref(), kwargname.as_deref(), klass);
        }
        self.default_args_handler(node, &declared, kwargname.as_deref());

        let mut ignore = declared.clone();
        ignore.extend(kwargname.clone());
        ignore.extend(varargname.clone());

        self.emit_body(node, lineno, Some(klass))?;
        let captured = self.out.pop_buffer();
        let decl = self.local_var_decl(&ignore);
        if !decl.is_empty() {
            self.out.writeln(&decl);
        }
        if self.is_generator {
            self.emit_generator_body(&captured);
        } else {
            self.out.write(&captured);
            self.emit_fallthrough_return(node);
        }

        let ded = self.out.dedent();
        self.out.writeln(&format!("{ded}}}"));

        let bind_kind = if staticmethod {
            BindKind::Static
        } else if classmethod {
            BindKind::Class
        } else {
            BindKind::Bound
        };
        self.func_args(
            node,
            Some(klass),
            None,
            bind_kind,
            &declared,
            varargname.as_deref(),
            kwargname.as_deref(),
        )?;

        self.generator_states = save_generator_states;
        self.state_max_depth = save_state_max_depth;
        self.is_generator = save_is_generator;
        self.has_yield = save_has_yield;
        self.has_js_return = save_has_js_return;
        self.pop_options();
        self.scopes.pop();
        Ok(())
    }

    /// Registers the parameters in scope and splits off the `*args` and
    /// `**kwargs` names from the tail of the declared list.
    fn bind_signature(
        &mut self,
        node: &FunctionDef,
        lineno: u32,
    ) -> Result<(Vec<String>, Option<String>, Option<String>), TranslateError> {
        let mut arg_names: Vec<String> = node
            .argnames
            .iter()
            .map(|arg| self.add_lookup(NameKind::Variable, arg, arg))
            .collect();
        let kwargname = if node.kwargs {
            Some(
                arg_names
                    .pop()
                    .ok_or_else(|| self.err("keyword-collector flag without a parameter name", lineno))?,
            )
        } else {
            None
        };
        let varargname = if node.varargs {
            Some(
                arg_names
                    .pop()
                    .ok_or_else(|| self.err("vararg flag without a parameter name", lineno))?,
            )
        } else {
            None
        };
        Ok((arg_names, varargname, kwargname))
    }

    /// Emits the body into a capture buffer, re-emitting in generator mode or
    /// with tracking off as the first pass dictates.
    fn emit_body(&mut self, node: &FunctionDef, lineno: u32, klass: Option<&Klass>) -> Result<(), TranslateError> {
        self.out.push_buffer();
        self.emit_track_entry(lineno);
        for child in &node.code {
            self.stmt(child, klass, false)?;
        }
        if !self.has_yield && self.opts.source_tracking && self.has_js_return {
            self.opts.source_tracking = false;
            self.out.restart_buffer();
            for child in &node.code {
                self.stmt(child, klass, false)?;
            }
        } else if self.has_yield {
            if self.has_js_return {
                self.opts.source_tracking = false;
            }
            self.is_generator = true;
            self.generator_states = smallvec![0];
            self.out.restart_buffer();
            self.out.indent();
            self.emit_track_entry(lineno);
            self.generator_switch_open();
            self.generator_switch_case(false);
            for child in &node.code {
                self.stmt(child, klass, false)?;
            }
            self.generator_switch_case(true);
            self.generator_switch_close();
            self.out.dedent();
        }
        Ok(())
    }

    fn emit_track_entry(&mut self, lineno: u32) {
        if self.opts.source_tracking {
            let sp = self.out.spacing();
            let m = self.module_name.clone();
            self.out.writeln(&format!(
                "{sp}$pyjs.track={{module:'{m}',lineno:{lineno}}};$pyjs.trackstack.push($pyjs.track);"
            ));
        }
        self.track_lineno(lineno, true);
    }

    /// Functions always return a value; a body that falls off the end
    /// returns `null` so callers never observe `undefined`.
    fn emit_fallthrough_return(&mut self, node: &FunctionDef) {
        let last = node.code.last();
        if matches!(last.map(|s| &s.stmt), Some(Stmt::Return(_))) {
            return;
        }
        let sp = self.out.spacing();
        if self.opts.source_tracking {
            self.out.writeln(&format!("{sp}{}", Self::TRACK_POP));
        }
        let native_tail = last.is_some_and(|stmt| {
            matches!(&stmt.stmt, Stmt::Discard(expr)
                if matches!(&expr.expr, Expr::Call(call) if self.is_native_js_call(call)))
        });
        if !native_tail {
            self.out.writeln(&format!("{sp}return null;"));
        }
    }

    /// Parses the decorator list.
    ///
    /// `staticmethod`/`classmethod` only set the bind type; `compiler.*`
    /// names mutate the current options frame; everything else becomes a
    /// wrapping call template with `%s` standing in for the function.
    pub(crate) fn parse_decorators(
        &mut self,
        decorators: &[ExprLoc],
        lineno: u32,
        _klass: Option<&Klass>,
        _top_level: bool,
    ) -> Result<(bool, bool, Option<String>), TranslateError> {
        if decorators.is_empty() {
            return Ok((false, false, None));
        }
        self.scopes.push();
        self.scopes.add(NameKind::Variable, "%s", "%s".to_owned());
        let mut code = "%s".to_owned();
        let mut staticmethod = false;
        let mut classmethod = false;
        for decorator in decorators {
            match &decorator.expr {
                Expr::Getattr { object, attr } => match &object.expr {
                    Expr::Name(head) if head == "compiler" => {
                        if !self.opts.apply_decorator(attr) {
                            return Err(self.config_err(format!("unknown compiler option '{attr}'"), lineno));
                        }
                    }
                    Expr::Name(_) => {
                        let call = CallFunc::positional(decorator.clone(), vec![ExprLoc::name("%s", lineno)]);
                        let wrapped = self.callfunc_code(&call, None, lineno)?;
                        code = code.replacen("%s", &wrapped, 1);
                    }
                    _ => return Err(self.config_err(format!("unsupported decorator '{attr}'"), lineno)),
                },
                Expr::Name(name) if name == "staticmethod" => staticmethod = true,
                Expr::Name(name) if name == "classmethod" => classmethod = true,
                Expr::Name(_) => {
                    let call = CallFunc::positional(decorator.clone(), vec![ExprLoc::name("%s", lineno)]);
                    let wrapped = self.callfunc_code(&call, None, lineno)?;
                    code = code.replacen("%s", &wrapped, 1);
                }
                _ => return Err(self.config_err("unsupported decorator form", lineno)),
            }
        }
        self.scopes.pop();
        if code == "%s" {
            return Ok((staticmethod, classmethod, None));
        }
        // Wrap the innermost slot so the decorated callable does not rebind.
        code = code.replacen("%s", "pyjslib['staticmethod'](%s)", 1);
        Ok((staticmethod, classmethod, Some(code)))
    }

    // ------------------------------------------------------------------
    // Argument preludes
    // ------------------------------------------------------------------

    fn static_method_init(
        &mut self,
        node: &FunctionDef,
        declared: &[String],
        varargname: Option<&str>,
        kwargname: Option<&str>,
    ) {
        let mut maxargs = declared.len() as i64;
        let minargs = maxargs - node.defaults.len() as i64;
        let mut maxargs_str = maxargs.to_string();
        if node.kwargs {
            maxargs += 1;
        }
        let argcount = if node.varargs {
            maxargs_str = "null".to_owned();
            format!("arguments.length < {minargs}")
        } else if minargs == maxargs {
            format!("arguments.length != {minargs}")
        } else {
            format!("(arguments.length < {minargs} || arguments.length > {maxargs})")
        };
        if self.opts.function_argument_checking {
            let sp = self.out.spacing();
            self.out.writeln(&format!(
                "{sp}if ($pyjs.options.arg_count && {argcount}) $pyjs__exception_func_param(arguments.callee.__name__, {minargs}, {maxargs_str}, arguments.length);"
            ));
        }
        if let Some(varargname) = varargname {
            self.varargs_handler(varargname, maxargs, node.kwargs);
        }
        if let Some(kwargname) = kwargname {
            self.kwargs_pull(kwargname, varargname, maxargs, true);
        }
    }

    fn instance_method_init(
        &mut self,
        node: &FunctionDef,
        declared: &[String],
        varargname: Option<&str>,
        kwargname: Option<&str>,
        klass: &Klass,
    ) {
        let mut maxargs1 = declared.len() as i64 - 1;
        let mut maxargs2 = declared.len() as i64;
        let minargs1 = maxargs1 - node.defaults.len() as i64;
        let minargs2 = maxargs2 - node.defaults.len() as i64;
        if node.kwargs {
            maxargs1 += 1;
            maxargs2 += 1;
        }
        let mut maxargs2_str = maxargs2.to_string();
        let argcount1 = if node.varargs {
            format!("arguments.length < {minargs1}")
        } else if minargs1 == maxargs1 {
            format!("arguments.length != {minargs1}")
        } else {
            format!("(arguments.length < {minargs1} || arguments.length > {maxargs1})")
        };
        let argcount2 = if node.varargs {
            maxargs2_str = "null".to_owned();
            format!("arguments.length < {minargs2}")
        } else if minargs2 == maxargs2 {
            format!("arguments.length != {minargs2}")
        } else {
            format!("(arguments.length < {minargs2} || arguments.length > {maxargs2})")
        };

        let ind = self.out.indent();
        self.out.writeln(&format!("{ind}if (this.__is_instance__ === true) {{"));
        if let Some(self_name) = declared.first() {
            let sp = self.out.spacing();
            self.out.writeln(&format!("{sp}var {self_name} = this;"));
        }
        if let Some(varargname) = varargname {
            self.varargs_handler(varargname, maxargs1, node.kwargs);
        }
        if let Some(kwargname) = kwargname {
            self.kwargs_pull(kwargname, varargname, maxargs1, true);
        }
        if self.opts.function_argument_checking {
            let sp = self.out.spacing();
            self.out.writeln(&format!(
                "{sp}if ($pyjs.options.arg_count && {argcount1}) $pyjs__exception_func_param(arguments.callee.__name__, {minargs2}, {maxargs2_str}, arguments.length+1);"
            ));
        }
        let ded = self.out.dedent();
        self.out.writeln(&format!("{ded}}} else {{"));
        self.out.indent();

        if let Some(self_name) = declared.first() {
            let sp = self.out.spacing();
            self.out.writeln(&format!("{sp}var {self_name} = arguments[0];"));
        }
        for (index, arg) in declared.iter().enumerate().skip(1) {
            let sp = self.out.spacing();
            self.out.writeln(&format!("{sp}{arg} = arguments[{index}];"));
        }
        if let Some(varargname) = varargname {
            self.varargs_handler(varargname, maxargs2, node.kwargs);
        }
        if let Some(kwargname) = kwargname {
            self.kwargs_pull(kwargname, varargname, maxargs2, true);
        }
        if self.opts.function_argument_checking
            && let Some(self_name) = declared.first()
        {
            let sp = self.out.spacing();
            self.out.writeln(&format!(
                "{sp}if ($pyjs.options.arg_is_instance && {self_name}.__is_instance__ !== true) $pyjs__exception_func_instance_expected(arguments.callee.__name__, arguments.callee.__class__.__name__, {self_name});"
            ));
            self.out.writeln(&format!(
                "{sp}if ($pyjs.options.arg_count && {argcount2}) $pyjs__exception_func_param(arguments.callee.__name__, {minargs2}, {maxargs2_str}, arguments.length);"
            ));
        }
        let ded = self.out.dedent();
        self.out.writeln(&format!("{ded}}}"));

        if self.opts.function_argument_checking
            && let Some(self_name) = declared.first()
        {
            let sp = self.out.spacing();
            let md5 = &klass.md5;
            self.out.writeln(&format!("{sp}if ($pyjs.options.arg_instance_type) {{"));
            self.out
                .writeln(&format!("{sp}\tif ({self_name}.prototype.__md5__ !== '{md5}') {{"));
            self.out.writeln(&format!(
                "{sp}\t\tif (!pyjslib['_isinstance']({self_name}, arguments['callee']['__class__'])) {{"
            ));
            self.out.writeln(&format!(
                "{sp}\t\t\t$pyjs__exception_func_instance_expected(arguments['callee']['__name__'], arguments['callee']['__class__']['__name__'], {self_name});"
            ));
            self.out.writeln(&format!("{sp}\t\t}}"));
            self.out.writeln(&format!("{sp}\t}}"));
            self.out.writeln(&format!("{sp}}}"));
        }
    }

    fn class_method_init(
        &mut self,
        node: &FunctionDef,
        declared: &[String],
        varargname: Option<&str>,
        kwargname: Option<&str>,
    ) {
        let mut maxargs = (declared.len() as i64 - 1).max(0);
        let minargs = (maxargs - node.defaults.len() as i64).max(0);
        let mut maxargs_str = (maxargs + 1).to_string();
        if node.kwargs {
            maxargs += 1;
        }
        let argcount = if node.varargs {
            maxargs_str = "null".to_owned();
            format!("arguments.length < {minargs}")
        } else if minargs == maxargs {
            maxargs_str = maxargs.to_string();
            format!("arguments.length != {minargs}")
        } else {
            format!("(arguments.length < {minargs} || arguments.length > {maxargs})")
        };
        if self.opts.function_argument_checking {
            let sp = self.out.spacing();
            self.out.writeln(&format!(
                "{sp}if ($pyjs.options.arg_is_instance && this.__is_instance__ !== true && this.__is_instance__ !== false) $pyjs__exception_func_class_expected(arguments.callee.__name__, arguments.callee.__class__.__name__);"
            ));
            self.out.writeln(&format!(
                "{sp}if ($pyjs.options.arg_count && {argcount}) $pyjs__exception_func_param(arguments.callee.__name__, {}, {maxargs_str}, arguments.length);",
                minargs + 1
            ));
        }
        if let Some(cls_name) = declared.first() {
            let sp = self.out.spacing();
            self.out.writeln(&format!("{sp}var {cls_name} = this.prototype;"));
        }
        if let Some(varargname) = varargname {
            self.varargs_handler(varargname, maxargs, node.kwargs);
        }
        if let Some(kwargname) = kwargname {
            self.kwargs_pull(kwargname, varargname, maxargs, false);
        }
    }

    /// Collects surplus positional arguments into a runtime tuple.
    fn varargs_handler(&mut self, varargname: &str, start: i64, kwargs: bool) {
        let (start, end) = if kwargs {
            (start - 1, "arguments.length-1")
        } else {
            (start, "arguments.length")
        };
        let sp = self.out.spacing();
        self.out.writeln(&format!("{sp}var {varargname} = new Array();"));
        self.out.writeln(&format!(
            "{sp}for (var $pyjs__va_arg = {start}; $pyjs__va_arg < {end}; $pyjs__va_arg++) {{"
        ));
        self.out.writeln(&format!("{sp}\tvar $pyjs__arg = arguments[$pyjs__va_arg];"));
        self.out.writeln(&format!("{sp}\t{varargname}.push($pyjs__arg);"));
        self.out.writeln(&format!("{sp}}}"));
        self.out
            .writeln(&format!("{sp}{varargname} = pyjslib['Tuple']({varargname});"));
    }

    /// Pulls a trailing keyword-arguments sentinel dict off the argument
    /// tail, pushing a plain trailing dict back onto `*args` when present.
    fn kwargs_pull(&mut self, kwargname: &str, varargname: Option<&str>, maxargs: i64, with_else: bool) {
        let sp = self.out.spacing();
        self.out.writeln(&format!(
            "{sp}var {kwargname} = arguments.length >= {maxargs} ? arguments[arguments.length-1] : arguments[arguments.length];"
        ));
        self.out.writeln(&format!(
            "{sp}if (typeof {kwargname} != 'object' || {kwargname}.__name__ != 'Dict' || typeof {kwargname}.$pyjs_is_kwarg == 'undefined') {{"
        ));
        if let Some(varargname) = varargname {
            self.out.writeln(&format!(
                "{sp}\tif (typeof {kwargname} != 'undefined') {varargname}.l.push({kwargname});"
            ));
        }
        self.out
            .writeln(&format!("{sp}\t{kwargname} = arguments[arguments.length+1];"));
        if with_else {
            self.out.writeln(&format!("{sp}}} else {{"));
            self.out
                .writeln(&format!("{sp}\tdelete {kwargname}['$pyjs_is_kwarg'];"));
        }
        self.out.writeln(&format!("{sp}}}"));
    }

    /// Applies defaults for parameters still undefined after binding, and
    /// recovers a keyword sentinel that landed in a defaulted positional.
    fn default_args_handler(&mut self, node: &FunctionDef, declared: &[String], kwargname: Option<&str>) {
        let sp = self.out.spacing();
        if let Some(kwargname) = kwargname
            && !declared.is_empty()
        {
            self.out.writeln(&format!("{sp}if (typeof {kwargname} == 'undefined') {{"));
            self.out
                .writeln(&format!("{sp}\t{kwargname} = pyjslib['Dict']({{}});"));
            let mut lead = "if".to_owned();
            for arg in declared.iter().rev() {
                self.out
                    .writeln(&format!("{sp}\t{lead} (typeof {arg} != 'undefined') {{"));
                self.out.writeln(&format!(
                    "{sp}\t\tif ({arg} !== null && typeof {arg}['$pyjs_is_kwarg'] != 'undefined') {{"
                ));
                self.out.writeln(&format!("{sp}\t\t\t{kwargname} = {arg};"));
                self.out
                    .writeln(&format!("{sp}\t\t\t{arg} = arguments[{}];", declared.len()));
                self.out.writeln(&format!("{sp}\t\t}}"));
                lead = "} else if".to_owned();
            }
            self.out.writeln(&format!("{sp}\t}}"));
            self.out.writeln(&format!("{sp}}}"));
        }
        if node.defaults.is_empty() {
            return;
        }
        let default_pos = declared.len().saturating_sub(node.defaults.len());
        for index in 0..node.defaults.len() {
            let pos = default_pos + index;
            let Some(name) = declared.get(pos) else { break };
            // Slot 0 and 1 of __args__ hold the star/dstar names.
            let args_index = pos + 2;
            self.out.writeln(&format!(
                "{sp}if (typeof {name} == 'undefined') {name}=arguments.callee.__args__[{args_index}][1];"
            ));
        }
    }

    /// Emits the `__bind_type__`/`__args__` trailer (or the closing
    /// arguments of the method-binding call when `function_name` is absent).
    #[expect(clippy::too_many_arguments, reason = "the descriptor covers every argument group at once")]
    fn func_args(
        &mut self,
        node: &FunctionDef,
        klass: Option<&Klass>,
        function_name: Option<&str>,
        bind_kind: BindKind,
        declared: &[String],
        varargname: Option<&str>,
        kwargname: Option<&str>,
    ) -> Result<(), TranslateError> {
        let default_pos = declared.len().saturating_sub(node.defaults.len());
        let mut parts = Vec::with_capacity(declared.len());
        for (index, arg) in declared.iter().enumerate() {
            if index < default_pos {
                parts.push(format!("['{arg}']"));
            } else {
                let default_value = self.expr(&node.defaults[index - default_pos], klass)?;
                parts.push(format!("['{arg}', {default_value}]"));
            }
        }
        let mut args = parts.join(",");
        args = match kwargname {
            Some(kwargname) => format!("['{kwargname}'],{args}"),
            None => format!("null,{args}"),
        };
        args = match varargname {
            Some(varargname) => format!("'{varargname}',{args}"),
            None => format!("null,{args}"),
        };
        let mut args = format!("[{args}]");
        if args.ends_with(",]") {
            args.truncate(args.len() - 2);
            args.push(']');
        }
        match function_name {
            None => self.out.writeln(&format!("\t, {}, {args});", bind_kind.tag())),
            Some(function_name) => {
                let sp = self.out.spacing();
                self.out
                    .writeln(&format!("{sp}{function_name}.__bind_type__ = {};", bind_kind.tag()));
                self.out.writeln(&format!("{sp}{function_name}.__args__ = {args};"));
            }
        }
        Ok(())
    }
}
