//! Statement emission: every statement node drives the output stream,
//! indentation, tracking instrumentation and the generator state brackets.

use crate::ast::{AugOp, AugTarget, BinOp, ExceptHandler, Expr, ExprLoc, Stmt, StmtLoc, Target};
use crate::classes::Klass;
use crate::error::TranslateError;
use crate::scope::{NameKind, attr_name};
use crate::translator::Translator;

impl Translator<'_> {
    /// Emits one statement at function or class level.
    pub(crate) fn stmt(&mut self, node: &StmtLoc, klass: Option<&Klass>, top_level: bool) -> Result<(), TranslateError> {
        self.stmt_at(node, klass, top_level, false)
    }

    /// Emits one statement; `root_level` is true only for direct module
    /// children, where imports bind module-level names.
    pub(crate) fn stmt_at(
        &mut self,
        node: &StmtLoc,
        klass: Option<&Klass>,
        top_level: bool,
        root_level: bool,
    ) -> Result<(), TranslateError> {
        let lineno = node.lineno;
        self.track_lineno(lineno, false);
        match &node.stmt {
            Stmt::Pass => Ok(()),
            Stmt::Function(func) => self.emit_function(func, lineno, klass, top_level, !top_level),
            Stmt::Class(class) => {
                if top_level {
                    self.emit_class(class, lineno)
                } else {
                    Err(self.err("class definitions are only supported at module level", lineno))
                }
            }
            Stmt::Return(value) => {
                if top_level {
                    Err(self.err("'return' outside function", lineno))
                } else {
                    self.emit_return(value, lineno, klass)
                }
            }
            Stmt::Break => {
                if top_level {
                    return Err(self.err("'break' outside loop", lineno));
                }
                self.generator_switch_case(true);
                let sp = self.out.spacing();
                self.out.writeln(&format!("{sp}break;"));
                Ok(())
            }
            Stmt::Continue => {
                if top_level {
                    return Err(self.err("'continue' outside loop", lineno));
                }
                let sp = self.out.spacing();
                self.out.writeln(&format!("{sp}continue;"));
                Ok(())
            }
            Stmt::Global(names) => {
                self.emit_global(names);
                Ok(())
            }
            Stmt::If { tests, orelse } => self.emit_if(tests, orelse.as_deref(), klass, top_level),
            Stmt::For {
                target,
                iter,
                body,
                orelse,
            } => {
                if orelse.is_some() {
                    return Err(self.err("the 'else' clause on for-loops is not supported", lineno));
                }
                self.emit_for(target, iter, body, None, lineno, klass)
            }
            Stmt::While { test, body, orelse } => {
                if orelse.is_some() {
                    return Err(self.err("the 'else' clause on while-loops is not supported", lineno));
                }
                self.emit_while(test, body, lineno, klass)
            }
            Stmt::TryExcept(try_except) => self.emit_try(
                &try_except.body,
                &try_except.handlers,
                try_except.orelse.as_deref(),
                None,
                lineno,
                klass,
                top_level,
            ),
            Stmt::TryFinally { body, finally } => {
                // A lone try/except inside a try/finally is one combined
                // statement: lower it as a single construct.
                if let [only] = body.as_slice()
                    && let Stmt::TryExcept(inner) = &only.stmt
                {
                    return self.emit_try(
                        &inner.body,
                        &inner.handlers,
                        inner.orelse.as_deref(),
                        Some(finally),
                        only.lineno,
                        klass,
                        top_level,
                    );
                }
                self.emit_try(body, &[], None, Some(finally), lineno, klass, top_level)
            }
            Stmt::Raise {
                exc_type,
                value,
                traceback,
            } => self.emit_raise(exc_type.as_ref(), value.as_ref(), traceback.as_ref(), lineno, klass),
            Stmt::Assert { test, fail } => self.emit_assert(test, fail.as_ref(), klass),
            Stmt::Import { names } => self.emit_import(names, klass, top_level, root_level),
            Stmt::From { module, names } => self.emit_from(module, names, klass, top_level, root_level),
            Stmt::Print { args, newline } => self.emit_print(args, *newline, lineno, klass),
            Stmt::Discard(expr) => {
                if top_level && matches!(expr.expr, Expr::Yield(_)) {
                    return Err(self.err("'yield' outside function", lineno));
                }
                self.emit_discard(expr, lineno, klass)
            }
            Stmt::Assign { targets, value } => self.emit_assign(targets, value, lineno, klass, top_level),
            Stmt::AugAssign { target, op, value } => self.emit_augassign(target, *op, value, lineno, klass, top_level),
            Stmt::Delete(target) => self.emit_delete(target, lineno, klass),
        }
    }

    // ------------------------------------------------------------------
    // Assignment
    // ------------------------------------------------------------------

    fn emit_assign(
        &mut self,
        targets: &[Target],
        value: &ExprLoc,
        lineno: u32,
        klass: Option<&Klass>,
        top_level: bool,
    ) -> Result<(), TranslateError> {
        if targets.len() != 1 {
            // Bind the value once, then fan it out one target at a time.
            let tempvar = self.out.uniqid("$assign");
            self.emit_assign_single(&Target::Name(tempvar.clone()), value, lineno, klass, false)?;
            let temp_expr = ExprLoc::name(tempvar, lineno);
            for target in targets {
                self.emit_assign_single(target, &temp_expr, lineno, klass, top_level)?;
            }
            return Ok(());
        }
        self.emit_assign_single(&targets[0], value, lineno, klass, top_level)
    }

    pub(crate) fn emit_assign_single(
        &mut self,
        target: &Target,
        value: &ExprLoc,
        lineno: u32,
        klass: Option<&Klass>,
        top_level: bool,
    ) -> Result<(), TranslateError> {
        match target {
            Target::Attr { object, attr } => {
                let attr = attr_name(attr);
                let rhs = self.expr(value, klass)?;
                let lhs = self.lhs_from_attr_object(object, klass)?;
                let sp = self.out.spacing();
                if self.opts.descriptors {
                    self.out
                        .writeln(&format!("{sp}pyjslib['setattr']({lhs}, '{attr}', {rhs});"));
                } else {
                    self.out.writeln(&format!("{sp}{lhs}.{attr} = {rhs};"));
                }
            }
            Target::Name(name) => {
                let rhs = self.expr(value, klass)?;
                let lhs = self.lhs_from_name(name, top_level, klass, NameKind::Variable);
                let sp = self.out.spacing();
                self.out.writeln(&format!("{sp}{lhs} = {rhs};"));
            }
            Target::Subscript { object, index } => {
                let obj = self.expr(object, klass)?;
                let idx = self.expr(index, klass)?;
                let rhs = self.expr(value, klass)?;
                let call = self.track_call(format!("{obj}.__setitem__({idx}, {rhs})"), lineno);
                let sp = self.out.spacing();
                self.out.writeln(&format!("{sp}{call};"));
            }
            Target::Tuple(children) | Target::List(children) => {
                let temp = self.out.uniqid("$tupleassign");
                let rhs = self.expr(value, klass)?;
                let sp = self.out.spacing();
                self.out.writeln(&format!("{sp}var {temp} = {rhs};"));
                for (index, child) in children.iter().enumerate() {
                    let item = self.track_call(format!("{temp}.__getitem__({index})"), lineno);
                    match child {
                        Target::Attr { object, attr } => {
                            let lhs = self.lhs_from_attr_object(object, klass)?;
                            let attr = attr_name(attr);
                            let sp = self.out.spacing();
                            self.out.writeln(&format!("{sp}{lhs}.{attr} = {item};"));
                        }
                        Target::Name(name) => {
                            let lhs = self.lhs_from_name(name, top_level, klass, NameKind::Variable);
                            let sp = self.out.spacing();
                            self.out.writeln(&format!("{sp}{lhs} = {item};"));
                        }
                        Target::Subscript { object, index } => {
                            let obj = self.expr(object, klass)?;
                            let idx = self.expr(index, klass)?;
                            let call = self.track_call(format!("{obj}.__setitem__({idx}, {item})"), lineno);
                            let sp = self.out.spacing();
                            self.out.writeln(&format!("{sp}{call};"));
                        }
                        Target::Tuple(_) | Target::List(_) => {
                            return Err(self.err("nested destructuring targets are not supported", lineno));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// The assignable object part of an attribute target.
    fn lhs_from_attr_object(&mut self, object: &ExprLoc, klass: Option<&Klass>) -> Result<String, TranslateError> {
        match &object.expr {
            Expr::Name(name) => Ok(self.name_expr(name)),
            Expr::Getattr { .. } => {
                let chain = self.getattr_chain(object, klass)?;
                Ok(crate::mangle::attrib_join(&chain))
            }
            Expr::Subscript { object: obj, index } => self.subscript_code(obj, index, klass, object.lineno),
            Expr::Call(call) => self.callfunc(call, klass, object.lineno),
            _ => Err(self.err("unsupported assignment target", object.lineno)),
        }
    }

    fn emit_augassign(
        &mut self,
        target: &AugTarget,
        op: AugOp,
        value: &ExprLoc,
        lineno: u32,
        klass: Option<&Klass>,
        top_level: bool,
    ) -> Result<(), TranslateError> {
        match target {
            AugTarget::Subscript { object, index } => {
                let Some(bin_op) = op.bin_op() else {
                    return Err(self.err("unsupported operator in augmented assignment", lineno));
                };
                // Bind container and key once so their effects happen exactly
                // once across the read and the write.
                let augsub = self.out.uniqid("$augsub");
                let idx = self.expr(index, klass)?;
                let sp = self.out.spacing();
                self.out.writeln(&format!("{sp}var {augsub} = {idx};"));
                let augexpr = self.out.uniqid("$augexpr");
                self.scopes.add(NameKind::Variable, &augexpr, augexpr.clone());
                let obj = self.expr(object, klass)?;
                let sp = self.out.spacing();
                self.out.writeln(&format!("{sp}var {augexpr} = {obj};"));
                self.scopes.add(NameKind::Variable, &augsub, augsub.clone());

                let read = ExprLoc::new(
                    Expr::Subscript {
                        object: Box::new(ExprLoc::name(augexpr.clone(), lineno)),
                        index: Box::new(ExprLoc::name(augsub.clone(), lineno)),
                    },
                    lineno,
                );
                let combined = ExprLoc::new(
                    Expr::Op {
                        op: bin_op,
                        left: Box::new(read),
                        right: Box::new(value.clone()),
                    },
                    lineno,
                );
                self.emit_assign_single(
                    &Target::Subscript {
                        object: ExprLoc::name(augexpr, lineno),
                        index: ExprLoc::name(augsub, lineno),
                    },
                    &combined,
                    lineno,
                    klass,
                    top_level,
                )
            }
            AugTarget::Name(name) => {
                let lhs = self.name_expr(name);
                match (self.opts.operator_funcs, op.bin_op()) {
                    (true, Some(bin_op)) => {
                        // Pin the resolved name so the rewritten assignment
                        // does not shadow it with a fresh local.
                        self.add_lookup(NameKind::Global, name, &lhs);
                        let combined = combined_op_expr(bin_op, ExprLoc::name(name.clone(), lineno), value, lineno);
                        self.emit_assign_single(&Target::Name(name.clone()), &combined, lineno, klass, top_level)
                    }
                    _ => {
                        let rhs = self.expr(value, klass)?;
                        let sp = self.out.spacing();
                        self.out.writeln(&format!("{sp}{lhs} {} {rhs};", op.js_token()));
                        Ok(())
                    }
                }
            }
            AugTarget::Attr { object, attr } => {
                let read = ExprLoc::new(
                    Expr::Getattr {
                        object: Box::new(object.clone()),
                        attr: attr.clone(),
                    },
                    lineno,
                );
                match (self.opts.operator_funcs, op.bin_op()) {
                    (true, Some(bin_op)) => {
                        let combined = combined_op_expr(bin_op, read, value, lineno);
                        self.emit_assign_single(
                            &Target::Attr {
                                object: object.clone(),
                                attr: attr.clone(),
                            },
                            &combined,
                            lineno,
                            klass,
                            top_level,
                        )
                    }
                    _ => {
                        let chain = self.getattr_chain(&read, klass)?;
                        let lhs = crate::mangle::attrib_join(&chain);
                        let rhs = self.expr(value, klass)?;
                        let sp = self.out.spacing();
                        self.out.writeln(&format!("{sp}{lhs} {} {rhs};", op.js_token()));
                        Ok(())
                    }
                }
            }
        }
    }

    fn emit_delete(&mut self, target: &Target, lineno: u32, klass: Option<&Klass>) -> Result<(), TranslateError> {
        match target {
            Target::Name(name) => {
                let js_name = self.name_expr(name);
                let sp = self.out.spacing();
                self.out.writeln(&format!("{sp}delete {js_name};"));
                Ok(())
            }
            Target::Attr { object, attr } => {
                let attr = attr_name(attr);
                let lhs = self.lhs_from_attr_object(object, klass)?;
                let sp = self.out.spacing();
                self.out.writeln(&format!("{sp}pyjslib['delattr']({lhs}, '{attr}');"));
                Ok(())
            }
            Target::Subscript { object, index } => {
                let obj = self.expr(object, klass)?;
                let idx = self.expr(index, klass)?;
                let call = self.track_call(format!("{obj}.__delitem__({idx})"), lineno);
                let sp = self.out.spacing();
                self.out.writeln(&format!("{sp}{call};"));
                Ok(())
            }
            Target::Tuple(_) | Target::List(_) => Err(self.err("unsupported deletion target", lineno)),
        }
    }

    // ------------------------------------------------------------------
    // Simple statements
    // ------------------------------------------------------------------

    fn emit_discard(&mut self, expr: &ExprLoc, lineno: u32, klass: Option<&Klass>) -> Result<(), TranslateError> {
        match &expr.expr {
            Expr::Call(call) => {
                let code = self.callfunc(call, klass, lineno)?;
                if self.is_native_js_call(call) {
                    // Raw JavaScript passes through without indentation or a
                    // statement terminator of its own.
                    self.out.writeln(&code);
                    return Ok(());
                }
                if code.trim().is_empty() {
                    return Ok(());
                }
                let sp = self.out.spacing();
                self.out.writeln(&format!("{sp}{code};"));
                Ok(())
            }
            // Discarded constants (docstrings, stray semicolons) vanish.
            Expr::Const(_) => Ok(()),
            Expr::Yield(value) => self.emit_yield(value.as_deref(), lineno, klass),
            _ => Err(self.err("expression statement must be a call or constant", lineno)),
        }
    }

    /// True when the call is the raw-JavaScript intrinsic.
    pub(crate) fn is_native_js_call(&self, call: &crate::ast::CallFunc) -> bool {
        if let Expr::Name(name) = &call.func.expr
            && let Some(hit) = self.scopes.lookup(name)
        {
            return hit.kind == NameKind::Intrinsic && hit.js_name == "JS";
        }
        false
    }

    fn emit_print(&mut self, args: &[ExprLoc], newline: bool, lineno: u32, klass: Option<&Klass>) -> Result<(), TranslateError> {
        if !self.opts.print_statements {
            return Ok(());
        }
        let mut parts = Vec::with_capacity(args.len());
        for arg in args {
            parts.push(self.expr(arg, klass)?);
        }
        let call = self.track_call(
            format!("pyjslib['printFunc']([{}], {})", parts.join(", "), i32::from(newline)),
            lineno,
        );
        let sp = self.out.spacing();
        self.out.writeln(&format!("{sp}{call};"));
        Ok(())
    }

    fn emit_assert(&mut self, test: &ExprLoc, fail: Option<&ExprLoc>, klass: Option<&Klass>) -> Result<(), TranslateError> {
        let expr = self.expr(test, klass)?;
        let fail = match fail {
            Some(f) => self.expr(f, klass)?,
            None => String::new(),
        };
        let sp = self.out.spacing();
        self.out.writeln(&format!("{sp}if (!( {expr} )) {{"));
        self.out
            .writeln(&format!("{sp}   throw pyjslib['AssertionError']({fail});"));
        self.out.writeln(&format!("{sp} }}"));
        Ok(())
    }

    fn emit_global(&mut self, names: &[String]) {
        for name in names {
            let js_name = match self.scopes.lookup(name) {
                Some(hit) => hit.js_name,
                None => self.scope_name(name, None, false),
            };
            self.add_lookup(NameKind::Global, name, &js_name);
        }
    }

    fn emit_return(&mut self, value: &ExprLoc, lineno: u32, klass: Option<&Klass>) -> Result<(), TranslateError> {
        let expr = self.expr(value, klass)?;
        self.track_lineno(lineno, false);
        let sp = self.out.spacing();
        if self.is_generator {
            if value.is_none() {
                if self.opts.source_tracking {
                    self.out.writeln(&format!("{sp}{}", Self::TRACK_POP));
                }
                self.out.writeln(&format!("{sp}return;"));
                return Ok(());
            }
            return Err(self.err("'return' with argument inside generator", lineno));
        }
        if self.opts.source_tracking {
            self.out.writeln(&format!("{sp}var $pyjs__ret = {expr};"));
            self.out.writeln(&format!("{sp}{}", Self::TRACK_POP));
            self.out.writeln(&format!("{sp}return $pyjs__ret;"));
        } else {
            self.out.writeln(&format!("{sp}return {expr};"));
        }
        Ok(())
    }

    fn emit_raise(
        &mut self,
        exc_type: Option<&ExprLoc>,
        value: Option<&ExprLoc>,
        traceback: Option<&ExprLoc>,
        lineno: u32,
        klass: Option<&Klass>,
    ) -> Result<(), TranslateError> {
        if self.is_generator {
            let n = self.generator_states.len();
            let next = self.generator_states.last().copied().unwrap_or(0) + 1;
            let sp = self.out.spacing();
            self.out.writeln(&format!("{sp}$generator_state[{}]={next};", n - 1));
        }
        let sp = self.out.spacing();
        match (exc_type, value, traceback) {
            (Some(e1), Some(e2), Some(e3)) => {
                let expr1 = self.expr(e1, klass)?;
                let expr2 = self.expr(e2, klass)?;
                let expr3 = self.expr(e3, klass)?;
                self.out.writeln(&format!("{sp}var $pyjs__raise_expr1 = {expr1};"));
                self.out.writeln(&format!("{sp}var $pyjs__raise_expr2 = {expr2};"));
                self.out.writeln(&format!("{sp}var $pyjs__raise_expr3 = {expr3};"));
                self.out.writeln(&format!(
                    "{sp}if ($pyjs__raise_expr2 !== null && $pyjs__raise_expr1.__is_instance__ === true) {{"
                ));
                self.out.writeln(&format!(
                    "{sp}\tthrow (pyjslib['TypeError']('instance exception may not have a separate value'));"
                ));
                self.out.writeln(&format!("{sp}}}"));
                self.out.writeln(&format!(
                    "{sp}throw ($pyjs__raise_expr1.apply($pyjs__raise_expr1, $pyjs__raise_expr2, $pyjs__raise_expr3));"
                ));
            }
            (Some(e1), Some(e2), None) => {
                let expr1 = self.expr(e1, klass)?;
                let expr2 = self.expr(e2, klass)?;
                self.out.writeln(&format!("{sp}var $pyjs__raise_expr1 = {expr1};"));
                self.out.writeln(&format!("{sp}var $pyjs__raise_expr2 = {expr2};"));
                self.out.writeln(&format!(
                    "{sp}if ($pyjs__raise_expr2 !== null && $pyjs__raise_expr1.__is_instance__ === true) {{"
                ));
                self.out.writeln(&format!(
                    "{sp}\tthrow (pyjslib['TypeError']('instance exception may not have a separate value'));"
                ));
                self.out.writeln(&format!("{sp}}}"));
                self.out.writeln(&format!(
                    "{sp}if (pyjslib['isinstance']($pyjs__raise_expr2, pyjslib['Tuple'])) {{"
                ));
                self.out.writeln(&format!(
                    "{sp}\tthrow ($pyjs__raise_expr1.apply($pyjs__raise_expr1, $pyjs__raise_expr2.getArray()));"
                ));
                self.out.writeln(&format!("{sp}}} else {{"));
                self.out.writeln(&format!("{sp}\tthrow ($pyjs__raise_expr1($pyjs__raise_expr2));"));
                self.out.writeln(&format!("{sp}}}"));
            }
            (Some(e1), None, _) => {
                let expr1 = self.expr(e1, klass)?;
                self.out.writeln(&format!("{sp}throw ({expr1});"));
            }
            (None, _, _) => {
                // Bare re-raise: the runtime keeps the most recent exception.
                self.out.writeln(&format!("{sp}throw ($pyjs.__last_exception__?"));
                self.out.writeln(&format!("{sp}\t$pyjs.__last_exception__.error:"));
                self.out.writeln(&format!(
                    "{sp}\tpyjslib['TypeError']('exceptions must be classes, instances, or strings (deprecated), not NoneType'));"
                ));
            }
        }
        self.generator_switch_case(true);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Control flow
    // ------------------------------------------------------------------

    fn emit_if(
        &mut self,
        tests: &[(ExprLoc, Vec<StmtLoc>)],
        orelse: Option<&[StmtLoc]>,
        klass: Option<&Klass>,
        top_level: bool,
    ) -> Result<(), TranslateError> {
        if self.is_generator {
            let sp = self.out.spacing();
            self.out
                .writeln(&format!("{sp}$generator_state[{}] = 0;", self.generator_states.len() + 1));
            self.generator_switch_case(true);
            self.generator_add_state();
        }
        for (index, (test, consequence)) in tests.iter().enumerate() {
            let keyword = if index == 0 { "if" } else { "else if" };
            self.emit_if_test(keyword, Some(test), consequence, klass, top_level)?;
        }
        if let Some(orelse) = orelse {
            self.emit_if_test("else", None, orelse, klass, false)?;
        }
        if self.is_generator {
            let sp = self.out.spacing();
            self.out
                .writeln(&format!("{sp}$generator_state[{}]=0;", self.generator_states.len() - 1));
        }
        self.generator_del_state();
        Ok(())
    }

    fn emit_if_test(
        &mut self,
        keyword: &str,
        test: Option<&ExprLoc>,
        consequence: &[StmtLoc],
        klass: Option<&Klass>,
        top_level: bool,
    ) -> Result<(), TranslateError> {
        if let Some(test) = test {
            let expr = self.expr(test, klass)?;
            if self.is_generator {
                *self.generator_states.last_mut().expect("generator state stack is never empty") += 1;
                let n = self.generator_states.len() - 1;
                let state = *self.generator_states.last().expect("generator state stack is never empty");
                let cond = self.inline_bool_code(&expr);
                let cond = self.track_call(cond, test.lineno);
                let ind = self.out.indent();
                self.out.writeln(&format!(
                    "{ind}{keyword}(($generator_state[{n}]=={state})||($generator_state[{n}]<{state}&&({cond}))) {{"
                ));
                let sp = self.out.spacing();
                self.out.writeln(&format!("{sp}$generator_state[{n}]={state};"));
            } else {
                let cond = self.inline_bool_code(&expr);
                let cond = self.track_call(cond, test.lineno);
                let ind = self.out.indent();
                self.out.writeln(&format!("{ind}{keyword} ({cond}) {{"));
            }
        } else if self.is_generator {
            *self.generator_states.last_mut().expect("generator state stack is never empty") += 1;
            let n = self.generator_states.len() - 1;
            let state = *self.generator_states.last().expect("generator state stack is never empty");
            let ind = self.out.indent();
            self.out.writeln(&format!(
                "{ind}{keyword} if ($generator_state[{n}]==0||$generator_state[{n}]=={state}) {{"
            ));
            let sp = self.out.spacing();
            self.out.writeln(&format!("{sp}$generator_state[{n}]={state};"));
        } else {
            let ind = self.out.indent();
            self.out.writeln(&format!("{ind}{keyword} {{"));
        }

        self.generator_add_state();
        self.generator_switch_open();
        self.generator_switch_case(false);

        for child in consequence {
            self.stmt(child, klass, top_level)?;
        }

        if self.is_generator {
            self.generator_switch_case(true);
            self.generator_switch_close();
            self.generator_del_state();
        }
        let ded = self.out.dedent();
        self.out.writeln(&format!("{ded}}}"));
        Ok(())
    }

    fn emit_while(
        &mut self,
        test: &ExprLoc,
        body: &[StmtLoc],
        lineno: u32,
        klass: Option<&Klass>,
    ) -> Result<(), TranslateError> {
        let test_code = self.expr(test, klass)?;
        if self.is_generator {
            self.generator_switch_case(true);
            let n = self.generator_states.len();
            let state = *self.generator_states.last().expect("generator state stack is never empty");
            let cond = self.inline_bool_code(&test_code);
            let cond = self.track_call(cond, lineno);
            let ind = self.out.indent();
            self.out.writeln(&format!(
                "{ind}for (;($generator_state[{}] == {state} && $generator_state[{n}] != 0)||({cond});$generator_state[{n}] = 0) {{",
                n - 1
            ));
        } else {
            let cond = self.inline_bool_code(&test_code);
            let cond = self.track_call(cond, lineno);
            let ind = self.out.indent();
            self.out.writeln(&format!("{ind}while ({cond}) {{"));
        }

        self.generator_add_state();
        self.generator_switch_open();
        self.generator_switch_case(false);

        for child in body {
            self.stmt(child, klass, false)?;
        }

        self.generator_switch_case(true);
        self.generator_switch_close();
        self.generator_del_state();

        let ded = self.out.dedent();
        self.out.writeln(&format!("{ded}}}"));
        self.generator_switch_case(true);
        Ok(())
    }

    pub(crate) fn emit_for(
        &mut self,
        target: &Target,
        iter: &ExprLoc,
        body: &[StmtLoc],
        _orelse: Option<&[StmtLoc]>,
        lineno: u32,
        klass: Option<&Klass>,
    ) -> Result<(), TranslateError> {
        let mut assign_tuple: Vec<String> = Vec::new();
        let assign_name = match target {
            Target::Name(name) => self.add_lookup(NameKind::Variable, name, name),
            Target::Tuple(children) | Target::List(children) => {
                let mut assign_name = String::new();
                for (index, child) in children.iter().enumerate() {
                    let Target::Name(child_name) = child else {
                        return Err(self.err("unsupported loop target", lineno));
                    };
                    if assign_name.is_empty() {
                        assign_name = format!("temp_{child_name}");
                    }
                    let child_js = self.add_lookup(NameKind::Variable, child_name, child_name);
                    let item = self.track_call(format!("{assign_name}.__getitem__({index})"), lineno);
                    let sp = self.out.spacing();
                    assign_tuple.push(format!("{sp}{child_js} = {item};"));
                }
                assign_name
            }
            _ => return Err(self.err("unsupported loop target", lineno)),
        };

        let list_expr = match &iter.expr {
            Expr::Name(_)
            | Expr::Getattr { .. }
            | Expr::Call(_)
            | Expr::Subscript { .. }
            | Expr::Const(_)
            | Expr::List(_)
            | Expr::Slice { .. } => self.expr(iter, klass)?,
            _ => return Err(self.err("unsupported iterable expression in for-loop", lineno)),
        };

        let assign_name = self.add_lookup(NameKind::Variable, &assign_name, &assign_name);
        let iterator_name = format!("$__{assign_name}");
        self.add_lookup(NameKind::Variable, &iterator_name, &iterator_name);

        if self.opts.source_tracking {
            self.stacksize_depth += 1;
            let track_var = format!("$pyjs__trackstack_size_{}", self.stacksize_depth);
            self.add_lookup(NameKind::Variable, &track_var, &track_var);
            let sp = self.out.spacing();
            self.out.writeln(&format!("{sp}{track_var}=$pyjs.trackstack.length;"));
        }
        let iter_call = self.track_call(format!("{list_expr}.__iter__()"), lineno);
        let sp = self.out.spacing();
        self.out.writeln(&format!("{sp}{iterator_name} = {iter_call};"));
        self.generator_switch_case(true);

        let ind = self.out.indent();
        self.out.writeln(&format!("{ind}try {{"));
        if self.is_generator {
            let ind = self.out.indent();
            self.out.writeln(&format!(
                "{ind}for (;true;$generator_state[{}] = 0) {{",
                self.generator_states.len()
            ));
        } else {
            let ind = self.out.indent();
            self.out.writeln(&format!("{ind}while (true) {{"));
        }
        self.generator_add_state();
        self.generator_switch_open();
        self.generator_switch_case(false);

        let next_call = self.track_call(format!("{iterator_name}.next()"), lineno);
        let sp = self.out.spacing();
        self.out.writeln(&format!("{sp}{assign_name} = {next_call};"));
        for line in &assign_tuple {
            self.out.writeln(line);
        }
        for child in body {
            self.stmt(child, klass, false)?;
        }

        self.generator_switch_case(true);
        self.generator_switch_close();
        self.generator_del_state();

        let ded = self.out.dedent();
        self.out.writeln(&format!("{ded}}}"));
        let ded = self.out.dedent();
        self.out.writeln(&format!("{ded}}} catch (e) {{"));
        self.out.indent();
        let ind = self.out.indent();
        self.out.writeln(&format!("{ind}if (e.__name__ != 'StopIteration') {{"));
        let sp = self.out.spacing();
        self.out.writeln(&format!("{sp}throw e;"));
        let ded = self.out.dedent();
        self.out.writeln(&format!("{ded}}}"));
        let ded = self.out.dedent();
        self.out.writeln(&format!("{ded}}}"));

        if self.opts.source_tracking {
            self.emit_trackstack_restore();
            self.stacksize_depth -= 1;
        }
        Ok(())
    }

    /// Truncates the track stack back to the depth recorded on entry to the
    /// current for-loop or exception handler.
    pub(crate) fn emit_trackstack_restore(&mut self) {
        let sp = self.out.spacing();
        let depth = self.stacksize_depth;
        let m = self.module_name.clone();
        self.out.writeln(&format!(
            "{sp}if ($pyjs.trackstack.length > $pyjs__trackstack_size_{depth}) {{"
        ));
        self.out.writeln(&format!(
            "{sp}\t$pyjs.trackstack = $pyjs.trackstack.slice(0,$pyjs__trackstack_size_{depth});"
        ));
        self.out.writeln(&format!("{sp}\t$pyjs.track = $pyjs.trackstack.slice(-1)[0];"));
        self.out.writeln(&format!("{sp}}}"));
        self.out.writeln(&format!("{sp}$pyjs.track.module='{m}';"));
    }

    // ------------------------------------------------------------------
    // Exceptions
    // ------------------------------------------------------------------

    #[expect(clippy::too_many_arguments, reason = "the combined try construct carries all clause groups at once")]
    pub(crate) fn emit_try(
        &mut self,
        body: &[StmtLoc],
        handlers: &[ExceptHandler],
        orelse: Option<&[StmtLoc]>,
        finally: Option<&[StmtLoc]>,
        lineno: u32,
        klass: Option<&Klass>,
        top_level: bool,
    ) -> Result<(), TranslateError> {
        self.try_depth += 1;
        self.stacksize_depth += 1;
        let save_state_max_depth = self.state_max_depth;
        let start_states = self.generator_states.len();
        let try_depth = self.try_depth;

        if self.opts.source_tracking {
            let sp = self.out.spacing();
            self.out.writeln(&format!(
                "{sp}var $pyjs__trackstack_size_{} = $pyjs.trackstack.length;",
                self.stacksize_depth
            ));
        }
        self.generator_switch_case(true);
        let ind = self.out.indent();
        self.out.writeln(&format!("{ind}try {{"));
        if self.is_generator {
            let sp = self.out.spacing();
            self.out.writeln(&format!(
                "{sp}if (typeof $generator_exc[{try_depth}] != 'undefined' && $generator_exc[{try_depth}] !== null) throw $generator_exc[{try_depth}];"
            ));
        }
        self.generator_add_state();
        self.generator_switch_open();
        self.generator_switch_case(false);
        if self.is_generator {
            let sp = self.out.spacing();
            self.out.writeln(&format!("{sp}$generator_exc[{try_depth}] = null;"));
        }
        self.generator_switch_case(true);

        for child in body {
            self.stmt(child, klass, false)?;
        }

        self.generator_switch_case(true);
        if orelse.is_some() {
            let sp = self.out.spacing();
            self.out.writeln(&format!("{sp}throw pyjslib['TryElse'];"));
            self.generator_switch_case(true);
        }
        self.generator_switch_case(true);
        self.generator_switch_close();

        let ded = self.out.dedent();
        self.out.writeln(&format!("{ded}}} catch($pyjs_try_err) {{"));
        self.out.indent();
        if self.is_generator {
            let sp = self.out.spacing();
            self.out
                .writeln(&format!("{sp}$generator_exc[{try_depth}] = $pyjs_try_err;"));
        }
        let try_state_max_depth = self.state_max_depth;
        for _ in (save_state_max_depth + 1)..try_state_max_depth {
            self.generator_states.push(0);
        }

        if orelse.is_some() {
            let ind = self.out.indent();
            self.out
                .writeln(&format!("{ind}if ($pyjs_try_err.__name__ == 'TryElse') {{"));
            self.generator_add_state();
            self.generator_switch_open();
            self.generator_switch_case(false);

            for child in orelse.unwrap_or_default() {
                self.stmt(child, klass, false)?;
            }

            self.generator_switch_case(true);
            self.generator_switch_close();
            self.generator_del_state();

            let ded = self.out.dedent();
            self.out.writeln(&format!("{ded}}} else {{"));
            self.out.indent();
        }

        if self.opts.attribute_checking {
            let sp = self.out.spacing();
            self.out
                .writeln(&format!("{sp}$pyjs_try_err = pyjslib['_errorMapping']($pyjs_try_err);"));
        }
        let sp = self.out.spacing();
        self.out.writeln(&format!(
            "{sp}var $pyjs_try_err_name = (typeof $pyjs_try_err.__name__ == 'undefined' ? $pyjs_try_err.name : $pyjs_try_err.__name__ );"
        ));
        self.out.writeln(&format!(
            "{sp}$pyjs.__last_exception__ = {{error: $pyjs_try_err, module: '{}', try_lineno: {lineno}}};",
            self.module_name
        ));
        if self.opts.source_tracking {
            let sp = self.out.spacing();
            self.out.writeln(&format!("{sp}sys.save_exception_stack();"));
            self.emit_trackstack_restore();
        }
        self.add_lookup(NameKind::Variable, "$pyjs_try_err", "$pyjs_try_err");

        if handlers.is_empty() {
            // A bare try/finally: re-raise after bookkeeping so the finally
            // clause runs and the exception still propagates.
            let sp = self.out.spacing();
            self.out.writeln(&format!("{sp}throw $pyjs_try_err;"));
        } else {
            let mut else_str = self.out.spacing();
            if handlers.len() == 1 && handlers[0].exc_type.is_none() {
                else_str.push_str("if (true) ");
            }
            for handler in handlers {
                let mut handler_lineno = handler.lineno;
                let bind_name = handler.name.as_deref().unwrap_or("err");
                match &handler.exc_type {
                    None => self.out.writeln(&format!("{else_str}{{")),
                    Some(exc_expr) => {
                        if exc_expr.lineno > 0 {
                            handler_lineno = exc_expr.lineno;
                        }
                        let mut conditions = Vec::new();
                        if let Expr::Tuple(options) = &exc_expr.expr {
                            for option in options {
                                let e = self.expr(option, klass)?;
                                conditions.push(format!(
                                    "(($pyjs_try_err_name == {e}.__name__)||pyjslib['_isinstance']($pyjs_try_err,{e}))"
                                ));
                            }
                        } else {
                            let e = self.expr(exc_expr, klass)?;
                            conditions.push(format!(
                                "($pyjs_try_err_name == {e}.__name__)||pyjslib['_isinstance']($pyjs_try_err,{e})"
                            ));
                        }
                        self.out
                            .writeln(&format!("{else_str}if ({}) {{", conditions.join("||")));
                    }
                }
                self.out.indent();
                let sp = self.out.spacing();
                self.out.writeln(&format!(
                    "{sp}$pyjs.__last_exception__.except_lineno = {handler_lineno};"
                ));
                let caught = ExprLoc::name("$pyjs_try_err", lineno);
                self.emit_assign_single(&Target::Name(bind_name.to_owned()), &caught, lineno, klass, top_level)?;

                self.generator_add_state();
                self.generator_switch_open();
                self.generator_switch_case(false);

                for child in &handler.body {
                    self.stmt(child, klass, false)?;
                }

                self.generator_switch_case(true);
                self.generator_switch_close();
                self.generator_del_state();

                let ded = self.out.dedent();
                self.out.write(&format!("{ded}}}"));
                else_str = " else ".to_owned();
            }
            if handlers
                .last()
                .expect("handler list checked non-empty")
                .exc_type
                .is_some()
            {
                // No catch-all handler: fall through to a re-raise.
                self.out.writeln(&format!("{else_str}{{ throw $pyjs_try_err; }}"));
            } else {
                self.out.writeln("");
            }
        }
        if orelse.is_some() {
            let ded = self.out.dedent();
            self.out.writeln(&format!("{ded}}}"));
        }

        if let Some(finally) = finally {
            let ded = self.out.dedent();
            self.out.writeln(&format!("{ded}}} finally {{"));
            self.out.indent();
            if self.is_generator {
                let sp = self.out.spacing();
                self.out
                    .writeln(&format!("{sp}if ($yielding === true) return $yield_value;"));
            }

            let branch_state_max_depth = self.state_max_depth;
            self.generator_states.truncate(save_state_max_depth);
            for _ in save_state_max_depth..branch_state_max_depth {
                self.generator_states.push(0);
            }
            self.generator_add_state();
            self.generator_switch_open();
            self.generator_switch_case(false);

            for child in finally {
                self.stmt(child, klass, false)?;
            }

            self.generator_switch_case(true);
            self.generator_switch_close();
        }

        self.generator_states.truncate(start_states + 1);
        let ded = self.out.dedent();
        self.out.writeln(&format!("{ded}}}"));
        if self.is_generator {
            let sp = self.out.spacing();
            self.out.writeln(&format!("{sp}$generator_exc[{try_depth}] = null;"));
        }
        self.generator_clear_state();
        self.generator_del_state();
        self.try_depth -= 1;
        self.stacksize_depth -= 1;
        self.generator_switch_case(true);
        Ok(())
    }
}

/// `target op value` as a synthetic expression node for the rewrite of an
/// augmented assignment.
fn combined_op_expr(op: BinOp, read: ExprLoc, value: &ExprLoc, lineno: u32) -> ExprLoc {
    ExprLoc::new(
        Expr::Op {
            op,
            left: Box::new(read),
            right: Box::new(value.clone()),
        },
        lineno,
    )
}
