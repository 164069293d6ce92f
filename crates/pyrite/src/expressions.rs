//! Expression emission: every expression node lowers to a JavaScript
//! expression string.
//!
//! Operator lowering is governed by the `operator_funcs` switch: off means
//! native JavaScript operators, on means a guarded form that inlines a fast
//! path for matching primitive operand types and otherwise calls the runtime
//! operator functions. Guarded forms bind both operands to fresh temporaries
//! so each side is evaluated exactly once.

use crate::ast::{
    BinOp, CallArg, CallFunc, CompFor, CompareOp, Expr, ExprLoc, FunctionDef, LambdaDef, Literal, Stmt, StmtLoc,
    UnaryOp,
};
use crate::classes::Klass;
use crate::error::TranslateError;
use crate::mangle::{attrib_join, escape_js};
use crate::scope::{NameKind, attr_name};
use crate::translator::Translator;

impl Translator<'_> {
    /// Translates one expression node to a JavaScript expression string.
    pub(crate) fn expr(&mut self, node: &ExprLoc, klass: Option<&Klass>) -> Result<String, TranslateError> {
        let lineno = node.lineno;
        match &node.expr {
            Expr::Const(lit) => Ok(self.const_expr(lit)),
            Expr::Op { op, left, right } => self.binop_expr(*op, left, right, klass, lineno),
            Expr::Unary { op, operand } => self.unary_expr(*op, operand, klass),
            Expr::Not(operand) => {
                let e = self.expr(operand, klass)?;
                Ok(format!("!({e})"))
            }
            Expr::Or(nodes) => self.bool_chain(nodes, " || ", klass),
            Expr::And(nodes) => self.bool_chain(nodes, " && ", klass),
            Expr::BitOp { op, operands } => {
                let parts = operands
                    .iter()
                    .map(|child| self.expr(child, klass))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(format!("({})", parts.join(&format!(" {} ", op.js_token()))))
            }
            Expr::Compare { left, ops } => self.compare_expr(left, ops, klass, lineno),
            Expr::Call(call) => self.callfunc(call, klass, lineno),
            Expr::Name(name) => Ok(self.name_expr(name)),
            Expr::Subscript { object, index } => self.subscript_code(object, index, klass, lineno),
            Expr::Getattr { .. } => self.getattr_expr(node, klass),
            Expr::List(items) => {
                let parts = self.expr_list(items, klass)?;
                Ok(self.track_call(format!("new pyjslib['List']([{}])", parts.join(", ")), lineno))
            }
            Expr::Tuple(items) => {
                let parts = self.expr_list(items, klass)?;
                Ok(self.track_call(format!("new pyjslib['Tuple']([{}])", parts.join(", ")), lineno))
            }
            Expr::Dict(items) => {
                let mut parts = Vec::with_capacity(items.len());
                for (key, value) in items {
                    let key = self.expr(key, klass)?;
                    let value = self.expr(value, klass)?;
                    parts.push(format!("[{key}, {value}]"));
                }
                Ok(self.track_call(format!("new pyjslib['Dict']([{}])", parts.join(", ")), lineno))
            }
            Expr::Slice { object, lower, upper } => {
                let obj = self.expr(object, klass)?;
                let lower = match lower {
                    Some(e) => self.expr(e, klass)?,
                    None => "null".to_owned(),
                };
                let upper = match upper {
                    Some(e) => self.expr(e, klass)?,
                    None => "null".to_owned(),
                };
                Ok(format!("pyjslib['slice']({obj}, {lower}, {upper})"))
            }
            Expr::Lambda(lambda) => self.lambda_expr(lambda, lineno, klass),
            Expr::ListComp { expr, generators } => self.listcomp_expr(expr, generators, lineno, klass),
            Expr::Yield(value) => {
                self.emit_yield(value.as_deref(), lineno, klass)?;
                Ok("$yield_value".to_owned())
            }
        }
    }

    fn expr_list(&mut self, items: &[ExprLoc], klass: Option<&Klass>) -> Result<Vec<String>, TranslateError> {
        items.iter().map(|item| self.expr(item, klass)).collect()
    }

    fn bool_chain(&mut self, nodes: &[ExprLoc], joiner: &str, klass: Option<&Klass>) -> Result<String, TranslateError> {
        let parts = self.expr_list(nodes, klass)?;
        let inner: Vec<String> = parts.into_iter().map(|p| format!("({p})")).collect();
        Ok(inner.join(joiner))
    }

    pub(crate) fn const_expr(&self, lit: &Literal) -> String {
        match lit {
            Literal::Int(i) => i.to_string(),
            Literal::Float(f) => ryu::Buffer::new().format(*f).to_owned(),
            Literal::Str(s) => format!("String('{}')", escape_js(s)),
            Literal::None => "null".to_owned(),
        }
    }

    fn binop_expr(
        &mut self,
        op: BinOp,
        left: &ExprLoc,
        right: &ExprLoc,
        klass: Option<&Klass>,
        lineno: u32,
    ) -> Result<String, TranslateError> {
        match op {
            BinOp::Add => Ok(format!("({})", self.guarded_binop("+", "$add", "op_add", true, left, right, klass)?)),
            BinOp::Sub => Ok(format!("({})", self.guarded_binop("-", "$sub", "op_sub", true, left, right, klass)?)),
            BinOp::Mul => Ok(format!("({})", self.guarded_binop("*", "$mul", "op_mul", false, left, right, klass)?)),
            BinOp::Div => Ok(format!("({})", self.guarded_binop("/", "$div", "op_div", false, left, right, klass)?)),
            BinOp::FloorDiv => {
                let div = self.guarded_binop("/", "$div", "op_div", false, left, right, klass)?;
                Ok(format!("pyjslib['int'](({div}))"))
            }
            BinOp::Mod => self.mod_expr(left, right, klass, lineno),
            BinOp::Power => {
                let l = self.expr(left, klass)?;
                let r = self.expr(right, klass)?;
                Ok(format!("Math.pow({l},{r})"))
            }
            BinOp::LeftShift => {
                let l = self.expr(left, klass)?;
                let r = self.expr(right, klass)?;
                Ok(format!("({l} << {r})"))
            }
            BinOp::RightShift => {
                let l = self.expr(left, klass)?;
                let r = self.expr(right, klass)?;
                Ok(format!("({l} >>> {r})"))
            }
        }
    }

    /// A binary operator, either native or as the guarded runtime-call form.
    ///
    /// `strings_too` widens the fast-path guard to strings (concatenation and
    /// repetition-free operators only).
    fn guarded_binop(
        &mut self,
        token: &str,
        temp_prefix: &str,
        op_func: &str,
        strings_too: bool,
        left: &ExprLoc,
        right: &ExprLoc,
        klass: Option<&Klass>,
    ) -> Result<String, TranslateError> {
        if !self.opts.operator_funcs {
            let l = self.expr(left, klass)?;
            let r = self.expr(right, klass)?;
            return Ok(format!("{l} {token} {r}"));
        }
        let e1 = self.expr(left, klass)?;
        let e2 = self.expr(right, klass)?;
        let v1 = self.temp_var(temp_prefix);
        let v2 = self.temp_var(temp_prefix);
        let s = self.out.spacing();
        let guard = if strings_too {
            format!("typeof ({v1}={e1})==typeof ({v2}={e2}) && (typeof {v1}=='number'||typeof {v1}=='string')")
        } else {
            format!("typeof ({v1}={e1})==typeof ({v2}={e2}) && typeof {v1}=='number'")
        };
        Ok(format!(
            "({guard}?\n{s}\t{v1}{token}{v2}:\n{s}\tpyjslib['{op_func}']({v1},{v2}))"
        ))
    }

    fn mod_expr(
        &mut self,
        left: &ExprLoc,
        right: &ExprLoc,
        klass: Option<&Klass>,
        lineno: u32,
    ) -> Result<String, TranslateError> {
        if matches!(left.expr, Expr::Const(Literal::Str(_))) {
            let l = self.expr(left, klass)?;
            let r = self.expr(right, klass)?;
            return Ok(self.track_call(format!("pyjslib['sprintf']({l}, {r})"), lineno));
        }
        if !self.opts.operator_funcs {
            let l = self.expr(left, klass)?;
            let r = self.expr(right, klass)?;
            return Ok(format!("{l} % {r}"));
        }
        let e1 = self.expr(left, klass)?;
        let e2 = self.expr(right, klass)?;
        let v1 = self.temp_var("$mod");
        let v2 = self.temp_var("$mod");
        let s = self.out.spacing();
        Ok(format!(
            "(typeof ({v1}={e1})==typeof ({v2}={e2}) && typeof {v1}=='number'?\n{s}\t{v1}%{v2}:\n{s}\tpyjslib['op_mod']({v1},{v2}))"
        ))
    }

    fn unary_expr(&mut self, op: UnaryOp, operand: &ExprLoc, klass: Option<&Klass>) -> Result<String, TranslateError> {
        match op {
            UnaryOp::Invert => {
                let e = self.expr(operand, klass)?;
                Ok(format!("(~{e})"))
            }
            UnaryOp::Plus => {
                if !self.opts.operator_funcs {
                    return self.expr(operand, klass);
                }
                let e = self.expr(operand, klass)?;
                let v = self.temp_var("$uadd");
                let s = self.out.spacing();
                Ok(format!(
                    "(typeof ({v}={e})=='number'?\n{s}\t{v}:\n{s}\tpyjslib['op_uadd']({v}))"
                ))
            }
            UnaryOp::Minus => {
                if !self.opts.operator_funcs {
                    let e = self.expr(operand, klass)?;
                    return Ok(format!("-{e}"));
                }
                let e = self.expr(operand, klass)?;
                let v = self.temp_var("$usub");
                let s = self.out.spacing();
                Ok(format!(
                    "(typeof ({v}={e})=='number'?\n{s}\t-{v}:\n{s}\tpyjslib['op_usub']({v}))"
                ))
            }
        }
    }

    fn compare_expr(
        &mut self,
        left: &ExprLoc,
        ops: &[(CompareOp, ExprLoc)],
        klass: Option<&Klass>,
        lineno: u32,
    ) -> Result<String, TranslateError> {
        let lhs = self.expr(left, klass)?;
        if ops.len() != 1 {
            return Err(self.err("only one comparison operator is supported", lineno));
        }
        let (op, rhs_node) = &ops[0];
        let rhs = self.expr(rhs_node, klass)?;
        Ok(match op {
            CompareOp::Eq => {
                let eq = self.inline_eq_code(&lhs, &rhs);
                self.track_call(eq, lineno)
            }
            CompareOp::NotEq => {
                let eq = self.inline_eq_code(&lhs, &rhs);
                self.track_call(format!("!{eq}"), lineno)
            }
            CompareOp::Lt => self.track_call(format!("(pyjslib['cmp']({lhs}, {rhs}) == -1)"), lineno),
            CompareOp::LtE => self.track_call(format!("(pyjslib['cmp']({lhs}, {rhs}) != 1)"), lineno),
            CompareOp::Gt => self.track_call(format!("(pyjslib['cmp']({lhs}, {rhs}) == 1)"), lineno),
            CompareOp::GtE => self.track_call(format!("(pyjslib['cmp']({lhs}, {rhs}) != -1)"), lineno),
            CompareOp::In => self.track_call(format!("{rhs}.__contains__({lhs})"), lineno),
            CompareOp::NotIn => {
                let contains = self.track_call(format!("{rhs}.__contains__({lhs})"), lineno);
                format!("!{contains}")
            }
            CompareOp::Is => format!("({lhs} === {rhs})"),
            CompareOp::IsNot => format!("({lhs} !== {rhs})"),
        })
    }

    // ------------------------------------------------------------------
    // Inline expansions
    // ------------------------------------------------------------------

    /// The truth-test protocol, inlined or as a runtime call.
    pub(crate) fn inline_bool_code(&mut self, e: &str) -> String {
        if !self.opts.inline_bool {
            return format!("pyjslib['bool']({e})");
        }
        let v = self.temp_var("$bool");
        let s = self.out.spacing();
        format!(
            "(!({v}={e})?false:\n\
             {s}\t({v}===true?true:\n\
             {s}\t\t(typeof {v}!='object'?Boolean({v}):\n\
             {s}\t\t\t(typeof {v}.__nonzero__=='function'?{v}.__nonzero__():\n\
             {s}\t\t\t\t(typeof {v}.__len__=='function'?{v}.__len__()>0:\n\
             {s}\t\t\t\ttrue)))))"
        )
    }

    /// The length protocol, inlined or as a runtime call.
    pub(crate) fn inline_len_code(&mut self, e: &str) -> String {
        if !self.opts.inline_len {
            return format!("pyjslib['len']({e})");
        }
        let v = self.temp_var("$len");
        let s = self.out.spacing();
        format!(
            "(({v}={e}) === null?0:\n\
             {s}\t(typeof {v}.__len__ == 'function'?{v}.__len__():\n\
             {s}\t\t(typeof {v}.length != 'undefined'?{v}.length:\n\
             {s}\t\t\t(function(){{throw pyjslib['TypeError'](\"object has no len()\");}})())))"
        )
    }

    /// The equality protocol, inlined or as a runtime call.
    pub(crate) fn inline_eq_code(&mut self, e1: &str, e2: &str) -> String {
        if !self.opts.inline_eq {
            return format!("pyjslib['eq']({e1}, {e2})");
        }
        let v1 = self.temp_var("$eq");
        let v2 = self.temp_var("$eq");
        let s = self.out.spacing();
        format!(
            "(({v1}={e1})===({v2}={e2})&&{v1}===null?true:\n\
             {s}\t({v1}===null?false:({v2}===null?false:\n\
             {s}\t\t((typeof {v1}=='object'||typeof {v1}=='function')&&typeof {v1}.__cmp__=='function'?{v1}.__cmp__({v2}) == 0:\n\
             {s}\t\t\t((typeof {v2}=='object'||typeof {v2}=='function')&&typeof {v2}.__cmp__=='function'?{v2}.__cmp__({v1}) == 0:\n\
             {s}\t\t\t\t{v1}=={v2})))))"
        )
    }

    // ------------------------------------------------------------------
    // Attribute access
    // ------------------------------------------------------------------

    pub(crate) fn subscript_code(
        &mut self,
        object: &ExprLoc,
        index: &ExprLoc,
        klass: Option<&Klass>,
        lineno: u32,
    ) -> Result<String, TranslateError> {
        let obj = self.expr(object, klass)?;
        let idx = self.expr(index, klass)?;
        Ok(self.track_call(format!("{obj}.__getitem__({idx})"), lineno))
    }

    /// The raw attribute chain of a `Getattr` node: head expression first,
    /// then one remapped segment per attribute.
    pub(crate) fn getattr_chain(&mut self, node: &ExprLoc, klass: Option<&Klass>) -> Result<Vec<String>, TranslateError> {
        let Expr::Getattr { object, attr } = &node.expr else {
            unreachable!("getattr_chain called on a non-attribute node");
        };
        let attr = attr_name(attr);
        match &object.expr {
            Expr::Name(name) => Ok(vec![self.name_expr(name), attr]),
            Expr::Getattr { .. } => {
                let mut chain = self.getattr_chain(object, klass)?;
                chain.push(attr);
                Ok(chain)
            }
            Expr::Subscript { object: obj, index } => {
                Ok(vec![self.subscript_code(obj, index, klass, object.lineno)?, attr])
            }
            Expr::Call(call) => Ok(vec![self.callfunc(call, klass, object.lineno)?, attr]),
            _ => Err(self.err("unsupported attribute access base", node.lineno)),
        }
    }

    /// Full attribute-read emission: the bound-method/descriptor conditional
    /// plus the attribute-checking wrapper, as the switches dictate.
    fn getattr_expr(&mut self, node: &ExprLoc, klass: Option<&Klass>) -> Result<String, TranslateError> {
        let chain = self.getattr_chain(node, klass)?;
        let attr = attrib_join(&chain);
        let attr_left = attrib_join(&chain[..chain.len() - 1]);
        let attr_right = chain.last().expect("attribute chains are never empty").clone();
        let s = self.out.spacing();

        let attr_code = if self.opts.bound_methods || self.opts.descriptors {
            let condition = if self.opts.descriptors {
                format!(
                    "{attr_left} !== null && {attr_left}.__is_instance__ && \n\
                     (typeof {attr} == 'function')||\n\
                     ({attr_left}['{attr_right}'] !== null && \n\
                     typeof {attr_left}['{attr_right}'] != 'undefined' && \n\
                     typeof {attr_left}['{attr_right}']['__get__'] == 'function')"
                )
            } else {
                format!("typeof {attr} == 'function' && {attr_left}.__is_instance__")
            };
            let code = format!("({condition}?\n\tpyjslib['getattr']({attr_left}, '{attr_right}'):\n\t{attr})");
            code.split('\n').collect::<Vec<_>>().join(&format!("\n{s}\t\t"))
        } else {
            attr.clone()
        };

        if !self.opts.attribute_checking {
            return Ok(attr_code);
        }
        if !attr.contains('(') && !self.opts.debug {
            return Ok(format!(
                "(typeof {attr}=='undefined'?\n\
                 {s}\t\t(function(){{throw new TypeError(\"{attr} is undefined\")}})():\n\
                 {s}\t\t{attr_code})"
            ));
        }
        // The reported name must stay readable: rebuild the chain with the
        // tracking instrumentation off when it would otherwise leak in.
        let attr_msg = if self.opts.source_tracking || self.opts.debug {
            let saved = (self.opts.source_tracking, self.opts.debug);
            self.opts.source_tracking = false;
            self.opts.debug = false;
            let plain_chain = self.getattr_chain(node, klass)?;
            self.opts.source_tracking = saved.0;
            self.opts.debug = saved.1;
            attrib_join(&plain_chain)
        } else {
            attr.clone()
        };
        Ok(format!(
            "(function(){{\n\
             {s}\tvar $pyjs__testval={attr_code};\n\
             {s}\treturn (typeof $pyjs__testval=='undefined'?\n\
             {s}\t\t(function(){{throw new TypeError(\"{attr_msg} is undefined\")}})():\n\
             {s}\t\t$pyjs__testval);\n\
             {s}}})()"
        ))
    }

    // ------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------

    /// Call emission plus the debug retry shim when enabled.
    pub(crate) fn callfunc(&mut self, call: &CallFunc, klass: Option<&Klass>, lineno: u32) -> Result<String, TranslateError> {
        let code = self.callfunc_code(call, klass, lineno)?;
        if self.ignore_debug {
            return Ok(code);
        }
        Ok(self.track_call(code, lineno))
    }

    /// Builds the call site: direct positional call, or the runtime keyword
    /// dispatcher when keyword/star arguments are present.
    pub(crate) fn callfunc_code(
        &mut self,
        call: &CallFunc,
        klass: Option<&Klass>,
        lineno: u32,
    ) -> Result<String, TranslateError> {
        self.ignore_debug = false;
        let call_name = match &call.func.expr {
            Expr::Name(name) => match self.scopes.lookup(name) {
                Some(hit) if hit.kind == NameKind::Intrinsic => {
                    return self.intrinsic_call(&hit.js_name, call, lineno);
                }
                Some(hit) => hit.js_name,
                None => self.scope_name(name, None, false),
            },
            Expr::Getattr { object, attr } => match &object.expr {
                Expr::Name(name) => format!("{}.{}", self.name_expr(name), attr_name(attr)),
                Expr::Getattr { .. } => {
                    let chain = self.getattr2_chain(object, attr, klass)?;
                    attrib_join(&chain)
                }
                Expr::Call(inner) => {
                    format!("{}.{}", self.callfunc(inner, klass, object.lineno)?, attr_name(attr))
                }
                Expr::Subscript { object: obj, index } => {
                    format!(
                        "{}.{}",
                        self.subscript_code(obj, index, klass, object.lineno)?,
                        attr_name(attr)
                    )
                }
                Expr::Const(lit) => format!("{}.{}", self.const_expr(lit), attr_name(attr)),
                Expr::Slice { .. } => format!("{}.{}", self.expr(object, klass)?, attr_name(attr)),
                _ => return Err(self.err("unsupported call target", lineno)),
            },
            Expr::Call(inner) => self.callfunc(inner, klass, call.func.lineno)?,
            Expr::Subscript { object, index } => self.subscript_code(object, index, klass, call.func.lineno)?,
            _ => return Err(self.err("unsupported call target", lineno)),
        };

        // Single-argument len() has an inline expansion of the length
        // protocol when the switch asks for it.
        if self.opts.inline_len
            && call_name == "pyjslib['len']"
            && call.star_args.is_none()
            && call.dstar_args.is_none()
            && call.args.len() == 1
            && let CallArg::Positional(arg) = &call.args[0]
        {
            let e = self.expr(arg, klass)?;
            return Ok(self.inline_len_code(&e));
        }

        let star_arg = match &call.star_args {
            Some(e) => Some(self.expr(e, klass)?),
            None => None,
        };
        let dstar_arg = match &call.dstar_args {
            Some(e) => Some(self.expr(e, klass)?),
            None => None,
        };
        let mut call_args = Vec::new();
        let mut kwargs = Vec::new();
        for arg in &call.args {
            match arg {
                CallArg::Positional(e) => call_args.push(self.expr(e, klass)?),
                CallArg::Keyword { name, value } => kwargs.push(format!("{name}:{}", self.expr(value, klass)?)),
            }
        }

        if kwargs.is_empty() && star_arg.is_none() && dstar_arg.is_none() {
            return Ok(format!("{call_name}({})", call_args.join(", ")));
        }

        let kw_dict = format!("{{{}}}", kwargs.join(", "));
        let mut fn_args = vec![kw_dict];
        fn_args.extend(call_args);
        let fn_args = fn_args.join(", ");
        let star_arg = star_arg.unwrap_or_else(|| "null".to_owned());
        let dstar_arg = dstar_arg.unwrap_or_else(|| "null".to_owned());

        let call_this = if call_name.ends_with(')') {
            None
        } else {
            call_name.rsplit_once('.')
        };
        Ok(match call_this {
            None => format!("$pyjs_kwargs_call(null, {call_name}, {star_arg}, {dstar_arg}, [{fn_args}])"),
            Some((this, method)) => {
                format!("$pyjs_kwargs_call({this}, '{method}', {star_arg}, {dstar_arg}, [{fn_args}])")
            }
        })
    }

    /// Chain for a call whose target is a nested attribute access: the head
    /// name resolves through scope, the tail segments stay raw for the join.
    fn getattr2_chain(
        &mut self,
        node: &ExprLoc,
        final_attr: &str,
        klass: Option<&Klass>,
    ) -> Result<Vec<String>, TranslateError> {
        let Expr::Getattr { object, attr } = &node.expr else {
            unreachable!("getattr2_chain called on a non-attribute node");
        };
        if matches!(object.expr, Expr::Getattr { .. }) {
            let mut chain = self.getattr2_chain(object, attr, klass)?;
            chain.push(final_attr.to_owned());
            return Ok(chain);
        }
        if let Expr::Name(name) = &object.expr {
            let head = match self.scopes.lookup(name) {
                Some(hit) => hit.js_name,
                None => self.scope_name(name, None, false),
            };
            return Ok(vec![head, attr.clone(), final_attr.to_owned()]);
        }
        Ok(vec![self.expr(object, klass)?, attr.clone(), final_attr.to_owned()])
    }

    // ------------------------------------------------------------------
    // Lambdas and comprehensions
    // ------------------------------------------------------------------

    /// A lambda becomes a uniquely named local helper; the helper name is the
    /// expression result.
    fn lambda_expr(&mut self, lambda: &LambdaDef, lineno: u32, klass: Option<&Klass>) -> Result<String, TranslateError> {
        let function_name = self.out.uniqid("$lambda");
        let func = FunctionDef {
            name: function_name.clone(),
            argnames: lambda.argnames.clone(),
            defaults: lambda.defaults.clone(),
            varargs: lambda.varargs,
            kwargs: lambda.kwargs,
            code: vec![StmtLoc::new(Stmt::Return(lambda.body.clone()), lineno)],
            decorators: vec![],
        };
        self.emit_function(&func, lineno, klass, false, true)?;
        Ok(function_name)
    }

    /// List comprehensions lower to an immediately-invoked function holding
    /// the equivalent nested for/if statements, so the iteration protocol is
    /// identical to a statement-level loop.
    fn listcomp_expr(
        &mut self,
        elt: &ExprLoc,
        generators: &[CompFor],
        lineno: u32,
        klass: Option<&Klass>,
    ) -> Result<String, TranslateError> {
        self.scopes.push();
        let resultlist = self.temp_var("$listcomp");
        self.out.push_buffer();
        self.out.writeln("function(){");
        self.out.writeln(&format!("var {resultlist} = pyjslib['List']();"));

        let append = ExprLoc::new(
            Expr::Getattr {
                object: Box::new(ExprLoc::name(resultlist.clone(), lineno)),
                attr: "append".to_owned(),
            },
            lineno,
        );
        let mut inner = StmtLoc::new(
            Stmt::Discard(ExprLoc::new(
                Expr::Call(CallFunc::positional(append, vec![elt.clone()])),
                lineno,
            )),
            lineno,
        );
        for generator in generators.iter().rev() {
            if generator.ifs.len() > 1 {
                self.out.pop_buffer();
                self.scopes.pop();
                return Err(self.err("at most one filter is supported per comprehension clause", lineno));
            }
            let mut body = vec![inner];
            if let Some(cond) = generator.ifs.first() {
                body = vec![StmtLoc::new(
                    Stmt::If {
                        tests: vec![(cond.clone(), body)],
                        orelse: None,
                    },
                    cond.lineno,
                )];
            }
            inner = StmtLoc::new(
                Stmt::For {
                    target: generator.target.clone(),
                    iter: generator.iter.clone(),
                    body,
                    orelse: None,
                },
                generator.lineno,
            );
        }
        let StmtLoc { stmt: Stmt::For { target, iter, body, .. }, lineno: for_lineno } = inner else {
            // No generators means the parser produced a malformed node.
            self.out.pop_buffer();
            self.scopes.pop();
            return Err(self.err("list comprehension without a for clause", lineno));
        };
        self.emit_for(&target, &iter, &body, None, for_lineno, klass)?;

        self.out.write(&format!("return {resultlist};}}()"));
        let captured = self.out.pop_buffer();
        self.scopes.pop();
        Ok(captured)
    }
}
