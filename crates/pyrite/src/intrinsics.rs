//! Compiler intrinsics: calls resolved at translation time instead of being
//! emitted as runtime calls.
//!
//! Modules opt in by importing from the magic `__pyjamas__` module. `JS`
//! splices a raw JavaScript literal into the output; `setCompilerOptions`
//! mutates the active switch frame and emits nothing; `jsimport` records a
//! JavaScript file dependency for the build driver.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::ast::{CallArg, CallFunc, Expr, Literal};
use crate::error::TranslateError;
use crate::translator::{JsImport, JsImportLocation, JsImportMode, Translator};

/// Word-boundary scan for `return` inside a raw JavaScript literal. A hit
/// disables source tracking in generator bodies, where the tracking epilogue
/// and a native return cannot coexist.
static RE_RETURN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\breturn\b").expect("static pattern compiles"));

const INTRINSIC_NAMES: &[&str] = &["JS", "wnd", "doc", "debugger", "jsimport", "setCompilerOptions", "console"];

/// True for names importable from the magic intrinsics module.
pub(crate) fn is_intrinsic(name: &str) -> bool {
    INTRINSIC_NAMES.contains(&name)
}

impl Translator<'_> {
    /// Expands a call to an intrinsic. Returns the spliced expression text,
    /// which is empty for the purely directive intrinsics.
    pub(crate) fn intrinsic_call(
        &mut self,
        intrinsic: &str,
        call: &CallFunc,
        lineno: u32,
    ) -> Result<String, TranslateError> {
        match intrinsic {
            "JS" => {
                let args = positional_args(call);
                if args.len() != 1 || call.args.len() != 1 {
                    return Err(self.err("JS requires exactly one argument", lineno));
                }
                let Expr::Const(Literal::Str(text)) = &args[0].expr else {
                    return Err(self.err("JS only supports constant strings", lineno));
                };
                self.ignore_debug = true;
                if RE_RETURN.is_match(text) {
                    self.has_js_return = true;
                }
                Ok(text.clone())
            }
            "wnd" => {
                self.expect_no_args(call, "wnd", lineno)?;
                Ok("$wnd".to_owned())
            }
            "doc" => {
                self.expect_no_args(call, "doc", lineno)?;
                Ok("$doc".to_owned())
            }
            "debugger" => {
                self.expect_no_args(call, "debugger", lineno)?;
                Ok("debugger".to_owned())
            }
            "jsimport" => self.jsimport_call(call, lineno),
            "setCompilerOptions" => {
                for arg in &call.args {
                    let CallArg::Positional(arg) = arg else {
                        return Err(self.config_err("setCompilerOptions only supports constant strings", lineno));
                    };
                    let Expr::Const(Literal::Str(option)) = &arg.expr else {
                        return Err(self.config_err("setCompilerOptions only supports constant strings", lineno));
                    };
                    if !self.opts.set_compiler_option(option) {
                        return Err(self.config_err(format!("setCompilerOptions invalid option '{option}'"), lineno));
                    }
                }
                self.ignore_debug = true;
                Ok(String::new())
            }
            // The console handle is a plain name; calling it forwards the
            // bare reference.
            "console" => Ok("console".to_owned()),
            _ => Err(self.err(format!("unknown intrinsic '{intrinsic}'"), lineno)),
        }
    }

    /// `jsimport(path[, mode[, location]])`.
    fn jsimport_call(&mut self, call: &CallFunc, lineno: u32) -> Result<String, TranslateError> {
        let args = positional_args(call);
        if args.is_empty() || args.len() > 3 || args.len() != call.args.len() {
            return Err(self.err("jsimport requires between one and three arguments", lineno));
        }
        let mut strings = Vec::with_capacity(args.len());
        for arg in &args {
            let Expr::Const(Literal::Str(text)) = &arg.expr else {
                return Err(self.err("jsimport only supports constant string arguments", lineno));
            };
            strings.push(text.clone());
        }
        let path = strings[0].clone();
        let mode = match strings.get(1) {
            None => JsImportMode::Default,
            Some(mode) => JsImportMode::from_str(mode)
                .map_err(|_| self.err("jsimport mode must be default, static or dynamic", lineno))?,
        };
        let location = match strings.get(2) {
            None => JsImportLocation::Middle,
            Some(location) => JsImportLocation::from_str(location)
                .map_err(|_| self.err("jsimport location must be early, middle or late", lineno))?,
        };
        self.warn_missing_js(&path);
        self.imported_js.push(JsImport { path, mode, location });
        self.ignore_debug = true;
        Ok(String::new())
    }

    fn expect_no_args(&mut self, call: &CallFunc, name: &str, lineno: u32) -> Result<(), TranslateError> {
        if call.args.is_empty() && call.star_args.is_none() && call.dstar_args.is_none() {
            self.ignore_debug = true;
            Ok(())
        } else {
            Err(self.err(format!("{name} does not take arguments"), lineno))
        }
    }
}

fn positional_args(call: &CallFunc) -> Vec<&crate::ast::ExprLoc> {
    call.args
        .iter()
        .filter_map(|arg| match arg {
            CallArg::Positional(expr) => Some(expr),
            CallArg::Keyword { .. } => None,
        })
        .collect()
}
