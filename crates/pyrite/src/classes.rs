//! Class emission: the class-creation IIFE, method binding and the MD5
//! identity fingerprint.
//!
//! The emitted shape builds a class-definition object, binds each method
//! through the runtime so both bound and unbound forms exist, and hands the
//! definition plus the base list to the runtime class constructor. The
//! runtime, not the translator, computes linearization and installs the
//! instance-check fast path keyed on the `__md5__` fingerprint.

use md5::{Digest, Md5};

use crate::ast::{ClassDef, Expr, Stmt, Target};
use crate::error::TranslateError;
use crate::scope::NameKind;
use crate::translator::Translator;

/// Per-emission record of the class being built.
#[derive(Debug, Clone)]
pub(crate) struct Klass {
    /// The qualified emitted name.
    pub name: String,
    /// Identity fingerprint the runtime uses for constant-time instance
    /// checks when the exact class matches.
    pub md5: String,
}

/// Fingerprint for a class: module name, definition line and the structural
/// shape of the definition.
fn class_md5(module_name: &str, lineno: u32, node: &ClassDef) -> String {
    let mut hasher = Md5::new();
    hasher.update(module_name.as_bytes());
    hasher.update(lineno.to_string().as_bytes());
    hasher.update(format!("{node:?}").as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

impl Translator<'_> {
    pub(crate) fn emit_class(&mut self, node: &ClassDef, lineno: u32) -> Result<(), TranslateError> {
        let qualified_name = format!("{}{}", self.modpfx(), node.name);
        let klass = Klass {
            name: qualified_name.clone(),
            md5: class_md5(&self.module_name, lineno, node),
        };

        let mut base_classes: Vec<String> = Vec::new();
        if node.bases.is_empty() {
            base_classes.push("pyjslib.object".to_owned());
        } else {
            for base in &node.bases {
                match &base.expr {
                    Expr::Name(name) => base_classes.push(self.name_expr(name)),
                    Expr::Getattr { .. } => base_classes.push(self.expr(base, None)?),
                    _ => return Err(self.err("unsupported base class expression", base.lineno)),
                }
            }
        }
        // The root object class has no bases; everything else gets at least
        // the implicit one.
        if node.name == "object" {
            base_classes.clear();
        }

        let class_name = self.add_lookup(NameKind::Class, &node.name, &qualified_name);
        let ind = self.out.indent();
        self.out.writeln(&format!("{ind}{class_name} = (function(){{"));
        let sp = self.out.spacing();
        self.out
            .writeln(&format!("{sp}var $cls_instance = $pyjs__class_instance('{}');", node.name));
        self.out.writeln(&format!("{sp}var $cls_definition = new Object();"));
        self.out.writeln(&format!("{sp}var $method;"));
        self.out
            .writeln(&format!("{sp}$cls_definition.__md5__ = '{}';", klass.md5));

        // Class-body names live in a private frame that is only active while
        // a member is being recorded; method bodies never see it.
        let mut private_frame = crate::scope::Frame::default();
        for child in &node.code {
            match &child.stmt {
                Stmt::Pass => {}
                Stmt::Function(func) => {
                    self.emit_method(func, child.lineno, &klass)?;
                    self.scopes.push_frame(private_frame);
                    let member = format!("$cls_definition.{}", func.name);
                    let js_member = self.add_lookup(NameKind::Method, &func.name, &member);
                    self.push_options();
                    let (_, _, decorator_code) =
                        self.parse_decorators(&func.decorators, child.lineno, Some(&klass), false)?;
                    self.pop_options();
                    let method_value = decorator_code.map_or_else(|| "$method".to_owned(), |code| code.replace("%s", "$method"));
                    let sp = self.out.spacing();
                    self.out.writeln(&format!("{sp}{js_member} = {method_value};"));
                    // References from later class-body code get the unbound
                    // form so they do not capture an instance.
                    self.add_lookup(
                        NameKind::Method,
                        &func.name,
                        &format!("pyjslib['staticmethod']({js_member})"),
                    );
                    private_frame = self.scopes.pop();
                }
                Stmt::Assign { targets, value } if targets.len() == 1 => {
                    self.scopes.push_frame(private_frame);
                    self.track_lineno(child.lineno, true);
                    match &targets[0] {
                        Target::Subscript { object, index } => {
                            let obj = self.expr(object, Some(&klass))?;
                            let idx = self.expr(index, Some(&klass))?;
                            let rhs = self.expr(value, Some(&klass))?;
                            let sp = self.out.spacing();
                            self.out.writeln(&format!("{sp}{obj}.__setitem__({idx}, {rhs});"));
                        }
                        Target::Name(name) => {
                            let rhs = self.expr(value, Some(&klass))?;
                            let member = format!("$cls_definition.{name}");
                            let lhs = self.add_lookup(NameKind::Attribute, name, &member);
                            let sp = self.out.spacing();
                            self.out.writeln(&format!("{sp}{lhs} = {rhs};"));
                        }
                        _ => {
                            return Err(self.err("unsupported class-body assignment target", child.lineno));
                        }
                    }
                    private_frame = self.scopes.pop();
                }
                // A bare constant is a docstring; nothing is emitted for it.
                Stmt::Discard(expr) if matches!(expr.expr, Expr::Const(_)) => {}
                _ => return Err(self.err("unsupported statement in class body", child.lineno)),
            }
        }

        let sp = self.out.spacing();
        self.out
            .writeln(&format!("{sp}return $pyjs__class_function($cls_instance, $cls_definition,"));
        self.out.writeln(&format!(
            "{sp}                            new Array({}));",
            base_classes.join(",")
        ));
        let ded = self.out.dedent();
        self.out.writeln(&format!("{ded}}})();"));
        Ok(())
    }
}
