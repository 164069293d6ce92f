//! Compile-time switches and the options stack.
//!
//! The thirteen switches trade Python fidelity against output speed and size.
//! They are mutated by `compiler.*` decorators and by the
//! `setCompilerOptions(...)` marker call, and saved/restored around every
//! function and method body so a decorator's effect ends with its function.

use std::str::FromStr;

/// The full switch set for one emission scope.
///
/// Defaults match the library entry point: everything on except the debug
/// call wrapper, which costs enough that it is strictly opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CompileOptions {
    /// Wrap calls in a try/catch retry shim that reports the failing line.
    pub debug: bool,
    /// Emit code for `print` statements (off silently drops them).
    pub print_statements: bool,
    /// Emit argument-count probes in function preludes.
    pub function_argument_checking: bool,
    /// Guard attribute reads against `undefined` with a throwing wrapper.
    pub attribute_checking: bool,
    /// Route attribute reads through the runtime so methods arrive bound.
    pub bound_methods: bool,
    /// Route attribute reads/writes through `getattr`/`setattr` so
    /// `__get__`/`__set__` descriptors fire.
    pub descriptors: bool,
    /// Maintain the runtime track stack for exception reporting.
    pub source_tracking: bool,
    /// Update the tracked line number on every statement.
    pub line_tracking: bool,
    /// Store source lines in the emitted module for tracebacks.
    pub store_source: bool,
    /// Inline the truth-test protocol instead of calling the runtime.
    pub inline_bool: bool,
    /// Inline the equality protocol instead of calling the runtime.
    pub inline_eq: bool,
    /// Inline the length protocol instead of calling the runtime.
    pub inline_len: bool,
    /// Lower arithmetic operators to guarded runtime calls instead of native
    /// operators. Native operators are fast but wrong for overloaded types.
    pub operator_funcs: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            debug: false,
            print_statements: true,
            function_argument_checking: true,
            attribute_checking: true,
            bound_methods: true,
            descriptors: true,
            source_tracking: true,
            line_tracking: true,
            store_source: true,
            inline_bool: true,
            inline_eq: true,
            inline_len: true,
            operator_funcs: true,
        }
    }
}

/// Predefined switch bundles selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
pub enum OptionPreset {
    /// Everything needed to debug emitted code: call wrapping and the full
    /// tracking instrumentation.
    Debug,
    /// Maximum speed: every check off, inline expansions on, native operators.
    Speed,
    /// Maximum Python fidelity at the cost of speed.
    Strict,
}

impl CompileOptions {
    /// Applies a named preset bundle on top of the current switches.
    pub fn apply_preset(&mut self, preset: OptionPreset) {
        match preset {
            OptionPreset::Debug => {
                self.debug = true;
                self.source_tracking = true;
                self.line_tracking = true;
                self.store_source = true;
            }
            OptionPreset::Speed => {
                self.debug = false;
                self.print_statements = false;
                self.function_argument_checking = false;
                self.attribute_checking = false;
                self.bound_methods = false;
                self.descriptors = false;
                self.source_tracking = false;
                self.inline_bool = true;
                self.inline_eq = true;
                self.inline_len = true;
                self.operator_funcs = false;
            }
            OptionPreset::Strict => {
                self.function_argument_checking = true;
                self.attribute_checking = true;
                self.bound_methods = true;
                self.descriptors = true;
                self.source_tracking = true;
                self.line_tracking = true;
                self.store_source = true;
                self.operator_funcs = true;
            }
        }
    }

    /// Applies a `compiler.<name>` decorator switch by name.
    ///
    /// Returns false when the name is not a recognized switch; the caller
    /// turns that into a configuration error with the offending line.
    pub(crate) fn apply_decorator(&mut self, name: &str) -> bool {
        match name {
            "Debug" => self.debug = true,
            "noDebug" => self.debug = false,
            "PrintStatements" => self.print_statements = true,
            "noPrintStatements" => self.print_statements = false,
            "FunctionArgumentChecking" => self.function_argument_checking = true,
            "noFunctionArgumentChecking" => self.function_argument_checking = false,
            "AttributeChecking" => self.attribute_checking = true,
            "noAttributeChecking" => self.attribute_checking = false,
            "BoundMethods" => self.bound_methods = true,
            "noBoundMethods" => self.bound_methods = false,
            "Descriptors" => self.descriptors = true,
            "noDescriptors" => self.descriptors = false,
            "SourceTracking" => self.source_tracking = true,
            "noSourceTracking" => self.source_tracking = false,
            "LineTracking" => self.line_tracking = true,
            "noLineTracking" => self.line_tracking = false,
            "StoreSource" => self.store_source = true,
            "noStoreSource" => self.store_source = false,
            "InlineBool" => self.inline_bool = true,
            "noInlineBool" => self.inline_bool = false,
            "InlineLen" => self.inline_len = true,
            "noInlineLen" => self.inline_len = false,
            "InlineEq" => self.inline_eq = true,
            "noInlineEq" => self.inline_eq = false,
            "InlineCode" => {
                self.inline_bool = true;
                self.inline_len = true;
                self.inline_eq = true;
            }
            "noInlineCode" => {
                self.inline_bool = false;
                self.inline_len = false;
                self.inline_eq = false;
            }
            "OperatorFuncs" => self.operator_funcs = true,
            "noOperatorFuncs" => self.operator_funcs = false,
            _ => return false,
        }
        true
    }

    /// Applies one `setCompilerOptions` argument: a decorator switch name or
    /// one of the `Speed`/`Strict` bundles.
    ///
    /// The `Debug` bundle is reachable here too, through its decorator name,
    /// which only flips the call wrapper; drivers select the full debug bundle
    /// via [`CompileOptions::apply_preset`].
    pub(crate) fn set_compiler_option(&mut self, name: &str) -> bool {
        if self.apply_decorator(name) {
            return true;
        }
        match OptionPreset::from_str(name) {
            Ok(preset @ (OptionPreset::Speed | OptionPreset::Strict)) => {
                self.apply_preset(preset);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_preset_disables_checks() {
        let mut opts = CompileOptions::default();
        opts.apply_preset(OptionPreset::Speed);
        assert!(!opts.function_argument_checking);
        assert!(!opts.attribute_checking);
        assert!(!opts.operator_funcs);
        assert!(opts.inline_bool && opts.inline_eq && opts.inline_len);
        // Line tracking is untouched by the speed bundle.
        assert!(opts.line_tracking);
    }

    #[test]
    fn decorator_names_round_trip() {
        let mut opts = CompileOptions::default();
        assert!(opts.apply_decorator("noSourceTracking"));
        assert!(!opts.source_tracking);
        assert!(opts.apply_decorator("SourceTracking"));
        assert!(opts.source_tracking);
        assert!(!opts.apply_decorator("noSuchOption"));
    }

    #[test]
    fn marker_call_accepts_bundles_and_switch_names() {
        let mut opts = CompileOptions::default();
        assert!(opts.set_compiler_option("Speed"));
        assert!(!opts.print_statements);
        assert!(opts.set_compiler_option("PrintStatements"));
        assert!(opts.print_statements);
        assert!(!opts.set_compiler_option("Fast"));
    }

    #[test]
    fn presets_parse_from_strings() {
        assert_eq!(OptionPreset::from_str("Strict").unwrap(), OptionPreset::Strict);
        assert!(OptionPreset::from_str("strictest").is_err());
    }
}
