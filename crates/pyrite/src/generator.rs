//! The generator transform: functions containing `yield` are re-emitted as
//! resumable state machines.
//!
//! Resume points are addressed by a list of state counters, one per nesting
//! level of control flow; every construct that can contain a yield pushes a
//! fresh counter. The emitted body is a cascade of `if ($generator_state[d]
//! == k)` blocks that skip already-executed code on re-entry, wrapped in a
//! generator object exposing the iteration protocol.

use crate::ast::ExprLoc;
use crate::classes::Klass;
use crate::error::TranslateError;
use crate::translator::Translator;

impl Translator<'_> {
    /// Emits a `yield`: park the value, record the resume state, return.
    pub(crate) fn emit_yield(
        &mut self,
        value: Option<&ExprLoc>,
        lineno: u32,
        klass: Option<&Klass>,
    ) -> Result<(), TranslateError> {
        self.has_yield = true;
        let expr = match value {
            Some(value) => self.expr(value, klass)?,
            None => "null".to_owned(),
        };
        self.track_lineno(lineno, false);
        let sp = self.out.spacing();
        self.out.writeln(&format!("{sp}$yield_value = {expr};"));
        if self.opts.source_tracking {
            self.out.writeln(&format!("{sp}{}", Self::TRACK_POP));
        }
        self.out.writeln(&format!("{sp}$yielding = true;"));
        let n = self.generator_states.len().max(1);
        let next = self.generator_states.last().copied().unwrap_or(0) + 1;
        self.out.writeln(&format!("{sp}$generator_state[{}] = {next};", n - 1));
        self.out.writeln(&format!("{sp}return $yield_value;"));
        self.generator_switch_case(true);
        self.generator_throw();
        Ok(())
    }

    // ------------------------------------------------------------------
    // State bookkeeping
    // ------------------------------------------------------------------

    pub(crate) fn generator_switch_open(&mut self) {
        if self.is_generator {
            self.out.indent();
        }
    }

    /// Closes the running state block and opens the next one. With
    /// `increment` the current counter advances first; a counter at zero
    /// instead opens the entry block for this nesting level.
    pub(crate) fn generator_switch_case(&mut self, increment: bool) {
        if !self.is_generator {
            return;
        }
        if increment {
            *self
                .generator_states
                .last_mut()
                .expect("generator state stack is never empty") += 1;
        }
        let n = self.generator_states.len();
        let state = *self
            .generator_states
            .last()
            .expect("generator state stack is never empty");
        if state == 0 {
            let _ = self.out.dedent();
            let ind = self.out.indent();
            self.out.writeln(&format!(
                "{ind}if (typeof $generator_state[{i}] == 'undefined' || $generator_state[{i}] == 0) {{",
                i = n - 1
            ));
            self.generator_clear_state();
            if n == 1 {
                self.generator_throw();
            }
        } else {
            if increment {
                let sp = self.out.spacing();
                self.out.writeln(&format!("{sp}$generator_state[{}]={state};", n - 1));
            }
            let ded = self.out.dedent();
            self.out.writeln(&format!("{ded}}}"));
            let ind = self.out.indent();
            self.out
                .writeln(&format!("{ind}if ($generator_state[{}] == {state}) {{", n - 1));
        }
    }

    pub(crate) fn generator_switch_close(&mut self) {
        if self.is_generator {
            let ded = self.out.dedent();
            self.out.writeln(&format!("{ded}}}"));
        }
    }

    pub(crate) fn generator_add_state(&mut self) {
        if self.is_generator {
            self.generator_states.push(0);
            self.state_max_depth = self.generator_states.len();
        }
    }

    pub(crate) fn generator_del_state(&mut self) {
        if self.is_generator {
            self.generator_states.pop();
        }
    }

    /// Zeroes the state counters at and below the current nesting level so a
    /// fresh entry into this block starts from its beginning.
    pub(crate) fn generator_clear_state(&mut self) {
        if self.is_generator {
            let n = self.generator_states.len();
            let sp = self.out.spacing();
            self.out.writeln(&format!(
                "{sp}for (var $i = {} ; $i < ($generator_state.length<{cap}?{cap}:$generator_state.length); $i++) $generator_state[$i]=0;",
                n - 1,
                cap = n + 1
            ));
        }
    }

    /// Re-entry check that delivers an exception injected via `throw()` at
    /// the suspension point.
    pub(crate) fn generator_throw(&mut self) {
        let ind = self.out.indent();
        self.out
            .writeln(&format!("{ind}if (typeof $exc != 'undefined' && $exc != null) {{"));
        let sp = self.out.spacing();
        self.out.writeln(&format!("{sp}$yielding = null;"));
        self.out.writeln(&format!(
            "{sp}$generator_state[{}] = -1;",
            self.generator_states.len().max(1) - 1
        ));
        self.out.writeln(&format!("{sp}throw $exc;"));
        let ded = self.out.dedent();
        self.out.writeln(&format!("{ded}}}"));
    }

    // ------------------------------------------------------------------
    // Generator object
    // ------------------------------------------------------------------

    /// Wraps a captured state-machine body in the generator object with the
    /// `next`/`send`/`throw`/`close`/`__iter__` protocol.
    pub(crate) fn emit_generator_body(&mut self, code: &str) {
        let s = self.out.spacing();
        self.out.writeln(&format!(
            "{s}var $generator_state = [0], $generator_exc = [null], $yield_value = null, $exc = null, $is_executing=false;"
        ));
        self.out.writeln(&format!("{s}var $generator = function () {{}};"));
        self.out.writeln(&format!("{s}$generator['next'] = function () {{"));
        self.out.writeln(&format!("{s}\t$yield_value = $exc = null;"));
        self.out.writeln(&format!("{s}\ttry {{"));
        self.out.writeln(&format!("{s}\t\tvar $res = $generator['__next']();"));
        self.out.writeln(&format!(
            "{s}\t\tif (typeof $res == 'undefined') throw pyjslib.StopIteration;"
        ));
        self.out.writeln(&format!("{s}\t}} catch (e) {{"));
        self.out.writeln(&format!("{s}\t\t$is_executing=false;"));
        self.out.writeln(&format!("{s}\t\t$generator_state[0] = -1;"));
        self.out.writeln(&format!("{s}\t\tthrow e;"));
        self.out.writeln(&format!("{s}\t}}"));
        self.out.writeln(&format!("{s}\t$is_executing=false;"));
        self.out.writeln(&format!("{s}\treturn $res;"));
        self.out.writeln(&format!("{s}}};"));
        self.out
            .writeln(&format!("{s}$generator['__iter__'] = function () {{return $generator;}};"));
        self.out.writeln(&format!("{s}$generator['send'] = function ($val) {{"));
        self.out.writeln(&format!("{s}\t$yield_value = $val;"));
        self.out.writeln(&format!("{s}\t$exc = null;"));
        self.out.writeln(&format!("{s}\ttry {{"));
        self.out.writeln(&format!("{s}\t\tvar $res = $generator['__next']();"));
        self.out.writeln(&format!(
            "{s}\t\tif (typeof $res == 'undefined') throw pyjslib.StopIteration;"
        ));
        self.out.writeln(&format!("{s}\t}} catch (e) {{"));
        self.out.writeln(&format!("{s}\t\t$generator_state[0] = -1;"));
        self.out.writeln(&format!("{s}\t\t$is_executing=false;"));
        self.out.writeln(&format!("{s}\t\tthrow e;"));
        self.out.writeln(&format!("{s}\t}}"));
        self.out.writeln(&format!("{s}\t$is_executing=false;"));
        self.out.writeln(&format!("{s}\treturn $res;"));
        self.out.writeln(&format!("{s}}};"));
        self.out
            .writeln(&format!("{s}$generator['throw'] = function ($exc_type, $exc_value) {{"));
        self.out.writeln(&format!("{s}\t$yield_value = null;"));
        self.out.writeln(&format!(
            "{s}\t$exc=(typeof $exc_value == 'undefined'?$exc_type():$exc_type($exc_value));"
        ));
        self.out.writeln(&format!("{s}\ttry {{"));
        self.out.writeln(&format!("{s}\t\tvar $res = $generator['__next']();"));
        self.out.writeln(&format!("{s}\t}} catch (e) {{"));
        self.out.writeln(&format!("{s}\t\t$generator_state[0] = -1;"));
        self.out.writeln(&format!("{s}\t\t$is_executing=false;"));
        self.out.writeln(&format!("{s}\t\tthrow (e);"));
        self.out.writeln(&format!("{s}\t}}"));
        self.out.writeln(&format!("{s}\t$is_executing=false;"));
        self.out.writeln(&format!("{s}\treturn $res;"));
        self.out.writeln(&format!("{s}}};"));
        self.out.writeln(&format!("{s}$generator['close'] = function () {{"));
        self.out.writeln(&format!("{s}\t$yield_value = null;"));
        self.out.writeln(&format!("{s}\t$exc=pyjslib['GeneratorExit'];"));
        self.out.writeln(&format!("{s}\ttry {{"));
        self.out.writeln(&format!("{s}\t\tvar $res = $generator['__next']();"));
        self.out.writeln(&format!("{s}\t\t$is_executing=false;"));
        self.out.writeln(&format!(
            "{s}\t\tif (typeof $res != 'undefined') throw pyjslib.RuntimeError('generator ignored GeneratorExit');"
        ));
        self.out.writeln(&format!("{s}\t}} catch (e) {{"));
        self.out.writeln(&format!("{s}\t\t$generator_state[0] = -1;"));
        self.out.writeln(&format!("{s}\t\t$is_executing=false;"));
        self.out.writeln(&format!(
            "{s}\t\tif (e.__name__ == 'StopIteration' || e.__name__ == 'GeneratorExit') return null;"
        ));
        self.out.writeln(&format!("{s}\t\tthrow (e);"));
        self.out.writeln(&format!("{s}\t}}"));
        self.out.writeln(&format!("{s}\treturn $res;"));
        self.out.writeln(&format!("{s}}};"));
        self.out.writeln(&format!("{s}$generator['__next'] = function () {{"));
        self.out.writeln(&format!("{s}\tvar $yielding = false;"));
        self.out.writeln(&format!(
            "{s}\tif ($is_executing) throw pyjslib.ValueError('generator already executing');"
        ));
        self.out.writeln(&format!("{s}\t$is_executing = true;"));
        self.out.indent();
        self.out.write(code);
        let sp = self.out.spacing();
        self.out.writeln(&format!("{sp}throw pyjslib.StopIteration;"));
        let ded = self.out.dedent();
        self.out.writeln(&format!("{ded}}}"));
        let sp = self.out.spacing();
        self.out.writeln(&format!("{sp}return $generator;"));
    }
}
