//! The emitted-text stream: indentation, capture buffers and the uniquifier.
//!
//! Function and method emission needs to know the full set of local names
//! before the body's first line can be written (the `var` declaration list),
//! so bodies are emitted into capture buffers that are spliced in afterwards.
//! Nested function definitions nest captures, hence a stack rather than a
//! single swap slot.

use ahash::AHashMap;

#[derive(Debug)]
pub(crate) struct OutputStack {
    buffers: Vec<String>,
    indent_level: usize,
    unique_ids: AHashMap<String, u32>,
}

impl OutputStack {
    pub fn new() -> Self {
        Self {
            buffers: vec![String::new()],
            indent_level: 0,
            unique_ids: AHashMap::new(),
        }
    }

    /// Appends `line` plus a newline to the active buffer.
    pub fn writeln(&mut self, line: &str) {
        let buffer = self.buffers.last_mut().expect("output stack is never empty");
        buffer.push_str(line);
        buffer.push('\n');
    }

    /// Appends raw text with no trailing newline.
    pub fn write(&mut self, text: &str) {
        self.buffers
            .last_mut()
            .expect("output stack is never empty")
            .push_str(text);
    }

    /// The whitespace prefix for the current indent level.
    pub fn spacing(&self) -> String {
        "\t".repeat(self.indent_level)
    }

    /// Returns the current spacing, then increases the indent level.
    pub fn indent(&mut self) -> String {
        let spacing = self.spacing();
        self.indent_level += 1;
        spacing
    }

    /// Decreases the indent level, then returns the new spacing.
    ///
    /// Dedenting below zero is a translator bug, not an input error.
    pub fn dedent(&mut self) -> String {
        assert!(self.indent_level > 0, "dedent below zero");
        self.indent_level -= 1;
        self.spacing()
    }

    pub fn indent_level(&self) -> usize {
        self.indent_level
    }

    /// Starts capturing into a fresh buffer.
    pub fn push_buffer(&mut self) {
        self.buffers.push(String::new());
    }

    /// Ends the innermost capture and returns its contents.
    pub fn pop_buffer(&mut self) -> String {
        assert!(self.buffers.len() > 1, "no capture buffer to pop");
        self.buffers.pop().expect("buffer stack checked above")
    }

    /// Discards the innermost capture and starts over; used when a body must
    /// be re-emitted under different switches.
    pub fn restart_buffer(&mut self) {
        assert!(self.buffers.len() > 1, "no capture buffer to restart");
        self.buffers.last_mut().expect("buffer stack checked above").clear();
    }

    /// Consumes the stack and returns the root buffer.
    pub fn into_output(mut self) -> String {
        assert!(self.buffers.len() == 1, "unbalanced capture buffers");
        self.buffers.pop().expect("buffer stack checked above")
    }

    /// Returns an identifier never issued before for this prefix within the
    /// current translation.
    pub fn uniqid(&mut self, prefix: &str) -> String {
        let counter = self.unique_ids.entry(prefix.to_owned()).or_insert(0);
        *counter += 1;
        format!("{prefix}{:06}", *counter)
    }
}
