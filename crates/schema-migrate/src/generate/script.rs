//! Script assembly.

use super::{comment_text, join_statements};

/// Render one titled section; empty sections render as an empty string.
pub fn render_section(title: &str, statements: &[String]) -> String {
    if statements.is_empty() {
        return String::new();
    }
    format!("-- {}\n{}", comment_text(title), join_statements(statements))
}

/// Builds a complete migration script out of titled sections.
///
/// Sections are emitted in the order they are added; empty ones are dropped.
#[derive(Debug, Default)]
pub struct ScriptBuilder {
    header: Vec<String>,
    sections: Vec<(String, Vec<String>)>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header comment line.
    pub fn header_line(mut self, line: impl Into<String>) -> Self {
        self.header.push(line.into());
        self
    }

    pub fn section(mut self, title: impl Into<String>, statements: Vec<String>) -> Self {
        if !statements.is_empty() {
            self.sections.push((title.into(), statements));
        }
        self
    }

    /// Number of non-empty sections added so far.
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn build(self) -> String {
        let mut blocks: Vec<String> = Vec::with_capacity(self.sections.len() + 1);
        if !self.header.is_empty() {
            blocks.push(
                self.header
                    .iter()
                    .map(|line| format!("-- {}", comment_text(line)))
                    .collect::<Vec<_>>()
                    .join("\n"),
            );
        }
        blocks.extend(
            self.sections
                .iter()
                .map(|(title, statements)| render_section(title, statements)),
        );

        let mut script = blocks.join("\n\n");
        script.push('\n');
        script
    }
}
