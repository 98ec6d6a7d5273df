//! Recognition of compiler invocations in parsed command trees.

use crate::patterns::{is_compiler, is_source_file};
use crate::wrappers::WrapperSet;
use compdb_shell::{Command, Node, Span};

/// A simple command recognised as a compiler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateCommand {
    /// Every word of the command, in order, wrappers included.
    pub tokens: Vec<String>,
    /// Words preceding the compiler.
    pub wrappers: Vec<String>,
    /// The word recognised as the compiler executable.
    pub compiler: String,
    /// The first source-file-looking word after the compiler.
    pub file: Option<String>,
    /// Source text of the command.
    pub text: String,
    pub span: Span,
}

impl CandidateCommand {
    /// The compiler followed by its arguments, leading wrappers removed.
    pub fn arguments(&self) -> &[String] {
        &self.tokens[self.wrappers.len()..]
    }

    /// Leading wrappers that are not in `known`.
    pub fn unknown_wrappers<'a>(&'a self, known: &WrapperSet) -> Vec<&'a str> {
        self.wrappers
            .iter()
            .map(String::as_str)
            .filter(|w| !known.contains(w))
            .collect()
    }
}

/// Find every compiler invocation in `nodes`, in document order.
///
/// `source` is the line the nodes were parsed from; it supplies the
/// candidate's `text`. Commands without a compiler word yield nothing.
pub fn extract(nodes: &[Node], source: &str, wrappers: &WrapperSet) -> Vec<CandidateCommand> {
    let mut candidates = Vec::new();
    for node in nodes {
        node.for_each_command(&mut |command: &Command| {
            if let Some(candidate) = classify(command, source, wrappers) {
                candidates.push(candidate);
            }
        });
    }
    candidates
}

/// Single left-to-right pass over the words of one command.
fn classify(command: &Command, source: &str, known: &WrapperSet) -> Option<CandidateCommand> {
    let mut compiler: Option<String> = None;
    let mut leading = Vec::new();
    let mut file = None;
    let mut tokens = Vec::with_capacity(command.words.len());

    for word in &command.words {
        let text = word.as_str();
        if compiler.is_none() {
            if is_compiler(text) && !known.contains(text) {
                compiler = Some(text.to_string());
            } else {
                leading.push(text.to_string());
            }
        } else if file.is_none() && is_source_file(text) {
            file = Some(text.to_string());
        }
        tokens.push(text.to_string());
    }

    Some(CandidateCommand {
        compiler: compiler?,
        tokens,
        wrappers: leading,
        file,
        text: command.span.slice(source).to_string(),
        span: command.span,
    })
}
