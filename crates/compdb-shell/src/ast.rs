//! Command-tree types produced by [`crate::parse`].

use crate::span::Span;

/// A shell word after quote removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// The word value: quotes removed, escapes applied. Substitutions are
    /// kept verbatim (`$(...)`) since they are resolved on the line text.
    pub text: String,
    /// Source span of the raw word, quotes included.
    pub span: Span,
    /// Whether any part of the word was quoted or escaped.
    pub quoted: bool,
    /// Outermost command substitutions inside the word.
    pub substitutions: Vec<CommandSubstitution>,
}

impl Word {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// True for an unquoted word spelled exactly `keyword`.
    pub fn is_keyword(&self, keyword: &str) -> bool {
        !self.quoted && self.text == keyword
    }

    /// `NAME=value` (or `NAME+=value`) with a valid identifier name.
    pub fn is_assignment(&self) -> bool {
        let Some(eq) = self.text.find('=') else {
            return false;
        };
        let name = self.text[..eq].strip_suffix('+').unwrap_or(&self.text[..eq]);
        let mut chars = name.chars();
        match chars.next() {
            Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
            _ => return false,
        }
        chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
    }
}

/// How a command substitution was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubstitutionStyle {
    /// `$(command)`
    Dollar,
    /// `` `command` ``
    Backtick,
}

/// A `$(...)` or backtick command substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSubstitution {
    /// Span of the whole substitution, delimiters included.
    pub span: Span,
    /// Span of the inner command text.
    pub command_span: Span,
    /// The inner command, parsed.
    pub body: Vec<Node>,
    pub style: SubstitutionStyle,
}

/// An I/O redirection such as `> out.log` or `2>&1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    /// Operator text including any file descriptor prefix, e.g. `2>`.
    pub op: String,
    pub target: Word,
    pub span: Span,
}

/// A simple command: assignments, words and redirections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Leading `NAME=value` words.
    pub assignments: Vec<Word>,
    /// The command name followed by its arguments.
    pub words: Vec<Word>,
    pub redirects: Vec<Redirect>,
    pub span: Span,
}

impl Command {
    /// Every word of the command whose substitutions would be expanded.
    pub fn all_words(&self) -> impl Iterator<Item = &Word> {
        self.assignments
            .iter()
            .chain(self.words.iter())
            .chain(self.redirects.iter().map(|r| &r.target))
    }
}

/// Control operators joining commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `;` or a newline
    Semi,
    /// `&`
    Background,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `|`
    Pipe,
    /// `|&`
    PipeAll,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Semi => ";",
            Operator::Background => "&",
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Pipe => "|",
            Operator::PipeAll => "|&",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub commands: Vec<Node>,
    pub negated: bool,
    pub span: Span,
}

/// `first && second || third ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndOr {
    pub first: Box<Node>,
    pub rest: Vec<(Operator, Node)>,
    pub span: Span,
}

/// `( list )`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subshell {
    pub body: Vec<Node>,
    pub redirects: Vec<Redirect>,
    pub span: Span,
}

/// `{ list; }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub body: Vec<Node>,
    pub redirects: Vec<Redirect>,
    pub span: Span,
}

/// A node of the command tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Command(Command),
    Pipeline(Pipeline),
    AndOr(AndOr),
    Subshell(Subshell),
    Group(Group),
}

impl Node {
    pub fn span(&self) -> Span {
        match self {
            Node::Command(c) => c.span,
            Node::Pipeline(p) => p.span,
            Node::AndOr(a) => a.span,
            Node::Subshell(s) => s.span,
            Node::Group(g) => g.span,
        }
    }

    /// Visit every simple command in document order.
    ///
    /// Substitution bodies are not entered: they belong to the words that
    /// contain them, not to the command list of this tree.
    pub fn for_each_command<F: FnMut(&Command)>(&self, f: &mut F) {
        match self {
            Node::Command(c) => f(c),
            Node::Pipeline(p) => {
                for node in &p.commands {
                    node.for_each_command(f);
                }
            }
            Node::AndOr(a) => {
                a.first.for_each_command(f);
                for (_, node) in &a.rest {
                    node.for_each_command(f);
                }
            }
            Node::Subshell(s) => {
                for node in &s.body {
                    node.for_each_command(f);
                }
            }
            Node::Group(g) => {
                for node in &g.body {
                    node.for_each_command(f);
                }
            }
        }
    }

    /// All simple commands of this tree, in document order.
    pub fn commands(&self) -> Vec<&Command> {
        let mut out = Vec::new();
        self.collect_commands(&mut out);
        out
    }

    fn collect_commands<'a>(&'a self, out: &mut Vec<&'a Command>) {
        match self {
            Node::Command(c) => out.push(c),
            Node::Pipeline(p) => p.commands.iter().for_each(|n| n.collect_commands(out)),
            Node::AndOr(a) => {
                a.first.collect_commands(out);
                a.rest.iter().for_each(|(_, n)| n.collect_commands(out));
            }
            Node::Subshell(s) => s.body.iter().for_each(|n| n.collect_commands(out)),
            Node::Group(g) => g.body.iter().for_each(|n| n.collect_commands(out)),
        }
    }

    fn collect_substitutions<'a>(&'a self, out: &mut Vec<&'a CommandSubstitution>) {
        let redirects = match self {
            Node::Subshell(s) => Some(&s.redirects),
            Node::Group(g) => Some(&g.redirects),
            _ => None,
        };
        match self {
            Node::Command(c) => {
                for word in c.all_words() {
                    out.extend(word.substitutions.iter());
                }
            }
            Node::Pipeline(p) => p.commands.iter().for_each(|n| n.collect_substitutions(out)),
            Node::AndOr(a) => {
                a.first.collect_substitutions(out);
                a.rest.iter().for_each(|(_, n)| n.collect_substitutions(out));
            }
            Node::Subshell(s) => s.body.iter().for_each(|n| n.collect_substitutions(out)),
            Node::Group(g) => g.body.iter().for_each(|n| n.collect_substitutions(out)),
        }
        if let Some(redirects) = redirects {
            for r in redirects {
                out.extend(r.target.substitutions.iter());
            }
        }
    }
}

/// Outermost command substitutions of a parsed line, in document order.
pub fn collect_substitutions(nodes: &[Node]) -> Vec<&CommandSubstitution> {
    let mut out = Vec::new();
    for node in nodes {
        node.collect_substitutions(&mut out);
    }
    out.sort_by_key(|s| s.span.start);
    out
}
