use std::time::Duration;

/// Shape of the emitted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    /// `"arguments": ["gcc", "-c", "a.c"]`
    #[default]
    Arguments,
    /// `"command": "gcc -c a.c"`
    Command,
}

/// Options for one build log parse.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Source files matching any of these patterns (from the start of the
    /// path) are left out.
    pub exclude: Vec<String>,
    /// Programs treated as compiler wrappers in addition to the built-in ones.
    pub extra_wrappers: Vec<String>,
    /// Append the compiler's predefined macros as `-D` flags.
    pub add_predefined_macros: bool,
    /// Replace the compiler name with its full path.
    pub full_path: bool,
    pub output_style: OutputStyle,
    /// Limit on how long a command substitution or a compiler macro dump
    /// may run.
    pub substitution_timeout: Option<Duration>,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exclusion pattern.
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    /// Add a wrapper program name.
    pub fn wrapper(mut self, name: impl Into<String>) -> Self {
        self.extra_wrappers.push(name.into());
        self
    }

    pub fn predefined_macros(mut self, enabled: bool) -> Self {
        self.add_predefined_macros = enabled;
        self
    }

    pub fn full_path(mut self, enabled: bool) -> Self {
        self.full_path = enabled;
        self
    }

    pub fn output_style(mut self, style: OutputStyle) -> Self {
        self.output_style = style;
        self
    }

    pub fn substitution_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.substitution_timeout = timeout;
        self
    }
}
