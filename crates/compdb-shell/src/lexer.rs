//! Tokenizer for a single logical shell line.
//!
//! Words come out already unquoted. Command substitutions are recognised
//! while reading a word and parsed recursively, so every
//! [`CommandSubstitution`] carries its inner command tree and absolute spans.

use crate::ast::{CommandSubstitution, Operator, SubstitutionStyle, Word};
use crate::error::{Result, ShellError};
use crate::parser;
use crate::span::Span;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Word(Word),
    Op(Operator, Span),
    /// Redirection operator text, file descriptor prefix included.
    Redirect(String, Span),
    LParen(Span),
    RParen(Span),
}

impl Token {
    pub(crate) fn span(&self) -> Span {
        match self {
            Token::Word(w) => w.span,
            Token::Op(_, span)
            | Token::Redirect(_, span)
            | Token::LParen(span)
            | Token::RParen(span) => *span,
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Token::Word(w) => w.text.clone(),
            Token::Op(op, _) => op.as_str().to_string(),
            Token::Redirect(op, _) => op.clone(),
            Token::LParen(_) => "(".to_string(),
            Token::RParen(_) => ")".to_string(),
        }
    }
}

fn is_metachar(c: char) -> bool {
    matches!(
        c,
        ' ' | '\t' | '\r' | '\n' | ';' | '&' | '|' | '(' | ')' | '<' | '>'
    )
}

pub(crate) struct Lexer<'a> {
    input: &'a str,
    /// Absolute offset of `input` within the outermost line.
    offset: usize,
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str, offset: usize) -> Self {
        Self {
            input,
            offset,
            pos: 0,
        }
    }

    pub(crate) fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek() {
            let start = self.pos;
            match c {
                ' ' | '\t' | '\r' => {
                    self.bump();
                }
                '\n' => {
                    self.bump();
                    tokens.push(Token::Op(Operator::Semi, self.span(start)));
                }
                '#' => {
                    while matches!(self.peek(), Some(c) if c != '\n') {
                        self.bump();
                    }
                }
                ';' => {
                    self.bump();
                    tokens.push(Token::Op(Operator::Semi, self.span(start)));
                }
                '&' => {
                    self.bump();
                    match self.peek() {
                        Some('&') => {
                            self.bump();
                            tokens.push(Token::Op(Operator::And, self.span(start)));
                        }
                        Some('>') => {
                            self.bump();
                            if self.peek() == Some('>') {
                                self.bump();
                            }
                            tokens.push(self.redirect_token(start));
                        }
                        _ => tokens.push(Token::Op(Operator::Background, self.span(start))),
                    }
                }
                '|' => {
                    self.bump();
                    let op = match self.peek() {
                        Some('|') => {
                            self.bump();
                            Operator::Or
                        }
                        Some('&') => {
                            self.bump();
                            Operator::PipeAll
                        }
                        _ => Operator::Pipe,
                    };
                    tokens.push(Token::Op(op, self.span(start)));
                }
                '(' => {
                    self.bump();
                    tokens.push(Token::LParen(self.span(start)));
                }
                ')' => {
                    self.bump();
                    tokens.push(Token::RParen(self.span(start)));
                }
                '<' | '>' => {
                    self.redirect_op();
                    tokens.push(self.redirect_token(start));
                }
                c if c.is_ascii_digit() => match self.io_number_len() {
                    Some(digits) => {
                        self.pos += digits;
                        self.redirect_op();
                        tokens.push(self.redirect_token(start));
                    }
                    None => tokens.push(Token::Word(self.word()?)),
                },
                _ => tokens.push(Token::Word(self.word()?)),
            }
        }

        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn span(&self, start: usize) -> Span {
        Span::new(self.offset + start, self.offset + self.pos)
    }

    fn redirect_token(&self, start: usize) -> Token {
        Token::Redirect(self.input[start..self.pos].to_string(), self.span(start))
    }

    /// Length of a run of digits directly followed by `<` or `>`.
    fn io_number_len(&self) -> Option<usize> {
        let rest = &self.input[self.pos..];
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        match rest.as_bytes().get(digits) {
            Some(b'<') | Some(b'>') if digits > 0 => Some(digits),
            _ => None,
        }
    }

    /// Consume a redirection operator starting at `<` or `>`.
    fn redirect_op(&mut self) {
        match self.bump() {
            Some('<') => match self.peek() {
                Some('<') => {
                    self.bump();
                    if matches!(self.peek(), Some('<') | Some('-')) {
                        self.bump();
                    }
                }
                Some('&') | Some('>') => {
                    self.bump();
                }
                _ => {}
            },
            Some('>') => {
                if matches!(self.peek(), Some('>') | Some('&') | Some('|')) {
                    self.bump();
                }
            }
            _ => {}
        }
    }

    fn word(&mut self) -> Result<Word> {
        let start = self.pos;
        let mut text = String::new();
        let mut quoted = false;
        let mut substitutions = Vec::new();

        while let Some(c) = self.peek() {
            if is_metachar(c) {
                break;
            }
            match c {
                '\\' => {
                    self.bump();
                    quoted = true;
                    match self.bump() {
                        Some('\n') => {}
                        Some(escaped) => text.push(escaped),
                        None => text.push('\\'),
                    }
                }
                '\'' => {
                    quoted = true;
                    self.single_quoted(&mut text)?;
                }
                '"' => {
                    quoted = true;
                    self.double_quoted(&mut text, &mut substitutions)?;
                }
                '`' => {
                    let sub_start = self.pos;
                    substitutions.push(self.backtick()?);
                    text.push_str(&self.input[sub_start..self.pos]);
                }
                '$' => match self.peek_nth(1) {
                    Some('\'') => {
                        quoted = true;
                        self.bump();
                        self.ansi_c_quoted(&mut text)?;
                    }
                    Some('"') => {
                        quoted = true;
                        self.bump();
                        self.double_quoted(&mut text, &mut substitutions)?;
                    }
                    _ => self.dollar(&mut text, &mut substitutions)?,
                },
                _ => {
                    self.bump();
                    text.push(c);
                }
            }
        }

        Ok(Word {
            text,
            span: self.span(start),
            quoted,
            substitutions,
        })
    }

    fn single_quoted(&mut self, text: &mut String) -> Result<()> {
        let start = self.pos;
        self.bump();
        loop {
            match self.bump() {
                Some('\'') => return Ok(()),
                Some(c) => text.push(c),
                None => {
                    return Err(ShellError::UnterminatedQuote {
                        quote: '\'',
                        span: Span::new(self.offset + start, self.offset + start + 1).into(),
                    })
                }
            }
        }
    }

    fn double_quoted(
        &mut self,
        text: &mut String,
        substitutions: &mut Vec<CommandSubstitution>,
    ) -> Result<()> {
        let start = self.pos;
        self.bump();
        loop {
            match self.peek() {
                None => {
                    return Err(ShellError::UnterminatedQuote {
                        quote: '"',
                        span: Span::new(self.offset + start, self.offset + start + 1).into(),
                    })
                }
                Some('"') => {
                    self.bump();
                    return Ok(());
                }
                Some('\\') => {
                    self.bump();
                    match self.peek() {
                        Some(c @ ('$' | '`' | '"' | '\\')) => {
                            self.bump();
                            text.push(c);
                        }
                        Some('\n') => {
                            self.bump();
                        }
                        _ => text.push('\\'),
                    }
                }
                Some('`') => {
                    let sub_start = self.pos;
                    substitutions.push(self.backtick()?);
                    text.push_str(&self.input[sub_start..self.pos]);
                }
                Some('$') => self.dollar(text, substitutions)?,
                Some(c) => {
                    self.bump();
                    text.push(c);
                }
            }
        }
    }

    /// `$'...'` with C-style escapes. The `$` has already been consumed.
    fn ansi_c_quoted(&mut self, text: &mut String) -> Result<()> {
        let start = self.pos;
        self.bump();
        let unterminated = |lexer: &Self| ShellError::UnterminatedQuote {
            quote: '\'',
            span: Span::new(lexer.offset + start, lexer.offset + start + 1).into(),
        };
        loop {
            match self.bump() {
                Some('\'') => return Ok(()),
                Some('\\') => {
                    let escaped = match self.bump() {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('a') => '\x07',
                        Some('b') => '\x08',
                        Some('e') | Some('E') => '\x1b',
                        Some('f') => '\x0c',
                        Some('v') => '\x0b',
                        Some(c @ ('\\' | '\'' | '"')) => c,
                        Some(other) => {
                            text.push('\\');
                            other
                        }
                        None => return Err(unterminated(self)),
                    };
                    text.push(escaped);
                }
                Some(c) => text.push(c),
                None => return Err(unterminated(self)),
            }
        }
    }

    /// `$(...)`, `$((...))`, `${...}` or a plain `$`.
    fn dollar(
        &mut self,
        text: &mut String,
        substitutions: &mut Vec<CommandSubstitution>,
    ) -> Result<()> {
        let start = self.pos;
        match (self.peek_nth(1), self.peek_nth(2)) {
            (Some('('), Some('(')) => {
                // Arithmetic expansion: kept literally.
                self.bump();
                self.skip_balanced('(', ')', start)?;
                text.push_str(&self.input[start..self.pos]);
            }
            (Some('('), _) => {
                substitutions.push(self.dollar_substitution(start)?);
                text.push_str(&self.input[start..self.pos]);
            }
            (Some('{'), _) => {
                self.bump();
                self.skip_balanced('{', '}', start)?;
                text.push_str(&self.input[start..self.pos]);
            }
            _ => {
                self.bump();
                text.push('$');
            }
        }
        Ok(())
    }

    fn dollar_substitution(&mut self, start: usize) -> Result<CommandSubstitution> {
        self.bump();
        let content_start = self.pos + 1;
        self.skip_balanced('(', ')', start)?;
        let content_end = self.pos - 1;
        self.substitution(start, content_start, content_end, SubstitutionStyle::Dollar)
    }

    fn backtick(&mut self) -> Result<CommandSubstitution> {
        let start = self.pos;
        self.bump();
        let content_start = self.pos;
        loop {
            match self.bump() {
                Some('\\') => {
                    self.bump();
                }
                Some('`') => break,
                Some(_) => {}
                None => {
                    return Err(ShellError::UnterminatedSubstitution {
                        span: self.span(start).into(),
                    })
                }
            }
        }
        let content_end = self.pos - 1;
        self.substitution(start, content_start, content_end, SubstitutionStyle::Backtick)
    }

    fn substitution(
        &self,
        start: usize,
        content_start: usize,
        content_end: usize,
        style: SubstitutionStyle,
    ) -> Result<CommandSubstitution> {
        let body = parser::parse_at(
            &self.input[content_start..content_end],
            self.offset + content_start,
        )?;
        Ok(CommandSubstitution {
            span: self.span(start),
            command_span: Span::new(self.offset + content_start, self.offset + content_end),
            body,
            style,
        })
    }

    /// Consume from an `open` delimiter through its matching `close`,
    /// honouring quotes and escapes on the way.
    fn skip_balanced(&mut self, open: char, close: char, start: usize) -> Result<()> {
        let mut depth = 0usize;
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    self.bump();
                }
                '\'' => self.skip_past('\'', start)?,
                '"' => self.skip_past('"', start)?,
                '`' => self.skip_past('`', start)?,
                c if c == open => depth += 1,
                c if c == close => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(());
                    }
                }
                _ => {}
            }
        }
        Err(ShellError::UnterminatedSubstitution {
            span: self.span(start).into(),
        })
    }

    /// Consume up to and including the next unescaped `delim`.
    fn skip_past(&mut self, delim: char, start: usize) -> Result<()> {
        while let Some(c) = self.bump() {
            if c == '\\' && delim != '\'' {
                self.bump();
            } else if c == delim {
                return Ok(());
            }
        }
        Err(ShellError::UnterminatedSubstitution {
            span: self.span(start).into(),
        })
    }
}
