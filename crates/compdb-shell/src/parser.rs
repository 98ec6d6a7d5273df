//! Recursive-descent parser turning tokens into command trees.

use crate::ast::{AndOr, Command, Group, Node, Operator, Pipeline, Redirect, Subshell};
use crate::error::{Result, ShellError};
use crate::lexer::{Lexer, Token};
use crate::span::Span;
use std::iter::Peekable;
use std::vec::IntoIter;

/// Reserved words that may precede a command and carry no words of their own.
const LEADING_KEYWORDS: &[&str] = &["if", "then", "else", "elif", "do", "while", "until"];

/// Reserved words that close a compound command.
const CLOSING_KEYWORDS: &[&str] = &["fi", "done", "esac"];

/// Parse one logical shell line into command trees.
///
/// Each item separated by `;`, `&` or a newline at the top level becomes its
/// own tree. An empty or comment-only line yields no trees.
pub fn parse(line: &str) -> Result<Vec<Node>> {
    parse_at(line, 0)
}

/// Parse `source`, reporting spans relative to a line in which `source`
/// starts at byte `offset`.
pub(crate) fn parse_at(source: &str, offset: usize) -> Result<Vec<Node>> {
    let tokens = Lexer::new(source, offset).tokenize()?;
    let mut parser = Parser {
        tokens: tokens.into_iter().peekable(),
        last: Span::new(offset, offset),
    };
    parser.list(Closing::Eof, Span::new(offset, offset))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closing {
    Eof,
    Paren,
    Brace,
}

fn unexpected(token: &Token) -> ShellError {
    ShellError::UnexpectedToken {
        token: token.describe(),
        span: token.span().into(),
    }
}

fn plain_word<'t>(token: Option<&'t Token>) -> Option<&'t str> {
    match token {
        Some(Token::Word(w)) if !w.quoted => Some(w.text.as_str()),
        _ => None,
    }
}

struct Parser {
    tokens: Peekable<IntoIter<Token>>,
    /// Span of the most recently consumed token.
    last: Span,
}

impl Parser {
    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.next()?;
        self.last = token.span();
        Some(token)
    }

    fn at_close(&mut self, closing: Closing) -> bool {
        match (closing, self.tokens.peek()) {
            (Closing::Eof, None) => true,
            (Closing::Paren, Some(Token::RParen(_))) => true,
            (Closing::Brace, token) => plain_word(token) == Some("}"),
            _ => false,
        }
    }

    fn list(&mut self, closing: Closing, open: Span) -> Result<Vec<Node>> {
        let mut nodes = Vec::new();

        loop {
            if self.at_close(closing) {
                break;
            }
            if self.tokens.peek().is_none() {
                return Err(ShellError::Unbalanced {
                    open: if closing == Closing::Brace { '{' } else { '(' },
                    span: open.into(),
                });
            }

            match plain_word(self.tokens.peek()) {
                Some(word) if CLOSING_KEYWORDS.contains(&word) => {
                    self.next();
                    self.separator(closing)?;
                    continue;
                }
                Some("for") | Some("select") => {
                    self.skip_loop_header();
                    continue;
                }
                Some("case") => {
                    self.skip_case();
                    self.separator(closing)?;
                    continue;
                }
                _ => {}
            }

            nodes.push(self.and_or()?);
            self.separator(closing)?;
        }

        Ok(nodes)
    }

    /// Consume a `;` or `&` after a command, if one is there.
    fn separator(&mut self, closing: Closing) -> Result<()> {
        if self.at_close(closing) {
            return Ok(());
        }
        match self.tokens.peek() {
            None => Ok(()),
            Some(Token::Op(Operator::Semi | Operator::Background, _)) => {
                self.next();
                Ok(())
            }
            Some(token) => Err(unexpected(token)),
        }
    }

    /// `for NAME in WORDS;` carries no command; the body follows `do`.
    fn skip_loop_header(&mut self) {
        while let Some(token) = self.next() {
            if matches!(token, Token::Op(Operator::Semi, _)) {
                break;
            }
        }
    }

    /// `case` arms use `)` in ways the command grammar here does not model,
    /// so the whole construct is passed over.
    fn skip_case(&mut self) {
        while let Some(token) = self.next() {
            if matches!(&token, Token::Word(w) if w.is_keyword("esac")) {
                break;
            }
        }
    }

    fn and_or(&mut self) -> Result<Node> {
        let first = self.pipeline()?;
        let mut rest = Vec::new();

        loop {
            let op = match self.tokens.peek() {
                Some(Token::Op(op @ (Operator::And | Operator::Or), _)) => *op,
                _ => break,
            };
            self.next();
            rest.push((op, self.pipeline()?));
        }

        if rest.is_empty() {
            return Ok(first);
        }
        let span = rest
            .iter()
            .fold(first.span(), |acc, (_, node)| acc.merge(node.span()));
        Ok(Node::AndOr(AndOr {
            first: Box::new(first),
            rest,
            span,
        }))
    }

    fn pipeline(&mut self) -> Result<Node> {
        let mut negated = false;
        let mut span = None;
        if plain_word(self.tokens.peek()) == Some("!") {
            self.next();
            negated = true;
            span = Some(self.last);
        }

        let mut commands = vec![self.command()?];
        loop {
            match self.tokens.peek() {
                Some(Token::Op(Operator::Pipe | Operator::PipeAll, _)) => {
                    self.next();
                    commands.push(self.command()?);
                }
                _ => break,
            }
        }

        if !negated && commands.len() == 1 {
            if let Some(node) = commands.pop() {
                return Ok(node);
            }
        }
        let span = commands.iter().fold(span, |acc: Option<Span>, node| {
            Some(acc.map_or(node.span(), |s| s.merge(node.span())))
        });
        Ok(Node::Pipeline(Pipeline {
            commands,
            negated,
            span: span.unwrap_or(self.last),
        }))
    }

    fn command(&mut self) -> Result<Node> {
        while matches!(plain_word(self.tokens.peek()), Some(w) if LEADING_KEYWORDS.contains(&w)) {
            self.next();
        }

        if let Some(Token::LParen(open)) = self.tokens.peek() {
            let open = *open;
            self.next();
            return self.subshell(open);
        }
        if plain_word(self.tokens.peek()) == Some("{") {
            self.next();
            let open = self.last;
            return self.group(open);
        }
        self.simple()
    }

    fn subshell(&mut self, open: Span) -> Result<Node> {
        let body = self.list(Closing::Paren, open)?;
        let close = match self.next() {
            Some(Token::RParen(span)) => span,
            _ => {
                return Err(ShellError::Unbalanced {
                    open: '(',
                    span: open.into(),
                })
            }
        };
        if body.is_empty() {
            return Err(ShellError::UnexpectedToken {
                token: ")".to_string(),
                span: close.into(),
            });
        }
        let redirects = self.redirects()?;
        let span = redirects
            .iter()
            .fold(open.merge(close), |acc, r| acc.merge(r.span));
        Ok(Node::Subshell(Subshell {
            body,
            redirects,
            span,
        }))
    }

    fn group(&mut self, open: Span) -> Result<Node> {
        let body = self.list(Closing::Brace, open)?;
        let close = match self.next() {
            Some(Token::Word(w)) if w.is_keyword("}") => w.span,
            _ => {
                return Err(ShellError::Unbalanced {
                    open: '{',
                    span: open.into(),
                })
            }
        };
        if body.is_empty() {
            return Err(ShellError::UnexpectedToken {
                token: "}".to_string(),
                span: close.into(),
            });
        }
        let redirects = self.redirects()?;
        let span = redirects
            .iter()
            .fold(open.merge(close), |acc, r| acc.merge(r.span));
        Ok(Node::Group(Group {
            body,
            redirects,
            span,
        }))
    }

    fn redirects(&mut self) -> Result<Vec<Redirect>> {
        let mut redirects = Vec::new();
        while matches!(self.tokens.peek(), Some(Token::Redirect(..))) {
            redirects.push(self.redirect()?);
        }
        Ok(redirects)
    }

    fn redirect(&mut self) -> Result<Redirect> {
        let (op, span) = match self.next() {
            Some(Token::Redirect(op, span)) => (op, span),
            Some(token) => return Err(unexpected(&token)),
            None => return Err(ShellError::UnexpectedEnd { span: self.last.into() }),
        };
        match self.next() {
            Some(Token::Word(target)) => Ok(Redirect {
                op,
                span: span.merge(target.span),
                target,
            }),
            Some(token) => Err(unexpected(&token)),
            None => Err(ShellError::UnexpectedEnd { span: span.into() }),
        }
    }

    fn simple(&mut self) -> Result<Node> {
        let mut assignments = Vec::new();
        let mut words = Vec::new();
        let mut redirects = Vec::new();
        let mut span: Option<Span> = None;

        loop {
            match self.tokens.peek() {
                Some(Token::Word(_)) => {
                    let Some(Token::Word(word)) = self.next() else {
                        break;
                    };
                    span = Some(span.map_or(word.span, |s| s.merge(word.span)));
                    if words.is_empty() && word.is_assignment() {
                        assignments.push(word);
                    } else {
                        words.push(word);
                    }
                }
                Some(Token::Redirect(..)) => {
                    let redirect = self.redirect()?;
                    span = Some(span.map_or(redirect.span, |s| s.merge(redirect.span)));
                    redirects.push(redirect);
                }
                _ => break,
            }
        }

        let Some(span) = span else {
            return Err(match self.tokens.peek() {
                Some(token) => unexpected(token),
                None => ShellError::UnexpectedEnd { span: self.last.into() },
            });
        };

        Ok(Node::Command(Command {
            assignments,
            words,
            redirects,
            span,
        }))
    }
}
