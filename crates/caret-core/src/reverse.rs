//! Regex reversal for backward matching.
//!
//! Backward searches run a forward regex engine over the reversed text. Patterns are always
//! written in reading order, so before compiling a backward pattern it is rewritten to match
//! the mirror image of what the forward pattern matches:
//!
//! - concatenations are reversed, alternation branch order is kept;
//! - quantifiers stay attached to the (reversed) atom they follow;
//! - character classes, escapes and `.` are copied verbatim;
//! - `^` and `$`, `\A` and `\z`, lookahead and lookbehind trade places;
//! - an isolated inline option such as `(?i)` becomes `(?i:...)` over the rest of its group.
//!
//! Constructs that depend on left-to-right evaluation order (backreferences, subexpression
//! calls, `\G`, `\K`, conditionals, absent operators) are rejected.

use crate::error::CaretError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Anchor {
    LineStart,
    LineEnd,
    TextStart,
    TextEnd,
    TextEndNewline,
    WordBoundary,
    NotWordBoundary,
}

impl Anchor {
    fn mirrored(&self) -> Anchor {
        match self {
            Anchor::LineStart => Anchor::LineEnd,
            Anchor::LineEnd => Anchor::LineStart,
            Anchor::TextStart => Anchor::TextEnd,
            Anchor::TextEnd | Anchor::TextEndNewline => Anchor::TextStart,
            Anchor::WordBoundary => Anchor::WordBoundary,
            Anchor::NotWordBoundary => Anchor::NotWordBoundary,
        }
    }

    fn token(&self) -> &'static str {
        match self {
            Anchor::LineStart => "^",
            Anchor::LineEnd => "$",
            Anchor::TextStart => r"\A",
            Anchor::TextEnd => r"\z",
            Anchor::TextEndNewline => r"\Z",
            Anchor::WordBoundary => r"\b",
            Anchor::NotWordBoundary => r"\B",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Atom(String),
    Anchor(Anchor),
    Group { open: String, body: Box<Node> },
    Look { ahead: bool, negative: bool, body: Box<Node> },
    Repeat { target: Box<Node>, quantifier: String },
    Concat(Vec<Node>),
    Alternation(Vec<Node>),
}

impl Node {
    fn reversed(self) -> Node {
        match self {
            Node::Atom(_) => self,
            Node::Anchor(anchor) => Node::Anchor(anchor.mirrored()),
            Node::Group { open, body } => Node::Group {
                open,
                body: Box::new(body.reversed()),
            },
            Node::Look {
                ahead,
                negative,
                body,
            } => Node::Look {
                ahead: !ahead,
                negative,
                body: Box::new(body.reversed()),
            },
            Node::Repeat { target, quantifier } => Node::Repeat {
                target: Box::new(target.reversed()),
                quantifier,
            },
            Node::Concat(items) => Node::Concat(items.into_iter().rev().map(Node::reversed).collect()),
            Node::Alternation(branches) => {
                Node::Alternation(branches.into_iter().map(Node::reversed).collect())
            }
        }
    }

    fn render(&self, out: &mut String) {
        match self {
            Node::Atom(text) => out.push_str(text),
            Node::Anchor(anchor) => out.push_str(anchor.token()),
            Node::Group { open, body } => {
                out.push_str(open);
                body.render(out);
                out.push(')');
            }
            Node::Look {
                ahead,
                negative,
                body,
            } => {
                out.push_str(match (ahead, negative) {
                    (true, false) => "(?=",
                    (true, true) => "(?!",
                    (false, false) => "(?<=",
                    (false, true) => "(?<!",
                });
                body.render(out);
                out.push(')');
            }
            Node::Repeat { target, quantifier } => {
                target.render(out);
                out.push_str(quantifier);
            }
            Node::Concat(items) => items.iter().for_each(|item| item.render(out)),
            Node::Alternation(branches) => {
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        out.push('|');
                    }
                    branch.render(out);
                }
            }
        }
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, message: impl Into<String>) -> CaretError {
        CaretError::invalid_pattern(self.source, message)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn eat(&mut self, prefix: &str) -> bool {
        let matches = prefix
            .chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c));
        if matches {
            self.pos += prefix.chars().count();
        }
        matches
    }

    fn parse(mut self) -> Result<Node, CaretError> {
        let node = self.parse_alternation()?;
        if self.pos < self.chars.len() {
            return Err(self.error("unmatched close parenthesis"));
        }
        Ok(node)
    }

    fn parse_alternation(&mut self) -> Result<Node, CaretError> {
        let mut branches = vec![self.parse_concat()?];
        while self.peek() == Some('|') {
            self.pos += 1;
            branches.push(self.parse_concat()?);
        }
        Ok(if branches.len() == 1 {
            branches.remove(0)
        } else {
            Node::Alternation(branches)
        })
    }

    fn parse_concat(&mut self) -> Result<Node, CaretError> {
        let mut items: Vec<Node> = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                '|' | ')' => break,
                '*' | '+' | '?' => {
                    let quantifier = self.parse_quantifier(c);
                    self.attach(&mut items, quantifier)?;
                }
                '{' => match self.parse_interval() {
                    Some(quantifier) => self.attach(&mut items, quantifier)?,
                    None => {
                        self.pos += 1;
                        items.push(Node::Atom("{".to_string()));
                    }
                },
                '(' => {
                    if let Some(node) = self.parse_group(&mut items)? {
                        items.push(node);
                    }
                }
                '[' => items.push(Node::Atom(self.parse_class()?)),
                '\\' => items.push(self.parse_escape()?),
                '^' => {
                    self.pos += 1;
                    items.push(Node::Anchor(Anchor::LineStart));
                }
                '$' => {
                    self.pos += 1;
                    items.push(Node::Anchor(Anchor::LineEnd));
                }
                _ => {
                    self.pos += 1;
                    items.push(Node::Atom(c.to_string()));
                }
            }
        }
        Ok(if items.len() == 1 {
            items.remove(0)
        } else {
            Node::Concat(items)
        })
    }

    fn attach(&self, items: &mut Vec<Node>, quantifier: String) -> Result<(), CaretError> {
        let Some(target) = items.pop() else {
            return Err(self.error("target of repeat operator is not specified"));
        };
        items.push(Node::Repeat {
            target: Box::new(target),
            quantifier,
        });
        Ok(())
    }

    fn parse_quantifier(&mut self, c: char) -> String {
        self.pos += 1;
        let mut quantifier = c.to_string();
        if let Some(suffix @ ('?' | '+')) = self.peek() {
            self.pos += 1;
            quantifier.push(suffix);
        }
        quantifier
    }

    /// `{n}`, `{n,}`, `{,m}`, `{n,m}` plus an optional lazy `?`; `None` if `{` is a literal.
    fn parse_interval(&mut self) -> Option<String> {
        let mut end = self.pos + 1;
        let mut digits = 0;
        let mut commas = 0;
        while let Some(&c) = self.chars.get(end) {
            match c {
                '0'..='9' => digits += 1,
                ',' => commas += 1,
                '}' => break,
                _ => return None,
            }
            end += 1;
        }
        if self.chars.get(end) != Some(&'}') || digits == 0 || commas > 1 {
            return None;
        }

        let mut quantifier: String = self.chars[self.pos..=end].iter().collect();
        self.pos = end + 1;
        if self.peek() == Some('?') {
            self.pos += 1;
            quantifier.push('?');
        }
        Some(quantifier)
    }

    /// Parses a parenthesized construct. An isolated option group swallows the rest of the
    /// enclosing group and is pushed onto `items` directly, in which case `None` is returned.
    fn parse_group(&mut self, items: &mut Vec<Node>) -> Result<Option<Node>, CaretError> {
        self.pos += 1;

        if self.peek() != Some('?') {
            let body = self.parse_alternation()?;
            self.expect_close()?;
            return Ok(Some(Node::Group {
                open: "(".to_string(),
                body: Box::new(body),
            }));
        }

        self.pos += 1;
        let look = if self.eat("=") {
            Some((true, false))
        } else if self.eat("!") {
            Some((true, true))
        } else if self.eat("<=") {
            Some((false, false))
        } else if self.eat("<!") {
            Some((false, true))
        } else {
            None
        };
        if let Some((ahead, negative)) = look {
            let body = self.parse_alternation()?;
            self.expect_close()?;
            return Ok(Some(Node::Look {
                ahead,
                negative,
                body: Box::new(body),
            }));
        }

        match self.peek() {
            Some('#') => {
                while let Some(c) = self.bump() {
                    if c == ')' {
                        return Ok(None);
                    }
                }
                Err(self.error("end pattern in group"))
            }
            Some(':') | Some('>') => {
                let open = format!("(?{}", self.bump().unwrap_or(':'));
                self.parse_group_body(open).map(Some)
            }
            Some('<') | Some('\'') | Some('P') => {
                let start = self.pos;
                let close = match self.bump() {
                    Some('\'') => '\'',
                    Some('P') if self.eat("<") => '>',
                    Some('P') => return Err(self.error("undefined group option")),
                    _ => '>',
                };
                while let Some(c) = self.bump() {
                    if c == close {
                        let name: String = self.chars[start..self.pos].iter().collect();
                        return self.parse_group_body(format!("(?{name}")).map(Some);
                    }
                }
                Err(self.error("invalid group name"))
            }
            Some('(') => Err(self.error("conditional groups cannot be reversed")),
            Some('~') => Err(self.error("absent operators cannot be reversed")),
            _ => {
                let start = self.pos;
                while let Some(c) = self.peek() {
                    if c.is_ascii_alphabetic() || c == '-' {
                        self.pos += 1;
                    } else {
                        break;
                    }
                }
                let flags: String = self.chars[start..self.pos].iter().collect();
                match self.bump() {
                    Some(':') if !flags.is_empty() => {
                        self.parse_group_body(format!("(?{flags}:")).map(Some)
                    }
                    Some(')') if !flags.is_empty() => {
                        let rest = self.parse_alternation()?;
                        items.push(Node::Group {
                            open: format!("(?{flags}:"),
                            body: Box::new(rest),
                        });
                        Ok(None)
                    }
                    _ => Err(self.error("undefined group option")),
                }
            }
        }
    }

    fn parse_group_body(&mut self, open: String) -> Result<Node, CaretError> {
        let body = self.parse_alternation()?;
        self.expect_close()?;
        Ok(Node::Group {
            open,
            body: Box::new(body),
        })
    }

    fn expect_close(&mut self) -> Result<(), CaretError> {
        if self.bump() == Some(')') {
            Ok(())
        } else {
            Err(self.error("end pattern with unmatched parenthesis"))
        }
    }

    /// Copies a bracket expression verbatim, honouring nested classes and escapes.
    fn parse_class(&mut self) -> Result<String, CaretError> {
        let start = self.pos;
        self.pos += 1;
        if self.peek() == Some('^') {
            self.pos += 1;
        }
        if self.peek() == Some(']') {
            self.pos += 1;
        }

        let mut depth = 1;
        while let Some(c) = self.bump() {
            match c {
                '\\' => {
                    self.bump();
                }
                '[' => {
                    if self.peek() == Some(':')
                        && let Some(close) = self.find_posix_close()
                    {
                        self.pos = close;
                        continue;
                    }
                    depth += 1;
                }
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(self.chars[start..self.pos].iter().collect());
                    }
                }
                _ => {}
            }
        }
        Err(self.error("premature end of char-class"))
    }

    /// Position just past `:]` of a `[:name:]` bracket, if one starts here.
    fn find_posix_close(&self) -> Option<usize> {
        let mut i = self.pos + 1;
        while let Some(&c) = self.chars.get(i) {
            if c == ':' {
                return (self.chars.get(i + 1) == Some(&']')).then_some(i + 2);
            }
            if !(c.is_ascii_alphabetic() || c == '^') {
                return None;
            }
            i += 1;
        }
        None
    }

    fn parse_escape(&mut self) -> Result<Node, CaretError> {
        let start = self.pos;
        self.pos += 1;
        let Some(c) = self.bump() else {
            return Err(self.error("end pattern at escape"));
        };

        let anchor = match c {
            'A' => Some(Anchor::TextStart),
            'z' => Some(Anchor::TextEnd),
            'Z' => Some(Anchor::TextEndNewline),
            'b' => Some(Anchor::WordBoundary),
            'B' => Some(Anchor::NotWordBoundary),
            _ => None,
        };
        if let Some(anchor) = anchor {
            return Ok(Node::Anchor(anchor));
        }

        match c {
            '1'..='9' => return Err(self.error("backreferences cannot be reversed")),
            'k' => return Err(self.error("backreferences cannot be reversed")),
            'g' => return Err(self.error("subexpression calls cannot be reversed")),
            'G' | 'K' => return Err(self.error(format!("\\{c} cannot be reversed"))),
            'x' | 'o' | 'p' | 'P' if self.peek() == Some('{') => self.skip_braces()?,
            'x' => self.skip_while_max(2, |c| c.is_ascii_hexdigit()),
            'u' => self.skip_while_max(4, |c| c.is_ascii_hexdigit()),
            '0' => self.skip_while_max(2, |c| ('0'..='7').contains(&c)),
            'p' | 'P' => {
                self.bump();
            }
            'c' => {
                self.bump();
            }
            'C' | 'M' if self.peek() == Some('-') => {
                self.pos += 1;
                self.bump();
            }
            _ => {}
        }
        Ok(Node::Atom(self.chars[start..self.pos].iter().collect()))
    }

    fn skip_braces(&mut self) -> Result<(), CaretError> {
        while let Some(c) = self.bump() {
            if c == '}' {
                return Ok(());
            }
        }
        Err(self.error("invalid code point value"))
    }

    fn skip_while_max(&mut self, max: usize, accept: impl Fn(char) -> bool) {
        let mut taken = 0;
        while taken < max && self.peek().is_some_and(&accept) {
            self.pos += 1;
            taken += 1;
        }
    }
}

/// Rewrite a forward-written pattern so that it matches the reversed text.
///
/// A match of the returned pattern at reversed span `[len - e, len - s)` corresponds to a
/// match of `source` at forward span `[s, e)`.
pub fn reverse_pattern(source: &str) -> Result<String, CaretError> {
    let tree = Parser::new(source).parse()?;
    let mut out = String::with_capacity(source.len());
    tree.reversed().render(&mut out);
    Ok(out)
}
