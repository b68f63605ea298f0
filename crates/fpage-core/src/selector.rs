#![forbid(unsafe_code)]

//! Minimal selector engine and ordered fallback chains.
//!
//! Supports comma-separated lists of compound selectors:
//!
//! | Part            | Example                 |
//! |-----------------|-------------------------|
//! | tag / universal | `section`, `*`          |
//! | id              | `#poll-section`         |
//! | class           | `.c-nav__item`          |
//! | attribute       | `[id]`, `[type="tel"]`  |
//! | prefix / substr | `[href^="#"]`, `[href*="privacy"]` |
//! | pseudo          | `:checked`, `:not([type="hidden"])` |
//!
//! Combinators are not supported; scope a query by passing a root node to
//! [`Document::query_all`](crate::dom::Document::query_all) instead.
//!
//! A [`SelectorChain`] holds several alternative selectors tried in order;
//! the first strategy that finds anything wins. Pages that follow one of two
//! markup conventions (a custom class vs. a legacy framework class) are
//! handled by listing both strategies instead of branching in code.

use std::fmt;
use std::str::FromStr;

use crate::dom::{Document, Element, NodeId};

/// Error produced while parsing a selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// The selector (or one list entry) is empty.
    Empty,
    /// Unexpected character at a byte offset.
    UnexpectedChar { ch: char, offset: usize },
    /// Input ended inside a construct.
    UnexpectedEnd,
    /// A pseudo-class other than `:checked` / `:not(...)`.
    UnknownPseudo(String),
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty selector"),
            Self::UnexpectedChar { ch, offset } => {
                write!(f, "unexpected {ch:?} at offset {offset}")
            }
            Self::UnexpectedEnd => write!(f, "unexpected end of selector"),
            Self::UnknownPseudo(name) => write!(f, "unsupported pseudo-class :{name}"),
        }
    }
}

impl std::error::Error for SelectorError {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
    Contains(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Condition {
    Id(String),
    Class(String),
    Attr { name: String, op: AttrOp },
    Checked,
    Not(Box<Compound>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    conditions: Vec<Condition>,
}

impl Compound {
    fn matches(&self, el: &Element) -> bool {
        if let Some(tag) = &self.tag
            && tag != el.tag()
        {
            return false;
        }
        self.conditions.iter().all(|c| match c {
            Condition::Id(id) => el.attr("id") == Some(id.as_str()),
            Condition::Class(class) => el.has_class(class),
            Condition::Attr { name, op } => match (op, el.attr(name)) {
                (_, None) => false,
                (AttrOp::Exists, Some(_)) => true,
                (AttrOp::Equals(v), Some(actual)) => actual == v,
                (AttrOp::Prefix(v), Some(actual)) => actual.starts_with(v.as_str()),
                (AttrOp::Contains(v), Some(actual)) => actual.contains(v.as_str()),
            },
            Condition::Checked => el.checked(),
            Condition::Not(inner) => !inner.matches(el),
        })
    }
}

/// A parsed, comma-separated selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList {
    source: String,
    compounds: Vec<Compound>,
}

impl SelectorList {
    /// Parse a selector list.
    pub fn parse(src: &str) -> Result<Self, SelectorError> {
        let mut parser = Parser::new(src);
        let mut compounds = Vec::new();
        loop {
            parser.skip_ws();
            compounds.push(parser.compound()?);
            parser.skip_ws();
            match parser.peek() {
                None => break,
                Some((_, ',')) => {
                    parser.bump();
                }
                Some((offset, ch)) => return Err(SelectorError::UnexpectedChar { ch, offset }),
            }
        }
        Ok(Self {
            source: src.trim().to_string(),
            compounds,
        })
    }

    /// Whether the element matches any entry of the list.
    #[must_use]
    pub fn matches(&self, el: &Element) -> bool {
        self.compounds.iter().any(|c| c.matches(el))
    }

    /// The source text, trimmed.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Ordered selector strategies; the first strategy with a hit wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorChain {
    strategies: Vec<SelectorList>,
}

impl SelectorChain {
    /// Parse each strategy in order.
    pub fn parse<'a>(strategies: impl IntoIterator<Item = &'a str>) -> Result<Self, SelectorError> {
        let strategies = strategies
            .into_iter()
            .map(SelectorList::parse)
            .collect::<Result<Vec<_>, _>>()?;
        if strategies.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Self { strategies })
    }

    /// First node under `scope` found by the earliest matching strategy.
    #[must_use]
    pub fn first_match(&self, doc: &Document, scope: NodeId) -> Option<NodeId> {
        self.strategies
            .iter()
            .find_map(|strategy| doc.query(scope, strategy))
    }

    /// Strategies in priority order.
    #[must_use]
    pub fn strategies(&self) -> &[SelectorList] {
        &self.strategies
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn peek(&self) -> Option<(usize, char)> {
        self.src[self.pos..].chars().next().map(|c| (self.pos, c))
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.src[self.pos..].chars().next()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while let Some((_, c)) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.bump();
        }
    }

    fn expect(&mut self, want: char) -> Result<(), SelectorError> {
        match self.peek() {
            Some((_, c)) if c == want => {
                self.bump();
                Ok(())
            }
            Some((offset, ch)) => Err(SelectorError::UnexpectedChar { ch, offset }),
            None => Err(SelectorError::UnexpectedEnd),
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while let Some((_, c)) = self.peek() {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                self.bump();
            } else {
                break;
            }
        }
        if self.pos == start {
            return match self.peek() {
                Some((offset, ch)) => Err(SelectorError::UnexpectedChar { ch, offset }),
                None => Err(SelectorError::UnexpectedEnd),
            };
        }
        Ok(self.src[start..self.pos].to_string())
    }

    fn value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some((_, quote @ ('"' | '\''))) => {
                self.bump();
                let start = self.pos;
                loop {
                    match self.bump() {
                        Some(c) if c == quote => {
                            let end = self.pos - c.len_utf8();
                            return Ok(self.src[start..end].to_string());
                        }
                        Some(_) => {}
                        None => return Err(SelectorError::UnexpectedEnd),
                    }
                }
            }
            _ => self.ident(),
        }
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound {
            tag: None,
            conditions: Vec::new(),
        };
        let mut any = false;
        match self.peek() {
            Some((_, '*')) => {
                self.bump();
                any = true;
            }
            Some((_, c)) if c.is_alphabetic() => {
                compound.tag = Some(self.ident()?.to_ascii_lowercase());
                any = true;
            }
            _ => {}
        }
        while let Some((offset, c)) = self.peek() {
            match c {
                '#' => {
                    self.bump();
                    compound.conditions.push(Condition::Id(self.ident()?));
                }
                '.' => {
                    self.bump();
                    compound.conditions.push(Condition::Class(self.ident()?));
                }
                '[' => {
                    self.bump();
                    compound.conditions.push(self.attribute()?);
                }
                ':' => {
                    self.bump();
                    compound.conditions.push(self.pseudo()?);
                }
                ',' | ')' => break,
                c if c.is_whitespace() => break,
                ch => return Err(SelectorError::UnexpectedChar { ch, offset }),
            }
            any = true;
        }
        if !any {
            return match self.peek() {
                None | Some((_, ',')) => Err(SelectorError::Empty),
                Some((offset, ch)) => Err(SelectorError::UnexpectedChar { ch, offset }),
            };
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<Condition, SelectorError> {
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();
        let op = match self.peek() {
            Some((_, ']')) => AttrOp::Exists,
            Some((_, '=')) => {
                self.bump();
                self.skip_ws();
                AttrOp::Equals(self.value()?)
            }
            Some((_, c @ ('^' | '*'))) => {
                self.bump();
                self.expect('=')?;
                self.skip_ws();
                let v = self.value()?;
                if c == '^' {
                    AttrOp::Prefix(v)
                } else {
                    AttrOp::Contains(v)
                }
            }
            Some((offset, ch)) => return Err(SelectorError::UnexpectedChar { ch, offset }),
            None => return Err(SelectorError::UnexpectedEnd),
        };
        self.skip_ws();
        self.expect(']')?;
        Ok(Condition::Attr { name, op })
    }

    fn pseudo(&mut self) -> Result<Condition, SelectorError> {
        let name = self.ident()?.to_ascii_lowercase();
        match name.as_str() {
            "checked" => Ok(Condition::Checked),
            "not" => {
                self.expect('(')?;
                self.skip_ws();
                let inner = self.compound()?;
                self.skip_ws();
                self.expect(')')?;
                Ok(Condition::Not(Box::new(inner)))
            }
            _ => Err(SelectorError::UnknownPseudo(name)),
        }
    }
}
