//! Boolean and multi-valued literals

use crate::error::{CompileError, Result};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Not;
use std::str::FromStr;

/// Name of the always-false placeholder wire used for padding adders and
/// for cells outside an open grid.
pub const ZERO_NAME: &str = "{zero}";

/// A named proposition with polarity and an optional value tag.
///
/// Without a tag the literal is boolean. With a tag it reads
/// "`name` equals `tag`" (positive) or "`name` differs from `tag`" (negative).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    name: String,
    polarity: bool,
    tag: Option<u32>,
}

impl Literal {
    /// Create a positive boolean literal
    pub fn new(name: impl Into<String>) -> Self {
        Self::with(name, true, None)
    }

    /// Create a literal from all three fields
    pub fn with(name: impl Into<String>, polarity: bool, tag: Option<u32>) -> Self {
        Self {
            name: name.into(),
            polarity,
            tag,
        }
    }

    /// The always-false placeholder literal
    pub fn zero() -> Self {
        Self::new(ZERO_NAME)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn polarity(&self) -> bool {
        self.polarity
    }

    pub fn tag(&self) -> Option<u32> {
        self.tag
    }

    /// True if the literal carries no tag
    pub fn is_bool(&self) -> bool {
        self.tag.is_none()
    }

    /// Flip polarity
    pub fn negate(&self) -> Self {
        Self::with(self.name.clone(), !self.polarity, self.tag)
    }

    pub fn with_polarity(&self, polarity: bool) -> Self {
        Self::with(self.name.clone(), polarity, self.tag)
    }

    /// Flip polarity when `flip` is set
    pub fn xor(&self, flip: bool) -> Self {
        Self::with(self.name.clone(), self.polarity ^ flip, self.tag)
    }

    pub fn with_tag(&self, tag: u32) -> Self {
        Self::with(self.name.clone(), self.polarity, Some(tag))
    }

    /// Same polarity and tag under a different name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self::with(name, self.polarity, self.tag)
    }

    /// Parse `['~']name['('tag')']`
    pub fn parse(text: &str) -> Result<Self> {
        let (polarity, rest) = match text.strip_prefix('~') {
            Some(rest) => (false, rest),
            None => (true, text),
        };

        let (name, tag) = match rest.find('(') {
            None => (rest, None),
            Some(open) => {
                let digits = rest[open + 1..]
                    .strip_suffix(')')
                    .ok_or_else(|| CompileError::parse(text, "tag is not closed with ')'"))?;
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(CompileError::parse(text, "tag must be a non-negative integer"));
                }
                let tag = digits
                    .parse::<u32>()
                    .map_err(|e| CompileError::parse(text, e.to_string()))?;
                (&rest[..open], Some(tag))
            }
        };

        if name.is_empty() {
            return Err(CompileError::parse(text, "literal has no name"));
        }
        if name.contains(char::is_whitespace) || name.contains(')') {
            return Err(CompileError::parse(text, "invalid character in literal name"));
        }

        Ok(Self::with(name, polarity, tag))
    }
}

impl Not for Literal {
    type Output = Literal;

    fn not(self) -> Literal {
        Literal {
            polarity: !self.polarity,
            ..self
        }
    }
}

impl Not for &Literal {
    type Output = Literal;

    fn not(self) -> Literal {
        self.negate()
    }
}

// Ordered by (name, polarity, tag-or-0); the final `is_some` key only
// separates `x` from `x(0)` so that ordering agrees with equality.
impl Ord for Literal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then(self.polarity.cmp(&other.polarity))
            .then(self.tag.unwrap_or(0).cmp(&other.tag.unwrap_or(0)))
            .then(self.tag.is_some().cmp(&other.tag.is_some()))
    }
}

impl PartialOrd for Literal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.polarity {
            write!(f, "~")?;
        }
        write!(f, "{}", self.name)?;
        if let Some(tag) = self.tag {
            write!(f, "({})", tag)?;
        }
        Ok(())
    }
}

impl FromStr for Literal {
    type Err = CompileError;

    fn from_str(s: &str) -> Result<Self> {
        Literal::parse(s)
    }
}

/// Anything that can stand in for a literal: plain literals and grid nodes.
pub trait Atom {
    fn atom_name(&self) -> Cow<'_, str>;

    fn atom_polarity(&self) -> bool {
        true
    }

    fn atom_tag(&self) -> Option<u32> {
        None
    }

    fn to_literal(&self) -> Literal {
        Literal::with(self.atom_name().into_owned(), self.atom_polarity(), self.atom_tag())
    }
}

impl Atom for Literal {
    fn atom_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.name)
    }

    fn atom_polarity(&self) -> bool {
        self.polarity
    }

    fn atom_tag(&self) -> Option<u32> {
        self.tag
    }

    fn to_literal(&self) -> Literal {
        self.clone()
    }
}
