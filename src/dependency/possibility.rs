// {{{ Copyright (c) Paul R. Tagliamonte <paultag@debian.org>, 2024
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN
// THE SOFTWARE. }}}

use crate::version::{Constraint, Operator, Version};
use std::fmt;

/// One arm of a [crate::dependency::CompoundDepend]: an abstract package
/// name, and an optional version constraint on it.
///
/// ```text
/// possibility := NAME ( '(' OP VERSION ')' )?
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Possibility {
    /// The abstract package name this possibility resolves through.
    pub name: String,

    /// The version constraint, if any.
    pub constraint: Constraint,
}

/// Error conditions encountered parsing a [Possibility].
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// The possibility was empty.
    Empty,

    /// The package name was empty or contained whitespace.
    InvalidName,

    /// The `(op version)` suffix was present but malformed -- missing a
    /// closing paren, an unknown operator, or an unparsable version.
    InvalidVersionClause,
}
crate::errors::error_enum!(Error);

impl Possibility {
    /// Parse one possibility, e.g. `foo` or `foo (>= 1.2)`.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::Empty);
        }

        let Some(paren_idx) = s.find('(') else {
            if s.split_whitespace().count() != 1 {
                return Err(Error::InvalidName);
            }
            return Ok(Possibility {
                name: s.to_owned(),
                constraint: Constraint::None,
            });
        };

        let name = s[..paren_idx].trim();
        if name.is_empty() || name.split_whitespace().count() != 1 {
            return Err(Error::InvalidName);
        }

        let clause = s[paren_idx + 1..]
            .strip_suffix(')')
            .ok_or(Error::InvalidVersionClause)?
            .trim();

        let op_len = clause
            .find(|c: char| !matches!(c, '<' | '>' | '='))
            .ok_or(Error::InvalidVersionClause)?;
        let (op, version) = clause.split_at(op_len);
        let op: Operator = op.parse().map_err(|_| Error::InvalidVersionClause)?;
        let version: Version = version
            .trim()
            .parse()
            .map_err(|_| Error::InvalidVersionClause)?;

        Ok(Possibility {
            name: name.to_owned(),
            constraint: Constraint::Some(op, version),
        })
    }
}

impl fmt::Display for Possibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.constraint)
    }
}


// vim: foldmethod=marker
