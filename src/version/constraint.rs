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

use super::Version;
use std::fmt;
use std::str::FromStr;

/// A version comparison operator, as seen in a dependency possibility like
/// `foo (>= 1.2)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operator {
    /// Strictly less than (`<<`).
    StrictlyLess,
    /// Less than or equal to (`<=`).
    LessEqual,
    /// Exactly equal to (`=`).
    Equal,
    /// Greater than or equal to (`>=`).
    GreaterEqual,
    /// Strictly greater than (`>>`).
    StrictlyGreater,
}

impl Operator {
    fn matches(self, ordering: std::cmp::Ordering) -> bool {
        use std::cmp::Ordering::*;
        match self {
            Operator::StrictlyLess => ordering == Less,
            Operator::LessEqual => ordering != Greater,
            Operator::Equal => ordering == Equal,
            Operator::GreaterEqual => ordering != Less,
            Operator::StrictlyGreater => ordering == Greater,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operator::StrictlyLess => "<<",
            Operator::LessEqual => "<=",
            Operator::Equal => "=",
            Operator::GreaterEqual => ">=",
            Operator::StrictlyGreater => ">>",
        })
    }
}

/// Error conditions encountered when parsing an [Operator].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InvalidOperator;
crate::errors::error_enum!(InvalidOperator);

impl FromStr for Operator {
    type Err = InvalidOperator;

    /// Parse an operator, consuming any trailing whitespace so that both
    /// `<= 1.2` and `<=1.2` parse to the same possibility. `<` and `>` are
    /// accepted as aliases of `<=` and `>=` for historical compatibility.
    fn from_str(s: &str) -> Result<Self, InvalidOperator> {
        match s.trim_end() {
            "<<" => Ok(Operator::StrictlyLess),
            "<=" | "<" => Ok(Operator::LessEqual),
            "=" => Ok(Operator::Equal),
            ">=" | ">" => Ok(Operator::GreaterEqual),
            ">>" => Ok(Operator::StrictlyGreater),
            _ => Err(InvalidOperator),
        }
    }
}

/// A version constraint: an [Operator] paired with a [Version] to compare
/// against, or [Constraint::None] if the possibility carried no version at
/// all (always satisfied).
#[derive(Clone, Debug, PartialEq)]
pub enum Constraint {
    /// No version constraint was given; any version satisfies it.
    None,

    /// `(op, version)`, evaluated via [Constraint::satisfied_by].
    Some(Operator, Version),
}

impl Constraint {
    /// Returns whether `have` satisfies this constraint.
    pub fn satisfied_by(&self, have: &Version) -> bool {
        match self {
            Constraint::None => true,
            Constraint::Some(op, want) => op.matches(have.cmp(want)),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::None => Ok(()),
            Constraint::Some(op, version) => write!(f, "({} {})", op, version),
        }
    }
}


// vim: foldmethod=marker
