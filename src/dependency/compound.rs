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

use super::{Error, Possibility};
use std::fmt;

/// Which recognition-level relation a [CompoundDepend] came from. Each
/// compound carries its own kind as a tagged variant, rather than all
/// relation kinds living in one flat untyped array.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DepKind {
    /// Must reach `installed` before the dependant may be unpacked.
    PreDepend,
    /// Must be installed (in some order) for the dependant to be installed.
    Depend,
    /// Enqueued only under the `add-recommends` policy.
    Recommend,
    /// Never enqueued by the solver; informational only.
    Suggest,
    /// Rejects the candidate if a matching package is installed and not
    /// being removed.
    Conflict,
    /// Allows a candidate to take over a conflicting package's files.
    Replace,
    /// Like [DepKind::Recommend], but eagerly enqueued regardless of policy.
    /// Rare; kept for completeness with the other relation kinds.
    GreedyDepend,
}

/// A disjunction of [Possibility] values, all alternatives for satisfying
/// one dependency relation. All possibilities in one [CompoundDepend] must
/// be tried in order until one is satisfied (or all are exhausted).
///
/// ```text
/// compound := possibility ( '|' possibility )*
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct CompoundDepend {
    /// Which relation this compound expresses.
    pub kind: DepKind,
    /// The pipe-separated alternatives, in declaration order.
    pub possibilities: Vec<Possibility>,
}

impl CompoundDepend {
    /// Parse one `|`-separated compound term.
    fn parse_one(kind: DepKind, s: &str) -> Result<Self, Error> {
        let possibilities = s
            .split('|')
            .map(Possibility::parse)
            .collect::<Result<Vec<_>, _>>()?;
        if possibilities.is_empty() {
            return Err(Error::Empty);
        }
        Ok(CompoundDepend { kind, possibilities })
    }

    /// Parse a full field value (e.g. the raw `Depends:` string) into its
    /// comma-separated compound terms.
    ///
    /// ```text
    /// field := compound ( ',' compound )*
    /// ```
    ///
    /// An empty or all-whitespace field parses to an empty list, not an
    /// error -- most packages have no `Conflicts:`, say.
    pub fn parse_field(kind: DepKind, field: &str) -> Result<Vec<CompoundDepend>, Error> {
        field
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| CompoundDepend::parse_one(kind, s))
            .collect()
    }
}

impl fmt::Display for CompoundDepend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.possibilities.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", parts.join(" | "))
    }
}


// vim: foldmethod=marker
