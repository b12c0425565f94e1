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

//! The `architecture` module contains support for parsing architecture
//! strings, and for ranking them against a destination's configured
//! architecture priority list.
//!
//! Every effort is made to correctly handle the architectures a
//! resource-constrained destination is likely to see, but this module falls
//! back to treating an unrecognised string as valid but unknown, so a
//! forward-compatible feed doesn't become unparsable.

use std::fmt;
use std::str::FromStr;

/// A package architecture string, such as `all`, `mips_24kc`, or `arm`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum Architecture {
    /// Architecture-independent; valid on any host.
    All,

    /// Special "any" architecture, used in `Architecture:` fields of source
    /// packages that build binaries for whichever host they're built on.
    Any,

    /// Everything else: known or unknown target triples/arch names are kept
    /// verbatim so a forward-compatible feed doesn't fail to parse.
    Other(String),
}

impl FromStr for Architecture {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "all" => Architecture::All,
            "any" => Architecture::Any,
            other => Architecture::Other(other.to_owned()),
        })
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Architecture::All => f.write_str("all"),
            Architecture::Any => f.write_str("any"),
            Architecture::Other(s) => f.write_str(s),
        }
    }
}

/// An ordered list of architectures a destination accepts, most preferred
/// first. `all` and `any` are implicitly accepted (at the lowest priority)
/// regardless of whether they're named explicitly: `all` packages are
/// architecture-independent, and `any` is the default for a record with no
/// `Architecture:` field at all, so rejecting it would reject every
/// unremarkable package.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArchitecturePriority {
    ordered: Vec<Architecture>,
}

impl ArchitecturePriority {
    /// Build a priority list from most- to least-preferred architecture.
    pub fn new(ordered: Vec<Architecture>) -> Self {
        Self { ordered }
    }

    /// Returns the priority of `arch` on this destination: `0` means
    /// unsupported, higher values are more preferred. The solver rejects
    /// any candidate with `arch_priority() == 0`.
    pub fn priority(&self, arch: &Architecture) -> u32 {
        if let Some(pos) = self.ordered.iter().position(|a| a == arch) {
            return (self.ordered.len() - pos) as u32;
        }
        if *arch == Architecture::All || *arch == Architecture::Any {
            return 1;
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_and_unknown() {
        assert_eq!(Architecture::All, "all".parse().unwrap());
        assert_eq!(
            Architecture::Other("mips_24kc".into()),
            "mips_24kc".parse().unwrap()
        );
    }

    #[test]
    fn all_is_always_supported() {
        let p = ArchitecturePriority::new(vec![Architecture::Other("mips_24kc".into())]);
        assert!(p.priority(&Architecture::All) > 0);
    }

    #[test]
    fn any_is_always_supported() {
        let p = ArchitecturePriority::new(vec![Architecture::Other("mips_24kc".into())]);
        assert!(p.priority(&Architecture::Any) > 0);
    }

    #[test]
    fn unsupported_arch_is_zero() {
        let p = ArchitecturePriority::new(vec![Architecture::Other("mips_24kc".into())]);
        assert_eq!(0, p.priority(&Architecture::Other("arm".into())));
    }

    #[test]
    fn earlier_entries_rank_higher() {
        let p = ArchitecturePriority::new(vec![
            Architecture::Other("mips_24kc".into()),
            Architecture::Other("mips".into()),
        ]);
        assert!(
            p.priority(&Architecture::Other("mips_24kc".into()))
                > p.priority(&Architecture::Other("mips".into()))
        );
    }
}

// vim: foldmethod=marker
