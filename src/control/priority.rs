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

use std::fmt;
use std::str::FromStr;

/// Each package must have a priority value, set in its control metadata.
/// This is used to control which packages are included in a standard or
/// minimal install image.
///
/// Most packages will have a priority of `optional`. Priority levels other
/// than `optional` are only used for packages that should be included by
/// default in a standard installation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Priority {
    /// Necessary for the proper functioning of the system.
    Required,

    /// Important programs one would expect to find on any Unix-like system.
    Important,

    /// A reasonably small but not too limited base system.
    Standard,

    /// The default priority for the majority of the archive.
    Optional,

    /// Deprecated; treated as equivalent to `optional`.
    Extra,
}

/// Error returned when a `Priority:` field doesn't match one of the five
/// recognised values.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InvalidPriority;
crate::errors::error_enum!(InvalidPriority);

impl FromStr for Priority {
    type Err = InvalidPriority;

    fn from_str(s: &str) -> Result<Self, InvalidPriority> {
        match s {
            "required" => Ok(Priority::Required),
            "important" => Ok(Priority::Important),
            "standard" => Ok(Priority::Standard),
            "optional" => Ok(Priority::Optional),
            "extra" => Ok(Priority::Extra),
            _ => Err(InvalidPriority),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::Required => "required",
            Priority::Important => "important",
            Priority::Standard => "standard",
            Priority::Optional => "optional",
            Priority::Extra => "extra",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        for p in [
            Priority::Required,
            Priority::Important,
            Priority::Standard,
            Priority::Optional,
            Priority::Extra,
        ] {
            assert_eq!(p, p.to_string().parse().unwrap());
        }
    }

    #[test]
    fn rejects_unknown() {
        assert_eq!(InvalidPriority, "urgent".parse::<Priority>().unwrap_err());
    }
}

// vim: foldmethod=marker
