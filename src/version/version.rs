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

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Debian-style package version number.
///
/// A [Version] takes the form `[epoch:]upstream-version[-debian-revision]`.
/// `epoch` defaults to `0` when absent; `debian_revision` defaults to the
/// empty string, which compares as if it were `0` (see [Version::cmp]).
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct Version {
    epoch: u64,
    upstream_version: String,
    debian_revision: String,
}

/// Error conditions encountered when parsing a [Version].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The input string was empty.
    Empty,

    /// The epoch component was not a valid non-negative integer.
    InvalidEpoch,

    /// The `upstream_version` component is empty -- this is mandatory.
    NoUpstreamVersion,

    /// The `upstream_version` component contained a character outside
    /// `[A-Za-z0-9.+-:~]`, or didn't start with a digit.
    InvalidUpstreamVersion,

    /// The `debian_revision` component contained a character outside
    /// `[A-Za-z0-9.+~]`.
    InvalidDebianRevision,
}
crate::errors::error_enum!(Error);

fn is_upstream_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-' | ':' | '~')
}

fn is_revision_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '~')
}

impl Version {
    /// Construct a [Version] from its already-split parts, validating each
    /// component's character set.
    pub fn from_parts(
        epoch: u64,
        upstream_version: &str,
        debian_revision: &str,
    ) -> Result<Self, Error> {
        if upstream_version.is_empty() {
            return Err(Error::NoUpstreamVersion);
        }
        if !upstream_version.chars().all(is_upstream_char) {
            return Err(Error::InvalidUpstreamVersion);
        }
        if !debian_revision.chars().all(is_revision_char) {
            return Err(Error::InvalidDebianRevision);
        }
        Ok(Version {
            epoch,
            upstream_version: upstream_version.to_owned(),
            debian_revision: debian_revision.to_owned(),
        })
    }

    /// The `epoch` component. Missing epochs are normalised to `0` at parse
    /// time, per the invariant in the data model (`epoch >= 0`).
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The `upstream_version` component.
    pub fn upstream_version(&self) -> &str {
        &self.upstream_version
    }

    /// The `debian_revision` component. Empty when the version string had
    /// no trailing `-revision`.
    pub fn debian_revision(&self) -> &str {
        &self.debian_revision
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        if s.is_empty() {
            return Err(Error::Empty);
        }

        let (epoch, rest) = match s.split_once(':') {
            Some((epoch_str, rest)) => {
                let epoch = epoch_str.parse::<u64>().map_err(|_| Error::InvalidEpoch)?;
                (epoch, rest)
            }
            None => (0, s),
        };

        let (upstream_version, debian_revision) = match rest.rfind('-') {
            Some(idx) => (&rest[..idx], &rest[idx + 1..]),
            None => (rest, ""),
        };

        Version::from_parts(epoch, upstream_version, debian_revision)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}:", self.epoch)?;
        }
        write!(f, "{}", self.upstream_version)?;
        if !self.debian_revision.is_empty() {
            write!(f, "-{}", self.debian_revision)?;
        }
        Ok(())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.epoch.cmp(&other.epoch) {
            Ordering::Equal => {}
            v => return v,
        }
        match verrevcmp(&self.upstream_version, &other.upstream_version) {
            Ordering::Equal => {}
            v => return v,
        }
        verrevcmp(&self.debian_revision, &other.debian_revision)
    }
}

/// `order(c)`: `~` sorts before everything (including the end of the
/// string), digits and end-of-string are equal to each other, letters sort
/// by their ASCII value, and every other punctuation character sorts after
/// all letters.
fn order(c: Option<u8>) -> i32 {
    match c {
        None => 0,
        Some(b'~') => -1,
        Some(c) if c.is_ascii_digit() => 0,
        Some(c) if c.is_ascii_alphabetic() => c as i32,
        Some(c) => c as i32 + 256,
    }
}

/// The canonical Debian `verrevcmp` algorithm: alternating non-digit and
/// digit runs, non-digit runs compared character-by-character via
/// [order], digit runs compared numerically after stripping leading zeros.
fn verrevcmp(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let (mut ai, mut bi) = (0usize, 0usize);

    loop {
        if ai >= a.len() && bi >= b.len() {
            return Ordering::Equal;
        }

        // Non-digit run: compare character by character until both sides
        // hit a digit (or the end of the string).
        while (ai < a.len() && !a[ai].is_ascii_digit()) || (bi < b.len() && !b[bi].is_ascii_digit())
        {
            let ac = a.get(ai).copied();
            let bc = b.get(bi).copied();
            match order(ac).cmp(&order(bc)) {
                Ordering::Equal => {}
                v => return v,
            }
            if ac.is_some() {
                ai += 1;
            }
            if bc.is_some() {
                bi += 1;
            }
        }

        // Digit run: strip leading zeros, then compare by length, then by
        // the first differing digit.
        while a.get(ai) == Some(&b'0') {
            ai += 1;
        }
        while b.get(bi) == Some(&b'0') {
            bi += 1;
        }

        let a_start = ai;
        let b_start = bi;
        while ai < a.len() && a[ai].is_ascii_digit() {
            ai += 1;
        }
        while bi < b.len() && b[bi].is_ascii_digit() {
            bi += 1;
        }

        match (ai - a_start).cmp(&(bi - b_start)) {
            Ordering::Equal => {}
            v => return v,
        }
        match a[a_start..ai].cmp(&b[b_start..bi]) {
            Ordering::Equal => {}
            v => return v,
        }
    }
}


// vim: foldmethod=marker
