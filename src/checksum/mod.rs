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

//! Fixed-width hex-encoded digests, as seen in `MD5sum:`/`SHA256sum:`
//! control fields and in `.md5sums` files.

use std::fmt;
use std::str::FromStr;

const HASH_LEN_MD5: usize = 16;
const HASH_LEN_SHA256: usize = 32;

/// A digest over some file's content, of a fixed byte length `HASH_LEN`.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Digest<const HASH_LEN: usize>([u8; HASH_LEN]);

/// [Digest] for the MD5 algorithm. Kept around only because older feeds
/// still publish it; verification only consults it when no `SHA256sum:` is
/// present.
pub type DigestMd5 = Digest<HASH_LEN_MD5>;

/// [Digest] for the SHA256 algorithm.
pub type DigestSha256 = Digest<HASH_LEN_SHA256>;

/// Error conditions encountered when parsing a [Digest] from a hex string.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The input was empty.
    Empty,

    /// The input wasn't valid hex, or wasn't the expected byte length.
    Malformed,
}
crate::errors::error_enum!(Error);

impl<const HASH_LEN: usize> Digest<HASH_LEN> {
    /// Build a digest from raw bytes already known to be `HASH_LEN` long,
    /// e.g. the output of a hasher.
    pub fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Return the raw digest bytes.
    pub fn bytes(&self) -> [u8; HASH_LEN] {
        self.0
    }
}

impl<const HASH_LEN: usize> fmt::Display for Digest<HASH_LEN> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl<const HASH_LEN: usize> fmt::Debug for Digest<HASH_LEN> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self)
    }
}

impl<const HASH_LEN: usize> FromStr for Digest<HASH_LEN> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        if s.is_empty() {
            return Err(Error::Empty);
        }
        let bytes = hex::decode(s).map_err(|_| Error::Malformed)?;
        Ok(Self(bytes.try_into().map_err(|_| Error::Malformed)?))
    }
}


// vim: foldmethod=marker
