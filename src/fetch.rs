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

//! HTTP/HTTPS download is an external collaborator: no network stack lives
//! in this crate. [Fetcher] is the seam the transaction engine calls
//! through; retries on a failed fetch are the fetcher's responsibility, not
//! the core's.

use std::path::Path;

/// Downloads a package's advertised `Filename:` to a local path.
pub trait Fetcher {
    /// The error type this fetcher reports.
    type Error: std::error::Error + 'static;

    /// Fetch `filename` (as advertised by a package's `Filename:` field)
    /// into `dest_path`.
    fn fetch(&self, filename: &str, dest_path: &Path) -> Result<(), Self::Error>;
}


// vim: foldmethod=marker
