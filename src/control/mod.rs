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

//! The `control` module parses Debian RFC 2822-style control streams into
//! [Package] records.
//!
//! [paragraph] does the low-level block splitting and never touches the
//! filesystem or assigns meaning to a field; [package] turns a parsed block
//! into the concrete, validated [Package] type the rest of the crate works
//! with. Dependency fields are kept raw here -- see [crate::dependency] and
//! [crate::index] for expansion into the abstract-package graph.

pub mod package;
mod paragraph;
pub mod priority;

pub use package::Package;
pub use paragraph::{Error, RawField, RawParagraph};
pub use priority::{InvalidPriority, Priority};

// vim: foldmethod=marker
