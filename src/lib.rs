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

#![deny(missing_docs)]
#![deny(missing_copy_implementations)]
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(unused_import_braces)]
#![deny(unused_qualifications)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

//! A package database and dependency engine for resource-constrained
//! install destinations.
//!
//! This crate is under active development. *Please do not post widely
//! directing to this crate yet* -- the API shipped today is unstable, and
//! is likely to change -- fairly significantly -- without much regard to
//! very precisely following semver until it stabalizes.
//!
//! You're more than welcome to play with this and use it, but it's not
//! something I would encourage load bearing infrastructure to be written
//! with as of right now.
//!
//! # Introduction
//!
//! This crate models an install destination -- a filesystem root with a
//! `status` file tracking what's installed -- as a [destination::Destination],
//! and gives you the pieces to drive packages through it: parse
//! [control] records and [version] numbers, expand [dependency]
//! expressions against a [index::PackageIndex], ask the [solver] for a
//! [solver::Plan], and run that plan through a [transaction::Transaction].
//!
//! Each external concern -- downloading a `.deb` ([fetch::Fetcher]),
//! unpacking its archive ([archive::ArchiveReader]), and validating OpenPGP
//! signatures ([verify::SignatureBackend]) -- is a trait the transaction
//! engine calls through, rather than a dependency this crate bundles.
//! [archive::TarGzArchiveReader] is provided behind the `builtin-archive`
//! feature as a reference implementation, so the engine has at least one
//! concrete, testable reader without forcing `tar`/`flate2` on every
//! consumer.
//!
//! Policy knobs ([options::Options]) -- whether to pull in `Recommends:`,
//! whether to configure packages as they unpack rather than at the end,
//! whether a missing checksum blocks installation -- are threaded
//! explicitly through the solver and transaction engine rather than held
//! in global state, so multiple destinations can be driven concurrently
//! from the same process.
//!
//! # Feature Flags
//!
//! | Flag              | Description                                                        |
//! | ------------------ | ------------------------------------------------------------------ |
//! | `builtin-archive`  | Enable [archive::TarGzArchiveReader], a tar+gzip [archive::ArchiveReader]. |

pub mod architecture;
pub mod archive;
pub mod checksum;
pub mod control;
pub mod dependency;
pub mod destination;
pub mod errors;
pub mod fetch;
pub mod fileindex;
pub mod index;
pub mod lock;
pub mod options;
pub mod script;
pub mod solver;
pub mod state;
pub mod status;
pub mod transaction;
pub mod verify;
pub mod version;

// vim: foldmethod=marker
