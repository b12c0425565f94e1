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

//! Maintainer-script invocation: `/bin/sh -c "<script> <args>"` with
//! `PKG_ROOT` set to the destination's root directory. A script absent from
//! disk is a success; a non-zero exit is reported to the caller, which maps
//! it to the appropriate half-state.

use std::path::Path;
use std::process::Command;

/// Errors invoking a maintainer script, distinct from the script itself
/// exiting non-zero (which is reported via [Outcome::Failed], not an
/// [Error]).
#[derive(Debug)]
pub enum Error {
    /// The shell couldn't be spawned at all.
    Spawn(std::io::Error),
}
crate::errors::error_enum!(Error);

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Spawn(e)
    }
}

/// The result of attempting to run a maintainer script.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The script doesn't exist on disk; treated as success.
    Absent,
    /// The script ran and exited zero.
    Succeeded,
    /// The script ran and exited non-zero.
    Failed {
        /// The process exit code, if the platform reported one (a script
        /// killed by a signal has none).
        code: Option<i32>,
    },
}

/// Run `script_path` with `args`, if it exists, under `/bin/sh -c`, with
/// `PKG_ROOT` set to `root_dir`.
pub fn run(script_path: &Path, args: &[&str], root_dir: &Path) -> Result<Outcome, Error> {
    if !script_path.exists() {
        return Ok(Outcome::Absent);
    }

    let mut command_line = script_path.display().to_string();
    for arg in args {
        command_line.push(' ');
        command_line.push_str(arg);
    }

    tracing::debug!(script = %script_path.display(), "running maintainer script");

    let status = Command::new("/bin/sh")
        .arg("-c")
        .arg(command_line)
        .env("PKG_ROOT", root_dir)
        .status()?;

    if status.success() {
        Ok(Outcome::Succeeded)
    } else {
        Ok(Outcome::Failed {
            code: status.code(),
        })
    }
}


// vim: foldmethod=marker
