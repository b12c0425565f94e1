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

//! Advisory per-destination locking: exactly one transaction may
//! run per install destination at a time.
//!
//! The lock is a plain exclusively-created file holding the current pid,
//! not an `flock(2)` hold -- this crate has no platform-locking dependency
//! to reach for, and `create_new` gives us the same exclusion for
//! cooperating instances of this crate. [Drop] removes the file on every
//! normal exit path, including an early return via `?`; a process killed
//! with `SIGKILL` leaves it behind for an operator to clear by hand.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

/// Error conditions acquiring the destination lock.
#[derive(Debug)]
pub enum Error {
    /// Another instance already holds the lock.
    Held {
        /// The pid recorded in the lock file, if it could be read.
        pid: Option<u32>,
    },
    /// The lock file or its directory couldn't be read or written.
    Io(io::Error),
}
crate::errors::error_enum!(Error);

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

/// A held advisory lock. Dropping it releases the lock.
pub struct Lock {
    path: PathBuf,
}

/// Acquire the advisory lock at `path`, creating it if absent. Exactly one
/// transaction may run per install destination at a time.
pub fn acquire(path: &Path) -> Result<Lock, Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    match File::options().write(true).create_new(true).open(path) {
        Ok(mut f) => {
            use std::io::Write;
            write!(f, "{}", std::process::id())?;
            tracing::debug!(path = %path.display(), "lock acquired");
            Ok(Lock {
                path: path.to_owned(),
            })
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            let pid = fs::read_to_string(path)
                .ok()
                .and_then(|s| s.trim().parse().ok());
            Err(Error::Held { pid })
        }
        Err(e) => Err(e.into()),
    }
}

impl Lock {
    /// Release the lock explicitly. Equivalent to dropping it.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for Lock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(error = %e, path = %self.path.display(), "failed to remove lock file");
        } else {
            tracing::debug!(path = %self.path.display(), "lock released");
        }
    }
}


// vim: foldmethod=marker
