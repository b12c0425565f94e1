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

//! An install destination: a named root plus its info directory. Multiple
//! destinations may coexist on one host; a package belongs to exactly one.

use std::path::PathBuf;

/// One of the four maintainer scripts a package may carry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScriptKind {
    /// Runs before unpack.
    PreInst,
    /// Runs after unpack, to bring the package to `installed`.
    PostInst,
    /// Runs before removal.
    PreRm,
    /// Runs after removal.
    PostRm,
}

impl ScriptKind {
    fn extension(self) -> &'static str {
        match self {
            ScriptKind::PreInst => "preinst",
            ScriptKind::PostInst => "postinst",
            ScriptKind::PreRm => "prerm",
            ScriptKind::PostRm => "postrm",
        }
    }
}

/// A named install root: where packages actually land (`root_dir`) and
/// where this crate's own bookkeeping lives (`info_dir`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Destination {
    /// Where unpacked package files are written.
    pub root_dir: PathBuf,
    /// Where `<pkg>.control`, `<pkg>.list`, maintainer scripts, and the
    /// canonical `status` file live.
    pub info_dir: PathBuf,
    /// Override for the canonical status file path. Defaults to
    /// `info_dir/status` when unset.
    pub status_file: Option<PathBuf>,
}

impl Destination {
    /// Build a destination rooted at `root_dir`, with its info directory at
    /// the conventional `root_dir/var/lib/pkgroot` location.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        let root_dir = root_dir.into();
        let info_dir = root_dir.join("var/lib/pkgroot");
        Destination {
            root_dir,
            info_dir,
            status_file: None,
        }
    }

    /// The canonical persistent status file.
    pub fn status_path(&self) -> PathBuf {
        self.status_file
            .clone()
            .unwrap_or_else(|| self.info_dir.join("status"))
    }

    /// `<pkg>.control` -- the upstream control file.
    pub fn control_path(&self, pkg: &str) -> PathBuf {
        self.info_dir.join(format!("{pkg}.control"))
    }

    /// `<pkg>.list` -- owned files, one TSV record per line.
    pub fn list_path(&self, pkg: &str) -> PathBuf {
        self.info_dir.join(format!("{pkg}.list"))
    }

    /// `<pkg>.conffiles` -- conffile paths.
    pub fn conffiles_path(&self, pkg: &str) -> PathBuf {
        self.info_dir.join(format!("{pkg}.conffiles"))
    }

    /// `<pkg>.md5sums`.
    pub fn md5sums_path(&self, pkg: &str) -> PathBuf {
        self.info_dir.join(format!("{pkg}.md5sums"))
    }

    /// `<pkg>.preinst`/`.postinst`/`.prerm`/`.postrm`.
    pub fn script_path(&self, pkg: &str, kind: ScriptKind) -> PathBuf {
        self.info_dir.join(format!("{pkg}.{}", kind.extension()))
    }

    /// The advisory lock file path for this destination.
    pub fn lock_path(&self) -> PathBuf {
        self.info_dir.join("lock")
    }
}


// vim: foldmethod=marker
