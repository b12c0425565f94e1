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

//! Archive extraction is an external collaborator: this crate
//! names the interface the transaction engine unpacks through, but does not
//! implement the real Debian `.deb` (ar + tar + compression) format.
//!
//! Behind the `builtin-archive` feature, [TarGzArchiveReader] provides one
//! concrete, testable implementation for a plain `tar.gz`, so the
//! transaction engine has something real to exercise in tests without
//! pretending to be a full `.deb` reader.

use std::path::{Path, PathBuf};

/// Extracts a package archive into a destination directory, reporting the
/// paths it wrote (so the caller can register them with
/// [crate::fileindex::FileIndex]).
pub trait ArchiveReader {
    /// The error type this reader reports.
    type Error: std::error::Error + 'static;

    /// Extract `archive_path` under `dest_dir`, returning the absolute
    /// paths of every regular file and symlink it wrote.
    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>, Self::Error>;
}

/// [ArchiveReader] for a plain (non-`.deb`) `tar.gz`, built on the same
/// `tar`+`flate2` stack used elsewhere in the retrieval pack for archive
/// handling.
#[cfg(feature = "builtin-archive")]
pub struct TarGzArchiveReader;

#[cfg(feature = "builtin-archive")]
impl ArchiveReader for TarGzArchiveReader {
    type Error = std::io::Error;

    fn extract(&self, archive_path: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>, Self::Error> {
        use flate2::read::GzDecoder;
        use std::fs::File;
        use tar::Archive;

        std::fs::create_dir_all(dest_dir)?;

        let file = File::open(archive_path)?;
        let mut archive = Archive::new(GzDecoder::new(file));

        let mut written = vec![];
        for entry in archive.entries()? {
            let mut entry = entry?;
            let relative = entry.path()?.into_owned();
            entry.unpack_in(dest_dir)?;
            written.push(dest_dir.join(relative));
        }

        tracing::debug!(
            archive = %archive_path.display(),
            dest = %dest_dir.display(),
            files = written.len(),
            "extracted archive"
        );
        Ok(written)
    }
}


// vim: foldmethod=marker
