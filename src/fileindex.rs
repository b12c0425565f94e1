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

//! The file-ownership index: a flat, process-wide map from absolute path to
//! owning package.

use crate::index::PackageId;
use rustc_hash::FxHashMap;

/// Raised when an unpack would claim a path another package already owns.
#[derive(Clone, Debug, PartialEq)]
pub struct Conflict {
    /// The path both packages claim.
    pub path: String,
    /// The package that already owns it.
    pub owner: PackageId,
    /// The package trying to claim it.
    pub claimant: PackageId,
}
crate::errors::error_enum!(Conflict);

/// Path to owning-package map. Rebuilt from on-disk `.list` files at
/// startup and never itself persisted.
#[derive(Default)]
pub struct FileIndex {
    owners: FxHashMap<String, PackageId>,
}

impl FileIndex {
    /// Build an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// The package that currently owns `path`, if any.
    pub fn owner(&self, path: &str) -> Option<PackageId> {
        self.owners.get(path).copied()
    }

    /// Claim `path` for `owner`. `replaces` lists the package ids that
    /// `owner`'s `Replaces:` field permits it to take over: a collision is
    /// reported as a conflict unless the new package's `Replaces:` covers
    /// the old owner.
    pub fn claim(
        &mut self,
        path: &str,
        owner: PackageId,
        replaces: &[PackageId],
    ) -> Result<(), Conflict> {
        if let Some(&existing) = self.owners.get(path) {
            if existing != owner && !replaces.contains(&existing) {
                return Err(Conflict {
                    path: path.to_owned(),
                    owner: existing,
                    claimant: owner,
                });
            }
        }
        self.owners.insert(path.to_owned(), owner);
        Ok(())
    }

    /// Drop every path owned by `package`: on remove, entries owned by the
    /// departing package are erased.
    pub fn release_all(&mut self, package: PackageId) {
        self.owners.retain(|_, owner| *owner != package);
    }

    /// All paths currently owned by `package`, for writing a fresh `.list`
    /// file.
    pub fn paths_owned_by(&self, package: PackageId) -> Vec<&str> {
        let mut paths: Vec<&str> = self
            .owners
            .iter()
            .filter(|(_, owner)| **owner == package)
            .map(|(path, _)| path.as_str())
            .collect();
        paths.sort_unstable();
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // `PackageId` has no public constructor outside `index`; drive it
    // through a throwaway `PackageIndex` to get distinct ids to test with.
    fn two_ids() -> (PackageId, PackageId) {
        let mut idx = crate::index::PackageIndex::new();
        let pkg = |n: &str| {
            crate::control::Package::try_from(
                &crate::control::RawParagraph::parse_stream(&format!(
                    "Package: {n}\nVersion: 1.0-1\n"
                ))
                .0[0],
            )
            .unwrap()
        };
        (idx.insert(pkg("a")), idx.insert(pkg("b")))
    }

    #[test]
    fn claim_then_owner() {
        let mut fi = FileIndex::new();
        let (pkg, _) = two_ids();
        fi.claim("/usr/bin/foo", pkg, &[]).unwrap();
        assert_eq!(Some(pkg), fi.owner("/usr/bin/foo"));
    }

    #[test]
    fn claim_conflict_without_replaces() {
        let mut fi = FileIndex::new();
        let (a, b) = two_ids();
        fi.claim("/usr/bin/foo", a, &[]).unwrap();
        assert!(fi.claim("/usr/bin/foo", b, &[]).is_err());
    }

    #[test]
    fn claim_allowed_when_replaces_covers_owner() {
        let mut fi = FileIndex::new();
        let (a, b) = two_ids();
        fi.claim("/usr/bin/foo", a, &[]).unwrap();
        fi.claim("/usr/bin/foo", b, &[a]).unwrap();
        assert_eq!(Some(b), fi.owner("/usr/bin/foo"));
    }

    #[test]
    fn release_all_drops_only_that_package() {
        let mut fi = FileIndex::new();
        let (a, b) = two_ids();
        fi.claim("/a", a, &[]).unwrap();
        fi.claim("/b", b, &[]).unwrap();
        fi.release_all(a);
        assert_eq!(None, fi.owner("/a"));
        assert_eq!(Some(b), fi.owner("/b"));
    }
}

// vim: foldmethod=marker
