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

//! Policy knobs threaded explicitly through the solver and transaction
//! engine, instead of living in process-wide global state: each call site
//! takes a context object rather than reaching for a global. Loading these
//! from a config file or CLI flags is outside this crate.

use std::path::PathBuf;

/// Explicit policy context, passed by reference into [crate::solver] and
/// [crate::transaction].
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Options {
    /// Enqueue `Recommends:` possibilities as if they were `Depends:`. Off
    /// by default; `Suggests:` is never enqueued regardless of this flag.
    pub add_recommends: bool,

    /// Run `postinst` immediately after each package unpacks, rather than
    /// waiting for every unpack in the plan to finish first.
    pub configure_on_unpack: bool,

    /// Proceed with installation even if a package has neither
    /// `SHA256sum:` nor `MD5sum:` set.
    pub force_checksum: bool,

    /// Allow the solver to schedule actions that violate a dependency or
    /// conflict it could not resolve normally.
    pub force_depends: bool,

    /// When set, every path this process touches is staged under this
    /// directory rather than the live filesystem root.
    pub offline_root: Option<PathBuf>,
}

impl Options {
    /// Resolve `path` against [Options::offline_root]: the offline root is
    /// prefixed only when the stored path doesn't already start with it.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let Some(root) = &self.offline_root else {
            return PathBuf::from(path);
        };
        if PathBuf::from(path).starts_with(root) {
            return PathBuf::from(path);
        }
        let trimmed = path.trim_start_matches('/');
        root.join(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_permissive_of_nothing() {
        let opts = Options::default();
        assert!(!opts.add_recommends);
        assert!(!opts.force_checksum);
        assert!(opts.offline_root.is_none());
    }

    #[test]
    fn resolve_path_without_offline_root() {
        let opts = Options::default();
        assert_eq!(PathBuf::from("/etc/foo"), opts.resolve_path("/etc/foo"));
    }

    #[test]
    fn resolve_path_prefixes_offline_root() {
        let opts = Options {
            offline_root: Some(PathBuf::from("/tmp/stage")),
            ..Default::default()
        };
        assert_eq!(
            PathBuf::from("/tmp/stage/etc/foo"),
            opts.resolve_path("/etc/foo")
        );
    }

    #[test]
    fn resolve_path_is_idempotent_if_already_prefixed() {
        let opts = Options {
            offline_root: Some(PathBuf::from("/tmp/stage")),
            ..Default::default()
        };
        assert_eq!(
            PathBuf::from("/tmp/stage/etc/foo"),
            opts.resolve_path("/tmp/stage/etc/foo")
        );
    }
}

// vim: foldmethod=marker
