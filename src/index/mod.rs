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

//! The package index: two hash tables over an arena of concrete packages.
//!
//! Concrete and abstract packages reference each other heavily; rather than
//! let that form an ownership cycle, both are stored in flat arenas (`Vec`)
//! and refer to each other by stable [PackageId]/[AbstractId] indices, with
//! no reference counting.

use crate::control::Package;
use crate::dependency::{CompoundDepend, DepKind, Possibility};
use rustc_hash::FxHashMap;

/// A stable reference to a concrete [Package] stored in a [PackageIndex].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PackageId(usize);

/// A stable reference to an [AbstractPackage] stored in a [PackageIndex].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AbstractId(usize);

/// A name shared by potentially many concrete versions and providers.
#[derive(Clone, Debug, Default)]
pub struct AbstractPackage {
    /// The abstract name itself.
    pub name: String,
    /// Concrete packages whose `Provides:` list (or own name) covers this
    /// abstract name. A package's self-entry is always pushed first.
    pub providers: Vec<PackageId>,
    /// Concrete packages with an unmet possibility naming this abstract
    /// package.
    pub dependants: Vec<PackageId>,
    /// Whether [PackageIndex::ensure_dependencies_checked] has already
    /// walked every current provider's dependency fields for this name.
    /// Adding a new provider after the fact clears this (see
    /// [PackageIndex::insert]).
    pub dependencies_checked: bool,
}

impl AbstractPackage {
    fn new(name: &str) -> Self {
        AbstractPackage {
            name: name.to_owned(),
            providers: vec![],
            dependants: vec![],
            dependencies_checked: false,
        }
    }
}

/// Errors raised while expanding a package's raw dependency fields.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// A `Depends:`-shaped field failed to parse.
    Dependency(crate::dependency::Error),
}
crate::errors::error_enum!(Error);

impl From<crate::dependency::Error> for Error {
    fn from(e: crate::dependency::Error) -> Self {
        Error::Dependency(e)
    }
}

/// The package database: every known concrete package version, keyed both
/// by its own name and by the abstract names it provides or depends upon.
#[derive(Default)]
pub struct PackageIndex {
    packages: Vec<Package>,
    pkg_hash: FxHashMap<String, Vec<PackageId>>,
    abstracts: Vec<AbstractPackage>,
    abstract_hash: FxHashMap<String, AbstractId>,
}

impl PackageIndex {
    /// Build an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a concrete package by id.
    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.0]
    }

    /// Look up a concrete package by id, mutably -- used by the transaction
    /// engine to advance a package's [crate::state::State] as it moves
    /// through the install state machine.
    pub fn package_mut(&mut self, id: PackageId) -> &mut Package {
        &mut self.packages[id.0]
    }

    /// Every concrete package currently known to the index, in insertion
    /// order. Used to persist the status database and to scan for
    /// interrupted transactions at startup.
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// Every concrete package paired with its id, in insertion order. Used
    /// by the transaction engine to find packages left in a half-state by a
    /// prior crash without exposing [PackageId]'s internals.
    pub fn iter(&self) -> impl Iterator<Item = (PackageId, &Package)> {
        self.packages
            .iter()
            .enumerate()
            .map(|(i, pkg)| (PackageId(i), pkg))
    }

    /// Look up an abstract package by id.
    pub fn abstract_package(&self, id: AbstractId) -> &AbstractPackage {
        &self.abstracts[id.0]
    }

    /// All concrete packages registered under `name`, in insertion order
    /// (callers wanting the solver's version/arch-priority ranking should
    /// sort via [crate::solver]; insertion order here is intentionally
    /// unsorted -- sorting is lazy).
    pub fn packages_named(&self, name: &str) -> &[PackageId] {
        self.pkg_hash.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Find (or create) the abstract package for `name`.
    pub fn ensure_abstract(&mut self, name: &str) -> AbstractId {
        if let Some(id) = self.abstract_hash.get(name) {
            return *id;
        }
        let id = AbstractId(self.abstracts.len());
        self.abstracts.push(AbstractPackage::new(name));
        self.abstract_hash.insert(name.to_owned(), id);
        id
    }

    /// Look up an abstract package by name, if it's been seen.
    pub fn find_abstract(&self, name: &str) -> Option<AbstractId> {
        self.abstract_hash.get(name).copied()
    }

    fn identity_matches(existing: &Package, new: &Package) -> bool {
        existing.name == new.name
            && existing.version == new.version
            && existing.architecture == new.architecture
            && existing.source == new.source
    }

    /// Apply the merge rule to fold `new` into `existing`: for each scalar
    /// field keep the existing value if non-empty, else
    /// take the new one; dependency arrays, `provides`, `conffiles`,
    /// `userfields` and `installed_files`-equivalents favour whichever side
    /// already has real content.
    fn merge(existing: &mut Package, new: Package) {
        macro_rules! keep_existing_if_some {
            ($field:ident) => {
                if existing.$field.is_none() {
                    existing.$field = new.$field;
                }
            };
        }
        keep_existing_if_some!(maintainer);
        keep_existing_if_some!(section);
        keep_existing_if_some!(description);
        keep_existing_if_some!(priority);
        keep_existing_if_some!(installed_size);
        keep_existing_if_some!(download_size);
        keep_existing_if_some!(md5);
        keep_existing_if_some!(sha256);
        keep_existing_if_some!(installed_time);
        keep_existing_if_some!(filename);

        let existing_has_deps = !existing.depends.is_empty()
            || !existing.pre_depends.is_empty()
            || !existing.recommends.is_empty()
            || !existing.suggests.is_empty();
        if !existing_has_deps {
            existing.depends = new.depends;
            existing.pre_depends = new.pre_depends;
            existing.recommends = new.recommends;
            existing.suggests = new.suggests;
        }
        if existing.conflicts.is_empty() {
            existing.conflicts = new.conflicts;
        }
        if existing.replaces.is_empty() {
            existing.replaces = new.replaces;
        }
        if existing.provides.trim().is_empty() {
            existing.provides = new.provides;
        }
        if existing.conffiles.is_empty() {
            existing.conffiles = new.conffiles;
        }
        if existing.userfields.is_empty() {
            existing.userfields = new.userfields;
        }
        if existing.tags.is_empty() {
            existing.tags = new.tags;
        }
    }

    /// Insert a parsed [Package] into the index, deduplicating by
    /// `(name, version, architecture, source)` identity and applying the
    /// merge rule on collision. Returns the stable id either way.
    pub fn insert(&mut self, package: Package) -> PackageId {
        if let Some(existing_ids) = self.pkg_hash.get(&package.name) {
            if let Some(&id) = existing_ids
                .iter()
                .find(|&&id| Self::identity_matches(&self.packages[id.0], &package))
            {
                Self::merge(&mut self.packages[id.0], package);
                return id;
            }
        }

        let id = PackageId(self.packages.len());
        self.pkg_hash
            .entry(package.name.clone())
            .or_default()
            .push(id);

        let self_abstract = self.ensure_abstract(&package.name.clone());
        self.abstracts[self_abstract.0].providers.push(id);
        self.abstracts[self_abstract.0].dependencies_checked = false;

        self.packages.push(package);
        id
    }

    fn register_provides(&mut self, id: PackageId) -> Result<(), Error> {
        let provides_field = self.packages[id.0].provides.clone();
        for item in provides_field.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let possibility = Possibility::parse(item)?;
            let abstract_id = self.ensure_abstract(&possibility.name);
            if !self.abstracts[abstract_id.0].providers.contains(&id) {
                self.abstracts[abstract_id.0].providers.push(id);
            }
        }
        Ok(())
    }

    fn register_relation(&mut self, id: PackageId, kind: DepKind, field: &str) -> Result<(), Error> {
        let compounds = CompoundDepend::parse_field(kind, field)?;
        for compound in compounds {
            for possibility in &compound.possibilities {
                let abstract_id = self.ensure_abstract(&possibility.name);
                if !self.abstracts[abstract_id.0].dependants.contains(&id) {
                    self.abstracts[abstract_id.0].dependants.push(id);
                }
            }
        }
        Ok(())
    }

    /// Lazily expand every provider of the abstract package named `name`
    /// into the dependant graph. The resolver runs lazily per abstract
    /// package, guarded by `dependencies_checked`; a no-op if already
    /// expanded and no provider has been added since.
    pub fn ensure_dependencies_checked(&mut self, name: &str) -> Result<(), Error> {
        let abstract_id = self.ensure_abstract(name);
        if self.abstracts[abstract_id.0].dependencies_checked {
            return Ok(());
        }

        let providers = self.abstracts[abstract_id.0].providers.clone();
        for provider in providers {
            self.register_provides(provider)?;
            let pkg = self.packages[provider.0].clone();
            self.register_relation(provider, DepKind::PreDepend, &pkg.pre_depends)?;
            self.register_relation(provider, DepKind::Depend, &pkg.depends)?;
            self.register_relation(provider, DepKind::Recommend, &pkg.recommends)?;
            self.register_relation(provider, DepKind::Suggest, &pkg.suggests)?;
            self.register_relation(provider, DepKind::Conflict, &pkg.conflicts)?;
            self.register_relation(provider, DepKind::Replace, &pkg.replaces)?;
        }

        self.abstracts[abstract_id.0].dependencies_checked = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::RawParagraph;

    fn pkg(text: &str) -> Package {
        let (paragraphs, errors) = RawParagraph::parse_stream(text);
        assert!(errors.is_empty(), "{errors:?}");
        Package::try_from(&paragraphs[0]).unwrap()
    }

    #[test]
    fn insert_registers_self_provider() {
        let mut idx = PackageIndex::new();
        let id = idx.insert(pkg("Package: foo\nVersion: 1.0-1\n"));
        let abs = idx.find_abstract("foo").unwrap();
        assert_eq!(vec![id], idx.abstract_package(abs).providers);
    }

    #[test]
    fn insert_merges_on_identity_collision() {
        let mut idx = PackageIndex::new();
        let id1 = idx.insert(pkg("Package: foo\nVersion: 1.0-1\nMaintainer: a\n"));
        let id2 = idx.insert(pkg("Package: foo\nVersion: 1.0-1\nSection: libs\n"));
        assert_eq!(id1, id2);
        let merged = idx.package(id1);
        assert_eq!(Some("a".to_owned()), merged.maintainer);
        assert_eq!(Some("libs".to_owned()), merged.section);
    }

    #[test]
    fn insert_keeps_existing_scalar_on_collision() {
        let mut idx = PackageIndex::new();
        let id = idx.insert(pkg("Package: foo\nVersion: 1.0-1\nMaintainer: a\n"));
        idx.insert(pkg("Package: foo\nVersion: 1.0-1\nMaintainer: b\n"));
        assert_eq!(Some("a".to_owned()), idx.package(id).maintainer);
    }

    #[test]
    fn different_versions_are_distinct_entries() {
        let mut idx = PackageIndex::new();
        let id1 = idx.insert(pkg("Package: foo\nVersion: 1.0-1\n"));
        let id2 = idx.insert(pkg("Package: foo\nVersion: 2.0-1\n"));
        assert_ne!(id1, id2);
        assert_eq!(2, idx.packages_named("foo").len());
    }

    #[test]
    fn dependency_expansion_registers_dependants() {
        let mut idx = PackageIndex::new();
        idx.insert(pkg("Package: foo\nVersion: 1.0-1\nDepends: bar (>= 1.0)\n"));
        idx.ensure_dependencies_checked("foo").unwrap();
        let bar = idx.find_abstract("bar").unwrap();
        assert_eq!(1, idx.abstract_package(bar).dependants.len());
    }

    #[test]
    fn provides_registers_additional_provider() {
        let mut idx = PackageIndex::new();
        let id = idx.insert(pkg("Package: foo\nVersion: 1.0-1\nProvides: virtual-foo\n"));
        idx.ensure_dependencies_checked("foo").unwrap();
        let abs = idx.find_abstract("virtual-foo").unwrap();
        assert_eq!(vec![id], idx.abstract_package(abs).providers);
    }

    #[test]
    fn forward_reference_creates_empty_abstract() {
        let mut idx = PackageIndex::new();
        idx.insert(pkg("Package: foo\nVersion: 1.0-1\nDepends: not-yet-seen\n"));
        idx.ensure_dependencies_checked("foo").unwrap();
        let abs = idx.find_abstract("not-yet-seen").unwrap();
        assert!(idx.abstract_package(abs).providers.is_empty());
    }
}

// vim: foldmethod=marker
