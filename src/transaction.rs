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

//! The transaction engine: walks a [crate::solver::Plan],
//! carrying each package through the install state machine with the
//! crash-safe status-persistence protocol at every step.
//!
//! Every mutation follows the same shape: persist the tentative status,
//! then touch the filesystem, then persist the resulting status. A crash
//! between those two writes is recoverable -- [resume_interrupted] reads
//! whatever status made it to disk and carries the package the rest of the
//! way.

use crate::archive::ArchiveReader;
use crate::destination::{Destination, ScriptKind};
use crate::fetch::Fetcher;
use crate::fileindex::FileIndex;
use crate::index::{PackageId, PackageIndex};
use crate::options::Options;
use crate::script::{self, Outcome};
use crate::solver::{Op, Plan};
use crate::state::{Flag, State, Status, Want};
use crate::verify::{self, SignatureBackend};
use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

/// Errors raised while carrying a [Plan] out against a [Destination].
#[derive(Debug)]
pub enum Error {
    /// Reading or writing the status file failed.
    Status(crate::status::Error),
    /// Verification of a downloaded archive failed.
    Verify(verify::Error),
    /// A maintainer script couldn't be spawned.
    Script(crate::script::Error),
    /// Unpacking onto the filesystem failed.
    Io(std::io::Error),
    /// Two packages claimed the same path without a covering `Replaces:`.
    FileConflict(crate::fileindex::Conflict),
    /// The external fetcher failed to retrieve a package's archive.
    Fetch(Box<dyn std::error::Error>),
    /// The external archive reader failed to unpack a package.
    Archive(Box<dyn std::error::Error>),
    /// A maintainer script exited non-zero.
    ScriptFailed {
        /// Which package's script failed.
        package: String,
        /// Which script.
        kind: ScriptKind,
        /// Its exit code, if reported.
        code: Option<i32>,
    },
    /// An essential package was asked to be removed without `force_depends`.
    /// The solver already guards against this; this is a defence against a
    /// plan built under different [Options].
    EssentialRemoval {
        /// The essential package's name.
        package: String,
    },
}
crate::errors::error_enum!(Error);

impl From<crate::status::Error> for Error {
    fn from(e: crate::status::Error) -> Self {
        Error::Status(e)
    }
}
impl From<verify::Error> for Error {
    fn from(e: verify::Error) -> Self {
        Error::Verify(e)
    }
}
impl From<crate::script::Error> for Error {
    fn from(e: crate::script::Error) -> Self {
        Error::Script(e)
    }
}
impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
impl From<crate::fileindex::Conflict> for Error {
    fn from(e: crate::fileindex::Conflict) -> Self {
        Error::FileConflict(e)
    }
}

/// Top-level failure of a full `resolve + run` cycle, used to compute the
/// process exit code.
#[derive(Debug)]
pub enum RunError {
    /// Another transaction already holds the destination lock.
    Lock(crate::lock::Error),
    /// The solver couldn't produce a plan.
    Solve(crate::solver::Error),
    /// The transaction engine failed partway through carrying out the plan.
    Transaction(Error),
}
crate::errors::error_enum!(RunError);

/// Map a [RunError] (or success) to the process exit code this crate
/// documents: `0` success, `1` generic failure, `2` lock held, `3`
/// dependency unresolvable, `4` verification failed.
pub fn exit_code(result: &Result<(), RunError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(RunError::Lock(_)) => 2,
        Err(RunError::Solve(_)) => 3,
        Err(RunError::Transaction(Error::Verify(_))) => 4,
        Err(RunError::Transaction(_)) => 1,
    }
}

fn persist_status(destination: &Destination, index: &PackageIndex) -> Result<(), Error> {
    crate::status::write_atomic(&destination.status_path(), index.packages())?;
    Ok(())
}

fn set_status(index: &mut PackageIndex, id: PackageId, status: Status) {
    let pkg = index.package_mut(id);
    pkg.state = State {
        want: pkg.state.want,
        flags: pkg.state.flags,
        status,
    };
}

fn set_want_and_status(index: &mut PackageIndex, id: PackageId, want: Want, status: Status) {
    let pkg = index.package_mut(id);
    pkg.state = State {
        want,
        flags: pkg.state.flags,
        status,
    };
}

/// Carries a [Plan] out against one [Destination] using external
/// collaborators for fetching, archive extraction, and (optionally)
/// signature verification.
pub struct Transaction<'a, F, A, S> {
    destination: &'a Destination,
    options: &'a Options,
    fetcher: &'a F,
    archive: &'a A,
    signatures: Option<&'a S>,
}

impl<'a, F, A, S> Transaction<'a, F, A, S>
where
    F: Fetcher,
    A: ArchiveReader,
    S: SignatureBackend,
{
    /// Build a transaction engine bound to one destination and one set of
    /// external collaborators.
    pub fn new(
        destination: &'a Destination,
        options: &'a Options,
        fetcher: &'a F,
        archive: &'a A,
        signatures: Option<&'a S>,
    ) -> Self {
        Transaction {
            destination,
            options,
            fetcher,
            archive,
            signatures,
        }
    }

    fn cache_path(&self, filename: &str) -> PathBuf {
        self.options
            .resolve_path(&self.destination.info_dir.join("cache").join(filename).to_string_lossy())
    }

    /// The destination's root, staged under `options.offline_root` when
    /// set: every path this process touches is staged under that directory
    /// rather than the live filesystem root.
    fn root_dir(&self) -> PathBuf {
        self.options
            .resolve_path(&self.destination.root_dir.to_string_lossy())
    }

    /// Carry out every action in `plan`, in order.
    pub fn run(&self, index: &mut PackageIndex, file_index: &mut FileIndex, plan: &Plan) -> Result<(), Error> {
        for action in &plan.actions {
            match action.op {
                Op::Install => self.install(index, file_index, action.package)?,
                Op::Configure => self.configure(index, action.package)?,
                Op::Remove => self.remove(index, file_index, action.package)?,
                Op::Purge => self.purge(index, file_index, action.package)?,
            }
        }
        Ok(())
    }

    fn install(&self, index: &mut PackageIndex, file_index: &mut FileIndex, id: PackageId) -> Result<(), Error> {
        set_want_and_status(index, id, Want::Install, Status::HalfInstalled);
        persist_status(self.destination, index)?;

        let pkg = index.package(id).clone();
        let filename = pkg.filename.clone().unwrap_or_else(|| format!("{}.pkg", pkg.name));
        let local_path = self.cache_path(&filename);
        if let Some(parent) = local_path.parent() {
            fs::create_dir_all(parent)?;
        }

        self.fetcher
            .fetch(&filename, &local_path)
            .map_err(|e| Error::Fetch(Box::new(e)))?;
        verify::verify(&pkg, &local_path, self.options, self.signatures)?;

        let written = self
            .archive
            .extract(&local_path, &self.root_dir())
            .map_err(|e| Error::Archive(Box::new(e)))?;

        let replaces = crate::dependency::CompoundDepend::parse_field(
            crate::dependency::DepKind::Replace,
            &pkg.replaces,
        )
        .unwrap_or_default()
        .iter()
        .flat_map(|c| &c.possibilities)
        .filter_map(|p| index.find_abstract(&p.name))
        .flat_map(|a| index.abstract_package(a).providers.clone())
        .collect::<Vec<_>>();

        for path in &written {
            file_index.claim(&path.display().to_string(), id, &replaces)?;
        }

        self.write_file_list(&pkg.name, file_index, id)?;
        self.write_control(&pkg)?;
        self.write_conffiles(&pkg)?;
        self.write_md5sums(&pkg.name, &written)?;

        set_status(index, id, Status::Unpacked);
        persist_status(self.destination, index)?;
        Ok(())
    }

    fn write_file_list(&self, name: &str, file_index: &FileIndex, id: PackageId) -> Result<(), Error> {
        let mut out = String::new();
        for path in file_index.paths_owned_by(id) {
            let path = path.strip_suffix('/').unwrap_or(path);
            let mode = fs::metadata(path).map(|m| format!("{:o}", mode_bits(&m))).unwrap_or_else(|_| "0".to_owned());
            writeln!(out, "{path}\t{mode}").unwrap();
        }
        fs::write(self.destination.list_path(name), out)?;
        Ok(())
    }

    /// `<pkg>.control` -- the upstream control block, as it will be
    /// re-emitted into the canonical status file, since this crate keeps no
    /// separate unparsed copy of the control text the archive shipped.
    fn write_control(&self, pkg: &crate::control::Package) -> Result<(), Error> {
        let text = crate::status::serialize_package(pkg);
        fs::write(self.destination.control_path(&pkg.name), text)?;
        Ok(())
    }

    fn write_conffiles(&self, pkg: &crate::control::Package) -> Result<(), Error> {
        if pkg.conffiles.is_empty() {
            return Ok(());
        }
        let mut out = String::new();
        for conffile in &pkg.conffiles {
            writeln!(out, "{conffile}").unwrap();
        }
        fs::write(self.destination.conffiles_path(&pkg.name), out)?;
        Ok(())
    }

    /// `<pkg>.md5sums` -- one `<hex digest>  <path>` record per unpacked
    /// file, relative to `root_dir`. A file that can no longer be read (e.g.
    /// a broken symlink target) is skipped rather than aborting the install.
    fn write_md5sums(&self, name: &str, written: &[PathBuf]) -> Result<(), Error> {
        let root = self.root_dir();
        let mut out = String::new();
        for path in written {
            let Ok(digest) = verify::md5_of(path) else {
                continue;
            };
            let relative = path.strip_prefix(&root).unwrap_or(path);
            writeln!(out, "{digest}  {}", relative.display()).unwrap();
        }
        fs::write(self.destination.md5sums_path(name), out)?;
        Ok(())
    }

    fn run_script(&self, name: &str, kind: ScriptKind, args: &[&str]) -> Result<Outcome, Error> {
        let path = self.destination.script_path(name, kind);
        Ok(script::run(&path, args, &self.root_dir())?)
    }

    /// Run a removal-path script (`prerm`/`postrm`) and fail the package
    /// into [Status::RemovalFailed] on a non-zero exit, mirroring how
    /// [Self::configure] handles a failed `postinst`.
    fn run_removal_script(
        &self,
        index: &mut PackageIndex,
        id: PackageId,
        name: &str,
        kind: ScriptKind,
        args: &[&str],
    ) -> Result<(), Error> {
        match self.run_script(name, kind, args)? {
            Outcome::Absent | Outcome::Succeeded => Ok(()),
            Outcome::Failed { code } => {
                let pkg = index.package_mut(id);
                pkg.state.flags = pkg.state.flags.with(Flag::ReinstReq);
                pkg.state.status = Status::RemovalFailed;
                persist_status(self.destination, index)?;
                Err(Error::ScriptFailed {
                    package: name.to_owned(),
                    kind,
                    code,
                })
            }
        }
    }

    fn configure(&self, index: &mut PackageIndex, id: PackageId) -> Result<(), Error> {
        set_status(index, id, Status::HalfConfigured);
        persist_status(self.destination, index)?;

        let name = index.package(id).name.clone();
        match self.run_script(&name, ScriptKind::PostInst, &["configure"])? {
            Outcome::Absent | Outcome::Succeeded => {
                set_status(index, id, Status::Installed);
            }
            Outcome::Failed { code } => {
                let pkg = index.package_mut(id);
                pkg.state.flags = pkg.state.flags.with(Flag::ReinstReq);
                pkg.state.status = Status::PostInstFailed;
                persist_status(self.destination, index)?;
                return Err(Error::ScriptFailed {
                    package: name,
                    kind: ScriptKind::PostInst,
                    code,
                });
            }
        }
        persist_status(self.destination, index)?;
        Ok(())
    }

    fn remove(&self, index: &mut PackageIndex, file_index: &mut FileIndex, id: PackageId) -> Result<(), Error> {
        if index.package(id).essential && !self.options.force_depends {
            return Err(Error::EssentialRemoval {
                package: index.package(id).name.clone(),
            });
        }

        let name = index.package(id).name.clone();
        self.run_removal_script(index, id, &name, ScriptKind::PreRm, &["remove"])?;

        let conffiles: std::collections::HashSet<String> = index
            .package(id)
            .conffiles
            .iter()
            .map(|c| self.options.resolve_path(c).display().to_string())
            .collect();
        for path in file_index.paths_owned_by(id) {
            if !conffiles.contains(path) {
                let _ = fs::remove_file(path);
            }
        }

        self.run_removal_script(index, id, &name, ScriptKind::PostRm, &["remove"])?;

        file_index.release_all(id);
        let _ = fs::remove_file(self.destination.list_path(&name));
        set_want_and_status(index, id, Want::Deinstall, Status::ConfigFiles);
        persist_status(self.destination, index)?;
        Ok(())
    }

    fn purge(&self, index: &mut PackageIndex, file_index: &mut FileIndex, id: PackageId) -> Result<(), Error> {
        let name = index.package(id).name.clone();
        if index.package(id).state.status != Status::ConfigFiles {
            self.remove(index, file_index, id)?;
        }

        self.run_removal_script(index, id, &name, ScriptKind::PostRm, &["purge"])?;
        for conffile in index.package(id).conffiles.clone() {
            let _ = fs::remove_file(self.options.resolve_path(&conffile));
        }
        let _ = fs::remove_file(self.destination.conffiles_path(&name));
        set_want_and_status(index, id, Want::Purge, Status::NotInstalled);
        persist_status(self.destination, index)?;
        Ok(())
    }

    /// Resume every package left in a half-state by a prior crash: a
    /// restart reads the persisted status and resumes the interrupted
    /// phase. `half-installed` re-runs the unpack from scratch;
    /// `half-configured` re-runs `postinst`; `post-inst-failed` stays
    /// sticky until the user retries or removes (so it's skipped here).
    pub fn resume_interrupted(&self, index: &mut PackageIndex, file_index: &mut FileIndex) -> Result<(), Error> {
        let half_installed: Vec<PackageId> = index
            .iter()
            .filter(|(_, p)| p.state.status == Status::HalfInstalled)
            .map(|(id, _)| id)
            .collect();
        for id in half_installed {
            self.install(index, file_index, id)?;
            self.configure(index, id)?;
        }

        let half_configured: Vec<PackageId> = index
            .iter()
            .filter(|(_, p)| p.state.status == Status::HalfConfigured)
            .map(|(id, _)| id)
            .collect();
        for id in half_configured {
            self.configure(index, id)?;
        }

        Ok(())
    }
}

#[cfg(unix)]
fn mode_bits(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode()
}

#[cfg(not(unix))]
fn mode_bits(_metadata: &fs::Metadata) -> u32 {
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{Package, RawParagraph};
    use std::collections::HashMap;

    fn pkg(text: &str) -> Package {
        let (paragraphs, errors) = RawParagraph::parse_stream(text);
        assert!(errors.is_empty());
        Package::try_from(&paragraphs[0]).unwrap()
    }

    struct FakeFetcher(HashMap<&'static str, &'static [u8]>);
    impl Fetcher for FakeFetcher {
        type Error = std::io::Error;
        fn fetch(&self, filename: &str, dest_path: &std::path::Path) -> Result<(), Self::Error> {
            let contents = self
                .0
                .get(filename)
                .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, filename.to_owned()))?;
            fs::write(dest_path, contents)
        }
    }

    struct FakeArchive;
    impl ArchiveReader for FakeArchive {
        type Error = std::io::Error;
        fn extract(&self, _archive_path: &std::path::Path, dest_dir: &std::path::Path) -> Result<Vec<PathBuf>, Self::Error> {
            fs::create_dir_all(dest_dir)?;
            let written = dest_dir.join("usr/bin/hello");
            fs::create_dir_all(written.parent().unwrap())?;
            fs::write(&written, b"hi")?;
            Ok(vec![written])
        }
    }

    struct NoSignatures;
    impl SignatureBackend for NoSignatures {
        type Error = std::io::Error;
        fn verify(&self, _: &std::path::Path, _: &std::path::Path) -> Result<bool, Self::Error> {
            unreachable!()
        }
    }

    #[test]
    fn install_then_configure_reaches_installed() {
        let dir = tempfile::tempdir().unwrap();
        let destination = Destination::new(dir.path());
        fs::create_dir_all(&destination.info_dir).unwrap();

        let mut index = PackageIndex::new();
        let id = index.insert(pkg("Package: foo\nVersion: 1.0\nFilename: foo.pkg\n"));

        let mut map = HashMap::new();
        map.insert("foo.pkg", b"archive-bytes".as_slice());
        let fetcher = FakeFetcher(map);
        let archive = FakeArchive;
        let options = Options::default();
        let txn = Transaction::new(&destination, &options, &fetcher, &archive, None::<&NoSignatures>);

        let mut file_index = FileIndex::new();
        txn.install(&mut index, &mut file_index, id).unwrap();
        assert_eq!(Status::Unpacked, index.package(id).state.status);

        txn.configure(&mut index, id).unwrap();
        assert_eq!(Status::Installed, index.package(id).state.status);
        assert!(destination.status_path().exists());
    }

    #[test]
    fn install_writes_info_directory_files() {
        let dir = tempfile::tempdir().unwrap();
        let destination = Destination::new(dir.path());
        fs::create_dir_all(&destination.info_dir).unwrap();

        let mut index = PackageIndex::new();
        let id = index.insert(pkg(
            "Package: foo\nVersion: 1.0\nFilename: foo.pkg\nConffiles:\n /etc/foo.conf\n",
        ));

        let mut map = HashMap::new();
        map.insert("foo.pkg", b"archive-bytes".as_slice());
        let fetcher = FakeFetcher(map);
        let archive = FakeArchive;
        let options = Options::default();
        let txn = Transaction::new(&destination, &options, &fetcher, &archive, None::<&NoSignatures>);

        let mut file_index = FileIndex::new();
        txn.install(&mut index, &mut file_index, id).unwrap();

        assert!(destination.control_path("foo").exists());
        assert!(destination.conffiles_path("foo").exists());
        let conffiles = fs::read_to_string(destination.conffiles_path("foo")).unwrap();
        assert!(conffiles.contains("/etc/foo.conf"));

        let md5sums = fs::read_to_string(destination.md5sums_path("foo")).unwrap();
        assert!(md5sums.contains("usr/bin/hello"));
        assert_eq!(32 + 2 + "usr/bin/hello".len() + 1, md5sums.len());
    }

    #[test]
    fn remove_transitions_to_config_files() {
        let dir = tempfile::tempdir().unwrap();
        let destination = Destination::new(dir.path());
        fs::create_dir_all(&destination.info_dir).unwrap();

        let mut index = PackageIndex::new();
        let mut installed = pkg("Package: foo\nVersion: 1.0\n");
        installed.state.status = Status::Installed;
        let id = index.insert(installed);

        let mut file_index = FileIndex::new();
        let owned_path = dir.path().join("usr/bin/hello");
        fs::create_dir_all(owned_path.parent().unwrap()).unwrap();
        fs::write(&owned_path, b"hi").unwrap();
        file_index.claim(&owned_path.display().to_string(), id, &[]).unwrap();

        let fetcher = FakeFetcher(HashMap::new());
        let archive = FakeArchive;
        let options = Options::default();
        let txn = Transaction::new(&destination, &options, &fetcher, &archive, None::<&NoSignatures>);

        txn.remove(&mut index, &mut file_index, id).unwrap();
        assert_eq!(Status::ConfigFiles, index.package(id).state.status);
        assert!(!owned_path.exists());
    }

    #[test]
    fn remove_fails_when_prerm_script_exits_nonzero() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let destination = Destination::new(dir.path());
        fs::create_dir_all(&destination.info_dir).unwrap();

        let mut index = PackageIndex::new();
        let mut installed = pkg("Package: foo\nVersion: 1.0\n");
        installed.state.status = Status::Installed;
        let id = index.insert(installed);

        let script_path = destination.script_path("foo", ScriptKind::PreRm);
        fs::write(&script_path, "#!/bin/sh\nexit 5\n").unwrap();
        fs::set_permissions(&script_path, fs::Permissions::from_mode(0o755)).unwrap();

        let mut file_index = FileIndex::new();
        let fetcher = FakeFetcher(HashMap::new());
        let archive = FakeArchive;
        let options = Options::default();
        let txn = Transaction::new(&destination, &options, &fetcher, &archive, None::<&NoSignatures>);

        let err = txn.remove(&mut index, &mut file_index, id).unwrap_err();
        assert!(matches!(
            err,
            Error::ScriptFailed {
                kind: ScriptKind::PreRm,
                code: Some(5),
                ..
            }
        ));
        assert_eq!(Status::RemovalFailed, index.package(id).state.status);
        assert!(index.package(id).state.flags.contains(Flag::ReinstReq));
    }
}

// vim: foldmethod=marker
