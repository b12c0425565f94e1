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

//! Reading and writing the canonical `status` file, with a crash-safe
//! atomic-replace protocol.

use crate::control::{Package, RawParagraph};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io;
use std::path::Path;

/// Errors encountered loading or persisting the status database.
#[derive(Debug)]
pub enum Error {
    /// Reading or writing the status file failed.
    Io(io::Error),
    /// A record in the status file didn't parse into a [Package].
    Package(crate::control::package::Error),
}
crate::errors::error_enum!(Error);

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<crate::control::package::Error> for Error {
    fn from(e: crate::control::package::Error) -> Self {
        Error::Package(e)
    }
}

/// Load every package record from the status file at `path`. A missing
/// file is treated as an empty database -- the first run on a fresh
/// destination has nothing installed yet.
pub fn read(path: &Path) -> Result<Vec<Package>, Error> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(vec![]),
        Err(e) => return Err(e.into()),
    };

    let (paragraphs, parse_errors) = RawParagraph::parse_stream(&text);
    for err in &parse_errors {
        tracing::warn!(?err, path = %path.display(), "skipping malformed status record");
    }

    paragraphs
        .iter()
        .map(Package::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

fn emit_scalar(out: &mut String, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        if !value.is_empty() {
            writeln!(out, "{key}: {value}").unwrap();
        }
    }
}

fn emit_multiline(out: &mut String, key: &str, lines: &[String]) {
    if lines.is_empty() {
        return;
    }
    writeln!(out, "{key}:").unwrap();
    for line in lines {
        writeln!(out, " {line}").unwrap();
    }
}

/// Render one [Package] as an RFC-822 block in the canonical field order,
/// terminated by a blank line.
pub fn serialize_package(pkg: &Package) -> String {
    let mut out = String::new();
    writeln!(out, "Package: {}", pkg.name).unwrap();
    writeln!(out, "Status: {}", pkg.state).unwrap();
    writeln!(out, "Version: {}", pkg.version).unwrap();
    writeln!(out, "Architecture: {}", pkg.architecture).unwrap();

    let non_empty = |s: &str| (!s.is_empty()).then(|| s);
    emit_scalar(&mut out, "Pre-Depends", non_empty(&pkg.pre_depends));
    emit_scalar(&mut out, "Depends", non_empty(&pkg.depends));
    emit_scalar(&mut out, "Recommends", non_empty(&pkg.recommends));
    emit_scalar(&mut out, "Suggests", non_empty(&pkg.suggests));
    emit_scalar(&mut out, "Conflicts", non_empty(&pkg.conflicts));
    emit_scalar(&mut out, "Replaces", non_empty(&pkg.replaces));
    emit_scalar(&mut out, "Provides", non_empty(&pkg.provides));

    emit_scalar(&mut out, "Section", pkg.section.as_deref());
    if pkg.essential {
        writeln!(out, "Essential: yes").unwrap();
    }
    emit_scalar(&mut out, "Maintainer", pkg.maintainer.as_deref());
    if let Some(md5) = &pkg.md5 {
        writeln!(out, "MD5sum: {md5}").unwrap();
    }
    if let Some(sha256) = &pkg.sha256 {
        writeln!(out, "SHA256sum: {sha256}").unwrap();
    }
    if let Some(size) = pkg.download_size {
        writeln!(out, "Size: {size}").unwrap();
    }
    if let Some(size) = pkg.installed_size {
        writeln!(out, "Installed-Size: {size}").unwrap();
    }
    if let Some(time) = pkg.installed_time {
        writeln!(out, "Installed-Time: {time}").unwrap();
    }
    emit_scalar(&mut out, "Filename", pkg.filename.as_deref());
    emit_multiline(&mut out, "Conffiles", &pkg.conffiles);
    emit_scalar(&mut out, "Source", pkg.source.as_deref());
    emit_scalar(&mut out, "Description", pkg.description.as_deref());
    if !pkg.tags.is_empty() {
        writeln!(out, "Tags: {}", pkg.tags.join(", ")).unwrap();
    }
    if let Some(priority) = pkg.priority {
        writeln!(out, "Priority: {priority}").unwrap();
    }
    if pkg.auto_installed {
        writeln!(out, "Auto-Installed: yes").unwrap();
    }
    for (key, value) in &pkg.userfields {
        writeln!(out, "{key}: {value}").unwrap();
    }

    out.push('\n');
    out
}

/// Serialize the whole database, one blank-line-terminated block per
/// package, in the order given.
pub fn serialize(packages: &[Package]) -> String {
    packages.iter().map(serialize_package).collect()
}

/// Replace the status file at `path` with `packages`, using a crash-safe
/// protocol: write a temp file, `fsync` it, then rename atomically over the
/// canonical path. The rename is the only point at
/// which the canonical file changes, so a crash before it leaves the old
/// file intact and a crash after it leaves the new file intact.
pub fn write_atomic(path: &Path, packages: &[Package]) -> Result<(), Error> {
    let tmp_path = path.with_extension("tmp");
    let contents = serialize(packages);

    {
        let mut tmp = File::create(&tmp_path)?;
        use std::io::Write;
        tmp.write_all(contents.as_bytes())?;
        tmp.sync_all()?;
    }

    fs::rename(&tmp_path, path)?;
    tracing::debug!(path = %path.display(), packages = packages.len(), "status file replaced");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::RawParagraph;

    fn pkg(text: &str) -> Package {
        let (paragraphs, errors) = RawParagraph::parse_stream(text);
        assert!(errors.is_empty());
        Package::try_from(&paragraphs[0]).unwrap()
    }

    #[test]
    fn missing_file_is_empty_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status");
        assert_eq!(Vec::<Package>::new(), read(&path).unwrap());
    }

    #[test]
    fn round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status");

        let packages = vec![
            pkg("Package: foo\nVersion: 1.0-1\nStatus: install ok installed\n"),
            pkg("Package: bar\nVersion: 2.0-1\nStatus: install ok unpacked\n"),
        ];
        write_atomic(&path, &packages).unwrap();

        let reread = read(&path).unwrap();
        assert_eq!(2, reread.len());
        assert_eq!("foo", reread[0].name);
        assert_eq!(crate::state::Status::Installed, reread[0].state.status);
        assert_eq!("bar", reread[1].name);
    }

    #[test]
    fn write_atomic_leaves_no_tmp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("status");
        write_atomic(&path, &[]).unwrap();
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn serialize_round_trips_dependency_fields() {
        let pkg = pkg("Package: foo\nVersion: 1.0-1\nDepends: bar (>= 1.0)\n");
        let text = serialize_package(&pkg);
        let (paragraphs, _) = RawParagraph::parse_stream(&text);
        let reparsed = Package::try_from(&paragraphs[0]).unwrap();
        assert_eq!("bar (>= 1.0)", reparsed.depends);
    }
}

// vim: foldmethod=marker
