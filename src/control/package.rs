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

//! The concrete [Package] record, built from a [RawParagraph].
//!
//! Dependency fields are kept as raw strings here; expanding them into
//! [crate::dependency::CompoundDepend]s bound to abstract packages is the
//! index's job, not the parser's.

use crate::architecture::Architecture;
use crate::checksum::{DigestMd5, DigestSha256};
use crate::control::priority::{InvalidPriority, Priority};
use crate::control::paragraph::RawParagraph;
use crate::state::State;
use crate::version::Version;

/// A single concrete `(name, version, architecture)` package record and its
/// metadata, as read from a control stream or the status file.
#[derive(Clone, Debug, PartialEq)]
pub struct Package {
    /// `Package:` -- the concrete package name.
    pub name: String,
    /// `Version:` -- epoch/upstream/revision triple.
    pub version: Version,
    /// `Architecture:`.
    pub architecture: Architecture,

    /// `Maintainer:`.
    pub maintainer: Option<String>,
    /// `Section:`.
    pub section: Option<String>,
    /// `Description:`, continuation lines included verbatim.
    pub description: Option<String>,
    /// `Priority:`.
    pub priority: Option<Priority>,
    /// `Installed-Size:`, in kibibytes as Debian emits it.
    pub installed_size: Option<u64>,
    /// `Size:` -- the advertised download size, checked exactly by
    /// verification.
    pub download_size: Option<u64>,
    /// `MD5sum:`.
    pub md5: Option<DigestMd5>,
    /// `SHA256sum:`.
    pub sha256: Option<DigestSha256>,
    /// `Source:`, when it differs from `Package:`.
    pub source: Option<String>,
    /// `Conffiles:`, one path per line in the raw field.
    pub conffiles: Vec<String>,
    /// `Tags:`, comma-separated in the raw field.
    pub tags: Vec<String>,
    /// `Installed-Time:`, Unix seconds.
    pub installed_time: Option<u64>,
    /// `Filename:` -- where this package's archive can be found relative to
    /// the (external) fetcher's base.
    pub filename: Option<String>,
    /// `Essential:` -- protects against removal without a force flag.
    pub essential: bool,
    /// `Auto-Installed:` -- pulled in as a dependency, not requested by name.
    pub auto_installed: bool,

    /// Raw `Depends:` field, unexpanded.
    pub depends: String,
    /// Raw `Pre-Depends:` field, unexpanded.
    pub pre_depends: String,
    /// Raw `Recommends:` field, unexpanded.
    pub recommends: String,
    /// Raw `Suggests:` field, unexpanded.
    pub suggests: String,
    /// Raw `Conflicts:` field, unexpanded.
    pub conflicts: String,
    /// Raw `Replaces:` field, unexpanded.
    pub replaces: String,
    /// Raw `Provides:` field, unexpanded.
    pub provides: String,

    /// The three-part install state.
    pub state: State,

    /// Fields this crate doesn't recognise, preserved verbatim in file
    /// order.
    pub userfields: Vec<(String, String)>,
}

/// Error conditions encountered turning a [RawParagraph] into a [Package].
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// The paragraph had no `Package:` field.
    MissingPackage,
    /// The paragraph had no `Version:` field.
    MissingVersion,
    /// A field was present more than once.
    Duplicate(crate::control::paragraph::Error),
    /// `Version:` didn't parse.
    InvalidVersion(crate::version::Error),
    /// `Priority:` didn't match a recognised value.
    InvalidPriority(InvalidPriority),
    /// `Status:` didn't parse.
    InvalidState(crate::state::Error),
    /// `MD5sum:` wasn't a valid digest.
    InvalidMd5(crate::checksum::Error),
    /// `SHA256sum:` wasn't a valid digest.
    InvalidSha256(crate::checksum::Error),
    /// `Installed-Size:`, `Size:`, or `Installed-Time:` wasn't a valid
    /// non-negative integer.
    InvalidInteger {
        /// The offending field name.
        field: &'static str,
    },
}
crate::errors::error_enum!(Error);

impl From<crate::control::paragraph::Error> for Error {
    fn from(e: crate::control::paragraph::Error) -> Self {
        Error::Duplicate(e)
    }
}

const RECOGNISED_FIELDS: &[&str] = &[
    "Package",
    "Version",
    "Depends",
    "Recommends",
    "Suggests",
    "Pre-Depends",
    "Conflicts",
    "Replaces",
    "Provides",
    "Status",
    "Section",
    "Essential",
    "Architecture",
    "Maintainer",
    "MD5sum",
    "SHA256sum",
    "Size",
    "Installed-Size",
    "Installed-Time",
    "Filename",
    "Conffiles",
    "Source",
    "Description",
    "Tags",
    "Priority",
    "Auto-Installed",
];

fn yes(s: &str) -> bool {
    s.trim() == "yes"
}

impl TryFrom<&RawParagraph> for Package {
    type Error = Error;

    fn try_from(raw: &RawParagraph) -> Result<Self, Error> {
        let field = |name: &str| -> Result<Option<&str>, Error> {
            Ok(raw.field_once(name)?)
        };
        let int_field = |name: &'static str| -> Result<Option<u64>, Error> {
            match field(name)? {
                None => Ok(None),
                Some(s) => s
                    .trim()
                    .parse()
                    .map(Some)
                    .map_err(|_| Error::InvalidInteger { field: name }),
            }
        };

        let name = field("Package")?.ok_or(Error::MissingPackage)?.to_owned();
        let version: Version = field("Version")?
            .ok_or(Error::MissingVersion)?
            .parse()
            .map_err(Error::InvalidVersion)?;
        let architecture = field("Architecture")?
            .map(|s| s.parse().unwrap())
            .unwrap_or(Architecture::Any);

        let priority = field("Priority")?
            .map(str::parse)
            .transpose()
            .map_err(Error::InvalidPriority)?;
        let state = field("Status")?
            .map(str::parse)
            .transpose()
            .map_err(Error::InvalidState)?
            .unwrap_or_default();
        let md5 = field("MD5sum")?
            .map(str::parse)
            .transpose()
            .map_err(Error::InvalidMd5)?;
        let sha256 = field("SHA256sum")?
            .map(str::parse)
            .transpose()
            .map_err(Error::InvalidSha256)?;

        let conffiles = field("Conffiles")?
            .map(|s| s.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_owned).collect())
            .unwrap_or_default();
        let tags = field("Tags")?
            .map(|s| s.split(',').map(str::trim).filter(|t| !t.is_empty()).map(str::to_owned).collect())
            .unwrap_or_default();

        let userfields = raw
            .iter()
            .filter(|f| !RECOGNISED_FIELDS.contains(&f.key.as_str()))
            .map(|f| (f.key.clone(), f.value.clone()))
            .collect();

        Ok(Package {
            name,
            version,
            architecture,
            maintainer: field("Maintainer")?.map(str::to_owned),
            section: field("Section")?.map(str::to_owned),
            description: field("Description")?.map(str::to_owned),
            priority,
            installed_size: int_field("Installed-Size")?,
            download_size: int_field("Size")?,
            md5,
            sha256,
            source: field("Source")?.map(str::to_owned),
            conffiles,
            tags,
            installed_time: int_field("Installed-Time")?,
            filename: field("Filename")?.map(str::to_owned),
            essential: field("Essential")?.map(yes).unwrap_or(false),
            auto_installed: field("Auto-Installed")?.map(yes).unwrap_or(false),
            depends: field("Depends")?.unwrap_or("").to_owned(),
            pre_depends: field("Pre-Depends")?.unwrap_or("").to_owned(),
            recommends: field("Recommends")?.unwrap_or("").to_owned(),
            suggests: field("Suggests")?.unwrap_or("").to_owned(),
            conflicts: field("Conflicts")?.unwrap_or("").to_owned(),
            replaces: field("Replaces")?.unwrap_or("").to_owned(),
            provides: field("Provides")?.unwrap_or("").to_owned(),
            state,
            userfields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(text: &str) -> Package {
        let (paragraphs, errors) = RawParagraph::parse_stream(text);
        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(1, paragraphs.len());
        Package::try_from(&paragraphs[0]).unwrap()
    }

    #[test]
    fn minimal_package() {
        let pkg = parse_one("Package: foo\nVersion: 1.0-1\n");
        assert_eq!("foo", pkg.name);
        assert_eq!("1.0-1", pkg.version.to_string());
        assert_eq!(Architecture::Any, pkg.architecture);
        assert_eq!(State::default(), pkg.state);
    }

    #[test]
    fn missing_package_is_an_error() {
        let (paragraphs, _) = RawParagraph::parse_stream("Version: 1.0-1\n");
        assert_eq!(Error::MissingPackage, Package::try_from(&paragraphs[0]).unwrap_err());
    }

    #[test]
    fn full_metadata() {
        let pkg = parse_one(concat!(
            "Package: foo\n",
            "Version: 1.0-1\n",
            "Architecture: mips_24kc\n",
            "Depends: bar (>= 1.0), baz\n",
            "Essential: yes\n",
            "Installed-Size: 42\n",
            "Conffiles:\n",
            " /etc/foo.conf\n",
            " /etc/foo.d/bar.conf\n",
            "Status: install ok installed\n",
            "X-Custom: hello\n",
        ));
        assert_eq!("bar (>= 1.0), baz", pkg.depends);
        assert!(pkg.essential);
        assert_eq!(Some(42), pkg.installed_size);
        assert_eq!(
            vec!["/etc/foo.conf".to_owned(), "/etc/foo.d/bar.conf".to_owned()],
            pkg.conffiles
        );
        assert_eq!(crate::state::Status::Installed, pkg.state.status);
        assert_eq!(
            vec![("X-Custom".to_owned(), "hello".to_owned())],
            pkg.userfields
        );
    }

    #[test]
    fn duplicate_field_is_an_error() {
        let (paragraphs, _) =
            RawParagraph::parse_stream("Package: foo\nPackage: bar\nVersion: 1.0\n");
        assert!(matches!(
            Package::try_from(&paragraphs[0]),
            Err(Error::Duplicate(_))
        ));
    }
}

// vim: foldmethod=marker
