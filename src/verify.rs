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

//! The verification gate that runs before unpack: size, then checksum, then
//! an optional detached signature.

use crate::checksum::{DigestMd5, DigestSha256};
use crate::control::Package;
use crate::options::Options;
use sha2::Digest as _;
use std::fs;
use std::io;
use std::path::Path;

/// Verifies a detached signature against a local file. Signature
/// cryptography is an external collaborator; this crate names the seam
/// only.
pub trait SignatureBackend {
    /// The error type this backend reports.
    type Error: std::error::Error + 'static;

    /// Verify `sig_path` is a valid signature over `file_path`.
    fn verify(&self, file_path: &Path, sig_path: &Path) -> Result<bool, Self::Error>;
}

/// Why verification rejected a downloaded file.
#[derive(Debug)]
pub enum Error {
    /// `stat`ing the local file failed.
    Io(io::Error),
    /// The on-disk size didn't match the advertised `Size:`.
    SizeMismatch { expected: u64, actual: u64 },
    /// Neither `SHA256sum:` nor `MD5sum:` was set, and `force_checksum`
    /// wasn't requested.
    NoChecksum,
    /// The computed SHA256 didn't match `SHA256sum:`.
    Sha256Mismatch,
    /// The computed MD5 didn't match `MD5sum:`.
    Md5Mismatch,
    /// Signature checking was requested but no `<pkg>.sig` was found
    /// alongside the local file.
    MissingSignature,
    /// The signature backend rejected the file.
    SignatureInvalid,
}
crate::errors::error_enum!(Error);

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

fn sha256_of(path: &Path) -> io::Result<DigestSha256> {
    let bytes = fs::read(path)?;
    let digest = sha2::Sha256::digest(&bytes);
    Ok(DigestSha256::from_bytes(digest.into()))
}

/// Compute the MD5 digest of a file's contents. Exposed to `transaction` for
/// writing `.md5sums` alongside the download-verification use here.
pub(crate) fn md5_of(path: &Path) -> io::Result<DigestMd5> {
    let bytes = fs::read(path)?;
    Ok(DigestMd5::from_bytes(md5::compute(bytes).0))
}

/// Run the verification gate against a local file already downloaded for
/// `package`. On any failure, the local file (and its
/// signature, if present) is deleted, unless the failure is
/// [Error::NoChecksum] and `force_checksum` was set -- in that case there's
/// nothing to check, and the file is kept.
pub fn verify<S: SignatureBackend>(
    package: &Package,
    local_path: &Path,
    options: &Options,
    signature_backend: Option<&S>,
) -> Result<(), Error> {
    match verify_inner(package, local_path, options, signature_backend) {
        Ok(()) => Ok(()),
        Err(e) => {
            tracing::warn!(package = %package.name, error = %e, "verification failed, deleting local file");
            let _ = fs::remove_file(local_path);
            let _ = fs::remove_file(local_path.with_extension("sig"));
            Err(e)
        }
    }
}

fn verify_inner<S: SignatureBackend>(
    package: &Package,
    local_path: &Path,
    options: &Options,
    signature_backend: Option<&S>,
) -> Result<(), Error> {
    if let Some(expected) = package.download_size {
        let actual = fs::metadata(local_path)?.len();
        if actual != expected {
            return Err(Error::SizeMismatch { expected, actual });
        }
    }

    match &package.sha256 {
        Some(expected) => {
            if sha256_of(local_path)? != *expected {
                return Err(Error::Sha256Mismatch);
            }
        }
        None => match &package.md5 {
            Some(expected) => {
                if md5_of(local_path)? != *expected {
                    return Err(Error::Md5Mismatch);
                }
            }
            None => {
                if !options.force_checksum {
                    return Err(Error::NoChecksum);
                }
            }
        },
    }

    if let Some(backend) = signature_backend {
        let sig_path = local_path.with_extension("sig");
        if !sig_path.exists() {
            return Err(Error::MissingSignature);
        }
        let ok = backend
            .verify(local_path, &sig_path)
            .map_err(|_| Error::SignatureInvalid)?;
        if !ok {
            return Err(Error::SignatureInvalid);
        }
    }

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

    struct NoSignatures;
    impl SignatureBackend for NoSignatures {
        type Error = std::io::Error;
        fn verify(&self, _: &Path, _: &Path) -> Result<bool, Self::Error> {
            unreachable!("not exercised when signature_backend is None")
        }
    }

    fn no_backend() -> Option<&'static NoSignatures> {
        None
    }

    #[test]
    fn size_mismatch_is_rejected_and_file_deleted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foo.deb");
        fs::write(&path, b"1234").unwrap();

        let pkg = pkg("Package: foo\nVersion: 1.0\nSize: 999\n");
        let err = verify(&pkg, &path, &Options::default(), no_backend()).unwrap_err();
        assert!(matches!(err, Error::SizeMismatch { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn sha256_match_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foo.deb");
        fs::write(&path, b"hello").unwrap();
        let digest = sha256_of(&path).unwrap();

        let pkg = pkg(&format!(
            "Package: foo\nVersion: 1.0\nSHA256sum: {digest}\n"
        ));
        verify(&pkg, &path, &Options::default(), no_backend()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn sha256_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foo.deb");
        fs::write(&path, b"hello").unwrap();

        let pkg = pkg(&format!(
            "Package: foo\nVersion: 1.0\nSHA256sum: {}\n",
            "0".repeat(64)
        ));
        let err = verify(&pkg, &path, &Options::default(), no_backend()).unwrap_err();
        assert!(matches!(err, Error::Sha256Mismatch));
    }

    #[test]
    fn no_checksum_fails_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foo.deb");
        fs::write(&path, b"hello").unwrap();
        let pkg = pkg("Package: foo\nVersion: 1.0\n");

        assert!(matches!(
            verify(&pkg, &path, &Options::default(), no_backend()).unwrap_err(),
            Error::NoChecksum
        ));

        let forced = Options {
            force_checksum: true,
            ..Default::default()
        };
        verify(&pkg, &path, &forced, no_backend()).unwrap();
    }
}

// vim: foldmethod=marker
