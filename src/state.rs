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

//! The three-part state a package carries in the `Status:` field: what the
//! user wants (`state_want`), a bitset of sticky flags (`state_flag`), and
//! where the package actually sits in the install state machine
//! (`state_status`).
//!
//! These are expressed as an exhaustive match everywhere they're consumed:
//! a new variant becomes a compile error at every site that matters, rather
//! than a silently-unhandled row in a string table.

use std::fmt;
use std::str::FromStr;

/// What the user declared they want done with this package.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Want {
    /// No want has been recorded yet.
    Unknown,
    /// The package should be installed (or kept installed).
    Install,
    /// The package should be removed, but its conffiles kept.
    Deinstall,
    /// The package, and its conffiles, should be removed entirely.
    Purge,
}

/// A single sticky flag. Several may apply to one package at once; see
/// [Flags].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Flag {
    /// Nothing unusual is set. Emitted on its own when the flag set is
    /// otherwise empty.
    Ok,
    /// The package's post-install failed in a way that requires
    /// reinstallation to clear.
    ReinstReq,
    /// The user has pinned this package; the solver must not touch it.
    Hold,
    /// This package replaces files from another package already on disk.
    Replace,
    /// Don't prune this package's conffiles even if nothing depends on it.
    NoPrune,
    /// Prefer this package over other providers of the same abstract name.
    Prefer,
    /// This package has been superseded and is kept only for compatibility.
    Obsolete,
    /// Installed because the user explicitly asked for it, not pulled in
    /// as a dependency (the inverse of "auto-installed").
    User,
    /// The on-disk file list no longer matches what's recorded; ownership
    /// bookkeeping needs a rebuild.
    FilelistChanged,
}

impl Flag {
    const ALL: [Flag; 8] = [
        Flag::ReinstReq,
        Flag::Hold,
        Flag::Replace,
        Flag::NoPrune,
        Flag::Prefer,
        Flag::Obsolete,
        Flag::User,
        Flag::FilelistChanged,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Flag::Ok => "ok",
            Flag::ReinstReq => "reinstreq",
            Flag::Hold => "hold",
            Flag::Replace => "replace",
            Flag::NoPrune => "noprune",
            Flag::Prefer => "prefer",
            Flag::Obsolete => "obsolete",
            Flag::User => "user",
            Flag::FilelistChanged => "filelist-changed",
        }
    }
}

/// A bitset of non-volatile [Flag]s. `ok` is never stored as a member; it's
/// implied by an empty set and only ever appears in the serialized form.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Flags(u16);

impl Flags {
    /// The empty flag set.
    pub const EMPTY: Flags = Flags(0);

    fn bit(flag: Flag) -> u16 {
        match flag {
            Flag::Ok => 0,
            other => 1 << (Flag::ALL.iter().position(|f| *f == other).unwrap() + 1),
        }
    }

    /// Set `flag`, returning the updated set.
    pub fn with(mut self, flag: Flag) -> Self {
        self.0 |= Self::bit(flag);
        self
    }

    /// Unset `flag`, returning the updated set.
    pub fn without(mut self, flag: Flag) -> Self {
        self.0 &= !Self::bit(flag);
        self
    }

    /// Whether `flag` is a member of this set.
    pub fn contains(self, flag: Flag) -> bool {
        self.0 & Self::bit(flag) != 0
    }

    /// True if no sticky flag is set -- the set serializes as `ok`.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterate over the members, in the canonical emission order.
    pub fn iter(self) -> impl Iterator<Item = Flag> {
        Flag::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("ok");
        }
        let names: Vec<&str> = self.iter().map(Flag::as_str).collect();
        write!(f, "{}", names.join(","))
    }
}

/// Error returned when parsing a malformed `Status:` field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error(pub String);
crate::errors::error_enum!(Error);

impl FromStr for Want {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "unknown" => Ok(Want::Unknown),
            "install" => Ok(Want::Install),
            "deinstall" => Ok(Want::Deinstall),
            "purge" => Ok(Want::Purge),
            other => Err(Error(format!("unknown state_want {other:?}"))),
        }
    }
}

impl fmt::Display for Want {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Want::Unknown => "unknown",
            Want::Install => "install",
            Want::Deinstall => "deinstall",
            Want::Purge => "purge",
        })
    }
}

impl FromStr for Flags {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        let mut flags = Flags::EMPTY;
        for word in s.split(',') {
            match word {
                "ok" => {}
                "reinstreq" => flags = flags.with(Flag::ReinstReq),
                "hold" => flags = flags.with(Flag::Hold),
                "replace" => flags = flags.with(Flag::Replace),
                "noprune" => flags = flags.with(Flag::NoPrune),
                "prefer" => flags = flags.with(Flag::Prefer),
                "obsolete" => flags = flags.with(Flag::Obsolete),
                "user" => flags = flags.with(Flag::User),
                "filelist-changed" => flags = flags.with(Flag::FilelistChanged),
                other => return Err(Error(format!("unknown state_flag {other:?}"))),
            }
        }
        Ok(flags)
    }
}

/// Where a package currently sits in the install state machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// No trace of the package on disk.
    NotInstalled,
    /// Unpacked but not yet configured.
    Unpacked,
    /// Unpack is interrupted partway through.
    HalfInstalled,
    /// The maintainer script is running or was interrupted mid-run.
    HalfConfigured,
    /// Fully installed and configured.
    Installed,
    /// Removed, but conffiles (and this record) remain.
    ConfigFiles,
    /// `postinst` exited non-zero; sticky until retried or removed.
    PostInstFailed,
    /// `prerm`/`postrm` exited non-zero during removal; sticky.
    RemovalFailed,
}

impl FromStr for Status {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "not-installed" => Ok(Status::NotInstalled),
            "unpacked" => Ok(Status::Unpacked),
            "half-installed" => Ok(Status::HalfInstalled),
            "half-configured" => Ok(Status::HalfConfigured),
            "installed" => Ok(Status::Installed),
            "config-files" => Ok(Status::ConfigFiles),
            "post-inst-failed" => Ok(Status::PostInstFailed),
            "removal-failed" => Ok(Status::RemovalFailed),
            other => Err(Error(format!("unknown state_status {other:?}"))),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Status::NotInstalled => "not-installed",
            Status::Unpacked => "unpacked",
            Status::HalfInstalled => "half-installed",
            Status::HalfConfigured => "half-configured",
            Status::Installed => "installed",
            Status::ConfigFiles => "config-files",
            Status::PostInstFailed => "post-inst-failed",
            Status::RemovalFailed => "removal-failed",
        })
    }
}

/// The full `Status:` field triple.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct State {
    /// What the user wants.
    pub want: Want,
    /// Sticky flags.
    pub flags: Flags,
    /// Where the package sits in the install state machine.
    pub status: Status,
}

impl Default for State {
    fn default() -> Self {
        State {
            want: Want::Unknown,
            flags: Flags::EMPTY,
            status: Status::NotInstalled,
        }
    }
}

impl FromStr for State {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let mut parts = s.split_whitespace();
        let want = parts
            .next()
            .ok_or_else(|| Error("empty Status field".into()))?
            .parse()?;
        let flags = parts
            .next()
            .ok_or_else(|| Error("missing state_flag in Status field".into()))?
            .parse()?;
        let status = parts
            .next()
            .ok_or_else(|| Error("missing state_status in Status field".into()))?
            .parse()?;
        if parts.next().is_some() {
            return Err(Error("trailing data in Status field".into()));
        }
        Ok(State {
            want,
            flags,
            status,
        })
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.want, self.flags, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_flags_emit_ok() {
        assert_eq!("ok", Flags::EMPTY.to_string());
    }

    #[test]
    fn flags_round_trip() {
        let flags = Flags::EMPTY.with(Flag::Hold).with(Flag::User);
        let s = flags.to_string();
        assert_eq!(flags, s.parse().unwrap());
    }

    #[test]
    fn state_round_trip() {
        let state = State {
            want: Want::Install,
            flags: Flags::EMPTY.with(Flag::Hold),
            status: Status::Installed,
        };
        assert_eq!("install hold installed", state.to_string());
        assert_eq!(state, "install hold installed".parse().unwrap());
    }

    #[test]
    fn state_ok_round_trip() {
        let state = State {
            want: Want::Install,
            flags: Flags::EMPTY,
            status: Status::Installed,
        };
        assert_eq!("install ok installed", state.to_string());
        assert_eq!(state, "install ok installed".parse().unwrap());
    }

    #[test]
    fn rejects_trailing_garbage() {
        assert!("install ok installed extra".parse::<State>().is_err());
    }
}

// vim: foldmethod=marker
