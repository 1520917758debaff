use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Format version of a schema or fix.
///
/// Ordered by `version`, then `sub`. Sub-versions let a release slot extra schemas between
/// two whole versions without renumbering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DataVersion {
    pub version: u32,
    pub sub: u32,
}

impl DataVersion {
    pub const fn new(version: u32, sub: u32) -> Self {
        Self { version, sub }
    }
}

impl From<u32> for DataVersion {
    fn from(version: u32) -> Self {
        Self { version, sub: 0 }
    }
}

impl fmt::Display for DataVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sub == 0 {
            write!(f, "{}", self.version)
        } else {
            write!(f, "{}.{}", self.version, self.sub)
        }
    }
}

/// A version string that is not `N` or `N.S`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid data version `{input}`: expected `N` or `N.S`")]
pub struct ParseVersionError {
    pub input: String,
}

impl FromStr for DataVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseVersionError {
            input: s.to_string(),
        };
        let s = s.trim();
        let (version, sub) = match s.split_once('.') {
            Some((v, sub)) => (v, sub),
            None => (s, "0"),
        };
        Ok(Self {
            version: version.parse().map_err(|_| err())?,
            sub: sub.parse().map_err(|_| err())?,
        })
    }
}
