// angleview/src/info.rs
//
//! OpenGL ES information.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Describes the OpenGL ES version that is requested when a context is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct GLVersion {
    pub major: u8,
    pub minor: u8,
}

impl GLVersion {
    #[inline]
    pub fn new(major: u8, minor: u8) -> GLVersion {
        GLVersion { major, minor }
    }

    /// Whether vertex array objects are core in this version.
    #[inline]
    pub fn has_vertex_array_objects(self) -> bool {
        self.major >= 3
    }
}

impl Display for GLVersion {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for GLVersion {
    type Err = String;

    /// Parses `MAJOR` or `MAJOR.MINOR`.
    fn from_str(string: &str) -> Result<GLVersion, String> {
        let mut parts = string.trim().splitn(2, '.');
        let major = parts.next().unwrap_or("");
        let minor = parts.next().unwrap_or("0");
        match (major.parse(), minor.parse()) {
            (Ok(major), Ok(minor)) => Ok(GLVersion::new(major, minor)),
            _ => Err(format!("invalid OpenGL ES version `{}`", string)),
        }
    }
}
