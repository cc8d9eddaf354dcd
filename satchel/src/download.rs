//! Download references.
//!
//! A download reference is an opaque string handed to clients and
//! stored in coursework records. It is later resolved by a download
//! handler that lives outside of Satchel:
//!
//! ```text
//! coursework=(2017-2018-1)-S0500560-40429-2/14051531_章梓航.zip
//! exports=archive_(2017-2018-1)-S0500560-40429-2_0f3c9a.zip
//! ```
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::artifact::{validate_file_name, ArtifactPath};
use crate::error::{SatchelError, SatchelResult};

/// The container a download reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    /// A student artifact in the storage root.
    Coursework,

    /// A generated archive or report in the export directory.
    Exports,
}

/// A reference to a downloadable file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DownloadRef {
    kind: ContainerKind,
    path: String,
}

impl ContainerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coursework => "coursework",
            Self::Exports => "exports",
        }
    }
}

impl FromStr for ContainerKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, ()> {
        match s {
            "coursework" => Ok(Self::Coursework),
            "exports" => Ok(Self::Exports),
            _ => Err(()),
        }
    }
}

impl DownloadRef {
    /// Returns a reference to a stored artifact.
    pub fn artifact(path: &ArtifactPath) -> Self {
        Self {
            kind: ContainerKind::Coursework,
            path: path.to_string(),
        }
    }

    /// Returns a reference to a file in the export directory.
    pub fn export(file_name: &str) -> SatchelResult<Self> {
        validate_file_name(file_name)?;

        Ok(Self {
            kind: ContainerKind::Exports,
            path: file_name.to_owned(),
        })
    }

    /// Returns the container kind.
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    /// Returns the path relative to the container.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Decodes the artifact path of a coursework reference.
    pub fn to_artifact_path(&self) -> SatchelResult<ArtifactPath> {
        if self.kind != ContainerKind::Coursework {
            return Err(SatchelError::InvalidDownloadRef {
                reference: self.to_string(),
                reason: "not a coursework reference",
            });
        }

        ArtifactPath::parse(&self.path)
    }
}

impl Display for DownloadRef {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}={}", self.kind.as_str(), self.path)
    }
}

impl FromStr for DownloadRef {
    type Err = SatchelError;

    fn from_str(s: &str) -> SatchelResult<Self> {
        let invalid = |reason| SatchelError::InvalidDownloadRef {
            reference: s.to_owned(),
            reason,
        };

        let (kind, path) = s.split_once('=').ok_or_else(|| invalid("missing '='"))?;
        let kind = ContainerKind::from_str(kind).map_err(|_| invalid("unknown container"))?;

        match kind {
            ContainerKind::Coursework => {
                let path = ArtifactPath::parse(path)?;
                Ok(Self::artifact(&path))
            }
            ContainerKind::Exports => Self::export(path),
        }
    }
}

impl Serialize for DownloadRef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DownloadRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use de::Error;
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(|e| Error::custom(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_reference() {
        let path = ArtifactPath::parse("CS101/14051531_章梓航.zip").unwrap();
        let reference = DownloadRef::artifact(&path);

        assert_eq!("coursework=CS101/14051531_章梓航.zip", reference.to_string());
        assert_eq!(ContainerKind::Coursework, reference.kind());
        assert_eq!(path, reference.to_artifact_path().unwrap());

        let parsed: DownloadRef = "coursework=CS101/14051531_章梓航.zip".parse().unwrap();
        assert_eq!(reference, parsed);
    }

    #[test]
    fn test_export_reference() {
        let reference = DownloadRef::export("archive_CS101_0f3c9a.zip").unwrap();
        assert_eq!("exports=archive_CS101_0f3c9a.zip", reference.to_string());
        reference.to_artifact_path().unwrap_err();

        DownloadRef::export("../secret").unwrap_err();
        DownloadRef::export("sub/dir.zip").unwrap_err();
    }

    #[test]
    fn test_bad_references() {
        let bad = vec![
            "",
            "coursework",
            "unknown=CS101/1_a.zip",
            "coursework=../../etc/passwd",
            "coursework=CS101/../1_a.zip",
            "exports=",
            "exports=a/b",
        ];

        for s in bad {
            s.parse::<DownloadRef>().unwrap_err();
            serde_json::from_str::<DownloadRef>(&format!("\"{}\"", s)).unwrap_err();
        }
    }

    #[test]
    fn test_serde() {
        let reference: DownloadRef =
            serde_json::from_str("\"exports=report_CS101_1a2b3c.xlsx\"").unwrap();
        assert_eq!(ContainerKind::Exports, reference.kind());
        assert_eq!("report_CS101_1a2b3c.xlsx", reference.path());
        assert_eq!(
            "\"exports=report_CS101_1a2b3c.xlsx\"",
            serde_json::to_string(&reference).unwrap()
        );
    }
}
