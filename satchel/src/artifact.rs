//! Stored artifacts.
//!
//! A student's submission for a class lives at a deterministic path
//! relative to the storage root:
//!
//! ```text
//! {class_id}/{student_id}_{display_name}.{ext}
//! ```
//!
//! `ext` is taken from the file name the client uploaded. An upload
//! without an extension is stored without the `.{ext}` suffix.
use std::fmt::{self, Display, Formatter};

use lazy_static::lazy_static;
use regex::Regex;

use crate::class::ClassId;
use crate::error::{SatchelError, SatchelResult};
use crate::student::{DisplayName, StudentId, RESERVED_CHARS};

/// The maximum allowable length of a stored file name, in bytes.
pub const MAX_FILE_NAME_LENGTH: usize = 255;

lazy_static! {
    static ref EXTENSION_REGEX: Regex = Regex::new(r"^[A-Za-z0-9]{1,16}$").unwrap();
}

/// Location of an artifact relative to the storage root.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct ArtifactPath {
    class: ClassId,
    student: StudentId,
    file_name: String,
}

impl ArtifactPath {
    /// Computes the target path of a new upload.
    pub fn for_upload(
        class: ClassId,
        student: StudentId,
        display_name: &DisplayName,
        original_file_name: &str,
    ) -> SatchelResult<Self> {
        let file_name = match extension_of(original_file_name)? {
            Some(ext) => format!("{}_{}.{}", student, display_name, ext),
            None => format!("{}_{}", student, display_name),
        };

        validate_file_name(&file_name)?;

        Ok(Self {
            class,
            student,
            file_name,
        })
    }

    /// Parses a `{class_id}/{file_name}` path.
    ///
    /// The student owning the artifact is recovered from the file
    /// name prefix.
    pub fn parse(relative_path: &str) -> SatchelResult<Self> {
        let (class, file_name) =
            relative_path
                .split_once('/')
                .ok_or_else(|| SatchelError::InvalidFileName {
                    name: relative_path.to_owned(),
                    reason: "missing class directory",
                })?;

        let class = ClassId::new(class.to_owned())?;
        validate_file_name(file_name)?;

        let student = file_name
            .split_once('_')
            .filter(|(_, rest)| !rest.is_empty())
            .ok_or_else(|| SatchelError::InvalidFileName {
                name: file_name.to_owned(),
                reason: "missing student prefix",
            })
            .and_then(|(prefix, _)| prefix.parse::<StudentId>())?;

        Ok(Self {
            class,
            student,
            file_name: file_name.to_owned(),
        })
    }

    /// Returns the class the artifact belongs to.
    pub fn class(&self) -> &ClassId {
        &self.class
    }

    /// Returns the student the artifact belongs to.
    pub fn student(&self) -> StudentId {
        self.student
    }

    /// Returns the file name inside the class directory.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl Display for ArtifactPath {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.class, self.file_name)
    }
}

/// Returns the extension of a client-supplied file name.
///
/// Clients may send a full path (`C:\Users\me\work.zip`), so only the
/// last component is considered. Dotfiles like `.zip` have no
/// extension.
pub fn extension_of(original_file_name: &str) -> SatchelResult<Option<&str>> {
    let base_name = original_file_name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or(original_file_name);

    let ext = match base_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext,
        _ => return Ok(None),
    };

    if EXTENSION_REGEX.is_match(ext) {
        Ok(Some(ext))
    } else {
        Err(SatchelError::InvalidFileName {
            name: original_file_name.to_owned(),
            reason: "unsupported extension",
        })
    }
}

/// Validates a single path component that is about to hit the filesystem.
pub fn validate_file_name(name: &str) -> SatchelResult<()> {
    let reason = if name.is_empty() {
        Some("must not be empty")
    } else if name.len() > MAX_FILE_NAME_LENGTH {
        Some("too long")
    } else if name.starts_with('.') {
        Some("must not start with a dot")
    } else if name.chars().any(char::is_control) {
        Some("must not contain control characters")
    } else if name.contains(RESERVED_CHARS) {
        Some("must not contain reserved characters")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(SatchelError::InvalidFileName {
            name: name.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::class::tests::class;

    fn name(s: &str) -> DisplayName {
        DisplayName::new(s.to_string()).unwrap()
    }

    #[test]
    fn test_for_upload() {
        let student = StudentId::new(14051531).unwrap();
        let class = class! { "(2017-2018-1)-S0500560-40429-2" };

        let path = ArtifactPath::for_upload(class.clone(), student, &name("章梓航"), "cswk.zip")
            .unwrap();
        assert_eq!("14051531_章梓航.zip", path.file_name());
        assert_eq!(
            "(2017-2018-1)-S0500560-40429-2/14051531_章梓航.zip",
            path.to_string()
        );

        let path =
            ArtifactPath::for_upload(class.clone(), student, &name("Ada"), "C:\\Users\\ada\\final.tar.7z")
                .unwrap();
        assert_eq!("14051531_Ada.7z", path.file_name());

        let path = ArtifactPath::for_upload(class.clone(), student, &name("Ada"), "README").unwrap();
        assert_eq!("14051531_Ada", path.file_name());

        ArtifactPath::for_upload(class, student, &name("Ada"), "evil.z!p").unwrap_err();
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(Some("zip"), extension_of("work.zip").unwrap());
        assert_eq!(Some("gz"), extension_of("work.tar.gz").unwrap());
        assert_eq!(Some("pdf"), extension_of("../../etc/report.pdf").unwrap());
        assert_eq!(None, extension_of(".zip").unwrap());
        assert_eq!(None, extension_of("noext").unwrap());
        assert_eq!(None, extension_of("trailing.").unwrap());

        extension_of("a.z ip").unwrap_err();
        extension_of("a.zip?").unwrap_err();
        extension_of("a.waytoolongextension").unwrap_err();
    }

    #[test]
    fn test_parse() {
        let path = ArtifactPath::parse("CS101/14051531_章梓航.zip").unwrap();
        assert_eq!("CS101", path.class().as_str());
        assert_eq!(14051531, path.student().get());
        assert_eq!("14051531_章梓航.zip", path.file_name());
        assert_eq!("CS101/14051531_章梓航.zip", path.to_string());

        let bad_paths = vec![
            "",
            "no-slash.zip",
            "../14051531_a.zip",
            "CS101/../../etc/passwd",
            "CS101/.hidden",
            "CS101/nounderscore.zip",
            "CS101/14051531_",
            "CS101/abc_name.zip",
            "CS101/",
        ];

        for p in bad_paths {
            ArtifactPath::parse(p).unwrap_err();
        }
    }
}
