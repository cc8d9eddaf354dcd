//! Students.
//!
//! ## Display names
//!
//! The display name of a student becomes part of the artifact file name
//! (`{student_id}_{display_name}.{ext}`), so it must be a single safe
//! path component. Any Unicode letters are fine (most names are not
//! ASCII), but path separators, control characters and characters
//! reserved on common filesystems (`<>:"/\|?*`) are rejected, as are
//! names starting with a dot and names with surrounding whitespace.
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{de, Deserialize, Serialize};

use crate::error::{SatchelError, SatchelResult};

/// The maximum allowable length of a display name, in characters.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 64;

/// Characters that may never appear in a path component.
pub(crate) const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// The school ID of a student.
///
/// This is a positive integer.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct StudentId(#[serde(deserialize_with = "StudentId::deserialize")] i64);

/// The human-readable name of a student used in artifact file names.
#[derive(Serialize, Deserialize, Clone, Debug, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct DisplayName(#[serde(deserialize_with = "DisplayName::deserialize")] String);

impl StudentId {
    /// Creates a student ID.
    pub fn new(id: i64) -> SatchelResult<Self> {
        if id > 0 {
            Ok(Self(id))
        } else {
            Err(SatchelError::InvalidStudentId { id: id.to_string() })
        }
    }

    /// Returns the numeric value.
    pub fn get(&self) -> i64 {
        self.0
    }

    fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        use de::Error;
        i64::deserialize(deserializer).and_then(|id| {
            Self::new(id).map_err(|e| Error::custom(e.to_string()))?;
            Ok(id)
        })
    }
}

impl FromStr for StudentId {
    type Err = SatchelError;

    fn from_str(s: &str) -> SatchelResult<Self> {
        // Only plain decimal digits; `+1` and friends would make
        // the same slot addressable under different spellings.
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SatchelError::InvalidStudentId { id: s.to_owned() });
        }

        let id = s
            .parse::<i64>()
            .map_err(|_| SatchelError::InvalidStudentId { id: s.to_owned() })?;

        Self::new(id)
    }
}

impl Display for StudentId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl DisplayName {
    /// Creates a display name from a String.
    pub fn new(name: String) -> SatchelResult<Self> {
        validate_display_name(&name)?;
        Ok(Self(name))
    }

    /// Returns the string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Deserializes a potentially-invalid display name.
    fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        use de::Error;
        String::deserialize(deserializer).and_then(|s| {
            validate_display_name(&s).map_err(|e| Error::custom(e.to_string()))?;
            Ok(s)
        })
    }
}

impl FromStr for DisplayName {
    type Err = SatchelError;

    fn from_str(name: &str) -> SatchelResult<Self> {
        Self::new(name.to_owned())
    }
}

impl Display for DisplayName {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_display_name(name: &str) -> SatchelResult<()> {
    let reason = if name.is_empty() {
        Some("must not be empty")
    } else if name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
        Some("too long")
    } else if name.trim() != name {
        Some("must not start or end with whitespace")
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
        Some(reason) => Err(SatchelError::InvalidDisplayName {
            name: name.to_owned(),
            reason,
        }),
        None => Ok(()),
    }
}
