//! Classes.
//!
//! ## Class IDs
//!
//! A class ID is the course-selection number of a class, for example
//! `(2017-2018-1)-S0500560-40429-2`. Each class owns one directory in
//! the storage root named after its ID, so IDs are restricted to a
//! filesystem-safe alphabet.
//!
//! Class IDs can be up to 100 characters long and can only consist of
//! ASCII alphanumeric characters (A-Za-z0-9), parentheses, dashes ('-'),
//! underscores ('_'), plus signs ('+') and dots ('.'). They must start
//! with an alphanumeric character or an opening parenthesis, which
//! rules out `.` and `..`.
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{de, Deserialize, Serialize};

use crate::error::{SatchelError, SatchelResult};

/// The maximum allowable length of a class ID.
pub const MAX_CLASS_ID_LENGTH: usize = 100;

lazy_static! {
    static ref CLASS_ID_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9(][A-Za-z0-9()_+.-]{0,99}$").unwrap();
}

/// The ID of a class.
#[derive(Serialize, Deserialize, Clone, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ClassId(#[serde(deserialize_with = "ClassId::deserialize")] String);

impl ClassId {
    /// Creates a class ID from a String.
    pub fn new(id: String) -> SatchelResult<Self> {
        validate_class_id(&id)?;
        Ok(Self(id))
    }

    /// Returns the string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Deserializes a potentially-invalid class ID.
    fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        use de::Error;
        String::deserialize(deserializer).and_then(|s| {
            validate_class_id(&s).map_err(|e| Error::custom(e.to_string()))?;
            Ok(s)
        })
    }
}

impl FromStr for ClassId {
    type Err = SatchelError;

    fn from_str(id: &str) -> SatchelResult<Self> {
        Self::new(id.to_owned())
    }
}

impl Display for ClassId {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_class_id(id: &str) -> SatchelResult<()> {
    if CLASS_ID_REGEX.is_match(id) {
        Ok(())
    } else {
        Err(SatchelError::InvalidClassId { id: id.to_owned() })
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    macro_rules! class {
        ($n:expr) => {
            ClassId::new($n.to_string()).unwrap()
        };
    }

    pub(crate) use class;

    #[test]
    fn test_class_id() {
        let ids = vec![
            "(2017-2018-1)-S0500560-40429-2",
            "CS101",
            "algo_2024.spring",
            "team+a",
        ];

        for id in ids {
            assert_eq!(id, class! { id }.as_str());

            assert_eq!(
                id,
                serde_json::from_str::<ClassId>(&format!("\"{}\"", id))
                    .unwrap()
                    .as_str(),
            );
        }

        let bad_ids = vec![
            "",
            ".",
            "..",
            "../etc",
            "a/b",
            "a\\b",
            "with space",
            "班级",
            "-leading-dash",
            "x:y",
        ];

        for id in bad_ids {
            ClassId::new(id.to_string()).unwrap_err();
            serde_json::from_str::<ClassId>(&format!("\"{}\"", id.replace('\\', "\\\\")))
                .unwrap_err();
        }

        let too_long = "a".repeat(MAX_CLASS_ID_LENGTH + 1);
        ClassId::new(too_long).unwrap_err();
        ClassId::new("a".repeat(MAX_CLASS_ID_LENGTH)).unwrap();
    }
}
