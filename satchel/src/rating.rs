//! The rating scale.
//!
//! Coursework is rated on a fixed five-level scale. Teachers submit a
//! numeric rank which is stored as a single-letter code:
//!
//! | Rank | Code | Label       |
//! |------|------|-------------|
//! | 5    | `A`  | `excellent` |
//! | 4    | `B`  | `good`      |
//! | 3    | `C`  | `average`   |
//! | 2    | `D`  | `pass`      |
//! | 1    | `F`  | `fail`      |
//!
//! The label doubles as the default remark when the teacher does not
//! write one.
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{SatchelError, SatchelResult};

/// A rating code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    #[serde(rename = "A")]
    Excellent,

    #[serde(rename = "B")]
    Good,

    #[serde(rename = "C")]
    Average,

    #[serde(rename = "D")]
    Pass,

    #[serde(rename = "F")]
    Fail,
}

impl Rating {
    /// Maps a numeric rank (1-5) to a rating.
    pub fn from_rank(rank: i64) -> SatchelResult<Self> {
        match rank {
            5 => Ok(Self::Excellent),
            4 => Ok(Self::Good),
            3 => Ok(Self::Average),
            2 => Ok(Self::Pass),
            1 => Ok(Self::Fail),
            _ => Err(SatchelError::InvalidRank { rank }),
        }
    }

    /// Returns the stored code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Excellent => "A",
            Self::Good => "B",
            Self::Average => "C",
            Self::Pass => "D",
            Self::Fail => "F",
        }
    }

    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Average => "average",
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }

    /// Returns the remark used when none is supplied.
    pub fn default_remark(&self) -> &'static str {
        self.label()
    }

    /// Returns the display label of an optional stored code.
    ///
    /// Unset or unrecognized codes have an empty label.
    pub fn label_of(code: Option<&str>) -> &'static str {
        code.and_then(|c| Self::from_str(c).ok())
            .map(|r| r.label())
            .unwrap_or("")
    }
}

impl FromStr for Rating {
    type Err = SatchelError;

    fn from_str(code: &str) -> SatchelResult<Self> {
        match code {
            "A" => Ok(Self::Excellent),
            "B" => Ok(Self::Good),
            "C" => Ok(Self::Average),
            "D" => Ok(Self::Pass),
            "F" => Ok(Self::Fail),
            _ => Err(SatchelError::InvalidRatingCode {
                code: code.to_owned(),
            }),
        }
    }
}

impl Display for Rating {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Picks the remark to store for a rating.
///
/// An explicit, non-empty remark always wins over the default.
pub fn remark_for(rating: Rating, remark: Option<&str>) -> String {
    match remark {
        Some(remark) if !remark.is_empty() => remark.to_owned(),
        _ => rating.default_remark().to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_table() {
        let table = [
            (5, "A", "excellent"),
            (4, "B", "good"),
            (3, "C", "average"),
            (2, "D", "pass"),
            (1, "F", "fail"),
        ];

        for (rank, code, label) in table {
            let rating = Rating::from_rank(rank).unwrap();
            assert_eq!(code, rating.code());
            assert_eq!(label, rating.label());
            assert_eq!(label, rating.default_remark());
            assert_eq!(rating, Rating::from_str(code).unwrap());
            assert_eq!(label, Rating::label_of(Some(code)));
        }

        for rank in [0, 6, -1, 100] {
            Rating::from_rank(rank).unwrap_err();
        }
    }

    #[test]
    fn test_label_of_unset() {
        assert_eq!("", Rating::label_of(None));
        assert_eq!("", Rating::label_of(Some("E")));
        assert_eq!("", Rating::label_of(Some("")));
    }

    #[test]
    fn test_remark_for() {
        assert_eq!("excellent", remark_for(Rating::Excellent, None));
        assert_eq!("excellent", remark_for(Rating::Excellent, Some("")));
        assert_eq!("Great work", remark_for(Rating::Excellent, Some("Great work")));
        assert_eq!("fail", remark_for(Rating::Fail, None));
    }

    #[test]
    fn test_serde() {
        assert_eq!("\"A\"", serde_json::to_string(&Rating::Excellent).unwrap());
        assert_eq!(Rating::Fail, serde_json::from_str::<Rating>("\"F\"").unwrap());
        serde_json::from_str::<Rating>("\"E\"").unwrap_err();
    }
}
