//! A coursework record.
//!
//! One record exists per student and class. It is created by the
//! surrounding system when a student joins a class, and Satchel
//! maintains its artifact reference and rating.

use std::str::FromStr;

use sea_orm::entity::prelude::*;

use satchel::api::v1::query_coursework::CourseworkInfo;
use satchel::rating::Rating;

pub type CourseworkModel = Model;

/// A coursework record.
#[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "coursework")]
pub struct Model {
    /// Unique numeric ID of the record.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// The school ID of the student.
    #[sea_orm(indexed)]
    pub student_id: i64,

    /// The class the coursework is submitted to.
    #[sea_orm(indexed)]
    pub class_id: String,

    /// Download reference of the submitted artifact.
    ///
    /// Non-null iff the artifact exists in storage, except after a
    /// partially failed pipeline.
    #[sea_orm(indexed)]
    pub artifact_ref: Option<String>,

    /// Rating code.
    ///
    /// One of `A`, `B`, `C`, `D` and `F`.
    #[sea_orm(column_type = "String(Some(1))")]
    pub rating: Option<String>,

    /// Free-form remark of the teacher.
    pub remark: Option<String>,

    /// Timestamp when the record is created.
    pub created_at: ChronoDateTimeUtc,

    /// Timestamp when the record is last updated.
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::StudentId",
        to = "super::profile::Column::SchoolId"
    )]
    Profile,
}

impl Model {
    /// Returns the parsed rating.
    ///
    /// Codes outside of the scale are treated as unset.
    pub fn rating(&self) -> Option<Rating> {
        self.rating
            .as_deref()
            .and_then(|code| Rating::from_str(code).ok())
    }

    /// Converts this record to its API representation.
    pub fn to_coursework_info(&self) -> CourseworkInfo {
        CourseworkInfo {
            record_id: self.id,
            student_id: self.student_id,
            class_id: self.class_id.clone(),
            artifact_ref: self.artifact_ref.clone(),
            rating: self.rating(),
            remark: self.remark.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Profile.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
