//! A student profile.

use sea_orm::entity::prelude::*;

pub type ProfileModel = Model;

/// A student profile.
#[derive(Debug, Clone, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    /// Unique numeric ID of the profile.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// The school ID of the student.
    #[sea_orm(unique, indexed)]
    pub school_id: i64,

    /// Full name.
    pub name: String,

    /// The academy (school or faculty) the student belongs to.
    pub academy: Option<String>,

    /// The administrative class number.
    pub class_number: Option<String>,

    /// The year of enrollment.
    pub grade: Option<String>,

    /// Name of the student's supervisor.
    pub supervisor: Option<String>,

    /// The course class the student is currently enrolled in.
    #[sea_orm(indexed)]
    pub current_class: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::coursework::Entity")]
    Coursework,
}

impl Related<super::coursework::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Coursework.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
