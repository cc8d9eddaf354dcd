pub mod entity;
pub mod migration;


use async_trait::async_trait;
use chrono::Utc;
use sea_orm::entity::prelude::*;
use sea_orm::query::{QueryOrder, QuerySelect};
use sea_orm::sea_query::Expr;
use sea_orm::DatabaseConnection;

use crate::error::{ServerError, ServerResult};
use entity::coursework::{self, CourseworkModel, Entity as Coursework};
use entity::profile::{self, ProfileModel};
use satchel::class::ClassId;
use satchel::download::DownloadRef;
use satchel::rating::Rating;
use satchel::student::StudentId;

#[async_trait]
pub trait SatchelDatabase: Send + Sync {
    /// Retrieves the coursework record of a slot.
    ///
    /// If the surrounding system ever created more than one record for
    /// the slot, the most recent one is returned.
    async fn find_coursework(
        &self,
        class: &ClassId,
        student: StudentId,
    ) -> ServerResult<CourseworkModel>;

    /// Retrieves all coursework records of a slot, most recent first.
    async fn list_coursework(
        &self,
        class: &ClassId,
        student: StudentId,
    ) -> ServerResult<Vec<CourseworkModel>>;

    /// Points a record at a newly placed artifact.
    async fn set_artifact_ref(&self, record_id: i64, artifact_ref: &DownloadRef)
        -> ServerResult<()>;

    /// Clears the artifact reference of every record holding `artifact_ref`.
    ///
    /// Returns the number of records updated, which may be zero.
    async fn clear_artifact_ref(&self, artifact_ref: &DownloadRef) -> ServerResult<u64>;

    /// Stores the rating and remark of a record.
    async fn rate_coursework(
        &self,
        record_id: i64,
        rating: Rating,
        remark: String,
    ) -> ServerResult<()>;

    /// Retrieves the grading rows of a class.
    ///
    /// Only students currently enrolled in the class with at least one
    /// record for it are returned, one row per student with their most
    /// recent record, ordered by student ID.
    async fn find_report_rows(
        &self,
        class: &ClassId,
    ) -> ServerResult<Vec<(CourseworkModel, ProfileModel)>>;

    /// Retrieves every non-null artifact reference.
    async fn find_artifact_refs(&self) -> ServerResult<Vec<String>>;
}

fn slot_query(class: &ClassId, student: StudentId) -> Select<Coursework> {
    Coursework::find()
        .filter(coursework::Column::ClassId.eq(class.as_str()))
        .filter(coursework::Column::StudentId.eq(student.get()))
        .order_by_desc(coursework::Column::CreatedAt)
        .order_by_desc(coursework::Column::Id)
}

#[async_trait]
impl SatchelDatabase for DatabaseConnection {
    async fn find_coursework(
        &self,
        class: &ClassId,
        student: StudentId,
    ) -> ServerResult<CourseworkModel> {
        slot_query(class, student)
            .one(self)
            .await
            .map_err(ServerError::database_error)?
            .ok_or(ServerError::NoSuchCoursework)
    }

    async fn list_coursework(
        &self,
        class: &ClassId,
        student: StudentId,
    ) -> ServerResult<Vec<CourseworkModel>> {
        slot_query(class, student)
            .all(self)
            .await
            .map_err(ServerError::database_error)
    }

    async fn set_artifact_ref(
        &self,
        record_id: i64,
        artifact_ref: &DownloadRef,
    ) -> ServerResult<()> {
        let result = Coursework::update_many()
            .col_expr(
                coursework::Column::ArtifactRef,
                Expr::value(artifact_ref.to_string()),
            )
            .col_expr(coursework::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(coursework::Column::Id.eq(record_id))
            .exec(self)
            .await
            .map_err(ServerError::database_error)?;

        if result.rows_affected == 0 {
            return Err(ServerError::NoSuchCoursework);
        }

        Ok(())
    }

    async fn clear_artifact_ref(&self, artifact_ref: &DownloadRef) -> ServerResult<u64> {
        let result = Coursework::update_many()
            .col_expr(
                coursework::Column::ArtifactRef,
                Expr::value(Option::<String>::None),
            )
            .col_expr(coursework::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(coursework::Column::ArtifactRef.eq(artifact_ref.to_string()))
            .exec(self)
            .await
            .map_err(ServerError::database_error)?;

        Ok(result.rows_affected)
    }

    async fn rate_coursework(
        &self,
        record_id: i64,
        rating: Rating,
        remark: String,
    ) -> ServerResult<()> {
        let result = Coursework::update_many()
            .col_expr(coursework::Column::Rating, Expr::value(rating.code()))
            .col_expr(coursework::Column::Remark, Expr::value(remark))
            .col_expr(coursework::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(coursework::Column::Id.eq(record_id))
            .exec(self)
            .await
            .map_err(ServerError::database_error)?;

        if result.rows_affected == 0 {
            return Err(ServerError::NoSuchCoursework);
        }

        Ok(())
    }

    async fn find_report_rows(
        &self,
        class: &ClassId,
    ) -> ServerResult<Vec<(CourseworkModel, ProfileModel)>> {
        /*
            Something like:

            select * from coursework
            left join profile
                on coursework.student_id = profile.school_id
            where
                coursework.class_id = 'CS101' and
                profile.current_class = 'CS101'
            order by
                coursework.student_id asc,
                coursework.created_at desc,
                coursework.id desc

            The filter on the profile makes the left join an inner one. The
            first row of each student is the most recent record.
        */
        let rows = Coursework::find()
            .find_also_related(profile::Entity)
            .filter(coursework::Column::ClassId.eq(class.as_str()))
            .filter(profile::Column::CurrentClass.eq(class.as_str()))
            .order_by_asc(coursework::Column::StudentId)
            .order_by_desc(coursework::Column::CreatedAt)
            .order_by_desc(coursework::Column::Id)
            .all(self)
            .await
            .map_err(ServerError::database_error)?;

        let mut report: Vec<(CourseworkModel, ProfileModel)> = Vec::new();
        for (record, profile) in rows {
            let profile = match profile {
                Some(profile) => profile,
                None => continue,
            };

            if let Some((last, _)) = report.last() {
                if last.student_id == record.student_id {
                    continue;
                }
            }

            report.push((record, profile));
        }

        Ok(report)
    }

    async fn find_artifact_refs(&self) -> ServerResult<Vec<String>> {
        let refs: Vec<Option<String>> = Coursework::find()
            .select_only()
            .column(coursework::Column::ArtifactRef)
            .filter(coursework::Column::ArtifactRef.is_not_null())
            .into_tuple()
            .all(self)
            .await
            .map_err(ServerError::database_error)?;

        Ok(refs.into_iter().flatten().collect())
    }
}
