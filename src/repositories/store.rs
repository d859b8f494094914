use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::is_unique_violation;
use crate::db::models::{Assignment, Course, Profile, Submission};
use crate::db::types::SubmissionStatus;
use crate::repositories::submissions::{CreateSubmission, GradedUpdate, OverrideUpdate};
use crate::repositories::{assignments, courses, profiles, submissions};
use crate::services::workflow::{StoreError, WorkflowStore};

/// [`WorkflowStore`] over the PostgreSQL repositories.
#[derive(Debug, Clone)]
pub(crate) struct PgWorkflowStore {
    pool: PgPool,
}

impl PgWorkflowStore {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkflowStore for PgWorkflowStore {
    async fn find_profile(&self, profile_id: &str) -> Result<Option<Profile>, StoreError> {
        Ok(profiles::find_by_id(&self.pool, profile_id).await?)
    }

    async fn find_course(&self, course_id: &str) -> Result<Option<Course>, StoreError> {
        Ok(courses::find_by_id(&self.pool, course_id).await?)
    }

    async fn find_assignment(
        &self,
        assignment_id: &str,
    ) -> Result<Option<Assignment>, StoreError> {
        Ok(assignments::find_by_id(&self.pool, assignment_id).await?)
    }

    async fn find_submission(
        &self,
        submission_id: &str,
    ) -> Result<Option<Submission>, StoreError> {
        Ok(submissions::find_by_id(&self.pool, submission_id).await?)
    }

    async fn find_submission_for_student(
        &self,
        assignment_id: &str,
        student_id: &str,
    ) -> Result<Option<Submission>, StoreError> {
        Ok(submissions::find_by_assignment_student(&self.pool, assignment_id, student_id).await?)
    }

    async fn insert_submission(&self, params: CreateSubmission) -> Result<Submission, StoreError> {
        submissions::insert(&self.pool, params).await.map_err(|err| {
            if is_unique_violation(&err) {
                StoreError::Duplicate
            } else {
                StoreError::Backend(err)
            }
        })
    }

    async fn mark_graded(
        &self,
        submission_id: &str,
        params: GradedUpdate,
    ) -> Result<Option<Submission>, StoreError> {
        Ok(submissions::mark_graded(&self.pool, submission_id, params).await?)
    }

    async fn apply_override(
        &self,
        submission_id: &str,
        params: OverrideUpdate,
    ) -> Result<Option<Submission>, StoreError> {
        Ok(submissions::apply_override(&self.pool, submission_id, params).await?)
    }

    async fn list_by_assignment(
        &self,
        assignment_id: &str,
    ) -> Result<Vec<Submission>, StoreError> {
        Ok(submissions::list_by_assignment(&self.pool, assignment_id).await?)
    }

    async fn list_by_student(&self, student_id: &str) -> Result<Vec<Submission>, StoreError> {
        Ok(submissions::list_by_student(&self.pool, student_id).await?)
    }

    async fn list_for_lecturer(
        &self,
        lecturer_id: &str,
        statuses: &[SubmissionStatus],
    ) -> Result<Vec<Submission>, StoreError> {
        Ok(submissions::list_for_lecturer(&self.pool, lecturer_id, statuses).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::primitive_now_utc;
    use crate::db;

    fn create_params(id: &str, assignment_id: &str, student_id: &str) -> CreateSubmission {
        CreateSubmission {
            id: id.to_string(),
            assignment_id: assignment_id.to_string(),
            student_id: student_id.to_string(),
            content_text: Some("answer".to_string()),
            file_url: None,
            submitted_at: primitive_now_utc(),
        }
    }

    // Needs a running Postgres at DATABASE_URL; run with `cargo test -- --ignored`.
    #[tokio::test]
    #[ignore]
    async fn second_insert_for_same_student_maps_to_duplicate() {
        dotenvy::dotenv().ok();
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL");
        let pool = PgPool::connect(&url).await.expect("connect");
        db::run_migrations(&pool).await.expect("migrations");

        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let student_id = format!("store-student-{suffix}");
        let lecturer_id = format!("store-lecturer-{suffix}");
        let course_id = format!("store-course-{suffix}");
        let assignment_id = format!("store-assignment-{suffix}");

        for (id, role) in [(&student_id, "student"), (&lecturer_id, "lecturer")] {
            sqlx::query("INSERT INTO profiles (id, full_name, role) VALUES ($1, $1, $2::profilerole)")
                .bind(id)
                .bind(role)
                .execute(&pool)
                .await
                .expect("profile");
        }
        sqlx::query("INSERT INTO courses (id, title, lecturer_id) VALUES ($1, 'Biology', $2)")
            .bind(&course_id)
            .bind(&lecturer_id)
            .execute(&pool)
            .await
            .expect("course");
        sqlx::query(
            "INSERT INTO assignments (id, course_id, title, max_score) VALUES ($1, $2, 'Essay', 100)",
        )
        .bind(&assignment_id)
        .bind(&course_id)
        .execute(&pool)
        .await
        .expect("assignment");

        let store = PgWorkflowStore::new(pool.clone());
        let first = format!("store-first-{suffix}");
        let second = format!("store-second-{suffix}");
        store
            .insert_submission(create_params(&first, &assignment_id, &student_id))
            .await
            .expect("first insert");
        let err = store
            .insert_submission(create_params(&second, &assignment_id, &student_id))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Duplicate));
        assert!(store.find_submission(&second).await.expect("lookup").is_none());

        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(&course_id)
            .execute(&pool)
            .await
            .expect("cleanup course");
        sqlx::query("DELETE FROM profiles WHERE id = ANY($1)")
            .bind(vec![student_id, lecturer_id])
            .execute(&pool)
            .await
            .expect("cleanup profiles");
    }
}
