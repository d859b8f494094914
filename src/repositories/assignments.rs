use sqlx::PgPool;

use crate::db::models::Assignment;

const ASSIGNMENT_COLUMNS: &str = "\
    a.id, a.course_id, c.lecturer_id, a.title, a.description, a.due_date, a.max_score, \
    a.rubric, a.allow_file_upload, a.created_at";

pub(crate) async fn find_by_id(
    pool: &PgPool,
    assignment_id: &str,
) -> Result<Option<Assignment>, sqlx::Error> {
    sqlx::query_as::<_, Assignment>(&format!(
        "SELECT {ASSIGNMENT_COLUMNS}
         FROM assignments a
         JOIN courses c ON c.id = a.course_id
         WHERE a.id = $1"
    ))
    .bind(assignment_id)
    .fetch_optional(pool)
    .await
}
