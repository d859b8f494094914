use sqlx::PgPool;

use crate::db::models::Profile;

const PROFILE_COLUMNS: &str = "id, full_name, email, role, created_at";

pub(crate) async fn find_by_id(
    pool: &PgPool,
    profile_id: &str,
) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>(&format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"))
        .bind(profile_id)
        .fetch_optional(pool)
        .await
}
