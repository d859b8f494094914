mod handlers;

use axum::{
    routing::{get, post},
    Router,
};

use crate::core::state::AppState;

/// Mounted under `/assignments`.
pub(crate) fn assignment_router() -> Router<AppState> {
    Router::new()
        .route(
            "/:assignment_id/submissions",
            post(handlers::create_submission).get(handlers::list_assignment_submissions),
        )
        .route("/:assignment_id/submissions/mine", get(handlers::my_assignment_submission))
        .route("/:assignment_id/summary", get(handlers::assignment_summary))
}

/// Mounted under `/submissions`.
pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:submission_id", get(handlers::get_submission))
        .route("/:submission_id/grade", post(handlers::grade_submission))
        .route("/:submission_id/override", post(handlers::override_grade))
}

/// Mounted under `/me`.
pub(crate) fn me_router() -> Router<AppState> {
    Router::new()
        .route("/submissions", get(handlers::my_submissions))
        .route("/review-queue", get(handlers::review_queue))
}
