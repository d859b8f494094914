pub(crate) mod api;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod repositories;
pub(crate) mod schemas;
pub(crate) mod services;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use crate::core::{config::Settings, state::AppState, telemetry};
use crate::repositories::PgWorkflowStore;
use crate::services::grading_function::GradingClient;
use crate::services::storage::StorageService;
use crate::services::workflow::{ObjectStore, SubmissionWorkflow, WorkflowConfig, WorkflowStore};

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let db_pool = db::init_pool(&settings).await?;
    db::run_migrations(&db_pool).await?;

    let storage = StorageService::from_settings(&settings).await?;
    if storage.is_none() {
        tracing::warn!("S3 credentials not configured; file uploads will fail");
    }
    if !settings.grading().is_configured() {
        tracing::warn!("GRADING_FUNCTION_URL not configured; submissions will stay pending");
    }

    let store: Arc<dyn WorkflowStore> = Arc::new(PgWorkflowStore::new(db_pool.clone()));
    let objects = storage.map(|storage| Arc::new(storage) as Arc<dyn ObjectStore>);
    let grader = Arc::new(GradingClient::from_settings(settings.grading())?);
    let workflow = SubmissionWorkflow::new(
        store.clone(),
        objects,
        grader,
        WorkflowConfig::from_settings(&settings),
    );

    let state = AppState::new(settings, db_pool, store, workflow);
    let app = api::router::router(state.clone());
    let listener = tokio::net::TcpListener::bind(state.settings().server_addr()).await?;

    tracing::info!(
        host = %state.settings().server_host(),
        port = state.settings().server_port(),
        environment = %state.settings().runtime().environment.as_str(),
        "Gradeflow API listening"
    );

    axum::serve(listener, app).with_graceful_shutdown(core::shutdown::shutdown_signal()).await?;

    Ok(())
}
