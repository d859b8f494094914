use std::sync::Arc;

use sqlx::PgPool;

use crate::core::config::Settings;
use crate::services::workflow::{SubmissionWorkflow, WorkflowStore};

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    db: PgPool,
    store: Arc<dyn WorkflowStore>,
    workflow: SubmissionWorkflow,
}

impl AppState {
    pub(crate) fn new(
        settings: Settings,
        db: PgPool,
        store: Arc<dyn WorkflowStore>,
        workflow: SubmissionWorkflow,
    ) -> Self {
        Self { inner: Arc::new(InnerState { settings, db, store, workflow }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn db(&self) -> &PgPool {
        &self.inner.db
    }

    pub(crate) fn store(&self) -> &dyn WorkflowStore {
        self.inner.store.as_ref()
    }

    pub(crate) fn workflow(&self) -> &SubmissionWorkflow {
        &self.inner.workflow
    }
}
