//! Submission grading workflow: submit, grade, override, and the effective-grade rule.
//!
//! The engine talks to its collaborators only through the traits in [`ports`], so the
//! same code runs against PostgreSQL/S3/HTTP in production and in-test fakes.

mod actor;
mod contract;
mod engine;
mod errors;
mod intake;
mod ports;
mod resolution;
mod state;
mod summary;

pub(crate) use actor::Actor;
pub(crate) use contract::GradingContractViolation;
pub(crate) use engine::{
    GradeOutcome, GradingAttempt, SubmissionWorkflow, SubmitOutcome, WorkflowConfig,
};
pub(crate) use errors::{GradingUnavailableKind, WorkflowError};
pub(crate) use intake::{FileUpload, ManualGrade, SubmissionDraft};
pub(crate) use ports::{GradingFunction, ObjectStore, StoreError, StoredObject, WorkflowStore};
pub(crate) use resolution::{effective_grade, EffectiveGrade};
pub(crate) use summary::GradeSummary;
