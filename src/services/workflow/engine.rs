use std::sync::Arc;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::core::config::{Settings, UploadLimit};
use crate::core::time::primitive_now_utc;
use crate::db::models::{Assignment, Course, Submission};
use crate::db::types::SubmissionStatus;
use crate::repositories::submissions::{CreateSubmission, GradedUpdate, OverrideUpdate};
use crate::services::grading_function::{GradingFailure, GradingRequest};
use crate::services::storage::{material_object_key, submission_object_key};

use super::actor::Actor;
use super::contract::{self, GradingContractViolation};
use super::errors::{GradingUnavailableKind, WorkflowError};
use super::intake::{self, FileUpload, ManualGrade, SubmissionDraft, ValidatedDraft, ValidatedFile};
use super::ports::{GradingFunction, ObjectStore, StoreError, StoredObject, WorkflowStore};
use super::state::{self, Transition};
use super::summary::GradeSummary;

const REVIEW_QUEUE_STATUSES: [SubmissionStatus; 2] =
    [SubmissionStatus::Pending, SubmissionStatus::Graded];

#[derive(Debug, Clone)]
pub(crate) struct WorkflowConfig {
    pub(crate) grading_timeout: Duration,
    pub(crate) submission_uploads: UploadLimit,
    pub(crate) material_uploads: UploadLimit,
}

impl WorkflowConfig {
    pub(crate) fn from_settings(settings: &Settings) -> Self {
        Self {
            grading_timeout: settings.grading().timeout(),
            submission_uploads: settings.uploads().submission.clone(),
            material_uploads: settings.uploads().material.clone(),
        }
    }
}

#[derive(Debug)]
pub(crate) struct GradeOutcome {
    pub(crate) submission: Submission,
    /// Non-fatal problems with the AI response; the grade was stored regardless.
    pub(crate) violations: Vec<GradingContractViolation>,
}

#[derive(Debug)]
pub(crate) enum GradingAttempt {
    Graded { violations: Vec<GradingContractViolation> },
    /// The submission is stored and still `pending`; grading can be retried on its own.
    Failed(WorkflowError),
}

#[derive(Debug)]
pub(crate) struct SubmitOutcome {
    pub(crate) submission: Submission,
    pub(crate) grading: GradingAttempt,
}

#[derive(Clone)]
pub(crate) struct SubmissionWorkflow {
    store: Arc<dyn WorkflowStore>,
    objects: Option<Arc<dyn ObjectStore>>,
    grader: Arc<dyn GradingFunction>,
    config: WorkflowConfig,
}

impl SubmissionWorkflow {
    pub(crate) fn new(
        store: Arc<dyn WorkflowStore>,
        objects: Option<Arc<dyn ObjectStore>>,
        grader: Arc<dyn GradingFunction>,
        config: WorkflowConfig,
    ) -> Self {
        Self { store, objects, grader, config }
    }

    /// Validates and stores a new `pending` submission. Grading is a separate step.
    pub(crate) async fn submit(
        &self,
        actor: &Actor,
        assignment_id: &str,
        draft: SubmissionDraft,
    ) -> Result<Submission, WorkflowError> {
        let (submission, _) = self.submit_inner(actor, assignment_id, draft).await?;
        Ok(submission)
    }

    /// Stores the submission first, then grades it. A grading failure leaves the stored
    /// submission in place and is reported in [`SubmitOutcome::grading`].
    pub(crate) async fn submit_and_grade(
        &self,
        actor: &Actor,
        assignment_id: &str,
        draft: SubmissionDraft,
    ) -> Result<SubmitOutcome, WorkflowError> {
        let (submission, assignment) = self.submit_inner(actor, assignment_id, draft).await?;

        match self.grade_loaded(submission.clone(), &assignment).await {
            Ok(outcome) => Ok(SubmitOutcome {
                submission: outcome.submission,
                grading: GradingAttempt::Graded { violations: outcome.violations },
            }),
            Err(err) => Ok(SubmitOutcome { submission, grading: GradingAttempt::Failed(err) }),
        }
    }

    /// Runs the grading function for a `pending` submission.
    pub(crate) async fn grade(
        &self,
        actor: &Actor,
        submission_id: &str,
    ) -> Result<GradeOutcome, WorkflowError> {
        let submission = self.load_submission(submission_id).await?;
        let assignment = self.load_assignment(&submission.assignment_id).await?;

        if submission.student_id != actor.id && !actor.can_manage_assignment(&assignment) {
            return Err(WorkflowError::Forbidden("not allowed to grade this submission"));
        }

        self.grade_loaded(submission, &assignment).await
    }

    /// Records a lecturer's score and feedback. AI score and feedback are kept as they were.
    pub(crate) async fn override_grade(
        &self,
        actor: &Actor,
        submission_id: &str,
        grade: ManualGrade,
    ) -> Result<Submission, WorkflowError> {
        let submission = self.load_submission(submission_id).await?;
        let assignment = self.load_assignment(&submission.assignment_id).await?;

        if !actor.can_manage_assignment(&assignment) {
            return Err(WorkflowError::Forbidden(
                "only the lecturer of this assignment can override grades",
            ));
        }

        state::ensure_transition(submission.status, Transition::Override)?;
        intake::validate_manual_grade(&grade, &assignment)?;

        let update = OverrideUpdate {
            manual_score: grade.score,
            manual_feedback: grade.feedback,
            reviewed_by: actor.id.clone(),
            reviewed_at: state::next_reviewed_at(primitive_now_utc(), submission.reviewed_at),
        };

        let reviewed = match self.store.apply_override(&submission.id, update).await? {
            Some(reviewed) => reviewed,
            None => return Err(self.stale_transition(&submission.id, Transition::Override).await),
        };

        debug_assert!(state::is_consistent(&reviewed));
        metrics::counter!("grade_overrides_total").increment(1);
        tracing::info!(
            submission_id = %reviewed.id,
            assignment_id = %reviewed.assignment_id,
            lecturer_id = %actor.id,
            previous_status = %submission.status,
            ai_score = ?reviewed.ai_score,
            manual_score = ?reviewed.manual_score,
            "Grade overridden"
        );

        Ok(reviewed)
    }

    pub(crate) async fn get_submission(
        &self,
        actor: &Actor,
        submission_id: &str,
    ) -> Result<Submission, WorkflowError> {
        let submission = self.load_submission(submission_id).await?;
        if submission.student_id == actor.id {
            return Ok(submission);
        }

        let assignment = self.load_assignment(&submission.assignment_id).await?;
        if actor.can_manage_assignment(&assignment) {
            Ok(submission)
        } else {
            Err(WorkflowError::Forbidden("not allowed to view this submission"))
        }
    }

    pub(crate) async fn submission_for_student(
        &self,
        actor: &Actor,
        assignment_id: &str,
    ) -> Result<Option<Submission>, WorkflowError> {
        let assignment = self.load_assignment(assignment_id).await?;
        Ok(self.store.find_submission_for_student(&assignment.id, &actor.id).await?)
    }

    pub(crate) async fn list_for_assignment(
        &self,
        actor: &Actor,
        assignment_id: &str,
    ) -> Result<Vec<Submission>, WorkflowError> {
        let assignment = self.managed_assignment(actor, assignment_id).await?;
        Ok(self.store.list_by_assignment(&assignment.id).await?)
    }

    pub(crate) async fn list_for_student(
        &self,
        actor: &Actor,
    ) -> Result<Vec<Submission>, WorkflowError> {
        Ok(self.store.list_by_student(&actor.id).await?)
    }

    /// Submissions on the actor's courses that still await lecturer attention.
    pub(crate) async fn pending_for_lecturer(
        &self,
        actor: &Actor,
    ) -> Result<Vec<Submission>, WorkflowError> {
        if actor.is_student() {
            return Err(WorkflowError::Forbidden("only lecturers have a review queue"));
        }
        Ok(self.store.list_for_lecturer(&actor.id, &REVIEW_QUEUE_STATUSES).await?)
    }

    pub(crate) async fn assignment_summary(
        &self,
        actor: &Actor,
        assignment_id: &str,
    ) -> Result<GradeSummary, WorkflowError> {
        let assignment = self.managed_assignment(actor, assignment_id).await?;
        let submissions = self.store.list_by_assignment(&assignment.id).await?;
        Ok(GradeSummary::compute(&assignment, &submissions))
    }

    /// Stores a course material file under the material upload limits.
    pub(crate) async fn upload_material(
        &self,
        actor: &Actor,
        course_id: &str,
        file: FileUpload,
    ) -> Result<StoredObject, WorkflowError> {
        let course = self.load_course(course_id).await?;
        if !actor.can_manage_course(&course) {
            return Err(WorkflowError::Forbidden("only the course lecturer can upload materials"));
        }

        let file = intake::validate_material(file, &self.config.material_uploads)?;
        let key = material_object_key(&course.id, &file.filename);
        let stored = self.put_file(&key, file).await?;

        tracing::info!(
            course_id = %course.id,
            lecturer_id = %actor.id,
            key = %stored.key,
            size = stored.size,
            "Course material uploaded"
        );
        Ok(stored)
    }

    async fn submit_inner(
        &self,
        actor: &Actor,
        assignment_id: &str,
        draft: SubmissionDraft,
    ) -> Result<(Submission, Assignment), WorkflowError> {
        if !actor.is_student() {
            return Err(WorkflowError::Forbidden("only students can submit answers"));
        }

        let assignment = self.load_assignment(assignment_id).await?;

        let ValidatedDraft { content_text, file } =
            match intake::validate_draft(draft, &assignment, &self.config.submission_uploads) {
                Ok(validated) => validated,
                Err(err) => {
                    metrics::counter!("submissions_total", "outcome" => "rejected").increment(1);
                    return Err(err.into());
                }
            };

        if self.store.find_submission_for_student(&assignment.id, &actor.id).await?.is_some() {
            metrics::counter!("submissions_total", "outcome" => "duplicate").increment(1);
            return Err(duplicate(&assignment.id, &actor.id));
        }

        let uploaded = match file {
            Some(file) => {
                let key = submission_object_key(&actor.id, &assignment.id, &file.filename);
                match self.put_file(&key, file).await {
                    Ok(stored) => Some(stored),
                    Err(err) if content_text.is_some() => {
                        tracing::warn!(
                            assignment_id = %assignment.id,
                            student_id = %actor.id,
                            error = %err,
                            "Submission file upload failed; submitting text only"
                        );
                        None
                    }
                    Err(err) => {
                        metrics::counter!("submissions_total", "outcome" => "upload_failed")
                            .increment(1);
                        return Err(err);
                    }
                }
            }
            None => None,
        };

        let params = CreateSubmission {
            id: Uuid::new_v4().to_string(),
            assignment_id: assignment.id.clone(),
            student_id: actor.id.clone(),
            content_text,
            file_url: uploaded.as_ref().map(|stored| stored.url.clone()),
            submitted_at: primitive_now_utc(),
        };

        let inserted = self.store.insert_submission(params).await;
        if let (Err(_), Some(stored)) = (&inserted, &uploaded) {
            self.discard_object(&stored.key).await;
        }

        let submission = match inserted {
            Ok(submission) => submission,
            Err(StoreError::Duplicate) => {
                metrics::counter!("submissions_total", "outcome" => "duplicate").increment(1);
                return Err(duplicate(&assignment.id, &actor.id));
            }
            Err(err) => return Err(err.into()),
        };

        metrics::counter!("submissions_total", "outcome" => "accepted").increment(1);
        tracing::info!(
            submission_id = %submission.id,
            assignment_id = %submission.assignment_id,
            student_id = %submission.student_id,
            has_file = submission.file_url.is_some(),
            status = %submission.status,
            "Submission stored"
        );

        Ok((submission, assignment))
    }

    async fn grade_loaded(
        &self,
        submission: Submission,
        assignment: &Assignment,
    ) -> Result<GradeOutcome, WorkflowError> {
        state::ensure_transition(submission.status, Transition::Grade)?;

        let request = grading_request(assignment, &submission);
        let started = Instant::now();

        let response = match tokio::time::timeout(
            self.config.grading_timeout,
            self.grader.grade(&request),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(failure)) => return Err(self.grading_failed(&submission, failure.into())),
            Err(_) => {
                let err = WorkflowError::GradingUnavailable {
                    kind: GradingUnavailableKind::Timeout,
                    detail: format!(
                        "no response within {} seconds",
                        self.config.grading_timeout.as_secs()
                    ),
                };
                return Err(self.grading_failed(&submission, err));
            }
        };

        let assessed = contract::assess(&response, assignment.max_score);
        for violation in &assessed.violations {
            tracing::warn!(
                submission_id = %submission.id,
                assignment_id = %assignment.id,
                %violation,
                "Grading response broke its contract; storing with attention flag"
            );
        }

        let update = GradedUpdate {
            ai_score: assessed.score,
            ai_feedback: assessed.feedback.clone(),
            needs_attention: !assessed.violations.is_empty(),
            attention_reason: assessed.attention_reason(),
            graded_at: primitive_now_utc(),
        };

        let graded = match self.store.mark_graded(&submission.id, update).await? {
            Some(graded) => graded,
            None => return Err(self.stale_transition(&submission.id, Transition::Grade).await),
        };

        debug_assert!(state::is_consistent(&graded));
        metrics::counter!("grading_jobs_total", "status" => "success").increment(1);
        metrics::histogram!("grading_duration_seconds").record(started.elapsed().as_secs_f64());
        tracing::info!(
            submission_id = %graded.id,
            assignment_id = %graded.assignment_id,
            ai_score = ?graded.ai_score,
            needs_attention = graded.needs_attention,
            status = %graded.status,
            "Submission graded"
        );

        Ok(GradeOutcome { submission: graded, violations: assessed.violations })
    }

    fn grading_failed(&self, submission: &Submission, err: WorkflowError) -> WorkflowError {
        let kind = match &err {
            WorkflowError::GradingUnavailable { kind, .. } => kind.as_str(),
            _ => "unknown",
        };
        metrics::counter!("grading_jobs_total", "status" => kind).increment(1);
        tracing::error!(
            submission_id = %submission.id,
            assignment_id = %submission.assignment_id,
            kind,
            error = %err,
            "AI grading failed; submission stays pending"
        );
        err
    }

    /// The conditional update matched nothing: the row moved on or disappeared meanwhile.
    async fn stale_transition(&self, submission_id: &str, transition: Transition) -> WorkflowError {
        match self.store.find_submission(submission_id).await {
            Ok(Some(current)) => match state::ensure_transition(current.status, transition) {
                Err(err) => err,
                Ok(_) => WorkflowError::InvalidTransition {
                    from: current.status,
                    action: transition.action(),
                },
            },
            Ok(None) => WorkflowError::NotFound("Submission"),
            Err(err) => err.into(),
        }
    }

    async fn put_file(&self, key: &str, file: ValidatedFile) -> Result<StoredObject, WorkflowError> {
        let Some(objects) = &self.objects else {
            return Err(WorkflowError::Upload("object storage is not configured".to_string()));
        };

        objects
            .put_object(key, &file.content_type, file.bytes)
            .await
            .map_err(|err| WorkflowError::Upload(format!("{err:#}")))
    }

    /// Removes an uploaded object that no submission row refers to.
    async fn discard_object(&self, key: &str) {
        let Some(objects) = &self.objects else {
            return;
        };

        if let Err(err) = objects.delete_object(key).await {
            tracing::warn!(object_key = %key, error = %err, "Orphaned upload left in storage");
        }
    }

    async fn managed_assignment(
        &self,
        actor: &Actor,
        assignment_id: &str,
    ) -> Result<Assignment, WorkflowError> {
        let assignment = self.load_assignment(assignment_id).await?;
        if actor.can_manage_assignment(&assignment) {
            Ok(assignment)
        } else {
            Err(WorkflowError::Forbidden("only the lecturer of this assignment can do this"))
        }
    }

    async fn load_assignment(&self, assignment_id: &str) -> Result<Assignment, WorkflowError> {
        self.store
            .find_assignment(assignment_id)
            .await?
            .ok_or(WorkflowError::NotFound("Assignment"))
    }

    async fn load_submission(&self, submission_id: &str) -> Result<Submission, WorkflowError> {
        self.store
            .find_submission(submission_id)
            .await?
            .ok_or(WorkflowError::NotFound("Submission"))
    }

    async fn load_course(&self, course_id: &str) -> Result<Course, WorkflowError> {
        self.store.find_course(course_id).await?.ok_or(WorkflowError::NotFound("Course"))
    }
}

impl From<GradingFailure> for WorkflowError {
    fn from(failure: GradingFailure) -> Self {
        let kind = match &failure {
            GradingFailure::Unauthorized(_) => GradingUnavailableKind::AuthRequired,
            GradingFailure::Timeout(_) => GradingUnavailableKind::Timeout,
            GradingFailure::Service(_)
            | GradingFailure::Malformed(_)
            | GradingFailure::Transport(_) => GradingUnavailableKind::Service,
        };
        Self::GradingUnavailable { kind, detail: failure.to_string() }
    }
}

fn duplicate(assignment_id: &str, student_id: &str) -> WorkflowError {
    WorkflowError::DuplicateSubmission {
        assignment_id: assignment_id.to_string(),
        student_id: student_id.to_string(),
    }
}

/// Description and rubric form the grading context; a file-only answer is referenced by URL.
pub(super) fn grading_request(assignment: &Assignment, submission: &Submission) -> GradingRequest {
    let mut context = assignment.description.clone().unwrap_or_default();
    if let Some(rubric) = assignment.rubric.as_deref().filter(|rubric| !rubric.trim().is_empty()) {
        if !context.is_empty() {
            context.push_str("\n\n");
        }
        context.push_str("Rubric:\n");
        context.push_str(rubric);
    }

    let student_answer = match (&submission.content_text, &submission.file_url) {
        (Some(text), Some(url)) => format!("{text}\n\n[Attached file: {url}]"),
        (Some(text), None) => text.clone(),
        (None, Some(url)) => format!("[File submission: {url}]"),
        (None, None) => String::new(),
    };

    GradingRequest {
        assignment_title: assignment.title.clone(),
        assignment_context: context,
        student_answer,
        max_score: assignment.max_score,
    }
}
