use std::collections::BTreeMap;

use serde::Serialize;

use crate::db::models::{Assignment, Submission};
use crate::db::types::SubmissionStatus;

use super::resolution::effective_grade;

/// Per-assignment aggregate. Every score figure is derived from the effective grade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct GradeSummary {
    pub(crate) assignment_id: String,
    pub(crate) max_score: i32,
    pub(crate) total: usize,
    pub(crate) by_status: BTreeMap<&'static str, usize>,
    pub(crate) graded_count: usize,
    pub(crate) average_score: Option<f64>,
    pub(crate) average_percent: Option<f64>,
    pub(crate) needs_attention: usize,
    /// Mean |manual - ai| over submissions carrying both scores.
    pub(crate) mean_override_delta: Option<f64>,
}

impl GradeSummary {
    pub(crate) fn compute(assignment: &Assignment, submissions: &[Submission]) -> Self {
        let mut by_status = BTreeMap::new();
        for status in [SubmissionStatus::Pending, SubmissionStatus::Graded, SubmissionStatus::Reviewed]
        {
            by_status.insert(status.as_str(), 0);
        }

        let mut scores = Vec::new();
        let mut deltas = Vec::new();
        let mut needs_attention = 0;

        for submission in submissions {
            *by_status.entry(submission.status.as_str()).or_insert(0) += 1;

            if let Some(score) = effective_grade(submission).score {
                scores.push(f64::from(score));
            }
            if let (Some(ai), Some(manual)) = (submission.ai_score, submission.manual_score) {
                deltas.push(f64::from((manual - ai).abs()));
            }
            if submission.needs_attention {
                needs_attention += 1;
            }
        }

        let average_score = mean(&scores);
        let average_percent = average_score
            .filter(|_| assignment.max_score > 0)
            .map(|avg| avg / f64::from(assignment.max_score) * 100.0);

        Self {
            assignment_id: assignment.id.clone(),
            max_score: assignment.max_score,
            total: submissions.len(),
            by_status,
            graded_count: scores.len(),
            average_score,
            average_percent,
            needs_attention,
            mean_override_delta: mean(&deltas),
        }
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
