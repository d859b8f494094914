mod commands;
mod queries;
mod types;

pub(crate) use commands::{apply_override, insert, mark_graded};
pub(crate) use queries::{
    find_by_assignment_student, find_by_id, list_by_assignment, list_by_student,
    list_for_lecturer,
};
pub(crate) use types::{CreateSubmission, GradedUpdate, OverrideUpdate};
