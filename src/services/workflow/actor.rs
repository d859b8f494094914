use crate::db::models::{Assignment, Course, Profile};
use crate::db::types::ProfileRole;

/// The authenticated caller of a workflow operation, passed explicitly to every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Actor {
    pub(crate) id: String,
    pub(crate) role: ProfileRole,
}

impl Actor {
    pub(crate) fn new(id: impl Into<String>, role: ProfileRole) -> Self {
        Self { id: id.into(), role }
    }

    pub(crate) fn is_student(&self) -> bool {
        self.role == ProfileRole::Student
    }

    pub(crate) fn is_admin(&self) -> bool {
        self.role == ProfileRole::Admin
    }

    pub(crate) fn can_manage_assignment(&self, assignment: &Assignment) -> bool {
        self.is_admin()
            || (self.role == ProfileRole::Lecturer && assignment.lecturer_id == self.id)
    }

    pub(crate) fn can_manage_course(&self, course: &Course) -> bool {
        self.is_admin() || (self.role == ProfileRole::Lecturer && course.lecturer_id == self.id)
    }
}

impl From<&Profile> for Actor {
    fn from(profile: &Profile) -> Self {
        Self::new(profile.id.clone(), profile.role)
    }
}
