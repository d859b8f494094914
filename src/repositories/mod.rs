pub(crate) mod assignments;
pub(crate) mod courses;
pub(crate) mod profiles;
mod store;
pub(crate) mod submissions;

pub(crate) use store::PgWorkflowStore;
