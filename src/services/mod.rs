pub(crate) mod grading_function;
pub(crate) mod storage;
pub(crate) mod workflow;
