pub(crate) mod errors;
pub(crate) mod guards;
pub(crate) mod handlers;
mod materials;
pub(crate) mod router;
mod submissions;
mod uploads;
