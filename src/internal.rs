mod handler;
mod registry;
mod worker;
mod worker_status;

pub(crate) use handler::Handler;
pub(crate) use registry::Registry;
pub(crate) use worker::Worker;
pub(crate) use worker_status::WorkerStatus;
