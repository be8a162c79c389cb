pub mod backlog;
pub mod batch;
pub mod readiness;
pub mod tracker;
