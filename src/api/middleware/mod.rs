//! API middleware and extractors

pub mod metrics;
pub mod user;

pub use metrics::metrics_middleware;
pub use user::{CurrentUser, USER_HEADER};
