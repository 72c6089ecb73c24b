pub mod auth;
pub mod context;
pub mod http_metrics;
pub mod rbac;
