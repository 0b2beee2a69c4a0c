//! HTTP middleware

mod metrics;

pub use self::metrics::metrics_middleware;
