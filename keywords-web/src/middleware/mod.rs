//! Middlewares specific to the keywords service.

mod metrics;

pub use self::metrics::Metrics;
