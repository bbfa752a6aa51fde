//! Middlewares for reporting request metrics.

use actix_web::{
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    web::Data,
    Error as ActixError,
};
use cadence::{StatsdClient, Timed};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    task::{Context, Poll},
    time::Instant,
};

/// Factory for [`MetricsMiddleware`].
pub struct Metrics;

/// Middleware to record how long each request took, tagged by route.
pub struct MetricsMiddleware<S> {
    /// The wrapped service.
    service: S,
}

impl<S, B> Transform<S, ServiceRequest> for Metrics
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Transform = MetricsMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MetricsMiddleware { service }))
    }
}

impl<S, B> Service<ServiceRequest> for MetricsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx).map_err(|error| {
            tracing::error!(
                r#type = "web.metrics.polling-error",
                %error,
                "Error polling service from metrics middleware"
            );
            error
        })
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        // Route patterns, not raw paths.
        let path = req
            .match_pattern()
            .unwrap_or_else(|| "unmatched".to_string());
        let metrics_client = req.app_data::<Data<StatsdClient>>().cloned();
        let fut = self.service.call(req);

        Box::pin(async move {
            let response = fut.await?;
            match metrics_client {
                Some(metrics_client) => {
                    metrics_client
                        .time_with_tags("request.duration", start.elapsed())
                        .with_tag("path", &path)
                        .send();
                }
                None => tracing::warn!(
                    r#type = "web.metrics.no-client",
                    "No metrics client configured, but metrics middleware attached"
                ),
            }
            Ok(response)
        })
    }
}
