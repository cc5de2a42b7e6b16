//! Tracing middleware attaching a request-scoped trace identifier.
//!
//! Each incoming request receives a UUID trace id recorded on the request's
//! tracing span and echoed back in the `x-trace-id` response header so logs
//! and client reports can be correlated.

use std::future::{Ready, ready};

use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header::{HeaderName, HeaderValue};
use futures_util::future::LocalBoxFuture;
use tracing::Instrument as _;
use uuid::Uuid;

/// Response header carrying the request's trace identifier.
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// Middleware factory attaching trace identifiers to requests.
#[derive(Debug, Default, Clone, Copy)]
pub struct Trace;

impl<S, B> Transform<S, ServiceRequest> for Trace
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Transform = TraceMiddleware<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TraceMiddleware { service }))
    }
}

/// Service wrapper produced by [`Trace`].
pub struct TraceMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for TraceMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let trace_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "request",
            %trace_id,
            method = %req.method(),
            path = %req.path(),
        );
        let fut = self.service.call(req);
        Box::pin(async move {
            let mut res = fut.instrument(span).await?;
            if let Ok(value) = HeaderValue::from_str(&trace_id.to_string()) {
                res.headers_mut()
                    .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
            }
            Ok(res)
        })
    }
}
