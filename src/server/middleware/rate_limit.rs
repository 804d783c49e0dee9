//! Rate limiting middleware

use crate::server::gate::{AdmissionGate, Continuation, RateLimitHeaders};
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::{Error, HttpRequest, HttpResponse};
use async_trait::async_trait;
use futures::future::{LocalBoxFuture, Ready, ready};
use std::marker::PhantomData;
use std::rc::Rc;

/// Admission gate installed in front of the wrapped services
///
/// Admitted responses carry the rate limit headers. Rejected requests never
/// reach the wrapped service.
#[derive(Clone, Debug)]
pub struct RateLimitMiddleware {
    gate: AdmissionGate,
}

impl RateLimitMiddleware {
    pub fn new(gate: AdmissionGate) -> Self {
        Self { gate }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            gate: self.gate.clone(),
        }))
    }
}

/// Service implementation for rate limit middleware
pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    gate: AdmissionGate,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let gate = self.gate.clone();
        let next = NextService {
            service: Rc::clone(&self.service),
            req,
            _body: PhantomData,
        };

        Box::pin(async move { gate.admit(next).await })
    }
}

/// Continues into the wrapped service
struct NextService<S, B> {
    service: Rc<S>,
    req: ServiceRequest,
    _body: PhantomData<B>,
}

#[async_trait(?Send)]
impl<S, B> Continuation for NextService<S, B>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Output = Result<ServiceResponse<EitherBody<B>>, Error>;

    fn request(&self) -> &HttpRequest {
        self.req.request()
    }

    async fn proceed(self) -> Self::Output {
        self.service
            .call(self.req)
            .await
            .map(ServiceResponse::map_into_left_body)
    }

    fn reject(self, response: HttpResponse) -> Self::Output {
        Ok(self.req.into_response(response).map_into_right_body())
    }

    fn annotate(output: &mut Self::Output, headers: &RateLimitHeaders) {
        if let Ok(response) = output {
            headers.apply(response.headers_mut());
        }
    }
}
