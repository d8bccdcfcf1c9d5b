//! Shared-secret token gate
//!
//! Requests must carry `X-Auth-Token` equal to the configured token,
//! otherwise they are answered with 403 before reaching the handler.

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header::CONTENT_TYPE,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::{trace, warn};

pub const AUTH_HEADER: &str = "X-Auth-Token";

/// Token authentication middleware
#[derive(Clone)]
pub struct TokenAuth {
    token: Arc<str>,
}

impl TokenAuth {
    pub fn new(token: impl Into<Arc<str>>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for TokenAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = TokenAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TokenAuthMiddleware {
            service: Rc::new(service),
            token: self.token.clone(),
        }))
    }
}

pub struct TokenAuthMiddleware<S> {
    service: Rc<S>,
    token: Arc<str>,
}

impl<S, B> TokenAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    fn handle_forbidden(req: ServiceRequest) -> ServiceResponse<EitherBody<B>> {
        let remote_addr = req
            .peer_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_default();
        warn!(remote_addr = %remote_addr, path = %req.path(), "Unauthorized access attempt");

        req.into_response(
            HttpResponse::Forbidden()
                .insert_header((CONTENT_TYPE, "text/plain; charset=utf-8"))
                .body("Forbidden: Invalid or missing token")
                .map_into_right_body(),
        )
    }

    fn is_authorized(req: &ServiceRequest, token: &str) -> bool {
        let provided = req
            .headers()
            .get(AUTH_HEADER)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("");
        provided.as_bytes().ct_eq(token.as_bytes()).into()
    }
}

impl<S, B> Service<ServiceRequest> for TokenAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if !Self::is_authorized(&req, &self.token) {
            return Box::pin(async move { Ok(Self::handle_forbidden(req)) });
        }

        trace!("Token authentication passed for {}", req.path());
        let srv = self.service.clone();
        Box::pin(async move { Ok(srv.call(req).await?.map_into_left_body()) })
    }
}
