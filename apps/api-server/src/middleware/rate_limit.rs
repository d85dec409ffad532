//! Rate limiting middleware.

use std::future::{Ready, ready};
use std::rc::Rc;
use std::sync::Arc;

use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures::future::LocalBoxFuture;
use inkwell_shared::ErrorResponse;

use inkwell_core::ports::RateLimiter;

/// Rate limiting middleware factory, keyed by client address.
///
/// The key is the socket peer address. `Forwarded`/`X-Forwarded-For` are
/// only honored after [`RateLimitMiddleware::trust_proxy_headers`], since
/// clients can set them freely.
pub struct RateLimitMiddleware {
    limiter: Arc<dyn RateLimiter>,
    trust_proxy_headers: bool,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            limiter,
            trust_proxy_headers: false,
        }
    }

    /// Key on the forwarded client address. Enable only behind a proxy
    /// that overwrites these headers.
    pub fn trust_proxy_headers(mut self, trust: bool) -> Self {
        self.trust_proxy_headers = trust;
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
            trust_proxy_headers: self.trust_proxy_headers,
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: Arc<dyn RateLimiter>,
    trust_proxy_headers: bool,
}

fn client_key(req: &ServiceRequest, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers {
        if let Some(addr) = req.connection_info().realip_remote_addr() {
            return addr.to_string();
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let limiter = self.limiter.clone();

        let key = client_key(&req, self.trust_proxy_headers);

        Box::pin(async move {
            match limiter.check(&key).await {
                Ok(result) if !result.allowed => {
                    tracing::warn!(client = %key, "Rate limit exceeded");

                    // Round up so clients never retry early.
                    let retry_after = result.reset_after.as_secs()
                        + u64::from(result.reset_after.subsec_nanos() > 0);

                    let response = HttpResponse::TooManyRequests()
                        .insert_header(("Retry-After", retry_after.to_string()))
                        .json(ErrorResponse::too_many_requests(retry_after));

                    Ok(req.into_response(response).map_into_right_body())
                }
                Ok(_) => {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(e) => {
                    tracing::error!("Rate limiter error, failing open: {}", e);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use inkwell_infra::rate_limit::{InMemoryRateLimiter, RateLimitConfig};

    use super::*;

    fn one_per_minute() -> InMemoryRateLimiter {
        InMemoryRateLimiter::new(RateLimitConfig {
            max_requests: 1,
            window: Duration::from_secs(60),
        })
        .unwrap()
    }

    #[actix_rt::test]
    async fn test_requests_over_quota_get_429() {
        let limiter = one_per_minute();

        let app = test::init_service(
            App::new()
                .wrap(RateLimitMiddleware::new(Arc::new(limiter)))
                .route("/ping", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let first =
            test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;
        assert_eq!(first.status(), StatusCode::OK);

        let second =
            test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        let retry_after: u64 = second
            .headers()
            .get("Retry-After")
            .unwrap()
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!(retry_after >= 1);
    }

    fn forwarded_from(i: u8) -> test::TestRequest {
        test::TestRequest::get()
            .uri("/ping")
            .peer_addr("192.0.2.10:40000".parse().unwrap())
            .insert_header(("X-Forwarded-For", format!("10.9.9.{i}")))
    }

    #[actix_rt::test]
    async fn test_forwarded_header_does_not_change_key() {
        let app = test::init_service(
            App::new()
                .wrap(RateLimitMiddleware::new(Arc::new(one_per_minute())))
                .route("/ping", web::get().to(HttpResponse::Ok)),
        )
        .await;

        let mut statuses = Vec::new();
        for i in 0..5 {
            let resp = test::call_service(&app, forwarded_from(i).to_request()).await;
            statuses.push(resp.status());
        }

        assert_eq!(statuses[0], StatusCode::OK);
        assert!(
            statuses[1..]
                .iter()
                .all(|status| *status == StatusCode::TOO_MANY_REQUESTS)
        );
    }

    #[actix_rt::test]
    async fn test_trusted_proxy_keys_on_forwarded_client() {
        let app = test::init_service(
            App::new()
                .wrap(
                    RateLimitMiddleware::new(Arc::new(one_per_minute())).trust_proxy_headers(true),
                )
                .route("/ping", web::get().to(HttpResponse::Ok)),
        )
        .await;

        for i in 0..3 {
            let resp = test::call_service(&app, forwarded_from(i).to_request()).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }
        let repeat = test::call_service(&app, forwarded_from(0).to_request()).await;
        assert_eq!(repeat.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
