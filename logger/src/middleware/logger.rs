use std::rc::Rc;
use std::time::Instant;

use actix_web::body::{BoxBody, MessageBody};
use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::StatusCode,
};
use colored::Colorize;
use futures::future::{LocalBoxFuture, Ready, ready};
use log::{info, warn};

/// Logs one line per request: method, path, status and elapsed time.
pub struct LoggerMiddleware {}

impl LoggerMiddleware {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for LoggerMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, B> Transform<S, ServiceRequest> for LoggerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = LoggerMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggerMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct LoggerMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for LoggerMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let method = req.method().to_string();
        let path = req.path().to_string();
        let started = Instant::now();
        let srv = Rc::clone(&self.service);

        Box::pin(async move {
            let res = srv.call(req).await?;
            let status = res.status();
            let elapsed = started.elapsed().as_millis();

            if status.is_server_error() {
                warn!(
                    "{} {} {} {}ms",
                    method,
                    path,
                    colored_status(status),
                    elapsed
                );
            } else {
                info!(
                    "{} {} {} {}ms",
                    method,
                    path,
                    colored_status(status),
                    elapsed
                );
            }

            Ok(res.map_into_boxed_body())
        })
    }
}

fn colored_status(status: StatusCode) -> String {
    let code = status.as_u16().to_string();
    if status.is_success() {
        code.green().to_string()
    } else if status.is_client_error() {
        code.yellow().to_string()
    } else if status.is_server_error() {
        code.red().to_string()
    } else {
        code
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{App, HttpResponse, test as actix_test, web};

    use super::*;

    #[actix_web::test]
    async fn passes_responses_through() {
        let app = actix_test::init_service(
            App::new()
                .wrap(LoggerMiddleware::new())
                .route("/ping", web::get().to(|| async { HttpResponse::Ok().body("pong") })),
        )
        .await;

        let req = actix_test::TestRequest::get().uri("/ping").to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            actix_test::read_body(res).await,
            web::Bytes::from_static(b"pong")
        );
    }

    #[test]
    fn status_text_keeps_the_code() {
        assert!(colored_status(StatusCode::NOT_FOUND).contains("404"));
    }
}
