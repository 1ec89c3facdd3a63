use std::{rc::Rc, sync::Arc};

use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::{BoxBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header,
    web,
};
use common::{
    error::AppError,
    jwt::{JwtClaims, bearer_token, validate_jwt},
};
use db::UserStore;
use futures::future::{LocalBoxFuture, Ready, ok};

/// Requires a valid bearer token for an active user and stores the caller's
/// `JwtClaims` in the request extensions for `web::ReqData`.
///
/// The user is reloaded from the `UserStore` registered as app data on every
/// request, so deactivation and staff changes apply to tokens already issued.
pub struct AuthMiddleware {
    secret: Rc<String>,
}

impl AuthMiddleware {
    pub fn new(secret: String) -> Self {
        AuthMiddleware {
            secret: Rc::new(secret),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Arc::new(service),
            secret: self.secret.clone(),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Arc<S>,
    secret: Rc<String>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .map(str::to_string);

        let Some(token) = token else {
            return Box::pin(async move {
                Ok::<_, Error>(unauthorized(req, "No authorization token provided"))
            });
        };

        let claims = match validate_jwt(&token, &self.secret) {
            Ok(claims) => claims,
            Err(err) => {
                log::debug!("Rejected bearer token: {}", err);
                return Box::pin(async move { Ok::<_, Error>(unauthorized(req, "Invalid token")) });
            }
        };

        let users = req
            .app_data::<web::Data<Arc<dyn UserStore>>>()
            .map(|users| Arc::clone(users.get_ref()));
        let srv = Arc::clone(&self.service);

        Box::pin(async move {
            let Some(users) = users else {
                let err = AppError::Internal("User store is not configured".to_string());
                return Ok::<_, Error>(req.error_response(err));
            };

            match users.get_user_by_id(claims.user_id).await {
                Ok(user) if user.is_active => {
                    req.extensions_mut().insert(JwtClaims {
                        is_staff: user.is_staff,
                        ..claims
                    });
                    srv.call(req).await.map(|res| res.map_into_boxed_body())
                }
                Ok(user) => {
                    log::debug!("Rejected token for inactive user {}", user.id);
                    Ok(unauthorized(req, "User account is disabled"))
                }
                Err(AppError::Database(sqlx::Error::RowNotFound)) => {
                    Ok(unauthorized(req, "User not found"))
                }
                Err(err) => Ok(req.error_response(err)),
            }
        })
    }
}

fn unauthorized(req: ServiceRequest, message: &str) -> ServiceResponse<BoxBody> {
    let response = HttpResponse::Unauthorized()
        .json(serde_json::json!({ "error": message }))
        .map_into_boxed_body();
    req.into_response(response)
}
